use thiserror::Error;

use skein_core::identifier::Id;

/// Fatal compilation errors. Any of them aborts the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("`{0}` is defined more than once")]
    DuplicateSymbol(String),

    #[error("menu option from node `{origin}` to `{destination}` has no caption")]
    EmptyOptionCaption { origin: Id, destination: String },

    #[error("pin `{from}` connects to unknown pin `{pin}`")]
    InvalidPinReference { from: Id, pin: Id },

    #[error("pin chain starting at `{start}` runs into a cycle at pin `{pin}`")]
    CyclicPinChain { start: Id, pin: Id },

    #[error("variable `{namespace}.{variable}` has unsupported type `{kind}`")]
    UnsupportedVariableType {
        namespace: String,
        variable: String,
        kind: String,
    },

    #[error("variable `{namespace}.{variable}` has invalid integer value `{value}`")]
    InvalidVariableValue {
        namespace: String,
        variable: String,
        value: String,
    },
}
