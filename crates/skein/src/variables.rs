//! Named stores generated from the global variable namespaces.

use log::debug;

use skein_core::project::{VariableNamespace, VariableType};

use crate::{
    compile::Error,
    script::{Instruction, Script},
    symbols::SymbolTable,
    text,
};

/// Renders one `init python in <store>:` block per namespace.
///
/// Store names are the namespace names with a lower-case first letter and
/// are issued in `symbols`.
///
/// # Errors
///
/// Fails on a duplicate store name, on a variable type other than
/// `Boolean`, `Integer` or `String`, and on an integer value that does not
/// parse.
pub fn variables_script(
    namespaces: &[VariableNamespace],
    symbols: &mut SymbolTable,
) -> Result<Script, Error> {
    let mut script = Script::new();

    for namespace in namespaces {
        let store = store_name(&namespace.name);
        symbols.issue(store.as_str())?;

        let mut body: Vec<Instruction> = comments(&namespace.description);
        body.push(Instruction::Blank);

        for variable in &namespace.variables {
            let value = match &variable.kind {
                VariableType::Boolean => {
                    if variable.value.trim().eq_ignore_ascii_case("true") {
                        "True".to_string()
                    } else {
                        "False".to_string()
                    }
                }
                VariableType::Integer => variable
                    .value
                    .trim()
                    .parse::<i64>()
                    .map(|number| number.to_string())
                    .map_err(|_| Error::InvalidVariableValue {
                        namespace: namespace.name.clone(),
                        variable: variable.name.clone(),
                        value: variable.value.clone(),
                    })?,
                VariableType::String => text::python_string(&variable.value),
                VariableType::Other(kind) => {
                    return Err(Error::UnsupportedVariableType {
                        namespace: namespace.name.clone(),
                        variable: variable.name.clone(),
                        kind: kind.clone(),
                    });
                }
            };

            body.extend(comments(&variable.description));
            body.push(Instruction::Assign {
                name: variable.name.clone(),
                value,
            });
            body.push(Instruction::Blank);
        }

        debug!(store = store.as_str(), variables = namespace.variables.len(); "Store generated");
        script.push(Instruction::Store { name: store, body });
        script.push(Instruction::Blank);
    }

    Ok(script)
}

fn store_name(namespace: &str) -> String {
    let mut chars = namespace.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn comments(description: &str) -> Vec<Instruction> {
    text::comment_lines(description)
        .map(|line| Instruction::Comment(line.to_string()))
        .collect()
}
