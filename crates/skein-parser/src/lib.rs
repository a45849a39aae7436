//! # Skein Parser
//!
//! Loading side of the Skein narrative graph compiler:
//!
//! - [`parse`] reads an articy:draft JSON export into a
//!   [`skein_core::project::Project`], reporting malformed input as
//!   [`error::ParseError`] diagnostics with error codes and source spans.
//! - [`directive::parse_directives`] reads the small `key="value"`, flag and
//!   priority language authors write into a node's stage directions.
//!
//! ## Usage
//!
//! ```
//! # use skein_parser::error::ParseError;
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"{
//!         "Packages": [{ "Models": [] }],
//!         "Hierarchy": { "Children": [ { "Type": "Flow" } ] }
//!     }"#;
//!
//!     let project = skein_parser::parse(source)?;
//!     assert!(project.graph().is_empty());
//!     Ok(())
//! }
//! ```

pub mod directive;
pub mod error;
mod export;
mod span;

pub use export::parse;
pub use span::Span;
