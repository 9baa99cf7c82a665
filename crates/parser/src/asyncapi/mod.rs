//! AsyncAPI document parser
//!
//! Loads AsyncAPI documents (YAML or JSON) into a typed model.
//!
//! ## Usage
//! ```rust,ignore
//! use asyncapi_flogo_parser::{AsyncApiParser, CompileOptions};
//!
//! let parser = AsyncApiParser::from_file("asyncapi.yml")?;
//! let compilation = parser.compile(&CompileOptions::embedded()?)?;
//! ```

mod parser;
mod types;

pub use parser::AsyncApiParser;
pub use types::*;
