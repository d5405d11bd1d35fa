//! The command interpreter's parse/validate layer (spec §4.3): turns a
//! raw command line into a residual expression, a multi-network
//! selector set, and import/export file lists.

pub mod lexer;
pub mod parse;
pub mod selector;
pub mod tables;

pub use parse::{parse, ParsedCommand};
pub use selector::Selectors;
