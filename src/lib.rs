//! Thread Network Commissioner core: Registry, Job Manager, Command
//! Interpreter and mDNS discovery wired together behind a single
//! `Dispatcher` entry point. The interactive shell lives in `src/bin`.

pub mod config;
pub mod dispatch;
pub mod interpreter;

pub use config::{Cli, Config};
pub use dispatch::Dispatcher;
