//! Thin interactive shell. Reads commands from stdin, parses them with
//! the interpreter, and routes them through the `Dispatcher`. The
//! console/TTY experience (coloring, history, completion) is explicitly
//! out of core scope; this only wires the pieces together.

use std::sync::Arc;

use clap::Parser;
use commissioner::{Cli, Config, Dispatcher};
use commissioner_jobs::{DirCredentialStore, JobManager};
use commissioner_registry::Registry;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::EnvFilter;

struct NullFactory;

impl commissioner_jobs::SessionFactory for NullFactory {
    fn new_session(
        &self,
        _credentials: &commissioner_jobs::ResolvedCredentials,
    ) -> Box<dyn commissioner_jobs::Session> {
        unimplemented!("wiring a concrete Session (DTLS/CoAP transport) is outside this crate's scope")
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from(cli);
    init_logging(config.verbose);

    let registry = Arc::new(Registry::open(&config.registry_path)?);
    let credential_store = Arc::new(DirCredentialStore::new(config.credential_root.clone()));
    let jobs = Arc::new(JobManager::new(
        Arc::clone(&registry),
        credential_store,
        Arc::new(NullFactory),
    ));
    let dispatcher = Dispatcher::new(registry, jobs);
    let default_scan_timeout = config.discovery_timeout;
    let interface = config.discovery_interface.clone();

    let mut rl = DefaultEditor::new()?;
    loop {
        match rl.readline("> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                rl.add_history_entry(trimmed)?;
                if trimmed == "exit" || trimmed == "quit" {
                    break;
                }

                match commissioner::interpreter::parse(trimmed) {
                    Ok(cmd) if cmd.verb == "br scan" => {
                        let timeout = cmd
                            .selectors
                            .timeout_ms
                            .map(std::time::Duration::from_millis)
                            .unwrap_or(default_scan_timeout);
                        match dispatcher.scan(timeout, interface.clone()) {
                            Ok(count) => println!("{{\"discovered\": {count}}}"),
                            Err(e) => eprintln!("error: {e}"),
                        }
                    }
                    Ok(cmd) => match dispatcher.run(&cmd) {
                        Ok(value) => println!("{value}"),
                        Err(e) => eprintln!("error: {e}"),
                    },
                    Err(e) => eprintln!("error: {e}"),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("readline error: {e}");
                break;
            }
        }
    }

    Ok(())
}
