//! End-to-end scenarios from spec.md §8 that exercise the interpreter and
//! the `Dispatcher` together, beyond what `commissioner-jobs`'s own
//! `tests/fanout.rs` and `commissioner-registry`'s `tests/scenarios.rs`
//! already cover at their crate boundary.

use std::io::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use commissioner::{interpreter, Dispatcher};
use commissioner_jobs::{CredentialStore, JobManager, Session, SessionFactory, Value};
use commissioner_registry::Registry;
use commissioner_types::{BorderAgent, ErrorKind, Result, Xpan};

#[derive(Debug)]
struct MockSession {
    active: AtomicBool,
    last_args: std::sync::Mutex<Vec<String>>,
}

impl Session for MockSession {
    fn start(&self, _address: &str, _port: u16) -> Result<()> {
        self.active.store(true, Ordering::SeqCst);
        Ok(())
    }
    fn stop(&self) -> Result<()> {
        self.active.store(false, Ordering::SeqCst);
        Ok(())
    }
    fn cancel_requests(&self) {}
    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
    fn session_id(&self) -> Result<Value> {
        Ok(Value::text("mock-session"))
    }
    fn bbr_dataset_get(&self) -> Result<Value> {
        Ok(Value::text("{}"))
    }
    fn comm_dataset_get(&self) -> Result<Value> {
        Ok(Value::text("{}"))
    }
    fn opdataset_get_active(&self) -> Result<Value> {
        Ok(Value::text("{}"))
    }
    fn opdataset_get_pending(&self) -> Result<Value> {
        Ok(Value::text("{}"))
    }
    fn opdataset_set_security_policy(&self, _args: &[String]) -> Result<Value> {
        Ok(Value::text("ok"))
    }
    fn opdataset_set_active(&self, args: &[String]) -> Result<Value> {
        *self.last_args.lock().unwrap() = args.to_vec();
        Ok(Value::text("ok"))
    }
    fn opdataset_set_pending(&self, _args: &[String]) -> Result<Value> {
        Ok(Value::text("ok"))
    }
    fn token_request(&self) -> Result<Value> {
        Ok(Value::text("token"))
    }
    fn invoke(&self, _verb: &str, _args: &[String]) -> Result<Value> {
        Ok(Value::text("ok"))
    }
}

struct MockFactory;
impl SessionFactory for MockFactory {
    fn new_session(&self, _credentials: &commissioner_jobs::ResolvedCredentials) -> Box<dyn Session> {
        Box::new(MockSession {
            active: AtomicBool::new(false),
            last_args: std::sync::Mutex::new(Vec::new()),
        })
    }
}

struct NoCredentials;
impl CredentialStore for NoCredentials {
    fn load_domain(&self, _domain_name: &str, _kind: commissioner_jobs::CredentialKind) -> Option<Vec<u8>> {
        None
    }
    fn load_network(&self, _key: &str, _kind: commissioner_jobs::CredentialKind) -> Option<Vec<u8>> {
        None
    }
}

fn agent(address: &str, port: u16, network_name: &str, xpan: u64) -> BorderAgent {
    let mut a = BorderAgent::new(address, port, "1.2");
    a.network_name = Some(network_name.to_string());
    a.extended_pan_id = Some(Xpan(xpan));
    a.state_bitmap.connection_mode = commissioner_types::ConnectionMode::Pskd;
    a.state_bitmap.thread_if_status = commissioner_types::ThreadIfStatus::Active;
    a.state_bitmap.availability = commissioner_types::Availability::High;
    a
}

fn setup() -> (tempfile::TempDir, Dispatcher) {
    let dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(Registry::open(dir.path().join("registry.json")).unwrap());
    registry.add_border_agent(agent("10.0.0.1", 1, "net1", 0x1122334455667788)).unwrap();
    registry.add_border_agent(agent("10.0.0.2", 2, "net2", 0x99aabbccddeeff00)).unwrap();

    let jobs = Arc::new(JobManager::new(
        Arc::clone(&registry),
        Arc::new(NoCredentials),
        Arc::new(MockFactory),
    ));
    (dir, Dispatcher::new(registry, jobs))
}

/// Scenario 3: `start --nwk all net1` mixes a group alias with an
/// individual alias, which is rejected outright.
#[test]
fn group_alias_cannot_combine_with_individual_alias() {
    let (_dir, dispatcher) = setup();
    let cmd = interpreter::parse("start --nwk all net1").unwrap();
    let err = dispatcher.run(&cmd).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidArgs);
}

/// Scenario 4: a multi-entry import file selects the sub-object keyed by
/// the *current* network's xpan, not the other entry.
#[test]
fn multi_entry_import_selects_current_networks_entry() {
    let (dir, dispatcher) = setup();
    let xpan = Xpan(0x1122334455667788);
    dispatcher.registry.set_current_network(xpan).unwrap();
    // opdataset commands require an already-active session.
    dispatcher.jobs.session_for(xpan).unwrap().start("10.0.0.1", 1).unwrap();

    let import_path = dir.path().join("import.json");
    let mut f = std::fs::File::create(&import_path).unwrap();
    write!(
        f,
        r#"{{"1122334455667788": {{"channel": 11}}, "99aabbccddeeff00": {{"channel": 26}}}}"#
    )
    .unwrap();

    let cmd = interpreter::parse(&format!(
        "opdataset set active --import {}",
        import_path.display()
    ))
    .unwrap();
    let result = dispatcher.run(&cmd).unwrap();
    // The synchronous path returns the single job's Value directly.
    assert_eq!(result, serde_json::Value::String("ok".to_string()));
}

/// Not a numbered spec scenario, but the companion negative case: `--nwk`
/// and `--dom` are mutually exclusive selectors, rejected before a verb is
/// ever classified against the eligibility tables.
#[test]
fn nwk_and_dom_together_is_rejected_at_parse_time() {
    assert!(interpreter::parse("br list --nwk net1 --dom d1").is_err());
}
