use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use commissioner_jobs::{CredentialStore, JobManager, Session, SessionFactory, Value};
use commissioner_registry::Registry;
use commissioner_types::{BorderAgent, Result, Xpan};

#[derive(Debug)]
struct MockSession {
    active: AtomicBool,
    fail_start: bool,
}

impl Session for MockSession {
    fn start(&self, _address: &str, _port: u16) -> Result<()> {
        if self.fail_start {
            return Err(commissioner_types::Error::timeout("mock start failed"));
        }
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

    fn opdataset_set_active(&self, _args: &[String]) -> Result<Value> {
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

struct MockFactory {
    calls: std::sync::atomic::AtomicUsize,
    fail_on_call: Option<usize>,
}

impl MockFactory {
    fn new() -> Self {
        MockFactory {
            calls: std::sync::atomic::AtomicUsize::new(0),
            fail_on_call: None,
        }
    }

    fn failing_second_session() -> Self {
        MockFactory {
            calls: std::sync::atomic::AtomicUsize::new(0),
            fail_on_call: Some(1),
        }
    }
}

impl SessionFactory for MockFactory {
    fn new_session(
        &self,
        _credentials: &commissioner_jobs::credentials::ResolvedCredentials,
    ) -> Box<dyn Session> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        Box::new(MockSession {
            active: AtomicBool::new(false),
            fail_start: self.fail_on_call == Some(call),
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

fn setup_with_factory(factory: MockFactory) -> (Arc<Registry>, Arc<JobManager>) {
    let dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(Registry::open(dir.path().join("registry.json")).unwrap());
    registry
        .add_border_agent(agent("10.0.0.1", 1, "net-a", 0xA))
        .unwrap();
    registry
        .add_border_agent(agent("10.0.0.2", 2, "net-b", 0xB))
        .unwrap();

    let manager = Arc::new(JobManager::new(
        Arc::clone(&registry),
        Arc::new(NoCredentials),
        Arc::new(factory),
    ));
    (registry, manager)
}

fn setup() -> (Arc<Registry>, Arc<JobManager>) {
    setup_with_factory(MockFactory::new())
}

#[test]
fn start_two_networks_both_succeed() {
    let (_registry, manager) = setup();
    manager
        .prepare_jobs(&[Xpan(0xA), Xpan(0xB)], "start", &[])
        .unwrap();
    manager.run_jobs();
    let aggregate = manager.collect_jobs_value();
    assert_eq!(aggregate.as_object().unwrap().len(), 2);
    assert!(aggregate.get(Xpan(0xA).to_hex()).is_some());
    assert!(aggregate.get(Xpan(0xB).to_hex()).is_some());
}

#[test]
fn stop_skips_network_with_no_session() {
    let (_registry, manager) = setup();
    // Start only A, so B never gets a Session.
    manager.prepare_jobs(&[Xpan(0xA)], "start", &[]).unwrap();
    manager.run_jobs();
    manager.cleanup_jobs();

    manager
        .prepare_jobs(&[Xpan(0xA), Xpan(0xB)], "stop", &[])
        .unwrap();
    manager.run_jobs();
    let aggregate = manager.collect_jobs_value();
    // Only A had an active session to stop.
    assert_eq!(aggregate.as_object().unwrap().len(), 1);
    assert!(aggregate.get(Xpan(0xA).to_hex()).is_some());
}

#[test]
fn start_two_networks_one_fails_aggregate_contains_only_the_success() {
    let (_registry, manager) = setup_with_factory(MockFactory::failing_second_session());
    manager
        .prepare_jobs(&[Xpan(0xA), Xpan(0xB)], "start", &[])
        .unwrap();
    manager.run_jobs();
    let aggregate = manager.collect_jobs_value();
    assert_eq!(aggregate.as_object().unwrap().len(), 1);
    assert!(aggregate.get(Xpan(0xA).to_hex()).is_some());
    assert!(aggregate.get(Xpan(0xB).to_hex()).is_none());
}

#[test]
fn pool_holds_one_session_per_xpan() {
    let (_registry, manager) = setup();
    let s1 = manager.session_for(Xpan(0xA)).unwrap();
    let s2 = manager.session_for(Xpan(0xA)).unwrap();
    assert!(Arc::ptr_eq(&s1, &s2));
}

#[test]
fn cleanup_jobs_returns_manager_to_clean() {
    let (_registry, manager) = setup();
    manager.prepare_jobs(&[Xpan(0xA)], "start", &[]).unwrap();
    assert!(!manager.is_clean());
    manager.run_jobs();
    manager.cleanup_jobs();
    assert!(manager.is_clean());
}
