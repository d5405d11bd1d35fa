use std::fmt;

use commissioner_types::Result;

use crate::value::Value;

/// A single-network capability: the Job Manager's only window into the
/// wire protocol (spec §4.2 "External contract of a Session"). The core
/// never implements DTLS/CoAP itself - it only defines this seam and
/// expects a concrete implementation to be plugged in below it.
///
/// `Start` may block until the handshake completes or fails. `CancelRequests`
/// must be callable from any thread and must cause any in-flight operation
/// on this Session to return a cancellation error.
pub trait Session: Send + Sync + fmt::Debug {
    fn start(&self, address: &str, port: u16) -> Result<()>;
    fn stop(&self) -> Result<()>;
    fn cancel_requests(&self);
    fn is_active(&self) -> bool;

    fn session_id(&self) -> Result<Value>;

    fn bbr_dataset_get(&self) -> Result<Value>;
    fn comm_dataset_get(&self) -> Result<Value>;
    fn opdataset_get_active(&self) -> Result<Value>;
    fn opdataset_get_pending(&self) -> Result<Value>;
    fn opdataset_set_security_policy(&self, args: &[String]) -> Result<Value>;
    fn opdataset_set_active(&self, args: &[String]) -> Result<Value>;
    fn opdataset_set_pending(&self, args: &[String]) -> Result<Value>;

    fn token_request(&self) -> Result<Value>;

    /// Escape hatch for verbs not named individually in the contract above
    /// (joiner management and similar long-tail commands).
    fn invoke(&self, verb: &str, args: &[String]) -> Result<Value>;
}

/// Builds a fresh `Session` for a network, given the credentials the
/// manager has already resolved for it (spec §4.2 "Credential resolution").
/// Kept separate from `Session` itself so test code can substitute a mock
/// factory without touching the rest of the pool machinery.
pub trait SessionFactory: Send + Sync {
    fn new_session(&self, credentials: &crate::credentials::ResolvedCredentials) -> Box<dyn Session>;
}
