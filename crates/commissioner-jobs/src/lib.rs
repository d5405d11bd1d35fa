//! Fan-out command execution (spec §4.2): per-network Session pool,
//! credential resolution, a worker-per-job thread model, and result
//! aggregation.

pub mod credentials;
pub mod evaluator;
pub mod job;
pub mod manager;
pub mod session;
pub mod value;

pub use credentials::{CredentialKind, CredentialStore, DirCredentialStore, ResolvedCredentials};
pub use job::{Job, JobState};
pub use manager::JobManager;
pub use session::{Session, SessionFactory};
pub use value::Value;
