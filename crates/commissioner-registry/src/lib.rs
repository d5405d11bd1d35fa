//! The persisted catalog of discovered Border Routers, Networks and Domains
//! (spec §3, §4.1): a single-file JSON store with referential-integrity
//! invariants, alias resolution, and a "currently selected network" cursor.

pub mod alias;
pub mod registry;
pub mod store;

pub use alias::{AliasResolution, DomainAliasOutcome, GroupAliasConflict, SingleAliasOutcome};
pub use registry::{NetworkPredicate, Registry};
pub use store::StoreFile;
