//! mDNS `_meshcop._udp` Border-Agent discovery (spec §4.4): broadcasts a
//! PTR query, decodes PTR/SRV/A/AAAA/TXT answers into `BorderAgent`
//! records, and delivers them to a caller-supplied handler as they
//! complete.

pub mod engine;
pub mod query;
pub mod txt;
pub mod wire;

pub use engine::{discover, DiscoverySession, DEFAULT_TIMEOUT};
