//! Foundation data structures shared by every commissioner-* crate: the four
//! first-class entities of the registry data model (spec §3), the error
//! taxonomy (spec §7), and the id/xpan/pan newtypes referenced throughout.

pub mod border_agent;
pub mod border_router;
pub mod domain;
pub mod error;
pub mod ids;
pub mod network;

pub use border_agent::{
    ActiveTimestamp, Availability, BorderAgent, ConnectionMode, PresentFlags, StateBitmap,
    ThreadIfStatus,
};
pub use border_router::BorderRouter;
pub use domain::Domain;
pub use error::{Error, ErrorKind, Result};
pub use ids::{EntityId, Pan, Xpan};
pub use network::Network;
