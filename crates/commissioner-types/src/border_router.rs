use crate::border_agent::BorderAgent;
use crate::ids::EntityId;
use serde::{Deserialize, Serialize};

/// A registered BorderRouter: an embedded `BorderAgent` snapshot plus the
/// Network it currently belongs to (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorderRouter {
    pub id: EntityId,
    pub network_id: EntityId,
    pub agent: BorderAgent,
}

impl BorderRouter {
    pub fn new(id: EntityId, network_id: EntityId, agent: BorderAgent) -> Self {
        BorderRouter {
            id,
            network_id,
            agent,
        }
    }

    /// The natural key invariant uniqueness is checked against (spec §3):
    /// `(address, port, extended_pan_id)`.
    pub fn natural_key(&self) -> (&str, u16, Option<crate::ids::Xpan>) {
        (&self.agent.address, self.agent.port, self.agent.extended_pan_id)
    }
}
