use crate::ids::{EntityId, Pan, Xpan};
use serde::{Deserialize, Serialize};

/// A Thread network known to the registry (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub id: EntityId,
    #[serde(default = "EntityId::default")]
    pub domain_id: EntityId,
    pub name: String,
    pub xpan: Xpan,
    pub channel: u16,
    pub pan: Pan,
    pub mesh_local_prefix: String,
    pub ccm: bool,
}

impl Network {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: EntityId,
        domain_id: EntityId,
        name: impl Into<String>,
        xpan: Xpan,
        channel: u16,
        pan: Pan,
        mesh_local_prefix: impl Into<String>,
        ccm: bool,
    ) -> Self {
        Network {
            id,
            domain_id,
            name: name.into(),
            xpan,
            channel,
            pan,
            mesh_local_prefix: mesh_local_prefix.into(),
            ccm,
        }
    }
}
