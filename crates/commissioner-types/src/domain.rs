use crate::ids::EntityId;
use serde::{Deserialize, Serialize};

/// An administrative label grouping one or more Networks (spec §3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub id: EntityId,
    pub name: String,
}

impl Domain {
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Domain {
            id,
            name: name.into(),
        }
    }
}
