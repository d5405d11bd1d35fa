use serde::{Deserialize, Serialize};
use std::fmt;

/// Monotonically assigned entity identity (spec §3). `EMPTY` is the sentinel
/// meaning "no entity" - mirrors the `cur_nwk: -1` convention of the
/// persisted store format (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub i64);

impl EntityId {
    pub const EMPTY: EntityId = EntityId(-1);

    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// 64-bit Extended PAN ID. Serializes as a JSON number internally, but a
/// `BorderRouter`'s network reference is serialized as a 16-digit lowercase
/// hex string on the wire (spec §6) via `Xpan::to_hex`/`Xpan::from_hex`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Xpan(pub u64);

impl Xpan {
    pub const EMPTY: Xpan = Xpan(0);

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// 16-digit lowercase hex, as used for job-aggregate keys (spec §4.2) and
    /// the persisted store's border-router network reference (spec §6).
    pub fn to_hex(&self) -> String {
        format!("{:016x}", self.0)
    }

    pub fn from_hex(s: &str) -> Option<Xpan> {
        let s = s.trim_start_matches("0x").trim_start_matches("0X");
        u64::from_str_radix(s, 16).ok().map(Xpan)
    }
}

impl fmt::Display for Xpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// 16-bit legacy PAN ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pan(pub u16);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xpan_hex_round_trips() {
        let x = Xpan(0x1122_3344_5566_7788);
        assert_eq!(x.to_hex(), "1122334455667788");
        assert_eq!(Xpan::from_hex("1122334455667788"), Some(x));
        assert_eq!(Xpan::from_hex("0x1122334455667788"), Some(x));
    }

    #[test]
    fn entity_id_default_is_empty() {
        assert_eq!(EntityId::default(), EntityId::EMPTY);
        assert!(EntityId::EMPTY.is_empty());
    }
}
