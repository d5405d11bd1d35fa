use crate::ids::Xpan;
use serde::{Deserialize, Serialize};

/// The five bit-fields packed into a border agent's 32-bit connectivity
/// state (spec §3, wire layout in spec §4.4's `sb` TXT key).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateBitmap {
    /// 3 bits: how the agent accepts a Commissioner petition.
    pub connection_mode: ConnectionMode,
    /// 2 bits.
    pub thread_if_status: ThreadIfStatus,
    /// 2 bits.
    pub availability: Availability,
    pub bbr_is_active: bool,
    pub bbr_is_primary: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ConnectionMode {
    #[default]
    Disallowed = 0,
    Pskc = 1,
    Pskd = 2,
    Vendor = 3,
    X509 = 4,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ThreadIfStatus {
    #[default]
    Unknown = 0,
    Initialized = 1,
    Active = 2,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Availability {
    #[default]
    Infrequent = 0,
    High = 1,
}

impl ConnectionMode {
    fn from_bits(b: u8) -> Self {
        match b & 0x7 {
            1 => ConnectionMode::Pskc,
            2 => ConnectionMode::Pskd,
            3 => ConnectionMode::Vendor,
            4 => ConnectionMode::X509,
            _ => ConnectionMode::Disallowed,
        }
    }

    pub fn is_disallowed(&self) -> bool {
        matches!(self, ConnectionMode::Disallowed)
    }

    pub fn requires_certificate(&self) -> bool {
        matches!(self, ConnectionMode::Vendor | ConnectionMode::X509)
    }

    pub fn requires_pskc(&self) -> bool {
        matches!(self, ConnectionMode::Vendor | ConnectionMode::Pskc)
    }
}

impl ThreadIfStatus {
    fn from_bits(b: u8) -> Self {
        match b & 0x3 {
            1 => ThreadIfStatus::Initialized,
            2 => ThreadIfStatus::Active,
            _ => ThreadIfStatus::Unknown,
        }
    }
}

impl Availability {
    fn from_bits(b: u8) -> Self {
        match b & 0x3 {
            1 => Availability::High,
            _ => Availability::Infrequent,
        }
    }
}

impl StateBitmap {
    /// Decode the packed 32-bit `sb` TXT value (spec §4.4): byte 3 carries
    /// connection_mode/thread_if_status/availability/bbr_is_active, byte 2's
    /// bit 0 carries bbr_is_primary. Lossless and deterministic both ways.
    pub fn from_u32(v: u32) -> Self {
        let byte3 = ((v >> 24) & 0xff) as u8;
        let byte2 = ((v >> 16) & 0xff) as u8;
        StateBitmap {
            connection_mode: ConnectionMode::from_bits(byte3),
            thread_if_status: ThreadIfStatus::from_bits(byte3 >> 3),
            availability: Availability::from_bits(byte3 >> 5),
            bbr_is_active: (byte3 >> 7) & 0x1 != 0,
            bbr_is_primary: byte2 & 0x1 != 0,
        }
    }

    pub fn to_u32(&self) -> u32 {
        let mut byte3: u8 = 0;
        byte3 |= match self.connection_mode {
            ConnectionMode::Disallowed => 0,
            ConnectionMode::Pskc => 1,
            ConnectionMode::Pskd => 2,
            ConnectionMode::Vendor => 3,
            ConnectionMode::X509 => 4,
        };
        byte3 |= (match self.thread_if_status {
            ThreadIfStatus::Unknown => 0u8,
            ThreadIfStatus::Initialized => 1,
            ThreadIfStatus::Active => 2,
        }) << 3;
        byte3 |= (match self.availability {
            Availability::Infrequent => 0u8,
            Availability::High => 1,
        }) << 5;
        byte3 |= (self.bbr_is_active as u8) << 7;
        let byte2: u8 = self.bbr_is_primary as u8;
        ((byte3 as u32) << 24) | ((byte2 as u32) << 16)
    }
}

/// `{seconds:48, ticks:15, u:1}` Thread active/pending timestamp (spec §3).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveTimestamp {
    pub seconds: u64, // only the low 48 bits are meaningful
    pub ticks: u16,   // only the low 15 bits are meaningful
    pub u: bool,
}

impl ActiveTimestamp {
    /// Decode the 8-byte big-endian `at` TXT value (spec §4.4).
    pub fn from_be_bytes(b: [u8; 8]) -> Self {
        let raw = u64::from_be_bytes(b);
        ActiveTimestamp {
            seconds: raw >> 16,
            ticks: ((raw >> 1) & 0x7fff) as u16,
            u: raw & 0x1 != 0,
        }
    }

    pub fn to_be_bytes(&self) -> [u8; 8] {
        let raw = (self.seconds << 16) | (((self.ticks & 0x7fff) as u64) << 1) | (self.u as u64);
        raw.to_be_bytes()
    }
}

/// One bit per optional field of `BorderAgent`, computed on demand rather
/// than hand-maintained alongside the `Option` fields it mirrors - the
/// `Option`s are the source of truth; this is only a wire-compatible view
/// of them for callers that want the bitmask form spec.md's wire table
/// describes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresentFlags(pub u32);

pub mod present_bit {
    pub const NETWORK_NAME: u32 = 1 << 0;
    pub const EXTENDED_PAN_ID: u32 = 1 << 1;
    pub const VENDOR_NAME: u32 = 1 << 2;
    pub const MODEL_NAME: u32 = 1 << 3;
    pub const ACTIVE_TIMESTAMP: u32 = 1 << 4;
    pub const PARTITION_ID: u32 = 1 << 5;
    pub const VENDOR_DATA: u32 = 1 << 6;
    pub const VENDOR_OUI: u32 = 1 << 7;
    pub const DOMAIN_NAME: u32 = 1 << 8;
    pub const BBR_SEQ_NUMBER: u32 = 1 << 9;
    pub const BBR_PORT: u32 = 1 << 10;
    pub const DISCRIMINATOR: u32 = 1 << 11;
    pub const SERVICE_NAME: u32 = 1 << 12;
    pub const UPDATE_TIMESTAMP: u32 = 1 << 13;
}

/// A discovered or user-supplied record of a physical border-router endpoint
/// (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorderAgent {
    pub address: String,
    pub port: u16,
    pub thread_version: String,
    pub state_bitmap: StateBitmap,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_name: Option<String>,
    /// Serialized as a 16-digit lowercase hex string when this agent is
    /// embedded in a persisted `BorderRouter` (spec §6), unlike `Network::xpan`
    /// which is a plain JSON number.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "xpan_hex_opt"
    )]
    pub extended_pan_id: Option<Xpan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_timestamp: Option<ActiveTimestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_id: Option<u32>,
    /// Requires `vendor_oui` also present (spec §3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_oui: Option<[u8; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbr_seq_number: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbr_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<[u8; 8]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_timestamp: Option<i64>,
}

impl BorderAgent {
    pub fn new(address: impl Into<String>, port: u16, thread_version: impl Into<String>) -> Self {
        BorderAgent {
            address: address.into(),
            port,
            thread_version: thread_version.into(),
            state_bitmap: StateBitmap::default(),
            network_name: None,
            extended_pan_id: None,
            vendor_name: None,
            model_name: None,
            active_timestamp: None,
            partition_id: None,
            vendor_data: None,
            vendor_oui: None,
            domain_name: None,
            bbr_seq_number: None,
            bbr_port: None,
            discriminator: None,
            service_name: None,
            update_timestamp: None,
        }
    }

    /// Wire-compatible bitmask view of which optional fields are present
    /// (spec §3's `present_flags`).
    pub fn present_flags(&self) -> PresentFlags {
        use present_bit::*;
        let mut bits = 0u32;
        if self.network_name.is_some() {
            bits |= NETWORK_NAME;
        }
        if self.extended_pan_id.is_some() {
            bits |= EXTENDED_PAN_ID;
        }
        if self.vendor_name.is_some() {
            bits |= VENDOR_NAME;
        }
        if self.model_name.is_some() {
            bits |= MODEL_NAME;
        }
        if self.active_timestamp.is_some() {
            bits |= ACTIVE_TIMESTAMP;
        }
        if self.partition_id.is_some() {
            bits |= PARTITION_ID;
        }
        if self.vendor_data.is_some() {
            bits |= VENDOR_DATA;
        }
        if self.vendor_oui.is_some() {
            bits |= VENDOR_OUI;
        }
        if self.domain_name.is_some() {
            bits |= DOMAIN_NAME;
        }
        if self.bbr_seq_number.is_some() {
            bits |= BBR_SEQ_NUMBER;
        }
        if self.bbr_port.is_some() {
            bits |= BBR_PORT;
        }
        if self.discriminator.is_some() {
            bits |= DISCRIMINATOR;
        }
        if self.service_name.is_some() {
            bits |= SERVICE_NAME;
        }
        if self.update_timestamp.is_some() {
            bits |= UPDATE_TIMESTAMP;
        }
        PresentFlags(bits)
    }
}

mod xpan_hex_opt {
    use super::Xpan;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(v: &Option<Xpan>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match v {
            Some(x) => s.serialize_some(&x.to_hex()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Option<Xpan>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw {
            Some(s) => Xpan::from_hex(&s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid xpan hex: {s}"))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extended_pan_id_serializes_as_hex_string() {
        let mut ba = BorderAgent::new("127.0.0.1", 49191, "1.2");
        ba.extended_pan_id = Some(Xpan(0x1122_3344_5566_7788));
        let v = serde_json::to_value(&ba).unwrap();
        assert_eq!(v["extended_pan_id"], "1122334455667788");
        let back: BorderAgent = serde_json::from_value(v).unwrap();
        assert_eq!(back.extended_pan_id, ba.extended_pan_id);
    }

    #[test]
    fn state_bitmap_round_trips_through_u32() {
        let sb = StateBitmap {
            connection_mode: ConnectionMode::X509,
            thread_if_status: ThreadIfStatus::Active,
            availability: Availability::High,
            bbr_is_active: true,
            bbr_is_primary: true,
        };
        let packed = sb.to_u32();
        assert_eq!(StateBitmap::from_u32(packed), sb);
    }

    #[test]
    fn active_timestamp_round_trips() {
        let ts = ActiveTimestamp {
            seconds: 0x0000_dead_beef,
            ticks: 0x1234 & 0x7fff,
            u: true,
        };
        assert_eq!(ActiveTimestamp::from_be_bytes(ts.to_be_bytes()), ts);
    }

    #[test]
    fn present_flags_reflect_populated_fields() {
        let mut ba = BorderAgent::new("127.0.0.1", 49191, "1.2");
        assert_eq!(ba.present_flags().0, 0);
        ba.network_name = Some("net1".into());
        ba.extended_pan_id = Some(Xpan(1));
        assert_eq!(
            ba.present_flags().0,
            present_bit::NETWORK_NAME | present_bit::EXTENDED_PAN_ID
        );
    }
}
