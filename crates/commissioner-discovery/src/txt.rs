//! Decodes the `_meshcop._udp` TXT key set into a `BorderAgent` (spec
//! §4.4's wire-format table).

use commissioner_types::{ActiveTimestamp, BorderAgent, StateBitmap, Xpan};

fn as_str(v: &[u8]) -> String {
    String::from_utf8_lossy(v).into_owned()
}

/// Applies one decoded `(key, value)` TXT pair onto `agent`. Unknown
/// keys and malformed lengths are ignored rather than rejecting the
/// whole record - a partially-decoded BorderAgent is still useful.
pub fn apply_txt_pair(agent: &mut BorderAgent, key: &str, value: &[u8]) {
    match key {
        "rv" => {
            if value != b"1" {
                tracing::warn!(value = %as_str(value), "unexpected rv (version) TXT value");
            }
        }
        "dd" if value.len() == 8 => {
            let mut discriminator = [0u8; 8];
            discriminator.copy_from_slice(value);
            agent.discriminator = Some(discriminator);
        }
        "tv" => agent.thread_version = as_str(value),
        "sb" if value.len() == 4 => {
            let raw = u32::from_be_bytes([value[0], value[1], value[2], value[3]]);
            agent.state_bitmap = StateBitmap::from_u32(raw);
        }
        "nn" => agent.network_name = Some(as_str(value)),
        "xp" if value.len() == 8 => {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(value);
            agent.extended_pan_id = Some(Xpan(u64::from_be_bytes(bytes)));
        }
        "vn" => agent.vendor_name = Some(as_str(value)),
        "mn" => agent.model_name = Some(as_str(value)),
        "at" if value.len() == 8 => {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(value);
            agent.active_timestamp = Some(ActiveTimestamp::from_be_bytes(bytes));
        }
        "pt" if value.len() == 4 => {
            agent.partition_id = Some(u32::from_be_bytes([value[0], value[1], value[2], value[3]]));
        }
        "vd" => agent.vendor_data = Some(as_str(value)),
        "vo" if value.len() == 3 => {
            agent.vendor_oui = Some([value[0], value[1], value[2]]);
        }
        "dn" => agent.domain_name = Some(as_str(value)),
        "sq" if value.len() == 1 => agent.bbr_seq_number = Some(value[0]),
        "bb" if value.len() == 2 => {
            agent.bbr_port = Some(u16::from_be_bytes([value[0], value[1]]));
        }
        _ => {}
    }
}

/// True once at least one of the optional fields this function covers
/// has been populated - used to decide whether `update_timestamp`
/// should be stamped on the record (spec §4.4: "Any record with at
/// least one present flag also gets `update_timestamp` set").
pub fn any_field_present(agent: &BorderAgent) -> bool {
    agent.present_flags().0 != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_network_name_and_xpan() {
        let mut agent = BorderAgent::new("0.0.0.0", 0, "");
        apply_txt_pair(&mut agent, "nn", b"net1");
        apply_txt_pair(&mut agent, "xp", &0x1122_3344_5566_7788u64.to_be_bytes());
        assert_eq!(agent.network_name.as_deref(), Some("net1"));
        assert_eq!(agent.extended_pan_id, Some(Xpan(0x1122_3344_5566_7788)));
        assert!(any_field_present(&agent));
    }

    #[test]
    fn decodes_state_bitmap() {
        let mut agent = BorderAgent::new("0.0.0.0", 0, "");
        let sb = StateBitmap {
            connection_mode: commissioner_types::ConnectionMode::X509,
            thread_if_status: commissioner_types::ThreadIfStatus::Active,
            availability: commissioner_types::Availability::High,
            bbr_is_active: true,
            bbr_is_primary: true,
        };
        apply_txt_pair(&mut agent, "sb", &sb.to_u32().to_be_bytes());
        assert_eq!(agent.state_bitmap, sb);
    }

    #[test]
    fn unknown_key_is_ignored() {
        let mut agent = BorderAgent::new("0.0.0.0", 0, "");
        apply_txt_pair(&mut agent, "zz", b"whatever");
        assert!(!any_field_present(&agent));
    }
}
