//! Builds the one outbound packet this engine ever sends: a PTR query
//! for `_meshcop._udp.local` (spec §4.4).

const MESHCOP_SERVICE: &str = "_meshcop._udp.local";
const QTYPE_PTR: u16 = 12;
const QCLASS_IN: u16 = 1;

fn encode_name(name: &str) -> Vec<u8> {
    let mut out = Vec::new();
    for label in name.split('.') {
        out.push(label.len() as u8);
        out.extend_from_slice(label.as_bytes());
    }
    out.push(0);
    out
}

/// A one-question mDNS query message: header (id=0, no flags, qdcount=1)
/// followed by the `_meshcop._udp.local` PTR question.
pub fn build_ptr_query() -> Vec<u8> {
    let mut buf = Vec::with_capacity(32);
    buf.extend_from_slice(&0u16.to_be_bytes()); // id
    buf.extend_from_slice(&0u16.to_be_bytes()); // flags: standard query
    buf.extend_from_slice(&1u16.to_be_bytes()); // qdcount
    buf.extend_from_slice(&0u16.to_be_bytes()); // ancount
    buf.extend_from_slice(&0u16.to_be_bytes()); // nscount
    buf.extend_from_slice(&0u16.to_be_bytes()); // arcount
    buf.extend_from_slice(&encode_name(MESHCOP_SERVICE));
    buf.extend_from_slice(&QTYPE_PTR.to_be_bytes());
    buf.extend_from_slice(&QCLASS_IN.to_be_bytes());
    buf
}

pub fn service_name() -> &'static str {
    MESHCOP_SERVICE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_carries_exactly_one_question() {
        let packet = build_ptr_query();
        assert_eq!(u16::from_be_bytes([packet[4], packet[5]]), 1);
        assert_eq!(u16::from_be_bytes([packet[6], packet[7]]), 0);
    }
}
