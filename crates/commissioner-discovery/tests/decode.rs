use commissioner_discovery::wire::{parse_message, RData};

fn name(labels: &[&str]) -> Vec<u8> {
    let mut out = Vec::new();
    for label in labels {
        out.push(label.len() as u8);
        out.extend_from_slice(label.as_bytes());
    }
    out.push(0);
    out
}

fn header(ancount: u16) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&0u16.to_be_bytes()); // id
    out.extend_from_slice(&0x8400u16.to_be_bytes()); // response flags
    out.extend_from_slice(&0u16.to_be_bytes()); // qdcount
    out.extend_from_slice(&ancount.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes()); // nscount
    out.extend_from_slice(&0u16.to_be_bytes()); // arcount
    out
}

#[test]
fn decodes_a_record_answer() {
    let mut msg = header(1);
    msg.extend_from_slice(&name(&["host", "local"]));
    msg.extend_from_slice(&1u16.to_be_bytes()); // type A
    msg.extend_from_slice(&1u16.to_be_bytes()); // class IN
    msg.extend_from_slice(&120u32.to_be_bytes()); // ttl
    msg.extend_from_slice(&4u16.to_be_bytes()); // rdlength
    msg.extend_from_slice(&[10, 0, 0, 1]);

    let records = parse_message(&msg).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "host.local");
    match records[0].rdata {
        RData::A(addr) => assert_eq!(addr.to_string(), "10.0.0.1"),
        _ => panic!("expected an A record"),
    }
}

#[test]
fn decodes_txt_record_answer() {
    let mut msg = header(1);
    msg.extend_from_slice(&name(&["border-agent-1", "_meshcop", "_udp", "local"]));
    msg.extend_from_slice(&16u16.to_be_bytes()); // type TXT
    msg.extend_from_slice(&1u16.to_be_bytes());
    msg.extend_from_slice(&120u32.to_be_bytes());

    let entry = b"nn=net1";
    let mut rdata = Vec::new();
    rdata.push(entry.len() as u8);
    rdata.extend_from_slice(entry);

    msg.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
    msg.extend_from_slice(&rdata);

    let records = parse_message(&msg).unwrap();
    assert_eq!(records.len(), 1);
    match &records[0].rdata {
        RData::Txt(pairs) => {
            assert_eq!(pairs.len(), 1);
            assert_eq!(pairs[0].0, "nn");
            assert_eq!(pairs[0].1, b"net1");
        }
        _ => panic!("expected a TXT record"),
    }
}
