//! Hand-rolled DNS message decoder, scoped to the record types mDNS
//! `_meshcop._udp` discovery actually produces (spec §4.4). Name
//! decompression needs random access into the whole datagram, which
//! doesn't fit a pure `nom` combinator over a single forward-moving
//! slice, so names are walked by hand while the fixed-width record
//! fields (type/class/ttl/rdlength, the A/AAAA/SRV payloads) are parsed
//! with `nom`, the same way the interpreter's own grammar is built from
//! small combinators.

use std::net::{Ipv4Addr, Ipv6Addr};

use nom::number::complete::{be_u16, be_u32};
use nom::IResult;

const PTR: u16 = 12;
const TXT: u16 = 16;
const AAAA: u16 = 28;
const SRV: u16 = 33;
const A: u16 = 1;

#[derive(Debug, Clone)]
pub enum RData {
    Ptr(String),
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Srv { target: String, port: u16 },
    Txt(Vec<(String, Vec<u8>)>),
    Other,
}

#[derive(Debug, Clone)]
pub struct ResourceRecord {
    pub name: String,
    pub rdata: RData,
}

/// Walks a (possibly compressed) DNS name starting at `offset` within
/// the full message `buf`. Returns the joined labels and the offset one
/// past the end of the name *as encoded at the starting position*
/// (pointer targets are not counted against that length).
fn read_name(buf: &[u8], mut offset: usize) -> Option<(String, usize)> {
    let mut labels = Vec::new();
    let start = offset;
    let mut jumped = false;
    let mut end_of_original = None;
    let mut hops = 0;

    loop {
        hops += 1;
        if hops > 128 {
            return None; // compression loop guard
        }
        let len = *buf.get(offset)?;
        if len == 0 {
            if !jumped {
                end_of_original = Some(offset + 1);
            }
            break;
        }
        if len & 0xc0 == 0xc0 {
            let b2 = *buf.get(offset + 1)? as usize;
            let pointer = (((len & 0x3f) as usize) << 8) | b2;
            if !jumped {
                end_of_original = Some(offset + 2);
            }
            jumped = true;
            offset = pointer;
            continue;
        }
        let len = len as usize;
        let label = buf.get(offset + 1..offset + 1 + len)?;
        labels.push(String::from_utf8_lossy(label).into_owned());
        offset += 1 + len;
    }

    let consumed = end_of_original.unwrap_or(offset + 1 - start);
    Some((labels.join("."), consumed))
}

fn parse_rr_fixed(i: &[u8]) -> IResult<&[u8], (u16, u16, u32, u16)> {
    let (i, rtype) = be_u16(i)?;
    let (i, class) = be_u16(i)?;
    let (i, ttl) = be_u32(i)?;
    let (i, rdlength) = be_u16(i)?;
    Ok((i, (rtype, class, ttl, rdlength)))
}

fn parse_txt_rdata(rdata: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut out = Vec::new();
    let mut pos = 0;
    while pos < rdata.len() {
        let len = rdata[pos] as usize;
        pos += 1;
        if len == 0 || pos + len > rdata.len() {
            break;
        }
        let entry = &rdata[pos..pos + len];
        pos += len;
        match entry.iter().position(|&b| b == b'=') {
            Some(eq) => out.push((
                String::from_utf8_lossy(&entry[..eq]).into_owned(),
                entry[eq + 1..].to_vec(),
            )),
            None => out.push((String::from_utf8_lossy(entry).into_owned(), Vec::new())),
        }
    }
    out
}

/// Parses every resource record out of a complete mDNS message
/// (header + questions + answers + authority + additional): this
/// discovery client only cares about the latter three sections and
/// treats them uniformly.
pub fn parse_message(buf: &[u8]) -> Option<Vec<ResourceRecord>> {
    let (rest, _id) = be_u16::<_, nom::error::Error<&[u8]>>(buf).ok()?;
    let (rest, _flags) = be_u16::<_, nom::error::Error<&[u8]>>(rest).ok()?;
    let (rest, qdcount) = be_u16::<_, nom::error::Error<&[u8]>>(rest).ok()?;
    let (rest, ancount) = be_u16::<_, nom::error::Error<&[u8]>>(rest).ok()?;
    let (rest, nscount) = be_u16::<_, nom::error::Error<&[u8]>>(rest).ok()?;
    let (rest, arcount) = be_u16::<_, nom::error::Error<&[u8]>>(rest).ok()?;

    let mut offset = buf.len() - rest.len();

    for _ in 0..qdcount {
        let (_, consumed) = read_name(buf, offset)?;
        offset = consumed;
        offset += 4; // qtype + qclass
    }

    let total_rr = ancount as usize + nscount as usize + arcount as usize;
    let mut records = Vec::with_capacity(total_rr);

    for _ in 0..total_rr {
        let (name, after_name) = read_name(buf, offset)?;
        offset = after_name;
        let (_, (rtype, _class, _ttl, rdlength)) = parse_rr_fixed(buf.get(offset..)?).ok()?;
        offset += 10;
        let rdata_bytes = buf.get(offset..offset + rdlength as usize)?;

        let rdata = match rtype {
            PTR => {
                let (target, _) = read_name(buf, offset)?;
                RData::Ptr(target)
            }
            A if rdata_bytes.len() == 4 => {
                RData::A(Ipv4Addr::new(rdata_bytes[0], rdata_bytes[1], rdata_bytes[2], rdata_bytes[3]))
            }
            AAAA if rdata_bytes.len() == 16 => {
                let mut octets = [0u8; 16];
                octets.copy_from_slice(rdata_bytes);
                RData::Aaaa(Ipv6Addr::from(octets))
            }
            SRV if rdata_bytes.len() >= 6 => {
                let port = u16::from_be_bytes([rdata_bytes[4], rdata_bytes[5]]);
                let (target, _) = read_name(buf, offset + 6)?;
                RData::Srv { target, port }
            }
            TXT => RData::Txt(parse_txt_rdata(rdata_bytes)),
            _ => RData::Other,
        };

        records.push(ResourceRecord { name, rdata });
        offset += rdlength as usize;
    }

    Some(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txt_record(pairs: &[(&str, &str)]) -> Vec<u8> {
        let mut out = Vec::new();
        for (k, v) in pairs {
            let entry = format!("{k}={v}");
            out.push(entry.len() as u8);
            out.extend_from_slice(entry.as_bytes());
        }
        out
    }

    #[test]
    fn txt_rdata_splits_key_value_pairs() {
        let raw = txt_record(&[("rv", "1"), ("tv", "1.2")]);
        let parsed = parse_txt_rdata(&raw);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].0, "rv");
        assert_eq!(parsed[0].1, b"1");
        assert_eq!(parsed[1].0, "tv");
        assert_eq!(parsed[1].1, b"1.2");
    }

    #[test]
    fn uncompressed_name_round_trips() {
        let mut buf = Vec::new();
        buf.push(7u8);
        buf.extend_from_slice(b"_meshco");
        buf.push(0u8);
        let (name, consumed) = read_name(&buf, 0).unwrap();
        assert_eq!(name, "_meshco");
        assert_eq!(consumed, buf.len());
    }

    #[test]
    fn compressed_name_follows_pointer() {
        let mut buf = Vec::new();
        buf.push(5u8);
        buf.extend_from_slice(b"local");
        buf.push(0u8);
        let pointer_offset = buf.len();
        buf.push(0xc0);
        buf.push(0x00);
        let (name, consumed) = read_name(&buf, pointer_offset).unwrap();
        assert_eq!(name, "local");
        assert_eq!(consumed, pointer_offset + 2);
    }
}
