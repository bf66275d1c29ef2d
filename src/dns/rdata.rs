use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use bytes::Bytes;

use super::enums::{RRClass, RRType};
use super::name::Name;

/// A single resource record payload in canonical wire form, tagged with
/// the type and class it was built for.
///
/// Equality is value equality on the wire bytes (plus the type tag); the
/// class is a label and does not participate. The class tag itself is
/// immutable — moving an rdata to another class goes through
/// [`Rdata::to_class`], which rebuilds from the wire bytes so that
/// unknown-type payloads survive the conversion unchanged.
#[derive(Debug, Clone)]
pub struct Rdata {
    rtype: RRType,
    class: RRClass,
    wire: Bytes,
}

impl Rdata {
    pub fn from_wire(rtype: RRType, class: RRClass, wire: impl Into<Bytes>) -> Self {
        Rdata {
            rtype,
            class,
            wire: wire.into(),
        }
    }

    pub fn rtype(&self) -> RRType {
        self.rtype
    }

    pub fn class(&self) -> RRClass {
        self.class
    }

    pub fn wire(&self) -> &[u8] {
        &self.wire
    }

    /// The same payload under a different class tag.
    pub fn to_class(&self, class: RRClass) -> Rdata {
        Rdata {
            rtype: self.rtype,
            class,
            wire: self.wire.clone(),
        }
    }

    pub fn a(class: RRClass, addr: Ipv4Addr) -> Self {
        Self::from_wire(RRType::A, class, addr.octets().to_vec())
    }

    pub fn aaaa(class: RRClass, addr: Ipv6Addr) -> Self {
        Self::from_wire(RRType::AAAA, class, addr.octets().to_vec())
    }

    pub fn ns(class: RRClass, target: &Name) -> Self {
        Self::from_wire(RRType::NS, class, target.to_wire())
    }

    pub fn cname(class: RRClass, target: &Name) -> Self {
        Self::from_wire(RRType::CNAME, class, target.to_wire())
    }

    pub fn ptr(class: RRClass, target: &Name) -> Self {
        Self::from_wire(RRType::PTR, class, target.to_wire())
    }

    /// TXT rdata; the text is split into 255-octet character strings.
    pub fn txt(class: RRClass, text: &str) -> Self {
        let mut wire = Vec::with_capacity(text.len() + 1);
        for chunk in text.as_bytes().chunks(255) {
            wire.push(chunk.len() as u8);
            wire.extend_from_slice(chunk);
        }
        Self::from_wire(RRType::TXT, class, wire)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn soa(
        class: RRClass,
        mname: &Name,
        rname: &Name,
        serial: u32,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum: u32,
    ) -> Self {
        let mut wire = mname.to_wire();
        wire.extend_from_slice(&rname.to_wire());
        for value in [serial, refresh, retry, expire, minimum] {
            wire.extend_from_slice(&value.to_be_bytes());
        }
        Self::from_wire(RRType::SOA, class, wire)
    }

    /// Extract the serial from an SOA payload. Returns `None` for
    /// non-SOA rdata or a truncated payload.
    pub fn soa_serial(&self) -> Option<u32> {
        if self.rtype != RRType::SOA {
            return None;
        }
        let wire = &self.wire;
        let mut pos = skip_wire_name(wire, 0)?;
        pos = skip_wire_name(wire, pos)?;
        let bytes = wire.get(pos..pos + 4)?;
        Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

fn skip_wire_name(wire: &[u8], mut pos: usize) -> Option<usize> {
    loop {
        let len = *wire.get(pos)? as usize;
        pos += 1;
        if len == 0 {
            return Some(pos);
        }
        pos += len;
    }
}

impl PartialEq for Rdata {
    fn eq(&self, other: &Self) -> bool {
        self.rtype == other.rtype && self.wire == other.wire
    }
}

impl Eq for Rdata {}

impl fmt::Display for Rdata {
    /// RFC 3597 generic form: `\# <length> <hex>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\\# {}", self.wire.len())?;
        if !self.wire.is_empty() {
            write!(f, " ")?;
            for byte in &self.wire {
                write!(f, "{:02x}", byte)?;
            }
        }
        Ok(())
    }
}
