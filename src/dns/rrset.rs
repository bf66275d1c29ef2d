use std::fmt;

use thiserror::Error;

use super::enums::{RRClass, RRType};
use super::name::Name;
use super::rdata::Rdata;

/// Error pushed rdata does not carry the RRset's (type, class) tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("rdata tags do not match the rrset (type, class)")]
pub struct RdataMismatch;

/// A set of resource records sharing owner name, class, type and TTL.
///
/// All rdata in the set carry the set's (type, class). A set with zero
/// rdata is legal only inside an update message, where it serves as a
/// deletion sentinel; stored RRsets always have at least one.
#[derive(Debug, Clone, PartialEq)]
pub struct RRset {
    name: Name,
    class: RRClass,
    rtype: RRType,
    ttl: u32,
    rdatas: Vec<Rdata>,
}

impl RRset {
    /// An empty RRset (update deletion sentinel).
    pub fn new(name: Name, class: RRClass, rtype: RRType, ttl: u32) -> Self {
        RRset {
            name,
            class,
            rtype,
            ttl,
            rdatas: Vec::new(),
        }
    }

    /// A one-record RRset wrapping a single rdata; type and class are
    /// taken from the rdata's own tags.
    pub fn from_rdata(name: Name, ttl: u32, rdata: Rdata) -> Self {
        RRset {
            name,
            class: rdata.class(),
            rtype: rdata.rtype(),
            ttl,
            rdatas: vec![rdata],
        }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn class(&self) -> RRClass {
        self.class
    }

    pub fn rtype(&self) -> RRType {
        self.rtype
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    pub fn set_ttl(&mut self, ttl: u32) {
        self.ttl = ttl;
    }

    pub fn rdatas(&self) -> &[Rdata] {
        &self.rdatas
    }

    pub fn rdata_count(&self) -> usize {
        self.rdatas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rdatas.is_empty()
    }

    pub fn contains(&self, rdata: &Rdata) -> bool {
        self.rdatas.iter().any(|r| r == rdata)
    }

    /// Append an rdata, enforcing the tag invariant.
    pub fn push_rdata(&mut self, rdata: Rdata) -> Result<(), RdataMismatch> {
        if rdata.rtype() != self.rtype || rdata.class() != self.class {
            return Err(RdataMismatch);
        }
        self.rdatas.push(rdata);
        Ok(())
    }

    /// Remove the first rdata equal to the given one. Returns whether a
    /// record was removed.
    pub fn remove_rdata(&mut self, rdata: &Rdata) -> bool {
        match self.rdatas.iter().position(|r| r == rdata) {
            Some(pos) => {
                self.rdatas.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Decompose into one-record RRsets, one per rdata.
    ///
    /// The store and the diff speak whole RRsets while RFC 2136 reasons
    /// about individual RRs; this is the bridge between the two.
    pub fn single_rrs(&self) -> impl Iterator<Item = RRset> + '_ {
        self.rdatas
            .iter()
            .map(|rdata| RRset::from_rdata(self.name.clone(), self.ttl, rdata.clone()))
    }

    /// The same set re-tagged under another class. Rdata cannot change
    /// class in place, so each one is rebuilt from its wire form.
    pub fn to_class(&self, class: RRClass) -> RRset {
        RRset {
            name: self.name.clone(),
            class,
            rtype: self.rtype,
            ttl: self.ttl,
            rdatas: self.rdatas.iter().map(|r| r.to_class(class)).collect(),
        }
    }
}

impl fmt::Display for RRset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.name, self.ttl, self.class, self.rtype)?;
        for rdata in &self.rdatas {
            write!(f, " {}", rdata)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Name {
        s.parse().unwrap()
    }

    fn a(addr: &str) -> Rdata {
        Rdata::a(RRClass::IN, addr.parse().unwrap())
    }

    #[test]
    fn test_push_enforces_tags() {
        let mut rrset = RRset::new(name("www.example.org"), RRClass::IN, RRType::A, 300);
        assert!(rrset.push_rdata(a("192.0.2.1")).is_ok());
        assert_eq!(
            rrset.push_rdata(Rdata::txt(RRClass::IN, "nope")),
            Err(RdataMismatch)
        );
        assert_eq!(rrset.rdata_count(), 1);
    }

    #[test]
    fn test_single_rrs_decomposition() {
        let mut rrset = RRset::new(name("www.example.org"), RRClass::IN, RRType::A, 300);
        rrset.push_rdata(a("192.0.2.1")).unwrap();
        rrset.push_rdata(a("192.0.2.2")).unwrap();

        let singles: Vec<RRset> = rrset.single_rrs().collect();
        assert_eq!(singles.len(), 2);
        for single in &singles {
            assert_eq!(single.rdata_count(), 1);
            assert_eq!(single.name(), rrset.name());
            assert_eq!(single.ttl(), 300);
        }
        assert_eq!(singles[0].rdatas()[0], rrset.rdatas()[0]);
    }

    #[test]
    fn test_class_conversion() {
        let mut rrset = RRset::new(name("www.example.org"), RRClass::NONE, RRType::A, 0);
        rrset
            .push_rdata(a("192.0.2.1").to_class(RRClass::NONE))
            .unwrap();

        let converted = rrset.to_class(RRClass::IN);
        assert_eq!(converted.class(), RRClass::IN);
        assert_eq!(converted.rdatas()[0].class(), RRClass::IN);
        // value equality is preserved across the conversion
        assert!(converted.contains(&a("192.0.2.1")));
    }

    #[test]
    fn test_remove_rdata() {
        let mut rrset = RRset::new(name("www.example.org"), RRClass::IN, RRType::A, 300);
        rrset.push_rdata(a("192.0.2.1")).unwrap();
        assert!(rrset.remove_rdata(&a("192.0.2.1")));
        assert!(!rrset.remove_rdata(&a("192.0.2.1")));
        assert!(rrset.is_empty());
    }
}
