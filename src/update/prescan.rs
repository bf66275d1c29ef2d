use std::net::SocketAddr;

use tracing::info;

use super::ZoneLabel;
use crate::dns::{Message, Name, RRClass, RRType, RRset, Rcode, Section};

/// Outcome of the prescan pass. On NOERROR, `added_soa` holds the
/// candidate replacement SOA when the update list adds one.
#[derive(Debug, Clone)]
pub struct PrescanResult {
    pub rcode: Rcode,
    pub added_soa: Option<RRset>,
}

impl PrescanResult {
    fn fail(rcode: Rcode) -> Self {
        PrescanResult {
            rcode,
            added_soa: None,
        }
    }
}

/// Validate the update section before any mutation (RFC 2136 section
/// 3.4.1): every record must be in-zone and carry a legal class, type
/// and TTL combination.
///
/// A SOA addition is captured per-rdata as a one-record RRset; if the
/// update somehow contains several, the last one wins.
pub fn prescan_update_section(
    message: &Message,
    zname: &Name,
    zclass: RRClass,
    client: SocketAddr,
) -> PrescanResult {
    let mut added_soa = None;

    for rrset in message.section(Section::Update) {
        if !rrset.name().is_in_zone(zname) {
            info!(client = %client, zone = %ZoneLabel(zname, zclass), rrset = %rrset,
                  "update record out of zone");
            return PrescanResult::fail(Rcode::NotZone);
        }

        if rrset.class() == zclass {
            // All meta-types live in one code range, so a single bound
            // covers TKEY through ANY (including MAILA and MAILB, which
            // have no distinct RRType of their own in some libraries).
            if rrset.rtype().code() >= 249 {
                info!(client = %client, zone = %ZoneLabel(zname, zclass), rrset = %rrset,
                      "attempt to add a meta-type record");
                return PrescanResult::fail(Rcode::FormErr);
            }
            if rrset.rtype() == RRType::SOA {
                for rr in rrset.single_rrs() {
                    added_soa = Some(rr);
                }
            }
        } else if rrset.class() == RRClass::ANY {
            if rrset.ttl() != 0 {
                info!(client = %client, zone = %ZoneLabel(zname, zclass), rrset = %rrset,
                      "rrset deletion with non-zero TTL");
                return PrescanResult::fail(Rcode::FormErr);
            }
            if rrset.rdata_count() > 0 {
                info!(client = %client, zone = %ZoneLabel(zname, zclass), rrset = %rrset,
                      "rrset deletion with rdata");
                return PrescanResult::fail(Rcode::FormErr);
            }
            if (249..=254).contains(&rrset.rtype().code()) {
                info!(client = %client, zone = %ZoneLabel(zname, zclass), rrset = %rrset,
                      "attempt to delete a meta-type rrset");
                return PrescanResult::fail(Rcode::FormErr);
            }
        } else if rrset.class() == RRClass::NONE {
            if rrset.ttl() != 0 {
                info!(client = %client, zone = %ZoneLabel(zname, zclass), rrset = %rrset,
                      "record deletion with non-zero TTL");
                return PrescanResult::fail(Rcode::FormErr);
            }
            if rrset.rtype().code() >= 249 {
                info!(client = %client, zone = %ZoneLabel(zname, zclass), rrset = %rrset,
                      "attempt to delete meta-type records");
                return PrescanResult::fail(Rcode::FormErr);
            }
        } else {
            info!(client = %client, zone = %ZoneLabel(zname, zclass), rrset = %rrset,
                  "update record with bad class");
            return PrescanResult::fail(Rcode::FormErr);
        }
    }

    PrescanResult {
        rcode: Rcode::NoError,
        added_soa,
    }
}
