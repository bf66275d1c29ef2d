use std::net::SocketAddr;

use tracing::{info, warn};

use super::ZoneLabel;
use crate::dns::{Message, Name, RRClass, RRType, RRset, Rcode, Section};
use crate::zone::{DataSource, DataSourceError, FindOptions, FindStatus};

/// RRset exists, value independent (RFC 2136 section 2.4.1). Class, TTL
/// and rdata of the given set are ignored; only the find status counts.
fn rrset_exists(datasrc: &dyn DataSource, rrset: &RRset) -> Result<bool, DataSourceError> {
    let (_, finder) = datasrc.find_zone(rrset.name())?;
    let found = finder.find(rrset.name(), rrset.rtype(), FindOptions::update_engine());
    Ok(found.status == FindStatus::Success)
}

/// RRset exists with exactly the given rdata multiset (section 2.4.2).
///
/// There is no order-independent RRset comparison on the finder, so the
/// stored rdata list is shallow-copied and matched elements removed; the
/// prerequisite holds when every queried rdata was found and the copy
/// ends up empty.
fn rrset_exists_value(datasrc: &dyn DataSource, rrset: &RRset) -> Result<bool, DataSourceError> {
    let (_, finder) = datasrc.find_zone(rrset.name())?;
    let found = finder.find(rrset.name(), rrset.rtype(), FindOptions::update_engine());
    if found.status != FindStatus::Success {
        return Ok(false);
    }
    let Some(found_rrset) = found.rrset else {
        return Ok(false);
    };
    if found_rrset.name() != rrset.name() || found_rrset.rtype() != rrset.rtype() {
        return Ok(false);
    }

    let mut remaining = found_rrset.rdatas().to_vec();
    for rdata in rrset.rdatas() {
        match remaining.iter().position(|r| r == rdata) {
            Some(pos) => {
                remaining.remove(pos);
            }
            None => return Ok(false),
        }
    }
    Ok(remaining.is_empty())
}

/// Name is in use, i.e. owns at least one RR (section 2.4.4). Wildcard
/// synthesis does not count.
fn name_in_use(datasrc: &dyn DataSource, rrset: &RRset) -> Result<bool, DataSourceError> {
    let (_, finder) = datasrc.find_zone(rrset.name())?;
    let all = finder.find_all(rrset.name(), FindOptions::update_engine());
    Ok(all.status == FindStatus::Success && !all.wildcard)
}

/// Check the prerequisite section of an update message (RFC 2136
/// sections 2.4 and 3.2). Returns NOERROR only when every record passes;
/// otherwise the rcode of the first failure.
pub fn check_prerequisites(
    datasrc: &dyn DataSource,
    message: &Message,
    zname: &Name,
    zclass: RRClass,
    client: SocketAddr,
) -> Rcode {
    match check_prerequisites_inner(datasrc, message, zname, zclass, client) {
        Ok(rcode) => rcode,
        Err(e) => {
            warn!(client = %client, zone = %ZoneLabel(zname, zclass), error = %e,
                  "data source error during prerequisite check");
            Rcode::ServFail
        }
    }
}

fn check_prerequisites_inner(
    datasrc: &dyn DataSource,
    message: &Message,
    zname: &Name,
    zclass: RRClass,
    client: SocketAddr,
) -> Result<Rcode, DataSourceError> {
    for rrset in message.section(Section::Prerequisite) {
        if !rrset.name().is_in_zone(zname) {
            info!(client = %client, zone = %ZoneLabel(zname, zclass), rrset = %rrset,
                  "prerequisite out of zone");
            return Ok(Rcode::NotZone);
        }

        // Algorithm from RFC 2136 section 3.2
        if rrset.class() == RRClass::ANY {
            if rrset.ttl() != 0 || rrset.rdata_count() != 0 {
                info!(client = %client, zone = %ZoneLabel(zname, zclass), rrset = %rrset,
                      "class ANY prerequisite with non-zero TTL or rdata");
                return Ok(Rcode::FormErr);
            }
            if rrset.rtype() == RRType::ANY {
                if !name_in_use(datasrc, rrset)? {
                    info!(client = %client, zone = %ZoneLabel(zname, zclass), rrset = %rrset,
                          rcode = %Rcode::NxDomain, "'name is in use' prerequisite failed");
                    return Ok(Rcode::NxDomain);
                }
            } else if !rrset_exists(datasrc, rrset)? {
                info!(client = %client, zone = %ZoneLabel(zname, zclass), rrset = %rrset,
                      rcode = %Rcode::NxRrset, "'rrset exists' prerequisite failed");
                return Ok(Rcode::NxRrset);
            }
        } else if rrset.class() == RRClass::NONE {
            if rrset.ttl() != 0 || rrset.rdata_count() != 0 {
                info!(client = %client, zone = %ZoneLabel(zname, zclass), rrset = %rrset,
                      "class NONE prerequisite with non-zero TTL or rdata");
                return Ok(Rcode::FormErr);
            }
            if rrset.rtype() == RRType::ANY {
                if name_in_use(datasrc, rrset)? {
                    info!(client = %client, zone = %ZoneLabel(zname, zclass), rrset = %rrset,
                          rcode = %Rcode::YxDomain, "'name is not in use' prerequisite failed");
                    return Ok(Rcode::YxDomain);
                }
            } else if rrset_exists(datasrc, rrset)? {
                info!(client = %client, zone = %ZoneLabel(zname, zclass), rrset = %rrset,
                      rcode = %Rcode::YxRrset, "'rrset does not exist' prerequisite failed");
                return Ok(Rcode::YxRrset);
            }
        } else if rrset.class() == zclass {
            if rrset.ttl() != 0 {
                info!(client = %client, zone = %ZoneLabel(zname, zclass), rrset = %rrset,
                      "value prerequisite with non-zero TTL");
                return Ok(Rcode::FormErr);
            }
            if !rrset_exists_value(datasrc, rrset)? {
                info!(client = %client, zone = %ZoneLabel(zname, zclass), rrset = %rrset,
                      rcode = %Rcode::NxRrset, "'rrset exists (value)' prerequisite failed");
                return Ok(Rcode::NxRrset);
            }
        } else {
            info!(client = %client, zone = %ZoneLabel(zname, zclass), rrset = %rrset,
                  "prerequisite with bad class");
            return Ok(Rcode::FormErr);
        }
    }

    Ok(Rcode::NoError)
}
