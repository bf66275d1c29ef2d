use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use super::ZoneLabel;
use super::diff::{Diff, DiffError};
use super::prescan::prescan_update_section;
use crate::dns::{Message, Name, RRClass, RRType, RRset, Rcode, Section};
use crate::zone::{DataSource, DataSourceError, FindOptions, FindStatus};

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("zone {0} has no SOA at the apex")]
    MissingApexSoa(Name),
    #[error(transparent)]
    Diff(#[from] DiffError),
    #[error(transparent)]
    DataSource(#[from] DataSourceError),
}

/// Prescan and apply the update section (RFC 2136 section 3.4).
///
/// Returns NOERROR after a successful commit; a prescan rejection is
/// returned before any diff is created, and any data source failure
/// (including commit failure) becomes SERVFAIL.
pub fn do_update(
    datasrc: &Arc<dyn DataSource>,
    message: &Message,
    zname: &Name,
    zclass: RRClass,
    client: SocketAddr,
) -> Rcode {
    let prescan = prescan_update_section(message, zname, zclass, client);
    if prescan.rcode != Rcode::NoError {
        return prescan.rcode;
    }

    match apply_update_section(datasrc, message, zname, zclass, prescan.added_soa) {
        Ok(()) => Rcode::NoError,
        Err(e) => {
            info!(client = %client, zone = %ZoneLabel(zname, zclass), error = %e,
                  "data source error during update");
            Rcode::ServFail
        }
    }
}

fn apply_update_section(
    datasrc: &Arc<dyn DataSource>,
    message: &Message,
    zname: &Name,
    zclass: RRClass,
    added_soa: Option<RRset>,
) -> Result<(), ApplyError> {
    // an ixfr-out-friendly diff: journaling on, single-update mode on
    let mut diff = Diff::new(Arc::clone(datasrc), zname.clone(), true, true)?;

    // SOA handling always comes first
    finalize_soa(datasrc.as_ref(), zname, &mut diff, added_soa)?;

    // The algorithm works on whole RRsets rather than individual RRs:
    // the finder speaks RRsets, so per-RR conversion happens at the diff
    // boundary where it is needed anyway.
    for rrset in message.section(Section::Update) {
        if rrset.class() == zclass {
            add_rrs_to_rrset(datasrc.as_ref(), &mut diff, rrset)?;
        } else if rrset.class() == RRClass::ANY {
            if rrset.rtype() == RRType::ANY {
                delete_name(datasrc.as_ref(), zname, &mut diff, rrset)?;
            } else {
                delete_rrset(datasrc.as_ref(), zname, &mut diff, rrset)?;
            }
        } else if rrset.class() == RRClass::NONE {
            delete_rrs_from_rrset(datasrc.as_ref(), zname, zclass, &mut diff, rrset)?;
        }
    }

    diff.commit()?;
    Ok(())
}

/// Re-emit the apex SOA: the captured candidate when the update supplied
/// one, the old SOA otherwise. A supplied serial is honored as-is;
/// RFC 1982 comparison against the old serial would slot in here.
fn finalize_soa(
    datasrc: &dyn DataSource,
    zname: &Name,
    diff: &mut Diff,
    added_soa: Option<RRset>,
) -> Result<(), ApplyError> {
    let (_, finder) = datasrc.find_zone(zname)?;
    let found = finder.find(zname, RRType::SOA, FindOptions::update_engine());
    let old_soa = match (found.status, found.rrset) {
        (FindStatus::Success, Some(rrset)) => rrset,
        _ => return Err(ApplyError::MissingApexSoa(zname.clone())),
    };

    let new_soa = added_soa.unwrap_or_else(|| old_soa.clone());

    for rr in old_soa.single_rrs() {
        diff.delete(rr)?;
    }
    for rr in new_soa.single_rrs() {
        diff.add(rr)?;
    }
    Ok(())
}

/// Class = zone class: add the update's records to the RRset at
/// (name, type), honoring CNAME coexistence rules.
fn add_rrs_to_rrset(
    datasrc: &dyn DataSource,
    diff: &mut Diff,
    rrset: &RRset,
) -> Result<(), ApplyError> {
    // SOA additions are finalized separately, never here
    if rrset.rtype() == RRType::SOA {
        return Ok(());
    }
    let (_, finder) = datasrc.find_zone(rrset.name())?;
    let found = finder.find(rrset.name(), rrset.rtype(), FindOptions::update_engine());

    let mut existing: Option<RRset> = None;
    if rrset.rtype() == RRType::CNAME {
        match found.status {
            FindStatus::Success => {
                // replacing an existing CNAME: the old set goes away and
                // the update's records are added without deduplication
                if let Some(orig) = &found.rrset {
                    for rr in orig.single_rrs() {
                        diff.delete(rr)?;
                    }
                }
            }
            // other data at the name; a CNAME cannot join it
            FindStatus::NxRrset => return Ok(()),
            _ => {}
        }
    } else {
        match found.status {
            // an existing CNAME shadows additions of any other type
            FindStatus::Cname => return Ok(()),
            FindStatus::Success => existing = found.rrset,
            _ => {}
        }
    }

    for rr in rrset.single_rrs() {
        let present = existing
            .as_ref()
            .is_some_and(|orig| orig.contains(&rr.rdatas()[0]));
        if !present {
            diff.add(rr)?;
        }
    }
    Ok(())
}

/// Class = ANY, type = ANY: delete every RRset at the name, keeping the
/// SOA and NS sets when the name is the zone apex.
fn delete_name(
    datasrc: &dyn DataSource,
    zname: &Name,
    diff: &mut Diff,
    rrset: &RRset,
) -> Result<(), ApplyError> {
    let (_, finder) = datasrc.find_zone(rrset.name())?;
    let all = finder.find_all(rrset.name(), FindOptions::update_engine());
    if all.status != FindStatus::Success || all.wildcard {
        return Ok(());
    }
    for to_delete in &all.rrsets {
        if to_delete.name() == zname
            && (to_delete.rtype() == RRType::SOA || to_delete.rtype() == RRType::NS)
        {
            continue;
        }
        for rr in to_delete.single_rrs() {
            diff.delete(rr)?;
        }
    }
    Ok(())
}

/// Class = ANY, type = T: delete the whole RRset at (name, T), unless it
/// is the apex SOA or NS set.
fn delete_rrset(
    datasrc: &dyn DataSource,
    zname: &Name,
    diff: &mut Diff,
    rrset: &RRset,
) -> Result<(), ApplyError> {
    let (_, finder) = datasrc.find_zone(rrset.name())?;
    let found = finder.find(rrset.name(), rrset.rtype(), FindOptions::update_engine());
    if found.status != FindStatus::Success {
        return Ok(());
    }
    let Some(to_delete) = found.rrset else {
        return Ok(());
    };
    if to_delete.name() == zname
        && (to_delete.rtype() == RRType::SOA || to_delete.rtype() == RRType::NS)
    {
        return Ok(());
    }
    for rr in to_delete.single_rrs() {
        diff.delete(rr)?;
    }
    Ok(())
}

/// Class = NONE: delete the specific records named by the update,
/// protecting the apex SOA entirely and the last apex NS record.
fn delete_rrs_from_rrset(
    datasrc: &dyn DataSource,
    zname: &Name,
    zclass: RRClass,
    diff: &mut Diff,
    rrset: &RRset,
) -> Result<(), ApplyError> {
    // the store holds records under the zone's class, not NONE
    let to_delete = rrset.to_class(zclass);

    if rrset.name() == zname {
        if rrset.rtype() == RRType::SOA {
            return Ok(());
        }
        if rrset.rtype() == RRType::NS {
            return delete_apex_ns_rdatas(datasrc, diff, &to_delete);
        }
    }
    for rr in to_delete.single_rrs() {
        diff.delete(rr)?;
    }
    Ok(())
}

/// Delete individual apex NS records while guaranteeing at least one
/// survives. The requested deletions are walked against a shrinking copy
/// of the live set; a deletion that would take out the final record is
/// skipped.
fn delete_apex_ns_rdatas(
    datasrc: &dyn DataSource,
    diff: &mut Diff,
    rrset: &RRset,
) -> Result<(), ApplyError> {
    let (_, finder) = datasrc.find_zone(rrset.name())?;
    let found = finder.find(rrset.name(), rrset.rtype(), FindOptions::update_engine());
    if found.status != FindStatus::Success {
        return Ok(());
    }
    let Some(orig) = found.rrset else {
        return Ok(());
    };

    let mut remaining = orig.rdatas().to_vec();
    for rr in rrset.single_rrs() {
        let rdata = rr.rdatas()[0].clone();
        if remaining.len() == 1 && remaining[0] == rdata {
            continue;
        }
        if let Some(pos) = remaining.iter().position(|r| *r == rdata) {
            remaining.remove(pos);
        }
        diff.delete(rr)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::Rdata;
    use crate::zone::ZoneStore;

    fn name(s: &str) -> Name {
        s.parse().unwrap()
    }

    fn client() -> SocketAddr {
        "192.0.2.53:53000".parse().unwrap()
    }

    fn a(addr: &str) -> Rdata {
        Rdata::a(RRClass::IN, addr.parse().unwrap())
    }

    fn store_with_www() -> (Arc<dyn DataSource>, ZoneStore) {
        let store = ZoneStore::new();
        let apex = name("example.org");
        let soa = RRset::from_rdata(
            apex.clone(),
            3600,
            Rdata::soa(
                RRClass::IN,
                &name("ns1.example.org"),
                &name("admin.example.org"),
                1000,
                3600,
                900,
                604800,
                86400,
            ),
        );
        let ns = RRset::from_rdata(
            apex.clone(),
            3600,
            Rdata::ns(RRClass::IN, &name("ns1.example.org")),
        );
        let www = RRset::from_rdata(name("www.example.org"), 300, a("192.0.2.1"));
        store
            .add_zone(apex, RRClass::IN, vec![soa, ns, www])
            .unwrap();
        let datasrc: Arc<dyn DataSource> = Arc::new(store.clone());
        (datasrc, store)
    }

    fn run(datasrc: &Arc<dyn DataSource>, updates: Vec<RRset>) -> Rcode {
        let mut msg = Message::update(1);
        for rrset in updates {
            msg.push_rrset(Section::Update, rrset);
        }
        do_update(datasrc, &msg, &name("example.org"), RRClass::IN, client())
    }

    #[test]
    fn test_add_new_record() {
        let (datasrc, store) = store_with_www();
        let add = RRset::from_rdata(name("mail.example.org"), 300, a("192.0.2.9"));
        assert_eq!(run(&datasrc, vec![add]), Rcode::NoError);
        assert!(
            store
                .rrset(&name("example.org"), &name("mail.example.org"), RRType::A)
                .is_some()
        );
    }

    #[test]
    fn test_cname_add_ignored_when_other_data_exists() {
        let (datasrc, store) = store_with_www();
        let add = RRset::from_rdata(
            name("www.example.org"),
            300,
            Rdata::cname(RRClass::IN, &name("target.example.org")),
        );
        assert_eq!(run(&datasrc, vec![add]), Rcode::NoError);
        let apex = name("example.org");
        assert!(store.rrset(&apex, &name("www.example.org"), RRType::CNAME).is_none());
        assert!(store.rrset(&apex, &name("www.example.org"), RRType::A).is_some());
    }

    #[test]
    fn test_cname_replaces_cname() {
        let (datasrc, store) = store_with_www();
        let apex = name("example.org");
        let first = RRset::from_rdata(
            name("alias.example.org"),
            300,
            Rdata::cname(RRClass::IN, &name("www.example.org")),
        );
        assert_eq!(run(&datasrc, vec![first]), Rcode::NoError);

        let second = RRset::from_rdata(
            name("alias.example.org"),
            300,
            Rdata::cname(RRClass::IN, &name("mail.example.org")),
        );
        assert_eq!(run(&datasrc, vec![second]), Rcode::NoError);

        let cname = store
            .rrset(&apex, &name("alias.example.org"), RRType::CNAME)
            .unwrap();
        assert_eq!(cname.rdata_count(), 1);
        assert_eq!(
            cname.rdatas()[0],
            Rdata::cname(RRClass::IN, &name("mail.example.org"))
        );
    }

    #[test]
    fn test_non_cname_add_ignored_at_cname_node() {
        let (datasrc, store) = store_with_www();
        let apex = name("example.org");
        let cname = RRset::from_rdata(
            name("alias.example.org"),
            300,
            Rdata::cname(RRClass::IN, &name("www.example.org")),
        );
        assert_eq!(run(&datasrc, vec![cname]), Rcode::NoError);

        let add = RRset::from_rdata(name("alias.example.org"), 300, a("192.0.2.7"));
        assert_eq!(run(&datasrc, vec![add]), Rcode::NoError);
        assert!(store.rrset(&apex, &name("alias.example.org"), RRType::A).is_none());
        assert!(
            store
                .rrset(&apex, &name("alias.example.org"), RRType::CNAME)
                .is_some()
        );
    }

    #[test]
    fn test_soa_candidate_replaces_apex_soa() {
        let (datasrc, store) = store_with_www();
        let apex = name("example.org");
        let new_soa = RRset::from_rdata(
            apex.clone(),
            3600,
            Rdata::soa(
                RRClass::IN,
                &name("ns1.example.org"),
                &name("admin.example.org"),
                2000,
                3600,
                900,
                604800,
                86400,
            ),
        );
        assert_eq!(run(&datasrc, vec![new_soa]), Rcode::NoError);
        let soa = store.rrset(&apex, &apex, RRType::SOA).unwrap();
        assert_eq!(soa.rdata_count(), 1);
        assert_eq!(soa.rdatas()[0].soa_serial(), Some(2000));
    }

    #[test]
    fn test_servfail_when_zone_is_claimed() {
        let (datasrc, _) = store_with_www();
        datasrc.begin_update(&name("example.org")).unwrap();
        let add = RRset::from_rdata(name("mail.example.org"), 300, a("192.0.2.9"));
        assert_eq!(run(&datasrc, vec![add]), Rcode::ServFail);
        datasrc.end_update(&name("example.org"));
    }
}
