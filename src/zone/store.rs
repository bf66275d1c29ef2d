use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use super::finder::{
    DataSource, DataSourceError, FindAllResult, FindOptions, FindResult, FindStatus, ZoneFinder,
};
use crate::dns::{Name, RRClass, RRType, RRset};
use crate::update::diff::DiffOp;

/// In-memory authoritative store for one or more zones.
///
/// Cloning is cheap and shares the underlying data, so a store handle can
/// be passed around as the engine's `Arc<dyn DataSource>` while tests keep
/// their own handle for inspection.
#[derive(Clone)]
pub struct ZoneStore {
    inner: Arc<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    zones: RwLock<HashMap<Name, StoredZone>>,
    updating: Mutex<HashSet<Name>>,
}

#[derive(Debug, Clone)]
struct StoredZone {
    class: RRClass,
    rrsets: HashMap<(Name, RRType), RRset>,
    journal: Vec<DiffOp>,
}

impl ZoneStore {
    pub fn new() -> Self {
        ZoneStore {
            inner: Arc::new(StoreInner::default()),
        }
    }

    /// Load a zone, replacing any previous contents at the same apex.
    ///
    /// The zone is validated before it becomes visible: every RRset must
    /// be non-empty, in-zone and of the zone's class, and the apex must
    /// hold exactly one SOA record and at least one NS record.
    pub fn add_zone(
        &self,
        apex: Name,
        class: RRClass,
        rrsets: Vec<RRset>,
    ) -> Result<(), DataSourceError> {
        let mut map: HashMap<(Name, RRType), RRset> = HashMap::new();
        for rrset in rrsets {
            if rrset.is_empty() {
                return Err(DataSourceError::InvalidZone(
                    apex,
                    format!("empty rrset at {}", rrset.name()),
                ));
            }
            if rrset.class() != class {
                return Err(DataSourceError::InvalidZone(
                    apex,
                    format!("class mismatch at {}", rrset.name()),
                ));
            }
            if !rrset.name().is_in_zone(&apex) {
                return Err(DataSourceError::InvalidZone(
                    apex,
                    format!("out-of-zone name {}", rrset.name()),
                ));
            }
            let key = (rrset.name().clone(), rrset.rtype());
            if map.insert(key, rrset).is_some() {
                return Err(DataSourceError::InvalidZone(
                    apex,
                    "duplicate rrset".to_string(),
                ));
            }
        }

        match map.get(&(apex.clone(), RRType::SOA)) {
            Some(soa) if soa.rdata_count() == 1 => {}
            Some(_) => {
                return Err(DataSourceError::InvalidZone(
                    apex,
                    "apex SOA must have exactly one record".to_string(),
                ));
            }
            None => {
                return Err(DataSourceError::InvalidZone(
                    apex,
                    "missing apex SOA".to_string(),
                ));
            }
        }
        if !map.contains_key(&(apex.clone(), RRType::NS)) {
            return Err(DataSourceError::InvalidZone(
                apex,
                "missing apex NS".to_string(),
            ));
        }

        info!(zone = %apex, class = %class, rrsets = map.len(), "zone loaded");
        let mut zones = self.inner.zones.write();
        zones.insert(
            apex,
            StoredZone {
                class,
                rrsets: map,
                journal: Vec::new(),
            },
        );
        Ok(())
    }

    pub fn zone_count(&self) -> usize {
        self.inner.zones.read().len()
    }

    /// The stored RRset at (name, type) within a zone, if any.
    pub fn rrset(&self, apex: &Name, name: &Name, rtype: RRType) -> Option<RRset> {
        let zones = self.inner.zones.read();
        zones
            .get(apex)
            .and_then(|zone| zone.rrsets.get(&(name.clone(), rtype)).cloned())
    }

    /// All stored RRsets at a name within a zone.
    pub fn rrsets_at(&self, apex: &Name, name: &Name) -> Vec<RRset> {
        let zones = self.inner.zones.read();
        match zones.get(apex) {
            Some(zone) => zone
                .rrsets
                .iter()
                .filter(|((owner, _), _)| owner == name)
                .map(|(_, rrset)| rrset.clone())
                .collect(),
            None => Vec::new(),
        }
    }

    /// The committed operations journaled for a zone, oldest first.
    pub fn journal(&self, apex: &Name) -> Vec<DiffOp> {
        let zones = self.inner.zones.read();
        zones
            .get(apex)
            .map(|zone| zone.journal.clone())
            .unwrap_or_default()
    }
}

impl Default for ZoneStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSource for ZoneStore {
    fn find_zone(&self, name: &Name) -> Result<(bool, Box<dyn ZoneFinder>), DataSourceError> {
        let zones = self.inner.zones.read();
        let best = zones
            .keys()
            .filter(|apex| name.is_in_zone(apex))
            .max_by_key(|apex| apex.label_count())
            .cloned();
        match best {
            Some(apex) => {
                let exact = &apex == name;
                Ok((
                    exact,
                    Box::new(StoreFinder {
                        inner: Arc::clone(&self.inner),
                        apex,
                    }),
                ))
            }
            None => Err(DataSourceError::ZoneNotFound(name.clone())),
        }
    }

    fn begin_update(&self, apex: &Name) -> Result<(), DataSourceError> {
        let mut updating = self.inner.updating.lock();
        if !updating.insert(apex.clone()) {
            return Err(DataSourceError::UpdateInProgress(apex.clone()));
        }
        Ok(())
    }

    fn end_update(&self, apex: &Name) {
        self.inner.updating.lock().remove(apex);
    }

    fn apply(&self, apex: &Name, ops: &[DiffOp], journaling: bool) -> Result<(), DataSourceError> {
        let mut zones = self.inner.zones.write();
        let zone = zones
            .get_mut(apex)
            .ok_or_else(|| DataSourceError::ZoneNotFound(apex.clone()))?;

        // Work on a copy so a failure partway leaves the zone untouched.
        let mut rrsets = zone.rrsets.clone();
        for op in ops {
            match op {
                DiffOp::Add(rr) => {
                    let key = (rr.name().clone(), rr.rtype());
                    let entry = rrsets.entry(key).or_insert_with(|| {
                        RRset::new(rr.name().clone(), rr.class(), rr.rtype(), rr.ttl())
                    });
                    // additions adopt the update's TTL
                    entry.set_ttl(rr.ttl());
                    for rdata in rr.rdatas() {
                        if !entry.contains(rdata) {
                            entry
                                .push_rdata(rdata.clone())
                                .map_err(|e| DataSourceError::Backend(e.to_string()))?;
                        }
                    }
                }
                DiffOp::Delete(rr) => {
                    let key = (rr.name().clone(), rr.rtype());
                    if let Some(existing) = rrsets.get_mut(&key) {
                        for rdata in rr.rdatas() {
                            existing.remove_rdata(rdata);
                        }
                        if existing.is_empty() {
                            rrsets.remove(&key);
                        }
                    }
                }
            }
        }

        zone.rrsets = rrsets;
        if journaling {
            zone.journal.extend_from_slice(ops);
        }
        debug!(zone = %apex, ops = ops.len(), "diff applied");
        Ok(())
    }
}

struct StoreFinder {
    inner: Arc<StoreInner>,
    apex: Name,
}

impl StoreFinder {
    fn with_zone<T>(&self, f: impl FnOnce(&StoredZone) -> T) -> Option<T> {
        let zones = self.inner.zones.read();
        zones.get(&self.apex).map(f)
    }
}

impl ZoneFinder for StoreFinder {
    fn apex(&self) -> &Name {
        &self.apex
    }

    fn find(&self, name: &Name, rtype: RRType, _options: FindOptions) -> FindResult {
        self.with_zone(|zone| {
            // a zone cut strictly between the apex and the name shadows it
            let mut ancestor = name.parent();
            while let Some(cut) = ancestor {
                if !cut.is_in_zone(&self.apex) || cut == self.apex {
                    break;
                }
                if let Some(ns) = zone.rrsets.get(&(cut.clone(), RRType::NS)) {
                    return FindResult {
                        status: FindStatus::Delegation,
                        rrset: Some(ns.clone()),
                        wildcard: false,
                    };
                }
                ancestor = cut.parent();
            }

            let node_exists = zone.rrsets.keys().any(|(owner, _)| owner == name);
            if !node_exists {
                return FindResult::nothing(FindStatus::NxDomain);
            }
            if rtype != RRType::CNAME {
                if let Some(cname) = zone.rrsets.get(&(name.clone(), RRType::CNAME)) {
                    return FindResult {
                        status: FindStatus::Cname,
                        rrset: Some(cname.clone()),
                        wildcard: false,
                    };
                }
            }
            match zone.rrsets.get(&(name.clone(), rtype)) {
                Some(rrset) => FindResult {
                    status: FindStatus::Success,
                    rrset: Some(rrset.clone()),
                    wildcard: false,
                },
                None => FindResult::nothing(FindStatus::NxRrset),
            }
        })
        .unwrap_or_else(|| FindResult::nothing(FindStatus::NxDomain))
    }

    fn find_all(&self, name: &Name, _options: FindOptions) -> FindAllResult {
        self.with_zone(|zone| {
            let rrsets: Vec<RRset> = zone
                .rrsets
                .iter()
                .filter(|((owner, _), _)| owner == name)
                .map(|(_, rrset)| rrset.clone())
                .collect();
            if rrsets.is_empty() {
                FindAllResult {
                    status: FindStatus::NxDomain,
                    rrsets,
                    wildcard: false,
                }
            } else {
                FindAllResult {
                    status: FindStatus::Success,
                    rrsets,
                    wildcard: false,
                }
            }
        })
        .unwrap_or(FindAllResult {
            status: FindStatus::NxDomain,
            rrsets: Vec::new(),
            wildcard: false,
        })
    }
}
