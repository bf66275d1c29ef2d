use thiserror::Error;

use crate::dns::{Name, RRType, RRset};
use crate::update::diff::DiffOp;

/// Errors surfaced by a data source backend.
#[derive(Debug, Clone, Error)]
pub enum DataSourceError {
    #[error("no zone found for {0}")]
    ZoneNotFound(Name),
    #[error("zone {0} already has an update in progress")]
    UpdateInProgress(Name),
    #[error("invalid zone {0}: {1}")]
    InvalidZone(Name, String),
    #[error("data source backend error: {0}")]
    Backend(String),
}

/// Lookup options. The update engine always disables wildcard matching
/// and accepts glue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub no_wildcard: bool,
    pub glue_ok: bool,
}

impl FindOptions {
    pub fn update_engine() -> Self {
        FindOptions {
            no_wildcard: true,
            glue_ok: true,
        }
    }
}

/// Classification of a finder lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindStatus {
    Success,
    NxDomain,
    NxRrset,
    /// The name holds a CNAME and something else was asked for.
    Cname,
    /// The name sits under a zone cut.
    Delegation,
}

/// Result of a single-type lookup. `rrset` is present for Success, and
/// carries the obstructing RRset for Cname and Delegation.
#[derive(Debug, Clone)]
pub struct FindResult {
    pub status: FindStatus,
    pub rrset: Option<RRset>,
    /// Set when the answer was synthesized from a wildcard.
    pub wildcard: bool,
}

impl FindResult {
    pub fn nothing(status: FindStatus) -> Self {
        FindResult {
            status,
            rrset: None,
            wildcard: false,
        }
    }
}

/// Result of a whole-node lookup.
#[derive(Debug, Clone)]
pub struct FindAllResult {
    pub status: FindStatus,
    pub rrsets: Vec<RRset>,
    pub wildcard: bool,
}

/// Read access to a single zone's authoritative data.
pub trait ZoneFinder {
    /// The apex of the zone this finder serves.
    fn apex(&self) -> &Name;

    fn find(&self, name: &Name, rtype: RRType, options: FindOptions) -> FindResult;

    fn find_all(&self, name: &Name, options: FindOptions) -> FindAllResult;
}

/// An authoritative store holding one or more zones.
///
/// Finders give a consistent read view; mutation goes through
/// [`apply`](DataSource::apply), which is all-or-nothing. Writers claim a
/// zone with `begin_update` first — that is what backs the diff's
/// single-update mode.
pub trait DataSource: Send + Sync {
    /// Locate the best-matching zone for a name. The flag is true when
    /// the name is the zone apex itself.
    fn find_zone(&self, name: &Name) -> Result<(bool, Box<dyn ZoneFinder>), DataSourceError>;

    /// Claim exclusive update access to a zone.
    fn begin_update(&self, apex: &Name) -> Result<(), DataSourceError>;

    /// Release a claim taken by `begin_update`.
    fn end_update(&self, apex: &Name);

    /// Apply a committed diff atomically. When `journaling` is set the
    /// operations are also appended to the zone's journal for IXFR-out.
    fn apply(&self, apex: &Name, ops: &[DiffOp], journaling: bool) -> Result<(), DataSourceError>;
}
