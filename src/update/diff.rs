use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::dns::{Name, RRset};
use crate::zone::{DataSource, DataSourceError};

/// A single buffered zone mutation, carrying a one-record RRset.
#[derive(Debug, Clone, PartialEq)]
pub enum DiffOp {
    Add(RRset),
    Delete(RRset),
}

#[derive(Debug, Error)]
pub enum DiffError {
    #[error("diff operations must carry exactly one rdata, got {0}")]
    NotSingleRdata(usize),
    #[error("record owner {0} is outside zone {1}")]
    OutOfZone(Name, Name),
    #[error(transparent)]
    DataSource(#[from] DataSourceError),
}

/// An ordered add/delete buffer bound to one zone of a data source.
///
/// Operations accumulate in insertion order and hit the backend only at
/// [`commit`](Diff::commit), which applies them all-or-nothing and, with
/// journaling on, records them for IXFR-out. In single-update mode the
/// constructor claims the zone so no second diff can be composed against
/// it concurrently; dropping an uncommitted diff releases the claim and
/// changes nothing.
pub struct Diff {
    datasrc: Arc<dyn DataSource>,
    zone: Name,
    journaling: bool,
    single_update_mode: bool,
    ops: Vec<DiffOp>,
    committed: bool,
}

impl Diff {
    pub fn new(
        datasrc: Arc<dyn DataSource>,
        zone: Name,
        journaling: bool,
        single_update_mode: bool,
    ) -> Result<Self, DiffError> {
        if single_update_mode {
            datasrc.begin_update(&zone)?;
        }
        Ok(Diff {
            datasrc,
            zone,
            journaling,
            single_update_mode,
            ops: Vec::new(),
            committed: false,
        })
    }

    fn check_record(&self, rr: &RRset) -> Result<(), DiffError> {
        if rr.rdata_count() != 1 {
            return Err(DiffError::NotSingleRdata(rr.rdata_count()));
        }
        if !rr.name().is_in_zone(&self.zone) {
            return Err(DiffError::OutOfZone(rr.name().clone(), self.zone.clone()));
        }
        Ok(())
    }

    /// Buffer an addition.
    pub fn add(&mut self, rr: RRset) -> Result<(), DiffError> {
        self.check_record(&rr)?;
        self.ops.push(DiffOp::Add(rr));
        Ok(())
    }

    /// Buffer a deletion.
    pub fn delete(&mut self, rr: RRset) -> Result<(), DiffError> {
        self.check_record(&rr)?;
        self.ops.push(DiffOp::Delete(rr));
        Ok(())
    }

    pub fn ops(&self) -> &[DiffOp] {
        &self.ops
    }

    /// Apply every buffered operation to the data source atomically.
    pub fn commit(mut self) -> Result<(), DiffError> {
        debug!(zone = %self.zone, ops = self.ops.len(), "committing diff");
        self.datasrc.apply(&self.zone, &self.ops, self.journaling)?;
        self.committed = true;
        if self.single_update_mode {
            self.datasrc.end_update(&self.zone);
        }
        Ok(())
    }
}

impl Drop for Diff {
    fn drop(&mut self) {
        if self.single_update_mode && !self.committed {
            self.datasrc.end_update(&self.zone);
        }
    }
}
