//! RFC 2136 dynamic update handling:
//! - per-request session orchestration and response building
//! - prerequisite evaluation (section 2.4)
//! - update-section prescan (section 3.4.1)
//! - update application with SOA/NS/CNAME special cases (section 3.4.2)
//! - an atomic, journaling diff against the zone's data source

use std::fmt;

use crate::dns::{Name, RRClass};

pub mod apply;
pub mod diff;
pub mod prereq;
pub mod prescan;
pub mod session;

pub use apply::{ApplyError, do_update};
pub use diff::{Diff, DiffError, DiffOp};
pub use prereq::check_prerequisites;
pub use prescan::{PrescanResult, prescan_update_section};
pub use session::{SessionError, UpdateOutcome, UpdateSession};

/// Log label for a zone, rendered as `name/CLASS`.
pub(crate) struct ZoneLabel<'a>(pub &'a Name, pub RRClass);

impl fmt::Display for ZoneLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, self.1)
    }
}
