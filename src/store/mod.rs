//! On-disk state of a data directory.
//!
//! The identity store (`persistence.json`) holds one current record per subject and is rewritten
//! wholesale on every save. Measurements go to one snapshot file per calendar date under
//! `visits/`, which the crawler never reads back.

mod doc;
mod identity;
mod lock;
mod snapshot;

pub use identity::IdentityStore;
pub use lock::DataDirLock;
pub use snapshot::VisitSnapshot;
