//! Mapping snapshots and profiles
//!
//! Serializable views of the whole mapping, and the in-memory registry of
//! named profiles. Persisting these anywhere is the application's job.

mod snapshot;

pub use snapshot::{AxisRecord, BindingRecord, MappingSnapshot, ProfileSet};
