//! Read-only record store capability consumed by the engine.
//!
//! The engine holds a borrowed `&dyn`-able implementor and never owns the
//! connection; the surrounding service decides its lifetime.

use crate::error::Result;
use crate::filter::Predicate;
use crate::record::{Record, RecordId, Sort};

pub trait RecordStore {
    /// Number of records satisfying every clause of `predicate`.
    fn count(&self, predicate: &Predicate) -> Result<u64>;

    /// One sorted page. Equal sort keys are ordered by ascending id.
    fn fetch_sorted(
        &self,
        predicate: &Predicate,
        sort: Sort,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<Record>>;

    /// Up to `limit` matching records in no particular order.
    fn fetch(&self, predicate: &Predicate, limit: u32) -> Result<Vec<Record>>;

    fn get(&self, id: RecordId) -> Result<Option<Record>>;
}
