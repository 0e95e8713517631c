//! Filter compiler.
//!
//! Turns the optional constraints of a [`Query`] into a conjunctive
//! [`Predicate`]. Every [`Clause`] constrains exactly one field and carries
//! its own bound values, so a store rendering clause by clause can never
//! misalign placeholders and parameters.

use crate::geo::BoundingBox;
use crate::query::Query;
use crate::record::Field;

/// Direction of a numeric threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    AtLeast(f64),
    AtMost(f64),
}

impl Bound {
    pub fn value(&self) -> f64 {
        match self {
            Bound::AtLeast(v) | Bound::AtMost(v) => *v,
        }
    }
}

/// A numeric constraint on one named field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    pub field: Field,
    pub bound: Bound,
}

impl Threshold {
    pub fn at_least(field: Field, value: f64) -> Self {
        Self { field, bound: Bound::AtLeast(value) }
    }

    pub fn at_most(field: Field, value: f64) -> Self {
        Self { field, bound: Bound::AtMost(value) }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Substring match on the address, compared the way the store compares text.
    AddressContains(String),
    Threshold(Threshold),
    /// Latitude and longitude ranges of a prefilter box.
    Within(BoundingBox),
}

/// Clauses joined with AND. An empty predicate matches every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn and(mut self, clause: Clause) -> Self {
        self.push(clause);
        self
    }

    pub fn push(&mut self, clause: Clause) {
        self.clauses.push(clause);
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

/// Compiles the text and threshold constraints of a query.
///
/// Empty text, thresholds on non-filterable fields and non-finite bounds
/// are treated as not specified. Any other text, whitespace included, is
/// matched as written. The bounding-box clause is not added here;
/// it depends on the query shape and is appended by the engine.
pub fn compile(query: &Query) -> Predicate {
    let mut predicate = Predicate::all();
    if let Some(text) = query.text.as_deref().filter(|t| !t.is_empty()) {
        predicate.push(Clause::AddressContains(text.to_string()));
    }
    for threshold in &query.thresholds {
        if threshold.field.is_filterable() && threshold.bound.value().is_finite() {
            predicate.push(Clause::Threshold(*threshold));
        }
    }
    predicate
}
