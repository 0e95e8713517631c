//! Query orchestration.
//!
//! The [`Engine`] composes the filter compiler, the prefilter box, the
//! distance calculator and the paginator into the supported query shapes:
//!
//! * [`Engine::list`] – filtered, sorted, paged list with optional distance
//!   annotation and radius refinement.
//! * [`Engine::nearest`] – top-k closest records around an origin.
//! * [`Engine::radius`] – every record inside a hard radius.
//! * [`Engine::get`], [`Engine::search`] and [`Engine::similar`] – single
//!   record lookup, address search and feature-space neighbours.
//!
//! The engine owns no state. It borrows a store and the limits for the
//! duration of a call and may be created per request.

use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

use crate::error::{Result, SolarError};
use crate::filter::{self, Clause, Predicate};
use crate::geo::{BoundingBox, Coordinate};
use crate::paginate::Pagination;
use crate::query::Query;
use crate::record::{Field, Record, RecordId, Sort};
use crate::settings::Limits;
use crate::store::RecordStore;

/// A record together with its distance from the query origin, when one was given.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hit {
    #[serde(flatten)]
    pub record: Record,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl Hit {
    fn located(record: Record, origin: &Coordinate) -> Self {
        let distance_km = origin.distance_km(&Coordinate::new(record.latitude, record.longitude));
        Self { record, distance_km: Some(distance_km) }
    }
}

/// Result of a list query. `total_rows` counts the rows matching the store
/// predicate, prefilter box included, before any exact distance cut.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListPage {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub items: Vec<Hit>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Neighbor {
    #[serde(flatten)]
    pub record: Record,
    /// Euclidean distance in standardised feature space.
    pub dissimilarity: f64,
}

pub struct Engine<'a, S: RecordStore + ?Sized> {
    store: &'a S,
    limits: &'a Limits,
}

impl<'a, S: RecordStore + ?Sized> Engine<'a, S> {
    pub fn new(store: &'a S, limits: &'a Limits) -> Self {
        Self { store, limits }
    }

    pub fn list(&self, query: &Query) -> Result<ListPage> {
        let origin = optional_origin(query)?;
        let radius_km = optional_radius(query)?;
        let page_size = self.limits.page_size(query.limit);
        let page = query.page.unwrap_or(1).clamp(1, i64::from(u32::MAX)) as u32;

        let mut predicate = filter::compile(query);
        let ring = origin.zip(radius_km);
        if let Some((origin, radius_km)) = ring {
            predicate.push(Clause::Within(BoundingBox::around(
                origin,
                radius_km * self.limits.radius_inflation,
            )));
        }

        let total_rows = self.store.count(&predicate)?;
        let pagination = Pagination::new(total_rows, page_size, page);
        debug!(total_rows, total_pages = pagination.total_pages, page, page_size, "list counted");
        if pagination.is_out_of_range() {
            debug!(page, total_pages = pagination.total_pages, "page out of range");
            return Ok(ListPage { pagination, items: Vec::new() });
        }

        let records =
            self.store
                .fetch_sorted(&predicate, query.sort, page_size, pagination.offset())?;
        let fetched = records.len();
        let mut items: Vec<Hit> = match origin {
            Some(origin) => records.into_iter().map(|r| Hit::located(r, &origin)).collect(),
            None => records
                .into_iter()
                .map(|record| Hit { record, distance_km: None })
                .collect(),
        };
        // the refinement only reorders this page, not the whole result
        if let Some((_, radius_km)) = ring {
            items.retain(|hit| hit.distance_km.is_some_and(|d| d <= radius_km));
            sort_by_distance(&mut items);
        }
        debug!(fetched, kept = items.len(), "list page assembled");
        Ok(ListPage { pagination, items })
    }

    /// The `limit` closest records within a fixed box around the origin.
    /// Text and threshold constraints of the query are not applied.
    pub fn nearest(&self, query: &Query) -> Result<Vec<Hit>> {
        let origin = required_origin(query)?;
        let limit = self.limits.clamp(query.limit, self.limits.nearest_default) as usize;
        let predicate =
            Predicate::all().and(Clause::Within(BoundingBox::around(origin, self.limits.nearest_box_km)));

        let candidates = self.store.fetch(&predicate, self.limits.nearest_cap)?;
        let scanned = candidates.len();
        let mut hits: Vec<Hit> = candidates.into_iter().map(|r| Hit::located(r, &origin)).collect();
        sort_by_distance(&mut hits);
        hits.truncate(limit);
        debug!(scanned, returned = hits.len(), "nearest");
        Ok(hits)
    }

    /// Every record within `radius_km` of the origin that also satisfies the
    /// query's text and threshold constraints, closest first.
    pub fn radius(&self, query: &Query) -> Result<Vec<Hit>> {
        let origin = required_origin(query)?;
        let radius_km = optional_radius(query)?
            .ok_or_else(|| SolarError::MissingParameter("km".to_string()))?;
        let predicate = filter::compile(query).and(Clause::Within(BoundingBox::around(
            origin,
            radius_km * self.limits.radius_inflation,
        )));

        let candidates = self.store.fetch(&predicate, self.limits.radius_cap)?;
        let scanned = candidates.len();
        let mut hits: Vec<Hit> = candidates
            .into_iter()
            .map(|r| Hit::located(r, &origin))
            .filter(|hit| hit.distance_km.is_some_and(|d| d <= radius_km))
            .collect();
        sort_by_distance(&mut hits);
        debug!(scanned, returned = hits.len(), radius_km, "radius");
        Ok(hits)
    }

    pub fn get(&self, id: RecordId) -> Result<Record> {
        self.store.get(id)?.ok_or(SolarError::NotFound(id))
    }

    /// Records whose address contains `text`, in id order.
    pub fn search(&self, text: &str, limit: Option<i64>) -> Result<Vec<Record>> {
        let limit = self.limits.page_size(limit);
        let predicate = filter::compile(&Query::new().with_text(text));
        self.store.fetch_sorted(&predicate, Sort::default(), limit, 0)
    }

    /// The `k` records most alike the record `id` over its coordinates and
    /// numeric attributes. Each feature is standardised across the candidate
    /// set; candidates missing any feature are left out.
    pub fn similar(&self, id: RecordId, k: Option<i64>) -> Result<Vec<Neighbor>> {
        let reference = self.get(id)?;
        let k = self.limits.clamp(k, self.limits.similar_default) as usize;
        let reference_features = features(&reference).ok_or_else(|| {
            SolarError::InvalidParameter(format!("record {id} lacks attributes needed for comparison"))
        })?;

        let candidates: Vec<(Record, Vec<f64>)> = self
            .store
            .fetch(&Predicate::all(), self.limits.similar_cap)?
            .into_iter()
            .filter_map(|r| features(&r).map(|f| (r, f)))
            .collect();
        let scale = Standardizer::fit(candidates.iter().map(|(_, f)| f.as_slice()));
        let anchor = scale.apply(&reference_features);

        let mut neighbors: Vec<Neighbor> = candidates
            .into_iter()
            .filter(|(record, _)| record.id != id)
            .map(|(record, f)| {
                let point = scale.apply(&f);
                let dissimilarity = anchor
                    .iter()
                    .zip(&point)
                    .map(|(a, b)| (a - b).powi(2))
                    .sum::<f64>()
                    .sqrt();
                Neighbor { record, dissimilarity }
            })
            .collect();
        neighbors.sort_by(|a, b| {
            a.dissimilarity
                .total_cmp(&b.dissimilarity)
                .then(a.record.id.cmp(&b.record.id))
        });
        neighbors.truncate(k);
        Ok(neighbors)
    }
}

/// Ascending distance, ties by ascending id.
fn sort_by_distance(hits: &mut [Hit]) {
    hits.sort_by(|a, b| {
        let by_distance = match (a.distance_km, b.distance_km) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_distance.then(a.record.id.cmp(&b.record.id))
    });
}

fn optional_origin(query: &Query) -> Result<Option<Coordinate>> {
    match query.origin {
        Some(origin) if !origin.is_valid() => Err(SolarError::InvalidParameter(format!(
            "coordinate ({}, {}) is out of range",
            origin.latitude, origin.longitude
        ))),
        origin => Ok(origin),
    }
}

fn required_origin(query: &Query) -> Result<Coordinate> {
    optional_origin(query)?.ok_or_else(|| SolarError::MissingParameter("lat and lon".to_string()))
}

fn optional_radius(query: &Query) -> Result<Option<f64>> {
    match query.radius_km {
        Some(km) if !km.is_finite() || km < 0.0 => Err(SolarError::InvalidParameter(format!(
            "radius {km} km must be a non-negative number"
        ))),
        radius => Ok(radius),
    }
}

fn features(record: &Record) -> Option<Vec<f64>> {
    let mut values = vec![record.latitude, record.longitude];
    for field in Field::ATTRIBUTES {
        values.push(record.value(field)?);
    }
    Some(values)
}

/// Per-feature mean and population standard deviation.
struct Standardizer {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl Standardizer {
    fn fit<'f>(rows: impl Iterator<Item = &'f [f64]> + Clone) -> Self {
        let n = rows.clone().count().max(1) as f64;
        let width = rows.clone().next().map_or(0, <[f64]>::len);
        let mut mean = vec![0.0; width];
        for row in rows.clone() {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v / n;
            }
        }
        let mut variance = vec![0.0; width];
        for row in rows {
            for ((s, v), m) in variance.iter_mut().zip(row).zip(&mean) {
                *s += (v - m).powi(2) / n;
            }
        }
        // a constant feature keeps unit scale
        let scale = variance
            .into_iter()
            .map(|v| if v > 0.0 { v.sqrt() } else { 1.0 })
            .collect();
        Self { mean, scale }
    }

    fn apply(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(&self.mean)
            .zip(&self.scale)
            .map(|((v, m), s)| (v - m) / s)
            .collect()
    }
}
