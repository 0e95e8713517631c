//! The query value object shared by every query shape.
//!
//! A [`Query`] is built either programmatically through its `with_*`
//! methods or from raw request parameters via [`Query::from_params`].
//! Parsing is lenient: anything that does not parse is treated as absent.
//! Whether an absent value is acceptable is decided later by the engine,
//! per query shape.

use crate::filter::Threshold;
use crate::geo::Coordinate;
use crate::record::{Field, Sort};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Substring to look for in the address.
    pub text: Option<String>,
    pub thresholds: Vec<Threshold>,
    pub origin: Option<Coordinate>,
    pub radius_km: Option<f64>,
    pub sort: Sort,
    /// Requested page size or result count, unclamped.
    pub limit: Option<i64>,
    /// Requested page number, unclamped.
    pub page: Option<i64>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_threshold(mut self, threshold: Threshold) -> Self {
        self.thresholds.push(threshold);
        self
    }

    pub fn with_origin(mut self, latitude: f64, longitude: f64) -> Self {
        self.origin = Some(Coordinate::new(latitude, longitude));
        self
    }

    pub fn with_radius(mut self, radius_km: f64) -> Self {
        self.radius_km = Some(radius_km);
        self
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_page(mut self, page: i64) -> Self {
        self.page = Some(page);
        self
    }

    /// Builds a query from request parameters.
    ///
    /// Understood names: `q`, `lat`, `lon`, `max_km_from` (or `km`), `limit`,
    /// `page`, `sort`, `order`, and `min_<field>` / `max_<field>` for every
    /// filterable field, where `score` and `ghi` abbreviate `solar_score`
    /// and `annual_ghi`. Unknown names are ignored.
    pub fn from_params<'a, I>(params: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut query = Query::new();
        let (mut latitude, mut longitude) = (None, None);
        let (mut sort, mut order) = (None, None);
        for (name, value) in params {
            match name {
                "q" => query.text = Some(value.to_string()).filter(|t| !t.is_empty()),
                "lat" => latitude = parse_number(value),
                "lon" => longitude = parse_number(value),
                "max_km_from" | "km" => {
                    query.radius_km = parse_number(value).filter(|km| *km >= 0.0)
                }
                "limit" => query.limit = parse_integer(value),
                "page" => query.page = parse_integer(value),
                "sort" => sort = Some(value),
                "order" => order = Some(value),
                other => {
                    if let Some(threshold) = parse_threshold(other, value) {
                        query.thresholds.push(threshold);
                    }
                }
            }
        }
        query.origin = match (latitude, longitude) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)).filter(Coordinate::is_valid),
            _ => None,
        };
        query.sort = Sort::parse(sort, order);
        query
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_integer(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}

fn parse_threshold(name: &str, value: &str) -> Option<Threshold> {
    let (at_least, suffix) = if let Some(suffix) = name.strip_prefix("min_") {
        (true, suffix)
    } else if let Some(suffix) = name.strip_prefix("max_") {
        (false, suffix)
    } else {
        return None;
    };
    let field = match suffix {
        "score" => Field::SolarScore,
        "ghi" => Field::AnnualGhi,
        column => Field::from_column(column)?,
    };
    if !field.is_filterable() {
        return None;
    }
    let bound = parse_number(value)?;
    Some(if at_least {
        Threshold::at_least(field, bound)
    } else {
        Threshold::at_most(field, bound)
    })
}
