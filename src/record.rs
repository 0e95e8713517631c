// used to expose records to the transport layer
use serde::Serialize;

// timestamps maintained by the store
use chrono::NaiveDateTime;

use std::collections::BTreeMap;
use std::fmt;

// ------------- Field -------------
pub type RecordId = i64;

/// Numeric parcel attributes known to the engine.
///
/// This is the closed set of names that may appear in a filter clause or
/// an `ORDER BY`. Column names are only ever produced from this enum, never
/// from request text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Id,
    AnnualGhi,
    AnnualTilt,
    GridDistance,
    SolarScore,
    Area,
    Slope,
    SolarDayLength,
}

impl Field {
    /// Attributes carried by a record (everything except the identifier).
    pub const ATTRIBUTES: [Field; 7] = [
        Field::AnnualGhi,
        Field::AnnualTilt,
        Field::GridDistance,
        Field::SolarScore,
        Field::Area,
        Field::Slope,
        Field::SolarDayLength,
    ];

    /// Fields accepted as a sort key.
    pub const SORTABLE: [Field; 7] = [
        Field::Id,
        Field::SolarScore,
        Field::AnnualGhi,
        Field::GridDistance,
        Field::Slope,
        Field::Area,
        Field::SolarDayLength,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::AnnualGhi => "annual_ghi",
            Field::AnnualTilt => "annual_tilt",
            Field::GridDistance => "grid_distance",
            Field::SolarScore => "solar_score",
            Field::Area => "area",
            Field::Slope => "slope",
            Field::SolarDayLength => "solar_day_length",
        }
    }

    /// Looks a field up by its column name. Unknown names yield `None`.
    pub fn from_column(name: &str) -> Option<Field> {
        Field::ATTRIBUTES
            .into_iter()
            .chain(std::iter::once(Field::Id))
            .find(|f| f.column() == name)
    }

    pub fn is_sortable(&self) -> bool {
        Field::SORTABLE.contains(self)
    }

    pub fn is_filterable(&self) -> bool {
        *self != Field::Id
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// ------------- Sort -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn keyword(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: Field,
    pub direction: Direction,
}

impl Default for Sort {
    fn default() -> Self {
        Self { field: Field::Id, direction: Direction::Asc }
    }
}

impl Sort {
    pub fn new(field: Field, direction: Direction) -> Self {
        Self { field, direction }
    }

    /// Parses a sort request the way the list endpoint has always done it:
    /// an unknown or non-sortable field falls back to `id`, an unknown
    /// direction falls back to ascending. The two fall back independently
    /// and neither is ever an error.
    pub fn parse(field: Option<&str>, direction: Option<&str>) -> Self {
        let default = Sort::default();
        let field = field
            .and_then(|name| Field::from_column(name.trim()))
            .filter(Field::is_sortable)
            .unwrap_or(default.field);
        let direction = match direction.map(|d| d.trim().to_ascii_lowercase()) {
            Some(d) if d == "desc" => Direction::Desc,
            Some(d) if d == "asc" => Direction::Asc,
            _ => default.direction,
        };
        Self { field, direction }
    }
}

// ------------- Record -------------
/// One land parcel as stored. Records are written by out-of-band data
/// preparation; the engine only ever reads them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub id: RecordId,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(flatten)]
    pub attributes: BTreeMap<Field, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDateTime>,
}

impl Record {
    /// Numeric value of a field, `None` when the attribute was never computed.
    pub fn value(&self, field: Field) -> Option<f64> {
        match field {
            Field::Id => Some(self.id as f64),
            other => self.attributes.get(&other).copied(),
        }
    }
}

/// A record that has not been assigned an identifier yet.
#[derive(Debug, Clone, Default)]
pub struct NewRecord {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub attributes: BTreeMap<Field, f64>,
}

impl NewRecord {
    pub fn new(address: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            address: address.into(),
            latitude,
            longitude,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with(mut self, field: Field, value: f64) -> Self {
        if field.is_filterable() {
            self.attributes.insert(field, value);
        }
        self
    }
}
