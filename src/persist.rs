// used for persistence
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::error::{Result, SolarError};
use crate::filter::{Bound, Clause, Predicate};
use crate::record::{Field, NewRecord, Record, RecordId, Sort};
use crate::store::RecordStore;

/// Where the SQLite database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceMode {
    InMemory,
    File(String),
}

const SCHEMA: &str = "
    create table if not exists locations (
        id integer primary key autoincrement,
        address text not null unique,
        latitude real not null,
        longitude real not null,
        annual_ghi real,
        annual_tilt real,
        grid_distance real,
        solar_score real,
        area real,
        slope real,
        solar_day_length real,
        created_at text default (datetime('now')),
        updated_at text default (datetime('now')),
        constraint latitude_in_range check (latitude between -90 and 90),
        constraint longitude_in_range check (longitude between -180 and 180),
        constraint annual_tilt_in_range check (annual_tilt is null or annual_tilt between 0 and 90),
        constraint annual_ghi_not_negative check (annual_ghi is null or annual_ghi >= 0),
        constraint grid_distance_not_negative check (grid_distance is null or grid_distance >= 0),
        constraint solar_score_not_negative check (solar_score is null or solar_score >= 0),
        constraint area_not_negative check (area is null or area >= 0),
        constraint slope_not_negative check (slope is null or slope >= 0),
        constraint solar_day_length_not_negative check (solar_day_length is null or solar_day_length >= 0)
    );
    create index if not exists idx_locations_lat_lon on locations (latitude, longitude);
    create index if not exists idx_locations_solar_score on locations (solar_score);
    create index if not exists idx_locations_annual_ghi on locations (annual_ghi);
    create index if not exists idx_locations_grid_distance on locations (grid_distance);
    create index if not exists idx_locations_slope on locations (slope);
    create index if not exists idx_locations_area on locations (area);
    create index if not exists idx_locations_solar_day_length on locations (solar_day_length);
    create trigger if not exists trg_locations_touch
    after update on locations
    for each row
    begin
        update locations set updated_at = datetime('now') where id = old.id;
    end;
";

const COLUMNS: &str = "id, address, latitude, longitude, annual_ghi, annual_tilt, grid_distance, \
                       solar_score, area, slope, solar_day_length, updated_at";

// ------------- Persistence -------------
/// SQLite-backed [`RecordStore`].
///
/// A single connection is shared behind a mutex, so the store can be put in
/// an `Arc` and used from blocking worker threads.
pub struct SqliteStore {
    connection: Mutex<Connection>,
    mode: PersistenceMode,
}

impl SqliteStore {
    pub fn open(mode: PersistenceMode) -> Result<Self> {
        let connection = match &mode {
            PersistenceMode::InMemory => Connection::open_in_memory()?,
            PersistenceMode::File(path) => {
                let connection = Connection::open(path)?;
                connection.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                    row.get::<_, String>(0)
                })?;
                connection
            }
        };
        connection.execute_batch(SCHEMA)?;
        info!(mode = ?mode, "record store ready");
        Ok(Self { connection: Mutex::new(connection), mode })
    }

    pub fn mode(&self) -> &PersistenceMode {
        &self.mode
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|e| SolarError::Lock(e.to_string()))
    }

    /// Adds a record and returns the identifier the store assigned to it.
    /// Loading is done by data preparation, never by the query engine.
    pub fn insert(&self, record: &NewRecord) -> Result<RecordId> {
        let mut columns = vec!["address", "latitude", "longitude"];
        let mut values = vec![
            Value::Text(record.address.clone()),
            Value::Real(record.latitude),
            Value::Real(record.longitude),
        ];
        for (field, value) in &record.attributes {
            columns.push(field.column());
            values.push(Value::Real(*value));
        }
        let sql = format!(
            "insert into locations ({}) values ({})",
            columns.join(", "),
            vec!["?"; columns.len()].join(", ")
        );
        let connection = self.lock()?;
        connection.execute(&sql, params_from_iter(values.iter()))?;
        Ok(connection.last_insert_rowid())
    }
}

impl RecordStore for SqliteStore {
    fn count(&self, predicate: &Predicate) -> Result<u64> {
        let filter = WhereClause::render(predicate);
        let sql = format!("select count(*) from locations{}", filter.sql);
        debug!(%sql, "count");
        let connection = self.lock()?;
        let mut statement = connection.prepare_cached(&sql)?;
        let count: i64 = statement.query_row(params_from_iter(filter.params.iter()), |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    fn fetch_sorted(
        &self,
        predicate: &Predicate,
        sort: Sort,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<Record>> {
        let mut filter = WhereClause::render(predicate);
        let tie_break = if sort.field == Field::Id { "" } else { ", id asc" };
        let sql = format!(
            "select {COLUMNS} from locations{} order by {} {}{tie_break} limit ? offset ?",
            filter.sql,
            sort.field.column(),
            sort.direction.keyword()
        );
        filter.params.push(Value::Integer(i64::from(limit)));
        filter.params.push(Value::Integer(i64::try_from(offset).unwrap_or(i64::MAX)));
        debug!(%sql, "fetch sorted");
        self.select(&sql, &filter.params)
    }

    fn fetch(&self, predicate: &Predicate, limit: u32) -> Result<Vec<Record>> {
        let mut filter = WhereClause::render(predicate);
        let sql = format!("select {COLUMNS} from locations{} limit ?", filter.sql);
        filter.params.push(Value::Integer(i64::from(limit)));
        debug!(%sql, "fetch");
        self.select(&sql, &filter.params)
    }

    fn get(&self, id: RecordId) -> Result<Option<Record>> {
        let sql = format!("select {COLUMNS} from locations where id = ?");
        let connection = self.lock()?;
        let mut statement = connection.prepare_cached(&sql)?;
        let record = statement.query_row([id], record_from_row).optional()?;
        Ok(record)
    }
}

impl SqliteStore {
    fn select(&self, sql: &str, params: &[Value]) -> Result<Vec<Record>> {
        let connection = self.lock()?;
        let mut statement = connection.prepare_cached(sql)?;
        let records = statement
            .query_map(params_from_iter(params.iter()), record_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }
}

/// A rendered predicate: the SQL text (empty, or starting with ` where`)
/// and the values for its placeholders, in order.
struct WhereClause {
    sql: String,
    params: Vec<Value>,
}

impl WhereClause {
    fn render(predicate: &Predicate) -> Self {
        let mut fragments = Vec::with_capacity(predicate.clauses().len());
        let mut params = Vec::new();
        // each arm emits its fragment and its values together
        for clause in predicate.clauses() {
            match clause {
                Clause::AddressContains(text) => {
                    fragments.push("address like ? escape '\\'".to_string());
                    params.push(Value::Text(format!("%{}%", escape_like(text))));
                }
                Clause::Threshold(threshold) => {
                    let operator = match threshold.bound {
                        Bound::AtLeast(_) => ">=",
                        Bound::AtMost(_) => "<=",
                    };
                    fragments.push(format!("{} {} ?", threshold.field.column(), operator));
                    params.push(Value::Real(threshold.bound.value()));
                }
                Clause::Within(bbox) => {
                    fragments.push(
                        "latitude between ? and ? and longitude between ? and ?".to_string(),
                    );
                    params.extend([
                        Value::Real(bbox.min_latitude),
                        Value::Real(bbox.max_latitude),
                        Value::Real(bbox.min_longitude),
                        Value::Real(bbox.max_longitude),
                    ]);
                }
            }
        }
        let sql = if fragments.is_empty() {
            String::new()
        } else {
            format!(" where {}", fragments.join(" and "))
        };
        Self { sql, params }
    }
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<Record> {
    let mut attributes = BTreeMap::new();
    for field in Field::ATTRIBUTES {
        if let Some(value) = row.get::<_, Option<f64>>(field.column())? {
            attributes.insert(field, value);
        }
    }
    Ok(Record {
        id: row.get("id")?,
        address: row.get("address")?,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        attributes,
        updated_at: row.get("updated_at")?,
    })
}
