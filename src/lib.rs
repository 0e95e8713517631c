//! Solarsite – geospatial filter, rank and paginate queries over land parcels
//! carrying solar-suitability attributes.
//!
//! Parcels (irradiance, tilt, grid distance, suitability score, area, slope,
//! day length and coordinates) are computed and loaded out of band. This crate
//! only selects, filters, distance-ranks and pages them.
//!
//! ## Modules
//! * [`record`] – The parcel [`record::Record`] and the closed [`record::Field`] set.
//! * [`filter`] – Compiles optional constraints into a conjunctive [`filter::Predicate`].
//! * [`geo`] – Great-circle distance and the prefilter [`geo::BoundingBox`].
//! * [`paginate`] – Page count, offset and out-of-range detection.
//! * [`query`] – The [`query::Query`] value object and lenient parameter parsing.
//! * [`store`] – The read-only [`store::RecordStore`] capability.
//! * [`persist`] – SQLite implementation of the store.
//! * [`engine`] – The [`engine::Engine`] composing the above into query shapes.
//! * [`settings`] – Layered configuration.
//! * [`server`] – HTTP routes over the engine.
//!
//! ## Query flow
//! A query is compiled into store clauses, optionally narrowed by a
//! latitude/longitude box sized from the requested radius (inflated by a
//! safety factor), counted and fetched from the store, then refined and
//! ordered by exact haversine distance. The box is always a superset of the
//! circle; only the exact distance decides membership.
//!
//! ## Quick Start
//! ```
//! use solarsite::engine::Engine;
//! use solarsite::persist::{PersistenceMode, SqliteStore};
//! use solarsite::query::Query;
//! use solarsite::record::{Field, NewRecord};
//! use solarsite::settings::Limits;
//!
//! let store = SqliteStore::open(PersistenceMode::InMemory).unwrap();
//! store.insert(&NewRecord::new("1 Sun Rd", 25.0, -80.0).with(Field::SolarScore, 81.0)).unwrap();
//! let limits = Limits::default();
//! let engine = Engine::new(&store, &limits);
//! let page = engine.list(&Query::new().with_origin(25.0, -80.0).with_radius(10.0)).unwrap();
//! assert_eq!(page.pagination.total_rows, 1);
//! ```

pub mod engine;
pub mod error;
pub mod filter;
pub mod geo;
pub mod paginate;
pub mod persist;
pub mod query;
pub mod record;
pub mod server;
pub mod settings;
pub mod store;

pub use error::{Result, SolarError};
