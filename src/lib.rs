//! Background loader for OpenStreetMap extracts.
//!
//! A [`LoaderWorker`] fetches an Overpass-style JSON export, builds a
//! [`Grid`](data::Grid) of its elements, projects highway ways with a
//! Mercator [`Projector`](projection::Projector) and answers with a single
//! serializable [`WorkerMessage`].

pub mod config;
pub mod data;
pub mod errors;
pub mod etl;
pub mod fetch;
pub mod projection;
pub mod worker;

pub use config::{load_config, LoaderConfig, MissingNodePolicy};
pub use data::{GridData, InitialGridData, LoadRequest, WorkerMessage};
pub use errors::{Error, Result};
pub use worker::{load_grid, LoadResponse, LoaderWorker, PendingLoad};
