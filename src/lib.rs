pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};
pub use config::TomlConfig;

pub use adapters::{ConfiguredGeocoder, HttpGeocoder, InMemoryCityStore, InMemorySearchIndex, StaticGeocoder};
pub use crate::core::city_service::CityService;
pub use crate::core::diagnostics::{Branch, Diagnostics, ReconcileIssue, Severity};
pub use crate::core::reconciler::{Reconciler, ReconciliationOutcome, Resolution};
pub use domain::dto::CityDto;
pub use domain::model::{Actor, Address, City, Province, Region};
pub use domain::query::CityQuery;
pub use utils::error::{Result, ServiceError};
