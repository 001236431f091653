pub mod city_service;
pub mod diagnostics;
pub mod reconciler;

pub use crate::domain::model::{Actor, Address, City, Province, Region};
pub use crate::domain::ports::{CitySearchIndex, CityStore, Geocoder};
pub use crate::domain::query::CityQuery;
pub use crate::utils::error::Result;
