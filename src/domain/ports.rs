use crate::domain::model::{Address, City};
use crate::domain::query::CityQuery;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Persistent storage of cities.
#[async_trait]
pub trait CityStore: Send + Sync {
    /// Cities matching every filter of `query`, in store order. Empty when nothing matches.
    async fn find(&self, query: &CityQuery) -> Result<Vec<City>>;
    async fn find_by_id(&self, id: i64) -> Result<Option<City>>;
    /// Inserts or replaces; assigns an id when the city has none.
    async fn save(&self, city: City) -> Result<City>;
    async fn delete(&self, id: i64) -> Result<()>;
}

/// Full-text index over cities.
#[async_trait]
pub trait CitySearchIndex: Send + Sync {
    async fn save(&self, city: &City) -> Result<()>;
    async fn delete(&self, id: i64) -> Result<()>;
    async fn search(&self, query: &str) -> Result<Vec<City>>;
}

/// Postal code to best-effort address.
///
/// `Ok(None)` means the provider had nothing for the code. `Err` is reserved
/// for transport or protocol failures.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn lookup(&self, postal_code: &str) -> Result<Option<Address>>;
}
