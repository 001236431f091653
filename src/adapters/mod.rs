// Adapters layer: concrete implementations of the domain ports.

pub mod http_geocoder;
pub mod memory_store;
pub mod search_index;
pub mod seed;
pub mod static_geocoder;

use crate::domain::model::Address;
use crate::domain::ports::Geocoder;
use crate::utils::error::Result;
use async_trait::async_trait;

pub use http_geocoder::HttpGeocoder;
pub use memory_store::InMemoryCityStore;
pub use search_index::InMemorySearchIndex;
pub use static_geocoder::StaticGeocoder;

/// The geocoder selected by configuration.
pub enum ConfiguredGeocoder {
    Http(HttpGeocoder),
    Static(StaticGeocoder),
}

#[async_trait]
impl Geocoder for ConfiguredGeocoder {
    async fn lookup(&self, postal_code: &str) -> Result<Option<Address>> {
        match self {
            ConfiguredGeocoder::Http(geocoder) => geocoder.lookup(postal_code).await,
            ConfiguredGeocoder::Static(geocoder) => geocoder.lookup(postal_code).await,
        }
    }
}
