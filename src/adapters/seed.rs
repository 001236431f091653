use crate::core::city_service::CityService;
use crate::domain::model::{City, Province, Region};
use crate::domain::ports::{CitySearchIndex, CityStore, Geocoder};
use crate::utils::error::Result;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CityRow {
    city_id: Option<i64>,
    city_name: String,
    disabled: Option<bool>,
    region_id: Option<i64>,
    region_name: Option<String>,
    province_id: Option<i64>,
    province_name: Option<String>,
    province_abbrev: Option<String>,
}

impl CityRow {
    fn into_city(self) -> City {
        let province = match (self.province_id, self.province_name, self.province_abbrev) {
            (None, None, None) => None,
            (id, name, abbrev) => Some(Province::new(
                id,
                name.unwrap_or_default(),
                abbrev.unwrap_or_default(),
            )),
        };
        let region = match (self.region_id, self.region_name) {
            (None, None) if province.is_none() => None,
            (id, name) => Some(Region::new(id, name.unwrap_or_default(), province)),
        };

        City {
            id: self.city_id,
            name: self.city_name,
            disabled: self.disabled.unwrap_or(false),
            region,
        }
    }
}

/// Parses city seed rows:
/// `city_id,city_name,disabled,region_id,region_name,province_id,province_name,province_abbrev`.
/// Empty region or province columns leave that part of the chain absent.
pub fn read_cities<R: Read>(reader: R) -> Result<Vec<City>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut cities = Vec::new();
    for row in csv_reader.deserialize() {
        let row: CityRow = row?;
        cities.push(row.into_city());
    }
    Ok(cities)
}

/// Saves every seeded city through `service`, so the store and the search
/// index both see it. Returns how many were loaded.
pub async fn seed_service<S, I, G, P>(service: &CityService<S, I, G>, path: P) -> Result<usize>
where
    S: CityStore,
    I: CitySearchIndex,
    G: Geocoder,
    P: AsRef<Path>,
{
    let file = std::fs::File::open(path.as_ref())?;
    let cities = read_cities(file)?;
    let count = cities.len();
    for city in cities {
        service.save(city).await?;
    }
    tracing::info!("Seeded {} cities from {}", count, path.as_ref().display());
    Ok(count)
}
