use crate::domain::model::{Address, City, Province};
use crate::domain::ports::Geocoder;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct PostalRow {
    postal_code: String,
    city_name: Option<String>,
    province_name: Option<String>,
    province_abbrev: Option<String>,
}

/// Uppercased with whitespace removed: `m5v 2t6` and `M5V2T6` are the same code.
pub fn normalize_postal_code(postal_code: &str) -> String {
    postal_code
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Geocoder answering from a fixed postal code table.
#[derive(Debug, Default, Clone)]
pub struct StaticGeocoder {
    entries: HashMap<String, Address>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, postal_code: &str, address: Address) {
        self.entries
            .insert(normalize_postal_code(postal_code), address);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Loads `postal_code,city_name,province_name,province_abbrev` rows.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut geocoder = Self::new();
        let mut csv_reader = csv::Reader::from_reader(reader);
        for row in csv_reader.deserialize() {
            let row: PostalRow = row?;
            let city = row.city_name.map(|name| City::new(None, name, None));
            let province = match (row.province_name, row.province_abbrev) {
                (None, None) => None,
                (name, abbrev) => Some(Province::new(
                    None,
                    name.unwrap_or_default(),
                    abbrev.unwrap_or_default(),
                )),
            };
            geocoder.insert(&row.postal_code, Address::new(city, province));
        }
        tracing::debug!("Loaded {} postal code(s)", geocoder.len());
        Ok(geocoder)
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn lookup(&self, postal_code: &str) -> Result<Option<Address>> {
        Ok(self
            .entries
            .get(&normalize_postal_code(postal_code))
            .cloned())
    }
}
