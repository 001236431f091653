use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Province {
    pub id: Option<i64>,
    pub name: String,
    pub abbrev: String,
}

impl Province {
    pub fn new(id: Option<i64>, name: impl Into<String>, abbrev: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            abbrev: abbrev.into(),
        }
    }

    /// Exact, case-sensitive comparison on abbreviation or name. Either is enough.
    /// A blank key is absent and never matches, not even another blank key.
    pub fn same_as(&self, other: &Province) -> bool {
        fn key_eq(a: &str, b: &str) -> bool {
            !a.trim().is_empty() && a == b
        }
        key_eq(&self.abbrev, &other.abbrev) || key_eq(&self.name, &other.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub id: Option<i64>,
    pub name: String,
    pub province: Option<Province>,
}

impl Region {
    pub fn new(id: Option<i64>, name: impl Into<String>, province: Option<Province>) -> Self {
        Self {
            id,
            name: name.into(),
            province,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub disabled: bool,
    pub region: Option<Region>,
}

impl City {
    pub fn new(id: Option<i64>, name: impl Into<String>, region: Option<Region>) -> Self {
        Self {
            id,
            name: name.into(),
            disabled: false,
            region,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// The `region.province` chain, `None` when either link is missing.
    pub fn province(&self) -> Option<&Province> {
        self.region.as_ref().and_then(|r| r.province.as_ref())
    }

    pub fn region_id(&self) -> Option<i64> {
        self.region.as_ref().and_then(|r| r.id)
    }

    pub fn province_id(&self) -> Option<i64> {
        self.province().and_then(|p| p.id)
    }
}

/// Best-effort address reported by a geocoder for a postal code.
///
/// This is a detached snapshot: ids are usually absent and nothing guarantees
/// it lines up with the records of the local store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub city: Option<City>,
    pub province: Option<Province>,
}

impl Address {
    pub fn new(city: Option<City>, province: Option<Province>) -> Self {
        Self { city, province }
    }

    pub fn city_name(&self) -> Option<&str> {
        self.city.as_ref().map(|c| c.name.as_str())
    }

    pub fn province_name(&self) -> Option<&str> {
        self.province.as_ref().map(|p| p.name.as_str())
    }
}

/// The authenticated principal on whose behalf a lookup runs.
///
/// Only ever read for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i64,
    pub login: String,
    #[serde(default)]
    pub authorities: Vec<String>,
    pub integration_id: Option<i64>,
}
