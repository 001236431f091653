use crate::domain::model::City;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameMatch {
    Exact(String),
    Prefix(String),
}

impl NameMatch {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            NameMatch::Exact(expected) => name == expected,
            NameMatch::Prefix(prefix) => name.starts_with(prefix.as_str()),
        }
    }
}

/// Conjunctive filter over cities. Unset fields do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CityQuery {
    pub name: Option<NameMatch>,
    pub province_id: Option<i64>,
    pub province_name: Option<String>,
    pub region_id: Option<i64>,
    pub enabled_only: bool,
}

impl CityQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name_eq(mut self, name: impl Into<String>) -> Self {
        self.name = Some(NameMatch::Exact(name.into()));
        self
    }

    pub fn name_starts_with(mut self, prefix: impl Into<String>) -> Self {
        self.name = Some(NameMatch::Prefix(prefix.into()));
        self
    }

    pub fn province_id(mut self, id: i64) -> Self {
        self.province_id = Some(id);
        self
    }

    pub fn province_name(mut self, name: impl Into<String>) -> Self {
        self.province_name = Some(name.into());
        self
    }

    pub fn region_id(mut self, id: i64) -> Self {
        self.region_id = Some(id);
        self
    }

    pub fn enabled_only(mut self) -> Self {
        self.enabled_only = true;
        self
    }

    pub fn matches(&self, city: &City) -> bool {
        if let Some(name) = &self.name {
            if !name.matches(&city.name) {
                return false;
            }
        }
        if let Some(id) = self.province_id {
            if city.province_id() != Some(id) {
                return false;
            }
        }
        if let Some(province_name) = &self.province_name {
            if city.province().map(|p| p.name.as_str()) != Some(province_name.as_str()) {
                return false;
            }
        }
        if let Some(id) = self.region_id {
            if city.region_id() != Some(id) {
                return false;
            }
        }
        !(self.enabled_only && city.disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Province, Region};

    fn toronto() -> City {
        City::new(
            Some(1),
            "Toronto",
            Some(Region::new(
                Some(7),
                "GTA",
                Some(Province::new(Some(3), "Ontario", "ON")),
            )),
        )
    }

    #[test]
    fn test_empty_query_matches_everything() {
        assert!(CityQuery::new().matches(&toronto()));
        assert!(CityQuery::new().matches(&toronto().disabled()));
    }

    #[test]
    fn test_conjunctive_filters() {
        let query = CityQuery::new()
            .name_eq("Toronto")
            .province_id(3)
            .region_id(7)
            .enabled_only();
        assert!(query.matches(&toronto()));
        assert!(!query.matches(&toronto().disabled()));
        assert!(!CityQuery::new().province_id(4).matches(&toronto()));
        assert!(!CityQuery::new().region_id(8).matches(&toronto()));
    }

    #[test]
    fn test_name_matching() {
        assert!(CityQuery::new().name_starts_with("Tor").matches(&toronto()));
        assert!(!CityQuery::new().name_eq("Tor").matches(&toronto()));
        assert!(!CityQuery::new().name_starts_with("tor").matches(&toronto()));
    }

    #[test]
    fn test_province_filters_require_complete_chain() {
        let orphan = City::new(Some(2), "Toronto", None);
        assert!(!CityQuery::new().province_id(3).matches(&orphan));
        assert!(!CityQuery::new().province_name("Ontario").matches(&orphan));
        assert!(CityQuery::new().province_name("Ontario").matches(&toronto()));
    }
}
