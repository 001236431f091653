use crate::domain::model::City;
use serde::{Deserialize, Serialize};

/// Flat transfer shape of a city, as handed to callers outside the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityDto {
    pub id: Option<i64>,
    pub name: String,
    pub disabled: bool,
    pub region_id: Option<i64>,
    pub region_name: Option<String>,
}

impl From<&City> for CityDto {
    fn from(city: &City) -> Self {
        Self {
            id: city.id,
            name: city.name.clone(),
            disabled: city.disabled,
            region_id: city.region_id(),
            region_name: city.region.as_ref().map(|r| r.name.clone()),
        }
    }
}

impl From<City> for CityDto {
    fn from(city: City) -> Self {
        CityDto::from(&city)
    }
}
