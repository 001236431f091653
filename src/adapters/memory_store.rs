use crate::domain::model::City;
use crate::domain::ports::CityStore;
use crate::domain::query::CityQuery;
use crate::utils::error::{Result, ServiceError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

/// City store held in memory, iterated in ascending id order.
#[derive(Debug, Default)]
pub struct InMemoryCityStore {
    cities: RwLock<BTreeMap<i64, City>>,
    next_id: AtomicI64,
}

impl InMemoryCityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.cities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cities.read().await.is_empty()
    }

    fn allocate_id(&self, explicit: Option<i64>) -> i64 {
        match explicit {
            Some(id) => {
                self.next_id.fetch_max(id, Ordering::SeqCst);
                id
            }
            None => self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
        }
    }
}

#[async_trait]
impl CityStore for InMemoryCityStore {
    async fn find(&self, query: &CityQuery) -> Result<Vec<City>> {
        let cities = self.cities.read().await;
        Ok(cities
            .values()
            .filter(|city| query.matches(city))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<City>> {
        Ok(self.cities.read().await.get(&id).cloned())
    }

    async fn save(&self, mut city: City) -> Result<City> {
        let id = self.allocate_id(city.id);
        city.id = Some(id);
        self.cities.write().await.insert(id, city.clone());
        Ok(city)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.cities.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(ServiceError::NotFoundError {
                entity: "City".to_string(),
                id: id.to_string(),
            }),
        }
    }
}
