use crate::core::reconciler::{Reconciler, ReconciliationOutcome};
use crate::domain::model::{Actor, City};
use crate::domain::ports::{CitySearchIndex, CityStore, Geocoder};
use crate::domain::query::CityQuery;
use crate::utils::error::Result;

/// City management: CRUD against the store, search through the index, and
/// lookups that consult the geocoder.
pub struct CityService<S: CityStore, I: CitySearchIndex, G: Geocoder> {
    reconciler: Reconciler<S, G>,
    index: I,
}

impl<S: CityStore, I: CitySearchIndex, G: Geocoder> CityService<S, I, G> {
    pub fn new(store: S, index: I, geocoder: G) -> Self {
        Self {
            reconciler: Reconciler::new(store, geocoder),
            index,
        }
    }

    pub fn reconciler(&self) -> &Reconciler<S, G> {
        &self.reconciler
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    pub async fn save(&self, city: City) -> Result<City> {
        tracing::debug!("Request to save City : {:?}", city);
        let saved = self.reconciler.store().save(city).await?;
        self.index.save(&saved).await?;
        Ok(saved)
    }

    /// Lists cities. Blank `query` and non-positive ids are ignored.
    pub async fn find_all(
        &self,
        query: Option<&str>,
        province_id: Option<i64>,
        region_id: Option<i64>,
        hide_disabled: bool,
    ) -> Result<Vec<City>> {
        tracing::debug!("Request to get all Cities");

        let mut filter = CityQuery::new();
        if let Some(prefix) = query.filter(|q| !q.trim().is_empty()) {
            filter = filter.name_starts_with(prefix);
        }
        if let Some(id) = province_id.filter(|id| *id > 0) {
            filter = filter.province_id(id);
        }
        if hide_disabled {
            filter = filter.enabled_only();
        }
        if let Some(id) = region_id.filter(|id| *id > 0) {
            filter = filter.region_id(id);
        }

        self.reconciler.store().find(&filter).await
    }

    pub async fn find_one(&self, id: i64) -> Result<Option<City>> {
        tracing::debug!("Request to get City : {}", id);
        self.reconciler.store().find_by_id(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        tracing::debug!("Request to delete City : {}", id);
        self.reconciler.store().delete(id).await?;
        self.index.delete(id).await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<City>> {
        tracing::debug!("Request to search Cities for query {}", query);
        self.index.search(query).await
    }

    pub async fn reconcile(
        &self,
        city_name: &str,
        province_id: Option<i64>,
        postal_code: &str,
        actor: Option<&Actor>,
    ) -> ReconciliationOutcome {
        self.reconciler
            .reconcile(city_name, province_id, postal_code, actor)
            .await
    }

    pub async fn find_by_postal(&self, postal_code: &str) -> Option<City> {
        self.reconciler.find_by_postal(postal_code).await
    }
}
