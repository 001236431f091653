use crate::domain::model::City;
use crate::domain::ports::CitySearchIndex;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Word-prefix index over city names.
///
/// Every whitespace-separated term of a query must match the start of some
/// word of the name, ignoring case. A trailing `*` on a term is accepted and
/// ignored. A blank query matches every indexed city.
#[derive(Debug, Default)]
pub struct InMemorySearchIndex {
    documents: RwLock<BTreeMap<i64, City>>,
}

impl InMemorySearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

fn terms(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(|term| term.trim_end_matches('*').to_lowercase())
        .filter(|term| !term.is_empty())
        .collect()
}

fn matches(name: &str, terms: &[String]) -> bool {
    let words: Vec<String> = name
        .split(|c: char| c.is_whitespace() || c == '-')
        .map(str::to_lowercase)
        .collect();
    terms
        .iter()
        .all(|term| words.iter().any(|word| word.starts_with(term.as_str())))
}

#[async_trait]
impl CitySearchIndex for InMemorySearchIndex {
    async fn save(&self, city: &City) -> Result<()> {
        // Unsaved cities have nothing to key on.
        if let Some(id) = city.id {
            self.documents.write().await.insert(id, city.clone());
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.documents.write().await.remove(&id);
        Ok(())
    }

    async fn search(&self, query: &str) -> Result<Vec<City>> {
        let wanted = terms(query);
        let documents = self.documents.read().await;
        Ok(documents
            .values()
            .filter(|city| matches(&city.name, &wanted))
            .cloned()
            .collect())
    }
}
