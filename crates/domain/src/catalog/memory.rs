use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::Error;

use super::{Entity, Repository};

/// Registry kept in process memory, ordered by id.
pub struct MemoryRepository<T> {
    items: RwLock<BTreeMap<String, T>>,
}

impl<T> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self {
            items: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<T: Entity> MemoryRepository<T> {
    pub fn with_items(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            items: RwLock::new(
                items
                    .into_iter()
                    .map(|item| (item.id().to_string(), item))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for MemoryRepository<T> {
    async fn create(&self, entity: T) -> Result<T, Error> {
        let mut items = self.items.write().await;
        if items.contains_key(entity.id()) {
            return Err(Error::Uniqueness {
                field: "id".to_string(),
            });
        }
        items.insert(entity.id().to_string(), entity.clone());
        Ok(entity)
    }

    async fn get(&self, id: &str) -> Result<Option<T>, Error> {
        Ok(self.items.read().await.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<T>, Error> {
        Ok(self.items.read().await.values().cloned().collect())
    }

    async fn update(&self, entity: T) -> Result<T, Error> {
        let mut items = self.items.write().await;
        match items.get_mut(entity.id()) {
            Some(slot) => {
                *slot = entity.clone();
                Ok(entity)
            }
            None => Err(Error::not_found(T::KIND)),
        }
    }

    async fn delete(&self, id: &str) -> Result<(), Error> {
        match self.items.write().await.remove(id) {
            Some(_) => Ok(()),
            None => Err(Error::not_found(T::KIND)),
        }
    }
}
