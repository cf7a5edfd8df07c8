//! Registries the quote builder resolves selections against: medical team,
//! materials, procedures and suppliers.

/// Registry records and their input DTOs
pub mod models;

/// In-process store
pub mod memory;

/// DynamoDB store
pub mod dynamo;

use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::{errors::Error, validation::Schema};

pub use memory::MemoryRepository;
pub use dynamo::DynamoRepository;
pub use models::{
    Complexity, MedicalTeamMember, SurgicalMaterial, SurgicalProcedure, Supplier, TeamRole,
};

/// A record kept in one of the registries.
pub trait Entity: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Registry name, also the key prefix in shared tables
    const KIND: &'static str;

    /// Fields the caller supplies; id and creation date are assigned.
    type Input: DeserializeOwned + Send + 'static;

    fn id(&self) -> &str;

    fn created_at(&self) -> DateTime<Utc>;

    fn from_input(id: String, created_at: DateTime<Utc>, input: Self::Input) -> Self;

    fn schema() -> Schema<Self>;

    fn repository(catalog: &Catalog) -> &SharedRepository<Self>;
}

#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Fails with `Uniqueness` when the id is taken.
    async fn create(&self, entity: T) -> Result<T, Error>;

    async fn get(&self, id: &str) -> Result<Option<T>, Error>;

    async fn list(&self) -> Result<Vec<T>, Error>;

    /// Fails with `NotFound` when the id is unknown.
    async fn update(&self, entity: T) -> Result<T, Error>;

    /// Fails with `NotFound` when the id is unknown.
    async fn delete(&self, id: &str) -> Result<(), Error>;
}

pub type SharedRepository<T> = Arc<dyn Repository<T>>;

#[derive(Clone)]
pub struct Catalog {
    pub team_members: SharedRepository<MedicalTeamMember>,
    pub materials: SharedRepository<SurgicalMaterial>,
    pub procedures: SharedRepository<SurgicalProcedure>,
    pub suppliers: SharedRepository<Supplier>,
}

impl Catalog {
    pub fn in_memory() -> Self {
        Self {
            team_members: Arc::new(MemoryRepository::default()),
            materials: Arc::new(MemoryRepository::default()),
            procedures: Arc::new(MemoryRepository::default()),
            suppliers: Arc::new(MemoryRepository::default()),
        }
    }

    /// All registries share one table, partitioned by `Kind#id`.
    pub fn dynamo(client: aws_sdk_dynamodb::Client, table: &str) -> Self {
        Self {
            team_members: Arc::new(DynamoRepository::new(client.clone(), table)),
            materials: Arc::new(DynamoRepository::new(client.clone(), table)),
            procedures: Arc::new(DynamoRepository::new(client.clone(), table)),
            suppliers: Arc::new(DynamoRepository::new(client, table)),
        }
    }

    pub async fn register<T: Entity>(
        &self,
        id: String,
        input: T::Input,
        created_at: DateTime<Utc>,
    ) -> Result<T, Error> {
        let entity = T::from_input(id, created_at, input);
        T::schema().validate(&entity)?;
        T::repository(self).create(entity).await
    }

    /// Replace an entry's fields, keeping its id and creation date.
    pub async fn revise<T: Entity>(&self, id: &str, input: T::Input) -> Result<T, Error> {
        let existing = self.require::<T>(id).await?;
        let entity = T::from_input(existing.id().to_string(), existing.created_at(), input);
        T::schema().validate(&entity)?;
        T::repository(self).update(entity).await
    }

    pub async fn remove<T: Entity>(&self, id: &str) -> Result<(), Error> {
        T::repository(self).delete(id).await
    }

    pub async fn find<T: Entity>(&self, id: &str) -> Result<Option<T>, Error> {
        T::repository(self).get(id).await
    }

    pub async fn require<T: Entity>(&self, id: &str) -> Result<T, Error> {
        self.find::<T>(id)
            .await?
            .ok_or_else(|| Error::not_found(T::KIND))
    }

    pub async fn list<T: Entity>(&self) -> Result<Vec<T>, Error> {
        T::repository(self).list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::models::SupplierInput;

    fn supplier() -> SupplierInput {
        SupplierInput {
            name: "Johnson Medical Supplies".into(),
            contact_name: "Robert Johnson".into(),
            email: "robert.j@johnsonmedical.com".into(),
            phone: "(555) 123-4567".into(),
            address: "123 Medical Drive, Suite 100, Boston, MA 02108".into(),
            materials: vec!["1".into(), "3".into()],
            preferred_payment_terms: "Net 30".into(),
        }
    }

    #[tokio::test]
    async fn register_revise_remove() {
        let catalog = Catalog::in_memory();
        let created_at = Utc::now();

        let created: Supplier = catalog
            .register("1".into(), supplier(), created_at)
            .await
            .unwrap();
        assert_eq!(created.name, "Johnson Medical Supplies");

        let revised: Supplier = catalog
            .revise(
                "1",
                SupplierInput {
                    preferred_payment_terms: "Net 45".into(),
                    ..supplier()
                },
            )
            .await
            .unwrap();
        assert_eq!(revised.preferred_payment_terms, "Net 45");
        assert_eq!(revised.created_at, created_at);

        catalog.remove::<Supplier>("1").await.unwrap();
        assert!(catalog.find::<Supplier>("1").await.unwrap().is_none());
        assert!(matches!(
            catalog.remove::<Supplier>("1").await,
            Err(Error::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn register_validates_before_storing() {
        let catalog = Catalog::in_memory();
        let result = catalog
            .register::<Supplier>(
                "1".into(),
                SupplierInput {
                    email: "robert.j".into(),
                    ..supplier()
                },
                Utc::now(),
            )
            .await;

        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(catalog.list::<Supplier>().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_ids_conflict() {
        let catalog = Catalog::in_memory();
        catalog
            .register::<Supplier>("1".into(), supplier(), Utc::now())
            .await
            .unwrap();
        let again = catalog
            .register::<Supplier>("1".into(), supplier(), Utc::now())
            .await;
        assert!(matches!(again, Err(Error::Uniqueness { .. })));
    }

    #[tokio::test]
    async fn revise_unknown_is_not_found() {
        let catalog = Catalog::in_memory();
        let result = catalog.revise::<Supplier>("missing", supplier()).await;
        assert!(matches!(result, Err(Error::NotFound { entity }) if entity == "Supplier"));
    }
}
