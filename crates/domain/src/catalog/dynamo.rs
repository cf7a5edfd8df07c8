use std::{collections::HashMap, marker::PhantomData};

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;

use crate::errors::Error;

use super::{Entity, Repository};

const PK: &str = "pk";
const KIND: &str = "kind";

/// Registry stored in a shared DynamoDB table.
///
/// Items are the entity's own attributes plus `pk = "<Kind>#<id>"` and
/// `kind = "<Kind>"`.
pub struct DynamoRepository<T> {
    client: aws_sdk_dynamodb::Client,
    table: String,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> DynamoRepository<T> {
    pub fn new(client: aws_sdk_dynamodb::Client, table: &str) -> Self {
        Self {
            client,
            table: table.to_string(),
            _entity: PhantomData,
        }
    }

    fn key(id: &str) -> AttributeValue {
        AttributeValue::S(format!("{}#{}", T::KIND, id))
    }

    fn encode(entity: &T) -> Result<HashMap<String, AttributeValue>, Error> {
        let mut item: HashMap<String, AttributeValue> =
            serde_dynamo::to_item(entity).map_err(Error::storage)?;
        item.insert(PK.to_string(), Self::key(entity.id()));
        item.insert(KIND.to_string(), AttributeValue::S(T::KIND.to_string()));
        Ok(item)
    }

    fn decode(item: &HashMap<String, AttributeValue>) -> Result<T, Error> {
        serde_dynamo::from_item(item.clone()).map_err(Error::storage)
    }

    async fn put(&self, entity: &T, condition: &str) -> Result<bool, Error> {
        let result = self
            .client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(Self::encode(entity)?))
            .condition_expression(condition)
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(err) => {
                let err = err.into_service_error();
                if err.is_conditional_check_failed_exception() {
                    Ok(false)
                } else {
                    Err(Error::storage(err))
                }
            }
        }
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for DynamoRepository<T> {
    async fn create(&self, entity: T) -> Result<T, Error> {
        if !self.put(&entity, "attribute_not_exists(pk)").await? {
            return Err(Error::Uniqueness {
                field: "id".to_string(),
            });
        }
        Ok(entity)
    }

    async fn get(&self, id: &str) -> Result<Option<T>, Error> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(PK, Self::key(id))
            .send()
            .await
            .map_err(|e| Error::storage(e.into_service_error()))?;

        output.item().map(Self::decode).transpose()
    }

    async fn list(&self) -> Result<Vec<T>, Error> {
        let mut entities = Vec::new();
        let mut start_key = None;

        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table)
                .filter_expression("#kind = :kind")
                .expression_attribute_names("#kind", KIND)
                .expression_attribute_values(":kind", AttributeValue::S(T::KIND.to_string()))
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(|e| Error::storage(e.into_service_error()))?;

            for item in output.items() {
                entities.push(Self::decode(item)?);
            }

            match output.last_evaluated_key() {
                Some(key) => start_key = Some(key.clone()),
                None => break,
            }
        }

        tracing::debug!("Listed {} {} entries", entities.len(), T::KIND);
        Ok(entities)
    }

    async fn update(&self, entity: T) -> Result<T, Error> {
        if !self.put(&entity, "attribute_exists(pk)").await? {
            return Err(Error::not_found(T::KIND));
        }
        Ok(entity)
    }

    async fn delete(&self, id: &str) -> Result<(), Error> {
        let result = self
            .client
            .delete_item()
            .table_name(&self.table)
            .key(PK, Self::key(id))
            .condition_expression("attribute_exists(pk)")
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) => {
                let err = err.into_service_error();
                if err.is_conditional_check_failed_exception() {
                    Err(Error::not_found(T::KIND))
                } else {
                    Err(Error::storage(err))
                }
            }
        }
    }
}
