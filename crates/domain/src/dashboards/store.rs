use aws_sdk_dynamodb::types::AttributeValue;
use chrono::Utc;

use crate::{config, errors::Error, quotes::StatusChange};

use super::{DashboardKey, QuoteCounters};

pub struct DashboardStore {
    client: aws_sdk_dynamodb::Client,
    table: String,
}

impl DashboardStore {
    pub fn new(client: aws_sdk_dynamodb::Client, table: &str) -> Self {
        Self {
            client,
            table: table.to_string(),
        }
    }

    pub fn from_env(client: aws_sdk_dynamodb::Client) -> Self {
        let table = config::table("DYNAMODB_DASHBOARDS_TABLE", "surgical-quotes-dashboards");
        Self::new(client, &table)
    }

    /// Atomically move one quote between counters.
    pub async fn apply(&self, key: &DashboardKey, change: StatusChange) -> Result<(), Error> {
        let mut request = self
            .client
            .update_item()
            .table_name(&self.table)
            .key("pk", AttributeValue::S(key.as_key()))
            .expression_attribute_names("#to", change.to.as_str())
            .expression_attribute_names("#updated", "updatedAt")
            .expression_attribute_values(":one", AttributeValue::N("1".to_string()))
            .expression_attribute_values(":now", AttributeValue::S(Utc::now().to_rfc3339()));

        let expression = match change.from {
            Some(from) => {
                request = request
                    .expression_attribute_names("#from", from.as_str())
                    .expression_attribute_values(":minus", AttributeValue::N("-1".to_string()));
                "SET #updated = :now ADD #to :one, #from :minus"
            }
            None => {
                request = request.expression_attribute_names("#total", "total");
                "SET #updated = :now ADD #to :one, #total :one"
            }
        };

        request
            .update_expression(expression)
            .send()
            .await
            .map_err(|e| Error::storage(e.into_service_error()))?;

        Ok(())
    }

    pub async fn load(&self, key: &DashboardKey) -> Result<QuoteCounters, Error> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key("pk", AttributeValue::S(key.as_key()))
            .send()
            .await
            .map_err(|e| Error::storage(e.into_service_error()))?;

        match output.item() {
            Some(item) => serde_dynamo::from_item(item.clone()).map_err(Error::storage),
            None => Ok(QuoteCounters::default()),
        }
    }
}
