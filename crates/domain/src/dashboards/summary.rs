//! One row per quote and owner, listed newest first on the dashboards.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    config,
    errors::Error,
    quotes::{Quote, QuoteRequest, QuoteStatus, ReportStatus},
};

use super::DashboardKey;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummary {
    pub id: String,
    pub patient_id: Option<String>,
    pub patient_name: String,
    pub doctor_id: String,
    pub doctor_name: Option<String>,
    pub procedure_name: String,
    pub request_date: DateTime<Utc>,
    pub status: QuoteStatus,
    pub total_estimated_cost: Option<f64>,
    pub valid_until: Option<DateTime<Utc>>,
    pub report_status: Option<ReportStatus>,
    pub superseded_by: Option<String>,
}

impl QuoteSummary {
    pub fn from_request(request: &QuoteRequest) -> Self {
        let doctor_name = request
            .medical_team
            .iter()
            .find(|m| m.member_id == request.doctor_id)
            .or_else(|| request.medical_team.iter().find(|m| m.role == "doctor"))
            .map(|m| m.name.clone());

        Self {
            id: request.id.clone(),
            patient_id: request.patient_info.id.clone(),
            patient_name: request.patient_info.name.clone(),
            doctor_id: request.doctor_id.clone(),
            doctor_name,
            procedure_name: request.procedure_name.clone(),
            request_date: request.request_date,
            status: request.status,
            ..Default::default()
        }
    }

    pub fn of(quote: &Quote) -> Self {
        let response = quote.response.as_ref();
        Self {
            total_estimated_cost: response.map(|r| r.total_estimated_cost),
            valid_until: response.map(|r| r.valid_until),
            report_status: quote.report.as_ref().map(|r| r.status),
            superseded_by: quote.superseded_by.clone(),
            ..Self::from_request(&quote.request)
        }
    }
}

#[derive(Serialize, Deserialize)]
struct SummaryRow {
    pk: String,
    sk: String,
    #[serde(flatten)]
    summary: QuoteSummary,
}

pub struct SummaryStore {
    client: aws_sdk_dynamodb::Client,
    table: String,
}

impl SummaryStore {
    pub fn new(client: aws_sdk_dynamodb::Client, table: &str) -> Self {
        Self {
            client,
            table: table.to_string(),
        }
    }

    pub fn from_env(client: aws_sdk_dynamodb::Client) -> Self {
        let table = config::table("DYNAMODB_QUOTE_SUMMARIES_TABLE", "surgical-quotes-summaries");
        Self::new(client, &table)
    }

    /// Overwrites the owner's row for this quote.
    pub async fn put(&self, key: &DashboardKey, summary: &QuoteSummary) -> Result<(), Error> {
        let row = SummaryRow {
            pk: key.as_key(),
            sk: summary.id.clone(),
            summary: summary.clone(),
        };
        let item = serde_dynamo::to_item(row).map_err(Error::storage)?;

        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| Error::storage(e.into_service_error()))?;

        Ok(())
    }

    /// Quote ids are ULIDs, so descending sort keys are newest first.
    pub async fn list(
        &self,
        key: &DashboardKey,
        limit: Option<usize>,
    ) -> Result<Vec<QuoteSummary>, Error> {
        let mut summaries = Vec::new();
        let mut start_key: Option<HashMap<String, AttributeValue>> = None;

        loop {
            let output = self
                .client
                .query()
                .table_name(&self.table)
                .key_condition_expression("pk = :pk")
                .expression_attribute_values(":pk", AttributeValue::S(key.as_key()))
                .scan_index_forward(false)
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(|e| Error::storage(e.into_service_error()))?;

            for item in output.items() {
                let row: SummaryRow = serde_dynamo::from_item(item.clone()).map_err(Error::storage)?;
                summaries.push(row.summary);
            }

            start_key = output.last_evaluated_key().cloned();
            let filled = limit.is_some_and(|limit| summaries.len() >= limit);
            if start_key.is_none() || filled {
                break;
            }
        }

        if let Some(limit) = limit {
            summaries.truncate(limit);
        }
        Ok(summaries)
    }
}
