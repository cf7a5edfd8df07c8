use chrono::{DateTime, Utc};
use cqrs_es::DomainEvent;
use serde::{Deserialize, Serialize};

use super::{
    aggregate::ReportRecord,
    model::{QuoteRequest, QuoteResponse},
    status::QuoteStatus,
};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Event {
    QuoteRequested {
        id: String,
        request: QuoteRequest,
        supersedes: Option<String>,
        created_at: DateTime<Utc>,
    },

    ResponseAttached {
        id: String,
        response: QuoteResponse,
        updated_at: DateTime<Utc>,
    },

    ResponseReissued {
        id: String,
        response: QuoteResponse,
        previous_response_id: String,
        updated_at: DateTime<Utc>,
    },

    QuoteApproved {
        id: String,
        approved_by: String,
        updated_at: DateTime<Utc>,
    },

    QuoteRejected {
        id: String,
        rejected_by: String,
        reason: String,
        updated_at: DateTime<Utc>,
    },

    ReportGenerated {
        id: String,
        report: ReportRecord,
        updated_at: DateTime<Utc>,
    },

    ReportSent {
        id: String,
        sent_by: String,
        updated_at: DateTime<Utc>,
    },

    ReportViewed {
        id: String,
        viewed_by: String,
        updated_at: DateTime<Utc>,
    },

    QuoteSuperseded {
        id: String,
        superseded_by: String,
        updated_at: DateTime<Utc>,
    },
}

/// Movement of a quote between statuses; `from` is `None` on creation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StatusChange {
    pub from: Option<QuoteStatus>,
    pub to: QuoteStatus,
}

impl Event {
    pub fn status_change(&self) -> Option<StatusChange> {
        let (from, to) = match self {
            Event::QuoteRequested { .. } => (None, QuoteStatus::Pending),
            Event::ResponseAttached { .. } => (Some(QuoteStatus::Pending), QuoteStatus::Estimated),
            Event::QuoteApproved { .. } => (Some(QuoteStatus::Estimated), QuoteStatus::Approved),
            Event::QuoteRejected { .. } => (Some(QuoteStatus::Estimated), QuoteStatus::Rejected),
            _ => return None,
        };
        Some(StatusChange { from, to })
    }
}

impl DomainEvent for Event {
    fn event_type(&self) -> String {
        match self {
            Event::QuoteRequested { .. } => "Quote:Requested".to_string(),
            Event::ResponseAttached { .. } => "Quote:ResponseAttached".to_string(),
            Event::ResponseReissued { .. } => "Quote:ResponseReissued".to_string(),
            Event::QuoteApproved { .. } => "Quote:Approved".to_string(),
            Event::QuoteRejected { .. } => "Quote:Rejected".to_string(),
            Event::ReportGenerated { .. } => "Quote:ReportGenerated".to_string(),
            Event::ReportSent { .. } => "Quote:ReportSent".to_string(),
            Event::ReportViewed { .. } => "Quote:ReportViewed".to_string(),
            Event::QuoteSuperseded { .. } => "Quote:Superseded".to_string(),
        }
    }

    fn event_version(&self) -> String {
        "1.0".to_string()
    }
}
