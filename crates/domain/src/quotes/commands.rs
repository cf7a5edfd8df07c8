use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{model::QuoteRequest, pricing::CostInputs};

/// Staff-entered answer to a quote request, before pricing.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ResponseDraft {
    pub response_id: String,
    pub inputs: CostInputs,
    /// Defaults to the configured validity window
    pub valid_until: Option<DateTime<Utc>>,
    pub notes: String,
    pub responded_by: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum Command {
    /// Submit a new quote request
    RequestQuote {
        request: QuoteRequest,
        supersedes: Option<String>,
    },

    /// Attach the first cost estimate (pending -> estimated)
    AttachResponse {
        response: ResponseDraft,
    },

    /// Replace the estimate with a new response id
    ReissueResponse {
        response: ResponseDraft,
    },

    ApproveQuote {
        approved_by: String,
    },

    RejectQuote {
        rejected_by: String,
        reason: String,
    },

    /// Produce the patient-facing report
    GenerateReport {
        report_id: String,
        generated_by: String,
    },

    SendReport {
        sent_by: String,
    },

    MarkReportViewed {
        viewed_by: String,
    },

    /// Freeze this quote in favour of a newer request
    SupersedeQuote {
        superseded_by: String,
    },
}
