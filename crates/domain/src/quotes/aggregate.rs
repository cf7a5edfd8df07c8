use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use cqrs_es::Aggregate;
use serde::{Deserialize, Serialize};

use crate::{config::PricingConfig, errors::Error};

use super::{
    commands::ResponseDraft,
    model::{QuoteReport, QuoteRequest, QuoteResponse},
    pricing, rules,
    status::{QuoteStatus, ReportStatus},
    Command, Event,
};

/// Upper bound on the default validity window, in days.
const MAX_VALIDITY_DAYS: i64 = 3650;

/// Report metadata kept on the quote; the full report is projected on read.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct ReportRecord {
    pub id: String,
    pub generated_by: String,
    pub generated_date: DateTime<Utc>,
    pub status: ReportStatus,
}

/// Quote aggregate: one request, at most one active response.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Quote {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    pub request: QuoteRequest,
    pub response: Option<QuoteResponse>,
    /// Ids of responses replaced by re-issuance, oldest first
    pub response_history: Vec<String>,
    pub report: Option<ReportRecord>,

    pub supersedes: Option<String>,
    pub superseded_by: Option<String>,
}

pub const AGGREGATE_TYPE: &str = "Quote";

#[derive(Clone, Debug, Default)]
pub struct Services {
    pub pricing: PricingConfig,
}

impl Services {
    pub fn new(pricing: PricingConfig) -> Self {
        Self { pricing }
    }
}

#[async_trait]
impl Aggregate for Quote {
    type Command = Command;
    type Event = Event;
    type Error = Error;
    type Services = Services;

    fn aggregate_type() -> String {
        AGGREGATE_TYPE.to_string()
    }

    async fn handle(
        &self,
        command: Self::Command,
        services: &Self::Services,
    ) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            Command::RequestQuote {
                mut request,
                supersedes,
            } => {
                self.validate_new()?;
                request.status = QuoteStatus::Pending;
                rules::request_schema().validate(&request)?;

                Ok(vec![Event::QuoteRequested {
                    id: request.id.clone(),
                    created_at: request.request_date,
                    request,
                    supersedes,
                }])
            }

            Command::AttachResponse { response } => {
                self.validate_existing()?;
                if self.response.is_some() {
                    return Err(Error::Uniqueness {
                        field: "quote_response".to_string(),
                    });
                }
                self.status().transition(QuoteStatus::Estimated)?;

                Ok(vec![Event::ResponseAttached {
                    id: self.id.clone(),
                    response: self.price(response, services)?,
                    updated_at: Utc::now(),
                }])
            }

            Command::ReissueResponse { response } => {
                self.validate_existing()?;
                let previous = match (&self.response, self.status()) {
                    (Some(previous), QuoteStatus::Estimated) => previous.id.clone(),
                    (_, status) => {
                        return Err(Error::invalid_transition(status, QuoteStatus::Estimated))
                    }
                };

                Ok(vec![Event::ResponseReissued {
                    id: self.id.clone(),
                    response: self.price(response, services)?,
                    previous_response_id: previous,
                    updated_at: Utc::now(),
                }])
            }

            Command::ApproveQuote { approved_by } => {
                self.validate_existing()?;
                self.status().transition(QuoteStatus::Approved)?;

                Ok(vec![Event::QuoteApproved {
                    id: self.id.clone(),
                    approved_by,
                    updated_at: Utc::now(),
                }])
            }

            Command::RejectQuote {
                rejected_by,
                reason,
            } => {
                self.validate_existing()?;
                self.status().transition(QuoteStatus::Rejected)?;

                Ok(vec![Event::QuoteRejected {
                    id: self.id.clone(),
                    rejected_by,
                    reason,
                    updated_at: Utc::now(),
                }])
            }

            Command::GenerateReport {
                report_id,
                generated_by,
            } => {
                self.validate_existing()?;
                if self.response.is_none() {
                    return Err(Error::not_found("QuoteResponse"));
                }
                // A new report needs a new response; see ReissueResponse.
                if self.report.is_some() {
                    return Err(Error::Uniqueness {
                        field: "quote_report".to_string(),
                    });
                }
                let status = match self.status() {
                    QuoteStatus::Approved => ReportStatus::Accepted,
                    QuoteStatus::Rejected => ReportStatus::Declined,
                    _ => ReportStatus::Draft,
                };
                let now = Utc::now();

                Ok(vec![Event::ReportGenerated {
                    id: self.id.clone(),
                    report: ReportRecord {
                        id: report_id,
                        generated_by,
                        generated_date: now,
                        status,
                    },
                    updated_at: now,
                }])
            }

            Command::SendReport { sent_by } => {
                self.validate_existing()?;
                self.report_status()?.transition(ReportStatus::Sent)?;

                Ok(vec![Event::ReportSent {
                    id: self.id.clone(),
                    sent_by,
                    updated_at: Utc::now(),
                }])
            }

            Command::MarkReportViewed { viewed_by } => {
                self.validate_existing()?;
                let status = self.report_status()?;
                if status == ReportStatus::Viewed || status.is_terminal() {
                    return Ok(vec![]);
                }
                status.transition(ReportStatus::Viewed)?;

                Ok(vec![Event::ReportViewed {
                    id: self.id.clone(),
                    viewed_by,
                    updated_at: Utc::now(),
                }])
            }

            Command::SupersedeQuote { superseded_by } => {
                self.validate_existing()?;
                if self.status().is_terminal() {
                    return Err(Error::invalid_transition(self.status(), "superseded"));
                }

                Ok(vec![Event::QuoteSuperseded {
                    id: self.id.clone(),
                    superseded_by,
                    updated_at: Utc::now(),
                }])
            }
        }
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            Event::QuoteRequested {
                id,
                request,
                supersedes,
                created_at,
            } => {
                self.id = id;
                self.created_at = created_at;
                self.updated_at = created_at;
                self.request = request;
                self.supersedes = supersedes;
            }

            Event::ResponseAttached {
                response,
                updated_at,
                ..
            } => {
                self.response = Some(response);
                self.request.status = QuoteStatus::Estimated;
                self.updated_at = updated_at;
            }

            Event::ResponseReissued {
                response,
                previous_response_id,
                updated_at,
                ..
            } => {
                self.response_history.push(previous_response_id);
                self.response = Some(response);
                self.report = None;
                self.updated_at = updated_at;
            }

            Event::QuoteApproved { updated_at, .. } => {
                self.request.status = QuoteStatus::Approved;
                self.set_report_status(ReportStatus::Accepted);
                self.updated_at = updated_at;
            }

            Event::QuoteRejected { updated_at, .. } => {
                self.request.status = QuoteStatus::Rejected;
                self.set_report_status(ReportStatus::Declined);
                self.updated_at = updated_at;
            }

            Event::ReportGenerated { report, updated_at, .. } => {
                self.report = Some(report);
                self.updated_at = updated_at;
            }

            Event::ReportSent { updated_at, .. } => {
                self.set_report_status(ReportStatus::Sent);
                self.updated_at = updated_at;
            }

            Event::ReportViewed { updated_at, .. } => {
                self.set_report_status(ReportStatus::Viewed);
                self.updated_at = updated_at;
            }

            Event::QuoteSuperseded {
                superseded_by,
                updated_at,
                ..
            } => {
                self.superseded_by = Some(superseded_by);
                self.updated_at = updated_at;
            }
        }
    }
}

impl Quote {
    pub fn status(&self) -> QuoteStatus {
        self.request.status
    }

    pub fn patient_id(&self) -> Option<&str> {
        self.request.patient_info.id.as_deref()
    }

    /// Full report, available once a response exists and a report was generated.
    pub fn report(&self) -> Option<QuoteReport> {
        let record = self.report.as_ref()?;
        let response = self.response.as_ref()?;
        if response.quote_request_id != self.request.id {
            return None;
        }

        Some(QuoteReport {
            id: record.id.clone(),
            quote_request: self.request.clone(),
            quote_response: response.clone(),
            generated_date: record.generated_date,
            generated_by: record.generated_by.clone(),
            status: record.status,
        })
    }

    fn price(&self, draft: ResponseDraft, services: &Services) -> Result<QuoteResponse, Error> {
        if draft.responded_by.trim().is_empty() {
            return Err(Error::invalid("respondedBy", "required"));
        }
        let breakdown = pricing::calculate(&self.request, &draft.inputs, &services.pricing)?;

        let now = Utc::now();
        let validity_days = services.pricing.quote_validity_days.clamp(1, MAX_VALIDITY_DAYS);
        let valid_until = draft
            .valid_until
            .unwrap_or_else(|| now + Duration::days(validity_days));
        if valid_until <= now {
            return Err(Error::invalid("validUntil", "must be in the future"));
        }

        Ok(QuoteResponse {
            id: draft.response_id,
            quote_request_id: self.request.id.clone(),
            materials_cost: breakdown.materials_cost,
            medical_team_cost: breakdown.medical_team_cost,
            hospital_facility_cost: breakdown.hospital_facility_cost,
            anesthesia_cost: breakdown.anesthesia_cost,
            blood_bank_cost: breakdown.blood_bank_cost,
            additional_costs: breakdown.additional_costs,
            total_estimated_cost: breakdown.total_estimated_cost,
            valid_until,
            notes: draft.notes,
            responded_by: draft.responded_by,
            responded_date: now,
        })
    }

    fn report_status(&self) -> Result<ReportStatus, Error> {
        self.report
            .as_ref()
            .map(|r| r.status)
            .ok_or_else(|| Error::not_found("QuoteReport"))
    }

    fn set_report_status(&mut self, status: ReportStatus) {
        if let Some(report) = self.report.as_mut() {
            report.status = status;
        }
    }

    fn validate_new(&self) -> Result<(), Error> {
        if !self.id.is_empty() {
            return Err(Error::Uniqueness { field: "id".to_string() });
        }
        Ok(())
    }

    fn validate_existing(&self) -> Result<(), Error> {
        if self.id.is_empty() {
            return Err(Error::not_found(AGGREGATE_TYPE));
        }
        if self.superseded_by.is_some() {
            return Err(Error::Forbidden);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quotes::{
        model::{PatientInfo, QuoteMaterial, QuoteTeamMember},
        pricing::{CostInputs, FacilityRate},
    };

    fn request() -> QuoteRequest {
        QuoteRequest {
            id: "Q1001".into(),
            patient_info: PatientInfo {
                id: Some("p1".into()),
                name: "John Smith".into(),
                age: 54,
                contact_number: "(555) 123-4567".into(),
                email: "john.smith@example.com".into(),
                address: "123 Medical Drive".into(),
                ..Default::default()
            },
            procedure_id: "proc1".into(),
            procedure_name: "Hip Replacement".into(),
            materials: vec![
                QuoteMaterial::new("1", "Titanium Hip Implant", 1, 2500.0, "1", "Johnson Medical Supplies", true),
                QuoteMaterial::new("3", "Absorbable Sutures", 2, 75.0, "1", "Johnson Medical Supplies", true),
            ],
            medical_team: vec![QuoteTeamMember {
                member_id: "1".into(),
                name: "Dr. Jane Smith".into(),
                role: "doctor".into(),
                fee: 500.0,
            }],
            duration_hours: 2.5,
            doctor_id: "1".into(),
            request_date: Utc::now(),
            ..Default::default()
        }
    }

    fn draft(id: &str) -> ResponseDraft {
        ResponseDraft {
            response_id: id.into(),
            inputs: CostInputs {
                hospital_facility: FacilityRate::Flat { amount: 1000.0 },
                ..Default::default()
            },
            valid_until: None,
            notes: "Includes two nights".into(),
            responded_by: "Michael Johnson".into(),
        }
    }

    async fn execute(quote: &mut Quote, command: Command) -> Result<Vec<Event>, Error> {
        let events = quote.handle(command, &Services::default()).await?;
        for event in events.clone() {
            quote.apply(event);
        }
        Ok(events)
    }

    async fn requested() -> Quote {
        let mut quote = Quote::default();
        execute(
            &mut quote,
            Command::RequestQuote {
                request: request(),
                supersedes: None,
            },
        )
        .await
        .unwrap();
        quote
    }

    async fn estimated() -> Quote {
        let mut quote = requested().await;
        execute(&mut quote, Command::AttachResponse { response: draft("R1") })
            .await
            .unwrap();
        quote
    }

    #[tokio::test]
    async fn request_starts_pending() {
        let quote = requested().await;
        assert_eq!(quote.id, "Q1001");
        assert_eq!(quote.status(), QuoteStatus::Pending);
        assert!(quote.response.is_none());
    }

    #[tokio::test]
    async fn invalid_request_is_rejected() {
        let mut bad = request();
        bad.patient_info.age = 16;
        bad.patient_info.is_minor = true;

        let result = Quote::default()
            .handle(
                Command::RequestQuote {
                    request: bad,
                    supersedes: None,
                },
                &Services::default(),
            )
            .await;
        let Err(Error::Validation(violations)) = result else {
            panic!("expected validation error");
        };
        assert!(violations.contains_field("patientInfo.guardianInfo.name"));
    }

    #[tokio::test]
    async fn request_twice_is_a_uniqueness_conflict() {
        let mut quote = requested().await;
        let result = execute(
            &mut quote,
            Command::RequestQuote {
                request: request(),
                supersedes: None,
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Uniqueness { .. })));
    }

    #[tokio::test]
    async fn attaching_response_estimates_quote() {
        let quote = estimated().await;
        let response = quote.response.as_ref().unwrap();

        assert_eq!(quote.status(), QuoteStatus::Estimated);
        assert_eq!(response.quote_request_id, "Q1001");
        assert_eq!(response.total_estimated_cost, 4150.0);
        assert!(response.is_balanced());
        assert!(response.valid_until > response.responded_date);
    }

    #[tokio::test]
    async fn second_response_conflicts() {
        let mut quote = estimated().await;
        let result = execute(&mut quote, Command::AttachResponse { response: draft("R2") }).await;
        assert!(matches!(result, Err(Error::Uniqueness { field }) if field == "quote_response"));
    }

    #[tokio::test]
    async fn reissue_replaces_response_and_clears_report() {
        let mut quote = estimated().await;
        execute(
            &mut quote,
            Command::GenerateReport {
                report_id: "RP1".into(),
                generated_by: "Michael Johnson".into(),
            },
        )
        .await
        .unwrap();

        execute(&mut quote, Command::ReissueResponse { response: draft("R2") })
            .await
            .unwrap();

        assert_eq!(quote.response.as_ref().unwrap().id, "R2");
        assert_eq!(quote.response_history, vec!["R1".to_string()]);
        assert!(quote.report.is_none());
        assert_eq!(quote.status(), QuoteStatus::Estimated);
    }

    #[tokio::test]
    async fn cannot_approve_pending_quote() {
        let mut quote = requested().await;
        let result = execute(
            &mut quote,
            Command::ApproveQuote {
                approved_by: "p1".into(),
            },
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidStateTransition { .. })));
    }

    #[tokio::test]
    async fn terminal_quote_accepts_no_transition() {
        let mut quote = estimated().await;
        execute(
            &mut quote,
            Command::RejectQuote {
                rejected_by: "p1".into(),
                reason: "Too expensive".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(quote.status(), QuoteStatus::Rejected);

        for command in [
            Command::ApproveQuote {
                approved_by: "p1".into(),
            },
            Command::ReissueResponse { response: draft("R3") },
            Command::SupersedeQuote {
                superseded_by: "Q2".into(),
            },
        ] {
            let result = execute(&mut quote, command).await;
            assert!(matches!(result, Err(Error::InvalidStateTransition { .. })));
        }
        assert!(matches!(
            execute(&mut quote, Command::AttachResponse { response: draft("R4") }).await,
            Err(Error::Uniqueness { .. })
        ));
    }

    #[tokio::test]
    async fn report_lifecycle_follows_quote() {
        let mut quote = estimated().await;
        assert!(quote.report().is_none());

        execute(
            &mut quote,
            Command::GenerateReport {
                report_id: "RP1".into(),
                generated_by: "Michael Johnson".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(quote.report().unwrap().status, ReportStatus::Draft);

        let viewed_too_early = execute(
            &mut quote,
            Command::MarkReportViewed {
                viewed_by: "p1".into(),
            },
        )
        .await;
        assert!(matches!(viewed_too_early, Err(Error::InvalidStateTransition { .. })));

        execute(&mut quote, Command::SendReport { sent_by: "doc1".into() })
            .await
            .unwrap();
        execute(
            &mut quote,
            Command::MarkReportViewed {
                viewed_by: "p1".into(),
            },
        )
        .await
        .unwrap();
        let again = execute(
            &mut quote,
            Command::MarkReportViewed {
                viewed_by: "p1".into(),
            },
        )
        .await
        .unwrap();
        assert!(again.is_empty());

        execute(
            &mut quote,
            Command::ApproveQuote {
                approved_by: "p1".into(),
            },
        )
        .await
        .unwrap();

        let report = quote.report().unwrap();
        assert_eq!(report.status, ReportStatus::Accepted);
        assert_eq!(report.quote_response.quote_request_id, report.quote_request.id);
        assert_eq!(report.quote_request.status, QuoteStatus::Approved);
    }

    #[tokio::test]
    async fn viewed_report_is_not_regenerated() {
        let mut quote = estimated().await;
        let generate = || Command::GenerateReport {
            report_id: "RP1".into(),
            generated_by: "Michael Johnson".into(),
        };
        execute(&mut quote, generate()).await.unwrap();
        execute(&mut quote, Command::SendReport { sent_by: "doc1".into() })
            .await
            .unwrap();
        execute(
            &mut quote,
            Command::MarkReportViewed {
                viewed_by: "p1".into(),
            },
        )
        .await
        .unwrap();

        let result = execute(&mut quote, generate()).await;
        assert!(matches!(result, Err(Error::Uniqueness { field }) if field == "quote_report"));
        assert_eq!(quote.report().unwrap().status, ReportStatus::Viewed);

        execute(&mut quote, Command::ReissueResponse { response: draft("R2") })
            .await
            .unwrap();
        execute(&mut quote, generate()).await.unwrap();
        assert_eq!(quote.report().unwrap().status, ReportStatus::Draft);
    }

    #[tokio::test]
    async fn report_needs_a_response() {
        let mut quote = requested().await;
        let result = execute(
            &mut quote,
            Command::GenerateReport {
                report_id: "RP1".into(),
                generated_by: "doc1".into(),
            },
        )
        .await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
    }

    #[tokio::test]
    async fn superseded_quote_is_read_only() {
        let mut quote = requested().await;
        execute(
            &mut quote,
            Command::SupersedeQuote {
                superseded_by: "Q1002".into(),
            },
        )
        .await
        .unwrap();

        assert_eq!(quote.superseded_by.as_deref(), Some("Q1002"));
        let result = execute(&mut quote, Command::AttachResponse { response: draft("R1") }).await;
        assert!(matches!(result, Err(Error::Forbidden)));
    }

    #[tokio::test]
    async fn unknown_quote_is_not_found() {
        let result = Quote::default()
            .handle(
                Command::ApproveQuote {
                    approved_by: "p1".into(),
                },
                &Services::default(),
            )
            .await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
    }

    #[tokio::test]
    async fn past_validity_is_rejected() {
        let mut quote = requested().await;
        let mut response = draft("R1");
        response.valid_until = Some(Utc::now() - Duration::days(1));

        let result = execute(&mut quote, Command::AttachResponse { response }).await;
        let Err(Error::Validation(violations)) = result else {
            panic!("expected validation error");
        };
        assert!(violations.contains_field("validUntil"));
    }
}
