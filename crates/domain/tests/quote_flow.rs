//! End-to-end quote workflow over the in-memory event store.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::Utc;
use cqrs_es::{mem_store::MemStore, AggregateError, CqrsFramework, EventEnvelope, Query, View as _};
use domain::{
    catalog::{
        models::{MedicalTeamMemberInput, SupplierInput, SurgicalMaterialInput, SurgicalProcedureInput},
        Catalog, Complexity, MedicalTeamMember, SurgicalMaterial, SurgicalProcedure, Supplier,
        TeamRole,
    },
    config::PricingConfig,
    quotes::{
        builder, workflow,
        inputs::{MaterialSelection, NewQuoteInput, TeamSelection},
        pricing::{CostInputs, FacilityRate},
        Command, PatientInfo, Quote, QuoteStatus, ReportStatus, ResponseDraft, Services, View,
    },
    Error,
};

#[derive(Clone, Default)]
struct Views(Arc<Mutex<HashMap<String, View>>>);

impl Views {
    fn get(&self, id: &str) -> View {
        self.0.lock().unwrap().get(id).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl Query<Quote> for Views {
    async fn dispatch(&self, quote_id: &str, events: &[EventEnvelope<Quote>]) {
        let mut views = self.0.lock().unwrap();
        let view = views.entry(quote_id.to_string()).or_default();
        for event in events {
            view.update(event);
        }
    }
}

async fn seeded_catalog() -> Catalog {
    let catalog = Catalog::in_memory();
    let now = Utc::now();

    catalog
        .register::<Supplier>(
            "1".into(),
            SupplierInput {
                name: "Johnson Medical Supplies".into(),
                contact_name: "Robert Johnson".into(),
                email: "robert.j@johnsonmedical.com".into(),
                phone: "(555) 123-4567".into(),
                address: "123 Medical Drive, Suite 100, Boston, MA 02108".into(),
                materials: vec!["1".into(), "3".into()],
                preferred_payment_terms: "Net 30".into(),
            },
            now,
        )
        .await
        .unwrap();

    for (id, name, price) in [("1", "Titanium Hip Implant", 2500.0), ("3", "Absorbable Sutures", 75.0)] {
        catalog
            .register::<SurgicalMaterial>(
                id.into(),
                SurgicalMaterialInput {
                    name: name.into(),
                    description: String::new(),
                    category: "Orthopedic".into(),
                    supplier_ids: vec!["1".into()],
                    unit_price: price,
                    stock_quantity: 20,
                    required_approval: false,
                },
                now,
            )
            .await
            .unwrap();
    }

    catalog
        .register::<SurgicalProcedure>(
            "proc1".into(),
            SurgicalProcedureInput {
                name: "Hip Replacement".into(),
                description: String::new(),
                category: "surgical".into(),
                duration_minutes: 150,
                recommended_materials: vec!["1".into()],
                complexity: Complexity::High,
            },
            now,
        )
        .await
        .unwrap();

    catalog
        .register::<MedicalTeamMember>(
            "doc1".into(),
            MedicalTeamMemberInput {
                name: "Dr. Jane Smith".into(),
                role: TeamRole::Doctor,
                specialization: "Orthopedic Surgery".into(),
                email: "jane.smith@example.com".into(),
                phone: "(555) 123-4567".into(),
                license: Some("MED12345".into()),
            },
            now,
        )
        .await
        .unwrap();

    catalog
}

fn new_quote() -> NewQuoteInput {
    NewQuoteInput {
        patient_info: PatientInfo {
            id: Some("p1".into()),
            name: "John Smith".into(),
            age: 63,
            contact_number: "(555) 111-2222".into(),
            email: "john.smith@example.com".into(),
            address: "77 Harbor Rd".into(),
            ..Default::default()
        },
        procedure_id: "proc1".into(),
        materials: vec![
            MaterialSelection {
                material_id: "1".into(),
                quantity: 1,
                supplier_id: "1".into(),
                hospital_registered: true,
            },
            MaterialSelection {
                material_id: "3".into(),
                quantity: 2,
                supplier_id: "1".into(),
                hospital_registered: true,
            },
        ],
        medical_team: vec![TeamSelection {
            member_id: "doc1".into(),
            fee: 500.0,
        }],
        hospital_anesthesiologist: false,
        duration_hours: 2.5,
        blood_bags_needed: 0,
        comorbidities: Default::default(),
        additional_notes: "Left hip".into(),
    }
}

fn response(id: &str) -> ResponseDraft {
    ResponseDraft {
        response_id: id.into(),
        inputs: CostInputs {
            hospital_facility: FacilityRate::Flat { amount: 1000.0 },
            ..Default::default()
        },
        valid_until: None,
        notes: String::new(),
        responded_by: "doc1".into(),
    }
}

#[tokio::test]
async fn request_response_report_approval() {
    let views = Views::default();
    let cqrs = CqrsFramework::new(
        MemStore::<Quote>::default(),
        vec![Box::new(views.clone())],
        Services::new(PricingConfig::default()),
    );
    let catalog = seeded_catalog().await;

    let request = builder::build_request(&catalog, "Q1001".into(), "doc1".into(), new_quote(), Utc::now())
        .await
        .unwrap();
    cqrs.execute("Q1001", Command::RequestQuote { request, supersedes: None })
        .await
        .unwrap();
    assert_eq!(views.get("Q1001").quote.status(), QuoteStatus::Pending);

    cqrs.execute("Q1001", Command::AttachResponse { response: response("R1") })
        .await
        .unwrap();
    let quote = views.get("Q1001").quote;
    assert_eq!(quote.status(), QuoteStatus::Estimated);
    assert_eq!(quote.response.as_ref().unwrap().total_estimated_cost, 4150.0);

    let second = cqrs
        .execute("Q1001", Command::AttachResponse { response: response("R2") })
        .await;
    assert!(matches!(
        second,
        Err(AggregateError::UserError(Error::Uniqueness { .. }))
    ));

    for command in [
        Command::GenerateReport {
            report_id: "RP1".into(),
            generated_by: "doc1".into(),
        },
        Command::SendReport { sent_by: "doc1".into() },
        Command::MarkReportViewed { viewed_by: "p1".into() },
        Command::ApproveQuote { approved_by: "p1".into() },
    ] {
        cqrs.execute("Q1001", command).await.unwrap();
    }

    let view = views.get("Q1001");
    assert_eq!(view.aggregate_type, "Quote");
    let report = view.quote.report().unwrap();
    assert_eq!(report.status, ReportStatus::Accepted);
    assert_eq!(report.generated_by, "doc1");
    assert_eq!(report.quote_request.status, QuoteStatus::Approved);

    let after_terminal = cqrs
        .execute("Q1001", Command::RejectQuote { rejected_by: "p1".into(), reason: String::new() })
        .await;
    assert!(matches!(
        after_terminal,
        Err(AggregateError::UserError(Error::InvalidStateTransition { .. }))
    ));
}

#[tokio::test]
async fn superseding_links_both_quotes() {
    let views = Views::default();
    let cqrs = CqrsFramework::new(
        MemStore::<Quote>::default(),
        vec![Box::new(views.clone())],
        Services::default(),
    );
    let catalog = seeded_catalog().await;

    let first = builder::build_request(&catalog, "Q1".into(), "doc1".into(), new_quote(), Utc::now())
        .await
        .unwrap();
    cqrs.execute("Q1", Command::RequestQuote { request: first, supersedes: None })
        .await
        .unwrap();

    let mut revised = new_quote();
    revised.blood_bags_needed = 2;
    let second = builder::build_request(&catalog, "Q2".into(), "doc1".into(), revised, Utc::now())
        .await
        .unwrap();
    workflow::supersede(&cqrs, "Q1", second, HashMap::new())
        .await
        .unwrap();

    assert_eq!(views.get("Q1").quote.superseded_by.as_deref(), Some("Q2"));
    assert_eq!(views.get("Q2").quote.supersedes.as_deref(), Some("Q1"));

    let frozen = cqrs
        .execute("Q1", Command::AttachResponse { response: response("R1") })
        .await;
    assert!(matches!(frozen, Err(AggregateError::UserError(Error::Forbidden))));
}

#[tokio::test]
async fn decided_quote_is_not_superseded() {
    let views = Views::default();
    let cqrs = CqrsFramework::new(
        MemStore::<Quote>::default(),
        vec![Box::new(views.clone())],
        Services::default(),
    );
    let catalog = seeded_catalog().await;

    let first = builder::build_request(&catalog, "Q1".into(), "doc1".into(), new_quote(), Utc::now())
        .await
        .unwrap();
    cqrs.execute("Q1", Command::RequestQuote { request: first, supersedes: None })
        .await
        .unwrap();
    cqrs.execute("Q1", Command::AttachResponse { response: response("R1") })
        .await
        .unwrap();
    cqrs.execute("Q1", Command::ApproveQuote { approved_by: "p1".into() })
        .await
        .unwrap();

    let replacement = builder::build_request(&catalog, "Q2".into(), "doc1".into(), new_quote(), Utc::now())
        .await
        .unwrap();
    let result = workflow::supersede(&cqrs, "Q1", replacement, HashMap::new()).await;

    assert!(matches!(
        result,
        Err(AggregateError::UserError(Error::InvalidStateTransition { .. }))
    ));
    assert!(views.get("Q2").quote.id.is_empty());
    assert!(views.get("Q1").quote.superseded_by.is_none());
}
