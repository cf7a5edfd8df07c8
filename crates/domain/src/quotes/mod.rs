/// Quote aggregate
pub mod aggregate;

/// Commands
pub mod commands;

/// Events
pub mod events;

/// Input DTOs
pub mod inputs;

/// Request, response and report records
pub mod model;

/// Cost calculator
pub mod pricing;

/// Validation schemas
pub mod rules;

/// Quote and report status machines
pub mod status;

/// Turns form selections into a request
pub mod builder;

/// View (read model)
pub mod view;

/// CQRS setup
pub mod cqrs;

/// Commands spanning two quotes
pub mod workflow;

pub use aggregate::{Quote, ReportRecord, Services, AGGREGATE_TYPE};
pub use commands::{Command, ResponseDraft};
pub use events::{Event, StatusChange};
pub use model::{
    AdditionalCost, Gender, GuardianInfo, PatientInfo, QuoteMaterial, QuoteReport, QuoteRequest,
    QuoteResponse, QuoteTeamMember,
};
pub use status::{QuoteStatus, ReportStatus};
pub use view::{Query, View};
