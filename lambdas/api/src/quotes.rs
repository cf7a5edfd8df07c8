use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use domain::{
    dashboards::DashboardKey,
    quotes::{
        builder,
        inputs::{NewQuoteInput, QuoteResponseInput, RejectQuoteInput},
        workflow, Command, ResponseDraft, View,
    },
    Error, Session,
};
use ulid::Ulid;

use crate::{errors::ApiError, session::CurrentSession, AppState};

fn metadata() -> HashMap<String, String> {
    let mut metadata = HashMap::new();
    metadata.insert("command_id".to_string(), Ulid::new().to_string());
    metadata
}

async fn execute(state: &AppState, id: &str, command: Command) -> Result<View, ApiError> {
    state
        .quotes_cqrs
        .execute_with_metadata(id, command, metadata())
        .await?;

    load(state, id).await
}

async fn load(state: &AppState, id: &str) -> Result<View, ApiError> {
    state
        .quotes_repo
        .load(id)
        .await?
        .filter(|view| !view.quote.id.is_empty())
        .ok_or_else(|| Error::not_found("Quote").into())
}

/// Load a quote the session is allowed to see.
async fn load_for(state: &AppState, session: &Session, id: &str) -> Result<View, ApiError> {
    let view = load(state, id).await?;
    session.require_access(view.quote.patient_id())?;
    Ok(view)
}

async fn request_quote(
    state: &AppState,
    doctor_id: &str,
    input: NewQuoteInput,
) -> Result<View, ApiError> {
    let id = Ulid::new().to_string();
    let request =
        builder::build_request(&state.catalog, id.clone(), doctor_id.to_string(), input, Utc::now())
            .await?;

    tracing::info!("Requesting quote {} for doctor {}", id, doctor_id);
    execute(state, &id, Command::RequestQuote { request, supersedes: None }).await
}

/// Quotes listed for the caller: a doctor's own requests or a patient's quotes.
pub fn owner_key(session: &Session) -> DashboardKey {
    match session {
        Session::Medical { user_id } => DashboardKey::Doctor(user_id.clone()),
        Session::Patient { user_id } => DashboardKey::Patient(user_id.clone()),
    }
}

fn draft(input: QuoteResponseInput, responded_by: &str) -> ResponseDraft {
    ResponseDraft {
        response_id: Ulid::new().to_string(),
        inputs: input.costs,
        valid_until: input.valid_until,
        notes: input.notes,
        responded_by: responded_by.to_string(),
    }
}

// Create quote
pub async fn create(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(input): Json<NewQuoteInput>,
) -> Result<impl IntoResponse, ApiError> {
    let doctor_id = session.require_medical()?;
    let view = request_quote(&state, doctor_id, input).await?;

    Ok((StatusCode::CREATED, Json(view)))
}

// List quotes, newest first
pub async fn list(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<impl IntoResponse, ApiError> {
    let summaries = state.summaries.list(&owner_key(&session), None).await?;

    Ok(Json(summaries))
}

// Get quote
pub async fn get(
    Path(id): Path<String>,
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(load_for(&state, &session, &id).await?))
}

// Attach the cost estimate
pub async fn respond(
    Path(id): Path<String>,
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(input): Json<QuoteResponseInput>,
) -> Result<impl IntoResponse, ApiError> {
    let staff_id = session.require_medical()?;
    let command = Command::AttachResponse {
        response: draft(input, staff_id),
    };

    Ok(Json(execute(&state, &id, command).await?))
}

// Replace the cost estimate
pub async fn reissue(
    Path(id): Path<String>,
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(input): Json<QuoteResponseInput>,
) -> Result<impl IntoResponse, ApiError> {
    let staff_id = session.require_medical()?;
    let command = Command::ReissueResponse {
        response: draft(input, staff_id),
    };

    Ok(Json(execute(&state, &id, command).await?))
}

pub async fn approve(
    Path(id): Path<String>,
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<impl IntoResponse, ApiError> {
    load_for(&state, &session, &id).await?;
    let command = Command::ApproveQuote {
        approved_by: session.user_id().to_string(),
    };

    Ok(Json(execute(&state, &id, command).await?))
}

pub async fn reject(
    Path(id): Path<String>,
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    input: Option<Json<RejectQuoteInput>>,
) -> Result<impl IntoResponse, ApiError> {
    load_for(&state, &session, &id).await?;
    let command = Command::RejectQuote {
        rejected_by: session.user_id().to_string(),
        reason: input.map(|Json(input)| input.reason).unwrap_or_default(),
    };

    Ok(Json(execute(&state, &id, command).await?))
}

// Replace a quote with a newer request; the old one is kept read-only
pub async fn supersede(
    Path(id): Path<String>,
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(input): Json<NewQuoteInput>,
) -> Result<impl IntoResponse, ApiError> {
    let doctor_id = session.require_medical()?;

    let new_id = Ulid::new().to_string();
    let request =
        builder::build_request(&state.catalog, new_id.clone(), doctor_id.to_string(), input, Utc::now())
            .await?;

    workflow::supersede(&*state.quotes_cqrs, &id, request, metadata()).await?;
    let view = load(&state, &new_id).await?;

    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn generate_report(
    Path(id): Path<String>,
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<impl IntoResponse, ApiError> {
    let staff_id = session.require_medical()?;
    let command = Command::GenerateReport {
        report_id: Ulid::new().to_string(),
        generated_by: staff_id.to_string(),
    };
    let view = execute(&state, &id, command).await?;
    let report = view
        .quote
        .report()
        .ok_or_else(|| Error::not_found("QuoteReport"))?;

    Ok((StatusCode::CREATED, Json(report)))
}

pub async fn send_report(
    Path(id): Path<String>,
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<impl IntoResponse, ApiError> {
    let staff_id = session.require_medical()?;
    let command = Command::SendReport {
        sent_by: staff_id.to_string(),
    };

    Ok(Json(execute(&state, &id, command).await?.quote.report()))
}

// Patients mark their own report as viewed
pub async fn view_report(
    Path(id): Path<String>,
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<impl IntoResponse, ApiError> {
    if session.is_medical() {
        return Err(Error::Forbidden.into());
    }
    load_for(&state, &session, &id).await?;
    let command = Command::MarkReportViewed {
        viewed_by: session.user_id().to_string(),
    };

    Ok(Json(execute(&state, &id, command).await?.quote.report()))
}

pub async fn get_report(
    Path(id): Path<String>,
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<impl IntoResponse, ApiError> {
    let report = load_for(&state, &session, &id)
        .await?
        .quote
        .report()
        .ok_or_else(|| Error::not_found("QuoteReport"))?;

    Ok(Json(report))
}
