use axum::{extract::State, response::IntoResponse, Json};
use domain::{dashboards::MedicalDashboard, Session};
use serde_json::json;

use crate::{errors::ApiError, quotes::owner_key, session::CurrentSession, AppState};

const RECENT_QUOTES: usize = 5;

// Medical staff see their quotes plus registry health; patients their own quotes
pub async fn get(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<impl IntoResponse, ApiError> {
    let key = owner_key(&session);
    let quotes = state.dashboards.load(&key).await?;
    let recent_quotes = state.summaries.list(&key, Some(RECENT_QUOTES)).await?;

    let body = match session {
        Session::Medical { .. } => {
            let dashboard =
                MedicalDashboard::build(quotes, &state.catalog, state.low_stock_threshold).await?;
            json!({ "dashboard": dashboard, "recentQuotes": recent_quotes })
        }
        Session::Patient { .. } => json!({ "quotes": quotes, "recentQuotes": recent_quotes }),
    };

    Ok(Json(body))
}
