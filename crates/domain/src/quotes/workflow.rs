use std::collections::HashMap;

use cqrs_es::{AggregateError, CqrsFramework, EventStore};

use crate::errors::Error;

use super::{model::QuoteRequest, Command, Quote};

/// Replace `previous_id` with a new request.
///
/// The old quote is frozen first; when it can no longer be superseded nothing
/// is written. Both commands share one metadata map.
pub async fn supersede<ES: EventStore<Quote>>(
    cqrs: &CqrsFramework<Quote, ES>,
    previous_id: &str,
    request: QuoteRequest,
    metadata: HashMap<String, String>,
) -> Result<(), AggregateError<Error>> {
    let new_id = request.id.clone();

    cqrs.execute_with_metadata(
        previous_id,
        Command::SupersedeQuote {
            superseded_by: new_id.clone(),
        },
        metadata.clone(),
    )
    .await?;

    tracing::info!("Quote {} superseded by {}", previous_id, new_id);

    cqrs.execute_with_metadata(
        &new_id,
        Command::RequestQuote {
            request,
            supersedes: Some(previous_id.to_string()),
        },
        metadata,
    )
    .await
}
