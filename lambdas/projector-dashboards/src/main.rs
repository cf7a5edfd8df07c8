use anyhow::Context;
use aws_config::BehaviorVersion;
use aws_lambda_events::{
    kinesis::{KinesisEvent, KinesisEventRecord},
    streams::{KinesisBatchItemFailure, KinesisEventResponse},
};
use domain::{
    dashboards::{DashboardKey, DashboardStore, QuoteSummary, SummaryStore},
    quotes::{self, view, AGGREGATE_TYPE},
    DomainEvent,
};
use lambda_runtime::{service_fn, Error, LambdaEvent};

struct Projector {
    dashboards: DashboardStore,
    summaries: SummaryStore,
    quotes_repo: view::Repo,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
    let dynamodb_client = aws_sdk_dynamodb::Client::new(&config);

    let projector = Projector {
        dashboards: DashboardStore::from_env(dynamodb_client.clone()),
        summaries: SummaryStore::from_env(dynamodb_client.clone()),
        quotes_repo: quotes::cqrs::init_repo(dynamodb_client),
    };

    lambda_runtime::run(service_fn(|event: LambdaEvent<KinesisEvent>| async {
        handle(event, &projector).await
    }))
    .await
}

async fn handle(
    event: LambdaEvent<KinesisEvent>,
    projector: &Projector,
) -> Result<KinesisEventResponse, Error> {
    tracing::info!("Processing {} Kinesis records", event.payload.records.len());

    let mut batch_item_failures = Vec::new();

    for record in event.payload.records.iter() {
        let sequence = record.kinesis.sequence_number.clone();

        if let Err(e) = handle_record(record, projector).await {
            tracing::error!("Failed to project {:?}: {:#}", sequence, e);
            batch_item_failures.push(KinesisBatchItemFailure {
                item_identifier: sequence,
            });
        }
    }

    Ok(KinesisEventResponse { batch_item_failures })
}

async fn handle_record(record: &KinesisEventRecord, projector: &Projector) -> anyhow::Result<()> {
    let data = std::str::from_utf8(&record.kinesis.data).context("record data is not UTF-8")?;
    let event: DomainEvent = serde_json::from_str(data).context("not a domain event")?;

    if !event.is_aggregate(AGGREGATE_TYPE) {
        return Ok(());
    }

    let payload: quotes::Event = event
        .decode_payload()
        .with_context(|| format!("undecodable {} payload", event.event_type))?;

    // The request carries both owners; later events only name the quote.
    let (keys, summary) = match &payload {
        quotes::Event::QuoteRequested { request, .. } => (
            DashboardKey::for_request(request),
            QuoteSummary::from_request(request),
        ),
        _ => {
            let view = projector
                .quotes_repo
                .load(&event.id)
                .await
                .with_context(|| format!("loading quote {}", event.id))?
                .with_context(|| format!("quote {} has no view yet", event.id))?;
            (
                DashboardKey::for_request(&view.quote.request),
                QuoteSummary::of(&view.quote),
            )
        }
    };

    for key in &keys {
        projector.summaries.put(key, &summary).await?;
    }

    let Some(change) = payload.status_change() else {
        return Ok(());
    };
    for key in &keys {
        tracing::info!(
            "{} moves {} from {:?} to {}",
            event.event_type,
            key.as_key(),
            change.from,
            change.to
        );
        projector.dashboards.apply(key, change).await?;
    }

    Ok(())
}
