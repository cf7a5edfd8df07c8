use aws_config::BehaviorVersion;
use aws_lambda_events::{
    dynamodb::{Event, EventRecord},
    streams::{DynamoDbBatchItemFailure, DynamoDbEventResponse},
};
use aws_sdk_kinesis::primitives::Blob;
use domain::{event::EventLogRecord, DomainEvent};
use lambda_runtime::{service_fn, Error, LambdaEvent};

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
    let kinesis_client = aws_sdk_kinesis::Client::new(&config);

    lambda_runtime::run(service_fn(|event: LambdaEvent<Event>| async {
        handle(event, &kinesis_client).await
    }))
    .await
}

async fn handle(
    event: LambdaEvent<Event>,
    kinesis_client: &aws_sdk_kinesis::Client,
) -> Result<DynamoDbEventResponse, Error> {
    tracing::info!("Processing {} event log records", event.payload.records.len());

    let stream_name = std::env::var("EVENT_STREAM_NAME")?;
    let mut batch_item_failures = Vec::new();

    // The event log is append-only; snapshots and TTL removals are not events.
    for record in event.payload.records.iter().filter(|r| r.event_name == "INSERT") {
        if let Err(e) = handle_record(record, kinesis_client, &stream_name).await {
            tracing::error!("Failed to publish {}: {}", record.event_id, e);
            batch_item_failures.push(DynamoDbBatchItemFailure {
                item_identifier: Some(record.event_id.clone()),
            });
        }
    }

    Ok(DynamoDbEventResponse { batch_item_failures })
}

async fn handle_record(
    record: &EventRecord,
    kinesis_client: &aws_sdk_kinesis::Client,
    stream_name: &str,
) -> Result<(), Error> {
    let log_record: EventLogRecord = serde_dynamo::from_item(record.change.new_image.clone())?;
    let domain_event = DomainEvent::try_from(log_record)?;

    tracing::info!(
        "Publishing {} #{} for {} {}",
        domain_event.event_type,
        domain_event.sequence,
        domain_event.aggregate_type,
        domain_event.id
    );

    let data = serde_json::to_vec(&domain_event)?;

    // Keyed by quote so a quote's events stay ordered within one shard
    kinesis_client
        .put_record()
        .stream_name(stream_name)
        .partition_key(&domain_event.id)
        .data(Blob::new(data))
        .send()
        .await?;

    Ok(())
}
