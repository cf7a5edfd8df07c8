use std::sync::Arc;
use cqrs_es::{persist::PersistedEventStore, CqrsFramework};
use dynamo_es::{DynamoEventRepository, DynamoViewRepository};
use crate::config::{self, PricingConfig};
use super::{view::Repo, Query, Quote, Services};

pub type QuoteCqrs = CqrsFramework<Quote, PersistedEventStore<DynamoEventRepository, Quote>>;

/// Snapshot every few events; quotes rarely see more than ten.
const SNAPSHOT_SIZE: usize = 5;

pub fn init(client: aws_sdk_dynamodb::Client, repo: Repo) -> Arc<QuoteCqrs> {
    let event_log_table = config::table("DYNAMODB_EVENT_LOG_TABLE", "surgical-quotes-event-log");
    let event_snapshots_table =
        config::table("DYNAMODB_EVENT_SNAPSHOTS_TABLE", "surgical-quotes-event-snapshots");

    let store: PersistedEventStore<DynamoEventRepository, Quote> =
        PersistedEventStore::new_snapshot_store(
            DynamoEventRepository::new(client)
                .with_tables(&event_log_table, &event_snapshots_table),
            SNAPSHOT_SIZE,
        );

    let query = Box::new(Query::new(repo));
    let services = Services::new(PricingConfig::from_env());

    Arc::new(CqrsFramework::new(store, vec![query], services))
}

pub fn init_repo(client: aws_sdk_dynamodb::Client) -> Repo {
    let view_table = config::table("DYNAMODB_QUOTES_VIEW_TABLE", "surgical-quotes-view");

    Arc::new(Box::new(DynamoViewRepository::new(&view_table, client)))
}
