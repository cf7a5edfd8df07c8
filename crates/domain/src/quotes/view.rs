use std::sync::Arc;
use async_trait::async_trait;
use cqrs_es::{
    persist::{PersistenceError, ViewContext, ViewRepository},
    Aggregate, EventEnvelope, View as CqrsView,
};
use serde::{Deserialize, Serialize};
use super::{Quote, AGGREGATE_TYPE};

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct View {
    pub aggregate_type: String,
    pub command_id: String,
    pub id: String,
    pub quote: Quote,
}

impl CqrsView<Quote> for View {
    fn update(&mut self, event: &EventEnvelope<Quote>) {
        self.id.clone_from(&event.aggregate_id);
        self.aggregate_type = AGGREGATE_TYPE.to_string();
        self.command_id = event
            .metadata
            .get("command_id")
            .cloned()
            .unwrap_or_default();
        self.quote.apply(event.payload.clone());
    }
}

pub type Repo = Arc<Box<dyn ViewRepository<View, Quote>>>;

pub struct Query {
    repo: Repo,
}

impl Query {
    pub fn new(repo: Repo) -> Self {
        Self { repo }
    }

    async fn update(
        &self,
        quote_id: &str,
        events: &[EventEnvelope<Quote>],
    ) -> Result<(), PersistenceError> {
        let (mut view, view_context) = match self.repo.load_with_context(quote_id).await? {
            None => {
                let view_context = ViewContext::new(quote_id.to_string(), 0);
                (Default::default(), view_context)
            }
            Some((view, context)) => (view, context),
        };

        for event in events {
            view.update(event);
        }

        self.repo.update_view(view, view_context).await
    }
}

#[async_trait]
impl cqrs_es::Query<Quote> for Query {
    async fn dispatch(&self, quote_id: &str, events: &[EventEnvelope<Quote>]) {
        if let Err(err) = self.update(quote_id, events).await {
            tracing::error!("QuoteQuery error for {}: {}", quote_id, err);
        }
    }
}
