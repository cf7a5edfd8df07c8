use std::sync::Arc;

use aws_config::BehaviorVersion;
use axum::{
    routing::{get, post},
    Router,
};
use domain::{
    catalog::{Catalog, MedicalTeamMember, SurgicalMaterial, SurgicalProcedure, Supplier},
    config,
    dashboards::{DashboardStore, SummaryStore},
    quotes::{
        cqrs::{self, QuoteCqrs},
        view,
    },
};

mod catalog;
mod dashboards;
mod errors;
mod quotes;
mod session;

#[derive(Clone)]
pub struct AppState {
    quotes_repo: view::Repo,
    quotes_cqrs: Arc<QuoteCqrs>,
    catalog: Catalog,
    dashboards: Arc<DashboardStore>,
    summaries: Arc<SummaryStore>,
    low_stock_threshold: u32,
}

#[tokio::main]
async fn main() -> Result<(), lambda_http::Error> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
    let dynamodb_client = aws_sdk_dynamodb::Client::new(&config);

    let quotes_repo = cqrs::init_repo(dynamodb_client.clone());
    let quotes_cqrs = cqrs::init(dynamodb_client.clone(), quotes_repo.clone());
    let catalog_table = config::table("DYNAMODB_CATALOG_TABLE", "surgical-quotes-catalog");

    let state = AppState {
        quotes_repo,
        quotes_cqrs,
        catalog: Catalog::dynamo(dynamodb_client.clone(), &catalog_table),
        dashboards: Arc::new(DashboardStore::from_env(dynamodb_client.clone())),
        summaries: Arc::new(SummaryStore::from_env(dynamodb_client)),
        low_stock_threshold: config::low_stock_threshold(),
    };

    let app = Router::new()
        .route("/quotes", post(quotes::create).get(quotes::list))
        .route("/quotes/:id", get(quotes::get))
        .route("/quotes/:id/response", post(quotes::respond))
        .route("/quotes/:id/response/reissue", post(quotes::reissue))
        .route("/quotes/:id/approve", post(quotes::approve))
        .route("/quotes/:id/reject", post(quotes::reject))
        .route("/quotes/:id/supersede", post(quotes::supersede))
        .route(
            "/quotes/:id/report",
            post(quotes::generate_report).get(quotes::get_report),
        )
        .route("/quotes/:id/report/send", post(quotes::send_report))
        .route("/quotes/:id/report/viewed", post(quotes::view_report))
        .nest("/team-members", catalog::routes::<MedicalTeamMember>())
        .nest("/materials", catalog::routes::<SurgicalMaterial>())
        .nest("/procedures", catalog::routes::<SurgicalProcedure>())
        .nest("/suppliers", catalog::routes::<Supplier>())
        .route("/dashboard", get(dashboards::get))
        .with_state(state);

    let app = tower::ServiceBuilder::new()
        .layer(axum_aws_lambda::LambdaLayer::default())
        .service(app);

    lambda_http::run(app).await?;
    Ok(())
}
