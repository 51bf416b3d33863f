pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use axum::middleware::from_fn;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use service_core::middleware::{metrics::metrics_middleware, tracing::request_id_middleware};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use config::Config;
use services::{HttpLedger, SettlementLedger};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub ledger: Arc<dyn SettlementLedger>,
}

pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        let ledger = Arc::new(HttpLedger::new(
            config.ledger.base_url.clone(),
            config.ledger.api_token.clone(),
        )) as Arc<dyn SettlementLedger>;

        Self::with_ledger(config, ledger).await
    }

    /// Build against an explicit ledger implementation. Tests inject a mock
    /// here.
    pub async fn with_ledger(
        config: Config,
        ledger: Arc<dyn SettlementLedger>,
    ) -> anyhow::Result<Self> {
        services::init_metrics();

        let addr = format!("{}:{}", config.server.host, config.server.port);
        let listener = TcpListener::bind(&addr).await?;

        let state = AppState { config, ledger };

        let router = Router::new()
            .route("/health", get(handlers::health_check))
            .route("/metrics", get(handlers::metrics))
            // Reference data
            .route("/tax-rates", get(handlers::reference::list_tax_rates))
            .route(
                "/credit-providers",
                get(handlers::reference::list_credit_providers),
            )
            .route("/partners", get(handlers::reference::list_partners))
            // Documents
            .route(
                "/documents/:id/lines",
                put(handlers::documents::save_lines),
            )
            .route(
                "/documents/:id/settlement",
                get(handlers::documents::get_settlement),
            )
            .route(
                "/documents/:id/financing",
                get(handlers::documents::get_financing),
            )
            .route(
                "/documents/:id/approve",
                post(handlers::documents::approve_document),
            )
            .route(
                "/documents/:id",
                get(handlers::documents::get_document)
                    .delete(handlers::documents::delete_document),
            )
            // Payments
            .route(
                "/documents/:id/payments",
                post(handlers::payments::register_payment),
            )
            .route("/payments/:id", delete(handlers::payments::delete_payment))
            .layer(from_fn(metrics_middleware))
            .layer(from_fn(request_id_middleware))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-");

                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        uri = %request.uri(),
                        version = ?request.version(),
                    )
                }),
            )
            .with_state(state);

        Ok(Self { listener, router })
    }

    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        tracing::info!("Listening on {}", self.listener.local_addr()?);
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }

    pub fn port(&self) -> u16 {
        self.listener
            .local_addr()
            .map(|addr| addr.port())
            .unwrap_or(0)
    }
}
