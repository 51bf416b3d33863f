//! Reference-data handlers, proxied from the ledger.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use service_core::error::AppError;

use crate::{
    middleware::ActorContext,
    models::{CreditProvider, Partner, TaxRate},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct TaxRateQuery {
    /// Document type the rates apply to.
    #[serde(default = "default_kind")]
    pub kind: String,
}

fn default_kind() -> String {
    "invoice".to_string()
}

pub async fn list_tax_rates(
    State(state): State<AppState>,
    _actor: ActorContext,
    Query(query): Query<TaxRateQuery>,
) -> Result<Json<Vec<TaxRate>>, AppError> {
    let rates = state.ledger.get_tax_rates(&query.kind).await?;
    Ok(Json(rates))
}

pub async fn list_credit_providers(
    State(state): State<AppState>,
    _actor: ActorContext,
) -> Result<Json<Vec<CreditProvider>>, AppError> {
    let providers = state.ledger.list_credit_providers().await?;
    Ok(Json(providers.into_iter().filter(|p| p.is_active).collect()))
}

pub async fn list_partners(
    State(state): State<AppState>,
    _actor: ActorContext,
) -> Result<Json<Vec<Partner>>, AppError> {
    let partners = state.ledger.list_partners().await?;
    Ok(Json(partners))
}
