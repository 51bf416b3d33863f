//! Settlement ledger client.
//!
//! The purchasing service validates and prepares, the ledger persists and
//! accounts. Every balance-changing operation goes through this boundary and
//! the view is always re-read from the ledger afterwards.

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use service_core::error::AppError;
use uuid::Uuid;

use crate::models::{
    CreditOperation, CreditProvider, DocumentLine, DocumentSettlementView, Installment, Partner,
    Payment, PurchaseDocument, SettlementInstruction, TaxRate,
};
use crate::services::metrics::LEDGER_CALL_DURATION;

/// Operations the purchasing service delegates to the settlement ledger.
#[async_trait]
pub trait SettlementLedger: Send + Sync {
    async fn get_tax_rates(&self, kind: &str) -> Result<Vec<TaxRate>, AppError>;

    /// Replace the document's full line set atomically.
    async fn save_document_lines(
        &self,
        document_id: Uuid,
        lines: &[DocumentLine],
    ) -> Result<(), AppError>;

    async fn submit_payment(&self, instruction: &SettlementInstruction) -> Result<Uuid, AppError>;

    async fn get_payment(&self, payment_id: Uuid) -> Result<Option<Payment>, AppError>;

    async fn delete_payment(&self, payment_id: Uuid) -> Result<(), AppError>;

    async fn get_document(&self, document_id: Uuid) -> Result<PurchaseDocument, AppError>;

    async fn get_settlement_view(
        &self,
        document_id: Uuid,
    ) -> Result<DocumentSettlementView, AppError>;

    /// The financing operation opened for this document, if any.
    async fn get_credit_operation(
        &self,
        document_id: Uuid,
    ) -> Result<Option<CreditOperation>, AppError>;

    async fn list_installments(&self, operation_id: Uuid) -> Result<Vec<Installment>, AppError>;

    async fn list_credit_providers(&self) -> Result<Vec<CreditProvider>, AppError>;

    async fn list_partners(&self) -> Result<Vec<Partner>, AppError>;

    /// Assign the definitive sequential number. Returns the assigned number.
    async fn approve_document(
        &self,
        document_id: Uuid,
        approved_by: Uuid,
    ) -> Result<String, AppError>;

    /// Cascade-delete lines, header and any linked scanned source document.
    async fn delete_document(&self, document_id: Uuid) -> Result<(), AppError>;
}

/// HTTP client for the ledger service.
#[derive(Clone)]
pub struct HttpLedger {
    client: Client,
    base_url: String,
    api_token: Secret<String>,
}

#[derive(Debug, Deserialize)]
struct SubmitPaymentResponse {
    payment_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct ApproveResponse {
    document_number: String,
}

#[derive(Debug, Deserialize)]
struct LedgerErrorBody {
    error: String,
}

impl HttpLedger {
    pub fn new(base_url: String, api_token: Secret<String>) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map a non-success ledger response onto the service error space.
    ///
    /// 4xx means the ledger refused the operation for a business reason (a
    /// closed accounting period, a conflicting state) and the message is
    /// surfaced verbatim; anything else is an availability problem.
    async fn map_failure(operation: &str, response: reqwest::Response) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<LedgerErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or(body);

        tracing::warn!(operation, status = %status, message = %message, "Ledger call failed");

        if status == StatusCode::NOT_FOUND {
            AppError::NotFound(anyhow!("{message}"))
        } else if status.is_client_error() {
            // The ledger reports a closed accounting period with a terse code;
            // turn it into something a user can act on.
            if message.contains("PERIOD_CLOSED") {
                AppError::LedgerRejected(
                    "the accounting period for this date is closed; choose a date in an open period"
                        .to_string(),
                )
            } else {
                AppError::LedgerRejected(message)
            }
        } else {
            AppError::LedgerUnavailable(format!("ledger returned {status}"))
        }
    }

    fn transport_error(operation: &str, err: reqwest::Error) -> AppError {
        tracing::error!(operation, error = %err, "Ledger unreachable");
        AppError::LedgerUnavailable("settlement ledger is unreachable".to_string())
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.bearer_auth(self.api_token.expose_secret())
    }
}

#[async_trait]
impl SettlementLedger for HttpLedger {
    async fn get_tax_rates(&self, kind: &str) -> Result<Vec<TaxRate>, AppError> {
        let timer = LEDGER_CALL_DURATION
            .with_label_values(&["get_tax_rates"])
            .start_timer();
        let response = self
            .authorized(self.client.get(self.url("/tax-rates")))
            .query(&[("kind", kind)])
            .send()
            .await
            .map_err(|e| Self::transport_error("get_tax_rates", e))?;
        timer.observe_duration();

        if !response.status().is_success() {
            return Err(Self::map_failure("get_tax_rates", response).await);
        }
        response
            .json()
            .await
            .map_err(|e| Self::transport_error("get_tax_rates", e))
    }

    async fn save_document_lines(
        &self,
        document_id: Uuid,
        lines: &[DocumentLine],
    ) -> Result<(), AppError> {
        let timer = LEDGER_CALL_DURATION
            .with_label_values(&["save_document_lines"])
            .start_timer();
        let response = self
            .authorized(
                self.client
                    .put(self.url(&format!("/documents/{document_id}/lines"))),
            )
            .json(&lines)
            .send()
            .await
            .map_err(|e| Self::transport_error("save_document_lines", e))?;
        timer.observe_duration();

        if !response.status().is_success() {
            return Err(Self::map_failure("save_document_lines", response).await);
        }
        Ok(())
    }

    async fn submit_payment(&self, instruction: &SettlementInstruction) -> Result<Uuid, AppError> {
        let timer = LEDGER_CALL_DURATION
            .with_label_values(&["submit_payment"])
            .start_timer();
        let response = self
            .authorized(self.client.post(self.url("/payments")))
            .header("Idempotency-Key", instruction.idempotency_key.to_string())
            .json(instruction)
            .send()
            .await
            .map_err(|e| Self::transport_error("submit_payment", e))?;
        timer.observe_duration();

        if !response.status().is_success() {
            return Err(Self::map_failure("submit_payment", response).await);
        }
        let body: SubmitPaymentResponse = response
            .json()
            .await
            .map_err(|e| Self::transport_error("submit_payment", e))?;
        Ok(body.payment_id)
    }

    async fn get_payment(&self, payment_id: Uuid) -> Result<Option<Payment>, AppError> {
        let timer = LEDGER_CALL_DURATION
            .with_label_values(&["get_payment"])
            .start_timer();
        let response = self
            .authorized(
                self.client
                    .get(self.url(&format!("/payments/{payment_id}"))),
            )
            .send()
            .await
            .map_err(|e| Self::transport_error("get_payment", e))?;
        timer.observe_duration();

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::map_failure("get_payment", response).await);
        }
        response
            .json()
            .await
            .map(Some)
            .map_err(|e| Self::transport_error("get_payment", e))
    }

    async fn delete_payment(&self, payment_id: Uuid) -> Result<(), AppError> {
        let timer = LEDGER_CALL_DURATION
            .with_label_values(&["delete_payment"])
            .start_timer();
        let response = self
            .authorized(
                self.client
                    .delete(self.url(&format!("/payments/{payment_id}"))),
            )
            .send()
            .await
            .map_err(|e| Self::transport_error("delete_payment", e))?;
        timer.observe_duration();

        if !response.status().is_success() {
            return Err(Self::map_failure("delete_payment", response).await);
        }
        Ok(())
    }

    async fn get_document(&self, document_id: Uuid) -> Result<PurchaseDocument, AppError> {
        let timer = LEDGER_CALL_DURATION
            .with_label_values(&["get_document"])
            .start_timer();
        let response = self
            .authorized(
                self.client
                    .get(self.url(&format!("/documents/{document_id}"))),
            )
            .send()
            .await
            .map_err(|e| Self::transport_error("get_document", e))?;
        timer.observe_duration();

        if !response.status().is_success() {
            return Err(Self::map_failure("get_document", response).await);
        }
        response
            .json()
            .await
            .map_err(|e| Self::transport_error("get_document", e))
    }

    async fn get_credit_operation(
        &self,
        document_id: Uuid,
    ) -> Result<Option<CreditOperation>, AppError> {
        let timer = LEDGER_CALL_DURATION
            .with_label_values(&["get_credit_operation"])
            .start_timer();
        let response = self
            .authorized(
                self.client
                    .get(self.url(&format!("/documents/{document_id}/credit-operation"))),
            )
            .send()
            .await
            .map_err(|e| Self::transport_error("get_credit_operation", e))?;
        timer.observe_duration();

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::map_failure("get_credit_operation", response).await);
        }
        response
            .json()
            .await
            .map(Some)
            .map_err(|e| Self::transport_error("get_credit_operation", e))
    }

    async fn list_installments(&self, operation_id: Uuid) -> Result<Vec<Installment>, AppError> {
        let timer = LEDGER_CALL_DURATION
            .with_label_values(&["list_installments"])
            .start_timer();
        let response = self
            .authorized(
                self.client
                    .get(self.url(&format!("/credit-operations/{operation_id}/installments"))),
            )
            .send()
            .await
            .map_err(|e| Self::transport_error("list_installments", e))?;
        timer.observe_duration();

        if !response.status().is_success() {
            return Err(Self::map_failure("list_installments", response).await);
        }
        response
            .json()
            .await
            .map_err(|e| Self::transport_error("list_installments", e))
    }

    async fn get_settlement_view(
        &self,
        document_id: Uuid,
    ) -> Result<DocumentSettlementView, AppError> {
        let timer = LEDGER_CALL_DURATION
            .with_label_values(&["get_settlement_view"])
            .start_timer();
        let response = self
            .authorized(
                self.client
                    .get(self.url(&format!("/documents/{document_id}/settlement"))),
            )
            .send()
            .await
            .map_err(|e| Self::transport_error("get_settlement_view", e))?;
        timer.observe_duration();

        if !response.status().is_success() {
            return Err(Self::map_failure("get_settlement_view", response).await);
        }
        response
            .json()
            .await
            .map_err(|e| Self::transport_error("get_settlement_view", e))
    }

    async fn list_credit_providers(&self) -> Result<Vec<CreditProvider>, AppError> {
        let timer = LEDGER_CALL_DURATION
            .with_label_values(&["list_credit_providers"])
            .start_timer();
        let response = self
            .authorized(self.client.get(self.url("/credit-providers")))
            .send()
            .await
            .map_err(|e| Self::transport_error("list_credit_providers", e))?;
        timer.observe_duration();

        if !response.status().is_success() {
            return Err(Self::map_failure("list_credit_providers", response).await);
        }
        response
            .json()
            .await
            .map_err(|e| Self::transport_error("list_credit_providers", e))
    }

    async fn list_partners(&self) -> Result<Vec<Partner>, AppError> {
        let timer = LEDGER_CALL_DURATION
            .with_label_values(&["list_partners"])
            .start_timer();
        let response = self
            .authorized(self.client.get(self.url("/partners")))
            .send()
            .await
            .map_err(|e| Self::transport_error("list_partners", e))?;
        timer.observe_duration();

        if !response.status().is_success() {
            return Err(Self::map_failure("list_partners", response).await);
        }
        response
            .json()
            .await
            .map_err(|e| Self::transport_error("list_partners", e))
    }

    async fn approve_document(
        &self,
        document_id: Uuid,
        approved_by: Uuid,
    ) -> Result<String, AppError> {
        let timer = LEDGER_CALL_DURATION
            .with_label_values(&["approve_document"])
            .start_timer();
        let response = self
            .authorized(
                self.client
                    .post(self.url(&format!("/documents/{document_id}/approve"))),
            )
            .json(&serde_json::json!({ "approved_by": approved_by }))
            .send()
            .await
            .map_err(|e| Self::transport_error("approve_document", e))?;
        timer.observe_duration();

        if !response.status().is_success() {
            return Err(Self::map_failure("approve_document", response).await);
        }
        let body: ApproveResponse = response
            .json()
            .await
            .map_err(|e| Self::transport_error("approve_document", e))?;
        Ok(body.document_number)
    }

    async fn delete_document(&self, document_id: Uuid) -> Result<(), AppError> {
        let timer = LEDGER_CALL_DURATION
            .with_label_values(&["delete_document"])
            .start_timer();
        let response = self
            .authorized(
                self.client
                    .delete(self.url(&format!("/documents/{document_id}"))),
            )
            .send()
            .await
            .map_err(|e| Self::transport_error("delete_document", e))?;
        timer.observe_duration();

        if !response.status().is_success() {
            return Err(Self::map_failure("delete_document", response).await);
        }
        Ok(())
    }
}
