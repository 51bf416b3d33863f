//! Test helpers for purchasing-service integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use secrecy::Secret;
use service_core::error::AppError;
use uuid::Uuid;

use purchasing_service::config::{Config, LedgerConfig, ServerConfig};
use purchasing_service::models::{
    CreditOperation, CreditProvider, DocumentLine, DocumentSettlementView, DocumentStatus,
    DocumentType, Installment, Partner, Payment, PaymentMethod, PurchaseDocument,
    SettlementDetail, SettlementInstruction, TaxRate,
};
use purchasing_service::services::SettlementLedger;
use purchasing_service::Application;

#[derive(Default)]
pub struct MockLedgerState {
    pub views: HashMap<Uuid, DocumentSettlementView>,
    pub documents: HashMap<Uuid, PurchaseDocument>,
    pub payments: HashMap<Uuid, Payment>,
    pub saved_lines: HashMap<Uuid, Vec<DocumentLine>>,
    pub tax_rates: Vec<TaxRate>,
    pub providers: Vec<CreditProvider>,
    pub partners: Vec<Partner>,
    pub credit_operations: HashMap<Uuid, CreditOperation>,
    pub installments: Vec<Installment>,
    pub approvals: Vec<Uuid>,
    pub deleted_documents: Vec<Uuid>,
}

/// In-memory stand-in for the settlement ledger. Applies payments to the
/// stored view the way the real ledger would, so handlers can be exercised
/// end to end.
#[derive(Clone, Default)]
pub struct MockLedger {
    pub state: Arc<Mutex<MockLedgerState>>,
}

impl MockLedger {
    pub fn new() -> Self {
        let ledger = Self::default();
        {
            let mut state = ledger.state.lock().unwrap();
            state.tax_rates = vec![
                TaxRate {
                    rate: Decimal::new(21, 0),
                    label: "VAT 21%".to_string(),
                    is_default: true,
                    is_active: true,
                },
                TaxRate {
                    rate: Decimal::new(10, 0),
                    label: "VAT 10%".to_string(),
                    is_default: false,
                    is_active: true,
                },
            ];
        }
        ledger
    }

    pub fn insert_view(&self, view: DocumentSettlementView) {
        self.state
            .lock()
            .unwrap()
            .views
            .insert(view.document_id, view);
    }

    pub fn insert_provider(&self, provider: CreditProvider) {
        self.state.lock().unwrap().providers.push(provider);
    }

    pub fn insert_document(&self, document: PurchaseDocument) {
        self.state
            .lock()
            .unwrap()
            .documents
            .insert(document.document_id, document);
    }

    pub fn insert_credit_operation(&self, operation: CreditOperation) {
        self.state
            .lock()
            .unwrap()
            .credit_operations
            .insert(operation.document_id, operation);
    }

    pub fn insert_installment(&self, installment: Installment) {
        self.state.lock().unwrap().installments.push(installment);
    }

    pub fn view(&self, document_id: Uuid) -> DocumentSettlementView {
        self.state.lock().unwrap().views[&document_id].clone()
    }
}

#[async_trait]
impl SettlementLedger for MockLedger {
    async fn get_tax_rates(&self, _kind: &str) -> Result<Vec<TaxRate>, AppError> {
        Ok(self.state.lock().unwrap().tax_rates.clone())
    }

    async fn save_document_lines(
        &self,
        document_id: Uuid,
        lines: &[DocumentLine],
    ) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        state.saved_lines.insert(document_id, lines.to_vec());

        // The real ledger rederives the header money fields from the lines.
        if let Some(view) = state.views.get_mut(&document_id) {
            view.total = lines.iter().map(|l| l.total).sum();
            view.pending_amount = view.total - view.paid_amount;
        }
        Ok(())
    }

    async fn submit_payment(&self, instruction: &SettlementInstruction) -> Result<Uuid, AppError> {
        let mut state = self.state.lock().unwrap();
        let payment_id = Uuid::new_v4();

        let method = match &instruction.detail {
            SettlementDetail::Standard { method, .. } => *method,
            SettlementDetail::Personal { .. } => PaymentMethod::Personal,
            SettlementDetail::Financing { .. } => PaymentMethod::ExternalCredit,
        };

        state.payments.insert(
            payment_id,
            Payment {
                payment_id,
                document_id: instruction.document_id,
                amount: instruction.amount,
                payment_date: instruction.payment_date,
                method,
                bank_reference: None,
                bank_account_id: None,
                notes: instruction.notes.clone(),
                registered_by: instruction.registered_by,
                created_utc: Utc::now(),
            },
        );

        let view = state
            .views
            .get_mut(&instruction.document_id)
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("document not found")))?;
        view.paid_amount += instruction.amount;
        view.pending_amount = view.total - view.paid_amount;
        view.has_payments = true;
        if view.pending_amount.is_zero() {
            view.status = DocumentStatus::Paid;
        }

        Ok(payment_id)
    }

    async fn get_payment(&self, payment_id: Uuid) -> Result<Option<Payment>, AppError> {
        Ok(self.state.lock().unwrap().payments.get(&payment_id).cloned())
    }

    async fn delete_payment(&self, payment_id: Uuid) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        let payment = state
            .payments
            .remove(&payment_id)
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("payment not found")))?;

        if let Some(view) = state.views.get_mut(&payment.document_id) {
            view.paid_amount -= payment.amount;
            view.pending_amount = view.total - view.paid_amount;
        }
        Ok(())
    }

    async fn get_document(&self, document_id: Uuid) -> Result<PurchaseDocument, AppError> {
        self.state
            .lock()
            .unwrap()
            .documents
            .get(&document_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("document not found")))
    }

    async fn get_settlement_view(
        &self,
        document_id: Uuid,
    ) -> Result<DocumentSettlementView, AppError> {
        self.state
            .lock()
            .unwrap()
            .views
            .get(&document_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("document not found")))
    }

    async fn get_credit_operation(
        &self,
        document_id: Uuid,
    ) -> Result<Option<CreditOperation>, AppError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .credit_operations
            .get(&document_id)
            .cloned())
    }

    async fn list_installments(&self, operation_id: Uuid) -> Result<Vec<Installment>, AppError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .installments
            .iter()
            .filter(|i| i.operation_id == operation_id)
            .cloned()
            .collect())
    }

    async fn list_credit_providers(&self) -> Result<Vec<CreditProvider>, AppError> {
        Ok(self.state.lock().unwrap().providers.clone())
    }

    async fn list_partners(&self) -> Result<Vec<Partner>, AppError> {
        Ok(self.state.lock().unwrap().partners.clone())
    }

    async fn approve_document(
        &self,
        document_id: Uuid,
        _approved_by: Uuid,
    ) -> Result<String, AppError> {
        let mut state = self.state.lock().unwrap();
        state.approvals.push(document_id);
        if let Some(view) = state.views.get_mut(&document_id) {
            view.has_definitive_number = true;
            if view.status != DocumentStatus::Paid {
                view.status = DocumentStatus::Approved;
            }
        }
        Ok(format!("INV-2026-{:04}", state.approvals.len()))
    }

    async fn delete_document(&self, document_id: Uuid) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        state.views.remove(&document_id);
        state.saved_lines.remove(&document_id);
        state.deleted_documents.push(document_id);
        Ok(())
    }
}

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub ledger: MockLedger,
    pub user_id: Uuid,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let ledger = MockLedger::new();
        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            ledger: LedgerConfig {
                base_url: "http://localhost:0".to_string(),
                api_token: Secret::new("test-token".to_string()),
            },
            service_name: "purchasing-service".to_string(),
        };

        let application = Application::with_ledger(config, Arc::new(ledger.clone()))
            .await
            .expect("Failed to build application");
        let port = application.port();

        tokio::spawn(async move {
            application
                .run_until_stopped()
                .await
                .expect("Server crashed");
        });

        Self {
            address: format!("http://127.0.0.1:{}", port),
            client: reqwest::Client::new(),
            ledger,
            user_id: Uuid::new_v4(),
        }
    }

    /// Request builder with the gateway identity headers already set.
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.address, path))
            .header("X-User-ID", self.user_id.to_string())
    }

    pub fn admin_request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.request(method, path).header("X-User-Role", "admin")
    }
}

pub fn open_view(total: Decimal) -> DocumentSettlementView {
    DocumentSettlementView {
        document_id: Uuid::new_v4(),
        document_type: DocumentType::Invoice,
        status: DocumentStatus::Registered,
        total,
        paid_amount: Decimal::ZERO,
        pending_amount: total,
        lock_flag: false,
        has_definitive_number: false,
        has_payments: false,
    }
}
