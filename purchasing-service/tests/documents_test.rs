//! Integration tests for the document and financing read models.

mod common;

use chrono::{Duration, Utc};
use common::{open_view, TestApp};
use reqwest::Method;
use rust_decimal_macros::dec;
use uuid::Uuid;

use purchasing_service::models::{
    Counterparty, CreditOperation, DocumentStatus, DocumentType, Installment, PricingMode,
    PurchaseDocument,
};

fn document(counterparty: Counterparty) -> PurchaseDocument {
    PurchaseDocument {
        document_id: Uuid::new_v4(),
        document_type: DocumentType::Invoice,
        status: DocumentStatus::Registered,
        counterparty,
        project_id: None,
        pricing_mode: PricingMode::TaxExclusive,
        document_number: None,
        tax_base: dec!(100.00),
        tax_amount: dec!(21.00),
        total: dec!(121.00),
        paid_amount: dec!(0.00),
        pending_amount: dec!(121.00),
        is_locked: false,
        created_utc: Utc::now(),
    }
}

#[tokio::test]
async fn document_read_model_exposes_the_counterparty_kind() {
    let app = TestApp::spawn().await;

    let supplier_id = Uuid::new_v4();
    let supplier_doc = document(Counterparty::Supplier { supplier_id });
    let technician_doc = document(Counterparty::Technician {
        technician_id: Uuid::new_v4(),
    });
    let manual_doc = document(Counterparty::Manual {
        beneficiary_name: "Road tax office".to_string(),
    });
    for doc in [&supplier_doc, &technician_doc, &manual_doc] {
        app.ledger.insert_document(doc.clone());
    }

    let body: serde_json::Value = app
        .request(
            Method::GET,
            &format!("/documents/{}", supplier_doc.document_id),
        )
        .send()
        .await
        .expect("request succeeds")
        .json()
        .await
        .expect("json body");
    assert_eq!(body["counterparty"]["kind"], "supplier");
    assert_eq!(
        body["counterparty"]["supplier_id"],
        supplier_id.to_string()
    );

    let body: serde_json::Value = app
        .request(
            Method::GET,
            &format!("/documents/{}", technician_doc.document_id),
        )
        .send()
        .await
        .expect("request succeeds")
        .json()
        .await
        .expect("json body");
    assert_eq!(body["counterparty"]["kind"], "technician");

    let body: serde_json::Value = app
        .request(
            Method::GET,
            &format!("/documents/{}", manual_doc.document_id),
        )
        .send()
        .await
        .expect("request succeeds")
        .json()
        .await
        .expect("json body");
    assert_eq!(body["counterparty"]["kind"], "manual");
    assert_eq!(body["counterparty"]["beneficiary_name"], "Road tax office");
}

#[tokio::test]
async fn unknown_document_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app
        .request(Method::GET, &format!("/documents/{}", Uuid::new_v4()))
        .send()
        .await
        .expect("request succeeds");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn financing_schedule_derives_installment_statuses() {
    let app = TestApp::spawn().await;

    let view = open_view(dec!(300.00));
    let document_id = view.document_id;
    app.ledger.insert_view(view);

    let operation_id = Uuid::new_v4();
    app.ledger.insert_credit_operation(CreditOperation {
        operation_id,
        provider_id: Uuid::new_v4(),
        document_id,
        gross_amount: dec!(300.00),
        installment_count: 3,
        provider_reference: Some("OP-77".to_string()),
        total_paid: dec!(100.00),
        total_pending: dec!(200.00),
    });

    let today = Utc::now().date_naive();
    let schedule = [
        (today - Duration::days(60), Some(today - Duration::days(60))),
        (today - Duration::days(30), None),
        (today + Duration::days(30), None),
    ];
    for (due_date, paid_date) in schedule {
        app.ledger.insert_installment(Installment {
            installment_id: Uuid::new_v4(),
            operation_id,
            due_date,
            amount: dec!(100.00),
            principal: dec!(95.00),
            interest: dec!(5.00),
            outstanding_balance: dec!(100.00),
            paid_date,
        });
    }

    let body: serde_json::Value = app
        .request(Method::GET, &format!("/documents/{document_id}/financing"))
        .send()
        .await
        .expect("request succeeds")
        .json()
        .await
        .expect("json body");

    assert_eq!(body["operation"]["provider_reference"], "OP-77");
    let statuses: Vec<&str> = body["installments"]
        .as_array()
        .expect("installments array")
        .iter()
        .map(|i| i["status"].as_str().expect("status string"))
        .collect();
    assert_eq!(statuses, vec!["paid", "overdue", "pending"]);
}

#[tokio::test]
async fn unfinanced_document_has_no_schedule() {
    let app = TestApp::spawn().await;

    let view = open_view(dec!(100.00));
    let document_id = view.document_id;
    app.ledger.insert_view(view);

    let response = app
        .request(Method::GET, &format!("/documents/{document_id}/financing"))
        .send()
        .await
        .expect("request succeeds");
    assert_eq!(response.status(), 404);
}
