mod common;

use common::*;
use invoice_reconciliation::config::{AuthConfig, IngestionConfig, ReconciliationConfig};
use invoice_reconciliation::services::{Attachment, RowEvent};
use invoice_reconciliation::startup::Session;
use rust_decimal::Decimal;
use service_core::config::Config as CommonConfig;
use service_core::error::AppError;

fn test_config() -> ReconciliationConfig {
    ReconciliationConfig {
        common: CommonConfig::default(),
        service_name: "invoice-reconciliation-test".to_string(),
        service_version: "test".to_string(),
        auth: AuthConfig::default(),
        ingestion: IngestionConfig {
            blank_rows: 4,
            ..Default::default()
        },
    }
}

#[tokio::test]
async fn test_upload_then_dashboard() {
    init_tracing();
    let mut session = Session::build_with_clock(test_config(), clock()).unwrap();
    assert_eq!(session.new_blank_table(), Some(RowEvent::Replaced { count: 4 }));

    let summary = session
        .upload(xlsx(&[(
            "Sheet1",
            vec![
                header(&STANDARD_HEADER),
                vec![Number(44000.0), Text("ABC"), Text("INV-1"), Number(400.0), Number(350.0)],
                vec![Blank, Blank, Blank, Blank, Blank],
                vec![Number(44001.0), Text("XYZ"), Text("INV-2"), Number(100.0), Number(90.0)],
            ],
        )]))
        .await
        .unwrap();

    assert_eq!(summary.sheet, "Sheet1");
    assert_eq!(summary.rows, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(session.store().len(), 2);

    let first = session.store().rows()[0].id;
    session.store_mut().set_reason(first, "Partial Granting");
    session.store_mut().edit_cell(
        first,
        invoice_reconciliation::models::RowField::Value,
        "50",
    );
    session
        .store_mut()
        .attach(first, [Attachment::new("lr.pdf", vec![0u8; 16])]);

    let partial = session
        .reason_totals()
        .into_iter()
        .find(|t| t.reason == "Partial Granting")
        .unwrap();
    assert_eq!(partial.total_value, Decimal::from(50));

    let status = session.upload_status();
    assert_eq!(status.uploaded, Decimal::from(400));
    assert_eq!(status.completion_percentage, 80);
}

#[tokio::test]
async fn test_bad_upload_is_bad_request_and_keeps_rows() {
    init_tracing();
    let mut session = Session::build_with_clock(test_config(), clock()).unwrap();
    session.new_blank_table();
    let before = session.store().snapshot();

    let result = session.upload(b"not a workbook".to_vec()).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
    assert_eq!(session.store().snapshot(), before);
}

#[test]
fn test_auth_client_uses_configured_base_url() {
    let mut config = test_config();
    config.auth.base_url = "http://auth.internal:5000/".to_string();
    let session = Session::build(config).unwrap();
    assert_eq!(session.auth().base_url(), "http://auth.internal:5000");
}
