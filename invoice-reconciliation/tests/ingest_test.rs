mod common;

use common::*;
use invoice_reconciliation::ingest::{
    HeaderMap, HeaderRowLocator, Importer, IngestError, MatchStrategy, SheetSelector,
};
use invoice_reconciliation::services::RowStore;

fn standard_importer() -> Importer {
    Importer::new(
        SheetSelector::First,
        HeaderRowLocator::Fixed { row: 0 },
        HeaderMap::standard(),
        clock(),
    )
}

fn invoice_rows() -> Vec<Vec<Cell>> {
    vec![
        header(&STANDARD_HEADER),
        vec![Number(44000.0), Text("ABC Corporation"), Text("INV-001"), Number(25000.0), Number(24500.0)],
        vec![Blank, Blank, Blank, Blank, Blank],
        vec![Date(44002.0), Text("XYZ Industries"), Text("INV-002"), Number(1000.5), Number(1000.0)],
        vec![Text("not a date"), Text("Acme"), Blank, Text("abc"), Number(5.0)],
    ]
}

#[tokio::test]
async fn test_xlsx_import_end_to_end() {
    init_tracing();
    let bytes = xlsx(&[("Sheet1", invoice_rows())]);

    let report = standard_importer().import_bytes(bytes).await.unwrap();

    assert_eq!(report.sheet, "Sheet1");
    assert_eq!(report.skipped, 1);
    assert_eq!(report.rows.len(), 3);
    let ids: Vec<u64> = report.rows.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    let serial = &report.rows[0];
    assert_eq!(serial.granted_date, "6/18/2020");
    assert_eq!(serial.buyer_name, "ABC Corporation");
    assert_eq!(serial.invoice_number, "INV-001");
    assert_eq!(serial.granted_value, "25000");
    assert_eq!(serial.lr_amount, "24500");
    assert_eq!(serial.difference, "500.00");
    assert_eq!(serial.aging, "10");

    let formatted = &report.rows[1];
    assert_eq!(formatted.granted_date, "6/20/2020");
    assert_eq!(formatted.difference, "0.50");
    assert_eq!(formatted.aging, "8");

    let malformed = &report.rows[2];
    assert_eq!(malformed.granted_date, "not a date");
    assert_eq!(malformed.aging, "");
    assert_eq!(malformed.difference, "-5.00");
    assert_eq!(malformed.invoice_number, "");
}

#[tokio::test]
async fn test_named_sheet_with_searched_header() {
    init_tracing();
    let mut rows = vec![vec![Text("Buyer wise pending invoices")], vec![]];
    rows.extend(invoice_rows());
    let bytes = xlsx(&[
        ("Summary", vec![vec![Text("Total"), Number(3.0)]]),
        ("Not uploaded", rows),
    ]);

    let importer = Importer::new(
        SheetSelector::Named {
            names: vec!["Not uploaded".to_string(), "Sheet1".to_string()],
        },
        HeaderRowLocator::Search {
            max_rows: 10,
            min_matches: 3,
        },
        HeaderMap::standard(),
        clock(),
    );
    let report = importer.import_bytes(bytes).await.unwrap();

    assert_eq!(report.sheet, "Not uploaded");
    assert_eq!(report.header_row, 2);
    assert_eq!(report.rows.len(), 3);
    assert_eq!(report.rows[0].buyer_name, "ABC Corporation");
}

#[tokio::test]
async fn test_contains_strategy_maps_loose_captions() {
    init_tracing();
    let bytes = xlsx(&[(
        "Sheet1",
        vec![
            header(&["granted date (dd/mm)", "BUYER NAME", "Total Granted Value", "LR Amount Rs"]),
            vec![Number(44000.0), Text("ABC"), Number(10.0), Number(2.5)],
        ],
    )]);

    let importer = Importer::new(
        SheetSelector::First,
        HeaderRowLocator::default(),
        HeaderMap::standard().with_strategy(MatchStrategy::CaseInsensitiveContains),
        clock(),
    );
    let report = importer.import_bytes(bytes).await.unwrap();

    let row = &report.rows[0];
    assert_eq!(row.granted_date, "6/18/2020");
    assert_eq!(row.buyer_name, "ABC");
    assert_eq!(row.granted_value, "10");
    assert_eq!(row.value, "");
    assert_eq!(row.difference, "7.50");
}

#[tokio::test]
async fn test_missing_sheet_is_reported() {
    init_tracing();
    let bytes = xlsx(&[("Sheet1", invoice_rows())]);
    let importer = Importer::new(
        SheetSelector::Named {
            names: vec!["Invoices".to_string()],
        },
        HeaderRowLocator::default(),
        HeaderMap::standard(),
        clock(),
    );

    let err = importer.import_bytes(bytes).await.unwrap_err();
    assert!(matches!(err, IngestError::SheetNotFound(_)));
}

#[tokio::test]
async fn test_unreadable_bytes_are_parse_failures() {
    init_tracing();
    let importer = standard_importer();

    let err = importer.import_bytes(Vec::new()).await.unwrap_err();
    assert!(matches!(err, IngestError::ParseFailure(_)));

    let err = importer
        .import_bytes(b"this is not a spreadsheet".to_vec())
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::ParseFailure(_)));
}

#[tokio::test]
async fn test_failed_import_leaves_store_unchanged() {
    init_tracing();
    let mut store = RowStore::with_clock(clock());
    store.create_blank_table(3);
    store.edit_cell(2, invoice_reconciliation::models::RowField::BuyerName, "Kept");
    let before = store.snapshot();

    let importer = standard_importer();
    if let Ok(report) = importer.import_bytes(b"garbage".to_vec()).await {
        store.replace_with_import(report.rows);
    }
    assert_eq!(store.snapshot(), before);

    let report = importer
        .import_bytes(xlsx(&[("Sheet1", invoice_rows())]))
        .await
        .unwrap();
    store.replace_with_import(report.rows);
    assert_eq!(store.len(), 3);
    assert_eq!(store.version(), before.version + 1);
    // Ids continue after the blank table's 1..=3.
    assert_eq!(store.rows()[0].id, 4);
    assert_eq!(store.rows()[0].buyer_name, "ABC Corporation");
}
