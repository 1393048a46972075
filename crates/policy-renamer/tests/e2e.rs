//! End-to-end runs through the lopdf extractor and the zip collector.

mod common;

use common::{archive_entry, archive_names, PdfBuilder, TestHarness};
use policy_renamer::FileStatus;

#[tokio::test]
async fn test_pdf_without_phrase_keeps_original_name() {
    let harness = TestHarness::new();
    let session = harness.pdf_session();

    let pdf = PdfBuilder::new().page("Estado de cuenta mensual").build();
    session
        .add_files(vec![harness.upload("statement.pdf", &pdf)])
        .unwrap();
    harness.settle(&session).await;

    let record = &session.snapshot()[0];
    assert_eq!(record.status, FileStatus::Success);
    assert_eq!(record.derived_name, "statement.pdf");
    assert!(record.concept.is_none());
    assert_eq!(record.mime_type.as_deref(), Some("application/pdf"));
}

#[tokio::test]
async fn test_corrupt_pdf_is_an_error() {
    let harness = TestHarness::new();
    let session = harness.pdf_session();

    session
        .add_files(vec![harness.upload("broken.pdf", b"not a pdf at all")])
        .unwrap();
    harness.settle(&session).await;

    let record = &session.snapshot()[0];
    assert_eq!(record.status, FileStatus::Error);
    assert_eq!(record.derived_name, "broken.pdf");
    assert!(record
        .error_detail
        .as_deref()
        .unwrap()
        .starts_with("Failed to load PDF"));
    assert!(!session.can_download());
}

#[tokio::test]
async fn test_policy_pdf_is_renamed_and_archived() {
    let harness = TestHarness::new();
    let session = harness.pdf_session();

    let policy = PdfBuilder::new()
        .page("Póliza de Auto Flex correspondiente al periodo 2024")
        .page("Condiciones generales")
        .win_ansi()
        .build();
    let other = PdfBuilder::new().page("Recibo de pago").build();

    session
        .add_files(vec![
            harness.upload("scan_001.pdf", &policy),
            harness.upload("scan_002.pdf", &other),
            harness.upload("scan_003.pdf", b"%PDF-1.5 truncated"),
        ])
        .unwrap();
    harness.settle(&session).await;

    let records = session.snapshot();
    assert_eq!(records[0].derived_name, "Auto Flex.pdf");
    assert_eq!(records[1].derived_name, "scan_002.pdf");
    assert_eq!(records[2].status, FileStatus::Error);

    let path = session.download().await.unwrap();
    assert_eq!(archive_names(&path), vec!["Auto Flex.pdf", "scan_002.pdf"]);
    assert_eq!(archive_entry(&path, "Auto Flex.pdf"), policy);
    assert_eq!(archive_entry(&path, "scan_002.pdf"), other);
}

#[tokio::test]
async fn test_policy_phrase_split_across_text_runs() {
    let harness = TestHarness::new();
    let session = harness.pdf_session();

    let pdf = PdfBuilder::new()
        .page_runs(&["Póliza de", "Auto Flex", "correspondiente", "al periodo 2024"])
        .win_ansi()
        .build();
    session
        .add_files(vec![harness.upload("scan_010.pdf", &pdf)])
        .unwrap();
    harness.settle(&session).await;

    let record = &session.snapshot()[0];
    assert_eq!(record.status, FileStatus::Success);
    assert_eq!(record.concept.as_deref(), Some("Auto Flex"));
    assert_eq!(record.derived_name, "Auto Flex.pdf");
}
