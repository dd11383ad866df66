//! Export Integration Tests
//!
//! Artifact naming and the two-file export contract.

use serde_json::json;
use tempfile::TempDir;

use docsift::core::export::artifact_base_name;
use docsift::ResultExporter;

#[test]
fn test_same_inputs_different_timestamps_never_collide() {
    let first = artifact_base_name(
        Some("invoice.pdf"),
        Some("https://svc/ops/result9?api-version=1"),
        "20260829_101500",
    );
    let second = artifact_base_name(
        Some("invoice.pdf"),
        Some("https://svc/ops/result9?api-version=1"),
        "20260829_101501",
    );

    assert_ne!(first, second);
    // Same derivation apart from the timestamp suffix.
    assert_eq!(first.rsplit_once('_').unwrap().0, second.rsplit_once('_').unwrap().0);
}

#[tokio::test]
async fn test_export_writes_both_artifacts() {
    let temp = TempDir::new().unwrap();
    let exporter = ResultExporter::new(temp.path());

    let result = json!({
        "status": "succeeded",
        "result": {"contents": [{"fields": {
            "Vendor": {"type": "string", "valueString": "Acme"},
            "Total": {"type": "number", "valueNumber": 42.5}
        }}]}
    });

    let paths = exporter
        .export(&result, Some("invoice.pdf"), Some("https://svc/ops/result9"))
        .await
        .unwrap();

    assert!(paths.structured.exists());
    assert!(paths.rendered.exists());
    assert!(paths
        .structured
        .file_name()
        .unwrap()
        .to_string_lossy()
        .ends_with("_results.json"));
    assert!(paths
        .rendered
        .file_name()
        .unwrap()
        .to_string_lossy()
        .ends_with("_formatted.md"));

    // Structured artifact is the verbatim tree.
    let structured: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&paths.structured).unwrap()).unwrap();
    assert_eq!(structured, result);

    // Rendered artifact carries the extracted fields.
    let rendered = std::fs::read_to_string(&paths.rendered).unwrap();
    assert!(rendered.contains("Vendor: Acme"));
    assert!(rendered.contains("Total: 42.50"));
}

#[tokio::test]
async fn test_export_without_fields_states_so_explicitly() {
    let temp = TempDir::new().unwrap();
    let exporter = ResultExporter::new(temp.path());

    let result = json!({"status": "succeeded", "result": {"contents": []}});
    let paths = exporter.export(&result, Some("empty.pdf"), None).await.unwrap();

    let rendered = std::fs::read_to_string(&paths.rendered).unwrap();
    assert!(rendered.contains("No fields were extracted from this document."));
    // The structured copy is still written.
    assert!(paths.structured.exists());
}

#[tokio::test]
async fn test_export_with_malformed_fields_keeps_both_artifacts() {
    let temp = TempDir::new().unwrap();
    let exporter = ResultExporter::new(temp.path());

    let result = json!({"result": {"contents": [{"fields": [1, 2, 3]}]}});
    let paths = exporter.export(&result, None, None).await.unwrap();

    let rendered = std::fs::read_to_string(&paths.rendered).unwrap();
    assert!(rendered.contains("could not be interpreted"));
    assert!(paths.structured.exists());
}

#[tokio::test]
async fn test_export_honors_configured_fields_pointer() {
    let temp = TempDir::new().unwrap();
    let exporter = ResultExporter::new(temp.path())
        .with_fields_pointer("/analyzeResult/documents/0/fields");

    let result = json!({"analyzeResult": {"documents": [{"fields": {
        "Total": {"type": "number", "valueNumber": 7.0}
    }}]}});

    let paths = exporter.export(&result, Some("x.pdf"), None).await.unwrap();
    let rendered = std::fs::read_to_string(&paths.rendered).unwrap();
    assert!(rendered.contains("Total: 7.00"));
}

#[tokio::test]
async fn test_export_creates_missing_output_directory() {
    let temp = TempDir::new().unwrap();
    let nested = temp.path().join("runs").join("today");
    let exporter = ResultExporter::new(&nested);

    let result = json!({"result": {"contents": []}});
    let paths = exporter.export(&result, None, None).await.unwrap();

    assert!(nested.is_dir());
    assert!(paths.structured.starts_with(&nested));
}
