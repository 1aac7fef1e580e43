use medichain_core::{Document, Value};

#[test]
fn document_roundtrip_skips_missing_embedding() {
    let doc = Document::new("doc-1", "Bệnh: Cúm")
        .with_metadata("source", "https://vinmec.com/cum")
        .with_metadata("title", "Cúm");

    let json = serde_json::to_value(&doc).unwrap();
    assert!(json.get("embedding").is_none());

    let parsed: Document = serde_json::from_value(json).unwrap();
    assert_eq!(doc, parsed);
    assert_eq!(parsed.source(), Some("https://vinmec.com/cum"));
}

#[test]
fn metadata_defaults_when_absent() {
    let parsed: Document =
        serde_json::from_value(serde_json::json!({"id": "a", "content": "b"})).unwrap();
    assert!(parsed.metadata.is_empty());
    assert_eq!(parsed.metadata.get("source"), None::<&Value>);
}
