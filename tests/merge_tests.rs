use zconf::{MergeMode, MergeOutcome, Node};

#[test]
fn test_matching_signature_updates_value_and_attributes() {
    let mut a = Node::new("item").with_attribute("id", "1").with_value("old");
    let b = Node::new("item").with_attribute("id", "1").with_value("new");

    assert_eq!(a.merge(b.clone()), MergeOutcome::Merged);
    assert_eq!(a.value(), Some("new"));
    assert_eq!(a.attributes(), b.attributes());
}

#[test]
fn test_mismatched_signature_yields_incoming() {
    let mut a = Node::new("item").with_attribute("id", "1").with_value("old");
    let b = Node::new("item").with_attribute("id", "2");
    let untouched = a.clone();

    let rejected = a.merge(b.clone()).into_rejected();

    assert_eq!(rejected, Some(b));
    assert_eq!(a, untouched);
}

#[test]
fn test_merge_from_file_returns_parsed_source() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("overlay.xml");
    std::fs::write(
        &path,
        r#"<config id="1"><database host="db.internal">primary</database></config>"#,
    )?;

    let mut base = Node::from_xml_str(r#"<config id="1"><database host="db.internal"/></config>"#)?;
    let parsed = base.merge_from_file(&path)?;

    assert_eq!(parsed, Node::from_file(&path)?);
    assert!(!parsed.is_same(&base));
    assert_eq!(
        base.get_child("config/database").and_then(Node::value),
        Some("primary")
    );
    assert_eq!(base.children().len(), 1);
    Ok(())
}

#[test]
fn test_merge_from_missing_file_fails() {
    let mut base = Node::new("config");
    assert!(base.merge_from_file("/no/such/overlay.xml").is_err());
    assert!(base.merge_from_str("<config>").is_err());
}

#[test]
fn test_repeated_merges_strict_vs_compatible() -> Result<(), Box<dyn std::error::Error>> {
    let overlay = r#"<servers><server name="http" port="80"/><server name="https" port="443"/></servers>"#;

    let mut compatible = Node::from_xml_str(overlay)?;
    let mut strict = compatible.clone();
    for _ in 0..3 {
        let incoming = Node::from_xml_str(overlay)?;
        assert!(compatible.merge(incoming.clone()).is_merged());
        assert!(strict.merge_with(incoming, MergeMode::Strict).is_merged());
    }

    assert_eq!(compatible.children().len(), 5);
    assert_eq!(strict.children().len(), 2);
    assert_eq!(strict, Node::from_xml_str(overlay)?);
    Ok(())
}
