#![cfg(feature = "serde")]

use zconf::Node;

#[test]
fn test_node_json_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let mut node = Node::from_xml_str(r#"<config id="1" env="prod"><item x="a">v</item></config>"#)?;
    node.set_schema_file("schema/config.xsd");

    let json = serde_json::to_string(&node)?;
    let back: Node = serde_json::from_str(&json)?;

    assert_eq!(back, node);
    let keys: Vec<&str> = back.attributes().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["id", "env"]);
    Ok(())
}
