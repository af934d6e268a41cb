#![no_main]
use libfuzzer_sys::fuzz_target;
use zconf::{Node, WriteConfig, XmlParser};

fuzz_target!(|data: &[u8]| {
    if let Ok(doc) = XmlParser::new(data).parse() {
        let node = Node::from_document(&doc);
        let xml = node.to_xml_string(None, &WriteConfig::compact());
        let _ = Node::from_xml_str(&xml);
    }
});
