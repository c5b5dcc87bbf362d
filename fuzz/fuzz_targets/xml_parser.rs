#![no_main]
use etreemodel::xml::{Element, Parser};
use etreemodel::WriterConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(root) = Parser::new(data).parse() {
        // anything that parses must survive a write/parse cycle unchanged
        let written = root.to_xml(&WriterConfig::compact());
        let reparsed: Result<Element, _> = written.parse();
        assert_eq!(reparsed.ok(), Some(root));
    }
});
