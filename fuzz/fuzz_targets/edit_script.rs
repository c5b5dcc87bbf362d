#![no_main]
use etreemodel::script::{parse_script, run};
use etreemodel::xml::Element;
use etreemodel::{EtreeModel, Layout, ModelConfig, Recorder};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(commands) = parse_script(source) else {
        return;
    };

    let mut root = Element::new("root").with_attribute("a", "1").with_text("t");
    root.sub_element("one").sub_element("two");
    root.sub_element("three");

    for layout in [Layout::Grouped, Layout::Flat] {
        let mut model = EtreeModel::with_observer(
            root.clone(),
            ModelConfig::default().with_layout(layout),
            Recorder::new(),
        );
        let _ = run(&mut model, &commands);
        assert!(model.hierarchy().validate().is_ok());
        assert!(model.observer().is_balanced());
    }
});
