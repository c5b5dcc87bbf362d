#![allow(clippy::panic_in_result_fn)]
#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::indexing_slicing)]

use std::error::Error;
use std::fs;

use etreemodel::script::{parse_script, run, Command, RowPath};
use etreemodel::xml::Element;
use etreemodel::{outline, EtreeModel, ErrorKind, Layout, ModelConfig, Recorder, WriterConfig};

fn sample() -> Element {
    let mut root = Element::new("xmlRoot").with_attribute("attrib1", "foo");
    root.sub_element("Child1").sub_element("SubChild1");
    root.sub_element("Child2");
    root
}

#[test]
fn test_script_file() -> Result<(), Box<dyn Error>> {
    let source = fs::read_to_string("tests/input/edits.txt")?;
    let commands = parse_script(&source)?;
    assert_eq!(commands.len(), 8);

    let mut model = EtreeModel::with_observer(
        sample(),
        ModelConfig::default().with_layout(Layout::Flat),
        Recorder::new(),
    );
    assert_eq!(run(&mut model, &commands)?, 8);
    assert_eq!(
        model.to_xml_string(&WriterConfig::compact()),
        "<root attrib1_new=\"bar\">hello<untitled4/><NewElement><Child1><SubChild1/><NewElement/></Child1></NewElement></root>"
    );
    model.hierarchy().validate()?;
    assert!(model.observer().is_balanced());
    Ok(())
}

#[test]
fn test_grouped_paths() -> Result<(), Box<dyn Error>> {
    let mut model = EtreeModel::new(sample());
    let commands = parse_script(
        "
        # grouped rows: 0 Attributes:, 1 Text:, 2 Children:
        set 0/0/0 1 changed
        set 0/1/0 1 some text
        delete 0/2/1
        add-child 0/2/0
        ",
    )?;
    assert_eq!(run(&mut model, &commands)?, 4);
    let expected = "\
xmlRoot
  Attributes:
    attrib1 = changed
  Text:
     = some text
  Children:
    Child1
      Attributes:
      Text:

      Children:
        SubChild1
          Attributes:
          Text:

          Children:
        NewElement
          Attributes:
          Text:

          Children:
";
    assert_eq!(outline(&model), expected);
    Ok(())
}

#[test]
fn test_refused_commands_are_counted_out() -> Result<(), Box<dyn Error>> {
    let mut model = EtreeModel::new(sample());
    let commands = parse_script(
        "
        delete 0
        remove 0
        set 0 1 value-column
        remove-attr 0 missing
        add-attr 0 3bad
        insert-rows 0/1 0 1
        remove-rows 0/2 0 0
        action 0/0/0 Add Child
        ",
    )?;
    assert_eq!(run(&mut model, &commands)?, 0);
    assert_eq!(model.document_root(), Some(sample()));
    Ok(())
}

#[test]
fn test_huge_row_counts_are_refused() -> Result<(), Box<dyn Error>> {
    for layout in [Layout::Grouped, Layout::Flat] {
        let mut model = EtreeModel::with_observer(
            sample(),
            ModelConfig::default().with_layout(layout),
            Recorder::new(),
        );
        let container = match layout {
            Layout::Grouped => "0/2",
            Layout::Flat => "0",
        };
        let commands = parse_script(&format!(
            "remove-rows {container} 1 18446744073709551615\n\
             insert-rows {container} 1 18446744073709551615\n\
             remove-rows {container} 18446744073709551615 2\n"
        ))?;
        assert_eq!(run(&mut model, &commands)?, 0);
        assert_eq!(model.document_root(), Some(sample()));
        assert!(model.observer().notifications().is_empty());
    }
    Ok(())
}

#[test]
fn test_bad_path_stops_the_run() -> Result<(), Box<dyn Error>> {
    let mut model = EtreeModel::new(sample());
    let commands = parse_script("add-child 0\nadd-child 0/7\nadd-child 0\n")?;
    let err = run(&mut model, &commands).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::InvalidPath { path } if path == "0/7"));
    let children = model.document_root().map(|root| root.children.len());
    assert_eq!(children, Some(3));
    Ok(())
}

#[test]
fn test_command_parsing() -> Result<(), Box<dyn Error>> {
    let command: Command = "remove-rows 0/2 1 2".parse()?;
    assert_eq!(command.path(), &"0/2".parse::<RowPath>()?);
    assert_eq!(command.path().rows(), [0, 2]);

    let err = parse_script("add-child 0\nset 0\n").unwrap_err();
    assert_eq!(err.span().start.line, 2);
    assert!(err.message().contains("missing column"));
    Ok(())
}
