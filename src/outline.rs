//! Plain-text rendering of a model, row by row

use std::fmt::Write;

use crate::model::{EtreeModel, ModelIndex, ModelObserver, Role};

/// Render every row the model exposes, depth first
///
/// Rows are indented two spaces per level and show `label` or
/// `label = value`, trailing whitespace trimmed. Only the model's query
/// surface is used, so the output is what a tree view would display with
/// every row expanded.
pub fn outline<O: ModelObserver>(model: &EtreeModel<O>) -> String {
    let mut out = String::new();
    write_rows(model, &ModelIndex::invalid(), 0, &mut out);
    out
}

fn write_rows<O: ModelObserver>(model: &EtreeModel<O>, parent: &ModelIndex, depth: usize, out: &mut String) {
    for row in 0..model.row_count(parent) {
        let index = model.index(row, 0, parent);
        let label = model.data(&index, Role::Display).unwrap_or_default();
        let value = model.data(&index.sibling_column(1), Role::Display);

        let mut line = format!("{:indent$}{label}", "", indent = depth * 2);
        if let Some(value) = value {
            let _ = write!(line, " = {value}");
        }
        out.push_str(line.trim_end());
        out.push('\n');
        write_rows(model, &index, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Layout, ModelConfig};
    use crate::xml::Element;

    fn sample() -> Element {
        Element::new("root")
            .with_attribute("id", "7")
            .with_text("hi")
            .with_child(Element::new("leaf"))
    }

    #[test]
    fn test_grouped_outline() {
        let model = EtreeModel::new(sample());
        let expected = "\
root
  Attributes:
    id = 7
  Text:
     = hi
  Children:
    leaf
      Attributes:
      Text:

      Children:
";
        assert_eq!(outline(&model), expected);
    }

    #[test]
    fn test_flat_outline() {
        let model = EtreeModel::with_config(sample(), ModelConfig::default().with_layout(Layout::Flat));
        let expected = "\
root
  id = 7
  Text: = hi
  leaf
    Text:
";
        assert_eq!(outline(&model), expected);
    }
}
