//! XML serialization

use crate::config::WriterConfig;
use crate::xml::element::Element;

const DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";

/// Serializes owned [`Element`] trees
///
/// Pretty output only indents elements without mixed content, so parsing
/// the output again yields the same tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlWriter;

impl XmlWriter {
    pub fn write(&self, element: &Element, config: &WriterConfig) -> String {
        let mut output = String::new();
        if config.declaration {
            output.push_str(DECLARATION);
            output.push('\n');
        }
        write_element(element, config, 0, &mut output);
        if config.pretty {
            output.push('\n');
        }
        output
    }
}

fn write_element(element: &Element, config: &WriterConfig, depth: usize, output: &mut String) {
    output.push('<');
    output.push_str(&element.tag);
    for (key, value) in &element.attributes {
        output.push(' ');
        output.push_str(key);
        output.push_str("=\"");
        output.push_str(&escape_attribute(value));
        output.push('"');
    }

    if element.children.is_empty() && element.text.is_none() {
        output.push_str("/>");
        return;
    }
    output.push('>');

    if let Some(text) = &element.text {
        output.push_str(&escape_text(text));
    }

    let indent = config.pretty && !has_mixed_content(element);
    for child in &element.children {
        if indent {
            newline(config, depth + 1, output);
        }
        write_element(child, config, depth + 1, output);
        if let Some(tail) = &child.tail {
            output.push_str(&escape_text(tail));
        }
    }
    if indent && !element.children.is_empty() {
        newline(config, depth, output);
    }

    output.push_str("</");
    output.push_str(&element.tag);
    output.push('>');
}

fn has_mixed_content(element: &Element) -> bool {
    element.text.is_some() || element.children.iter().any(|child| child.tail.is_some())
}

fn newline(config: &WriterConfig, depth: usize, output: &mut String) {
    output.push('\n');
    output.push_str(&" ".repeat(depth * config.indent_spaces));
}

fn escape_text(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(input: &str) -> String {
    escape_text(input)
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Element {
        let mut root = Element::new("xmlRoot").with_attribute("attrib1", "foo");
        root.sub_element("Child1").sub_element("SubChild1");
        root.sub_element("Child2");
        root
    }

    #[test]
    fn test_compact() {
        let out = XmlWriter.write(&sample(), &WriterConfig::compact());
        assert_eq!(
            out,
            "<xmlRoot attrib1=\"foo\"><Child1><SubChild1/></Child1><Child2/></xmlRoot>"
        );
    }

    #[test]
    fn test_pretty() {
        let out = XmlWriter.write(&sample(), &WriterConfig::default());
        let expected = "<xmlRoot attrib1=\"foo\">\n  <Child1>\n    <SubChild1/>\n  </Child1>\n  <Child2/>\n</xmlRoot>\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_mixed_content_is_not_indented() {
        let mut root = Element::new("p").with_text("a");
        root.sub_element("b").tail = Some("c".to_string());
        let out = XmlWriter.write(&root, &WriterConfig::default());
        assert_eq!(out, "<p>a<b/>c</p>\n");
    }

    #[test]
    fn test_escaping() {
        let root = Element::new("r")
            .with_attribute("q", "\"<'>&")
            .with_text("1 < 2 & 3");
        let out = XmlWriter.write(&root, &WriterConfig::compact());
        assert_eq!(
            out,
            "<r q=\"&quot;&lt;&apos;&gt;&amp;\">1 &lt; 2 &amp; 3</r>"
        );
    }

    #[test]
    fn test_declaration() {
        let config = WriterConfig {
            declaration: true,
            ..WriterConfig::compact()
        };
        let out = XmlWriter.write(&Element::new("r"), &config);
        assert!(out.starts_with(DECLARATION));
        assert!(out.ends_with("<r/>"));
    }
}
