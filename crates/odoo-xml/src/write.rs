use crate::{Document, Element, Node};

const INDENT: &str = "  ";
const DEFAULT_DECLARATION: &str = r#"xml version="1.0" encoding="utf-8""#;

fn write_node(out: &mut String, node: &Node, level: usize) {
    match node {
        Node::Element(element) => write_element(out, element, level),
        Node::Text(text) => out.push_str(text),
        Node::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
        Node::CData(data) => {
            out.push_str("<![CDATA[");
            out.push_str(data);
            out.push_str("]]>");
        }
        Node::Instruction(content) => {
            out.push_str("<?");
            out.push_str(content);
            out.push_str("?>");
        }
        Node::DocType(content) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(content);
            out.push('>');
        }
        Node::BlankLine => {}
    }
}

fn write_element(out: &mut String, element: &Element, level: usize) {
    out.push('<');
    out.push_str(&element.name);
    out.push_str(&element.raw_attributes);

    let children = &element.children;
    if children.iter().all(|node| *node == Node::BlankLine) {
        if element.self_closing {
            out.push_str("/>");
        } else {
            out.push_str("></");
            out.push_str(&element.name);
            out.push('>');
        }
        return;
    }

    out.push('>');
    if element.inline || children.iter().any(|node| matches!(node, Node::Text(_))) {
        // Text is significant: write children where they stand.
        for child in children {
            write_node(out, child, level + 1);
        }
    } else {
        for child in children {
            out.push('\n');
            if *child != Node::BlankLine {
                push_indent(out, level + 1);
                write_node(out, child, level + 1);
            }
        }
        out.push('\n');
        push_indent(out, level);
    }
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}

fn push_indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str(INDENT);
    }
}

pub(crate) fn write_document(document: &Document) -> String {
    let declaration = document
        .declaration
        .as_deref()
        .unwrap_or(DEFAULT_DECLARATION)
        .replace('\'', "\"");

    let mut out = String::new();
    out.push_str("<?");
    out.push_str(&declaration);
    out.push_str("?>\n");
    for node in &document.prolog {
        write_node(&mut out, node, 0);
        out.push('\n');
    }
    write_element(&mut out, &document.root, 0);
    for node in &document.epilog {
        out.push('\n');
        write_node(&mut out, node, 0);
    }
    if document.trailing_newline {
        out.push('\n');
    }
    out
}
