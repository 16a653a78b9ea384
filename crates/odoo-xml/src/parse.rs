use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::{Document, Element, Node, Result, XmlError};

fn raw(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn is_xml_whitespace(text: &str) -> bool {
    text.bytes().all(|b| matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
}

fn element_from(start: &BytesStart, self_closing: bool) -> Result<Element> {
    let name = raw(start.name().as_ref());
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlError::Attribute {
            element: name.clone(),
            message: e.to_string(),
        })?;
        // Unknown entities (`&nbsp;` and friends) keep their raw spelling.
        let value = attr
            .unescape_value()
            .map(Cow::into_owned)
            .unwrap_or_else(|_| raw(&attr.value));
        attributes.push((raw(attr.key.as_ref()), value));
    }

    Ok(Element {
        name,
        raw_attributes: raw(start.attributes_raw()),
        attributes,
        children: Vec::new(),
        self_closing,
        inline: false,
    })
}

/// Append `node`, merging adjacent runs of character data.
fn push_child(children: &mut Vec<Node>, node: Node) {
    if let Node::Text(text) = &node
        && let Some(Node::Text(last)) = children.last_mut()
    {
        last.push_str(text);
        return;
    }
    children.push(node);
}

/// Turn inter-element whitespace into blank-line markers when an element
/// holds markup only. Elements with any real text keep their text verbatim,
/// and markup with no whitespace between it stays inline.
fn normalize_layout(element: &mut Element) {
    let children = &mut element.children;
    let has_markup = children.iter().any(|node| !matches!(node, Node::Text(_)));
    let whitespace_only = children.iter().all(|node| match node {
        Node::Text(text) => is_xml_whitespace(text),
        _ => true,
    });
    if !has_markup || !whitespace_only {
        return;
    }
    if !children.iter().any(|node| matches!(node, Node::Text(_))) {
        element.inline = true;
        return;
    }

    for node in std::mem::take(children) {
        match node {
            Node::Text(text) => {
                let blank_lines = text.matches('\n').count().saturating_sub(1);
                children.extend(std::iter::repeat_n(Node::BlankLine, blank_lines));
            }
            other => children.push(other),
        }
    }
}

pub(crate) fn parse_document(source: &str) -> Result<Document> {
    let mut reader = Reader::from_str(source);
    reader.config_mut().trim_text(false);

    let mut declaration = None;
    let mut prolog = Vec::new();
    let mut epilog = Vec::new();
    let mut root: Option<Element> = None;
    let mut open: Vec<Element> = Vec::new();

    loop {
        let event = reader.read_event().map_err(|e| XmlError::Syntax {
            position: reader.error_position(),
            message: e.to_string(),
        })?;

        let node = match event {
            Event::Eof => break,
            Event::Decl(decl) => {
                declaration = Some(raw(&decl));
                continue;
            }
            Event::Start(start) => {
                open.push(element_from(&start, false)?);
                continue;
            }
            Event::Empty(start) => Node::Element(element_from(&start, true)?),
            Event::End(end) => {
                let Some(mut element) = open.pop() else {
                    return Err(XmlError::UnexpectedEnd {
                        name: raw(end.name().as_ref()),
                        position: reader.buffer_position(),
                    });
                };
                normalize_layout(&mut element);
                Node::Element(element)
            }
            Event::Text(text) => Node::Text(raw(&text)),
            Event::GeneralRef(reference) => Node::Text(format!("&{};", raw(&reference))),
            Event::CData(cdata) => Node::CData(raw(&cdata)),
            Event::Comment(comment) => Node::Comment(raw(&comment)),
            Event::PI(instruction) => Node::Instruction(raw(&instruction)),
            Event::DocType(doctype) => Node::DocType(raw(&doctype)),
        };

        if let Some(parent) = open.last_mut() {
            push_child(&mut parent.children, node);
            continue;
        }

        match node {
            Node::Element(element) => {
                if root.is_some() {
                    return Err(XmlError::MultipleRoots);
                }
                root = Some(element);
            }
            Node::Text(text) if is_xml_whitespace(&text) => {}
            Node::Text(_) => return Err(XmlError::TextOutsideRoot),
            other if root.is_some() => epilog.push(other),
            other => prolog.push(other),
        }
    }

    if let Some(unclosed) = open.pop() {
        return Err(XmlError::Unclosed(unclosed.name));
    }

    Ok(Document {
        declaration,
        prolog,
        root: root.ok_or(XmlError::MissingRoot)?,
        epilog,
        trailing_newline: source.ends_with('\n'),
    })
}
