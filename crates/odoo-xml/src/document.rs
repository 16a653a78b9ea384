use crate::{Result, parse, write};

/// A child of an element, or a top-level node outside the root.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Character data exactly as written, entity references included.
    Text(String),
    Comment(String),
    CData(String),
    /// Processing instruction content between `<?` and `?>`.
    Instruction(String),
    DocType(String),
    /// An empty line between two siblings of an element laid out one child
    /// per line.
    BlankLine,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub(crate) name: String,
    /// Everything between the tag name and the closing `>` or `/>`.
    pub(crate) raw_attributes: String,
    pub(crate) attributes: Vec<(String, String)>,
    pub(crate) children: Vec<Node>,
    pub(crate) self_closing: bool,
    /// Markup children written back to back, with no whitespace between them.
    pub(crate) inline: bool,
}

impl Element {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unescaped value of attribute `name`.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Whether any child is an element. Comments, text and blank lines
    /// don't count.
    pub fn has_element_children(&self) -> bool {
        self.elements().next().is_some()
    }

    /// Visit every child element and remove those for which `keep` returns
    /// false. `keep` may modify the element it is given.
    ///
    /// A removed element takes one neighbouring blank line with it when it
    /// would otherwise leave two blank lines in a row, or one at the start
    /// or end of the children. Returns the number of removed elements.
    pub fn retain_elements<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&mut Element) -> bool,
    {
        let mut removed = 0;
        let mut index = 0;
        while index < self.children.len() {
            let remove = match &mut self.children[index] {
                Node::Element(element) => !keep(element),
                _ => false,
            };
            if !remove {
                index += 1;
                continue;
            }

            self.children.remove(index);
            removed += 1;

            let next_blank_or_end =
                matches!(self.children.get(index), None | Some(Node::BlankLine));
            if index > 0 && self.children[index - 1] == Node::BlankLine && next_blank_or_end {
                self.children.remove(index - 1);
                index -= 1;
            } else if index == 0 && self.children.first() == Some(&Node::BlankLine) {
                self.children.remove(0);
            }
        }
        removed
    }
}

/// A parsed XML file.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Content of the `<?xml ...?>` declaration, without the delimiters.
    pub(crate) declaration: Option<String>,
    /// Comments and instructions before the root element.
    pub(crate) prolog: Vec<Node>,
    pub(crate) root: Element,
    pub(crate) epilog: Vec<Node>,
    pub(crate) trailing_newline: bool,
}

impl Document {
    pub fn parse(source: &str) -> Result<Self> {
        parse::parse_document(source)
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    /// Serialize with an XML declaration, two-space indentation and blank
    /// lines restored.
    pub fn to_xml_string(&self) -> String {
        write::write_document(self)
    }
}
