use crate::ast::{is_void_element, DomElement, DomNode};
use crate::entities::decode_entities;
use crate::error::{ParseError, ParseResult};
use crate::tokenizer::{tokenize, Token};

/// Lenient tree builder for markup source.
///
/// Missing close tags are closed implicitly, stray close tags are dropped,
/// and void elements never take children.
pub struct MarkupParser<'src> {
    tokens: Vec<(Token<'src>, std::ops::Range<usize>)>,
    pos: usize,
    open: Vec<DomElement>,
    roots: Vec<DomNode>,
}

impl<'src> MarkupParser<'src> {
    pub fn new(source: &'src str) -> ParseResult<Self> {
        Ok(Self {
            tokens: tokenize(source)?,
            pos: 0,
            open: Vec::new(),
            roots: Vec::new(),
        })
    }

    /// Parse every token into a list of root nodes
    pub fn parse_nodes(mut self) -> ParseResult<Vec<DomNode>> {
        while self.pos < self.tokens.len() {
            let (token, span) = self.tokens[self.pos].clone();
            self.pos += 1;

            match token {
                Token::OpenTag(raw) => {
                    let (element, self_closing) = parse_open_tag(raw, span.start)?;
                    if self_closing || element.is_void() {
                        self.push_node(DomNode::Element(element));
                    } else {
                        self.open.push(element);
                    }
                }
                Token::CloseTag(raw) => {
                    let name = raw[2..raw.len() - 1].trim().to_ascii_lowercase();
                    self.close(&name);
                }
                Token::Text(raw) => {
                    self.push_node(DomNode::text(decode_entities(raw)));
                }
                Token::Comment(raw) => {
                    let content = &raw[4..raw.len() - 3];
                    self.push_node(DomNode::comment(content));
                }
                Token::Doctype(raw) => {
                    self.push_node(DomNode::Doctype {
                        content: raw[2..raw.len() - 1].to_string(),
                    });
                }
            }
        }

        while !self.open.is_empty() {
            self.pop_open();
        }

        Ok(self.roots)
    }

    fn push_node(&mut self, node: DomNode) {
        match self.open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
    }

    fn pop_open(&mut self) {
        if let Some(element) = self.open.pop() {
            self.push_node(DomNode::Element(element));
        }
    }

    /// Close the innermost open element named `name` and everything opened inside it
    fn close(&mut self, name: &str) {
        if is_void_element(name) {
            return;
        }
        let Some(depth) = self.open.iter().rposition(|el| el.tag == name) else {
            return;
        };
        while self.open.len() > depth {
            self.pop_open();
        }
    }
}

/// Split `<tag attr="v" ...>` into an element and its self-closing flag
fn parse_open_tag(raw: &str, offset: usize) -> ParseResult<(DomElement, bool)> {
    let mut inner = &raw[1..raw.len() - 1];
    let self_closing = inner.trim_end().ends_with('/');
    if self_closing {
        inner = inner.trim_end().trim_end_matches('/');
    }

    let name_end = inner
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == ':' || c == '-'))
        .unwrap_or(inner.len());
    let mut element = DomElement::new(&inner[..name_end]);

    let bytes = inner.as_bytes();
    let mut i = name_end;

    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() || c == b'/' {
            i += 1;
            continue;
        }

        let start = i;
        while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'=' {
            if bytes[i] == b'"' || bytes[i] == b'\'' {
                return Err(ParseError::invalid_syntax(
                    offset + 1 + i,
                    "quote inside attribute name",
                ));
            }
            i += 1;
        }
        let name = &inner[start..i];
        if name.is_empty() {
            return Err(ParseError::invalid_syntax(
                offset + 1 + i,
                "attribute value without a name",
            ));
        }

        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        let mut value = String::new();
        if i < bytes.len() && bytes[i] == b'=' {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
                let quote = bytes[i];
                let value_start = i + 1;
                let value_end = inner[value_start..]
                    .find(quote as char)
                    .map(|n| value_start + n)
                    .ok_or_else(|| {
                        ParseError::invalid_syntax(offset + 1 + i, "unterminated attribute value")
                    })?;
                value = decode_entities(&inner[value_start..value_end]).into_owned();
                i = value_end + 1;
            } else {
                let value_start = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                value = decode_entities(&inner[value_start..i]).into_owned();
            }
        }

        element
            .attributes
            .insert(name.to_ascii_lowercase(), value);
    }

    Ok((element, self_closing))
}

/// Parse markup into its root nodes
pub fn parse_html(source: &str) -> ParseResult<Vec<DomNode>> {
    MarkupParser::new(source)?.parse_nodes()
}

/// Parse markup and wrap the root nodes in a synthetic `root_tag` element.
///
/// When the source is a single element already named `root_tag`, that
/// element is returned as is.
pub fn parse_fragment(source: &str, root_tag: &str) -> ParseResult<DomElement> {
    let mut nodes = parse_html(source)?;

    let significant: Vec<usize> = nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| !node.is_whitespace_text() && !matches!(node, DomNode::Doctype { .. }))
        .map(|(i, _)| i)
        .collect();

    if let [only] = significant.as_slice() {
        if matches!(&nodes[*only], DomNode::Element(el) if el.tag == root_tag) {
            if let DomNode::Element(el) = nodes.swap_remove(*only) {
                return Ok(el);
            }
        }
    }

    Ok(DomElement::new(root_tag).with_children(nodes))
}
