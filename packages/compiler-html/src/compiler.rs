use quire_core::{VElement, VNode};
use quire_dom::is_void_element;
use thiserror::Error;
use tracing::trace;

pub type CompileResult<T> = Result<T, CompileError>;

/// Errors that can occur during HTML compilation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("Invalid tag name: '{0}'")]
    InvalidTagName(String),

    #[error("Invalid attribute name '{name}' on <{tag}>")]
    InvalidAttributeName { tag: String, name: String },
}

/// Options for HTML compilation
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Put elements holding only elements on their own indented lines.
    /// Elements with text children are always written on one line so
    /// their text comes back unchanged.
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: "  ".to_string(),
        }
    }
}

impl CompileOptions {
    pub fn compact() -> Self {
        Self {
            pretty: false,
            ..Default::default()
        }
    }
}

struct Context {
    options: CompileOptions,
    depth: usize,
    /// Open elements written on a single line
    inline: usize,
    buffer: String,
}

impl Context {
    fn new(options: CompileOptions) -> Self {
        Self {
            options,
            depth: 0,
            inline: 0,
            buffer: String::new(),
        }
    }

    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn add_indent(&mut self) {
        for _ in 0..self.depth {
            self.buffer.push_str(&self.options.indent);
        }
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    fn at_line_start(&self) -> bool {
        self.options.pretty && self.inline == 0
    }

    fn get_output(self) -> String {
        self.buffer
    }
}

/// Compile a node and its subtree to HTML
pub fn compile_to_html(node: &VNode, options: CompileOptions) -> CompileResult<String> {
    let mut ctx = Context::new(options);
    compile_node(node, &mut ctx)?;
    let output = ctx.get_output();
    trace!(bytes = output.len(), "Compiled node to HTML");
    Ok(output)
}

/// Compile only the children of `element`, as for a document body
pub fn compile_children(element: &VElement, options: CompileOptions) -> CompileResult<String> {
    let mut ctx = Context::new(options);
    for child in &element.children {
        compile_node(child, &mut ctx)?;
    }
    Ok(ctx.get_output())
}

fn compile_node(node: &VNode, ctx: &mut Context) -> CompileResult<()> {
    match node {
        VNode::Element(element) => compile_tag(element, ctx),
        VNode::Text { content } => {
            ctx.add(&escape_html(content));
            Ok(())
        }
    }
}

fn compile_tag(element: &VElement, ctx: &mut Context) -> CompileResult<()> {
    let name = element.tag.as_str();
    if !is_valid_tag_name(name) {
        return Err(CompileError::InvalidTagName(name.to_string()));
    }

    let own_line = ctx.at_line_start();
    if own_line {
        ctx.add_indent();
    }

    // Opening tag
    ctx.add(&format!("<{}", name));

    for (attr_name, value) in &element.attributes {
        if attr_name == "style" && !element.styles.is_empty() {
            continue;
        }
        if !is_valid_attribute_name(attr_name) {
            return Err(CompileError::InvalidAttributeName {
                tag: name.to_string(),
                name: attr_name.clone(),
            });
        }
        ctx.add(&format!(" {}=\"{}\"", attr_name, escape_html(value)));
    }

    if !element.styles.is_empty() {
        let declarations: Vec<String> = element
            .styles
            .iter()
            .map(|(key, value)| format!("{}: {}", key, value))
            .collect();
        ctx.add(&format!(" style=\"{}\"", escape_html(&declarations.join("; "))));
    }

    // Self-closing tags
    if element.children.is_empty() && is_self_closing(name) {
        ctx.add(" />");
        if own_line {
            ctx.add("\n");
        }
        return Ok(());
    }

    ctx.add(">");

    if own_line && has_only_element_children(&element.children) {
        ctx.add("\n");
        ctx.indent();
        for child in &element.children {
            compile_node(child, ctx)?;
        }
        ctx.dedent();
        ctx.add_indent();
    } else {
        ctx.inline += 1;
        for child in &element.children {
            compile_node(child, ctx)?;
        }
        ctx.inline -= 1;
    }

    // Closing tag
    ctx.add(&format!("</{}>", name));
    if own_line {
        ctx.add("\n");
    }

    Ok(())
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn is_valid_tag_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == ':')
        }
        _ => false,
    }
}

fn is_valid_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|c| {
            !c.is_whitespace() && !c.is_control() && !matches!(c, '"' | '\'' | '<' | '>' | '/' | '=')
        })
}

fn is_self_closing(tag: &str) -> bool {
    is_void_element(tag)
}

fn has_only_element_children(children: &[VNode]) -> bool {
    !children.is_empty() && children.iter().all(|child| matches!(child, VNode::Element(_)))
}
