//! # Quire DOM
//!
//! DOM-like input tree consumed by the Quire parser, plus a lenient
//! markup reader that builds such trees from text.
//!
//! ```rust
//! use quire_dom::parse_fragment;
//!
//! let root = parse_fragment("<p>Hello <b>world</b></p>", "body").unwrap();
//! assert_eq!(root.tag, "body");
//! assert_eq!(root.text_content(), "Hello world");
//! ```

pub mod ast;
pub mod entities;
pub mod error;
pub mod parser;
pub mod tokenizer;

pub use ast::{is_void_element, parse_style, DomElement, DomNode, VOID_ELEMENTS};
pub use entities::decode_entities;
pub use error::{ParseError, ParseResult};
pub use parser::{parse_fragment, parse_html, MarkupParser};
pub use tokenizer::{tokenize, Token};
