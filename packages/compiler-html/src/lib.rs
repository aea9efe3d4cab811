//! # Quire HTML
//!
//! Serializes rendered trees back to markup text.
//!
//! ```rust
//! use quire_core::VElement;
//! use quire_html::{compile_to_html, CompileOptions};
//!
//! let tree = VElement::new("p").with_text("a < b");
//! let html = compile_to_html(&tree.into(), CompileOptions::compact()).unwrap();
//! assert_eq!(html, "<p>a &lt; b</p>");
//! ```

mod compiler;


pub use compiler::{compile_children, compile_to_html, CompileError, CompileOptions, CompileResult};
