use crate::error::{ParseError, ParseResult};
use logos::Logos;
use std::fmt;

/// Token types for markup source.
///
/// Tags are lexed whole; attribute lists are split by the tree builder.
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token<'src> {
    #[regex(r"<!--([^-]|-[^-])*-->", |lex| lex.slice())]
    Comment(&'src str),

    #[regex(r"<![a-zA-Z][^>]*>", |lex| lex.slice())]
    Doctype(&'src str),

    #[regex(r#"<[a-zA-Z][a-zA-Z0-9:-]*([^>"']|"[^"]*"|'[^']*')*>"#, |lex| lex.slice())]
    OpenTag(&'src str),

    #[regex(r"</[a-zA-Z][a-zA-Z0-9:-]*[ \t\r\n]*>", |lex| lex.slice())]
    CloseTag(&'src str),

    #[regex(r"[^<]+", |lex| lex.slice())]
    Text(&'src str),
}

impl<'src> fmt::Display for Token<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Comment(s) => write!(f, "comment {}", s),
            Token::Doctype(s) => write!(f, "declaration {}", s),
            Token::OpenTag(s) => write!(f, "open tag {}", s),
            Token::CloseTag(s) => write!(f, "close tag {}", s),
            Token::Text(s) => write!(f, "text '{}'", s),
        }
    }
}

/// Tokenize a markup string.
///
/// Fails on the first input that is not a tag, comment, declaration or text.
pub fn tokenize(source: &str) -> ParseResult<Vec<(Token<'_>, std::ops::Range<usize>)>> {
    let lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    for (result, span) in lexer.spanned() {
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(()) => {
                let rest = &source[span.start..];
                if rest.starts_with('<') && !rest.contains('>') {
                    return Err(ParseError::unexpected_eof(span.start));
                }
                return Err(ParseError::lexer_error(span.start));
            }
        }
    }

    Ok(tokens)
}
