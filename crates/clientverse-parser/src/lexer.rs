//! Keyword lexer
//!
//! Produces the top-level clause keywords of a query together with their
//! byte offsets. Keywords nested inside parentheses (child subqueries) or
//! inside single-quoted literals are skipped, so `(SELECT Id FROM Contacts)`
//! in the field list never shadows the outer ` FROM `.

use crate::error::{ParseError, Result};
use serde::Serialize;

/// Clause keywords, in canonical clause order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Keyword {
    Select,
    From,
    Where,
    OrderBy,
    Limit,
}

impl Keyword {
    pub const ALL: [Keyword; 5] = [
        Keyword::Select,
        Keyword::From,
        Keyword::Where,
        Keyword::OrderBy,
        Keyword::Limit,
    ];

    /// Text matched for the keyword, including its surrounding spaces
    pub fn pattern(&self) -> &'static str {
        match self {
            Keyword::Select => "SELECT ",
            Keyword::From => " FROM ",
            Keyword::Where => " WHERE ",
            Keyword::OrderBy => " ORDER BY ",
            Keyword::Limit => " LIMIT ",
        }
    }

    pub fn name(&self) -> &'static str {
        self.pattern().trim()
    }
}

/// A keyword occurrence; `start..end` covers the matched pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeywordToken {
    pub keyword: Keyword,
    pub start: usize,
    pub end: usize,
}

/// Lexed keywords of one query level
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    tokens: Vec<KeywordToken>,
}

impl Tokens {
    /// Token for a keyword, if present
    pub fn get(&self, keyword: Keyword) -> Option<&KeywordToken> {
        self.tokens.iter().find(|t| t.keyword == keyword)
    }

    pub fn contains(&self, keyword: Keyword) -> bool {
        self.get(keyword).is_some()
    }

    /// Clause body of `keyword`: from the end of its pattern up to the
    /// nearest keyword that starts after it, or the end of input
    pub fn clause<'a>(&self, input: &'a str, keyword: Keyword) -> Option<&'a str> {
        let token = self.get(keyword)?;
        let boundary = self
            .tokens
            .iter()
            .filter(|t| t.start > token.start)
            .map(|t| t.start)
            .min()
            .unwrap_or(input.len());

        // Patterns overlap by their shared space, e.g. "ORDER BY LIMIT 5"
        if boundary < token.end {
            return Some("");
        }
        Some(&input[token.end..boundary])
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeywordToken> {
        self.tokens.iter()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Lex the first top-level occurrence of every clause keyword
pub fn lex(input: &str) -> Result<Tokens> {
    let bytes = input.as_bytes();
    let mut depth: usize = 0;
    let mut quote_start: Option<usize> = None;
    let mut tokens: Vec<KeywordToken> = Vec::new();

    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];

        if let Some(start) = quote_start {
            match c {
                b'\\' => i += 1,
                b'\'' => quote_start = None,
                _ => {}
            }
            i += 1;
            if i > bytes.len() {
                return Err(ParseError::UnterminatedString { offset: start });
            }
            continue;
        }

        match c {
            b'\'' => quote_start = Some(i),
            b'(' => depth += 1,
            b')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or(ParseError::UnbalancedParentheses { offset: i })?;
            }
            _ if depth == 0 => {
                for keyword in Keyword::ALL {
                    if tokens.iter().any(|t| t.keyword == keyword) {
                        continue;
                    }
                    let pattern = keyword.pattern();
                    if bytes[i..].starts_with(pattern.as_bytes()) {
                        tokens.push(KeywordToken {
                            keyword,
                            start: i,
                            end: i + pattern.len(),
                        });
                    }
                }
            }
            _ => {}
        }
        i += 1;
    }

    if let Some(start) = quote_start {
        return Err(ParseError::UnterminatedString { offset: start });
    }
    if depth != 0 {
        return Err(ParseError::UnbalancedParentheses { offset: input.len() });
    }

    tokens.sort_by_key(|t| t.start);
    Ok(Tokens { tokens })
}

/// Split on a separator at parenthesis depth 0 and outside quotes
///
/// Every piece is kept, including empty ones.
pub fn split_top_level(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut in_quote = false;
    let mut escaped = false;
    let mut last = 0;

    for (i, c) in input.char_indices() {
        if in_quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '\'' {
                in_quote = false;
            }
            continue;
        }

        match c {
            '\'' => in_quote = true,
            '(' => depth += 1,
            ')' => depth -= 1,
            c if c == separator && depth == 0 => {
                parts.push(&input[last..i]);
                last = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[last..]);
    parts
}
