//! Statement-shape guard for agent-supplied SQL.
//!
//! [`ensure_single_select`] accepts exactly one `SELECT` statement, optionally
//! followed by a single trailing `;`. It is an allow-list: the first real token
//! must be the `SELECT` keyword, and nothing but whitespace or comments may
//! follow a statement terminator. String literals, quoted identifiers and
//! comments are lexed so that a `;` or keyword inside them cannot confuse the
//! check, and so that a keyword cannot hide behind a leading comment.

use crate::error::{Error, Result};

/// Reject anything that is not a single read-only `SELECT`.
pub fn ensure_single_select(sql: &str) -> Result<()> {
    let mut lexer = Lexer::new(sql);

    let first = match lexer.next_token().map_err(|reason| Error::invalid_query(sql, reason))? {
        Some(Token::Word(word)) => word,
        Some(Token::Semicolon) | None => {
            return Err(Error::invalid_query(sql, "statement is empty"));
        }
        Some(Token::Other) => {
            return Err(Error::invalid_query(sql, "only SELECT statements are allowed"));
        }
    };

    if !first.eq_ignore_ascii_case("select") {
        return Err(Error::invalid_query(
            sql,
            format!(
                "only SELECT statements are allowed, found {}",
                first.to_ascii_uppercase()
            ),
        ));
    }

    let mut terminated = false;
    while let Some(token) = lexer.next_token().map_err(|reason| Error::invalid_query(sql, reason))? {
        match token {
            Token::Semicolon if !terminated => terminated = true,
            _ if terminated => {
                return Err(Error::invalid_query(
                    sql,
                    "multiple statements are not allowed",
                ));
            }
            _ => {}
        }
    }

    Ok(())
}

/// First keyword of `sql`, skipping leading whitespace and comments.
pub(crate) fn leading_keyword(sql: &str) -> Option<&str> {
    match Lexer::new(sql).next_token() {
        Ok(Some(Token::Word(word))) => Some(word),
        _ => None,
    }
}

#[derive(Debug, PartialEq)]
enum Token<'a> {
    /// Bare identifier or keyword.
    Word(&'a str),
    Semicolon,
    /// Literal, quoted identifier, number, operator or punctuation.
    Other,
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.src[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) -> std::result::Result<(), &'static str> {
        loop {
            match (self.peek(), self.peek_second()) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('-'), Some('-')) => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                (Some('/'), Some('*')) => {
                    self.pos += 2;
                    match self.src[self.pos..].find("*/") {
                        Some(end) => self.pos += end + 2,
                        None => return Err("unterminated block comment"),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// Consume a quoted run closed by `close`; a doubled `close` is an escape.
    fn skip_quoted(&mut self, close: char, doubled_escape: bool) -> std::result::Result<(), &'static str> {
        loop {
            match self.bump() {
                Some(c) if c == close => {
                    if doubled_escape && self.peek() == Some(close) {
                        self.bump();
                        continue;
                    }
                    return Ok(());
                }
                Some(_) => {}
                None => return Err("unterminated quoted literal"),
            }
        }
    }

    fn next_token(&mut self) -> std::result::Result<Option<Token<'a>>, &'static str> {
        self.skip_trivia()?;
        let start = self.pos;
        let Some(c) = self.bump() else {
            return Ok(None);
        };

        let token = match c {
            ';' => Token::Semicolon,
            '\'' => {
                self.skip_quoted('\'', true)?;
                Token::Other
            }
            '"' => {
                self.skip_quoted('"', true)?;
                Token::Other
            }
            '`' => {
                self.skip_quoted('`', true)?;
                Token::Other
            }
            '[' => {
                self.skip_quoted(']', false)?;
                Token::Other
            }
            c if c.is_alphabetic() || c == '_' => {
                while matches!(self.peek(), Some(n) if n.is_alphanumeric() || n == '_' || n == '$') {
                    self.bump();
                }
                let src = self.src;
                Token::Word(&src[start..self.pos])
            }
            _ => Token::Other,
        };
        Ok(Some(token))
    }
}
