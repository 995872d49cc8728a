//! The core parsing logic for the Vellum Templating Engine.
// Copyright (C) 2025  Vellum Authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use {
    crate::{
        error::{
            Error,
            Result,
        },
        lexer::{
            whitespace,
            Lexer,
            Token,
            TokenKind,
        },
        node::{
            Escape,
            Node,
        },
    },
    std::collections::{
        HashMap,
        VecDeque,
    },
};

/// Consumes the token stream of a [`Lexer`] into a node tree. A parser
/// is either backed by a live lexer or, for the body of a section, by a
/// pre-read token buffer.
pub(crate)
struct Parser {
    lexer: Option<Lexer>,
    escape: Escape,
    buf: VecDeque<Token>,
}

fn unexpected(t: &Token) -> Error {
    Error::Syntax(format!("unexpected token {}", t), t.line, t.col)
}

/// Splits the raw identifier of a function section into the function
/// name and its inline options. Options are whitespace-separated
/// `key="value"` pairs; a value may contain spaces but not quotes and
/// there are no escape sequences. The first malformed fragment ends
/// option parsing and whatever follows it is ignored.
fn parse_function_options(raw: &str) -> (String, HashMap<String, String>) {
    let mut options = HashMap::new();
    let (name, tail) = match raw.split_once(|c: char| whitespace(c)) {
        Some(pair) => pair,
        None => return (raw.to_owned(), options),
    };

    let mut rest = tail;
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }

        let (key, after) = match rest.split_once('=') {
            Some(pair) => pair,
            None => break,
        };

        let after = match after.strip_prefix('"') {
            Some(after) => after,
            None => break,
        };

        let (value, next) = match after.split_once('"') {
            Some(pair) => pair,
            None => break,
        };

        let key = key.trim();
        if !key.is_empty() {
            options.insert(key.to_owned(), value.to_owned());
        }

        rest = next;
    }

    (name.to_owned(), options)
}

impl Parser {
    pub(crate)
    fn new(lexer: Lexer, escape: Escape) -> Self {
        Self {
            lexer: Some(lexer),
            escape,
            buf: VecDeque::new(),
        }
    }

    // a parser over an already-read token buffer, used for section bodies
    fn sub(tokens: Vec<Token>, escape: Escape) -> Self {
        let mut buf = VecDeque::from(tokens);
        buf.push_back(Token::eof());

        Self {
            lexer: None,
            escape,
            buf,
        }
    }

    fn read(&mut self) -> Token {
        if let Some(t) = self.buf.pop_front() {
            return t;
        }

        match self.lexer.as_mut() {
            Some(lexer) => lexer.token(),
            None => Token::eof(),
        }
    }

    pub(crate)
    fn parse(&mut self) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();

        loop {
            let token = self.read();
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::Error => {
                    return Err(Error::Syntax(token.val, token.line, token.col));
                },
                TokenKind::Text => nodes.push(Node::Text(token.val)),
                TokenKind::LeftDelim => nodes.push(self.parse_tag()?),
                TokenKind::RawStart => nodes.push(self.parse_raw_tag()?),
                TokenKind::SetDelim => nodes.push(Node::Delim),
                // e.g. the right delimiter left behind by a section close
                _ => {},
            }
        }

        Ok(nodes)
    }

    // dispatches on the token following a left delimiter
    fn parse_tag(&mut self) -> Result<Node> {
        let token = self.read();
        match token.kind {
            TokenKind::Identifier => self.parse_var(token, self.escape),
            TokenKind::RawStart => self.parse_raw_tag(),
            TokenKind::RawAlt => {
                let ident = self.read();
                self.parse_var(ident, Escape::None)
            },
            TokenKind::Comment => self.parse_comment(),
            TokenKind::SectionInverse => self.parse_section(true),
            TokenKind::SectionStart => self.parse_section(false),
            TokenKind::SectionFunction => self.parse_function_section(),
            TokenKind::TestValue => self.parse_test(),
            TokenKind::Partial => self.parse_partial(),
            _ => Err(Error::Syntax(
                format!("unreachable code {}", token),
                token.line,
                token.col,
            )),
        }
    }

    fn parse_var(&mut self, ident: Token, escape: Escape) -> Result<Node> {
        let t = self.read();
        if t.kind != TokenKind::RightDelim {
            return Err(unexpected(&t));
        }

        Ok(Node::Var { name: ident.val, escape })
    }

    fn parse_raw_tag(&mut self) -> Result<Node> {
        let ident = self.read();
        if ident.kind != TokenKind::Identifier {
            return Err(unexpected(&ident));
        }

        let t = self.read();
        if t.kind != TokenKind::RawEnd {
            return Err(unexpected(&t));
        }

        let t = self.read();
        if t.kind != TokenKind::RightDelim {
            return Err(unexpected(&t));
        }

        Ok(Node::Var { name: ident.val, escape: Escape::None })
    }

    // accumulates the comment's interior up to the closing delimiter
    fn parse_comment(&mut self) -> Result<Node> {
        let mut comment = String::new();
        loop {
            let t = self.read();
            match t.kind {
                TokenKind::Eof => return Err(unexpected(&t)),
                TokenKind::Error => {
                    return Err(Error::Syntax(t.val, t.line, t.col));
                },
                TokenKind::RightDelim => return Ok(Node::Comment(comment)),
                _ => comment.push_str(&t.val),
            }
        }
    }

    fn parse_section(&mut self, inverted: bool) -> Result<Node> {
        let t = self.read();
        if t.kind != TokenKind::Identifier {
            return Err(unexpected(&t));
        }

        let children = self.parse_section_body(&t)?;

        Ok(Node::Section {
            name: t.val,
            inverted,
            children,
        })
    }

    fn parse_function_section(&mut self) -> Result<Node> {
        let t = self.read();
        if t.kind != TokenKind::Identifier {
            return Err(unexpected(&t));
        }

        // the identifier holds the whole tag tail; its first word is the
        // function name and the close tag matches on that name alone
        let (name, options) = parse_function_options(&t.val);
        let open = Token {
            kind: TokenKind::Identifier,
            val: name.clone(),
            line: t.line,
            col: t.col,
        };
        let children = self.parse_section_body(&open)?;

        Ok(Node::FunctionSection {
            name,
            options,
            children,
        })
    }

    fn parse_partial(&mut self) -> Result<Node> {
        let t = self.read();
        if t.kind != TokenKind::Identifier {
            return Err(unexpected(&t));
        }

        let next = self.read();
        if next.kind != TokenKind::RightDelim {
            return Err(unexpected(&next));
        }

        Ok(Node::Partial(t.val))
    }

    fn parse_test(&mut self) -> Result<Node> {
        let t = self.read();
        if t.kind != TokenKind::Identifier {
            return Err(unexpected(&t));
        }

        let next = self.read();
        if next.kind != TokenKind::LeftDelim {
            return Err(unexpected(&next));
        }

        let ident = self.read();
        if ident.kind != TokenKind::Identifier {
            return Err(unexpected(&ident));
        }

        let next = self.read();
        if next.kind != TokenKind::RightDelim {
            return Err(unexpected(&next));
        }

        let value = self.read();
        if value.kind != TokenKind::Text {
            return Err(unexpected(&value));
        }

        let children = self.parse_section_body(&t)?;

        Ok(Node::TestSection {
            ident: ident.val,
            value: value.val,
            children,
        })
    }

    /// Buffers tokens up to the section-end tag matching the open token,
    /// counting same-named opens and closes so that nesting balances,
    /// then re-parses the interior as the section's children.
    fn parse_section_body(&mut self, open: &Token) -> Result<Vec<Node>> {
        let next = self.read();
        if next.kind != TokenKind::RightDelim {
            return Err(unexpected(&next));
        }

        let mut tokens: Vec<Token> = Vec::new();
        let mut stack = 1;
        loop {
            let t = self.read();
            match t.kind {
                TokenKind::Eof => {
                    return Err(Error::UnclosedSection(
                        open.val.clone(),
                        open.line,
                        open.col,
                    ));
                },
                TokenKind::Error => {
                    return Err(Error::Syntax(t.val, t.line, t.col));
                },
                _ => {},
            }

            let matched = t.kind == TokenKind::Identifier && t.val == open.val;
            tokens.push(t);

            if matched && tokens.len() > 1 {
                // the token ahead of the matched identifier tells whether
                // this was another open or the close
                match tokens[tokens.len() - 2].kind {
                    TokenKind::SectionStart
                    | TokenKind::SectionInverse
                    | TokenKind::TestValue => stack += 1,
                    TokenKind::SectionEnd => stack -= 1,
                    _ => {},
                }

                if stack == 0 {
                    break;
                }
            }
        }

        // drop the left-delim, section-end, identifier triple of the close
        tokens.truncate(tokens.len().saturating_sub(3));

        Self::sub(tokens, self.escape).parse()
    }
}
