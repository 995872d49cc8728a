//! The tokenizer for the Vellum Templating Engine.
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

use std::{
    collections::VecDeque,
    fmt::{
        Display,
        Formatter,
        Result as FmtResult,
    },
};

const TEST_SENTINEL: &str = "test_value";

/// The kind of a scanned token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate)
enum TokenKind {
    Error,
    Eof,
    Identifier,
    LeftDelim,
    RightDelim,
    Text,
    Comment,
    SectionStart,
    SectionInverse,
    SectionFunction,
    SectionEnd,
    RawStart,
    RawEnd,
    RawAlt,
    Partial,
    SetDelim,
    TestValue,
}

impl Display for TokenKind {
    fn fmt(&self, fmtr: &mut Formatter<'_>) -> FmtResult {
        fmtr.write_str(match self {
            Self::Error => "t_error",
            Self::Eof => "t_eof",
            Self::Identifier => "t_ident",
            Self::LeftDelim => "t_left_delim",
            Self::RightDelim => "t_right_delim",
            Self::Text => "t_text",
            Self::Comment => "t_comment",
            Self::SectionStart => "t_section_start",
            Self::SectionInverse => "t_section_inverse",
            Self::SectionFunction => "t_section_function",
            Self::SectionEnd => "t_section_end",
            Self::RawStart => "t_raw_start",
            Self::RawEnd => "t_raw_end",
            Self::RawAlt => "t_raw_alt",
            Self::Partial => "t_partial",
            Self::SetDelim => "t_set_delim",
            Self::TestValue => "t_test_value",
        })
    }
}

/// A token scanned from template source, carrying the 1-based line and
/// the character offset into that line at which the scan of it ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate)
struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) val: String,
    pub(crate) line: usize,
    pub(crate) col: usize,
}

impl Token {
    pub(crate)
    fn eof() -> Self {
        Self {
            kind: TokenKind::Eof,
            val: String::new(),
            line: 0,
            col: 0,
        }
    }
}

impl Display for Token {
    fn fmt(&self, fmtr: &mut Formatter<'_>) -> FmtResult {
        fmtr.write_fmt(format_args!("{}:{:?}", self.kind, self.val))
    }
}

pub(crate)
fn whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

#[derive(Debug, Clone, Copy)]
enum IdentExit {
    Tag,
    TestIdentRightDelim,
}

#[derive(Debug, Clone, Copy)]
enum State {
    Text,
    LeftDelim,
    RightDelim,
    Tag,
    Ident(IdentExit),
    Comment,
    SetDelim,
    Test,
    TestSentinel,
    TestIdentLeftDelim,
    TestIdentRightDelim,
    TestValue,
    Done,
}

/// The scanner over raw template source. Tokens are produced on demand
/// through [`Lexer::token`]; a scan failure produces a single `t_error`
/// token after which the scanner is finished.
#[derive(Debug)]
pub(crate)
struct Lexer {
    input: String,
    left: String,
    right: String,
    state: State,
    pos: usize,
    start: usize,
    width: usize,
    queue: VecDeque<Token>,
    test_value_sections: bool,
}

impl Lexer {
    pub(crate)
    fn new<S, L, R>(input: S, left: L, right: R, test_value_sections: bool) -> Self
    where
        S: AsRef<str>,
        L: AsRef<str>,
        R: AsRef<str>,
    {
        Self {
            input: input.as_ref().to_owned(),
            left: left.as_ref().to_owned(),
            right: right.as_ref().to_owned(),
            state: State::Text,
            pos: 0,
            start: 0,
            width: 0,
            queue: VecDeque::new(),
            test_value_sections,
        }
    }

    /// Returns the next token from the input, driving the state machine
    /// until one becomes available.
    pub(crate)
    fn token(&mut self) -> Token {
        loop {
            if let Some(t) = self.queue.pop_front() {
                return t;
            }

            if let State::Done = self.state {
                // the scan already ended; answer further pulls with eof
                // rather than wedging
                let (line, col) = self.coords();
                return Token {
                    kind: TokenKind::Eof,
                    val: String::new(),
                    line,
                    col,
                };
            }

            self.state = self.step();
        }
    }

    fn step(&mut self) -> State {
        match self.state {
            State::Text => self.state_text(),
            State::LeftDelim => self.state_left_delim(),
            State::RightDelim => self.state_right_delim(),
            State::Tag => self.state_tag(),
            State::Ident(exit) => self.state_ident(exit),
            State::Comment => self.state_comment(),
            State::SetDelim => self.state_set_delim(),
            State::Test => self.state_test(),
            State::TestSentinel => self.state_test_sentinel(),
            State::TestIdentLeftDelim => self.state_test_ident_left_delim(),
            State::TestIdentRightDelim => self.state_test_ident_right_delim(),
            State::TestValue => self.state_test_value(),
            State::Done => State::Done,
        }
    }

    fn rest(&self) -> &str {
        &self.input[self.pos..]
    }

    fn next_char(&mut self) -> Option<char> {
        match self.rest().chars().next() {
            Some(c) => {
                self.width = c.len_utf8();
                self.pos += self.width;
                Some(c)
            },
            None => {
                self.width = 0;
                None
            },
        }
    }

    // steps back over the last char read; legal once per next_char
    fn backup(&mut self) {
        self.pos -= self.width;
    }

    fn peek_char(&mut self) -> Option<char> {
        let c = self.next_char();
        self.backup();
        c
    }

    fn seek(&mut self, n: usize) {
        self.pos += n;
    }

    fn ignore(&mut self) {
        self.start = self.pos;
    }

    fn consume_whitespace(&mut self) {
        while self.peek_char().map(whitespace).unwrap_or(false) {
            self.next_char();
        }

        self.ignore();
    }

    fn coords(&self) -> (usize, usize) {
        let before = &self.input[..self.pos];
        let line = 1 + before.matches('\n').count();
        let col = match before.rfind('\n') {
            Some(lf) => before[lf + 1..].chars().count(),
            None => before.chars().count(),
        };

        (line, col)
    }

    fn emit(&mut self, kind: TokenKind) {
        let val = self.input[self.start..self.pos].to_owned();
        let (line, col) = self.coords();
        self.queue.push_back(Token { kind, val, line, col });
        self.start = self.pos;
    }

    fn error(&mut self, msg: &str) -> State {
        let (line, col) = self.coords();
        self.queue.push_back(Token {
            kind: TokenKind::Error,
            val: msg.to_owned(),
            line,
            col,
        });

        State::Done
    }

    // scans plain text until the left delimiter or the end of input
    fn state_text(&mut self) -> State {
        loop {
            if self.rest().starts_with(self.left.as_str()) {
                if self.pos > self.start {
                    self.emit(TokenKind::Text);
                }
                return State::LeftDelim;
            }

            if self.next_char().is_none() {
                break;
            }
        }

        if self.pos > self.start {
            self.emit(TokenKind::Text);
        }

        self.emit(TokenKind::Eof);
        State::Done
    }

    // the left delimiter is known to be present; "{{=" redirects into the
    // delimiter-change scan without emitting anything
    fn state_left_delim(&mut self) -> State {
        self.seek(self.left.len());
        if self.peek_char() == Some('=') {
            self.next_char();
            return State::SetDelim;
        }

        self.emit(TokenKind::LeftDelim);
        State::Tag
    }

    fn state_right_delim(&mut self) -> State {
        self.seek(self.right.len());
        self.emit(TokenKind::RightDelim);
        State::Text
    }

    // scans the elements between delimiters
    fn state_tag(&mut self) -> State {
        let raw_end = format!("}}{}", self.right);
        if self.rest().starts_with(&raw_end) {
            self.seek(1);
            self.emit(TokenKind::RawEnd);
            return State::RightDelim;
        }

        if self.rest().starts_with(self.right.as_str()) {
            return State::RightDelim;
        }

        if self.test_value_sections && self.rest().starts_with("#test_value") {
            return State::Test;
        }

        match self.next_char() {
            None | Some('\n') => self.error("unclosed action"),
            Some(c) if whitespace(c) => {
                self.ignore();
                State::Tag
            },
            Some('!') => {
                self.emit(TokenKind::Comment);
                State::Comment
            },
            Some('#') => {
                self.emit(TokenKind::SectionStart);
                State::Tag
            },
            Some('^') => {
                self.emit(TokenKind::SectionInverse);
                State::Tag
            },
            Some('~') => {
                self.emit(TokenKind::SectionFunction);
                State::Tag
            },
            Some('/') => {
                self.emit(TokenKind::SectionEnd);
                State::Tag
            },
            Some('&') => {
                self.emit(TokenKind::RawAlt);
                State::Tag
            },
            Some('>') => {
                self.emit(TokenKind::Partial);
                State::Tag
            },
            Some('{') => {
                self.emit(TokenKind::RawStart);
                State::Tag
            },
            Some(_) => {
                self.backup();
                State::Ident(IdentExit::Tag)
            },
        }
    }

    // scans an identifier. Whitespace inside the identifier is legal;
    // whitespace between its end and the right delimiter is dropped.
    fn state_ident(&mut self, exit: IdentExit) -> State {
        self.consume_whitespace();

        let mut trailing = 0;
        loop {
            match self.peek_char() {
                None => return self.error("unclosed tag"),
                Some(c) => {
                    if !whitespace(c) && !self.rest().starts_with(self.right.as_str()) {
                        trailing = 0;
                        self.next_char();
                    }
                    else if whitespace(c) {
                        trailing += 1;
                        self.next_char();
                    }
                    else {
                        // the closing delimiter; counted whitespace is
                        // all single-byte, back over it
                        self.pos -= trailing;
                        self.emit(TokenKind::Identifier);
                        break;
                    }
                },
            }
        }

        match exit {
            IdentExit::Tag => State::Tag,
            IdentExit::TestIdentRightDelim => State::TestIdentRightDelim,
        }
    }

    // the comment marker is known to be present; the interior is emitted
    // as a single text token
    fn state_comment(&mut self) -> State {
        match self.rest().find(self.right.as_str()) {
            None => self.error("unclosed tag"),
            Some(i) => {
                self.seek(i);
                self.emit(TokenKind::Text);
                State::RightDelim
            },
        }
    }

    // scans "l r=}}" and installs the new delimiter pair for the rest of
    // the input; hidden from the parser apart from one marker token
    fn state_set_delim(&mut self) -> State {
        let end = format!("={}", self.right);
        let i = match self.rest().find(&end) {
            Some(i) => i,
            None => return self.error("unclosed tag"),
        };

        let interior = self.input[self.pos..self.pos + i].to_owned();
        let parts = interior.split(' ')
            .filter(|p| !p.is_empty())
            .collect::<Vec<&str>>();
        if parts.len() != 2 {
            return self.error("set delimiters should be separated by a space");
        }

        self.left = parts[0].to_owned();
        self.right = parts[1].to_owned();
        self.seek(i + end.len());
        self.ignore();
        self.emit(TokenKind::SetDelim);
        State::Text
    }

    fn state_test(&mut self) -> State {
        self.next_char();
        self.emit(TokenKind::TestValue);
        State::TestSentinel
    }

    fn state_test_sentinel(&mut self) -> State {
        self.seek(TEST_SENTINEL.len());
        self.emit(TokenKind::Identifier);
        self.consume_whitespace();

        if self.rest().starts_with(self.left.as_str()) {
            State::TestIdentLeftDelim
        }
        else {
            self.error("Missing test_value identifier")
        }
    }

    fn state_test_ident_left_delim(&mut self) -> State {
        self.seek(self.left.len());
        self.emit(TokenKind::LeftDelim);
        State::Ident(IdentExit::TestIdentRightDelim)
    }

    fn state_test_ident_right_delim(&mut self) -> State {
        self.seek(self.right.len());
        self.emit(TokenKind::RightDelim);
        State::TestValue
    }

    // scans the quoted comparison literal of a test_value section
    fn state_test_value(&mut self) -> State {
        self.consume_whitespace();
        if self.next_char() != Some('"') {
            return self.error("invalid test_value value token");
        }

        self.ignore();
        while let Some(c) = self.peek_char() {
            if c == '"' {
                break;
            }
            self.next_char();
        }

        if self.peek_char() != Some('"') {
            return self.error("failed to find close \" for test_value value token");
        }

        self.emit(TokenKind::Text);
        self.next_char();
        self.ignore();
        State::Tag
    }
}
