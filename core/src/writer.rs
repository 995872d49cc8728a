//! The buffered output sink for the Vellum Templating Engine.
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
    crate::error::{
        Error,
        Result,
    },
    std::io::Write as IoWrite,
};

/// A line-buffered sink for rendered output. Nodes report whether they
/// put visible text or only a tag on the current line; a line holding
/// only tags is where standalone-tag whitespace collapsing would hook
/// in, and for now every line passes through unchanged.
#[derive(Debug)]
pub(crate)
struct Writer<W: IoWrite> {
    sink: W,
    line: String,
    saw_text: bool,
    saw_tag: bool,
}

impl<W: IoWrite> Writer<W> {
    pub(crate)
    fn new(sink: W) -> Self {
        Self {
            sink,
            line: String::new(),
            saw_text: false,
            saw_tag: false,
        }
    }

    /// Marks the current line as carrying visible text.
    pub(crate)
    fn text(&mut self) {
        self.saw_text = true;
    }

    /// Marks the current line as carrying a tag.
    pub(crate)
    fn tag(&mut self) {
        self.saw_tag = true;
    }

    pub(crate)
    fn tag_only(&self) -> bool {
        self.saw_tag && !self.saw_text
    }

    pub(crate)
    fn write(&mut self, c: char) -> Result<()> {
        self.line.push(c);
        if c == '\n' {
            self.commit_line()?;
        }

        Ok(())
    }

    pub(crate)
    fn write_str(&mut self, s: &str) -> Result<()> {
        for c in s.chars() {
            self.write(c)?;
        }

        Ok(())
    }

    fn commit_line(&mut self) -> Result<()> {
        let _tag_only = self.tag_only();
        self.sink.write_all(self.line.as_bytes()).map_err(Error::Io)?;
        self.line.clear();
        self.saw_text = false;
        self.saw_tag = false;
        Ok(())
    }

    /// Writes anything still buffered through to the sink.
    pub(crate)
    fn flush(&mut self) -> Result<()> {
        if !self.line.is_empty() {
            self.commit_line()?;
        }

        self.sink.flush().map_err(Error::Io)
    }
}
