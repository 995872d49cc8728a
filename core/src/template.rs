//! The template object and its configuration for the Vellum Templating Engine.
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
        context::Context,
        error::{
            Error,
            Result,
        },
        lexer::Lexer,
        node::{
            render_scope,
            Escape,
            Node,
            Scope,
        },
        parser::Parser,
        writer::Writer,
    },
    std::{
        collections::HashMap,
        io::{
            Read as IoRead,
            Write as IoWrite,
        },
        str::from_utf8,
        sync::Arc,
    },
};

const DEFAULT_LEFT_DELIM: &str = "{{";
const DEFAULT_RIGHT_DELIM: &str = "}}";

/// A buffer transform bound to a function section. It receives the
/// section's rendered body along with the options given inline in the
/// open tag, and its return value is what reaches the output.
pub type CustomFn =
    dyn Fn(&str, &HashMap<String, String>) -> Result<String> + Send + Sync;

/// A compiled template plus its configuration: delimiters, escape mode,
/// registered partials and custom functions, and the silent-miss policy.
/// The node tree is replaced wholesale by [`Template::parse`] and is
/// read-only during rendering, so one parsed template can be rendered
/// from several threads at once.
pub struct Template {
    name: String,
    elems: Vec<Node>,
    partials: HashMap<String, Arc<Template>>,
    functions: HashMap<String, Arc<CustomFn>>,
    left_delim: String,
    right_delim: String,
    silent_miss: bool,
    test_value_sections: bool,
    escape: Escape,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            name: String::new(),
            elems: Vec::new(),
            partials: HashMap::new(),
            functions: HashMap::new(),
            left_delim: DEFAULT_LEFT_DELIM.to_owned(),
            right_delim: DEFAULT_RIGHT_DELIM.to_owned(),
            silent_miss: true,
            test_value_sections: false,
            escape: Escape::Html,
        }
    }
}

impl Template {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names the template so it can be looked up as a partial.
    pub fn with_name<S: AsRef<str>>(mut self, name: S) -> Self {
        self.name = name.as_ref().to_owned();
        self
    }

    /// Sets the delimiter pair used when parsing.
    pub fn with_delimiters<L, R>(mut self, left: L, right: R) -> Self
    where
        L: AsRef<str>,
        R: AsRef<str>,
    {
        self.left_delim = left.as_ref().to_owned();
        self.right_delim = right.as_ref().to_owned();
        self
    }

    /// Registers another template as a partial, keyed by its name.
    pub fn with_partial(mut self, partial: Template) -> Self {
        self.partials.insert(partial.name.clone(), Arc::new(partial));
        self
    }

    /// Registers a custom function that takes no inline options.
    pub fn with_custom_function<S, F>(mut self, name: S, f: F) -> Self
    where
        S: AsRef<str>,
        F: Fn(&str) -> Result<String> + Send + Sync + 'static,
    {
        self.functions.insert(
            name.as_ref().to_owned(),
            Arc::new(move |s, _| f(s)),
        );
        self
    }

    /// Registers a custom function that receives the open tag's inline
    /// `key="value"` options.
    pub fn with_custom_function_options<S, F>(mut self, name: S, f: F) -> Self
    where
        S: AsRef<str>,
        F: Fn(&str, &HashMap<String, String>) -> Result<String>
            + Send
            + Sync
            + 'static,
    {
        self.functions.insert(name.as_ref().to_owned(), Arc::new(f));
        self
    }

    /// Sets whether missed lookups are swallowed (the default) or
    /// surfaced as an aggregate render error.
    pub fn with_silent_miss(mut self, silent: bool) -> Self {
        self.silent_miss = silent;
        self
    }

    pub fn with_escape(mut self, escape: Escape) -> Self {
        self.escape = escape;
        self
    }

    /// Enables the non-standard `{{#test_value {{ident}} "literal"}}`
    /// section grammar.
    pub fn with_test_value_sections(mut self, enabled: bool) -> Self {
        self.test_value_sections = enabled;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate)
    fn nodes(&self) -> &[Node] {
        &self.elems
    }

    pub(crate)
    fn silent_miss(&self) -> bool {
        self.silent_miss
    }

    pub(crate)
    fn function(&self, name: &str) -> Option<&CustomFn> {
        self.functions.get(name).map(|f| f.as_ref())
    }

    /// Parses template source read from `r`, replacing any previously
    /// compiled node tree.
    pub fn parse<R: IoRead>(&mut self, mut r: R) -> Result<()> {
        let mut source = String::new();
        r.read_to_string(&mut source).map_err(Error::Io)?;
        self.parse_str(source)
    }

    pub fn parse_str<S: AsRef<str>>(&mut self, source: S) -> Result<()> {
        let lexer = Lexer::new(
            source,
            &self.left_delim,
            &self.right_delim,
            self.test_value_sections,
        );
        self.elems = Parser::new(lexer, self.escape).parse()?;
        Ok(())
    }

    pub fn parse_bytes(&mut self, source: &[u8]) -> Result<()> {
        self.parse_str(from_utf8(source).map_err(Error::Utf8)?)
    }

    /// Renders the compiled tree against the context chain, innermost
    /// context first. Whatever was written stays written even when an
    /// aggregate miss error is returned.
    pub fn render<W: IoWrite>(&self, sink: W, chain: &[Context]) -> Result<()> {
        let mut w = Writer::new(sink);
        let scope = Scope {
            template: self,
            partials: &self.partials,
            excluded: Vec::new(),
        };

        let res = render_scope(&scope, &mut w, chain);
        w.flush()?;
        res
    }

    pub fn render_string(&self, chain: &[Context]) -> Result<String> {
        let mut buf = Vec::new();
        self.render(&mut buf, chain)?;
        String::from_utf8(buf).map_err(|e| Error::Utf8(e.utf8_error()))
    }
}

/// Wraps the creation of a template and parsing from `r` in one go.
pub fn parse<R: IoRead>(r: R) -> Result<Template> {
    let mut t = Template::new();
    t.parse(r)?;
    Ok(t)
}

/// Wraps parsing and rendering into a single call.
pub fn render<R, W>(r: R, w: W, chain: &[Context]) -> Result<()>
where
    R: IoRead,
    W: IoWrite,
{
    parse(r)?.render(w, chain)
}
