//! The parse-tree nodes and render logic of the Vellum Templating Engine.
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
        context::{
            lookup,
            Context,
        },
        error::{
            Error,
            Result,
        },
        lexer::whitespace,
        template::Template,
        writer::Writer,
    },
    std::{
        collections::HashMap,
        io::Write as IoWrite,
        sync::Arc,
    },
    serde_json::{
        to_string as to_json_string,
        Value as JsonValue,
    },
};

/// How a rendered value is escaped before it reaches the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escape {
    None,
    Html,
    Json,
}

impl Escape {
    pub(crate)
    fn apply(&self, s: &str) -> String {
        match self {
            Self::None => s.to_owned(),
            Self::Html => escape_html(s),
            Self::Json => escape_json(s),
        }
    }
}

/// Replaces html-sensitive characters with named entities. Both quote
/// characters are escaped, per the historical mustache behavior.
fn escape_html(s: &str) -> String {
    if !s.chars().any(|c| matches!(c, '"' | '\'' | '&' | '<' | '>')) {
        return s.to_owned();
    }

    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }

    out
}

/// Escapes per json string-literal rules, html left alone.
fn escape_json(s: &str) -> String {
    match to_json_string(s) {
        // drop the quotes surrounding the encoded literal
        Ok(quoted) => quoted[1..quoted.len() - 1].to_owned(),
        Err(_) => s.to_owned(),
    }
}

/// Formats a resolved context value without escaping: strings verbatim,
/// numbers in their natural decimal form, records through their stringer
/// capability, and anything else as compact json.
pub(crate)
fn format_context(ctx: &Context) -> String {
    match ctx {
        Context::Record(r) => r.display().unwrap_or_default(),
        Context::Value(JsonValue::String(s)) => s.clone(),
        Context::Value(JsonValue::Number(n)) => n.to_string(),
        Context::Value(v) => to_json_string(v).unwrap_or_default(),
    }
}

/// The state threaded through a render walk: the template whose nodes
/// are being walked, the partial map visible to this call path, and the
/// partial names already entered along it. Partial resolution builds a
/// new exclusion list per descent rather than touching any shared map.
pub(crate)
struct Scope<'a> {
    pub(crate) template: &'a Template,
    pub(crate) partials: &'a HashMap<String, Arc<Template>>,
    pub(crate) excluded: Vec<String>,
}

/// Renders every node of the scope's template, collecting per-node
/// errors and surfacing them as one aggregate when the template is not
/// configured to miss silently.
pub(crate)
fn render_scope<W: IoWrite>(
    scope: &Scope<'_>,
    w: &mut Writer<W>,
    chain: &[Context],
) -> Result<()> {
    let mut errs = Vec::new();
    for node in scope.template.nodes() {
        if let Err(e) = node.render(scope, w, chain) {
            errs.push(e);
        }
    }

    if !errs.is_empty() && !scope.template.silent_miss() {
        return Err(Error::Render(errs));
    }

    Ok(())
}

fn prepend(head: Context, chain: &[Context]) -> Vec<Context> {
    let mut sub = Vec::with_capacity(chain.len() + 1);
    sub.push(head);
    sub.extend_from_slice(chain);
    sub
}

/// A node of a compiled template. Rendering never mutates the node, so
/// an already-parsed tree can be walked concurrently.
#[derive(Debug, PartialEq)]
pub(crate)
enum Node {
    Text(String),
    Var {
        name: String,
        escape: Escape,
    },
    Section {
        name: String,
        inverted: bool,
        children: Vec<Node>,
    },
    FunctionSection {
        name: String,
        options: HashMap<String, String>,
        children: Vec<Node>,
    },
    TestSection {
        ident: String,
        value: String,
        children: Vec<Node>,
    },
    Comment(String),
    Partial(String),
    Delim,
}

impl Node {
    pub(crate)
    fn render<W: IoWrite>(
        &self,
        scope: &Scope<'_>,
        w: &mut Writer<W>,
        chain: &[Context],
    ) -> Result<()> {
        match self {
            Self::Text(text) => {
                for c in text.chars() {
                    if !whitespace(c) {
                        w.text();
                    }
                    w.write(c)?;
                }

                Ok(())
            },
            Self::Var { name, escape } => {
                w.text();
                let (value, _) = lookup(name, chain);
                // a present-but-falsy value still renders
                match value {
                    Some(v) => w.write_str(&escape.apply(&format_context(&v))),
                    None => Err(Error::NoValue(name.to_owned())),
                }
            },
            Self::Section { name, inverted, children } => {
                w.tag();
                let res = render_section(name, *inverted, children, scope, w, chain);
                w.tag();
                res
            },
            Self::FunctionSection { name, options, children } => {
                w.tag();
                let res = render_function_section(name, options, children, scope, w, chain);
                w.tag();
                res
            },
            Self::TestSection { ident, value, children } => {
                w.tag();
                let res = render_test_section(ident, value, children, scope, w, chain);
                w.tag();
                res
            },
            Self::Partial(name) => {
                w.tag();
                render_partial(name, scope, w, chain)
            },
            Self::Comment(_) | Self::Delim => {
                w.tag();
                Ok(())
            },
        }
    }
}

fn render_children<W: IoWrite>(
    children: &[Node],
    scope: &Scope<'_>,
    w: &mut Writer<W>,
    chain: &[Context],
    errs: &mut Vec<Error>,
) {
    for child in children {
        if let Err(e) = child.render(scope, w, chain) {
            errs.push(e);
        }
    }
}

fn render_section<W: IoWrite>(
    name: &str,
    inverted: bool,
    children: &[Node],
    scope: &Scope<'_>,
    w: &mut Writer<W>,
    chain: &[Context],
) -> Result<()> {
    let (value, truthy) = lookup(name, chain);

    let mut errs = Vec::new();
    if truthy != inverted {
        if inverted {
            // falsy or absent: the children see the chain as-is
            render_children(children, scope, w, chain, &mut errs);
        }
        else {
            match value {
                Some(Context::Value(JsonValue::Array(items))) => {
                    for item in items {
                        let sub = prepend(Context::Value(item), chain);
                        render_children(children, scope, w, &sub, &mut errs);
                    }
                },
                Some(v) => {
                    let sub = prepend(v, chain);
                    render_children(children, scope, w, &sub, &mut errs);
                },
                None => {},
            }
        }
    }

    if !errs.is_empty() && !scope.template.silent_miss() {
        return Err(Error::Render(errs));
    }

    Ok(())
}

fn render_function_section<W: IoWrite>(
    name: &str,
    options: &HashMap<String, String>,
    children: &[Node],
    scope: &Scope<'_>,
    w: &mut Writer<W>,
    chain: &[Context],
) -> Result<()> {
    // the children always render, into an isolated buffer that only a
    // registered function can forward to the real output
    let mut buf = Vec::new();
    let mut errs = Vec::new();
    {
        let mut sub = Writer::new(&mut buf);
        render_children(children, scope, &mut sub, chain, &mut errs);
        sub.flush()?;
    }

    if !errs.is_empty() && !scope.template.silent_miss() {
        return Err(Error::Render(errs));
    }

    if let Some(f) = scope.template.function(name) {
        let rendered = String::from_utf8_lossy(&buf);
        let out = f(&rendered, options)?;
        w.text();
        w.write_str(&out)?;
    }

    Ok(())
}

fn render_test_section<W: IoWrite>(
    ident: &str,
    value: &str,
    children: &[Node],
    scope: &Scope<'_>,
    w: &mut Writer<W>,
    chain: &[Context],
) -> Result<()> {
    let mut errs = Vec::new();
    if let Some(v) = lookup(ident, chain).0 {
        if format_context(&v) == value {
            // children keep the full chain; the compared value is not
            // pushed onto it
            render_children(children, scope, w, chain, &mut errs);
        }
    }

    if !errs.is_empty() && !scope.template.silent_miss() {
        return Err(Error::Render(errs));
    }

    Ok(())
}

fn render_partial<W: IoWrite>(
    name: &str,
    scope: &Scope<'_>,
    w: &mut Writer<W>,
    chain: &[Context],
) -> Result<()> {
    // a name already entered on this call path renders nothing, which is
    // what defuses reference cycles
    if scope.excluded.iter().any(|n| n == name) {
        return Ok(());
    }

    if let Some(partial) = scope.partials.get(name) {
        let mut excluded = scope.excluded.clone();
        excluded.push(name.to_owned());
        let child = Scope {
            template: partial.as_ref(),
            partials: scope.partials,
            excluded,
        };

        if let Err(e) = render_scope(&child, w, chain) {
            if !scope.template.silent_miss() {
                return Err(e);
            }
        }
    }

    Ok(())
}
