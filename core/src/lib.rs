//! The core of the Vellum Templating Engine, a logic-less text
//! templating language in the mustache family.
//!
//! A [`Template`] is configured, handed source to [`Template::parse`],
//! and rendered against a chain of [`Context`] values:
//!
//! ```
//! use vellum_core::{Context, Template};
//!
//! let mut t = Template::new();
//! t.parse_str("Hello, {{name}}!").unwrap();
//!
//! let ctx = Context::from(serde_json::json!({ "name": "world" }));
//! assert_eq!("Hello, world!", t.render_string(&[ctx]).unwrap());
//! ```
//!
//! Beyond standard mustache tags the engine supports function sections
//! (`{{~name opt="value"}}...{{/name}}`), which pipe their rendered body
//! through a registered custom function, and, behind an opt-in flag,
//! test-value sections (`{{#test_value {{ident}} "literal"}}`), which
//! gate their body on an exact string comparison.
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

mod context;
mod error;
mod lexer;
mod node;
mod parser;
mod template;
mod writer;

#[cfg(test)]
mod test;

pub use crate::{
    context::{
        Context,
        Record,
    },
    error::{
        Error,
        Result,
    },
    node::Escape,
    template::{
        parse,
        render,
        CustomFn,
        Template,
    },
};
