//! The context-chain lookup logic of the Vellum Templating Engine.
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
    std::{
        fmt::{
            Debug,
            Formatter,
            Result as FmtResult,
        },
        sync::Arc,
    },
    serde::Serialize,
    serde_json::{
        to_value as to_json_value,
        Value as JsonValue,
    },
};

const SCOPESEP: char = '.';

/// A named-capability adapter for record-like context values. Lookup
/// tries the capabilities in declaration order: a field by name, then a
/// zero-argument accessor by name, then a field by its declared alias.
/// A capability left at its default is invisible to lookup, which is how
/// non-exported state stays hidden.
pub trait Record: Send + Sync {
    fn field(&self, _name: &str) -> Option<JsonValue> {
        None
    }

    fn accessor(&self, _name: &str) -> Option<JsonValue> {
        None
    }

    fn alias(&self, _name: &str) -> Option<JsonValue> {
        None
    }

    /// The stringer capability; consulted before any other formatting
    /// when the record itself is rendered.
    fn display(&self) -> Option<String> {
        None
    }
}

/// A single value in the context chain consulted during rendering.
#[derive(Clone)]
pub enum Context {
    Value(JsonValue),
    Record(Arc<dyn Record>),
}

impl Debug for Context {
    fn fmt(&self, fmtr: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Value(v) => fmtr.debug_tuple("Value").field(v).finish(),
            Self::Record(_) => fmtr.write_str("Record(..)"),
        }
    }
}

impl From<JsonValue> for Context {
    fn from(value: JsonValue) -> Self {
        Self::Value(value)
    }
}

impl Context {
    /// Builds a context from any serializable value by way of its json
    /// representation.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Self::Value(to_json_value(value).map_err(Error::Json)?))
    }

    pub fn record<R: Record + 'static>(record: R) -> Self {
        Self::Record(Arc::new(record))
    }
}

/// Whether a resolved json value gates a section open. Note that the
/// numeric rule is strictly-positive: zero and negatives are falsy.
pub(crate)
fn truth(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                i > 0
            }
            else if let Some(u) = n.as_u64() {
                u > 0
            }
            else {
                n.as_f64().map(|f| f > 0.0).unwrap_or(false)
            }
        },
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(a) => !a.is_empty(),
        JsonValue::Object(_) => true,
    }
}

pub(crate)
fn context_truth(ctx: &Context) -> bool {
    match ctx {
        Context::Value(v) => truth(v),
        Context::Record(_) => true,
    }
}

// a resolved json null is indistinguishable from an absent value
fn normalize(value: JsonValue) -> (Option<Context>, bool) {
    if value.is_null() {
        (None, false)
    }
    else {
        let t = truth(&value);
        (Some(Context::Value(value)), t)
    }
}

fn lookup_record(name: &str, record: &Arc<dyn Record>) -> Option<JsonValue> {
    if let Some(v) = record.field(name) {
        Some(v)
    }
    else if let Some(v) = record.accessor(name) {
        Some(v)
    }
    else {
        record.alias(name)
    }
}

/// Resolves a name against the context chain, innermost context first.
/// Returns the resolved value, if any, along with its truthiness. A
/// dotted name resolves its head against the whole chain and each
/// further segment against the prior segment's value alone; there is no
/// fallthrough to outer contexts for a suffix.
pub(crate)
fn lookup(name: &str, chain: &[Context]) -> (Option<Context>, bool) {
    if name != "." && name.contains(SCOPESEP) {
        let (head, rest) = match name.split_once(SCOPESEP) {
            Some(pair) => pair,
            None => return (None, false),
        };

        if let (Some(value), true) = lookup(head, chain) {
            return lookup(rest, &[value]);
        }

        return (None, false);
    }

    if name == "." {
        return match chain.first() {
            Some(Context::Value(v)) => normalize(v.clone()),
            Some(ctx) => (Some(ctx.clone()), context_truth(ctx)),
            None => (None, false),
        };
    }

    for ctx in chain {
        match ctx {
            Context::Value(JsonValue::Object(map)) => {
                if let Some(v) = map.get(name) {
                    return normalize(v.clone());
                }
            },
            Context::Value(JsonValue::Array(items)) => {
                // the name has to parse as an in-bounds index, else this
                // context simply doesn't match
                if let Ok(idx) = name.parse::<usize>() {
                    if let Some(v) = items.get(idx) {
                        return normalize(v.clone());
                    }
                }
            },
            Context::Record(record) => {
                if let Some(v) = lookup_record(name, record) {
                    return normalize(v);
                }
            },
            Context::Value(_) => {},
        }
    }

    (None, false)
}
