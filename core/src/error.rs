//! Error types for the Vellum Templating Engine.
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
    std::{
        error::Error as StdError,
        fmt::{
            Display,
            Formatter,
            Result as FmtResult,
        },
        io::Error as IOError,
        result::Result as StdResult,
        str::Utf8Error,
    },
    serde_json::Error as JsonError,
};

/// The error type for the Vellum Templating Engine.
#[derive(Debug)]
pub enum Error {
    Io(IOError),
    Utf8(Utf8Error),
    Json(JsonError),
    Syntax(String, usize, usize),
    UnclosedSection(String, usize, usize),
    NoValue(String),
    Function(String, String),
    Render(Vec<Error>),
}

impl Display for Error {
    fn fmt(&self, fmtr: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Io(e) => fmtr.write_fmt(format_args!("IO error {:?}", e)),
            Self::Utf8(e) => fmtr.write_fmt(
                format_args!("Template source was not valid utf-8 {:?}", e)
            ),
            Self::Json(e) => fmtr.write_fmt(
                format_args!("Context value could not be serialized {:?}", e)
            ),
            Self::Syntax(msg, line, col) => fmtr.write_fmt(format_args!(
                "{}:{} syntax error: {}",
                line,
                col,
                msg,
            )),
            Self::UnclosedSection(name, line, col) => fmtr.write_fmt(format_args!(
                "unclosed section {:?} opened at line {} position {}",
                name,
                line,
                col,
            )),
            Self::NoValue(name) => fmtr.write_fmt(format_args!(
                "failed to lookup {}",
                name,
            )),
            Self::Function(name, msg) => fmtr.write_fmt(format_args!(
                "custom function {:?} failed: {}",
                name,
                msg,
            )),
            Self::Render(errs) => {
                fmtr.write_str("[")?;
                let mut dlim = "";
                for e in errs {
                    fmtr.write_fmt(format_args!("{dlim}{e}"))?;
                    if dlim.is_empty() {
                        dlim = ", ";
                    }
                }
                fmtr.write_str("]")
            },
        }
    }
}

impl StdError for Error {}

/// The result type for the Vellum Templating Engine.
pub type Result<T> = StdResult<T, Error>;
