//! The compiler for the Vellum Templating Engine.
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
    clap::{
        Parser,
        ValueEnum,
    },
    std::{
        fs::{
            read_to_string,
            File,
        },
        io::{
            stdout,
            BufWriter,
        },
        path::PathBuf,
        process::exit as pexit,
    },
    serde_json::{
        from_str as from_json_str,
        Value as JsonValue,
    },
    vellum_core::{
        Context,
        Error,
        Escape,
        Result,
        Template,
    },
};

#[derive(Clone, Copy, ValueEnum)]
enum EscapeMode {
    Html,
    Json,
    None,
}

impl From<EscapeMode> for Escape {
    fn from(mode: EscapeMode) -> Self {
        match mode {
            EscapeMode::Html => Escape::Html,
            EscapeMode::Json => Escape::Json,
            EscapeMode::None => Escape::None,
        }
    }
}

#[derive(Parser)]
#[command(name = "velc", version, about = "Compiles a vellum template against a json context.")]
struct Options {
    /// The template file to compile.
    template: PathBuf,

    /// A json file whose contents become the render context.
    #[arg(short, long)]
    context: Option<PathBuf>,

    /// Where to write the output instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// The escape mode applied to rendered values.
    #[arg(short, long, value_enum, default_value = "html")]
    escape: EscapeMode,

    /// The delimiter pair, given as "<left> <right>".
    #[arg(short, long)]
    delimiters: Option<String>,

    /// Fail the render on missing values instead of skipping them.
    #[arg(long)]
    strict: bool,

    /// Enable {{#test_value ...}} sections.
    #[arg(long)]
    test_value_sections: bool,
}

fn main() -> Result<()> {
    let opts = Options::parse();

    let mut template = Template::new()
        .with_escape(opts.escape.into())
        .with_silent_miss(!opts.strict)
        .with_test_value_sections(opts.test_value_sections);

    if let Some(delims) = &opts.delimiters {
        let mut parts = delims.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(left), Some(right), None) => {
                template = template.with_delimiters(left, right);
            },
            _ => {
                eprintln!("Delimiters must be given as \"<left> <right>\".");
                pexit(1);
            },
        }
    }

    let source = read_to_string(&opts.template).map_err(Error::Io)?;
    template.parse_str(source)?;

    let mut chain = Vec::new();
    if let Some(path) = &opts.context {
        let raw = read_to_string(path).map_err(Error::Io)?;
        let value = from_json_str::<JsonValue>(&raw).map_err(Error::Json)?;
        chain.push(Context::from(value));
    }

    match &opts.output {
        Some(path) => {
            let file = File::create(path).map_err(Error::Io)?;
            template.render(BufWriter::new(file), &chain)?;
        },
        None => {
            template.render(stdout().lock(), &chain)?;
        },
    }

    Ok(())
}
