//! Tests for the Vellum Templating Engine.
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
            truth,
            Context,
            Record,
        },
        lexer::{
            Lexer,
            TokenKind,
        },
        node::{
            Escape,
            Node,
        },
        parser::Parser,
        template::Template,
        writer::Writer,
    },
    serde::Serialize,
    serde_json::{
        json,
        Value as JsonValue,
    },
};

fn kinds(src: &str) -> Vec<TokenKind> {
    let mut lexer = Lexer::new(src, "{{", "}}", false);
    let mut out = Vec::new();

    loop {
        let t = lexer.token();
        out.push(t.kind);
        if matches!(t.kind, TokenKind::Eof | TokenKind::Error) {
            break;
        }
    }

    out
}

fn parse_source(src: &str) -> Vec<Node> {
    Parser::new(Lexer::new(src, "{{", "}}", true), Escape::Html)
        .parse()
        .unwrap()
}

fn parse_err(src: &str) -> String {
    Parser::new(Lexer::new(src, "{{", "}}", true), Escape::Html)
        .parse()
        .unwrap_err()
        .to_string()
}

fn render(template: &str, ctx: JsonValue) -> String {
    let mut t = Template::new();
    t.parse_str(template).unwrap();
    t.render_string(&[Context::from(ctx)]).unwrap()
}

fn text<S: AsRef<str>>(s: S) -> Node {
    Node::Text(s.as_ref().to_owned())
}

fn var<S: AsRef<str>>(name: S, escape: Escape) -> Node {
    Node::Var {
        name: name.as_ref().to_owned(),
        escape,
    }
}

fn section<S: AsRef<str>>(name: S, inverted: bool, children: Vec<Node>) -> Node {
    Node::Section {
        name: name.as_ref().to_owned(),
        inverted,
        children,
    }
}

#[test]
fn lex_simple_tag() {
    assert_eq!(
        vec![
            TokenKind::Text,
            TokenKind::LeftDelim,
            TokenKind::Identifier,
            TokenKind::RightDelim,
            TokenKind::Text,
            TokenKind::Eof,
        ],
        kinds("some text {{foo}} here"),
    );
}

#[test]
fn lex_raw_tag() {
    assert_eq!(
        vec![
            TokenKind::LeftDelim,
            TokenKind::RawStart,
            TokenKind::Identifier,
            TokenKind::RawEnd,
            TokenKind::RightDelim,
            TokenKind::Eof,
        ],
        kinds("{{{x}}}"),
    );
}

#[test]
fn lex_set_delim() {
    assert_eq!(
        vec![
            TokenKind::SetDelim,
            TokenKind::LeftDelim,
            TokenKind::Identifier,
            TokenKind::RightDelim,
            TokenKind::Eof,
        ],
        kinds("{{=<% %>=}}<%x%>"),
    );
}

#[test]
fn lex_set_delim_malformed() {
    let tokens = kinds("{{=ab=}}");
    assert_eq!(TokenKind::Error, *tokens.last().unwrap());
}

#[test]
fn lex_unclosed_action() {
    let mut lexer = Lexer::new("{{\n}}", "{{", "}}", false);
    let t = lexer.token();
    assert_eq!(TokenKind::LeftDelim, t.kind);

    let t = lexer.token();
    assert_eq!(TokenKind::Error, t.kind);
    assert_eq!("unclosed action", t.val);
}

#[test]
fn lex_ident_position() {
    let mut lexer = Lexer::new("ab\n{{cd}}", "{{", "}}", false);
    let t = lexer.token();
    assert_eq!(TokenKind::Text, t.kind);

    let t = lexer.token();
    assert_eq!(TokenKind::LeftDelim, t.kind);
    assert_eq!(2, t.line);
    assert_eq!(2, t.col);

    let t = lexer.token();
    assert_eq!(TokenKind::Identifier, t.kind);
    assert_eq!("cd", t.val);
    assert_eq!(2, t.line);
    assert_eq!(4, t.col);
}

#[test]
fn parse_tree_nested_same_name() {
    assert_eq!(
        vec![section("foo", false, vec![
            text("\n\t"),
            section("foo", false, vec![
                text("hello nested"),
            ]),
        ])],
        parse_source("{{#foo}}\n\t{{#foo}}hello nested{{/foo}}{{/foo}}"),
    );
}

#[test]
fn parse_tree_mixed() {
    assert_eq!(
        vec![
            text("\nfoo "),
            var("bar", Escape::Html),
            text(" "),
            section("alex", false, vec![
                text("\r\n\tbaz\n"),
            ]),
            text(" "),
            Node::Comment("foo".to_owned()),
        ],
        parse_source("\nfoo {{bar}} {{#alex}}\r\n\tbaz\n{{/alex}} {{!foo}}"),
    );
}

#[test]
fn parse_tree_inverted() {
    assert_eq!(
        vec![
            text("this will"),
            section("foo", true, vec![
                text("not"),
            ]),
            text(" be rendered"),
        ],
        parse_source("this will{{^foo}}not{{/foo}} be rendered"),
    );
}

#[test]
fn parse_tree_dot_in_section() {
    assert_eq!(
        vec![section("list", false, vec![
            text("("),
            var(".", Escape::Html),
            text(")"),
        ])],
        parse_source("{{#list}}({{.}}){{/list}}"),
    );
}

#[test]
fn parse_tree_star_is_a_plain_name() {
    assert_eq!(
        vec![section("*", false, vec![
            text("("),
            var(".", Escape::Html),
            text(")"),
        ])],
        parse_source("{{#*}}({{.}}){{/*}}"),
    );

    assert_eq!(
        vec![section("list", false, vec![
            text("("),
            var("*", Escape::Html),
            text(")"),
        ])],
        parse_source("{{#list}}({{*}}){{/list}}"),
    );
}

#[test]
fn parse_tree_ident_with_brace() {
    assert_eq!(
        vec![section("list", false, vec![
            text("("),
            var("a}a", Escape::Html),
            text(")"),
        ])],
        parse_source("{{#list}}({{a}a}}){{/list}}"),
    );
}

#[test]
fn parse_tree_test_value() {
    assert_eq!(
        vec![Node::TestSection {
            ident: "foo".to_owned(),
            value: "bar".to_owned(),
            children: vec![
                text("("),
                var("a}a", Escape::Html),
                text(")"),
            ],
        }],
        parse_source(r#"{{#test_value {{foo}} "bar"}}({{a}a}}){{/test_value}}"#),
    );
}

#[test]
fn parse_tree_test_value_nested_section() {
    assert_eq!(
        vec![Node::TestSection {
            ident: "foo".to_owned(),
            value: "bar".to_owned(),
            children: vec![section("a", false, vec![
                var("b", Escape::Html),
            ])],
        }],
        parse_source(r#"{{#test_value {{foo}} "bar"}}{{#a}}{{b}}{{/a}}{{/test_value}}"#),
    );
}

#[test]
fn parse_tree_function_section_options() {
    assert_eq!(
        vec![Node::FunctionSection {
            name: "wrap".to_owned(),
            options: [
                ("left".to_owned(), "< ".to_owned()),
                ("right".to_owned(), " >".to_owned()),
            ].into_iter().collect(),
            children: vec![text("body")],
        }],
        parse_source(r#"{{~wrap left="< " right=" >"}}body{{/wrap}}"#),
    );
}

#[test]
fn parse_err_unclosed_tag() {
    assert_eq!(
        r#"1:6 syntax error: unreachable code t_error:"unclosed tag""#,
        parse_err("{{foo}"),
    );
}

#[test]
fn parse_err_test_value_unquoted() {
    assert_eq!(
        r#"1:21 syntax error: unexpected token t_error:"invalid test_value value token""#,
        parse_err(r#"{{#test_value {{a}} b}}"#),
    );
}

#[test]
fn parse_err_test_value_unterminated_quote() {
    assert_eq!(
        r#"1:24 syntax error: unexpected token t_error:"failed to find close \" for test_value value token""#,
        parse_err(r#"{{#test_value {{a}} "b}}"#),
    );
}

#[test]
fn parse_err_test_value_unclosed_section() {
    assert_eq!(
        r#"unclosed section "test_value" opened at line 1 position 13"#,
        parse_err(r#"{{#test_value {{a}} "b"}}"#),
    );
}

#[test]
fn parse_err_test_value_missing_ident() {
    assert_eq!(
        r#"1:14 syntax error: unexpected token t_error:"Missing test_value identifier""#,
        parse_err("{{#test_value a b}}"),
    );
}

#[test]
fn parse_err_unclosed_section() {
    assert_eq!(
        r#"unclosed section "foo" opened at line 1 position 6"#,
        parse_err("{{#foo}}bar"),
    );
}

#[test]
fn lookup_map() {
    let chain = [Context::from(json!({
        "integer": 123,
        "string": "abc",
        "boolean": true,
        "map": { "in": "I'm nested!" },
    }))];

    let (v, t) = lookup("integer", &chain);
    assert!(matches!(v, Some(Context::Value(JsonValue::Number(_)))));
    assert!(t);

    let (v, t) = lookup("string", &chain);
    assert!(matches!(v, Some(Context::Value(JsonValue::String(_)))));
    assert!(t);

    let (_, t) = lookup("boolean", &chain);
    assert!(t);

    let (v, t) = lookup("map.in", &chain);
    assert_eq!(
        Some("I'm nested!".to_owned()),
        v.map(|c| crate::node::format_context(&c)),
    );
    assert!(t);

    let (v, t) = lookup("absent", &chain);
    assert!(v.is_none());
    assert!(!t);
}

#[test]
fn lookup_chain_order() {
    // the innermost context shadows the outer one
    let chain = [
        Context::from(json!({ "name": "inner" })),
        Context::from(json!({ "name": "outer", "only": "outer" })),
    ];

    let (v, _) = lookup("name", &chain);
    assert_eq!(
        Some("inner".to_owned()),
        v.map(|c| crate::node::format_context(&c)),
    );

    // a miss falls through to the outer context
    let (v, _) = lookup("only", &chain);
    assert_eq!(
        Some("outer".to_owned()),
        v.map(|c| crate::node::format_context(&c)),
    );
}

#[test]
fn lookup_dotted_no_partial_match() {
    let chain = [
        Context::from(json!({ "a": { "b": "x" } })),
        Context::from(json!({ "a": { "c": "y" } })),
    ];

    let (v, t) = lookup("a.b", &chain);
    assert_eq!(
        Some("x".to_owned()),
        v.map(|c| crate::node::format_context(&c)),
    );
    assert!(t);

    // the suffix never falls through to the outer context's "a"
    let (v, t) = lookup("a.c", &chain);
    assert!(v.is_none());
    assert!(!t);
}

#[test]
fn lookup_index() {
    let chain = [Context::from(json!({
        "outer": [[1], [1, 2]],
    }))];

    let (v, t) = lookup("outer.1.0", &chain);
    assert_eq!(
        Some("1".to_owned()),
        v.map(|c| crate::node::format_context(&c)),
    );
    assert!(t);

    let (v, _) = lookup("outer.1.5", &chain);
    assert!(v.is_none());

    let (v, _) = lookup("outer.-1", &chain);
    assert!(v.is_none());

    let (v, _) = lookup("outer.a", &chain);
    assert!(v.is_none());
}

#[test]
fn lookup_index_into_map() {
    let chain = [Context::from(json!([
        { "a": 1 },
        { "b": 2 },
    ]))];

    let (v, t) = lookup("1.b", &chain);
    assert_eq!(
        Some("2".to_owned()),
        v.map(|c| crate::node::format_context(&c)),
    );
    assert!(t);
}

struct Subject;

impl Record for Subject {
    fn field(&self, name: &str) -> Option<JsonValue> {
        match name {
            "Integer" => Some(json!(123)),
            "Slice" => Some(json!([1])),
            "Nested" => Some(json!({ "Inside": "I'm nested!" })),
            "Tagged" => Some(json!("xyz")),
            "NilPtr" => Some(JsonValue::Null),
            "Shadowed" => Some(json!("field")),
            _ => None,
        }
    }

    fn accessor(&self, name: &str) -> Option<JsonValue> {
        match name {
            "Title" => Some(json!("computed")),
            "Shadowed" => Some(json!("accessor")),
            _ => None,
        }
    }

    fn alias(&self, name: &str) -> Option<JsonValue> {
        match name {
            "newName" => Some(json!("xyz")),
            _ => None,
        }
    }

    fn display(&self) -> Option<String> {
        Some("a subject".to_owned())
    }
}

#[test]
fn lookup_record() {
    let chain = [Context::record(Subject)];

    let (v, t) = lookup("Integer", &chain);
    assert_eq!(
        Some("123".to_owned()),
        v.map(|c| crate::node::format_context(&c)),
    );
    assert!(t);

    // a zero-argument accessor resolves when no field matches
    let (v, _) = lookup("Title", &chain);
    assert_eq!(
        Some("computed".to_owned()),
        v.map(|c| crate::node::format_context(&c)),
    );

    // a field shadows an accessor of the same name
    let (v, _) = lookup("Shadowed", &chain);
    assert_eq!(
        Some("field".to_owned()),
        v.map(|c| crate::node::format_context(&c)),
    );

    // the declared alias is tried last
    let (v, _) = lookup("newName", &chain);
    assert_eq!(
        Some("xyz".to_owned()),
        v.map(|c| crate::node::format_context(&c)),
    );

    let (v, t) = lookup("Nested.Inside", &chain);
    assert_eq!(
        Some("I'm nested!".to_owned()),
        v.map(|c| crate::node::format_context(&c)),
    );
    assert!(t);

    let (v, t) = lookup("Slice.0", &chain);
    assert_eq!(
        Some("1".to_owned()),
        v.map(|c| crate::node::format_context(&c)),
    );
    assert!(t);

    let (v, _) = lookup("Slice.2", &chain);
    assert!(v.is_none());

    // a null field value reads as absent
    let (v, t) = lookup("NilPtr", &chain);
    assert!(v.is_none());
    assert!(!t);

    let (v, _) = lookup("unknown", &chain);
    assert!(v.is_none());
}

#[test]
fn truth_table() {
    assert!(truth(&json!("abc")));
    assert!(!truth(&json!("")));
    assert!(truth(&json!(123)));
    assert!(!truth(&json!(0)));
    assert!(!truth(&json!(-1)));
    assert!(truth(&json!(0.5)));
    assert!(!truth(&json!(-0.5)));
    assert!(truth(&json!(true)));
    assert!(!truth(&json!(false)));
    assert!(truth(&json!([1])));
    assert!(!truth(&json!([])));
    assert!(truth(&json!({})));
    assert!(!truth(&JsonValue::Null));
}

#[test]
fn render_simple() {
    assert_eq!(
        "some text bar %2B here",
        render("some text {{foo}} here", json!({ "foo": "bar %2B" })),
    );
}

#[test]
fn render_no_tags_is_verbatim() {
    let source = "no tags at all,\njust text & <markup>";
    assert_eq!(source, render(source, json!({ "unused": 1 })));
}

#[test]
fn render_falsy_values_still_print() {
    assert_eq!(
        "some text 0 false here",
        render(
            "some text {{^foo}}{{foo}}{{/foo}} {{bar}} here",
            json!({ "foo": 0, "bar": false }),
        ),
    );
}

#[test]
fn render_mixed_tree() {
    assert_eq!(
        "Lorem ipsum dolor sit amet, consectetur adipiscing elit. \
         Proin commodo viverra elit 0.11.",
        render(
            "Lorem ipsum dolor sit {{&foo}}, {{#bar}}{{baz}} adipiscing{{/bar}} \
             elit. Proin commodo viverra elit {{&zer}}.",
            json!({
                "foo": "amet",
                "bar": { "baz": "consectetur" },
                "zer": 0.11,
            }),
        ),
    );
}

#[test]
fn render_html_escape() {
    assert_eq!(
        "&lt;a&gt;&amp;&apos;",
        render("{{x}}", json!({ "x": "<a>&'" })),
    );
}

#[test]
fn render_json_escape() {
    let mut t = Template::new().with_escape(Escape::Json);
    t.parse_str("some text {{foo}} here").unwrap();
    assert_eq!(
        "some text \\\"bar\\\"\\n<baz> %2B here",
        t.render_string(&[Context::from(json!({ "foo": "\"bar\"\n<baz> %2B" }))])
            .unwrap(),
    );
}

#[test]
fn render_object_output() {
    assert_eq!(
        "Raw output here: {&quot;foo&quot;:{&quot;bar&quot;:&quot;baz&quot;}}",
        render("Raw output here: {{.}}", json!({ "foo": { "bar": "baz" } })),
    );
}

#[test]
fn render_object_output_json_escaped() {
    let mut t = Template::new().with_escape(Escape::Json);
    t.parse_str("Raw output here: {{.}}").unwrap();
    assert_eq!(
        "Raw output here: {\\\"foo\\\":{\\\"bar\\\":\\\"baz %2B\\\"}}",
        t.render_string(&[Context::from(json!({ "foo": { "bar": "baz %2B" } }))])
            .unwrap(),
    );
}

#[test]
fn render_object_output_unescaped() {
    assert_eq!(
        "Raw output here: {\"foo\":{\"bar\":\"baz %2B\"}}",
        render("Raw output here: {{{.}}}", json!({ "foo": { "bar": "baz %2B" } })),
    );
}

#[test]
fn render_ident_with_whitespace() {
    assert_eq!(
        "some text bar %2B here",
        render(
            "some text {{foo.bar baz.foo}} here",
            json!({ "foo": { "bar baz": { "foo": "bar %2B" } } }),
        ),
    );
}

#[test]
fn render_section_iteration() {
    assert_eq!(
        "(1)(2)(3)",
        render("{{#list}}({{.}}){{/list}}", json!({ "list": [1, 2, 3] })),
    );

    assert_eq!(
        "",
        render("{{#list}}({{.}}){{/list}}", json!({ "list": [] })),
    );

    // a truthy non-sequence renders the body once, as the context
    assert_eq!(
        "(hi)",
        render("{{#list}}({{.}}){{/list}}", json!({ "list": "hi" })),
    );
}

#[test]
fn render_inverted_section() {
    assert_eq!("X", render("{{^foo}}X{{/foo}}", json!({})));
    assert_eq!("X", render("{{^foo}}X{{/foo}}", json!({ "foo": 0 })));
    assert_eq!("", render("{{^foo}}X{{/foo}}", json!({ "foo": 1 })));

    // the inverted body sees the unmodified chain
    assert_eq!(
        "outer",
        render("{{^foo}}{{bar}}{{/foo}}", json!({ "bar": "outer" })),
    );
}

#[test]
fn render_negative_numbers_are_falsy() {
    assert_eq!("", render("{{#n}}X{{/n}}", json!({ "n": -1 })));
    assert_eq!("X", render("{{#n}}X{{/n}}", json!({ "n": 1 })));
}

#[test]
fn render_section_pushes_context() {
    assert_eq!(
        "consectetur",
        render("{{#bar}}{{baz}}{{/bar}}", json!({ "bar": { "baz": "consectetur" } })),
    );

    // the outer context stays reachable from inside the section
    assert_eq!(
        "amet consectetur",
        render(
            "{{#bar}}{{foo}} {{baz}}{{/bar}}",
            json!({ "foo": "amet", "bar": { "baz": "consectetur" } }),
        ),
    );
}

#[test]
fn render_comment() {
    assert_eq!("ab", render("a{{! ignored }}b", json!({})));
}

#[test]
fn render_set_delim() {
    assert_eq!(
        "ab",
        render("{{foo}}{{=<% %>=}}<%bar%>", json!({ "foo": "a", "bar": "b" })),
    );
}

#[test]
fn render_custom_function() {
    let mut t = Template::new().with_custom_function("reverse", |s| {
        Ok(s.chars().rev().collect())
    });
    t.parse_str("raw text {{~reverse}}txet erom{{/reverse}}").unwrap();
    assert_eq!("raw text more text", t.render_string(&[]).unwrap());
}

#[test]
fn render_custom_function_with_options() {
    let mut t = Template::new().with_custom_function_options("split", |s, opts| {
        let token = opts.get("token").map(String::as_str).unwrap_or("");
        Ok(s.split(token).collect::<Vec<&str>>().join(" "))
    });
    t.parse_str(r#"split: {{~split token="x"}}hexllxoxworxld{{/split}}"#).unwrap();
    assert_eq!("split: he ll o wor ld", t.render_string(&[]).unwrap());
}

#[test]
fn render_unregistered_function_discards_body() {
    let mut t = Template::new();
    t.parse_str("a{{~nobody}}gone{{/nobody}}b").unwrap();
    assert_eq!("ab", t.render_string(&[]).unwrap());
}

#[test]
fn render_test_value_sections() {
    for (template, payload, expect) in [
        (
            r#"some text {{#test_value {{a}} "value"}}hidden{{/test_value}} here"#,
            json!({ "a": "value" }),
            "some text hidden here",
        ),
        (
            // the body keeps the top-level context
            r#"some text {{#test_value {{a}} "value"}}{{b}}{{/test_value}} here"#,
            json!({ "a": "value", "b": "hidden" }),
            "some text hidden here",
        ),
        (
            // nesting
            r#"some text {{#test_value {{a}} "value"}}{{#test_value {{b}} "hidden"}}thing{{/test_value}}{{/test_value}} here"#,
            json!({ "a": "value", "b": "hidden" }),
            "some text thing here",
        ),
        (
            // an absent identifier renders nothing
            r#"some text {{#test_value {{aa}} "value"}}hidden{{/test_value}} here"#,
            json!({ "a": "value" }),
            "some text  here",
        ),
        (
            // a normal section nested inside
            r#"some text {{#test_value {{a}} "value"}}{{#b}}{{.}}{{/b}}{{/test_value}} here"#,
            json!({ "a": "value", "b": [1, 2, 3] }),
            "some text 123 here",
        ),
    ] {
        let mut t = Template::new().with_test_value_sections(true);
        t.parse_str(template).unwrap();
        assert_eq!(
            expect,
            t.render_string(&[Context::from(payload)]).unwrap(),
        );
    }
}

#[test]
fn render_partials_cannot_cycle() {
    let mut inner = Template::new().with_name("inner");
    inner.parse_str("I am the inner.{{>outer}}").unwrap();

    let mut outer = Template::new().with_name("outer");
    outer.parse_str("I am the outer.{{>inner}}").unwrap();

    let mut main = Template::new()
        .with_partial(outer)
        .with_partial(inner);
    main.parse_str("{{>outer}}").unwrap();

    assert_eq!(
        "I am the outer.I am the inner.",
        main.render_string(&[]).unwrap(),
    );
}

#[test]
fn render_unknown_partial_is_a_no_op() {
    let mut t = Template::new().with_silent_miss(false);
    t.parse_str("a{{>nothing}}b").unwrap();
    assert_eq!("ab", t.render_string(&[]).unwrap());
}

#[test]
fn render_silent_miss_default() {
    assert_eq!("", render("{{missing}}", json!({})));
}

#[test]
fn render_strict_miss() {
    let mut t = Template::new().with_silent_miss(false);
    t.parse_str("{{missing}} and {{also_missing}}").unwrap();

    let err = t.render_string(&[Context::from(json!({}))]).unwrap_err();
    let msg = err.to_string();
    assert_eq!(
        "[failed to lookup missing, failed to lookup also_missing]",
        msg,
    );
}

#[test]
fn render_strict_miss_keeps_output() {
    let mut t = Template::new().with_silent_miss(false);
    t.parse_str("before {{missing}} after").unwrap();

    let mut out = Vec::new();
    let err = t.render(&mut out, &[Context::from(json!({}))]);
    assert!(err.is_err());
    assert_eq!("before  after", String::from_utf8(out).unwrap());
}

#[test]
fn render_record_context() {
    let mut t = Template::new();
    t.parse_str("{{Nested.Inside}} by {{Title}} ({{newName}})").unwrap();
    assert_eq!(
        "I&apos;m nested! by computed (xyz)",
        t.render_string(&[Context::record(Subject)]).unwrap(),
    );
}

#[test]
fn render_record_display() {
    let mut t = Template::new();
    t.parse_str("{{.}}").unwrap();
    assert_eq!("a subject", t.render_string(&[Context::record(Subject)]).unwrap());
}

#[test]
fn render_serialized_context() {
    #[derive(Serialize)]
    struct Author {
        name: String,
        #[serde(rename = "years")]
        age: u32,
    }

    let ctx = Context::from_serialize(&Author {
        name: "Ada".to_owned(),
        age: 36,
    })
    .unwrap();

    let mut t = Template::new();
    t.parse_str("{{name}}, {{years}}").unwrap();
    assert_eq!("Ada, 36", t.render_string(&[ctx]).unwrap());
}

#[test]
fn render_custom_delimiters_from_config() {
    let mut t = Template::new().with_delimiters("<%", "%>");
    t.parse_str("a <%x%> b").unwrap();
    assert_eq!(
        "a 1 b",
        t.render_string(&[Context::from(json!({ "x": 1 }))]).unwrap(),
    );
}

#[test]
fn writer_line_bookkeeping() {
    let mut buf = Vec::new();
    let mut w = Writer::new(&mut buf);

    w.tag();
    assert!(w.tag_only());

    w.text();
    assert!(!w.tag_only());

    w.write_str("ab\n").unwrap();

    // the commit of the line resets the flags
    w.tag();
    assert!(w.tag_only());

    w.flush().unwrap();
    assert_eq!("ab\n", String::from_utf8(buf).unwrap());
}

#[test]
fn template_free_functions() {
    let t = crate::template::parse("hi {{name}}".as_bytes()).unwrap();
    assert_eq!(
        "hi you",
        t.render_string(&[Context::from(json!({ "name": "you" }))]).unwrap(),
    );

    let mut out = Vec::new();
    crate::template::render(
        "hi {{name}}".as_bytes(),
        &mut out,
        &[Context::from(json!({ "name": "you" }))],
    )
    .unwrap();
    assert_eq!("hi you", String::from_utf8(out).unwrap());
}
