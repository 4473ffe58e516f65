//! Parser tests.

use super::{BasicParser, MAX_QUOTE_DEPTH, MessageParser, ParseError, ParseOptions};
use crate::core::ast::{Block, CodeLine, Inline, LinkValue, ListItem, PlainText, Root};

fn parse(text: &str) -> Root {
    BasicParser
        .parse(text, &ParseOptions::default())
        .expect("parses")
}

fn parse_with(text: &str, options: &ParseOptions) -> Root {
    BasicParser.parse(text, options).expect("parses")
}

fn paragraph(value: Vec<Inline>) -> Block {
    Block::Paragraph { value }
}

fn plain(text: &str) -> Inline {
    Inline::plain(text)
}

#[test]
fn empty_text_parses_to_empty_root() {
    assert!(parse("").is_empty());
}

#[test]
fn plain_text_is_one_paragraph() {
    assert_eq!(parse("hello"), vec![paragraph(vec![plain("hello")])]);
}

#[test]
fn leading_newline_emits_line_break_first() {
    assert_eq!(
        parse("\nhello"),
        vec![Block::LineBreak, paragraph(vec![plain("hello")])]
    );
}

#[test]
fn blank_line_between_paragraphs() {
    assert_eq!(
        parse("a\n\nb"),
        vec![
            paragraph(vec![plain("a")]),
            Block::LineBreak,
            paragraph(vec![plain("b")]),
        ]
    );
}

#[test]
fn fenced_code_block_with_language() {
    assert_eq!(
        parse("```rust\nlet x = 1;\nlet y = 2;\n```"),
        vec![Block::Code {
            language: Some("rust".to_string()),
            value: vec![
                CodeLine {
                    value: PlainText::new("let x = 1;")
                },
                CodeLine {
                    value: PlainText::new("let y = 2;")
                },
            ],
        }]
    );
}

#[test]
fn prose_around_code_block() {
    let root = parse("Fix:\n```\nx\n```\nDone.");
    assert_eq!(root.len(), 3);
    assert_eq!(root[0], paragraph(vec![plain("Fix:")]));
    assert!(matches!(&root[1], Block::Code { language: None, .. }));
    assert_eq!(root[2], paragraph(vec![plain("Done.")]));
}

#[test]
fn headings_up_to_level_four() {
    assert_eq!(
        parse("## Title"),
        vec![Block::Heading {
            level: 2,
            value: vec![plain("Title")]
        }]
    );
    assert!(matches!(&parse("##### Five")[0], Block::Paragraph { .. }));
    assert!(matches!(&parse("#general")[0], Block::Paragraph { .. }));
}

#[test]
fn consecutive_quote_lines_form_one_quote() {
    assert_eq!(
        parse("> first\n> second\nafter"),
        vec![
            Block::Quote {
                value: vec![
                    paragraph(vec![plain("first")]),
                    paragraph(vec![plain("second")]),
                ]
            },
            paragraph(vec![plain("after")]),
        ]
    );
}

fn quote_depth(root: &[Block]) -> usize {
    match root {
        [Block::Quote { value }] => 1 + quote_depth(value),
        _ => 0,
    }
}

#[test]
fn quotes_nest_up_to_the_limit() {
    let text = format!("{}x", ">".repeat(MAX_QUOTE_DEPTH));
    let root = parse(&text);
    assert_eq!(quote_depth(&root), MAX_QUOTE_DEPTH);

    let spaced = parse("> > x");
    assert_eq!(quote_depth(&spaced), 2);
}

#[test]
fn quotes_nested_past_the_limit_fail_cleanly() {
    let text = format!("{}x", ">".repeat(MAX_QUOTE_DEPTH + 1));
    let err = BasicParser
        .parse(&text, &ParseOptions::default())
        .expect_err("too deep");
    assert!(err.to_string().contains("nested deeper"));

    let flood = format!("{}x", ">".repeat(200_000));
    assert!(BasicParser.parse(&flood, &ParseOptions::default()).is_err());
}

#[test]
fn bullet_and_numbered_lists() {
    assert_eq!(
        parse("- a\n* b"),
        vec![Block::UnorderedList {
            value: vec![
                ListItem {
                    value: vec![plain("a")],
                    number: None
                },
                ListItem {
                    value: vec![plain("b")],
                    number: None
                },
            ]
        }]
    );
    assert_eq!(
        parse("1. one\n2) two"),
        vec![Block::OrderedList {
            value: vec![
                ListItem {
                    value: vec![plain("one")],
                    number: Some(1)
                },
                ListItem {
                    value: vec![plain("two")],
                    number: Some(2)
                },
            ]
        }]
    );
}

#[test]
fn emphasis_styles() {
    assert_eq!(
        parse("*bold* _it_ ~gone~ **strong**"),
        vec![paragraph(vec![
            Inline::Bold {
                value: vec![plain("bold")]
            },
            plain(" "),
            Inline::Italic {
                value: vec![plain("it")]
            },
            plain(" "),
            Inline::Strike {
                value: vec![plain("gone")]
            },
            plain(" "),
            Inline::Bold {
                value: vec![plain("strong")]
            },
        ])]
    );
}

#[test]
fn nested_emphasis() {
    assert_eq!(
        parse("*a _b_*"),
        vec![paragraph(vec![Inline::Bold {
            value: vec![
                plain("a "),
                Inline::Italic {
                    value: vec![plain("b")]
                }
            ]
        }])]
    );
}

#[test]
fn snake_case_is_not_italic() {
    assert_eq!(
        parse("call my_func_name now"),
        vec![paragraph(vec![plain("call my_func_name now")])]
    );
}

#[test]
fn unclosed_markers_stay_literal() {
    assert_eq!(
        parse("**open and `tick"),
        vec![paragraph(vec![plain("**open and `tick")])]
    );
}

#[test]
fn inline_code_suppresses_markup() {
    assert_eq!(
        parse("run `*not bold*`"),
        vec![paragraph(vec![
            plain("run "),
            Inline::InlineCode {
                value: PlainText::new("*not bold*")
            },
        ])]
    );
}

#[test]
fn markdown_link_and_bare_url() {
    assert_eq!(
        parse("[docs](https://example.com) or https://rust-lang.org."),
        vec![paragraph(vec![
            Inline::Link {
                value: LinkValue {
                    src: PlainText::new("https://example.com"),
                    label: vec![plain("docs")],
                }
            },
            plain(" or "),
            Inline::Link {
                value: LinkValue {
                    src: PlainText::new("https://rust-lang.org"),
                    label: vec![plain("https://rust-lang.org")],
                }
            },
            plain("."),
        ])]
    );
}

#[test]
fn mentions_and_shortcodes() {
    assert_eq!(
        parse("hi @john.doe in #general :wave:"),
        vec![paragraph(vec![
            plain("hi "),
            Inline::MentionUser {
                value: PlainText::new("john.doe")
            },
            plain(" in "),
            Inline::MentionChannel {
                value: PlainText::new("general")
            },
            plain(" "),
            Inline::Emoji {
                value: PlainText::new("wave"),
                short_code: "wave".to_string()
            },
        ])]
    );
}

#[test]
fn email_is_not_a_mention() {
    assert_eq!(
        parse("mail me@example.com"),
        vec![paragraph(vec![plain("mail me@example.com")])]
    );
}

#[test]
fn emoticons_only_when_enabled() {
    assert_eq!(parse("ok :) fine"), vec![paragraph(vec![plain("ok :) fine")])]);

    let options = ParseOptions {
        emoticons: true,
        ..Default::default()
    };
    let root = parse_with("ok :) fine", &options);
    assert_eq!(
        root,
        vec![paragraph(vec![
            plain("ok "),
            Inline::Emoji {
                value: PlainText::new("slight_smile"),
                short_code: "slight_smile".to_string()
            },
            plain(" fine"),
        ])]
    );
}

#[test]
fn lone_emoji_become_big_emoji() {
    let root = parse(":tada: :rocket:");
    match &root[..] {
        [Block::BigEmoji { value }] => assert_eq!(value.len(), 2),
        other => panic!("expected BigEmoji, got {:?}", other),
    }
    assert!(matches!(&parse(":a: :b: :c: :d:")[0], Block::Paragraph { .. }));
}

#[test]
fn custom_domains_link_schemeless_hosts() {
    let options = ParseOptions {
        custom_domains: vec!["corp".to_string()],
        ..Default::default()
    };
    assert_eq!(
        parse_with("see wiki.corp/page", &options),
        vec![paragraph(vec![
            plain("see "),
            Inline::Link {
                value: LinkValue {
                    src: PlainText::new("https://wiki.corp/page"),
                    label: vec![plain("wiki.corp/page")],
                }
            },
        ])]
    );
    assert_eq!(
        parse_with("see wiki.other/page", &options),
        vec![paragraph(vec![plain("see wiki.other/page")])]
    );
}

#[test]
fn closures_are_parsers() {
    let failing = |_: &str, _: &ParseOptions| -> Result<Root, ParseError> {
        Err(ParseError::new("grammar exploded"))
    };
    let err = failing
        .parse("x", &ParseOptions::default())
        .expect_err("closure parser fails");
    assert_eq!(err.to_string(), "message parser failed: grammar exploded");
}

#[test]
fn parse_options_json_uses_camel_case() {
    let options: ParseOptions =
        serde_json::from_str(r#"{"emoticons": true, "customDomains": ["corp"]}"#).unwrap();
    assert!(options.emoticons);
    assert_eq!(options.custom_domains, vec!["corp".to_string()]);
}
