//! Inline parsing: emphasis, `code`, [links](url), bare URLs, mentions, emoji.

use std::sync::LazyLock;

use regex::Regex;

use super::ParseOptions;
use crate::core::ast::{Inline, LinkValue, PlainText};

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s<>]+").expect("valid URL pattern"));
static HOST_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\w-]+(?:\.[\w-]+)+(?:/[^\s<>]*)?").expect("valid host pattern")
});
static USER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@[\w.\-]+").expect("valid mention pattern"));
static CHANNEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#[\w.\-]+").expect("valid channel pattern"));
static SHORTCODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":([a-z0-9_+\-]+):").expect("valid shortcode pattern"));

/// ASCII emoticons recognised when `ParseOptions::emoticons` is on.
const EMOTICONS: &[(&str, &str)] = &[
    (":-)", "slight_smile"),
    (":)", "slight_smile"),
    (":-(", "frowning2"),
    (":(", "frowning2"),
    (":D", "smiley"),
    (";)", "wink"),
    (":P", "stuck_out_tongue"),
    (":p", "stuck_out_tongue"),
    (":o", "open_mouth"),
    ("<3", "heart"),
];

#[derive(Debug, Clone, Copy)]
enum Emphasis {
    Bold,
    Italic,
    Strike,
}

/// Delimiters tried in order; on a tie the earlier entry wins, so `**` beats `*`.
const DELIMITERS: &[(&str, Emphasis)] = &[
    ("**", Emphasis::Bold),
    ("*", Emphasis::Bold),
    ("__", Emphasis::Italic),
    ("_", Emphasis::Italic),
    ("~~", Emphasis::Strike),
    ("~", Emphasis::Strike),
];

#[derive(Debug)]
enum TokenKind<'a> {
    Emphasis(Emphasis, &'a str),
    Code(&'a str),
    Link { label: &'a str, url: &'a str },
    Url(&'a str),
    Schemeless(&'a str),
    User(&'a str),
    Channel(&'a str),
    Emoji(&'a str),
}

/// A recognised token: byte range within the line and what it becomes.
#[derive(Debug)]
struct Token<'a> {
    start: usize,
    end: usize,
    kind: TokenKind<'a>,
}

/// Parse one line of prose into inline nodes. Adjacent text is merged.
pub(crate) fn parse_inline(s: &str, options: &ParseOptions) -> Vec<Inline> {
    let mut nodes = Vec::new();
    let mut pos = 0;
    while pos < s.len() {
        match next_token(s, pos, options) {
            None => {
                push_text(&mut nodes, &s[pos..]);
                break;
            }
            Some(token) => {
                push_text(&mut nodes, &s[pos..token.start]);
                nodes.push(into_node(token.kind, options));
                pos = token.end;
            }
        }
    }
    nodes
}

/// Shortcode of `s` when it is a lone `:shortcode:` or (with emoticons on) an emoticon.
pub(crate) fn lone_emoji(s: &str, options: &ParseOptions) -> Option<Inline> {
    if let Some(caps) = SHORTCODE.captures(s)
        && caps.get(0).is_some_and(|m| m.as_str().len() == s.len())
    {
        return Some(emoji(&caps[1]));
    }
    if options.emoticons {
        return EMOTICONS
            .iter()
            .find(|(face, _)| *face == s)
            .map(|(_, code)| emoji(code));
    }
    None
}

fn emoji(code: &str) -> Inline {
    Inline::Emoji {
        value: PlainText::new(code),
        short_code: code.to_string(),
    }
}

fn push_text(nodes: &mut Vec<Inline>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Inline::PlainText { value }) = nodes.last_mut() {
        value.push_str(text);
    } else {
        nodes.push(Inline::plain(text));
    }
}

fn into_node(kind: TokenKind<'_>, options: &ParseOptions) -> Inline {
    match kind {
        TokenKind::Emphasis(style, inner) => {
            let value = parse_inline(inner, options);
            match style {
                Emphasis::Bold => Inline::Bold { value },
                Emphasis::Italic => Inline::Italic { value },
                Emphasis::Strike => Inline::Strike { value },
            }
        }
        TokenKind::Code(code) => Inline::InlineCode {
            value: PlainText::new(code),
        },
        TokenKind::Link { label, url } => Inline::Link {
            value: LinkValue {
                src: PlainText::new(url),
                label: parse_inline(label, options),
            },
        },
        TokenKind::Url(url) => Inline::Link {
            value: LinkValue {
                src: PlainText::new(url),
                label: vec![Inline::plain(url)],
            },
        },
        TokenKind::Schemeless(target) => Inline::Link {
            value: LinkValue {
                src: PlainText::new(format!("https://{}", target)),
                label: vec![Inline::plain(target)],
            },
        },
        TokenKind::User(name) => Inline::MentionUser {
            value: PlainText::new(name),
        },
        TokenKind::Channel(name) => Inline::MentionChannel {
            value: PlainText::new(name),
        },
        TokenKind::Emoji(code) => emoji(code),
    }
}

/// Earliest token at or after `from`.
fn next_token<'a>(s: &'a str, from: usize, options: &ParseOptions) -> Option<Token<'a>> {
    let mut candidates: Vec<Option<Token<'a>>> = vec![find_code(s, from)];
    candidates.extend(
        DELIMITERS
            .iter()
            .map(|&(delim, style)| find_emphasis(s, from, delim, style)),
    );
    candidates.push(find_link(s, from));
    candidates.push(find_url(s, from));
    if !options.custom_domains.is_empty() {
        candidates.push(find_schemeless(s, from, &options.custom_domains));
    }
    candidates.push(find_mention(s, from, &USER, TokenKind::User));
    candidates.push(find_mention(s, from, &CHANNEL, TokenKind::Channel));
    candidates.push(find_shortcode(s, from));
    if options.emoticons {
        candidates.push(find_emoticon(s, from));
    }

    let mut best: Option<Token<'a>> = None;
    for token in candidates.into_iter().flatten() {
        if best.as_ref().is_none_or(|b| token.start < b.start) {
            best = Some(token);
        }
    }
    best
}

fn prev_char(s: &str, idx: usize) -> Option<char> {
    s[..idx].chars().next_back()
}

fn next_char(s: &str, idx: usize) -> Option<char> {
    s[idx..].chars().next()
}

fn find_code(s: &str, from: usize) -> Option<Token<'_>> {
    let open = from + s[from..].find('`')?;
    let close = open + 1 + s[open + 1..].find('`')?;
    if close == open + 1 {
        return None;
    }
    Some(Token {
        start: open,
        end: close + 1,
        kind: TokenKind::Code(&s[open + 1..close]),
    })
}

fn find_emphasis<'a>(s: &'a str, from: usize, delim: &str, style: Emphasis) -> Option<Token<'a>> {
    for (rel, _) in s[from..].match_indices(delim) {
        let open = from + rel;
        if prev_char(s, open).is_some_and(char::is_alphanumeric) {
            continue;
        }
        let inner_start = open + delim.len();
        if next_char(s, inner_start).is_none_or(char::is_whitespace) {
            continue;
        }
        if let Some(close) = find_closing(s, inner_start, delim) {
            return Some(Token {
                start: open,
                end: close + delim.len(),
                kind: TokenKind::Emphasis(style, &s[inner_start..close]),
            });
        }
    }
    None
}

fn find_closing(s: &str, from: usize, delim: &str) -> Option<usize> {
    s[from..]
        .match_indices(delim)
        .map(|(rel, _)| from + rel)
        .find(|&close| {
            close > from
                && !prev_char(s, close).is_some_and(char::is_whitespace)
                && !next_char(s, close + delim.len()).is_some_and(char::is_alphanumeric)
        })
}

/// `[label](url)` with a non-empty label and a url without whitespace.
fn find_link(s: &str, from: usize) -> Option<Token<'_>> {
    for (rel, _) in s[from..].match_indices('[') {
        let open = from + rel;
        let Some(end_br) = s[open + 1..].find(']').map(|i| open + 1 + i) else {
            return None;
        };
        let label = &s[open + 1..end_br];
        if label.is_empty() || !s[end_br + 1..].starts_with('(') {
            continue;
        }
        let url_start = end_br + 2;
        let Some(end_paren) = s[url_start..].find(')').map(|i| url_start + i) else {
            continue;
        };
        let url = &s[url_start..end_paren];
        if url.is_empty() || url.contains(char::is_whitespace) {
            continue;
        }
        return Some(Token {
            start: open,
            end: end_paren + 1,
            kind: TokenKind::Link { label, url },
        });
    }
    None
}

/// Drop sentence punctuation glued to the end of a URL or mention.
fn trim_trailing(token: &str) -> &str {
    let trimmed = token.trim_end_matches(['.', ',', ';', ':', '!', '?', '\'', '"']);
    if trimmed.ends_with(')') && !trimmed.contains('(') {
        &trimmed[..trimmed.len() - 1]
    } else {
        trimmed
    }
}

fn find_url(s: &str, from: usize) -> Option<Token<'_>> {
    URL.find_iter(&s[from..]).find_map(|m| {
        let start = from + m.start();
        if prev_char(s, start).is_some_and(char::is_alphanumeric) {
            return None;
        }
        let url = trim_trailing(m.as_str());
        Some(Token {
            start,
            end: start + url.len(),
            kind: TokenKind::Url(url),
        })
    })
}

/// `host.example/path` on one of the configured domains, without a scheme.
fn find_schemeless<'a>(s: &'a str, from: usize, domains: &[String]) -> Option<Token<'a>> {
    HOST_PATH.find_iter(&s[from..]).find_map(|m| {
        let start = from + m.start();
        if prev_char(s, start).is_some_and(|c| c.is_alphanumeric() || "/@.:".contains(c)) {
            return None;
        }
        let target = trim_trailing(m.as_str());
        let host = target.split('/').next().unwrap_or(target);
        let on_domain = domains.iter().any(|d| {
            let d = d.trim().trim_start_matches('.');
            !d.is_empty()
                && (host.eq_ignore_ascii_case(d)
                    || host
                        .to_ascii_lowercase()
                        .ends_with(&format!(".{}", d.to_ascii_lowercase())))
        });
        on_domain.then(|| Token {
            start,
            end: start + target.len(),
            kind: TokenKind::Schemeless(target),
        })
    })
}

fn find_mention<'a>(
    s: &'a str,
    from: usize,
    re: &Regex,
    kind: fn(&'a str) -> TokenKind<'a>,
) -> Option<Token<'a>> {
    re.find_iter(&s[from..]).find_map(|m| {
        let start = from + m.start();
        if prev_char(s, start).is_some_and(|c| c.is_alphanumeric() || c == '@' || c == '#') {
            return None;
        }
        let name = m.as_str()[1..].trim_end_matches(['.', '-']);
        if name.is_empty() {
            return None;
        }
        Some(Token {
            start,
            end: start + 1 + name.len(),
            kind: kind(name),
        })
    })
}

fn find_shortcode(s: &str, from: usize) -> Option<Token<'_>> {
    SHORTCODE.captures_iter(&s[from..]).find_map(|caps| {
        let whole = caps.get(0)?;
        let start = from + whole.start();
        if prev_char(s, start).is_some_and(char::is_alphanumeric) {
            return None;
        }
        let code = caps.get(1)?.as_str();
        Some(Token {
            start,
            end: from + whole.end(),
            kind: TokenKind::Emoji(code),
        })
    })
}

/// Emoticons must stand alone between whitespace.
fn find_emoticon(s: &str, from: usize) -> Option<Token<'_>> {
    let mut best: Option<Token<'_>> = None;
    for &(face, code) in EMOTICONS {
        let found = s[from..]
            .match_indices(face)
            .map(|(rel, _)| from + rel)
            .find(|&start| {
                prev_char(s, start).is_none_or(char::is_whitespace)
                    && next_char(s, start + face.len()).is_none_or(char::is_whitespace)
            });
        if let Some(start) = found
            && best.as_ref().is_none_or(|b| start < b.start)
        {
            best = Some(Token {
                start,
                end: start + face.len(),
                kind: TokenKind::Emoji(code),
            });
        }
    }
    best
}
