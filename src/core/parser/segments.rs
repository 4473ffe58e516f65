//! Segmentation: split message text into prose and fenced code blocks.

/// Segment of a message: prose or a fenced code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    Text(&'a str),
    Code { lang: &'a str, code: &'a str },
}

/// Split text into prose and code segments.
/// Matches ```lang ... ``` or ``` ... ``` opened at the start of a line;
/// an unclosed fence runs to the end.
/// The newline that separates prose from a fence belongs to the fence.
pub(crate) fn split_segments(content: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = content;
    let mut after_fence = false;
    loop {
        match find_opening_fence(rest) {
            None => {
                let text = if after_fence {
                    rest.strip_prefix('\n').unwrap_or(rest)
                } else {
                    rest
                };
                if !text.is_empty() {
                    segments.push(Segment::Text(text));
                }
                break;
            }
            Some(idx) => {
                let mut text = &rest[..idx];
                if after_fence {
                    text = text.strip_prefix('\n').unwrap_or(text);
                }
                text = text.strip_suffix('\n').unwrap_or(text);
                if !text.is_empty() {
                    segments.push(Segment::Text(text));
                }
                rest = &rest[idx + 3..];
                let lang_end = rest.find('\n').unwrap_or(rest.len());
                let lang = rest[..lang_end].trim();
                rest = if lang_end < rest.len() {
                    &rest[lang_end + 1..]
                } else {
                    ""
                };
                // Closing ``` on its own line, or right after the code.
                let end = rest.find("\n```").or_else(|| rest.find("```"));
                match end {
                    Some(pos) => {
                        let (code, after) =
                            if rest.get(pos..).is_some_and(|s| s.starts_with("\n```")) {
                                (&rest[..pos], &rest[pos + 4..])
                            } else {
                                (&rest[..pos], &rest[pos + 3..])
                            };
                        segments.push(Segment::Code { lang, code });
                        rest = after;
                        after_fence = true;
                    }
                    None => {
                        segments.push(Segment::Code { lang, code: rest });
                        break;
                    }
                }
            }
        }
    }
    segments
}

/// First ``` that starts a line.
fn find_opening_fence(s: &str) -> Option<usize> {
    s.match_indices("```")
        .map(|(idx, _)| idx)
        .find(|&idx| idx == 0 || s[..idx].ends_with('\n'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_has_no_segments() {
        assert!(split_segments("").is_empty());
    }

    #[test]
    fn prose_only() {
        assert_eq!(split_segments("Hello world"), vec![Segment::Text("Hello world")]);
    }

    #[test]
    fn single_fence_with_language() {
        assert_eq!(
            split_segments("```rust\nfn main() {}\n```"),
            vec![Segment::Code {
                lang: "rust",
                code: "fn main() {}"
            }]
        );
    }

    #[test]
    fn unclosed_fence_runs_to_end() {
        assert_eq!(
            split_segments("```rust\nfn main() {"),
            vec![Segment::Code {
                lang: "rust",
                code: "fn main() {"
            }]
        );
    }

    #[test]
    fn separating_newlines_belong_to_the_fence() {
        let segs = split_segments("Here is the fix:\n\n```rust\nlet x = 1;\n```\n\nDone.");
        assert_eq!(
            segs,
            vec![
                Segment::Text("Here is the fix:\n"),
                Segment::Code {
                    lang: "rust",
                    code: "let x = 1;"
                },
                Segment::Text("\nDone."),
            ]
        );
    }

    #[test]
    fn mid_line_backticks_are_prose() {
        assert_eq!(
            split_segments("use ```this``` inline"),
            vec![Segment::Text("use ```this``` inline")]
        );
    }

    #[test]
    fn adjacent_fences() {
        let segs = split_segments("```a\n1\n```\n```b\n2\n```");
        assert_eq!(
            segs,
            vec![
                Segment::Code { lang: "a", code: "1" },
                Segment::Code { lang: "b", code: "2" },
            ]
        );
    }
}
