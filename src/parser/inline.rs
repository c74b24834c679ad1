//! Inline-level parsing for chat Markdown.
//!
//! A single left-to-right scan: plain characters accumulate in a buffer
//! that is flushed as a text node whenever a construct (emphasis, code,
//! link, break) begins. Anything that fails to parse as a construct stays
//! literal text, so malformed input degrades instead of erroring.

use crate::ast::Inline;
use crate::parser::lexer::{code_span, emphasis_span, strike_span, strong_span};

/// Parse a string of inline content.
pub fn parse_inlines(input: &str) -> Vec<Inline> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut rest = input;

    while let Some(c) = rest.chars().next() {
        if c == '\\' {
            if let Some(next) = rest[1..].chars().next() {
                if is_markup_char(next) {
                    buf.push(next);
                    rest = &rest[1 + next.len_utf8()..];
                    continue;
                }
            }
            buf.push('\\');
            rest = &rest[1..];
            continue;
        }

        if c == '\n' {
            line_break(&mut buf, &mut out);
            rest = &rest[1..];
            continue;
        }

        if let Some((node, remaining)) = scan_construct(rest, &buf) {
            flush_text(&mut buf, &mut out);
            out.push(node);
            rest = remaining;
            continue;
        }

        buf.push(c);
        rest = &rest[c.len_utf8()..];
    }

    flush_text(&mut buf, &mut out);
    out
}

fn flush_text(buf: &mut String, out: &mut Vec<Inline>) {
    if !buf.is_empty() {
        out.push(Inline::Text(std::mem::take(buf)));
    }
}

/// Two trailing spaces or a trailing backslash force a hard break.
fn line_break(buf: &mut String, out: &mut Vec<Inline>) {
    let hard = buf.ends_with("  ") || buf.ends_with('\\');
    if hard {
        while buf.ends_with(' ') || buf.ends_with('\\') {
            buf.pop();
        }
    }
    flush_text(buf, out);
    out.push(if hard {
        Inline::HardBreak
    } else {
        Inline::SoftBreak
    });
}

fn is_markup_char(c: char) -> bool {
    matches!(c, '*' | '_' | '~' | '`' | '[' | ']' | '\\')
}

/// Try to parse a construct starting at `input`. `preceding` is the text
/// accumulated so far on this run, consulted for word-interior underscores.
fn scan_construct<'a>(input: &'a str, preceding: &str) -> Option<(Inline, &'a str)> {
    match input.chars().next()? {
        c @ ('*' | '_') => {
            // A word-interior underscore never opens emphasis; identifiers
            // and placeholder tokens stay intact.
            if c == '_'
                && preceding
                    .chars()
                    .next_back()
                    .is_some_and(char::is_alphanumeric)
            {
                return None;
            }
            // A delimiter followed by whitespace is literal text.
            let run = if input.starts_with("**") || input.starts_with("__") {
                2
            } else {
                1
            };
            if input[run..].chars().next().map_or(true, char::is_whitespace) {
                return None;
            }
            if let Ok((rest, inner)) = strong_span(input) {
                return Some((Inline::Strong(parse_inlines(inner)), rest));
            }
            if let Ok((rest, inner)) = emphasis_span(input) {
                return Some((Inline::Emphasis(parse_inlines(inner)), rest));
            }
            None
        }
        '~' => strike_span(input)
            .ok()
            .map(|(rest, inner)| (Inline::Strikethrough(parse_inlines(inner)), rest)),
        '`' => code_span(input)
            .ok()
            .map(|(rest, code)| (Inline::Code(code.to_string()), rest)),
        '[' => scan_link(input),
        _ => None,
    }
}

/// `[label](target "title")`, with nested brackets in the label and nested
/// parentheses in the target.
fn scan_link(input: &str) -> Option<(Inline, &str)> {
    let label_end = balanced(input, '[', ']')?;
    let label = &input[1..label_end];
    let after = &input[label_end + 1..];
    if !after.starts_with('(') {
        return None;
    }
    let target_end = balanced(after, '(', ')')?;
    let target = after[1..target_end].trim();
    let rest = &after[target_end + 1..];
    let (url, title) = split_title(target);
    Some((
        Inline::Link {
            url: url.to_string(),
            title: title.map(str::to_string),
            content: parse_inlines(label),
        },
        rest,
    ))
}

/// Byte offset of the close delimiter matching the open delimiter at the
/// start of `input`.
fn balanced(input: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in input.char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Split an optional quoted title off a link target.
fn split_title(target: &str) -> (&str, Option<&str>) {
    let Some(open) = target.find('"') else {
        return (target, None);
    };
    match target[open + 1..].rfind('"') {
        Some(close) => (
            target[..open].trim_end(),
            Some(&target[open + 1..open + 1 + close]),
        ),
        None => (target, None),
    }
}
