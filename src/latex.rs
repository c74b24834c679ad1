//! LaTeX protection: swap math spans for opaque placeholder tokens.
//!
//! Math is extracted before citation and link detection so that equations
//! containing brackets or parentheses are never misread as Markdown links.
//! Each span is replaced by a `LATEX_<seq>_<nonce>` token; block equations
//! are additionally wrapped in blank lines so the block parser sees them as
//! standalone paragraphs. The render stage looks the tokens back up by id.

use once_cell::sync::Lazy;
use regex::Regex;

/// One protected math span.
#[derive(Debug, Clone, PartialEq)]
pub struct LatexSpan {
    /// Placeholder token substituted into the text.
    pub id: String,
    /// Original source, delimiters included.
    pub content: String,
    /// Display-mode (`$$...$$`, `\[...\]`) vs inline (`$...$`, `\(...\)`).
    pub is_block: bool,
}

impl LatexSpan {
    /// The TeX source with its delimiters stripped.
    pub fn tex(&self) -> &str {
        let c = self.content.as_str();
        for (open, close) in [("$$", "$$"), ("\\[", "\\]"), ("\\(", "\\)"), ("$", "$")] {
            if c.len() >= open.len() + close.len() && c.starts_with(open) && c.ends_with(close) {
                return c[open.len()..c.len() - close.len()].trim();
            }
        }
        c
    }
}

static BLOCK_BRACKET: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\\\[.*?\\\]").unwrap());
static BLOCK_DOLLAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\$\$.*?\$\$").unwrap());
static INLINE_PAREN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\\\(.*?\\\)").unwrap());

/// Matches when the rest of the input after a `$` is nothing but a bare
/// number, i.e. a currency figure rather than math.
static CURRENCY_TAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\A\s*[0-9]+[.,\s]*[0-9]*\s*\z").unwrap());

/// A placeholder token anywhere in a text run.
pub(crate) static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"LATEX_\d+_\d+").unwrap());

/// A text run consisting of exactly one placeholder token.
pub(crate) static PLACEHOLDER_EXACT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\ALATEX_\d+_\d+\z").unwrap());

/// Replace every math span in `input` with a placeholder token.
///
/// Block patterns are scanned first (`\[...\]`, then `$$...$$`), then inline
/// patterns (`\(...\)`, then `$...$` with the currency exclusion). `nonce`
/// keeps tokens for repeated identical equations distinct within a render.
pub fn protect_math(input: &str, nonce: u32) -> (String, Vec<LatexSpan>) {
    let mut spans: Vec<LatexSpan> = Vec::new();
    let mut text = input.to_string();

    for pattern in [&*BLOCK_BRACKET, &*BLOCK_DOLLAR] {
        text = pattern
            .replace_all(&text, |caps: &regex::Captures| {
                let id = format!("LATEX_{}_{}", spans.len(), nonce);
                spans.push(LatexSpan {
                    id: id.clone(),
                    content: caps[0].to_string(),
                    is_block: true,
                });
                // Block equations must sit on their own lines.
                format!("\n\n{id}\n\n")
            })
            .into_owned();
    }

    text = INLINE_PAREN
        .replace_all(&text, |caps: &regex::Captures| {
            let id = format!("LATEX_{}_{}", spans.len(), nonce);
            spans.push(LatexSpan {
                id: id.clone(),
                content: caps[0].to_string(),
                is_block: false,
            });
            id
        })
        .into_owned();

    let text = replace_inline_dollars(&text, nonce, &mut spans);

    log::debug!("protected {} math span(s)", spans.len());
    (text, spans)
}

fn replace_inline_dollars(text: &str, nonce: u32, spans: &mut Vec<LatexSpan>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    while let Some((start, end)) = find_inline_dollar(text, pos) {
        out.push_str(&text[pos..start]);
        let id = format!("LATEX_{}_{}", spans.len(), nonce);
        spans.push(LatexSpan {
            id: id.clone(),
            content: text[start..end].to_string(),
            is_block: false,
        });
        out.push_str(&id);
        pos = end;
    }
    out.push_str(&text[pos..]);
    out
}

/// Find the next `$...$` span at or after `from`.
///
/// Exclusions: an opening `$` whose remaining input is just a bare number is
/// currency, not math; a closing `$` directly followed by a digit does not
/// terminate a span (an escaped `\$` before the digit is skipped instead,
/// and a bare one aborts the candidate).
fn find_inline_dollar(text: &str, mut from: usize) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();
    while from < text.len() {
        let open = from + text[from..].find('$')?;
        if CURRENCY_TAIL.is_match(&text[open + 1..]) {
            from = open + 1;
            continue;
        }

        let mut j = open + 1;
        let mut close = None;
        while let Some(k) = text[j..].find('$') {
            let dollar = j + k;
            let digit_follows = bytes
                .get(dollar + 1)
                .is_some_and(|b| b.is_ascii_digit());
            if !digit_follows {
                close = Some(dollar);
                break;
            }
            if dollar > open + 1 && bytes[dollar - 1] == b'\\' {
                j = dollar + 1;
                continue;
            }
            break;
        }

        match close {
            Some(c) => return Some((open, c + 1)),
            None => from = open + 1,
        }
    }
    None
}
