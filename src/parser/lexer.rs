//! nom combinators for the low-level Markdown constructs.
//!
//! Each combinator returns its parsed value directly; the block and inline
//! parsers decide what to do with it.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while1, take_while_m_n},
    character::complete::{char, digit1, none_of, not_line_ending, one_of, space0, space1},
    combinator::{map, peek, verify},
    sequence::{pair, preceded, terminated},
    IResult,
};

/// List item marker kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Marker {
    /// `-`, `*`, or `+`
    Bullet,
    /// `1.` or `1)`, carrying the written number
    Numbered(u32),
}

/// ATX heading: `# text`, up to six hashes, optional closing hashes.
pub fn atx_heading(input: &str) -> IResult<&str, (u8, &str)> {
    let (rest, marks) = take_while_m_n(1, 6, |c| c == '#')(input)?;
    let (rest, _) = space1(rest)?;
    let (rest, text) = not_line_ending(rest)?;
    Ok((rest, (marks.len() as u8, text.trim_end_matches(['#', ' ']))))
}

/// Thematic break: at least three `-`, `*`, or `_` of the same kind.
pub fn rule(input: &str) -> IResult<&str, ()> {
    let (rest, _) = alt((
        verify(take_while1(|c| c == '-'), |s: &str| s.len() >= 3),
        verify(take_while1(|c| c == '*'), |s: &str| s.len() >= 3),
        verify(take_while1(|c| c == '_'), |s: &str| s.len() >= 3),
    ))(input)?;
    let (rest, _) = space0(rest)?;
    Ok((rest, ()))
}

/// Whether a whole line is a thematic break.
pub fn is_rule_line(line: &str) -> bool {
    matches!(rule(line.trim()), Ok(("", ())))
}

/// Code fence opener. Returns the fence marker (needed to find the matching
/// closer) and the trimmed info string.
pub fn fence_open(input: &str) -> IResult<&str, (&str, &str)> {
    let (rest, marker) = alt((tag("```"), tag("~~~")))(input)?;
    let (rest, info) = not_line_ending(rest)?;
    Ok((rest, (marker, info.trim())))
}

/// List item marker; the returned remainder is the item text.
pub fn list_marker(input: &str) -> IResult<&str, Marker> {
    alt((
        map(terminated(one_of("-*+"), space1), |_| Marker::Bullet),
        map(
            terminated(pair(digit1, one_of(".)")), space1),
            |(num, _): (&str, char)| Marker::Numbered(num.parse().unwrap_or(1)),
        ),
    ))(input)
}

/// Backtick code span; the opener must not be a fence.
pub fn code_span(input: &str) -> IResult<&str, &str> {
    preceded(
        pair(char('`'), peek(none_of("`"))),
        terminated(take_until("`"), char('`')),
    )(input)
}

/// `**strong**` or `__strong__`, returning the inner text.
pub fn strong_span(input: &str) -> IResult<&str, &str> {
    alt((
        preceded(tag("**"), terminated(take_until("**"), tag("**"))),
        preceded(tag("__"), terminated(take_until("__"), tag("__"))),
    ))(input)
}

/// `*emphasis*` or `_emphasis_`, returning the inner text.
pub fn emphasis_span(input: &str) -> IResult<&str, &str> {
    alt((
        preceded(
            pair(char('*'), peek(none_of("*"))),
            terminated(take_until("*"), char('*')),
        ),
        preceded(
            pair(char('_'), peek(none_of("_"))),
            terminated(take_until("_"), char('_')),
        ),
    ))(input)
}

/// `~~strikethrough~~`, returning the inner text.
pub fn strike_span(input: &str) -> IResult<&str, &str> {
    preceded(tag("~~"), terminated(take_until("~~"), tag("~~")))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atx_heading() {
        assert_eq!(atx_heading("# Hello World"), Ok(("", (1, "Hello World"))));
        assert_eq!(atx_heading("### Level 3 ###"), Ok(("", (3, "Level 3"))));
        assert!(atx_heading("#nospace").is_err());
        // Seven hashes is not a heading.
        assert!(atx_heading("####### too deep").is_err());
    }

    #[test]
    fn test_rule_lines() {
        assert!(is_rule_line("---"));
        assert!(is_rule_line("*****"));
        assert!(is_rule_line("  ___  "));
        assert!(!is_rule_line("-- -"));
        assert!(!is_rule_line("- item"));
    }

    #[test]
    fn test_fence_open() {
        assert_eq!(fence_open("```rust"), Ok(("", ("```", "rust"))));
        assert_eq!(fence_open("```"), Ok(("", ("```", ""))));
        assert_eq!(fence_open("~~~ text "), Ok(("", ("~~~", "text"))));
        assert!(fence_open("``not a fence").is_err());
    }

    #[test]
    fn test_list_marker() {
        assert_eq!(list_marker("- item"), Ok(("item", Marker::Bullet)));
        assert_eq!(list_marker("+ item"), Ok(("item", Marker::Bullet)));
        assert_eq!(list_marker("3. item"), Ok(("item", Marker::Numbered(3))));
        assert_eq!(list_marker("12) item"), Ok(("item", Marker::Numbered(12))));
        assert!(list_marker("-no space").is_err());
    }

    #[test]
    fn test_code_span() {
        assert_eq!(code_span("`let x = 1;` rest"), Ok((" rest", "let x = 1;")));
        assert!(code_span("``fenced").is_err());
    }

    #[test]
    fn test_emphasis_and_strong() {
        assert_eq!(strong_span("**bold** rest"), Ok((" rest", "bold")));
        assert_eq!(strong_span("__bold__"), Ok(("", "bold")));
        assert_eq!(emphasis_span("*it* rest"), Ok((" rest", "it")));
        assert!(emphasis_span("**bold**").is_err());
    }

    #[test]
    fn test_strike_span() {
        assert_eq!(strike_span("~~old~~ new"), Ok((" new", "old")));
        assert!(strike_span("~single~").is_err());
    }
}
