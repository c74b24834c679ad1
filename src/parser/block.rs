//! Block-level parsing for chat Markdown.
//!
//! The document is split into lines once; each block parser inspects the
//! head of the remaining line slice and, on success, returns the block plus
//! the lines left over. Whatever nothing else claims becomes a paragraph,
//! so parsing is total.

use crate::ast::{Alignment, Block, Inline, List, ListItem, Table};
use crate::parser::inline::parse_inlines;
use crate::parser::lexer::{atx_heading, fence_open, is_rule_line, list_marker, Marker};

type Parsed<'a> = Option<(Block, &'a [&'a str])>;

/// Parse a whole document into blocks.
pub fn parse_blocks(input: &str) -> Vec<Block> {
    let lines: Vec<&str> = input.lines().collect();
    let mut rest: &[&str] = &lines;
    let mut blocks = Vec::new();

    while let Some((&line, tail)) = rest.split_first() {
        if line.trim().is_empty() {
            rest = tail;
            continue;
        }
        let (block, remaining) = heading_block(rest)
            .or_else(|| rule_block(rest))
            .or_else(|| fence_block(rest))
            .or_else(|| quote_block(rest))
            .or_else(|| list_block(rest))
            .or_else(|| table_block(rest))
            .unwrap_or_else(|| paragraph_block(rest));
        blocks.push(block);
        rest = remaining;
    }

    blocks
}

fn heading_block<'a>(lines: &'a [&'a str]) -> Parsed<'a> {
    let (_, (level, text)) = atx_heading(lines[0].trim_start()).ok()?;
    Some((
        Block::Heading {
            level,
            content: parse_inlines(text),
        },
        &lines[1..],
    ))
}

fn rule_block<'a>(lines: &'a [&'a str]) -> Parsed<'a> {
    is_rule_line(lines[0]).then(|| (Block::ThematicBreak, &lines[1..]))
}

fn fence_block<'a>(lines: &'a [&'a str]) -> Parsed<'a> {
    let (_, (marker, info)) = fence_open(lines[0].trim_start()).ok()?;
    let body = &lines[1..];
    let close = body
        .iter()
        .position(|line| line.trim_start().starts_with(marker));
    // An unclosed fence runs to the end of the document.
    let taken = close.unwrap_or(body.len());
    let block = Block::CodeBlock {
        language: info.split_whitespace().next().map(str::to_string),
        content: body[..taken].join("\n"),
    };
    let rest = match close {
        Some(at) => &body[at + 1..],
        None => &[],
    };
    Some((block, rest))
}

fn quote_block<'a>(lines: &'a [&'a str]) -> Parsed<'a> {
    lines[0].trim_start().starts_with('>').then_some(())?;

    let mut inner = Vec::new();
    for line in lines {
        let Some(stripped) = line.trim_start().strip_prefix('>') else {
            break;
        };
        inner.push(stripped.strip_prefix(' ').unwrap_or(stripped));
    }
    let taken = inner.len();
    Some((
        Block::BlockQuote(parse_blocks(&inner.join("\n"))),
        &lines[taken..],
    ))
}

fn list_block<'a>(lines: &'a [&'a str]) -> Parsed<'a> {
    let indent = indent_of(lines[0]);
    let (_, first) = list_marker(lines[0].trim_start()).ok()?;

    let mut items = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let text = lines[i].trim_start();

        if text.is_empty() {
            // A blank line ends the list unless another item of the same
            // kind follows.
            match skip_blank(&lines[i..]) {
                Some(j) if continues_list(lines[i + j], indent, first) => {
                    i += j;
                    continue;
                }
                _ => break,
            }
        }

        let item_head = match list_marker(text) {
            Ok((head, m)) if indent_of(lines[i]) <= indent && same_kind(m, first) => head,
            _ => break,
        };

        // The item owns its marker line plus any deeper-indented
        // continuation lines.
        let mut body = vec![item_head];
        i += 1;
        while i < lines.len() {
            let line = lines[i];
            if line.trim().is_empty() {
                match skip_blank(&lines[i..]) {
                    Some(j) if indent_of(lines[i + j]) > indent => {
                        body.push("");
                        i += 1;
                    }
                    _ => break,
                }
            } else if indent_of(line) > indent {
                body.push(line.trim_start());
                i += 1;
            } else {
                break;
            }
        }
        items.push(ListItem {
            blocks: parse_blocks(&body.join("\n")),
        });
    }

    if items.is_empty() {
        return None;
    }
    let (ordered, start) = match first {
        Marker::Numbered(n) => (true, Some(n)),
        Marker::Bullet => (false, None),
    };
    Some((
        Block::List(List {
            ordered,
            start,
            items,
        }),
        &lines[i..],
    ))
}

/// Offset of the next non-blank line, if any.
fn skip_blank(lines: &[&str]) -> Option<usize> {
    lines.iter().position(|line| !line.trim().is_empty())
}

fn continues_list(line: &str, indent: usize, first: Marker) -> bool {
    indent_of(line) <= indent
        && matches!(list_marker(line.trim_start()), Ok((_, m)) if same_kind(m, first))
}

fn same_kind(a: Marker, b: Marker) -> bool {
    matches!(
        (a, b),
        (Marker::Bullet, Marker::Bullet) | (Marker::Numbered(_), Marker::Numbered(_))
    )
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

fn table_block<'a>(lines: &'a [&'a str]) -> Parsed<'a> {
    if lines.len() < 2 || !lines[0].contains('|') || !is_delimiter_row(lines[1]) {
        return None;
    }

    let header = row_inlines(lines[0]);
    let alignments = split_cells(lines[1]).map(column_alignment).collect();
    let rows: Vec<_> = lines[2..]
        .iter()
        .take_while(|line| line.contains('|') && !line.trim().is_empty())
        .map(|line| row_inlines(line))
        .collect();

    let rest = &lines[2 + rows.len()..];
    Some((
        Block::Table(Table {
            header,
            alignments,
            rows,
        }),
        rest,
    ))
}

fn split_cells(line: &str) -> impl Iterator<Item = &str> {
    line.trim().trim_matches('|').split('|').map(str::trim)
}

fn row_inlines(line: &str) -> Vec<Vec<Inline>> {
    split_cells(line).map(parse_inlines).collect()
}

/// A delimiter row is all `-`/`:` cells, at least one of them non-empty.
fn is_delimiter_row(line: &str) -> bool {
    let mut dashes = 0;
    for cell in split_cells(line) {
        if cell.is_empty() {
            continue;
        }
        if !cell.contains('-') || cell.chars().any(|c| c != '-' && c != ':') {
            return false;
        }
        dashes += 1;
    }
    dashes > 0 && line.contains('|')
}

fn column_alignment(cell: &str) -> Alignment {
    match (cell.starts_with(':'), cell.ends_with(':')) {
        (true, true) => Alignment::Center,
        (false, true) => Alignment::Right,
        _ => Alignment::Left,
    }
}

fn paragraph_block<'a>(lines: &'a [&'a str]) -> (Block, &'a [&'a str]) {
    let taken = lines
        .iter()
        .skip(1)
        .position(|line| {
            let text = line.trim();
            text.is_empty() || opens_block(text)
        })
        .map_or(lines.len(), |at| at + 1);
    (
        Block::Paragraph(parse_inlines(&lines[..taken].join("\n"))),
        &lines[taken..],
    )
}

/// Whether a line would start a non-paragraph block, ending the paragraph
/// before it.
fn opens_block(text: &str) -> bool {
    atx_heading(text).is_ok()
        || is_rule_line(text)
        || fence_open(text).is_ok()
        || text.starts_with('>')
        || list_marker(text).is_ok()
}
