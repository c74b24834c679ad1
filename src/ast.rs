//! Parsed chat Markdown.
//!
//! The intermediate form between the text pipeline (math protection,
//! citation extraction) and the typed render tree. Math placeholders travel
//! through it as plain [`Inline::Text`]; citations arrive as ordinary links.

use serde::Serialize;

/// Block-level content.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(Vec<Inline>),

    /// ATX heading, level 1-6.
    Heading { level: u8, content: Vec<Inline> },

    /// Fenced code, with the info-string language if one was given.
    CodeBlock {
        language: Option<String>,
        content: String,
    },

    BlockQuote(Vec<Block>),

    List(List),

    Table(Table),

    /// Horizontal rule.
    ThematicBreak,
}

/// An ordered or unordered list.
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub ordered: bool,
    /// First item number, for ordered lists not starting at 1.
    pub start: Option<u32>,
    pub items: Vec<ListItem>,
}

/// One list item. Item content is block-level, so items can hold
/// paragraphs, code, or nested lists.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub blocks: Vec<Block>,
}

/// A pipe table: header row, per-column alignments, body rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub header: Vec<Vec<Inline>>,
    pub alignments: Vec<Alignment>,
    pub rows: Vec<Vec<Vec<Inline>>>,
}

/// Table column alignment, read off the delimiter row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Inline content within a block.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(String),

    /// `*italic*` or `_italic_`
    Emphasis(Vec<Inline>),

    /// `**bold**` or `__bold__`
    Strong(Vec<Inline>),

    /// `~~struck~~`
    Strikethrough(Vec<Inline>),

    /// Backtick code span.
    Code(String),

    Link {
        url: String,
        title: Option<String>,
        content: Vec<Inline>,
    },

    SoftBreak,

    /// Forced by two trailing spaces or a trailing backslash.
    HardBreak,
}
