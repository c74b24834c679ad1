//! Typed render tree construction.
//!
//! The builder walks the parsed AST and produces the tree the UI consumes:
//! placeholder tokens are swapped back for math nodes, links are resolved
//! against the citation list, table rows get their striping flags, and every
//! node receives a stable identity key.

use serde::Serialize;
use url::Url;

use crate::ast::{self, Alignment};
use crate::citations::CitationLink;
use crate::interact::FaviconSource;
use crate::latex::{LatexSpan, PLACEHOLDER, PLACEHOLDER_EXACT};
use crate::render::key::KeyGen;

/// Output of one render pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderTree {
    pub blocks: Vec<BlockNode>,
    pub citations: Vec<CitationLink>,
}

/// Block-level render nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BlockNode {
    Paragraph {
        key: String,
        children: Vec<InlineNode>,
    },
    Heading {
        key: String,
        level: u8,
        children: Vec<InlineNode>,
    },
    CodeBlock {
        key: String,
        language: String,
        code: String,
    },
    BlockQuote {
        key: String,
        children: Vec<BlockNode>,
    },
    List {
        key: String,
        ordered: bool,
        start: Option<u32>,
        items: Vec<ListItemNode>,
    },
    Table {
        key: String,
        header: TableSectionNode,
        body: TableSectionNode,
    },
    /// A display equation in its own centered container.
    Math {
        key: String,
        tex: String,
    },
    ThematicBreak {
        key: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListItemNode {
    pub key: String,
    pub children: Vec<BlockNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSectionNode {
    pub key: String,
    pub rows: Vec<TableRowNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRowNode {
    pub key: String,
    /// Alternating-row presentation flag; header rows are never striped.
    pub striped: bool,
    pub cells: Vec<TableCellNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableCellNode {
    pub key: String,
    pub header: bool,
    pub align: Alignment,
    pub children: Vec<InlineNode>,
}

/// Inline-level render nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum InlineNode {
    Text {
        key: String,
        text: String,
    },
    Math {
        key: String,
        tex: String,
        /// Display-mode math standing alone in a text run.
        display: bool,
    },
    /// Numbered interactive citation marker with hover preview.
    Citation {
        key: String,
        /// 1-based position in the citation list.
        index: usize,
        label: String,
        href: String,
        domain: String,
        icon: String,
    },
    /// Interactive preview link for a valid, uncited URL.
    Preview {
        key: String,
        href: String,
        domain: String,
        icon: String,
        children: Vec<InlineNode>,
    },
    /// Plain link for targets that are not valid URLs.
    Link {
        key: String,
        href: String,
        children: Vec<InlineNode>,
    },
    Emphasis {
        key: String,
        children: Vec<InlineNode>,
    },
    Strong {
        key: String,
        children: Vec<InlineNode>,
    },
    Strikethrough {
        key: String,
        children: Vec<InlineNode>,
    },
    Code {
        key: String,
        code: String,
    },
    HardBreak {
        key: String,
    },
}

/// Per-render tree builder. All counters live here, never in statics.
pub(crate) struct TreeBuilder<'a> {
    keys: KeyGen,
    spans: &'a [LatexSpan],
    citations: &'a [CitationLink],
    favicons: &'a dyn FaviconSource,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(
        input: &str,
        spans: &'a [LatexSpan],
        citations: &'a [CitationLink],
        favicons: &'a dyn FaviconSource,
    ) -> Self {
        Self {
            keys: KeyGen::new(input),
            spans,
            citations,
            favicons,
        }
    }

    pub fn build(mut self, blocks: &[ast::Block]) -> Vec<BlockNode> {
        blocks.iter().map(|block| self.block(block)).collect()
    }

    fn find_span(&self, id: &str) -> Option<&'a LatexSpan> {
        self.spans.iter().find(|span| span.id == id)
    }

    fn block(&mut self, block: &ast::Block) -> BlockNode {
        match block {
            ast::Block::Paragraph(inlines) => {
                // A paragraph that is exactly one block-math placeholder
                // renders unwrapped; block equations and paragraph markup
                // are structurally incompatible.
                if let [ast::Inline::Text(text)] = inlines.as_slice() {
                    if PLACEHOLDER_EXACT.is_match(text) {
                        if let Some(span) = self.find_span(text) {
                            if span.is_block {
                                return BlockNode::Math {
                                    key: self.keys.next(),
                                    tex: span.tex().to_string(),
                                };
                            }
                        }
                    }
                }
                let key = self.keys.next();
                let children = self.inlines(inlines);
                BlockNode::Paragraph { key, children }
            }
            ast::Block::Heading { level, content } => {
                let key = self.keys.next();
                let children = self.inlines(content);
                BlockNode::Heading {
                    key,
                    level: *level,
                    children,
                }
            }
            ast::Block::CodeBlock { language, content } => BlockNode::CodeBlock {
                key: self.keys.next(),
                language: language.clone().unwrap_or_else(|| "text".to_string()),
                code: content.clone(),
            },
            ast::Block::BlockQuote(blocks) => {
                let key = self.keys.next();
                let children = blocks.iter().map(|b| self.block(b)).collect();
                BlockNode::BlockQuote { key, children }
            }
            ast::Block::List(list) => {
                let key = self.keys.next();
                let items = list
                    .items
                    .iter()
                    .map(|item| {
                        let key = self.keys.next();
                        let children = item.blocks.iter().map(|b| self.block(b)).collect();
                        ListItemNode { key, children }
                    })
                    .collect();
                BlockNode::List {
                    key,
                    ordered: list.ordered,
                    start: list.start,
                    items,
                }
            }
            ast::Block::ThematicBreak => BlockNode::ThematicBreak {
                key: self.keys.next(),
            },
            ast::Block::Table(table) => self.table(&table.header, &table.alignments, &table.rows),
        }
    }

    fn table(
        &mut self,
        headers: &[Vec<ast::Inline>],
        alignments: &[Alignment],
        rows: &[Vec<Vec<ast::Inline>>],
    ) -> BlockNode {
        let key = self.keys.next();
        // Row parity counter, reset per table. The header row advances it
        // but is itself never striped.
        let mut row_counter = 0usize;

        let header_key = self.keys.next();
        let header_row = self.table_row(headers, alignments, true, &mut row_counter);
        let header = TableSectionNode {
            key: header_key,
            rows: vec![header_row],
        };

        let body_key = self.keys.next();
        let body_rows = rows
            .iter()
            .map(|row| self.table_row(row, alignments, false, &mut row_counter))
            .collect();
        let body = TableSectionNode {
            key: body_key,
            rows: body_rows,
        };

        BlockNode::Table { key, header, body }
    }

    fn table_row(
        &mut self,
        cells: &[Vec<ast::Inline>],
        alignments: &[Alignment],
        header: bool,
        row_counter: &mut usize,
    ) -> TableRowNode {
        let current = *row_counter;
        *row_counter += 1;
        let striped = current > 0 && current % 2 == 0;

        let key = self.keys.next();
        let cells = cells
            .iter()
            .enumerate()
            .map(|(col, cell)| {
                let key = self.keys.next();
                let children = self.inlines(cell);
                TableCellNode {
                    key,
                    header,
                    align: alignments.get(col).copied().unwrap_or_default(),
                    children,
                }
            })
            .collect();

        TableRowNode {
            key,
            striped,
            cells,
        }
    }

    fn inlines(&mut self, inlines: &[ast::Inline]) -> Vec<InlineNode> {
        let mut out = Vec::with_capacity(inlines.len());
        for inline in inlines {
            self.inline(inline, &mut out);
        }
        out
    }

    fn inline(&mut self, inline: &ast::Inline, out: &mut Vec<InlineNode>) {
        match inline {
            ast::Inline::Text(text) => self.text(text, out),
            ast::Inline::Emphasis(content) => {
                let key = self.keys.next();
                let children = self.inlines(content);
                out.push(InlineNode::Emphasis { key, children });
            }
            ast::Inline::Strong(content) => {
                let key = self.keys.next();
                let children = self.inlines(content);
                out.push(InlineNode::Strong { key, children });
            }
            ast::Inline::Strikethrough(content) => {
                let key = self.keys.next();
                let children = self.inlines(content);
                out.push(InlineNode::Strikethrough { key, children });
            }
            ast::Inline::Code(code) => out.push(InlineNode::Code {
                key: self.keys.next(),
                code: code.clone(),
            }),
            ast::Inline::Link { url, content, .. } => {
                let node = self.link(url, content);
                out.push(node);
            }
            ast::Inline::SoftBreak => out.push(InlineNode::Text {
                key: self.keys.next(),
                text: " ".to_string(),
            }),
            ast::Inline::HardBreak => out.push(InlineNode::HardBreak {
                key: self.keys.next(),
            }),
        }
    }

    /// Resolve a link against the citation list, falling back to a preview
    /// for valid uncited URLs and a plain link for anything unparseable.
    fn link(&mut self, href: &str, content: &[ast::Inline]) -> InlineNode {
        let key = self.keys.next();
        let cited = self.citations.iter().position(|c| c.link == href);

        match (cited, Url::parse(href)) {
            (Some(index), Ok(url)) => {
                let domain = url.host_str().unwrap_or_default().to_string();
                InlineNode::Citation {
                    key,
                    index: index + 1,
                    label: self.citations[index].text.clone(),
                    href: href.to_string(),
                    icon: self.favicons.icon_url(&domain),
                    domain,
                }
            }
            (None, Ok(url)) => {
                let domain = url.host_str().unwrap_or_default().to_string();
                let icon = self.favicons.icon_url(&domain);
                let children = self.inlines(content);
                InlineNode::Preview {
                    key,
                    href: href.to_string(),
                    domain,
                    icon,
                    children,
                }
            }
            (_, Err(_)) => {
                let children = self.inlines(content);
                InlineNode::Link {
                    key,
                    href: href.to_string(),
                    children,
                }
            }
        }
    }

    /// Render a text run, swapping placeholder tokens back for math nodes.
    fn text(&mut self, text: &str, out: &mut Vec<InlineNode>) {
        let matches: Vec<regex::Match> = PLACEHOLDER.find_iter(text).collect();

        if matches.is_empty() {
            out.push(InlineNode::Text {
                key: self.keys.next(),
                text: text.to_string(),
            });
            return;
        }

        // The entire run is a single placeholder: render standalone math.
        if matches.len() == 1 && text.trim() == matches[0].as_str() {
            if let Some(span) = self.find_span(matches[0].as_str()) {
                out.push(InlineNode::Math {
                    key: self.keys.next(),
                    tex: span.tex().to_string(),
                    display: span.is_block,
                });
                return;
            }
            // Unknown id: fall through to the mixed handling below, which
            // degrades it to literal text.
        }

        // Placeholders mixed into surrounding text: split into an ordered
        // sequence of text and math parts, preserving whitespace.
        let mut last = 0;
        for (i, m) in matches.iter().enumerate() {
            if m.start() > last {
                out.push(InlineNode::Text {
                    key: self.keys.next_with(&format!("text-{i}")),
                    text: text[last..m.start()].to_string(),
                });
            }
            match self.find_span(m.as_str()) {
                Some(span) => out.push(InlineNode::Math {
                    key: self.keys.next_with(&format!("latex-{i}")),
                    tex: span.tex().to_string(),
                    display: false,
                }),
                None => out.push(InlineNode::Text {
                    key: self.keys.next_with(&format!("fallback-{i}")),
                    text: m.as_str().to_string(),
                }),
            }
            last = m.end();
        }
        if last < text.len() {
            out.push(InlineNode::Text {
                key: self.keys.next_with("remaining"),
                text: text[last..].to_string(),
            });
        }
    }
}
