//! # citemark
//!
//! A Markdown rendering pipeline for AI chat messages: LaTeX protection,
//! citation extraction, and typed render trees.
//!
//! ## Features
//!
//! - **Math protection**: inline `$...$`/`\(...\)` and display
//!   `$$...$$`/`\[...\]` spans are shielded behind placeholder tokens before
//!   any other processing, so equations containing brackets or parentheses
//!   are never misread as links. Currency figures like `$12.50` are left
//!   alone.
//! - **Citation extraction**: standard Markdown links, bracketed references
//!   followed by bare URLs, quoted titles attributed to a recognized source
//!   (Wikipedia, arXiv, GitHub, DOI), and raw document URLs all become
//!   numbered citations with canonical outbound links.
//! - **Typed render tree**: paragraphs, headings, lists, blockquotes,
//!   tables with striping flags, code blocks, math nodes, and interactive
//!   citation/preview links, each with a stable identity key. The tree is a
//!   plain serializable value for a UI layer to consume.
//!
//! ## Quick Start
//!
//! ```rust
//! use citemark::render;
//!
//! let tree = render(
//!     "# Intro\n\nThe equation $E = mc^2$ is famous. See [docs](https://example.com/docs).",
//! );
//!
//! assert_eq!(tree.citations.len(), 1);
//! assert!(!tree.blocks.is_empty());
//! ```
//!
//! ## Pipeline
//!
//! Data flows one way through a single synchronous pass:
//!
//! 1. math spans → placeholder tokens ([`latex::protect_math`])
//! 2. citation detection and link normalization
//!    ([`citations::extract_citations`])
//! 3. block/inline parsing ([`parser::parse_blocks`])
//! 4. tree construction with placeholder restoration, citation resolution,
//!    and key assignment
//!
//! All per-render state (key sequence, table row parity) lives in the
//! render invocation, so concurrent renders of different documents are
//! fully independent. Rendering never fails: malformed math, unmatched
//! citations, and invalid URLs degrade to plainer output instead of
//! erroring.
//!
//! ## Configuration
//!
//! [`RenderOptions`] holds the presentation knobs (theme, code line
//! numbers, initial wrap state) and loads from TOML:
//!
//! ```rust
//! use citemark::{RenderOptions, Renderer, Theme};
//!
//! let options = RenderOptions::from_toml_str("theme = \"dark\"").unwrap();
//! assert_eq!(options.theme, Theme::Dark);
//!
//! let tree = Renderer::with_options(options).render("Price: $12.50");
//! assert_eq!(tree.citations.len(), 0);
//! ```
//!
//! The host environment is reached through traits ([`interact::Clipboard`],
//! [`interact::Notifier`], [`interact::FaviconSource`]); the crate ships a
//! default favicon proxy and leaves the rest to the UI.

pub mod ast;
pub mod citations;
pub mod error;
pub mod interact;
pub mod latex;
pub mod parser;
pub mod render;

// Convenience re-exports
pub use citations::{classify_source, extract_citations, CitationLink, SourceKind};
pub use error::{ClipboardError, Error, OptionsError, Result};
pub use interact::{Clipboard, CodeBlockState, FaviconSource, GoogleFavicons, Notifier, Theme};
pub use latex::{protect_math, LatexSpan};
pub use render::{BlockNode, InlineNode, RenderOptions, RenderTree};

/// Renders chat Markdown into [`RenderTree`]s.
pub struct Renderer {
    options: RenderOptions,
    favicons: Box<dyn interact::FaviconSource>,
}

impl Renderer {
    /// Create a renderer with default options.
    pub fn new() -> Self {
        Self::with_options(RenderOptions::default())
    }

    /// Create a renderer with the given options.
    pub fn with_options(options: RenderOptions) -> Self {
        Self {
            options,
            favicons: Box::new(interact::GoogleFavicons),
        }
    }

    /// Replace the favicon proxy used for preview icons.
    pub fn favicon_source(mut self, favicons: impl interact::FaviconSource + 'static) -> Self {
        self.favicons = Box::new(favicons);
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Run the full pipeline over one document.
    ///
    /// The same input always produces the same tree, identity keys
    /// included.
    pub fn render(&self, input: &str) -> RenderTree {
        let nonce = render::content_hash(input) as u32;
        let (protected, spans) = latex::protect_math(input, nonce);
        let (normalized, citations) = citations::extract_citations(&protected);
        let blocks = parser::parse_blocks(&normalized);
        let blocks =
            render::TreeBuilder::new(input, &spans, &citations, self.favicons.as_ref())
                .build(&blocks);
        RenderTree { blocks, citations }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Render one document with default options.
pub fn render(input: &str) -> RenderTree {
    Renderer::new().render(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_text(nodes: &[InlineNode], out: &mut String) {
        for node in nodes {
            match node {
                InlineNode::Text { text, .. } => out.push_str(text),
                InlineNode::Emphasis { children, .. }
                | InlineNode::Strong { children, .. }
                | InlineNode::Strikethrough { children, .. }
                | InlineNode::Preview { children, .. }
                | InlineNode::Link { children, .. } => collect_text(children, out),
                InlineNode::Code { code, .. } => out.push_str(code),
                _ => {}
            }
        }
    }

    fn visible_text(tree: &RenderTree) -> String {
        let mut out = String::new();
        for block in &tree.blocks {
            match block {
                BlockNode::Paragraph { children, .. }
                | BlockNode::Heading { children, .. } => collect_text(children, &mut out),
                _ => {}
            }
        }
        out
    }

    #[test]
    fn test_determinism() {
        let input = "# T\n\n$E=mc^2$ and [a](https://example.com/x.pdf)\n\n| A |\n| - |\n| 1 |";
        assert_eq!(render(input), render(input));
    }

    #[test]
    fn test_block_math_round_trip() {
        let tree = render("Some prose.\n\n$$x^2$$\n\nMore prose.");
        assert_eq!(tree.blocks.len(), 3);
        assert!(matches!(
            &tree.blocks[1],
            BlockNode::Math { tex, .. } if tex == "x^2"
        ));
        // No delimiter leakage into the visible text.
        let text = visible_text(&tree);
        assert!(!text.contains("$$"));
        assert!(text.contains("Some prose."));
        assert!(text.contains("More prose."));
    }

    #[test]
    fn test_currency_produces_no_math() {
        let tree = render("Price: $12.50");
        assert_eq!(tree.blocks.len(), 1);
        let BlockNode::Paragraph { children, .. } = &tree.blocks[0] else {
            panic!("Expected paragraph");
        };
        assert!(matches!(
            children.as_slice(),
            [InlineNode::Text { text, .. }] if text == "Price: $12.50"
        ));
    }

    #[test]
    fn test_citation_precedence_dedup() {
        let input = "See [Doc](http://x.com/a.pdf) and also http://x.com/a.pdf in the appendix.";
        let tree = render(input);
        let matching: Vec<_> = tree
            .citations
            .iter()
            .filter(|c| c.link == "http://x.com/a.pdf")
            .collect();
        assert_eq!(matching.len(), 1);

        // The link renders as citation #1.
        let BlockNode::Paragraph { children, .. } = &tree.blocks[0] else {
            panic!("Expected paragraph");
        };
        assert!(children
            .iter()
            .any(|n| matches!(n, InlineNode::Citation { index: 1, .. })));
    }

    #[test]
    fn test_unterminated_inline_math_degrades() {
        let tree = render("text $x^2 more text");
        let text = visible_text(&tree);
        assert_eq!(text, "text $x^2 more text");
    }

    #[test]
    fn test_quoted_arxiv_title_becomes_citation() {
        let tree = render("\"Attention Is All You Need\" paper - arXiv:1706.03762 changed it.");
        assert_eq!(tree.citations.len(), 1);
        assert_eq!(tree.citations[0].link, "https://arxiv.org/abs/1706.03762");
        let BlockNode::Paragraph { children, .. } = &tree.blocks[0] else {
            panic!("Expected paragraph");
        };
        assert!(children
            .iter()
            .any(|n| matches!(n, InlineNode::Citation { index: 1, .. })));
    }

    #[test]
    fn test_full_pipeline() {
        let input = r#"# Results

The bound \(O(n \log n)\) holds. **Details** in [the paper](https://example.com/p.pdf).

- first
- second

```rust
fn main() {}
```

$$\int_0^1 x\,dx = \frac{1}{2}$$
"#;
        let tree = render(input);

        assert!(matches!(&tree.blocks[0], BlockNode::Heading { level: 1, .. }));
        assert_eq!(tree.citations.len(), 1);
        assert!(tree
            .blocks
            .iter()
            .any(|b| matches!(b, BlockNode::List { ordered: false, .. })));
        assert!(tree.blocks.iter().any(
            |b| matches!(b, BlockNode::CodeBlock { language, .. } if language == "rust")
        ));
        assert!(tree
            .blocks
            .iter()
            .any(|b| matches!(b, BlockNode::Math { tex, .. } if tex.contains("\\int"))));

        // The inline equation survives as an inline math node.
        let BlockNode::Paragraph { children, .. } = &tree.blocks[1] else {
            panic!("Expected paragraph");
        };
        assert!(children.iter().any(
            |n| matches!(n, InlineNode::Math { tex, display, .. } if tex.contains("\\log") && !display)
        ));
    }

    #[test]
    fn test_renderer_options_reach_code_state() {
        let options = RenderOptions {
            wrap_code: true,
            ..RenderOptions::default()
        };
        let renderer = Renderer::with_options(options);
        let state = CodeBlockState::new(renderer.options().wrap_code);
        assert!(state.is_wrapped());
        assert_eq!(renderer.options().theme.code_scheme(), "one-light");
    }
}
