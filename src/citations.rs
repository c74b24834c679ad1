//! Citation and link extraction.
//!
//! Four passes run in fixed order over the math-protected text, each
//! appending to the same citation list and rewriting what it recognizes into
//! standard `[text](url)` syntax, so the downstream renderer sees every
//! citation uniformly as a link. Later passes search the rewritten output of
//! earlier ones; a span already converted to a standard link is not matched
//! again because the URL-hunting passes only accept bare, non-bracketed URLs.

use once_cell::sync::Lazy;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::{Captures, Regex};
use serde::Serialize;

/// One detected reference: human-readable label and resolved URL.
///
/// The list may contain duplicate URLs from overlapping detections; link
/// resolution at render time uses the first entry with a matching URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CitationLink {
    pub text: String,
    pub link: String,
}

/// Recognized external citation sources, in recognition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Wikipedia,
    ArXiv,
    GitHub,
    Doi,
}

static WIKIPEDIA: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Wikipedia").unwrap());
static WIKIPEDIA_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+[-–—]\s+Wikipedia").unwrap());
static ARXIV_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)arXiv:(\d+\.\d+)").unwrap());
static GITHUB_REPO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)github\.com/[^/]+/[^/\s]+").unwrap());
static GITHUB_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(https?://github\.com/[^/]+/[^/\s]+)").unwrap());
static DOI_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)doi:(\S+)").unwrap());

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Characters percent-encoded in generated Wikipedia URLs. Everything
/// outside `A-Za-z0-9 - _ . ! ~ * ' ( )` is escaped.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

impl SourceKind {
    /// Recognition order: first entry whose pattern matches the source wins.
    pub const ALL: [SourceKind; 4] = [
        SourceKind::Wikipedia,
        SourceKind::ArXiv,
        SourceKind::GitHub,
        SourceKind::Doi,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SourceKind::Wikipedia => "Wikipedia",
            SourceKind::ArXiv => "arXiv",
            SourceKind::GitHub => "GitHub",
            SourceKind::Doi => "DOI",
        }
    }

    fn pattern(&self) -> &'static Regex {
        match self {
            SourceKind::Wikipedia => &WIKIPEDIA,
            SourceKind::ArXiv => &ARXIV_ID,
            SourceKind::GitHub => &GITHUB_REPO,
            SourceKind::Doi => &DOI_ID,
        }
    }

    /// Synthesize the canonical outbound URL for a matched source, or `None`
    /// when no full URL can be isolated.
    fn url_for(&self, title: &str, source: &str) -> Option<String> {
        match self {
            SourceKind::Wikipedia => {
                let topic = WIKIPEDIA_SUFFIX.replace(source, "");
                let term = format!("{title} {topic}");
                let slug = WHITESPACE.replace_all(term.trim(), "_");
                Some(format!(
                    "https://en.wikipedia.org/wiki/{}",
                    utf8_percent_encode(&slug, URI_COMPONENT)
                ))
            }
            SourceKind::ArXiv => ARXIV_ID
                .captures(source)
                .map(|c| format!("https://arxiv.org/abs/{}", &c[1])),
            SourceKind::GitHub => GITHUB_URL.captures(source).map(|c| c[1].to_string()),
            SourceKind::Doi => DOI_ID
                .captures(source)
                .map(|c| format!("https://doi.org/{}", &c[1])),
        }
    }
}

/// Classify a quoted title plus source phrase against the source table.
///
/// First match wins: when a pattern matches but its URL generator comes up
/// empty, classification fails without trying later entries.
pub fn classify_source(title: &str, source: &str) -> Option<CitationLink> {
    for kind in SourceKind::ALL {
        if kind.pattern().is_match(source) {
            return kind.url_for(title, source).map(|url| CitationLink {
                text: format!("{title} - {source}").trim().to_string(),
                link: url,
            });
        }
    }
    None
}

/// Standard `[text](url)` links, nested parentheses allowed in the target.
static STD_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(((?:\([^()]*\)|[^()])*)\)").unwrap());

/// A bracketed label (optionally tagged PDF/DOC/HTML) or a short plain
/// phrase ending in a dash-qualifier or parenthetical, followed by a bare
/// `http(s)://` URL. The URL may sit in square brackets but never in
/// parentheses, so standard links are not re-matched.
static REF_WITH_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:\[(?:(?:\[?(PDF|DOC|HTML)\]?\s+)?([^\]]+))\]|\b([^.!?\n]+?(?:\s+[-–—]\s+\w+|\s+\([^)]+\)))\b)(?:\s*\[\s*|\s+)(https?://[^\s)\]]+)(?:\s*\]|\s|$)",
    )
    .unwrap()
});

/// A double-quoted title followed by a trailing phrase that ends in an
/// attribution (dash + capitalized word, or `word:value`).
static QUOTED_TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""([^"]+)"\s+([^.!?\n]+?\s+[-–—]\s+(?:[A-Z][a-z]+(?:\.[a-z]+)?|\w+:\S+))"#)
        .unwrap()
});

/// Raw URLs pointing at a document file.
static RAW_DOC_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(https?://\S+\.(?:pdf|doc|docx|ppt|pptx|xls|xlsx))\b").unwrap());

/// Run the four extraction passes over `input`.
///
/// Returns the text with every detected citation rewritten to a standard
/// Markdown link, plus the accumulated citation list in detection order.
pub fn extract_citations(input: &str) -> (String, Vec<CitationLink>) {
    let mut citations: Vec<CitationLink> = Vec::new();

    // Pass 1: standard Markdown links, recorded verbatim.
    let text = STD_LINK
        .replace_all(input, |caps: &Captures| {
            citations.push(CitationLink {
                text: caps[1].to_string(),
                link: caps[2].to_string(),
            });
            format!("[{}]({})", &caps[1], &caps[2])
        })
        .into_owned();

    // Pass 2: references followed by bare URLs.
    let text = REF_WITH_URL
        .replace_all(&text, |caps: &Captures| {
            let body = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map(|m| m.as_str())
                .unwrap_or("");
            let label = match caps.get(1) {
                Some(tag) => format!("[{}] {}", tag.as_str(), body),
                None => body.to_string(),
            };
            let label = label.trim().to_string();
            let url = caps[4].trim_end_matches(['.', ',', ';', ':']).to_string();
            citations.push(CitationLink {
                text: label.clone(),
                link: url.clone(),
            });
            format!("[{label}]({url})")
        })
        .into_owned();

    // Pass 3: quoted titles with a recognizable attribution.
    let text = QUOTED_TITLE
        .replace_all(&text, |caps: &Captures| {
            match classify_source(&caps[1], &caps[2]) {
                Some(citation) => {
                    let rewritten = format!("[{}]({})", citation.text, citation.link);
                    citations.push(citation);
                    rewritten
                }
                // Unrecognized sources are left untouched.
                None => caps[0].to_string(),
            }
        })
        .into_owned();

    // Pass 4: bare document URLs, unless an identical URL is already listed.
    for caps in RAW_DOC_URL.captures_iter(&text) {
        let url = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        if citations.iter().any(|c| c.link == url) {
            continue;
        }
        let filename = url.rsplit('/').next().filter(|s| !s.is_empty()).unwrap_or(url);
        citations.push(CitationLink {
            text: filename.to_string(),
            link: url.to_string(),
        });
    }

    log::debug!("extracted {} citation(s)", citations.len());
    (text, citations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_standard_link_recorded_verbatim() {
        let (text, citations) = extract_citations("See [Docs](https://example.com/docs).");
        assert_eq!(text, "See [Docs](https://example.com/docs).");
        assert_eq!(
            citations,
            vec![CitationLink {
                text: "Docs".into(),
                link: "https://example.com/docs".into(),
            }]
        );
    }

    #[test]
    fn test_bracketed_reference_with_bare_url() {
        let (text, citations) =
            extract_citations("[PDF Annual Report] https://example.com/report.pdf ok");
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].text, "[PDF] Annual Report");
        assert_eq!(citations[0].link, "https://example.com/report.pdf");
        assert!(text.contains("[[PDF] Annual Report](https://example.com/report.pdf)"));
    }

    #[test]
    fn test_plain_reference_with_dash_qualifier() {
        let (text, citations) =
            extract_citations("Deep Learning - Goodfellow https://example.com/dl.pdf");
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].text, "Deep Learning - Goodfellow");
        assert!(text.starts_with("[Deep Learning - Goodfellow](https://example.com/dl.pdf)"));
    }

    #[test]
    fn test_trailing_punctuation_stripped_from_url() {
        let (_, citations) = extract_citations("[Notes] https://example.com/notes.html;");
        assert_eq!(citations[0].link, "https://example.com/notes.html");
    }

    #[test]
    fn test_standard_link_not_rematched_by_reference_pass() {
        let (text, citations) = extract_citations("See [Doc](http://x.com/a.pdf) here.");
        assert_eq!(citations.len(), 1);
        assert_eq!(text, "See [Doc](http://x.com/a.pdf) here.");
    }

    #[test]
    fn test_bare_document_url_skipped_when_already_cited() {
        let input = "See [Doc](http://x.com/a.pdf) and also http://x.com/a.pdf in the appendix.";
        let (_, citations) = extract_citations(input);
        let matching: Vec<_> = citations
            .iter()
            .filter(|c| c.link == "http://x.com/a.pdf")
            .collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].text, "Doc");
    }

    #[test]
    fn test_bare_document_url_cited_by_filename() {
        let (text, citations) = extract_citations("Download http://x.com/files/guide.pdf today.");
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].text, "guide.pdf");
        assert_eq!(citations[0].link, "http://x.com/files/guide.pdf");
        // Raw URLs are recorded but the text is left as-is.
        assert_eq!(text, "Download http://x.com/files/guide.pdf today.");
    }

    #[test]
    fn test_quoted_title_classified_as_wikipedia() {
        let input = "\"Rust (programming language)\" article overview - Wikipedia";
        let (text, citations) = extract_citations(input);
        assert_eq!(citations.len(), 1);
        assert_eq!(
            citations[0].text,
            "Rust (programming language) - article overview - Wikipedia"
        );
        assert_eq!(
            citations[0].link,
            "https://en.wikipedia.org/wiki/Rust_(programming_language)_article_overview"
        );
        assert!(text.starts_with('['));
    }

    #[test]
    fn test_quoted_title_without_known_source_untouched() {
        let input = "\"Some Title\" internal memo - Smith";
        let (text, citations) = extract_citations(input);
        assert!(citations.is_empty());
        assert_eq!(text, input);
    }

    #[test]
    fn test_classify_arxiv_attribution() {
        let citation = classify_source("Attention Is All You Need", "paper - arXiv:1706.03762")
            .expect("arXiv source should classify");
        assert_eq!(citation.link, "https://arxiv.org/abs/1706.03762");
        assert_eq!(
            citation.text,
            "Attention Is All You Need - paper - arXiv:1706.03762"
        );
    }

    #[test]
    fn test_classify_doi() {
        let citation = classify_source("A Paper", "journal doi:10.1000/182").unwrap();
        assert_eq!(citation.link, "https://doi.org/10.1000/182");
    }

    #[test]
    fn test_classify_github_full_url() {
        let citation =
            classify_source("regex", "code at https://github.com/rust-lang/regex").unwrap();
        assert_eq!(citation.link, "https://github.com/rust-lang/regex");
    }

    #[test]
    fn test_classification_order_is_fixed() {
        // Wikipedia is checked before arXiv, so a source matching both
        // classifies as Wikipedia.
        let citation = classify_source("T", "arXiv:1234.5678 summary on Wikipedia").unwrap();
        assert!(citation.link.starts_with("https://en.wikipedia.org/wiki/"));

        // Without the Wikipedia marker the same source is a preprint.
        let citation = classify_source("T", "arXiv:1234.5678 summary").unwrap();
        assert_eq!(citation.link, "https://arxiv.org/abs/1234.5678");
    }

    #[test]
    fn test_first_match_is_not_first_success() {
        // The GitHub pattern matches a schemeless repo path, but its URL
        // generator cannot isolate a full URL; classification must fail
        // without falling through to the later DOI entry.
        assert_eq!(
            classify_source("T", "github.com/foo/bar doi:10.1000/182"),
            None
        );
    }

    #[test]
    fn test_source_kind_names() {
        let names: Vec<_> = SourceKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names, vec!["Wikipedia", "arXiv", "GitHub", "DOI"]);
    }
}
