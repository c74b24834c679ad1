//! Collaborator seams and per-code-block presentational state.
//!
//! The renderer treats the host environment as a set of opaque services:
//! a theme flag, a clipboard, a toast service, and a favicon proxy. All of
//! them are traits so the UI layer supplies the real implementations; the
//! pipeline itself only needs the favicon source.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::ClipboardError;

/// Light/dark mode flag, consulted for code-block color scheme selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Name of the syntax-highlighting color scheme for this theme.
    pub fn code_scheme(&self) -> &'static str {
        match self {
            Theme::Light => "one-light",
            Theme::Dark => "one-dark",
        }
    }
}

/// Clipboard capability. Failures are silent at the call sites.
pub trait Clipboard {
    /// Whether a clipboard is present at all.
    fn is_available(&self) -> bool {
        true
    }

    fn write(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Fire-and-forget user feedback (toasts).
pub trait Notifier {
    fn success(&self, message: &str);
}

/// Resolves a hostname to a small preview icon URL. Broken icons are the
/// UI's problem; no failure path exists here.
pub trait FaviconSource {
    fn icon_url(&self, domain: &str) -> String;
}

/// Default favicon proxy.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoogleFavicons;

impl FaviconSource for GoogleFavicons {
    fn icon_url(&self, domain: &str) -> String {
        format!("https://www.google.com/s2/favicons?domain={domain}&sz=128")
    }
}

/// Presentational state of one rendered code block: line-wrap toggle and a
/// copy acknowledgment that auto-reverts. Neither affects the document
/// model.
#[derive(Debug, Clone)]
pub struct CodeBlockState {
    wrapped: bool,
    copied_at: Option<Instant>,
}

impl CodeBlockState {
    /// How long the copy acknowledgment stays visible.
    pub const COPY_ACK: Duration = Duration::from_secs(2);

    pub fn new(wrapped: bool) -> Self {
        Self {
            wrapped,
            copied_at: None,
        }
    }

    pub fn is_wrapped(&self) -> bool {
        self.wrapped
    }

    pub fn toggle_wrap(&mut self) {
        self.wrapped = !self.wrapped;
    }

    /// Copy `code` to the clipboard and flash the acknowledgment.
    ///
    /// A missing or failing clipboard silently does nothing.
    pub fn copy(&mut self, code: &str, clipboard: &dyn Clipboard, toasts: &dyn Notifier) {
        if !clipboard.is_available() {
            return;
        }
        if clipboard.write(code).is_ok() {
            self.copied_at = Some(Instant::now());
            toasts.success("Copied to clipboard");
        }
    }

    /// Whether the copy acknowledgment is still showing.
    pub fn is_copied(&self) -> bool {
        self.copied_at
            .is_some_and(|at| at.elapsed() < Self::COPY_ACK)
    }
}

impl Default for CodeBlockState {
    fn default() -> Self {
        Self::new(false)
    }
}
