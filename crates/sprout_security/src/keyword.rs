//! Keyword deny-list layer.

use crate::{LayerOutcome, SafetyLayer};
use async_trait::async_trait;
use regex::Regex;
use sprout_core::{SafetyVerdict, VerdictSource};
use sprout_error::{SafetyError, SafetyErrorKind, SproutResult};
use tracing::{debug, instrument};

/// Built-in deny-list terms.
///
/// Matching is by case-insensitive substring, so none of these may occur
/// inside ordinary words ("kill" would match "skills").
pub const DEFAULT_DENY_LIST: &[&str] = &[
    "violence",
    "violent",
    "weapon",
    "firearm",
    "killing",
    "murder",
    "bloodshed",
    "gore",
    "drug",
    "alcohol",
    "cocaine",
    "suicide",
    "self-harm",
    "self harm",
    "sexual",
    "porn",
    "gambling",
    "hatred",
    "racist",
    "abuse",
    "terrorism",
    "terrorist",
];

/// First classifier layer: flags any text containing a deny-listed term.
///
/// A match is authoritative. The layer never returns [`LayerOutcome::Continue`]
/// for text that contains a term, whatever the child's age.
#[derive(Debug, Clone)]
pub struct KeywordLayer {
    keywords: Vec<String>,
    pattern: Regex,
}

impl KeywordLayer {
    /// Layer over the built-in list plus `extra` terms.
    ///
    /// Extra terms are trimmed and lowercased; blanks and duplicates are
    /// ignored.
    pub fn new<I, S>(extra: I) -> SproutResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keywords: Vec<String> = DEFAULT_DENY_LIST.iter().map(|k| k.to_string()).collect();
        for term in extra {
            let term = term.as_ref().trim().to_lowercase();
            if !term.is_empty() && !keywords.contains(&term) {
                keywords.push(term);
            }
        }

        // Longest first so "self-harm" wins over any shorter term it contains.
        let mut alternatives: Vec<&String> = keywords.iter().collect();
        alternatives.sort_by_key(|k| std::cmp::Reverse(k.len()));
        let source = format!(
            "(?i)(?:{})",
            alternatives
                .iter()
                .map(|k| regex::escape(k))
                .collect::<Vec<_>>()
                .join("|")
        );

        let pattern = Regex::new(&source).map_err(|e| {
            SafetyError::new(SafetyErrorKind::Configuration(format!(
                "Invalid deny-list pattern: {}",
                e
            )))
        })?;

        debug!(keyword_count = keywords.len(), "Built keyword layer");
        Ok(Self { keywords, pattern })
    }

    /// Layer over the built-in list only.
    pub fn with_defaults() -> SproutResult<Self> {
        Self::new(std::iter::empty::<&str>())
    }

    /// Active deny-list terms.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Deny-listed terms found in `text`, lowercased, each reported once in
    /// order of first appearance.
    pub fn matches(&self, text: &str) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        for m in self.pattern.find_iter(text) {
            let term = m.as_str().to_lowercase();
            if !found.contains(&term) {
                found.push(term);
            }
        }
        found
    }
}

#[async_trait]
impl SafetyLayer for KeywordLayer {
    fn name(&self) -> &'static str {
        "keyword"
    }

    #[instrument(skip(self, text), fields(text_len = text.len()))]
    async fn evaluate(&self, text: &str, _child_age: u8) -> SproutResult<LayerOutcome> {
        let found = self.matches(text);
        if found.is_empty() {
            return Ok(LayerOutcome::Continue);
        }
        debug!(matches = ?found, "Text matched deny-list");
        Ok(LayerOutcome::Verdict(SafetyVerdict::flagged(
            found,
            VerdictSource::Keyword,
        )))
    }
}
