//! Result-page extraction and candidate name derivation
//!
//! Result blocks are located with CSS selectors; a block contributes a
//! hit only when it carries both a heading and a link. Candidate names
//! come from an explicit ordered rule table evaluated first-match-wins,
//! with a filler-stripping fallback. Extraction is best-effort pattern
//! matching rather than entity recognition: a malformed block is logged
//! and skipped, and `extract` always returns a sequence, never an error.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::utils::error::ExtractError;
use crate::utils::normalize_whitespace;

// Helper macro to parse selectors safely at startup
macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

lazy_static! {
    /// One search-result block
    static ref RESULT_BLOCK: Selector = parse_selector!("div.g");

    /// Heading inside a result block
    static ref BLOCK_HEADING: Selector = parse_selector!("h3");

    /// Link inside a result block
    static ref BLOCK_LINK: Selector = parse_selector!("a");

    /// Ordered delimiter rules for candidate names, first match wins
    static ref NAME_RULES: Vec<NameRule> = vec![
        NameRule::new("cjk-book-title", r"《(.+?)》"),
        NameRule::new("double-quote", r#""(.+?)""#),
        NameRule::new("cjk-bracket", r"【(.+?)】"),
        NameRule::new("square-bracket", r"\[(.+?)\]"),
    ];

    /// Filler and category terms stripped by the fallback rule
    static ref FILLER_TERMS: Regex =
        Regex::new(r"(攻略|评测|资讯|下载|官网|专区|合集|手游|网游|页游|主机游戏|单机游戏)")
            .expect("Invalid filler-terms pattern");
}

/// One delimiter rule: a pattern whose first capture group is the name
struct NameRule {
    /// Rule identifier for diagnostics
    name: &'static str,
    pattern: Regex,
}

impl NameRule {
    fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("Invalid name-rule pattern"),
        }
    }

    fn apply(&self, title: &str) -> Option<String> {
        self.pattern
            .captures(title)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }
}

/// A hit as parsed from one result block, before the orchestrator stamps
/// it with site, window, and capture time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialHit {
    pub title: String,
    pub link: String,
    pub candidate_name: Option<String>,
}

/// Extracts structured hits from raw search result pages
#[derive(Debug, Default, Clone, Copy)]
pub struct ResultExtractor;

impl ResultExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Extract all well-formed hits from a result page
    ///
    /// Partial blocks are skipped silently; an unparseable page yields
    /// an empty sequence.
    pub fn extract(&self, html: &str) -> Vec<PartialHit> {
        let document = Html::parse_document(html);
        let mut hits = Vec::new();

        for block in document.select(&RESULT_BLOCK) {
            match self.extract_block(block) {
                Ok(hit) => hits.push(hit),
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping partial result block");
                }
            }
        }

        hits
    }

    /// Extract one result block; requires both heading and link
    fn extract_block(&self, block: ElementRef<'_>) -> Result<PartialHit, ExtractError> {
        let heading = block
            .select(&BLOCK_HEADING)
            .next()
            .ok_or(ExtractError::HeadingNotFound)?;

        let link = block
            .select(&BLOCK_LINK)
            .next()
            .and_then(|a| a.value().attr("href"))
            .ok_or(ExtractError::LinkNotFound)?;

        let title = normalize_whitespace(&heading.text().collect::<String>());

        Ok(PartialHit {
            candidate_name: extract_name(&title),
            title,
            link: link.to_string(),
        })
    }
}

/// Derive a candidate game name from a heading
///
/// The ordered delimiter rules are tried first; when none match, filler
/// terms are stripped from the heading and the trimmed remainder is
/// used. Returns `None` when nothing usable is left.
pub fn extract_name(title: &str) -> Option<String> {
    for rule in NAME_RULES.iter() {
        if let Some(name) = rule.apply(title) {
            tracing::trace!(rule = rule.name, %name, "Name rule matched");
            return Some(name);
        }
    }

    let cleaned = FILLER_TERMS.replace_all(title, "");
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}
