//! Response Extractor — pulls a SWOT breakdown and an improvement list out of
//! free-form model text.
//!
//! Two stages:
//! 1. `extract_raw` locates section keywords and splits each section into
//!    list items. Categories it cannot find stay empty.
//! 2. `merge_defaults` swaps every empty result for its fixed placeholder.
//!
//! The output of `extract` is never empty in any field, for any input.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Improvement headings in priority order.
pub const IMPROVEMENT_KEYWORDS: &[&str] = &[
    "improvements:",
    "improvement:",
    "recommendations:",
    "recommendation:",
    "action items:",
    "next steps:",
];

pub const DEFAULT_IMPROVEMENT: &str = "No specific improvements could be extracted from the analysis";

/// Fragments shorter than this (in characters, after trimming) are noise.
const MIN_ITEM_CHARS: usize = 3;

/// A list item starts at a newline followed by `-`, `•`, or `<digits>.`.
static ITEM_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?:-|•|\d+\.)").expect("item delimiter pattern is valid"));

/// Used instead of `ITEM_DELIMITER` when a section's first marker is indented.
static INDENTED_ITEM_DELIMITER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n[ \t]*(?:-|•|\d+\.)").expect("indented delimiter pattern is valid")
});

static LEADING_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([ \t]*)(?:-|•|\d+\.)").expect("marker pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Strengths,
    Weaknesses,
    Opportunities,
    Threats,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Strengths,
        Category::Weaknesses,
        Category::Opportunities,
        Category::Threats,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Category::Strengths => "strengths",
            Category::Weaknesses => "weaknesses",
            Category::Opportunities => "opportunities",
            Category::Threats => "threats",
        }
    }

    /// Heading spellings, tried in this order. Lower-case.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Category::Strengths => &["strengths:", "strength:"],
            Category::Weaknesses => &["weaknesses:", "weakness:"],
            Category::Opportunities => &["opportunities:", "opportunity:"],
            Category::Threats => &["threats:", "threat:"],
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            Category::Strengths => "No specific strengths identified in the current analysis",
            Category::Weaknesses => "No specific weaknesses identified in the current analysis",
            Category::Opportunities => {
                "No specific opportunities identified in the current analysis"
            }
            Category::Threats => "No specific threats identified in the current analysis",
        }
    }
}

/// The four-category breakdown. Every field holds at least one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingSet {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub opportunities: Vec<String>,
    pub threats: Vec<String>,
}

impl FindingSet {
    pub fn get(&self, category: Category) -> &[String] {
        match category {
            Category::Strengths => &self.strengths,
            Category::Weaknesses => &self.weaknesses,
            Category::Opportunities => &self.opportunities,
            Category::Threats => &self.threats,
        }
    }

    fn get_mut(&mut self, category: Category) -> &mut Vec<String> {
        match category {
            Category::Strengths => &mut self.strengths,
            Category::Weaknesses => &mut self.weaknesses,
            Category::Opportunities => &mut self.opportunities,
            Category::Threats => &mut self.threats,
        }
    }

    fn empty() -> Self {
        Self {
            strengths: Vec::new(),
            weaknesses: Vec::new(),
            opportunities: Vec::new(),
            threats: Vec::new(),
        }
    }

    /// One placeholder per category.
    pub fn fallback() -> Self {
        let mut set = Self::empty();
        for category in Category::ALL {
            set.get_mut(category).push(category.placeholder().to_string());
        }
        set
    }

    /// Categories holding only their placeholder.
    pub fn fallback_categories(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|&c| self.get(c) == [c.placeholder()])
            .collect()
    }
}

/// Ordered improvement recommendations. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImprovementList(Vec<String>);

impl ImprovementList {
    pub fn fallback() -> Self {
        Self(vec![DEFAULT_IMPROVEMENT.to_string()])
    }

    pub fn items(&self) -> &[String] {
        &self.0
    }

    pub fn is_fallback(&self) -> bool {
        self.0 == [DEFAULT_IMPROVEMENT]
    }
}

/// Extraction result before defaults are applied. Any field may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawExtraction {
    pub findings: FindingSet,
    pub improvements: Vec<String>,
}

/// Extracts findings and improvements from a model reply.
///
/// `None` and `Some("")` both short-circuit to the full fallback output.
pub fn extract(response_text: Option<&str>) -> (FindingSet, ImprovementList) {
    let Some(text) = response_text.filter(|t| !t.is_empty()) else {
        info!("No model text to extract from; using default analysis");
        return (FindingSet::fallback(), ImprovementList::fallback());
    };

    debug!("Raw model response: {text}");

    let (findings, improvements) = merge_defaults(extract_raw(text));

    for category in findings.fallback_categories() {
        info!("No {} extracted; using placeholder", category.key());
    }
    if improvements.is_fallback() {
        info!("No improvements extracted; using placeholder");
    }
    debug!("Parsed findings: {findings:?}");
    debug!("Parsed improvements: {:?}", improvements.items());

    (findings, improvements)
}

/// Keyword-anchored extraction without fallbacks.
pub fn extract_raw(text: &str) -> RawExtraction {
    // ASCII lowering keeps byte offsets identical to `text`, so indices found
    // in `lower` slice `text` on char boundaries.
    let lower = text.to_ascii_lowercase();
    let (improvements, improvements_heading) = extract_improvements(text, &lower);
    let boundaries = KeywordIndex::new(&lower, improvements_heading);

    let mut findings = FindingSet::empty();
    for category in Category::ALL {
        let Some((start, keyword)) = category
            .keywords()
            .iter()
            .find_map(|kw| lower.find(kw).map(|pos| (pos, *kw)))
        else {
            continue;
        };

        let content_start = start + keyword.len();
        let end = boundaries
            .next_after(content_start, keyword)
            .unwrap_or(text.len());
        *findings.get_mut(category) = split_items(&text[content_start..end]);
    }

    RawExtraction {
        findings,
        improvements,
    }
}

/// Items under the first improvement heading (in priority order) that yields
/// any, running to the end of the text. Also returns the heading that was
/// settled on: the productive one, else the first one found.
fn extract_improvements(text: &str, lower: &str) -> (Vec<String>, Option<(usize, &'static str)>) {
    let mut first_found = None;
    for &keyword in IMPROVEMENT_KEYWORDS {
        let Some(pos) = lower.find(keyword) else {
            continue;
        };
        let items = split_items(&text[pos + keyword.len()..]);
        if !items.is_empty() {
            return (items, Some((pos, keyword)));
        }
        first_found.get_or_insert((pos, keyword));
    }
    (Vec::new(), first_found)
}

/// Replaces every empty field with its placeholder.
pub fn merge_defaults(raw: RawExtraction) -> (FindingSet, ImprovementList) {
    let mut findings = raw.findings;
    for category in Category::ALL {
        let items = findings.get_mut(category);
        if items.is_empty() {
            items.push(category.placeholder().to_string());
        }
    }

    let improvements = if raw.improvements.is_empty() {
        ImprovementList::fallback()
    } else {
        ImprovementList(raw.improvements)
    };

    (findings, improvements)
}

/// Every occurrence of every SWOT heading plus the chosen improvement
/// heading, sorted by position.
///
/// A section ends at the first heading that starts at or after the section's
/// content and is not the exact spelling that opened it. The other spelling
/// of the same category does count. Improvement phrases elsewhere in the text
/// are ordinary content.
struct KeywordIndex {
    hits: Vec<(usize, &'static str)>,
}

impl KeywordIndex {
    fn new(lower: &str, improvements_heading: Option<(usize, &'static str)>) -> Self {
        let mut hits: Vec<(usize, &'static str)> = Category::ALL
            .iter()
            .flat_map(|c| c.keywords().iter().copied())
            .flat_map(|kw| lower.match_indices(kw).map(move |(pos, _)| (pos, kw)))
            .chain(improvements_heading)
            .collect();
        hits.sort_unstable();
        Self { hits }
    }

    fn next_after(&self, from: usize, opened_by: &str) -> Option<usize> {
        let first = self.hits.partition_point(|&(pos, _)| pos < from);
        self.hits[first..]
            .iter()
            .find(|&&(_, kw)| kw != opened_by)
            .map(|&(pos, _)| pos)
    }
}

/// Splits a section into trimmed list items, dropping fragments under
/// `MIN_ITEM_CHARS`. The section start counts as a line start, so a leading
/// marker on the first item is stripped like the rest.
///
/// Markers must sit at the start of a line, unless the section's first marker
/// is itself indented; then indented markers split too.
fn split_items(section: &str) -> Vec<String> {
    let delimiter = if first_marker_is_indented(section) {
        &INDENTED_ITEM_DELIMITER
    } else {
        &ITEM_DELIMITER
    };
    let body = format!("\n{}", section.trim());
    delimiter
        .split(&body)
        .map(clean_item)
        .filter(|item| item.chars().count() >= MIN_ITEM_CHARS)
        .map(str::to_string)
        .collect()
}

/// The first line is the rest of the heading line and is skipped.
fn first_marker_is_indented(section: &str) -> bool {
    section
        .lines()
        .skip(1)
        .find_map(|line| LEADING_MARKER.captures(line))
        .is_some_and(|caps| !caps[1].is_empty())
}

/// Trims a fragment and drops heading decoration (`**`, `###`) left on its
/// own line at either end by markdown-styled headings. Interior text,
/// line endings included, is returned untouched.
fn clean_item(fragment: &str) -> &str {
    let mut kept: Option<(usize, usize)> = None;
    let mut offset = 0;
    for line in fragment.split_inclusive('\n') {
        let end = offset + line.len();
        if !is_decoration(line) {
            kept = Some((kept.map_or(offset, |(start, _)| start), end));
        }
        offset = end;
    }
    kept.map_or("", |(start, end)| fragment[start..end].trim())
}

fn is_decoration(line: &str) -> bool {
    line.trim().chars().all(|c| matches!(c, '*' | '#' | '_'))
}
