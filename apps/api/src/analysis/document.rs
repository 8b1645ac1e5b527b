//! Uploaded documents and the fixed slot layout they are submitted under.

use std::collections::HashMap;

use bytes::Bytes;
use unicode_normalization::UnicodeNormalization;

/// File extensions accepted for any uploaded document.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "pdf", "txt"];

/// A named upload slot. The primary blueprint plus the optional supporting
/// artifacts, each with its multipart field key and prompt display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentSlot {
    Blueprint,
    Persona,
    Kpis,
    StakeholderMaps,
    SystemMap,
    UserJourneyMap,
    ProjectRoadmap,
}

/// Supporting slots in prompt order. This order is part of the prompt contract.
pub const SUPPORTING_SLOTS: [DocumentSlot; 6] = [
    DocumentSlot::Persona,
    DocumentSlot::Kpis,
    DocumentSlot::StakeholderMaps,
    DocumentSlot::SystemMap,
    DocumentSlot::UserJourneyMap,
    DocumentSlot::ProjectRoadmap,
];

impl DocumentSlot {
    pub fn key(self) -> &'static str {
        match self {
            DocumentSlot::Blueprint => "blueprint",
            DocumentSlot::Persona => "persona",
            DocumentSlot::Kpis => "kpis",
            DocumentSlot::StakeholderMaps => "stakeholder_maps",
            DocumentSlot::SystemMap => "system_map",
            DocumentSlot::UserJourneyMap => "user_journey_map",
            DocumentSlot::ProjectRoadmap => "project_roadmap",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DocumentSlot::Blueprint => "Blueprint",
            DocumentSlot::Persona => "Persona",
            DocumentSlot::Kpis => "KPIs",
            DocumentSlot::StakeholderMaps => "Stakeholder Maps",
            DocumentSlot::SystemMap => "System Map",
            DocumentSlot::UserJourneyMap => "User Journey Map",
            DocumentSlot::ProjectRoadmap => "Project Roadmap",
        }
    }

    /// Resolves a multipart field name to its slot.
    pub fn from_key(key: &str) -> Option<Self> {
        std::iter::once(DocumentSlot::Blueprint)
            .chain(SUPPORTING_SLOTS)
            .find(|slot| slot.key() == key)
    }
}

/// An uploaded artifact, buffered once.
///
/// `content` is reference-counted, so the view decoded into the prompt and the
/// view written to storage are independent and both always see the full bytes.
#[derive(Debug, Clone)]
pub struct Document {
    pub slot: DocumentSlot,
    pub filename: String,
    pub content: Bytes,
}

impl Document {
    pub fn new(slot: DocumentSlot, filename: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            slot,
            filename: filename.into(),
            content: content.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// The content as UTF-8 text, or `None` for binary uploads.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.content).ok()
    }

    /// Filesystem-safe name for persistence. Falls back to the slot key when
    /// nothing usable survives sanitization.
    pub fn safe_filename(&self) -> String {
        let name = sanitize_filename(&self.filename);
        if name.is_empty() {
            format!("{}_upload", self.slot.key())
        } else {
            name
        }
    }
}

/// Optional documents keyed by slot. Iteration follows `SUPPORTING_SLOTS`,
/// never insertion order.
#[derive(Debug, Clone, Default)]
pub struct SupportingDocuments {
    documents: HashMap<DocumentSlot, Document>,
}

impl SupportingDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `document` under its own slot, replacing any earlier upload.
    pub fn insert(&mut self, document: Document) {
        self.documents.insert(document.slot, document);
    }

    /// Present, non-empty documents in slot order.
    pub fn present(&self) -> impl Iterator<Item = &Document> + '_ {
        SUPPORTING_SLOTS
            .iter()
            .filter_map(|slot| self.documents.get(slot))
            .filter(|doc| !doc.is_empty())
    }
}

/// Strips directory components and unsafe characters from an uploaded filename.
///
/// Accented letters are decomposed (NFKD) to their ASCII base. Path
/// separators and whitespace become `_`; anything outside `[A-Za-z0-9._-]` is
/// dropped; leading and trailing `.`/`_` are removed so `..` and hidden-file
/// names cannot survive.
pub fn sanitize_filename(filename: &str) -> String {
    let spaced: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();

    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// True when the filename carries one of `ALLOWED_EXTENSIONS` (case-insensitive).
pub fn is_allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}
