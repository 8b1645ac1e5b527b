//! Prompt Builder — assembles uploaded documents into a single model prompt.
//!
//! Pure text assembly plus one file write per present document. No model calls.

use std::io;

use crate::analysis::document::{Document, SupportingDocuments};
use crate::analysis::prompts::ANALYSIS_INSTRUCTIONS;
use crate::analysis::storage::UploadStore;

/// Builds the analysis prompt and persists every included document.
///
/// Layout:
/// ```text
/// Analysis Name: <name>
///
/// Blueprint File: <filename>
/// <content or [Binary file: <filename>]>
///
/// <Label> File: <filename>        (one block per present supporting slot)
/// <content>
///
/// <ANALYSIS_INSTRUCTIONS>
/// ```
///
/// The primary document is required; callers validate its presence.
/// Storage failures are returned as-is.
pub fn build_prompt(
    analysis_name: &str,
    blueprint: &Document,
    supporting: &SupportingDocuments,
    store: &UploadStore,
) -> io::Result<String> {
    let mut prompt = format!("Analysis Name: {analysis_name}\n\n");

    store.persist(blueprint)?;
    push_document(&mut prompt, blueprint);

    for document in supporting.present() {
        store.persist(document)?;
        push_document(&mut prompt, document);
    }

    prompt.push_str(ANALYSIS_INSTRUCTIONS);
    Ok(prompt)
}

fn push_document(prompt: &mut String, document: &Document) {
    prompt.push_str(&format!("{} File: {}\n", document.slot.label(), document.filename));
    match document.text() {
        Some(text) => prompt.push_str(text),
        None => prompt.push_str(&format!("[Binary file: {}]", document.filename)),
    }
    prompt.push_str("\n\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::document::{DocumentSlot, SUPPORTING_SLOTS};

    fn blueprint() -> Document {
        Document::new(
            DocumentSlot::Blueprint,
            "blueprint.txt",
            "Step 1: Customer books online\nStep 2: Staff confirms",
        )
    }

    #[test]
    fn test_prompt_contains_name_and_primary_filename() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let prompt =
            build_prompt("Clinic Intake", &blueprint(), &SupportingDocuments::new(), &store)
                .unwrap();

        assert!(prompt.starts_with("Analysis Name: Clinic Intake\n\n"));
        assert!(prompt.contains("Blueprint File: blueprint.txt\n"));
        assert!(prompt.contains("Step 2: Staff confirms"));
        assert!(prompt.ends_with(ANALYSIS_INSTRUCTIONS));
    }

    #[test]
    fn test_empty_analysis_name_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let prompt = build_prompt("", &blueprint(), &SupportingDocuments::new(), &store).unwrap();

        assert!(prompt.starts_with("Analysis Name: \n\n"));
    }

    #[test]
    fn test_binary_content_replaced_by_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());
        let image = Document::new(
            DocumentSlot::Blueprint,
            "journey.png",
            vec![0x89, b'P', b'N', b'G', 0xff, 0x00],
        );

        let prompt = build_prompt("Visual", &image, &SupportingDocuments::new(), &store).unwrap();

        assert!(prompt.contains("Blueprint File: journey.png\n[Binary file: journey.png]\n\n"));
        assert!(!prompt.contains("PNG"));
    }

    #[test]
    fn test_binary_supporting_document_replaced_by_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());
        let mut supporting = SupportingDocuments::new();
        supporting.insert(Document::new(
            DocumentSlot::SystemMap,
            "map.png",
            vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0xff],
        ));

        let prompt = build_prompt("Mapped", &blueprint(), &supporting, &store).unwrap();

        assert!(prompt.contains("System Map File: map.png\n[Binary file: map.png]\n\n"));
        let saved = std::fs::read(store.root().join("map.png")).unwrap();
        assert_eq!(saved.len(), 9);
    }

    #[test]
    fn test_supporting_sections_only_for_present_slots_in_fixed_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());
        let mut supporting = SupportingDocuments::new();
        supporting.insert(Document::new(DocumentSlot::ProjectRoadmap, "roadmap.txt", "Q3 launch"));
        supporting.insert(Document::new(DocumentSlot::Persona, "persona.txt", "Busy parent"));
        supporting.insert(Document::new(DocumentSlot::Kpis, "kpis.txt", ""));

        let prompt = build_prompt("Order", &blueprint(), &supporting, &store).unwrap();

        let persona = prompt.find("Persona File: persona.txt\nBusy parent\n\n").unwrap();
        let roadmap = prompt.find("Project Roadmap File: roadmap.txt\nQ3 launch\n\n").unwrap();
        assert!(persona < roadmap);
        assert!(!prompt.contains("KPIs File"));
        for slot in [DocumentSlot::StakeholderMaps, DocumentSlot::SystemMap, DocumentSlot::UserJourneyMap] {
            assert!(!prompt.contains(&format!("{} File", slot.label())));
        }
    }

    #[test]
    fn test_every_present_document_is_persisted_in_full() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path().join("uploads"));
        let mut supporting = SupportingDocuments::new();
        for slot in SUPPORTING_SLOTS {
            supporting.insert(Document::new(slot, format!("{}.txt", slot.key()), slot.label()));
        }

        build_prompt("All slots", &blueprint(), &supporting, &store).unwrap();

        let saved = std::fs::read_to_string(store.root().join("blueprint.txt")).unwrap();
        assert_eq!(saved, "Step 1: Customer books online\nStep 2: Staff confirms");
        for slot in SUPPORTING_SLOTS {
            let path = store.root().join(format!("{}.txt", slot.key()));
            assert_eq!(std::fs::read_to_string(path).unwrap(), slot.label());
        }
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());
        let mut supporting = SupportingDocuments::new();
        supporting.insert(Document::new(DocumentSlot::SystemMap, "system.txt", "CRM -> ERP"));

        let first = build_prompt("Repeat", &blueprint(), &supporting, &store).unwrap();
        let second = build_prompt("Repeat", &blueprint(), &supporting, &store).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_storage_failure_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "occupied").unwrap();
        let store = UploadStore::new(&blocker);

        let result = build_prompt("Broken", &blueprint(), &SupportingDocuments::new(), &store);

        assert!(result.is_err());
    }
}
