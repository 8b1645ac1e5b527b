//! Analysis pipeline: prompt assembly → model call → extraction.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::analysis::document::{Document, SupportingDocuments};
use crate::analysis::extractor::{extract, Category, FindingSet, ImprovementList};
use crate::analysis::prompt_builder::build_prompt;
use crate::analysis::storage::UploadStore;
use crate::errors::AppError;
use crate::llm_client::TextGenerator;

/// A validated analysis request. The blueprint is guaranteed present here.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub analysis_id: Uuid,
    pub analysis_name: String,
    pub blueprint: Document,
    pub supporting: SupportingDocuments,
}

/// Structured result handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub analysis_id: Uuid,
    pub analysis_name: String,
    pub swot: FindingSet,
    pub improvements: ImprovementList,
    /// Categories that hold only their placeholder.
    pub fallback_categories: Vec<Category>,
    pub improvements_fallback: bool,
    pub generated_at: DateTime<Utc>,
}

/// Runs one analysis end to end.
///
/// Prompt assembly writes files, so it runs on the blocking pool. Model
/// failures and storage failures propagate; a reply without text does not.
pub async fn run_analysis(
    store: UploadStore,
    generator: &dyn TextGenerator,
    request: AnalysisRequest,
) -> Result<AnalysisReport, AppError> {
    let AnalysisRequest {
        analysis_id,
        analysis_name,
        blueprint,
        supporting,
    } = request;

    let prompt = {
        let analysis_name = analysis_name.clone();
        tokio::task::spawn_blocking(move || {
            build_prompt(&analysis_name, &blueprint, &supporting, &store)
        })
        .await
        .map_err(|e| AppError::Internal(e.into()))??
    };
    info!(
        "Built prompt for analysis {analysis_id} ({} chars)",
        prompt.len()
    );
    debug!("Generated prompt: {prompt}");

    let reply = generator.generate(&prompt).await?;
    if reply.is_none() {
        info!("Model returned no text for analysis {analysis_id}");
    }

    let (swot, improvements) = extract(reply.as_deref());

    Ok(AnalysisReport {
        analysis_id,
        analysis_name,
        fallback_categories: swot.fallback_categories(),
        improvements_fallback: improvements.is_fallback(),
        swot,
        improvements,
        generated_at: Utc::now(),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::analysis::document::DocumentSlot;
    use crate::llm_client::LlmError;

    /// Canned-reply generator that records every prompt it receives.
    pub(crate) struct StubGenerator {
        reply: Result<Option<String>, String>,
        pub(crate) prompts: Mutex<Vec<String>>,
    }

    impl StubGenerator {
        pub(crate) fn replying(text: &str) -> Self {
            Self {
                reply: Ok(Some(text.to_string())),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn silent() -> Self {
            Self {
                reply: Ok(None),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn rejecting(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        async fn generate(&self, prompt: &str) -> Result<Option<String>, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply
                .clone()
                .map_err(LlmError::InvalidArgument)
        }
    }

    fn request(name: &str) -> AnalysisRequest {
        AnalysisRequest {
            analysis_id: Uuid::new_v4(),
            analysis_name: name.to_string(),
            blueprint: Document::new(DocumentSlot::Blueprint, "blueprint.txt", "Step 1: Order"),
            supporting: SupportingDocuments::new(),
        }
    }

    #[tokio::test]
    async fn test_run_analysis_extracts_model_reply() {
        let dir = tempfile::tempdir().unwrap();
        let generator = StubGenerator::replying(
            "Strengths:\n- Quick ordering\nImprovements:\n1. Add order tracking",
        );

        let report = run_analysis(UploadStore::new(dir.path()), &generator, request("Cafe"))
            .await
            .unwrap();

        assert_eq!(report.analysis_name, "Cafe");
        assert_eq!(report.swot.strengths, vec!["Quick ordering".to_string()]);
        assert_eq!(report.improvements.items(), ["Add order tracking"]);
        assert!(!report.improvements_fallback);
        assert_eq!(
            report.fallback_categories,
            vec![Category::Weaknesses, Category::Opportunities, Category::Threats]
        );

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Analysis Name: Cafe"));
        assert!(dir.path().join("blueprint.txt").exists());
    }

    #[tokio::test]
    async fn test_run_analysis_without_model_text_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let generator = StubGenerator::silent();

        let report = run_analysis(UploadStore::new(dir.path()), &generator, request("Empty"))
            .await
            .unwrap();

        assert_eq!(report.swot, FindingSet::fallback());
        assert_eq!(report.improvements, ImprovementList::fallback());
        assert_eq!(report.fallback_categories, Category::ALL.to_vec());
        assert!(report.improvements_fallback);
    }

    #[tokio::test]
    async fn test_run_analysis_propagates_invalid_argument() {
        let dir = tempfile::tempdir().unwrap();
        let generator = StubGenerator::rejecting("prompt too large");

        let err = run_analysis(UploadStore::new(dir.path()), &generator, request("Big"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ModelInvalidArgument(msg) if msg == "prompt too large"));
    }

    #[tokio::test]
    async fn test_run_analysis_propagates_storage_failure_before_model_call() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("occupied");
        std::fs::write(&blocker, "file").unwrap();
        let generator = StubGenerator::replying("Strengths:\n- unused");

        let err = run_analysis(UploadStore::new(&blocker), &generator, request("Blocked"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Storage(_)));
        assert!(generator.prompts.lock().unwrap().is_empty());
    }
}
