//! Draft generation for outline questions.
//!
//! A question is drafted in two steps: one response per citation, then a
//! fused response that combines them. The candidates are recorded in that
//! order, so the fused response is the one selected by default.

use std::time::Duration;

use sage_client::wire::{CitationRef, CitationResponseRequest, FusedResponseRequest};
use sage_client::{BatchOptions, GenerationBackend, RetryPolicy, Throttle, batch_with_retry};
use sage_core::entities::{WizardData, find_question, questions};
use sage_core::errors::CoreError;

use crate::context;
use crate::document;
use crate::error::WizardError;

pub struct DraftWriter<'a, B> {
    backend: &'a B,
    throttle: Throttle,
}

impl<'a, B: GenerationBackend> DraftWriter<'a, B> {
    #[must_use]
    pub const fn new(backend: &'a B, throttle: Throttle) -> Self {
        Self { backend, throttle }
    }

    /// Produce the draft candidates for `question_id`.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Core`] if the question does not exist,
    /// [`WizardError::Precondition`] if it has no citations, or
    /// [`WizardError::Client`] if any request fails.
    pub async fn draft(
        &self,
        data: &WizardData,
        question_id: String,
    ) -> Result<Vec<String>, WizardError> {
        let outline = &data.outline_data;
        let (path, question) = find_question(outline, &question_id).ok_or_else(|| {
            CoreError::NotFound {
                entity_type: "question".into(),
                id: question_id.clone(),
            }
        })?;
        if question.citations.is_empty() {
            return Err(WizardError::precondition(format!(
                "question {question_id} has no citations; generate citations first"
            )));
        }
        let section = &outline[path.section];
        let subsection = &section.subsections[path.subsection];
        let question_number = questions(outline)
            .position(|q| q.id == question_id)
            .map_or(1, |i| i + 1);
        let refs = document::references(outline);
        let methodology = context::methodology_summary(data);

        let citations: Vec<CitationRef> = question
            .citations
            .iter()
            .enumerate()
            .map(|(i, c)| {
                CitationRef::numbered(c, document::reference_number(&refs, &c.apa).unwrap_or(i + 1))
            })
            .collect();

        let mut responses = Vec::with_capacity(citations.len() + 1);
        for (i, citation) in citations.iter().enumerate() {
            let request = CitationResponseRequest {
                question: question.text.clone(),
                citation: citation.clone(),
                section_context: section.context.clone(),
                subsection_context: subsection.context.clone(),
                thesis: data.final_thesis.clone(),
                methodology: methodology.clone(),
                question_number,
                citation_number: i + 1,
                reference_id: citation.reference_id.clone(),
            };
            let _permit = self.throttle.acquire().await?;
            responses.push(self.backend.citation_response(&request).await?);
        }

        let fused = FusedResponseRequest {
            question: question.text.clone(),
            citation_responses: responses.clone(),
            citations,
            section_context: section.context.clone(),
            subsection_context: subsection.context.clone(),
            thesis: data.final_thesis.clone(),
            methodology,
            question_number,
        };
        let _permit = self.throttle.acquire().await?;
        responses.push(self.backend.fused_response(&fused).await?);
        tracing::debug!(question_id = %question_id, candidates = responses.len(), "question drafted");
        Ok(responses)
    }
}

/// Questions in data sections that have citations, optionally skipping those
/// that already carry a draft.
#[must_use]
pub fn draftable_questions(data: &WizardData, include_drafted: bool) -> Vec<String> {
    data.outline_data
        .iter()
        .filter(|s| s.kind.is_data())
        .flat_map(|s| s.subsections.iter())
        .flat_map(|sub| sub.questions.iter())
        .filter(|q| !q.citations.is_empty())
        .filter(|q| include_drafted || !data.draft_data.responses.contains_key(&q.id))
        .map(|q| q.id.clone())
        .collect()
}

/// Draft every id in `question_ids` in fixed-size batches.
///
/// Each entry pairs the question id with its candidates, or `None` when
/// drafting failed. Requests are already retried by the backend client, so
/// the batch itself makes a single attempt per question. Up to
/// `batch_size` requests run at once, still `min_spacing` apart.
pub async fn draft_batch<B: GenerationBackend>(
    backend: &B,
    data: &WizardData,
    question_ids: Vec<String>,
    options: BatchOptions,
    min_spacing: Duration,
) -> Vec<(String, Option<Vec<String>>)> {
    let writer = DraftWriter::new(backend, Throttle::new(options.batch_size, min_spacing));
    let writer = &writer;
    let ops: Vec<_> = question_ids
        .iter()
        .map(|id| {
            let id = id.clone();
            move || {
                let id = id.clone();
                async move { writer.draft(data, id).await }
            }
        })
        .collect();
    let results = batch_with_retry(&RetryPolicy::none(), ops, options).await;
    question_ids.into_iter().zip(results).collect()
}
