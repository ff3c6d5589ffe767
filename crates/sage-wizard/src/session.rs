//! A wizard session: one project's state, its backend, and its persistence.
//!
//! Every change goes through [`WizardState::apply`]; the resulting save mode
//! decides whether the snapshot is written through the autosaver at once or
//! after the debounce window. Remote operations check the target stage's
//! guard before issuing any request, and a failed request leaves the state
//! untouched.

use std::collections::BTreeMap;

use sage_client::wire::{AutoRefineRequest, RefineThesisRequest};
use sage_client::{BatchOptions, GenerationBackend, Throttle};
use sage_config::{AutosaveSettings, SageConfig, ThrottleSettings};
use sage_core::entities::{
    FusedOutline, MethodologyOption, MethodologyType, PaperStructure, ProjectRecord, WizardData,
};
use sage_core::enums::{FinalPart, OutlineStage, SaveMode, WizardStage};
use sage_core::wizard::{WizardEvent, WizardState};
use sage_store::{Autosaver, KeyValueStore, ProjectSnapshot, ProjectStore};

use crate::context;
use crate::document;
use crate::drafts::{self, DraftWriter};
use crate::error::WizardError;
use crate::outline::{OutlinePipeline, PassOutcome, Phase, ProgressFn};

#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub autosave: AutosaveSettings,
    pub throttle: ThrottleSettings,
}

impl From<&SageConfig> for SessionOptions {
    fn from(config: &SageConfig) -> Self {
        Self {
            autosave: config.autosave.clone(),
            throttle: config.throttle.clone(),
        }
    }
}

/// Result of drafting a set of questions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DraftSummary {
    pub drafted: usize,
    pub failed: usize,
}

/// Result of refining subsections for the final document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefineSummary {
    pub refined: usize,
    /// Subsections with no drafted answer, or already refined.
    pub skipped: usize,
    pub failed: usize,
}

pub struct WizardSession<B, S> {
    backend: B,
    store: ProjectStore<S>,
    project_id: String,
    project_name: String,
    state: WizardState,
    autosaver: Option<Autosaver<ProjectSnapshot>>,
    throttle: Throttle,
    batch: BatchOptions,
}

impl<B: GenerationBackend, S: KeyValueStore> WizardSession<B, S> {
    /// Open project `project_id` and make it the active project.
    ///
    /// Spawns the autosave worker when autosave is enabled, so this must be
    /// called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Store`] if the project does not exist or the
    /// store cannot be read.
    pub fn open(
        backend: B,
        store: ProjectStore<S>,
        project_id: &str,
        options: &SessionOptions,
    ) -> Result<Self, WizardError> {
        let record = store.get(project_id)?;
        store.set_active(&record.id)?;
        Ok(Self::from_record(backend, store, record, options))
    }

    /// Open whichever project is currently active.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Precondition`] when no project is active.
    pub fn open_active(
        backend: B,
        store: ProjectStore<S>,
        options: &SessionOptions,
    ) -> Result<Self, WizardError> {
        let record = store.active()?.ok_or_else(|| {
            WizardError::precondition(
                "no active project; create one with `sage project new` or load one",
            )
        })?;
        Ok(Self::from_record(backend, store, record, options))
    }

    fn from_record(
        backend: B,
        store: ProjectStore<S>,
        record: ProjectRecord,
        options: &SessionOptions,
    ) -> Self {
        let autosaver = options
            .autosave
            .enabled
            .then(|| Autosaver::spawn(store.clone(), options.autosave.debounce()));
        tracing::debug!(project = %record.id, autosave = autosaver.is_some(), "session opened");
        Self {
            backend,
            store,
            project_id: record.id,
            project_name: record.name,
            state: WizardState::from(record.data),
            autosaver,
            throttle: Throttle::from(&options.throttle),
            batch: BatchOptions::from(&options.throttle),
        }
    }

    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    #[must_use]
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    #[must_use]
    pub const fn state(&self) -> &WizardState {
        &self.state
    }

    #[must_use]
    pub const fn data(&self) -> &WizardData {
        self.state.data()
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    #[must_use]
    pub const fn store(&self) -> &ProjectStore<S> {
        &self.store
    }

    // -- state changes ------------------------------------------------------

    /// Apply `event` and persist the result. Returns the unlock warning, if
    /// the event produced one.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Core`] if the event is rejected (state is
    /// unchanged) or [`WizardError::Store`] if an immediate save fails.
    pub async fn apply(&mut self, event: WizardEvent) -> Result<Option<String>, WizardError> {
        let applied = self.state.apply(event)?;
        self.state = applied.state;
        self.persist(applied.save_mode).await?;
        if let Some(warning) = &applied.warning {
            tracing::warn!(project = %self.project_id, "{warning}");
        }
        Ok(applied.warning)
    }

    /// Write the current snapshot now.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Store`] if the write fails.
    pub async fn save_now(&self) -> Result<(), WizardError> {
        self.persist(SaveMode::Immediate).await
    }

    /// Flush pending saves and stop the autosave worker.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Store`] if the final flush fails.
    pub async fn close(self) -> Result<(), WizardError> {
        if let Some(autosaver) = self.autosaver {
            autosaver.shutdown().await?;
        }
        Ok(())
    }

    async fn persist(&self, mode: SaveMode) -> Result<(), WizardError> {
        let snapshot = || ProjectSnapshot {
            project_id: self.project_id.clone(),
            data: self.state.data().clone(),
        };
        match (mode, &self.autosaver) {
            (SaveMode::None, _) => {}
            (SaveMode::Debounced, Some(autosaver)) => autosaver.debounced(snapshot())?,
            (SaveMode::Immediate, Some(autosaver)) => autosaver.immediate(snapshot()).await?,
            (SaveMode::Debounced | SaveMode::Immediate, None) => {
                self.store
                    .quick_save(&self.project_id, self.state.data().clone())?;
            }
        }
        Ok(())
    }

    // -- thesis -------------------------------------------------------------

    /// Ask the backend for probing questions about the current thesis draft.
    ///
    /// # Errors
    ///
    /// Fails if the thesis is finalized, no paper type is selected, or the
    /// request fails.
    pub async fn generate_probing_questions(&mut self) -> Result<Vec<String>, WizardError> {
        self.state.ensure_open(WizardStage::Thesis)?;
        let request = context::probing_questions(self.data())?;
        let questions = self.backend.probing_questions(&request).await?;
        self.apply(WizardEvent::SetProbingQuestions(questions.clone()))
            .await?;
        Ok(questions)
    }

    /// Refine the thesis from answers to the stored probing questions.
    ///
    /// # Errors
    ///
    /// Fails if the thesis is finalized, there are no probing questions, or
    /// the request fails.
    pub async fn answer_probing_questions(
        &mut self,
        answers: Vec<String>,
    ) -> Result<String, WizardError> {
        self.state.ensure_open(WizardStage::Thesis)?;
        let request = context::answer_probing(self.data(), answers)?;
        let refined = self.backend.answer_probing_questions(&request).await?;
        self.apply(WizardEvent::ApplyRefinedThesis(refined.clone()))
            .await?;
        Ok(refined)
    }

    /// Refine the thesis from free-form responses.
    ///
    /// # Errors
    ///
    /// Fails if the thesis is finalized or the request fails.
    pub async fn refine_thesis(&mut self, responses: Vec<String>) -> Result<String, WizardError> {
        self.state.ensure_open(WizardStage::Thesis)?;
        let request = RefineThesisRequest {
            current_topic: context::thesis(self.data()).to_string(),
            user_responses: responses,
            history: Vec::new(),
        };
        let refined = self.backend.refine_thesis(&request).await?;
        self.apply(WizardEvent::ApplyRefinedThesis(refined.clone()))
            .await?;
        Ok(refined)
    }

    /// Let the backend refine the thesis draft without user input.
    ///
    /// # Errors
    ///
    /// Fails if the thesis is finalized, the draft is empty, or the request
    /// fails.
    pub async fn auto_refine_thesis(&mut self) -> Result<String, WizardError> {
        self.state.ensure_open(WizardStage::Thesis)?;
        let thesis = context::thesis(self.data()).trim().to_string();
        if thesis.is_empty() {
            return Err(WizardError::precondition("write a thesis draft first"));
        }
        let refined = self
            .backend
            .auto_refine_thesis(&AutoRefineRequest { thesis })
            .await?;
        self.apply(WizardEvent::ApplyRefinedThesis(refined.clone()))
            .await?;
        Ok(refined)
    }

    // -- source categories --------------------------------------------------

    /// Replace the category candidates with a fresh recommendation.
    ///
    /// # Errors
    ///
    /// Fails if the categories stage is not open or the request fails.
    pub async fn recommend_sources(&mut self) -> Result<Vec<String>, WizardError> {
        self.state.ensure_open(WizardStage::SourceCategories)?;
        let request = context::recommend_sources(self.data(), Vec::new());
        let categories = self.backend.recommend_sources(&request).await?;
        self.apply(WizardEvent::SetCategoryCandidates(categories.clone()))
            .await?;
        Ok(categories)
    }

    /// Ask for additional categories, excluding the ones already listed.
    /// Returns only the newly added names.
    ///
    /// # Errors
    ///
    /// Fails if the categories stage is not open or the request fails.
    pub async fn more_sources(&mut self) -> Result<Vec<String>, WizardError> {
        self.state.ensure_open(WizardStage::SourceCategories)?;
        let existing: Vec<String> = self
            .data()
            .category_candidates
            .iter()
            .map(|c| c.name.clone())
            .collect();
        let request = context::recommend_sources(self.data(), existing.clone());
        let fresh: Vec<String> = self
            .backend
            .recommend_sources(&request)
            .await?
            .into_iter()
            .filter(|name| !existing.contains(name))
            .collect();
        self.apply(WizardEvent::AppendCategoryCandidates(fresh.clone()))
            .await?;
        Ok(fresh)
    }

    // -- methodology --------------------------------------------------------

    /// The backend's methodology catalog. Does not touch wizard state.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Client`] if the request fails.
    pub async fn methodology_catalog(&self) -> Result<Vec<MethodologyType>, WizardError> {
        Ok(self.backend.methodology_catalog().await?)
    }

    /// Generate methodology options of the given catalog family.
    ///
    /// # Errors
    ///
    /// Fails if the methodology stage is not open or the request fails.
    pub async fn generate_methodologies(
        &mut self,
        methodology_type: &str,
    ) -> Result<Vec<MethodologyOption>, WizardError> {
        self.state.ensure_open(WizardStage::Methodology)?;
        let request = context::methodology_generation(self.data(), methodology_type)?;
        let options = self.backend.generate_methodologies(&request).await?;
        self.apply(WizardEvent::SetMethodologyOptions {
            methodology_type: Some(methodology_type.to_string()),
            options: options.clone(),
        })
        .await?;
        Ok(options)
    }

    // -- outline ------------------------------------------------------------

    /// Fetch the paper structure, consulting the structure cache first.
    ///
    /// # Errors
    ///
    /// Fails if the outline framework is not open or the request fails.
    pub async fn preview_structure(&mut self) -> Result<PaperStructure, WizardError> {
        self.state.ensure_open(WizardStage::OutlineFramework)?;
        let request = context::paper_structure(self.data())?;
        let methodology_id = request.methodology_id.as_deref();
        let structure = if let Some(cached) = self
            .store
            .cached_structure(&request.paper_type, methodology_id)?
        {
            tracing::debug!(paper_type = %request.paper_type, "structure cache hit");
            cached
        } else {
            let mut fetched = self.backend.paper_structure(&request).await?;
            if fetched.paper_type.is_empty() {
                fetched.paper_type.clone_from(&request.paper_type);
            }
            self.store.cache_structure(methodology_id, &fetched)?;
            fetched
        };
        self.apply(WizardEvent::SetStructure(structure.clone()))
            .await?;
        Ok(structure)
    }

    /// Generate the section skeleton. Fetches the structure first when none
    /// has been drafted.
    ///
    /// # Errors
    ///
    /// Fails if the framework is not open, sections already exist, or a
    /// request fails.
    pub async fn generate_sections(&mut self) -> Result<usize, WizardError> {
        self.state.ensure_open(WizardStage::OutlineFramework)?;
        if self.data().outline_stage == OutlineStage::NoOutline {
            self.preview_structure().await?;
        }
        if self.data().outline_stage != OutlineStage::StructureDrafted {
            return Err(WizardError::precondition(
                "outline sections already exist; reset the outline to regenerate",
            ));
        }
        let request = context::structured_outline(self.data())?;
        let sections = self.backend.structured_outline(&request).await?;
        let count = sections.len();
        self.apply(WizardEvent::ReplaceOutline {
            sections,
            stage: OutlineStage::SectionsGenerated,
        })
        .await?;
        Ok(count)
    }

    /// Run one outline pass. The outline must be at the stage the pass
    /// starts from, or past it with units the pass left empty, in which case
    /// only those units are retried.
    ///
    /// # Errors
    ///
    /// Fails if the framework is not open or the pass has nothing to do at
    /// the current stage.
    pub async fn run_outline_pass(
        &mut self,
        phase: Phase,
        progress: Option<&ProgressFn<'_>>,
    ) -> Result<PassOutcome, WizardError> {
        self.state.ensure_open(WizardStage::OutlineFramework)?;
        let stage = self.data().outline_stage;
        if !phase.can_run(stage, &self.data().outline_data) {
            return Err(WizardError::precondition(format!(
                "cannot generate {} while the outline is at stage {stage}",
                phase.as_str()
            )));
        }
        self.outline_pass(phase, progress).await
    }

    /// Generate everything still missing: structure, sections, then every
    /// pass that is pending or still has empty units. Returns the passes
    /// that ran.
    ///
    /// # Errors
    ///
    /// Fails if the framework is not open or a structural request fails.
    pub async fn generate_outline(
        &mut self,
        progress: Option<&ProgressFn<'_>>,
    ) -> Result<Vec<PassOutcome>, WizardError> {
        self.state.ensure_open(WizardStage::OutlineFramework)?;
        if matches!(
            self.data().outline_stage,
            OutlineStage::NoOutline | OutlineStage::StructureDrafted
        ) {
            self.generate_sections().await?;
        }
        let mut passes = Vec::new();
        for phase in Phase::ALL {
            if phase.can_run(self.data().outline_stage, &self.data().outline_data) {
                passes.push(self.outline_pass(phase, progress).await?);
            }
        }
        Ok(passes)
    }

    async fn outline_pass(
        &mut self,
        phase: Phase,
        progress: Option<&ProgressFn<'_>>,
    ) -> Result<PassOutcome, WizardError> {
        let outcome = {
            let mut pipeline = OutlinePipeline::new(&self.backend, self.throttle.clone());
            if let Some(progress) = progress {
                pipeline = pipeline.with_progress(progress);
            }
            pipeline.run(phase, self.state.data()).await?
        };
        self.apply(WizardEvent::ReplaceOutline {
            sections: outcome.sections.clone(),
            stage: outcome.stage,
        })
        .await?;
        Ok(outcome)
    }

    /// Drop the outline and start over from no outline.
    ///
    /// # Errors
    ///
    /// Fails if the framework is not open.
    pub async fn reset_outline(&mut self) -> Result<(), WizardError> {
        self.apply(WizardEvent::ReplaceOutline {
            sections: Vec::new(),
            stage: OutlineStage::NoOutline,
        })
        .await?;
        Ok(())
    }

    // -- drafts -------------------------------------------------------------

    /// Draft one question and record the candidates.
    ///
    /// # Errors
    ///
    /// Fails if drafting is not open, the question is unknown or has no
    /// citations, or a request fails.
    pub async fn draft_question(&mut self, question_id: &str) -> Result<Vec<String>, WizardError> {
        self.state.ensure_open(WizardStage::DraftOne)?;
        let candidates = DraftWriter::new(&self.backend, self.throttle.clone())
            .draft(self.state.data(), question_id.to_string())
            .await?;
        self.apply(WizardEvent::RecordDraftResponse {
            question_id: question_id.to_string(),
            candidates: candidates.clone(),
        })
        .await?;
        Ok(candidates)
    }

    /// Draft every data-section question with citations, in batches.
    /// Questions that already have a draft are skipped unless `redraft`.
    ///
    /// # Errors
    ///
    /// Fails if drafting is not open. Individual question failures are
    /// counted, not returned.
    pub async fn draft_all(&mut self, redraft: bool) -> Result<DraftSummary, WizardError> {
        self.state.ensure_open(WizardStage::DraftOne)?;
        let ids = drafts::draftable_questions(self.data(), redraft);
        let results = drafts::draft_batch(
            &self.backend,
            self.state.data(),
            ids,
            self.batch,
            self.throttle.min_spacing(),
        )
        .await;

        let mut summary = DraftSummary::default();
        for (question_id, candidates) in results {
            match candidates {
                Some(candidates) => {
                    self.apply(WizardEvent::RecordDraftResponse {
                        question_id,
                        candidates,
                    })
                    .await?;
                    summary.drafted += 1;
                }
                None => summary.failed += 1,
            }
        }
        tracing::info!(drafted = summary.drafted, failed = summary.failed, "drafting finished");
        Ok(summary)
    }

    // -- draft two ----------------------------------------------------------

    /// Fuse the drafted data sections into a restructured outline.
    ///
    /// # Errors
    ///
    /// Fails if draft two is not open, no data section has a drafted answer,
    /// or the request fails.
    pub async fn generate_fused_outline(&mut self) -> Result<FusedOutline, WizardError> {
        self.state.ensure_open(WizardStage::DraftTwo)?;
        let request = context::fused_outline(self.data())?;
        let outline = self.backend.fused_outline(&request).await?;
        tracing::info!(
            sections = outline.sections.len(),
            from = request.data_sections.len(),
            "fused outline generated"
        );
        self.apply(WizardEvent::SetFusedOutline(outline.clone())).await?;
        Ok(outline)
    }

    // -- final document -------------------------------------------------------

    /// Generate the abstract, methodology or conclusion paragraph.
    ///
    /// # Errors
    ///
    /// Fails if draft two is not complete or the request fails.
    pub async fn generate_final_text(&mut self, part: FinalPart) -> Result<String, WizardError> {
        self.state.ensure_open(WizardStage::Final)?;
        let request = context::final_text(self.data());
        let text = self.backend.final_text(part, &request).await?;
        self.apply(WizardEvent::SetFinalText {
            part,
            text: text.clone(),
        })
        .await?;
        Ok(text)
    }

    /// Generate transitions between outline levels, keyed by marker path.
    ///
    /// # Errors
    ///
    /// Fails if draft two is not complete or the request fails.
    pub async fn generate_transitions(&mut self) -> Result<BTreeMap<String, String>, WizardError> {
        self.state.ensure_open(WizardStage::Final)?;
        let request = context::final_text(self.data());
        let transitions = self.backend.transitions(&request).await?;
        self.apply(WizardEvent::SetTransitions(transitions.clone())).await?;
        Ok(transitions)
    }

    /// Rewrite each drafted subsection as continuous prose, one request at a
    /// time. Subsections already refined are skipped unless `redo`.
    ///
    /// # Errors
    ///
    /// Fails if draft two is not complete. Individual subsection failures
    /// are counted, not returned.
    pub async fn refine_subsections(&mut self, redo: bool) -> Result<RefineSummary, WizardError> {
        self.state.ensure_open(WizardStage::Final)?;
        let mut summary = RefineSummary::default();
        let mut targets = Vec::new();
        {
            let data = self.data();
            for section in &data.outline_data {
                for subsection in &section.subsections {
                    let done = data
                        .final_document
                        .refined_subsections
                        .contains_key(&subsection.id);
                    match context::refine_subsection(data, section, subsection) {
                        Some(request) if redo || !done => {
                            targets.push((subsection.id.clone(), request));
                        }
                        _ => summary.skipped += 1,
                    }
                }
            }
        }

        for (subsection_id, request) in targets {
            let result = {
                let _permit = self.throttle.acquire().await?;
                self.backend.refine_subsection(&request).await
            };
            match result {
                Ok(text) => {
                    self.apply(WizardEvent::SetRefinedSubsection {
                        subsection_id,
                        text,
                    })
                    .await?;
                    summary.refined += 1;
                }
                Err(err) => {
                    summary.failed += 1;
                    tracing::warn!(
                        subsection = %request.subsection_title,
                        %err,
                        "subsection refinement failed"
                    );
                }
            }
        }
        tracing::info!(
            refined = summary.refined,
            skipped = summary.skipped,
            failed = summary.failed,
            "refinement finished"
        );
        Ok(summary)
    }

    // -- export ---------------------------------------------------------------

    /// Render the project as a Markdown document.
    #[must_use]
    pub fn export_document(&self) -> String {
        document::render_markdown(&self.project_name, self.data())
    }
}
