//! Framework-independent wizard state machine.
//!
//! `WizardState::apply` is a pure function from `(state, event)` to a new
//! state. Guards are checked before anything is cloned or mutated, so a
//! rejected event leaves the caller's state untouched.
//!
//! ```text
//! paper type ─▶ thesis ─▶ source categories ─▶ methodology
//!            ─▶ outline framework ─▶ draft one ─▶ draft two ─▶ final
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog;
use crate::entities::{
    CategoryChoice, FusedOutline, Methodology, MethodologyOption, PaperStructure, Section,
    WizardData, find_question,
};
use crate::enums::{FinalPart, OutlineStage, PaperLength, SaveMode, Tab, WizardStage};
use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Every user or backend-driven change to wizard progress.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardEvent {
    SelectPaperType(String),
    SetPaperLength(PaperLength),

    EditThesis(String),
    SetProbingQuestions(Vec<String>),
    ApplyRefinedThesis(String),
    FinalizeThesis,
    UnlockThesis,

    SetCategoryCandidates(Vec<String>),
    AppendCategoryCandidates(Vec<String>),
    ToggleCategory(String),
    AddCustomCategory(String),
    FinalizeCategories,
    UnlockCategories,

    SetMethodologyOptions {
        methodology_type: Option<String>,
        options: Vec<MethodologyOption>,
    },
    SelectMethodology(usize),
    FinalizeMethodology,
    UnlockMethodology,

    SetStructure(PaperStructure),
    ReplaceOutline {
        sections: Vec<Section>,
        stage: OutlineStage,
    },
    CompleteFramework,

    RecordDraftResponse {
        question_id: String,
        candidates: Vec<String>,
    },
    SelectDraftCandidate {
        question_id: String,
        index: usize,
    },
    CompleteDraftOne,
    SetFusedOutline(FusedOutline),
    CompleteDraftTwo,

    SetFinalText {
        part: FinalPart,
        text: String,
    },
    SetTransitions(BTreeMap<String, String>),
    SetRefinedSubsection {
        subsection_id: String,
        text: String,
    },

    SelectTab(Tab),
}

impl WizardEvent {
    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SelectPaperType(_) => "select_paper_type",
            Self::SetPaperLength(_) => "set_paper_length",
            Self::EditThesis(_) => "edit_thesis",
            Self::SetProbingQuestions(_) => "set_probing_questions",
            Self::ApplyRefinedThesis(_) => "apply_refined_thesis",
            Self::FinalizeThesis => "finalize_thesis",
            Self::UnlockThesis => "unlock_thesis",
            Self::SetCategoryCandidates(_) => "set_category_candidates",
            Self::AppendCategoryCandidates(_) => "append_category_candidates",
            Self::ToggleCategory(_) => "toggle_category",
            Self::AddCustomCategory(_) => "add_custom_category",
            Self::FinalizeCategories => "finalize_categories",
            Self::UnlockCategories => "unlock_categories",
            Self::SetMethodologyOptions { .. } => "set_methodology_options",
            Self::SelectMethodology(_) => "select_methodology",
            Self::FinalizeMethodology => "finalize_methodology",
            Self::UnlockMethodology => "unlock_methodology",
            Self::SetStructure(_) => "set_structure",
            Self::ReplaceOutline { .. } => "replace_outline",
            Self::CompleteFramework => "complete_framework",
            Self::RecordDraftResponse { .. } => "record_draft_response",
            Self::SelectDraftCandidate { .. } => "select_draft_candidate",
            Self::CompleteDraftOne => "complete_draft_one",
            Self::SetFusedOutline(_) => "set_fused_outline",
            Self::CompleteDraftTwo => "complete_draft_two",
            Self::SetFinalText { .. } => "set_final_text",
            Self::SetTransitions(_) => "set_transitions",
            Self::SetRefinedSubsection { .. } => "set_refined_subsection",
            Self::SelectTab(_) => "select_tab",
        }
    }

    /// Persistence mode for this event when it changes state.
    ///
    /// Milestones and freshly generated outlines are written immediately;
    /// everything else is debounced.
    #[must_use]
    pub const fn save_mode(&self) -> SaveMode {
        match self {
            Self::FinalizeThesis
            | Self::FinalizeCategories
            | Self::FinalizeMethodology
            | Self::ReplaceOutline { .. }
            | Self::CompleteFramework
            | Self::CompleteDraftOne
            | Self::SetFusedOutline(_)
            | Self::CompleteDraftTwo => SaveMode::Immediate,
            _ => SaveMode::Debounced,
        }
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Wizard progress: a thin wrapper over the persisted snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WizardState {
    data: WizardData,
}

/// Result of applying an event.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub state: WizardState,
    /// `SaveMode::None` when the event left the state unchanged.
    pub save_mode: SaveMode,
    /// Set when an unlock leaves later stages built on superseded input.
    pub warning: Option<String>,
}

impl From<WizardData> for WizardState {
    fn from(data: WizardData) -> Self {
        Self { data }
    }
}

impl WizardState {
    #[must_use]
    pub const fn data(&self) -> &WizardData {
        &self.data
    }

    #[must_use]
    pub fn into_data(self) -> WizardData {
        self.data
    }

    /// The earliest stage that is not yet finalized.
    #[must_use]
    pub const fn current_stage(&self) -> WizardStage {
        let d = &self.data;
        if d.selected_paper_type.is_none() {
            WizardStage::PaperType
        } else if !d.thesis_finalized {
            WizardStage::Thesis
        } else if !d.categories_finalized {
            WizardStage::SourceCategories
        } else if !d.ready_for_outline {
            WizardStage::Methodology
        } else if !d.framework_complete {
            WizardStage::OutlineFramework
        } else if !d.draft_one_complete {
            WizardStage::DraftOne
        } else if !d.draft_two_complete {
            WizardStage::DraftTwo
        } else {
            WizardStage::Final
        }
    }

    #[must_use]
    pub const fn tab_enabled(&self, tab: Tab) -> bool {
        match tab {
            Tab::Framework => self.data.ready_for_outline,
            Tab::Draft1 => self.data.framework_complete,
            Tab::Draft2 => self.data.draft_one_complete,
            Tab::Final => self.data.draft_two_complete,
        }
    }

    #[must_use]
    pub fn enabled_tabs(&self) -> Vec<Tab> {
        Tab::ALL.into_iter().filter(|t| self.tab_enabled(*t)).collect()
    }

    /// Check that events for `stage` would currently be accepted.
    ///
    /// Callers use this before starting remote work whose result will be
    /// applied to `stage`, so a locked stage costs no request.
    pub fn ensure_open(&self, stage: WizardStage) -> Result<(), CoreError> {
        let d = &self.data;
        match stage {
            WizardStage::PaperType | WizardStage::Thesis => thesis_open(d),
            WizardStage::SourceCategories => categories_open(d),
            WizardStage::Methodology => methodology_open(d),
            WizardStage::OutlineFramework => framework_open(d),
            WizardStage::DraftOne => drafts_open(d),
            WizardStage::DraftTwo => draft_two_open(d),
            WizardStage::Final => final_open(d),
        }
    }

    /// Apply `event`, returning the new state. `self` is never modified.
    pub fn apply(&self, event: WizardEvent) -> Result<Applied, CoreError> {
        let save = event.save_mode();
        let name = event.name();
        let mut next = self.clone();
        let warning = next.reduce(event)?;
        let save_mode = if next == *self { SaveMode::None } else { save };
        tracing::debug!(event = name, %save_mode, stage = %next.current_stage(), "wizard event applied");
        Ok(Applied {
            state: next,
            save_mode,
            warning,
        })
    }

    #[allow(clippy::too_many_lines)]
    fn reduce(&mut self, event: WizardEvent) -> Result<Option<String>, CoreError> {
        let d = &mut self.data;
        match event {
            WizardEvent::SelectPaperType(id) => {
                thesis_open(d)?;
                let paper_type = catalog::require_paper_type(&id)?;
                d.selected_paper_type = Some(paper_type.id.to_string());
                d.paper_length = paper_type.default_length;
            }
            WizardEvent::SetPaperLength(length) => {
                if d.categories_finalized {
                    return Err(CoreError::locked(
                        WizardStage::SourceCategories.as_str(),
                        "paper length is fixed once source categories are finalized",
                    ));
                }
                d.paper_length = length;
            }

            WizardEvent::EditThesis(text) => {
                thesis_open(d)?;
                d.thesis_draft = text;
            }
            WizardEvent::SetProbingQuestions(questions) => {
                thesis_open(d)?;
                d.probing_questions = questions;
            }
            WizardEvent::ApplyRefinedThesis(text) => {
                thesis_open(d)?;
                if text.trim().is_empty() {
                    return Err(CoreError::Validation("refined thesis is empty".into()));
                }
                d.thesis_draft = text;
                d.probing_questions.clear();
            }
            WizardEvent::FinalizeThesis => {
                thesis_open(d)?;
                if d.selected_paper_type.is_none() {
                    return Err(CoreError::locked(
                        WizardStage::Thesis.as_str(),
                        "select a paper type first",
                    ));
                }
                let thesis = d.thesis_draft.trim();
                if thesis.is_empty() {
                    return Err(CoreError::Validation("thesis is empty".into()));
                }
                d.final_thesis = thesis.to_string();
                d.thesis_finalized = true;
                d.source_categories_activated = true;
            }
            WizardEvent::UnlockThesis => {
                if !d.thesis_finalized {
                    return Err(not_finalized(WizardStage::Thesis));
                }
                d.thesis_finalized = false;
                if d.thesis_draft.is_empty() {
                    d.thesis_draft.clone_from(&d.final_thesis);
                }
                if d.categories_finalized || d.ready_for_outline {
                    return Ok(Some(
                        "source categories and later stages were built on the previous thesis"
                            .into(),
                    ));
                }
            }

            WizardEvent::SetCategoryCandidates(names) => {
                categories_open(d)?;
                d.category_candidates = dedup(names)
                    .into_iter()
                    .map(CategoryChoice::selected)
                    .collect();
            }
            WizardEvent::AppendCategoryCandidates(names) => {
                categories_open(d)?;
                for name in names {
                    if !has_category(d, &name) {
                        d.category_candidates.push(CategoryChoice::selected(name));
                    }
                }
            }
            WizardEvent::ToggleCategory(name) => {
                categories_open(d)?;
                let choice = d
                    .category_candidates
                    .iter_mut()
                    .find(|c| c.name == name)
                    .ok_or_else(|| CoreError::not_found("category", &name))?;
                choice.selected = !choice.selected;
            }
            WizardEvent::AddCustomCategory(name) => {
                categories_open(d)?;
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(CoreError::Validation("category name is empty".into()));
                }
                match d.category_candidates.iter_mut().find(|c| c.name == name) {
                    Some(existing) => existing.selected = true,
                    None => d.category_candidates.push(CategoryChoice::selected(name)),
                }
            }
            WizardEvent::FinalizeCategories => {
                categories_open(d)?;
                let selected = d.selected_categories();
                if selected.is_empty() {
                    return Err(CoreError::Validation(
                        "select at least one source category".into(),
                    ));
                }
                d.source_categories = selected;
                d.categories_finalized = true;
            }
            WizardEvent::UnlockCategories => {
                if !d.categories_finalized {
                    return Err(not_finalized(WizardStage::SourceCategories));
                }
                d.categories_finalized = false;
                if d.ready_for_outline {
                    return Ok(Some(
                        "the methodology was chosen for the previous source categories".into(),
                    ));
                }
            }

            WizardEvent::SetMethodologyOptions {
                methodology_type,
                options,
            } => {
                methodology_open(d)?;
                d.methodology_type = methodology_type;
                d.methodology_options = options;
            }
            WizardEvent::SelectMethodology(index) => {
                methodology_open(d)?;
                let option = d
                    .methodology_options
                    .get(index)
                    .ok_or_else(|| CoreError::not_found("methodology_option", index.to_string()))?;
                d.methodology = Some(Methodology::from_option(
                    option,
                    d.methodology_type.clone(),
                ));
            }
            WizardEvent::FinalizeMethodology => {
                methodology_open(d)?;
                if d.methodology.is_none() {
                    return Err(CoreError::Validation("no methodology selected".into()));
                }
                d.ready_for_outline = true;
                d.active_tab = Tab::Framework;
            }
            WizardEvent::UnlockMethodology => {
                if !d.ready_for_outline {
                    return Err(not_finalized(WizardStage::Methodology));
                }
                d.ready_for_outline = false;
                if !d.outline_data.is_empty() {
                    return Ok(Some(
                        "the outline was generated for the previous methodology".into(),
                    ));
                }
            }

            WizardEvent::SetStructure(structure) => {
                framework_open(d)?;
                d.structure = Some(structure);
                if d.outline_stage == OutlineStage::NoOutline {
                    d.outline_stage = OutlineStage::StructureDrafted;
                }
            }
            WizardEvent::ReplaceOutline { sections, stage } => {
                framework_open(d)?;
                if stage != d.outline_stage && !d.outline_stage.can_transition_to(stage) {
                    return Err(CoreError::InvalidTransition {
                        entity_type: "outline".into(),
                        from: d.outline_stage.to_string(),
                        to: stage.to_string(),
                    });
                }
                d.outline_data = sections;
                d.outline_stage = stage;
            }
            WizardEvent::CompleteFramework => {
                framework_open(d)?;
                if d.outline_data.is_empty() {
                    return Err(CoreError::Validation("the outline is empty".into()));
                }
                d.framework_complete = true;
                if d.outline_stage.can_transition_to(OutlineStage::Complete) {
                    d.outline_stage = OutlineStage::Complete;
                }
                d.active_tab = Tab::Draft1;
            }

            WizardEvent::RecordDraftResponse {
                question_id,
                candidates,
            } => {
                drafts_open(d)?;
                if find_question(&d.outline_data, &question_id).is_none() {
                    return Err(CoreError::not_found("question", question_id));
                }
                if candidates.is_empty() {
                    return Err(CoreError::Validation("draft response is empty".into()));
                }
                let response = d.draft_data.responses.entry(question_id).or_default();
                response.candidates.extend(candidates);
                response.selected = response.candidates.len() - 1;
            }
            WizardEvent::SelectDraftCandidate { question_id, index } => {
                drafts_open(d)?;
                let response = d
                    .draft_data
                    .responses
                    .get_mut(&question_id)
                    .ok_or_else(|| CoreError::not_found("draft_response", &question_id))?;
                if index >= response.candidates.len() {
                    return Err(CoreError::not_found(
                        "draft_candidate",
                        format!("{question_id}#{index}"),
                    ));
                }
                response.selected = index;
            }
            WizardEvent::CompleteDraftOne => {
                if !d.framework_complete {
                    return Err(CoreError::locked(
                        WizardStage::DraftOne.as_str(),
                        "complete the outline framework first",
                    ));
                }
                d.draft_one_complete = true;
                d.active_tab = Tab::Draft2;
            }
            WizardEvent::SetFusedOutline(outline) => {
                draft_two_open(d)?;
                if outline.sections.is_empty() {
                    return Err(CoreError::Validation("fused outline has no sections".into()));
                }
                d.fused_outline = Some(outline);
            }
            WizardEvent::CompleteDraftTwo => {
                if !d.draft_one_complete {
                    return Err(CoreError::locked(
                        WizardStage::DraftTwo.as_str(),
                        "complete draft one first",
                    ));
                }
                if d.fused_outline.is_none() {
                    return Err(CoreError::Validation(
                        "generate the fused outline first".into(),
                    ));
                }
                d.draft_two_complete = true;
                d.active_tab = Tab::Final;
            }

            WizardEvent::SetFinalText { part, text } => {
                final_open(d)?;
                if text.trim().is_empty() {
                    return Err(CoreError::Validation(format!("{part} text is empty")));
                }
                d.final_document.set_part(part, text);
            }
            WizardEvent::SetTransitions(transitions) => {
                final_open(d)?;
                d.final_document.transitions = transitions;
            }
            WizardEvent::SetRefinedSubsection {
                subsection_id,
                text,
            } => {
                final_open(d)?;
                let known = d
                    .outline_data
                    .iter()
                    .flat_map(|s| s.subsections.iter())
                    .any(|sub| sub.id == subsection_id);
                if !known {
                    return Err(CoreError::not_found("subsection", subsection_id));
                }
                d.final_document.refined_subsections.insert(subsection_id, text);
            }

            WizardEvent::SelectTab(tab) => {
                if !self.tab_enabled(tab) {
                    return Err(CoreError::locked(tab.as_str(), "tab is not enabled yet"));
                }
                self.data.active_tab = tab;
            }
        }
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Guards
// ---------------------------------------------------------------------------

fn thesis_open(d: &WizardData) -> Result<(), CoreError> {
    if d.thesis_finalized {
        return Err(CoreError::locked(
            WizardStage::Thesis.as_str(),
            "thesis is finalized; unlock it to edit",
        ));
    }
    Ok(())
}

fn categories_open(d: &WizardData) -> Result<(), CoreError> {
    if !d.source_categories_activated {
        return Err(CoreError::locked(
            WizardStage::SourceCategories.as_str(),
            "finalize the thesis first",
        ));
    }
    if d.categories_finalized {
        return Err(CoreError::locked(
            WizardStage::SourceCategories.as_str(),
            "source categories are finalized; unlock them to edit",
        ));
    }
    Ok(())
}

fn methodology_open(d: &WizardData) -> Result<(), CoreError> {
    if !d.categories_finalized {
        return Err(CoreError::locked(
            WizardStage::Methodology.as_str(),
            "finalize source categories first",
        ));
    }
    if d.ready_for_outline {
        return Err(CoreError::locked(
            WizardStage::Methodology.as_str(),
            "methodology is finalized; unlock it to edit",
        ));
    }
    Ok(())
}

fn framework_open(d: &WizardData) -> Result<(), CoreError> {
    if !d.ready_for_outline {
        return Err(CoreError::locked(
            WizardStage::OutlineFramework.as_str(),
            "finalize the methodology first",
        ));
    }
    if d.framework_complete {
        return Err(CoreError::locked(
            WizardStage::OutlineFramework.as_str(),
            "the outline framework is complete",
        ));
    }
    Ok(())
}

fn drafts_open(d: &WizardData) -> Result<(), CoreError> {
    if !d.framework_complete {
        return Err(CoreError::locked(
            WizardStage::DraftOne.as_str(),
            "complete the outline framework first",
        ));
    }
    if d.draft_two_complete {
        return Err(CoreError::locked(
            WizardStage::DraftTwo.as_str(),
            "drafts are complete",
        ));
    }
    Ok(())
}

fn draft_two_open(d: &WizardData) -> Result<(), CoreError> {
    if !d.draft_one_complete {
        return Err(CoreError::locked(
            WizardStage::DraftTwo.as_str(),
            "complete draft one first",
        ));
    }
    if d.draft_two_complete {
        return Err(CoreError::locked(
            WizardStage::DraftTwo.as_str(),
            "draft two is complete",
        ));
    }
    Ok(())
}

fn final_open(d: &WizardData) -> Result<(), CoreError> {
    if !d.draft_two_complete {
        return Err(CoreError::locked(
            WizardStage::Final.as_str(),
            "complete draft two first",
        ));
    }
    Ok(())
}

fn not_finalized(stage: WizardStage) -> CoreError {
    CoreError::locked(stage.as_str(), "stage is not finalized")
}

fn has_category(d: &WizardData, name: &str) -> bool {
    d.category_candidates.iter().any(|c| c.name == name)
}

fn dedup(names: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Question, Subsection};
    use crate::enums::SectionKind;
    use pretty_assertions::assert_eq;

    fn step(state: &WizardState, event: WizardEvent) -> WizardState {
        state.apply(event).unwrap().state
    }

    fn with_thesis() -> WizardState {
        let s = step(
            &WizardState::default(),
            WizardEvent::SelectPaperType("argumentative".into()),
        );
        let s = step(&s, WizardEvent::EditThesis("X should do Y".into()));
        step(&s, WizardEvent::FinalizeThesis)
    }

    #[test]
    fn ensure_open_tracks_guards() {
        let s = with_thesis();
        assert!(matches!(
            s.ensure_open(WizardStage::Thesis),
            Err(CoreError::StageLocked { .. })
        ));
        assert!(s.ensure_open(WizardStage::SourceCategories).is_ok());
        assert!(s.ensure_open(WizardStage::Methodology).is_err());
        assert!(s.ensure_open(WizardStage::OutlineFramework).is_err());
    }

    #[test]
    fn select_paper_type_applies_default_length() {
        let s = step(
            &WizardState::default(),
            WizardEvent::SelectPaperType("research".into()),
        );
        assert_eq!(s.data().paper_length, PaperLength::Pages(20));
        assert_eq!(s.current_stage(), WizardStage::Thesis);
    }

    #[test]
    fn unknown_paper_type_is_rejected() {
        let err = WizardState::default()
            .apply(WizardEvent::SelectPaperType("sonnet".into()))
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn finalize_thesis_requires_text() {
        let s = step(
            &WizardState::default(),
            WizardEvent::SelectPaperType("argumentative".into()),
        );
        let err = s.apply(WizardEvent::FinalizeThesis).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(!s.data().thesis_finalized);
    }

    #[test]
    fn finalized_thesis_rejects_edits_until_unlocked() {
        let s = with_thesis();
        assert!(matches!(
            s.apply(WizardEvent::EditThesis("new".into())),
            Err(CoreError::StageLocked { .. })
        ));

        let applied = s.apply(WizardEvent::UnlockThesis).unwrap();
        assert!(applied.warning.is_none());
        assert!(!applied.state.data().thesis_finalized);
        assert!(applied.state.data().source_categories_activated);
        assert_eq!(applied.state.data().final_thesis, "X should do Y");
    }

    #[test]
    fn refined_thesis_replaces_draft_and_clears_questions() {
        let s = step(
            &WizardState::default(),
            WizardEvent::SelectPaperType("argumentative".into()),
        );
        let s = step(&s, WizardEvent::SetProbingQuestions(vec!["Who?".into()]));
        let s = step(&s, WizardEvent::ApplyRefinedThesis("Sharper".into()));
        assert_eq!(s.data().thesis_draft, "Sharper");
        assert!(s.data().probing_questions.is_empty());
        assert!(s.apply(WizardEvent::ApplyRefinedThesis("  ".into())).is_err());
    }

    #[test]
    fn categories_need_activated_sources() {
        let err = WizardState::default()
            .apply(WizardEvent::SetCategoryCandidates(vec!["A".into()]))
            .unwrap_err();
        assert!(matches!(err, CoreError::StageLocked { .. }));
    }

    #[test]
    fn append_skips_known_categories() {
        let s = with_thesis();
        let s = step(
            &s,
            WizardEvent::SetCategoryCandidates(vec!["A".into(), "B".into(), "A".into()]),
        );
        let s = step(
            &s,
            WizardEvent::AppendCategoryCandidates(vec!["B".into(), "C".into()]),
        );
        let names: Vec<_> = s
            .data()
            .category_candidates
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn finalize_categories_requires_selection() {
        let s = with_thesis();
        let s = step(&s, WizardEvent::SetCategoryCandidates(vec!["A".into()]));
        let s = step(&s, WizardEvent::ToggleCategory("A".into()));
        assert!(matches!(
            s.apply(WizardEvent::FinalizeCategories),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn no_op_events_report_no_save() {
        let s = with_thesis();
        let s = step(&s, WizardEvent::SetCategoryCandidates(vec!["A".into()]));
        let applied = s
            .apply(WizardEvent::AppendCategoryCandidates(vec!["A".into()]))
            .unwrap();
        assert_eq!(applied.save_mode, SaveMode::None);

        let applied = s.apply(WizardEvent::AddCustomCategory("B".into())).unwrap();
        assert_eq!(applied.save_mode, SaveMode::Debounced);
    }

    #[test]
    fn tabs_follow_completion_flags() {
        let mut data = WizardData {
            ready_for_outline: true,
            ..WizardData::default()
        };
        let s = WizardState::from(data.clone());
        assert_eq!(s.enabled_tabs(), vec![Tab::Framework]);
        assert!(s.apply(WizardEvent::SelectTab(Tab::Draft1)).is_err());

        data.framework_complete = true;
        let s = WizardState::from(data);
        let s = step(&s, WizardEvent::SelectTab(Tab::Draft1));
        assert_eq!(s.data().active_tab, Tab::Draft1);
    }

    #[test]
    fn outline_stage_transitions_are_checked() {
        let s = WizardState::from(WizardData {
            ready_for_outline: true,
            ..WizardData::default()
        });
        let err = s
            .apply(WizardEvent::ReplaceOutline {
                sections: Vec::new(),
                stage: OutlineStage::QuestionsGenerated,
            })
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
    }

    #[test]
    fn draft_responses_accumulate_and_select_latest() {
        let mut section = Section::new("Findings", "", SectionKind::Data);
        let mut sub = Subsection::new("Wages", "");
        sub.questions.push(Question::new("What changed?"));
        section.subsections.push(sub);
        let qid = section.subsections[0].questions[0].id.clone();
        let s = WizardState::from(WizardData {
            ready_for_outline: true,
            framework_complete: true,
            outline_data: vec![section],
            ..WizardData::default()
        });

        let s = step(
            &s,
            WizardEvent::RecordDraftResponse {
                question_id: qid.clone(),
                candidates: vec!["first".into()],
            },
        );
        let s = step(
            &s,
            WizardEvent::RecordDraftResponse {
                question_id: qid.clone(),
                candidates: vec!["second".into()],
            },
        );
        assert_eq!(s.data().draft_data.responses[&qid].selected_text(), Some("second"));

        let s = step(
            &s,
            WizardEvent::SelectDraftCandidate {
                question_id: qid.clone(),
                index: 0,
            },
        );
        assert_eq!(s.data().draft_data.responses[&qid].selected_text(), Some("first"));

        assert!(matches!(
            s.apply(WizardEvent::RecordDraftResponse {
                question_id: "qst-00000000".into(),
                candidates: vec!["x".into()],
            }),
            Err(CoreError::NotFound { .. })
        ));
    }

    fn fused() -> FusedOutline {
        FusedOutline {
            outline_summary: "One arc".into(),
            sections: vec![crate::entities::FusedSection {
                title: "Spending".into(),
                ..crate::entities::FusedSection::default()
            }],
            ..FusedOutline::default()
        }
    }

    #[test]
    fn draft_two_needs_a_fused_outline() {
        let s = WizardState::from(WizardData {
            ready_for_outline: true,
            framework_complete: true,
            draft_one_complete: true,
            ..WizardData::default()
        });
        assert!(matches!(
            s.apply(WizardEvent::CompleteDraftTwo),
            Err(CoreError::Validation(_))
        ));
        assert!(s.apply(WizardEvent::SetFusedOutline(FusedOutline::default())).is_err());

        let applied = s.apply(WizardEvent::SetFusedOutline(fused())).unwrap();
        assert_eq!(applied.save_mode, SaveMode::Immediate);
        let s = step(&applied.state, WizardEvent::CompleteDraftTwo);
        assert_eq!(s.current_stage(), WizardStage::Final);
        assert!(matches!(
            s.apply(WizardEvent::SetFusedOutline(fused())),
            Err(CoreError::StageLocked { .. })
        ));
    }

    #[test]
    fn final_text_waits_for_draft_two() {
        let mut section = Section::new("Findings", "", SectionKind::Data);
        section.subsections.push(Subsection::new("Wages", ""));
        let sub_id = section.subsections[0].id.clone();
        let open = WizardState::from(WizardData {
            draft_two_complete: true,
            outline_data: vec![section],
            ..WizardData::default()
        });
        let closed = WizardState::default();
        let set_abstract = WizardEvent::SetFinalText {
            part: FinalPart::Abstract,
            text: "In short".into(),
        };

        assert!(matches!(
            closed.apply(set_abstract.clone()),
            Err(CoreError::StageLocked { .. })
        ));
        let applied = open.apply(set_abstract).unwrap();
        assert_eq!(applied.save_mode, SaveMode::Debounced);
        assert_eq!(applied.state.data().final_document.abstract_text, "In short");

        let s = step(
            &applied.state,
            WizardEvent::SetRefinedSubsection {
                subsection_id: sub_id.clone(),
                text: "Wages rose".into(),
            },
        );
        assert_eq!(s.data().final_document.refined_subsections[&sub_id], "Wages rose");
        assert!(matches!(
            s.apply(WizardEvent::SetRefinedSubsection {
                subsection_id: "sub-missing".into(),
                text: "x".into(),
            }),
            Err(CoreError::NotFound { .. })
        ));
        assert!(s
            .apply(WizardEvent::SetFinalText {
                part: FinalPart::Conclusion,
                text: " ".into(),
            })
            .is_err());
    }
}
