//! Outline generation pipeline.
//!
//! After the section skeleton exists, the outline is filled in three
//! strictly sequential passes, each paced by a [`Throttle`]:
//!
//! 1. subsections for every non-administrative section
//! 2. questions for every subsection of a data section
//! 3. citations for every question of a data section
//!
//! Units that already have content are skipped, so an interrupted pass can
//! be resumed. A failed unit is logged and left empty; the pass continues
//! and the outline stage still advances when it finishes. A pass whose stage
//! was already reached may run again while it still has empty units, which
//! retries exactly the units that failed.

use sage_client::{GenerationBackend, Throttle};
use sage_core::entities::{Section, WizardData};
use sage_core::enums::OutlineStage;

use crate::context;
use crate::error::WizardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Subsections,
    Questions,
    Citations,
}

impl Phase {
    pub const ALL: [Self; 3] = [Self::Subsections, Self::Questions, Self::Citations];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Subsections => "subsections",
            Self::Questions => "questions",
            Self::Citations => "citations",
        }
    }

    /// Stage reached once this pass completes.
    #[must_use]
    pub const fn completes(self) -> OutlineStage {
        match self {
            Self::Subsections => OutlineStage::SubsectionsGenerated,
            Self::Questions => OutlineStage::QuestionsGenerated,
            Self::Citations => OutlineStage::CitationsGenerated,
        }
    }

    /// The pass that runs from `stage`, if any.
    #[must_use]
    pub const fn after(stage: OutlineStage) -> Option<Self> {
        match stage {
            OutlineStage::SectionsGenerated => Some(Self::Subsections),
            OutlineStage::SubsectionsGenerated => Some(Self::Questions),
            OutlineStage::QuestionsGenerated => Some(Self::Citations),
            OutlineStage::NoOutline
            | OutlineStage::StructureDrafted
            | OutlineStage::CitationsGenerated
            | OutlineStage::Complete => None,
        }
    }

    /// Units this pass would request for `sections`.
    #[must_use]
    pub fn pending(self, sections: &[Section]) -> usize {
        match self {
            Self::Subsections => subsection_targets(sections).len(),
            Self::Questions => question_targets(sections).len(),
            Self::Citations => citation_targets(sections).len(),
        }
    }

    /// Whether this pass may run at `stage`: either it is the next pass, or
    /// its stage was already reached and some of its units are still empty.
    #[must_use]
    pub fn can_run(self, stage: OutlineStage, sections: &[Section]) -> bool {
        if Self::after(stage) == Some(self) {
            return true;
        }
        stage != OutlineStage::Complete
            && self.completes() <= stage
            && self.pending(sections) > 0
    }
}

fn subsection_targets(sections: &[Section]) -> Vec<usize> {
    sections
        .iter()
        .enumerate()
        .filter(|(_, s)| !s.kind.is_administrative() && s.subsections.is_empty())
        .map(|(i, _)| i)
        .collect()
}

fn question_targets(sections: &[Section]) -> Vec<(usize, usize)> {
    sections
        .iter()
        .enumerate()
        .filter(|(_, s)| s.kind.is_data())
        .flat_map(|(si, s)| {
            s.subsections
                .iter()
                .enumerate()
                .filter(|(_, sub)| sub.questions.is_empty())
                .map(move |(ssi, _)| (si, ssi))
        })
        .collect()
}

fn citation_targets(sections: &[Section]) -> Vec<(usize, usize, usize)> {
    let mut targets = Vec::new();
    for (si, section) in sections.iter().enumerate() {
        if !section.kind.is_data() {
            continue;
        }
        for (ssi, subsection) in section.subsections.iter().enumerate() {
            for (qi, question) in subsection.questions.iter().enumerate() {
                if question.citations.is_empty() {
                    targets.push((si, ssi, qi));
                }
            }
        }
    }
    targets
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub phase: Phase,
    pub done: usize,
    pub total: usize,
    /// Title of the unit just processed.
    pub label: String,
}

pub type ProgressFn<'a> = dyn Fn(&Progress) + Send + Sync + 'a;

/// Counts for one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    pub requested: usize,
    pub failed: usize,
}

/// Output of one pass: the updated outline and the stage it reached.
#[derive(Debug, Clone, PartialEq)]
pub struct PassOutcome {
    pub phase: Phase,
    pub sections: Vec<Section>,
    pub stage: OutlineStage,
    pub report: PassReport,
}

pub struct OutlinePipeline<'a, B> {
    backend: &'a B,
    throttle: Throttle,
    on_progress: Option<&'a ProgressFn<'a>>,
}

impl<'a, B: GenerationBackend> OutlinePipeline<'a, B> {
    #[must_use]
    pub const fn new(backend: &'a B, throttle: Throttle) -> Self {
        Self {
            backend,
            throttle,
            on_progress: None,
        }
    }

    #[must_use]
    pub fn with_progress(mut self, on_progress: &'a ProgressFn<'a>) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    /// Run `phase` over the empty units of `data`'s outline. The outcome's
    /// stage never falls behind the current one, so re-running an earlier
    /// pass keeps the stage where it is.
    ///
    /// # Errors
    ///
    /// Only throttle failures surface; per-unit backend errors are absorbed.
    pub async fn run(&self, phase: Phase, data: &WizardData) -> Result<PassOutcome, WizardError> {
        let mut sections = data.outline_data.clone();
        let report = match phase {
            Phase::Subsections => self.subsections(data, &mut sections).await?,
            Phase::Questions => self.questions(data, &mut sections).await?,
            Phase::Citations => self.citations(data, &mut sections).await?,
        };
        tracing::info!(
            phase = phase.as_str(),
            requested = report.requested,
            failed = report.failed,
            "outline pass finished"
        );
        Ok(PassOutcome {
            phase,
            sections,
            stage: phase.completes().max(data.outline_stage),
            report,
        })
    }

    /// Generate subsections for non-administrative sections that have none.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Client`] only if the throttle is closed.
    pub async fn subsections(
        &self,
        data: &WizardData,
        sections: &mut [Section],
    ) -> Result<PassReport, WizardError> {
        let targets = subsection_targets(sections);

        let mut report = PassReport::default();
        for (done, &si) in targets.iter().enumerate() {
            let request = context::subsections(data, &sections[si]);
            let _permit = self.throttle.acquire().await?;
            report.requested += 1;
            match self.backend.subsections(&request).await {
                Ok(subsections) => sections[si].subsections = subsections,
                Err(err) => {
                    report.failed += 1;
                    tracing::warn!(section = %sections[si].title, %err, "subsection generation failed");
                }
            }
            self.report(Phase::Subsections, done + 1, targets.len(), &sections[si].title);
        }
        Ok(report)
    }

    /// Generate questions for data-section subsections that have none.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Client`] only if the throttle is closed.
    pub async fn questions(
        &self,
        data: &WizardData,
        sections: &mut [Section],
    ) -> Result<PassReport, WizardError> {
        let targets = question_targets(sections);

        let mut report = PassReport::default();
        for (done, &(si, ssi)) in targets.iter().enumerate() {
            let request = context::questions(data, &sections[si], &sections[si].subsections[ssi]);
            let _permit = self.throttle.acquire().await?;
            report.requested += 1;
            let subsection = &mut sections[si].subsections[ssi];
            match self.backend.questions(&request).await {
                Ok(questions) => subsection.questions = questions,
                Err(err) => {
                    report.failed += 1;
                    tracing::warn!(subsection = %subsection.title, %err, "question generation failed");
                }
            }
            self.report(Phase::Questions, done + 1, targets.len(), &subsection.title);
        }
        Ok(report)
    }

    /// Generate citations for data-section questions that have none.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Client`] only if the throttle is closed.
    pub async fn citations(
        &self,
        data: &WizardData,
        sections: &mut [Section],
    ) -> Result<PassReport, WizardError> {
        let targets = citation_targets(sections);

        let mut report = PassReport::default();
        for (done, &(si, ssi, qi)) in targets.iter().enumerate() {
            let section = &sections[si];
            let subsection = &section.subsections[ssi];
            let request =
                context::question_citations(data, section, subsection, &subsection.questions[qi]);
            let _permit = self.throttle.acquire().await?;
            report.requested += 1;
            let question = &mut sections[si].subsections[ssi].questions[qi];
            match self.backend.question_citations(&request).await {
                Ok(citations) => question.citations = citations,
                Err(err) => {
                    report.failed += 1;
                    tracing::warn!(question = %question.text, %err, "citation generation failed");
                }
            }
            self.report(Phase::Citations, done + 1, targets.len(), &question.text);
        }
        Ok(report)
    }

    fn report(&self, phase: Phase, done: usize, total: usize, label: &str) {
        if let Some(on_progress) = self.on_progress {
            on_progress(&Progress {
                phase,
                done,
                total,
                label: label.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sage_core::entities::Subsection;
    use sage_core::enums::SectionKind;

    #[test]
    fn passes_follow_stage_order() {
        assert_eq!(Phase::after(OutlineStage::NoOutline), None);
        assert_eq!(
            Phase::after(OutlineStage::SectionsGenerated),
            Some(Phase::Subsections)
        );
        assert_eq!(
            Phase::after(Phase::Subsections.completes()),
            Some(Phase::Questions)
        );
        assert_eq!(
            Phase::after(Phase::Questions.completes()),
            Some(Phase::Citations)
        );
        assert_eq!(Phase::after(Phase::Citations.completes()), None);
    }

    fn outline(first_subsections: usize) -> Vec<Section> {
        let mut findings = Section::new("Findings", "", SectionKind::Data);
        for i in 0..first_subsections {
            findings.subsections.push(Subsection::new(format!("Part {i}"), ""));
        }
        vec![
            findings,
            Section::new("Results", "", SectionKind::Data),
            Section::new("References", "", SectionKind::Administrative),
        ]
    }

    #[test]
    fn completed_pass_reruns_only_while_units_are_empty() {
        let gap = outline(2);
        let stage = OutlineStage::QuestionsGenerated;
        assert_eq!(Phase::Subsections.pending(&gap), 1);
        assert!(Phase::Subsections.can_run(stage, &gap));
        assert!(Phase::Citations.can_run(stage, &gap));

        let mut filled = gap;
        filled[1].subsections.push(Subsection::new("Only part", ""));
        assert_eq!(Phase::Subsections.pending(&filled), 0);
        assert!(!Phase::Subsections.can_run(stage, &filled));
        assert!(!Phase::Subsections.can_run(OutlineStage::Complete, &outline(0)));
    }

    #[test]
    fn later_pass_cannot_skip_ahead() {
        let sections = outline(1);
        assert!(!Phase::Questions.can_run(OutlineStage::SectionsGenerated, &sections));
        assert!(!Phase::Citations.can_run(OutlineStage::SubsectionsGenerated, &sections));
    }

    #[test]
    fn every_pass_is_a_legal_transition() {
        for phase in [Phase::Subsections, Phase::Questions, Phase::Citations] {
            let mut from = OutlineStage::SectionsGenerated;
            while Phase::after(from) != Some(phase) {
                from = Phase::after(from).unwrap().completes();
            }
            assert!(from.can_transition_to(phase.completes()));
        }
    }
}
