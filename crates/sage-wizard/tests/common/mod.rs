//! Scripted backend shared by the wizard integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use sage_client::wire::{
    AnswerProbingRequest, CitationResponseRequest, FinalTextRequest, FusedOutlineRequest,
    FusedResponseRequest, MethodologyGenerationRequest, PaperStructureRequest,
    ProbingQuestionsRequest, QuestionCitationRequest, QuestionsRequest, RecommendSourcesRequest,
    RefineSubsectionRequest, StructuredOutlineRequest, SubsectionsRequest,
};
use sage_client::{ClientError, GenerationBackend};
use sage_core::entities::{
    Citation, DraftResponse, FusedOutline, FusedSection, FusedSubsection, Methodology,
    MethodologyOption, PaperStructure, Question, Section, Subsection, WizardData,
};
use sage_core::enums::{FinalPart, SectionKind};

/// Records every call by operation name. Subsection requests for the
/// section titled `fail_section` return a 500, only on the first attempt
/// when `fail_once` is set.
#[derive(Default)]
pub struct ScriptedBackend {
    calls: Mutex<Vec<String>>,
    pub fail_section: Option<String>,
    pub fail_once: bool,
}

impl ScriptedBackend {
    pub fn failing_subsections_for(title: &str) -> Self {
        Self {
            fail_section: Some(title.to_string()),
            ..Self::default()
        }
    }

    pub fn failing_subsections_once_for(title: &str) -> Self {
        Self {
            fail_once: true,
            ..Self::failing_subsections_for(title)
        }
    }

    fn record(&self, op: &str, detail: &str) {
        let entry = if detail.is_empty() {
            op.to_string()
        } else {
            format!("{op}:{detail}")
        };
        self.calls.lock().unwrap().push(entry);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.as_str() == op || c.starts_with(&format!("{op}:")))
            .count()
    }
}

impl GenerationBackend for ScriptedBackend {
    async fn probing_questions(
        &self,
        req: &ProbingQuestionsRequest,
    ) -> Result<Vec<String>, ClientError> {
        self.record("probing_questions", &req.paper_type);
        Ok(vec!["Who is affected?".into(), "Over what period?".into()])
    }

    async fn answer_probing_questions(
        &self,
        req: &AnswerProbingRequest,
    ) -> Result<String, ClientError> {
        self.record("answer_probing_questions", "");
        Ok(format!("{} ({})", req.thesis, req.answers.join("; ")))
    }

    async fn recommend_sources(
        &self,
        req: &RecommendSourcesRequest,
    ) -> Result<Vec<String>, ClientError> {
        self.record("recommend_sources", "");
        if req.exclude.is_empty() {
            Ok(vec!["Economics".into(), "History".into()])
        } else {
            Ok(vec!["History".into(), "Law".into()])
        }
    }

    async fn generate_methodologies(
        &self,
        req: &MethodologyGenerationRequest,
    ) -> Result<Vec<MethodologyOption>, ClientError> {
        self.record("generate_methodologies", &req.methodology_type);
        Ok(vec![MethodologyOption {
            title: "Comparative Case Study".into(),
            description: "Three cases".into(),
            ..MethodologyOption::default()
        }])
    }

    async fn paper_structure(
        &self,
        req: &PaperStructureRequest,
    ) -> Result<PaperStructure, ClientError> {
        self.record("paper_structure", &req.paper_type);
        Ok(PaperStructure {
            paper_type: req.paper_type.clone(),
            sections: vec!["Introduction".into(), "Findings".into(), "References".into()],
            ..PaperStructure::default()
        })
    }

    async fn structured_outline(
        &self,
        _req: &StructuredOutlineRequest,
    ) -> Result<Vec<Section>, ClientError> {
        self.record("structured_outline", "");
        Ok(skeleton())
    }

    async fn subsections(&self, req: &SubsectionsRequest) -> Result<Vec<Subsection>, ClientError> {
        self.record("subsections", &req.section_title);
        let attempts = self.count(&format!("subsections:{}", req.section_title));
        if self.fail_section.as_deref() == Some(req.section_title.as_str())
            && !(self.fail_once && attempts > 1)
        {
            return Err(ClientError::Api {
                status: 500,
                message: "model unavailable".into(),
            });
        }
        Ok(vec![Subsection::new(
            format!("{} overview", req.section_title),
            "",
        )])
    }

    async fn questions(&self, req: &QuestionsRequest) -> Result<Vec<Question>, ClientError> {
        self.record("questions", &req.subsection_title);
        Ok(vec![Question::new(format!(
            "What does {} show?",
            req.subsection_title
        ))])
    }

    async fn question_citations(
        &self,
        req: &QuestionCitationRequest,
    ) -> Result<Vec<Citation>, ClientError> {
        self.record("question_citations", &req.question);
        Ok(vec![citation("Smith, A. (2020)."), citation("Lee, B. (2018).")])
    }

    async fn citation_response(
        &self,
        req: &CitationResponseRequest,
    ) -> Result<String, ClientError> {
        self.record("citation_response", &req.citation.apa);
        Ok(format!("response {}", req.citation_number))
    }

    async fn fused_response(&self, req: &FusedResponseRequest) -> Result<String, ClientError> {
        self.record("fused_response", "");
        Ok(format!("fused from {}", req.citation_responses.len()))
    }

    async fn fused_outline(&self, req: &FusedOutlineRequest) -> Result<FusedOutline, ClientError> {
        let titles: Vec<&str> = req
            .data_sections
            .iter()
            .map(|s| s.section_title.as_str())
            .collect();
        self.record("fused_outline", &titles.join(","));
        Ok(fused())
    }

    async fn final_text(
        &self,
        part: FinalPart,
        req: &FinalTextRequest,
    ) -> Result<String, ClientError> {
        self.record("final_text", part.as_str());
        Ok(format!("{} over {} responses", part.title(), req.responses.len()))
    }

    async fn transitions(
        &self,
        _req: &FinalTextRequest,
    ) -> Result<BTreeMap<String, String>, ClientError> {
        self.record("transitions", "");
        Ok(BTreeMap::from([("II".to_string(), "Turning to the cases.".to_string())]))
    }

    async fn refine_subsection(
        &self,
        req: &RefineSubsectionRequest,
    ) -> Result<String, ClientError> {
        self.record("refine_subsection", &req.subsection_title);
        Ok(format!("{} in prose", req.responses.join(" ")))
    }
}

pub fn citation(apa: &str) -> Citation {
    Citation {
        apa: apa.into(),
        ..Citation::default()
    }
}

pub fn skeleton() -> Vec<Section> {
    vec![
        Section::new("Introduction", "Frames the question", SectionKind::Content),
        Section::new("Findings", "Evidence from the cases", SectionKind::Data),
        Section::new("References", "", SectionKind::Administrative),
    ]
}

/// Paper type, thesis and categories finalized; methodology chosen.
pub fn ready_for_outline() -> WizardData {
    WizardData {
        selected_paper_type: Some("argumentative".into()),
        thesis_draft: "Regional budgets shape posture".into(),
        final_thesis: "Regional budgets shape posture".into(),
        thesis_finalized: true,
        source_categories_activated: true,
        source_categories: vec!["Economics".into()],
        categories_finalized: true,
        methodology: Some(Methodology {
            title: "Comparative Case Study".into(),
            methodology_id: Some("comparative".into()),
            ..Methodology::default()
        }),
        ready_for_outline: true,
        ..WizardData::default()
    }
}

/// A completed framework whose data section has two cited questions.
pub fn ready_for_drafts() -> WizardData {
    let mut first = Question::new("How did spending change?");
    first.citations = vec![citation("Smith, A. (2020)."), citation("Lee, B. (2018).")];
    let mut second = Question::new("Which units moved?");
    second.citations = vec![citation("Lee, B. (2018).")];
    let mut sub = Subsection::new("Budget trends", "");
    sub.questions = vec![first, second];
    let mut findings = Section::new("Findings", "", SectionKind::Data);
    findings.subsections = vec![sub];

    WizardData {
        outline_data: vec![
            Section::new("Introduction", "", SectionKind::Content),
            findings,
        ],
        framework_complete: true,
        ..ready_for_outline()
    }
}

pub fn fused() -> FusedOutline {
    FusedOutline {
        outline_summary: "One arc".into(),
        sections: vec![FusedSection {
            title: "Spending".into(),
            subsections: vec![FusedSubsection {
                title: "Trends".into(),
                content: "Budgets rose".into(),
                citations: vec![citation("Smith, A. (2020).")],
                ..FusedSubsection::default()
            }],
            ..FusedSection::default()
        }],
        ..FusedOutline::default()
    }
}

/// Draft one complete with the first data question drafted.
pub fn ready_for_draft_two() -> WizardData {
    let mut data = ready_for_drafts();
    let qid = data.outline_data[1].subsections[0].questions[0].id.clone();
    data.draft_data
        .responses
        .insert(qid, DraftResponse::latest(vec!["Spending doubled.".into()]));
    data.draft_one_complete = true;
    data
}

/// Both drafts complete with a fused outline in place.
pub fn ready_for_final() -> WizardData {
    WizardData {
        fused_outline: Some(fused()),
        draft_two_complete: true,
        ..ready_for_draft_two()
    }
}
