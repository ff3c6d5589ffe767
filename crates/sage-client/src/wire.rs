//! Request and response bodies for the backend endpoints.
//!
//! Requests are public so callers (and test doubles) can build and inspect
//! them. Responses stay crate-private and are converted into `sage-core`
//! entities before leaving the client.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use sage_core::entities::{
    Citation, Methodology, MethodologyOption, MethodologyType, PaperStructure, Question, Section,
    Subsection,
};
use sage_core::enums::SectionKind;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptRequest {
    pub prompt: String,
}

/// Thesis plus the descriptors of the selected paper type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProbingQuestionsRequest {
    pub thesis: String,
    pub paper_type: String,
    pub paper_purpose: String,
    pub paper_tone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnswerProbingRequest {
    pub thesis: String,
    pub questions: Vec<String>,
    pub answers: Vec<String>,
    pub paper_type: String,
    pub paper_purpose: String,
    pub paper_tone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefineThesisRequest {
    pub current_topic: String,
    pub user_responses: Vec<String>,
    pub history: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutoRefineRequest {
    pub thesis: String,
}

/// `exclude` lists categories already on screen so "more" requests return
/// new ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecommendSourcesRequest {
    pub final_thesis: String,
    pub paper_length_pages: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MethodologyGenerationRequest {
    pub methodology_type: String,
    pub final_thesis: String,
    pub paper_type: String,
    pub paper_purpose: String,
    pub paper_tone: String,
    pub paper_structure: String,
    pub source_categories: Vec<String>,
    pub page_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaperStructureRequest {
    pub paper_type: String,
    pub methodology_id: Option<String>,
    pub sub_methodology_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StructuredOutlineRequest {
    pub final_thesis: String,
    pub paper_type: String,
    pub methodology: Methodology,
    pub paper_length_pages: i64,
    pub source_categories: Vec<String>,
    pub methodology_id: Option<String>,
    pub sub_methodology_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubsectionsRequest {
    pub final_thesis: String,
    pub methodology: String,
    pub section_title: String,
    pub section_context: String,
    pub paper_length_pages: i64,
    pub source_categories: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuestionsRequest {
    pub final_thesis: String,
    pub methodology: String,
    pub section_title: String,
    pub section_context: String,
    pub subsection_title: String,
    pub subsection_context: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuestionCitationRequest {
    pub final_thesis: String,
    pub methodology: String,
    pub section_title: String,
    pub section_context: String,
    pub subsection_title: String,
    pub subsection_context: String,
    pub question: String,
    pub source_categories: Vec<String>,
    pub citation_count: u32,
}

/// Partial bibliographic details to resolve into a full citation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CitationSearchRequest {
    pub title: String,
    pub source: String,
    pub year: String,
    pub author: String,
}

/// Citation as referenced from a drafting request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CitationRef {
    pub apa: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
}

impl CitationRef {
    #[must_use]
    pub fn numbered(citation: &Citation, number: usize) -> Self {
        Self {
            apa: citation.apa.clone(),
            reference_id: Some(number.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CitationResponseRequest {
    pub question: String,
    pub citation: CitationRef,
    pub section_context: String,
    pub subsection_context: String,
    pub thesis: String,
    pub methodology: String,
    pub question_number: usize,
    pub citation_number: usize,
    pub reference_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FusedResponseRequest {
    pub question: String,
    pub citation_responses: Vec<String>,
    pub citations: Vec<CitationRef>,
    pub section_context: String,
    pub subsection_context: String,
    pub thesis: String,
    pub methodology: String,
    pub question_number: usize,
}

/// Drafted answers and citations gathered from one data section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DataSectionDigest {
    pub section_title: String,
    pub section_context: String,
    /// Selected draft of every answered question, in outline order.
    pub all_responses: Vec<String>,
    pub all_citations: Vec<Citation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FusedOutlineRequest {
    pub data_sections: Vec<DataSectionDigest>,
    pub thesis: String,
    pub methodology: String,
    pub paper_type: String,
}

/// Shared body of the final-document endpoints. `responses` maps question
/// ids to their selected drafts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FinalTextRequest {
    pub outline: Vec<Section>,
    pub responses: BTreeMap<String, String>,
    pub thesis: String,
    pub methodology: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefineSubsectionRequest {
    pub section_title: String,
    pub subsection_title: String,
    pub thesis: String,
    pub methodology: String,
    pub responses: Vec<String>,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub(crate) struct TextResponse {
    pub response: String,
}

#[derive(Deserialize)]
pub(crate) struct FinalTextResponse {
    pub text: String,
}

#[derive(Deserialize)]
pub(crate) struct TransitionsResponse {
    #[serde(default)]
    pub transitions: BTreeMap<String, String>,
}

#[derive(Deserialize)]
pub(crate) struct ProbingQuestionsResponse {
    pub questions: Vec<String>,
}

#[derive(Deserialize)]
pub(crate) struct RefinedThesisResponse {
    pub refined_thesis: String,
}

#[derive(Deserialize)]
pub(crate) struct RecommendedCategoriesResponse {
    pub recommended_categories: Vec<String>,
}

#[derive(Deserialize)]
pub(crate) struct MethodologyCatalogResponse {
    pub methodologies: Vec<MethodologyType>,
}

#[derive(Deserialize)]
pub(crate) struct GeneratedMethodologiesResponse {
    pub methodologies: Vec<MethodologyOption>,
}

#[derive(Deserialize)]
pub(crate) struct PaperStructureResponse {
    pub paper_type: String,
    #[serde(default)]
    pub methodology: Option<String>,
    pub structure: Vec<String>,
    #[serde(default)]
    pub has_methodology_sections: bool,
}

impl From<PaperStructureResponse> for PaperStructure {
    fn from(r: PaperStructureResponse) -> Self {
        Self {
            paper_type: r.paper_type,
            methodology: r.methodology,
            sections: r.structure,
            has_methodology_sections: r.has_methodology_sections,
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct StructuredOutlineResponse {
    pub outline: Vec<OutlineSectionWire>,
}

#[derive(Deserialize)]
pub(crate) struct OutlineSectionWire {
    pub section_title: String,
    #[serde(default)]
    pub section_context: String,
    #[serde(default)]
    pub subsections: Vec<SubsectionWire>,
    #[serde(default)]
    pub is_administrative: bool,
    #[serde(default)]
    pub is_data_section: bool,
    #[serde(default)]
    pub section_type: Option<String>,
    #[serde(default)]
    pub pages_allocated: Option<f64>,
}

impl OutlineSectionWire {
    fn kind(&self) -> SectionKind {
        if self.is_administrative {
            return SectionKind::Administrative;
        }
        if self.is_data_section {
            return SectionKind::Data;
        }
        match self.section_type.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("data") => SectionKind::Data,
            Some("methodology") => SectionKind::Methodology,
            Some("analysis") => SectionKind::Analysis,
            Some("administrative") => SectionKind::Administrative,
            _ => SectionKind::Content,
        }
    }
}

impl From<OutlineSectionWire> for Section {
    fn from(wire: OutlineSectionWire) -> Self {
        let kind = wire.kind();
        let mut section = Self::new(wire.section_title, wire.section_context, kind);
        section.pages_allocated = wire.pages_allocated;
        section.subsections = wire.subsections.into_iter().map(Subsection::from).collect();
        section
    }
}

#[derive(Deserialize)]
pub(crate) struct SubsectionsResponse {
    pub subsections: Vec<SubsectionWire>,
}

#[derive(Deserialize)]
pub(crate) struct SubsectionWire {
    pub subsection_title: String,
    #[serde(default)]
    pub subsection_context: String,
}

impl From<SubsectionWire> for Subsection {
    fn from(wire: SubsectionWire) -> Self {
        Self::new(wire.subsection_title, wire.subsection_context)
    }
}

#[derive(Deserialize)]
pub(crate) struct QuestionsResponse {
    pub questions: Vec<QuestionWire>,
}

/// Questions arrive either as bare strings or as `{"question": ...}`.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum QuestionWire {
    Text(String),
    Object { question: String },
}

impl From<QuestionWire> for Question {
    fn from(wire: QuestionWire) -> Self {
        match wire {
            QuestionWire::Text(text) | QuestionWire::Object { question: text } => Self::new(text),
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct CitationsResponse {
    #[serde(alias = "citations")]
    pub recommended_sources: Vec<Citation>,
}

#[derive(Deserialize)]
pub(crate) struct IdentifiedCitationResponse {
    pub citation: Citation,
}

#[derive(Deserialize)]
pub(crate) struct KbResponse {
    #[serde(default)]
    pub results: Vec<KbHitWire>,
}

#[derive(Deserialize)]
pub(crate) struct KbHitWire {
    pub content: KbContentWire,
    #[serde(default)]
    pub score: f64,
}

#[derive(Deserialize)]
pub(crate) struct KbContentWire {
    #[serde(default)]
    pub text: String,
}

/// One passage returned by the knowledge-base query endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KbResult {
    pub text: String,
    pub score: f64,
}

impl From<KbHitWire> for KbResult {
    fn from(hit: KbHitWire) -> Self {
        Self {
            text: hit.content.text,
            score: hit.score,
        }
    }
}
