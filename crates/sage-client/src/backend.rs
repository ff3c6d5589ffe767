//! The generation backend seam.
//!
//! [`GenerationBackend`] is what the wizard session and outline pipeline
//! talk to. [`BackendClient`](crate::BackendClient) implements it over HTTP;
//! tests implement only the operations they exercise and inherit
//! [`ClientError::Unsupported`] for the rest.

use std::future::Future;

use std::collections::BTreeMap;

use sage_core::entities::{
    Citation, FusedOutline, MethodologyOption, MethodologyType, PaperStructure, Question, Section,
    Subsection,
};
use sage_core::enums::FinalPart;

use crate::error::ClientError;
use crate::wire::{
    AnswerProbingRequest, AutoRefineRequest, CitationResponseRequest, CitationSearchRequest,
    FinalTextRequest, FusedOutlineRequest, FusedResponseRequest, KbResult,
    MethodologyGenerationRequest, PaperStructureRequest, ProbingQuestionsRequest, PromptRequest,
    QuestionCitationRequest, QuestionsRequest, RecommendSourcesRequest, RefineSubsectionRequest,
    RefineThesisRequest, StructuredOutlineRequest, SubsectionsRequest,
};

type Reply<T> = Result<T, ClientError>;

pub trait GenerationBackend: Send + Sync {
    fn ai_response(&self, _req: &PromptRequest) -> impl Future<Output = Reply<String>> + Send {
        async { Err(ClientError::Unsupported("ai_response")) }
    }

    fn probing_questions(
        &self,
        _req: &ProbingQuestionsRequest,
    ) -> impl Future<Output = Reply<Vec<String>>> + Send {
        async { Err(ClientError::Unsupported("probing_questions")) }
    }

    fn answer_probing_questions(
        &self,
        _req: &AnswerProbingRequest,
    ) -> impl Future<Output = Reply<String>> + Send {
        async { Err(ClientError::Unsupported("answer_probing_questions")) }
    }

    fn refine_thesis(
        &self,
        _req: &RefineThesisRequest,
    ) -> impl Future<Output = Reply<String>> + Send {
        async { Err(ClientError::Unsupported("refine_thesis")) }
    }

    fn auto_refine_thesis(
        &self,
        _req: &AutoRefineRequest,
    ) -> impl Future<Output = Reply<String>> + Send {
        async { Err(ClientError::Unsupported("auto_refine_thesis")) }
    }

    /// Ranked source categories for the thesis, best first.
    fn recommend_sources(
        &self,
        _req: &RecommendSourcesRequest,
    ) -> impl Future<Output = Reply<Vec<String>>> + Send {
        async { Err(ClientError::Unsupported("recommend_sources")) }
    }

    fn methodology_catalog(&self) -> impl Future<Output = Reply<Vec<MethodologyType>>> + Send {
        async { Err(ClientError::Unsupported("methodology_catalog")) }
    }

    fn generate_methodologies(
        &self,
        _req: &MethodologyGenerationRequest,
    ) -> impl Future<Output = Reply<Vec<MethodologyOption>>> + Send {
        async { Err(ClientError::Unsupported("generate_methodologies")) }
    }

    fn paper_structure(
        &self,
        _req: &PaperStructureRequest,
    ) -> impl Future<Output = Reply<PaperStructure>> + Send {
        async { Err(ClientError::Unsupported("paper_structure")) }
    }

    /// Section skeleton for the outline; subsections are usually empty.
    fn structured_outline(
        &self,
        _req: &StructuredOutlineRequest,
    ) -> impl Future<Output = Reply<Vec<Section>>> + Send {
        async { Err(ClientError::Unsupported("structured_outline")) }
    }

    fn subsections(
        &self,
        _req: &SubsectionsRequest,
    ) -> impl Future<Output = Reply<Vec<Subsection>>> + Send {
        async { Err(ClientError::Unsupported("subsections")) }
    }

    fn questions(
        &self,
        _req: &QuestionsRequest,
    ) -> impl Future<Output = Reply<Vec<Question>>> + Send {
        async { Err(ClientError::Unsupported("questions")) }
    }

    fn question_citations(
        &self,
        _req: &QuestionCitationRequest,
    ) -> impl Future<Output = Reply<Vec<Citation>>> + Send {
        async { Err(ClientError::Unsupported("question_citations")) }
    }

    fn identify_citation(
        &self,
        _req: &CitationSearchRequest,
    ) -> impl Future<Output = Reply<Citation>> + Send {
        async { Err(ClientError::Unsupported("identify_citation")) }
    }

    /// Draft answer to one question drawn from a single citation.
    fn citation_response(
        &self,
        _req: &CitationResponseRequest,
    ) -> impl Future<Output = Reply<String>> + Send {
        async { Err(ClientError::Unsupported("citation_response")) }
    }

    /// Master answer combining the per-citation drafts.
    fn fused_response(
        &self,
        _req: &FusedResponseRequest,
    ) -> impl Future<Output = Reply<String>> + Send {
        async { Err(ClientError::Unsupported("fused_response")) }
    }

    /// Restructured outline built from the drafted data sections.
    fn fused_outline(
        &self,
        _req: &FusedOutlineRequest,
    ) -> impl Future<Output = Reply<FusedOutline>> + Send {
        async { Err(ClientError::Unsupported("fused_outline")) }
    }

    fn final_text(
        &self,
        _part: FinalPart,
        _req: &FinalTextRequest,
    ) -> impl Future<Output = Reply<String>> + Send {
        async { Err(ClientError::Unsupported("final_text")) }
    }

    /// Transition sentences keyed by outline marker path (`"I.A"`).
    fn transitions(
        &self,
        _req: &FinalTextRequest,
    ) -> impl Future<Output = Reply<BTreeMap<String, String>>> + Send {
        async { Err(ClientError::Unsupported("transitions")) }
    }

    fn refine_subsection(
        &self,
        _req: &RefineSubsectionRequest,
    ) -> impl Future<Output = Reply<String>> + Send {
        async { Err(ClientError::Unsupported("refine_subsection")) }
    }

    fn query_kb(&self, _query: &str) -> impl Future<Output = Reply<Vec<KbResult>>> + Send {
        async { Err(ClientError::Unsupported("query_kb")) }
    }
}
