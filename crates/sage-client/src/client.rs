//! HTTP implementation of [`GenerationBackend`].

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

use sage_config::BackendConfig;
use sage_core::entities::{
    Citation, FusedOutline, MethodologyOption, MethodologyType, PaperStructure, Question, Section,
    Subsection,
};
use sage_core::enums::FinalPart;

use crate::backend::GenerationBackend;
use crate::error::ClientError;
use crate::http::check_response;
use crate::retry::{RetryPolicy, with_retry};
use crate::wire::{
    AnswerProbingRequest, AutoRefineRequest, CitationResponseRequest, CitationSearchRequest,
    CitationsResponse, FinalTextRequest, FinalTextResponse, FusedOutlineRequest,
    FusedResponseRequest, GeneratedMethodologiesResponse,
    IdentifiedCitationResponse, KbResponse, KbResult, MethodologyCatalogResponse,
    MethodologyGenerationRequest, PaperStructureRequest, PaperStructureResponse,
    ProbingQuestionsRequest, ProbingQuestionsResponse, PromptRequest, QuestionCitationRequest,
    QuestionsRequest, QuestionsResponse, RecommendSourcesRequest, RecommendedCategoriesResponse,
    RefineSubsectionRequest, RefineThesisRequest, RefinedThesisResponse,
    StructuredOutlineRequest, StructuredOutlineResponse, SubsectionsRequest, SubsectionsResponse,
    TextResponse, TransitionsResponse,
};

/// Client for the generation backend. Every call goes through the
/// configured [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl BackendClient {
    /// Build a client for `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if the base URL does not parse,
    /// or [`ClientError::Http`] if the `reqwest` client cannot be built.
    pub fn new(config: &BackendConfig, retry: RetryPolicy) -> Result<Self, ClientError> {
        let base_url = config.normalized_base_url().to_string();
        reqwest::Url::parse(&base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("sage/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            http,
            base_url,
            retry,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ClientError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = &self.url(path);
        with_retry(&self.retry, || async move {
            tracing::debug!(%url, "POST");
            let resp = check_response(self.http.post(url).json(body).send().await?).await?;
            parse_body(path, resp).await
        })
        .await
    }

    async fn get<R>(&self, path_and_query: &str) -> Result<R, ClientError>
    where
        R: DeserializeOwned,
    {
        let url = &self.url(path_and_query);
        with_retry(&self.retry, || async move {
            tracing::debug!(%url, "GET");
            let resp = check_response(self.http.get(url).send().await?).await?;
            parse_body(path_and_query, resp).await
        })
        .await
    }
}

async fn parse_body<R: DeserializeOwned>(
    path: &str,
    resp: reqwest::Response,
) -> Result<R, ClientError> {
    let text = resp.text().await?;
    serde_json::from_str(&text).map_err(|e| ClientError::Parse(format!("{path}: {e}")))
}

impl GenerationBackend for BackendClient {
    async fn ai_response(&self, req: &PromptRequest) -> Result<String, ClientError> {
        let resp: TextResponse = self.post("/ai-response", req).await?;
        Ok(resp.response)
    }

    async fn probing_questions(
        &self,
        req: &ProbingQuestionsRequest,
    ) -> Result<Vec<String>, ClientError> {
        let resp: ProbingQuestionsResponse =
            self.post("/generate_probing_questions", req).await?;
        Ok(resp.questions)
    }

    async fn answer_probing_questions(
        &self,
        req: &AnswerProbingRequest,
    ) -> Result<String, ClientError> {
        let resp: RefinedThesisResponse = self.post("/answer_probing_questions", req).await?;
        Ok(resp.refined_thesis)
    }

    async fn refine_thesis(&self, req: &RefineThesisRequest) -> Result<String, ClientError> {
        let resp: RefinedThesisResponse = self.post("/refine_thesis", req).await?;
        Ok(resp.refined_thesis)
    }

    async fn auto_refine_thesis(&self, req: &AutoRefineRequest) -> Result<String, ClientError> {
        let resp: RefinedThesisResponse = self.post("/auto_refine_thesis", req).await?;
        Ok(resp.refined_thesis)
    }

    async fn recommend_sources(
        &self,
        req: &RecommendSourcesRequest,
    ) -> Result<Vec<String>, ClientError> {
        let resp: RecommendedCategoriesResponse = self.post("/recommend_sources", req).await?;
        Ok(resp
            .recommended_categories
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect())
    }

    async fn methodology_catalog(&self) -> Result<Vec<MethodologyType>, ClientError> {
        let resp: MethodologyCatalogResponse = self.get("/methodology_options").await?;
        Ok(resp.methodologies)
    }

    async fn generate_methodologies(
        &self,
        req: &MethodologyGenerationRequest,
    ) -> Result<Vec<MethodologyOption>, ClientError> {
        let resp: GeneratedMethodologiesResponse =
            self.post("/generate_methodology_options", req).await?;
        Ok(resp.methodologies)
    }

    async fn paper_structure(
        &self,
        req: &PaperStructureRequest,
    ) -> Result<PaperStructure, ClientError> {
        let resp: PaperStructureResponse = self.post("/paper_structure", req).await?;
        Ok(resp.into())
    }

    async fn structured_outline(
        &self,
        req: &StructuredOutlineRequest,
    ) -> Result<Vec<Section>, ClientError> {
        let resp: StructuredOutlineResponse =
            self.post("/generate_structured_outline", req).await?;
        Ok(resp.outline.into_iter().map(Section::from).collect())
    }

    async fn subsections(&self, req: &SubsectionsRequest) -> Result<Vec<Subsection>, ClientError> {
        let resp: SubsectionsResponse = self.post("/generate_subsections", req).await?;
        Ok(resp.subsections.into_iter().map(Subsection::from).collect())
    }

    async fn questions(&self, req: &QuestionsRequest) -> Result<Vec<Question>, ClientError> {
        let resp: QuestionsResponse = self.post("/generate_questions", req).await?;
        Ok(resp.questions.into_iter().map(Question::from).collect())
    }

    async fn question_citations(
        &self,
        req: &QuestionCitationRequest,
    ) -> Result<Vec<Citation>, ClientError> {
        let resp: CitationsResponse = self.post("/generate_question_citations", req).await?;
        Ok(resp.recommended_sources)
    }

    async fn identify_citation(
        &self,
        req: &CitationSearchRequest,
    ) -> Result<Citation, ClientError> {
        let resp: IdentifiedCitationResponse = self.post("/identify_citation", req).await?;
        Ok(resp.citation)
    }

    async fn citation_response(
        &self,
        req: &CitationResponseRequest,
    ) -> Result<String, ClientError> {
        let resp: TextResponse = self.post("/generate_citation_response", req).await?;
        Ok(resp.response)
    }

    async fn fused_response(&self, req: &FusedResponseRequest) -> Result<String, ClientError> {
        let resp: TextResponse = self.post("/generate_fused_response", req).await?;
        Ok(resp.response)
    }

    async fn fused_outline(&self, req: &FusedOutlineRequest) -> Result<FusedOutline, ClientError> {
        self.post("/generate_fused_outline", req).await
    }

    async fn final_text(
        &self,
        part: FinalPart,
        req: &FinalTextRequest,
    ) -> Result<String, ClientError> {
        let path = format!("/api/finaloutline/generate_{}", part.as_str());
        let resp: FinalTextResponse = self.post(&path, req).await?;
        Ok(resp.text)
    }

    async fn transitions(
        &self,
        req: &FinalTextRequest,
    ) -> Result<BTreeMap<String, String>, ClientError> {
        let resp: TransitionsResponse =
            self.post("/api/finaloutline/generate_transitions", req).await?;
        Ok(resp.transitions)
    }

    async fn refine_subsection(
        &self,
        req: &RefineSubsectionRequest,
    ) -> Result<String, ClientError> {
        let resp: FinalTextResponse = self.post("/api/finaloutline/refine_subsection", req).await?;
        Ok(resp.text)
    }

    async fn query_kb(&self, query: &str) -> Result<Vec<KbResult>, ClientError> {
        let path = format!("/api/query_kb?query={}", urlencoding::encode(query));
        let resp: KbResponse = self.get(&path).await?;
        Ok(resp.results.into_iter().map(KbResult::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unparseable_base_url() {
        let config = BackendConfig {
            base_url: "not a url".into(),
            ..BackendConfig::default()
        };
        let err = BackendClient::new(&config, RetryPolicy::none()).unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl(_)));
    }

    #[test]
    fn joins_paths_without_double_slash() {
        let config = BackendConfig {
            base_url: "http://localhost:8000/".into(),
            ..BackendConfig::default()
        };
        let client = BackendClient::new(&config, RetryPolicy::none()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(
            client.url("/generate_subsections"),
            "http://localhost:8000/generate_subsections"
        );
    }

    #[tokio::test]
    async fn unsupported_default_is_reported_by_name() {
        struct Bare;
        impl GenerationBackend for Bare {}

        let err = Bare.query_kb("anything").await.unwrap_err();
        assert!(matches!(err, ClientError::Unsupported("query_kb")));
    }
}
