//! `BackendClient` against a scripted local HTTP server.

use std::io::Read as _;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use pretty_assertions::assert_eq;
use rstest::rstest;
use sage_client::wire::{
    DataSectionDigest, FinalTextRequest, FusedOutlineRequest, QuestionsRequest,
    RecommendSourcesRequest, RefineSubsectionRequest, SubsectionsRequest,
};
use sage_client::{BackendClient, ClientError, GenerationBackend, RetryPolicy};
use sage_config::BackendConfig;
use sage_core::enums::FinalPart;

#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    url: String,
    body: String,
}

/// Serve one canned `(status, body)` per incoming request, in order.
fn serve(script: Vec<(u16, &'static str)>) -> (String, Arc<Mutex<Vec<Recorded>>>) {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);

    thread::spawn(move || {
        for (status, body) in script {
            let Ok(Some(mut request)) = server.recv_timeout(Duration::from_secs(10)) else {
                return;
            };
            let mut received = String::new();
            request.as_reader().read_to_string(&mut received).unwrap();
            log.lock().unwrap().push(Recorded {
                method: request.method().to_string(),
                url: request.url().to_string(),
                body: received,
            });
            let header =
                tiny_http::Header::from_bytes("Content-Type", "application/json").unwrap();
            let response = tiny_http::Response::from_string(body)
                .with_status_code(status)
                .with_header(header);
            request.respond(response).unwrap();
        }
    });

    (format!("http://127.0.0.1:{port}"), seen)
}

fn client(base_url: String, retry: RetryPolicy) -> BackendClient {
    let config = BackendConfig {
        base_url,
        timeout_secs: 5,
    };
    BackendClient::new(&config, retry).unwrap()
}

fn fast_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        base_delay: Duration::from_millis(5),
        max_jitter: Duration::ZERO,
    }
}

#[tokio::test]
async fn subsections_are_posted_and_mapped() {
    let (base, seen) = serve(vec![(
        200,
        r#"{"subsections": [
            {"subsection_title": "Budget trends", "subsection_context": "FY2015-FY2024"},
            {"subsection_title": "Force posture", "subsection_context": "Basing"}
        ]}"#,
    )]);
    let client = client(base, RetryPolicy::none());

    let req = SubsectionsRequest {
        final_thesis: "X should do Y".into(),
        methodology: "Comparative case study".into(),
        section_title: "Evidence".into(),
        section_context: "Primary data".into(),
        paper_length_pages: 10,
        source_categories: vec!["Economics".into()],
    };
    let subsections = client.subsections(&req).await.unwrap();

    let titles: Vec<&str> = subsections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Budget trends", "Force posture"]);
    assert!(subsections.iter().all(|s| s.questions.is_empty()));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, "POST");
    assert_eq!(seen[0].url, "/generate_subsections");
    let body: serde_json::Value = serde_json::from_str(&seen[0].body).unwrap();
    assert_eq!(body["section_title"], "Evidence");
    assert_eq!(body["paper_length_pages"], 10);
}

#[tokio::test]
async fn rate_limited_twice_then_ok() {
    let (base, seen) = serve(vec![
        (429, r#"{"detail": "Rate limit exceeded. Please wait a moment and try again."}"#),
        (429, r#"{"detail": "Rate limit exceeded. Please wait a moment and try again."}"#),
        (200, r#"{"recommended_categories": ["1. Economics", " ", "2. Law"]}"#),
    ]);
    let client = client(base, fast_retry(3));

    let req = RecommendSourcesRequest {
        final_thesis: "X should do Y".into(),
        paper_length_pages: 10,
        exclude: Vec::new(),
    };
    let categories = client.recommend_sources(&req).await.unwrap();

    assert_eq!(categories, vec!["1. Economics".to_string(), "2. Law".to_string()]);
    assert_eq!(seen.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn bad_request_is_not_retried() {
    let (base, seen) = serve(vec![
        (400, r#"{"detail": "Invalid request. Please check your input."}"#),
        (200, r#"{"questions": []}"#),
    ]);
    let client = client(base, fast_retry(3));

    let err = client
        .questions(&QuestionsRequest::default())
        .await
        .unwrap_err();

    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid request. Please check your input.");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn kb_query_is_url_encoded() {
    let (base, seen) = serve(vec![(
        200,
        r#"{"results": [{"content": {"text": "Deterrence theory"}, "score": 0.9}]}"#,
    )]);
    let client = client(base, RetryPolicy::none());

    let hits = client.query_kb("nuclear deterrence & escalation").await.unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].text, "Deterrence theory");
    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].method, "GET");
    assert_eq!(
        seen[0].url,
        "/api/query_kb?query=nuclear%20deterrence%20%26%20escalation"
    );
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let (base, _seen) = serve(vec![(200, r#"{"unexpected": true}"#)]);
    let client = client(base, RetryPolicy::none());

    let err = client
        .questions(&QuestionsRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Parse(ref m) if m.starts_with("/generate_questions")));
}

#[tokio::test]
async fn fused_outline_is_read_from_backend_field_names() {
    let (base, seen) = serve(vec![(
        200,
        r#"{"outline_summary": "Budgets drive posture",
            "restructuring_notes": ["merged two sections"],
            "sections": [{"title": "Spending", "context": "FY data", "section_summary": "Rising",
                "subsections": [{"title": "Trends", "content": "Steady growth",
                    "supporting_evidence": ["Table 2"],
                    "citations": [{"apa": "Smith, A. (2020)."}]}]}]}"#,
    )]);
    let client = client(base, RetryPolicy::none());

    let req = FusedOutlineRequest {
        data_sections: vec![DataSectionDigest {
            section_title: "Evidence".into(),
            all_responses: vec!["Spending rose [1].".into()],
            ..DataSectionDigest::default()
        }],
        thesis: "X should do Y".into(),
        methodology: "Comparative case study".into(),
        paper_type: "argumentative".into(),
    };
    let outline = client.fused_outline(&req).await.unwrap();

    assert_eq!(outline.outline_summary, "Budgets drive posture");
    assert_eq!(outline.sections[0].subsections[0].citations[0].apa, "Smith, A. (2020).");
    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].url, "/generate_fused_outline");
    let body: serde_json::Value = serde_json::from_str(&seen[0].body).unwrap();
    assert_eq!(body["data_sections"][0]["all_responses"][0], "Spending rose [1].");
    assert_eq!(body["paper_type"], "argumentative");
}

#[rstest]
#[case(FinalPart::Abstract, "/api/finaloutline/generate_abstract")]
#[case(FinalPart::Methodology, "/api/finaloutline/generate_methodology")]
#[case(FinalPart::Conclusion, "/api/finaloutline/generate_conclusion")]
#[tokio::test]
async fn final_text_posts_to_its_part(#[case] part: FinalPart, #[case] path: &str) {
    let (base, seen) = serve(vec![(200, r#"{"text": "Generated paragraph."}"#)]);
    let client = client(base, RetryPolicy::none());

    let text = client
        .final_text(part, &FinalTextRequest::default())
        .await
        .unwrap();

    assert_eq!(text, "Generated paragraph.");
    assert_eq!(seen.lock().unwrap()[0].url, path);
}

#[tokio::test]
async fn transitions_and_refinement_use_final_outline_routes() {
    let (base, seen) = serve(vec![
        (200, r#"{"transitions": {"I.A": "From I to A."}}"#),
        (200, r#"{"text": "Refined prose."}"#),
    ]);
    let client = client(base, RetryPolicy::none());

    let transitions = client
        .transitions(&FinalTextRequest::default())
        .await
        .unwrap();
    let refined = client
        .refine_subsection(&RefineSubsectionRequest {
            section_title: "Evidence".into(),
            subsection_title: "Budget trends".into(),
            responses: vec!["Spending rose.".into()],
            ..RefineSubsectionRequest::default()
        })
        .await
        .unwrap();

    assert_eq!(transitions["I.A"], "From I to A.");
    assert_eq!(refined, "Refined prose.");
    let urls: Vec<String> = seen.lock().unwrap().iter().map(|r| r.url.clone()).collect();
    assert_eq!(
        urls,
        vec![
            "/api/finaloutline/generate_transitions".to_string(),
            "/api/finaloutline/refine_subsection".to_string(),
        ]
    );
}
