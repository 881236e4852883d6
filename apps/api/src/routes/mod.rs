pub mod health;

use axum::{
    extract::{DefaultBodyLimit, Request},
    http::HeaderName,
    routing::{get, post},
    Router,
};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::state::AppState;
use crate::{advertising, code_review, devops, pharmacy, publishing, requirements, retro};

pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Manuscript uploads are allowed past axum's 2 MB default.
const MAX_PDF_BYTES: usize = 25 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let correlation_id = HeaderName::from_static(CORRELATION_ID_HEADER);

    Router::new()
        .route("/health", get(health::health_handler))
        // Requirements
        .route(
            "/api/requirements/summarize",
            post(requirements::handlers::handle_summarize),
        )
        .route(
            "/api/requirements/generate-user-stories",
            post(requirements::handlers::handle_generate_user_stories),
        )
        .route(
            "/api/requirements/answer-question",
            post(requirements::handlers::handle_answer_question),
        )
        // Code review
        .route(
            "/api/autonomousagent/analyze",
            post(code_review::handlers::handle_analyze_code),
        )
        .route(
            "/api/autonomousagent/workflow",
            post(code_review::handlers::handle_code_workflow),
        )
        .route(
            "/api/retro/analyze",
            post(retro::handlers::handle_analyze_retrospective),
        )
        // Pharmacy
        .route(
            "/api/pharmacy/patient-education",
            post(pharmacy::handlers::handle_patient_education),
        )
        .route(
            "/api/pharmacy/drug-interactions",
            post(pharmacy::handlers::handle_drug_interactions),
        )
        // Publishing
        .route(
            "/api/publishing/review",
            post(publishing::handlers::handle_book_review),
        )
        .route(
            "/api/publishing/review-pdf",
            post(publishing::handlers::handle_manuscript_review)
                .layer(DefaultBodyLimit::max(MAX_PDF_BYTES)),
        )
        .route(
            "/api/advertising/ad-copy",
            post(advertising::handlers::handle_ad_copy),
        )
        .route(
            "/api/devops/summarize-logs",
            post(devops::handlers::handle_summarize_logs),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            let correlation_id = request
                .headers()
                .get(CORRELATION_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                correlation_id
            )
        }))
        // Last layer runs first: the id is set before the span and the propagation see it.
        .layer(PropagateRequestIdLayer::new(correlation_id.clone()))
        .layer(SetRequestIdLayer::new(correlation_id, MakeRequestUuid))
}
