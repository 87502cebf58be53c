use std::str::FromStr;

use axum::{
    Form,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
};
use serde::Deserialize;

use super::AppState;
use super::page::{FormEcho, render_page};
use crate::error::{GhostpostError, PipelineError, ValidationError};
use crate::providers::{describe_backend, sanitize_api_error};
use crate::types::{GenerationRequest, Platform, ResearchOptions};

/// Fields posted by the HTML form. Checkboxes arrive only when ticked.
#[derive(Debug, Deserialize)]
pub struct GenerateForm {
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub facts: String,
    #[serde(default)]
    pub angle: String,
    #[serde(default)]
    pub cta: String,
    #[serde(default)]
    pub research_query: String,
    pub thread: Option<String>,
    pub research: Option<String>,
    pub proofread: Option<String>,
    #[serde(default)]
    pub variants: String,
}

impl GenerateForm {
    fn echo(&self) -> FormEcho {
        FormEcho {
            platform: self.platform.clone(),
            context: self.context.clone(),
            facts: self.facts.clone(),
            angle: self.angle.clone(),
            cta: self.cta.clone(),
            research_query: self.research_query.clone(),
            thread: self.thread.is_some(),
            research: self.research.is_some(),
            proofread: self.proofread.is_some(),
            variants: self.variants.clone(),
        }
    }

    fn to_request(&self) -> Result<GenerationRequest, ValidationError> {
        let platform = Platform::from_str(self.platform.trim())
            .map_err(|_| ValidationError::Platform(self.platform.clone()))?;

        let non_empty = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());
        let mut request = GenerationRequest::new(platform);
        request.context.clone_from(&self.context);
        request.facts = self.facts.lines().map(ToString::to_string).collect();
        request.angle = non_empty(&self.angle);
        request.call_to_action = non_empty(&self.cta);
        request.thread = self.thread.is_some();
        request.variants = self.variants.trim().parse().unwrap_or(1);
        request.research = ResearchOptions {
            allow: self.research.is_some(),
            query: non_empty(&self.research_query),
            auto: true,
        };
        request.proofread = self.proofread.is_some();
        Ok(request)
    }
}

/// HTTP status for a failed run.
fn error_status(err: &PipelineError) -> StatusCode {
    match &err.source {
        GhostpostError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        GhostpostError::Validation(ValidationError::Platform(_)) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_json(status: StatusCode, message: &str, stage: Option<String>) -> Response {
    let body = serde_json::json!({
        "error": sanitize_api_error(message),
        "stage": stage,
    });
    (status, Json(body)).into_response()
}

fn page_response(status: StatusCode, html: anyhow::Result<String>) -> Response {
    match html {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "page render failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "page render failed").into_response()
        }
    }
}

/// GET /: empty form
pub(super) async fn handle_index() -> Response {
    page_response(StatusCode::OK, render_page(&FormEcho::default(), None, None))
}

/// POST /generate: form post, rendered HTML
pub(super) async fn handle_form_generate(
    State(state): State<AppState>,
    Form(form): Form<GenerateForm>,
) -> Response {
    let echo = form.echo();
    let request = match form.to_request() {
        Ok(request) => request,
        Err(e) => {
            return page_response(
                StatusCode::BAD_REQUEST,
                render_page(&echo, None, Some(&e.to_string())),
            );
        }
    };

    match state.pipeline.run(request).await {
        Ok(outcome) => page_response(StatusCode::OK, render_page(&echo, Some(&outcome), None)),
        Err(e) => {
            let message = sanitize_api_error(&e.to_string());
            page_response(error_status(&e), render_page(&echo, None, Some(&message)))
        }
    }
}

/// POST /api/generate: JSON in, `GenerationOutcome` out
pub(super) async fn handle_api_generate(
    State(state): State<AppState>,
    body: Result<Json<GenerationRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!(error = %e, "rejected generate request");
            return error_json(StatusCode::BAD_REQUEST, &e.body_text(), None);
        }
    };

    match state.pipeline.run(request).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => error_json(error_status(&e), &e.to_string(), Some(e.stage.to_string())),
    }
}

/// GET /api/status: what this instance can do right now
pub(super) async fn handle_status(State(state): State<AppState>) -> impl IntoResponse {
    let guide = state.pipeline.store().snapshot();
    let backend = describe_backend(&state.config);
    let body = serde_json::json!({
        "backend": backend.as_ref().map(|(kind, _)| kind.to_string()),
        "model": backend.map(|(_, model)| model),
        "template_fallback": state.config.generation.template_fallback,
        "research_provider": state.config.research.provider,
        "research_configured": crate::research::create_research_provider(&state.config.research).is_some(),
        "grammar": state.config.grammar.enabled,
        "style_version": guide.version,
        "style_locked": guide.locked,
    });
    Json(body)
}

/// GET /health: always public
pub(super) async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
