use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use ppdb_db::Vocabulary;
use ppdb_rules::{Rejector, RuleSet, Verdict};
use ppdb_types::Expression;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::trie::TransformationTrie;

#[derive(Clone)]
pub struct AppState {
    pub trie: Arc<TransformationTrie>,
    /// Enables the `verdict` field on `/v1/classify`.
    pub vocabulary: Option<Arc<Vocabulary>>,
    pub rules: RuleSet,
    pub max_page_size: usize,
    pub disable_cache: bool,
}

#[derive(Deserialize)]
pub struct ParaphrasesQuery {
    pub expression: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Deserialize)]
pub struct MatchesQuery {
    pub text: Option<String>,
}

#[derive(Deserialize)]
pub struct ClassifyQuery {
    pub source: Option<String>,
    pub target: Option<String>,
}

#[derive(Serialize)]
pub struct ParaphrasesResponse {
    expression: String,
    page: usize,
    page_size: usize,
    total: usize,
    has_more: bool,
    items: Vec<String>,
}

#[derive(Serialize)]
pub struct SpanResponse {
    start: usize,
    end: usize,
    span: String,
    paraphrases: Vec<String>,
}

#[derive(Serialize)]
pub struct MatchesResponse {
    tokens: Vec<String>,
    matches: Vec<SpanResponse>,
}

#[derive(Serialize)]
pub struct ClassifyResponse {
    trivial: bool,
    verdict: Option<&'static str>,
}

#[derive(Serialize)]
struct StatsResponse {
    nodes: usize,
    rules: usize,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/stats", get(stats))
        .route("/v1/paraphrases", get(paraphrases))
        .route("/v1/matches", get(matches))
        .route("/v1/classify", get(classify))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

async fn stats(State(state): State<AppState>) -> Response {
    let body = StatsResponse {
        nodes: state.trie.node_count(),
        rules: state.trie.rule_count(),
    };
    cached(&state, Json(body))
}

async fn paraphrases(
    State(state): State<AppState>,
    params: Result<Query<ParaphrasesQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params?;
    let expression = parse_expression("expression", params.expression.as_deref())?;
    let expression = state.rules.normalize(&expression);

    let page = params.page.unwrap_or(1);
    if page == 0 {
        return Err(ApiError::bad_request("page must be >= 1"));
    }
    let mut page_size = params.page_size.unwrap_or(50);
    if page_size == 0 {
        return Err(ApiError::bad_request("page_size must be >= 1"));
    }
    if page_size > state.max_page_size {
        page_size = state.max_page_size;
    }

    let sources = state.trie.get(expression.tokens());
    let total = sources.map_or(0, |s| s.len());
    let offset = page.saturating_sub(1).saturating_mul(page_size);
    let items: Vec<String> = sources
        .into_iter()
        .flatten()
        .skip(offset)
        .take(page_size)
        .map(Expression::to_string)
        .collect();
    let has_more = offset + items.len() < total;

    let response = ParaphrasesResponse {
        expression: expression.to_string(),
        page,
        page_size,
        total,
        has_more,
        items,
    };
    Ok(cached(&state, Json(response)))
}

async fn matches(
    State(state): State<AppState>,
    params: Result<Query<MatchesQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params?;
    let tokens = parse_expression("text", params.text.as_deref())?.into_tokens();
    let matches = state
        .trie
        .find_matches(&tokens)
        .into_iter()
        .map(|m| SpanResponse {
            start: m.start,
            end: m.end,
            span: tokens[m.start..m.end].join(" "),
            paraphrases: m.sources.iter().map(Expression::to_string).collect(),
        })
        .collect();

    Ok(cached(&state, Json(MatchesResponse { tokens, matches })))
}

async fn classify(
    State(state): State<AppState>,
    params: Result<Query<ClassifyQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params?;
    let source = parse_expression("source", params.source.as_deref())?;
    let target = parse_expression("target", params.target.as_deref())?;

    let trivial = state.rules.is_trivial(source.tokens(), target.tokens());
    let verdict = state.vocabulary.as_deref().map(|vocabulary| {
        let rejector = Rejector::new(state.rules, |word: &str| vocabulary.contains(word));
        verdict_label(rejector.verdict(&source, &target))
    });

    Ok(cached(&state, Json(ClassifyResponse { trivial, verdict })))
}

fn parse_expression(name: &str, raw: Option<&str>) -> Result<Expression, ApiError> {
    let expression = Expression::from_phrase(raw.unwrap_or_default());
    if expression.is_empty() {
        return Err(ApiError::bad_request(format!("{name} is required")));
    }
    Ok(expression)
}

fn verdict_label(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Accept => "accept",
        Verdict::Trivial => "trivial",
        Verdict::OutOfVocabulary => "out_of_vocabulary",
    }
}

fn cached(state: &AppState, body: impl IntoResponse) -> Response {
    if state.disable_cache {
        return body.into_response();
    }
    (
        [(
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=300"),
        )],
        body,
    )
        .into_response()
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    fn bad_request<T: Into<String>>(msg: T) -> Self {
        ApiError::BadRequest(msg.into())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                let body = Json(ErrorResponse { error: msg });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
        }
    }
}
