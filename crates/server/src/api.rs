//! HTTP API for generating and retrieving notecard decks.
//!
//! `POST /api/v1/decks` runs the full pipeline on a JSON-described source and
//! persists the result. Decks are then readable by id for their owner and by
//! share token for anyone holding the link. Binary uploads are a CLI concern;
//! the API accepts web pages, videos, and inline text.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use tracing::info;
use uuid::Uuid;

use articlebite_core::{Difficulty, GenerationRequest, Notecard, QuestionType, SourceDescriptor};

use crate::error::ApiError;
use crate::state::AppState;
use crate::store::StoredDeck;

/// Content source accepted by the deck endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SourceInput {
    /// Web page to scrape.
    Url { url: String },
    /// YouTube video whose captions supply the text.
    Youtube { url: String },
    /// Inline text, already acquired by the client.
    Text { text: String },
}

/// Body of `POST /api/v1/decks`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeckRequest {
    pub source: SourceInput,
    #[serde(default = "default_count")]
    pub count: usize,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default, alias = "question_type")]
    pub question_type: QuestionType,
}

fn default_count() -> usize {
    5
}

/// Stored deck as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckResponse {
    pub id: Uuid,
    pub share_token: String,
    pub created_at: String,
    pub source: String,
    pub difficulty: Difficulty,
    pub question_type: QuestionType,
    pub cards: Vec<Notecard>,
}

impl From<StoredDeck> for DeckResponse {
    fn from(record: StoredDeck) -> Self {
        let created_at = record
            .created_at
            .format(&Rfc3339)
            .unwrap_or_else(|_| record.created_at.unix_timestamp().to_string());
        Self {
            id: record.id,
            share_token: record.share_token,
            created_at,
            source: record.deck.source,
            difficulty: record.deck.difficulty,
            question_type: record.deck.question_type,
            cards: record.deck.cards,
        }
    }
}

/// Builds the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/v1/decks", post(create_deck))
        .route("/api/v1/decks/{id}", get(get_deck))
        .route("/api/v1/shared/{token}", get(get_shared_deck))
        .with_state(state)
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn create_deck(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateDeckRequest>,
) -> Result<(StatusCode, Json<DeckResponse>), ApiError> {
    let user_id = headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("anonymous")
        .to_string();

    let generation =
        GenerationRequest::new(request.count, request.difficulty, request.question_type)?;

    info!(user = %user_id, count = generation.count, "deck generation requested");

    let deck = match &request.source {
        SourceInput::Url { url } => {
            state.pipeline.generate_deck(SourceDescriptor::Url(url.clone()), &generation).await?
        }
        SourceInput::Youtube { url } => {
            state
                .pipeline
                .generate_deck(SourceDescriptor::YouTubeUrl(url.clone()), &generation)
                .await?
        }
        SourceInput::Text { text } => {
            if text.trim().is_empty() {
                return Err(ApiError::bad_request("source text is empty"));
            }
            state.pipeline.deck_from_text(text, &generation).await?
        }
    };

    let record = StoredDeck::new(user_id, deck);
    let response = DeckResponse::from(record.clone());
    state.store.insert(record).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

async fn get_deck(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeckResponse>, ApiError> {
    let record = state
        .store
        .fetch(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("no deck with id {id}")))?;
    Ok(Json(record.into()))
}

async fn get_shared_deck(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<DeckResponse>, ApiError> {
    let record = state
        .store
        .fetch_shared(&token)
        .await?
        .ok_or_else(|| ApiError::not_found("no deck with that share token"))?;
    Ok(Json(record.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use articlebite_core::{ArticleBiteError, ChatCompletion, NotecardPipeline, PipelineConfig};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::store::MemoryDeckStore;

    struct ScriptedLlm {
        replies: Mutex<VecDeque<String>>,
    }

    #[async_trait]
    impl ChatCompletion for ScriptedLlm {
        async fn complete(
            &self,
            _system_prompt: &str,
            _user_prompt: &str,
            _max_tokens: u32,
        ) -> articlebite_core::Result<String> {
            self.replies.lock().unwrap().pop_front().ok_or_else(|| {
                ArticleBiteError::Completion {
                    provider: "scripted".to_string(),
                    message: "script exhausted".to_string(),
                }
            })
        }

        fn provider_name(&self) -> &'static str {
            "scripted"
        }
    }

    fn scripted_state<I>(replies: I) -> AppState
    where
        I: IntoIterator<Item = String>,
    {
        let llm = Arc::new(ScriptedLlm { replies: Mutex::new(replies.into_iter().collect()) });
        let pipeline = NotecardPipeline::with_completion(PipelineConfig::default(), llm);
        AppState::new(Arc::new(pipeline), Arc::new(MemoryDeckStore::new()))
    }

    /// A well-formed plain-grammar document for `count` items plus the
    /// closing empty pair.
    fn essay_doc(count: usize) -> String {
        let mut text = String::new();
        for n in 1..=count {
            text.push_str(&format!("objective{n}={{Question {n}?}}\n"));
            text.push_str(&format!("answer{n}={{Answer {n}.}}\n"));
        }
        let sentinel = count + 1;
        text.push_str(&format!("objective{sentinel}=empty\nanswer{sentinel}=empty\n"));
        text
    }

    async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn post_deck(payload: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/decks")
            .header("content-type", "application/json")
            .header("x-user-id", "user-17")
            .body(Body::from(payload.to_string()))
            .unwrap()
    }

    fn get_path(path: &str) -> Request<Body> {
        Request::builder().uri(path).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_create_then_fetch_by_id_and_share_token() {
        let state = scripted_state(["summary".to_string(), essay_doc(2)]);
        let payload = serde_json::json!({
            "source": { "kind": "text", "text": "Cells are the basic unit of life." },
            "count": 2,
            "difficulty": "hard",
            "questionType": "essay",
        });

        let (status, body) = send(&state, post_deck(&payload)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["cards"].as_array().unwrap().len(), 2);
        assert_eq!(body["difficulty"], "hard");
        assert_eq!(body["questionType"], "essay");
        assert_eq!(body["source"], "text input");

        let id = body["id"].as_str().unwrap().to_string();
        let token = body["shareToken"].as_str().unwrap().to_string();

        let (status, fetched) = send(&state, get_path(&format!("/api/v1/decks/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["id"], id.as_str());

        let (status, shared) = send(&state, get_path(&format!("/api/v1/shared/{token}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(shared["id"], id.as_str());

        // The user header is persisted with the record, not echoed back.
        assert!(fetched.get("userId").is_none());
        let stored = state.store.fetch(id.parse().unwrap()).await.unwrap().unwrap();
        assert_eq!(stored.user_id, "user-17");
    }

    #[tokio::test]
    async fn test_snake_case_question_type_is_accepted() {
        let state = scripted_state(["summary".to_string(), essay_doc(1)]);
        let payload = serde_json::json!({
            "source": { "kind": "text", "text": "Some prose." },
            "count": 1,
            "question_type": "short-answer",
        });

        let (status, body) = send(&state, post_deck(&payload)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["questionType"], "short-answer");
    }

    #[tokio::test]
    async fn test_no_usable_cards_maps_to_unprocessable() {
        let document = "objective1={Q?}\nchoices1={only|two}\ncorrectAnswer1={only}\n\
                        answer1={A.}\nobjective2=empty\nanswer2=empty\n";
        let state = scripted_state(["summary".to_string(), document.to_string()]);
        let payload = serde_json::json!({
            "source": { "kind": "text", "text": "Thin material." },
            "count": 1,
            "questionType": "multiple-choice",
        });

        let (status, body) = send(&state, post_deck(&payload)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "no_cards");
    }

    #[tokio::test]
    async fn test_zero_count_is_rejected_before_generation() {
        // An empty script would turn any completion call into a 502, so a 400
        // here means validation ran first.
        let state = scripted_state(Vec::<String>::new());
        let payload = serde_json::json!({
            "source": { "kind": "text", "text": "Plenty of text." },
            "count": 0,
        });

        let (status, body) = send(&state, post_deck(&payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_request");
        assert!(body["message"].as_str().unwrap().contains("at least 1"));
    }

    #[tokio::test]
    async fn test_blank_inline_text_is_rejected() {
        let state = scripted_state(Vec::<String>::new());
        let payload = serde_json::json!({
            "source": { "kind": "text", "text": "   " },
            "count": 3,
        });

        let (status, body) = send(&state, post_deck(&payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("empty"));
    }

    #[tokio::test]
    async fn test_invalid_video_url_is_a_client_error() {
        let state = scripted_state(Vec::<String>::new());
        let payload = serde_json::json!({
            "source": { "kind": "youtube", "url": "https://example.com/notavideo" },
            "count": 3,
        });

        let (status, body) = send(&state, post_deck(&payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("Invalid source"));
    }

    #[tokio::test]
    async fn test_completion_failure_maps_to_bad_gateway() {
        let state = scripted_state(Vec::<String>::new());
        let payload = serde_json::json!({
            "source": { "kind": "text", "text": "Real content with no script behind it." },
            "count": 2,
        });

        let (status, body) = send(&state, post_deck(&payload)).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "upstream_failure");
    }

    #[tokio::test]
    async fn test_unknown_deck_and_token_return_not_found() {
        let state = scripted_state(Vec::<String>::new());

        let missing_id = format!("/api/v1/decks/{}", Uuid::new_v4());
        let (status, body) = send(&state, get_path(&missing_id)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");

        let (status, _) = send(&state, get_path("/api/v1/shared/deadbeef")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_health_endpoint_reports_ok() {
        let state = scripted_state(Vec::<String>::new());
        let (status, body) = send(&state, get_path("/healthz")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
