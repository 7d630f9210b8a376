//! Chat endpoint.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span, Instrument};
use uuid::Uuid;

use crate::state::AppState;

/// Chat request body. A missing or `null` query is treated as empty.
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Rendered HTML fragment.
    pub response: String,
}

/// Resolve the query and return the rendered result.
///
/// An absent or unparseable body is answered like an empty query.
pub async fn chat(
    State(state): State<AppState>,
    payload: Option<Json<ChatRequest>>,
) -> Json<ChatResponse> {
    let request_id = Uuid::new_v4();
    let query = payload.and_then(|Json(req)| req.query).unwrap_or_default();

    async move {
        debug!(query = %query, "Chat query");
        let rendered = state.service.answer(&query).await;
        debug!(found = rendered.is_found(), "Chat answered");

        Json(ChatResponse {
            response: rendered.to_html(),
        })
    }
    .instrument(info_span!("chat", %request_id))
    .await
}
