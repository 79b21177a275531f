/// Chat assistant endpoints
///
/// - `GET /v1/assistant/context` - Snapshot the assistant answers from
/// - `POST /v1/assistant/messages` - `{message}` -> `{reply}`
///
/// The assistant keeps no conversation state; each message is answered
/// against the cached context alone.

use crate::{
    app::AppState,
    error::{ok, validate, ActionError, ActionJson, ActionResult, OrFail},
};
use axum::extract::State;
use serde::{Deserialize, Serialize};
use staffboard_shared::{
    assistant::{load_context, respond, AssistantContext},
    auth::middleware::AuthContext,
    cache::View,
};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct AskRequest {
    #[serde(default)]
    #[validate(custom(function = "crate::error::not_blank", message = "Message is required"))]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub reply: String,
}

async fn cached_context(state: &AppState, auth: &AuthContext) -> Result<AssistantContext, ActionError> {
    state
        .views
        .get_or_load(auth.user_id, View::Assistant, || {
            load_context(&state.db, auth.user_id)
        })
        .await
        .or_fail("load assistant context")
}

pub async fn get_context(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ActionResult<AssistantContext> {
    Ok(ok(cached_context(&state, &auth).await?))
}

pub async fn ask(
    State(state): State<AppState>,
    auth: AuthContext,
    ActionJson(req): ActionJson<AskRequest>,
) -> ActionResult<AskResponse> {
    validate(&req)?;

    let context = cached_context(&state, &auth).await?;
    let reply = respond(&req.message, &context);

    tracing::debug!(user_id = %auth.user_id, "Assistant answered a message");

    Ok(ok(AskResponse { reply }))
}
