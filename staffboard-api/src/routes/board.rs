/// `GET /v1/board?project_id=&sort=`

use crate::{
    app::AppState,
    error::{ok, ActionQuery, ActionResult, OrFail},
};
use axum::extract::State;
use serde::Deserialize;
use staffboard_shared::{
    auth::middleware::AuthContext,
    board::{load_board, Board, BoardSort},
};
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct BoardQuery {
    pub project_id: Option<Uuid>,

    #[serde(default)]
    pub sort: BoardSort,
}

/// Tasks grouped into status columns
///
/// A `project_id` of another user simply yields an empty board.
pub async fn get_board(
    State(state): State<AppState>,
    auth: AuthContext,
    ActionQuery(query): ActionQuery<BoardQuery>,
) -> ActionResult<Board> {
    let board = load_board(&state.db, auth.user_id, query.project_id, query.sort)
        .await
        .or_fail("load board")?;

    Ok(ok(board))
}
