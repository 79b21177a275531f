/// `GET /v1/dashboard`

use crate::{
    app::AppState,
    error::{ok, ActionResult, OrFail},
};
use axum::extract::State;
use staffboard_shared::{auth::middleware::AuthContext, cache::View, dashboard::DashboardStats};

/// Totals and completion rate for the signed-in user, served from the view cache
pub async fn get_dashboard(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ActionResult<DashboardStats> {
    let stats = state
        .views
        .get_or_load(auth.user_id, View::Dashboard, || {
            DashboardStats::load(&state.db, auth.user_id)
        })
        .await
        .or_fail("load dashboard")?;

    Ok(ok(stats))
}
