/// JWT authentication layer
///
/// Validates the bearer access token, checks that the account still exists,
/// and stores an [`AuthContext`] in the request extensions for handlers.

use crate::{app::AppState, error::ApiError};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use staffboard_shared::{
    auth::middleware::{authenticate, AuthContext, AuthError},
    models::user::User,
};

pub async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = authenticate(req.headers(), state.jwt_secret())?;

    let exists = User::exists(&state.db, auth.user_id)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;
    if !exists {
        tracing::warn!(user_id = %auth.user_id, "Token for deleted account");
        return Err(AuthError::UnknownUser.into());
    }

    req.extensions_mut().insert::<AuthContext>(auth);

    Ok(next.run(req).await)
}
