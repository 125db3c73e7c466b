use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use axum_extra::extract::TypedHeader;
use db::models::user;
use headers::{Authorization, authorization::Bearer};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use services::Actor;
use util::config;

use crate::auth::claims::{AuthUser, Claims};
use crate::auth::guards::Empty;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Extracts `AuthUser` from the `Authorization: Bearer` header.
///
/// Claims already verified by a guard are reused from request extensions.
///
/// # Errors
/// - `401 Unauthorized` if the header is missing, malformed, or the token is invalid or expired.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| (StatusCode::UNAUTHORIZED, "Missing or invalid Authorization header"))?;

        let token_data = decode::<Claims>(
            bearer.token(),
            &DecodingKey::from_secret(config::jwt_secret().as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|_| (StatusCode::UNAUTHORIZED, "Invalid or expired token"))?;

        Ok(AuthUser(token_data.claims))
    }
}

/// The caller as the feedback services see it.
///
/// The role comes from the users table rather than the token, so a demoted
/// user loses privileges without waiting for their token to expire.
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Actor);

impl FromRequestParts<AppState> for CurrentActor {
    type Rejection = (StatusCode, Json<ApiResponse<Empty>>);

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state)
            .await
            .map_err(|(status, msg)| (status, Json(ApiResponse::error(msg))))?;

        match user::Model::find(state.db(), claims.sub).await {
            Ok(Some(user)) => Ok(CurrentActor(Actor::from(&user))),
            Ok(None) => Err((
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::error("User no longer exists")),
            )),
            Err(e) => {
                tracing::error!(error = %e, user_id = claims.sub, "Failed to resolve actor");
                Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::error("An internal error occurred")),
                ))
            }
        }
    }
}
