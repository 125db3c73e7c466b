use axum::{
    Json,
    body::Body,
    extract::OriginalUri,
    http::{
        HeaderValue, Request, StatusCode,
        header::{CONTENT_LENGTH, CONTENT_TYPE},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Serialize;
use services::{AppError, RateLimitInfo};

/// Standardized API response wrapper for all outgoing JSON responses.
///
/// ```json
/// {
///   "success": true,
///   "data": { ... },
///   "message": "Some message"
/// }
/// ```
///
/// Failed requests use the same envelope with `success: false` and an
/// [`ErrorBody`] as `data`.
#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }

    /// Constructs an error response with a message and default `data`.
    pub fn error(message: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self {
            success: false,
            data: T::default(),
            message: message.into(),
        }
    }
}

/// Payload of a failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub path: String,
    pub status: u16,
    pub message: String,
    pub error: &'static str,
    pub timestamp: String,
}

/// Handler-side wrapper so `?` on an [`AppError`] produces an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::RoleViolation(_) | AppError::NotEnrolled { .. } | AppError::Forbidden(_) => {
                StatusCode::FORBIDDEN
            }
            AppError::QuotaExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) | AppError::QuotaStore(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error details carried from a handler to [`render_errors`], which knows the request path.
#[derive(Debug, Clone)]
struct PendingError {
    message: String,
    error: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            AppError::Database(err) => {
                tracing::error!(error = %err, "Database error while handling request");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let mut response = status.into_response();
        if let AppError::QuotaExceeded(info) = &self.0 {
            insert_rate_limit_headers(&mut response, info);
        }
        response.extensions_mut().insert(PendingError {
            message,
            error: self.0.category(),
        });
        response
    }
}

/// `X-RateLimit-*` header triple for a quota snapshot.
pub fn rate_limit_headers(info: &RateLimitInfo) -> [(&'static str, String); 3] {
    [
        ("x-ratelimit-limit", info.limit.to_string()),
        ("x-ratelimit-remaining", info.remaining.to_string()),
        ("x-ratelimit-reset", info.reset_at.to_rfc3339()),
    ]
}

fn insert_rate_limit_headers(response: &mut Response, info: &RateLimitInfo) {
    for (name, value) in rate_limit_headers(info) {
        if let Ok(value) = HeaderValue::from_str(&value) {
            response.headers_mut().insert(name, value);
        }
    }
}

/// Renders the JSON error envelope for responses produced by [`ApiError`].
///
/// Applied once around the `/api` router so every error body carries the
/// path that was requested.
pub async fn render_errors(OriginalUri(uri): OriginalUri, req: Request<Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    let Some(pending) = response.extensions_mut().remove::<PendingError>() else {
        return response;
    };

    let (parts, _) = response.into_parts();
    let body = ErrorBody {
        path: uri.path().to_string(),
        status: parts.status.as_u16(),
        message: pending.message.clone(),
        error: pending.error,
        timestamp: Utc::now().to_rfc3339(),
    };
    let envelope = ApiResponse {
        success: false,
        data: body,
        message: pending.message,
    };

    let mut rendered = (parts.status, Json(envelope)).into_response();
    for (name, value) in parts.headers.iter() {
        if *name != CONTENT_TYPE && *name != CONTENT_LENGTH {
            rendered.headers_mut().insert(name.clone(), value.clone());
        }
    }
    rendered
}
