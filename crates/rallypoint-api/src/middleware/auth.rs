//! JWT Authentication Middleware
//!
//! Provides authentication middleware for protected API endpoints.
//! Extracts JWT from Authorization header, validates it, and makes user context
//! available to handlers via Axum's Extension.

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use rallypoint_auth::{JwtValidator, SESSION_TOKEN_TYPE};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::ErrorResponse;

/// Authenticated user context extracted from JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    /// User ID
    pub user_id: i32,
    /// User role (master, coordinator, team)
    pub role: String,
}

/// JWT validation state shared across middleware instances
#[derive(Clone)]
pub struct JwtState {
    pub validator: Arc<JwtValidator>,
}

impl JwtState {
    /// Create new JWT state with the given secret
    pub fn new(secret: &[u8]) -> Self {
        Self {
            validator: Arc::new(JwtValidator::new(secret)),
        }
    }
}

/// Authentication middleware that validates JWT session tokens
///
/// Extracts JWT from HTTP-only cookie or "Authorization: Bearer <token>" header,
/// validates signature and expiration, and injects AuthUser into request extensions.
///
/// # Errors
/// Returns 401 Unauthorized if:
/// - Both cookie and Authorization header are missing
/// - Token is malformed, invalid, or expired
/// - Token type is not "session"
pub async fn require_auth(
    state: axum::extract::State<Arc<JwtState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    // Try to extract token from cookie first (preferred for web apps)
    let token = if let Some(cookie_header) = request.headers().get(header::COOKIE) {
        cookie_header.to_str().ok().and_then(|cookies| {
            cookies
                .split(';')
                .map(|c| c.trim())
                .find(|c| c.starts_with("session_token="))
                .and_then(|c| c.strip_prefix("session_token="))
        })
    } else {
        None
    };

    // If not in cookie, fall back to Authorization header (for API clients)
    let token = match token {
        Some(t) => t.to_string(),
        None => {
            let auth_header = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .ok_or_else(|| {
                    (
                        StatusCode::UNAUTHORIZED,
                        Json(ErrorResponse {
                            error: "Missing authentication token (cookie or Authorization header)"
                                .to_string(),
                            code: Some("MISSING_AUTH".to_string()),
                        }),
                    )
                })?;

            auth_header
                .strip_prefix("Bearer ")
                .ok_or_else(|| {
                    (
                        StatusCode::UNAUTHORIZED,
                        Json(ErrorResponse {
                            error: "Invalid Authorization header format. Expected 'Bearer <token>'"
                                .to_string(),
                            code: Some("INVALID_AUTH_FORMAT".to_string()),
                        }),
                    )
                })?
                .to_string()
        }
    };

    // Validate JWT and extract claims
    let claims = state.validator.validate(&token).map_err(|e| {
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: format!("Invalid or expired token: {}", e),
                code: Some("INVALID_TOKEN".to_string()),
            }),
        )
    })?;

    // Only interactive session tokens grant API access
    match claims.token_type.as_deref() {
        Some(SESSION_TOKEN_TYPE) => {}
        Some(other) => {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: format!(
                        "Invalid token type '{}'. Expected 'session' token for API access",
                        other
                    ),
                    code: Some("INVALID_TOKEN_TYPE".to_string()),
                }),
            ));
        }
        None => {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "Token missing 'token_type' claim".to_string(),
                    code: Some("MISSING_TOKEN_TYPE".to_string()),
                }),
            ));
        }
    }

    let user_id = claims.user_id().map_err(|_| {
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Token subject is not a valid user ID".to_string(),
                code: Some("INVALID_SUBJECT".to_string()),
            }),
        )
    })?;

    let role = claims.role.unwrap_or_else(|| "team".to_string());

    let auth_user = AuthUser { user_id, role };

    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Reject the request with 403 unless the caller holds the master role.
pub fn require_master(user: &AuthUser) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    if user.role == "master" {
        Ok(())
    } else {
        Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "This operation requires the master role".to_string(),
                code: Some("FORBIDDEN".to_string()),
            }),
        ))
    }
}

/// Reject the request with 403 unless the caller is a master or coordinator.
pub fn require_admin(user: &AuthUser) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    if user.role == "master" || user.role == "coordinator" {
        Ok(())
    } else {
        Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "This operation requires the master or coordinator role".to_string(),
                code: Some("FORBIDDEN".to_string()),
            }),
        ))
    }
}
