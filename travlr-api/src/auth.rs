use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use travlr_core::session::SESSION_TTL_DAYS;
use travlr_core::{IssuedSession, SESSION_COOKIE};

use crate::{error::AppError, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginPageQuery {
    pub from: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginPageResponse {
    pub message: String,
    pub from: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/login", get(login_page))
}

/// The HTTP-only session cookie carrying `token`.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .secure(secure)
        .max_age(time::Duration::days(SESSION_TTL_DAYS))
        .path("/")
        .same_site(SameSite::Lax)
        .build()
}

fn signed_in(jar: CookieJar, session: IssuedSession, secure: bool, message: &str) -> (CookieJar, Json<AuthResponse>) {
    let jar = jar.add(session_cookie(session.token.clone(), secure));
    (jar, Json(AuthResponse { message: message.to_string(), token: session.token }))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), AppError> {
    let Json(req) = payload?;
    let session = state.auth.register(&req.name, &req.email, &req.password).await?;

    let (jar, body) = signed_in(jar, session, state.auth_config.secure_cookies, "Registration successful");
    Ok((StatusCode::CREATED, jar, body))
}

/// POST /auth/login
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let Json(req) = payload?;
    let session = state.auth.login(&req.email, &req.password).await?;
    tracing::info!(user_id = %session.claims.sub, "Login successful");

    Ok(signed_in(jar, session, state.auth_config.secure_cookies, "Login successful"))
}

/// POST /auth/logout
/// Always writes an expired, empty cookie, whether or not one was sent.
async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    let mut cookie = session_cookie(String::new(), state.auth_config.secure_cookies);
    cookie.make_removal();

    (jar.add(cookie), Json(MessageResponse { message: "Logout successful".to_string() }))
}

/// GET /login
/// Where the session gate sends visitors; echoes the page to return to.
async fn login_page(Query(query): Query<LoginPageQuery>) -> Json<LoginPageResponse> {
    Json(LoginPageResponse {
        message: "Please sign in to continue".to_string(),
        from: query.from,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc".to_string(), true);
        assert_eq!(cookie.name(), "travlr-token");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::days(7)));
    }
}
