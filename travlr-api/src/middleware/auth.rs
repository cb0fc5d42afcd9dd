use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use travlr_core::SESSION_COOKIE;

use crate::{error::AppError, state::AppState};

/// Pages of the admin area. Anything starting with one of these needs a session.
pub const ADMIN_PATHS: [&str; 3] = ["/admin/list-trips", "/admin/add-trip", "/admin/edit-trip"];

pub const LOGIN_PATH: &str = "/login";

pub fn is_admin_path(path: &str) -> bool {
    ADMIN_PATHS.iter().any(|prefix| path.starts_with(prefix))
}

/// `/login?from=<path>` with the path URL-encoded.
pub fn login_redirect_target(from: &str) -> String {
    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("from", from)
        .finish();
    format!("{}?{}", LOGIN_PATH, query)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

// ============================================================================
// Session Gate (admin pages)
// ============================================================================

/// Admin pages only: a missing or invalid cookie becomes a redirect to the
/// login page carrying the requested path. Other paths pass straight through.
pub async fn session_gate(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_owned();
    if !is_admin_path(&path) {
        return next.run(req).await;
    }

    let claims = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| state.keys().verify(cookie.value()));

    match claims {
        Some(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        None => {
            tracing::debug!(path = %path, "No valid session, redirecting to login");
            Redirect::to(&login_redirect_target(&path)).into_response()
        }
    }
}

// ============================================================================
// API write guard
// ============================================================================

/// JSON endpoints that modify the catalog. Accepts the session cookie or an
/// `Authorization: Bearer` header and answers 401 instead of redirecting.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| state.keys().verify(cookie.value()))
        .or_else(|| bearer_token(req.headers()).and_then(|token| state.keys().verify(token)))
        .ok_or_else(|| AppError::AuthenticationError("Authentication required".to_string()))?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_prefixes() {
        assert!(is_admin_path("/admin/list-trips"));
        assert!(is_admin_path("/admin/add-trip"));
        assert!(is_admin_path("/admin/edit-trip/GALE20240615"));
        assert!(!is_admin_path("/admin"));
        assert!(!is_admin_path("/trips"));
        assert!(!is_admin_path("/auth/login"));
    }

    #[test]
    fn test_redirect_target_encodes_path() {
        assert_eq!(login_redirect_target("/admin/list-trips"), "/login?from=%2Fadmin%2Flist-trips");
    }

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));

        headers.insert(AUTHORIZATION, "Basic Zm9vOmJhcg==".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
    }
}
