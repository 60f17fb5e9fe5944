use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, HeaderValue},
};

use crate::app::AppState;
use crate::auth::Credential;
use crate::config::{CredentialSource, SecurityConfig};
use crate::database::models::User;
use crate::error::ApiError;

/// The authenticated user behind a request. Rejects with 401 when the
/// credential is missing, invalid, expired or belongs to no enabled user.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let credential = extract_credential(&parts.headers, &state.config.security);
        let user = state.sessions.resolve(&credential).await?;
        Ok(CurrentUser(user))
    }
}

/// Pull the session token from wherever the deployment expects it
pub fn extract_credential(headers: &HeaderMap, security: &SecurityConfig) -> Credential {
    let token = match security.credential_source {
        CredentialSource::Cookie => extract_cookie(headers, &security.cookie_name),
        CredentialSource::Bearer => extract_bearer(headers),
    };
    Credential::new(token)
}

fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
}

/// `Set-Cookie` value carrying a freshly issued token.
pub fn session_cookie(security: &SecurityConfig, token: &str) -> Result<HeaderValue, ApiError> {
    let max_age = security.token_ttl_days.saturating_mul(24 * 60 * 60);
    cookie_header(security, token, max_age)
}

/// `Set-Cookie` value telling the client to drop its token.
pub fn expired_cookie(security: &SecurityConfig) -> Result<HeaderValue, ApiError> {
    cookie_header(security, "", 0)
}

fn cookie_header(security: &SecurityConfig, value: &str, max_age: i64) -> Result<HeaderValue, ApiError> {
    let mut cookie = format!(
        "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
        security.cookie_name, value, max_age
    );
    if let Some(domain) = &security.cookie_domain {
        cookie.push_str("; Domain=");
        cookie.push_str(domain);
    }
    if security.cookie_secure {
        cookie.push_str("; Secure");
    }

    HeaderValue::from_str(&cookie).map_err(|e| {
        tracing::error!("Invalid session cookie: {}", e);
        ApiError::internal_server_error("Failed to Log In. Try again later.")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn security() -> SecurityConfig {
        AppConfig::for_tests().security
    }

    #[test]
    fn reads_named_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; jwt=abc.def.ghi; lang=en"));

        let credential = extract_credential(&headers, &security());
        assert_eq!(credential.token(), Some("abc.def.ghi"));
    }

    #[test]
    fn missing_cookie_is_missing_credential() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("jwtx=nope"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));

        assert_eq!(extract_credential(&headers, &security()), Credential::missing());
    }

    #[test]
    fn bearer_source_reads_authorization_header() {
        let mut security = security();
        security.credential_source = CredentialSource::Bearer;

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_credential(&headers, &security).token(), Some("abc.def.ghi"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(extract_credential(&headers, &security), Credential::missing());
    }

    #[test]
    fn session_cookie_attributes() {
        let mut security = security();
        security.cookie_domain = Some("localhost".to_string());
        security.cookie_secure = true;

        let cookie = session_cookie(&security, "tok").unwrap();
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with("jwt=tok; Max-Age=2592000; Path=/; HttpOnly"));
        assert!(cookie.contains("; Domain=localhost"));
        assert!(cookie.ends_with("; Secure"));

        let expired = expired_cookie(&security).unwrap();
        assert!(expired.to_str().unwrap().starts_with("jwt=; Max-Age=0;"));
    }

    #[test]
    fn session_cookie_max_age_saturates() {
        let mut security = security();
        security.token_ttl_days = i64::MAX;

        let cookie = session_cookie(&security, "tok").unwrap();
        let expected = format!("jwt=tok; Max-Age={}; Path=/", i64::MAX);
        assert!(cookie.to_str().unwrap().starts_with(&expected));
    }
}
