mod common;

use anyhow::Result;
use axum::http::{header, StatusCode};
use serde_json::json;

use common::{TestApp, PASSWORD};
use todo_api::auth::TokenIssuer;

#[tokio::test]
async fn register_returns_user_without_password() -> Result<()> {
    let app = TestApp::new()?;

    let res = app
        .post(
            "/api/v1/register",
            None,
            json!({ "name": "John Doe Example", "email": "john@x.com", "password": PASSWORD }),
        )
        .await?;

    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["name"], "John Doe Example");
    assert_eq!(res.body["email"], "john@x.com");
    assert_eq!(res.body["isEnabled"], true);
    assert!(res.body["id"].as_i64().is_some());
    assert!(res.body.get("password").is_none());
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_conflict() -> Result<()> {
    let app = TestApp::new()?;
    app.signup("John Doe Example", "john@x.com").await?;

    let res = app
        .post(
            "/api/v1/register",
            None,
            json!({ "name": "Another John", "email": "john@x.com", "password": "Other123" }),
        )
        .await?;

    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.error(), "User with this email already exists.");
    Ok(())
}

#[tokio::test]
async fn email_uniqueness_ignores_case() -> Result<()> {
    let app = TestApp::new()?;
    let (user, _) = app.signup("John Doe Example", "john@x.com").await?;

    let shouting = app
        .post(
            "/api/v1/register",
            None,
            json!({ "name": "Another John", "email": "JOHN@X.COM", "password": "Other123" }),
        )
        .await?;
    assert_eq!(shouting.status, StatusCode::CONFLICT);
    assert_eq!(shouting.error(), "User with this email already exists.");

    let login = app
        .post("/api/v1/login", None, json!({ "email": "John@x.com", "password": PASSWORD }))
        .await?;
    assert_eq!(login.status, StatusCode::OK);

    let me = app.get("/api/v1/user", login.cookie().as_deref()).await?;
    assert_eq!(me.body["id"], user["id"]);
    assert_eq!(me.body["email"], "john@x.com");
    Ok(())
}

#[tokio::test]
async fn register_rejects_bad_input() -> Result<()> {
    let app = TestApp::new()?;

    let malformed = app.post("/api/v1/register", None, json!({ "name": 42 })).await?;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
    assert_eq!(malformed.error(), "Please provide a valid user.");

    let short_name = app
        .post(
            "/api/v1/register",
            None,
            json!({ "name": "John", "email": "john@x.com", "password": PASSWORD }),
        )
        .await?;
    assert_eq!(short_name.status, StatusCode::BAD_REQUEST);
    assert_eq!(short_name.error(), "The name has to be at least 6 characters long.");

    let bad_email = app
        .post(
            "/api/v1/register",
            None,
            json!({ "name": "John Doe Example", "email": "john", "password": PASSWORD }),
        )
        .await?;
    assert_eq!(bad_email.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn login_sets_session_cookie_for_the_user() -> Result<()> {
    let app = TestApp::new()?;
    let (user, _) = app.signup("John Doe Example", "john@x.com").await?;

    let res = app
        .post("/api/v1/login", None, json!({ "email": "john@x.com", "password": PASSWORD }))
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, json!({ "message": "Successful login!" }));

    let set_cookie = res.headers.get(header::SET_COOKIE).unwrap().to_str()?;
    assert!(set_cookie.contains("Max-Age=2592000"));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Path=/"));

    // The embedded identifier resolves back to the registered user
    let token = res.cookie().unwrap().trim_start_matches("jwt=").to_string();
    let issuer = TokenIssuer::new(&app.config.security.jwt_secret, app.config.security.token_ttl_days);
    assert_eq!(issuer.verify(&token)?, user["id"].as_i64().unwrap());
    Ok(())
}

#[tokio::test]
async fn login_failures_keep_their_messages() -> Result<()> {
    let app = TestApp::new()?;
    app.signup("John Doe Example", "john@x.com").await?;

    let unknown = app
        .post("/api/v1/login", None, json!({ "email": "nobody@x.com", "password": PASSWORD }))
        .await?;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.error(), "User with this email does not exist.");

    let wrong = app
        .post("/api/v1/login", None, json!({ "email": "john@x.com", "password": "nope" }))
        .await?;
    assert_eq!(wrong.status, StatusCode::FORBIDDEN);
    assert_eq!(wrong.error(), "Incorrect password.");
    assert!(wrong.cookie().is_none());
    Ok(())
}

#[tokio::test]
async fn pending_activation_blocks_login() -> Result<()> {
    let app = TestApp::with_config(|config| config.security.require_activation = true)?;

    let registered = app
        .post(
            "/api/v1/register",
            None,
            json!({ "name": "John Doe Example", "email": "john@x.com", "password": PASSWORD }),
        )
        .await?;
    assert_eq!(registered.body["isEnabled"], false);

    let res = app
        .post("/api/v1/login", None, json!({ "email": "john@x.com", "password": PASSWORD }))
        .await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.error(), "This user is not activated.");
    Ok(())
}

#[tokio::test]
async fn whoami_needs_a_valid_session() -> Result<()> {
    let app = TestApp::new()?;
    let (user, cookie) = app.signup("John Doe Example", "john@x.com").await?;

    let me = app.get("/api/v1/user", Some(&cookie)).await?;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["id"], user["id"]);

    for cookie in [None, Some("jwt=garbage"), Some("other=value")] {
        let res = app.get("/api/v1/user", cookie).await?;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
        assert_eq!(res.error(), "You are not logged in.");
    }

    // A token signed with another secret is rejected the same way
    let forged = TokenIssuer::new("not-the-server-secret", 30).issue(user["id"].as_i64().unwrap())?;
    let res = app.get("/api/v1/user", Some(&format!("jwt={}", forged))).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn logout_expires_the_cookie() -> Result<()> {
    let app = TestApp::new()?;

    let res = app.post("/api/v1/logout", None, json!({})).await?;
    assert_eq!(res.status, StatusCode::OK);

    let set_cookie = res.headers.get(header::SET_COOKIE).unwrap().to_str()?;
    assert!(set_cookie.starts_with("jwt=;"));
    assert!(set_cookie.contains("Max-Age=0"));
    Ok(())
}

#[tokio::test]
async fn bearer_source_ignores_cookies() -> Result<()> {
    let app = TestApp::with_config(|config| {
        config.security.credential_source = todo_api::config::CredentialSource::Bearer;
    })?;
    let (_, cookie) = app.signup("John Doe Example", "john@x.com").await?;

    let with_cookie = app.get("/api/v1/user", Some(&cookie)).await?;
    assert_eq!(with_cookie.status, StatusCode::UNAUTHORIZED);

    let token = cookie.trim_start_matches("jwt=");
    let request = axum::http::Request::builder()
        .uri("/api/v1/user")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(axum::body::Body::empty())?;
    let res = app.send(request).await?;
    assert_eq!(res.status, StatusCode::OK);
    Ok(())
}
