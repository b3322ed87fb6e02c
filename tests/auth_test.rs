use common::{json, request, setup_app, token_for};
use invest_ledger::{
    auth::jwt::verify_jwt,
    constants::{CONFLICT, CREATED, OK_RESPONSE},
    req::Method::GET,
};
mod common;

fn register_body(email: &str, username: &str, referral: Option<&str>) -> String {
    serde_json::json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "userName": username,
        "password": "secret",
        "email": email,
        "referralLink": referral,
    })
    .to_string()
}

#[tokio::test]
async fn register_creates_user_with_zero_balances() {
    let app = setup_app().await;

    let (status, body) = app
        .services
        .auth
        .register(&register_body("ada@example.com", "ada", None))
        .await;

    assert_eq!(status, CREATED);
    let body = json(&body);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["email"], "ada@example.com");
    assert_eq!(body["name"], "Ada");
    assert!(body["referringUser"].is_null());
    assert!(body.get("referringUser").is_some());

    let claims = verify_jwt(body["token"].as_str().unwrap(), common::SECRET).unwrap();
    assert_eq!(claims.email, "ada@example.com");
    assert_eq!(claims.exp - claims.iat, 3600);

    let user = app.user("ada@example.com").await;
    assert_eq!(user.funded, 0.0);
    assert_eq!(user.capital, 0.0);
    assert_eq!(user.ref_bonus, 0.0);
    assert_eq!(user.upline, None);
    assert_eq!(user.password, "secret");
    assert_eq!(user.referral.len(), 64);
}

#[tokio::test]
async fn register_duplicate_email_is_conflict() {
    let app = setup_app().await;
    app.seed_user("taken@example.com", "taken", None, 0.0, 0.0).await;

    let (status, body) = app
        .services
        .auth
        .register(&register_body("taken@example.com", "other", None))
        .await;

    assert_eq!(status, CONFLICT);
    assert_eq!(json(&body)["status"], "error");
    let users = app.repository.all_users().await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].username, "taken");
}

#[tokio::test]
async fn register_with_referral_credits_flat_bonus() {
    let app = setup_app().await;
    app.seed_user("ref@example.com", "referrer", None, 100.0, 80.0)
        .await;

    let (status, body) = app
        .services
        .auth
        .register(&register_body("new@example.com", "newbie", Some("referrer")))
        .await;

    assert_eq!(status, CREATED);
    let body = json(&body);
    assert_eq!(body["referringUserEmail"], "ref@example.com");
    assert_eq!(body["referringUserName"], "First");
    assert!(body.get("referringUser").is_none());

    let referrer = app.user("ref@example.com").await;
    assert_eq!(referrer.ref_bonus, 15.0);
    assert_eq!(referrer.totalprofit, 15.0);
    assert_eq!(referrer.funded, 115.0);
    assert_eq!(referrer.capital, 95.0);

    let doc = app.repository.document(referrer).await.unwrap();
    assert_eq!(doc.referred.len(), 1);
    assert_eq!(doc.referred[0].email, "new@example.com");
    assert_eq!(doc.referred[0].ref_bonus, 15.0);

    let newbie = app.user("new@example.com").await;
    assert_eq!(newbie.upline.as_deref(), Some("referrer"));
    assert_eq!(newbie.funded, 0.0);
}

#[tokio::test]
async fn register_with_unknown_referral_keeps_upline() {
    let app = setup_app().await;

    let (status, body) = app
        .services
        .auth
        .register(&register_body("new@example.com", "newbie", Some("ghost")))
        .await;

    assert_eq!(status, CREATED);
    assert!(json(&body)["referringUser"].is_null());
    let newbie = app.user("new@example.com").await;
    assert_eq!(newbie.upline.as_deref(), Some("ghost"));
}

#[tokio::test]
async fn login_checks_plaintext_password_and_stores_rememberme() {
    let app = setup_app().await;
    app.seed_user("user@example.com", "user", None, 0.0, 0.0).await;

    let (status, body) = app
        .services
        .auth
        .login(r#"{"email":"user@example.com","password":"password","rememberme":true}"#)
        .await;
    assert_eq!(status, OK_RESPONSE);
    let body = json(&body);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["message"], "Login successful");
    let claims = verify_jwt(body["token"].as_str().unwrap(), common::SECRET).unwrap();
    assert_eq!(claims.exp - claims.iat, 7 * 24 * 3600);
    assert_eq!(app.user("user@example.com").await.rememberme, 1);

    let (_, body) = app
        .services
        .auth
        .login(r#"{"email":"user@example.com","password":"nope"}"#)
        .await;
    assert_eq!(json(&body)["status"], 401);

    let (_, body) = app
        .services
        .auth
        .login(r#"{"email":"ghost@example.com","password":"password"}"#)
        .await;
    assert_eq!(json(&body)["status"], 404);
}

#[tokio::test]
async fn verify_reports_rememberme() {
    let app = setup_app().await;
    let user = app.seed_user("user@example.com", "user", None, 0.0, 0.0).await;
    let token = token_for(&user);

    let (_, body) = app
        .services
        .auth
        .verify(&request(GET, "/api/verify", "", Some(&token)))
        .await;
    assert_eq!(json(&body)["status"], "false");

    app.services
        .auth
        .login(r#"{"email":"user@example.com","password":"password","rememberme":true}"#)
        .await;
    let (_, body) = app
        .services
        .auth
        .verify(&request(GET, "/api/verify", "", Some(&token)))
        .await;
    assert_eq!(json(&body)["status"], "ok");

    let (_, body) = app
        .services
        .auth
        .verify(&request(GET, "/api/verify", "", Some("garbage")))
        .await;
    assert!(json(&body)["status"].as_str().unwrap().starts_with("error"));
}

#[tokio::test]
async fn register_stores_referral_link_as_sent() {
    let app = setup_app().await;
    app.seed_user("ref@example.com", "referrer", None, 0.0, 0.0).await;

    let (status, body) = app
        .services
        .auth
        .register(&register_body("new@example.com", "newbie", Some(" referrer ")))
        .await;
    assert_eq!(status, CREATED);
    assert!(json(&body)["referringUser"].is_null());
    let newbie = app.user("new@example.com").await;
    assert_eq!(newbie.upline.as_deref(), Some(" referrer "));
    assert_eq!(app.user("ref@example.com").await.ref_bonus, 0.0);

    app.services
        .auth
        .register(&register_body("other@example.com", "other", Some("")))
        .await;
    assert!(app.user("other@example.com").await.upline.is_none());
}
