use chrono::Duration;
use common::{SECRET, json, request, setup_app, token_for};
use invest_ledger::{
    auth::jwt::create_jwt,
    constants::{NOT_FOUND, OK_RESPONSE, UNAUTHORIZED},
    req::Method::{GET, POST},
};
mod common;

#[tokio::test]
async fn get_data_returns_profile_projection() {
    let app = setup_app().await;
    let user = app.seed_user("user@example.com", "user", None, 100.0, 100.0).await;
    app.services
        .ledger
        .fund_wallet(r#"{"email":"user@example.com","amount":10,"proof":"p-1"}"#)
        .await;

    let (status, body) = app
        .services
        .user
        .get_data(&request(GET, "/api/getData", "", Some(&token_for(&user))))
        .await;

    assert_eq!(status, OK_RESPONSE);
    let body = json(&body);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["funded"], 110.0);
    assert_eq!(body["refBonus"], 0.0);
    assert_eq!(body["promo"], false);
    assert_eq!(body["deposit"].as_array().unwrap().len(), 1);
    assert_eq!(body["transaction"][0]["type"], "Deposit");
    assert_eq!(body["proofs"][0], "p-1");
    assert!(body["invest"].as_array().unwrap().is_empty());
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn get_data_rejects_bad_tokens() {
    let app = setup_app().await;
    let user = app.seed_user("user@example.com", "user", None, 0.0, 0.0).await;

    let (status, body) = app
        .services
        .user
        .get_data(&request(GET, "/api/getData", "", None))
        .await;
    assert_eq!(status, UNAUTHORIZED);
    assert_eq!(json(&body)["message"], "No token provided");

    let expired = create_jwt(&user.id, &user.email, SECRET, Duration::hours(-2)).unwrap();
    let (status, body) = app
        .services
        .user
        .get_data(&request(GET, "/api/getData", "", Some(&expired)))
        .await;
    assert_eq!(status, UNAUTHORIZED);
    assert_eq!(json(&body)["message"], "Token expired");

    let (status, _) = app
        .services
        .user
        .get_data(&request(GET, "/api/getData", "", Some("not-a-token")))
        .await;
    assert_eq!(status, UNAUTHORIZED);

    let ghost = create_jwt("x", "ghost@example.com", SECRET, Duration::hours(1)).unwrap();
    let (status, body) = app
        .services
        .user
        .get_data(&request(GET, "/api/getData", "", Some(&ghost)))
        .await;
    assert_eq!(status, NOT_FOUND);
    assert_eq!(json(&body)["message"], "User not found");
}

#[tokio::test]
async fn update_user_data_writes_only_changed_profile_fields() {
    let app = setup_app().await;
    let user = app.seed_user("user@example.com", "user", None, 10.0, 10.0).await;
    let token = token_for(&user);

    let (_, body) = app
        .services
        .user
        .update_user_data(&request(
            POST,
            "/api/updateUserData",
            r#"{"firstname":"First","country":"NG","email":"evil@example.com","funded":9999}"#,
            Some(&token),
        ))
        .await;
    let body = json(&body);
    assert_eq!(body["status"], 200);
    assert_eq!(body["message"], "Profile updated successfully");

    let after = app.user("user@example.com").await;
    assert_eq!(after.country, "NG");
    assert_eq!(after.firstname, "First");
    assert_eq!(after.funded, 10.0);

    let (_, body) = app
        .services
        .user
        .update_user_data(&request(
            POST,
            "/api/updateUserData",
            r#"{"country":"NG","email":"evil@example.com"}"#,
            Some(&token),
        ))
        .await;
    let body = json(&body);
    assert_eq!(body["status"], 400);
    assert_eq!(body["message"], "No changes were made");
}

#[tokio::test]
async fn update_user_data_stores_numbers_as_text() {
    let app = setup_app().await;
    let user = app.seed_user("user@example.com", "user", None, 0.0, 0.0).await;

    let (_, body) = app
        .services
        .user
        .update_user_data(&request(
            POST,
            "/api/updateUserData",
            r#"{"zipcode":12345,"phonenumber":8012345678,"address":null}"#,
            Some(&token_for(&user)),
        ))
        .await;
    assert_eq!(json(&body)["status"], 200);

    let after = app.user("user@example.com").await;
    assert_eq!(after.zipcode, "12345");
    assert_eq!(after.phonenumber, "8012345678");
    assert_eq!(after.address, "");
}

#[tokio::test]
async fn refer_checks_username() {
    let app = setup_app().await;
    app.seed_user("user@example.com", "alice", None, 0.0, 0.0).await;

    let (_, body) = app.services.user.refer("alice").await;
    let body = json(&body);
    assert_eq!(body["status"], 200);
    assert_eq!(body["referredUser"], "alice");

    let (_, body) = app.services.user.refer("bob").await;
    assert_eq!(json(&body)["status"], 400);
}

#[tokio::test]
async fn admin_lookup_by_email() {
    let app = setup_app().await;
    app.add_admin("boss@example.com").await;

    let (_, body) = app.services.user.admin(r#"{"email":"boss@example.com"}"#).await;
    assert_eq!(json(&body)["status"], 200);

    let (_, body) = app.services.user.admin(r#"{"email":"user@example.com"}"#).await;
    assert_eq!(json(&body)["status"], 400);
}

#[tokio::test]
async fn delete_user_removes_user_and_lists() {
    let app = setup_app().await;
    let user = app.seed_user("user@example.com", "user", None, 10.0, 10.0).await;
    app.services
        .ledger
        .fund_wallet(r#"{"email":"user@example.com","amount":10}"#)
        .await;

    let (_, body) = app
        .services
        .user
        .delete_user(r#"{"email":"user@example.com"}"#)
        .await;
    assert_eq!(json(&body)["status"], 200);
    assert!(app.repository.find_by_email("user@example.com").await.is_err());
    assert!(app
        .repository
        .records(&user.id, invest_ledger::user::model::RecordList::Deposit)
        .await
        .unwrap()
        .is_empty());

    // nothing left to delete still succeeds
    let (_, body) = app
        .services
        .user
        .delete_user(r#"{"email":"user@example.com"}"#)
        .await;
    assert_eq!(json(&body)["status"], 200);
}

#[tokio::test]
async fn get_users_dumps_full_documents() {
    let app = setup_app().await;
    app.seed_user("a@example.com", "a", None, 1.0, 1.0).await;
    app.seed_user("b@example.com", "b", Some("a"), 2.0, 2.0).await;

    let (status, body) = app.services.user.get_users().await;
    assert_eq!(status, OK_RESPONSE);
    let body = json(&body);
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["email"], "a@example.com");
    assert_eq!(users[0]["password"], "password");
    assert_eq!(users[0]["rememberme"], false);
    assert!(users[0]["upline"].is_null());
    assert_eq!(users[1]["upline"], "a");
    assert!(users[1]["investment"].as_array().unwrap().is_empty());
}
