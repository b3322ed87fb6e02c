#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration;
use invest_ledger::{
    auth::jwt::create_jwt,
    config::Config,
    constants::TOKEN_HEADER,
    db::init_schema,
    req::{Method, Request},
    server::Services,
    user::{
        model::{Field, FieldValue, User},
        repository::UserRepository,
    },
    utils::random_hex,
};
use rand::Rng;
use serde_json::Value;
use sqlx::{AnyPool, any::install_default_drivers};

pub const SECRET: &str = "test-secret";

pub async fn setup_test_db() -> AnyPool {
    install_default_drivers();
    let timestamp: String = rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(7)
        .map(char::from)
        .collect();
    let db_name = format!("test_{}", timestamp);
    let database_url = format!("sqlite:file:{}?mode=memory&cache=shared", db_name);

    // Create the pool (which will internally use shared memory DB)
    let pool = AnyPool::connect(&database_url)
        .await
        .expect("Failed to create in-memory SQLite DB");

    init_schema(&pool).await.expect("Failed to create test tables");

    pool
}

pub fn config() -> Arc<Config> {
    Arc::new(Config::new("sqlite::memory:", SECRET))
}

pub struct TestApp {
    pub pool: AnyPool,
    pub services: Services,
    pub repository: UserRepository,
}

pub async fn setup_app() -> TestApp {
    let pool = setup_test_db().await;
    TestApp {
        services: Services::new(pool.clone(), config()),
        repository: UserRepository::new(pool.clone()),
        pool,
    }
}

impl TestApp {
    /// Inserts a user directly and sets its funded/capital balances.
    pub async fn seed_user(
        &self,
        email: &str,
        username: &str,
        upline: Option<&str>,
        funded: f64,
        capital: f64,
    ) -> User {
        let user = User::new(
            random_hex(12),
            "First",
            "Last",
            username,
            email,
            "password",
            random_hex(32),
            upline.map(str::to_string),
        );
        self.repository
            .insert_user(&user)
            .await
            .expect("Failed to insert test user");
        self.repository
            .set_fields(
                email,
                &[
                    (Field::Funded, FieldValue::Number(funded)),
                    (Field::Capital, FieldValue::Number(capital)),
                ],
            )
            .await
            .expect("Failed to set balances");
        self.user(email).await
    }

    /// Admins are seeded out of band; no route creates them.
    pub async fn add_admin(&self, email: &str) {
        sqlx::query("INSERT INTO admins (email) VALUES ($1)")
            .bind(email)
            .execute(&self.pool)
            .await
            .expect("Failed to insert admin");
    }

    pub async fn user(&self, email: &str) -> User {
        self.repository
            .find_by_email(email)
            .await
            .expect("user should exist")
    }
}

pub fn token_for(user: &User) -> String {
    create_jwt(&user.id, &user.email, SECRET, Duration::hours(1)).expect("token")
}

pub fn request(method: Method, path: &str, body: &str, token: Option<&str>) -> Request {
    let mut headers = HashMap::new();
    if let Some(token) = token {
        headers.insert(TOKEN_HEADER.to_string(), token.to_string());
    }
    Request {
        method,
        path: path.to_string(),
        headers,
        body: body.to_string(),
    }
}

pub fn json(body: &str) -> Value {
    serde_json::from_str(body).expect("response should be JSON")
}
