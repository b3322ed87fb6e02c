use std::sync::Arc;

use chrono::Duration;
use serde::Serialize;
use serde_json::json;

use super::jwt::{authenticate, create_jwt};
use super::model::{LoginRequest, RegisterRequest};
use crate::{
    config::Config,
    constants::{
        BAD_REQUEST, CONFLICT, CREATED, INTERNAL_ERROR, LOGIN_TOKEN_DAYS, OK_RESPONSE,
        REFERRAL_BONUS, REGISTER_TOKEN_HOURS,
    },
    error::CustomError,
    req::Request,
    user::{
        model::{Field, FieldValue, Referral, User},
        repository::UserRepository,
    },
    utils::{des_from_str, locale_string, now_local, random_hex, respond},
};

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RegisterResponse {
    status: &'static str,
    email: String,
    name: String,
    token: String,
    admin_subject: &'static str,
    message: String,
    subject: &'static str,
    #[serde(flatten)]
    referrer: ReferrerNotice,
}

#[derive(Serialize, Debug)]
#[serde(untagged)]
enum ReferrerNotice {
    #[serde(rename_all = "camelCase")]
    Found {
        referring_user_email: String,
        referring_user_name: String,
        referring_user_message: String,
    },
    #[serde(rename_all = "camelCase")]
    Missing { referring_user: Option<String> },
}

pub struct AuthService {
    repository: Arc<UserRepository>,
    config: Arc<Config>,
}

impl AuthService {
    pub fn new(repository: Arc<UserRepository>, config: Arc<Config>) -> Self {
        AuthService { repository, config }
    }

    pub async fn register(&self, request: &str) -> (String, String) {
        let req_user: RegisterRequest = match des_from_str(request) {
            Ok(user) => user,
            Err(_) => {
                return respond(
                    BAD_REQUEST,
                    &json!({ "status": "error", "message": "invalid body" }),
                );
            }
        };

        match self.try_register(&req_user).await {
            Ok(response) => respond(CREATED, &response),
            Err(CustomError::EmailExists) => {
                log::info!("Register rejected, {} already exists", req_user.email);
                respond(
                    CONFLICT,
                    &json!({ "status": "error", "message": "Email or username already exists" }),
                )
            }
            Err(error) => {
                log::error!("Error during user registration: {:?}", error);
                respond(
                    INTERNAL_ERROR,
                    &json!({ "status": "error", "message": "Server error. Please try again later." }),
                )
            }
        }
    }

    async fn try_register(&self, req: &RegisterRequest) -> Result<RegisterResponse, CustomError> {
        match self.repository.find_by_email(&req.email).await {
            Ok(_) => return Err(CustomError::EmailExists),
            Err(CustomError::UserNotFound) => {}
            Err(e) => return Err(e),
        }

        let now = now_local();
        let upline = req.upline();
        let referrer = match &upline {
            Some(username) => self.repository.find_optional_by_username(username).await?,
            None => None,
        };

        if let Some(referrer) = &referrer {
            let referral = Referral {
                firstname: req.first_name.clone(),
                lastname: req.last_name.clone(),
                email: req.email.clone(),
                date: locale_string(&now),
                ref_bonus: REFERRAL_BONUS,
            };
            self.repository.push_referral(&referrer.id, &referral).await?;
            self.repository
                .set_fields(
                    &referrer.email,
                    &[
                        (Field::RefBonus, FieldValue::Number(referrer.ref_bonus + REFERRAL_BONUS)),
                        (
                            Field::TotalProfit,
                            FieldValue::Number(referrer.totalprofit + REFERRAL_BONUS),
                        ),
                        (Field::Funded, FieldValue::Number(referrer.funded + REFERRAL_BONUS)),
                        (Field::Capital, FieldValue::Number(referrer.capital + REFERRAL_BONUS)),
                    ],
                )
                .await?;
            log::info!("{} credited referral bonus for {}", referrer.username, req.email);
        }

        let new_user = User::new(
            random_hex(12),
            &req.first_name,
            &req.last_name,
            &req.user_name,
            &req.email,
            &req.password,
            random_hex(32),
            upline,
        );
        self.repository.insert_user(&new_user).await?;

        let token = create_jwt(
            &new_user.id,
            &new_user.email,
            &self.config.jwt_secret,
            Duration::hours(REGISTER_TOKEN_HOURS),
        )?;

        let referrer = match referrer {
            Some(referrer) => ReferrerNotice::Found {
                referring_user_email: referrer.email,
                referring_user_name: referrer.firstname,
                referring_user_message: format!(
                    "A new user with the name {} {} just signed up with your referral link. You will now earn 10% of every deposit this user makes. Keep referring to earn more.",
                    req.first_name, req.last_name
                ),
            },
            None => ReferrerNotice::Missing {
                referring_user: None,
            },
        };

        log::info!("{} registered", new_user.email);
        Ok(RegisterResponse {
            status: "ok",
            email: new_user.email,
            name: new_user.firstname,
            token,
            admin_subject: "User Signup Alert",
            message: format!(
                "A new user with the following details just signed up:\nName: {} {}\nEmail: {}",
                req.first_name, req.last_name, req.email
            ),
            subject: "Successful User Referral Alert",
            referrer,
        })
    }

    pub async fn login(&self, request: &str) -> (String, String) {
        let req_user: LoginRequest = match des_from_str(request) {
            Ok(user) => user,
            Err(_) => {
                return respond(
                    BAD_REQUEST,
                    &json!({ "status": "error", "message": "invalid body" }),
                );
            }
        };

        let user_db = match self.repository.find_by_email(&req_user.email).await {
            Ok(user) => user,
            Err(CustomError::UserNotFound) => {
                log::info!("User {} not found", req_user.email);
                return respond(
                    OK_RESPONSE,
                    &json!({ "status": 404, "message": "User does not exist" }),
                );
            }
            Err(error) => {
                log::error!("Error during login: {:?}", error);
                return internal_error();
            }
        };

        if req_user.password != user_db.password {
            log::info!("User {} wrong password", req_user.email);
            return respond(
                OK_RESPONSE,
                &json!({ "status": 401, "message": "Incorrect password" }),
            );
        }

        let token = match create_jwt(
            &user_db.id,
            &user_db.email,
            &self.config.jwt_secret,
            Duration::days(LOGIN_TOKEN_DAYS),
        ) {
            Ok(token) => token,
            Err(e) => {
                log::error!("Error creating JWT: {:#?}", e);
                return internal_error();
            }
        };

        let remember = i64::from(req_user.rememberme.unwrap_or(false));
        if let Err(error) = self
            .repository
            .set_fields(&user_db.email, &[(Field::RememberMe, FieldValue::Int(remember))])
            .await
        {
            log::error!("Error during login: {:?}", error);
            return internal_error();
        }

        log::info!("{} succeed login", user_db.email);
        respond(
            OK_RESPONSE,
            &json!({ "status": "ok", "token": token, "message": "Login successful" }),
        )
    }

    /// Reports whether the token owner asked to be remembered.
    pub async fn verify(&self, request: &Request) -> (String, String) {
        let result = async {
            let claims = authenticate(&request.headers, &self.config.jwt_secret)?;
            self.repository.find_by_email(&claims.email).await
        }
        .await;

        match result {
            Ok(user) if user.rememberme != 0 => respond(OK_RESPONSE, &json!({ "status": "ok" })),
            Ok(_) => respond(OK_RESPONSE, &json!({ "status": "false" })),
            Err(error) => {
                log::info!("Verification failed: {}", error);
                respond(
                    OK_RESPONSE,
                    &json!({ "status": format!("error {}", error) }),
                )
            }
        }
    }
}

fn internal_error() -> (String, String) {
    respond(
        OK_RESPONSE,
        &json!({ "status": "error", "message": "Internal server error" }),
    )
}
