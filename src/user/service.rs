use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value, json};

use super::{
    model::{EmailRequest, Field, FieldValue, Investment, LedgerRecord, Referral, UserDocument},
    repository::UserRepository,
};
use crate::{
    auth::jwt::authenticate,
    config::Config,
    constants::{INTERNAL_ERROR, NOT_FOUND, OK_RESPONSE, UNAUTHORIZED},
    error::CustomError,
    req::Request,
    utils::{des_from_str, respond},
};

/// What `getData` exposes of a user.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    status: &'static str,
    firstname: String,
    lastname: String,
    username: String,
    email: String,
    funded: f64,
    invest: Vec<Investment>,
    proofs: Vec<String>,
    transaction: Vec<LedgerRecord>,
    withdraw: Vec<LedgerRecord>,
    ref_bonus: f64,
    referred: Vec<Referral>,
    referral: String,
    phonenumber: String,
    state: String,
    zipcode: String,
    address: String,
    profilepicture: String,
    country: String,
    totalprofit: f64,
    totaldeposit: f64,
    totalwithdraw: f64,
    deposit: Vec<LedgerRecord>,
    promo: bool,
    periodic_profit: f64,
}

impl From<UserDocument> for Profile {
    fn from(doc: UserDocument) -> Self {
        let user = doc.user;
        Profile {
            status: "ok",
            firstname: user.firstname,
            lastname: user.lastname,
            username: user.username,
            email: user.email,
            funded: user.funded,
            invest: doc.investment,
            proofs: doc.proofs,
            transaction: doc.transaction,
            withdraw: doc.withdraw,
            ref_bonus: user.ref_bonus,
            referred: doc.referred,
            referral: user.referral,
            phonenumber: user.phonenumber,
            state: user.state,
            zipcode: user.zipcode,
            address: user.address,
            profilepicture: user.profilepicture,
            country: user.country,
            totalprofit: user.totalprofit,
            totaldeposit: user.totaldeposit,
            totalwithdraw: user.totalwithdraw,
            deposit: doc.deposit,
            promo: user.promo != 0,
            periodic_profit: user.periodic_profit,
        }
    }
}

pub struct UserService {
    repository: Arc<UserRepository>,
    config: Arc<Config>,
}

impl UserService {
    pub fn new(repository: Arc<UserRepository>, config: Arc<Config>) -> Self {
        UserService { repository, config }
    }

    pub async fn get_data(&self, request: &Request) -> (String, String) {
        let result = async {
            let claims = authenticate(&request.headers, &self.config.jwt_secret)?;
            let user = self.repository.find_by_email(&claims.email).await?;
            self.repository.document(user).await
        }
        .await;

        match result {
            Ok(doc) => respond(OK_RESPONSE, &Profile::from(doc)),
            Err(error) => {
                log::error!("Error fetching user data: {}", error);
                let status_line = match error {
                    CustomError::MissingToken
                    | CustomError::InvalidToken(_)
                    | CustomError::TokenExpired => UNAUTHORIZED,
                    CustomError::UserNotFound => NOT_FOUND,
                    _ => INTERNAL_ERROR,
                };
                let message = match error {
                    CustomError::DBError(_) => "Internal server error".to_string(),
                    other => other.to_string(),
                };
                respond(status_line, &json!({ "status": "error", "message": message }))
            }
        }
    }

    /// Writes only the profile keys whose value changed. The email never changes.
    pub async fn update_user_data(&self, request: &Request) -> (String, String) {
        let result = async {
            let claims = authenticate(&request.headers, &self.config.jwt_secret)?;
            let body: Map<String, Value> = des_from_str(&request.body)?;
            let user = match self.repository.find_by_email(&claims.email).await {
                Ok(user) => user,
                Err(CustomError::UserNotFound) => return Ok(None),
                Err(e) => return Err(e),
            };

            let changed: Vec<(Field, FieldValue)> = body
                .iter()
                .filter(|(key, _)| key.as_str() != "email")
                .filter_map(|(key, value)| {
                    let field = Field::profile(key)?;
                    let value = profile_text(value)?;
                    (field.text_of(&user) != Some(value.as_str()))
                        .then(|| (field, FieldValue::Text(value)))
                })
                .collect();

            if !changed.is_empty() {
                self.repository.set_fields(&user.email, &changed).await?;
            }
            Ok::<_, CustomError>(Some(changed.len()))
        }
        .await;

        match result {
            Ok(Some(0)) => respond(
                OK_RESPONSE,
                &json!({ "status": 400, "message": "No changes were made" }),
            ),
            Ok(Some(_)) => respond(
                OK_RESPONSE,
                &json!({ "status": 200, "message": "Profile updated successfully" }),
            ),
            Ok(None) => respond(
                OK_RESPONSE,
                &json!({ "status": 400, "message": "User not found" }),
            ),
            Err(error) => {
                log::error!("updateUserData failed: {:?}", error);
                respond(
                    OK_RESPONSE,
                    &json!({ "status": 500, "message": "Internal server error" }),
                )
            }
        }
    }

    /// Checks that a referral link points at an existing username.
    pub async fn refer(&self, username: &str) -> (String, String) {
        match self.repository.find_optional_by_username(username).await {
            Ok(Some(_)) => respond(
                OK_RESPONSE,
                &json!({ "status": 200, "referredUser": username }),
            ),
            Ok(None) => respond(OK_RESPONSE, &json!({ "status": 400 })),
            Err(error) => {
                log::error!("refer lookup failed: {:?}", error);
                respond(
                    OK_RESPONSE,
                    &json!({ "status": format!("internal server error {}", error) }),
                )
            }
        }
    }

    pub async fn admin(&self, request: &str) -> (String, String) {
        let result = async {
            let req: EmailRequest = des_from_str(request)?;
            if self.repository.is_admin(&req.email).await? {
                Ok::<(), CustomError>(())
            } else {
                Err(CustomError::AdminNotFound)
            }
        }
        .await;

        match result {
            Ok(()) => respond(OK_RESPONSE, &json!({ "status": 200 })),
            Err(CustomError::AdminNotFound) => respond(OK_RESPONSE, &json!({ "status": 400 })),
            Err(error) => {
                log::error!("admin lookup failed: {:?}", error);
                respond(OK_RESPONSE, &json!({ "status": 500 }))
            }
        }
    }

    /// Removes the user and every list entry. Succeeds even when nothing matched.
    pub async fn delete_user(&self, request: &str) -> (String, String) {
        let result = async {
            let req: EmailRequest = des_from_str(request)?;
            let deleted = self.repository.delete_by_email(&req.email).await?;
            log::info!("deleteUser {}: {} row(s)", req.email, deleted);
            Ok::<_, CustomError>(())
        }
        .await;

        match result {
            Ok(()) => respond(OK_RESPONSE, &json!({ "status": 200 })),
            Err(error) => {
                log::error!("deleteUser failed: {:?}", error);
                respond(
                    OK_RESPONSE,
                    &json!({ "status": 500, "msg": error.to_string() }),
                )
            }
        }
    }

    pub async fn get_users(&self) -> (String, String) {
        let result = async {
            let users = self.repository.all_users().await?;
            let mut docs = Vec::with_capacity(users.len());
            for user in users {
                docs.push(self.repository.document(user).await?);
            }
            Ok::<_, CustomError>(docs)
        }
        .await;

        match result {
            Ok(docs) => respond(OK_RESPONSE, &docs),
            Err(error) => {
                log::error!("getUsers failed: {:?}", error);
                respond(INTERNAL_ERROR, &json!({ "status": 500 }))
            }
        }
    }
}

/// Profile columns are text; numbers and booleans are stored in their JSON form.
fn profile_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(_) | Value::Bool(_) => Some(value.to_string()),
        _ => None,
    }
}
