use serde::{Deserialize, Serialize};

use crate::utils::serialize_flag;

#[derive(Serialize, Debug, Clone, sqlx::FromRow)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub funded: f64,
    pub capital: f64,
    pub totalprofit: f64,
    #[serde(rename = "periodicProfit")]
    pub periodic_profit: f64,
    pub totaldeposit: f64,
    pub totalwithdraw: f64,
    #[serde(rename = "refBonus")]
    pub ref_bonus: f64,
    pub referral: String,
    pub upline: Option<String>,
    #[serde(serialize_with = "serialize_flag")]
    pub rememberme: i64,
    #[serde(serialize_with = "serialize_flag")]
    pub verified: i64,
    #[serde(serialize_with = "serialize_flag")]
    pub promo: i64,
    #[serde(serialize_with = "serialize_flag")]
    pub completed: i64,
    #[serde(rename = "withdrawDuration")]
    pub withdraw_duration: i64,
    pub phonenumber: String,
    pub state: String,
    pub country: String,
    pub zipcode: String,
    pub address: String,
    pub profilepicture: String,
}

impl User {
    /// A freshly registered user: every balance zero, no lists.
    pub fn new(
        id: String,
        firstname: &str,
        lastname: &str,
        username: &str,
        email: &str,
        password: &str,
        referral: String,
        upline: Option<String>,
    ) -> Self {
        User {
            id,
            firstname: firstname.to_string(),
            lastname: lastname.to_string(),
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            funded: 0.0,
            capital: 0.0,
            totalprofit: 0.0,
            periodic_profit: 0.0,
            totaldeposit: 0.0,
            totalwithdraw: 0.0,
            ref_bonus: 0.0,
            referral,
            upline,
            rememberme: 0,
            verified: 0,
            promo: 0,
            completed: 0,
            withdraw_duration: 0,
            phonenumber: String::new(),
            state: String::new(),
            country: String::new(),
            zipcode: String::new(),
            address: String::new(),
            profilepicture: String::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Investment {
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: f64,
    pub plan: String,
    pub percent: String,
    #[serde(rename = "startDate")]
    pub start_date: String,
    #[serde(rename = "endDate")]
    pub end_date: String,
    pub profit: Option<f64>,
    pub ended: i64,
    pub started: Option<i64>,
    #[serde(rename = "periodicProfit")]
    pub periodic_profit: f64,
}

/// Entry of the transaction, deposit or withdraw list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct LedgerRecord {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub amount: f64,
    pub date: String,
    pub balance: f64,
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordList {
    Transaction,
    Deposit,
    Withdraw,
}

impl RecordList {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordList::Transaction => "transaction",
            RecordList::Deposit => "deposit",
            RecordList::Withdraw => "withdraw",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Referral {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub date: String,
    #[serde(rename = "refBonus")]
    pub ref_bonus: f64,
}

/// A user together with every list hanging off it, as dumped by `getUsers`.
#[derive(Serialize, Debug)]
pub struct UserDocument {
    #[serde(flatten)]
    pub user: User,
    pub investment: Vec<Investment>,
    pub transaction: Vec<LedgerRecord>,
    pub deposit: Vec<LedgerRecord>,
    pub withdraw: Vec<LedgerRecord>,
    pub referred: Vec<Referral>,
    pub proofs: Vec<String>,
}

/// Writable columns of `users`. Column names never come from request input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field {
    Funded,
    Capital,
    TotalProfit,
    PeriodicProfit,
    TotalDeposit,
    TotalWithdraw,
    RefBonus,
    WithdrawDuration,
    RememberMe,
    Firstname,
    Lastname,
    Username,
    Password,
    Phonenumber,
    State,
    Country,
    Zipcode,
    Address,
    Profilepicture,
}

impl Field {
    pub fn column(&self) -> &'static str {
        match self {
            Field::Funded => "funded",
            Field::Capital => "capital",
            Field::TotalProfit => "totalprofit",
            Field::PeriodicProfit => "periodic_profit",
            Field::TotalDeposit => "totaldeposit",
            Field::TotalWithdraw => "totalwithdraw",
            Field::RefBonus => "ref_bonus",
            Field::WithdrawDuration => "withdraw_duration",
            Field::RememberMe => "rememberme",
            Field::Firstname => "firstname",
            Field::Lastname => "lastname",
            Field::Username => "username",
            Field::Password => "password",
            Field::Phonenumber => "phonenumber",
            Field::State => "state",
            Field::Country => "country",
            Field::Zipcode => "zipcode",
            Field::Address => "address",
            Field::Profilepicture => "profilepicture",
        }
    }

    /// Profile fields a user may change through `updateUserData`, by request key.
    pub fn profile(key: &str) -> Option<Field> {
        match key {
            "firstname" => Some(Field::Firstname),
            "lastname" => Some(Field::Lastname),
            "username" => Some(Field::Username),
            "password" => Some(Field::Password),
            "phonenumber" => Some(Field::Phonenumber),
            "state" => Some(Field::State),
            "country" => Some(Field::Country),
            "zipcode" => Some(Field::Zipcode),
            "address" => Some(Field::Address),
            "profilepicture" => Some(Field::Profilepicture),
            _ => None,
        }
    }

    pub fn text_of<'a>(&self, user: &'a User) -> Option<&'a str> {
        match self {
            Field::Firstname => Some(&user.firstname),
            Field::Lastname => Some(&user.lastname),
            Field::Username => Some(&user.username),
            Field::Password => Some(&user.password),
            Field::Phonenumber => Some(&user.phonenumber),
            Field::State => Some(&user.state),
            Field::Country => Some(&user.country),
            Field::Zipcode => Some(&user.zipcode),
            Field::Address => Some(&user.address),
            Field::Profilepicture => Some(&user.profilepicture),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Int(i64),
    Text(String),
}

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}
