use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct FundRequest {
    pub email: String,
    pub amount: f64,
    #[serde(default)]
    pub proof: Option<String>,
}

/// Body of the admin balance adjustments.
#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    pub email: String,
    pub amount: f64,
}

#[derive(Debug, Deserialize)]
pub struct WithdrawRequest {
    #[serde(rename = "WithdrawAmount")]
    pub withdraw_amount: f64,
    #[serde(default)]
    pub wallet: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InvestRequest {
    pub amount: f64,
    #[serde(default)]
    pub plan: String,
    pub percent: String,
}

#[derive(Debug, Deserialize)]
pub struct ProofRequest {
    pub amount: f64,
    #[serde(default)]
    pub method: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct FundResponse {
    pub status: &'static str,
    pub funded: f64,
    pub name: String,
    pub email: String,
    pub message: String,
    pub subject: &'static str,
    #[serde(flatten)]
    pub upline: UplineNotice,
}

#[derive(Serialize, Debug)]
#[serde(untagged)]
pub enum UplineNotice {
    #[serde(rename_all = "camelCase")]
    Credited {
        upline_name: String,
        upline_email: String,
        upline_subject: &'static str,
        upline_message: String,
    },
    Missing { upline: Option<String> },
}

/// Counts of one accrual sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct AccrualReport {
    pub credited: usize,
    pub skipped: usize,
    pub failed: usize,
}
