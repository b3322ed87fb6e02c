use std::sync::Arc;

use serde_json::json;

use super::{
    accrual::run_accrual,
    model::{
        AmountRequest, FundRequest, FundResponse, InvestRequest, ProofRequest, UplineNotice,
        WithdrawRequest,
    },
    new_investment, profit_for, upline_commission,
};
use crate::{
    auth::jwt::authenticate,
    config::Config,
    constants::OK_RESPONSE,
    error::CustomError,
    req::Request,
    user::{
        model::{EmailRequest, Field, FieldValue, LedgerRecord, RecordList, User},
        repository::UserRepository,
    },
    utils::{des_from_str, locale_string, now_local, random_hex, respond},
};

enum Upgrade {
    Profit,
    Bonus,
}

pub struct LedgerService {
    repository: Arc<UserRepository>,
    config: Arc<Config>,
}

impl LedgerService {
    pub fn new(repository: Arc<UserRepository>, config: Arc<Config>) -> Self {
        LedgerService { repository, config }
    }

    /// Credits a confirmed deposit and pays the upline its commission.
    pub async fn fund_wallet(&self, request: &str) -> (String, String) {
        let result = match des_from_str::<FundRequest>(request) {
            Ok(req) => self.try_fund_wallet(&req).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(response) => respond(OK_RESPONSE, &response),
            Err(error) => {
                log::error!("fundwallet failed: {:?}", error);
                respond(OK_RESPONSE, &json!({ "status": "error" }))
            }
        }
    }

    async fn try_fund_wallet(&self, req: &FundRequest) -> Result<FundResponse, CustomError> {
        let amount = req.amount;
        let user = self.repository.find_by_email(&req.email).await?;
        self.repository
            .set_fields(
                &user.email,
                &[
                    (Field::Funded, FieldValue::Number(amount + user.funded)),
                    (Field::Capital, FieldValue::Number(user.capital + amount)),
                    (Field::TotalDeposit, FieldValue::Number(user.totaldeposit + amount)),
                ],
            )
            .await?;

        let upline = match &user.upline {
            Some(username) => self.repository.find_optional_by_username(username).await?,
            None => None,
        };
        let commission = upline_commission(amount);
        if let Some(upline) = &upline {
            // refBonus is replaced by the latest commission, not accumulated
            self.repository
                .set_fields(
                    &upline.email,
                    &[
                        (Field::RefBonus, FieldValue::Number(commission)),
                        (Field::TotalProfit, FieldValue::Number(upline.totalprofit + commission)),
                        (Field::Capital, FieldValue::Number(upline.capital + commission)),
                        (Field::Funded, FieldValue::Number(upline.funded + commission)),
                    ],
                )
                .await?;
        }

        let date = locale_string(&now_local());
        let balance = amount + user.funded;
        self.repository
            .push_record(
                &user.id,
                RecordList::Deposit,
                &LedgerRecord {
                    kind: None,
                    amount,
                    date: date.clone(),
                    balance,
                    id: random_hex(32),
                },
            )
            .await?;
        self.repository
            .push_record(
                &user.id,
                RecordList::Transaction,
                &LedgerRecord {
                    kind: Some("Deposit".to_string()),
                    amount,
                    date,
                    balance,
                    id: random_hex(32),
                },
            )
            .await?;
        if let Some(proof) = &req.proof {
            self.repository.push_proof(&user.id, proof).await?;
        }
        log::info!("{} funded with {}", user.email, amount);

        let upline = match upline {
            Some(upline) => UplineNotice::Credited {
                upline_name: upline.firstname,
                upline_email: upline.email,
                upline_subject: "Earned Referral Commission",
                upline_message: format!(
                    "Congratulations! You just earned ${} in commission from {} {}'s deposit of ${}.",
                    commission, user.firstname, user.lastname, amount
                ),
            },
            None => UplineNotice::Missing { upline: None },
        };

        Ok(FundResponse {
            status: "ok",
            funded: amount,
            name: user.firstname,
            email: user.email,
            message: format!(
                "your account has been credited with ${} USD. you can proceed to choosing your preferred investment plan to start earning. Thanks.",
                amount
            ),
            subject: "Deposit Successful",
            upline,
        })
    }

    /// Adds `amount` to funded, capital, totalprofit and periodicProfit.
    pub async fn upgrade_user(&self, request: &str) -> (String, String) {
        self.upgrade(request, Upgrade::Profit).await
    }

    /// Adds `amount` to funded, capital and refBonus.
    pub async fn upgrade_bonus(&self, request: &str) -> (String, String) {
        self.upgrade(request, Upgrade::Bonus).await
    }

    async fn upgrade(&self, request: &str, kind: Upgrade) -> (String, String) {
        let result = async {
            let req: AmountRequest = des_from_str(request)?;
            let user = self.repository.find_by_email(&req.email).await?;
            let amount = req.amount;
            let mut fields = vec![
                (Field::Funded, FieldValue::Number(amount + user.funded)),
                (Field::Capital, FieldValue::Number(user.capital + amount)),
            ];
            match kind {
                Upgrade::Profit => {
                    fields.push((Field::TotalProfit, FieldValue::Number(user.totalprofit + amount)));
                    fields.push((
                        Field::PeriodicProfit,
                        FieldValue::Number(user.periodic_profit + amount),
                    ));
                }
                Upgrade::Bonus => {
                    fields.push((Field::RefBonus, FieldValue::Number(user.ref_bonus + amount)));
                }
            }
            self.repository.set_fields(&user.email, &fields).await?;
            Ok::<f64, CustomError>(amount)
        }
        .await;

        match result {
            Ok(amount) => respond(OK_RESPONSE, &json!({ "status": "ok", "funded": amount })),
            Err(error) => {
                log::error!("upgrade failed: {:?}", error);
                respond(OK_RESPONSE, &json!({ "status": "error" }))
            }
        }
    }

    /// Records a withdrawal order. Capital is overwritten with the requested amount.
    pub async fn withdraw(&self, request: &Request) -> (String, String) {
        let result = async {
            let claims = authenticate(&request.headers, &self.config.jwt_secret)?;
            let req: WithdrawRequest = des_from_str(&request.body)?;
            let user = self.repository.find_by_email(&claims.email).await?;
            if user.funded < req.withdraw_amount {
                return Ok((user, req, Err(CustomError::InsufficientFunds)));
            }
            self.repository
                .set_fields(
                    &user.email,
                    &[(Field::Capital, FieldValue::Number(req.withdraw_amount))],
                )
                .await?;
            Ok::<_, CustomError>((user, req, Ok(())))
        }
        .await;

        match result {
            Ok((user, req, Ok(()))) => {
                log::info!("{} placed withdrawal of {}", user.email, req.withdraw_amount);
                respond(
                    OK_RESPONSE,
                    &json!({
                        "status": "ok",
                        "withdraw": req.withdraw_amount,
                        "email": user.email,
                        "name": user.firstname,
                        "message": "We have received your withdrawal order, kindly exercise some patience as our management board approves your withdrawal",
                        "subject": "Withdrawal Order Alert",
                        "adminMessage": format!(
                            "Hello BOSS! a user with the name {} placed withdrawal of ${} USD, to be withdrawn into {} {} wallet",
                            user.firstname,
                            req.withdraw_amount,
                            req.wallet.as_deref().unwrap_or_default(),
                            req.method.as_deref().unwrap_or_default()
                        ),
                    }),
                )
            }
            Ok((user, req, Err(reason))) => {
                log::info!("{} withdrawal of {} rejected: {}", user.email, req.withdraw_amount, reason);
                respond(
                    OK_RESPONSE,
                    &json!({
                        "status": 400,
                        "subject": "Failed Withdrawal Alert",
                        "email": user.email,
                        "name": user.firstname,
                        "withdrawMessage": "We have received your withdrawal order, but you can only withdraw you insufficient amount in your account. Kindly deposit and invest more, to rack up more profit, Thanks.",
                    }),
                )
            }
            Err(error) => {
                log::error!("withdraw failed: {:?}", error);
                respond(
                    OK_RESPONSE,
                    &json!({ "status": "error", "message": "internal server error" }),
                )
            }
        }
    }

    /// Pays out the user's whole capital, whatever amount was requested before.
    pub async fn get_withdraw_info(&self, request: &str) -> (String, String) {
        let result = async {
            let req: EmailRequest = des_from_str(request)?;
            let user = self.repository.find_by_email(&req.email).await?;
            self.finalize_withdraw(&user).await
        }
        .await;

        match result {
            Ok(amount) => respond(OK_RESPONSE, &json!({ "status": "ok", "amount": amount })),
            Err(error) => {
                log::error!("getWithdrawInfo failed: {:?}", error);
                respond(OK_RESPONSE, &json!({ "status": "error", "user": false }))
            }
        }
    }

    async fn finalize_withdraw(&self, user: &User) -> Result<f64, CustomError> {
        let amount = user.capital;
        let balance = user.funded - amount;
        self.repository
            .set_fields(
                &user.email,
                &[
                    (Field::Funded, FieldValue::Number(balance)),
                    (Field::TotalWithdraw, FieldValue::Number(user.totalwithdraw + amount)),
                    (Field::Capital, FieldValue::Number(user.capital - amount)),
                ],
            )
            .await?;

        let date = locale_string(&now_local());
        self.repository
            .push_record(
                &user.id,
                RecordList::Withdraw,
                &LedgerRecord {
                    kind: None,
                    amount,
                    date: date.clone(),
                    balance,
                    id: random_hex(32),
                },
            )
            .await?;
        self.repository
            .push_record(
                &user.id,
                RecordList::Transaction,
                &LedgerRecord {
                    kind: Some("withdraw".to_string()),
                    amount,
                    date,
                    balance,
                    id: random_hex(32),
                },
            )
            .await?;
        log::info!("{} withdrew {}", user.email, amount);
        Ok(amount)
    }

    /// Builds the pending-deposit notification. Nothing is written.
    pub async fn send_proof(&self, request: &Request) -> (String, String) {
        let result = async {
            let claims = authenticate(&request.headers, &self.config.jwt_secret)?;
            let req: ProofRequest = des_from_str(&request.body)?;
            let user = self.repository.find_by_email(&claims.email).await;
            Ok::<_, CustomError>((req, user))
        }
        .await;

        match result {
            Ok((req, Ok(user))) => respond(
                OK_RESPONSE,
                &json!({
                    "status": 200,
                    "email": user.email,
                    "name": user.firstname,
                    "message": format!(
                        "Hi! you have successfully placed a deposit order, kindly exercise some patience as we verify your deposit. Your account will automatically be credited with ${} USD after verification.",
                        req.amount
                    ),
                    "subject": "Pending Deposit Alert",
                    "adminMessage": format!(
                        "hello BOSS, a user with the name.{}, just deposited ${} USD into to your {} wallet. please confirm deposit and credit.",
                        user.firstname,
                        req.amount,
                        req.method.as_deref().unwrap_or_default()
                    ),
                    "adminSubject": "Deposit Alert",
                }),
            ),
            Ok((_, Err(CustomError::UserNotFound))) => {
                respond(OK_RESPONSE, &json!({ "status": 500 }))
            }
            Ok((_, Err(error))) | Err(error) => {
                log::error!("sendproof failed: {:?}", error);
                respond(OK_RESPONSE, &json!({ "status": 404 }))
            }
        }
    }

    /// Opens an investment paid from capital.
    pub async fn invest(&self, request: &Request) -> (String, String) {
        let result = async {
            let claims = authenticate(&request.headers, &self.config.jwt_secret)?;
            let req: InvestRequest = des_from_str(&request.body)?;
            let user = self.repository.find_by_email(&claims.email).await?;
            self.try_invest(&user, &req).await?;
            Ok::<f64, CustomError>(req.amount)
        }
        .await;

        match result {
            Ok(amount) => respond(OK_RESPONSE, &json!({ "status": "ok", "amount": amount })),
            Err(CustomError::InsufficientCapital) => respond(
                OK_RESPONSE,
                &json!({ "message": "Insufficient capital!", "status": 400 }),
            ),
            Err(error) => {
                log::error!("invest failed: {:?}", error);
                respond(
                    OK_RESPONSE,
                    &json!({ "status": 500, "error": error.to_string() }),
                )
            }
        }
    }

    async fn try_invest(&self, user: &User, req: &InvestRequest) -> Result<(), CustomError> {
        if user.capital < req.amount {
            return Err(CustomError::InsufficientCapital);
        }
        let profit = profit_for(req.amount, &req.percent)
            .ok_or_else(|| CustomError::UnsupportedPercent(req.percent.clone()))?;

        let now = now_local();
        self.repository
            .set_fields(
                &user.email,
                &[
                    (Field::Capital, FieldValue::Number(user.capital - req.amount)),
                    (Field::TotalProfit, FieldValue::Number(user.totalprofit + profit)),
                    (Field::WithdrawDuration, FieldValue::Int(now.timestamp_millis())),
                ],
            )
            .await?;

        let invest = new_investment(req.amount, &req.plan, &req.percent, profit, &now);
        self.repository.push_investment(&user.id, &invest).await?;
        self.repository
            .push_record(
                &user.id,
                RecordList::Transaction,
                &LedgerRecord {
                    kind: Some("investment".to_string()),
                    amount: req.amount,
                    date: invest.start_date.clone(),
                    balance: user.funded + req.amount,
                    id: random_hex(32),
                },
            )
            .await?;
        log::info!("{} invested {} at {}", user.email, req.amount, req.percent);
        Ok(())
    }

    /// Maintenance endpoint hit by the external scheduler.
    pub async fn cron(&self) -> (String, String) {
        match run_accrual(&self.repository, now_local().timestamp_millis()).await {
            Ok(_) => respond(OK_RESPONSE, &json!({ "status": 200 })),
            Err(error) => {
                log::error!("cron failed: {:?}", error);
                respond(
                    OK_RESPONSE,
                    &json!({ "status": 500, "message": "error! timeout" }),
                )
            }
        }
    }
}
