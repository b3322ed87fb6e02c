//! Balance arithmetic shared by the ledger routes and the accrual sweep.
//!
//! Every balance is a plain counter on the user row. Nothing here derives a
//! balance from history; callers read a snapshot, add to it and write the
//! result back.

pub mod accrual;
pub mod model;
pub mod service;

use chrono::{DateTime, TimeZone};

use crate::constants::{END_DATE_OFFSET_DAYS, INVESTMENT_DURATION_MS, UPLINE_COMMISSION_PERCENT};
use crate::user::model::Investment;
use crate::utils::locale_string;

const MS_PER_DAY: i64 = 86_400_000;

/// Profit rate of a plan. Only the advertised tiers are known.
pub fn percent_rate(percent: &str) -> Option<f64> {
    match percent {
        "20%" => Some(20.0),
        "35%" => Some(35.0),
        "50%" => Some(50.0),
        "65%" => Some(65.0),
        "80%" => Some(80.0),
        "100%" => Some(100.0),
        _ => None,
    }
}

pub fn profit_for(amount: f64, percent: &str) -> Option<f64> {
    percent_rate(percent).map(|rate| (amount * rate) / 100.0)
}

/// What the upline earns from a deposit of `amount`.
pub fn upline_commission(amount: f64) -> f64 {
    UPLINE_COMMISSION_PERCENT / 100.0 * amount
}

/// Builds the investment entry recorded at `now`.
///
/// `ended` is the fixed accrual window while `endDate` is pushed out by
/// [`END_DATE_OFFSET_DAYS`]; the two do not agree.
pub fn new_investment<Tz: TimeZone>(
    amount: f64,
    plan: &str,
    percent: &str,
    profit: f64,
    now: &DateTime<Tz>,
) -> Investment
where
    Tz::Offset: std::fmt::Display,
{
    let started = now.timestamp_millis();
    Investment {
        kind: "investment".to_string(),
        amount,
        plan: plan.to_string(),
        percent: percent.to_string(),
        start_date: locale_string(now),
        end_date: group_thousands(started + END_DATE_OFFSET_DAYS * MS_PER_DAY),
        profit: Some(profit),
        ended: INVESTMENT_DURATION_MS,
        started: Some(started),
        periodic_profit: 0.0,
    }
}

/// `1234567` -> `1,234,567`
fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkipReason {
    NotStarted,
    Completed,
    NoProfit,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NotStarted => "investment is not a number",
            SkipReason::Completed => "investment completed",
            SkipReason::NoProfit => "investment profit is not a number",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Accrual {
    Credit(f64),
    Skip(SkipReason),
}

/// Decides whether `invest` earns its profit at `now_ms`.
///
/// There is no paid marker: an open investment is credited on every call.
pub fn evaluate(invest: &Investment, now_ms: i64) -> Accrual {
    let Some(started) = invest.started else {
        return Accrual::Skip(SkipReason::NotStarted);
    };
    if now_ms.saturating_sub(started) >= invest.ended {
        return Accrual::Skip(SkipReason::Completed);
    }
    match invest.profit {
        Some(profit) if !profit.is_nan() => Accrual::Credit(profit),
        _ => Accrual::Skip(SkipReason::NoProfit),
    }
}
