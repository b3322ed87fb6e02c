use crate::{
    error::CustomError,
    user::{
        model::{Field, FieldValue},
        repository::{DbConnection, UserRepository},
    },
};

use super::{Accrual, evaluate, model::AccrualReport};

/// One sweep over every user's investments at `now_ms`.
///
/// Credits are absolute writes computed from the user row loaded at the start
/// of the sweep, so two open investments of the same user overwrite each
/// other and the later one wins. Failures for one user are logged and the
/// sweep moves on; only loading the user list can fail the whole run.
pub async fn run_accrual<DB: DbConnection>(
    repository: &UserRepository<DB>,
    now_ms: i64,
) -> Result<AccrualReport, CustomError> {
    let users = repository.all_users().await?;
    let mut report = AccrualReport::default();

    for user in users {
        let investments = match repository.investments(&user.id).await {
            Ok(investments) => investments,
            Err(error) => {
                log::error!("accrual: loading investments of {} failed: {:?}", user.email, error);
                report.failed += 1;
                continue;
            }
        };
        if investments.is_empty() {
            log::debug!("accrual: {} investment is an empty array", user.email);
            continue;
        }

        for invest in &investments {
            let profit = match evaluate(invest, now_ms) {
                Accrual::Credit(profit) => profit,
                Accrual::Skip(reason) => {
                    log::debug!("accrual: {} {}", user.email, reason.as_str());
                    report.skipped += 1;
                    continue;
                }
            };

            let fields = [
                (Field::Funded, FieldValue::Number(user.funded + profit)),
                (Field::Capital, FieldValue::Number(user.capital + profit)),
                (Field::TotalProfit, FieldValue::Number(user.totalprofit + profit)),
            ];
            match repository.set_fields(&user.email, &fields).await {
                Ok(_) => report.credited += 1,
                Err(error) => {
                    log::error!("accrual: crediting {} failed: {:?}", user.email, error);
                    report.failed += 1;
                }
            }
        }
    }

    log::info!(
        "accrual: {} credited, {} skipped, {} failed",
        report.credited,
        report.skipped,
        report.failed
    );
    Ok(report)
}
