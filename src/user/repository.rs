use async_trait::async_trait;
use sqlx::AnyPool;

use crate::error::CustomError;

use super::model::{
    Field, FieldValue, Investment, LedgerRecord, RecordList, Referral, User, UserDocument,
};

const USER_COLUMNS: &str = "id, firstname, lastname, username, email, password, funded, capital, \
    totalprofit, periodic_profit, totaldeposit, totalwithdraw, ref_bonus, referral, upline, \
    rememberme, verified, promo, completed, withdraw_duration, phonenumber, state, country, \
    zipcode, address, profilepicture";

const CHILD_TABLES: [&str; 4] = ["investments", "records", "referred", "proofs"];

#[async_trait]
pub trait DbConnection: Send + Sync {
    async fn fetch_user_by_email(&self, email: &str) -> Result<User, sqlx::Error>;
    async fn fetch_user_by_username(&self, username: &str) -> Result<User, sqlx::Error>;
    async fn fetch_users(&self) -> Result<Vec<User>, sqlx::Error>;
    async fn insert_user(&self, user: &User) -> Result<u64, sqlx::Error>;
    async fn update_fields(
        &self,
        email: &str,
        fields: &[(Field, FieldValue)],
    ) -> Result<u64, sqlx::Error>;
    async fn delete_user(&self, email: &str) -> Result<u64, sqlx::Error>;
    async fn push_investment(&self, user_id: &str, invest: &Investment)
    -> Result<(), sqlx::Error>;
    async fn fetch_investments(&self, user_id: &str) -> Result<Vec<Investment>, sqlx::Error>;
    async fn push_record(
        &self,
        user_id: &str,
        list: RecordList,
        record: &LedgerRecord,
    ) -> Result<(), sqlx::Error>;
    async fn fetch_records(
        &self,
        user_id: &str,
        list: RecordList,
    ) -> Result<Vec<LedgerRecord>, sqlx::Error>;
    async fn push_referral(&self, user_id: &str, referral: &Referral) -> Result<(), sqlx::Error>;
    async fn fetch_referrals(&self, user_id: &str) -> Result<Vec<Referral>, sqlx::Error>;
    async fn push_proof(&self, user_id: &str, proof: &str) -> Result<(), sqlx::Error>;
    async fn fetch_proofs(&self, user_id: &str) -> Result<Vec<String>, sqlx::Error>;
    async fn admin_exists(&self, email: &str) -> Result<bool, sqlx::Error>;
}

#[async_trait]
impl DbConnection for AnyPool {
    async fn fetch_user_by_email(&self, email: &str) -> Result<User, sqlx::Error> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_one(self)
            .await
    }

    async fn fetch_user_by_username(&self, username: &str) -> Result<User, sqlx::Error> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_one(self)
            .await
    }

    async fn fetch_users(&self) -> Result<Vec<User>, sqlx::Error> {
        let sql = format!("SELECT {} FROM users ORDER BY email", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql).fetch_all(self).await
    }

    async fn insert_user(&self, user: &User) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (
                id, firstname, lastname, username, email, password, funded, capital,
                totalprofit, periodic_profit, totaldeposit, totalwithdraw, ref_bonus,
                referral, upline, rememberme
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)"#,
        )
        .bind(&user.id)
        .bind(&user.firstname)
        .bind(&user.lastname)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.funded)
        .bind(user.capital)
        .bind(user.totalprofit)
        .bind(user.periodic_profit)
        .bind(user.totaldeposit)
        .bind(user.totalwithdraw)
        .bind(user.ref_bonus)
        .bind(&user.referral)
        .bind(user.upline.clone())
        .bind(user.rememberme)
        .execute(self)
        .await?;
        Ok(result.rows_affected())
    }

    async fn update_fields(
        &self,
        email: &str,
        fields: &[(Field, FieldValue)],
    ) -> Result<u64, sqlx::Error> {
        if fields.is_empty() {
            return Ok(0);
        }
        let assignments: Vec<String> = fields
            .iter()
            .enumerate()
            .map(|(i, (field, _))| format!("{} = ${}", field.column(), i + 1))
            .collect();
        let sql = format!(
            "UPDATE users SET {} WHERE email = ${}",
            assignments.join(", "),
            fields.len() + 1
        );

        let mut query = sqlx::query(&sql);
        for (_, value) in fields {
            query = match value {
                FieldValue::Number(n) => query.bind(*n),
                FieldValue::Int(i) => query.bind(*i),
                FieldValue::Text(t) => query.bind(t.clone()),
            };
        }
        let result = query.bind(email).execute(self).await?;
        Ok(result.rows_affected())
    }

    async fn delete_user(&self, email: &str) -> Result<u64, sqlx::Error> {
        for table in CHILD_TABLES {
            let sql = format!(
                "DELETE FROM {} WHERE user_id IN (SELECT id FROM users WHERE email = $1)",
                table
            );
            sqlx::query(&sql).bind(email).execute(self).await?;
        }
        let result = sqlx::query("DELETE FROM users WHERE email = $1")
            .bind(email)
            .execute(self)
            .await?;
        Ok(result.rows_affected())
    }

    async fn push_investment(
        &self,
        user_id: &str,
        invest: &Investment,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO investments (
                user_id, position, kind, amount, plan, percent, start_date, end_date,
                profit, ended, started, periodic_profit
            )
            SELECT $1, COUNT(*), $2, $3, $4, $5, $6, $7, $8, $9, $10, $11
            FROM investments WHERE user_id = $1"#,
        )
        .bind(user_id)
        .bind(&invest.kind)
        .bind(invest.amount)
        .bind(&invest.plan)
        .bind(&invest.percent)
        .bind(&invest.start_date)
        .bind(&invest.end_date)
        .bind(invest.profit)
        .bind(invest.ended)
        .bind(invest.started)
        .bind(invest.periodic_profit)
        .execute(self)
        .await?;
        Ok(())
    }

    async fn fetch_investments(&self, user_id: &str) -> Result<Vec<Investment>, sqlx::Error> {
        sqlx::query_as::<_, Investment>(
            r#"
            SELECT kind, amount, plan, percent, start_date, end_date, profit, ended, started,
                periodic_profit
            FROM investments WHERE user_id = $1 ORDER BY position"#,
        )
        .bind(user_id)
        .fetch_all(self)
        .await
    }

    async fn push_record(
        &self,
        user_id: &str,
        list: RecordList,
        record: &LedgerRecord,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO records (user_id, list, position, id, kind, amount, date, balance)
            SELECT $1, $2, COUNT(*), $3, $4, $5, $6, $7
            FROM records WHERE user_id = $1 AND list = $2"#,
        )
        .bind(user_id)
        .bind(list.as_str())
        .bind(&record.id)
        .bind(record.kind.clone())
        .bind(record.amount)
        .bind(&record.date)
        .bind(record.balance)
        .execute(self)
        .await?;
        Ok(())
    }

    async fn fetch_records(
        &self,
        user_id: &str,
        list: RecordList,
    ) -> Result<Vec<LedgerRecord>, sqlx::Error> {
        sqlx::query_as::<_, LedgerRecord>(
            r#"
            SELECT kind, amount, date, balance, id
            FROM records WHERE user_id = $1 AND list = $2 ORDER BY position"#,
        )
        .bind(user_id)
        .bind(list.as_str())
        .fetch_all(self)
        .await
    }

    async fn push_referral(&self, user_id: &str, referral: &Referral) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO referred (user_id, position, firstname, lastname, email, date, ref_bonus)
            SELECT $1, COUNT(*), $2, $3, $4, $5, $6
            FROM referred WHERE user_id = $1"#,
        )
        .bind(user_id)
        .bind(&referral.firstname)
        .bind(&referral.lastname)
        .bind(&referral.email)
        .bind(&referral.date)
        .bind(referral.ref_bonus)
        .execute(self)
        .await?;
        Ok(())
    }

    async fn fetch_referrals(&self, user_id: &str) -> Result<Vec<Referral>, sqlx::Error> {
        sqlx::query_as::<_, Referral>(
            r#"
            SELECT firstname, lastname, email, date, ref_bonus
            FROM referred WHERE user_id = $1 ORDER BY position"#,
        )
        .bind(user_id)
        .fetch_all(self)
        .await
    }

    async fn push_proof(&self, user_id: &str, proof: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO proofs (user_id, position, proof)
            SELECT $1, COUNT(*), $2
            FROM proofs WHERE user_id = $1"#,
        )
        .bind(user_id)
        .bind(proof)
        .execute(self)
        .await?;
        Ok(())
    }

    async fn fetch_proofs(&self, user_id: &str) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT proof FROM proofs WHERE user_id = $1 ORDER BY position")
                .bind(user_id)
                .fetch_all(self)
                .await?;
        Ok(rows.into_iter().map(|(proof,)| proof).collect())
    }

    async fn admin_exists(&self, email: &str) -> Result<bool, sqlx::Error> {
        let row: Option<(String,)> = sqlx::query_as("SELECT email FROM admins WHERE email = $1")
            .bind(email)
            .fetch_optional(self)
            .await?;
        Ok(row.is_some())
    }
}

pub struct UserRepository<DB: DbConnection = AnyPool> {
    db: DB,
}

impl<DB: DbConnection> UserRepository<DB> {
    pub fn new(db: DB) -> Self {
        UserRepository { db }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<User, CustomError> {
        self.db
            .fetch_user_by_email(email)
            .await
            .map_err(not_found_or_db)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<User, CustomError> {
        self.db
            .fetch_user_by_username(username)
            .await
            .map_err(not_found_or_db)
    }

    /// `None` when no user has this username; database failures still propagate.
    pub async fn find_optional_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, CustomError> {
        match self.find_by_username(username).await {
            Ok(user) => Ok(Some(user)),
            Err(CustomError::UserNotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn all_users(&self) -> Result<Vec<User>, CustomError> {
        Ok(self.db.fetch_users().await?)
    }

    pub async fn insert_user(&self, new_user: &User) -> Result<u64, CustomError> {
        self.db.insert_user(new_user).await.map_err(|e| match e {
            sqlx::Error::Database(err) if err.is_unique_violation() => CustomError::EmailExists,
            e => CustomError::DBError(e),
        })
    }

    /// Overwrites the given columns with absolute values.
    pub async fn set_fields(
        &self,
        email: &str,
        fields: &[(Field, FieldValue)],
    ) -> Result<u64, CustomError> {
        Ok(self.db.update_fields(email, fields).await?)
    }

    pub async fn delete_by_email(&self, email: &str) -> Result<u64, CustomError> {
        Ok(self.db.delete_user(email).await?)
    }

    pub async fn push_investment(
        &self,
        user_id: &str,
        invest: &Investment,
    ) -> Result<(), CustomError> {
        Ok(self.db.push_investment(user_id, invest).await?)
    }

    pub async fn investments(&self, user_id: &str) -> Result<Vec<Investment>, CustomError> {
        Ok(self.db.fetch_investments(user_id).await?)
    }

    pub async fn push_record(
        &self,
        user_id: &str,
        list: RecordList,
        record: &LedgerRecord,
    ) -> Result<(), CustomError> {
        Ok(self.db.push_record(user_id, list, record).await?)
    }

    pub async fn records(
        &self,
        user_id: &str,
        list: RecordList,
    ) -> Result<Vec<LedgerRecord>, CustomError> {
        Ok(self.db.fetch_records(user_id, list).await?)
    }

    pub async fn push_referral(&self, user_id: &str, referral: &Referral) -> Result<(), CustomError> {
        Ok(self.db.push_referral(user_id, referral).await?)
    }

    pub async fn push_proof(&self, user_id: &str, proof: &str) -> Result<(), CustomError> {
        Ok(self.db.push_proof(user_id, proof).await?)
    }

    pub async fn is_admin(&self, email: &str) -> Result<bool, CustomError> {
        Ok(self.db.admin_exists(email).await?)
    }

    /// Loads every list of `user` into a full document.
    pub async fn document(&self, user: User) -> Result<UserDocument, CustomError> {
        let id = user.id.clone();
        Ok(UserDocument {
            investment: self.db.fetch_investments(&id).await?,
            transaction: self.db.fetch_records(&id, RecordList::Transaction).await?,
            deposit: self.db.fetch_records(&id, RecordList::Deposit).await?,
            withdraw: self.db.fetch_records(&id, RecordList::Withdraw).await?,
            referred: self.db.fetch_referrals(&id).await?,
            proofs: self.db.fetch_proofs(&id).await?,
            user,
        })
    }
}

fn not_found_or_db(e: sqlx::Error) -> CustomError {
    match e {
        sqlx::Error::RowNotFound => CustomError::UserNotFound,
        _ => CustomError::DBError(e),
    }
}
