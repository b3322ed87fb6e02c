use sqlx::{AnyPool, Pool};

const SCHEMA: [&str; 6] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        firstname TEXT NOT NULL,
        lastname TEXT NOT NULL,
        username TEXT NOT NULL,
        email TEXT UNIQUE NOT NULL,
        password TEXT NOT NULL,
        funded DOUBLE PRECISION NOT NULL DEFAULT 0,
        capital DOUBLE PRECISION NOT NULL DEFAULT 0,
        totalprofit DOUBLE PRECISION NOT NULL DEFAULT 0,
        periodic_profit DOUBLE PRECISION NOT NULL DEFAULT 0,
        totaldeposit DOUBLE PRECISION NOT NULL DEFAULT 0,
        totalwithdraw DOUBLE PRECISION NOT NULL DEFAULT 0,
        ref_bonus DOUBLE PRECISION NOT NULL DEFAULT 0,
        referral TEXT UNIQUE NOT NULL,
        upline TEXT,
        rememberme BIGINT NOT NULL DEFAULT 0,
        verified BIGINT NOT NULL DEFAULT 0,
        promo BIGINT NOT NULL DEFAULT 0,
        completed BIGINT NOT NULL DEFAULT 0,
        withdraw_duration BIGINT NOT NULL DEFAULT 0,
        phonenumber TEXT NOT NULL DEFAULT '',
        state TEXT NOT NULL DEFAULT '',
        country TEXT NOT NULL DEFAULT '',
        zipcode TEXT NOT NULL DEFAULT '',
        address TEXT NOT NULL DEFAULT '',
        profilepicture TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS investments (
        user_id TEXT NOT NULL,
        position BIGINT NOT NULL,
        kind TEXT NOT NULL,
        amount DOUBLE PRECISION NOT NULL,
        plan TEXT NOT NULL,
        percent TEXT NOT NULL,
        start_date TEXT NOT NULL,
        end_date TEXT NOT NULL,
        profit DOUBLE PRECISION,
        ended BIGINT NOT NULL,
        started BIGINT,
        periodic_profit DOUBLE PRECISION NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS records (
        user_id TEXT NOT NULL,
        list TEXT NOT NULL,
        position BIGINT NOT NULL,
        id TEXT NOT NULL,
        kind TEXT,
        amount DOUBLE PRECISION NOT NULL,
        date TEXT NOT NULL,
        balance DOUBLE PRECISION NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS referred (
        user_id TEXT NOT NULL,
        position BIGINT NOT NULL,
        firstname TEXT NOT NULL,
        lastname TEXT NOT NULL,
        email TEXT NOT NULL,
        date TEXT NOT NULL,
        ref_bonus DOUBLE PRECISION NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS proofs (
        user_id TEXT NOT NULL,
        position BIGINT NOT NULL,
        proof TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS admins (
        email TEXT PRIMARY KEY
    )
    "#,
];

pub struct Database {
    pub pool: Pool<sqlx::Any>,
}

impl Database {
    /// Connects to Postgres or SQLite depending on the URL scheme.
    pub async fn new_pool(url: &str) -> Result<Pool<sqlx::Any>, sqlx::Error> {
        sqlx::any::install_default_drivers();
        sqlx::any::AnyPoolOptions::new()
            .max_connections(10)
            .min_connections(1)
            .idle_timeout(std::time::Duration::from_secs(30))
            .connect(url)
            .await
    }

    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let pool = Self::new_pool(url).await?;
        init_schema(&pool).await?;
        Ok(Database { pool })
    }
}

pub async fn init_schema(pool: &AnyPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
