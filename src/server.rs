use crate::auth::service::AuthService;
use crate::config::Config;
use crate::constants::{NO_CONTENT, NOT_FOUND};
use crate::ledger::service::LedgerService;
use crate::req::Method::{GET, OPTIONS, POST};
use crate::req::Request;
use crate::user::repository::UserRepository;
use crate::user::service::UserService;
use anyhow::{Context, Result};
use sqlx::AnyPool;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot::Receiver;

const CORS_HEADERS: &str = "Access-Control-Allow-Origin: *\r\n\
    Access-Control-Allow-Methods: GET, POST, OPTIONS\r\n\
    Access-Control-Allow-Headers: Content-Type, x-access-token\r\n";

/// Every route handler, shared by all connections.
pub struct Services {
    pub auth: AuthService,
    pub user: UserService,
    pub ledger: LedgerService,
}

impl Services {
    pub fn new(pool: AnyPool, config: Arc<Config>) -> Self {
        let repository = Arc::new(UserRepository::new(pool));
        Services {
            auth: AuthService::new(Arc::clone(&repository), Arc::clone(&config)),
            user: UserService::new(Arc::clone(&repository), Arc::clone(&config)),
            ledger: LedgerService::new(repository, config),
        }
    }
}

pub struct Server {
    services: Arc<Services>,
    addr: String,
}

impl Server {
    pub fn new(services: Arc<Services>, addr: &str) -> Self {
        Self {
            services,
            addr: addr.to_string(),
        }
    }

    pub async fn start(&self, mut shutdown_rx: Receiver<()>) -> anyhow::Result<()> {
        let listener = TcpListener::bind(&self.addr)
            .await
            .with_context(|| format!("failed to bind {}", self.addr))?;
        log::info!("Server running on http://{}", self.addr);

        loop {
            tokio::select! {
                conn = listener.accept() => {
                    let (mut stream, peer) = conn?;

                    let services = Arc::clone(&self.services);

                    tokio::spawn(async move {
                        let (reader, writer) = stream.split();
                        if let Err(e) = Self::handle_client(reader, writer, &services).await {
                            log::warn!("Connection error from {}: {:#}", peer, e);
                        }
                    });
                }
                // Shutdown signal check
                _ = &mut shutdown_rx => {
                    log::info!("Shutting down server...");
                    break;
                }
            }
        }
        Ok(())
    }

    pub async fn handle_client<Reader, Writer>(
        reader: Reader,
        mut writer: Writer,
        services: &Services,
    ) -> Result<()>
    where
        Reader: AsyncRead + Unpin,
        Writer: AsyncWrite + Unpin,
    {
        let request = Request::new(reader)
            .await
            .context("Failed to read request")?;
        log::debug!("{:?} {}", request.method, request.path);

        let (status_line, content) = Self::route(&request, services).await;

        writer
            .write_all(write_response(&status_line, &content).as_bytes())
            .await
            .context("Failed to write")?;
        writer.flush().await.context("Failed to flush")
    }

    async fn route(request: &Request, services: &Services) -> (String, String) {
        let body = request.body.as_str();
        match (&request.method, request.path.as_str()) {
            (OPTIONS, _) => (NO_CONTENT.to_string(), "".to_string()),
            (GET, "/api/verify") => services.auth.verify(request).await,
            (POST, "/api/register") => services.auth.register(body).await,
            (POST, "/api/login") => services.auth.login(body).await,
            (GET, "/api/getData") => services.user.get_data(request).await,
            (POST, "/api/updateUserData") => services.user.update_user_data(request).await,
            (POST, "/api/admin") => services.user.admin(body).await,
            (POST, "/api/deleteUser") => services.user.delete_user(body).await,
            (GET, "/api/getUsers") => services.user.get_users().await,
            (POST, "/api/fundwallet") => services.ledger.fund_wallet(body).await,
            (POST, "/api/upgradeUser") => services.ledger.upgrade_user(body).await,
            (POST, "/api/upgradeBonus") => services.ledger.upgrade_bonus(body).await,
            (POST, "/api/withdraw") => services.ledger.withdraw(request).await,
            (POST, "/api/sendproof") => services.ledger.send_proof(request).await,
            (POST, "/api/invest") => services.ledger.invest(request).await,
            (GET, "/api/cron") => services.ledger.cron().await,
            (POST, "/api/getWithdrawInfo") => services.ledger.get_withdraw_info(body).await,
            (GET, path) => match referral_username(path) {
                Some(username) => services.user.refer(username).await,
                None => (NOT_FOUND.to_string(), "404 Not Found".to_string()),
            },
            _ => (NOT_FOUND.to_string(), "404 Not Found".to_string()),
        }
    }
}

/// `/alice/refer` -> `alice`
fn referral_username(path: &str) -> Option<&str> {
    path.strip_prefix('/')?
        .strip_suffix("/refer")
        .filter(|name| !name.is_empty() && !name.contains('/'))
}

pub fn write_response(status_line: &str, content: &str) -> String {
    let content_type = if content.starts_with('{') || content.starts_with('[') {
        "application/json"
    } else {
        "text/plain"
    };
    format!(
        "{}\r\nContent-Type: {}\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n{}",
        status_line,
        content_type,
        content.len(),
        CORS_HEADERS,
        content
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_referral_username() {
        assert_eq!(referral_username("/alice/refer"), Some("alice"));
        assert_eq!(referral_username("/refer"), None);
        assert_eq!(referral_username("//refer"), None);
        assert_eq!(referral_username("/a/b/refer"), None);
        assert_eq!(referral_username("/api/getData"), None);
    }

    #[test]
    fn response_carries_length_and_cors() {
        let raw = write_response("HTTP/1.1 200 OK", "{\"status\":200}");
        assert!(raw.starts_with("HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n"));
        assert!(raw.contains("Content-Length: 14\r\n"));
        assert!(raw.contains("Access-Control-Allow-Origin: *\r\n"));
        assert!(raw.ends_with("\r\n\r\n{\"status\":200}"));
    }
}
