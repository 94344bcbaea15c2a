use async_trait::async_trait;
use tracing::info;

use crate::domain::error::DomainError;

/// Delivery channel for sign-in codes.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_code(&self, email: &str, code: &str) -> Result<(), DomainError>;
}

/// Writes codes to the structured log instead of sending mail. Good enough
/// for development and tests; a real SMTP transport plugs in behind the
/// same trait.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_code(&self, email: &str, code: &str) -> Result<(), DomainError> {
        info!(email = %email, code = %code, "sign-in code issued (log transport)");
        Ok(())
    }
}
