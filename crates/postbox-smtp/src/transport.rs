//! SMTP sessions used by the mailer
//!
//! A [`Connector`] opens an authenticated session, and the returned
//! [`Transport`] delivers messages over it until closed.

use crate::{SmtpError, SmtpResult};
use async_trait::async_trait;
use lettre::{
    transport::smtp::{
        authentication::{Credentials, Mechanism},
        client::{AsyncSmtpConnection, TlsParameters},
        extension::ClientId,
    },
    Message,
};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Lettre's own default when no timeout is configured on a transport
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// An open, authenticated SMTP session
#[async_trait]
pub trait Transport: Send {
    /// Deliver one message to the recipients in its envelope
    async fn send(&mut self, message: &Message) -> SmtpResult<()>;

    /// End the session
    async fn close(&mut self) -> SmtpResult<()>;
}

/// Opens sessions against an SMTP server
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        host: &str,
        port: u16,
        credentials: &Credentials,
    ) -> SmtpResult<Box<dyn Transport>>;
}

/// Connects in plaintext, upgrades with STARTTLS, then logs in
#[derive(Debug, Clone)]
pub struct StartTlsConnector {
    hello_name: ClientId,
    timeout: Option<Duration>,
}

impl Default for StartTlsConnector {
    fn default() -> Self {
        Self {
            hello_name: ClientId::default(),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

impl StartTlsConnector {
    /// Set the name sent in EHLO
    pub fn hello_name(mut self, hello_name: ClientId) -> Self {
        self.hello_name = hello_name;
        self
    }

    async fn handshake(
        &self,
        connection: &mut AsyncSmtpConnection,
        host: &str,
        credentials: &Credentials,
    ) -> SmtpResult<()> {
        let tls_parameters =
            TlsParameters::new(host.to_string()).map_err(|e| SmtpError::TlsError(e.to_string()))?;
        connection
            .starttls(tls_parameters, &self.hello_name)
            .await
            .map_err(|e| SmtpError::TlsError(e.to_string()))?;
        debug!("STARTTLS negotiated with {}", host);

        connection
            .auth(&[Mechanism::Plain, Mechanism::Login], credentials)
            .await
            .map_err(|e| SmtpError::AuthenticationFailed(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl Connector for StartTlsConnector {
    async fn connect(
        &self,
        host: &str,
        port: u16,
        credentials: &Credentials,
    ) -> SmtpResult<Box<dyn Transport>> {
        debug!("Connecting to {}:{}", host, port);

        let mut connection =
            AsyncSmtpConnection::connect_tokio1((host, port), self.timeout, &self.hello_name, None, None)
                .await
                .map_err(|e| SmtpError::ConnectionFailed(e.to_string()))?;

        if let Err(e) = self.handshake(&mut connection, host, credentials).await {
            connection.abort().await;
            return Err(e);
        }

        info!("Authenticated with {}:{}", host, port);
        Ok(Box::new(SmtpSession { connection }))
    }
}

struct SmtpSession {
    connection: AsyncSmtpConnection,
}

#[async_trait]
impl Transport for SmtpSession {
    async fn send(&mut self, message: &Message) -> SmtpResult<()> {
        let envelope = message.envelope();
        self.connection
            .send(envelope, &message.formatted())
            .await
            .map_err(|e| SmtpError::SendFailed {
                recipient: envelope
                    .to()
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn close(&mut self) -> SmtpResult<()> {
        if let Err(e) = self.connection.quit().await {
            warn!("QUIT failed, dropping connection: {}", e);
            self.connection.abort().await;
            return Err(SmtpError::ConnectionFailed(e.to_string()));
        }
        Ok(())
    }
}
