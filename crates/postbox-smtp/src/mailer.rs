//! Mailer facade

use crate::{
    build_message, parse_mailbox, Connector, Outgoing, PreparedContent, ServerConfig, SmtpError,
    SmtpResult, StartTlsConnector, Transport,
};
use lettre::{message::Mailbox, transport::smtp::authentication::Credentials};
use std::fmt;
use tracing::{debug, info};

/// Sends mail to each configured recipient individually
///
/// Configuration is plain mutable state. Every call to [`Mailer::send`]
/// opens its own connection and closes it before returning, so a mailer can
/// be reused freely.
pub struct Mailer<C = StartTlsConnector> {
    host: String,
    port: u16,
    sender: Option<String>,
    credential: Option<String>,
    recipients: Option<Vec<String>>,
    connector: C,
}

impl Mailer {
    /// Create a mailer for the given server
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self::with_connector(host, port, StartTlsConnector::default())
    }

    /// Create a mailer for Gmail
    pub fn gmail() -> Self {
        Self::new("smtp.gmail.com", 587)
    }

    /// Create a mailer for Outlook
    pub fn outlook() -> Self {
        Self::new("smtp.office365.com", 587)
    }

    /// Create a mailer from loaded server settings
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.host.clone(), config.port)
    }
}

impl<C: Connector> Mailer<C> {
    /// Create a mailer that opens sessions through `connector`
    pub fn with_connector(host: impl Into<String>, port: u16, connector: C) -> Self {
        Self {
            host: host.into(),
            port,
            sender: None,
            credential: None,
            recipients: None,
            connector,
        }
    }

    /// Set the server host
    pub fn set_server(&mut self, host: impl Into<String>) {
        self.host = host.into();
    }

    /// Set the server port
    pub fn set_port(&mut self, port: u16) {
        self.port = port;
    }

    /// Host and port
    pub fn server(&self) -> (&str, u16) {
        (&self.host, self.port)
    }

    /// Set the sender address and the credential used to log in
    pub fn set_sender(&mut self, address: impl Into<String>, credential: impl Into<String>) {
        self.sender = Some(address.into());
        self.credential = Some(credential.into());
    }

    /// Sender address and credential
    pub fn sender(&self) -> (Option<&str>, Option<&str>) {
        (self.sender.as_deref(), self.credential.as_deref())
    }

    /// Set the addresses `send` delivers to, in order
    pub fn set_recipients<I, S>(&mut self, recipients: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.recipients = Some(recipients.into_iter().map(Into::into).collect());
    }

    /// Configured recipients, exactly as set
    pub fn recipients(&self) -> Option<&[String]> {
        self.recipients.as_deref()
    }

    /// Send `outgoing` to every recipient, one message each, in list order
    ///
    /// Preconditions are checked and attachments are read before anything
    /// touches the network. The first failed delivery stops the loop and is
    /// returned; the session is closed on every path once it is open.
    pub async fn send(&self, outgoing: &Outgoing) -> SmtpResult<()> {
        let (address, credential) = match (&self.sender, &self.credential) {
            (Some(address), Some(credential)) => (address, credential),
            _ => return Err(SmtpError::SenderNotDefined),
        };
        let recipients = self
            .recipients
            .as_ref()
            .ok_or(SmtpError::RecipientsNotDefined)?;

        let from = parse_mailbox(address)?;
        let to = recipients
            .iter()
            .map(|recipient| parse_mailbox(recipient))
            .collect::<SmtpResult<Vec<_>>>()?;
        let content = outgoing.prepare().await?;

        info!(
            "Sending \"{}\" to {} recipient(s) via {}:{}",
            outgoing.subject,
            to.len(),
            self.host,
            self.port
        );

        let credentials = Credentials::new(from.email.to_string(), credential.clone());
        let mut transport = self
            .connector
            .connect(&self.host, self.port, &credentials)
            .await?;

        let delivered = deliver(transport.as_mut(), &from, &to, &content).await;
        let closed = transport.close().await;
        delivered.and(closed)
    }
}

async fn deliver(
    transport: &mut dyn Transport,
    from: &Mailbox,
    to: &[Mailbox],
    content: &PreparedContent,
) -> SmtpResult<()> {
    for recipient in to {
        let message = build_message(from, recipient, content)?;
        transport.send(&message).await?;
        debug!("Delivered to {}", recipient);
    }
    info!("Email sent successfully");
    Ok(())
}

impl<C> fmt::Debug for Mailer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mailer")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("sender", &self.sender)
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .field("recipients", &self.recipients)
            .finish()
    }
}
