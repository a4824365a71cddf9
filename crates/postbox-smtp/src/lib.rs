//! SMTP mail sending for postbox
//!
//! A small facade over lettre: configure a server, a sender and a list of
//! recipients, then send a multipart message (text body, file attachments,
//! in-memory attachments) to each recipient over one STARTTLS session.

mod config;
mod error;
mod mailer;
mod message;
mod transport;

pub use config::{ServerConfig, DEFAULT_PORT};
pub use error::{SmtpError, SmtpResult};
pub use mailer::Mailer;
pub use message::{
    build_message, parse_mailbox, ContentPart, Outgoing, OutgoingAttachment, PreparedContent,
};
pub use transport::{Connector, StartTlsConnector, Transport};

pub use lettre::transport::smtp::authentication::Credentials;
