//! Outgoing message composition

use crate::{SmtpError, SmtpResult};
use lettre::{
    message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart},
    Message,
};
use std::path::{Path, PathBuf};
use tracing::debug;

const OCTET_STREAM: &str = "application/octet-stream";

/// An attachment whose bytes are already in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingAttachment {
    /// Filename used for the part name and the disposition header
    pub filename: String,
    /// Raw attachment data
    pub data: Vec<u8>,
}

/// Content for a single `Mailer::send` call
#[derive(Debug, Clone, Default)]
pub struct Outgoing {
    /// Subject line
    pub subject: String,
    /// Plain text body
    pub body: Option<String>,
    /// Files read from disk at send time
    pub file_attachments: Vec<PathBuf>,
    /// Attachments supplied in memory, keyed by filename
    pub inline_attachments: Vec<OutgoingAttachment>,
}

impl Outgoing {
    /// Create a message with only a subject
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            ..Self::default()
        }
    }

    /// Set the plain text body
    pub fn body(mut self, text: impl Into<String>) -> Self {
        self.body = Some(text.into());
        self
    }

    /// Attach a file by path
    pub fn file_attachment(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_attachments.push(path.into());
        self
    }

    /// Attach in-memory bytes under `filename`
    ///
    /// Filenames behave like map keys: attaching the same name twice keeps
    /// the original position and replaces the data.
    pub fn inline_attachment(mut self, filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        let filename = filename.into();
        let data = data.into();
        match self
            .inline_attachments
            .iter_mut()
            .find(|att| att.filename == filename)
        {
            Some(existing) => existing.data = data,
            None => self.inline_attachments.push(OutgoingAttachment { filename, data }),
        }
        self
    }

    /// Read file attachments and lay out the message parts
    ///
    /// Part order is file attachments, then the text body, then inline
    /// attachments.
    pub async fn prepare(&self) -> SmtpResult<PreparedContent> {
        let mut parts = Vec::with_capacity(
            self.file_attachments.len() + self.inline_attachments.len() + 1,
        );

        for path in &self.file_attachments {
            let filename = base_filename(path)?;
            let data = tokio::fs::read(path).await.map_err(|source| SmtpError::Io {
                path: path.clone(),
                source,
            })?;
            debug!("Read attachment {} ({} bytes)", filename, data.len());
            parts.push(ContentPart::Attachment(OutgoingAttachment { filename, data }));
        }

        if let Some(ref text) = self.body {
            parts.push(ContentPart::Text(text.clone()));
        }

        parts.extend(
            self.inline_attachments
                .iter()
                .cloned()
                .map(ContentPart::Attachment),
        );

        Ok(PreparedContent {
            subject: self.subject.clone(),
            parts,
        })
    }
}

/// One MIME part of a prepared message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    Attachment(OutgoingAttachment),
}

/// Message content with every attachment loaded, shared by all recipients
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedContent {
    pub subject: String,
    pub parts: Vec<ContentPart>,
}

/// Parse `a@x.com` or `Alice <a@x.com>` into a mailbox
pub fn parse_mailbox(address: &str) -> SmtpResult<Mailbox> {
    address
        .parse()
        .map_err(|e| SmtpError::InvalidAddress(format!("{}: {}", address, e)))
}

/// Build the message delivered to a single recipient
pub fn build_message(from: &Mailbox, to: &Mailbox, content: &PreparedContent) -> SmtpResult<Message> {
    let builder = Message::builder()
        .from(from.clone())
        .to(to.clone())
        .subject(&content.subject);

    let mut parts = content
        .parts
        .iter()
        .map(single_part)
        .collect::<SmtpResult<Vec<_>>>()?
        .into_iter();

    // A multipart needs at least one part
    let first = parts
        .next()
        .unwrap_or_else(|| SinglePart::plain(String::new()));
    let mixed = parts.fold(MultiPart::mixed().singlepart(first), |mixed, part| {
        mixed.singlepart(part)
    });

    builder
        .multipart(mixed)
        .map_err(|e| SmtpError::MessageBuildError(e.to_string()))
}

fn single_part(part: &ContentPart) -> SmtpResult<SinglePart> {
    match part {
        ContentPart::Text(text) => Ok(SinglePart::builder()
            .header(ContentType::TEXT_PLAIN)
            .body(text.clone())),
        ContentPart::Attachment(att) => {
            let content_type = binary_content_type(&att.filename)?;
            Ok(Attachment::new(att.filename.clone()).body(att.data.clone(), content_type))
        }
    }
}

/// `application/octet-stream` carrying the part name, or bare if the name
/// cannot be expressed as a parameter
fn binary_content_type(filename: &str) -> SmtpResult<ContentType> {
    ContentType::parse(&format!("{}; name=\"{}\"", OCTET_STREAM, filename))
        .or_else(|_| ContentType::parse(OCTET_STREAM))
        .map_err(|e| SmtpError::MessageBuildError(e.to_string()))
}

/// Last path component, used as the attachment name
fn base_filename(path: &Path) -> SmtpResult<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| SmtpError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "path has no file name",
            ),
        })
}
