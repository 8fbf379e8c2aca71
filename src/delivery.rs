//! One-shot SMTP delivery.
//!
//! A delivery attempt opens a fresh transport session to the sender's
//! configured endpoint, upgrades to TLS via STARTTLS when enabled,
//! authenticates with the sender's credential, transmits one message, and
//! closes the session. Every transport-level fault is caught here and
//! converted into a failure result; nothing escapes this boundary.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
};
use tracing::error;

use crate::error::DeliveryError;

/// One configured outbound account: address, credential, and SMTP endpoint.
///
/// Immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct SenderIdentity {
    /// Address used for the envelope and the `From` header.
    pub email: String,
    /// Credential shared by the whole pool.
    pub password: String,
    /// SMTP server hostname.
    pub host: String,
    /// SMTP server port (usually 587 for STARTTLS).
    pub port: u16,
    /// Upgrade the session via STARTTLS before authenticating.
    pub starttls: bool,
}

/// A fully rendered message ready for one recipient.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub recipient: String,
    pub subject: String,
    pub body: String,
    /// Send the body as `text/html` rather than `text/plain`.
    pub html: bool,
}

/// The transport capability the retry controller drives.
///
/// The production implementation is [`SmtpMailer`]; tests substitute scripted
/// implementations to exercise retry and rotation behavior without a network.
#[allow(async_fn_in_trait)]
pub trait Mailer {
    /// Perform one transport-level send.
    ///
    /// # Errors
    ///
    /// Returns a [`DeliveryError`] for any transport fault: connection
    /// refused, TLS or auth failure, rejected envelope, or timeout.
    async fn send(
        &self,
        sender: &SenderIdentity,
        mail: &OutboundMessage,
    ) -> Result<(), DeliveryError>;
}

/// Sends messages over SMTP using `lettre`.
///
/// A fresh transport session is established per attempt.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmtpMailer;

impl SmtpMailer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Mailer for SmtpMailer {
    async fn send(
        &self,
        sender: &SenderIdentity,
        mail: &OutboundMessage,
    ) -> Result<(), DeliveryError> {
        let message = build_message(sender, mail)?;
        let transport = build_transport(sender)?;
        transport.send(message).await?;
        Ok(())
    }
}

/// Run one delivery attempt with total fault containment.
///
/// Any error is logged with the recipient address and the underlying
/// diagnostic, then reported as `false`.
pub async fn attempt<M: Mailer>(
    mailer: &M,
    sender: &SenderIdentity,
    mail: &OutboundMessage,
) -> bool {
    match mailer.send(sender, mail).await {
        Ok(()) => true,
        Err(error) => {
            error!(recipient = %mail.recipient, %error, "Failed to deliver message");
            false
        }
    }
}

/// Assemble the RFC 5322 message for one recipient.
fn build_message(
    sender: &SenderIdentity,
    mail: &OutboundMessage,
) -> Result<Message, DeliveryError> {
    let from: Mailbox = sender
        .email
        .parse()
        .map_err(|_| DeliveryError::InvalidAddress(sender.email.clone()))?;
    let to: Mailbox = mail
        .recipient
        .parse()
        .map_err(|_| DeliveryError::InvalidAddress(mail.recipient.clone()))?;

    let content_type = if mail.html {
        ContentType::TEXT_HTML
    } else {
        ContentType::TEXT_PLAIN
    };

    Message::builder()
        .from(from)
        .to(to)
        .subject(mail.subject.clone())
        .header(content_type)
        .body(mail.body.clone())
        .map_err(DeliveryError::from)
}

/// Build the transport for the sender's endpoint.
fn build_transport(
    sender: &SenderIdentity,
) -> Result<AsyncSmtpTransport<Tokio1Executor>, DeliveryError> {
    let credentials = Credentials::new(sender.email.clone(), sender.password.clone());

    let builder = if sender.starttls {
        let tls = TlsParameters::new(sender.host.clone())?;
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&sender.host)?
            .tls(Tls::Required(tls))
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&sender.host)
    };

    Ok(builder.port(sender.port).credentials(credentials).build())
}
