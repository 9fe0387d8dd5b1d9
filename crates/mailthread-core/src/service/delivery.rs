//! SMTP delivery of composed messages.

use crate::config::{Security, SmtpConfig};
use crate::message::Message;
use chrono::{DateTime, Local};
use mailthread_smtp::stream::{connect, connect_tls, upgrade_to_tls};
use mailthread_smtp::{Address, Client, Envelope, Mailbox, Ready};
use tokio::io::{AsyncRead, AsyncWrite};

/// Hostname announced in EHLO.
const CLIENT_HOSTNAME: &str = "localhost";

/// Errors that can occur while delivering a message.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// Connection or TLS setup failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The server refused the transaction.
    #[error("Send failed: {0}")]
    Send(String),

    /// Sender or recipients are missing or malformed.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

/// Derives the SMTP envelope from a message's headers.
///
/// The sender is the `From` address, or `config.username` when the message
/// has no sender. Recipients are every address in `To` and `Cc`.
///
/// # Errors
///
/// Returns [`DeliveryError::InvalidAddress`] if an address cannot be parsed
/// or there are no recipients.
pub fn envelope_for(config: &SmtpConfig, message: &Message) -> Result<Envelope, DeliveryError> {
    let invalid = |e: mailthread_smtp::Error| DeliveryError::InvalidAddress(e.to_string());

    let from = match message.from().filter(|f| !f.trim().is_empty()) {
        Some(from) => Mailbox::parse(from).map_err(invalid)?.address,
        None => Address::new(config.username.as_str()).map_err(invalid)?,
    };

    let mut recipients = Vec::new();
    for header in ["To", "Cc"] {
        for value in message.headers().get_all(header) {
            recipients.extend(
                Mailbox::parse_list(value)
                    .map_err(invalid)?
                    .into_iter()
                    .map(|mailbox| mailbox.address),
            );
        }
    }

    if recipients.is_empty() {
        return Err(DeliveryError::InvalidAddress(
            "No recipients specified".into(),
        ));
    }

    Ok(Envelope::new(from, recipients))
}

/// Returns `message` with its `Date` header set to `now`.
#[must_use]
pub fn stamp_date(message: &Message, now: DateTime<Local>) -> Message {
    message.clone().with_header("Date", now.to_rfc2822())
}

/// Delivers `message` using the configured SMTP server.
///
/// The `Date` header is stamped with the current local time.
///
/// # Errors
///
/// Returns an error if the envelope is invalid, or if connecting,
/// authenticating or sending fails.
pub async fn send_message(config: &SmtpConfig, message: &Message) -> Result<(), DeliveryError> {
    let envelope = envelope_for(config, message)?;
    let data = stamp_date(message, Local::now()).to_rfc5322();

    let host = config.host.as_str();
    let port = config.effective_port();
    let server_name = config.tls_server_name();
    tracing::info!(host, port, security = ?config.security, "delivering message");

    match config.security {
        Security::None => {
            let tcp = connect(host, port).await.map_err(connection)?;
            deliver(tcp, config, &envelope, data.as_bytes()).await
        }
        Security::Tls => {
            let tls = connect_tls(host, port, server_name)
                .await
                .map_err(connection)?;
            deliver(tls, config, &envelope, data.as_bytes()).await
        }
        Security::StartTls => {
            let tcp = connect(host, port).await.map_err(connection)?;
            let tcp = Client::greet(tcp)
                .await
                .map_err(connection)?
                .ehlo(CLIENT_HOSTNAME)
                .await
                .map_err(connection)?
                .starttls()
                .await
                .map_err(connection)?;

            let tls = upgrade_to_tls(tcp, server_name)
                .await
                .map_err(connection)?;
            let client = Client::greet_after_starttls(tls)
                .ehlo(CLIENT_HOSTNAME)
                .await
                .map_err(connection)?;
            transact(client, config, &envelope, data.as_bytes()).await
        }
    }
}

/// Runs a whole session over a freshly opened stream.
///
/// # Errors
///
/// Returns an error if any protocol step fails.
pub async fn deliver<S>(
    stream: S,
    config: &SmtpConfig,
    envelope: &Envelope,
    data: &[u8],
) -> Result<(), DeliveryError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let client = Client::greet(stream)
        .await
        .map_err(connection)?
        .ehlo(CLIENT_HOSTNAME)
        .await
        .map_err(connection)?;
    transact(client, config, envelope, data).await
}

async fn transact<S>(
    client: Client<S, Ready>,
    config: &SmtpConfig,
    envelope: &Envelope,
    data: &[u8],
) -> Result<(), DeliveryError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut client = client
        .auth_plain(&config.username, &config.password)
        .await
        .map_err(|e| DeliveryError::Authentication(e.to_string()))?;

    client
        .send_mail(envelope, data)
        .await
        .map_err(|e| DeliveryError::Send(e.to_string()))?;

    client
        .quit()
        .await
        .map_err(|e| DeliveryError::Send(e.to_string()))?;

    tracing::info!(recipients = envelope.recipients.len(), "message delivered");
    Ok(())
}

#[allow(clippy::needless_pass_by_value)]
fn connection(e: mailthread_smtp::Error) -> DeliveryError {
    DeliveryError::Connection(e.to_string())
}
