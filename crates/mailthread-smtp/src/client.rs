//! Type-state SMTP client.

use crate::address::Address;
use crate::capability::Capabilities;
use crate::command::Command;
use crate::error::{Error, Result};
use crate::reply::{Reply, ReplyCode, is_last_reply_line, parse_reply};
use base64::Engine;
use std::marker::PhantomData;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

/// Type-state marker: greeting received, EHLO not yet sent.
#[derive(Debug)]
pub struct Connected;

/// Type-state marker: EHLO done, capabilities known.
#[derive(Debug)]
pub struct Ready;

/// Type-state marker: allowed to run mail transactions.
#[derive(Debug)]
pub struct Authenticated;

/// Sender and recipients of one mail transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Reverse path (`MAIL FROM`).
    pub from: Address,
    /// Forward paths (`RCPT TO`), in order.
    pub recipients: Vec<Address>,
}

impl Envelope {
    /// Creates an envelope.
    #[must_use]
    pub const fn new(from: Address, recipients: Vec<Address>) -> Self {
        Self { from, recipients }
    }
}

/// SMTP client over any async byte stream.
#[derive(Debug)]
pub struct Client<S, State> {
    stream: BufReader<S>,
    capabilities: Capabilities,
    _state: PhantomData<State>,
}

impl<S, State> Client<S, State>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Sends QUIT and closes the session (available in any state).
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be sent or the server rejects it.
    pub async fn quit(mut self) -> Result<()> {
        let reply = self.command(Command::Quit).await?;
        if !reply.is_success() && reply.code != ReplyCode::CLOSING {
            return Err(Error::rejected(reply.code.as_u16(), reply.text()));
        }
        self.stream.get_mut().shutdown().await?;
        Ok(())
    }

    fn into_state<T>(self) -> Client<S, T> {
        Client {
            stream: self.stream,
            capabilities: self.capabilities,
            _state: PhantomData,
        }
    }

    async fn command(&mut self, cmd: Command) -> Result<Reply> {
        tracing::debug!(command = cmd.verb(), "smtp >");
        self.write(&cmd.serialize()).await?;
        self.read_reply().await
    }

    async fn write(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.stream.get_mut();
        stream.write_all(data).await?;
        stream.flush().await?;
        Ok(())
    }

    async fn read_reply(&mut self) -> Result<Reply> {
        let mut lines = Vec::new();
        let mut buf = String::new();

        loop {
            buf.clear();
            if self.stream.read_line(&mut buf).await? == 0 {
                return Err(Error::ConnectionClosed);
            }

            let line = buf.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                continue;
            }

            let last = is_last_reply_line(line);
            lines.push(line.to_string());
            if last {
                break;
            }
        }

        let reply = parse_reply(&lines)?;
        tracing::debug!(code = reply.code.as_u16(), "smtp <");
        Ok(reply)
    }
}

impl<S> Client<S, Connected>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps a fresh connection and reads the server greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if the greeting cannot be read or is not 220.
    pub async fn greet(stream: S) -> Result<Self> {
        let mut client = Self::greet_after_starttls(stream);
        client
            .read_reply()
            .await?
            .expect_code(ReplyCode::SERVICE_READY)?;
        Ok(client)
    }

    /// Wraps a stream that was just upgraded with STARTTLS.
    ///
    /// The server sends no new greeting after the handshake, so nothing is
    /// read here; the caller must issue EHLO again.
    #[must_use]
    pub fn greet_after_starttls(stream: S) -> Self {
        Self {
            stream: BufReader::new(stream),
            capabilities: Capabilities::default(),
            _state: PhantomData,
        }
    }

    /// Sends EHLO and records the advertised capabilities.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects EHLO.
    pub async fn ehlo(mut self, client_hostname: &str) -> Result<Client<S, Ready>> {
        let reply = self
            .command(Command::Ehlo {
                hostname: client_hostname.to_string(),
            })
            .await?
            .expect_success()?;

        self.capabilities = Capabilities::from_ehlo(&reply);
        Ok(self.into_state())
    }
}

impl<S> Client<S, Ready>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Sends STARTTLS and hands back the raw stream for the TLS handshake.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSupported`] if STARTTLS was not advertised, or an
    /// error if the server refuses it.
    pub async fn starttls(mut self) -> Result<S> {
        if !self.capabilities.starttls {
            return Err(Error::NotSupported("STARTTLS".into()));
        }

        self.command(Command::StartTls)
            .await?
            .expect_code(ReplyCode::SERVICE_READY)?;

        Ok(self.stream.into_inner())
    }

    /// Authenticates with AUTH PLAIN.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSupported`] if PLAIN was not advertised, or an error
    /// if the server rejects the credentials.
    pub async fn auth_plain(
        mut self,
        username: &str,
        password: &str,
    ) -> Result<Client<S, Authenticated>> {
        if !self.capabilities.supports_auth("PLAIN") {
            return Err(Error::NotSupported("AUTH PLAIN".into()));
        }

        let credentials = format!("\0{username}\0{password}");
        let initial_response =
            base64::engine::general_purpose::STANDARD.encode(credentials.as_bytes());

        self.command(Command::AuthPlain { initial_response })
            .await?
            .expect_code(ReplyCode::AUTH_SUCCEEDED)?;

        Ok(self.into_state())
    }
}

impl<S> Client<S, Authenticated>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Runs one mail transaction: MAIL FROM, RCPT TO per recipient, DATA.
    ///
    /// `message` is the RFC 5322 text; see [`encode_data`] for how it is put
    /// on the wire.
    ///
    /// # Errors
    ///
    /// Returns an error if the envelope has no recipients or the server
    /// rejects any step.
    pub async fn send_mail(&mut self, envelope: &Envelope, message: &[u8]) -> Result<()> {
        if envelope.recipients.is_empty() {
            return Err(Error::InvalidAddress("No recipients specified".into()));
        }

        self.command(Command::MailFrom(envelope.from.clone()))
            .await?
            .expect_success()?;

        for rcpt in &envelope.recipients {
            self.command(Command::RcptTo(rcpt.clone()))
                .await?
                .expect_success()?;
        }

        self.command(Command::Data)
            .await?
            .expect_code(ReplyCode::START_DATA)?;

        self.write(&encode_data(message)).await?;
        self.read_reply().await?.expect_success()?;

        tracing::debug!(recipients = envelope.recipients.len(), "message accepted");
        Ok(())
    }
}

/// Prepares message text for the DATA phase.
///
/// Line endings are normalized to CRLF, lines starting with `.` get an extra
/// leading dot, and the terminating `.` line is appended.
#[must_use]
pub fn encode_data(message: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(message.len() + message.len() / 32 + 5);

    if !message.is_empty() {
        let body = message.strip_suffix(b"\n").unwrap_or(message);
        for line in body.split(|&b| b == b'\n') {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if line.first() == Some(&b'.') {
                out.push(b'.');
            }
            out.extend_from_slice(line);
            out.extend_from_slice(b"\r\n");
        }
    }

    out.extend_from_slice(b".\r\n");
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    fn addr(s: &str) -> Address {
        Address::new(s).unwrap()
    }

    #[test]
    fn test_encode_data_normalizes_and_stuffs() {
        assert_eq!(
            encode_data(b"Subject: Hi\n\n.hidden\r\nlast"),
            b"Subject: Hi\r\n\r\n..hidden\r\nlast\r\n.\r\n"
        );
    }

    #[test]
    fn test_encode_data_trailing_newline() {
        assert_eq!(encode_data(b"a\r\n"), b"a\r\n.\r\n");
        assert_eq!(encode_data(b"a\n\n"), b"a\r\n\r\n.\r\n");
        assert_eq!(encode_data(b""), b".\r\n");
        assert_eq!(encode_data(b".\n"), b"..\r\n.\r\n");
    }

    #[tokio::test]
    async fn test_full_session() {
        let mock = Builder::new()
            .read(b"220 mx.example.com ESMTP\r\n")
            .write(b"EHLO localhost\r\n")
            .read(b"250-mx.example.com\r\n250-STARTTLS\r\n250 AUTH PLAIN LOGIN\r\n")
            .write(b"AUTH PLAIN AHVzZXIAcGFzcw==\r\n")
            .read(b"235 2.7.0 Authentication successful\r\n")
            .write(b"MAIL FROM:<a@example.com>\r\n")
            .read(b"250 2.1.0 Ok\r\n")
            .write(b"RCPT TO:<b@example.com>\r\n")
            .read(b"250 2.1.5 Ok\r\n")
            .write(b"RCPT TO:<c@example.com>\r\n")
            .read(b"250 2.1.5 Ok\r\n")
            .write(b"DATA\r\n")
            .read(b"354 End data with <CR><LF>.<CR><LF>\r\n")
            .write(b"Subject: Hi\r\n\r\n..dot\r\n.\r\n")
            .read(b"250 2.0.0 Ok: queued\r\n")
            .write(b"QUIT\r\n")
            .read(b"221 2.0.0 Bye\r\n")
            .build();

        let client = Client::greet(mock).await.unwrap();
        let client = client.ehlo("localhost").await.unwrap();

        let mut client = client.auth_plain("user", "pass").await.unwrap();
        let envelope = Envelope::new(
            addr("a@example.com"),
            vec![addr("b@example.com"), addr("c@example.com")],
        );
        client
            .send_mail(&envelope, b"Subject: Hi\n\n.dot\n")
            .await
            .unwrap();
        client.quit().await.unwrap();
    }

    #[tokio::test]
    async fn test_bad_greeting() {
        let mock = Builder::new().read(b"554 go away\r\n").build();
        let err = Client::greet(mock).await.unwrap_err();
        assert!(matches!(err, Error::Rejected { code: 554, .. }));
    }

    #[tokio::test]
    async fn test_connection_closed_mid_reply() {
        let mock = Builder::new().read(b"220-mx.example.com\r\n").build();
        let err = Client::greet(mock).await.unwrap_err();
        assert!(matches!(err, Error::ConnectionClosed));
    }

    #[tokio::test]
    async fn test_starttls_requires_capability() {
        let mock = Builder::new()
            .read(b"220 mx\r\n")
            .write(b"EHLO localhost\r\n")
            .read(b"250 mx\r\n")
            .build();

        let client = Client::greet(mock)
            .await
            .unwrap()
            .ehlo("localhost")
            .await
            .unwrap();
        let err = client.starttls().await.unwrap_err();
        assert!(matches!(err, Error::NotSupported(_)));
    }

    #[tokio::test]
    async fn test_rejected_recipient() {
        let mock = Builder::new()
            .read(b"220 mx\r\n")
            .write(b"EHLO localhost\r\n")
            .read(b"250-mx\r\n250 AUTH PLAIN\r\n")
            .write(b"AUTH PLAIN AHVzZXIAcGFzcw==\r\n")
            .read(b"235 Ok\r\n")
            .write(b"MAIL FROM:<a@example.com>\r\n")
            .read(b"250 Ok\r\n")
            .write(b"RCPT TO:<nobody@example.com>\r\n")
            .read(b"550 5.1.1 User unknown\r\n")
            .build();

        let mut client = Client::greet(mock)
            .await
            .unwrap()
            .ehlo("localhost")
            .await
            .unwrap()
            .auth_plain("user", "pass")
            .await
            .unwrap();

        let envelope = Envelope::new(addr("a@example.com"), vec![addr("nobody@example.com")]);
        let err = client.send_mail(&envelope, b"hi").await.unwrap_err();
        assert!(err.is_permanent());
    }

    #[tokio::test]
    async fn test_send_mail_needs_recipients() {
        let mock = Builder::new()
            .read(b"220 mx\r\n")
            .write(b"EHLO localhost\r\n")
            .read(b"250-mx\r\n250 AUTH PLAIN\r\n")
            .write(b"AUTH PLAIN AHVzZXIAcGFzcw==\r\n")
            .read(b"235 Ok\r\n")
            .build();

        let mut client = Client::greet(mock)
            .await
            .unwrap()
            .ehlo("localhost")
            .await
            .unwrap()
            .auth_plain("user", "pass")
            .await
            .unwrap();

        let envelope = Envelope::new(addr("a@example.com"), Vec::new());
        assert!(matches!(
            client.send_mail(&envelope, b"hi").await,
            Err(Error::InvalidAddress(_))
        ));
    }
}
