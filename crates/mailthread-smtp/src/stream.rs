//! TCP and TLS transports for SMTP sessions.

use crate::error::{Error, Result};
use rustls::pki_types::ServerName;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_rustls::{
    TlsConnector,
    rustls::{ClientConfig, RootCertStore},
};

/// TLS-wrapped TCP stream.
pub type TlsStream = tokio_rustls::client::TlsStream<TcpStream>;

/// Connects to an SMTP server over plain TCP.
///
/// # Errors
///
/// Returns an error if the connection fails.
pub async fn connect(host: &str, port: u16) -> Result<TcpStream> {
    tracing::debug!(host, port, "connecting");
    Ok(TcpStream::connect((host, port)).await?)
}

/// Connects with implicit TLS (port 465).
///
/// `server_name` is the name the certificate must match.
///
/// # Errors
///
/// Returns an error if the connection or TLS handshake fails.
pub async fn connect_tls(host: &str, port: u16, server_name: &str) -> Result<TlsStream> {
    let tcp = connect(host, port).await?;
    upgrade_to_tls(tcp, server_name).await
}

/// Runs the TLS handshake over an established TCP stream (after STARTTLS).
///
/// # Errors
///
/// Returns an error if the server name is invalid or the handshake fails.
pub async fn upgrade_to_tls(tcp: TcpStream, server_name: &str) -> Result<TlsStream> {
    let name = ServerName::try_from(server_name.to_string())
        .map_err(|_| Error::Protocol(format!("Invalid TLS server name: {server_name}")))?;

    tracing::debug!(server_name, "starting TLS handshake");
    Ok(tls_connector().connect(name, tcp).await?)
}

/// Creates a TLS connector trusting the webpki root certificates.
fn tls_connector() -> TlsConnector {
    let root_store = RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };

    let config = ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    TlsConnector::from(Arc::new(config))
}
