use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::rustls::{self, pki_types::ServerName};

use super::error::{IrcError, Result as IrcResult};
use super::writer::IrcWriter;
use crate::config::ServerConfig;

pub trait IrcStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> IrcStream for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

pub type BoxedIrcStream = Box<dyn IrcStream>;

/// Opens the transport to the chat server, wrapping it in TLS when configured.
pub async fn connect(server: &ServerConfig) -> IrcResult<BoxedIrcStream> {
    let addr = format!("{}:{}", server.host, server.port);
    tracing::info!(server.address = %addr, server.tls = server.tls, "Connecting to chat server");

    let tcp = TcpStream::connect(&addr).await.map_err(|e| {
        tracing::error!(server.address = %addr, error = %e, "TCP connection failed");
        IrcError::Io(e)
    })?;

    if !server.tls {
        tracing::info!(server.address = %addr, "TCP connected");
        return Ok(Box::new(tcp));
    }

    let root_store = rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let tls_config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();
    let connector = TlsConnector::from(Arc::new(tls_config));
    let server_name = ServerName::try_from(server.host.clone())
        .map_err(|_| IrcError::InvalidServerName(server.host.clone()))?;

    let stream = connector
        .connect(server_name, tcp)
        .await
        .map_err(|source| IrcError::Tls {
            host: server.host.clone(),
            source,
        })?;
    tracing::info!(server.address = %addr, "TLS handshake complete");
    Ok(Box::new(stream))
}

/// Authenticates and joins the seeded channels, in order.
pub async fn register<W>(
    writer: &mut IrcWriter<W>,
    username: &str,
    oauth_token: &str,
    channels: &[String],
) -> IrcResult<()>
where
    W: AsyncWrite + Unpin,
{
    writer.send_line(&format!("PASS {}", oauth_token)).await?;
    writer.send_line(&format!("NICK {}", username)).await?;
    for channel in channels {
        writer.join(channel).await?;
    }
    tracing::info!(
        bot.username = %username,
        channels.count = channels.len(),
        "Sent registration and joined initial channels"
    );
    Ok(())
}
