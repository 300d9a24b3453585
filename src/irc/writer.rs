use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::error::Result as IrcResult;

/// Write side of the connection. Every call writes one CRLF-terminated line
/// and flushes it before returning.
#[derive(Debug)]
pub struct IrcWriter<W> {
    inner: W,
}

impl<W> IrcWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub async fn send_line(&mut self, line: &str) -> IrcResult<()> {
        if line.starts_with("PASS ") {
            tracing::debug!(line = "PASS ***", "Sending line");
        } else {
            tracing::debug!(line, "Sending line");
        }
        self.inner.write_all(line.as_bytes()).await?;
        self.inner.write_all(b"\r\n").await?;
        self.inner.flush().await?;
        Ok(())
    }

    pub async fn privmsg(&mut self, channel: &str, text: &str) -> IrcResult<()> {
        self.send_line(&format!("PRIVMSG #{} :{}", channel, text))
            .await
    }

    pub async fn join(&mut self, channel: &str) -> IrcResult<()> {
        self.send_line(&format!("JOIN #{}", channel)).await
    }

    pub async fn part(&mut self, channel: &str) -> IrcResult<()> {
        self.send_line(&format!("PART #{}", channel)).await
    }

    /// Answers a keep-alive probe with the payload that followed `PING`.
    pub async fn pong(&mut self, payload: &str) -> IrcResult<()> {
        self.send_line(&format!("PONG{}", payload)).await
    }

    pub async fn shutdown(&mut self) -> IrcResult<()> {
        self.inner.shutdown().await?;
        Ok(())
    }

    #[cfg(test)]
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    #[cfg(test)]
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }
}

/// Write half that fails every write, as a dropped connection does.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct BrokenPipe;

#[cfg(test)]
impl AsyncWrite for BrokenPipe {
    fn poll_write(
        self: std::pin::Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
        _buf: &[u8],
    ) -> std::task::Poll<std::io::Result<usize>> {
        std::task::Poll::Ready(Err(std::io::ErrorKind::BrokenPipe.into()))
    }

    fn poll_flush(
        self: std::pin::Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::io::Result<()>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn poll_shutdown(
        self: std::pin::Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::io::Result<()>> {
        std::task::Poll::Ready(Ok(()))
    }
}
