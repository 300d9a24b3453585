use tokio::io::AsyncWrite;

use crate::irc::IrcWriter;
use crate::irc::error::Result as IrcResult;

/// Text as it appears in the other channels: `<user>: <text>`, or the bare
/// text for announcements that have no sender.
pub fn relay_text(sender: Option<&str>, text: &str) -> String {
    match sender {
        Some(user) if !user.is_empty() => format!("{}: {}", user, text),
        _ => text.to_string(),
    }
}

/// Sends one `PRIVMSG` to every channel in `channels` except `origin`, in
/// list order. Returns how many channels were written to.
pub async fn fan_out<W>(
    writer: &mut IrcWriter<W>,
    channels: &[String],
    origin: Option<&str>,
    sender: Option<&str>,
    text: &str,
) -> IrcResult<usize>
where
    W: AsyncWrite + Unpin,
{
    let outbound = relay_text(sender, text);
    let mut delivered = 0;
    for channel in channels {
        if Some(channel.as_str()) == origin {
            continue;
        }
        writer.privmsg(channel, &outbound).await?;
        delivered += 1;
    }
    Ok(delivered)
}
