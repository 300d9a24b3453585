/// Longest line accepted, terminators included. Twitch caps tagged lines at
/// 8 KiB.
pub const MAX_LINE_LEN: usize = 8192;

/// Splits a byte stream into protocol lines.
///
/// Reads from the connection arrive in arbitrary chunks, so a line may be cut
/// anywhere, including between `\r` and `\n` or inside a multi-byte UTF-8
/// sequence. Incomplete trailing bytes are kept until a later chunk completes
/// them. A line longer than [`MAX_LINE_LEN`] is dropped as a whole, up to and
/// including its terminator.
#[derive(Debug, Default)]
pub struct LineFramer {
    pending: Vec<u8>,
    discarding: bool,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk and returns every line it completed, without terminators.
    /// Empty lines are skipped.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        // Bytes already buffered hold no `\n`; only the new chunk is scanned.
        let mut scan = self.pending.len();
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.pending[scan..].iter().position(|&b| b == b'\n') {
            let end = scan + offset;
            let raw = &self.pending[start..end];
            if self.discarding {
                self.discarding = false;
            } else if raw.len() + 1 > MAX_LINE_LEN {
                tracing::warn!(len = raw.len(), "Dropping oversized line");
            } else {
                let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
                if !raw.is_empty() {
                    lines.push(String::from_utf8_lossy(raw).into_owned());
                }
            }
            start = end + 1;
            scan = start;
        }
        self.pending.drain(..start);

        if !self.discarding && self.pending.len() > MAX_LINE_LEN {
            tracing::warn!(pending = self.pending.len(), "Dropping oversized incomplete line");
            self.discarding = true;
        }
        if self.discarding {
            self.pending.clear();
        }
        lines
    }

    /// Bytes received after the last complete line.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_lines_in_one_chunk() {
        let mut framer = LineFramer::new();
        let lines = framer.push(b"PING :tmi.example.tv\r\n:a!a@a PRIVMSG #b :hi\r\n");
        assert_eq!(lines, vec!["PING :tmi.example.tv", ":a!a@a PRIVMSG #b :hi"]);
        assert_eq!(framer.pending_len(), 0);
    }

    #[test]
    fn test_partial_line_is_carried_over() {
        let mut framer = LineFramer::new();
        assert!(framer.push(b":user1!user1@user1.tmi PRIV").is_empty());
        assert_eq!(framer.pending_len(), 27);

        let lines = framer.push(b"MSG #alice :hi\r\nPING");
        assert_eq!(lines, vec![":user1!user1@user1.tmi PRIVMSG #alice :hi"]);

        let lines = framer.push(b" :tmi.example.tv\r\n");
        assert_eq!(lines, vec!["PING :tmi.example.tv"]);
    }

    #[test]
    fn test_crlf_split_across_chunks() {
        let mut framer = LineFramer::new();
        assert!(framer.push(b"PING :x\r").is_empty());
        assert_eq!(framer.push(b"\n"), vec!["PING :x"]);
    }

    #[test]
    fn test_bare_lf_and_empty_lines() {
        let mut framer = LineFramer::new();
        let lines = framer.push(b"one\n\r\n\ntwo\n");
        assert_eq!(lines, vec!["one", "two"]);
    }

    #[test]
    fn test_multibyte_character_split_across_chunks() {
        let mut framer = LineFramer::new();
        let line = "PRIVMSG #k :spöket\r\n".as_bytes();
        let split = line.iter().position(|&b| b == 0xC3).unwrap() + 1;

        assert!(framer.push(&line[..split]).is_empty());
        assert_eq!(framer.push(&line[split..]), vec!["PRIVMSG #k :spöket"]);
    }

    #[test]
    fn test_oversized_line_is_dropped_and_stream_recovers() {
        let mut framer = LineFramer::new();
        let filler = vec![b'x'; 1000];
        for _ in 0..9 {
            assert!(framer.push(&filler).is_empty());
        }
        assert_eq!(framer.pending_len(), 0);

        assert!(framer.push(&filler).is_empty());
        let lines = framer.push(b"tail of the long one\r\nPING :x\r\n");
        assert_eq!(lines, vec!["PING :x"]);
        assert_eq!(framer.pending_len(), 0);
    }

    #[test]
    fn test_oversized_line_completed_in_one_chunk_is_dropped() {
        let mut framer = LineFramer::new();
        let mut chunk = vec![b'y'; MAX_LINE_LEN];
        chunk.extend_from_slice(b"\r\nPING :x\r\n");
        assert_eq!(framer.push(&chunk), vec!["PING :x"]);
    }

    #[test]
    fn test_line_at_limit_is_kept() {
        let mut framer = LineFramer::new();
        let mut chunk = vec![b'z'; MAX_LINE_LEN - 2];
        chunk.extend_from_slice(b"\r\n");
        let lines = framer.push(&chunk);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), MAX_LINE_LEN - 2);
    }
}
