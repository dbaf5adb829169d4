//! Line framing and response classification for the cosign daemon protocol.
//!
//! Every message is a single CRLF-terminated line. The server greets with a `220` banner,
//! the client upgrades the connection with `STARTTLS 2`, and after the TLS handshake the
//! server emits one more line before it accepts commands.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

pub const READY_PREFIX: &str = "220 ";
pub const STARTTLS_REQUEST: &str = "STARTTLS 2";
pub const QUIT_REQUEST: &str = "QUIT";
pub const DEFAULT_COMMAND: &str = "NOOP";
pub const LINE_TERMINATOR: &str = "\r\n";

/// Response codes that count as a successfully served command.
pub const SUCCESS_CODES: [&str; 8] = ["220", "231", "232", "250", "431", "432", "533", "534"];

/// Reads one line including its terminator. Returns an empty string when the peer closed
/// the connection.
pub async fn read_line<R>(reader: &mut R) -> std::io::Result<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    reader.read_line(&mut line).await?;
    Ok(line)
}

pub async fn write_line<W>(writer: &mut W, line: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut buffer = Vec::with_capacity(line.len() + LINE_TERMINATOR.len());
    buffer.extend_from_slice(line.as_bytes());
    buffer.extend_from_slice(LINE_TERMINATOR.as_bytes());
    writer.write_all(&buffer).await?;
    writer.flush().await
}

pub fn is_ready(line: &str) -> bool {
    line.starts_with(READY_PREFIX)
}

/// Status code of a response line: everything before the first whitespace character.
pub fn status_code(line: &str) -> &str {
    line.split(char::is_whitespace).next().unwrap_or_default()
}

pub fn is_success_response(line: &str) -> bool {
    SUCCESS_CODES.contains(&status_code(line))
}

pub fn trim_line(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    #[test]
    fn every_success_code_should_be_classified_as_success() {
        for code in SUCCESS_CODES {
            let line = format!("{code} done\r\n");
            assert!(is_success_response(&line), "{code} should be a success");
        }
    }

    #[test]
    fn other_codes_should_be_classified_as_failure() {
        for line in ["500 unknown command\r\n", "221 bye\r\n", "2500 ok\r\n", "25 ok\r\n"] {
            assert!(!is_success_response(line), "{line:?} should be a failure");
        }
    }

    #[test]
    fn malformed_and_empty_lines_should_be_classified_as_failure() {
        for line in ["", "\r\n", " 250 leading space\r\n", "ok 250\r\n", "garbage"] {
            assert!(!is_success_response(line), "{line:?} should be a failure");
        }
    }

    #[test]
    fn status_code_should_stop_at_first_whitespace() {
        assert_eq!(status_code("250 ok\r\n"), "250");
        assert_eq!(status_code("250\r\n"), "250");
        assert_eq!(status_code("431\tno such user"), "431");
        assert!(is_success_response("250\r\n"));
    }

    #[test]
    fn ready_prefix_requires_trailing_space() {
        assert!(is_ready("220 ready\r\n"));
        assert!(!is_ready("220-ready\r\n"));
        assert!(!is_ready("2200 ready\r\n"));
        assert!(!is_ready("500 no\r\n"));
    }

    #[tokio::test]
    async fn should_read_lines_and_report_eof_as_empty() {
        let mut reader = BufReader::new(&b"220 ready\r\n250 ok\r\n"[..]);
        assert_eq!(read_line(&mut reader).await.unwrap(), "220 ready\r\n");
        assert_eq!(read_line(&mut reader).await.unwrap(), "250 ok\r\n");
        assert_eq!(read_line(&mut reader).await.unwrap(), "");
    }

    #[tokio::test]
    async fn should_terminate_written_lines_with_crlf() {
        let mut output = Vec::new();
        write_line(&mut output, STARTTLS_REQUEST).await.unwrap();
        write_line(&mut output, QUIT_REQUEST).await.unwrap();
        assert_eq!(output, b"STARTTLS 2\r\nQUIT\r\n");
    }

    #[test]
    fn trim_line_should_strip_terminator_only() {
        assert_eq!(trim_line("250 ok \r\n"), "250 ok ");
        assert_eq!(trim_line(""), "");
    }
}
