//! DAP wire framing
//!
//! Every message is a JSON body preceded by HTTP-style headers:
//! ```text
//! Content-Length: <byte-length>\r\n
//! \r\n
//! <JSON body>
//! ```

use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::common::Error;

/// Upper bound for a single message body. Source payloads can be large,
/// but anything past this is a corrupt header.
const MAX_BODY_LEN: usize = 64 * 1024 * 1024;

fn eof_as_crash(e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        Error::BackendCrashed
    } else {
        Error::Io(e)
    }
}

/// Read one framed message body from the stream
pub async fn read_message<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<String, Error> {
    let mut content_length: Option<usize> = None;
    let mut saw_header = false;

    loop {
        let mut line = String::new();
        let read = reader.read_line(&mut line).await.map_err(eof_as_crash)?;
        if read == 0 {
            return Err(Error::BackendCrashed);
        }

        let line = line.trim_end_matches(&['\r', '\n'][..]);
        if line.is_empty() {
            // A blank line before any header is keep-alive noise
            if saw_header {
                break;
            }
            continue;
        }
        saw_header = true;

        if let Some(value) = line.strip_prefix("Content-Length:") {
            let value = value.trim();
            content_length = Some(value.parse().map_err(|_| {
                Error::DapProtocol(format!("Invalid Content-Length: {}", value))
            })?);
        }
    }

    let len = content_length
        .ok_or_else(|| Error::DapProtocol("Missing Content-Length header".to_string()))?;

    if len > MAX_BODY_LEN {
        return Err(Error::DapProtocol(format!(
            "Content-Length too large: {} bytes",
            len
        )));
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await.map_err(eof_as_crash)?;

    String::from_utf8(body).map_err(|e| Error::DapProtocol(format!("Invalid UTF-8: {}", e)))
}

/// Write one message body with its Content-Length header
pub async fn write_message<W: AsyncWrite + Unpin>(writer: &mut W, json: &str) -> Result<(), Error> {
    let header = format!("Content-Length: {}\r\n\r\n", json.len());

    writer.write_all(header.as_bytes()).await?;
    writer.write_all(json.as_bytes()).await?;
    writer.flush().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tokio::io::BufReader;

    #[tokio::test]
    async fn test_read_consecutive_messages() {
        let data = b"Content-Length: 2\r\n\r\n{}Content-Length: 9\r\nContent-Type: application/json\r\n\r\n{\"seq\":2}";
        let mut reader = BufReader::new(Cursor::new(data.to_vec()));

        assert_eq!(read_message(&mut reader).await.unwrap(), "{}");
        assert_eq!(read_message(&mut reader).await.unwrap(), "{\"seq\":2}");
        assert!(matches!(
            read_message(&mut reader).await,
            Err(Error::BackendCrashed)
        ));
    }

    #[tokio::test]
    async fn test_multibyte_body_length_is_in_bytes() {
        let body = "{\"contents\":\"λ\"}";
        let mut output = Vec::new();
        write_message(&mut output, body).await.unwrap();

        let mut reader = BufReader::new(Cursor::new(output));
        assert_eq!(read_message(&mut reader).await.unwrap(), body);
    }

    #[tokio::test]
    async fn test_missing_content_length() {
        let data = b"Content-Type: application/json\r\n\r\n{}";
        let mut reader = BufReader::new(Cursor::new(data.to_vec()));

        assert!(matches!(
            read_message(&mut reader).await,
            Err(Error::DapProtocol(_))
        ));
    }

    #[tokio::test]
    async fn test_truncated_body_is_crash() {
        let data = b"Content-Length: 40\r\n\r\n{\"partial\":";
        let mut reader = BufReader::new(Cursor::new(data.to_vec()));

        assert!(matches!(
            read_message(&mut reader).await,
            Err(Error::BackendCrashed)
        ));
    }
}
