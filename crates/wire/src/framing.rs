// SPDX-License-Identifier: MIT

//! `Content-Length: <n>\r\n\r\n<body>` framing over any async byte stream.

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Header scan is bounded so a peer that never sends `\r\n\r\n` cannot hold
/// an unbounded buffer open.
const MAX_HEADER_BYTES: usize = 64 * 1024;
/// Bounds a single frame's body so a malformed length can't trigger an
/// unbounded allocation.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("connection closed before a full header was received")]
    ConnectionClosed,
    #[error("header exceeded {MAX_HEADER_BYTES} bytes without a terminator")]
    HeaderTooLarge,
    #[error("declared body size {0} exceeds the {MAX_BODY_BYTES} byte limit")]
    BodyTooLarge(usize),
    #[error("missing or malformed Content-Length header")]
    MissingContentLength,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reads one framed message, returning its raw body bytes.
///
/// Returns `Ok(None)` on a clean EOF before any bytes of a new frame have
/// arrived (the normal way a peer disconnects between messages).
pub async fn read_message<R: AsyncRead + Unpin>(
    reader: &mut R,
) -> Result<Option<Vec<u8>>, ProtocolError> {
    let mut header = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        let n = reader.read(&mut byte).await?;
        if n == 0 {
            return if header.is_empty() {
                Ok(None)
            } else {
                Err(ProtocolError::ConnectionClosed)
            };
        }
        header.push(byte[0]);
        if header.len() > MAX_HEADER_BYTES {
            return Err(ProtocolError::HeaderTooLarge);
        }
        if header.ends_with(b"\r\n\r\n") {
            break;
        }
    }

    let header_text = String::from_utf8_lossy(&header);
    let content_length = header_text
        .lines()
        .find_map(|line| line.strip_prefix("Content-Length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .ok_or(ProtocolError::MissingContentLength)?;

    if content_length > MAX_BODY_BYTES {
        return Err(ProtocolError::BodyTooLarge(content_length));
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).await?;
    Ok(Some(body))
}

pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    body: &[u8],
) -> Result<(), ProtocolError> {
    let header = format!("Content-Length: {}\r\n\r\n", body.len());
    writer.write_all(header.as_bytes()).await?;
    writer.write_all(body).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
#[path = "framing_tests.rs"]
mod tests;
