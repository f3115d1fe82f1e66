//! Packet framing for the client protocol
//!
//! Packets on the client connection are framed as
//! `<decimal byte length>:<JSON object>` with no trailing separator.

use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Error, Result};

/// Upper bound on a single packet body. A header past this is treated as a
/// framing error rather than an allocation request.
const MAX_PACKET_LEN: usize = 16 * 1024 * 1024;

/// Write one framed packet
pub async fn write_packet<W>(writer: &mut W, packet: &Value) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let body = serde_json::to_vec(packet)?;
    writer.write_all(format!("{}:", body.len()).as_bytes()).await?;
    writer.write_all(&body).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one framed packet
///
/// Returns `Ok(None)` on a clean end of stream at a packet boundary.
pub async fn read_packet<R>(reader: &mut R) -> Result<Option<Value>>
where
    R: AsyncRead + Unpin,
{
    let mut len: usize = 0;
    let mut seen_digit = false;

    loop {
        let mut byte = [0u8; 1];
        if reader.read(&mut byte).await? == 0 {
            if seen_digit {
                return Err(Error::internal("connection closed inside a packet header"));
            }
            return Ok(None);
        }

        match byte[0] {
            b':' if seen_digit => break,
            b'0'..=b'9' => {
                len = len * 10 + (byte[0] - b'0') as usize;
                if len > MAX_PACKET_LEN {
                    return Err(Error::internal("packet length exceeds limit"));
                }
                seen_digit = true;
            }
            other => {
                return Err(Error::internal(format!(
                    "malformed packet header byte {:#04x}",
                    other
                )))
            }
        }
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;

    let packet = serde_json::from_slice(&body)?;
    Ok(Some(packet))
}
