//! RESP wire codec
//!
//! Decodes RESP2 replies (plus RESP3 `>` push frames, read as arrays) and
//! encodes commands as arrays of bulk strings.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// Largest bulk string the broker may send (512 MiB)
const MAX_BULK_LEN: i64 = 512 * 1024 * 1024;

/// Deepest array nesting accepted
const MAX_DEPTH: usize = 32;

/// A single RESP value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RespValue {
    Simple(String),
    Error(String),
    Integer(i64),
    Bulk(Option<Bytes>),
    Array(Option<Vec<RespValue>>),
}

impl RespValue {
    /// Build a command as an array of bulk strings
    pub fn command<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        RespValue::Array(Some(
            parts
                .into_iter()
                .map(|p| RespValue::Bulk(Some(Bytes::copy_from_slice(p.as_ref().as_bytes()))))
                .collect(),
        ))
    }

    /// Textual form of a scalar value; integers become their decimal text
    ///
    /// Bulk strings that are not valid UTF-8 are converted lossily: each
    /// invalid sequence becomes U+FFFD, so the text is no longer byte-exact.
    pub fn as_text(&self) -> Option<String> {
        match self {
            RespValue::Simple(s) => Some(s.clone()),
            RespValue::Bulk(Some(b)) => Some(String::from_utf8_lossy(b).into_owned()),
            RespValue::Integer(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            RespValue::Simple(_) => "simple string",
            RespValue::Error(_) => "error",
            RespValue::Integer(_) => "integer",
            RespValue::Bulk(Some(_)) => "bulk string",
            RespValue::Bulk(None) => "null bulk string",
            RespValue::Array(Some(_)) => "array",
            RespValue::Array(None) => "null array",
        }
    }
}

/// RESP protocol errors
#[derive(Debug, thiserror::Error)]
pub enum RespError {
    #[error("unexpected type byte 0x{0:02x}")]
    UnexpectedType(u8),

    #[error("invalid length or integer: {0:?}")]
    InvalidInteger(String),

    #[error("bulk string of {0} bytes exceeds limit")]
    BulkTooLarge(i64),

    #[error("missing CRLF terminator")]
    MissingTerminator,

    #[error("array nesting too deep")]
    TooDeep,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Tokio codec for RESP values
#[derive(Debug, Default, Clone, Copy)]
pub struct RespCodec;

impl Decoder for RespCodec {
    type Item = RespValue;
    type Error = RespError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<RespValue>, RespError> {
        match parse(&src[..], 0, 0)? {
            Some((value, consumed)) => {
                src.advance(consumed);
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }
}

impl Encoder<RespValue> for RespCodec {
    type Error = RespError;

    fn encode(&mut self, item: RespValue, dst: &mut BytesMut) -> Result<(), RespError> {
        write_value(&item, dst);
        Ok(())
    }
}

fn write_value(value: &RespValue, dst: &mut BytesMut) {
    match value {
        RespValue::Simple(s) => write_line(dst, b'+', s.as_bytes()),
        RespValue::Error(s) => write_line(dst, b'-', s.as_bytes()),
        RespValue::Integer(n) => write_line(dst, b':', n.to_string().as_bytes()),
        RespValue::Bulk(None) => dst.put_slice(b"$-1\r\n"),
        RespValue::Bulk(Some(b)) => {
            write_line(dst, b'$', b.len().to_string().as_bytes());
            dst.put_slice(b);
            dst.put_slice(b"\r\n");
        }
        RespValue::Array(None) => dst.put_slice(b"*-1\r\n"),
        RespValue::Array(Some(items)) => {
            write_line(dst, b'*', items.len().to_string().as_bytes());
            for item in items {
                write_value(item, dst);
            }
        }
    }
}

fn write_line(dst: &mut BytesMut, prefix: u8, body: &[u8]) {
    dst.reserve(body.len() + 3);
    dst.put_u8(prefix);
    dst.put_slice(body);
    dst.put_slice(b"\r\n");
}

/// Parse one value starting at `pos`, returning it with the position just
/// past it, or `None` if `buf` does not yet hold a complete value
fn parse(buf: &[u8], pos: usize, depth: usize) -> Result<Option<(RespValue, usize)>, RespError> {
    let Some(&type_byte) = buf.get(pos) else {
        return Ok(None);
    };
    let Some(line_end) = find_crlf(buf, pos + 1) else {
        return Ok(None);
    };
    let line = &buf[pos + 1..line_end];
    let next = line_end + 2;

    let value = match type_byte {
        b'+' => RespValue::Simple(String::from_utf8_lossy(line).into_owned()),
        b'-' => RespValue::Error(String::from_utf8_lossy(line).into_owned()),
        b':' => RespValue::Integer(parse_integer(line)?),
        b'$' => {
            let len = parse_integer(line)?;
            if len == -1 {
                return Ok(Some((RespValue::Bulk(None), next)));
            }
            if len < 0 {
                return Err(RespError::InvalidInteger(len.to_string()));
            }
            if len > MAX_BULK_LEN {
                return Err(RespError::BulkTooLarge(len));
            }
            let end = next + len as usize;
            if buf.len() < end + 2 {
                return Ok(None);
            }
            if &buf[end..end + 2] != b"\r\n" {
                return Err(RespError::MissingTerminator);
            }
            return Ok(Some((
                RespValue::Bulk(Some(Bytes::copy_from_slice(&buf[next..end]))),
                end + 2,
            )));
        }
        b'*' | b'>' => {
            let count = parse_integer(line)?;
            if count == -1 {
                return Ok(Some((RespValue::Array(None), next)));
            }
            if count < 0 {
                return Err(RespError::InvalidInteger(count.to_string()));
            }
            if depth >= MAX_DEPTH {
                return Err(RespError::TooDeep);
            }
            let mut items = Vec::with_capacity((count as usize).min(64));
            let mut cursor = next;
            for _ in 0..count {
                match parse(buf, cursor, depth + 1)? {
                    Some((item, after)) => {
                        items.push(item);
                        cursor = after;
                    }
                    None => return Ok(None),
                }
            }
            return Ok(Some((RespValue::Array(Some(items)), cursor)));
        }
        other => return Err(RespError::UnexpectedType(other)),
    };

    Ok(Some((value, next)))
}

fn find_crlf(buf: &[u8], from: usize) -> Option<usize> {
    buf.get(from..)?
        .windows(2)
        .position(|w| w == b"\r\n")
        .map(|i| from + i)
}

fn parse_integer(line: &[u8]) -> Result<i64, RespError> {
    std::str::from_utf8(line)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| RespError::InvalidInteger(String::from_utf8_lossy(line).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(input: &[u8]) -> Vec<RespValue> {
        let mut codec = RespCodec;
        let mut buf = BytesMut::from(input);
        let mut out = Vec::new();
        while let Some(v) = codec.decode(&mut buf).unwrap() {
            out.push(v);
        }
        out
    }

    fn bulk(s: &str) -> RespValue {
        RespValue::Bulk(Some(Bytes::copy_from_slice(s.as_bytes())))
    }

    #[test]
    fn test_encode_subscribe_command() {
        let mut buf = BytesMut::new();
        RespCodec
            .encode(RespValue::command(["SUBSCRIBE", "ES1"]), &mut buf)
            .unwrap();
        assert_eq!(&buf[..], b"*2\r\n$9\r\nSUBSCRIBE\r\n$3\r\nES1\r\n");
    }

    #[test]
    fn test_decode_subscribe_ack() {
        let values = decode_all(b"*3\r\n$9\r\nsubscribe\r\n$3\r\nES1\r\n:1\r\n");
        assert_eq!(
            values,
            vec![RespValue::Array(Some(vec![
                bulk("subscribe"),
                bulk("ES1"),
                RespValue::Integer(1)
            ]))]
        );
    }

    #[test]
    fn test_decode_message_with_semicolons() {
        let payload = "09:30:00;1;2;3;4;5;6;7";
        let wire = format!(
            "*3\r\n$7\r\nmessage\r\n$3\r\nES1\r\n${}\r\n{}\r\n",
            payload.len(),
            payload
        );
        let values = decode_all(wire.as_bytes());
        assert_eq!(
            values,
            vec![RespValue::Array(Some(vec![
                bulk("message"),
                bulk("ES1"),
                bulk(payload)
            ]))]
        );
    }

    #[test]
    fn test_partial_input_waits_for_more() {
        let mut codec = RespCodec;
        let mut buf = BytesMut::from(&b"*3\r\n$7\r\nmessage\r\n$3\r\nES"[..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
        // Nothing is consumed until the value is complete
        assert_eq!(buf.len(), 23);

        buf.extend_from_slice(b"1\r\n$1\r\nx\r\n");
        let value = codec.decode(&mut buf).unwrap().unwrap();
        assert!(matches!(value, RespValue::Array(Some(ref items)) if items.len() == 3));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_scalars_and_nulls() {
        let values = decode_all(b"+OK\r\n-ERR bad\r\n:-5\r\n$-1\r\n*-1\r\n$0\r\n\r\n");
        assert_eq!(
            values,
            vec![
                RespValue::Simple("OK".to_string()),
                RespValue::Error("ERR bad".to_string()),
                RespValue::Integer(-5),
                RespValue::Bulk(None),
                RespValue::Array(None),
                bulk(""),
            ]
        );
    }

    #[test]
    fn test_decode_push_frame_as_array() {
        let values = decode_all(b">2\r\n+a\r\n+b\r\n");
        assert_eq!(
            values,
            vec![RespValue::Array(Some(vec![
                RespValue::Simple("a".to_string()),
                RespValue::Simple("b".to_string())
            ]))]
        );
    }

    #[test]
    fn test_unknown_type_byte_is_error() {
        let mut buf = BytesMut::from(&b"?what\r\n"[..]);
        assert!(matches!(
            RespCodec.decode(&mut buf),
            Err(RespError::UnexpectedType(b'?'))
        ));
    }

    #[test]
    fn test_bulk_without_terminator_is_error() {
        let mut buf = BytesMut::from(&b"$3\r\nabcde\r\n"[..]);
        assert!(matches!(
            RespCodec.decode(&mut buf),
            Err(RespError::MissingTerminator)
        ));
    }

    #[test]
    fn test_oversized_bulk_is_error() {
        let mut buf = BytesMut::from(&b"$999999999999\r\n"[..]);
        assert!(matches!(
            RespCodec.decode(&mut buf),
            Err(RespError::BulkTooLarge(_))
        ));
    }

    #[test]
    fn test_bad_length_is_error() {
        let mut buf = BytesMut::from(&b"*x\r\n"[..]);
        assert!(matches!(
            RespCodec.decode(&mut buf),
            Err(RespError::InvalidInteger(_))
        ));
    }

    #[test]
    fn test_as_text() {
        assert_eq!(RespValue::Integer(3).as_text().as_deref(), Some("3"));
        assert_eq!(bulk("ES1").as_text().as_deref(), Some("ES1"));
        assert!(RespValue::Bulk(None).as_text().is_none());
        assert!(RespValue::Array(None).as_text().is_none());
    }
}
