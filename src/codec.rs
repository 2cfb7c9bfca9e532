use bytes::{BufMut, BytesMut};
use std::io;
use thiserror::Error as ThisError;
use tokio_util::codec::{Decoder, Encoder};

use crate::reply::Reply;

/// Longest accepted request line, excluding its terminator.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 1024;

#[derive(Debug, ThisError)]
pub enum CodecError {
    #[error("line exceeds the limit of {limit} bytes")]
    LineTooLong { limit: usize },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Splits the incoming byte stream into newline-terminated lines and writes replies back.
///
/// Bytes are buffered across reads, so a line split over several reads is reassembled and
/// several lines arriving in one read are yielded one at a time, in order.
#[derive(Debug, Clone)]
pub struct LineCodec {
    max_length: usize,
    // Offset up to which the buffer has already been searched for a newline.
    next_index: usize,
}

impl LineCodec {
    pub fn new(max_length: usize) -> LineCodec {
        LineCodec {
            max_length,
            next_index: 0,
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_LENGTH)
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let newline = src[self.next_index..]
            .iter()
            .position(|byte| *byte == b'\n')
            .map(|offset| self.next_index + offset);

        let Some(end) = newline else {
            // A pending `\r` does not count towards the limit.
            if src.len() > self.max_length.saturating_add(1) {
                return Err(CodecError::LineTooLong {
                    limit: self.max_length,
                });
            }
            // Not enough data to form a line yet.
            self.next_index = src.len();
            return Ok(None);
        };

        self.next_index = 0;
        let line = src.split_to(end + 1);
        let line = without_terminator(&line);

        if line.len() > self.max_length {
            return Err(CodecError::LineTooLong {
                limit: self.max_length,
            });
        }

        Ok(Some(String::from_utf8_lossy(line).into_owned()))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }

        if src.is_empty() {
            return Ok(None);
        }

        // The peer closed after an unterminated line: it still counts as a command.
        self.next_index = 0;
        let line = without_terminator(src);
        if line.len() > self.max_length {
            return Err(CodecError::LineTooLong {
                limit: self.max_length,
            });
        }

        let line = String::from_utf8_lossy(line).into_owned();
        src.clear();
        Ok(Some(line))
    }
}

impl Encoder<Reply> for LineCodec {
    type Error = CodecError;

    fn encode(&mut self, reply: Reply, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let bytes: Vec<u8> = reply.into();
        dst.reserve(bytes.len());
        dst.put_slice(&bytes);
        Ok(())
    }
}

fn without_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_single_line() {
        let mut codec = LineCodec::default();
        let mut buf = BytesMut::from("GET foo\n");

        assert_eq!(codec.decode(&mut buf).unwrap(), Some("GET foo".to_string()));
        assert!(buf.is_empty());
    }

    #[test]
    fn decode_strips_carriage_return() {
        let mut codec = LineCodec::default();
        let mut buf = BytesMut::from("GET foo\r\n");

        assert_eq!(codec.decode(&mut buf).unwrap(), Some("GET foo".to_string()));
    }

    #[test]
    fn decode_partial_line() {
        let mut codec = LineCodec::default();
        let mut buf = BytesMut::from("SET fo");

        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"o bar\n");

        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some("SET foo bar".to_string())
        );
    }

    #[test]
    fn decode_multiple_lines_in_one_read() {
        let mut codec = LineCodec::default();
        let mut buf = BytesMut::from("SET a 1\nGET a\nGETA");

        assert_eq!(codec.decode(&mut buf).unwrap(), Some("SET a 1".to_string()));
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("GET a".to_string()));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"LL\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("GETALL".to_string()));
    }

    #[test]
    fn decode_empty_line() {
        let mut codec = LineCodec::default();
        let mut buf = BytesMut::from("\n");

        assert_eq!(codec.decode(&mut buf).unwrap(), Some(String::new()));
    }

    #[test]
    fn decode_line_too_long() {
        let mut codec = LineCodec::new(8);
        let mut buf = BytesMut::from("SET key value");

        let err = codec.decode(&mut buf).unwrap_err();

        assert!(matches!(err, CodecError::LineTooLong { limit: 8 }));
    }

    #[test]
    fn decode_terminated_line_too_long() {
        let mut codec = LineCodec::new(8);
        let mut buf = BytesMut::from("SET key value\n");

        assert!(codec.decode(&mut buf).is_err());
    }

    #[test]
    fn decode_eof_with_unterminated_line() {
        let mut codec = LineCodec::default();
        let mut buf = BytesMut::from("GET a\nGETALL");

        assert_eq!(codec.decode_eof(&mut buf).unwrap(), Some("GET a".to_string()));
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), Some("GETALL".to_string()));
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), None);
    }

    #[test]
    fn decode_eof_unterminated_line_too_long() {
        let mut codec = LineCodec::new(8);
        let mut buf = BytesMut::from("123456789");

        let err = codec.decode_eof(&mut buf).unwrap_err();

        assert!(matches!(err, CodecError::LineTooLong { limit: 8 }));
    }

    #[test]
    fn decode_eof_unterminated_line_at_the_limit() {
        let mut codec = LineCodec::new(8);
        let mut buf = BytesMut::from("12345678\r");

        assert_eq!(
            codec.decode_eof(&mut buf).unwrap(),
            Some("12345678".to_string())
        );
    }

    #[test]
    fn encode_reply() {
        let mut codec = LineCodec::default();
        let mut buf = BytesMut::new();

        codec.encode(Reply::Ok, &mut buf).unwrap();
        codec.encode(Reply::Integer(1), &mut buf).unwrap();

        assert_eq!(&buf[..], b"OK\n1\n");
    }
}
