use std::fmt;

use crate::commands::CommandError;
use crate::store::Snapshot;

/// Record separator terminating every response line.
static LF: &[u8; 1] = b"\n";

/// What a `GET` on an absent key answers. Absence is not an error.
pub const NULL: &str = "(nil)";

/// The outcome of a command, rendered as exactly one line on the wire.
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    /// `OK`
    Ok,
    /// A stored value, written verbatim.
    Value(String),
    /// The null indicator, see [`NULL`].
    Null,
    /// `1` or `0` for the outcome of a removal.
    Integer(i64),
    /// The whole store as an object literal.
    Object(Snapshot),
    /// One of the error codes: `MISSING_KEY`, `MISSING_ARG`, `FAILED`, `INVALID_COMMAND`.
    Error(CommandError),
}

impl Reply {
    pub fn serialize(&self) -> Vec<u8> {
        let line = match self {
            Reply::Ok => "OK".to_string(),
            Reply::Value(value) => value.clone(),
            Reply::Null => NULL.to_string(),
            Reply::Integer(i) => i.to_string(),
            Reply::Object(snapshot) => snapshot.to_string(),
            Reply::Error(err) => err.code().to_string(),
        };

        let mut bytes = Vec::with_capacity(line.len() + LF.len());
        bytes.extend_from_slice(line.as_bytes());
        bytes.extend_from_slice(LF);
        bytes
    }
}

impl From<Reply> for Vec<u8> {
    fn from(reply: Reply) -> Self {
        reply.serialize()
    }
}

impl From<CommandError> for Reply {
    fn from(err: CommandError) -> Self {
        Reply::Error(err)
    }
}

impl From<bool> for Reply {
    fn from(removed: bool) -> Self {
        Reply::Integer(i64::from(removed))
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Ok => write!(f, "OK"),
            Reply::Value(value) => write!(f, "{}", value),
            Reply::Null => write!(f, "{}", NULL),
            Reply::Integer(i) => write!(f, "{}", i),
            Reply::Object(snapshot) => write!(f, "<{} entries>", snapshot.len()),
            Reply::Error(err) => write!(f, "{}", err.code()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    #[test]
    fn serialize_ok() {
        assert_eq!(Reply::Ok.serialize(), b"OK\n");
    }

    #[test]
    fn serialize_value() {
        assert_eq!(Reply::Value("bar".to_string()).serialize(), b"bar\n");
    }

    #[test]
    fn serialize_null() {
        assert_eq!(Reply::Null.serialize(), b"(nil)\n");
    }

    #[test]
    fn serialize_removal_outcome() {
        assert_eq!(Reply::from(true).serialize(), b"1\n");
        assert_eq!(Reply::from(false).serialize(), b"0\n");
    }

    #[test]
    fn serialize_errors() {
        let cases = [
            (CommandError::MissingKey, &b"MISSING_KEY\n"[..]),
            (CommandError::MissingArgument, &b"MISSING_ARG\n"[..]),
            (CommandError::Failed, &b"FAILED\n"[..]),
            (
                CommandError::InvalidCommand {
                    command: "FOO".to_string(),
                },
                &b"INVALID_COMMAND\n"[..],
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(Reply::from(err).serialize(), expected);
        }
    }

    #[test]
    fn serialize_object() {
        let store = Store::default();
        assert_eq!(
            Reply::Object(store.lock().snapshot().unwrap()).serialize(),
            b"{}\n"
        );

        store.lock().set("a", "1");
        assert_eq!(
            Reply::Object(store.lock().snapshot().unwrap()).serialize(),
            b"{\"a\":\"1\"}\n"
        );
    }
}
