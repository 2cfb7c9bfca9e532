use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::reply::Reply;
use crate::store::Store;

/// Get the value of `key`. If the key does not exist the null indicator is returned.
#[derive(Debug, PartialEq)]
pub struct Get {
    pub key: Option<String>,
}

impl Executable for Get {
    fn exec(self, store: &Store) -> Result<Reply, CommandError> {
        let key = self.key.ok_or(CommandError::MissingKey)?;
        let value = store.lock().get(&key);

        match value {
            Some(value) => Ok(Reply::Value(value)),
            None => Ok(Reply::Null),
        }
    }
}

impl From<&mut CommandParser<'_>> for Get {
    fn from(parser: &mut CommandParser<'_>) -> Self {
        let key = parser.next_string();
        Self { key }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;

    #[test]
    fn existing_key() {
        let cmd = Command::from("GET key1");

        assert_eq!(
            cmd,
            Command::Get(Get {
                key: Some(String::from("key1"))
            })
        );

        let store = Store::default();
        store.lock().set("key1", "1");

        let result = cmd.exec(&store).unwrap();

        assert_eq!(result, Reply::Value(String::from("1")));
    }

    #[test]
    fn absent_key() {
        let store = Store::default();

        let result = Command::from("GET key1").exec(&store).unwrap();

        assert_eq!(result, Reply::Null);
    }

    #[test]
    fn missing_key() {
        let store = Store::default();

        let err = Command::from("GET").exec(&store).unwrap_err();

        assert_eq!(err, CommandError::MissingKey);
    }
}
