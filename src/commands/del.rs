use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::reply::Reply;
use crate::store::Store;

/// Remove `key`. Answers `1` when a binding was removed and `0` when there was none.
#[derive(Debug, PartialEq)]
pub struct Del {
    pub key: Option<String>,
}

impl Executable for Del {
    fn exec(self, store: &Store) -> Result<Reply, CommandError> {
        let key = self.key.ok_or(CommandError::MissingKey)?;
        let removed = store.lock().remove(&key);
        Ok(Reply::from(removed))
    }
}

impl From<&mut CommandParser<'_>> for Del {
    fn from(parser: &mut CommandParser<'_>) -> Self {
        let key = parser.next_string();
        Self { key }
    }
}
