use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::reply::Reply;
use crate::store::Store;

/// Set `key` to hold `value`, replacing any previous value.
///
/// The value is a single token: the protocol has no quoting, so tokens after the value are
/// ignored.
#[derive(Debug, PartialEq)]
pub struct Set {
    pub key: Option<String>,
    pub value: Option<String>,
}

impl Executable for Set {
    fn exec(self, store: &Store) -> Result<Reply, CommandError> {
        let key = self.key.ok_or(CommandError::MissingKey)?;
        let value = self.value.ok_or(CommandError::MissingArgument)?;

        let mut store = store.lock();
        if store.set(&key, &value) {
            Ok(Reply::Ok)
        } else {
            Err(CommandError::Failed)
        }
    }
}

impl From<&mut CommandParser<'_>> for Set {
    fn from(parser: &mut CommandParser<'_>) -> Self {
        let key = parser.next_string();
        let value = parser.next_string();

        Self { key, value }
    }
}
