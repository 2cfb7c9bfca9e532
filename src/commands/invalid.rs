use crate::commands::executable::Executable;
use crate::commands::CommandError;
use crate::reply::Reply;
use crate::store::Store;

/// A line whose first token is not a known keyword. Holds that token for diagnostics.
#[derive(Debug, PartialEq)]
pub struct Invalid {
    pub command: String,
}

impl Executable for Invalid {
    fn exec(self, _store: &Store) -> Result<Reply, CommandError> {
        Err(CommandError::InvalidCommand {
            command: self.command,
        })
    }
}
