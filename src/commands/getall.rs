use tracing::warn;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::reply::Reply;
use crate::store::Store;

/// Return every binding in the store as a single object literal. An empty store answers `{}`.
#[derive(Debug, PartialEq)]
pub struct GetAll;

impl Executable for GetAll {
    fn exec(self, store: &Store) -> Result<Reply, CommandError> {
        let snapshot = store.lock().snapshot().map_err(|err| {
            warn!("Failed to snapshot the store: {}", err);
            CommandError::Failed
        })?;

        Ok(Reply::Object(snapshot))
    }
}

impl From<&mut CommandParser<'_>> for GetAll {
    fn from(_parser: &mut CommandParser<'_>) -> Self {
        Self
    }
}
