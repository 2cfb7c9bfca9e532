pub mod del;
pub mod executable;
pub mod get;
pub mod getall;
pub mod invalid;
pub mod set;

use std::str::FromStr;
use std::vec;
use strum_macros::EnumString;
use thiserror::Error as ThisError;

use crate::commands::executable::Executable;
use crate::reply::Reply;
use crate::store::Store;

use del::Del;
use get::Get;
use getall::GetAll;
use invalid::Invalid;
use set::Set;

/// Command keywords, matched case-insensitively against the first token of a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString)]
#[strum(ascii_case_insensitive, serialize_all = "UPPERCASE")]
pub enum Keyword {
    Set,
    Get,
    Del,
    GetAll,
}

#[derive(Debug, PartialEq)]
pub enum Command {
    Set(Set),
    Get(Get),
    Del(Del),
    GetAll(GetAll),
    Invalid(Invalid),
}

impl Executable for Command {
    fn exec(self, store: &Store) -> Result<Reply, CommandError> {
        match self {
            Command::Set(cmd) => cmd.exec(store),
            Command::Get(cmd) => cmd.exec(store),
            Command::Del(cmd) => cmd.exec(store),
            Command::GetAll(cmd) => cmd.exec(store),
            Command::Invalid(cmd) => cmd.exec(store),
        }
    }
}

impl From<&str> for Command {
    /// Parses one line of client input. Parsing never fails: anything that does not start with a
    /// known keyword becomes [`Command::Invalid`], and missing arguments are left for the command
    /// to report when executed.
    fn from(line: &str) -> Self {
        let line = line
            .trim_start()
            .trim_end_matches(|c| c == '\r' || c == '\n');

        // Runs of spaces separate tokens the same way a single space does.
        let parts: Vec<&str> = line.split(' ').filter(|part| !part.is_empty()).collect();
        let parser = &mut CommandParser {
            parts: parts.into_iter(),
        };

        let command_name = parser.next_string().unwrap_or_default();

        match Keyword::from_str(&command_name) {
            Ok(Keyword::Set) => Command::Set(Set::from(parser)),
            Ok(Keyword::Get) => Command::Get(Get::from(parser)),
            Ok(Keyword::Del) => Command::Del(Del::from(parser)),
            Ok(Keyword::GetAll) => Command::GetAll(GetAll::from(parser)),
            Err(_) => Command::Invalid(Invalid {
                command: command_name,
            }),
        }
    }
}

pub struct CommandParser<'a> {
    parts: vec::IntoIter<&'a str>,
}

impl<'a> CommandParser<'a> {
    /// Next token, or `None` once the line is exhausted.
    pub fn next_string(&mut self) -> Option<String> {
        self.parts.next().map(str::to_string)
    }
}

#[derive(Clone, Debug, ThisError, PartialEq)]
pub enum CommandError {
    #[error("protocol error; missing key")]
    MissingKey,
    #[error("protocol error; missing value argument")]
    MissingArgument,
    #[error("store error; could not allocate memory")]
    Failed,
    #[error("protocol error; unknown command {command:?}")]
    InvalidCommand { command: String },
}

impl CommandError {
    /// The code sent to the client in place of a result.
    pub fn code(&self) -> &'static str {
        match self {
            CommandError::MissingKey => "MISSING_KEY",
            CommandError::MissingArgument => "MISSING_ARG",
            CommandError::Failed => "FAILED",
            CommandError::InvalidCommand { .. } => "INVALID_COMMAND",
        }
    }
}
