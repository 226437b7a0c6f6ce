use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::SpellId;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed content JSON")]
    Parse(#[from] serde_json::Error),
    #[error("invalid scenario: {0}")]
    InvalidScenario(String),
    #[error("unknown action id `{0}`")]
    UnknownAction(String),
    #[error("unknown spell `{0}`")]
    UnknownSpell(SpellId),
}
