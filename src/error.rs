use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("no region: pass explicit start/end positions or select some text")]
    NoRegion,

    #[error("position {position} is outside the buffer (length {len})")]
    OutOfBounds { position: usize, len: usize },

    #[error("marker {0} is not tracked by this buffer")]
    StaleMarker(u64),

    #[error("invalid replacement table: {0}")]
    InvalidTable(String),

    #[error("prompt failed: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T, E = ConvertError> = std::result::Result<T, E>;
