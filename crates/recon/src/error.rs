use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// Config validation error (too few sources, bad weight, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),

    /// A source file could not be opened or read.
    #[error("source '{source_id}': cannot read {path}: {message}")]
    SourceUnreadable {
        source_id: String,
        path: String,
        message: String,
    },

    /// Mapped column missing from a source's header row.
    #[error("source '{source_id}': missing column '{column}'")]
    MissingColumn { source_id: String, column: String },

    /// The header row itself could not be parsed.
    #[error("source '{source_id}': cannot read header: {message}")]
    Header { source_id: String, message: String },

    /// A referenced source has no loaded table.
    #[error("unknown source: {0}")]
    UnknownSource(String),

    /// The sources present for one player carry no positive weight.
    #[error("player '{player}': weights for sources [{sources}] sum to zero")]
    ZeroWeight { player: String, sources: String },

    /// Broken engine invariant.
    #[error("internal error: {0}")]
    Internal(String),

    /// Output CSV serialization error.
    #[error("output error: {0}")]
    Output(String),
}
