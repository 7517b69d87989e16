#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("platform name must not be empty")]
    EmptyPlatform,
    #[error("new category name must not be empty")]
    EmptyCategory,
    #[error("unknown category `{requested}` (available: {available})")]
    UnknownCategory { requested: String, available: String },
    #[error("category `{requested}` matches several classes: {matches}")]
    AmbiguousCategory { requested: String, matches: String },
    #[error("invalid config: {0}")]
    Config(serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
