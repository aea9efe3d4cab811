use thiserror::Error;

pub type PresetResult<T> = Result<T, PresetError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PresetError {
    #[error("Unknown template translator '{name}' (available: {available})")]
    UnknownTemplate { name: String, available: String },

    #[error("Unknown format translator '{name}' (available: {available})")]
    UnknownFormat { name: String, available: String },
}
