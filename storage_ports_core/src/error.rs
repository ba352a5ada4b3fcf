use thiserror::Error;

/// A write from the application could not be applied.
///
/// No commit notification is sent for a failed write.
#[derive(Debug, Error)]
pub enum WriteError<S: std::error::Error + 'static, E: std::error::Error + 'static> {
    #[error("Cannot encode value for {key:?}: {source}")]
    Encode {
        key: String,
        #[source]
        source: E,
    },

    #[error("Cannot write {key:?} to storage: {source}")]
    Storage {
        key: String,
        #[source]
        source: S,
    },
}

impl<S: std::error::Error + 'static, E: std::error::Error + 'static> WriteError<S, E> {
    pub fn key(&self) -> &str {
        match self {
            WriteError::Encode { key, .. } => key,
            WriteError::Storage { key, .. } => key,
        }
    }
}
