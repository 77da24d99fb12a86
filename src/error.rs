// Copyright 2023 Remi Bernotavicius

use diesel::result::DatabaseErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("failed to connect to database: {0}")]
    Connection(#[from] diesel::ConnectionError),
    #[error("failed to run migrations: {0}")]
    Migration(Box<dyn std::error::Error + Send + Sync + 'static>),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decode error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
}

impl Error {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    fn database_error_kind(&self) -> Option<&DatabaseErrorKind> {
        match self {
            Self::Database(diesel::result::Error::DatabaseError(kind, _)) => Some(kind),
            _ => None,
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self.database_error_kind(),
            Some(DatabaseErrorKind::UniqueViolation)
        )
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
