use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for repository reads and key handling.
///
/// Writes never produce this type; they report `OperationResult::Failed`.
#[derive(Debug)]
pub enum RepoError {
    /// A key whose runtime type or kind the entity cannot be addressed by.
    InvalidKeyType {
        expected: &'static str,
        found: String,
    },
    Store(StoreError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKeyType { expected, found } => {
                write!(f, "unsupported key type `{found}`; expected {expected}")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidKeyType { .. } => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}
