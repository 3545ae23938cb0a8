use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Outcome of `save`, `update` and `delete`.
///
/// `Failed` means nothing was persisted; the cause is only logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationResult {
    Success,
    Failed,
}

impl OperationResult {
    /// `Success` iff at least one row was affected.
    pub fn from_affected(affected: usize) -> Self {
        if affected > 0 {
            Self::Success
        } else {
            Self::Failed
        }
    }

    pub fn is_success(self) -> bool {
        self == Self::Success
    }

    pub fn is_failed(self) -> bool {
        self == Self::Failed
    }
}

impl Display for OperationResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::OperationResult;

    #[test]
    fn affected_rows_decide_outcome() {
        assert_eq!(OperationResult::from_affected(0), OperationResult::Failed);
        assert_eq!(OperationResult::from_affected(1), OperationResult::Success);
        assert!(OperationResult::from_affected(3).is_success());
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&OperationResult::Failed).unwrap();
        assert_eq!(json, "\"failed\"");
    }
}
