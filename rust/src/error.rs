//! Error handling and result types for BPlusTree operations.
//!
//! Deleting an absent entry is an ordinary outcome (`KeyNotFound`). Every other
//! variant signals either bad construction input or a broken structural
//! invariant, which indicates a bug rather than a recoverable condition.

use thiserror::Error;

use crate::types::NodeId;

/// Error type for B+ tree operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BPlusTreeError {
    /// The requested key (or key/value pair) is not in the tree.
    #[error("key not found in tree")]
    KeyNotFound,
    /// The order parameter is below the supported minimum.
    #[error("invalid fanout: {0}")]
    InvalidFanout(String),
    /// A structural invariant does not hold.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
    /// An arena slot was missing or misused.
    #[error("arena error: {0}")]
    ArenaError(String),
    /// The arena could not hand out another node id.
    #[error("allocation error: {0}")]
    AllocationError(String),
}

impl BPlusTreeError {
    /// Create an InvalidFanout error with context
    pub fn invalid_fanout(fanout: usize, min_required: usize) -> Self {
        Self::InvalidFanout(format!(
            "fanout {} is invalid (minimum required: {})",
            fanout, min_required
        ))
    }

    /// Create an InvariantViolation error with context
    pub fn invariant(context: &str, details: &str) -> Self {
        Self::InvariantViolation(format!("{}: {}", context, details))
    }

    /// A node id that the tree structure references is not allocated.
    pub fn missing_node(kind: &str, id: NodeId) -> Self {
        Self::InvariantViolation(format!("{} node {} is not allocated", kind, id))
    }

    /// Create an ArenaError with context
    pub fn arena_error(operation: &str, details: &str) -> Self {
        Self::ArenaError(format!("{} failed: {}", operation, details))
    }

    /// Create an AllocationError with context
    pub fn allocation_error(resource: &str, reason: &str) -> Self {
        Self::AllocationError(format!("failed to allocate {}: {}", resource, reason))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound)
    }

    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::InvariantViolation(_))
    }
}

/// Internal result type for tree operations
pub(crate) type TreeResult<T> = Result<T, BPlusTreeError>;

/// Public result type for tree operations that may fail
pub type BTreeResult<T> = Result<T, BPlusTreeError>;

/// Result type for tree modification operations
pub type ModifyResult<T> = Result<T, BPlusTreeError>;

/// Result type for tree construction and copying
pub type InitResult<T> = Result<T, BPlusTreeError>;

/// Result extension trait for attaching operation context to errors.
pub trait BTreeResultExt<T> {
    /// Prefix the error message with `context`.
    fn with_context(self, context: &str) -> BTreeResult<T>;

    /// Prefix the error message with the name of the failing operation.
    fn with_operation(self, operation: &str) -> BTreeResult<T>;
}

impl<T> BTreeResultExt<T> for Result<T, BPlusTreeError> {
    fn with_context(self, context: &str) -> BTreeResult<T> {
        self.map_err(|e| match e {
            BPlusTreeError::KeyNotFound => BPlusTreeError::KeyNotFound,
            BPlusTreeError::InvalidFanout(msg) => {
                BPlusTreeError::InvalidFanout(format!("{}: {}", context, msg))
            }
            BPlusTreeError::InvariantViolation(msg) => BPlusTreeError::invariant(context, &msg),
            BPlusTreeError::ArenaError(msg) => BPlusTreeError::arena_error(context, &msg),
            BPlusTreeError::AllocationError(msg) => {
                BPlusTreeError::AllocationError(format!("{}: {}", context, msg))
            }
        })
    }

    fn with_operation(self, operation: &str) -> BTreeResult<T> {
        self.with_context(&format!("operation '{}'", operation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(BPlusTreeError::KeyNotFound.to_string(), "key not found in tree");
        assert_eq!(
            BPlusTreeError::invalid_fanout(2, 3).to_string(),
            "invalid fanout: fanout 2 is invalid (minimum required: 3)"
        );
        assert_eq!(
            BPlusTreeError::missing_node("leaf", 7).to_string(),
            "invariant violation: leaf node 7 is not allocated"
        );
    }

    #[test]
    fn test_with_operation_keeps_not_found() {
        let result: BTreeResult<()> = Err(BPlusTreeError::KeyNotFound);
        assert_eq!(result.with_operation("delete"), Err(BPlusTreeError::KeyNotFound));
    }

    #[test]
    fn test_with_operation_prefixes_invariant_errors() {
        let result: BTreeResult<()> = Err(BPlusTreeError::invariant("find_parent", "no parent"));
        let err = result.with_operation("insert").unwrap_err();
        assert!(err.is_invariant_violation());
        assert_eq!(
            err.to_string(),
            "invariant violation: operation 'insert': find_parent: no parent"
        );
    }
}
