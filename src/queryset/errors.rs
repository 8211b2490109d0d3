//! # QuerySet Errors

use thiserror::Error;

use crate::predicate::PredicateError;
use crate::store::StoreError;

/// Result type for queryset operations
pub type QueryResult<T> = Result<T, QuerySetError>;

/// QuerySet errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuerySetError {
    /// Lookup could not be translated
    #[error(transparent)]
    Predicate(#[from] PredicateError),

    /// Call shape is wrong (e.g. not exactly one filter pair)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Execution attempted without a partition
    #[error("Hash key must be set")]
    HashKeyRequired,

    /// `get` matched nothing
    #[error("Object does not exist")]
    ObjectDoesNotExist,

    /// `get` matched more than one item
    #[error("Multiple objects returned: {0}")]
    MultipleObjectsReturned(usize),

    /// Some items were left unprocessed by the batch delete
    #[error("Delete incomplete: {deleted} deleted, {unprocessed} unprocessed")]
    IncompleteDelete { deleted: usize, unprocessed: usize },

    /// A pre-filter hook rejected the lookup
    #[error("Filter rejected: {0}")]
    FilterRejected(String),

    /// Store call failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl QuerySetError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            QuerySetError::Predicate(e) => e.code(),
            QuerySetError::InvalidArgument(_) => "DYNAQ_INVALID_ARGUMENT",
            QuerySetError::HashKeyRequired => "DYNAQ_HASH_KEY_REQUIRED",
            QuerySetError::ObjectDoesNotExist => "DYNAQ_OBJECT_DOES_NOT_EXIST",
            QuerySetError::MultipleObjectsReturned(_) => "DYNAQ_MULTIPLE_OBJECTS_RETURNED",
            QuerySetError::IncompleteDelete { .. } => "DYNAQ_INCOMPLETE_DELETE",
            QuerySetError::FilterRejected(_) => "DYNAQ_FILTER_REJECTED",
            QuerySetError::Store(e) => e.code(),
        }
    }
}
