use crate::error::ClientError;

/// The loading/error/data triple as a proper sum type: a query is never in
/// two of these states at once.
#[derive(Debug)]
pub enum QueryState<T> {
    Pending,
    Failed(ClientError),
    Ready(T),
}

impl<T> QueryState<T> {
    pub fn from_result(result: Result<T, ClientError>) -> Self {
        match result {
            Ok(data) => QueryState::Ready(data),
            Err(e) => QueryState::Failed(e),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, QueryState::Pending)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            QueryState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ClientError> {
        match self {
            QueryState::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> QueryState<U> {
        match self {
            QueryState::Pending => QueryState::Pending,
            QueryState::Failed(e) => QueryState::Failed(e),
            QueryState::Ready(data) => QueryState::Ready(f(data)),
        }
    }

    /// Gates a screen on two concurrently-issued queries. Resolution order
    /// of the underlying requests does not matter: a failure wins over
    /// pending, pending wins over ready, and the pair is ready only when
    /// both are.
    pub fn zip<U>(self, other: QueryState<U>) -> QueryState<(T, U)> {
        match (self, other) {
            (QueryState::Failed(e), _) => QueryState::Failed(e),
            (_, QueryState::Failed(e)) => QueryState::Failed(e),
            (QueryState::Ready(a), QueryState::Ready(b)) => QueryState::Ready((a, b)),
            _ => QueryState::Pending,
        }
    }
}

impl<T> From<Result<T, ClientError>> for QueryState<T> {
    fn from(result: Result<T, ClientError>) -> Self {
        QueryState::from_result(result)
    }
}
