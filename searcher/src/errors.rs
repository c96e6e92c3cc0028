use thiserror::Error;

/// Error produced when a search operation is misused.
///
/// Missing vertices and unreachable goals are not errors: those runs
/// finish normally with no entry in the solution registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Cost arity mismatch: expected {expected}, found {found}")]
    ArityMismatch { expected: usize, found: usize },

    #[error("Subtracting {subtrahend} from {minuend} would produce a negative cost")]
    NegativeCost { minuend: String, subtrahend: String },

    #[error("Vertex {0} is already queued, use decrease_key instead")]
    VertexQueued(String),

    #[error("Vertex {0} is not queued")]
    VertexNotQueued(String),

    #[error("New cost {new} for vertex {vertex} does not improve on {old}")]
    NotImproving {
        vertex: String,
        old: String,
        new: String,
    },

    #[error("{algorithm} only supports costs with {expected} components, graph has {found}")]
    UnsupportedArity {
        algorithm: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Broken predecessor chain at {0}")]
    Backtrack(String),

    #[error("Invalid graph on line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

/// Result when a search method might fail.
pub type Result<T> = std::result::Result<T, SearchError>;
