use thiserror::Error;

/// Failure to build a tree from a ground set.
#[derive(Debug, Eq, PartialEq, Clone, Error)]
pub enum CreationError<T> {
    /// The ground set must contain at least one value.
    #[error("cannot build a PQ-tree over an empty ground set")]
    EmptyGroundSet,
    /// A ground-set value occurred more than once.
    #[error("duplicate ground-set value {0}")]
    DuplicateLeaf(T),
}

/// Reduction failure.
#[derive(Debug, Eq, PartialEq, Clone, Error)]
pub enum ReductionError<T> {
    /// An earlier non-safe reduction failed; the tree refuses further work.
    #[error("tree was invalidated by an earlier failed reduction")]
    TreeInvalid,
    /// The constraint cannot hold together with the previously applied ones.
    #[error("constraint is inconsistent with the tree")]
    InconsistentConstraint,
    /// The constraint mentions a value outside the ground set.
    #[error("value {0} has no leaf in the tree")]
    UnknownLeaf(T),
}
