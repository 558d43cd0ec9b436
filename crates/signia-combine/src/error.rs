use std::fmt;

use signia_merge::MergeError;

/// Reasons a set of arguments cannot be bound to a signature.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    #[error("takes {expected} positional arguments but {given} were given")]
    TooManyPositional { expected: usize, given: usize },

    #[error("positional-only argument '{0}' passed as keyword")]
    PositionalOnlyAsKeyword(String),

    #[error("multiple values for argument '{0}'")]
    MultipleValues(String),

    #[error("unexpected keyword argument '{0}'")]
    UnexpectedKeyword(String),

    #[error("missing a required argument: '{0}'")]
    MissingArgument(String),

    #[error("variadic argument '{name}' must be {expected}")]
    InvalidVariadic { name: String, expected: &'static str },
}

/// The way two fused sources' parameters collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    /// Both sources declare the name and collisions are not allowed.
    Name,
    /// Both declare the name with different defaults.
    Default,
    /// Both declare the name with different annotations.
    Annotation,
}

impl fmt::Display for Collision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Name => "parameter name collision",
            Self::Default => "default mismatch",
            Self::Annotation => "annotation mismatch",
        })
    }
}

/// Errors that can occur while building or invoking callables.
#[derive(Debug, thiserror::Error)]
pub enum CombineError {
    /// Arguments could not be bound for the named callable.
    #[error("cannot call '{callable}': {source}")]
    Binding {
        callable: String,
        #[source]
        source: BindingError,
    },

    /// A bound argument was absent or had an unexpected shape.
    #[error("argument '{name}': {reason}")]
    Argument { name: String, reason: String },

    /// Building the merged signature failed.
    #[error("merge error: {0}")]
    Merge(#[from] MergeError),

    /// Two fused sources declare incompatible parameters.
    #[error("{collision} for '{parameter}' between '{left}' and '{right}'")]
    Collision {
        parameter: String,
        collision: Collision,
        left: String,
        right: String,
    },

    /// A parameter declared by a fused wrapper cannot be published.
    #[error("invalid wrapper parameter '{parameter}': {reason}")]
    InvalidExtra { parameter: String, reason: String },

    /// A callable body reported a failure.
    #[error("call to '{callable}' failed: {message}")]
    Call { callable: String, message: String },
}

impl CombineError {
    /// Create a binding error for a callable.
    pub fn binding(callable: impl Into<String>, source: BindingError) -> Self {
        Self::Binding {
            callable: callable.into(),
            source,
        }
    }

    /// Create a call error with a callable name and message.
    pub fn call(callable: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Call {
            callable: callable.into(),
            message: message.into(),
        }
    }

    /// The binding failure, if this is a [`CombineError::Binding`].
    pub fn binding_error(&self) -> Option<&BindingError> {
        match self {
            Self::Binding { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl PartialEq for CombineError {
    fn eq(&self, other: &Self) -> bool {
        // Compare by display representation for test convenience.
        fmt::format(format_args!("{self}")) == fmt::format(format_args!("{other}"))
    }
}

/// Convenience alias for combinator results.
pub type CombineResult<T> = Result<T, CombineError>;
