//! Error types for dependency injection

use thiserror::Error;

/// Errors that can occur while resolving an object graph.
///
/// Every variant describes a static configuration defect; none of them is
/// worth retrying.
#[derive(Error, Debug, Clone)]
pub enum DiError {
    /// The implementation type has neither an injectable nor a
    /// zero-parameter constructor
    #[error("No suitable constructor found for {type_name}")]
    NoSuitableConstructor { type_name: &'static str },

    /// A type transitively requires itself
    #[error("Cyclic dependency detected while resolving {type_name}: {path}")]
    CyclicDependency {
        type_name: &'static str,
        path: String,
    },

    /// No contract binding and no usable zero-parameter constructor
    #[error("Unknown type: {type_name}")]
    UnknownType { type_name: &'static str },

    /// A parameter asked for a name nobody registered
    #[error("Parameter named \"{name}\" was requested but not provided")]
    MissingNamedBinding { name: String },

    /// A parameter asked for a qualifier nobody registered
    #[error("No binding available for qualifier {qualifier}")]
    MissingQualifierBinding { qualifier: &'static str },

    /// A named or qualified binding produced a value of the wrong type
    ///
    /// A concrete value bound for a trait-object parameter only passes once
    /// its type is declared with the upcast.
    #[error(
        "Incompatible type was provided! Requested type: {requested}, {binding}, provided type: {provided}"
    )]
    IncompatibleBinding {
        requested: &'static str,
        binding: String,
        provided: &'static str,
    },

    /// A constructor failed to produce its instance
    #[error("Failed to create {type_name}: {reason}")]
    CreationFailed {
        type_name: &'static str,
        reason: String,
    },

    /// A provider was used after its container was dropped
    #[error("Container has been dropped")]
    ContainerDropped,

    /// Internal error
    #[error("Internal DI error: {0}")]
    Internal(String),
}

impl DiError {
    /// Create a CreationFailed error for `T`
    #[inline]
    pub fn creation_failed<T: ?Sized + 'static>(reason: impl Into<String>) -> Self {
        Self::CreationFailed {
            type_name: std::any::type_name::<T>(),
            reason: reason.into(),
        }
    }

    /// Create an UnknownType error for `T`
    #[inline]
    pub fn unknown<T: ?Sized + 'static>() -> Self {
        Self::UnknownType {
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Whether this error reports a cycle in the object graph.
    #[inline]
    pub fn is_cyclic(&self) -> bool {
        matches!(self, Self::CyclicDependency { .. })
    }
}

/// Result type alias for DI operations
pub type Result<T> = std::result::Result<T, DiError>;
