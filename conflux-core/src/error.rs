// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Error types for the Conflux shared-stream library.
//!
//! A shared pipeline can fail in a small number of well-defined ways; this
//! module captures them in a single root [`ConfluxError`] type so that every
//! subscriber, and every synchronous read, observes the same failure.
//!
//! # Examples
//!
//! ```
//! use conflux_core::{ConfluxError, Result};
//!
//! fn process_data() -> Result<()> {
//!     Err(ConfluxError::source_error("upstream closed the connection"))
//! }
//! ```

/// Root error type for all Conflux operations.
///
/// A pipeline error is always fatal to its pipeline entry: the error is
/// forwarded to every attached subscriber and to any in-flight synchronous
/// wait, and recovery happens only by rebuilding the entry from its factory.
#[derive(Debug, thiserror::Error)]
pub enum ConfluxError {
    /// The upstream source failed.
    ///
    /// This is the general failure mode for the wrapped data source. It is
    /// forwarded once to every subscriber and cached briefly for synchronous
    /// readers.
    #[error("Source error: {context}")]
    SourceError {
        /// Description of what went wrong upstream
        context: String,
    },

    /// Custom error from user code
    ///
    /// This wraps errors produced by user-provided factories and callbacks,
    /// allowing them to be propagated through the Conflux error system.
    #[error("User error: {0}")]
    UserError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The upstream completed without ever emitting a value.
    ///
    /// A synchronous reader waiting on such a pipeline would otherwise wait
    /// forever, so never-emitted completion is surfaced as a failure.
    #[error("Source completed without emitting a value")]
    EmptyCompletion,

    /// A synchronous read was attempted against a pipeline with no live or
    /// pending subscription and no cached value or error.
    ///
    /// This is a programming-contract violation, not a recoverable runtime
    /// condition: readers must hold (or be preceded by) a subscription.
    #[error("Missing subscription")]
    MissingSubscription,

    /// Multiple errors occurred
    ///
    /// When driving a subscription without an error callback, failures are
    /// collected and aggregated into this variant.
    #[error("Multiple errors occurred: {count} errors")]
    MultipleErrors {
        /// Number of errors that occurred
        count: usize,
        /// The individual errors
        errors: Vec<ConfluxError>,
    },
}

impl ConfluxError {
    /// Create a source error with the given context
    pub fn source_error(context: impl Into<String>) -> Self {
        Self::SourceError {
            context: context.into(),
        }
    }

    /// Wrap a user error
    pub fn user_error(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::UserError(Box::new(error))
    }

    /// Aggregate multiple user errors into a `MultipleErrors` variant
    ///
    /// # Examples
    ///
    /// ```
    /// use conflux_core::ConfluxError;
    ///
    /// #[derive(Debug, thiserror::Error)]
    /// #[error("Custom error: {msg}")]
    /// struct CustomError {
    ///     msg: String,
    /// }
    ///
    /// let errors = vec![
    ///     CustomError { msg: "first".to_string() },
    ///     CustomError { msg: "second".to_string() },
    /// ];
    ///
    /// let result = ConfluxError::from_user_errors(errors);
    /// assert!(matches!(result, ConfluxError::MultipleErrors { count: 2, .. }));
    /// ```
    pub fn from_user_errors<E>(errors: Vec<E>) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let count = errors.len();
        let conflux_errors = errors
            .into_iter()
            .map(|e| Self::UserError(Box::new(e)))
            .collect();

        Self::MultipleErrors {
            count,
            errors: conflux_errors,
        }
    }

    /// Check if this error indicates a contract violation rather than a
    /// runtime failure.
    #[must_use]
    pub const fn is_contract_violation(&self) -> bool {
        matches!(self, Self::MissingSubscription)
    }

    /// Check if this error is terminal for its pipeline entry.
    ///
    /// All runtime failures are; recovery is by rebuilding the entry.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !self.is_contract_violation()
    }
}

/// Specialized Result type for Conflux operations
///
/// This is a type alias for `std::result::Result<T, ConfluxError>`, providing
/// a convenient shorthand for functions that return Conflux errors.
pub type Result<T> = std::result::Result<T, ConfluxError>;

/// Extension trait for converting errors into `ConfluxError`
///
/// This trait is automatically implemented for all types that implement
/// `std::error::Error + Send + Sync + 'static`.
pub trait IntoConfluxError {
    /// Convert this error into a `ConfluxError` with additional context
    fn into_conflux_error(self, context: &str) -> ConfluxError;

    /// Convert this error into a `ConfluxError` without additional context
    fn into_conflux(self) -> ConfluxError
    where
        Self: Sized,
    {
        self.into_conflux_error("")
    }
}

impl<E: std::error::Error + Send + Sync + 'static> IntoConfluxError for E {
    fn into_conflux_error(self, _context: &str) -> ConfluxError {
        ConfluxError::user_error(self)
    }
}

/// Helper trait for adding context to `Result`s
///
/// This allows chaining context information onto errors in a fluent style.
pub trait ResultExt<T> {
    /// Add context to an error
    ///
    /// # Errors
    /// Returns `Err(ConfluxError)` if the underlying result is `Err`.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context to an error using a closure (lazy evaluation)
    ///
    /// # Errors
    /// Returns `Err(ConfluxError)` if the underlying result is `Err`.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<ConfluxError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let context = context.into();
            match e.into() {
                ConfluxError::UserError(inner) => ConfluxError::SourceError {
                    context: format!("{context}: {inner}"),
                },
                other => other,
            }
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let context = f();
            match e.into() {
                ConfluxError::UserError(inner) => ConfluxError::SourceError {
                    context: format!("{context}: {inner}"),
                },
                other => other,
            }
        })
    }
}

impl Clone for ConfluxError {
    fn clone(&self) -> Self {
        match self {
            Self::SourceError { context } => Self::SourceError {
                context: context.clone(),
            },
            // The boxed error cannot be cloned, so convert to string
            Self::UserError(e) => Self::SourceError {
                context: format!("User error: {}", e),
            },
            Self::EmptyCompletion => Self::EmptyCompletion,
            Self::MissingSubscription => Self::MissingSubscription,
            Self::MultipleErrors { count, errors } => Self::MultipleErrors {
                count: *count,
                errors: errors.clone(),
            },
        }
    }
}
