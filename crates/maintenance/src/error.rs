//! Error types for plan compilation.
//!
//! Every planner validates its whole input before building a single
//! command, so an [`Error`] always means "no plan at all". Errors are
//! categorized so front-ends can report them consistently.

use thiserror::Error;

/// Categories of validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A mandatory option or field was empty
    MissingField,
    /// A field held a value outside its accepted set
    InvalidValue,
    /// Structured input (layout JSON) failed to decode
    MalformedInput,
    /// A partition type was neither a known alias nor a well-formed GUID
    UnresolvableAlias,
    /// A field violated a length or character constraint
    ConstraintViolation,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::MissingField => "Missing required field",
            Self::InvalidValue => "Invalid value",
            Self::MalformedInput => "Malformed input",
            Self::UnresolvableAlias => "Unresolvable type alias",
            Self::ConstraintViolation => "Constraint violation",
        }
    }
}

/// Errors that can occur while compiling a plan.
#[derive(Debug, Error)]
pub enum Error {
    /// A planner option that has no default was left empty
    #[error("{planner}: {field} is required")]
    MissingOption {
        /// Planner that rejected the options
        planner: &'static str,
        /// Human-readable field name
        field: &'static str,
    },

    /// The partition layout decoded to zero entries
    #[error("partition: layout is empty")]
    EmptyLayout,

    /// The partition layout is not a JSON array of entries
    #[error("partition: decode layout: {0}")]
    MalformedLayout(#[from] serde_json::Error),

    /// A layout entry left a mandatory field empty
    #[error("partition {index}: {field} must be specified")]
    MissingEntryField {
        /// 1-based partition number
        index: usize,
        /// Field name as it appears in the layout
        field: &'static str,
    },

    /// A layout entry named an unsupported filesystem
    #[error("partition {index}: unsupported format {format:?}")]
    UnsupportedFormat {
        /// 1-based partition number
        index: usize,
        /// Format token as supplied
        format: String,
    },

    /// A layout entry's type is neither an alias nor a GUID
    #[error("partition {index}: unknown type GUID alias {value:?}")]
    UnknownTypeGuid {
        /// 1-based partition number
        index: usize,
        /// Type token as supplied
        value: String,
    },

    /// A layout entry violated a label or size constraint
    #[error("partition {index}: {message}")]
    EntryConstraint {
        /// 1-based partition number
        index: usize,
        /// What was violated
        message: String,
    },

    /// A planner option held a value outside its accepted set
    #[error("{planner}: invalid {field} {value:?}")]
    InvalidOption {
        /// Planner that rejected the options
        planner: &'static str,
        /// Human-readable field name
        field: &'static str,
        /// Value as supplied
        value: String,
    },
}

impl Error {
    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::MissingOption { .. } | Error::EmptyLayout | Error::MissingEntryField { .. } => {
                ErrorCategory::MissingField
            }
            Error::MalformedLayout(_) => ErrorCategory::MalformedInput,
            Error::UnsupportedFormat { .. } | Error::InvalidOption { .. } => {
                ErrorCategory::InvalidValue
            }
            Error::UnknownTypeGuid { .. } => ErrorCategory::UnresolvableAlias,
            Error::EntryConstraint { .. } => ErrorCategory::ConstraintViolation,
        }
    }

    /// The 1-based partition number the error refers to, if any.
    pub fn partition_index(&self) -> Option<usize> {
        match self {
            Error::MissingEntryField { index, .. }
            | Error::UnsupportedFormat { index, .. }
            | Error::UnknownTypeGuid { index, .. }
            | Error::EntryConstraint { index, .. } => Some(*index),
            _ => None,
        }
    }

    pub(crate) fn missing(planner: &'static str, field: &'static str) -> Self {
        Error::MissingOption { planner, field }
    }
}

/// Result type for plan compilation.
pub type Result<T> = std::result::Result<T, Error>;
