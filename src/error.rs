//! Error types for trueno-plot operations.
//!
//! Configuration errors are fatal and surface unmodified. Missing data is never an
//! error: it is represented as `None`, an empty container or `NaN` bounds.

use std::io;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in trueno-plot operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error (options file reading, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A composite plot was given a layout with no items.
    #[error("cannot display empty layout")]
    EmptyLayout,

    /// A composite plot was given something other than a layout.
    #[error("layout plots only accept layout objects, got {0}")]
    InvalidLayoutRoot(String),

    /// No plotting class is registered for an encountered object type.
    #[error("no plotting class registered for {view_type} under backend '{backend}'")]
    UnregisteredPlotType {
        /// Backend name.
        backend: String,
        /// Name of the object type.
        view_type: String,
    },

    /// Selectable plot classes do not share one option interface.
    #[error("all selectable plot classes must have identical {0} options")]
    InconsistentSelector(&'static str),

    /// The selector function returned a key with no plot class.
    #[error("key {key} returned by selector not in set: {available}")]
    UnresolvedSelectorKey {
        /// Key returned by the selector.
        key: String,
        /// Comma separated list of known keys.
        available: String,
    },

    /// Attempt to set a parameter on a plot selector outside its declared interface.
    #[error("please set class parameters directly on classes {0}")]
    SelectorAttribute(String),

    /// An abstract plotting contract was invoked without a concrete override.
    #[error("{0} is not implemented by this plot")]
    NotImplemented(&'static str),

    /// A render handle was requested before the plot was initialized.
    #[error("plot handle '{0}' has not been initialized")]
    NotInitialized(&'static str),

    /// Options configuration parsing error with line number.
    #[error("options configuration error at line {line}: {message}")]
    ConfigParse {
        /// Line number where the error occurred (1-indexed).
        line: usize,
        /// Error message describing the issue.
        message: String,
    },

    /// Options configuration file not found.
    #[error("options configuration file not found: {0}")]
    ConfigNotFound(String),

    /// An option path or group name could not be understood.
    #[error("invalid option specification '{0}'")]
    InvalidOptionSpec(String),
}

impl Error {
    /// Whether this error belongs to the fatal configuration class.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::EmptyLayout
                | Error::InvalidLayoutRoot(_)
                | Error::UnregisteredPlotType { .. }
                | Error::InconsistentSelector(_)
                | Error::UnresolvedSelectorKey { .. }
                | Error::SelectorAttribute(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnregisteredPlotType {
            backend: "scene".to_string(),
            view_type: "Histogram".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Histogram"));
        assert!(msg.contains("scene"));
    }

    #[test]
    fn test_config_parse_line() {
        let err = Error::ConfigParse {
            line: 4,
            message: "bad value".to_string(),
        };
        assert!(err.to_string().contains("line 4"));
    }

    #[test]
    fn test_configuration_class() {
        assert!(Error::EmptyLayout.is_configuration());
        assert!(!Error::NotImplemented("state").is_configuration());
    }
}
