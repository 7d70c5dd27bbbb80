//! Error taxonomy for the binding layer
//!
//! The native solver libraries cannot raise exceptions across the C boundary;
//! faults surface as nonzero return codes or null pointers. Every call site
//! translates those into a [`CoinError`] before returning, so callers never
//! see a raw native failure. No operation in this crate retries anything:
//! constructor/destructor-time guarantees and one-shot pass-through calls are
//! all there is.

use std::error::Error;
use std::fmt;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, CoinError>;

/// Errors produced by the binding layer.
#[derive(Debug)]
pub enum CoinError {
    /// The native library signaled a fault (invalid model state, infeasible
    /// operation, I/O failure). Diagnostic fields are filled in where the
    /// native side supplies them.
    Native {
        message: String,
        /// Native class the fault originated from, e.g. `Clp_Simplex`.
        source_class: Option<&'static str>,
        /// Method that was being forwarded, e.g. `readMps`.
        source_method: Option<&'static str>,
        file: Option<String>,
        line: Option<u32>,
    },
    /// A proxy's native reference was already released when an operation was
    /// attempted.
    InvalidState { class: &'static str },
    /// A downcast helper received a native pointer of unrecognized runtime
    /// type with no defined fallback.
    UnknownNativeType { type_name: String },
    /// An array argument's length does not match the dimension the native
    /// call requires.
    ArgumentShape {
        argument: &'static str,
        expected: usize,
        actual: usize,
    },
    /// A row/column index argument is outside the model's current
    /// dimensions.
    IndexOutOfRange {
        argument: &'static str,
        index: usize,
        limit: usize,
    },
    /// Compressed-column data is internally inconsistent (non-monotone
    /// starts, row index out of range, ...).
    InvalidMatrix(String),
    /// A native constructor returned a null pointer.
    NativeConstruction { class: &'static str },
    /// The solver shared library could not be located or loaded.
    Library(String),
    /// The loaded library does not export a symbol this operation needs
    /// (older COIN-OR releases lack parts of the C interface).
    MissingSymbol { symbol: &'static str },
    /// A string argument contains an interior NUL and cannot be marshaled.
    InvalidString(String),
}

impl CoinError {
    /// Shorthand used by the typed proxies when a forwarded call reports a
    /// nonzero return code.
    pub(crate) fn native(
        class: &'static str,
        method: &'static str,
        message: impl Into<String>,
    ) -> Self {
        CoinError::Native {
            message: message.into(),
            source_class: Some(class),
            source_method: Some(method),
            file: None,
            line: None,
        }
    }
}

impl fmt::Display for CoinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoinError::Native {
                message,
                source_class,
                source_method,
                file,
                line,
            } => {
                write!(f, "native solver error: {message}")?;
                if let (Some(class), Some(method)) = (source_class, source_method) {
                    write!(f, " at {class}.{method}(...)")?;
                }
                if let Some(file) = file {
                    write!(f, " in {file}")?;
                    if let Some(line) = line {
                        write!(f, ":line {line}")?;
                    }
                }
                Ok(())
            }
            CoinError::InvalidState { class } => {
                write!(f, "{class}: native reference has already been released")
            }
            CoinError::UnknownNativeType { type_name } => {
                write!(f, "unknown native type: {type_name}")
            }
            CoinError::ArgumentShape {
                argument,
                expected,
                actual,
            } => write!(
                f,
                "argument `{argument}` has length {actual}, the native call requires {expected}"
            ),
            CoinError::IndexOutOfRange {
                argument,
                index,
                limit,
            } => write!(
                f,
                "{argument} index {index} out of range, the model has {limit}"
            ),
            CoinError::InvalidMatrix(msg) => write!(f, "invalid matrix structure: {msg}"),
            CoinError::NativeConstruction { class } => {
                write!(f, "native constructor for {class} returned null")
            }
            CoinError::Library(msg) => write!(f, "solver library unavailable: {msg}"),
            CoinError::MissingSymbol { symbol } => write!(
                f,
                "the loaded solver library does not export `{symbol}`; a newer COIN-OR release is required for this operation"
            ),
            CoinError::InvalidString(s) => {
                write!(f, "string contains an interior NUL byte: {s:?}")
            }
        }
    }
}

impl Error for CoinError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_error_reproduces_diagnostics() {
        let err = CoinError::Native {
            message: "No match for row type".into(),
            source_class: Some("CoinMpsIO"),
            source_method: Some("readMps"),
            file: Some("CoinMpsIO.cpp".into()),
            line: Some(1244),
        };
        let text = err.to_string();
        assert!(text.contains("No match for row type"));
        assert!(text.contains("CoinMpsIO.readMps(...)"));
        assert!(text.contains("CoinMpsIO.cpp:line 1244"));
    }

    #[test]
    fn test_native_shorthand_carries_origin() {
        let err = CoinError::native("Clp_Simplex", "initialSolve", "status 4");
        match &err {
            CoinError::Native {
                source_class,
                source_method,
                ..
            } => {
                assert_eq!(*source_class, Some("Clp_Simplex"));
                assert_eq!(*source_method, Some("initialSolve"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_argument_shape_names_both_lengths() {
        let err = CoinError::ArgumentShape {
            argument: "collb",
            expected: 4,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "argument `collb` has length 3, the native call requires 4"
        );
    }
}
