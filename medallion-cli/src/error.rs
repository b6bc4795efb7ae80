// ============================================================================
// medallion-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING
//
// The CLI has no error type of its own. Failures outside the core, such as
// creating the output directory, are wrapped into CoreError::OperationFailed
// with a short description of what the CLI was doing.
//
// AI-ASSISTANT-INFO: Context helper and error macro for the encode command

use medallion_core::{CoreError, CoreResult};

use std::fmt;

pub type CliResult<T> = CoreResult<T>;

/// Prefixes a failed result with what the CLI was attempting.
pub trait CliErrorContext<T> {
    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C;
}

impl<T, E> CliErrorContext<T> for Result<T, E>
where
    E: Into<CoreError>,
{
    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| {
            let core_error: CoreError = e.into();
            CoreError::OperationFailed(format!("{}: {core_error}", f()))
        })
    }
}

/// `CoreError::OperationFailed` from a format string.
#[macro_export]
macro_rules! cli_error {
    ($($arg:tt)*) => {
        ::medallion_core::CoreError::OperationFailed(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_context_prefixes_io_error() {
        let result: Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        let err = result
            .cli_with_context(|| "Failed to create output directory '/out'")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to create output directory '/out': IO error: denied"
        );
    }

    #[test]
    fn test_cli_error_macro_formats() {
        let err = cli_error!("Output file '{}' already exists", "a.webp");
        assert!(matches!(err, CoreError::OperationFailed(msg) if msg == "Output file 'a.webp' already exists"));
    }
}
