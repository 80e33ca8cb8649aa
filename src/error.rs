// ── Central error type ────────────────────────────────────────────────────────
//
// Fallible plumbing in pick returns `error::Result<T>`.  None of these errors
// ever reaches a caller of the dialog operations: the coordinator converts
// every failure into a cancellation-shaped result delivered through the
// request's own callback.

use thiserror::Error;

/// Every error that pick can produce internally.
#[derive(Debug, Error)]
pub enum PickError {
    /// A standard I/O error (reading a config file, …).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration text could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[source] serde_json::Error),

    /// A configuration value parsed but is out of range.
    #[error("invalid configuration: {0}")]
    ConfigValue(&'static str),

    /// A command or reply crossing the script bridge was not valid JSON for
    /// the bridge protocol.
    #[error("malformed bridge message: {0}")]
    Bridge(#[source] serde_json::Error),

    /// The page-side script threw while handling a command.
    #[error("script bridge error: {0}")]
    Script(String),

    /// The active surface cannot perform the requested operation.
    #[error("{0} is not supported by this surface")]
    Unsupported(&'static str),

    /// A native API call returned a failure code.
    #[error("{function} failed (error {code:#010x})")]
    Platform {
        /// The name of the failing function, for display purposes.
        function: &'static str,
        /// The raw error code or HRESULT.
        code: u32,
    },
}

// Convert a windows-crate error (HRESULT) directly into a PickError so that
// `?` can be used on `windows::core::Result<T>` inside the Win32 surface.
#[cfg(all(windows, feature = "native"))]
impl From<windows::core::Error> for PickError {
    fn from(e: windows::core::Error) -> Self {
        // HRESULT.0 is i32; reinterpret bits as u32 for display purposes.
        Self::Platform {
            function: "windows",
            code: e.code().0 as u32,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PickError>;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_error_display_is_hex() {
        let e = PickError::Platform {
            function: "GetOpenFileNameW",
            code: 0x8007_0005,
        };
        assert_eq!(e.to_string(), "GetOpenFileNameW failed (error 0x80070005)");
    }

    #[test]
    fn unsupported_names_the_operation() {
        assert_eq!(
            PickError::Unsupported("export").to_string(),
            "export is not supported by this surface"
        );
    }

    #[test]
    fn io_error_converts_with_question_mark() {
        fn fails() -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))?;
            Ok(())
        }
        assert!(matches!(fails(), Err(PickError::Io(_))));
    }
}
