//! Result alias and logging combinators.

use crate::error::Error;

/// The standard Result type for charm operations.
///
/// ```ignore
/// fn load() -> Result<CharmConfig> {
///     let raw = RawConfig::from_yaml_str(text)?;
///     CharmConfig::from_raw(&raw)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait providing non-panicking combinators for [`Result`].
pub trait ResultExt<T> {
    /// Convert to an Option, logging the error at warn level if present.
    fn into_option_logged(self) -> Option<T>;

    /// Inspect the error without consuming the Result.
    #[must_use]
    fn inspect_error<F: FnOnce(&Error)>(self, f: F) -> Self;
}

impl<T> ResultExt<T> for Result<T> {
    fn into_option_logged(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(error = %e, "Operation failed");
                None
            }
        }
    }

    fn inspect_error<F: FnOnce(&Error)>(self, f: F) -> Self {
        if let Err(ref e) = self {
            f(e);
        }
        self
    }
}
