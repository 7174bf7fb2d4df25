//! Secret redaction for key material in logs and debug output.
//!
//! The relay's signing key comes from the environment and must never appear
//! in traces, error reports or `Debug` output of configuration structs.

use std::fmt::{self, Debug, Display};

/// Wrapper that redacts its inner value when formatted.
///
/// ```ignore
/// use interop_rs::redact::Redacted;
///
/// let key = Redacted("0xac09...".to_string());
/// tracing::info!(private_key = %key, "Loaded signer");
/// // Logs: private_key = <redacted>
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Redacted<T>(pub T);

impl<T> Redacted<T> {
    /// Access the wrapped secret
    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl<T> Debug for Redacted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl<T> Display for Redacted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl<T> From<T> for Redacted<T> {
    fn from(value: T) -> Self {
        Redacted(value)
    }
}
