//! Injected assertion capability.
//!
//! Development and test sessions run with [`Assertions::Enabled`]: a failed
//! check becomes [`PhetioError::Assertion`]. Production sessions run with
//! [`Assertions::Disabled`]: the failure is logged and the caller proceeds
//! with best-effort data.

use crate::error::{PhetioError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Assertions {
    #[default]
    Enabled,
    Disabled,
}

impl Assertions {
    #[must_use]
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled {
            Self::Enabled
        } else {
            Self::Disabled
        }
    }

    #[must_use]
    pub fn is_enabled(self) -> bool {
        self == Self::Enabled
    }

    /// Fails with an assertion error when `condition` is false and
    /// assertions are enabled. The message is only built on failure.
    pub fn check<F>(self, condition: bool, message: F) -> Result<()>
    where
        F: FnOnce() -> String,
    {
        if condition {
            return Ok(());
        }
        let message = message();
        match self {
            Self::Enabled => Err(PhetioError::Assertion(message)),
            Self::Disabled => {
                tracing::debug!(assertion = %message, "Assertion skipped");
                Ok(())
            }
        }
    }

    /// Passes `result` through when assertions are enabled. When disabled,
    /// an error is logged and replaced by `fallback()`.
    pub fn tolerate<T, F>(self, result: Result<T>, fallback: F) -> Result<T>
    where
        F: FnOnce() -> T,
    {
        match (result, self) {
            (Ok(value), _) => Ok(value),
            (Err(err), Self::Enabled) => Err(err),
            (Err(err), Self::Disabled) => {
                tracing::warn!(error = %err, "Degrading after failed check");
                Ok(fallback())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_check_fails() {
        let err = Assertions::Enabled
            .check(false, || "boom".to_string())
            .unwrap_err();
        assert!(err.is_assertion());
        assert!(Assertions::Enabled.check(true, || unreachable!()).is_ok());
    }

    #[test]
    fn test_disabled_check_passes() {
        assert!(Assertions::Disabled.check(false, || "boom".to_string()).is_ok());
    }

    #[test]
    fn test_tolerate() {
        let failing: Result<u32> = Err(PhetioError::validation("x"));
        assert!(Assertions::Enabled.tolerate(failing, || 0).is_err());
        let failing: Result<u32> = Err(PhetioError::validation("x"));
        assert_eq!(Assertions::Disabled.tolerate(failing, || 7).unwrap(), 7);
    }
}
