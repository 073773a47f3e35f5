// src/exit.rs
//! Process exit codes for `linkshield`.
//!
//! Provides a stable contract for scripts and automation.

use crate::error::ShieldError;
use std::process::Termination;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ShieldExit {
    /// Command completed successfully.
    Success = 0,
    /// Generic error (I/O, evaluation failure).
    Error = 1,
    /// Bad arguments or configuration.
    InvalidInput = 2,
    /// A graph failed to return to its recorded state.
    Corrupted = 3,
}

impl ShieldExit {
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Exit code for a failed command, looking through the error chain for a
    /// library error.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        match err.chain().find_map(|cause| cause.downcast_ref::<ShieldError>()) {
            Some(ShieldError::Config(_) | ShieldError::InvalidProbe(_)) => Self::InvalidInput,
            Some(ShieldError::StateCorrupted(_)) => Self::Corrupted,
            _ => Self::Error,
        }
    }
}

impl Termination for ShieldExit {
    fn report(self) -> std::process::ExitCode {
        // codes fit in u8 by construction
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        std::process::ExitCode::from(self.code() as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_maps_library_errors() {
        let config: anyhow::Result<()> = Err(ShieldError::Config("bad".into())).context("loading");
        assert_eq!(ShieldExit::for_error(&config.unwrap_err()), ShieldExit::InvalidInput);

        let corrupted = anyhow::Error::new(ShieldError::StateCorrupted("x".into()));
        assert_eq!(ShieldExit::for_error(&corrupted), ShieldExit::Corrupted);

        assert_eq!(ShieldExit::for_error(&anyhow::anyhow!("plain")), ShieldExit::Error);
        assert_eq!(ShieldExit::InvalidInput.code(), 2);
    }
}
