//! Crate-wide error type.
//!
//! Every fallible operation returns `Result<_, AppError>`; only `main` turns an
//! error into a process exit. Exit codes:
//!
//! - `2` configuration, storage and other I/O
//! - `3` value extraction (unparseable fragment or malformed `Results`)
//! - `4` fetch (request failed with and without proxy)
//! - `5` chart rendering

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    /// Prefix the message with `ctx`, keeping the exit code.
    pub fn context(self, ctx: impl std::fmt::Display) -> Self {
        Self {
            exit_code: self.exit_code,
            message: format!("{ctx}: {}", self.message),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
