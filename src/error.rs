//! Application error type.
//!
//! Every fallible operation returns `Result<_, AppError>`. The exit code tells the
//! binary how to terminate and groups failures by origin:
//!
//! - `1`: terminal failures in the interactive shell
//! - `2`: input/usage errors (bad parameter text, unknown section label, bad CSV rows)
//! - `3`: configuration errors (missing or malformed scaler, model, or crack files)
//! - `4`: undefined-domain errors (zero variance, zero range, non-finite results)
//! - `5`: model errors (estimator failure, unknown failure mode code)

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

    pub fn message(&self) -> &str {
        &self.message
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
