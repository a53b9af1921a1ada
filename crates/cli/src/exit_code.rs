//! Process exit codes
//!
//! Scripts rely on these values, so existing codes must never be renumbered.

/// Exit status of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Command completed
    Success = 0,

    /// Unclassified failure
    GeneralError = 1,

    /// Bad arguments or configuration
    UsageError = 2,

    /// Transport failure or unexpected HTTP status
    NetworkError = 3,

    /// Login rejected
    AuthError = 4,

    /// Local or remote path does not exist
    NotFound = 5,

    /// Target already exists
    Conflict = 6,
}

impl ExitCode {
    /// Numeric value passed to the operating system
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == ExitCode::Success
    }
}
