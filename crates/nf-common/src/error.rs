use thiserror::Error;

/// Failure kinds shared by every layer of the tool.
///
/// OS-level failures are folded into these kinds via [`ForgeError::from_errno`]
/// so callers can match on behavior instead of raw errno values.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForgeError {
    #[error("Fatal error.")]
    Fatal,

    #[error("Null input.")]
    NullInput,

    #[error("No such device.")]
    NoDevice,

    #[error("Not found.")]
    NotFound,

    #[error("Syscall failed.")]
    Syscall,

    #[error("No memory.")]
    NoMemory,

    #[error("Input too large.")]
    TooLarge,

    #[error("Operation not permitted.")]
    PermissionDenied,

    #[error("Resource temporarily unavailable.")]
    Unavailable,

    #[error("Invalid argument.")]
    InvalidArgument,

    #[error("Invalid input.")]
    Invalid,
}

impl ForgeError {
    /// Map a host errno to a failure kind.
    pub fn from_errno(errno: i32) -> Self {
        match errno {
            libc::EACCES | libc::EPERM => Self::PermissionDenied,
            libc::EAGAIN => Self::Unavailable,
            libc::EINVAL => Self::InvalidArgument,
            libc::ENXIO | libc::ENODEV | libc::ENOENT => Self::NoDevice,
            libc::ENOMEM => Self::NoMemory,
            _ => Self::Syscall,
        }
    }
}

impl From<std::io::Error> for ForgeError {
    fn from(err: std::io::Error) -> Self {
        match err.raw_os_error() {
            Some(errno) => Self::from_errno(errno),
            None => Self::Syscall,
        }
    }
}
