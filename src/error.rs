use core::fmt;
use std::io;

/// Harness result type alias
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Harness error codes
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    InvalidConfig(&'static str),
    // Sampled correctness check after a timing loop
    CheckFailed { strategy: String, size: usize, index: usize },
    MissingCell { strategy: String, exponent: u32 },
    Format,
    Io(io::ErrorKind),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfig(reason) => write!(f, "Invalid configuration: {}", reason),
            Error::CheckFailed { strategy, size, index } => {
                write!(f, "Strategy {} left a wrong value at element {} of {}", strategy, index, size)
            }
            Error::MissingCell { strategy, exponent } => {
                write!(f, "No measurement for {} at exponent {}", strategy, exponent)
            }
            Error::Format => write!(f, "Failed to format report"),
            Error::Io(kind) => write!(f, "Output error: {}", kind),
        }
    }
}

impl std::error::Error for Error {}

impl From<fmt::Error> for Error {
    fn from(_: fmt::Error) -> Self {
        Error::Format
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = Error::CheckFailed { strategy: "simd".into(), size: 32, index: 31 };
        assert_eq!(err.to_string(), "Strategy simd left a wrong value at element 31 of 32");
        assert_eq!(
            Error::from(io::Error::from(io::ErrorKind::BrokenPipe)),
            Error::Io(io::ErrorKind::BrokenPipe)
        );
    }
}
