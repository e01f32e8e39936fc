use std::fmt;
use std::io;

/// Errors raised while binding to the host or loading configuration.
///
/// The per-tick control path never fails: degenerate numerics are replaced
/// with defined fallbacks where they arise.
#[derive(Debug)]
pub enum FlightError {
    MissingSensor { name: String },
    MissingGyros { expected: usize, found: usize },
    InvalidConfig(String),
    ConfigParse(serde_json::Error),
    Io(io::Error),
}

impl fmt::Display for FlightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSensor { name } => {
                write!(f, "remote control block '{name}' was not found")
            }
            Self::MissingGyros { expected, found } => write!(
                f,
                "gyro count is set to {expected} but only {found} gyro(s) are available"
            ),
            Self::InvalidConfig(reason) => write!(f, "invalid configuration: {reason}"),
            Self::ConfigParse(err) => write!(f, "could not parse configuration: {err}"),
            Self::Io(err) => write!(f, "i/o error: {err}"),
        }
    }
}

impl std::error::Error for FlightError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ConfigParse(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for FlightError {
    fn from(err: serde_json::Error) -> Self {
        Self::ConfigParse(err)
    }
}

impl From<io::Error> for FlightError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}
