//! Crate error type.

use std::fmt;
use std::io;

/// Unrecoverable conditions surfaced to the caller. The binary turns any of
/// these into a one-line message on stderr and a non-zero exit code.
#[derive(Debug)]
pub enum Error {
    /// Instance file could not be opened or read.
    Io(io::Error),
    /// Malformed or unsupported content in the instance file.
    InstanceFormat(String),
    /// Depot record violates an invariant (demand, service, release or
    /// earliest arrival not zero).
    DepotInvariant(String),
    /// Fleet is below the trivial bin-packing bound.
    FleetTooSmall { vehicles: usize, lower_bound: usize },
    /// Distances or demands outside the supported numeric scale.
    NumericScale(String),
    /// The Split dynamic program could not propagate a label to the last
    /// client of the giant tour.
    SplitInfeasible,
    /// Command line could not be parsed.
    CommandLine(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::InstanceFormat(msg) => write!(f, "invalid instance: {}", msg),
            Error::DepotInvariant(msg) => write!(f, "depot invariant violated: {}", msg),
            Error::FleetTooSmall {
                vehicles,
                lower_bound,
            } => write!(
                f,
                "fleet size {} is below the bin packing bound {}",
                vehicles, lower_bound
            ),
            Error::NumericScale(msg) => write!(f, "numeric scale problem: {}", msg),
            Error::SplitInfeasible => {
                write!(f, "no split solution was propagated until the last client")
            }
            Error::CommandLine(msg) => write!(f, "command line: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
