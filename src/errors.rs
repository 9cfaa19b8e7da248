// errors.rs
//
// Error types shared across the configuration parser, trace decoder,
// and scheduler core. Follows the single flat enum + manual Display
// style used throughout this simulator family.

use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum SimError {
    /// Wrong number of CLI arguments, or an argument that fails clap validation.
    ArgError(String),

    /// A config or trace file could not be opened or read.
    IoError(std::io::Error),

    /// A config line doesn't fit the `"<class>": {"fu": N, "rs": N, "cc":
    /// N}` shape at all, whether as JSON or under the looser field-scan
    /// fallback — there's no class name or field set to even evaluate.
    ParseError(String),

    /// A config line parsed into a class name and field set, but the
    /// class was unknown or a field held a value that isn't allowed
    /// (e.g. `cc` of zero).
    ConfigError(String),

    /// The trace file held a malformed hex instruction word. Unknown
    /// opcodes are skipped, not an error; this variant is only for
    /// lines that aren't valid hex at all.
    TraceError(String),

    /// An internal scheduler consistency check failed. Indicates a bug
    /// in the scheduler itself, not bad input.
    SchedulerInvariant(String),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::ArgError(msg) => write!(f, "argument error: {}", msg),
            SimError::IoError(err) => write!(f, "I/O error: {}", err),
            SimError::ParseError(msg) => write!(f, "parse error: {}", msg),
            SimError::ConfigError(msg) => write!(f, "config error: {}", msg),
            SimError::TraceError(msg) => write!(f, "trace error: {}", msg),
            SimError::SchedulerInvariant(msg) => {
                write!(f, "scheduler invariant violated: {}", msg)
            },
        }
    }
}

impl Error for SimError {}

impl From<std::io::Error> for SimError {
    fn from(error: std::io::Error) -> Self {
        SimError::IoError(error)
    }
}
