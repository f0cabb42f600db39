//! Engine status codes
//!
//! Every engine primitive reports its outcome through an [`Info`] code. The
//! array layer resolves [`Info::NoValue`] to the array's fill value and
//! propagates everything else verbatim.

/// Status reported by an engine primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum Info {
    /// The call completed
    Success = 0,
    /// The requested entry is not stored
    NoValue = 1,
    /// Handle used before initialisation
    UninitializedObject = -1,
    /// A required argument was missing
    NullPointer = -2,
    /// An argument value is invalid
    InvalidValue = -3,
    /// A coordinate lies outside the array
    InvalidIndex = -4,
    /// Operand types are incompatible
    DomainMismatch = -5,
    /// Operand shapes are incompatible
    DimensionMismatch = -6,
    /// Build target already holds entries
    OutputNotEmpty = -7,
    /// The primitive is not available for these operands
    NotImplemented = -8,
    /// The handle is in an unusable state (e.g. currently unpacked)
    InvalidObject = -102,
    /// Allocation failed
    OutOfMemory = -103,
    /// A caller-provided buffer is too small
    InsufficientSpace = -104,
    /// A coordinate is outside the representable index range
    IndexOutOfBounds = -105,
}

/// Coarse classification of an [`Info`] code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Success, nothing to report
    Ok,
    /// Read of an unstored entry; not an error
    Absent,
    /// The caller broke the API contract
    Api,
    /// The engine failed while executing a valid request
    Execution,
}

impl Info {
    /// Numeric code as reported across the engine boundary
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Classify this status
    pub const fn category(self) -> ErrorCategory {
        match self {
            Info::Success => ErrorCategory::Ok,
            Info::NoValue => ErrorCategory::Absent,
            Info::InvalidObject | Info::OutOfMemory | Info::InsufficientSpace => {
                ErrorCategory::Execution
            }
            _ => ErrorCategory::Api,
        }
    }

    /// Convert to a `Result`, keeping `NoValue` as an error for the caller to resolve
    pub fn check(self) -> Result<()> {
        match self {
            Info::Success => Ok(()),
            other => Err(other),
        }
    }
}

impl core::fmt::Display for Info {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            Info::Success => "Success",
            Info::NoValue => "No value stored at the requested position",
            Info::UninitializedObject => "Object used before initialisation",
            Info::NullPointer => "Required argument missing",
            Info::InvalidValue => "Invalid value",
            Info::InvalidIndex => "Index out of range",
            Info::DomainMismatch => "Domain mismatch",
            Info::DimensionMismatch => "Dimension mismatch",
            Info::OutputNotEmpty => "Output not empty",
            Info::NotImplemented => "Not implemented",
            Info::InvalidObject => "Invalid object",
            Info::OutOfMemory => "Out of memory",
            Info::InsufficientSpace => "Insufficient space",
            Info::IndexOutOfBounds => "Index out of bounds",
        };
        write!(f, "{msg} ({})", self.code())
    }
}

/// Result type for engine primitives
pub type Result<T> = core::result::Result<T, Info>;
