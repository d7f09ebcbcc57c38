/// Failures raised by the counting engine and table builders.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        name: &'static str,
        reason: &'static str,
    },

    #[error("invalid range: computed period {period} is below 1")]
    InvalidRange { period: i64 },

    #[error("no occurrence data to build a table from")]
    EmptyResult,

    #[error("period {period} is not in the dataset")]
    MissingPeriod { period: u32 },

    #[error("count {count} does not fit in {buckets} bucket columns")]
    BucketOverflow { count: u32, buckets: u32 },
}

pub type Result<T> = std::result::Result<T, EngineError>;

pub(crate) fn require_positive(name: &'static str, value: u32) -> Result<()> {
    if value == 0 {
        return Err(EngineError::InvalidArgument {
            name,
            reason: "must be positive",
        });
    }
    Ok(())
}
