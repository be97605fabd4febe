/// How to handle a frame whose in-band timestamp is invalid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimestampPolicy {
    /// Drop the frame and count it as a decode failure.
    #[default]
    Strict,
    /// Keep the frame, stamp it with the arrival time and mark it
    /// `clock_substituted`.
    ArrivalFallback,
}

/// Controls ingestion behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestConfig {
    /// Invalid timestamp handling. Default: [`TimestampPolicy::Strict`].
    pub timestamp_policy: TimestampPolicy,
}
