use crate::core::Bar;

/// Per-source, per-day-or-gap result (spec §3 "FetchOutcome"). Not an
/// exception: transport/integrity failures for one day are values the
/// orchestrator inspects and isolates, per spec §9 "Exceptions for control
/// flow" and §5 "Failure isolation".
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// Bars were returned for (part of) the requested range.
    Served { bars: Vec<Bar> },
    /// The source authoritatively has nothing for a fully-closed range.
    EmptyClosed,
    /// The source has nothing yet because the day/window has not fully
    /// elapsed (distinct from `EmptyClosed`: this is not a final answer).
    EmptyPartialDay,
    /// Part or all of the requested range is in the future.
    RejectedFuture,
    /// The archive has not yet published this day (spec §4.5: "~48 hour"
    /// lag). A soft miss; the orchestrator falls through without error.
    NotYetPublished,
    /// The REST rate budget would be exceeded.
    RateLimited { retry_after_ms: Option<u64> },
    /// A retriable network/timeout failure, exhausted its retries.
    TransportError { message: String },
    /// Checksum mismatch or unparseable/misaligned columns.
    IntegrityError { reason: String },
    /// The symbol's shape or liveness was rejected by the source.
    InvalidSymbol,
}

impl FetchOutcome {
    #[must_use]
    pub fn bars(&self) -> &[Bar] {
        match self {
            Self::Served { bars } => bars,
            _ => &[],
        }
    }

    /// Whether this outcome should cause the orchestrator to fall through
    /// to the next tier without surfacing an error (spec §4.8 step 3:
    /// "`not-yet-published` or `empty-closed` -> fall through without
    /// error").
    #[must_use]
    pub fn falls_through_silently(&self) -> bool {
        matches!(
            self,
            Self::NotYetPublished | Self::EmptyClosed | Self::EmptyPartialDay
        )
    }
}
