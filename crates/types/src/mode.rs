use crate::DiffStatus;

/// Which class of headers an extraction pass considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMode {
    /// Only headers never checked before.
    Unchecked,
    /// Headers checked fewer times than the recheck cap.
    Recheck,
}

/// Which status class a storage watcher drains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchMode {
    /// Drain freshly queued diffs.
    New,
    /// Revisit diffs a decoder previously lacked metadata for.
    Unrecognized,
}

impl WatchMode {
    /// The diff status this mode fetches from the queue.
    pub const fn status(&self) -> DiffStatus {
        match self {
            Self::New => DiffStatus::New,
            Self::Unrecognized => DiffStatus::Unrecognized,
        }
    }

    /// Short label used in log lines and heartbeat banners.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Unrecognized => "unrecognized",
        }
    }
}
