use std::fmt;

/// Which fetch pipeline a chapter goes through; decided by the session mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchVariant {
    Standard,
    /// Rewrites image URLs toward larger source assets and upscales 1.5x.
    HighFidelity,
}

impl FetchVariant {
    /// Deterministic per-chapter folder name under the working root.
    pub fn folder_name(&self, chapter: u32) -> String {
        match self {
            FetchVariant::Standard => format!("chapter-{chapter}"),
            FetchVariant::HighFidelity => format!("chapter-{chapter}-hd"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    /// Landing page had no chapter links; the lookup failure tuple.
    NoChapterLinks,
    /// A page image could not be decoded or re-encoded.
    Image,
    Io,
    /// Cooperative cancellation observed at a checkpoint; not an error path
    /// for the user, but distinct from an empty chapter.
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::NoChapterLinks => write!(f, "no chapter links found"),
            FailureKind::Image => write!(f, "image processing failed"),
            FailureKind::Io => write!(f, "io error"),
            FailureKind::Cancelled => write!(f, "cancelled"),
        }
    }
}
