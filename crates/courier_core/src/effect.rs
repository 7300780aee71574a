use crate::{MergeChoice, Mode};

/// Side effects requested by [`crate::update`]; executed by the bot layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Reply(Reply),
    /// Resolve manga metadata from the landing page at this URL.
    LookupManga(String),
    /// Run the chapter-range download loop for this plan.
    StartDownload(DownloadPlan),
}

/// Everything the download loop needs, fixed at the moment the user picks
/// a merge choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPlan {
    pub url_template: String,
    pub title: String,
    pub start: u32,
    pub end: u32,
    pub mode: Mode,
    pub merge: MergeChoice,
}

/// Structured user-facing replies; the transport layer renders them to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    InvalidLink,
    LookupFailed,
    AskStartChapter { max: u32 },
    StartMustBeNumber,
    StartOutOfRange { max: u32 },
    AskEndChapter { max: u32 },
    EndMustBeNumber,
    EndBeforeStart { start: u32 },
    EndOutOfRange { max: u32 },
    HighFidelitySpanTooWide { max_chapters: u32 },
    AskMergeChoice,
    InvalidMergeChoice,
    DownloadStarting { start: u32, end: u32 },
    DownloadBusy,
    DownloadComplete { delivered: usize },
    DownloadEmpty,
    DownloadCancelled,
}
