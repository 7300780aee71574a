use crate::MangaInfo;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Free-text message from the user, interpreted against the current step.
    TextReceived(String),
    /// Landing-page lookup finished successfully.
    MangaResolved(MangaInfo),
    /// Landing-page lookup failed (page unreachable or no chapter links).
    MangaLookupFailed,
    /// The download loop for the current plan finished.
    DownloadFinished { delivered: usize },
    /// The download loop observed a cancellation and stopped early.
    DownloadCancelled,
}
