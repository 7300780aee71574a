//! User-facing message strings, kept in one place so the handlers and the
//! demo narration stay consistent.

use courier_core::Reply;

pub const WELCOME: &str = "Welcome! 📚 This bot downloads manga chapters from komiku.org \
and sends them to you as PDFs.\n\nPick a download mode:";

pub const TUTORIAL_NORMAL: &str = "Normal mode is on! ✅\n\n\
1. Send a manga link, e.g. https://komiku.org/manga/one-piece/\n\
2. Pick the first and last chapter to download\n\
3. Choose `merged` for one PDF or `split` for one PDF per chapter";

pub const TUTORIAL_HIGH_FIDELITY: &str = "High-fidelity mode is on! ✨\n\n\
Pages are upscaled and saved at maximum quality, so ranges are capped at \
3 chapters.\n\n\
1. Send a manga link, e.g. https://komiku.org/manga/one-piece/\n\
2. Pick the first and last chapter to download\n\
3. Choose `merged` for one PDF or `split` for one PDF per chapter";

pub const NO_SESSION: &str = "Type /start first to pick a download mode.";

pub const CANCELLED: &str = "Download stopped. 🛑 Temporary chapter files were removed.";

pub const DEMO_ALREADY_ACTIVE: &str =
    "Auto demo is already running. Use /offautodemo to stop it.";
pub const DEMO_STARTED: &str =
    "Auto demo started! 🤖 The bot will keep downloading preset manga until you send /offautodemo.";
pub const DEMO_NOT_ACTIVE: &str = "Auto demo is not running.";
pub const DEMO_STOPPED: &str =
    "Auto demo stopped. Any running download was cancelled and its files removed.";
pub const DEMO_ROUND_DONE: &str = "Auto demo: round finished, next round in 2 minutes.";

pub fn demo_round_start(url: &str) -> String {
    format!("Auto demo: starting a round with {url}")
}

pub fn delivery_failed(name: &str) -> String {
    format!("Could not deliver {name}, please try again later.")
}

/// Renders a funnel reply into the text the user sees.
pub fn render(reply: &Reply) -> String {
    match reply {
        Reply::InvalidLink => {
            "That does not look like a komiku.org manga link. Please send one like \
https://komiku.org/manga/one-piece/"
                .to_string()
        }
        Reply::LookupFailed => {
            "Could not read that manga page. 😕 Check the link and try again.".to_string()
        }
        Reply::AskStartChapter { max } => {
            format!("Found it! This manga has {max} chapters. Which chapter should I start from?")
        }
        Reply::StartMustBeNumber => {
            "The start chapter must be a number, e.g. 3.".to_string()
        }
        Reply::StartOutOfRange { max } => {
            format!("The start chapter must be between 1 and {max}.")
        }
        Reply::AskEndChapter { max } => {
            format!("And which chapter should I stop at? (up to {max})")
        }
        Reply::EndMustBeNumber => "The end chapter must be a number, e.g. 5.".to_string(),
        Reply::EndBeforeStart { start } => {
            format!("The end chapter cannot be before the start chapter ({start}).")
        }
        Reply::EndOutOfRange { max } => {
            format!("The end chapter must be between 1 and {max}.")
        }
        Reply::HighFidelitySpanTooWide { max_chapters } => {
            format!("High-fidelity mode is limited to {max_chapters} chapters per download. Pick a smaller range.")
        }
        Reply::AskMergeChoice => {
            "Should I send one merged PDF or one PDF per chapter? Reply `merged` or `split`."
                .to_string()
        }
        Reply::InvalidMergeChoice => "Please reply `merged` or `split`.".to_string(),
        Reply::DownloadStarting { start, end } => {
            format!("Downloading chapters {start} to {end}... ⏳ You can stop with /cancel.")
        }
        Reply::DownloadBusy => {
            "A download is already running. Use /cancel to stop it first.".to_string()
        }
        Reply::DownloadComplete { delivered } => {
            format!("Done! 🎉 Sent {delivered} PDF(s). Send another chapter range, or /start to switch mode.")
        }
        Reply::DownloadEmpty => {
            "No pages could be downloaded for that range. 😕 Try different chapters.".to_string()
        }
        Reply::DownloadCancelled => {
            "Download cancelled. Send another chapter range, or /start to switch mode.".to_string()
        }
    }
}
