use url::Url;

use crate::{
    DownloadPlan, Effect, MergeChoice, Mode, Msg, Reply, Session, Step, HIGH_FIDELITY_MAX_SPAN,
    MANGA_URL_PREFIX,
};

/// Pure update function: applies a message to a session and returns any effects.
///
/// Validation failures reply and never transition; the funnel only ever moves
/// forward (link -> start -> end -> merge -> downloading) and returns to the
/// range-entry step after a download round.
pub fn update(mut session: Session, msg: Msg) -> (Session, Vec<Effect>) {
    let effects = match msg {
        Msg::TextReceived(text) => {
            let text = text.trim().to_string();
            match session.step() {
                Step::AwaitingLink => handle_link(&text),
                Step::AwaitingStartChapter => handle_start_chapter(&mut session, &text),
                Step::AwaitingEndChapter => handle_end_chapter(&mut session, &text),
                Step::AwaitingMergeChoice => handle_merge_choice(&mut session, &text),
                Step::Downloading => vec![Effect::Reply(Reply::DownloadBusy)],
            }
        }
        Msg::MangaResolved(info) => {
            if session.step() == Step::AwaitingLink {
                let max = info.chapter_count;
                session.set_manga(info);
                session.set_step(Step::AwaitingStartChapter);
                vec![Effect::Reply(Reply::AskStartChapter { max })]
            } else {
                Vec::new()
            }
        }
        Msg::MangaLookupFailed => {
            if session.step() == Step::AwaitingLink {
                vec![Effect::Reply(Reply::LookupFailed)]
            } else {
                Vec::new()
            }
        }
        Msg::DownloadFinished { delivered } => {
            if session.step() == Step::Downloading {
                session.reset_range();
                let reply = if delivered == 0 {
                    Reply::DownloadEmpty
                } else {
                    Reply::DownloadComplete { delivered }
                };
                vec![Effect::Reply(reply)]
            } else {
                Vec::new()
            }
        }
        Msg::DownloadCancelled => {
            if session.step() == Step::Downloading {
                session.reset_range();
                vec![Effect::Reply(Reply::DownloadCancelled)]
            } else {
                Vec::new()
            }
        }
    };

    (session, effects)
}

fn handle_link(text: &str) -> Vec<Effect> {
    // Url::parse percent-encodes interior whitespace instead of failing,
    // so reject it up front.
    let looks_valid = text.starts_with(MANGA_URL_PREFIX)
        && !text.contains(char::is_whitespace)
        && Url::parse(text).is_ok();
    if looks_valid {
        vec![Effect::LookupManga(text.to_string())]
    } else {
        vec![Effect::Reply(Reply::InvalidLink)]
    }
}

fn handle_start_chapter(session: &mut Session, text: &str) -> Vec<Effect> {
    let max = session.manga().map(|m| m.chapter_count).unwrap_or(0);
    let Some(chapter) = parse_chapter(text) else {
        return vec![Effect::Reply(Reply::StartMustBeNumber)];
    };
    if chapter > max {
        return vec![Effect::Reply(Reply::StartOutOfRange { max })];
    }
    session.set_start_chapter(chapter);
    session.set_step(Step::AwaitingEndChapter);
    vec![Effect::Reply(Reply::AskEndChapter { max })]
}

fn handle_end_chapter(session: &mut Session, text: &str) -> Vec<Effect> {
    let max = session.manga().map(|m| m.chapter_count).unwrap_or(0);
    let start = session.start_chapter().unwrap_or(1);
    let Some(chapter) = parse_chapter(text) else {
        return vec![Effect::Reply(Reply::EndMustBeNumber)];
    };
    if chapter < start {
        return vec![Effect::Reply(Reply::EndBeforeStart { start })];
    }
    if chapter > max {
        return vec![Effect::Reply(Reply::EndOutOfRange { max })];
    }
    if session.mode() == Mode::HighFidelity && chapter - start > HIGH_FIDELITY_MAX_SPAN {
        return vec![Effect::Reply(Reply::HighFidelitySpanTooWide {
            max_chapters: HIGH_FIDELITY_MAX_SPAN + 1,
        })];
    }
    session.set_end_chapter(chapter);
    session.set_step(Step::AwaitingMergeChoice);
    vec![Effect::Reply(Reply::AskMergeChoice)]
}

fn handle_merge_choice(session: &mut Session, text: &str) -> Vec<Effect> {
    let merge = match text.to_ascii_lowercase().as_str() {
        "merged" => MergeChoice::Merged,
        "split" => MergeChoice::Split,
        _ => return vec![Effect::Reply(Reply::InvalidMergeChoice)],
    };
    let (Some(manga), Some(start), Some(end)) = (
        session.manga().cloned(),
        session.start_chapter(),
        session.end_chapter(),
    ) else {
        // Unreachable through normal transitions; treat as a fresh prompt.
        return vec![Effect::Reply(Reply::InvalidMergeChoice)];
    };
    session.set_step(Step::Downloading);
    vec![
        Effect::Reply(Reply::DownloadStarting { start, end }),
        Effect::StartDownload(DownloadPlan {
            url_template: manga.url_template,
            title: manga.title,
            start,
            end,
            mode: session.mode(),
            merge,
        }),
    ]
}

/// Chapter numbers are positive integers; anything else is a validation error.
fn parse_chapter(text: &str) -> Option<u32> {
    text.parse::<u32>().ok().filter(|n| *n >= 1)
}
