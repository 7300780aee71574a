use courier_core::{update, MangaInfo, Mode, Msg, Session, Step};

fn info(chapter_count: u32) -> MangaInfo {
    MangaInfo {
        url_template: "https://komiku.org/one-piece-chapter-{}/".to_string(),
        title: "one-piece".to_string(),
        chapter_count,
    }
}

#[test]
fn stale_lookup_results_are_ignored_after_the_funnel_advances() {
    let session = Session::new(Mode::Normal);
    let (session, _) = update(session, Msg::MangaResolved(info(12)));
    assert_eq!(session.step(), Step::AwaitingStartChapter);

    // A second resolution or a late failure must not rewind or mutate.
    let (next, effects) = update(session.clone(), Msg::MangaResolved(info(99)));
    assert_eq!(session, next);
    assert!(effects.is_empty());

    let (next, effects) = update(session.clone(), Msg::MangaLookupFailed);
    assert_eq!(session, next);
    assert!(effects.is_empty());
}

#[test]
fn download_results_ignored_outside_downloading() {
    let session = Session::new(Mode::Normal);
    let (next, effects) = update(session.clone(), Msg::DownloadFinished { delivered: 3 });
    assert_eq!(session, next);
    assert!(effects.is_empty());

    let (next, effects) = update(session.clone(), Msg::DownloadCancelled);
    assert_eq!(session, next);
    assert!(effects.is_empty());
}
