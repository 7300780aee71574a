use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use courier_bot::handlers::{drive_message, BotContext};
use courier_bot::pipeline::Pipeline;
use courier_bot::store::{CancelStore, DemoRegistry, SessionStore};
use courier_bot::transport::{Transport, TransportError};
use courier_bot::{texts, UserId};
use courier_core::{MangaInfo, Mode, Msg, Reply, Session, Step};
use courier_engine::{
    ChapterFetcher, DocumentAssembler, FailureKind, FetchError, FetchSettings, FetchVariant,
    PageClient, PdfError, Workdir,
};
use tokio_util::sync::CancellationToken;

const USER: UserId = 42;

/// Stalls on every chapter until its token is cancelled, like a slow remote
/// server would.
struct StalledFetcher;

#[async_trait]
impl ChapterFetcher for StalledFetcher {
    async fn fetch_chapter(
        &self,
        _chapter_url: &str,
        _chapter: u32,
        _workdir: &Workdir,
        _variant: FetchVariant,
        cancel: &CancellationToken,
    ) -> Result<Vec<PathBuf>, FetchError> {
        tokio::select! {
            _ = cancel.cancelled() => Err(FetchError::new(FailureKind::Cancelled, "stopped")),
            _ = tokio::time::sleep(Duration::from_secs(30)) => Ok(Vec::new()),
        }
    }
}

/// Every chapter comes back empty, so the range finishes with zero output.
struct EmptyFetcher;

#[async_trait]
impl ChapterFetcher for EmptyFetcher {
    async fn fetch_chapter(
        &self,
        _chapter_url: &str,
        _chapter: u32,
        _workdir: &Workdir,
        _variant: FetchVariant,
        _cancel: &CancellationToken,
    ) -> Result<Vec<PathBuf>, FetchError> {
        Ok(Vec::new())
    }
}

struct NullAssembler;

impl DocumentAssembler for NullAssembler {
    fn assemble(&self, _pages: &[PathBuf], _output: &Path) -> Result<bool, PdfError> {
        Ok(false)
    }
}

#[derive(Default)]
struct RecordingTransport {
    texts: Mutex<Vec<String>>,
}

impl RecordingTransport {
    fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_text(&self, _user: UserId, text: &str) -> Result<(), TransportError> {
        self.texts.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn send_document(
        &self,
        _user: UserId,
        _path: &Path,
        _caption: &str,
    ) -> Result<(), TransportError> {
        Ok(())
    }

    async fn self_check(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

struct Rig {
    _tmp: tempfile::TempDir,
    transport: Arc<RecordingTransport>,
    ctx: Arc<BotContext>,
}

fn rig(fetcher: Arc<dyn ChapterFetcher>) -> Rig {
    let tmp = tempfile::tempdir().expect("tempdir");
    let transport = Arc::new(RecordingTransport::default());
    let pipeline = Pipeline::new(
        fetcher,
        Arc::new(NullAssembler),
        Arc::clone(&transport) as Arc<dyn Transport>,
        Workdir::new(tmp.path()),
    );
    let ctx = Arc::new(BotContext {
        sessions: SessionStore::new(),
        cancels: CancelStore::new(),
        demos: DemoRegistry::new(),
        pipeline,
        client: PageClient::new(FetchSettings::default()).expect("client"),
    });
    Rig {
        _tmp: tmp,
        transport,
        ctx,
    }
}

fn info(chapter_count: u32) -> MangaInfo {
    MangaInfo {
        url_template: "https://komiku.org/one-piece-chapter-{}/".to_string(),
        title: "one-piece".to_string(),
        chapter_count,
    }
}

/// Drives the funnel link → start → end → merge so the download begins.
async fn start_download(ctx: &Arc<BotContext>, start: &str, end: &str) {
    ctx.sessions.insert(USER, Session::new(Mode::Normal)).await;
    drive_message(ctx, USER, Msg::MangaResolved(info(50))).await;
    drive_message(ctx, USER, Msg::TextReceived(start.to_string())).await;
    drive_message(ctx, USER, Msg::TextReceived(end.to_string())).await;
    drive_message(ctx, USER, Msg::TextReceived("split".to_string())).await;
}

async fn step_of(ctx: &Arc<BotContext>, user: UserId) -> Option<Step> {
    ctx.sessions.get(user).await.map(|s| s.step())
}

async fn wait_until_not_downloading(ctx: &Arc<BotContext>) {
    for _ in 0..100 {
        if step_of(ctx, USER).await != Some(Step::Downloading) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("download never settled");
}

#[tokio::test]
async fn cancel_request_interrupts_a_running_download() {
    let rig = rig(Arc::new(StalledFetcher));

    start_download(&rig.ctx, "3", "5").await;

    // The message path returned while the range is still running.
    assert_eq!(step_of(&rig.ctx, USER).await, Some(Step::Downloading));

    // Further text gets the busy reply instead of queueing behind the range.
    drive_message(&rig.ctx, USER, Msg::TextReceived("7".to_string())).await;
    assert!(rig
        .transport
        .texts()
        .contains(&texts::render(&Reply::DownloadBusy)));

    // The cancel intent reaches the stalled fetcher and unwinds the range.
    assert!(rig.ctx.cancels.request_cancel(USER).await);
    wait_until_not_downloading(&rig.ctx).await;

    assert_eq!(
        step_of(&rig.ctx, USER).await,
        Some(Step::AwaitingStartChapter)
    );
    assert!(rig
        .transport
        .texts()
        .contains(&texts::render(&Reply::DownloadCancelled)));
}

#[tokio::test]
async fn download_outcome_flows_back_into_the_session() {
    let rig = rig(Arc::new(EmptyFetcher));

    start_download(&rig.ctx, "3", "5").await;
    wait_until_not_downloading(&rig.ctx).await;

    // Zero successful chapters reports the empty outcome and re-opens the
    // range-entry step.
    assert_eq!(
        step_of(&rig.ctx, USER).await,
        Some(Step::AwaitingStartChapter)
    );
    assert!(rig
        .transport
        .texts()
        .contains(&texts::render(&Reply::DownloadEmpty)));
}
