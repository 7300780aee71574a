//! Scheduled background duties: the session sweep, the liveness ping, and
//! the per-user auto-demo loop. Each runs as its own task and stops when
//! its token is cancelled.

use std::sync::Arc;
use std::time::Duration;

use courier_core::{MangaInfo, Mode, Msg, Session, Step};
use courier_engine::{lookup_manga, PageClient};
use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use crate::handlers::{drive_message, send, BotContext};
use crate::store::{CancelStore, SessionStore};
use crate::transport::Transport;
use crate::{texts, UserId};

pub const SWEEP_PERIOD: Duration = Duration::from_secs(30 * 60);
pub const SESSION_MAX_IDLE: Duration = Duration::from_secs(60 * 60);
pub const SESSION_HIGH_WATER: usize = 100;

pub const PING_PERIOD: Duration = Duration::from_secs(4 * 60);

pub const DEMO_ROUND_PAUSE: Duration = Duration::from_secs(2 * 60);
const DEMO_STEP_PAUSE: Duration = Duration::from_secs(2);
/// Chapters beyond the start in each demo round (inclusive window of 3).
const DEMO_WINDOW: u32 = 2;

/// Preset manga pages the auto-demo rotates through.
pub const DEMO_URLS: [&str; 4] = [
    "https://komiku.org/manga/mairimashita-iruma-kun/",
    "https://komiku.org/manga/one-piece/",
    "https://komiku.org/manga/naruto/",
    "https://komiku.org/manga/attack-on-titan/",
];

/// Every sweep period, drops sessions idle past the expiry and then evicts
/// the oldest ones while the store is over the high-water mark.
pub async fn run_session_sweep(
    sessions: SessionStore,
    cancels: CancelStore,
    shutdown: CancellationToken,
) {
    loop {
        if pause(&shutdown, SWEEP_PERIOD).await {
            break;
        }
        let expired = sessions.sweep_expired(SESSION_MAX_IDLE).await;
        for user in &expired {
            cancels.remove(*user).await;
        }
        let evicted = sessions.evict_oldest(SESSION_HIGH_WATER).await;
        for user in &evicted {
            cancels.remove(*user).await;
        }
        info!(
            "session sweep: {} expired, {} evicted, {} live",
            expired.len(),
            evicted.len(),
            sessions.live_count().await
        );
    }
}

/// Every ping period, round-trips the transport and the keep-alive URL.
/// Failures are logged and never fatal.
pub async fn run_liveness_ping(
    transport: Arc<dyn Transport>,
    client: PageClient,
    keepalive_url: String,
    shutdown: CancellationToken,
) {
    loop {
        if pause(&shutdown, PING_PERIOD).await {
            break;
        }
        match transport.self_check().await {
            Ok(()) => debug!("transport self-check ok"),
            Err(err) => warn!("transport self-check failed: {err}"),
        }
        match client.get_text(&keepalive_url).await {
            Ok(_) => debug!("keep-alive endpoint pinged"),
            Err(err) => warn!("keep-alive ping failed: {err}"),
        }
    }
}

/// Drives the user's session through scripted rounds: pick the next preset
/// manga, download a three-chapter window in normal mode as split PDFs,
/// then pause before the next round. Checks the stop token at every
/// boundary and tears its session down on exit.
pub async fn run_autodemo(ctx: Arc<BotContext>, user: UserId, stop: CancellationToken) {
    let mut url_index = 0usize;
    let mut window_start: u32 = 1;

    loop {
        if pause(&stop, DEMO_STEP_PAUSE).await {
            break;
        }
        let manga_url = DEMO_URLS[url_index % DEMO_URLS.len()];
        url_index += 1;
        send(&ctx, user, &texts::demo_round_start(manga_url)).await;

        ctx.sessions.insert(user, Session::new(Mode::Normal)).await;

        let page = match lookup_manga(&ctx.client, manga_url).await {
            Ok(page) => page,
            Err(err) => {
                warn!("demo lookup of {manga_url} failed: {err}");
                if pause(&stop, DEMO_ROUND_PAUSE).await {
                    break;
                }
                continue;
            }
        };
        let total = page.chapter_count;
        let start = window_start.clamp(1, total);
        let end = start.saturating_add(DEMO_WINDOW).min(total);

        let steps = [
            Msg::MangaResolved(MangaInfo {
                url_template: page.url_template,
                title: page.title,
                chapter_count: total,
            }),
            Msg::TextReceived(start.to_string()),
            Msg::TextReceived(end.to_string()),
            Msg::TextReceived("split".to_string()),
        ];
        let mut stopped = false;
        for msg in steps {
            if pause(&stop, DEMO_STEP_PAUSE).await {
                stopped = true;
                break;
            }
            drive_message(&ctx, user, msg).await;
        }
        if stopped {
            break;
        }

        // The download runs in its own task; wait for the funnel to leave
        // the downloading step before advancing the window.
        loop {
            let downloading = matches!(
                ctx.sessions.get(user).await.map(|s| s.step()),
                Some(Step::Downloading)
            );
            if !downloading {
                break;
            }
            if pause(&stop, Duration::from_secs(1)).await {
                stopped = true;
                break;
            }
        }
        if stopped {
            break;
        }

        // Slide the window forward; wrap to the start when the next full
        // window would run past the last chapter.
        window_start = if end + DEMO_WINDOW < total { end + 1 } else { 1 };

        send(&ctx, user, texts::DEMO_ROUND_DONE).await;
        if pause(&stop, DEMO_ROUND_PAUSE).await {
            break;
        }
    }

    // Teardown happens before the session disappears so the claimed range
    // is still known.
    ctx.cancels.request_cancel(user).await;
    crate::handlers::cleanup_user_downloads(&ctx, user).await;
    ctx.sessions.remove(user).await;
    ctx.cancels.remove(user).await;
    info!("auto demo stopped for user {user}");
}

/// Sleeps for `duration` unless the token fires first; returns `true` when
/// the caller should stop.
async fn pause(stop: &CancellationToken, duration: Duration) -> bool {
    tokio::select! {
        _ = stop.cancelled() => true,
        _ = tokio::time::sleep(duration) => false,
    }
}
