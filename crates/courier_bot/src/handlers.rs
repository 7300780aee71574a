//! Telegram update handling: command dispatch, the text funnel, and the
//! effect loop that feeds lookup and download outcomes back into the
//! session state machine.

use std::collections::VecDeque;
use std::sync::Arc;

use courier_core::{update, DownloadPlan, Effect, MangaInfo, Mode, Msg, Session};
use courier_engine::{lookup_manga, PageClient};
use log::{info, warn};
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, MaybeInaccessibleMessage};
use teloxide::utils::command::BotCommands;
use tokio_util::sync::CancellationToken;

use crate::pipeline::{variant_for, Pipeline};
use crate::store::{CancelStore, DemoHandle, DemoRegistry, SessionStore};
use crate::{texts, workers, UserId};

pub const CALLBACK_MODE_NORMAL: &str = "mode_normal";
pub const CALLBACK_MODE_HD: &str = "mode_hd";

/// Everything a handler or background worker needs, shared by `Arc`.
pub struct BotContext {
    pub sessions: SessionStore,
    pub cancels: CancelStore,
    pub demos: DemoRegistry,
    pub pipeline: Pipeline,
    pub client: PageClient,
}

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "pick a download mode")]
    Start,
    #[command(description = "normal mode")]
    Manga,
    #[command(description = "high-fidelity mode, max 3 chapters per range")]
    Komik,
    #[command(description = "stop the current download and delete its files")]
    Cancel,
    #[command(description = "run the automatic demo loop")]
    Autodemo,
    #[command(description = "stop the automatic demo loop")]
    Offautodemo,
}

/// Commands first, then plain text into the funnel, then mode buttons.
pub fn schema() -> teloxide::dispatching::UpdateHandler<teloxide::RequestError> {
    dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(Update::filter_message().endpoint(handle_message))
        .branch(Update::filter_callback_query().endpoint(handle_callback))
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    ctx: Arc<BotContext>,
) -> ResponseResult<()> {
    let user = msg.chat.id.0;
    info!("user {user} sent {cmd:?}");
    match cmd {
        Command::Start => {
            let keyboard = InlineKeyboardMarkup::new(vec![
                vec![InlineKeyboardButton::callback(
                    "Normal mode",
                    CALLBACK_MODE_NORMAL,
                )],
                vec![InlineKeyboardButton::callback(
                    "High-fidelity mode",
                    CALLBACK_MODE_HD,
                )],
            ]);
            bot.send_message(msg.chat.id, texts::WELCOME)
                .reply_markup(keyboard)
                .await?;
        }
        Command::Manga => start_mode(&ctx, user, Mode::Normal).await,
        Command::Komik => start_mode(&ctx, user, Mode::HighFidelity).await,
        Command::Cancel => cancel_download(&ctx, user).await,
        Command::Autodemo => start_autodemo(&ctx, user).await,
        Command::Offautodemo => stop_autodemo(&ctx, user).await,
    }
    Ok(())
}

async fn handle_message(msg: Message, ctx: Arc<BotContext>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    drive_text(&ctx, msg.chat.id.0, text).await;
    Ok(())
}

async fn handle_callback(bot: Bot, q: CallbackQuery, ctx: Arc<BotContext>) -> ResponseResult<()> {
    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };
    let mode = match data {
        CALLBACK_MODE_NORMAL => Mode::Normal,
        CALLBACK_MODE_HD => Mode::HighFidelity,
        _ => return Ok(()),
    };
    bot.answer_callback_query(q.id.clone()).await?;
    if let Some(MaybeInaccessibleMessage::Regular(m)) = q.message {
        // Remove the buttons so the choice is made once.
        let _ = bot.edit_message_reply_markup(m.chat.id, m.id).await;
        start_mode(&ctx, m.chat.id.0, mode).await;
    } else {
        start_mode(&ctx, q.from.id.0 as i64, mode).await;
    }
    Ok(())
}

/// Opens a fresh session in the given mode and sends the tutorial.
pub async fn start_mode(ctx: &BotContext, user: UserId, mode: Mode) {
    ctx.sessions.insert(user, Session::new(mode)).await;
    let tutorial = match mode {
        Mode::Normal => texts::TUTORIAL_NORMAL,
        Mode::HighFidelity => texts::TUTORIAL_HIGH_FIDELITY,
    };
    send(ctx, user, tutorial).await;
}

async fn cancel_download(ctx: &BotContext, user: UserId) {
    ctx.cancels.request_cancel(user).await;
    cleanup_user_downloads(ctx, user).await;
    send(ctx, user, texts::CANCELLED).await;
}

/// Removes the chapter folders of whatever range the user's session has
/// claimed. Safe to call when nothing was downloaded.
pub async fn cleanup_user_downloads(ctx: &BotContext, user: UserId) {
    let Some(session) = ctx.sessions.get(user).await else {
        return;
    };
    let Some((start, end)) = session.claimed_range() else {
        return;
    };
    let variant = variant_for(session.mode());
    if let Err(err) = ctx
        .pipeline
        .workdir()
        .remove_chapter_range(start, end, variant)
    {
        warn!("cleanup for user {user} failed: {err}");
    }
}

async fn start_autodemo(ctx: &Arc<BotContext>, user: UserId) {
    if ctx.demos.is_active(user).await {
        send(ctx, user, texts::DEMO_ALREADY_ACTIVE).await;
        return;
    }
    let stop = CancellationToken::new();
    let task = tokio::spawn(workers::run_autodemo(Arc::clone(ctx), user, stop.clone()));
    if !ctx
        .demos
        .register(
            user,
            DemoHandle {
                stop: stop.clone(),
                task,
            },
        )
        .await
    {
        // Lost a race with a concurrent /autodemo; keep the existing loop.
        stop.cancel();
        return;
    }
    send(ctx, user, texts::DEMO_STARTED).await;
}

async fn stop_autodemo(ctx: &BotContext, user: UserId) {
    if !ctx.demos.stop(user).await {
        send(ctx, user, texts::DEMO_NOT_ACTIVE).await;
        return;
    }
    ctx.cancels.request_cancel(user).await;
    cleanup_user_downloads(ctx, user).await;
    ctx.sessions.remove(user).await;
    ctx.cancels.remove(user).await;
    send(ctx, user, texts::DEMO_STOPPED).await;
}

/// Entry point for plain text: requires an open session.
pub async fn drive_text(ctx: &Arc<BotContext>, user: UserId, text: &str) {
    if ctx.sessions.get(user).await.is_none() {
        send(ctx, user, texts::NO_SESSION).await;
        return;
    }
    drive_message(ctx, user, Msg::TextReceived(text.to_string())).await;
}

/// Applies one message to the user's session and executes the resulting
/// effects. Lookup outcomes become follow-up messages, so the loop runs
/// until the machine settles; downloads run in their own task so the
/// dispatcher stays free to handle /cancel from the same chat mid-range.
pub async fn drive_message(ctx: &Arc<BotContext>, user: UserId, msg: Msg) {
    let mut queue: VecDeque<Msg> = VecDeque::from([msg]);
    while let Some(msg) = queue.pop_front() {
        let Some(effects) = ctx
            .sessions
            .apply(user, |session| update(session, msg))
            .await
        else {
            // Session removed mid-flight (sweep or demo teardown).
            return;
        };
        for effect in effects {
            match effect {
                Effect::Reply(reply) => send(ctx, user, &texts::render(&reply)).await,
                Effect::LookupManga(url) => {
                    let next = match lookup_manga(&ctx.client, &url).await {
                        Ok(page) => Msg::MangaResolved(MangaInfo {
                            url_template: page.url_template,
                            title: page.title,
                            chapter_count: page.chapter_count,
                        }),
                        Err(err) => {
                            warn!("lookup of {url} failed: {err}");
                            Msg::MangaLookupFailed
                        }
                    };
                    queue.push_back(next);
                }
                Effect::StartDownload(plan) => {
                    let token = ctx.cancels.begin(user).await;
                    tokio::spawn(run_download(Arc::clone(ctx), user, plan, token));
                }
            }
        }
    }
}

/// Runs one download to completion or cancellation and feeds the outcome
/// back into the session.
async fn run_download(
    ctx: Arc<BotContext>,
    user: UserId,
    plan: DownloadPlan,
    token: CancellationToken,
) {
    let report = ctx.pipeline.run(user, &plan, &token).await;
    let outcome = if report.cancelled {
        Msg::DownloadCancelled
    } else {
        Msg::DownloadFinished {
            delivered: report.delivered,
        }
    };
    let Some(effects) = ctx
        .sessions
        .apply(user, |session| update(session, outcome))
        .await
    else {
        // Session removed while the range was running.
        return;
    };
    // Download outcomes only ever produce replies.
    for effect in effects {
        if let Effect::Reply(reply) = effect {
            send(&ctx, user, &texts::render(&reply)).await;
        }
    }
}

pub(crate) async fn send(ctx: &BotContext, user: UserId, text: &str) {
    if let Err(err) = ctx.pipeline.transport().send_text(user, text).await {
        warn!("reply to user {user} failed: {err}");
    }
}
