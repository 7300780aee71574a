use std::sync::Arc;

use courier_bot::config::Config;
use courier_bot::handlers::{self, BotContext};
use courier_bot::pipeline::Pipeline;
use courier_bot::store::{CancelStore, DemoRegistry, SessionStore};
use courier_bot::transport::{TelegramTransport, Transport};
use courier_bot::workers;
use courier_engine::{FetchSettings, JpegPdfAssembler, PageClient, SiteChapterFetcher, Workdir};
use log::{error, info, warn};
use teloxide::prelude::*;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    courier_logging::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("configuration error: {err}");
            std::process::exit(1);
        }
    };

    // Startup housekeeping: the output directory starts empty.
    let workdir = Workdir::new(&config.output_dir);
    if let Err(err) = workdir.ensure() {
        error!("working directory unusable: {err}");
        std::process::exit(1);
    }
    match workdir.wipe() {
        Ok(removed) => info!(
            "cleared {removed} leftover entries from {}",
            workdir.root().display()
        ),
        Err(err) => warn!("startup cleanup failed: {err}"),
    }

    let client = match PageClient::new(FetchSettings::default()) {
        Ok(client) => client,
        Err(err) => {
            error!("http client setup failed: {err}");
            std::process::exit(1);
        }
    };

    let bot = Bot::new(config.bot_token.clone());
    let transport: Arc<dyn Transport> = Arc::new(TelegramTransport::new(bot.clone()));
    let pipeline = Pipeline::new(
        Arc::new(SiteChapterFetcher::new(client.clone())),
        Arc::new(JpegPdfAssembler),
        Arc::clone(&transport),
        workdir,
    );

    let ctx = Arc::new(BotContext {
        sessions: SessionStore::new(),
        cancels: CancelStore::new(),
        demos: DemoRegistry::new(),
        pipeline,
        client: client.clone(),
    });

    let shutdown = CancellationToken::new();
    tokio::spawn(workers::run_session_sweep(
        ctx.sessions.clone(),
        ctx.cancels.clone(),
        shutdown.clone(),
    ));
    tokio::spawn(workers::run_liveness_ping(
        Arc::clone(&transport),
        client,
        config.keepalive_url.clone(),
        shutdown.clone(),
    ));

    info!("courier bot starting");
    Dispatcher::builder(bot, handlers::schema())
        .dependencies(dptree::deps![Arc::clone(&ctx)])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    shutdown.cancel();
    info!("courier bot stopped");
}
