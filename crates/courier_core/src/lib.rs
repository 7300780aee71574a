//! Courier core: pure conversation state machine for the download funnel.
mod effect;
mod msg;
mod session;
mod update;

pub use effect::{DownloadPlan, Effect, Reply};
pub use msg::Msg;
pub use session::{
    MangaInfo, MergeChoice, Mode, Session, Step, HIGH_FIDELITY_MAX_SPAN, MANGA_URL_PREFIX,
    SITE_ROOT,
};
pub use update::update;
