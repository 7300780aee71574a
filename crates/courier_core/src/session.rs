/// Root of the scraped site; relative links are resolved against this.
pub const SITE_ROOT: &str = "https://komiku.org";

/// Only manga landing pages under this prefix are accepted as input.
pub const MANGA_URL_PREFIX: &str = "https://komiku.org/manga/";

/// Widest `end - start` span allowed in high-fidelity mode (3 chapters inclusive).
pub const HIGH_FIDELITY_MAX_SPAN: u32 = 2;

/// Where in the link -> start -> end -> merge funnel a session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    AwaitingLink,
    AwaitingStartChapter,
    AwaitingEndChapter,
    AwaitingMergeChoice,
    Downloading,
}

/// Fetch variant chosen once when the session is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    /// Targets larger source assets and upscales before encoding.
    HighFidelity,
}

/// One combined document for the whole range, or one document per chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeChoice {
    Merged,
    Split,
}

/// Metadata resolved once from the manga landing page; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MangaInfo {
    /// Chapter URL template containing a `{}` placeholder for the number.
    pub url_template: String,
    /// Slug-derived title, used for document filenames.
    pub title: String,
    /// Highest chapter number observed on the landing page.
    pub chapter_count: u32,
}

/// Per-user conversation state tracking funnel progress and download parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    step: Step,
    mode: Mode,
    manga: Option<MangaInfo>,
    start_chapter: Option<u32>,
    end_chapter: Option<u32>,
}

impl Session {
    pub fn new(mode: Mode) -> Self {
        Self {
            step: Step::AwaitingLink,
            mode,
            manga: None,
            start_chapter: None,
            end_chapter: None,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn manga(&self) -> Option<&MangaInfo> {
        self.manga.as_ref()
    }

    pub fn start_chapter(&self) -> Option<u32> {
        self.start_chapter
    }

    pub fn end_chapter(&self) -> Option<u32> {
        self.end_chapter
    }

    /// The chapter range this session has claimed on disk so far.
    ///
    /// A session that has only entered a start chapter still owns that one
    /// chapter folder, so cleanup treats the range as `[start, start]`.
    pub fn claimed_range(&self) -> Option<(u32, u32)> {
        match (self.start_chapter, self.end_chapter) {
            (Some(start), Some(end)) => Some((start, end)),
            (Some(start), None) => Some((start, start)),
            _ => None,
        }
    }

    pub(crate) fn set_step(&mut self, step: Step) {
        self.step = step;
    }

    pub(crate) fn set_manga(&mut self, manga: MangaInfo) {
        self.manga = Some(manga);
    }

    pub(crate) fn set_start_chapter(&mut self, chapter: u32) {
        self.start_chapter = Some(chapter);
    }

    pub(crate) fn set_end_chapter(&mut self, chapter: u32) {
        self.end_chapter = Some(chapter);
    }

    /// Returns the session to the range-entry step, keeping the resolved manga.
    pub(crate) fn reset_range(&mut self) {
        self.start_chapter = None;
        self.end_chapter = None;
        self.step = Step::AwaitingStartChapter;
    }
}
