//! Courier engine: site scraping, image pipeline, and PDF assembly.
mod chapter;
mod fetch;
mod images;
mod info;
mod pdf;
mod types;
mod workdir;

pub use chapter::{extract_image_urls, ChapterFetcher, SiteChapterFetcher};
pub use fetch::{FetchSettings, PageClient};
pub use images::{normalize_to_jpeg, upscale_to_jpeg, HIGH_FIDELITY_SCALE};
pub use info::{chapter_url, lookup_manga, parse_manga_page, MangaPage};
pub use pdf::{assemble_pdf, DocumentAssembler, JpegPdfAssembler, PdfError};
pub use types::{FailureKind, FetchError, FetchVariant};
pub use workdir::{Workdir, WorkdirError};
