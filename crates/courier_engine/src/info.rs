use log::debug;
use scraper::{Html, Selector};

use crate::{FailureKind, FetchError, PageClient};

/// What the landing-page lookup resolves: a chapter-URL template with a `{}`
/// placeholder, a slug-derived title, and the highest chapter number observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MangaPage {
    pub url_template: String,
    pub title: String,
    pub chapter_count: u32,
}

impl MangaPage {
    pub fn chapter_url(&self, chapter: u32) -> String {
        chapter_url(&self.url_template, chapter)
    }
}

/// Expands a chapter-URL template for one chapter number.
pub fn chapter_url(template: &str, chapter: u32) -> String {
    template.replace("{}", &chapter.to_string())
}

const SITE_ROOT: &str = "https://komiku.org";

/// Fetches and parses the manga landing page.
pub async fn lookup_manga(client: &PageClient, manga_url: &str) -> Result<MangaPage, FetchError> {
    let html = client.get_text(manga_url).await?;
    parse_manga_page(&html)
}

/// Derives the chapter template, title, and chapter count from landing-page
/// markup. Fails with `NoChapterLinks` when the page has no chapter links.
pub fn parse_manga_page(html: &str) -> Result<MangaPage, FetchError> {
    let doc = Html::parse_document(html);
    let link_sel = Selector::parse("a[href*='chapter']")
        .map_err(|err| FetchError::new(FailureKind::NoChapterLinks, err.to_string()))?;

    let hrefs: Vec<String> = doc
        .select(&link_sel)
        .filter_map(|a| a.value().attr("href"))
        .map(absolutize_href)
        .collect();

    let first = hrefs
        .iter()
        .find(|href| href.contains("-chapter-"))
        .ok_or_else(|| FetchError::new(FailureKind::NoChapterLinks, "no chapter links on page"))?;

    let slug = first
        .split("-chapter-")
        .next()
        .unwrap_or_default()
        .trim_start_matches(SITE_ROOT)
        .trim_matches('/')
        .to_string();
    let url_template = format!("{SITE_ROOT}/{slug}-chapter-{{}}/");
    let title = slug.rsplit('/').next().unwrap_or(&slug).to_string();

    let chapter_count = hrefs
        .iter()
        .filter_map(|href| chapter_number(href))
        .max()
        .ok_or_else(|| FetchError::new(FailureKind::NoChapterLinks, "no numbered chapters"))?;

    debug!("resolved manga '{title}' with {chapter_count} chapters");
    Ok(MangaPage {
        url_template,
        title,
        chapter_count,
    })
}

fn absolutize_href(href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{SITE_ROOT}{href}")
    }
}

/// The numeric suffix of a chapter link, ignoring query strings.
fn chapter_number(href: &str) -> Option<u32> {
    let tail = href.split("-chapter-").nth(1)?;
    tail.trim_end_matches('/')
        .split('?')
        .next()?
        .trim_matches('/')
        .parse()
        .ok()
}
