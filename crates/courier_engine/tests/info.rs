use courier_engine::{chapter_url, lookup_manga, parse_manga_page, FailureKind, FetchSettings, PageClient};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LANDING_PAGE: &str = r#"
<html><body>
  <h1>Mairimashita Iruma-kun</h1>
  <a href="/mairimashita-iruma-kun-chapter-1/">Chapter 1</a>
  <a href="https://komiku.org/mairimashita-iruma-kun-chapter-12/">Chapter 12</a>
  <a href="/mairimashita-iruma-kun-chapter-7/?src=list">Chapter 7</a>
  <a href="/other-page/">Not a chapter</a>
</body></html>
"#;

#[test]
fn parses_template_title_and_chapter_count() {
    let page = parse_manga_page(LANDING_PAGE).expect("parses");

    assert_eq!(
        page.url_template,
        "https://komiku.org/mairimashita-iruma-kun-chapter-{}/"
    );
    assert_eq!(page.title, "mairimashita-iruma-kun");
    assert_eq!(page.chapter_count, 12);
}

#[test]
fn template_expands_to_chapter_urls() {
    let page = parse_manga_page(LANDING_PAGE).expect("parses");

    assert_eq!(
        page.chapter_url(3),
        "https://komiku.org/mairimashita-iruma-kun-chapter-3/"
    );
    assert_eq!(
        chapter_url(&page.url_template, 12),
        "https://komiku.org/mairimashita-iruma-kun-chapter-12/"
    );
}

#[test]
fn page_without_chapter_links_is_a_lookup_failure() {
    let err = parse_manga_page("<html><body><a href='/about/'>About</a></body></html>")
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::NoChapterLinks);
}

#[tokio::test]
async fn lookup_fetches_and_parses_the_landing_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/manga/mairimashita-iruma-kun/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(LANDING_PAGE, "text/html"))
        .mount(&server)
        .await;

    let client = PageClient::new(FetchSettings::default()).expect("client builds");
    let url = format!("{}/manga/mairimashita-iruma-kun/", server.uri());

    let page = lookup_manga(&client, &url).await.expect("lookup ok");
    assert_eq!(page.chapter_count, 12);
}

#[tokio::test]
async fn lookup_fails_on_unreachable_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/manga/gone/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = PageClient::new(FetchSettings::default()).expect("client builds");
    let url = format!("{}/manga/gone/", server.uri());

    let err = lookup_manga(&client, &url).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
}
