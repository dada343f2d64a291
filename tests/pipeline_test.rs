use story_extractor::locator::{self, Strategy};
use story_extractor::{dom, extract, extract_with_diagnostics, filter, Error, ErrorKind, ExtractOptions};

const QUOTE: &str = "We will reopen the quay before the storm";

fn news_page() -> String {
    let p1 = "Fishing crews returned to the harbour on Thursday after a week of gales kept most of the fleet tied up, and the market reported its busiest morning since the spring. Buyers from three counties were waiting on the quay before dawn.";
    let p2 = "The harbour authority said the damaged section of the breakwater would be surveyed next week. Engineers expect the repairs to take several months, and a temporary barrier of rock armour will protect the inner moorings until then.";
    format!(
        r#"<html><head></head><body>
        <nav><a href="/">Home</a> <a href="/sport">Sport coverage</a> NAV_ONLY_TEXT here</nav>
        <article>
          <p>{p1}</p>
          <p>{p2}</p>
          <blockquote>{QUOTE}</blockquote>
        </article>
        </body></html>"#
    )
}

#[test]
fn article_with_nav_and_quote() {
    let content = extract(&news_page(), None, &ExtractOptions::default()).unwrap();

    assert!(content.headings.is_empty());
    assert_eq!(content.quotes.len(), 1);
    assert_eq!(content.quotes[0].text, QUOTE);
    assert!(!content.text_only.contains("NAV_ONLY_TEXT"));
    assert!(!content.text_only.contains("Sport coverage"));
    assert!(content.text_only.contains("Fishing crews returned"));
    assert_eq!(content.title, "Untitled");
}

#[test]
fn article_is_found_by_selector() {
    let (_, diagnostics) = extract_with_diagnostics(&news_page(), None, &ExtractOptions::default()).unwrap();
    assert_eq!(diagnostics.strategy, Strategy::Selector("article"));
    assert!(diagnostics.filter.structural >= 1);
}

#[test]
fn read_time_and_word_count_agree() {
    let content = extract(&news_page(), None, &ExtractOptions::default()).unwrap();
    let words = content.text_only.split_whitespace().count();
    assert_eq!(content.word_count, words);
    assert_eq!(content.estimated_read_time, "1 minute");
}

#[test]
fn noise_filter_is_idempotent() {
    let html = r#"<html><body>
        <header><a href="/">Logo</a></header>
        <div class="cookie-consent">Accept cookies</div>
        <div class="ad-slot"><div class="ad-slot-inner"></div></div>
        <main><p>Body text that stays put after filtering, twice.</p><div><span></span></div></main>
        <div class="share-buttons">Share this</div>
        <footer>Copyright</footer>
        </body></html>"#;
    let options = ExtractOptions::default();
    let doc = dom::parse(html);

    let first = filter::filter(&doc, &options);
    let after_first = doc.html().to_string();
    let second = filter::filter(&doc, &options);

    assert!(first.total() > 0);
    assert_eq!(second.total(), 0);
    assert_eq!(doc.html().to_string(), after_first);
    assert!(after_first.contains("Body text that stays put"));
}

#[test]
fn locator_falls_back_to_body_for_short_pages() {
    let html = "<html><body><article><p>Short.</p><p>Also short.</p></article><div>Loose text</div></body></html>";
    let options = ExtractOptions::default();
    let doc = dom::parse(html);
    filter::filter(&doc, &options);

    let located = locator::locate(&doc, &options);
    assert_eq!(located.strategy, Strategy::Body);
}

#[test]
fn density_scan_finds_unwrapped_story() {
    let para = "<p>Council members debated the proposal for most of the evening, returning again and again to the cost of the new sea wall and who should pay.</p>";
    let html = format!(
        "<html><body><div id='side'><p>Weather: sunny</p></div><div id='story'>{}</div></body></html>",
        para.repeat(5)
    );
    let (content, diagnostics) = extract_with_diagnostics(&html, None, &ExtractOptions::default()).unwrap();

    assert!(matches!(diagnostics.strategy, Strategy::Density { score } if score > 500));
    assert!(!content.text_only.contains("Weather: sunny"));
}

#[test]
fn relative_image_and_site_name_use_page_url() {
    let html = r#"<html><head>
        <meta property="og:image" content="/img/quay.jpg">
        <meta property="og:title" content="Quay reopens after storm">
        </head><body><p>The quay reopened on Monday morning after a week of repairs.</p></body></html>"#;
    let content = extract(html, Some("https://www.harbour.example/news/quay"), &ExtractOptions::default()).unwrap();

    assert_eq!(content.metadata.image_url.as_deref(), Some("https://www.harbour.example/img/quay.jpg"));
    assert_eq!(content.metadata.site_name.as_deref(), Some("harbour.example"));
    assert_eq!(content.title, "Quay reopens after storm");
}

#[test]
fn empty_input_is_parse_error() {
    let err = extract("", None, &ExtractOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ParseError);
    assert!(!err.to_failure().retryable);
    assert!(matches!(err, Error::ParseError(_)));
}

#[test]
fn page_wrapped_in_a_form_still_extracts() {
    let para = "<p>The lifeboat crew launched twice overnight to reach a yacht that lost its mast off the headland, and both sailors were brought ashore safely by dawn.</p>";
    let html = format!(
        r#"<html><body><form id="aspnetForm" method="post"><input type="hidden" name="__VIEWSTATE" value="x">
        <article>{}</article>
        </form></body></html>"#,
        para.repeat(4)
    );
    let (content, diagnostics) = extract_with_diagnostics(&html, None, &ExtractOptions::default()).unwrap();

    assert_eq!(diagnostics.strategy, Strategy::Selector("article"));
    assert!(content.text_only.contains("The lifeboat crew launched twice"));
    assert!(!content.text_only.contains("__VIEWSTATE"));
}
