//! Performance benchmarks for the heuristic engine.
//!
//! Run with: `cargo bench`
//!
//! - a small synthetic article for microbenchmarks
//! - a long page where no selector matches, forcing the density scan
//! - the agent-input preparation pass

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use story_extractor::engine::prepare_for_agent;
use story_extractor::{extract, ExtractOptions};

const SAMPLE_HTML: &str = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Harbour repairs begin | Coast Daily</title>
    <meta name="author" content="Jane Reporter">
    <meta name="description" content="Crews start work on the northern breakwater.">
    <script type="application/ld+json">
    {"@type": "NewsArticle", "headline": "Harbour repairs begin", "datePublished": "2024-03-01T08:00:00Z"}
    </script>
</head>
<body>
    <nav>
        <a href="/">Home</a>
        <a href="/world">World</a>
    </nav>
    <div class="cookie-banner">We use cookies to improve your experience.</div>
    <article>
        <h1>Harbour repairs begin</h1>
        <p class="byline">By Jane Reporter</p>
        <p>The harbour authority confirmed that repairs to the northern breakwater will
        begin next week, with crews working in shifts through the night to keep the
        channel open for the fishing fleet.</p>
        <h2>Night shifts</h2>
        <p>Contractors will move the first barge into position on Monday. The work is
        expected to take four months, weather permitting, and the authority has set
        aside an emergency fund for storm damage during the winter.</p>
        <blockquote>We expect the work to finish before the spring tides arrive.<cite>Harbourmaster</cite></blockquote>
        <p>Residents near the quay have been told to expect noise between midnight and
        four in the morning on weekdays while piles are driven.</p>
    </article>
    <aside>
        <h3>Related Articles</h3>
        <ul><li><a href="/a">Storm season</a></li><li><a href="/b">Fleet news</a></li></ul>
    </aside>
    <footer><p>Copyright 2024 Coast Daily</p></footer>
</body>
</html>
"#;

/// A page with no semantic wrapper: `paragraphs` paragraphs inside plain divs.
fn unwrapped_page(paragraphs: usize) -> String {
    let para = "<p>Council members debated the proposal for most of the evening, returning again and again to the cost of the new sea wall and who should pay for it.</p>";
    format!(
        "<html><head><title>Council debate</title></head><body><div class=\"menu\"><a href=\"/\">Home</a></div><div><div>{}</div></div></body></html>",
        para.repeat(paragraphs)
    )
}

fn bench_extract_article(c: &mut Criterion) {
    let options = ExtractOptions::default();
    c.bench_function("extract_article", |b| {
        b.iter(|| extract(black_box(SAMPLE_HTML), Some("https://coast.example/news/1"), &options));
    });
}

fn bench_density_fallback(c: &mut Criterion) {
    let options = ExtractOptions::default();
    let mut group = c.benchmark_group("density_fallback");

    for paragraphs in [10, 100, 500] {
        let html = unwrapped_page(paragraphs);
        group.throughput(Throughput::Bytes(html.len() as u64));
        group.bench_with_input(BenchmarkId::new("extract", paragraphs), &html, |b, html| {
            b.iter(|| extract(black_box(html), None, &options));
        });
    }

    group.finish();
}

fn bench_prepare_for_agent(c: &mut Criterion) {
    let options = ExtractOptions::default();
    c.bench_function("prepare_for_agent", |b| {
        b.iter(|| prepare_for_agent(black_box(SAMPLE_HTML), 60_000, &options));
    });
}

criterion_group!(
    benches,
    bench_extract_article,
    bench_density_fallback,
    bench_prepare_for_agent
);
criterion_main!(benches);
