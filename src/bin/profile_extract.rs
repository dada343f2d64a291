/// Profiling binary for flamegraph analysis
/// Runs the heuristic engine over a directory of HTML files and reports
/// which locator tier handled each page.
use std::collections::BTreeMap;
use std::env;
use std::fs;

use story_extractor::extract_with_diagnostics;
use story_extractor::locator::Strategy;
use story_extractor::ExtractOptions;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: profile_extract <html_dir> [limit]");
        eprintln!("  html_dir: Directory containing HTML files");
        eprintln!("  limit: Optional max number of files to process (default: all)");
        std::process::exit(1);
    }

    let dir = &args[1];
    let limit: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(usize::MAX);
    let options = ExtractOptions::default();

    let mut entries: Vec<_> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "html"))
        .collect();
    entries.sort_by_key(fs::DirEntry::path);

    let total = entries.len().min(limit);
    eprintln!("Processing {total} HTML files from {dir}");

    let mut failures: BTreeMap<String, usize> = BTreeMap::new();
    let mut strategies: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut removed = 0usize;
    let mut words = 0usize;
    let mut total_bytes = 0usize;

    for entry in entries.into_iter().take(limit) {
        let Ok(html) = fs::read_to_string(entry.path()) else {
            *failures.entry("READ_ERROR".to_string()).or_default() += 1;
            continue;
        };
        total_bytes += html.len();

        match extract_with_diagnostics(&html, None, &options) {
            Ok((content, diagnostics)) => {
                words += content.word_count;
                removed += diagnostics.filter.total();
                let tier = match diagnostics.strategy {
                    Strategy::Selector(_) => "selector",
                    Strategy::Density { .. } => "density",
                    Strategy::Body => "body",
                };
                *strategies.entry(tier).or_default() += 1;
            }
            Err(e) => *failures.entry(e.kind().to_string()).or_default() += 1,
        }
    }

    let succeeded: usize = strategies.values().sum();
    eprintln!(
        "Processed {total} files ({} MB): {succeeded} extracted, {} failed",
        total_bytes / 1_000_000,
        failures.values().sum::<usize>()
    );
    eprintln!("  locator tiers: {strategies:?}");
    eprintln!("  failures by kind: {failures:?}");
    eprintln!("  nodes removed by filter: {removed}, words extracted: {words}");

    Ok(())
}
