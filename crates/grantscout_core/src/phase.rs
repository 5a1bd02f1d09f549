/// Maps a backend phase identifier to a display label.
///
/// Total over all inputs: unknown phases are humanized by replacing
/// separator characters with spaces.
pub fn phase_label(phase: &str) -> String {
    match phase {
        "INITIALIZING" => "Initializing discovery...".to_string(),
        "SEED_CRAWL" => "Crawling seed URL...".to_string(),
        "ANALYZING_LINKS" => "Analyzing links...".to_string(),
        "SCORING" => "Scoring sources...".to_string(),
        "SAVING_RESULTS" => "Saving results...".to_string(),
        "COMPLETED" => "Discovery completed".to_string(),
        "FETCH_HTML" => "Fetching page content...".to_string(),
        "PARSE_GRANTS" => "Extracting grant data...".to_string(),
        "SAVE_RESULTS" => "Saving opportunities...".to_string(),
        other => humanize(other),
    }
}

fn humanize(phase: &str) -> String {
    phase
        .chars()
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .collect()
}
