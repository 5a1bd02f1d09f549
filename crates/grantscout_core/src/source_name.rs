use url::Url;

const FALLBACK_NAME: &str = "Harvest Source";

/// Derives a display name for a source adopted from a discovery suggestion.
///
/// Preference order: the link's anchor text, the page title, the non-empty
/// path segments of the URL joined by spaces, then a fixed fallback.
pub fn suggested_source_name(anchor_text: Option<&str>, title: Option<&str>, url: &str) -> String {
    if let Some(anchor) = non_empty(anchor_text) {
        return anchor.to_string();
    }
    if let Some(title) = non_empty(title) {
        return title.to_string();
    }
    if let Some(name) = name_from_path(url) {
        return name;
    }
    FALLBACK_NAME.to_string()
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|text| !text.is_empty())
}

fn name_from_path(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segments: Vec<&str> = parsed
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .collect();
    if segments.is_empty() {
        return None;
    }
    Some(segments.join(" "))
}
