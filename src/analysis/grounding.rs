use super::types::GroundingSource;
use super::wire::GenerateResponse;

pub const DEFAULT_SOURCE_TITLE: &str = "Search Result";

/// Web citations attached to the first candidate, in the order returned.
/// `None` unless at least one chunk carries a web reference.
pub fn extract_grounding_sources(response: &GenerateResponse) -> Option<Vec<GroundingSource>> {
    let metadata = response.candidates.first()?.grounding_metadata.as_ref()?;
    let sources: Vec<GroundingSource> = metadata
        .grounding_chunks
        .iter()
        .filter_map(|chunk| chunk.web.as_ref())
        .map(|web| GroundingSource {
            title: web
                .title
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_SOURCE_TITLE.to_string()),
            uri: web.uri.clone().unwrap_or_default(),
        })
        .collect();

    (!sources.is_empty()).then_some(sources)
}
