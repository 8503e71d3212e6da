use std::collections::BTreeSet;

/// Normalise a single tag for comparison: trimmed and lower-cased
#[inline]
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}

/// Normalise a list of tags into a set, dropping empty entries
pub fn normalize_tags<I, S>(tags: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|tag| normalize_tag(tag.as_ref()))
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Parse the comma-separated transport form, e.g. `"sport, Music,,sport"`
pub fn parse_tag_list(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(normalize_tag)
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Number of tags shared by the requested set and a candidate's set
///
/// Both sets are expected to be normalised already.
pub fn tag_overlap(requested: &BTreeSet<String>, candidate: &BTreeSet<String>) -> usize {
    // Walk the smaller set, probe the larger
    let (small, large) = if requested.len() <= candidate.len() {
        (requested, candidate)
    } else {
        (candidate, requested)
    };
    small.iter().filter(|tag| large.contains(*tag)).count()
}

/// Overlap for raw, un-normalised tag lists
pub fn raw_tag_overlap<A: AsRef<str>, B: AsRef<str>>(requested: &[A], candidate: &[B]) -> usize {
    tag_overlap(&normalize_tags(requested), &normalize_tags(candidate))
}
