//! Path construction for application files.
//!
//! Object key: `{slug}/{version}/{file}`. Filesystem path: `/{slug}/{version}/{file}`,
//! legacy filesystem path: `/{slug}/{file}`. Empty segments are dropped; `..`
//! is kept as is, callers are trusted.

/// Join path segments with `/`, dropping empty segments.
pub fn join_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    segments
        .into_iter()
        .flat_map(|segment| segment.split('/'))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Object key of an application file inside its container.
pub fn object_name(slug: &str, version: &str, file: &str) -> String {
    join_segments([slug, version, file])
}

/// Default filesystem layout: `/{slug}/{version}/{file}`.
pub fn default_make_path(slug: &str, version: &str, file: &str) -> String {
    format!("/{}", join_segments([slug, version, file]))
}

/// Layout of applications installed before versioned directories existed.
// TODO: drop once no instance has unversioned application directories left.
pub fn legacy_make_path(slug: &str, _version: &str, file: &str) -> String {
    format!("/{}", join_segments([slug, file]))
}
