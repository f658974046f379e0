//! Logical path utilities
//!
//! Logical paths are slash-separated strings relative to a storage's base
//! path, with no leading/trailing slashes and no empty segments. Every path
//! that keys the entity registry is normalized here first.

/// Join path segments into a normalized logical path.
///
/// Each segment is split on `/`; empty and `.` fragments are discarded, the
/// rest are joined with a single `/`. Empty input yields the empty string,
/// which is the logical path of the storage root.
pub fn join_path<S: AsRef<str>>(segments: &[S]) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in segments {
        for part in segment.as_ref().split('/') {
            if !part.is_empty() && part != "." {
                parts.push(part);
            }
        }
    }
    parts.join("/")
}

/// Last segment of a logical path (the entry name).
pub fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
