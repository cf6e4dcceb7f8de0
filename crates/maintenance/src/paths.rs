//! Lexical path handling for target-side paths.
//!
//! Plans describe paths on the machine being provisioned, not on the host
//! compiling the plan, so nothing here touches the local filesystem.

/// Return the shortest lexically equivalent form of `path`.
///
/// - Repeated separators collapse to one
/// - `.` components are dropped
/// - `..` removes the preceding component (and is dropped at the root)
/// - A trailing separator is removed
///
/// An empty path cleans to `.`.
pub fn clean(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Join `base` with `parts` and clean the result.
pub fn join(base: &str, parts: &[&str]) -> String {
    let mut joined = base.to_string();
    for part in parts.iter().filter(|p| !p.is_empty()) {
        if !joined.is_empty() {
            joined.push('/');
        }
        joined.push_str(part);
    }
    clean(&joined)
}

/// Parent directory of `path`, cleaned.
pub fn parent(path: &str) -> String {
    let cleaned = clean(path);
    match cleaned.rfind('/') {
        Some(0) => "/".to_string(),
        Some(idx) => cleaned[..idx].to_string(),
        None => ".".to_string(),
    }
}

/// Clean `value`, substituting `default` when it is empty.
pub(crate) fn or_default(value: &str, default: &str) -> String {
    if value.is_empty() {
        clean(default)
    } else {
        clean(value)
    }
}
