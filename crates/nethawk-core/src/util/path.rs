/// Directory an FTP listing should move to when `name` is opened from
/// `cwd`.
///
/// `..` goes up one level, `.` stays, anything else is joined. Doubled
/// slashes collapse, a trailing slash is dropped and the empty path is
/// the root.
pub fn next_path(cwd: &str, name: &str) -> String {
    let joined = match name {
        ".." => {
            let parts: Vec<&str> = cwd.split('/').filter(|p| !p.is_empty()).collect();
            match parts.split_last() {
                Some((_, parent)) => format!("/{}", parent.join("/")),
                None => "/".to_owned(),
            }
        }
        "." => cwd.to_owned(),
        _ => {
            let base = if cwd == "/" { "" } else { cwd };
            format!("{base}/{name}")
        }
    };

    let mut normalized = joined;
    while normalized.contains("//") {
        normalized = normalized.replace("//", "/");
    }
    let trimmed = normalized.strip_suffix('/').unwrap_or(&normalized);
    if trimmed.is_empty() {
        "/".to_owned()
    } else {
        trimmed.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descends() {
        assert_eq!(next_path("/", "pub"), "/pub");
        assert_eq!(next_path("/pub", "linux"), "/pub/linux");
    }

    #[test]
    fn ascends() {
        assert_eq!(next_path("/pub/linux", ".."), "/pub");
        assert_eq!(next_path("/pub", ".."), "/");
        assert_eq!(next_path("/", ".."), "/");
    }

    #[test]
    fn stays() {
        assert_eq!(next_path("/pub", "."), "/pub");
    }

    #[test]
    fn normalizes_slashes() {
        assert_eq!(next_path("/pub/", "x/"), "/pub/x");
        assert_eq!(next_path("//", "."), "/");
    }
}
