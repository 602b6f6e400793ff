use crate::model::{FileEntry, FileKind};

/// Take the next whitespace-delimited field, returning it and the rest.
fn next_field(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    Some((&s[..end], &s[end..]))
}

/// Parse one line of a Unix-style `LIST` response:
///
/// ```text
/// drwxr-xr-x    2 ftp      ftp          4096 Mar 03 10:15 incoming
/// ```
///
/// Returns `None` for headers (`total 12`), malformed lines and the
/// `.`/`..` entries. Symlinks are split on ` -> `.
pub fn parse_list_line(line: &str) -> Option<FileEntry> {
    let (permissions, rest) = next_field(line)?;
    let kind = match permissions.chars().next()? {
        'd' => FileKind::Directory,
        'l' => FileKind::Symlink,
        '-' => FileKind::File,
        _ => return None,
    };
    if permissions.len() < 10 {
        return None;
    }

    let (_links, rest) = next_field(rest)?;
    let (owner, rest) = next_field(rest)?;
    let (_group, rest) = next_field(rest)?;
    let (size, rest) = next_field(rest)?;
    let size: u64 = size.parse().ok()?;
    let (month, rest) = next_field(rest)?;
    let (day, rest) = next_field(rest)?;
    let (time, rest) = next_field(rest)?;

    let raw_name = rest.trim();
    let (name, link_target) = match (kind, raw_name.split_once(" -> ")) {
        (FileKind::Symlink, Some((name, target))) => (name, Some(target.to_owned())),
        _ => (raw_name, None),
    };
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }

    Some(FileEntry {
        name: name.to_owned(),
        kind,
        size,
        modified: format!("{month} {day} {time}"),
        permissions: permissions.to_owned(),
        owner: owner.to_owned(),
        link_target,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_line() {
        let entry =
            parse_list_line("drwxr-xr-x    2 ftp      ftp          4096 Mar 03 10:15 incoming")
                .unwrap();
        assert_eq!(entry.name, "incoming");
        assert_eq!(entry.kind, FileKind::Directory);
        assert_eq!(entry.size, 4096);
        assert_eq!(entry.owner, "ftp");
        assert_eq!(entry.modified, "Mar 03 10:15");
    }

    #[test]
    fn names_keep_spaces() {
        let entry =
            parse_list_line("-rw-r--r--    1 alice    staff    1048576 Jan 12  2024 annual report.pdf")
                .unwrap();
        assert_eq!(entry.name, "annual report.pdf");
        assert_eq!(entry.modified, "Jan 12 2024");
        assert_eq!(entry.kind, FileKind::File);
    }

    #[test]
    fn symlinks_split_target() {
        let entry =
            parse_list_line("lrwxrwxrwx    1 root     root           11 Feb 01 09:00 latest -> release-1.2")
                .unwrap();
        assert_eq!(entry.name, "latest");
        assert_eq!(entry.link_target.as_deref(), Some("release-1.2"));
    }

    #[test]
    fn skips_dots_and_noise() {
        assert!(parse_list_line("drwxr-xr-x 2 ftp ftp 4096 Mar 03 10:15 .").is_none());
        assert!(parse_list_line("drwxr-xr-x 2 ftp ftp 4096 Mar 03 10:15 ..").is_none());
        assert!(parse_list_line("total 12").is_none());
        assert!(parse_list_line("").is_none());
        assert!(parse_list_line("-rw-r--r-- 1 a b notanumber Jan 1 2024 x").is_none());
    }
}
