use crate::error::CoreError;

/// A well-known port with its conventional service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommonPort {
    pub number: u16,
    pub service: &'static str,
    pub description: &'static str,
}

const fn common(number: u16, service: &'static str, description: &'static str) -> CommonPort {
    CommonPort {
        number,
        service,
        description,
    }
}

/// Quick-pick ports offered by the scanner, ascending.
pub const COMMON_PORTS: &[CommonPort] = &[
    common(21, "FTP", "File Transfer Protocol"),
    common(22, "SSH", "Secure Shell"),
    common(23, "Telnet", "Telnet Protocol"),
    common(25, "SMTP", "Simple Mail Transfer Protocol"),
    common(53, "DNS", "Domain Name System"),
    common(80, "HTTP", "Hypertext Transfer Protocol"),
    common(110, "POP3", "Post Office Protocol v3"),
    common(143, "IMAP", "Internet Message Access Protocol"),
    common(443, "HTTPS", "HTTP Secure"),
    common(993, "IMAPS", "IMAP over SSL"),
    common(995, "POP3S", "POP3 over SSL"),
];

/// `(service, description)` for a port, `("Unknown", "N/A")` when it is
/// not in [`COMMON_PORTS`].
pub fn port_details(number: u16) -> (&'static str, &'static str) {
    COMMON_PORTS
        .binary_search_by_key(&number, |p| p.number)
        .ok()
        .and_then(|idx| COMMON_PORTS.get(idx))
        .map_or(("Unknown", "N/A"), |p| (p.service, p.description))
}

/// Parse a port specification like `22, 80, 8000-8010`.
///
/// Fragments are comma-separated single ports or inclusive `a-b`
/// ranges. Any invalid fragment fails the whole parse with an error
/// naming it. The result is deduplicated and ascending.
pub fn parse_ports(input: &str) -> Result<Vec<u16>, CoreError> {
    let mut out = Vec::new();

    for fragment in input.split(',').map(str::trim) {
        if fragment.is_empty() {
            continue;
        }

        if let Some((a, b)) = fragment.split_once('-') {
            let start = parse_port(a.trim(), fragment)?;
            let end = parse_port(b.trim(), fragment)?;
            if start > end {
                return Err(CoreError::validation(format!(
                    "invalid port range '{fragment}': start is greater than end"
                )));
            }
            out.extend(start..=end);
        } else {
            out.push(parse_port(fragment, fragment)?);
        }
    }

    out.sort_unstable();
    out.dedup();
    Ok(out)
}

fn parse_port(value: &str, fragment: &str) -> Result<u16, CoreError> {
    match value.parse::<u16>() {
        Ok(0) | Err(_) => Err(CoreError::validation(format!(
            "invalid port '{fragment}': expected 1-65535 or a range like 8000-8010"
        ))),
        Ok(port) => Ok(port),
    }
}

/// Union of two port lists, deduplicated and ascending.
pub fn merge_ports(a: &[u16], b: &[u16]) -> Vec<u16> {
    let mut merged: Vec<u16> = a.iter().chain(b).copied().collect();
    merged.sort_unstable();
    merged.dedup();
    merged
}

/// Comma-separated wire form the backend expects.
pub fn join_ports(ports: &[u16]) -> String {
    ports
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singles_and_ranges() {
        assert_eq!(parse_ports("443, 22,80-82").ok(), Some(vec![22, 80, 81, 82, 443]));
    }

    #[test]
    fn dedupes_overlaps() {
        assert_eq!(parse_ports("80,79-81,80").ok(), Some(vec![79, 80, 81]));
    }

    #[test]
    fn blank_input_is_empty() {
        assert_eq!(parse_ports("  ").ok(), Some(vec![]));
        assert_eq!(parse_ports("22,,").ok(), Some(vec![22]));
    }

    #[test]
    fn invalid_fragments_are_named() {
        for bad in ["abc", "0", "70000", "90-80", "1-x"] {
            let err = parse_ports(&format!("22,{bad}")).unwrap_err();
            assert!(err.to_string().contains(bad), "{err}");
        }
    }

    #[test]
    fn full_range_edges() {
        let ports = parse_ports("65534-65535").unwrap();
        assert_eq!(ports, vec![65534, 65535]);
    }

    #[test]
    fn merge_unions_sorted() {
        assert_eq!(merge_ports(&[443, 22], &[22, 80]), vec![22, 80, 443]);
    }

    #[test]
    fn details_fall_back() {
        assert_eq!(port_details(22), ("SSH", "Secure Shell"));
        assert_eq!(port_details(31337), ("Unknown", "N/A"));
    }

    #[test]
    fn common_table_is_sorted() {
        assert!(COMMON_PORTS.windows(2).all(|w| w[0].number < w[1].number));
    }

    #[test]
    fn joins_for_the_wire() {
        assert_eq!(join_ports(&[22, 80, 443]), "22,80,443");
    }
}
