use std::net::Ipv4Addr;

pub fn is_valid_ipv4(s: &str) -> bool {
    s.trim().parse::<Ipv4Addr>().is_ok()
}

/// RFC 1123 hostname: dot-separated labels of 1-63 alphanumerics or
/// inner hyphens, at most 253 characters overall.
pub fn is_valid_hostname(s: &str) -> bool {
    let s = s.strip_suffix('.').unwrap_or(s);
    if s.is_empty() || s.len() > 253 {
        return false;
    }
    s.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

/// Scan target check: an IPv4 address, or a hostname that is not an
/// all-numeric dotted string (those must parse as IPv4).
pub fn is_valid_host(s: &str) -> bool {
    let s = s.trim();
    if is_valid_ipv4(s) {
        return true;
    }
    let all_numeric = s.split('.').all(|l| l.chars().all(|c| c.is_ascii_digit()));
    !all_numeric && is_valid_hostname(s)
}

/// Network scan range: a single address, `a.b.c.d-e` (last-octet
/// range), `a.b.c.d-a.b.c.e` or CIDR `a.b.c.d/n`.
pub fn is_valid_ip_range(s: &str) -> bool {
    let s = s.trim();
    if let Some((addr, prefix)) = s.split_once('/') {
        return is_valid_ipv4(addr) && prefix.parse::<u8>().is_ok_and(|n| n <= 32);
    }
    let Some((start, end)) = s.split_once('-') else {
        return is_valid_ipv4(s);
    };
    let Ok(start) = start.trim().parse::<Ipv4Addr>() else {
        return false;
    };
    let end = end.trim();
    if let Ok(octet) = end.parse::<u8>() {
        return octet >= start.octets()[3];
    }
    end.parse::<Ipv4Addr>().is_ok_and(|end| end >= start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipv4() {
        assert!(is_valid_ipv4("192.168.1.10"));
        assert!(!is_valid_ipv4("192.168.1"));
        assert!(!is_valid_ipv4("256.1.1.1"));
    }

    #[test]
    fn hosts() {
        assert!(is_valid_host("127.0.0.1"));
        assert!(is_valid_host("router.local"));
        assert!(is_valid_host("scanme.nmap.org"));
        assert!(!is_valid_host("999.1.1.1"));
        assert!(!is_valid_host("bad_host"));
        assert!(!is_valid_host("-edge.example"));
        assert!(!is_valid_host(""));
    }

    #[test]
    fn ranges() {
        assert!(is_valid_ip_range("192.168.1.1-254"));
        assert!(is_valid_ip_range("192.168.1.0/24"));
        assert!(is_valid_ip_range("10.0.0.1 - 10.0.1.10"));
        assert!(is_valid_ip_range("10.0.0.7"));
        assert!(!is_valid_ip_range("192.168.1.200-100"));
        assert!(!is_valid_ip_range("192.168.1.0/33"));
        assert!(!is_valid_ip_range("192.168.1.1-300"));
        assert!(!is_valid_ip_range("subnet"));
    }
}
