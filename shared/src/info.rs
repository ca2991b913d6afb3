//! Backslash-delimited info strings.
//!
//! Hosts advertise their metadata as a single string of alternating keys
//! and values: `\hostname\My Server\mapname\atcs\clients\3`. Both the
//! engine and the simulated hosts speak this format, so the helpers live
//! in the shared crate.

/// Returns the value stored under `key`, or an empty string if the key is
/// absent. Key comparison is case-insensitive, matching how hosts treat
/// their own config variables.
pub fn value_for_key<'a>(info: &'a str, key: &str) -> &'a str {
    let mut parts = info.split('\\');

    // a well-formed info string starts with a backslash
    if info.starts_with('\\') {
        parts.next();
    }

    loop {
        let k = match parts.next() {
            Some(k) => k,
            None => return "",
        };
        let v = match parts.next() {
            Some(v) => v,
            None => return "",
        };
        if k.eq_ignore_ascii_case(key) {
            return v;
        }
    }
}

/// Appends or replaces `key` in `info`, returning the rebuilt string.
pub fn set_value_for_key(info: &str, key: &str, value: &str) -> String {
    let mut out = String::new();
    let mut parts = info.split('\\');
    if info.starts_with('\\') {
        parts.next();
    }

    while let (Some(k), Some(v)) = (parts.next(), parts.next()) {
        if k.eq_ignore_ascii_case(key) {
            continue;
        }
        out.push('\\');
        out.push_str(k);
        out.push('\\');
        out.push_str(v);
    }

    out.push('\\');
    out.push_str(key);
    out.push('\\');
    out.push_str(value);
    out
}

/// Builds an info string from key/value pairs.
pub fn from_pairs(pairs: &[(&str, &str)]) -> String {
    let mut out = String::new();
    for (k, v) in pairs {
        out.push('\\');
        out.push_str(k);
        out.push('\\');
        out.push_str(v);
    }
    out
}

/// Returns false if the info string contains non-printing characters, or
/// if the hostname is blank/undefined. Hosts failing this check never make
/// it into the display list.
pub fn is_valid(info: &str) -> bool {
    if info.bytes().any(|b| !(0x20..0x7f).contains(&b)) {
        return false;
    }

    value_for_key(info, "hostname")
        .bytes()
        .any(|b| b.is_ascii_graphic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_for_key() {
        let info = "\\hostname\\ATCS 24/7\\mapname\\atcs\\clients\\5";
        assert_eq!(value_for_key(info, "hostname"), "ATCS 24/7");
        assert_eq!(value_for_key(info, "mapname"), "atcs");
        assert_eq!(value_for_key(info, "clients"), "5");
        assert_eq!(value_for_key(info, "missing"), "");
    }

    #[test]
    fn test_value_for_key_case_insensitive() {
        let info = "\\Hostname\\Foo";
        assert_eq!(value_for_key(info, "hostname"), "Foo");
    }

    #[test]
    fn test_set_value_replaces_existing() {
        let info = "\\hostname\\Foo\\clients\\2";
        let updated = set_value_for_key(info, "clients", "3");
        assert_eq!(value_for_key(&updated, "clients"), "3");
        assert_eq!(value_for_key(&updated, "hostname"), "Foo");
    }

    #[test]
    fn test_from_pairs_roundtrip() {
        let info = from_pairs(&[("hostname", "Foo"), ("mapname", "atcs")]);
        assert_eq!(info, "\\hostname\\Foo\\mapname\\atcs");
        assert_eq!(value_for_key(&info, "mapname"), "atcs");
    }

    #[test]
    fn test_is_valid_accepts_normal_info() {
        assert!(is_valid("\\hostname\\ATCS 24/7\\clients\\0"));
    }

    #[test]
    fn test_is_valid_rejects_nonprinting_bytes() {
        assert!(!is_valid("\\hostname\\bad\u{7}host"));
        assert!(!is_valid("\\hostname\\bad\nhost"));
    }

    #[test]
    fn test_is_valid_rejects_blank_hostname() {
        assert!(!is_valid("\\hostname\\   \\clients\\4"));
        assert!(!is_valid("\\mapname\\atcs"));
    }
}
