//! Domain/path sanitization for the webvh log file location.

use crate::error::{Error, Result};

/// Sanitize a domain into a filesystem-safe segment: URL-decode, lowercase,
/// and replace every character outside `[a-z0-9._-]` with `_`.
#[must_use]
pub fn safe_domain(domain: &str) -> String {
    let decoded = urlencoding_decode(domain);
    decoded
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect()
}

/// Percent-decode `input`, passing through any byte that isn't part of a
/// valid `%XX` escape unchanged.
fn urlencoding_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let Ok(hex) = std::str::from_utf8(&bytes[i + 1..i + 3]) {
                if let Ok(byte) = u8::from_str_radix(hex, 16) {
                    out.push(byte);
                    i += 3;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Validate a single path segment against traversal: empty,
/// `.`, `..`, `/`, `\`, a null byte, or an absolute path are all forbidden.
///
/// # Errors
///
/// Returns [`Error::Input`] if the segment is forbidden.
pub fn validate_path_segment(segment: &str) -> Result<()> {
    if segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.contains('/')
        || segment.contains('\\')
        || segment.contains('\0')
        || segment.starts_with('/')
    {
        return Err(Error::Input(format!("invalid path segment: {segment:?}")));
    }
    Ok(())
}

/// Validate a domain for webvh creation: `localhost`, a dotted hostname with
/// an optional `:port` (1-65535), or a dotted-quad IPv4 literal (also
/// optionally with `:port`), for development use.
///
/// # Errors
///
/// Returns [`Error::Input`] if `domain` doesn't match any accepted shape.
pub fn validate_domain(domain: &str) -> Result<()> {
    let (host, port) = match domain.rsplit_once(':') {
        Some((h, p)) if p.chars().all(|c| c.is_ascii_digit()) && !p.is_empty() => {
            (h, Some(p))
        }
        _ => (domain, None),
    };

    if let Some(port) = port {
        let port_num: u32 =
            port.parse().map_err(|_| Error::Input(format!("invalid port: {port}")))?;
        if port_num == 0 || port_num > 65535 {
            return Err(Error::Input(format!("port out of range: {port}")));
        }
    }

    if host == "localhost" {
        return Ok(());
    }

    let is_ipv4 = host.split('.').count() == 4
        && host.split('.').all(|octet| !octet.is_empty() && octet.parse::<u8>().is_ok());
    if is_ipv4 {
        return Ok(());
    }

    let is_dotted_hostname = !host.is_empty()
        && host.contains('.')
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-'));
    if is_dotted_hostname {
        return Ok(());
    }

    Err(Error::Input(format!("invalid webvh domain: {domain}")))
}

/// Resolve `base_dir`/`did`/`safe_domain(domain)`/`path_segments`/`did.jsonl`,
/// rejecting any result that would escape `base_dir`.
///
/// # Errors
///
/// Returns [`Error::Input`] for a forbidden path segment, or
/// [`Error::Integrity`] if the resolved path would escape `base_dir`.
pub fn log_file_path(
    base_dir: &std::path::Path, domain: &str, path_segments: &[String],
) -> Result<std::path::PathBuf> {
    for segment in path_segments {
        validate_path_segment(segment)?;
    }
    let mut path = base_dir.join("did").join(safe_domain(domain));
    for segment in path_segments {
        path.push(segment);
    }
    path.push("did.jsonl");

    let base_canonical = base_dir.to_path_buf();
    if !path.starts_with(&base_canonical) {
        return Err(Error::Integrity(format!(
            "resolved webvh log path escapes base directory: {}",
            path.display()
        )));
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_domain_replaces_unsafe_chars() {
        assert_eq!(safe_domain("Example.COM"), "example.com");
        assert_eq!(safe_domain("ex ample.com"), "ex_ample.com");
    }

    #[test]
    fn rejects_traversal_segments() {
        assert!(validate_path_segment("..").is_err());
        assert!(validate_path_segment(".").is_err());
        assert!(validate_path_segment("").is_err());
        assert!(validate_path_segment("a/b").is_err());
        assert!(validate_path_segment("/abs").is_err());
        assert!(validate_path_segment("a\0b").is_err());
    }

    #[test]
    fn accepts_development_domains() {
        assert!(validate_domain("localhost").is_ok());
        assert!(validate_domain("localhost:8080").is_ok());
        assert!(validate_domain("example.com").is_ok());
        assert!(validate_domain("127.0.0.1").is_ok());
        assert!(validate_domain("127.0.0.1:3000").is_ok());
    }

    #[test]
    fn rejects_invalid_domains() {
        assert!(validate_domain("not a domain").is_err());
        assert!(validate_domain("example.com:99999").is_err());
    }

    #[test]
    fn log_file_path_stays_within_base_dir() {
        let base = std::path::Path::new("/tmp/originals");
        let path =
            log_file_path(base, "example.com", &["alice".to_string()]).expect("should resolve");
        assert!(path.starts_with(base));
        assert!(path.ends_with("did/example.com/alice/did.jsonl"));
    }
}
