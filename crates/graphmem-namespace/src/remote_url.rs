//! Remote URL canonicalization.

const STRIPPED_SCHEMES: &[&str] = &["http://", "https://", "ssh://"];

/// Normalizes a git remote URL so SSH, HTTPS and shorthand forms of the same
/// repository produce the same string.
///
/// `git@Host:Org/Repo.git`, `https://host/org/repo` and
/// `ssh://git@host/org/repo.git/` all normalize to `host/org/repo`.
pub fn normalize_remote_url(raw: &str) -> String {
    let mut value = raw.trim();
    for scheme in STRIPPED_SCHEMES {
        if let Some(rest) = value.strip_prefix(scheme) {
            value = rest;
            break;
        }
    }
    let value = strip_user_prefix(value);
    let value = expand_scp_shorthand(value);
    let lowered = value.trim_end_matches('/').to_lowercase();
    let value = lowered.strip_suffix(".git").unwrap_or(lowered.as_str());
    value.trim_end_matches('/').to_string()
}

/// Converts a repository-relative path into slash-joined form without leading
/// or trailing separators. `pkg\app\` becomes `pkg/app`.
pub fn normalize_relative_path(raw: &str) -> String {
    raw.trim()
        .replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

fn strip_user_prefix(value: &str) -> &str {
    let host_end = value.find('/').unwrap_or(value.len());
    match value[..host_end].rfind('@') {
        Some(at) => &value[at + 1..],
        None => value,
    }
}

fn expand_scp_shorthand(value: &str) -> String {
    let host_end = value.find('/').unwrap_or(value.len());
    let Some(colon) = value[..host_end].find(':') else {
        return value.to_string();
    };
    let (host, rest) = (&value[..colon], &value[colon + 1..]);
    if is_port_prefix(rest) {
        return value.to_string();
    }
    format!("{host}/{}", rest.trim_start_matches('/'))
}

fn is_port_prefix(rest: &str) -> bool {
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    digits > 0 && matches!(rest.as_bytes().get(digits), None | Some(b'/'))
}
