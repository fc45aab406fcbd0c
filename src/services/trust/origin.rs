//! URI comparison helpers for the trust rules. Free functions over borrowed
//! strings; any parse failure is a non-match, never an error.

use url::Url;

/// True when both URIs parse and share an origin (scheme + host + port).
pub fn origin_matches(a: &str, b: &str) -> bool {
    match (Url::parse(a), Url::parse(b)) {
        (Ok(a), Ok(b)) => a.origin() == b.origin(),
        _ => false,
    }
}

/// True when `candidate`'s host, with its single leftmost label removed,
/// equals `authority`'s host, and both share a scheme. Exactly one level of
/// delegation: `a.b.example.com` is a subdomain of `b.example.com` but not
/// of `example.com`.
pub fn is_subdomain(candidate: &str, authority: &str) -> bool {
    let (Ok(candidate), Ok(authority)) = (Url::parse(candidate), Url::parse(authority)) else {
        return false;
    };

    if candidate.scheme() != authority.scheme() {
        return false;
    }

    let (Some(candidate_host), Some(authority_host)) =
        (candidate.host_str(), authority.host_str())
    else {
        return false;
    };

    match candidate_host.split_once('.') {
        Some((_, parent)) => parent == authority_host,
        None => false,
    }
}

/// The combined direct-match rule: same origin, or candidate is one label
/// below the authority.
pub fn domain_matches(authority: &str, candidate: &str) -> bool {
    origin_matches(authority, candidate) || is_subdomain(candidate, authority)
}
