use subtle::ConstantTimeEq;

/// Constant-time string comparison to prevent timing attacks
/// Use this for comparing the preview token and other shared secrets
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Whether a request may see drafts.
///
/// With no configured token, preview is open to anyone who asks for it.
/// Otherwise the presented token must match.
pub fn preview_allowed(configured: Option<&str>, presented: Option<&str>) -> bool {
    match (configured, presented) {
        (None, _) => true,
        (Some(expected), Some(given)) => constant_time_compare(expected, given),
        (Some(_), None) => false,
    }
}
