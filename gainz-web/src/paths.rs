//! Endpoint URLs that respect the deployment base path.

pub const TELEMETRY_ENDPOINT: &str = "api/telemetry";
pub const KEYS_ENDPOINT: &str = "api/keys";

/// Absolute path for a server endpoint.
///
/// When `PUBLIC_URL` is set at compile time (e.g., `/gainz` when hosted under a
/// subdirectory), generated URLs are prefixed accordingly. Local builds without
/// `PUBLIC_URL` fall back to root-anchored paths.
#[must_use]
pub fn api_path(relative: &str) -> String {
    api_path_with_base(relative, option_env!("PUBLIC_URL").unwrap_or(""))
}

fn api_path_with_base(relative: &str, base: &str) -> String {
    let base = base.trim().trim_end_matches('/');
    let rel = relative.trim_start_matches('/');

    if base.is_empty() {
        format!("/{rel}")
    } else {
        format!("{base}/{rel}")
    }
}
