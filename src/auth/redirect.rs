//! Helpers for redirect URLs during authentication flows.

use axum::{extract::Request, http::Uri};
use tracing::error;

use crate::endpoints;

fn is_safe_redirect_url(redirect_url: &str) -> bool {
    if !redirect_url.starts_with('/') || redirect_url.starts_with("//") {
        return false;
    }

    let path = redirect_url
        .split_once('?')
        .map(|(path, _)| path)
        .unwrap_or(redirect_url);

    path != endpoints::LOG_IN && path != endpoints::LOG_OUT
}

/// Reduce `raw_url` to a same-site path and query.
///
/// Returns `None` for absolute URLs, protocol-relative URLs, and the log-in
/// and log-out pages, so that the log-in form cannot be used as an open
/// redirect or to loop back onto itself.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }
    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_redirect_url(path_and_query).then(|| path_and_query.to_owned())
}

/// The URL of the log-in page that sends the user back to the page `request` asked for.
pub fn build_log_in_redirect_url(request: &Request) -> String {
    request
        .uri()
        .path_and_query()
        .and_then(|path_and_query| normalize_redirect_url(path_and_query.as_str()))
        .and_then(|redirect_target| build_log_in_redirect_url_from_target(&redirect_target))
        .unwrap_or_else(|| endpoints::LOG_IN.to_owned())
}

fn build_log_in_redirect_url_from_target(redirect_target: &str) -> Option<String> {
    // Nothing to come back to.
    if redirect_target == endpoints::DASHBOARD_VIEW {
        return Some(endpoints::LOG_IN.to_owned());
    }

    match serde_urlencoded::to_string([("redirect_url", redirect_target)]) {
        Ok(param) => Some(format!("{}?{}", endpoints::LOG_IN, param)),
        Err(error) => {
            error!("Could not encode redirect URL {redirect_target}: {error}");
            None
        }
    }
}
