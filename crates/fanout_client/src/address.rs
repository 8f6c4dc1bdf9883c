//! Server address normalization.

use fanout_error::{ClientError, ClientErrorKind, ClientResult};
use reqwest::Url;

/// Parse a server address into a base URL ending in `/`.
///
/// Addresses without a scheme are treated as `http://`.
pub(crate) fn base_url(address: &str) -> ClientResult<Url> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(ClientError::new(ClientErrorKind::InvalidAddress(
            "address is empty".to_string(),
        )));
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };

    let mut url = Url::parse(&with_scheme).map_err(|e| {
        ClientError::new(ClientErrorKind::InvalidAddress(format!("{address}: {e}")))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::new(ClientErrorKind::InvalidAddress(format!(
            "{address}: unsupported scheme '{}'",
            url.scheme()
        ))));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Resolve an endpoint path against a base URL, keeping any base path prefix.
pub(crate) fn endpoint(base: &Url, path: &str) -> ClientResult<Url> {
    base.join(path.trim_start_matches('/')).map_err(|e| {
        ClientError::new(ClientErrorKind::InvalidAddress(format!("{base}{path}: {e}")))
    })
}
