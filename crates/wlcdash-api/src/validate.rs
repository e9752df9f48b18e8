// Precondition checks
//
// Pure functions guarding constructor and parameter input. Each returns a
// typed `Error` on violation and never coerces the input into shape.

use reqwest::StatusCode;
use url::Url;

use crate::error::Error;
use crate::session::Response;

/// Validate a controller base address and parse it.
///
/// The address must declare an `http://` or `https://` scheme and must not
/// end with a `/`; paths are appended with an explicit separator.
pub fn base_url(raw: &str) -> Result<Url, Error> {
    if !(raw.starts_with("http://") || raw.starts_with("https://")) {
        return Err(Error::validation(format!(
            "base URL '{raw}' must begin with http:// or https://"
        )));
    }
    if raw.ends_with('/') {
        return Err(Error::validation(format!(
            "base URL '{raw}' must not end with a forward-slash"
        ))
        .with_hint(format!("use '{}'", raw.trim_end_matches('/'))));
    }
    let url = Url::parse(raw)?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(Error::validation(format!("base URL '{raw}' has no host")));
    }
    Ok(url)
}

/// Check that a response's status is in the accepted set.
pub fn response_status(response: &Response, expect: &[StatusCode]) -> Result<(), Error> {
    if expect.contains(&response.status()) {
        return Ok(());
    }
    Err(Error::unexpected_status(
        response.request().method(),
        response.url(),
        response.status(),
        expect,
    ))
}

/// Validate a MAC address and return it in lowercase colon-separated form.
///
/// Accepts six hex octets separated by `:` or `-`.
pub fn mac_address(raw: &str) -> Result<String, Error> {
    let invalid = || {
        Error::validation(format!("'{raw}' is not a valid MAC address"))
            .with_hint("expected six hex octets, e.g. aa:bb:cc:dd:ee:ff")
    };

    let separator = if raw.contains('-') { '-' } else { ':' };
    let octets: Vec<&str> = raw.split(separator).collect();
    if octets.len() != 6 {
        return Err(invalid());
    }
    if !octets
        .iter()
        .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()))
    {
        return Err(invalid());
    }
    Ok(octets.join(":").to_ascii_lowercase())
}

/// Extract the single item of a filtered result set.
///
/// Zero or several items are both an [`AmbiguousMatch`](crate::ErrorKind::AmbiguousMatch).
pub fn exactly_one<T>(
    items: impl IntoIterator<Item = T>,
    what: impl std::fmt::Display,
) -> Result<T, Error> {
    let mut items = items.into_iter();
    match (items.next(), items.next()) {
        (Some(item), None) => Ok(item),
        (None, _) => Err(Error::ambiguous_match(what, 0)),
        (Some(_), Some(_)) => Err(Error::ambiguous_match(what, 2 + items.count())),
    }
}
