//! URL construction helpers.

use url::Url;

use crate::error::{BullhornError, ConfigurationError, ProtocolError};

fn parse(base: &str) -> Result<Url, BullhornError> {
    Url::parse(base).map_err(|_| {
        BullhornError::Configuration(ConfigurationError::InvalidEndpoint {
            url: base.to_string(),
        })
    })
}

/// Append path segments to `base`, percent-encoding each one.
pub fn join_path<I, S>(base: &str, segments: I) -> Result<Url, BullhornError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut url = parse(base)?;
    {
        let mut path = url.path_segments_mut().map_err(|_| {
            BullhornError::Configuration(ConfigurationError::InvalidEndpoint {
                url: base.to_string(),
            })
        })?;
        path.pop_if_empty();
        for segment in segments {
            path.push(segment.as_ref());
        }
    }
    Ok(url)
}

/// Append query parameters to a URL.
pub fn append_query<I, K, V>(mut url: Url, pairs: I) -> Url
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut pairs = pairs.into_iter().peekable();
    if pairs.peek().is_some() {
        url.query_pairs_mut().extend_pairs(pairs);
    }
    url
}

/// Parse `endpoint` and append query parameters.
pub fn with_query<I, K, V>(endpoint: &str, pairs: I) -> Result<String, BullhornError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    Ok(append_query(parse(endpoint)?, pairs).to_string())
}

/// Read one query parameter from a URL.
pub fn query_param(url: &str, name: &str) -> Option<String> {
    query_value(&Url::parse(url).ok()?, name)
}

/// Read one query parameter from a parsed URL.
pub fn query_value(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Resolve a `Location` header, absolute or relative, against the request URL.
pub fn resolve(base: &str, location: &str) -> Result<Url, BullhornError> {
    parse(base)?.join(location).map_err(|e| {
        ProtocolError::InvalidResponse {
            message: format!("invalid redirect location {location:?}: {e}"),
        }
        .into()
    })
}
