//! URI helpers: registration origins, base URIs and top private domains.

use url::Url;

/// Scheme used for app destinations and registrants.
pub const ANDROID_APP_SCHEME: &str = "android-app";

/// Scheme, host and explicit port of `uri`, with path, query and fragment dropped.
///
/// Returns `None` when the URI has no host.
///
/// # Examples
///
/// ```
/// use registration_fetcher::web::registration_origin;
/// use url::Url;
///
/// let uri = Url::parse("https://test1.example.test:8081/path1?x=1").unwrap();
/// assert_eq!(registration_origin(&uri).as_deref(), Some("https://test1.example.test:8081"));
/// ```
pub fn registration_origin(uri: &Url) -> Option<String> {
    let host = uri.host_str()?;
    if host.is_empty() {
        return None;
    }
    Some(match uri.port() {
        Some(port) => format!("{}://{}:{}", uri.scheme(), host, port),
        None => format!("{}://{}", uri.scheme(), host),
    })
}

/// Base URI of an app or web URI: the same as [`registration_origin`], used
/// for publishers and app destinations.
pub fn base_uri(uri: &Url) -> Option<String> {
    registration_origin(uri)
}

/// Scheme plus top private domain (eTLD+1) of a web URI.
///
/// `https://a.b.example.co.uk/path` becomes `https://example.co.uk`. Returns
/// `None` for URIs without a domain host, for IP hosts and for hosts that are
/// themselves a public suffix.
pub fn top_private_domain_and_scheme(uri: &Url) -> Option<String> {
    let host = match uri.host()? {
        url::Host::Domain(domain) => domain,
        url::Host::Ipv4(_) | url::Host::Ipv6(_) => return None,
    };
    let domain = psl::domain_str(host)?;
    Some(format!("{}://{}", uri.scheme(), domain))
}

/// `uri` as a string, without the `/` path the URL parser adds to bare
/// origins.
///
/// `https://advertiser.test` stays `https://advertiser.test`; URIs with a
/// real path, query or fragment are returned unchanged.
pub fn uri_without_root_path(uri: &Url) -> String {
    let serialized = uri.as_str();
    if uri.path() == "/" && uri.query().is_none() && uri.fragment().is_none() {
        serialized.strip_suffix('/').unwrap_or(serialized).to_string()
    } else {
        serialized.to_string()
    }
}

/// Package name of an `android-app://` registrant.
pub fn package_name(registrant: &Url) -> Option<&str> {
    if registrant.scheme() != ANDROID_APP_SCHEME {
        return None;
    }
    registrant.host_str().filter(|host| !host.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).expect("test URL should parse")
    }

    #[test]
    fn test_registration_origin_drops_path_and_query() {
        assert_eq!(
            registration_origin(&url("https://test1.example.test/path1?x=1#frag")).as_deref(),
            Some("https://test1.example.test")
        );
    }

    #[test]
    fn test_registration_origin_keeps_explicit_port() {
        assert_eq!(
            registration_origin(&url("https://test1.example.test:8081/path")).as_deref(),
            Some("https://test1.example.test:8081")
        );
    }

    #[test]
    fn test_registration_origin_default_port_is_elided() {
        // The URL parser drops default ports, so :443 never shows up
        assert_eq!(
            registration_origin(&url("https://test1.example.test:443/")).as_deref(),
            Some("https://test1.example.test")
        );
    }

    #[test]
    fn test_registration_origin_without_host() {
        assert_eq!(registration_origin(&url("data:text/plain,hello")), None);
    }

    #[test]
    fn test_base_uri_for_app() {
        assert_eq!(
            base_uri(&url("android-app://com.example.app/deep/link")).as_deref(),
            Some("android-app://com.example.app")
        );
    }

    #[test]
    fn test_top_private_domain_and_scheme() {
        assert_eq!(
            top_private_domain_and_scheme(&url("https://a.b.example.co.uk/path")).as_deref(),
            Some("https://example.co.uk")
        );
        assert_eq!(
            top_private_domain_and_scheme(&url("https://web-destination.test")).as_deref(),
            Some("https://web-destination.test")
        );
        assert_eq!(
            top_private_domain_and_scheme(&url("https://127.0.0.1/")),
            None
        );
    }

    #[test]
    fn test_package_name() {
        assert_eq!(
            package_name(&url("android-app://com.example.app")),
            Some("com.example.app")
        );
        assert_eq!(package_name(&url("https://com.example.app")), None);
    }

    #[test]
    fn test_uri_without_root_path() {
        assert_eq!(
            uri_without_root_path(&url("https://advertiser.test")),
            "https://advertiser.test"
        );
        assert_eq!(
            uri_without_root_path(&url("https://advertiser.test/shop?x=1")),
            "https://advertiser.test/shop?x=1"
        );
    }
}
