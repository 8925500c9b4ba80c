//! Image download for inline vision requests.
//!
//! Loopback, private, link-local and cloud-metadata addresses are never
//! fetched: not as the first URL, not as a redirect hop, and not as the
//! resolved address of a public-looking host name.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::redirect::Policy;
use url::{Host, Url};

use crate::error::{ProviderError, check_status};
use crate::traits::{ImageInput, ImageSource};

const SERVICE: &str = "image host";
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko)";
const BLOCKED_HOSTS: &[&str] = &["localhost", "metadata.google.internal"];
const FETCH_TIMEOUT: Duration = Duration::from_secs(20);
const MAX_REDIRECTS: usize = 5;
/// Largest image sent inline.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    pub fn new() -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .redirect(Policy::custom(|attempt| {
                let verdict = check_redirect(attempt.url(), attempt.previous().len());
                match verdict {
                    Ok(()) => attempt.follow(),
                    Err(reason) => attempt.error(reason),
                }
            }))
            .dns_resolver(Arc::new(PublicResolver))
            .build()
            .map_err(ProviderError::fetch(SERVICE))?;
        Ok(Self { client })
    }
}

/// Whether `ip` is loopback, private, link-local, shared or otherwise not
/// a public unicast address.
pub fn is_blocked_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let [a, b, ..] = v4.octets();
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast()
                || v4.is_documentation()
                // 100.64.0.0/10, carrier-grade NAT
                || (a == 100 && (b & 0xc0) == 64)
        }
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_blocked_ip(IpAddr::V4(v4)),
            None => {
                let first = v6.segments()[0];
                v6.is_loopback()
                    || v6.is_unspecified()
                    || (first & 0xfe00) == 0xfc00
                    || (first & 0xffc0) == 0xfe80
            }
        },
    }
}

/// Only public http(s) URLs are fetched.
pub fn check_fetchable(raw: &str) -> Result<Url, ProviderError> {
    let rejected = |reason: &str| ProviderError::Rejected {
        url: raw.to_string(),
        reason: reason.to_string(),
    };
    let parsed = Url::parse(raw).map_err(|e| rejected(&e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(rejected("unsupported scheme"));
    }
    let blocked = match parsed.host() {
        None => true,
        Some(Host::Ipv4(ip)) => is_blocked_ip(IpAddr::V4(ip)),
        Some(Host::Ipv6(ip)) => is_blocked_ip(IpAddr::V6(ip)),
        Some(Host::Domain(domain)) => {
            let domain = domain.to_ascii_lowercase();
            BLOCKED_HOSTS.contains(&domain.as_str())
                || domain.ends_with(".localhost")
                || domain.ends_with(".internal")
        }
    };
    if blocked {
        return Err(rejected("blocked host"));
    }
    Ok(parsed)
}

/// Every redirect hop passes the same check as the first URL.
fn check_redirect(target: &Url, hops: usize) -> Result<(), String> {
    if hops >= MAX_REDIRECTS {
        return Err(format!("more than {MAX_REDIRECTS} redirects"));
    }
    check_fetchable(target.as_str())
        .map(|_| ())
        .map_err(|e| e.to_string())
}

/// System resolver that drops blocked addresses, so a public name pointing
/// at a private address fails to connect.
struct PublicResolver;

type ResolveError = Box<dyn std::error::Error + Send + Sync>;

impl Resolve for PublicResolver {
    fn resolve(&self, name: Name) -> Resolving {
        Box::pin(async move {
            let host = name.as_str().to_string();
            let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host.as_str(), 0))
                .await?
                .filter(|addr| !is_blocked_ip(addr.ip()))
                .collect();
            if addrs.is_empty() {
                return Err(ResolveError::from(format!("{host} has no public address")));
            }
            let addrs: Addrs = Box::new(addrs.into_iter());
            Ok::<Addrs, ResolveError>(addrs)
        })
    }
}

/// MIME type implied by a URL's file extension; JPEG when unknown.
pub fn guess_mime_type(url: &str) -> &'static str {
    let path = url.split(['?', '#']).next().unwrap_or(url).to_lowercase();
    match path.rsplit('.').next() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        _ => "image/jpeg",
    }
}

/// A usable image response: `image/*` content type and a non-empty body.
fn validate_image(content_type: &str, data: &[u8]) -> Result<(), ProviderError> {
    if !content_type.starts_with("image/") {
        return Err(ProviderError::malformed(
            SERVICE,
            format!("content type '{content_type}' is not an image"),
        ));
    }
    if data.is_empty() {
        return Err(ProviderError::malformed(SERVICE, "empty image data received"));
    }
    Ok(())
}

#[async_trait]
impl ImageSource for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<ImageInput, ProviderError> {
        let parsed = check_fetchable(url)?;
        let response = self
            .client
            .get(parsed)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .header(ACCEPT, "image/*")
            .send()
            .await
            .map_err(ProviderError::fetch(SERVICE))?;
        let mut response = check_status(SERVICE, response).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if response.content_length().is_some_and(|len| len > MAX_IMAGE_BYTES as u64) {
            return Err(too_large());
        }

        let mut data = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(ProviderError::fetch(SERVICE))? {
            if data.len() + chunk.len() > MAX_IMAGE_BYTES {
                return Err(too_large());
            }
            data.extend_from_slice(&chunk);
        }
        validate_image(&content_type, &data)?;

        // Drop parameters such as `; charset=binary`.
        let mime_type = content_type.split(';').next().unwrap_or("").trim().to_string();
        Ok(ImageInput::Inline { mime_type, data })
    }
}

fn too_large() -> ProviderError {
    ProviderError::malformed(SERVICE, format!("image exceeds {MAX_IMAGE_BYTES} bytes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_local_and_odd_urls() {
        assert!(check_fetchable("http://localhost:3000/x.png").is_err());
        assert!(check_fetchable("http://169.254.169.254/latest/meta-data").is_err());
        assert!(check_fetchable("http://metadata.google.internal/").is_err());
        assert!(check_fetchable("file:///etc/passwd").is_err());
        assert!(check_fetchable("not a url").is_err());
        assert!(check_fetchable("https://images.test/shot.png").is_ok());
    }

    #[test]
    fn rejects_private_address_literals() {
        for url in [
            "http://127.0.0.2/a.png",
            "http://10.1.2.3/a.png",
            "http://192.168.0.10/a.png",
            "http://172.16.5.4/a.png",
            "http://100.64.0.1/a.png",
            "http://0.0.0.0/a.png",
            "http://[::1]/a.png",
            "http://[::ffff:127.0.0.1]/a.png",
            "http://[fd00::1]/a.png",
            "http://[fe80::1]/a.png",
        ] {
            assert!(check_fetchable(url).is_err(), "{url} should be blocked");
        }
        assert!(check_fetchable("http://93.184.216.34/a.png").is_ok());
        assert!(!is_blocked_ip("2606:4700::1111".parse().unwrap()));
    }

    #[test]
    fn redirect_hops_are_checked() {
        let public = Url::parse("https://cdn.test/a.png").unwrap();
        let metadata = Url::parse("http://169.254.169.254/latest/meta-data").unwrap();
        let private = Url::parse("http://10.0.0.1/a.png").unwrap();
        assert!(check_redirect(&public, 0).is_ok());
        assert!(check_redirect(&metadata, 0).is_err());
        assert!(check_redirect(&private, 1).is_err());
        assert!(check_redirect(&public, MAX_REDIRECTS).is_err());
    }

    #[tokio::test]
    async fn resolver_drops_loopback_addresses() {
        let name: Name = "localhost".parse().unwrap();
        assert!(PublicResolver.resolve(name).await.is_err());
    }

    #[test]
    fn guesses_mime_from_extension() {
        assert_eq!(guess_mime_type("https://x.test/a.PNG?w=300"), "image/png");
        assert_eq!(guess_mime_type("https://x.test/a.webp#frag"), "image/webp");
        assert_eq!(guess_mime_type("https://x.test/photo"), "image/jpeg");
    }

    #[test]
    fn validates_image_responses() {
        assert!(validate_image("image/png", &[1]).is_ok());
        assert!(validate_image("text/html; charset=utf-8", &[1]).is_err());
        assert!(validate_image("image/jpeg", &[]).is_err());
    }

    #[tokio::test]
    async fn blocked_host_is_rejected_before_any_request() {
        let err = HttpImageFetcher::new()
            .unwrap()
            .fetch("http://127.0.0.1/secret.png")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Rejected { .. }));
    }
}
