//! Absolute URLs advertised to clients.
//!
//! Terraform follows the discovery document and the `X-Terraform-Get` header
//! literally, so both must point back at this service as the client sees it.

use axum::http::header::HOST;
use axum::http::{HeaderMap, Uri};
use url::Url;

use crate::domain::model::{ModuleCoordinate, ModuleVersion};

const FORWARDED_PROTO: &str = "x-forwarded-proto";
const FORWARDED_HOST: &str = "x-forwarded-host";
const FALLBACK_ORIGIN: &str = "http://localhost/";

/// Builds service URLs, either from a configured public URL or from the
/// origin of the inbound request.
#[derive(Debug, Clone, Default)]
pub struct Links {
    public_url: Option<Url>,
}

impl Links {
    #[must_use]
    pub fn new(public_url: Option<Url>) -> Self {
        let public_url = public_url.map(|mut url| {
            if !url.path().ends_with('/') {
                let path = format!("{}/", url.path());
                url.set_path(&path);
            }
            url.set_query(None);
            url.set_fragment(None);
            url
        });
        Self { public_url }
    }

    /// Service base for this request, always ending in `/`.
    #[must_use]
    pub fn base(&self, uri: &Uri, headers: &HeaderMap) -> Url {
        if let Some(url) = &self.public_url {
            return url.clone();
        }

        let scheme = uri
            .scheme_str()
            .or_else(|| first_header_value(headers, FORWARDED_PROTO))
            .unwrap_or("http");
        let authority = uri
            .authority()
            .map(axum::http::uri::Authority::as_str)
            .or_else(|| first_header_value(headers, FORWARDED_HOST))
            .or_else(|| first_header_value(headers, HOST.as_str()));

        authority
            .and_then(|authority| Url::parse(&format!("{scheme}://{authority}/")).ok())
            .unwrap_or_else(|| {
                tracing::debug!("Cannot derive request origin, falling back to localhost");
                Url::parse(FALLBACK_ORIGIN).unwrap_or_else(|_| unreachable!("static URL"))
            })
    }

    /// `<base>/v1/modules/`
    #[must_use]
    pub fn modules_v1(&self, uri: &Uri, headers: &HeaderMap) -> Url {
        with_segments(self.base(uri, headers), &["v1", "modules", ""])
    }

    /// `<base>/v1/modules/<namespace>/<name>/<system>/<version>/file.zip`
    #[must_use]
    pub fn archive(
        &self,
        uri: &Uri,
        headers: &HeaderMap,
        module: &ModuleCoordinate,
        version: &ModuleVersion,
    ) -> Url {
        let [namespace, name, system] = module.segments();
        with_segments(
            self.base(uri, headers),
            &[
                "v1",
                "modules",
                namespace,
                name,
                system,
                version.as_str(),
                "file.zip",
            ],
        )
    }
}

fn with_segments(mut url: Url, segments: &[&str]) -> Url {
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// First comma-separated value of a header, as proxies may append.
fn first_header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
