// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

//! Cookie-bearing HTTP session.
//!
//! The remote site hands out an anonymous session cookie on its first page
//! view. [`Session`] keeps that cookie (and anything else the site sets) in
//! a [`CookieJar`] that survives between runs as `cookies.json`.

use anyhow::{Context, Result, anyhow};
use cookie_store::RawCookie;
use reqwest::Client;
use reqwest::StatusCode;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::config::{APP_ID, HttpConfig, SiteConfig};

/// Set by the site for every visitor, anonymous or not
pub const SESSION_COOKIE: &str = "_yasc";
/// Local marker for the configured account, never sent over the wire
pub const LOGIN_COOKIE: &str = "yandex_login";

/// True when `Set-Cookie` from `url` may carry this `Domain` attribute.
/// Public suffixes such as `ru` are only allowed for the suffix host itself.
fn domain_allowed(cookie: &RawCookie<'_>, url: &Url) -> bool {
    let Some(domain) = cookie.domain() else {
        return true;
    };
    let domain = domain.trim_start_matches('.').to_ascii_lowercase();
    if domain.is_empty() {
        return true;
    }
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    if psl::suffix_str(&domain) == Some(domain.as_str()) && domain != host {
        debug!("Rejecting cookie {} for public suffix {}", cookie.name(), domain);
        return false;
    }
    true
}

/// Persistent cookie jar plugged into the reqwest client
#[derive(Debug, Default)]
pub struct CookieJar {
    store: RwLock<cookie_store::CookieStore>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_store(&self) -> RwLockReadGuard<'_, cookie_store::CookieStore> {
        self.store.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_store(&self) -> RwLockWriteGuard<'_, cookie_store::CookieStore> {
        self.store.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Replaces the jar contents with the file's cookies. A missing or
    /// unreadable file leaves an empty jar.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> usize {
        let path = path.as_ref();
        let loaded = match File::open(path) {
            Ok(file) => cookie_store::serde::json::load_all(BufReader::new(file)).unwrap_or_else(|e| {
                warn!("Ignoring unreadable cookie file {}: {}", path.display(), e);
                cookie_store::CookieStore::default()
            }),
            Err(_) => {
                debug!("No cookie file at {}", path.display());
                cookie_store::CookieStore::default()
            }
        };

        for cookie in loaded.iter_unexpired() {
            debug!("Loaded cookie {}", cookie.name());
        }
        *self.write_store() = loaded;
        self.len()
    }

    /// Session cookies without an expiry are kept too; the site's
    /// anonymous cookie is one of them.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut content = Vec::new();
        cookie_store::serde::json::save_incl_expired_and_nonpersistent(&self.read_store(), &mut content)
            .map_err(|e| anyhow!("Failed to serialize cookies: {}", e))?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write cookie file: {}", path.display()))?;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.read_store()
            .iter_unexpired()
            .find(|c| c.name() == name)
            .map(|c| c.value().to_string())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Stores `cookie` as if `url` had set it.
    fn insert(&self, cookie: &RawCookie<'_>, url: &Url) {
        if let Err(e) = self.write_store().insert_raw(cookie, url) {
            warn!("Failed to store cookie {}: {}", cookie.name(), e);
        }
    }

    pub fn remove(&self, domain: &str, path: &str, name: &str) -> bool {
        self.write_store().remove(domain, path, name).is_some()
    }

    pub fn len(&self) -> usize {
        self.read_store().iter_unexpired().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl reqwest::cookie::CookieStore for CookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let cookies: Vec<RawCookie<'static>> = cookie_headers
            .filter_map(|value| value.to_str().ok())
            .filter_map(|raw| RawCookie::parse(raw.to_owned()).ok())
            .filter(|cookie| domain_allowed(cookie, url))
            .collect();
        for cookie in &cookies {
            debug!("Received cookie {} from {}", cookie.name(), url);
        }
        self.write_store().store_response_cookies(cookies.into_iter(), url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let header = self
            .read_store()
            .get_request_values(url)
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ");

        if header.is_empty() {
            None
        } else {
            HeaderValue::from_str(&header).ok()
        }
    }
}

/// Buffered response of [`Session::get`]
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }

    pub fn json(&self) -> Result<Value> {
        serde_json::from_slice(&self.body).with_context(|| "Failed to parse JSON response")
    }
}

#[derive(Debug)]
pub struct Session {
    client: Client,
    jar: Arc<CookieJar>,
    headers: HeaderMap,
    registered: bool,
}

impl Session {
    pub fn new(site: &SiteConfig, http: &HttpConfig) -> Result<Self> {
        let jar = Arc::new(CookieJar::new());

        let mut builder = Client::builder().cookie_provider(jar.clone());
        if http.timeout_seconds > 0 {
            builder = builder.timeout(Duration::from_secs(http.timeout_seconds));
        }

        Ok(Self {
            client: builder.build().with_context(|| "Failed to build HTTP client")?,
            jar,
            headers: default_headers(&site.user_agent)?,
            registered: false,
        })
    }

    pub fn jar(&self) -> &CookieJar {
        &self.jar
    }

    pub fn load<P: AsRef<Path>>(&self, path: P) -> usize {
        self.jar.load(path)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.jar.save(path)
    }

    /// Harvests the anonymous session cookie unless one is already stored.
    /// Issued at most once per process. Returns whether a request was made.
    pub async fn ensure_session(&mut self, registration_url: &str) -> bool {
        if self.registered || self.jar.contains(SESSION_COOKIE) {
            return false;
        }
        self.registered = true;

        debug!(
            "Session cookie missing, requesting one from {}",
            registration_url
        );

        let mut headers = self.headers.clone();
        headers.insert("sec-fetch-site", HeaderValue::from_static("none"));
        headers.insert("sec-fetch-user", HeaderValue::from_static("?1"));

        match self.get(registration_url, Some(&headers)).await {
            Ok(response) if !response.is_ok() => {
                warn!(
                    "Session registration at {} returned HTTP {}",
                    registration_url, response.status
                );
            }
            Ok(_) => {}
            Err(e) => warn!("Session registration failed: {:#}", e),
        }
        true
    }

    /// Records `login` as the active account. An empty login logs out; a
    /// different stored login is replaced.
    pub fn login(&mut self, login: &str) {
        match self.jar.get(LOGIN_COOKIE) {
            Some(current) if current == login => return,
            Some(previous) if !login.is_empty() => {
                debug!("Account changed from {} to {}", previous, login);
            }
            _ => {}
        }

        self.jar.remove(APP_ID, "/", LOGIN_COOKIE);
        if !login.is_empty() {
            let mut cookie = RawCookie::new(LOGIN_COOKIE, login.to_string());
            cookie.set_path("/");
            // Host of the marker; no request ever goes there
            match Url::parse(&format!("http://{APP_ID}/")) {
                Ok(url) => self.jar.insert(&cookie, &url),
                Err(e) => warn!("Failed to record login {}: {}", login, e),
            }
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.jar.contains(LOGIN_COOKIE)
    }

    fn request_headers(&self, url: &str, headers: Option<&HeaderMap>) -> Result<HeaderMap> {
        let mut headers = headers.cloned().unwrap_or_else(|| self.headers.clone());
        let parsed = Url::parse(url).with_context(|| format!("Invalid URL: {url}"))?;
        if let Some(host) = parsed.host_str() {
            let authority = match parsed.port() {
                Some(port) => format!("{host}:{port}"),
                None => host.to_string(),
            };
            headers.insert(header::HOST, HeaderValue::from_str(&authority)?);
        }
        Ok(headers)
    }

    pub async fn get(&self, url: &str, headers: Option<&HeaderMap>) -> Result<HttpResponse> {
        let response = self.get_stream(url, headers).await?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read response body from {url}"))?;
        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }

    /// Sends the request and returns the unread response.
    pub async fn get_stream(
        &self,
        url: &str,
        headers: Option<&HeaderMap>,
    ) -> Result<reqwest::Response> {
        let headers = self.request_headers(url, headers)?;
        debug!("GET {} with {} header(s)", url, headers.len());
        self.client
            .get(url)
            .headers(headers)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {url}"))
    }
}

fn default_headers(user_agent: &str) -> Result<HeaderMap> {
    let pairs = [
        ("user-agent", user_agent),
        (
            "accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
        ("accept-encoding", "gzip"),
        ("accept-language", "en-US,en;q=0.5"),
        ("connection", "keep-alive"),
        ("sec-fetch-dest", "document"),
        ("sec-fetch-mode", "navigate"),
        ("sec-fetch-site", "cross-site"),
        ("sec-gpc", "1"),
        ("upgrade-insecure-requests", "1"),
    ];

    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_str(value)
                .with_context(|| format!("Invalid value for header {name}"))?,
        );
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::cookie::CookieStore;
    use tempfile::tempdir;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn receive(jar: &CookieJar, from: &str, headers: &[&'static str]) {
        let headers: Vec<HeaderValue> = headers.iter().map(|h| HeaderValue::from_static(*h)).collect();
        jar.set_cookies(&mut headers.iter(), &url(from));
    }

    fn sent(jar: &CookieJar, to: &str) -> Vec<String> {
        let mut pairs: Vec<String> = jar
            .cookies(&url(to))
            .map(|h| h.to_str().unwrap().split("; ").map(str::to_string).collect())
            .unwrap_or_default();
        pairs.sort();
        pairs
    }

    #[test]
    fn store_sends_matching_cookies() {
        let jar = CookieJar::new();
        receive(&jar, "https://dzen.ru/video", &["a=1; Path=/", "b=2; Path=/"]);

        assert_eq!(sent(&jar, "https://dzen.ru/api/v3"), ["a=1", "b=2"]);
        assert!(jar.cookies(&url("https://other.ru/")).is_none());

        receive(&jar, "https://dzen.ru/video", &["a=gone; Path=/; Max-Age=0"]);
        assert!(!jar.contains("a"));
        assert!(jar.contains("b"));
        assert_eq!(jar.len(), 1);
    }

    #[test]
    fn domain_cookie_reaches_subdomains_only_over_matching_paths() {
        let jar = CookieJar::new();
        receive(&jar, "https://dzen.ru/", &["a=1; Domain=.dzen.ru; Path=/api"]);

        assert_eq!(sent(&jar, "https://m.dzen.ru/api/v3"), ["a=1"]);
        assert!(sent(&jar, "https://dzen.ru/apix").is_empty());
        assert!(sent(&jar, "https://notdzen.ru/api").is_empty());
    }

    #[test]
    fn foreign_domain_is_rejected() {
        let jar = CookieJar::new();
        receive(&jar, "https://dzen.ru/", &["a=1; Domain=example.com"]);
        assert!(jar.is_empty());
    }

    #[test]
    fn public_suffix_domain_is_rejected() {
        let jar = CookieJar::new();
        receive(&jar, "https://dzen.ru/", &["wide=1; Domain=ru; Path=/", "narrow=2; Domain=dzen.ru; Path=/"]);

        assert!(!jar.contains("wide"));
        assert_eq!(jar.get("narrow").as_deref(), Some("2"));
        assert!(sent(&jar, "https://other.ru/").is_empty());
    }

    #[test]
    fn save_then_load_jar() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cookies.json");

        let jar = CookieJar::new();
        receive(&jar, "https://dzen.ru/video", &["_yasc=xyz; Path=/", "theme=dark; Path=/; Max-Age=600"]);
        jar.save(&path).unwrap();

        let restored = CookieJar::new();
        assert_eq!(restored.load(&path), 2);
        assert_eq!(restored.get(SESSION_COOKIE).as_deref(), Some("xyz"));
        assert_eq!(sent(&restored, "https://dzen.ru/"), ["_yasc=xyz", "theme=dark"]);
    }

    #[test]
    fn load_missing_or_broken_file_is_empty() {
        let dir = tempdir().unwrap();
        let jar = CookieJar::new();
        receive(&jar, "https://dzen.ru/", &["a=1"]);
        assert_eq!(jar.load(dir.path().join("missing.json")), 0);

        let broken = dir.path().join("cookies.json");
        fs::write(&broken, "\u{0}\u{1}pickle").unwrap();
        assert_eq!(jar.load(&broken), 0);
        assert!(jar.is_empty());
    }

    #[test]
    fn login_marker_tracks_account() {
        let mut session = Session::new(&SiteConfig::default(), &HttpConfig::default()).unwrap();

        session.login("alice");
        assert!(session.is_logged_in());
        assert_eq!(session.jar().get(LOGIN_COOKIE).as_deref(), Some("alice"));

        session.login("bob");
        assert_eq!(session.jar().get(LOGIN_COOKIE).as_deref(), Some("bob"));

        session.login("");
        assert!(!session.is_logged_in());
    }

    #[test]
    fn login_marker_is_never_sent() {
        let mut session = Session::new(&SiteConfig::default(), &HttpConfig::default()).unwrap();
        session.login("alice");
        assert!(session.jar().cookies(&url("https://dzen.ru/")).is_none());
    }

    #[tokio::test]
    async fn ensure_session_harvests_cookie_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/video"))
            .and(header("sec-fetch-site", "none"))
            .and(header("sec-fetch-user", "?1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "_yasc=fresh; Path=/")
                    .set_body_string("<html></html>"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut session = Session::new(&SiteConfig::default(), &HttpConfig::default()).unwrap();
        let registration = format!("{}/video", server.uri());

        assert!(session.ensure_session(&registration).await);
        assert_eq!(session.jar().get(SESSION_COOKIE).as_deref(), Some("fresh"));
        assert!(!session.ensure_session(&registration).await);
    }

    #[tokio::test]
    async fn ensure_session_skips_when_cookie_present() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut session = Session::new(&SiteConfig::default(), &HttpConfig::default()).unwrap();
        let headers = [HeaderValue::from_static("_yasc=kept; Path=/")];
        session
            .jar()
            .set_cookies(&mut headers.iter(), &url(&server.uri()));

        assert!(!session.ensure_session(&format!("{}/video", server.uri())).await);
    }

    #[tokio::test]
    async fn get_sends_fixed_headers_and_host() {
        let server = MockServer::start().await;
        let authority = server.address().to_string();
        Mock::given(method("GET"))
            .and(path("/api/v3/launcher/video-more"))
            .and(header("host", authority.as_str()))
            .and(header("sec-gpc", "1"))
            .and(header("accept-language", "en-US,en;q=0.5"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"items\":[]}"))
            .expect(1)
            .mount(&server)
            .await;

        let session = Session::new(&SiteConfig::default(), &HttpConfig::default()).unwrap();
        let response = session
            .get(&format!("{}/api/v3/launcher/video-more", server.uri()), None)
            .await
            .unwrap();

        assert!(response.is_ok());
        assert_eq!(response.json().unwrap()["items"], serde_json::json!([]));
    }
}
