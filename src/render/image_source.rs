//! Product image loading.
//!
//! The render pipeline only depends on the [`ImageLoader`] trait, so tests
//! and offline tools can swap the network out.

use async_trait::async_trait;
use image::DynamicImage;
use std::collections::HashMap;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::error::{EncarteError, Result};

/// Default number of decoded images kept by [`HttpImageLoader`].
pub const DEFAULT_CACHE_LIMIT: usize = 64;

const MAX_REDIRECTS: usize = 10;

/// Fetches and decodes the image behind a product's URL.
#[async_trait]
pub trait ImageLoader: Send + Sync {
    async fn load(&self, url: &str) -> Result<DynamicImage>;

    /// Drop cached images not used within `ttl`. Returns how many were dropped.
    async fn remove_expired(&self, _now: Instant, _ttl: Duration) -> usize {
        0
    }
}

struct CachedImage {
    image: DynamicImage,
    last_accessed: Instant,
}

/// Loads product images over HTTP(S), caching successful loads by URL.
///
/// [`HttpImageLoader::new`] only reaches public `http(s)://` hosts, which is
/// what the server uses for URLs coming from uploaded spreadsheets.
/// [`HttpImageLoader::allowing_local`] also reads `file://` URLs and bare
/// paths from disk and talks to loopback or private hosts, for the CLI.
pub struct HttpImageLoader {
    client: reqwest::Client,
    cache: Arc<RwLock<HashMap<String, CachedImage>>>,
    cache_limit: usize,
    allow_local: bool,
}

impl HttpImageLoader {
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::build(timeout, false)
    }

    pub fn allowing_local(timeout: Duration) -> Result<Self> {
        Self::build(timeout, true)
    }

    fn build(timeout: Duration, allow_local: bool) -> Result<Self> {
        let redirects = reqwest::redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() >= MAX_REDIRECTS {
                attempt.error("too many redirects")
            } else if !allow_local && is_private_host(attempt.url().host_str()) {
                attempt.error("redirect to a private address")
            } else {
                attempt.follow()
            }
        });
        let client = reqwest::Client::builder()
            .user_agent(concat!("encarte/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .redirect(redirects)
            .build()
            .map_err(|e| EncarteError::Image(format!("HTTP client error: {}", e)))?;
        Ok(Self {
            client,
            cache: Arc::new(RwLock::new(HashMap::new())),
            cache_limit: DEFAULT_CACHE_LIMIT,
            allow_local,
        })
    }

    /// Keep at most `limit` decoded images; the least recently used goes first.
    pub fn with_cache_limit(mut self, limit: usize) -> Self {
        self.cache_limit = limit.max(1);
        self
    }

    pub async fn cached_count(&self) -> usize {
        self.cache.read().await.len()
    }

    async fn cached(&self, url: &str) -> Option<DynamicImage> {
        let mut cache = self.cache.write().await;
        let entry = cache.get_mut(url)?;
        entry.last_accessed = Instant::now();
        Some(entry.image.clone())
    }

    async fn store(&self, url: &str, image: DynamicImage) {
        let mut cache = self.cache.write().await;
        while cache.len() >= self.cache_limit && !cache.contains_key(url) {
            let oldest = cache
                .iter()
                .min_by_key(|(_, entry)| entry.last_accessed)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => cache.remove(&key),
                None => break,
            };
        }
        cache.insert(
            url.to_string(),
            CachedImage {
                image,
                last_accessed: Instant::now(),
            },
        );
    }

    async fn fetch_http(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| EncarteError::Image(format!("Failed to download {}: {}", url, e)))?;
        if !response.status().is_success() {
            return Err(EncarteError::Image(format!(
                "Failed to download {}: HTTP {}",
                url,
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| EncarteError::Image(format!("Failed to read image data: {}", e)))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ImageLoader for HttpImageLoader {
    async fn load(&self, url: &str) -> Result<DynamicImage> {
        let source = source_of(url, self.allow_local)?;
        if let Some(image) = self.cached(url).await {
            return Ok(image);
        }

        let bytes = match source {
            Source::Http => self.fetch_http(url).await?,
            Source::File(path) => tokio::fs::read(&path)
                .await
                .map_err(|e| EncarteError::Image(format!("Failed to read {}: {}", path.display(), e)))?,
        };
        let image = decode(&bytes)?;
        tracing::debug!(url, width = image.width(), height = image.height(), "image loaded");

        self.store(url, image.clone()).await;
        Ok(image)
    }

    async fn remove_expired(&self, now: Instant, ttl: Duration) -> usize {
        let mut cache = self.cache.write().await;
        let before = cache.len();
        cache.retain(|_, entry| now.saturating_duration_since(entry.last_accessed) < ttl);
        before - cache.len()
    }
}

#[derive(Debug)]
enum Source {
    Http,
    File(PathBuf),
}

fn source_of(url: &str, allow_local: bool) -> Result<Source> {
    let url = url.trim();
    if url.is_empty() {
        return Err(EncarteError::Image("Empty image URL".to_string()));
    }
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| EncarteError::Image(format!("Invalid image URL {}: {}", url, e)))?;
        if !allow_local && is_private_host(parsed.host_str()) {
            return Err(EncarteError::Image(format!("Image host not allowed: {}", url)));
        }
        return Ok(Source::Http);
    }
    let path = match url.strip_prefix("file://") {
        Some(path) => path,
        None if lower.contains("://") || lower.starts_with("data:") => {
            return Err(EncarteError::Image(format!("Unsupported image URL scheme: {}", url)));
        }
        None => url,
    };
    if !allow_local {
        return Err(EncarteError::Image(format!("Local image paths are not allowed: {}", url)));
    }
    Ok(Source::File(PathBuf::from(path)))
}

/// Loopback, private, link-local and unspecified addresses, plus `localhost`.
/// Names are not resolved here.
fn is_private_host(host: Option<&str>) -> bool {
    let Some(host) = host else {
        return true;
    };
    let host = host.trim_start_matches('[').trim_end_matches(']').to_ascii_lowercase();
    if host == "localhost" || host.ends_with(".localhost") {
        return true;
    }
    match host.parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) => {
            ip.is_loopback() || ip.is_private() || ip.is_link_local() || ip.is_unspecified() || ip.is_broadcast()
        }
        Ok(IpAddr::V6(ip)) => {
            let segments = ip.segments();
            ip.is_loopback()
                || ip.is_unspecified()
                || (segments[0] & 0xfe00) == 0xfc00
                || (segments[0] & 0xffc0) == 0xfe80
                || ip.to_ipv4_mapped().is_some_and(|v4| is_private_host(Some(&v4.to_string())))
        }
        Err(_) => false,
    }
}

/// Decode any format the image crate understands.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| EncarteError::Image(format!("Failed to decode image: {}", e)))
}

/// In-memory loader keyed by URL. Unknown URLs fail like a broken link.
#[derive(Default, Clone)]
pub struct StaticImageLoader {
    images: HashMap<String, DynamicImage>,
}

impl StaticImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, url: impl Into<String>, image: DynamicImage) -> Self {
        self.images.insert(url.into(), image);
        self
    }
}

#[async_trait]
impl ImageLoader for StaticImageLoader {
    async fn load(&self, url: &str) -> Result<DynamicImage> {
        self.images
            .get(url)
            .cloned()
            .ok_or_else(|| EncarteError::Image(format!("Failed to download {}: not found", url)))
    }
}
