use crate::core::Geocoder;
use crate::models::GeoPoint;
use crate::services::dataset::ZipTable;
use futures::future::join_all;
use reqwest::{Client, StatusCode};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{timeout_at, Instant};

/// Upper bound on all remote lookups made for one request
pub const DEFAULT_LOOKUP_DEADLINE: Duration = Duration::from_secs(10);

/// Errors that can occur when calling the remote geocoder
#[derive(Debug, Error)]
pub enum GeocodingError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Geocoder returned status {status} for ZIP {zip}")]
    ApiError { zip: String, status: u16 },

    #[error("Invalid response for ZIP {0}")]
    InvalidResponse(String),

    #[error("Lookup for ZIP {zip} did not finish within {deadline:?}")]
    Timeout { zip: String, deadline: Duration },
}

/// HTTP client for a ZIP centroid service
///
/// Expects `GET {base_url}/{zip}` to answer `{"latitude": .., "longitude": ..}`
/// and 404 for unknown ZIPs. Answers, including "unknown", are cached.
pub struct RemoteGeocoder {
    base_url: String,
    client: Client,
    cache: moka::future::Cache<String, Option<GeoPoint>>,
}

impl RemoteGeocoder {
    pub fn new(
        base_url: String,
        timeout: Duration,
        cache_size: u64,
        cache_ttl: Duration,
    ) -> Result<Self, GeocodingError> {
        let client = Client::builder().timeout(timeout).build()?;

        let cache = moka::future::CacheBuilder::new(cache_size)
            .time_to_live(cache_ttl)
            .build();

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            cache,
        })
    }

    /// Look up one ZIP, consulting the cache first
    pub async fn lookup(&self, zip: &str) -> Result<Option<GeoPoint>, GeocodingError> {
        if let Some(cached) = self.cache.get(zip).await {
            tracing::trace!("Geocoder cache hit: {}", zip);
            return Ok(cached);
        }

        let url = format!("{}/{}", self.base_url, urlencoding::encode(zip));
        let response = self.client.get(&url).send().await?;

        let point = match response.status() {
            StatusCode::NOT_FOUND => None,
            status if status.is_success() => {
                let point: GeoPoint = response
                    .json()
                    .await
                    .map_err(|_| GeocodingError::InvalidResponse(zip.to_string()))?;
                Some(point)
            }
            status => {
                return Err(GeocodingError::ApiError {
                    zip: zip.to_string(),
                    status: status.as_u16(),
                });
            }
        };

        self.cache.insert(zip.to_string(), point).await;
        Ok(point)
    }
}

/// Resolves ZIPs from the static table, falling back to a remote geocoder
///
/// Network lookups happen here, before matching, so the matcher itself
/// stays synchronous.
#[derive(Clone)]
pub struct ZipResolver {
    table: Arc<ZipTable>,
    remote: Option<Arc<RemoteGeocoder>>,
    deadline: Duration,
}

impl ZipResolver {
    pub fn new(table: Arc<ZipTable>, remote: Option<Arc<RemoteGeocoder>>) -> Self {
        Self {
            table,
            remote,
            deadline: DEFAULT_LOOKUP_DEADLINE,
        }
    }

    /// Bound the total time spent on remote lookups per request
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub fn table(&self) -> &ZipTable {
        &self.table
    }

    /// Build a lookup table for the origin and every candidate pickup ZIP
    ///
    /// Only a failed origin lookup is an error. Pickup ZIPs missing from the
    /// static table are looked up concurrently; any that fail or miss the
    /// deadline are logged and left out, so their loads are never matched.
    /// ZIPs unknown to both sources are simply absent from the result.
    pub async fn resolve_all<'a, I>(&self, origin: &str, pickups: I) -> Result<ZipTable, GeocodingError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let deadline = Instant::now() + self.deadline;
        let mut resolved = ZipTable::default();

        let origin = origin.trim();
        match self.locate_origin(origin, deadline).await? {
            Some(point) => resolved.insert(origin, point),
            // Nothing will be measured against an unknown origin
            None => return Ok(resolved),
        }

        let mut seen = HashSet::new();
        seen.insert(origin);
        let mut pending = Vec::new();

        for zip in pickups {
            let zip = zip.trim();
            if !seen.insert(zip) {
                continue;
            }

            match self.table.locate(zip) {
                Some(point) => resolved.insert(zip, point),
                None => pending.push(zip),
            }
        }

        let Some(remote) = &self.remote else {
            return Ok(resolved);
        };

        let lookups = pending.into_iter().map(|zip| async move {
            (zip, timeout_at(deadline, remote.lookup(zip)).await)
        });

        for (zip, result) in join_all(lookups).await {
            match result {
                Ok(Ok(Some(point))) => resolved.insert(zip, point),
                Ok(Ok(None)) => {}
                Ok(Err(e)) => {
                    tracing::warn!("Skipping pickup ZIP {}: {}", zip, e);
                }
                Err(_) => {
                    tracing::warn!("Skipping pickup ZIP {}: no answer within {:?}", zip, self.deadline);
                }
            }
        }

        Ok(resolved)
    }

    async fn locate_origin(&self, zip: &str, deadline: Instant) -> Result<Option<GeoPoint>, GeocodingError> {
        if let Some(point) = self.table.locate(zip) {
            return Ok(Some(point));
        }

        let Some(remote) = &self.remote else {
            return Ok(None);
        };

        timeout_at(deadline, remote.lookup(zip))
            .await
            .map_err(|_| GeocodingError::Timeout {
                zip: zip.to_string(),
                deadline: self.deadline,
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_remote(url: &str) -> Arc<RemoteGeocoder> {
        Arc::new(
            RemoteGeocoder::new(url.to_string(), Duration::from_secs(5), 100, Duration::from_secs(60))
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_lookup_found() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/zips/10001")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"latitude": 40.7506, "longitude": -73.9972}"#)
            .expect(1)
            .create_async()
            .await;

        let remote = create_remote(&format!("{}/zips/", server.url()));

        let first = remote.lookup("10001").await.unwrap();
        let second = remote.lookup("10001").await.unwrap();

        assert_eq!(first, Some(GeoPoint::new(40.7506, -73.9972)));
        assert_eq!(second, first);
        // Second lookup served from cache
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_lookup_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/zips/00000")
            .with_status(404)
            .create_async()
            .await;

        let remote = create_remote(&format!("{}/zips", server.url()));

        assert_eq!(remote.lookup("00000").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_lookup_server_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/zips/10001")
            .with_status(500)
            .create_async()
            .await;

        let remote = create_remote(&format!("{}/zips", server.url()));

        let result = remote.lookup("10001").await;
        assert!(matches!(result, Err(GeocodingError::ApiError { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_lookup_bad_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/zips/10001")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let remote = create_remote(&format!("{}/zips", server.url()));

        let result = remote.lookup("10001").await;
        assert!(matches!(result, Err(GeocodingError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_resolver_prefers_static_table() {
        let mut server = mockito::Server::new_async().await;
        let static_mock = server
            .mock("GET", "/zips/36602")
            .expect(0)
            .create_async()
            .await;
        server
            .mock("GET", "/zips/10001")
            .with_status(200)
            .with_body(r#"{"latitude": 40.7506, "longitude": -73.9972}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/zips/99999")
            .with_status(404)
            .create_async()
            .await;

        let resolver = ZipResolver::new(
            Arc::new(ZipTable::sample()),
            Some(create_remote(&format!("{}/zips", server.url()))),
        );

        let table = resolver
            .resolve_all("36602", ["10001", "99999", "36602"])
            .await
            .unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.contains("36602"));
        assert!(table.contains("10001"));
        assert!(!table.contains("99999"));
        static_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_resolver_without_remote() {
        let resolver = ZipResolver::new(Arc::new(ZipTable::sample()), None);

        let table = resolver.resolve_all("36602", ["10001"]).await.unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.locate("10001"), None);
    }

    #[tokio::test]
    async fn test_resolver_skips_failed_pickup() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/zips/10001")
            .with_status(500)
            .create_async()
            .await;
        server
            .mock("GET", "/zips/20001")
            .with_status(200)
            .with_body(r#"{"latitude": 38.9097, "longitude": -77.0177}"#)
            .create_async()
            .await;

        let resolver = ZipResolver::new(
            Arc::new(ZipTable::sample()),
            Some(create_remote(&format!("{}/zips", server.url()))),
        );

        let table = resolver
            .resolve_all("36602", ["10001", "20001", "36532"])
            .await
            .unwrap();

        assert!(table.contains("36602"));
        assert!(table.contains("36532"));
        assert!(table.contains("20001"));
        assert!(!table.contains("10001"));
    }

    #[tokio::test]
    async fn test_resolver_fails_on_origin_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/zips/10001")
            .with_status(503)
            .create_async()
            .await;

        let resolver = ZipResolver::new(
            Arc::new(ZipTable::sample()),
            Some(create_remote(&format!("{}/zips", server.url()))),
        );

        let result = resolver.resolve_all("10001", ["36602"]).await;
        assert!(matches!(result, Err(GeocodingError::ApiError { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_resolver_unknown_origin_skips_pickups() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/zips/99999")
            .with_status(404)
            .create_async()
            .await;
        let pickup_mock = server
            .mock("GET", "/zips/10001")
            .expect(0)
            .create_async()
            .await;

        let resolver = ZipResolver::new(
            Arc::new(ZipTable::sample()),
            Some(create_remote(&format!("{}/zips", server.url()))),
        );

        let table = resolver.resolve_all("99999", ["10001"]).await.unwrap();

        assert!(table.is_empty());
        pickup_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_resolver_deadline_bounds_slow_pickups() {
        // Accepts connections but never answers
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/zips", listener.local_addr().unwrap());

        let remote = Arc::new(
            RemoteGeocoder::new(url, Duration::from_secs(30), 100, Duration::from_secs(60)).unwrap(),
        );
        let resolver = ZipResolver::new(Arc::new(ZipTable::sample()), Some(remote))
            .with_deadline(Duration::from_millis(200));

        let started = std::time::Instant::now();
        let table = resolver
            .resolve_all("36602", ["10001", "10002", "10003", "10004"])
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(table.len(), 1);
        assert!(table.contains("36602"));
    }

    #[tokio::test]
    async fn test_resolver_origin_deadline() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/zips", listener.local_addr().unwrap());

        let remote = Arc::new(
            RemoteGeocoder::new(url, Duration::from_secs(30), 100, Duration::from_secs(60)).unwrap(),
        );
        let resolver = ZipResolver::new(Arc::new(ZipTable::sample()), Some(remote))
            .with_deadline(Duration::from_millis(200));

        let result = resolver.resolve_all("10001", ["36602"]).await;
        assert!(matches!(result, Err(GeocodingError::Timeout { .. })));
    }
}
