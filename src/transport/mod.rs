mod http;

pub use http::HttpTransport;
pub use reqwest::Url;

use async_trait::async_trait;
use log::debug;
use std::path::Path;
use std::sync::Arc;
use std::thread::{Scope, ScopedJoinHandle};

use crate::error::TransportError;

/// Retrieves the raw bytes stored at a location.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<Vec<u8>, TransportError>;
}

#[async_trait]
impl<T> Transport for Box<T>
where
    T: Transport + ?Sized,
{
    async fn get(&self, url: &Url) -> Result<Vec<u8>, TransportError> {
        (**self).get(url).await
    }
}

#[async_trait]
impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    async fn get(&self, url: &Url) -> Result<Vec<u8>, TransportError> {
        (**self).get(url).await
    }
}

/// Issue a retrieval on a worker thread of `scope` and report its result to `on_complete`.
///
/// The worker drives `transport` on its own current-thread runtime, so the
/// caller does not need to be inside one. `on_complete` runs on the worker
/// thread, exactly once, unless the transport panics.
pub fn spawn_request<'scope, 'env, T, F>(
    scope: &'scope Scope<'scope, 'env>,
    transport: &'env T,
    url: &'env Url,
    on_complete: F,
) -> ScopedJoinHandle<'scope, ()>
where
    T: Transport + ?Sized,
    F: FnOnce(Result<Vec<u8>, TransportError>) + Send + 'scope,
{
    scope.spawn(move || {
        let result = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime.block_on(transport.get(url)),
            Err(e) => Err(TransportError::Runtime(e)),
        };
        debug!(
            "Retrieval of {} finished: {}",
            url,
            match &result {
                Ok(data) => format!("{} bytes", data.len()),
                Err(e) => e.to_string(),
            }
        );
        on_complete(result);
    })
}

/// Turn a URL string or a filesystem path into a [`Url`].
///
/// Strings that parse as absolute URLs are used as-is, and a bare
/// `host:port[/path]` is taken as `http://host:port[/path]`. Everything else
/// is treated as a path relative to the current directory.
pub fn resolve_location(location: &str) -> Result<Url, TransportError> {
    let invalid = |reason: String| TransportError::InvalidLocation {
        location: location.to_string(),
        reason,
    };

    if location.trim().is_empty() {
        return Err(invalid("location is empty".to_string()));
    }

    if is_host_port(location) {
        return Url::parse(&format!("http://{}", location)).map_err(|e| invalid(e.to_string()));
    }

    // Windows drive letters ("C:\...") parse as a one-letter scheme
    if let Ok(url) = Url::parse(location) {
        if url.scheme().len() > 1 {
            return Ok(url);
        }
    }

    let path = Path::new(location);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| invalid(e.to_string()))?
            .join(path)
    };

    Url::from_file_path(&absolute).map_err(|_| invalid("not a valid file path".to_string()))
}

/// `localhost:8000/recipes.xml` would otherwise parse with `localhost` as its scheme
fn is_host_port(location: &str) -> bool {
    let Some((host, rest)) = location.split_once(':') else {
        return false;
    };
    let port = rest.split('/').next().unwrap_or_default();
    !host.is_empty()
        && !host.contains(|c: char| c == '/' || c == '\\')
        && !port.is_empty()
        && port.bytes().all(|b| b.is_ascii_digit())
}
