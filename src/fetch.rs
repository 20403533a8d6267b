//! Fetch-and-decode orchestration.
//!
//! These functions own no parsing logic: they obtain the document bytes from
//! a [`Transport`] and hand them to a [`BeerRecipeDecoder`], returning its
//! outcome unchanged. Every transport failure becomes
//! [`DecodeError::Transport`](crate::DecodeError::Transport).

use log::{debug, warn};
use std::future::Future;
use std::sync::mpsc;
use std::thread;

use crate::decoder::BeerRecipeDecoder;
use crate::error::{DecodeOutcome, TransportError};
use crate::transport::{spawn_request, Transport, Url};

/// Retrieve the document at `url` without blocking the thread, then decode it.
///
/// Dropping the returned future (for example by aborting its task) drops the
/// in-flight request with it.
pub async fn decode_url<D, T>(decoder: &D, transport: &T, url: &Url) -> DecodeOutcome
where
    D: BeerRecipeDecoder + ?Sized,
    T: Transport + ?Sized,
{
    debug!("Fetching recipe document from {}", url);
    let data = transport.get(url).await.map_err(|e| {
        warn!("Failed to fetch {}: {}", url, e);
        e
    })?;

    decode_fetched(decoder, url, &data)
}

/// Like [`decode_url`], but gives up as soon as `cancel` completes.
///
/// A cancelled call drops the pending retrieval and fails with
/// [`TransportError::Cancelled`].
pub async fn decode_url_until<D, T, C>(
    decoder: &D,
    transport: &T,
    url: &Url,
    cancel: C,
) -> DecodeOutcome
where
    D: BeerRecipeDecoder + ?Sized,
    T: Transport + ?Sized,
    C: Future<Output = ()>,
{
    debug!("Fetching recipe document from {}", url);
    let data = tokio::select! {
        result = transport.get(url) => result.map_err(|e| {
            warn!("Failed to fetch {}: {}", url, e);
            e
        })?,
        _ = cancel => {
            warn!("Fetching {} was cancelled", url);
            return Err(TransportError::Cancelled.into());
        }
    };

    decode_fetched(decoder, url, &data)
}

/// Retrieve the document at `url`, blocking the calling thread until the
/// retrieval finishes, then decode it.
///
/// The request runs on a scoped worker thread that owns its own runtime; its
/// single result is handed back through a one-slot channel that is created
/// before the request is issued. If the worker ends without answering, the
/// call fails with [`TransportError::Cancelled`] instead of waiting forever.
///
/// Any thread may block here, including `tokio::task::spawn_blocking`
/// threads. Calling it from an async task stalls that task's executor thread
/// for the duration of the retrieval; use [`decode_url`] there.
pub fn decode_url_blocking<D, T>(decoder: &D, transport: &T, url: &Url) -> DecodeOutcome
where
    D: BeerRecipeDecoder + ?Sized,
    T: Transport + ?Sized,
{
    debug!("Fetching recipe document from {} (blocking)", url);
    let (tx, rx) = mpsc::sync_channel(1);

    let received = thread::scope(|scope| {
        let worker = spawn_request(scope, transport, url, move |result| {
            // The receiver only goes away if the caller is gone too
            let _ = tx.send(result);
        });
        let received = rx.recv();
        if worker.join().is_err() {
            warn!("Transport worker for {} panicked", url);
        }
        received
    });

    let data = received
        .unwrap_or(Err(TransportError::Cancelled))
        .map_err(|e| {
            warn!("Failed to fetch {}: {}", url, e);
            e
        })?;

    decode_fetched(decoder, url, &data)
}

fn decode_fetched<D>(decoder: &D, url: &Url, data: &[u8]) -> DecodeOutcome
where
    D: BeerRecipeDecoder + ?Sized,
{
    debug!("Fetched {} bytes from {}", data.len(), url);
    let outcome = decoder.decode(data);
    match &outcome {
        Ok(recipes) => debug!("Decoded {} recipe(s) from {}", recipes.len(), url),
        Err(e) => warn!("Could not decode document from {}: {}", url, e),
    }
    outcome
}
