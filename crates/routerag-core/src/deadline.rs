use std::future::Future;
use std::time::Duration;

use crate::error::{Error, Result};

/// Awaits `fut`, failing with [`Error::Timeout`] naming `call` once `limit`
/// elapses. `None` waits indefinitely.
pub async fn bounded<T, F>(call: &str, limit: Option<Duration>, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match limit {
        None => fut.await,
        Some(after) => match tokio::time::timeout(after, fut).await {
            Ok(res) => res,
            Err(_) => Err(Error::Timeout { call: call.to_string(), after }),
        },
    }
}

pub fn millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}
