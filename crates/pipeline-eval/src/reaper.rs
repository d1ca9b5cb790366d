use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

const IDLE_TIMEOUT: Duration = Duration::from_secs(30);
const GRACE_PERIOD: Duration = Duration::from_secs(30);
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Poll `out_path`'s mtime once a second. Once more than 30s have elapsed
/// since its last modification, log the event, sleep 30s more to give any
/// in-flight flush a chance to land, then run `cleanup` and return.
pub async fn run_reaper<F, Fut>(out_path: PathBuf, cleanup: F)
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = ()>,
{
    loop {
        tokio::time::sleep(POLL_INTERVAL).await;

        let idle = tokio::fs::metadata(&out_path)
            .await
            .and_then(|metadata| metadata.modified())
            .ok()
            .and_then(|modified| modified.elapsed().ok())
            .map(|elapsed| elapsed >= IDLE_TIMEOUT)
            .unwrap_or(false);

        if idle {
            info!(out = %out_path.display(), "evaluation output idle for 30s, entering grace period");
            tokio::time::sleep(GRACE_PERIOD).await;
            cleanup().await;
            return;
        }
    }
}
