use super::client::TelegramClient;
use super::dispatch::UpdateDispatcher;
use crate::error::{IsRetryable, TransportError};
use backon::{ExponentialBuilder, Retryable};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Pause after `getUpdates` keeps failing past its retries.
const POLL_ERROR_PAUSE: Duration = Duration::from_secs(5);

fn poll_retry_policy() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(500))
        .with_max_delay(Duration::from_secs(10))
        .with_max_times(4)
        .with_jitter()
}

/// Long-polling loop. Updates are handled one at a time in arrival order and
/// the offset moves past each one before the next fetch. Returns when
/// `shutdown` flips to `true`.
pub async fn run_polling(
    client: TelegramClient,
    dispatcher: UpdateDispatcher,
    poll_timeout_secs: u64,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), TransportError> {
    client.delete_webhook(false).await?;
    info!(poll_timeout_secs, "Running in polling mode");

    let mut offset: Option<i64> = None;
    while !*shutdown.borrow() {
        let fetch = (|| client.get_updates(offset, poll_timeout_secs))
            .retry(poll_retry_policy())
            .when(|e: &TransportError| e.is_retryable())
            .notify(|err, dur: Duration| {
                warn!("getUpdates retrying after error {} in {:?}", err, dur);
            });

        let result = tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
                continue;
            }
            result = fetch => result,
        };

        match result {
            Ok(updates) => {
                for update in updates {
                    offset = Some(update.update_id + 1);
                    dispatcher.dispatch(update).await;
                }
            }
            Err(e) => {
                error!(error = %e, "getUpdates failed, pausing");
                tokio::select! {
                    _ = shutdown.changed() => {}
                    () = tokio::time::sleep(POLL_ERROR_PAUSE) => {}
                }
            }
        }
    }

    info!("Polling stopped");
    Ok(())
}
