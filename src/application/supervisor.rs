use crate::common::{ApplicationError, ApplicationResult};
use tokio::sync::watch;
use tokio::task::JoinSet;

/// Waits for Ctrl-C or for the first failing task, signals shutdown to the rest and joins them.
/// The first task error is returned so the process exits non-zero.
pub async fn supervise(
    mut tasks: JoinSet<ApplicationResult<()>>,
    shutdown: watch::Sender<bool>,
) -> ApplicationResult<()> {
    let mut first_error: Option<ApplicationError> = None;

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    tracing::warn!("Cannot listen for Ctrl-C: {}", e);
                }
                tracing::info!("Shutdown requested");
                break;
            }
            joined = tasks.join_next() => match joined {
                Some(Ok(Ok(()))) => continue,
                Some(Ok(Err(e))) => {
                    tracing::error!("Task failed: {}", e);
                    first_error = Some(e);
                    break;
                }
                Some(Err(e)) => {
                    tracing::error!("Task aborted: {}", e);
                    first_error = Some(ApplicationError::Task(e.to_string()));
                    break;
                }
                None => break,
            },
        }
    }

    let _ = shutdown.send(true);
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::error!("Task failed during shutdown: {}", e);
                first_error.get_or_insert(e);
            }
            Err(e) => {
                first_error.get_or_insert(ApplicationError::Task(e.to_string()));
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
