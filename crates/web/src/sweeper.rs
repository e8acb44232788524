use anyhow::Context;
use storage::Database;
use tokio_cron_scheduler::{Job, JobScheduler};

/// Starts the background job that rejects overdue join requests, running at
/// the top of every hour. Failures are logged and retried on the next tick.
pub async fn start(db: Database) -> anyhow::Result<JobScheduler> {
    let scheduler = JobScheduler::new()
        .await
        .context("Failed to create job scheduler")?;

    let job = Job::new_async("0 0 * * * *", move |_uuid, _lock| {
        let db = db.clone();
        Box::pin(async move {
            match storage::services::join_requests::expire_old_requests(db.pool()).await {
                Ok(expired) => {
                    tracing::debug!(expired, "join request expiry sweep completed");
                }
                Err(e) => {
                    tracing::error!(error = %e, "join request expiry sweep failed");
                }
            }
        })
    })
    .context("Failed to create expiry sweep job")?;

    scheduler
        .add(job)
        .await
        .context("Failed to schedule expiry sweep job")?;
    scheduler
        .start()
        .await
        .context("Failed to start job scheduler")?;

    tracing::info!("Join request expiry sweeper scheduled (hourly)");
    Ok(scheduler)
}
