//! Cron scheduler for the due-date sweeps.
//!
//! The two sweeps are registered as independent jobs: they may fire in
//! either relative order or concurrently, and no mutual exclusion between
//! them is enforced. A failed execution only logs; the next firing is
//! unaffected.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing::{error, info};

use taskhub_core::config::scheduler::SchedulerConfig;
use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;

use crate::sweeps::due_date::DueDateScanner;

/// Cron-based scheduler wiring the due-date sweeps to wall-clock cadences.
pub struct SweepScheduler {
    /// The underlying job scheduler.
    scheduler: JobScheduler,
    /// The scanner both jobs drive.
    scanner: Arc<DueDateScanner>,
    /// Cron expressions.
    config: SchedulerConfig,
}

impl std::fmt::Debug for SweepScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SweepScheduler").finish()
    }
}

impl SweepScheduler {
    /// Creates a new sweep scheduler.
    pub async fn new(scanner: Arc<DueDateScanner>, config: SchedulerConfig) -> AppResult<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self {
            scheduler,
            scanner,
            config,
        })
    }

    /// Registers both sweeps.
    pub async fn register_sweeps(&self) -> AppResult<()> {
        self.register_upcoming().await?;
        self.register_urgent().await?;

        info!("All due-date sweeps registered");
        Ok(())
    }

    /// Starts the scheduler.
    pub async fn start(&self) -> AppResult<()> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        info!("Sweep scheduler started");
        Ok(())
    }

    /// Shuts down the scheduler.
    pub async fn shutdown(&self) -> AppResult<()> {
        let mut scheduler = self.scheduler.clone();
        scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        info!("Sweep scheduler shut down");
        Ok(())
    }

    /// Upcoming-deadline sweep on its configured cadence.
    async fn register_upcoming(&self) -> AppResult<()> {
        let scanner = Arc::clone(&self.scanner);
        let job = CronJob::new_async(self.config.upcoming_cron.as_str(), move |_uuid, _lock| {
            let scanner = Arc::clone(&scanner);
            Box::pin(async move {
                if let Err(e) = scanner.run_upcoming_sweep().await {
                    error!(error = %e, "Upcoming due-date sweep failed");
                }
            })
        })
        .map_err(|e| AppError::internal(format!("Failed to create upcoming sweep schedule: {e}")))?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add upcoming sweep schedule: {e}"))
        })?;

        info!(cron = %self.config.upcoming_cron, "Registered: upcoming due-date sweep");
        Ok(())
    }

    /// Urgent-deadline sweep on its configured cadence.
    async fn register_urgent(&self) -> AppResult<()> {
        let scanner = Arc::clone(&self.scanner);
        let job = CronJob::new_async(self.config.urgent_cron.as_str(), move |_uuid, _lock| {
            let scanner = Arc::clone(&scanner);
            Box::pin(async move {
                if let Err(e) = scanner.run_urgent_sweep().await {
                    error!(error = %e, "Urgent due-date sweep failed");
                }
            })
        })
        .map_err(|e| AppError::internal(format!("Failed to create urgent sweep schedule: {e}")))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add urgent sweep schedule: {e}")))?;

        info!(cron = %self.config.urgent_cron, "Registered: urgent due-date sweep");
        Ok(())
    }
}
