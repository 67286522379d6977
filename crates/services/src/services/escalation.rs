//! Background sweeper that flags service requests left pending past their
//! priority's attention window and marks maintenance visits from past
//! months as missed.

use std::time::Duration;

use chrono::{Datelike, Utc};
use db::DBService;
use db::models::maintenance::MaintenanceVisit;
use db::models::service_request::{RequestPriority, ServiceRequest};
use thiserror::Error;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum EscalationError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Background service for escalating stale service requests
pub struct EscalationService {
    db: DBService,
    poll_interval: Duration,
}

impl EscalationService {
    /// Hours a pending request may sit unattended before escalation.
    fn threshold_hours(priority: RequestPriority) -> i64 {
        match priority {
            RequestPriority::Critical => 4,
            RequestPriority::High => 24,
            RequestPriority::Medium | RequestPriority::Low => 72,
        }
    }

    /// Spawn the sweeper as a long-running tokio task.
    pub fn spawn(db: DBService) -> tokio::task::JoinHandle<()> {
        let service = Self {
            db,
            poll_interval: Duration::from_secs(600),
        };
        tokio::spawn(async move {
            service.start().await;
        })
    }

    async fn start(&self) {
        info!(
            "Starting request escalation service with interval {:?}",
            self.poll_interval
        );

        let mut interval = interval(self.poll_interval);

        loop {
            interval.tick().await;
            if let Err(e) = self.sweep().await {
                error!("Error sweeping for stale service requests: {}", e);
            }
        }
    }

    async fn sweep(&self) -> Result<(), EscalationError> {
        let mut flagged = 0;
        for priority in [
            RequestPriority::Critical,
            RequestPriority::High,
            RequestPriority::Medium,
            RequestPriority::Low,
        ] {
            let cutoff = Utc::now() - chrono::Duration::hours(Self::threshold_hours(priority));
            let stale =
                ServiceRequest::find_stale_pending(&self.db.pool, priority, cutoff).await?;

            for request in stale {
                warn!(
                    request_id = %request.id,
                    priority = %priority,
                    created_at = %request.created_at,
                    "service request pending past its attention window, escalating"
                );
                ServiceRequest::mark_escalated(&self.db.pool, request.id).await?;
                flagged += 1;
            }
        }

        // Visits still sitting in `scheduled` once their month is over were
        // never performed.
        if let Some(month_start) = Utc::now().date_naive().with_day(1) {
            let lapsed = MaintenanceVisit::mark_missed_before(&self.db.pool, month_start).await?;
            if lapsed > 0 {
                warn!(lapsed, "scheduled visits from past months marked missed");
            }
        }

        if flagged > 0 {
            info!(flagged, "escalation sweep flagged stale requests");
        } else {
            debug!("escalation sweep: nothing stale");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_tighten_with_priority() {
        assert!(
            EscalationService::threshold_hours(RequestPriority::Critical)
                < EscalationService::threshold_hours(RequestPriority::High)
        );
        assert!(
            EscalationService::threshold_hours(RequestPriority::High)
                < EscalationService::threshold_hours(RequestPriority::Low)
        );
        assert_eq!(
            EscalationService::threshold_hours(RequestPriority::Medium),
            EscalationService::threshold_hours(RequestPriority::Low)
        );
    }
}
