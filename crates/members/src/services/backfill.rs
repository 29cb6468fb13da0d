//! Bulk identity backfill over every active member.

use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tracing::{error, info, warn};

use crate::repositories::MemberStore;
use crate::services::reconciliation::ReconciliationService;
use crate::types::{
    BackfillDetail, BackfillFailure, BackfillReport, MemberError, MemberResult, ReconcileOutcome,
};

#[derive(Clone)]
pub struct BackfillService {
    members: Arc<dyn MemberStore>,
    reconciliation: ReconciliationService,
    concurrency: usize,
}

impl BackfillService {
    pub fn new(
        members: Arc<dyn MemberStore>,
        reconciliation: ReconciliationService,
        concurrency: usize,
    ) -> Self {
        Self {
            members,
            reconciliation,
            concurrency: concurrency.max(1),
        }
    }

    /// Reconcile every active member with `default_password`.
    ///
    /// Per-member failures are collected in the report and never stop the
    /// run. Failing to load the member list fails the whole job. Nothing is
    /// rolled back, and re-running is safe.
    pub async fn run(&self, default_password: &str) -> MemberResult<BackfillReport> {
        self.reconciliation.check_password(default_password)?;

        let members = self.members.list_active().await.map_err(|e| {
            error!(error = %e, "failed to load members for backfill");
            MemberError::from(e)
        })?;

        info!(
            total = members.len(),
            concurrency = self.concurrency,
            "starting identity backfill"
        );

        let outcomes: Vec<_> = stream::iter(members)
            .map(|member| async move {
                let outcome = self.reconciliation.reconcile(&member, default_password).await;
                (member, outcome)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut report = BackfillReport {
            total: outcomes.len(),
            ..Default::default()
        };

        for (member, outcome) in outcomes {
            match outcome {
                Ok(outcome) => {
                    match outcome {
                        ReconcileOutcome::Created { .. } => report.created += 1,
                        ReconcileOutcome::AlreadyExists { .. } => report.already_exists += 1,
                    }
                    report.details.push(BackfillDetail {
                        email: member.email,
                        member_id: member.id,
                        outcome: outcome.as_str(),
                        identity_id: outcome.identity_id().to_string(),
                    });
                }
                Err(e) => {
                    warn!(member_id = %member.id, email = %member.email, error = %e, "backfill failed for member");
                    report.errors += 1;
                    report.failures.push(BackfillFailure {
                        email: member.email,
                        member_id: member.id,
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            total = report.total,
            created = report.created,
            already_exists = report.already_exists,
            errors = report.errors,
            "identity backfill finished"
        );
        Ok(report)
    }
}
