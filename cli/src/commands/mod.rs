pub mod analyze;
pub mod clean_cpm;
pub mod clean_deps;
pub mod migrate;
pub mod rollback;

use orchestrator::RunSummary;

use crate::error::ExitOutcome;

pub(crate) fn report_summary(summary: &RunSummary) {
    tracing::info!(
        migrated = summary.migrated_count(),
        failed = summary.failed_count(),
        warned = summary.warned_count(),
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "migration run finished"
    );
    for result in &summary.results {
        if !result.success {
            tracing::error!(project = %result.input_path.display(), "{}", result.errors.join("; "));
        }
        for warning in &result.warnings {
            tracing::warn!(project = %result.input_path.display(), "{warning}");
        }
    }
}

pub(crate) fn outcome_for(summary: &RunSummary) -> ExitOutcome {
    if summary.failed_count() > 0 {
        ExitOutcome::PartialFailure
    } else {
        ExitOutcome::Success
    }
}
