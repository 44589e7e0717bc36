//! Exit code logic for the harvester process.
//!
//! Per-record fetch and download failures are part of a normal run and do
//! not change the exit code; only an interrupt does.

use harvester_core::RunSummary;

use crate::ProcessExit;

/// Determines the process exit outcome of a finished run.
pub(crate) fn determine_exit_outcome(summary: &RunSummary) -> ProcessExit {
    if summary.interrupted {
        ProcessExit::Interrupted
    } else {
        ProcessExit::Success
    }
}

#[cfg(test)]
mod tests {
    use super::determine_exit_outcome;
    use crate::ProcessExit;
    use harvester_core::RunSummary;

    #[test]
    fn test_exit_outcome_success_when_completed() {
        let summary = RunSummary {
            attempted: 3,
            succeeded: 3,
            ..RunSummary::default()
        };
        assert_eq!(determine_exit_outcome(&summary), ProcessExit::Success);
    }

    #[test]
    fn test_exit_outcome_success_despite_per_record_failures() {
        let summary = RunSummary {
            attempted: 3,
            fetch_failed: 2,
            download_failed: 1,
            ..RunSummary::default()
        };
        assert_eq!(determine_exit_outcome(&summary), ProcessExit::Success);
    }

    #[test]
    fn test_exit_outcome_interrupted() {
        let summary = RunSummary {
            attempted: 1,
            interrupted: true,
            ..RunSummary::default()
        };
        assert_eq!(determine_exit_outcome(&summary), ProcessExit::Interrupted);
        assert_eq!(ProcessExit::Interrupted.code(), 130);
    }
}
