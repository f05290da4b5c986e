use std::future::Future;

use crate::config::CascadePolicy;
use crate::error::AppResult;
use crate::metrics::record_cascade_step;
use crate::models::{CascadeFailure, CascadeReport};

/// Removes `children` of `parent` one at a time, in order.
///
/// `step` removes one child together with everything below it. Under
/// [`CascadePolicy::Continue`] a failed step is recorded and the child is left
/// in place; under [`CascadePolicy::Abort`] the first failure is returned.
/// Completed steps are never undone.
pub async fn run_cascade<F, Fut>(
    policy: CascadePolicy,
    kind: &'static str,
    parent: i64,
    children: Vec<i64>,
    mut step: F,
) -> AppResult<CascadeReport>
where
    F: FnMut(i64) -> Fut,
    Fut: Future<Output = AppResult<()>>,
{
    let mut report = CascadeReport::new(parent);

    for child in children {
        match step(child).await {
            Ok(()) => {
                record_cascade_step(kind, true);
                report.completed.push(child);
            }
            Err(err) => {
                record_cascade_step(kind, false);
                tracing::warn!(kind, parent, child, error = %err, ?policy, "Cascade step failed");
                match policy {
                    CascadePolicy::Abort => return Err(err),
                    CascadePolicy::Continue => report.failed.push(CascadeFailure {
                        id: child,
                        error: err.to_string(),
                    }),
                }
            }
        }
    }

    if report.is_partial() {
        tracing::warn!(
            kind,
            parent,
            completed = report.completed.len(),
            failed = report.failed.len(),
            "Cascade finished with failures"
        );
    } else {
        tracing::info!(kind, parent, completed = report.completed.len(), "Cascade finished");
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::AppError;

    fn flaky(fail_on: i64) -> impl FnMut(i64) -> std::future::Ready<AppResult<()>> {
        move |child| {
            std::future::ready(if child == fail_on {
                Err(AppError::UpstreamUnavailable(format!("child {} unreachable", child)))
            } else {
                Ok(())
            })
        }
    }

    #[tokio::test]
    async fn continue_records_failure_and_goes_on() {
        let report = run_cascade(CascadePolicy::Continue, "test", 3010, vec![1, 2, 3], flaky(2))
            .await
            .unwrap();

        assert_eq!(report.parent, 3010);
        assert_eq!(report.completed, vec![1, 3]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].id, 2);
        assert!(report.failed[0].error.contains("unreachable"));
    }

    #[tokio::test]
    async fn abort_stops_at_first_failure() {
        let attempted = Mutex::new(Vec::new());
        let result = run_cascade(CascadePolicy::Abort, "test", 3010, vec![1, 2, 3], |child| {
            attempted.lock().unwrap().push(child);
            flaky(2)(child)
        })
        .await;

        assert!(matches!(result, Err(AppError::UpstreamUnavailable(_))));
        assert_eq!(*attempted.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn no_children_is_a_clean_report() {
        let report = run_cascade(CascadePolicy::Continue, "test", 3010, vec![], flaky(0))
            .await
            .unwrap();
        assert!(report.completed.is_empty());
        assert!(!report.is_partial());
    }
}
