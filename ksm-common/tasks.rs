use std::time::Duration;
use tokio::task::JoinHandle;

const ABORT_AFTER: Duration = Duration::from_millis(500);

/// Waits for the task to end (e.g. after cancellation).\
/// **Note** that the task is aborted if it does not finish in a timely manner.
pub async fn wait_for_task<T>(task: Option<JoinHandle<T>>, task_name: &str) {
    let Some(mut task) = task else {
        return;
    };

    if tokio::time::timeout(ABORT_AFTER, &mut task).await.is_ok() {
        return;
    }

    tracing::warn!("Task {task_name} did not stop in {}ms, aborting it", ABORT_AFTER.as_millis());
    task.abort();
    if let Err(error) = task.await
        && !error.is_cancelled()
    {
        tracing::error!("Task {task_name} failed while aborting: {error}");
    }
}

/// Waits for all tasks to end, aborting the ones that do not stop in time.
pub async fn wait_for_tasks<T>(tasks: Vec<JoinHandle<T>>, task_name: &str) {
    for task in tasks {
        wait_for_task(Some(task), task_name).await;
    }
}
