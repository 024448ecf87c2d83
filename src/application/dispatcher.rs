//! Job submission.

use crate::application::store::ProgressStore;
use crate::application::worker::JobWorker;
use crate::domain::task::{JobRequest, TaskId, TaskRecord};
use crate::error::{JobError, JobResult};
use crate::ports::cutter::Cutter;
use crate::ports::id_allocator::TaskIdAllocator;
use crate::ports::prober::MediaProber;
use crate::ports::resolver::FileResolver;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::Instrument;

/// Inbound side of job submission, as seen by the transport layer.
#[async_trait]
pub trait JobSubmitter: Send + Sync {
    /// Returns as soon as the task record exists; the cutting happens in the background.
    async fn submit(&self, request: JobRequest) -> JobResult<TaskId>;
}

/// Validates submissions and launches one background worker per job.
///
/// At most `max_concurrent_jobs` workers cut at the same time; the rest wait
/// for a permit while their record already shows as `Processing`.
pub struct JobDispatcher<F, C, P> {
    resolver: F,
    ids: Arc<dyn TaskIdAllocator>,
    store: Arc<ProgressStore>,
    worker: Arc<JobWorker<C, P>>,
    permits: Arc<Semaphore>,
}

impl<F, C, P> JobDispatcher<F, C, P>
where
    F: FileResolver,
    C: Cutter + 'static,
    P: MediaProber + 'static,
{
    pub fn new(
        resolver: F,
        ids: Arc<dyn TaskIdAllocator>,
        store: Arc<ProgressStore>,
        worker: Arc<JobWorker<C, P>>,
        max_concurrent_jobs: usize,
    ) -> Self {
        Self {
            resolver,
            ids,
            store,
            worker,
            permits: Arc::new(Semaphore::new(max_concurrent_jobs.max(1))),
        }
    }

    /// Submit a job, also handing back the worker's join handle.
    pub async fn spawn(&self, request: JobRequest) -> JobResult<(TaskId, JoinHandle<()>)> {
        request.validate()?;

        let source = self
            .resolver
            .resolve(&request.source)
            .await
            .ok_or_else(|| JobError::SourceNotFound(request.source.clone()))?;

        let task_id = self.ids.new_id();
        let mut record = TaskRecord::new(task_id.clone(), &request, Utc::now());
        record.set_action("Waiting for a free worker");
        self.store.upsert(record.clone()).await;

        let span = tracing::info_span!("job", task_id = %task_id, kind = %request.kind);
        let worker = self.worker.clone();
        let permits = self.permits.clone();
        let handle = tokio::spawn(
            async move {
                let _permit = match permits.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        tracing::error!(error = %e, "Worker pool closed, job not started");
                        return;
                    }
                };
                worker.run(record, request, source).await;
            }
            .instrument(span),
        );

        tracing::info!(task_id = %task_id, "Started background task");
        Ok((task_id, handle))
    }
}

#[async_trait]
impl<F, C, P> JobSubmitter for JobDispatcher<F, C, P>
where
    F: FileResolver,
    C: Cutter + 'static,
    P: MediaProber + 'static,
{
    async fn submit(&self, request: JobRequest) -> JobResult<TaskId> {
        self.spawn(request).await.map(|(task_id, _)| task_id)
    }
}
