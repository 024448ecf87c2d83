//! Job execution.
//!
//! One executor serves every job kind: the kind only decides how the plan is
//! computed and how outputs are named. A worker owns its task record for the
//! whole run and publishes it to the store after every state change.

use crate::application::store::ProgressStore;
use crate::domain::task::{JobRequest, TaskRecord};
use crate::error::JobError;
use crate::ports::cutter::Cutter;
use crate::ports::prober::MediaProber;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;

pub struct JobWorker<C, P> {
    cutter: C,
    prober: P,
    store: Arc<ProgressStore>,
    output_dir: PathBuf,
    output_extension: String,
}

impl<C, P> JobWorker<C, P>
where
    C: Cutter,
    P: MediaProber,
{
    pub fn new(
        cutter: C,
        prober: P,
        store: Arc<ProgressStore>,
        output_dir: impl Into<PathBuf>,
        output_extension: impl Into<String>,
    ) -> Self {
        Self {
            cutter,
            prober,
            store,
            output_dir: output_dir.into(),
            output_extension: output_extension.into(),
        }
    }

    /// Drive one job to `Completed` or `Error`. Never returns an error: every
    /// failure ends up in the task record.
    pub async fn run(&self, mut record: TaskRecord, request: JobRequest, source: PathBuf) {
        tracing::info!(source = %source.display(), "Job started");

        record.set_action("Opening source...");
        self.publish(&record).await;

        let duration = match self.prober.probe_duration(&source).await {
            Ok(duration) => duration,
            Err(e) => {
                return self
                    .fail(record, JobError::ProbeFailure(e.to_string()))
                    .await
            }
        };

        let plan = match request
            .kind
            .plan(duration, request.start_offset, request.segment_length)
        {
            Ok(plan) => plan,
            Err(e) => return self.fail(record, e).await,
        };
        record.set_total(plan.len());
        record.set_action(format!("Planned {} segment(s) over {}s", plan.len(), duration));
        self.publish(&record).await;

        if let Err(e) = tokio::fs::create_dir_all(&self.output_dir).await {
            let error = JobError::CutterFailure {
                index: 1,
                message: format!(
                    "cannot create output directory {}: {}",
                    self.output_dir.display(),
                    e
                ),
            };
            return self.fail(record, error).await;
        }

        let total = plan.len();
        for (position, boundary) in plan.iter().enumerate() {
            let index = position + 1;
            record.set_action(format!(
                "Cutting segment {}/{} ({}s-{}s)",
                index,
                total,
                boundary.start(),
                boundary.end()
            ));
            self.publish(&record).await;

            let file_name = request
                .kind
                .output_name(&record.task_id, index, &self.output_extension);
            let dest = self.output_dir.join(&file_name);
            tracing::debug!(index, start = boundary.start(), end = boundary.end(), dest = %dest.display(), "Cutting segment");

            if let Err(e) = self
                .cutter
                .cut(&source, boundary.start(), boundary.end(), &dest)
                .await
            {
                let error = JobError::CutterFailure {
                    index,
                    message: e.to_string(),
                };
                return self.fail(record, error).await;
            }

            record.push_segment(file_name);
            self.publish(&record).await;
        }

        record.complete(Utc::now());
        self.publish(&record).await;
        tracing::info!(segments = record.completed_segments, "Job completed");
    }

    async fn fail(&self, mut record: TaskRecord, error: JobError) {
        tracing::error!(
            error = %error,
            completed = record.completed_segments,
            "Job failed"
        );
        record.fail(error.to_string(), Utc::now());
        self.publish(&record).await;
    }

    /// Progress only ever updates an existing record, so a task dismissed
    /// mid-run stays gone.
    async fn publish(&self, record: &TaskRecord) {
        if !self.store.update(record.clone()).await {
            tracing::debug!(task_id = %record.task_id, "Task was dismissed, progress not recorded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryBackend;
    use crate::domain::task::{JobKind, TaskId, TaskStatus};
    use crate::ports::cutter::MockCutter;
    use crate::ports::prober::MockMediaProber;
    use async_trait::async_trait;
    use std::error::Error;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::tempdir;

    fn prober(duration: f64) -> MockMediaProber {
        let mut prober = MockMediaProber::new();
        prober
            .expect_probe_duration()
            .returning(move |_| Ok(duration));
        prober
    }

    async fn start(
        store: &ProgressStore,
        id: &str,
        request: &JobRequest,
    ) -> TaskRecord {
        let record = TaskRecord::new(TaskId::from(id), request, Utc::now());
        store.upsert(record.clone()).await;
        record
    }

    /// Writes each destination file, fails on `fail_at` (1-based), and checks
    /// the store's view of the task before every cut.
    struct ScriptedCutter {
        store: Arc<ProgressStore>,
        task_id: TaskId,
        fail_at: Option<usize>,
        calls: Mutex<Vec<(f64, f64)>>,
    }

    #[async_trait]
    impl Cutter for ScriptedCutter {
        async fn cut(
            &self,
            _source: &Path,
            start_seconds: f64,
            end_seconds: f64,
            dest: &Path,
        ) -> Result<(), Box<dyn Error + Send + Sync>> {
            let snapshot = self.store.get(&self.task_id).await.unwrap();
            assert_eq!(snapshot.segment_files.len(), snapshot.completed_segments);

            let call = {
                let mut calls = self.calls.lock().unwrap();
                calls.push((start_seconds, end_seconds));
                calls.len()
            };
            assert_eq!(snapshot.completed_segments, call - 1);

            if self.fail_at == Some(call) {
                return Err("encoder crashed".into());
            }
            tokio::fs::write(dest, b"segment").await?;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_full_split_completes() {
        let out = tempdir().unwrap();
        let store = Arc::new(ProgressStore::open(MemoryBackend::new()).await);
        let request = JobRequest::full_split("video.mp4", 29.0);
        let record = start(&store, "job1", &request).await;

        let cutter = ScriptedCutter {
            store: store.clone(),
            task_id: TaskId::from("job1"),
            fail_at: None,
            calls: Mutex::new(Vec::new()),
        };
        let worker = JobWorker::new(cutter, prober(100.0), store.clone(), out.path(), "mp4");
        worker.run(record, request, PathBuf::from("video.mp4")).await;

        let done = store.get(&TaskId::from("job1")).await.unwrap();
        assert_eq!(done.status, TaskStatus::Completed);
        assert_eq!(done.total_segments, 4);
        assert_eq!(done.completed_segments, 4);
        assert_eq!(
            done.segment_files,
            vec![
                "part_job1_1.mp4",
                "part_job1_2.mp4",
                "part_job1_3.mp4",
                "part_job1_4.mp4"
            ]
        );
        assert!(done.ended_at.is_some());
        assert!(done.error_message.is_none());
        assert_eq!(
            *worker.cutter.calls.lock().unwrap(),
            vec![(0.0, 29.0), (29.0, 58.0), (58.0, 87.0), (87.0, 100.0)]
        );
        for file in &done.segment_files {
            assert!(out.path().join(file).exists());
        }
    }

    #[tokio::test]
    async fn test_cutter_failure_keeps_earlier_output() {
        let out = tempdir().unwrap();
        let store = Arc::new(ProgressStore::open(MemoryBackend::new()).await);
        let request = JobRequest::full_split("video.mp4", 29.0);
        let record = start(&store, "job2", &request).await;

        let cutter = ScriptedCutter {
            store: store.clone(),
            task_id: TaskId::from("job2"),
            fail_at: Some(2),
            calls: Mutex::new(Vec::new()),
        };
        let worker = JobWorker::new(cutter, prober(100.0), store.clone(), out.path(), "mp4");
        worker.run(record, request, PathBuf::from("video.mp4")).await;

        let failed = store.get(&TaskId::from("job2")).await.unwrap();
        assert_eq!(failed.status, TaskStatus::Error);
        assert_eq!(failed.total_segments, 4);
        assert_eq!(failed.completed_segments, 1);
        assert_eq!(failed.segment_files, vec!["part_job2_1.mp4"]);
        assert!(failed.error_message.unwrap().contains("encoder crashed"));
        assert!(out.path().join("part_job2_1.mp4").exists());
        assert!(!out.path().join("part_job2_2.mp4").exists());
        assert_eq!(worker.cutter.calls.lock().unwrap().len(), 2);
    }

    /// Dismisses the task from the store while its first segment is being cut.
    struct DismissingCutter {
        store: Arc<ProgressStore>,
        task_id: TaskId,
    }

    #[async_trait]
    impl Cutter for DismissingCutter {
        async fn cut(
            &self,
            _source: &Path,
            _start_seconds: f64,
            _end_seconds: f64,
            _dest: &Path,
        ) -> Result<(), Box<dyn Error + Send + Sync>> {
            self.store.remove(&self.task_id).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_task_dismissed_mid_run_stays_dismissed() {
        let out = tempdir().unwrap();
        let store = Arc::new(ProgressStore::open(MemoryBackend::new()).await);
        let request = JobRequest::full_split("video.mp4", 29.0);
        let record = start(&store, "job6", &request).await;

        let cutter = DismissingCutter {
            store: store.clone(),
            task_id: TaskId::from("job6"),
        };
        let worker = JobWorker::new(cutter, prober(100.0), store.clone(), out.path(), "mp4");
        worker.run(record, request, PathBuf::from("video.mp4")).await;

        assert!(store.get(&TaskId::from("job6")).await.is_none());
        assert!(store.read_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_probe_failure_is_recorded_verbatim() {
        let out = tempdir().unwrap();
        let store = Arc::new(ProgressStore::open(MemoryBackend::new()).await);
        let request = JobRequest::split_from_offset("video.mp4", 10.0, 29.0);
        let record = start(&store, "job3", &request).await;

        let mut prober = MockMediaProber::new();
        prober
            .expect_probe_duration()
            .returning(|_| Err("moov atom not found".into()));
        let mut cutter = MockCutter::new();
        cutter.expect_cut().never();

        let worker = JobWorker::new(cutter, prober, store.clone(), out.path(), "mp4");
        worker.run(record, request, PathBuf::from("video.mp4")).await;

        let failed = store.get(&TaskId::from("job3")).await.unwrap();
        assert_eq!(failed.status, TaskStatus::Error);
        assert_eq!(failed.error_message.as_deref(), Some("moov atom not found"));
        assert_eq!(failed.completed_segments, 0);
        assert!(failed.segment_files.is_empty());
    }

    #[tokio::test]
    async fn test_single_cut_past_the_end_fails_without_cutting() {
        let out = tempdir().unwrap();
        let store = Arc::new(ProgressStore::open(MemoryBackend::new()).await);
        let request = JobRequest::single_cut("video.mp4", 305.0, 29.0);
        let record = start(&store, "job4", &request).await;

        let mut cutter = MockCutter::new();
        cutter.expect_cut().never();

        let worker = JobWorker::new(cutter, prober(300.0), store.clone(), out.path(), "mp4");
        worker.run(record, request, PathBuf::from("video.mp4")).await;

        let failed = store.get(&TaskId::from("job4")).await.unwrap();
        assert_eq!(failed.status, TaskStatus::Error);
        assert_eq!(failed.total_segments, 1);
        assert!(failed.error_message.unwrap().starts_with("Empty cut"));
    }

    #[tokio::test]
    async fn test_single_cut_names_and_bounds() {
        let out = tempdir().unwrap();
        let store = Arc::new(ProgressStore::open(MemoryBackend::new()).await);
        let request = JobRequest::single_cut("video.mp4", 287.0, 29.0);
        let record = start(&store, "job5", &request).await;

        let mut cutter = MockCutter::new();
        cutter
            .expect_cut()
            .withf(|_, start, end, dest| {
                *start == 287.0 && *end == 300.0 && dest.ends_with("cut_job5_1.mkv")
            })
            .times(1)
            .returning(|_, _, _, _| Ok(()));

        let worker = JobWorker::new(cutter, prober(300.0), store.clone(), out.path(), "mkv");
        worker.run(record, request, PathBuf::from("video.mp4")).await;

        let done = store.get(&TaskId::from("job5")).await.unwrap();
        assert_eq!(done.job_kind, JobKind::SingleCut);
        assert_eq!(done.status, TaskStatus::Completed);
        assert_eq!(done.segment_files, vec!["cut_job5_1.mkv"]);
    }
}
