//! Job orchestrator: sequences ingest → separation for each job on the
//! worker pool, and serves the render/export sub-cycle once a job is ready.
//!
//! Stage failures inside the processing phase never reach a caller
//! directly; they are recorded on the job and observed via status queries.
//! Failures in render/export belong to that call alone and leave the job's
//! status untouched.

use crate::config::Config;
use crate::defaults;
use crate::engine::Separator;
use crate::error::{Result, StemixError};
use crate::exec::ToolRunner;
use crate::job::pool::WorkerPool;
use crate::job::registry::{JobEntry, JobRegistry};
use crate::job::{Job, JobStatus, MixParams, StatusSnapshot};
use crate::media;
use crate::mix::{self, Gains};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub struct Orchestrator {
    registry: Arc<JobRegistry>,
    runner: Arc<dyn ToolRunner>,
    separator: Separator,
    jobs_dir: PathBuf,
    default_device: String,
    watch_interval: Duration,
    pool: WorkerPool,
}

impl Orchestrator {
    pub fn new(config: Config, runner: Arc<dyn ToolRunner>) -> Self {
        let separator = Separator::new(runner.clone(), &config.engine);
        Self {
            registry: Arc::new(JobRegistry::new()),
            runner,
            separator,
            jobs_dir: config.jobs.dir.clone(),
            default_device: config.engine.default_device.clone(),
            watch_interval: config.watch_interval(),
            pool: WorkerPool::new(config.jobs.workers),
        }
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    /// Device hint used when a caller does not name one.
    pub fn default_device(&self) -> &str {
        &self.default_device
    }

    /// Register a submitted media file. Creates the job's isolated working
    /// directory and returns the new job id.
    pub fn submit(&self, input: &Path) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let job_dir = self.jobs_dir.join(&id);
        std::fs::create_dir_all(&job_dir)?;
        self.registry
            .insert(Job::new(id.clone(), input.to_path_buf(), job_dir));
        Ok(id)
    }

    /// Begin background processing for an uploaded job.
    ///
    /// Returns as soon as the pipeline is queued; progress is observed via
    /// `status` or `watch`. Only the `uploaded → processing` transition is
    /// legal — a job never re-enters processing.
    pub fn start(&self, job_id: &str, device: &str) -> Result<()> {
        let entry = self.registry.get(job_id)?;

        entry.with_record(|job| {
            if job.status != JobStatus::Uploaded {
                return Err(StemixError::InvalidState {
                    job_id: job.id.clone(),
                    message: format!("cannot start processing from state '{}'", job.status),
                });
            }
            job.status = JobStatus::Processing;
            job.update_progress(0, "Starting...");
            Ok(())
        })?;

        let runner = self.runner.clone();
        let separator = self.separator.clone();
        let device = device.to_string();
        let worker_entry = entry.clone();

        self.pool.execute(move || {
            if let Err(e) = run_pipeline(&worker_entry, runner.as_ref(), &separator, &device) {
                worker_entry.with_record(|job| job.fail(e.to_string()));
            }
        });

        Ok(())
    }

    /// Non-blocking snapshot of a job's state.
    pub fn status(&self, job_id: &str) -> Result<StatusSnapshot> {
        self.registry.snapshot(job_id)
    }

    /// Subscribe to a job's status at the configured cadence.
    ///
    /// A snapshot is sent per tick until the job reaches a terminal
    /// separation state or the receiver is dropped. The watcher mutates
    /// nothing.
    pub fn watch(&self, job_id: &str) -> Result<crossbeam_channel::Receiver<StatusSnapshot>> {
        self.watch_every(job_id, self.watch_interval)
    }

    pub fn watch_every(
        &self,
        job_id: &str,
        interval: Duration,
    ) -> Result<crossbeam_channel::Receiver<StatusSnapshot>> {
        let entry = self.registry.get(job_id)?;
        let (tx, rx) = crossbeam_channel::bounded(16);

        std::thread::spawn(move || {
            loop {
                let snapshot = entry.snapshot();
                let terminal = snapshot.status.is_terminal();
                if tx.send(snapshot).is_err() {
                    // Subscriber cancelled
                    break;
                }
                if terminal {
                    break;
                }
                std::thread::sleep(interval);
            }
        });

        Ok(rx)
    }

    /// Mix the job's stems with the requested gains and wind reduction,
    /// overwriting the job's preview artifact.
    ///
    /// Requires `ready`. Gains arrive as percents of unity. Renders for one
    /// job are serialized by its mix gate; errors here are the caller's and
    /// do not change the job's status.
    pub fn render(&self, job_id: &str, params: &MixParams) -> Result<PathBuf> {
        let entry = self.registry.get(job_id)?;
        let _gate = entry.lock_mix();

        let (stems, job_dir) = entry.with_record(|job| {
            if job.status != JobStatus::Ready {
                return Err(StemixError::InvalidState {
                    job_id: job.id.clone(),
                    message: "not ready — wait for processing to finish".to_string(),
                });
            }
            let stems = job.stems.clone().ok_or_else(|| StemixError::Other(
                format!("job {} is ready but has no stems", job.id),
            ))?;
            Ok((stems, job.job_dir.clone()))
        })?;

        let background = media::denoise::denoise(
            self.runner.as_ref(),
            &stems.other,
            params.wind_reduction,
            &job_dir,
        )?;

        let gains = Gains {
            voice: params.voice / 100.0,
            music: params.music / 100.0,
            background: params.background / 100.0,
        };

        let out = job_dir.join("preview.wav");
        mix::mix_stems(&stems, &background, gains, &out)?;

        entry.with_record(|job| job.mixed_path = Some(out.clone()));
        Ok(out)
    }

    /// Produce the final artifact from the most recent render.
    ///
    /// Video inputs get the mixed track muxed back under the original
    /// picture stream; audio inputs export the mixed WAV as-is.
    pub fn export(&self, job_id: &str) -> Result<PathBuf> {
        let entry = self.registry.get(job_id)?;
        let _gate = entry.lock_mix();

        let (input, job_dir, mixed) = entry.with_record(|job| {
            (
                job.input_path.clone(),
                job.job_dir.clone(),
                job.mixed_path.clone(),
            )
        });

        let mixed = mixed.ok_or_else(|| StemixError::InvalidState {
            job_id: job_id.to_string(),
            message: "no mix rendered yet — render a preview first".to_string(),
        })?;

        if media::is_video(&input) {
            let out = job_dir.join("output.mp4");
            media::mux::mux_video(self.runner.as_ref(), &input, &mixed, &out)?;
            Ok(out)
        } else {
            Ok(mixed)
        }
    }
}

/// The processing phase: ingest, then separation, strictly in order.
fn run_pipeline(
    entry: &Arc<JobEntry>,
    runner: &dyn ToolRunner,
    separator: &Separator,
    device: &str,
) -> Result<()> {
    let (input, job_dir) = entry.with_record(|job| (job.input_path.clone(), job.job_dir.clone()));

    entry.with_record(|job| {
        job.update_progress(defaults::INGEST_SPAN.start, "Extracting audio...")
    });
    let pcm = job_dir.join("audio.wav");
    media::ingest::extract_audio(runner, &input, &pcm)?;

    entry.with_record(|job| {
        job.update_progress(
            defaults::SEPARATE_SPAN.start,
            "Separating stems — this may take a few minutes...",
        )
    });
    let mut on_progress = |stage_pct: f32, message: &str| {
        let overall = defaults::SEPARATE_SPAN.remap(stage_pct);
        entry.with_record(|job| job.update_progress(overall, message));
    };
    let stems = separator.separate(&pcm, &job_dir, device, &mut on_progress)?;

    let (_, duration) = media::wav::probe(&stems.vocals)?;
    let duration = (duration * 10.0).round() / 10.0;

    entry.with_record(|job| job.complete(stems, duration));
    Ok(())
}
