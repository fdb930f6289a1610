//! Concurrent job registry.
//!
//! The map supports concurrent insertion and lookup; each record is
//! guarded by its own mutex so one job's worker never blocks another
//! job's status reads.

use crate::error::{Result, StemixError};
use crate::job::{Job, StatusSnapshot};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

/// A registered job plus its per-job render gate.
pub struct JobEntry {
    record: Mutex<Job>,
    mix_gate: Mutex<()>,
}

impl JobEntry {
    fn new(job: Job) -> Self {
        Self {
            record: Mutex::new(job),
            mix_gate: Mutex::new(()),
        }
    }

    /// Run `f` with exclusive access to the record.
    pub fn with_record<T>(&self, f: impl FnOnce(&mut Job) -> T) -> T {
        // A poisoned lock still yields the record
        let mut guard = self.record.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.with_record(|job| job.snapshot())
    }

    /// Serializes render/export for this job: at most one concurrent mix
    /// may rewrite `mixed_path`.
    pub fn lock_mix(&self) -> MutexGuard<'_, ()> {
        self.mix_gate.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Shared map from job id to entry.
#[derive(Default)]
pub struct JobRegistry {
    inner: RwLock<HashMap<String, Arc<JobEntry>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, job: Job) -> Arc<JobEntry> {
        let id = job.id.clone();
        let entry = Arc::new(JobEntry::new(job));
        self.inner
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, entry.clone());
        entry
    }

    pub fn get(&self, job_id: &str) -> Result<Arc<JobEntry>> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(job_id)
            .cloned()
            .ok_or_else(|| StemixError::JobNotFound {
                job_id: job_id.to_string(),
            })
    }

    pub fn snapshot(&self, job_id: &str) -> Result<StatusSnapshot> {
        Ok(self.get(job_id)?.snapshot())
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
