//! Bounded pool of background workers for job pipelines.
//!
//! A fixed set of threads drains a shared channel, so at most `capacity`
//! pipelines run concurrently and the rest queue. Callers enqueue and
//! return immediately.

use crossbeam_channel::{Sender, unbounded};
use std::thread::{self, JoinHandle};

type Task = Box<dyn FnOnce() + Send + 'static>;

pub struct WorkerPool {
    tx: Option<Sender<Task>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = unbounded::<Task>();
        let workers = (0..capacity.max(1))
            .map(|_| {
                let rx = rx.clone();
                thread::spawn(move || {
                    for task in rx.iter() {
                        task();
                    }
                })
            })
            .collect();
        Self {
            tx: Some(tx),
            workers,
        }
    }

    /// Enqueue a task; never blocks on task execution.
    pub fn execute(&self, task: impl FnOnce() + Send + 'static) {
        if let Some(tx) = &self.tx {
            // Send only fails after shutdown, when workers are gone anyway
            let _ = tx.send(Box::new(task));
        }
    }

    pub fn capacity(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Closing the channel ends each worker's drain loop
        self.tx.take();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                eprintln!("stemix: worker thread panicked during shutdown");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn executes_queued_tasks() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let pool = WorkerPool::new(2);
            for _ in 0..8 {
                let counter = counter.clone();
                pool.execute(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                });
            }
            // Drop joins workers after the queue drains
        }
        assert_eq!(counter.load(Ordering::SeqCst), 8);
    }

    #[test]
    fn capacity_is_at_least_one() {
        assert_eq!(WorkerPool::new(0).capacity(), 1);
        assert_eq!(WorkerPool::new(2).capacity(), 2);
    }

    #[test]
    fn two_workers_run_concurrently() {
        let pool = WorkerPool::new(2);
        let (tx, rx) = crossbeam_channel::bounded::<()>(2);

        // Both tasks must be in flight at once for either to finish
        let (a_tx, a_rx) = crossbeam_channel::bounded::<()>(1);
        let (b_tx, b_rx) = crossbeam_channel::bounded::<()>(1);

        let done = tx.clone();
        pool.execute(move || {
            let _ = a_tx.send(());
            let _ = b_rx.recv_timeout(Duration::from_secs(5));
            let _ = done.send(());
        });
        pool.execute(move || {
            let _ = b_tx.send(());
            let _ = a_rx.recv_timeout(Duration::from_secs(5));
            let _ = tx.send(());
        });

        for _ in 0..2 {
            rx.recv_timeout(Duration::from_secs(5))
                .expect("both tasks should complete; they rendezvous mid-flight");
        }
    }

    #[test]
    fn enqueue_never_blocks_the_caller() {
        let pool = WorkerPool::new(1);
        let (gate_tx, gate_rx) = crossbeam_channel::bounded::<()>(1);

        pool.execute(move || {
            let _ = gate_rx.recv_timeout(Duration::from_secs(5));
        });

        // Worker is busy; these must still enqueue instantly
        let start = std::time::Instant::now();
        for _ in 0..16 {
            pool.execute(|| {});
        }
        assert!(start.elapsed() < Duration::from_millis(100));

        let _ = gate_tx.send(());
    }
}
