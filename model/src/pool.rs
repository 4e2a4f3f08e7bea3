//! A small worker pool for blocking I/O.

use crate::error::ModelError;
use crossbeam::channel::{self, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{error, trace};

/// A unit of work run once on some worker thread.
pub trait Task: Send {
    fn run(self: Box<Self>);
}

impl<F: FnOnce() + Send> Task for F {
    fn run(self: Box<Self>) {
        (*self)()
    }
}

enum Message {
    Run(Box<dyn Task>),
    Stop,
}

/// Hands tasks to a [`ThreadPool`]. Cheap to clone and usable from any thread.
#[derive(Clone)]
pub struct Submitter {
    sender: Sender<Message>,
    shut_down: Arc<AtomicBool>,
}

impl Submitter {
    pub fn submit<T: Task + 'static>(&self, task: T) -> Result<(), ModelError> {
        if self.shut_down.load(Ordering::SeqCst) {
            return Err(ModelError::PoolShutDown);
        }
        self.sender
            .send(Message::Run(Box::new(task)))
            .map_err(|_| ModelError::PoolShutDown)
    }
}

impl std::fmt::Debug for Submitter {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Submitter(shut_down: {:?})", self.shut_down)
    }
}

/// A fixed set of worker threads pulling tasks off a shared queue.
///
/// Tasks are never cancelled: everything enqueued before [`shutdown`](ThreadPool::shutdown) still
/// runs. Tasks report back through whatever channel they were built with.
pub struct ThreadPool {
    sender: Sender<Message>,
    receiver: Receiver<Message>,
    shut_down: Arc<AtomicBool>,
    threads: Vec<JoinHandle<()>>,
}

impl ThreadPool {
    /// Creates a pool without any threads; tasks queue up until `start_threads` is called.
    pub fn new() -> ThreadPool {
        let (sender, receiver) = channel::unbounded();
        ThreadPool {
            sender,
            receiver,
            shut_down: Arc::new(AtomicBool::new(false)),
            threads: Vec::new(),
        }
    }

    pub fn start_threads(&mut self, count: usize) {
        for _ in 0..count {
            let index = self.threads.len();
            let receiver = self.receiver.clone();
            let spawned = thread::Builder::new()
                .name(format!("reqgraph-worker-{}", index))
                .spawn(move || worker(index, receiver));
            match spawned {
                Ok(handle) => self.threads.push(handle),
                Err(err) => error!("failed to spawn worker {}: {}", index, err),
            }
        }
    }

    pub fn thread_count(&self) -> usize {
        self.threads.len()
    }

    pub fn enqueue<T: Task + 'static>(&self, task: T) -> Result<(), ModelError> {
        self.submitter().submit(task)
    }

    pub fn submitter(&self) -> Submitter {
        Submitter {
            sender: self.sender.clone(),
            shut_down: Arc::clone(&self.shut_down),
        }
    }

    /// Stops accepting tasks and tells every worker to exit once the queue ahead of it is done.
    pub fn shutdown(&mut self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        for _ in 0..self.threads.len() {
            // the pool holds a receiver itself, so this can’t fail
            let _ = self.sender.send(Message::Stop);
        }
    }

    /// Waits for every worker to exit.
    pub fn join(&mut self) {
        for handle in self.threads.drain(..) {
            if handle.join().is_err() {
                error!("a worker thread panicked");
            }
        }
    }
}

impl Default for ThreadPool {
    fn default() -> Self {
        ThreadPool::new()
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();
        self.join();
    }
}

fn worker(index: usize, receiver: Receiver<Message>) {
    trace!("worker {} started", index);
    while let Ok(message) = receiver.recv() {
        match message {
            Message::Run(task) => task.run(),
            Message::Stop => break,
        }
    }
    trace!("worker {} stopped", index);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn runs_every_task_before_shutting_down() {
        let mut pool = ThreadPool::new();
        pool.start_threads(3);
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..50 {
            let counter = Arc::clone(&counter);
            pool.enqueue(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }
        pool.shutdown();
        pool.join();
        assert_eq!(counter.load(Ordering::SeqCst), 50);
    }

    #[test]
    fn rejects_tasks_after_shutdown() {
        let mut pool = ThreadPool::new();
        pool.start_threads(1);
        let submitter = pool.submitter();
        pool.shutdown();
        assert!(matches!(
            submitter.submit(|| {}),
            Err(ModelError::PoolShutDown)
        ));
    }

    #[test]
    fn completions_arrive_over_a_channel() {
        let mut pool = ThreadPool::new();
        pool.start_threads(2);
        let (tx, rx) = channel::unbounded();
        pool.enqueue(move || {
            let _ = tx.send(thread::current().name().map(str::to_owned));
        })
        .unwrap();
        let name = rx.recv().unwrap().unwrap();
        assert!(name.starts_with("reqgraph-worker-"));
    }
}
