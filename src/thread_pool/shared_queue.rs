use crate::errors::{KvdaoError, Result};
use crate::thread_pool::ThreadPool;
use crossbeam::crossbeam_channel::{unbounded, Receiver, Sender};
use std::thread;

type BoxedFunc = Box<dyn FnOnce() + Send + 'static>;

enum Message {
    Run(BoxedFunc),
    Terminate,
}

/// Fixed set of workers pulling jobs off one shared channel
pub struct SharedQueueThreadPool {
    sender: Sender<Message>,
    threads: u32,
}

#[derive(Clone)]
struct Worker {
    receiver: Receiver<Message>,
}

impl Worker {
    fn start(self) {
        thread::spawn(move || run_jobs(self));
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        // the job we were running panicked, put a replacement in our place
        if thread::panicking() {
            Worker {
                receiver: self.receiver.clone(),
            }
            .start();
        }
    }
}

fn run_jobs(worker: Worker) {
    loop {
        match worker.receiver.recv() {
            Ok(Message::Run(job)) => job(),
            Ok(Message::Terminate) | Err(_) => break,
        }
    }
}

impl Drop for SharedQueueThreadPool {
    fn drop(&mut self) {
        for _ in 0..self.threads {
            // workers that already exited dropped their receivers, nothing to tell them
            let _ = self.sender.send(Message::Terminate);
        }
    }
}

impl ThreadPool for SharedQueueThreadPool {
    fn new(threads: u32) -> Result<Self> {
        if threads == 0 {
            return Err(KvdaoError::ThreadPoolError(
                "a shared queue pool needs at least one thread".to_owned(),
            ));
        }
        let (sender, receiver) = unbounded();
        for _ in 0..threads {
            Worker {
                receiver: receiver.clone(),
            }
            .start();
        }
        Ok(Self { sender, threads })
    }

    fn spawn<T>(&self, job: T)
    where
        T: FnOnce() + Send + 'static,
    {
        // only fails once every worker is gone
        let _ = self.sender.send(Message::Run(Box::new(job)));
    }
}
