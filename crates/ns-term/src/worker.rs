// SPDX-License-Identifier: MIT
//
// Worker threads — background jobs that report back over a bounded channel.
//
// A job is a closure run on its own named thread. It gets an owned
// `SyncSender` for the pool's message type and nothing else: no shared
// document state, no locks. The receiving end stays with the UI loop,
// which blocks on it with a tick timeout.
//
// The channel is bounded so a command that floods output (think `yes`)
// applies back-pressure to its own thread instead of growing the UI's
// queue without limit. A send fails only once the UI has dropped the
// receiver; jobs treat that as "stop now".

use std::fmt;
use std::io;
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread;

use tracing::debug;

/// Messages in flight before senders block.
pub const DEFAULT_CAPACITY: usize = 256;

/// Identifies one spawned job in the messages it sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(u64);

impl JobId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// Spawns jobs that all report into one channel.
#[derive(Debug)]
pub struct Pool<M> {
    tx: SyncSender<M>,
    next_job: u64,
}

/// Create a pool and the receiver its jobs report to.
#[must_use]
pub fn channel<M: Send + 'static>(capacity: usize) -> (Pool<M>, Receiver<M>) {
    let (tx, rx) = mpsc::sync_channel(capacity);
    (Pool { tx, next_job: 1 }, rx)
}

impl<M: Send + 'static> Pool<M> {
    /// A sender for producers that are not pool jobs (the stdin reader).
    #[must_use]
    pub fn sender(&self) -> SyncSender<M> {
        self.tx.clone()
    }

    /// Run `job` on a new thread named `name`.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread cannot be spawned.
    pub fn spawn<F>(&mut self, name: &str, job: F) -> io::Result<JobId>
    where
        F: FnOnce(JobId, SyncSender<M>) + Send + 'static,
    {
        let id = JobId(self.next_job);
        self.next_job += 1;
        let tx = self.tx.clone();
        thread::Builder::new()
            .name(format!("{name}-{}", id.0))
            .spawn(move || job(id, tx))?;
        debug!(job = %id, name, "spawned worker");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn jobs_report_with_their_ids() {
        let (mut pool, rx) = channel::<(JobId, u32)>(4);
        let a = pool
            .spawn("test", |id, tx| {
                let _ = tx.send((id, 1));
            })
            .unwrap();
        let b = pool
            .spawn("test", |id, tx| {
                let _ = tx.send((id, 2));
            })
            .unwrap();
        assert_ne!(a, b);

        let mut got: Vec<_> = (0..2)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        got.sort();
        assert_eq!(got, vec![(a, 1), (b, 2)]);
    }

    #[test]
    fn bounded_channel_blocks_producer() {
        let (mut pool, rx) = channel::<u32>(1);
        pool.spawn("flood", |_, tx| {
            for i in 0..10 {
                if tx.send(i).is_err() {
                    return;
                }
            }
        })
        .unwrap();
        // Everything still arrives, in order, through a one-slot channel.
        let got: Vec<u32> = (0..10)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        assert_eq!(got, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn external_sender_shares_the_channel() {
        let (pool, rx) = channel::<&'static str>(2);
        pool.sender().send("input").unwrap();
        assert_eq!(rx.recv().unwrap(), "input");
    }
}
