// SPDX-License-Identifier: MPL-2.0

//! Background executor for remote reaction writes.
//!
//! Reaction handlers run inside synchronous UI callbacks: the optimistic
//! half of a mutation applies inline and the remote write is pushed here to
//! finish on its own, so the callback never waits on the network.

use once_cell::sync::Lazy;
use std::future::Future;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;

/// Write traffic is a trickle of small requests; two I/O-bound worker
/// threads cover it.
static WRITER: Lazy<Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .thread_name("feed-writes")
        .build()
        .expect("failed to create background write runtime")
});

/// Run a remote write to completion without blocking the caller.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    WRITER.spawn(future)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn spawned_write_completes_off_the_caller_thread() {
        let (tx, rx) = std::sync::mpsc::channel();
        spawn(async move {
            tx.send("written").unwrap();
        });
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), "written");
    }
}
