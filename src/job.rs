use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

/// One request to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkToken(pub usize);

/// Pre-filled, closed queue of work tokens shared by all workers.
///
/// Every token is handed to exactly one caller of [`JobSource::next`]. Once the
/// queue is drained, `next` returns `None` for everyone.
#[derive(Clone)]
pub struct JobSource {
    receiver: Arc<Mutex<mpsc::Receiver<WorkToken>>>,
    total: usize,
}

impl JobSource {
    pub fn filled(total: usize) -> Self {
        // tokio channels cannot have zero capacity
        let (sender, receiver) = mpsc::channel(total.max(1));
        for i in 0..total {
            // capacity equals total and the receiver is alive, so this never fails
            sender.try_send(WorkToken(i)).ok();
        }
        drop(sender);

        Self {
            receiver: Arc::new(Mutex::new(receiver)),
            total,
        }
    }

    pub async fn next(&self) -> Option<WorkToken> {
        self.receiver.lock().await.recv().await
    }

    pub fn total(&self) -> usize {
        self.total
    }
}
