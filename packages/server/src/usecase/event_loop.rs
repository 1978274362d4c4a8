//! Single logical event loop.
//!
//! Connections are served by independent tokio tasks. Mutating usecases hold
//! a turn while they change the relay state and enqueue the resulting frames,
//! so two operations on the same channel are observed by every member in the
//! same order.

use tokio::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct EventLoop {
    turn: Mutex<()>,
}

impl EventLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for the turn. Released when the guard is dropped.
    pub async fn turn(&self) -> MutexGuard<'_, ()> {
        self.turn.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_turns_never_overlap() {
        // テスト項目: 同時に複数のタスクがターンを保持しない
        // given (前提条件):
        let event_loop = Arc::new(EventLoop::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        // when (操作):
        let mut handles = Vec::new();
        for _ in 0..8 {
            let event_loop = event_loop.clone();
            let inside = inside.clone();
            let max_inside = max_inside.clone();
            handles.push(tokio::spawn(async move {
                let _turn = event_loop.turn().await;
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                max_inside.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(2)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // then (期待する結果):
        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    }
}
