//! User notice sinks

use clinicflow_core::{NoticeLevel, Notifier, UserNotice};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info, warn};

/// Notices buffered for a UI task before new ones are dropped
pub const DEFAULT_NOTICE_CAPACITY: usize = 64;

/// Logs notices instead of showing them
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: UserNotice) {
        let correlation_id = notice.correlation_id.as_deref().unwrap_or("-");
        match notice.level {
            NoticeLevel::Info => info!(correlation_id, "{}", notice.message),
            NoticeLevel::Warning => warn!(correlation_id, "{}", notice.message),
            NoticeLevel::Error => error!(correlation_id, "{}", notice.message),
        }
    }
}

/// Forwards notices to a UI task over a bounded channel.
///
/// Notices that arrive while the buffer is full, or after the receiver is
/// dropped, are discarded. Sending never blocks the request pipeline.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::Sender<UserNotice>,
}

impl ChannelNotifier {
    /// `capacity` is clamped to at least one slot.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<UserNotice>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: UserNotice) {
        match self.sender.try_send(notice) {
            Ok(()) => {}
            Err(TrySendError::Full(notice)) => {
                debug!(notice = %notice.message, "notice buffer full; discarding notice");
            }
            Err(TrySendError::Closed(_)) => debug!("notice receiver dropped; discarding notice"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn channel_delivers_in_order() {
        let (notifier, mut receiver) = ChannelNotifier::channel(DEFAULT_NOTICE_CAPACITY);

        notifier.notify(UserNotice::warning("slow down"));
        notifier.notify(UserNotice::error("broken").with_correlation_id("req_1"));

        assert_eq!(receiver.recv().await, Some(UserNotice::warning("slow down")));
        let second = receiver.recv().await.unwrap();
        assert_eq!(second.level, NoticeLevel::Error);
        assert_eq!(second.correlation_id.as_deref(), Some("req_1"));
    }

    #[tokio::test]
    async fn full_buffer_drops_newest_notices() {
        let (notifier, mut receiver) = ChannelNotifier::channel(2);

        for message in ["first", "second", "third", "fourth"] {
            notifier.notify(UserNotice::warning(message));
        }

        assert_eq!(receiver.recv().await, Some(UserNotice::warning("first")));
        assert_eq!(receiver.recv().await, Some(UserNotice::warning("second")));
        assert!(receiver.try_recv().is_err());

        notifier.notify(UserNotice::warning("after drain"));
        assert_eq!(receiver.recv().await, Some(UserNotice::warning("after drain")));
    }

    #[test]
    fn zero_capacity_still_buffers_one() {
        let (notifier, mut receiver) = ChannelNotifier::channel(0);

        notifier.notify(UserNotice::warning("kept"));
        notifier.notify(UserNotice::warning("dropped"));

        assert_eq!(receiver.try_recv().ok(), Some(UserNotice::warning("kept")));
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn dropped_receiver_is_ignored() {
        let (notifier, receiver) = ChannelNotifier::channel(1);
        drop(receiver);

        notifier.notify(UserNotice::error("nobody listening"));
        TracingNotifier.notify(UserNotice::error("logged"));
    }
}
