//! # Feedback Sink Implementations
//!
//! Toast-style feedback surfaced to the user. The gateway pushes one
//! [`Feedback`] per call outcome; the embedding UI drains the channel and
//! renders however it likes.

use crate::core::service::FeedbackSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackLevel {
    Success,
    Error,
}

/// One user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub level: FeedbackLevel,
    pub message: String,
}

impl Feedback {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FeedbackLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FeedbackLevel::Error,
            message: message.into(),
        }
    }
}

/// Channel-backed sink. The receiver side belongs to the UI event loop; if
/// the UI goes away, feedback is silently discarded.
#[derive(Clone)]
pub struct ChannelFeedback {
    tx: async_channel::Sender<Feedback>,
}

impl ChannelFeedback {
    pub fn new() -> (Self, async_channel::Receiver<Feedback>) {
        let (tx, rx) = async_channel::unbounded();
        (Self { tx }, rx)
    }
}

impl FeedbackSink for ChannelFeedback {
    fn push(&self, feedback: Feedback) {
        let _ = self.tx.try_send(feedback);
    }
}

/// Sink that drops everything. For headless use and tests that do not
/// assert on feedback.
pub struct NullFeedback;

impl FeedbackSink for NullFeedback {
    fn push(&self, _feedback: Feedback) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_feedback_delivers_in_order() {
        let (sink, rx) = ChannelFeedback::new();
        sink.success("saved");
        sink.error("boom");

        assert_eq!(rx.try_recv().unwrap(), Feedback::success("saved"));
        assert_eq!(rx.try_recv().unwrap(), Feedback::error("boom"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_push_after_receiver_dropped_is_silent() {
        let (sink, rx) = ChannelFeedback::new();
        drop(rx);
        sink.success("nobody listening");
    }
}
