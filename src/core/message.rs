//! Message surface for ferrule.
//!
//! [Messenger] is a cheap, clonable handle that any thread can use to report info or error
//! text. Messages travel over a crossbeam channel to the interaction loop, which keeps the
//! newest one in a [MessageLine] until it expires. Every message is also written to the log.

use crossbeam_channel::{Receiver, Sender, unbounded};
use std::fmt::Display;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    level: Level,
    text: String,
}

impl Message {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            text: text.into(),
        }
    }

    #[inline]
    pub fn level(&self) -> Level {
        self.level
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Fire-and-forget sender for the message surface.
///
/// Sending never blocks and never fails loudly: once the loop is gone, messages are only logged.
#[derive(Debug, Clone)]
pub struct Messenger {
    tx: Sender<Message>,
}

impl Messenger {
    pub fn channel() -> (Self, Receiver<Message>) {
        let (tx, rx) = unbounded();
        (Self { tx }, rx)
    }

    pub fn info(&self, text: impl Into<String>) {
        let text = text.into();
        tracing::info!("{text}");
        let _ = self.tx.send(Message::info(text));
    }

    pub fn error(&self, err: impl Display) {
        let text = err.to_string();
        tracing::error!("{text}");
        let _ = self.tx.send(Message::error(text));
    }
}

/// The newest message and the moment it stops being shown.
#[derive(Debug)]
pub struct MessageLine {
    current: Option<(Message, Instant)>,
    ttl: Duration,
}

impl MessageLine {
    pub fn new(ttl: Duration) -> Self {
        Self { current: None, ttl }
    }

    pub fn show(&mut self, message: Message) {
        self.current = Some((message, Instant::now() + self.ttl));
    }

    pub fn current(&self) -> Option<&Message> {
        self.current.as_ref().map(|(m, _)| m)
    }

    /// Time left until the shown message expires.
    pub fn remaining(&self) -> Option<Duration> {
        self.current
            .as_ref()
            .map(|(_, expiry)| expiry.saturating_duration_since(Instant::now()))
    }

    /// Drops the message once expired. Returns true if something was cleared.
    pub fn expire(&mut self) -> bool {
        if let Some((_, expiry)) = &self.current
            && Instant::now() >= *expiry
        {
            self.current = None;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messenger_delivers_in_order() -> Result<(), Box<dyn std::error::Error>> {
        let (messenger, rx) = Messenger::channel();
        let clone = messenger.clone();
        messenger.info("first");
        clone.error("second");

        assert_eq!(rx.try_recv()?, Message::info("first"));
        assert_eq!(rx.try_recv()?, Message::error("second"));
        assert!(rx.try_recv().is_err());
        Ok(())
    }

    #[test]
    fn messenger_survives_dropped_receiver() {
        let (messenger, rx) = Messenger::channel();
        drop(rx);
        messenger.info("nobody listens");
    }

    #[test]
    fn message_line_expires() {
        let mut line = MessageLine::new(Duration::ZERO);
        line.show(Message::info("gone soon"));
        assert!(line.current().is_some());
        assert!(line.expire());
        assert!(line.current().is_none());
        assert!(!line.expire());
    }

    #[test]
    fn message_line_keeps_fresh_message() {
        let mut line = MessageLine::new(Duration::from_secs(60));
        line.show(Message::error("still here"));
        assert!(!line.expire());
        assert_eq!(line.current().map(Message::level), Some(Level::Error));
        assert!(line.remaining().is_some_and(|d| d > Duration::from_secs(1)));
    }
}
