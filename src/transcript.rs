//! Append-only, in-memory transcript for one conversation session.

use crate::types::{Attachment, Message, MessageId, Role};
use std::sync::{Arc, Mutex, MutexGuard};
use time::OffsetDateTime;
use tokio::sync::watch;

/// Shared handle to the ordered message list.
///
/// Clones observe the same sequence. Every append bumps a revision counter
/// that the presentation layer can await through [`Transcript::subscribe`].
#[derive(Clone)]
pub struct Transcript {
    inner: Arc<Inner>,
}

struct Inner {
    messages: Mutex<Vec<Message>>,
    revision: watch::Sender<u64>,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                messages: Mutex::new(Vec::new()),
                revision,
            }),
        }
    }

    /// Append a new message at the end and notify subscribers.
    pub fn append(
        &self,
        role: Role,
        content: impl Into<String>,
        attachment: Option<Attachment>,
    ) -> Message {
        let message = {
            let mut messages = self.lock();
            let created_at = OffsetDateTime::now_utc();
            let id = next_id(messages.last().map(|m| m.id), created_at);
            let message = Message {
                id,
                role,
                content: content.into(),
                created_at,
                attachment,
            };
            messages.push(message.clone());
            message
        };
        self.inner.revision.send_modify(|rev| *rev += 1);
        message
    }

    pub fn all(&self) -> Vec<Message> {
        self.lock().clone()
    }

    pub fn last(&self) -> Option<Message> {
        self.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Receiver that changes once per append.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Message>> {
        // Appends never panic while holding the lock, so a poisoned guard
        // still holds a consistent list.
        self.inner
            .messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn next_id(previous: Option<MessageId>, now: OffsetDateTime) -> MessageId {
    let millis = u64::try_from(now.unix_timestamp_nanos() / 1_000_000).unwrap_or(0);
    match previous {
        Some(MessageId(prev)) if millis <= prev => MessageId(prev + 1),
        _ => MessageId(millis),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_in_order() {
        let transcript = Transcript::new();
        transcript.append(Role::User, "one", None);
        transcript.append(Role::Assistant, "two", None);

        let all = transcript.all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].content, "one");
        assert_eq!(all[1].role, Role::Assistant);
    }

    #[test]
    fn ids_strictly_increase_within_the_same_millisecond() {
        let transcript = Transcript::new();
        for i in 0..50 {
            transcript.append(Role::User, i.to_string(), None);
        }
        let ids: Vec<_> = transcript.all().iter().map(|m| m.id).collect();
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn next_id_survives_clock_going_backwards() {
        let earlier = OffsetDateTime::UNIX_EPOCH;
        assert_eq!(next_id(Some(MessageId(5_000)), earlier), MessageId(5_001));
        assert_eq!(next_id(None, earlier), MessageId(0));
    }

    #[test]
    fn clones_share_the_sequence() {
        let transcript = Transcript::new();
        let other = transcript.clone();
        other.append(Role::User, "shared", None);
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.last().unwrap().content, "shared");
    }

    #[tokio::test]
    async fn append_notifies_subscribers() {
        let transcript = Transcript::new();
        let mut rx = transcript.subscribe();
        assert_eq!(*rx.borrow_and_update(), 0);

        transcript.append(Role::User, "ping", None);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 1);
    }
}
