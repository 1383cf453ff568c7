//! Conversation session: the transcript plus the single-flight send contract.

use crate::ai::{FAILURE_SENTINEL, InferenceClient, ReplyOutcome};
use crate::store::{SecureStore, load_credential};
use crate::transcript::Transcript;
use crate::types::{Attachment, Role, VOICE_MESSAGE_LABEL};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// Neither text nor audio to send.
    EmptyInput,
    /// No API key has been stored yet.
    MissingCredential,
    /// Another send has not settled.
    Busy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Delivered,
    /// Upstream answered without text; the empty-reply sentinel was appended.
    Empty,
    /// The call failed; the failure sentinel was appended.
    Failed,
    /// Nothing was appended and no call was made.
    Rejected(RejectReason),
}

impl From<ReplyOutcome> for SubmitOutcome {
    fn from(outcome: ReplyOutcome) -> Self {
        match outcome {
            ReplyOutcome::Delivered => SubmitOutcome::Delivered,
            ReplyOutcome::Empty => SubmitOutcome::Empty,
            ReplyOutcome::Failed => SubmitOutcome::Failed,
        }
    }
}

/// What the composer holds before it is sent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Draft {
    pub text: String,
    pub audio: Option<Attachment>,
}

impl Draft {
    /// Text with content, or non-empty audio.
    pub fn is_sendable(&self) -> bool {
        !self.text.trim().is_empty() || self.audio.as_ref().is_some_and(|a| !a.is_empty())
    }

    /// Empty the composer, returning what it held.
    pub fn take(&mut self) -> Draft {
        std::mem::take(self)
    }
}

/// One conversation, from screen mount to unmount.
///
/// Cloning yields another handle to the same conversation. `pending` is both
/// the signal the UI uses to disable input and the guard that keeps at most
/// one inference call outstanding.
#[derive(Clone)]
pub struct Session {
    transcript: Transcript,
    pending: Arc<AtomicBool>,
    credential: Arc<str>,
    client: InferenceClient,
}

impl Session {
    pub fn new(credential: impl Into<String>, client: InferenceClient) -> Self {
        let credential: String = credential.into();
        Self {
            transcript: Transcript::new(),
            pending: Arc::new(AtomicBool::new(false)),
            credential: Arc::from(credential.trim()),
            client,
        }
    }

    /// Start a session with whatever key the store holds (none → empty).
    pub fn open(store: &dyn SecureStore, client: InferenceClient) -> Self {
        Self::new(load_credential(store).unwrap_or_default(), client)
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }

    pub fn has_credential(&self) -> bool {
        !self.credential.is_empty()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Send one user turn and append the reply.
    ///
    /// On acceptance exactly one user message and, once settled, exactly one
    /// assistant message are appended, and `pending` is back to false.
    pub async fn submit(&self, text: &str, audio: Option<Attachment>) -> SubmitOutcome {
        let text = text.trim();
        let audio = audio.filter(|a| !a.is_empty());

        if text.is_empty() && audio.is_none() {
            return SubmitOutcome::Rejected(RejectReason::EmptyInput);
        }
        if !self.has_credential() {
            return SubmitOutcome::Rejected(RejectReason::MissingCredential);
        }
        let Some(mut in_flight) = InFlight::begin(self) else {
            tracing::debug!("submit ignored while a send is pending");
            return SubmitOutcome::Rejected(RejectReason::Busy);
        };

        let label = if text.is_empty() { VOICE_MESSAGE_LABEL } else { text };
        let user_message = self.transcript.append(Role::User, label, audio);

        let prompt = text.replace('\n', " ");
        let reply = self
            .client
            .send(&prompt, &self.credential, user_message.attachment.as_ref())
            .await;

        in_flight.settle(&reply.text);
        tracing::debug!(outcome = ?reply.outcome, "turn settled");
        reply.outcome.into()
    }

    /// Send whatever the composer holds.
    pub async fn submit_draft(&self, draft: Draft) -> SubmitOutcome {
        self.submit(&draft.text, draft.audio).await
    }
}

/// Holds the pending flag for one accepted submission.
///
/// If the submit future is dropped before settling, the failure sentinel is
/// appended so every user turn is still followed by one assistant turn.
struct InFlight<'a> {
    session: &'a Session,
    settled: bool,
}

impl<'a> InFlight<'a> {
    fn begin(session: &'a Session) -> Option<Self> {
        session
            .pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(Self {
            session,
            settled: false,
        })
    }

    fn settle(&mut self, reply: &str) {
        self.session
            .transcript
            .append(Role::Assistant, reply, None);
        self.settled = true;
        self.session.pending.store(false, Ordering::Release);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!("send abandoned before settling");
            self.settle(FAILURE_SENTINEL);
        }
    }
}
