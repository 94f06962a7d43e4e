//! Shared channel between the master and the memory slave.
//!
//! One size-1 mailbox per direction plus four delta-cycle event flags.
//! Posts and takes are two-phase: a post stages its message and a take
//! latches its consumption; neither becomes cross-visible until the kernel
//! runs [`SharedChannel::sync_events`]. This is what keeps one actor from
//! observing the other's same-cycle effects.

use serde::{Deserialize, Serialize};

/// Memory operation kind carried by requests and mirrored by responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemOp {
    /// Read the addressed cell.
    Read,
    /// Write the carried data to the addressed cell.
    Write,
}

/// Response status reported by the slave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// The access completed.
    Ok,
    /// The access failed.
    Error,
}

/// A request posted by the master. Immutable once posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    /// Requested operation.
    pub op: MemOp,
    /// Target address.
    pub addr: u64,
    /// Data to write (meaningful for writes only).
    pub data: i64,
}

/// A response posted by the slave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Response {
    /// Operation this response answers.
    pub op: MemOp,
    /// Whether the access succeeded.
    pub status: Status,
    /// Data read back (meaningful for reads only).
    pub data: i64,
}

/// Delta-cycle event flag.
///
/// Raised to `Pending` by the action that fires it; each sync pass demotes
/// it one rung (`Pending` → `Consumed` → `Unset`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EventFlag {
    /// No event in flight.
    #[default]
    Unset,
    /// Fired this delta cycle; not yet settled.
    Pending,
    /// Settled; observable for one more cycle.
    Consumed,
}

impl EventFlag {
    fn raise(&mut self) {
        *self = Self::Pending;
    }

    /// Demote one rung. Returns whether the flag changed.
    fn settle(&mut self) -> bool {
        let next = match self {
            Self::Pending => Self::Consumed,
            Self::Consumed | Self::Unset => Self::Unset,
        };
        let changed = *self != next;
        *self = next;
        changed
    }
}

/// Outcome of a post attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOutcome {
    /// The message was staged; it commits at the next sync pass.
    Accepted,
    /// The mailbox is occupied; the caller should suspend.
    NotReady,
}

/// Size-1 two-phase mailbox.
///
/// `committed` is visible to both actors. A post lands in `staged`; a take
/// latches `take_latched` and yields the committed value to the consumer,
/// while the producer still reads the slot as occupied until sync.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct Mailbox<T> {
    committed: Option<T>,
    staged: Option<T>,
    take_latched: bool,
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self {
            committed: None,
            staged: None,
            take_latched: false,
        }
    }
}

impl<T: Copy> Mailbox<T> {
    /// Whether the slot reads as occupied to a producer.
    fn occupied(&self) -> bool {
        self.committed.is_some() || self.staged.is_some()
    }

    fn post(&mut self, item: T) -> PostOutcome {
        if self.occupied() {
            PostOutcome::NotReady
        } else {
            self.staged = Some(item);
            PostOutcome::Accepted
        }
    }

    fn take(&mut self) -> Option<T> {
        if self.take_latched {
            return None;
        }
        let item = self.committed?;
        self.take_latched = true;
        Some(item)
    }

    /// Whether a committed, not-yet-latched item is available to consume.
    fn consumable(&self) -> bool {
        self.committed.is_some() && !self.take_latched
    }

    /// Whether the slot holds nothing a future sync could surface.
    fn drained(&self) -> bool {
        self.staged.is_none() && (self.committed.is_none() || self.take_latched)
    }

    /// Commit the staged post and latched take. Returns whether the
    /// committed view changed.
    fn sync(&mut self) -> bool {
        let mut changed = false;
        if self.take_latched {
            self.committed = None;
            self.take_latched = false;
            changed = true;
        }
        if self.staged.is_some() {
            self.committed = self.staged.take();
            changed = true;
        }
        changed
    }
}

/// The shared state the two actors communicate through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SharedChannel {
    request: Mailbox<Message>,
    response: Mailbox<Response>,
    req_posted: EventFlag,
    req_taken: EventFlag,
    resp_posted: EventFlag,
    resp_taken: EventFlag,
}

impl SharedChannel {
    /// An empty channel with all flags unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Post a request. Refused while the request mailbox is occupied.
    pub fn post_request(&mut self, msg: Message) -> PostOutcome {
        let outcome = self.request.post(msg);
        if outcome == PostOutcome::Accepted {
            self.req_posted.raise();
            self.req_taken = EventFlag::Unset;
        }
        outcome
    }

    /// Consume the committed request, if one is available this cycle.
    pub fn take_request(&mut self) -> Option<Message> {
        let msg = self.request.take();
        if msg.is_some() {
            self.req_taken.raise();
        }
        msg
    }

    /// Post a response. Refused while the response mailbox is occupied.
    pub fn post_response(&mut self, resp: Response) -> PostOutcome {
        let outcome = self.response.post(resp);
        if outcome == PostOutcome::Accepted {
            self.resp_posted.raise();
            self.resp_taken = EventFlag::Unset;
        }
        outcome
    }

    /// Consume the committed response, if one is available this cycle.
    pub fn take_response(&mut self) -> Option<Response> {
        let resp = self.response.take();
        if resp.is_some() {
            self.resp_taken.raise();
        }
        resp
    }

    /// The delta-cycle settle pass. Commits staged posts and latched takes
    /// and demotes every event flag one rung. Called only by the kernel.
    ///
    /// Returns whether any committed state or flag changed.
    pub fn sync_events(&mut self) -> bool {
        let mut changed = self.request.sync();
        changed |= self.response.sync();
        changed |= self.req_posted.settle();
        changed |= self.req_taken.settle();
        changed |= self.resp_posted.settle();
        changed |= self.resp_taken.settle();
        changed
    }

    /// Whether a producer would find the request slot free.
    #[must_use]
    pub fn request_slot_free(&self) -> bool {
        !self.request.occupied()
    }

    /// Whether a producer would find the response slot free.
    #[must_use]
    pub fn response_slot_free(&self) -> bool {
        !self.response.occupied()
    }

    /// Whether a committed request awaits consumption.
    #[must_use]
    pub fn has_committed_request(&self) -> bool {
        self.request.consumable()
    }

    /// Whether a committed response awaits consumption.
    #[must_use]
    pub fn has_committed_response(&self) -> bool {
        self.response.consumable()
    }

    /// Bus lock: held while a transaction is in flight, from request post
    /// until the matching response is consumed.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.request.occupied() || self.response.occupied()
    }

    /// Whether nothing remains that a future sync pass could surface.
    #[must_use]
    pub fn is_drained(&self) -> bool {
        self.request.drained() && self.response.drained()
    }

    /// Number of in-flight requests (committed or staged).
    #[must_use]
    pub fn pending_requests(&self) -> usize {
        usize::from(self.request.committed.is_some()) + usize::from(self.request.staged.is_some())
    }

    /// Number of in-flight responses (committed or staged).
    #[must_use]
    pub fn pending_responses(&self) -> usize {
        usize::from(self.response.committed.is_some()) + usize::from(self.response.staged.is_some())
    }

    /// The four event flags, in (req_posted, req_taken, resp_posted,
    /// resp_taken) order.
    #[must_use]
    pub fn event_flags(&self) -> [EventFlag; 4] {
        [
            self.req_posted,
            self.req_taken,
            self.resp_posted,
            self.resp_taken,
        ]
    }
}
