//! Latest-frame-per-source buffer for senders.
//!
//! Producers (one per camera) push frames as fast as they capture them; the
//! network loop takes them as fast as the client can receive. Each source
//! keeps only its newest unsent frame: a push onto a pending slot overwrites
//! it and counts a drop. Sources are served in the order they became
//! pending, so one fast camera cannot starve the others.

use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard, PoisonError},
    task::Poll,
};

use gsvc_proto::FrameRecord;
use tokio::sync::Notify;

/// What happened to a pushed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Slot was empty; the source joined the back of the queue.
    Queued,
    /// Slot already held an unsent frame, which was dropped.
    Replaced,
    /// Source id out of range or mailbox stopped; frame discarded.
    Ignored,
}

#[derive(Debug, Default)]
struct Slot {
    latest: Option<FrameRecord>,
    dropped: u64,
}

#[derive(Debug)]
struct Inner {
    slots: Vec<Slot>,
    pending: VecDeque<u16>,
    pushed_total: u64,
    dropped_total: u64,
    stopped: bool,
}

/// Shared single-frame-per-source mailbox.
#[derive(Debug)]
pub struct FrameMailbox {
    inner: Mutex<Inner>,
    notify: Notify,
}

impl FrameMailbox {
    /// Mailbox for sources `0..source_count`.
    pub fn new(source_count: u16) -> Self {
        let slots = (0..source_count).map(|_| Slot::default()).collect();
        Self {
            inner: Mutex::new(Inner {
                slots,
                pending: VecDeque::new(),
                pushed_total: 0,
                dropped_total: 0,
                stopped: false,
            }),
            notify: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Offer a frame. Never blocks.
    pub fn push(&self, frame: FrameRecord) -> PushOutcome {
        let mut guard = self.lock();
        let inner = &mut *guard;
        if inner.stopped {
            return PushOutcome::Ignored;
        }

        let source_id = frame.source_id;
        let Some(slot) = inner.slots.get_mut(usize::from(source_id)) else {
            return PushOutcome::Ignored;
        };

        inner.pushed_total += 1;
        let outcome = if slot.latest.replace(frame).is_some() {
            slot.dropped += 1;
            inner.dropped_total += 1;
            PushOutcome::Replaced
        } else {
            inner.pending.push_back(source_id);
            PushOutcome::Queued
        };
        drop(guard);

        self.notify.notify_one();
        outcome
    }

    /// Wait for the next frame. Returns `None` once stopped.
    pub async fn next(&self) -> Option<FrameRecord> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Poll::Ready(frame) = self.poll_take() {
                return frame;
            }
            notified.await;
        }
    }

    /// Take the next frame if one is ready.
    pub fn try_next(&self) -> Option<FrameRecord> {
        match self.poll_take() {
            Poll::Ready(frame) => frame,
            Poll::Pending => None,
        }
    }

    fn poll_take(&self) -> Poll<Option<FrameRecord>> {
        let mut inner = self.lock();
        if inner.stopped {
            return Poll::Ready(None);
        }
        let Some(source_id) = inner.pending.pop_front() else {
            return Poll::Pending;
        };
        let frame = inner.slots.get_mut(usize::from(source_id)).and_then(|slot| slot.latest.take());
        Poll::Ready(frame)
    }

    /// Wake all waiters and refuse further frames.
    pub fn stop(&self) {
        self.lock().stopped = true;
        self.notify.notify_waiters();
    }

    /// Stopped by [`FrameMailbox::stop`].
    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }

    /// Frames accepted by [`FrameMailbox::push`], all sources.
    pub fn pushed_count(&self) -> u64 {
        self.lock().pushed_total
    }

    /// Frames overwritten before being sent, all sources.
    pub fn dropped_count(&self) -> u64 {
        self.lock().dropped_total
    }

    /// Frames overwritten before being sent, one source.
    pub fn dropped_for(&self, source_id: u16) -> u64 {
        self.lock().slots.get(usize::from(source_id)).map_or(0, |slot| slot.dropped)
    }
}
