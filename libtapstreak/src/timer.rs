//! Cancellable timers on tokio time
//!
//! Each timer is its own task that posts messages back into a mailbox.
//! The task holds only a weak sender, so a timer never keeps a torn-down
//! mailbox alive. Under `tokio::time::pause` the same code runs on
//! simulated time.

use std::fmt;
use std::time::Duration;

use tokio::sync::mpsc::WeakUnboundedSender;
use tokio::task::AbortHandle;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::trace;

/// The three timers a run can have in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Pre-game countdown, one tick per second
    Countdown,
    /// Pause before the next square appears
    SquareDelay,
    /// How long the square stays hittable
    SquareDuration,
}

impl fmt::Display for TimerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerKind::Countdown => write!(f, "countdown"),
            TimerKind::SquareDelay => write!(f, "square-delay"),
            TimerKind::SquareDuration => write!(f, "square-duration"),
        }
    }
}

/// Identity of one scheduled timer, unique per [`Scheduler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Cancellation handle for a scheduled timer
///
/// Cancelling is idempotent: cancelling a finished or already-cancelled
/// timer does nothing.
#[derive(Debug)]
pub struct TimerHandle {
    id: TimerId,
    kind: TimerKind,
    abort: AbortHandle,
}

impl TimerHandle {
    pub fn id(&self) -> TimerId {
        self.id
    }

    pub fn kind(&self) -> TimerKind {
        self.kind
    }

    pub fn cancel(&self) {
        self.abort.abort();
    }

    /// True once the task has delivered its last message or been cancelled
    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }
}

/// Spawns timers that deliver into a mailbox of `T`
pub struct Scheduler<T> {
    mailbox: WeakUnboundedSender<T>,
    next_id: u64,
}

impl<T: Send + 'static> Scheduler<T> {
    pub fn new(mailbox: WeakUnboundedSender<T>) -> Self {
        Self {
            mailbox,
            next_id: 0,
        }
    }

    fn allocate(&mut self) -> TimerId {
        self.next_id += 1;
        TimerId(self.next_id)
    }

    /// Deliver one message after `delay`
    ///
    /// Must be called from within a tokio runtime.
    pub fn once<F>(&mut self, kind: TimerKind, delay: Duration, message: F) -> TimerHandle
    where
        F: FnOnce(TimerId) -> T + Send + 'static,
    {
        let id = self.allocate();
        let mailbox = self.mailbox.clone();

        let task = tokio::spawn(async move {
            sleep(delay).await;
            trace!(%kind, ?id, "timer fired");
            if let Some(tx) = mailbox.upgrade() {
                let _ = tx.send(message(id));
            }
        });

        TimerHandle {
            id,
            kind,
            abort: task.abort_handle(),
        }
    }

    /// Deliver `ticks` messages, one per `period`, the first immediately
    ///
    /// The closure receives the tick index starting at 0. Late ticks are
    /// delayed rather than bunched, so the spacing between deliveries never
    /// drops below `period`.
    pub fn periodic<F>(
        &mut self,
        kind: TimerKind,
        period: Duration,
        ticks: u32,
        mut message: F,
    ) -> TimerHandle
    where
        F: FnMut(TimerId, u32) -> T + Send + 'static,
    {
        let id = self.allocate();
        let mailbox = self.mailbox.clone();

        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            for tick in 0..ticks {
                ticker.tick().await;
                trace!(%kind, ?id, tick, "timer ticked");
                let Some(tx) = mailbox.upgrade() else {
                    break;
                };
                if tx.send(message(id, tick)).is_err() {
                    break;
                }
            }
        });

        TimerHandle {
            id,
            kind,
            abort: task.abort_handle(),
        }
    }
}
