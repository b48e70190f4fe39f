//! The actor: turns actions into effects, now or later
//!
//! Immediate effects (starting a countdown, a hit) come straight back from
//! [`GameActor::invoke`]. Timed effects come back through the feature's
//! mailbox as [`Fired`] deliveries and are turned into effects by
//! [`GameActor::accept`].
//!
//! # Timer slots
//!
//! The actor keeps at most one live timer per [`TimerKind`]. A delivery is
//! accepted only while its timer still owns its slot. Cancelling clears the
//! slot, so a timer that fired just before it was cancelled cannot land an
//! effect afterwards. This is what makes a hit and a timeout on the same
//! square mutually exclusive: the hit cancels the duration timer before
//! `Success` is returned, and a `Fail` already sitting in the mailbox is
//! dropped when it arrives.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::WeakUnboundedSender;
use tracing::{debug, info, warn};

use crate::difficulty::Difficulty;
use crate::feature::Message;
use crate::square::SquareSource;
use crate::storage::HighScoreStore;
use crate::timer::{Scheduler, TimerHandle, TimerId, TimerKind};
use crate::types::{Action, Effect, GameState, State};

const COUNTDOWN_PERIOD: Duration = Duration::from_secs(1);

/// A timer delivery on its way back to the actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub id: TimerId,
    pub kind: TimerKind,

    /// The action that started the timer
    pub action: Action,

    /// Tick index for periodic timers, 0 for one-shots
    pub tick: u32,
}

/// One optional live timer per kind
#[derive(Debug, Default)]
pub struct TimerSlots {
    countdown: Option<TimerHandle>,
    square_delay: Option<TimerHandle>,
    square_duration: Option<TimerHandle>,
}

impl TimerSlots {
    fn slot(&self, kind: TimerKind) -> &Option<TimerHandle> {
        match kind {
            TimerKind::Countdown => &self.countdown,
            TimerKind::SquareDelay => &self.square_delay,
            TimerKind::SquareDuration => &self.square_duration,
        }
    }

    fn slot_mut(&mut self, kind: TimerKind) -> &mut Option<TimerHandle> {
        match kind {
            TimerKind::Countdown => &mut self.countdown,
            TimerKind::SquareDelay => &mut self.square_delay,
            TimerKind::SquareDuration => &mut self.square_duration,
        }
    }

    /// Install a timer, cancelling whatever held its slot before
    fn replace(&mut self, handle: TimerHandle) {
        if let Some(previous) = self.slot_mut(handle.kind()).replace(handle) {
            previous.cancel();
        }
    }

    fn cancel(&mut self, kind: TimerKind) {
        if let Some(handle) = self.slot_mut(kind).take() {
            debug!(%kind, "timer cancelled");
            handle.cancel();
        }
    }

    fn cancel_all(&mut self) {
        self.cancel(TimerKind::Countdown);
        self.cancel(TimerKind::SquareDelay);
        self.cancel(TimerKind::SquareDuration);
    }

    /// Free the slot after a timer's final delivery
    fn retire(&mut self, kind: TimerKind, id: TimerId) {
        let slot = self.slot_mut(kind);
        if slot.as_ref().map(TimerHandle::id) == Some(id) {
            *slot = None;
        }
    }

    /// Id of the live timer of this kind, if any
    pub fn live(&self, kind: TimerKind) -> Option<TimerId> {
        self.slot(kind).as_ref().map(TimerHandle::id)
    }

    pub fn is_live(&self, kind: TimerKind, id: TimerId) -> bool {
        self.live(kind) == Some(id)
    }

    pub fn is_idle(&self) -> bool {
        self.countdown.is_none() && self.square_delay.is_none() && self.square_duration.is_none()
    }
}

pub struct GameActor {
    store: Arc<dyn HighScoreStore>,
    squares: Box<dyn SquareSource>,
    board_size: u32,
    difficulty: Difficulty,
    scheduler: Scheduler<Message>,
    timers: TimerSlots,
}

impl GameActor {
    pub(crate) fn new(
        store: Arc<dyn HighScoreStore>,
        squares: Box<dyn SquareSource>,
        board_size: u32,
        difficulty: Difficulty,
        mailbox: WeakUnboundedSender<Message>,
    ) -> Self {
        Self {
            store,
            squares,
            board_size,
            difficulty,
            scheduler: Scheduler::new(mailbox),
            timers: TimerSlots::default(),
        }
    }

    pub fn timers(&self) -> &TimerSlots {
        &self.timers
    }

    /// Resolve an action against the current state
    ///
    /// Returns the immediate effect, if any. Timers started here deliver
    /// later through the mailbox.
    pub fn invoke(&mut self, state: &State, action: &Action) -> Option<Effect> {
        match (*action, state.game_state) {
            (Action::BoardPress { .. }, GameState::ReadyToStart | GameState::GameOver) => {
                Some(Effect::StartCountdown)
            }
            (Action::BoardPress { x, y }, GameState::ShowingSquare) => self.check_press(state, x, y),
            (Action::BoardPress { .. }, _) => None,

            (Action::DoCountdown, GameState::CountingDown) => self.start_countdown(state, action),
            (Action::StartSquareDelay, GameState::WaitingToShowSquare) => {
                self.start_square_delay(state, action)
            }
            (Action::StartSquareDuration, GameState::ShowingSquare) => {
                self.start_square_duration(state, action)
            }

            // Windows restart at full length; elapsed time is not preserved
            (Action::Resume, GameState::CountingDown) => self.start_countdown(state, action),
            (Action::Resume, GameState::WaitingToShowSquare) => self.start_square_delay(state, action),
            (Action::Resume, GameState::ShowingSquare) => self.start_square_duration(state, action),
            (Action::Resume, _) => None,

            (Action::Pause, _) => {
                self.timers.cancel_all();
                None
            }

            (action, game_state) => {
                debug!(?action, ?game_state, "action does not apply in this state");
                None
            }
        }
    }

    /// Turn a timer delivery into an effect, or drop it if the timer no
    /// longer owns its slot
    ///
    /// A timed-out square writes `max(highest_streak, streak)` to the store
    /// before `Fail` is handed back. A failed write is logged and otherwise
    /// ignored.
    pub fn accept(&mut self, state: &State, fired: Fired) -> Option<(Action, Effect)> {
        if !self.timers.is_live(fired.kind, fired.id) {
            debug!(kind = %fired.kind, id = ?fired.id, "dropping delivery from cancelled timer");
            return None;
        }

        let effect = match fired.kind {
            TimerKind::Countdown => {
                let remaining = state.countdown_start_value.saturating_sub(fired.tick);
                if remaining == 0 {
                    self.timers.retire(fired.kind, fired.id);
                    info!(highest_streak = state.highest_streak, "game started");
                    Effect::GameStarted
                } else {
                    Effect::UpdateCountdownValue(remaining)
                }
            }
            TimerKind::SquareDelay => {
                self.timers.retire(fired.kind, fired.id);
                let size = self.difficulty.square_size(self.board_size, state.streak);
                Effect::DrawSquare(self.squares.next_square(self.board_size, size))
            }
            TimerKind::SquareDuration => {
                self.timers.retire(fired.kind, fired.id);
                let best = state.highest_streak.max(state.streak);
                if let Err(e) = self.store.write(best) {
                    warn!(error = %e, highest_streak = best, "failed to persist highest streak");
                }
                info!(streak = state.streak, highest_streak = best, "game over");
                Effect::Fail
            }
        };

        Some((fired.action, effect))
    }

    /// Cancel every live timer. Safe to call any number of times.
    pub fn cancel_all(&mut self) {
        self.timers.cancel_all();
    }

    fn check_press(&mut self, state: &State, x: i32, y: i32) -> Option<Effect> {
        match state.square_rect {
            Some(rect) if rect.contains(x, y) => {
                // Cancel before reporting the hit so the timeout cannot also land
                self.timers.cancel(TimerKind::SquareDuration);
                Some(Effect::Success)
            }
            _ => None,
        }
    }

    fn start_countdown(&mut self, state: &State, action: &Action) -> Option<Effect> {
        let origin = *action;
        // One tick per remaining second plus the tick that starts the game
        let ticks = state.countdown_start_value.saturating_add(1);
        let handle = self.scheduler.periodic(
            TimerKind::Countdown,
            COUNTDOWN_PERIOD,
            ticks,
            move |id, tick| {
                Message::Fired(Fired {
                    id,
                    kind: TimerKind::Countdown,
                    action: origin,
                    tick,
                })
            },
        );
        debug!(from = state.countdown_start_value, "countdown started");
        self.timers.replace(handle);
        None
    }

    fn start_square_delay(&mut self, state: &State, action: &Action) -> Option<Effect> {
        let delay = self.difficulty.delay(state.streak);
        self.start_once(TimerKind::SquareDelay, delay, *action);
        None
    }

    fn start_square_duration(&mut self, state: &State, action: &Action) -> Option<Effect> {
        let duration = self.difficulty.duration(state.streak);
        self.start_once(TimerKind::SquareDuration, duration, *action);
        None
    }

    fn start_once(&mut self, kind: TimerKind, delay: Duration, origin: Action) {
        let handle = self.scheduler.once(kind, delay, move |id| {
            Message::Fired(Fired {
                id,
                kind,
                action: origin,
                tick: 0,
            })
        });
        debug!(%kind, delay_ms = delay.as_millis() as u64, "timer started");
        self.timers.replace(handle);
    }
}
