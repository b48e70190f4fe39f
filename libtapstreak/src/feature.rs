//! The feature: one task that owns the state
//!
//! Wishes from the host and deliveries from timers share a single mailbox.
//! The loop takes one message at a time, runs it through the actor, folds
//! the effect into the state, publishes the result, and follows any chained
//! action to completion before it looks at the mailbox again. Nothing else
//! ever touches the state, so exactly one reduction is in flight.
//!
//! Every reduction is published, including intermediate ones. A press in
//! `ReadyToStart` is seen as the `CountingDown` snapshot from
//! `StartCountdown`, then as the first countdown tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::actor::{Fired, GameActor};
use crate::config::Config;
use crate::difficulty::Difficulty;
use crate::error::{ConfigError, Result, TapStreakError};
use crate::post_processor::post_process;
use crate::reducer::reduce;
use crate::square::{RandomSquares, SquareSource};
use crate::storage::HighScoreStore;
use crate::types::{Action, Effect, Snapshot, State, Wish, MAX_BOARD_SIZE};

const DEFAULT_CAPACITY: usize = 64;

/// Receiving end of the state stream
///
/// A subscriber that falls more than the stream capacity behind gets
/// `RecvError::Lagged` and resumes at the oldest snapshot still buffered.
pub type StateReceiver = broadcast::Receiver<Snapshot>;

#[derive(Debug)]
pub(crate) enum Message {
    Intent(Wish),
    Fired(Fired),
    Shutdown,
}

/// Builds and spawns a [`Feature`]
pub struct FeatureBuilder {
    store: Arc<dyn HighScoreStore>,
    squares: Option<Box<dyn SquareSource>>,
    board_size: u32,
    countdown_length: u32,
    difficulty: Difficulty,
    initial_state: Option<State>,
    capacity: usize,
}

impl FeatureBuilder {
    pub fn new(store: impl HighScoreStore + 'static) -> Self {
        let defaults = Config::default();
        Self {
            store: Arc::new(store),
            squares: None,
            board_size: defaults.board.size,
            countdown_length: defaults.board.countdown_length,
            difficulty: defaults.difficulty,
            initial_state: None,
            capacity: DEFAULT_CAPACITY,
        }
    }

    /// Board, countdown and difficulty taken from a loaded config
    pub fn from_config(config: &Config, store: impl HighScoreStore + 'static) -> Self {
        Self::new(store)
            .board_size(config.board.size)
            .countdown_length(config.board.countdown_length)
            .difficulty(config.difficulty.clone())
    }

    pub fn board_size(mut self, board_size: u32) -> Self {
        self.board_size = board_size;
        self
    }

    pub fn countdown_length(mut self, countdown_length: u32) -> Self {
        self.countdown_length = countdown_length;
        self
    }

    pub fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Square placement; random from OS entropy when not set
    pub fn squares(mut self, squares: impl SquareSource + 'static) -> Self {
        self.squares = Some(Box::new(squares));
        self
    }

    /// Start from this state instead of a fresh `ReadyToStart`
    ///
    /// The store is still read, and the larger of the two highest streaks
    /// is kept. No timers are running for the given state until the first
    /// `Resume`.
    pub fn initial_state(mut self, state: State) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Snapshots buffered per subscriber before it starts lagging
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Read the store, then start the loop on the current tokio runtime
    pub fn spawn(self) -> Result<Feature> {
        if self.board_size == 0 || self.board_size > MAX_BOARD_SIZE {
            return Err(ConfigError::Invalid("board.size".to_string()).into());
        }

        let highest_streak = self.store.read()?;
        let state = match self.initial_state {
            Some(state) => State {
                highest_streak: state.highest_streak.max(highest_streak),
                ..state
            },
            None => State::new(highest_streak, self.countdown_length),
        };
        debug!(highest_streak = state.highest_streak, game_state = ?state.game_state, "feature starting");

        let (mailbox_tx, mailbox_rx) = mpsc::unbounded_channel();
        let (states, _) = broadcast::channel(self.capacity);
        let initial = Snapshot { seq: 0, state };
        let (current_tx, current_rx) = watch::channel(initial.clone());

        let squares: Box<dyn SquareSource> = match self.squares {
            Some(squares) => squares,
            None => Box::new(RandomSquares::from_entropy()),
        };
        let actor = GameActor::new(
            self.store,
            squares,
            self.board_size,
            self.difficulty,
            mailbox_tx.downgrade(),
        );

        let feature_loop = FeatureLoop {
            actor,
            current: initial,
            mailbox: mailbox_rx,
            states: states.clone(),
            latest: current_tx,
        };
        let task = tokio::spawn(feature_loop.run());

        Ok(Feature {
            handle: FeatureHandle {
                mailbox: mailbox_tx,
                states,
                current: current_rx,
                closing: Arc::new(AtomicBool::new(false)),
            },
            task,
        })
    }
}

/// Clonable intent sink and state source for a running feature
#[derive(Clone)]
pub struct FeatureHandle {
    mailbox: mpsc::UnboundedSender<Message>,
    states: broadcast::Sender<Snapshot>,
    current: watch::Receiver<Snapshot>,
    /// Set by `Feature::shutdown`, shared by every clone
    closing: Arc<AtomicBool>,
}

impl FeatureHandle {
    /// Queue a wish. Fails once shutdown has been requested.
    pub fn send(&self, wish: Wish) -> Result<()> {
        if self.closing.load(Ordering::Acquire) {
            return Err(TapStreakError::FeatureClosed);
        }
        self.mailbox
            .send(Message::Intent(wish))
            .map_err(|_| TapStreakError::FeatureClosed)
    }

    /// Every snapshot published from now on, in order
    pub fn subscribe(&self) -> StateReceiver {
        self.states.subscribe()
    }

    /// The latest published snapshot
    pub fn current(&self) -> Snapshot {
        self.current.borrow().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closing.load(Ordering::Acquire) || self.mailbox.is_closed()
    }
}

/// A running game
///
/// The loop keeps running while any [`FeatureHandle`] is alive. Call
/// [`Feature::shutdown`] to stop it and cancel every timer.
pub struct Feature {
    handle: FeatureHandle,
    task: JoinHandle<()>,
}

impl Feature {
    pub fn builder(store: impl HighScoreStore + 'static) -> FeatureBuilder {
        FeatureBuilder::new(store)
    }

    pub fn handle(&self) -> FeatureHandle {
        self.handle.clone()
    }

    pub fn send(&self, wish: Wish) -> Result<()> {
        self.handle.send(wish)
    }

    pub fn subscribe(&self) -> StateReceiver {
        self.handle.subscribe()
    }

    pub fn current(&self) -> Snapshot {
        self.handle.current()
    }

    /// Stop the loop and wait for it
    ///
    /// Wishes are refused from the moment this is called, on every handle.
    /// Messages queued ahead of the shutdown are still processed. Every
    /// in-flight timer is cancelled before this returns.
    pub async fn shutdown(self) {
        self.handle.closing.store(true, Ordering::Release);
        // Already gone if the send fails; the join below still settles
        let _ = self.handle.mailbox.send(Message::Shutdown);
        if let Err(e) = self.task.await {
            warn!(error = %e, "feature loop ended abnormally");
        }
    }
}

struct FeatureLoop {
    actor: GameActor,
    current: Snapshot,
    mailbox: mpsc::UnboundedReceiver<Message>,
    states: broadcast::Sender<Snapshot>,
    latest: watch::Sender<Snapshot>,
}

impl FeatureLoop {
    async fn run(mut self) {
        while let Some(message) = self.mailbox.recv().await {
            match message {
                Message::Intent(wish) => {
                    let action = Action::from(wish);
                    if let Some(effect) = self.actor.invoke(&self.current.state, &action) {
                        self.settle(action, effect);
                    }
                }
                Message::Fired(fired) => {
                    if let Some((action, effect)) = self.actor.accept(&self.current.state, fired) {
                        self.settle(action, effect);
                    }
                }
                Message::Shutdown => {
                    self.mailbox.close();
                    break;
                }
            }
        }

        self.actor.cancel_all();
        debug!(seq = self.current.seq, "feature stopped");
    }

    /// Reduce, publish, and follow the post-processor until nothing chains
    fn settle(&mut self, mut action: Action, mut effect: Effect) {
        loop {
            self.apply(&effect);

            let Some(next) = post_process(&action, &effect, &self.current.state) else {
                return;
            };
            debug!(?next, "chained action");
            action = next;
            match self.actor.invoke(&self.current.state, &action) {
                Some(chained) => effect = chained,
                None => return,
            }
        }
    }

    fn apply(&mut self, effect: &Effect) {
        let state = reduce(self.current.state.clone(), effect);
        self.current = Snapshot {
            seq: self.current.seq + 1,
            state,
        };
        debug!(seq = self.current.seq, ?effect, game_state = ?self.current.state.game_state, "reduced");

        // No subscribers is fine; `current()` still sees it
        let _ = self.states.send(self.current.clone());
        self.latest.send_replace(self.current.clone());
    }
}
