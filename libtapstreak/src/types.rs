//! Core game types
//!
//! The state snapshot the renderer reads, the wishes a host sends in, the
//! actions the actor reacts to and the effects the reducer folds into state.

use serde::{Deserialize, Serialize};

/// Phase of a run. Every branch in the actor and reducer keys on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    ReadyToStart,
    CountingDown,
    WaitingToShowSquare,
    ShowingSquare,
    GameOver,
}

/// Largest board side whose squares still fit in `i32` coordinates
pub const MAX_BOARD_SIZE: u32 = i32::MAX as u32;

/// Axis-aligned rectangle in board coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Square with its top-left corner at `(x, y)`, clipped at `i32::MAX`
    pub fn square(x: i32, y: i32, size: i32) -> Self {
        Self::new(x, y, x.saturating_add(size), y.saturating_add(size))
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Half-open containment: the left and top edges hit, the right and
    /// bottom edges miss.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.left <= x && x < self.right && self.top <= y && y < self.bottom
    }
}

/// Immutable game snapshot
///
/// Replaced wholesale on every reduction; nothing mutates a published state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub game_state: GameState,

    /// Successful hits since the run started
    pub streak: u32,

    /// Best streak seen, seeded from the store
    pub highest_streak: u32,

    /// Present only while `game_state == ShowingSquare`
    pub square_rect: Option<Rect>,

    /// Remaining countdown seconds, present only while `game_state == CountingDown`
    pub countdown_value: Option<u32>,

    /// Where every countdown starts from
    pub countdown_start_value: u32,
}

impl State {
    /// Fresh state waiting for the first press
    pub fn new(highest_streak: u32, countdown_start_value: u32) -> Self {
        Self {
            game_state: GameState::ReadyToStart,
            streak: 0,
            highest_streak,
            square_rect: None,
            countdown_value: None,
            countdown_start_value,
        }
    }
}

/// External request from the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Wish {
    /// Press in board-relative coordinates
    BoardPress { x: f32, y: f32 },
    Resume,
    Pause,
}

/// Internal command consumed by the actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    BoardPress { x: i32, y: i32 },
    DoCountdown,
    StartSquareDelay,
    StartSquareDuration,
    Resume,
    Pause,
}

impl From<Wish> for Action {
    fn from(wish: Wish) -> Self {
        match wish {
            // `as` truncates toward zero and saturates, so off-board presses stay off-board
            Wish::BoardPress { x, y } => Action::BoardPress {
                x: x as i32,
                y: y as i32,
            },
            Wish::Resume => Action::Resume,
            Wish::Pause => Action::Pause,
        }
    }
}

/// Outcome of an action, folded into state by the reducer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Effect {
    StartCountdown,
    UpdateCountdownValue(u32),
    GameStarted,
    DrawSquare(Rect),
    Success,
    Fail,
}

/// A published state together with its position in the reduction order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Zero for the initial state, then one more per reduction
    pub seq: u64,
    pub state: State,
}
