//! Tapstreak - a reflex game as a reactive state machine
//!
//! A run starts with a countdown, then squares appear one at a time on a
//! square board. Hit each square before it disappears to grow the streak.
//! Miss one and the run is over; the best streak is kept between runs.
//!
//! The core is split the usual way for an intent-driven loop:
//!
//! - [`actor`] turns actions into effects, immediately or through timers
//! - [`reducer`] folds effects into state, purely
//! - [`post_processor`] chains a follow-up action after some effects
//! - [`feature`] owns the state and serializes all of the above on one task
//!
//! ```no_run
//! use libtapstreak::{Feature, MemoryStore, Wish};
//!
//! # async fn run() -> libtapstreak::Result<()> {
//! let feature = Feature::builder(MemoryStore::default()).spawn()?;
//! let mut states = feature.subscribe();
//!
//! feature.send(Wish::BoardPress { x: 50.0, y: 50.0 })?;
//! while let Ok(snapshot) = states.recv().await {
//!     println!("{:?}", snapshot.state.game_state);
//! }
//! # Ok(())
//! # }
//! ```

pub mod actor;
pub mod config;
pub mod difficulty;
pub mod error;
pub mod feature;
pub mod logging;
pub mod post_processor;
pub mod reducer;
pub mod render;
pub mod square;
pub mod storage;
pub mod timer;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use difficulty::Difficulty;
pub use error::{Result, TapStreakError};
pub use feature::{Feature, FeatureBuilder, FeatureHandle, StateReceiver};
pub use render::{frame_for, Frame, Renderer, TextRenderer};
pub use square::{RandomSquares, SquareSource};
pub use storage::{FileStore, HighScoreStore, MemoryStore};
pub use types::{Action, Effect, GameState, Rect, Snapshot, State, Wish, MAX_BOARD_SIZE};
