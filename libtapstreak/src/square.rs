//! Square placement
//!
//! The actor draws each new square from an injected [`SquareSource`], so
//! tests can seed or script placement.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::Rect;

/// Picks where the next square goes
pub trait SquareSource: Send {
    /// Place a `square_size` square fully inside a `board_size` board
    fn next_square(&mut self, board_size: u32, square_size: u32) -> Rect;
}

/// Uniform placement: `x` and `y` drawn independently from
/// `[0, board_size - square_size)`
///
/// No rejection or retry. On a board no larger than the square the
/// square sits at 0 on that axis.
pub struct RandomSquares<R> {
    rng: R,
}

impl<R: Rng> RandomSquares<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    fn coordinate(&mut self, span: u32) -> i32 {
        if span == 0 {
            return 0;
        }
        // span < board_size <= u32::MAX; clamp into i32 board space
        self.rng.gen_range(0..span).min(i32::MAX as u32) as i32
    }
}

impl RandomSquares<StdRng> {
    /// Reproducible placement for tests and replays
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng + Send> SquareSource for RandomSquares<R> {
    fn next_square(&mut self, board_size: u32, square_size: u32) -> Rect {
        let span = board_size.saturating_sub(square_size);
        let x = self.coordinate(span);
        let y = self.coordinate(span);
        let size = square_size.min(i32::MAX as u32) as i32;
        Rect::square(x, y, size)
    }
}
