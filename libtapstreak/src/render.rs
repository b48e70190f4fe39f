//! What a host shows for a given state

use std::io::{self, Write};

use crate::types::{GameState, Rect, State};

/// Text and square for one state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Large centred label: countdown digits or a call to action
    pub countdown: String,
    pub status: String,
    pub square: Option<Rect>,
}

pub fn frame_for(state: &State) -> Frame {
    let streak = format!("Streak: {}", state.streak);

    match state.game_state {
        GameState::ReadyToStart => Frame {
            countdown: "Press To Start".to_string(),
            status: format!(
                "Touch Squares to Increase Streak\nHighest Streak = {}",
                state.highest_streak
            ),
            square: None,
        },
        GameState::CountingDown => Frame {
            countdown: state
                .countdown_value
                .map(|value| value.to_string())
                .unwrap_or_default(),
            status: String::new(),
            square: None,
        },
        GameState::WaitingToShowSquare => Frame {
            countdown: String::new(),
            status: streak,
            square: None,
        },
        GameState::ShowingSquare => Frame {
            countdown: String::new(),
            status: streak,
            square: state.square_rect,
        },
        GameState::GameOver => {
            let mut status = String::from("Game Over\n");
            if state.streak == state.highest_streak {
                status.push_str(&format!("New High Streak: {}!", state.streak));
            } else {
                status.push_str(&format!("Highest Streak: {}", state.highest_streak));
            }
            Frame {
                countdown: "Press To Try Again".to_string(),
                status,
                square: None,
            }
        }
    }
}

/// Host-side display, called after every published state
pub trait Renderer {
    fn render(&mut self, state: &State) -> io::Result<()>;
}

/// Writes each frame as a short block of text
///
/// ```text
/// [Streak: 4]
/// square (10,10)-(30,30)
/// ```
pub struct TextRenderer<W: Write> {
    out: W,
    last: Option<Frame>,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, last: None }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn render(&mut self, state: &State) -> io::Result<()> {
        let frame = frame_for(state);
        // Unchanged frames are not redrawn
        if self.last.as_ref() == Some(&frame) {
            return Ok(());
        }

        if !frame.countdown.is_empty() {
            writeln!(self.out, "{}", frame.countdown)?;
        }
        for line in frame.status.lines() {
            writeln!(self.out, "[{}]", line)?;
        }
        if let Some(rect) = frame.square {
            writeln!(
                self.out,
                "square ({},{})-({},{})",
                rect.left, rect.top, rect.right, rect.bottom
            )?;
        }
        self.out.flush()?;

        self.last = Some(frame);
        Ok(())
    }
}
