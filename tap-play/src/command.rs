//! Stdin line commands

use std::fmt;

use libtapstreak::Wish;

pub const USAGE: &str = "commands: press X Y (or p X Y), pause, resume, quit";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Wish(Wish),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError(String);

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, USAGE)
    }
}

impl std::error::Error for ParseError {}

impl Command {
    /// Parse one line. Blank lines are `None`.
    pub fn parse(line: &str) -> Option<Result<Self, ParseError>> {
        let mut words = line.split_whitespace();
        let verb = words.next()?;

        let command = match verb.to_lowercase().as_str() {
            "press" | "p" => parse_press(words),
            "pause" => Ok(Command::Wish(Wish::Pause)),
            "resume" => Ok(Command::Wish(Wish::Resume)),
            "quit" | "q" | "exit" => Ok(Command::Quit),
            other => Err(ParseError(format!("unknown command '{}'", other))),
        };
        Some(command)
    }
}

fn parse_press<'a>(mut words: impl Iterator<Item = &'a str>) -> Result<Command, ParseError> {
    let (Some(x), Some(y), None) = (words.next(), words.next(), words.next()) else {
        return Err(ParseError("press takes exactly two coordinates".to_string()));
    };

    let coordinate = |word: &str| {
        word.parse::<f32>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| ParseError(format!("'{}' is not a coordinate", word)))
    };

    Ok(Command::Wish(Wish::BoardPress {
        x: coordinate(x)?,
        y: coordinate(y)?,
    }))
}
