//! Effect chaining
//!
//! After each reduction the post-processor may name a follow-up action.
//! The feature feeds it straight back into the actor on the same loop,
//! never through the external wish stream.

use crate::types::{Action, Effect, GameState, State};

/// Follow-up action for a just-applied `(action, effect, new state)` triple
pub fn post_process(_action: &Action, effect: &Effect, state: &State) -> Option<Action> {
    match effect {
        // A run started or a square was hit: wait, then show the next one
        Effect::GameStarted | Effect::Success => Some(Action::StartSquareDelay),
        Effect::DrawSquare(_) if state.game_state == GameState::ShowingSquare => {
            Some(Action::StartSquareDuration)
        }
        Effect::StartCountdown => Some(Action::DoCountdown),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducer::reduce;
    use crate::types::Rect;

    fn after(state: State, effect: Effect) -> (Effect, State) {
        let next = reduce(state, &effect);
        (effect, next)
    }

    #[test]
    fn test_game_started_chains_square_delay() {
        let (effect, state) = after(State::new(0, 3), Effect::GameStarted);
        assert_eq!(
            post_process(&Action::DoCountdown, &effect, &state),
            Some(Action::StartSquareDelay)
        );
    }

    #[test]
    fn test_success_chains_square_delay() {
        let mut state = State::new(0, 3);
        state.game_state = GameState::ShowingSquare;
        state.square_rect = Some(Rect::new(10, 10, 30, 30));

        let (effect, state) = after(state, Effect::Success);
        assert_eq!(
            post_process(&Action::BoardPress { x: 15, y: 15 }, &effect, &state),
            Some(Action::StartSquareDelay)
        );
    }

    #[test]
    fn test_draw_square_chains_duration() {
        let (effect, state) = after(State::new(0, 3), Effect::DrawSquare(Rect::square(1, 1, 8)));
        assert_eq!(
            post_process(&Action::StartSquareDelay, &effect, &state),
            Some(Action::StartSquareDuration)
        );
    }

    #[test]
    fn test_draw_square_outside_showing_chains_nothing() {
        let state = State::new(0, 3);
        let effect = Effect::DrawSquare(Rect::square(1, 1, 8));
        assert_eq!(post_process(&Action::StartSquareDelay, &effect, &state), None);
    }

    #[test]
    fn test_start_countdown_chains_do_countdown() {
        let (effect, state) = after(State::new(0, 3), Effect::StartCountdown);
        assert_eq!(
            post_process(&Action::BoardPress { x: 0, y: 0 }, &effect, &state),
            Some(Action::DoCountdown)
        );
    }

    #[test]
    fn test_terminal_effects_chain_nothing() {
        let state = State::new(0, 3);
        assert_eq!(
            post_process(&Action::DoCountdown, &Effect::UpdateCountdownValue(2), &state),
            None
        );
        assert_eq!(
            post_process(&Action::StartSquareDuration, &Effect::Fail, &state),
            None
        );
    }
}
