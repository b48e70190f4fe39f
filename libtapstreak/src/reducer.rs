//! Pure reducer function for state transitions
//!
//! `(State, Effect) -> State`. Total, deterministic, no side effects.
//! Persisting the highest streak happens in the actor, not here.

use crate::types::{Effect, GameState, State};

/// Fold one effect into the state
///
/// Fields tied to a phase (`square_rect`, `countdown_value`) are cleared on
/// every transition out of that phase, so they are present exactly while
/// the state is in it.
pub fn reduce(state: State, effect: &Effect) -> State {
    match *effect {
        Effect::StartCountdown => State {
            game_state: GameState::CountingDown,
            countdown_value: Some(state.countdown_start_value),
            square_rect: None,
            ..state
        },

        Effect::UpdateCountdownValue(value) => State {
            game_state: GameState::CountingDown,
            countdown_value: Some(value),
            square_rect: None,
            ..state
        },

        Effect::GameStarted => State {
            game_state: GameState::WaitingToShowSquare,
            streak: 0,
            countdown_value: None,
            square_rect: None,
            ..state
        },

        Effect::DrawSquare(rect) => State {
            game_state: GameState::ShowingSquare,
            square_rect: Some(rect),
            countdown_value: None,
            ..state
        },

        Effect::Success => State {
            game_state: GameState::WaitingToShowSquare,
            streak: state.streak.saturating_add(1),
            square_rect: None,
            countdown_value: None,
            ..state
        },

        Effect::Fail => State {
            game_state: GameState::GameOver,
            highest_streak: state.highest_streak.max(state.streak),
            square_rect: None,
            countdown_value: None,
            ..state
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rect;

    fn showing(streak: u32, highest_streak: u32) -> State {
        State {
            game_state: GameState::ShowingSquare,
            streak,
            highest_streak,
            square_rect: Some(Rect::new(10, 10, 30, 30)),
            countdown_value: None,
            countdown_start_value: 3,
        }
    }

    #[test]
    fn test_reducer_is_pure() {
        let state = showing(4, 5);
        let state_clone = state.clone();

        let first = reduce(state_clone.clone(), &Effect::Success);
        let second = reduce(state_clone.clone(), &Effect::Success);

        // Input unchanged, output deterministic
        assert_eq!(state_clone, state);
        assert_eq!(first, second);
    }

    #[test]
    fn test_start_countdown() {
        let state = State::new(5, 3);
        let next = reduce(state, &Effect::StartCountdown);

        assert_eq!(next.game_state, GameState::CountingDown);
        assert_eq!(next.countdown_value, Some(3));
        assert_eq!(next.highest_streak, 5);
    }

    #[test]
    fn test_start_countdown_from_game_over_resets_countdown() {
        let mut state = State::new(5, 3);
        state.game_state = GameState::GameOver;
        state.streak = 2;

        let next = reduce(state, &Effect::StartCountdown);
        assert_eq!(next.countdown_value, Some(3));
        // The old streak stays visible until the run actually starts
        assert_eq!(next.streak, 2);
    }

    #[test]
    fn test_update_countdown_value() {
        let state = reduce(State::new(0, 3), &Effect::StartCountdown);
        let next = reduce(state, &Effect::UpdateCountdownValue(2));

        assert_eq!(next.game_state, GameState::CountingDown);
        assert_eq!(next.countdown_value, Some(2));
    }

    #[test]
    fn test_game_started_resets_streak() {
        let mut state = reduce(State::new(9, 3), &Effect::StartCountdown);
        state.streak = 6;

        let next = reduce(state, &Effect::GameStarted);
        assert_eq!(next.game_state, GameState::WaitingToShowSquare);
        assert_eq!(next.streak, 0);
        assert_eq!(next.highest_streak, 9);
        assert!(next.countdown_value.is_none());
    }

    #[test]
    fn test_draw_square() {
        let mut state = State::new(0, 3);
        state.game_state = GameState::WaitingToShowSquare;
        let rect = Rect::square(40, 20, 12);

        let next = reduce(state, &Effect::DrawSquare(rect));
        assert_eq!(next.game_state, GameState::ShowingSquare);
        assert_eq!(next.square_rect, Some(rect));
    }

    #[test]
    fn test_success_increments_streak_and_clears_square() {
        let next = reduce(showing(4, 5), &Effect::Success);

        assert_eq!(next.game_state, GameState::WaitingToShowSquare);
        assert_eq!(next.streak, 5);
        assert!(next.square_rect.is_none());
        assert_eq!(next.highest_streak, 5);
    }

    #[test]
    fn test_fail_records_new_highest() {
        let next = reduce(showing(8, 5), &Effect::Fail);

        assert_eq!(next.game_state, GameState::GameOver);
        assert_eq!(next.highest_streak, 8);
        assert_eq!(next.streak, 8);
        assert!(next.square_rect.is_none());
    }

    #[test]
    fn test_fail_keeps_higher_previous_best() {
        let next = reduce(showing(4, 11), &Effect::Fail);
        assert_eq!(next.highest_streak, 11);
    }

    #[test]
    fn test_square_present_iff_showing() {
        let effects = [
            Effect::StartCountdown,
            Effect::UpdateCountdownValue(3),
            Effect::UpdateCountdownValue(1),
            Effect::GameStarted,
            Effect::DrawSquare(Rect::square(1, 2, 10)),
            Effect::Success,
            Effect::DrawSquare(Rect::square(3, 4, 9)),
            Effect::Fail,
        ];

        let mut state = State::new(0, 3);
        for effect in effects.iter() {
            state = reduce(state, effect);
            assert_eq!(
                state.square_rect.is_some(),
                state.game_state == GameState::ShowingSquare,
                "after {:?}",
                effect
            );
            assert_eq!(
                state.countdown_value.is_some(),
                state.game_state == GameState::CountingDown,
                "after {:?}",
                effect
            );
        }
    }

    #[test]
    fn test_highest_streak_never_decreases() {
        // Every effect, applied to every phase, at a few streak levels
        let effects = [
            Effect::StartCountdown,
            Effect::UpdateCountdownValue(2),
            Effect::GameStarted,
            Effect::DrawSquare(Rect::square(0, 0, 5)),
            Effect::Success,
            Effect::Fail,
        ];
        let phases = [
            GameState::ReadyToStart,
            GameState::CountingDown,
            GameState::WaitingToShowSquare,
            GameState::ShowingSquare,
            GameState::GameOver,
        ];

        for phase in phases {
            for (streak, highest) in [(0, 0), (3, 7), (9, 2), (100, 100)] {
                for effect in effects.iter() {
                    let state = State {
                        game_state: phase,
                        streak,
                        highest_streak: highest,
                        square_rect: None,
                        countdown_value: None,
                        countdown_start_value: 3,
                    };
                    let next = reduce(state, effect);
                    assert!(next.highest_streak >= highest);
                }
            }
        }
    }

    #[test]
    fn test_composition_depends_only_on_inputs() {
        let start = showing(2, 3);
        let pairs = [
            (Effect::Success, Effect::DrawSquare(Rect::square(5, 5, 10))),
            (Effect::Fail, Effect::StartCountdown),
            (Effect::GameStarted, Effect::Fail),
        ];

        for (e1, e2) in pairs.iter() {
            let once = reduce(reduce(start.clone(), e1), e2);
            let again = reduce(reduce(start.clone(), e1), e2);
            assert_eq!(once, again);
        }
    }
}
