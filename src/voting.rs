//! Vote transition rules shared by submission and comment voting.
//!
//! A (user, target) pair is always in one of four states: no vote row at all,
//! an up vote, a down vote, or a cancelled vote (a row with value 0 — kept so
//! "voted then cancelled" stays distinguishable from "never voted"). A request
//! only ever carries -1 or 1; repeating the current value cancels it.

use crate::error::{AppError, Result};

/// Requested vote direction as it arrives on the wire (-1 or 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn from_value(value: i16) -> Result<Self> {
        match value {
            1 => Ok(Self::Up),
            -1 => Ok(Self::Down),
            other => Err(AppError::BadRequest(format!(
                "vote value must be -1 or 1, got {other}"
            ))),
        }
    }
}

/// Recorded state of a (user, target) pair before the request is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoteState {
    /// No vote row exists.
    #[default]
    None,
    Up,
    Down,
    /// A row exists with value 0.
    Cancelled,
}

impl VoteState {
    /// Maps the stored row value (or its absence) to a state. A stored value
    /// outside {-1, 0, 1} means the table was corrupted outside this module.
    pub fn from_row(value: Option<i16>) -> Result<Self> {
        match value {
            Option::None => Ok(Self::None),
            Some(1) => Ok(Self::Up),
            Some(-1) => Ok(Self::Down),
            Some(0) => Ok(Self::Cancelled),
            Some(other) => Err(AppError::Transition(format!(
                "stored vote value out of range: {other}"
            ))),
        }
    }
}

/// Which of the author's two karma counters a vote lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KarmaKind {
    Link,
    Comment,
}

/// Net effect of one transition on the target's counters and its author's
/// karma. `score_delta` doubles as the karma delta and as the `voteDiff`
/// returned to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteOutcome {
    pub new_value: i16,
    pub ups_delta: i32,
    pub downs_delta: i32,
    pub score_delta: i32,
}

/// The transition table. Re-voting in the current direction cancels; voting
/// from a cancelled row behaves exactly like a first vote at the counter
/// level, only the row already exists.
pub fn transition(current: VoteState, requested: VoteDirection) -> VoteOutcome {
    use VoteDirection::{Down, Up};

    match (current, requested) {
        (VoteState::None | VoteState::Cancelled, Up) => VoteOutcome {
            new_value: 1,
            ups_delta: 1,
            downs_delta: 0,
            score_delta: 1,
        },
        (VoteState::None | VoteState::Cancelled, Down) => VoteOutcome {
            new_value: -1,
            ups_delta: 0,
            downs_delta: 1,
            score_delta: -1,
        },
        (VoteState::Up, Up) => VoteOutcome {
            new_value: 0,
            ups_delta: -1,
            downs_delta: 0,
            score_delta: -1,
        },
        (VoteState::Down, Down) => VoteOutcome {
            new_value: 0,
            ups_delta: 0,
            downs_delta: -1,
            score_delta: 1,
        },
        (VoteState::Up, Down) => VoteOutcome {
            new_value: -1,
            ups_delta: -1,
            downs_delta: 1,
            score_delta: -2,
        },
        (VoteState::Down, Up) => VoteOutcome {
            new_value: 1,
            ups_delta: 1,
            downs_delta: -1,
            score_delta: 2,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counter set mimicking a votable row plus its author's karma, so
    /// sequences of transitions can be replayed without a database.
    #[derive(Debug, Default, PartialEq, Eq)]
    struct Counters {
        ups: i32,
        downs: i32,
        score: i32,
        karma: i32,
        state: VoteState,
    }

    impl Counters {
        fn apply(&mut self, requested: VoteDirection) -> i32 {
            let outcome = transition(self.state, requested);
            self.ups += outcome.ups_delta;
            self.downs += outcome.downs_delta;
            self.score += outcome.score_delta;
            self.karma += outcome.score_delta;
            self.state = VoteState::from_row(Some(outcome.new_value)).unwrap();
            outcome.score_delta
        }
    }

    #[test]
    fn rejects_invalid_requested_value() {
        assert!(VoteDirection::from_value(2).is_err());
        assert!(VoteDirection::from_value(0).is_err());
        assert!(VoteDirection::from_value(-2).is_err());
    }

    #[test]
    fn rejects_corrupt_stored_value() {
        assert!(VoteState::from_row(Some(2)).is_err());
        assert!(VoteState::from_row(Some(-3)).is_err());
    }

    #[test]
    fn first_up_vote() {
        let out = transition(VoteState::None, VoteDirection::Up);
        assert_eq!(out.new_value, 1);
        assert_eq!((out.ups_delta, out.downs_delta, out.score_delta), (1, 0, 1));
    }

    #[test]
    fn first_down_vote() {
        let out = transition(VoteState::None, VoteDirection::Down);
        assert_eq!(out.new_value, -1);
        assert_eq!(
            (out.ups_delta, out.downs_delta, out.score_delta),
            (0, 1, -1)
        );
    }

    #[test]
    fn repeating_up_cancels() {
        let out = transition(VoteState::Up, VoteDirection::Up);
        assert_eq!(out.new_value, 0);
        assert_eq!(
            (out.ups_delta, out.downs_delta, out.score_delta),
            (-1, 0, -1)
        );
    }

    #[test]
    fn repeating_down_cancels() {
        let out = transition(VoteState::Down, VoteDirection::Down);
        assert_eq!(out.new_value, 0);
        assert_eq!(
            (out.ups_delta, out.downs_delta, out.score_delta),
            (0, -1, 1)
        );
    }

    #[test]
    fn up_to_down_swings_by_two() {
        let out = transition(VoteState::Up, VoteDirection::Down);
        assert_eq!(out.new_value, -1);
        assert_eq!(
            (out.ups_delta, out.downs_delta, out.score_delta),
            (-1, 1, -2)
        );
    }

    #[test]
    fn down_to_up_swings_by_two() {
        let out = transition(VoteState::Down, VoteDirection::Up);
        assert_eq!(out.new_value, 1);
        assert_eq!(
            (out.ups_delta, out.downs_delta, out.score_delta),
            (1, -1, 2)
        );
    }

    #[test]
    fn cancelled_revote_matches_fresh_vote() {
        for dir in [VoteDirection::Up, VoteDirection::Down] {
            assert_eq!(
                transition(VoteState::Cancelled, dir),
                transition(VoteState::None, dir)
            );
        }
    }

    #[test]
    fn score_equals_ups_minus_downs_over_any_sequence() {
        use VoteDirection::{Down, Up};

        let sequences: &[&[VoteDirection]] = &[
            &[Up],
            &[Up, Up],
            &[Up, Down],
            &[Down, Up, Up, Down],
            &[Up, Up, Up, Down, Down, Up],
        ];

        for seq in sequences {
            let mut c = Counters::default();
            for &dir in *seq {
                c.apply(dir);
                assert_eq!(c.score, c.ups - c.downs, "sequence {seq:?}");
                assert_eq!(c.karma, c.score, "sequence {seq:?}");
            }
        }
    }

    #[test]
    fn double_vote_then_downvote_scenario() {
        // Fresh submission, one voter: up, up again (cancel), then down.
        let mut c = Counters::default();

        let diff = c.apply(VoteDirection::Up);
        assert_eq!(diff, 1);
        assert_eq!((c.ups, c.downs, c.score, c.karma), (1, 0, 1, 1));

        let diff = c.apply(VoteDirection::Up);
        assert_eq!(diff, -1);
        assert_eq!((c.ups, c.downs, c.score, c.karma), (0, 0, 0, 0));
        assert_eq!(c.state, VoteState::Cancelled);

        let diff = c.apply(VoteDirection::Down);
        assert_eq!(diff, -1);
        assert_eq!((c.ups, c.downs, c.score, c.karma), (0, 1, -1, -1));
    }
}
