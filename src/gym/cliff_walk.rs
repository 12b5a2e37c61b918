use crate::env::{Action, Environment};

pub type Pos = (i32, i32);

const ROWS: i32 = 4;
const COLS: i32 = 12;

/// A small deterministic gridworld for exercising the full play loop
///
/// The agent starts in the bottom-left corner and must reach the goal in the
/// bottom-right corner. The bottom-edge cells between them are a cliff:
/// stepping on one loses the game. Every accepted move scores a point and
/// reaching the goal scores 100, so score deltas give the agent a dense
/// reward signal. Board edges make moves illegal rather than no-ops, and
/// nothing is legal once the game is over.
pub struct CliffWalk {
    pos: Pos,
    score: u32,
    highscore: u32,
}

impl CliffWalk {
    pub fn new() -> Self {
        Self {
            pos: (ROWS - 1, 0),
            score: 0,
            highscore: 0,
        }
    }
}

impl Default for CliffWalk {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for CliffWalk {
    type State = Pos;

    fn state(&self) -> Self::State {
        self.pos
    }

    fn move_is_possible(&self, action: Action) -> bool {
        if self.is_win() || self.is_gameover() {
            return false;
        }
        match action {
            Action::Up => self.pos.0 > 0,
            Action::Left => self.pos.1 > 0,
            Action::Down => self.pos.0 < ROWS - 1,
            Action::Right => self.pos.1 < COLS - 1,
            Action::Restart | Action::Exit => false,
        }
    }

    fn apply(&mut self, action: Action) -> bool {
        if !self.move_is_possible(action) {
            return false;
        }
        let change = match action {
            Action::Up => (-1, 0),
            Action::Left => (0, -1),
            Action::Down => (1, 0),
            Action::Right => (0, 1),
            Action::Restart | Action::Exit => unreachable!("never legal"),
        };
        self.pos = (self.pos.0 + change.0, self.pos.1 + change.1);
        self.score += 1;
        if self.is_win() {
            self.score += 100;
        }
        true
    }

    fn is_win(&self) -> bool {
        self.pos == (ROWS - 1, COLS - 1)
    }

    fn is_gameover(&self) -> bool {
        self.pos.0 == ROWS - 1 && self.pos.1 > 0 && self.pos.1 < COLS - 1
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn highscore(&self) -> u32 {
        self.highscore.max(self.score)
    }

    fn reset(&mut self) {
        self.highscore = self.highscore.max(self.score);
        self.pos = (ROWS - 1, 0);
        self.score = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cliff_walk_functional() {
        let mut env = CliffWalk::new();
        assert_eq!(env.state(), (3, 0), "Starts bottom-left");
        assert!(!env.move_is_possible(Action::Left), "Edge blocks the move");
        assert!(!env.move_is_possible(Action::Down));
        assert!(env.move_is_possible(Action::Up));
        assert!(
            !env.move_is_possible(Action::Restart),
            "Control actions are never board moves"
        );
        assert!(!env.apply(Action::Left), "Illegal moves are rejected");

        assert!(env.apply(Action::Right));
        assert!(env.is_gameover(), "First cell to the right is the cliff");
        assert!(!env.move_is_possible(Action::Up), "Nothing legal after a loss");

        env.reset();
        assert_eq!(env.state(), (3, 0));
        assert_eq!(env.score(), 0);
    }

    #[test]
    fn walking_around_the_cliff_wins() {
        let mut env = CliffWalk::new();
        assert!(env.apply(Action::Up));
        for _ in 0..11 {
            assert!(env.apply(Action::Right));
        }
        assert!(env.apply(Action::Down));

        assert!(env.is_win());
        assert!(!env.is_gameover());
        assert_eq!(env.score(), 13 + 100, "One point per move plus the goal");

        env.reset();
        assert_eq!(env.highscore(), 113, "Highscore survives the reset");
    }
}
