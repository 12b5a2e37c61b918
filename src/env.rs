use strum::VariantArray;

/// One discrete move choice available to the agent
///
/// `Up`, `Left`, `Down`, and `Right` are playable: they can be applied to the
/// board and learned from. `Restart` and `Exit` are control actions handled by
/// the [episode runner](crate::runner::EpisodeRunner). Which actions are legal
/// in a given state is entirely the environment's call.
#[derive(VariantArray, Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Action {
    Up,
    Left,
    Down,
    Right,
    Restart,
    Exit,
}

impl Action {
    /// Whether this action can be applied to the board, as opposed to a
    /// control action that only steers the play loop
    pub fn is_playable(self) -> bool {
        !matches!(self, Action::Restart | Action::Exit)
    }
}

/// The narrow contract through which the learning core drives a game
///
/// Implementations own the board representation, the merge mechanics, and the
/// win/loss rules. The core only snapshots states for table keys, probes
/// legality, applies moves, and reads scores.
pub trait Environment {
    /// A snapshot of the environment sufficient to distinguish learning contexts
    type State;

    /// Snapshot the current state
    fn state(&self) -> Self::State;

    /// Whether `action` is currently legal
    fn move_is_possible(&self, action: Action) -> bool;

    /// Attempt the move, mutating board and score
    ///
    /// **Returns** whether the state actually changed. A rejected move leaves
    /// the environment untouched.
    fn apply(&mut self, action: Action) -> bool;

    /// Whether the win condition holds, evaluated after a successful move
    fn is_win(&self) -> bool;

    /// Whether the game is lost, evaluated after a successful move
    fn is_gameover(&self) -> bool;

    /// Current cumulative score
    ///
    /// Rewards are computed as the difference between two score snapshots.
    fn score(&self) -> u32;

    /// Best score achieved across resets
    fn highscore(&self) -> u32;

    /// Reinitialize to a fresh starting state
    fn reset(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playable_actions() {
        let playable = Action::VARIANTS
            .iter()
            .filter(|a| a.is_playable())
            .count();
        assert_eq!(playable, 4, "Only the four directions are playable");
        assert!(!Action::Restart.is_playable());
        assert!(!Action::Exit.is_playable());
    }
}
