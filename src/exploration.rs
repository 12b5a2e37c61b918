use rand::{thread_rng, Rng};

use crate::assert_interval;

/// Exploration policy result
pub enum Choice {
    Explore,
    Exploit,
}

/// Epsilon greedy exploration policy with a fixed epsilon threshold
///
/// The exploration rate is a plain constant, like the rest of the agent's
/// learning parameters; there is no decay schedule.
pub struct EpsilonGreedy {
    epsilon: f32,
}

impl EpsilonGreedy {
    /// Initialize epsilon greedy policy with the probability of exploring
    ///
    /// **Panics** if `epsilon` is not in the interval `[0,1]`
    pub fn new(epsilon: f32) -> Self {
        assert_interval!(epsilon, 0.0, 1.0);
        Self { epsilon }
    }

    /// Invoke epsilon greedy policy
    pub fn choose(&self) -> Choice {
        if thread_rng().gen::<f32>() < self.epsilon {
            Choice::Explore
        } else {
            Choice::Exploit
        }
    }
}
