use rand::seq::IteratorRandom;
use strum::VariantArray;

use crate::{
    assert_interval,
    env::{Action, Environment},
    exploration::{Choice, EpsilonGreedy},
    table::{QTable, StateKey},
};

/// Configuration for the [`QTableAgent`]
///
/// Defaults to a learning rate of 0.9, an exploration rate of 0.01, and a
/// discount factor of 0.8.
pub struct QTableAgentConfig {
    pub exploration: EpsilonGreedy,
    pub alpha: f32,
    pub gamma: f32,
}

impl Default for QTableAgentConfig {
    fn default() -> Self {
        Self {
            exploration: EpsilonGreedy::new(0.01),
            alpha: 0.9,
            gamma: 0.8,
        }
    }
}

/// A tabular Q-learning agent
///
/// Estimates the best achievable cumulative future reward for every
/// (state, action) pair it observes, stored in a sparse [`QTable`]. The
/// update is off-policy TD(0): the target maximizes over the next state's
/// legal actions regardless of which action the epsilon greedy policy
/// actually picks, so the learned values are independent of exploration.
///
/// The agent holds no phase of its own; it persists across episodes and
/// carries the table forward so learning compounds.
///
/// ### Generics
/// - `E` - The [`Environment`] in which the agent will learn
///     - The state space must be discrete, and states must be `Clone`, `Eq`,
///       and `Hash` to be used as table keys
pub struct QTableAgent<E>
where
    E: Environment,
    E::State: StateKey,
{
    table: QTable<E::State>,
    exploration: EpsilonGreedy,
    alpha: f32,          // learning rate
    gamma: f32,          // discount factor
    episode: u32,        // current episode
    episode_reward: f32, // reward accumulated during the current episode
}

impl<E> QTableAgent<E>
where
    E: Environment,
    E::State: StateKey,
{
    /// Initialize a new `QTableAgent`
    ///
    /// ### Parameters
    /// - `alpha` - The learning rate - must be in `(0,1]`
    /// - `gamma` - The discount factor - must be in `[0,1]`
    /// - `exploration` - An [`EpsilonGreedy`] policy
    ///
    /// **Panics** if `alpha` or `gamma` is out of its interval
    pub fn new(config: QTableAgentConfig) -> Self {
        assert_interval!(config.alpha, 0.0, 1.0);
        assert!(
            config.alpha > 0.0,
            "Invalid value for `config.alpha`. Must be positive.",
        );
        assert_interval!(config.gamma, 0.0, 1.0);
        Self {
            table: QTable::new(),
            exploration: config.exploration,
            alpha: config.alpha,
            gamma: config.gamma,
            episode: 0,
            episode_reward: 0.0,
        }
    }

    /// The subset of the action enum that is currently legal in `env`
    ///
    /// Empty when the environment is in a terminal state.
    pub fn legal_actions(&self, env: &E) -> Vec<Action> {
        Action::VARIANTS
            .iter()
            .copied()
            .filter(|&a| env.move_is_possible(a))
            .collect()
    }

    /// The greedy value estimate of the environment's current state
    ///
    /// **Returns** the maximum stored value over legal actions, or 0.0 if no
    /// action is legal. This is the Bellman next-state value term of the
    /// update rule.
    pub fn value_of(&self, env: &E) -> f32 {
        let state = env.state();
        self.legal_actions(env)
            .into_iter()
            .map(|a| self.table.get(&state, a))
            .max_by(|a, b| a.partial_cmp(b).unwrap())
            .unwrap_or(0.0)
    }

    /// The legal action with the highest stored value, or `None` if no action
    /// is legal
    ///
    /// Ties break deterministically for a fixed table, by declaration order
    /// of the action enum. Callers must not rely on which of the tied actions
    /// wins, only that it is one of the maximal set.
    pub fn best_action(&self, env: &E) -> Option<Action> {
        let state = env.state();
        self.legal_actions(env).into_iter().max_by(|&a, &b| {
            let a_value = self.table.get(&state, a);
            let b_value = self.table.get(&state, b);
            a_value.partial_cmp(&b_value).unwrap()
        })
    }

    /// Choose an action with the epsilon greedy policy
    ///
    /// Explores uniformly among legal actions with probability epsilon,
    /// otherwise exploits [`best_action`](QTableAgent::best_action).
    /// **Returns** `None` if no action is legal, regardless of the
    /// exploration draw.
    pub fn choose_action(&self, env: &E) -> Option<Action> {
        let legal = self.legal_actions(env);
        if legal.is_empty() {
            return None;
        }
        match self.exploration.choose() {
            Choice::Explore => legal.into_iter().choose(&mut rand::thread_rng()),
            Choice::Exploit => self.best_action(env),
        }
    }

    /// Learn from one observed transition
    ///
    /// `env` must have already applied `action`, making it the next state of
    /// the transition. Blends the old estimate with the observed reward plus
    /// the discounted greedy estimate of the next state, and accumulates the
    /// reward into the episode total.
    ///
    /// Errors if `action` is a control action: those never produce board
    /// transitions, so recording one would corrupt the table.
    pub fn observe(
        &mut self,
        state: E::State,
        action: Action,
        env: &E,
        reward: f32,
    ) -> Result<(), String> {
        if !action.is_playable() {
            return Err(format!("cannot learn from control action `{:?}`", action));
        }
        self.episode_reward += reward;
        let q_value = self.table.get(&state, action);
        let new_q_value = reward + self.gamma * self.value_of(env);
        let weighted_q_value = (1.0 - self.alpha) * q_value + self.alpha * new_q_value;
        self.table.set(&state, action, weighted_q_value);
        Ok(())
    }

    /// Start a fresh episode: bump the episode counter and zero the reward
    /// accumulator
    pub fn begin_episode(&mut self) {
        self.episode += 1;
        self.episode_reward = 0.0;
    }

    /// Read access to the value table for inspection
    pub fn q_table(&self) -> &QTable<E::State> {
        &self.table
    }

    /// The current episode number
    pub fn episode(&self) -> u32 {
        self.episode
    }

    /// Total reward observed during the current episode
    pub fn episode_reward(&self) -> f32 {
        self.episode_reward
    }
}
