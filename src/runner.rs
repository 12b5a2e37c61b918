use crate::{
    agent::QTableAgent,
    env::{Action, Environment},
    table::StateKey,
};

/// How an episode ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Gameover,
}

/// The phases of the play loop
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Init,
    Playing,
    Terminal(Outcome),
    Exit,
}

/// The episodic control loop
///
/// An explicit state machine that alternates between asking the agent for an
/// action, applying it to the environment, and reporting the observed
/// transition back to the agent. [`run`](EpisodeRunner::run) drives one full
/// Init-to-Exit cycle; [`tick`](EpisodeRunner::tick) advances a single
/// transition so the machine can be driven step by step.
///
/// Transitions out of the Playing phase:
/// - the agent picks `Restart` - back to Init, nothing observed
/// - the agent picks `Exit`, or has no legal action - Exit
/// - an accepted move - observe, then Terminal on a win or gameover
/// - a rejected move - stay in Playing, nothing observed
///
/// A Terminal phase leads to Exit unless a restart was armed with
/// [`signal_restart`](EpisodeRunner::signal_restart).
pub struct EpisodeRunner<'a, E>
where
    E: Environment,
    E::State: StateKey,
{
    agent: &'a mut QTableAgent<E>,
    env: &'a mut E,
    phase: Phase,
    restart: bool,
    steps: u64,
    step_limit: Option<u64>,
}

impl<'a, E> EpisodeRunner<'a, E>
where
    E: Environment,
    E::State: StateKey,
{
    pub fn new(agent: &'a mut QTableAgent<E>, env: &'a mut E) -> Self {
        Self {
            agent,
            env,
            phase: Phase::Init,
            restart: false,
            steps: 0,
            step_limit: None,
        }
    }

    /// Bail out of an episode after `limit` action requests without reaching
    /// a terminal state, instead of looping forever against a broken
    /// environment. Unset by default.
    pub fn with_step_limit(mut self, limit: u64) -> Self {
        self.step_limit = Some(limit);
        self
    }

    /// Current phase of the state machine
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Arm a one-shot restart: the next Terminal phase transitions back to
    /// Init instead of Exit, chaining another episode into the same run
    pub fn signal_restart(&mut self) {
        self.restart = true;
    }

    /// Advance the state machine by one transition
    pub fn tick(&mut self) -> Phase {
        self.phase = match self.phase {
            Phase::Init => {
                self.env.reset();
                self.agent.begin_episode();
                self.steps = 0;
                log::debug!("episode {} started", self.agent.episode());
                Phase::Playing
            }
            Phase::Playing => self.play(),
            Phase::Terminal(outcome) => {
                log::info!(
                    "episode {} ended in {:?}: score {}, reward {}",
                    self.agent.episode(),
                    outcome,
                    self.env.score(),
                    self.agent.episode_reward(),
                );
                if self.restart {
                    self.restart = false;
                    Phase::Init
                } else {
                    Phase::Exit
                }
            }
            Phase::Exit => Phase::Exit,
        };
        self.phase
    }

    /// One Playing transition: choose an action, apply it, learn from it
    fn play(&mut self) -> Phase {
        if let Some(limit) = self.step_limit {
            if self.steps >= limit {
                log::warn!("no terminal state after {} steps, bailing out", limit);
                return Phase::Exit;
            }
        }
        self.steps += 1;

        let Some(action) = self.agent.choose_action(self.env) else {
            return Phase::Exit;
        };
        match action {
            Action::Restart => Phase::Init,
            Action::Exit => Phase::Exit,
            action => {
                let state = self.env.state();
                let score = self.env.score();
                if !self.env.apply(action) {
                    // rejected move, nothing to learn from
                    return Phase::Playing;
                }
                let reward = self.env.score() as f32 - score as f32;
                self.agent
                    .observe(state, action, self.env, reward)
                    .expect("runner only observes playable moves");

                if self.env.is_win() {
                    Phase::Terminal(Outcome::Win)
                } else if self.env.is_gameover() {
                    Phase::Terminal(Outcome::Gameover)
                } else {
                    Phase::Playing
                }
            }
        }
    }

    /// Drive one full play-to-Exit cycle from a fresh Init
    ///
    /// **Returns** the last terminal outcome reached, or `None` if the loop
    /// exited without one: the agent chose `Exit`, no legal action remained,
    /// or the step limit tripped. Callers train by invoking this once per
    /// episode and reading the environment's highscore afterwards.
    pub fn run(&mut self) -> Option<Outcome> {
        self.phase = Phase::Init;
        let mut outcome = None;
        loop {
            match self.tick() {
                Phase::Terminal(o) => outcome = Some(o),
                Phase::Exit => break outcome,
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::QTableAgentConfig;
    use crate::exploration::EpsilonGreedy;

    /// A scripted environment whose state is the number of accepted moves
    struct ScriptedEnv {
        legal: Vec<Action>,
        accept: bool,
        gain: u32,
        win_at: Option<u32>,
        gameover_at: Option<u32>,
        moves: u32,
        score: u32,
        highscore: u32,
        resets: u32,
    }

    impl ScriptedEnv {
        fn new(legal: &[Action]) -> Self {
            Self {
                legal: legal.to_vec(),
                accept: true,
                gain: 4,
                win_at: None,
                gameover_at: None,
                moves: 0,
                score: 0,
                highscore: 0,
                resets: 0,
            }
        }
    }

    impl Environment for ScriptedEnv {
        type State = u32;

        fn state(&self) -> Self::State {
            self.moves
        }

        fn move_is_possible(&self, action: Action) -> bool {
            self.legal.contains(&action)
        }

        fn apply(&mut self, action: Action) -> bool {
            if !self.accept || !action.is_playable() || !self.move_is_possible(action) {
                return false;
            }
            self.moves += 1;
            self.score += self.gain;
            true
        }

        fn is_win(&self) -> bool {
            self.win_at.is_some_and(|n| self.moves >= n)
        }

        fn is_gameover(&self) -> bool {
            self.gameover_at.is_some_and(|n| self.moves >= n)
        }

        fn score(&self) -> u32 {
            self.score
        }

        fn highscore(&self) -> u32 {
            self.highscore.max(self.score)
        }

        fn reset(&mut self) {
            self.highscore = self.highscore.max(self.score);
            self.moves = 0;
            self.score = 0;
            self.resets += 1;
        }
    }

    fn greedy_agent() -> QTableAgent<ScriptedEnv> {
        QTableAgent::new(QTableAgentConfig {
            exploration: EpsilonGreedy::new(0.0),
            ..Default::default()
        })
    }

    #[test]
    fn one_move_gameover_walks_the_machine_to_exit() {
        let mut env = ScriptedEnv::new(&[Action::Up]);
        env.gameover_at = Some(1);
        let mut agent = greedy_agent();
        let mut runner = EpisodeRunner::new(&mut agent, &mut env);

        assert_eq!(runner.phase(), Phase::Init);
        assert_eq!(runner.tick(), Phase::Playing);
        assert_eq!(runner.tick(), Phase::Terminal(Outcome::Gameover));
        assert_eq!(runner.tick(), Phase::Exit);
        assert_eq!(runner.tick(), Phase::Exit, "Exit is absorbing");

        assert_eq!(env.resets, 1);
        assert_eq!(agent.q_table().len(), 1, "Exactly one observation");
        assert_eq!(agent.q_table().get(&0, Action::Up), 0.9 * 4.0);
        assert_eq!(agent.episode_reward(), 4.0);
    }

    #[test]
    fn run_reports_the_outcome() {
        let mut env = ScriptedEnv::new(&[Action::Up]);
        env.win_at = Some(1);
        let mut agent = greedy_agent();
        assert_eq!(
            EpisodeRunner::new(&mut agent, &mut env).run(),
            Some(Outcome::Win),
        );
    }

    #[test]
    fn restart_action_resets_without_observing() {
        let mut env = ScriptedEnv::new(&[Action::Restart]);
        let mut agent = greedy_agent();
        let mut runner = EpisodeRunner::new(&mut agent, &mut env);

        assert_eq!(runner.tick(), Phase::Playing);
        assert_eq!(runner.tick(), Phase::Init, "Restart goes back to Init");
        assert_eq!(runner.tick(), Phase::Playing);

        assert_eq!(env.resets, 2, "Reset before the next move");
        assert!(agent.q_table().is_empty(), "No observation was recorded");
    }

    #[test]
    fn exit_action_stops_the_loop() {
        let mut env = ScriptedEnv::new(&[Action::Exit]);
        let mut agent = greedy_agent();

        assert_eq!(EpisodeRunner::new(&mut agent, &mut env).run(), None);
        assert!(agent.q_table().is_empty());
    }

    #[test]
    fn no_legal_action_exits() {
        let mut env = ScriptedEnv::new(&[]);
        let mut agent = greedy_agent();
        let mut runner = EpisodeRunner::new(&mut agent, &mut env);

        assert_eq!(runner.tick(), Phase::Playing);
        assert_eq!(runner.tick(), Phase::Exit);
    }

    #[test]
    fn rejected_moves_record_nothing() {
        let mut env = ScriptedEnv::new(&[Action::Up]);
        env.accept = false;
        let mut agent = greedy_agent();
        let mut runner = EpisodeRunner::new(&mut agent, &mut env).with_step_limit(3);

        assert_eq!(runner.run(), None, "Step limit trips, no terminal reached");
        assert!(agent.q_table().is_empty());
        assert_eq!(agent.episode_reward(), 0.0);
    }

    #[test]
    fn signalled_restart_chains_a_second_episode() {
        let mut env = ScriptedEnv::new(&[Action::Up]);
        env.gameover_at = Some(1);
        let mut agent = greedy_agent();
        let mut runner = EpisodeRunner::new(&mut agent, &mut env);
        runner.signal_restart();

        assert_eq!(runner.run(), Some(Outcome::Gameover));
        assert_eq!(env.resets, 2, "Terminal transitioned back to Init once");
        assert_eq!(agent.episode(), 2);
    }

    #[test]
    fn run_can_be_invoked_repeatedly() {
        let mut env = ScriptedEnv::new(&[Action::Up]);
        env.gameover_at = Some(1);
        let mut agent = greedy_agent();

        for _ in 0..3 {
            EpisodeRunner::new(&mut agent, &mut env).run();
        }
        assert_eq!(agent.episode(), 3);
        assert_eq!(env.highscore(), 4, "Highscore survives resets");
    }
}
