use tileq::{
    agent::{QTableAgent, QTableAgentConfig},
    env::Environment,
    gym::CliffWalk,
    runner::EpisodeRunner,
};

const SHORT_RUN: u32 = 50;
const LONG_RUN: u32 = 1000;
const STEP_LIMIT: u64 = 1000;

fn train(episodes: u32) -> u32 {
    let mut env = CliffWalk::new();
    let mut agent = QTableAgent::new(QTableAgentConfig::default());
    for _ in 0..episodes {
        EpisodeRunner::new(&mut agent, &mut env)
            .with_step_limit(STEP_LIMIT)
            .run();
    }
    env.highscore()
}

fn main() {
    println!(
        "Best highscore after {} episodes: {}",
        SHORT_RUN,
        train(SHORT_RUN)
    );
    println!(
        "Best highscore after {} episodes: {}",
        LONG_RUN,
        train(LONG_RUN)
    );
}
