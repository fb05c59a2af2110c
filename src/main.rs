use cartpole_rl::cli::{run_log_dir, AgentConfig, Options, RunConfig};
use cartpole_rl::envs::CartPole;
use cartpole_rl::logging::TensorBoardLogger;
use cartpole_rl::simulation::{Checkpointer, ExperimentConfig};
use cartpole_rl::{run_experiment, EnvStructure, Prng};
use clap::Parser;
use log::info;
use rand::SeedableRng;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let opts = Options::parse();

    let mut rng = Prng::seed_from_u64(opts.seed);
    #[allow(clippy::cast_possible_wrap)]
    tch::manual_seed(opts.seed as i64);

    let env = CartPole::default();
    println!("State dimension: {}", env.observation_dim());
    println!("Action number: {}", env.num_actions());

    let experiment_config = ExperimentConfig::from(&opts);
    let agent_config = AgentConfig::from(&opts);
    let mut agent = agent_config.build_episodic(env, &mut rng)?;

    let log_dir = run_log_dir(&opts, chrono::Local::now());
    RunConfig::new(CartPole::NAME, &opts).save_to_dir(&log_dir)?;

    println!("Logging to {:?}", log_dir);
    let mut logger = TensorBoardLogger::new(&log_dir);
    let checkpointer = Checkpointer::for_run(&opts.save_dir, CartPole::NAME, opts.algo.name());

    let summary = run_experiment(
        &mut agent,
        &experiment_config,
        &mut logger,
        Some(&checkpointer),
    )?;
    info!(
        "finished {} training episodes ({} steps), average return {:.2}",
        summary.train_episodes, summary.train_steps, summary.train_average_return
    );
    Ok(())
}
