//! Environment testing utilities
use super::{Environment, Features, Indexed, Successor};
use crate::Prng;
use rand::{Rng, SeedableRng};

/// Run an environment with uniform random actions and check that invariants are satisfied.
pub fn check_env<E: Environment>(env: &E, num_steps: u64, seed: u64) {
    let (min_reward, max_reward) = env.reward_range();
    let discount_factor = env.discount_factor();
    assert!(discount_factor >= 0.0);
    assert!(discount_factor <= 1.0);
    assert_eq!(env.observation_dim(), E::Observation::NUM_FEATURES);
    assert_eq!(env.num_actions(), E::Action::SIZE);

    let mut rng = Prng::seed_from_u64(seed);
    let mut state = env.initial_state(&mut rng);
    for _ in 0..num_steps {
        let observation = env.observe(&state, &mut rng);
        assert!(observation.features().iter().all(|x| x.is_finite()));

        let action = E::Action::from_index(rng.gen_range(0..E::Action::SIZE))
            .expect("index within action range");
        let (successor, reward) = env.step(state, &action, &mut rng);
        assert!(reward >= min_reward);
        assert!(reward <= max_reward);
        state = match successor {
            Successor::Continue(s) => s,
            Successor::Terminate | Successor::Interrupt(_) => env.initial_state(&mut rng),
        };
    }
}
