use super::{EnvStructure, Environment, Features, Indexed, Successor};
use crate::Prng;
use rand::distributions::{Distribution, Uniform};
use serde::{Deserialize, Serialize};

/// Cart-Pole environment
///
/// Consists of a simulated cart on a track with a vertical pole attached by a hinge on the top.
/// The goal is to keep the pole upright by applying left and right forces to the cart.
///
/// The environment is based on [Barto et al. (1983)][barto1983] with updated dynamics equations
/// from [Florian (2005)][florian2005], who corrects the friction term.
/// The default dynamics constants and episode parameters match the
/// [OpenAI Gym CartPole-v1 environment][cartpole_source].
/// Gym has no friction so with the default (zero) friction coefficients the two agree.
///
/// [barto1983]: https://ieeexplore.ieee.org/document/6313077
/// [florian2005]: https://coneural.org/florian/papers/05_cart_pole.pdf
/// [cartpole_source]: https://github.com/openai/gym/blob/master/gym/envs/classic_control/cartpole.py
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartPole {
    dynamics: Dynamics,
    env: EnvironmentParams,
}

impl CartPole {
    /// Environment name used in log and checkpoint paths.
    pub const NAME: &'static str = "CartPole-v1";

    #[must_use]
    pub fn new(phys: PhysicalConstants, env: EnvironmentParams) -> Self {
        Self {
            dynamics: phys.into(),
            env,
        }
    }

    fn out_of_bounds(&self, phys: &CartPolePhysicalState) -> bool {
        phys.cart_position.abs() > self.env.max_pos || phys.pole_angle.abs() > self.env.max_angle
    }
}

/// Horizontal push applied to the cart.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Push {
    Left,
    Right,
}

impl Indexed for Push {
    const SIZE: usize = 2;

    #[inline]
    fn as_index(&self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }

    #[inline]
    fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Left),
            1 => Some(Self::Right),
            _ => None,
        }
    }
}

impl EnvStructure for CartPole {
    fn observation_dim(&self) -> usize {
        CartPolePhysicalState::NUM_FEATURES
    }

    fn num_actions(&self) -> usize {
        Push::SIZE
    }

    fn reward_range(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn discount_factor(&self) -> f64 {
        self.env.discount_factor
    }
}

impl Environment for CartPole {
    type State = CartPoleInternalState;
    type Observation = CartPolePhysicalState;
    type Action = Push;

    fn initial_state(&self, rng: &mut Prng) -> Self::State {
        // All parameters are sampled from the same range of values
        let dist = Uniform::new_inclusive(-0.05, 0.05);
        CartPoleInternalState {
            physical: CartPolePhysicalState {
                cart_position: dist.sample(rng),
                cart_velocity: dist.sample(rng),
                pole_angle: dist.sample(rng),
                pole_angular_velocity: dist.sample(rng),
            },
            normal_velocity_positive: true,
        }
    }

    fn observe(&self, state: &Self::State, _: &mut Prng) -> Self::Observation {
        debug_assert!(
            !self.out_of_bounds(&state.physical),
            "out-of-bounds state should not have been produced"
        );
        state.physical
    }

    fn step(
        &self,
        state: Self::State,
        action: &Self::Action,
        _: &mut Prng,
    ) -> (Successor<Self::State>, f64) {
        let applied_force = match action {
            Push::Left => -self.env.action_force,
            Push::Right => self.env.action_force,
        };
        let next_state = self.dynamics.advance(&state, applied_force);
        // Gym marks the step that leaves the bounds as done and still pays its reward.
        // All rewards after it are 0 so the successor is terminal.
        let successor = if self.out_of_bounds(&next_state.physical) {
            Successor::Terminate
        } else {
            Successor::Continue(next_state)
        };
        (successor, 1.0)
    }
}

/// Physical constants for the [`CartPole`] environment.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalConstants {
    /// Downward force of gravity (m/s^2)
    pub gravity: f64,
    /// Mass of the cart (kg)
    pub mass_cart: f64,
    /// Mass of the pole (kg)
    pub mass_pole: f64,
    /// Half the length of the pole (m)
    pub length_half_pole: f64,
    /// Coefficient of friction between the cart and the track (unitless).
    ///
    /// The track is assumed to fully confine the cart in the vertical direction and this same
    /// friction coefficient applies whether the normal force of the cart is up or down.
    pub friction_cart: f64,
    /// Coefficient of friction between the pole and the cart at the hinge (unitless).
    pub friction_pole: f64,
    /// Simulation time step (s)
    pub time_step: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            gravity: 9.8,
            mass_cart: 1.0,
            mass_pole: 0.1,
            length_half_pole: 0.5,
            friction_cart: 0.0,
            friction_pole: 0.0,
            time_step: 0.02,
        }
    }
}

/// Parameters for [`CartPole`] as a reinforcement learning environment.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentParams {
    /// Magnitude of the force (N) applied by actions.
    pub action_force: f64,
    /// Maximum absolute position (meters) before the episode is ended.
    pub max_pos: f64,
    /// Maximum absolute pole angle from vertical (radians) before the episode is ended.
    pub max_angle: f64,
    /// Discount factor
    pub discount_factor: f64,
}

impl Default for EnvironmentParams {
    fn default() -> Self {
        // Gym does not define a discount factor; 0.99 is what the agents assume.
        Self {
            action_force: 10.0,
            max_pos: 2.4,
            max_angle: 12.0f64.to_radians(),
            discount_factor: 0.99,
        }
    }
}

/// Physical constants with pre-computed common terms.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
struct Dynamics {
    c: PhysicalConstants,
    /// `gravity * (mass_cart + mass_pole)` (N)
    total_weight: f64,
    /// `1 / (mass_cart + mass_pole)`
    inv_total_mass: f64,
    /// `mass_pole * length_half_pole`
    mass_length_pole: f64,
}

impl Default for Dynamics {
    fn default() -> Self {
        PhysicalConstants::default().into()
    }
}

impl From<PhysicalConstants> for Dynamics {
    fn from(c: PhysicalConstants) -> Self {
        let total_mass = c.mass_cart + c.mass_pole;
        Self {
            c,
            total_weight: c.gravity * total_mass,
            inv_total_mass: total_mass.recip(),
            mass_length_pole: c.mass_pole * c.length_half_pole,
        }
    }
}

/// Physical state of the [`CartPole`] environment.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartPolePhysicalState {
    /// Cart position from the track midpoint (m).
    pub cart_position: f64,
    /// Cart velocity (m/s).
    pub cart_velocity: f64,
    /// Angle of the pole from vertical (radians).
    pub pole_angle: f64,
    /// Pole angular velocity about the hinge (radians / s).
    pub pole_angular_velocity: f64,
}

impl Features for CartPolePhysicalState {
    const NUM_FEATURES: usize = 4;

    #[allow(clippy::cast_possible_truncation)]
    fn write_features(&self, out: &mut [f32]) {
        out[0] = self.cart_position as f32;
        out[1] = self.cart_velocity as f32;
        out[2] = self.pole_angle as f32;
        out[3] = self.pole_angular_velocity as f32;
    }
}

/// State of the [`CartPole`] environment.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartPoleInternalState {
    physical: CartPolePhysicalState,

    /// Sign of `normal_force * cart_velocity` on the previous step.
    ///
    /// The friction term depends on this sign, which in turn depends on the friction.
    /// The previous value is tried first and flipped if the result is self-inconsistent.
    normal_velocity_positive: bool,
}

impl CartPoleInternalState {
    #[must_use]
    pub const fn physical(&self) -> &CartPolePhysicalState {
        &self.physical
    }
}

/// Intermediate accelerations for one time step.
struct Accelerations {
    angular: f64,
    normal_force: f64,
}

impl Dynamics {
    /// Simulate one time step with a horizontal force (N) applied to the cart.
    fn advance(&self, state: &CartPoleInternalState, applied_force: f64) -> CartPoleInternalState {
        // "Correct equations for the dynamics of the cart-pole system" by Florian (2005)
        let phys = &state.physical;
        let (sin_angle, cos_angle) = phys.pole_angle.sin_cos();
        let omega_sq = phys.pole_angular_velocity * phys.pole_angular_velocity;

        let mut signed_friction = if state.normal_velocity_positive {
            self.c.friction_cart
        } else {
            -self.c.friction_cart
        };
        let mut acc = self.accelerations(
            phys,
            applied_force,
            signed_friction,
            omega_sq,
            sin_angle,
            cos_angle,
        );
        let normal_velocity_positive = (acc.normal_force * phys.cart_velocity).is_sign_positive();
        if normal_velocity_positive != state.normal_velocity_positive {
            signed_friction = -signed_friction;
            acc = self.accelerations(
                phys,
                applied_force,
                signed_friction,
                omega_sq,
                sin_angle,
                cos_angle,
            );
        }

        // Equation 22
        let force_pole = self.mass_length_pole * (omega_sq * sin_angle - acc.angular * cos_angle);
        let force_friction = -signed_friction * acc.normal_force;
        let cart_acceleration =
            (applied_force + force_pole + force_friction) * self.inv_total_mass;

        // Explicit Euler, the Gym default integrator
        let dt = self.c.time_step;
        CartPoleInternalState {
            physical: CartPolePhysicalState {
                cart_position: phys.cart_position + dt * phys.cart_velocity,
                cart_velocity: phys.cart_velocity + dt * cart_acceleration,
                pole_angle: phys.pole_angle + dt * phys.pole_angular_velocity,
                pole_angular_velocity: phys.pole_angular_velocity + dt * acc.angular,
            },
            normal_velocity_positive,
        }
    }

    /// Pole angular acceleration (equation 21) and the resulting normal force of the cart.
    fn accelerations(
        &self,
        phys: &CartPolePhysicalState,
        applied_force: f64,
        signed_friction: f64,
        omega_sq: f64,
        sin_angle: f64,
        cos_angle: f64,
    ) -> Accelerations {
        let alpha = (-applied_force
            - self.mass_length_pole * omega_sq * (sin_angle + signed_friction * cos_angle))
            * self.inv_total_mass;
        let beta = self.c.friction_pole * phys.pole_angular_velocity / self.mass_length_pole;
        let numerator = self.c.gravity * sin_angle
            + cos_angle * (alpha + self.c.gravity * signed_friction)
            - beta;
        let denominator = self.c.length_half_pole
            * (4.0 / 3.0
                - self.c.mass_pole * cos_angle * self.inv_total_mass * (cos_angle - signed_friction));
        let angular = numerator / denominator;

        // Positive for downward normal force and negative for upward.
        let normal_force = self.total_weight
            - self.mass_length_pole * (angular * sin_angle + omega_sq * cos_angle);
        Accelerations {
            angular,
            normal_force,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing;
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn run_default() {
        testing::check_env(&CartPole::default(), 1000, 0);
    }

    #[test]
    fn push_index_round_trip() {
        assert_eq!(Push::from_index(Push::Left.as_index()), Some(Push::Left));
        assert_eq!(Push::from_index(Push::Right.as_index()), Some(Push::Right));
        assert_eq!(Push::from_index(2), None);
    }

    #[test]
    fn seeded_initial_state_is_deterministic() {
        let env = CartPole::default();
        let a = env.initial_state(&mut Prng::seed_from_u64(7));
        let b = env.initial_state(&mut Prng::seed_from_u64(7));
        assert_eq!(a, b);
        for x in a.physical().features() {
            assert!(x.abs() <= 0.05);
        }
    }

    #[test]
    fn constant_push_terminates() {
        let env = CartPole::default();
        let mut rng = Prng::seed_from_u64(1);
        let mut state = env.initial_state(&mut rng);
        for _ in 0..500 {
            let (successor, reward) = env.step(state, &Push::Right, &mut rng);
            assert!((reward - 1.0).abs() < f64::EPSILON);
            match successor.into_continue() {
                Some(s) => state = s,
                None => return,
            }
        }
        panic!("always pushing right should tip the pole within 500 steps");
    }

    #[test]
    fn matches_gym_single_step() {
        // Gym CartPole-v1 from [0, 0, 0, 0] pushing right:
        // x_dot = 0.195122, theta_dot = -0.292683
        let env = CartPole::default();
        let state = CartPoleInternalState {
            physical: CartPolePhysicalState {
                cart_position: 0.0,
                cart_velocity: 0.0,
                pole_angle: 0.0,
                pole_angular_velocity: 0.0,
            },
            normal_velocity_positive: true,
        };
        let (successor, _) = env.step(state, &Push::Right, &mut Prng::seed_from_u64(0));
        let next = successor.into_continue().unwrap();
        assert!((next.physical.cart_velocity - 0.195_122).abs() < 1e-5);
        assert!((next.physical.pole_angular_velocity + 0.292_683).abs() < 1e-5);
        assert!(next.physical.cart_position.abs() < 1e-12);
    }

    #[test]
    fn custom_parameters_change_dynamics() {
        let at_rest = CartPoleInternalState {
            physical: CartPolePhysicalState {
                cart_position: 0.0,
                cart_velocity: 0.0,
                pole_angle: 0.0,
                pole_angular_velocity: 0.0,
            },
            normal_velocity_positive: true,
        };
        let heavy = CartPole::new(
            PhysicalConstants {
                mass_cart: 4.9,
                ..PhysicalConstants::default()
            },
            EnvironmentParams::default(),
        );
        let (successor, _) = heavy.step(at_rest, &Push::Right, &mut Prng::seed_from_u64(0));
        // Gym equations with total mass 5 kg: x_acc = 2.030457
        let next = successor.into_continue().unwrap();
        assert!((next.physical.cart_velocity - 0.040_609_1).abs() < 1e-6);

        let narrow = CartPole::new(
            PhysicalConstants::default(),
            EnvironmentParams {
                max_pos: 0.0,
                ..EnvironmentParams::default()
            },
        );
        let moving = CartPoleInternalState {
            physical: CartPolePhysicalState {
                cart_velocity: 1.0,
                ..at_rest.physical
            },
            ..at_rest
        };
        let (successor, _) = narrow.step(moving, &Push::Right, &mut Prng::seed_from_u64(0));
        assert!(successor.is_terminal());
    }
}
