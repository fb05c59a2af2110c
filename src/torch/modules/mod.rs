//! Neural network modules
mod activation;
mod mlp;

pub use activation::Activation;
pub use mlp::{Mlp, MlpConfig};
