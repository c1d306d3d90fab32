use serde::{Deserialize, Serialize};

/// Per-layer nonlinearity applied after the weighted sum at each neuron.
///
/// `TanH` is the empirically best-performing choice for the digit task; the
/// others are kept as configuration options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    TanH,
    Sigmoid,
    ReLU,
    Identity,
}

impl Activation {
    #[inline]
    pub fn apply(self, z: f64) -> f64 {
        match self {
            Activation::TanH => z.tanh(),
            Activation::Sigmoid => 1.0 / (1.0 + (-z).exp()),
            Activation::ReLU => z.max(0.0),
            Activation::Identity => z,
        }
    }

    /// Derivative expressed in terms of the forward output `a = apply(z)`.
    ///
    /// The backward pass reuses the activation cached during the forward
    /// pass instead of recomputing from `z`, which keeps the two passes
    /// numerically consistent.
    #[inline]
    pub fn derivative_from_output(self, a: f64) -> f64 {
        match self {
            Activation::TanH => 1.0 - a * a,
            Activation::Sigmoid => a * (1.0 - a),
            Activation::ReLU => {
                if a > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::Identity => 1.0,
        }
    }
}
