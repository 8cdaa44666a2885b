//! Slow iterative baseline for the Fréchet mean.
//!
//! Starting at the first sample point, repeatedly walk a shrinking fraction
//! of the geodesic toward the sample points in round-robin order:
//!
//! ```text
//! x_{k+1} = exp_{x_k}( log_{x_k}(a_{k mod p}) / (k+1) )
//! ```
//!
//! The 1/(k+1) weights make this a Riemannian running average; it converges
//! to the mean but only at a sublinear rate, which is what makes it a useful
//! sanity reference for the gradient drivers rather than a competitor.

use karcher_manifold::{scale, Manifold};

/// Run the round-robin averaging scheme for `max_steps` steps.
pub fn iterative_mean<M: Manifold>(manifold: &M, sample: &[Vec<f64>], max_steps: usize) -> Vec<f64> {
    let p = sample.len();
    let mut x = sample[0].clone();
    for k in 1..max_steps {
        let target = &sample[k % p];
        let v = manifold.log_map(&x, target);
        x = manifold.exp_map(&x, &scale(1.0 / (k + 1) as f64, &v));
    }
    x
}

/// Component-wise average of the sample, used as the starting iterate for
/// the gradient drivers. The ball is convex so the centroid of ball points
/// stays inside it.
pub fn euclidean_centroid(sample: &[Vec<f64>]) -> Vec<f64> {
    let dim = sample[0].len();
    let mut c = vec![0.0; dim];
    for x in sample {
        for (ci, xi) in c.iter_mut().zip(x.iter()) {
            *ci += xi;
        }
    }
    for ci in c.iter_mut() {
        *ci /= sample.len() as f64;
    }
    c
}
