use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex};

/// Random source shared by every service that draws or shuffles.
pub type SharedRng = Arc<Mutex<StdRng>>;

/// Seeded when `seed` is given, so a whole run can be replayed.
pub fn shared_rng(seed: Option<u64>) -> SharedRng {
    let rng = match seed {
        Some(seed) => {
            tracing::info!(seed, "Using seeded random source");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };
    Arc::new(Mutex::new(rng))
}
