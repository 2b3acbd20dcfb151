//! Offline generator used with the `mock` model name.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::agent::{ActionGeneration, ActionGenerator, Generation};

/// Model name that selects [`MockActionGenerator`].
pub const MOCK_MODEL: &str = "mock";

/// Commands the mock cycles through. Never ends the game on its own.
const VOCABULARY: &[&str] = &[
    "look",
    "open mailbox",
    "take leaflet",
    "read leaflet",
    "go north",
    "go east",
    "open window",
    "enter house",
    "take lamp",
    "light lamp",
    "inventory",
    "go west",
];

/// Deterministic generator that ignores the prompt.
///
/// Without a seed it walks [`VOCABULARY`] in order; with a seed the order is
/// shuffled once by a seeded RNG, so equal seeds replay equal episodes.
#[derive(Debug, Clone)]
pub struct MockActionGenerator {
    commands: Vec<&'static str>,
    cursor: usize,
}

impl MockActionGenerator {
    pub fn new(seed: Option<&str>) -> Self {
        let mut commands = VOCABULARY.to_vec();
        if let Some(seed) = seed {
            let mut rng = StdRng::seed_from_u64(seed_to_u64(seed));
            commands.shuffle(&mut rng);
        }
        Self {
            commands,
            cursor: 0,
        }
    }
}

impl Default for MockActionGenerator {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ActionGenerator for MockActionGenerator {
    async fn generate(&mut self, _model_name: &str, _prompt: &str) -> Generation {
        let action = self.commands[self.cursor % self.commands.len()];
        self.cursor += 1;
        Generation::Generated(ActionGeneration::untracked(action))
    }
}

/// Numeric seeds are used as-is; anything else is folded with FNV-1a.
fn seed_to_u64(seed: &str) -> u64 {
    if let Ok(n) = seed.trim().parse::<u64>() {
        return n;
    }
    seed.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}
