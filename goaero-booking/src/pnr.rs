use goaero_core::PnrGenerator;
use rand::Rng;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const PREFIX_LEN: usize = 2;
const CODE_LEN: usize = 6;

/// Airline prefix plus random characters up to six, e.g. `GA7QX2`.
///
/// A one-letter airline code keeps its letter and gets one more random
/// character, so the code still starts with the operating airline.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPnrGenerator;

impl RandomPnrGenerator {
    pub fn new() -> Self {
        Self
    }

    fn prefix(airline_code: &str) -> String {
        airline_code
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .take(PREFIX_LEN)
            .collect::<String>()
            .to_ascii_uppercase()
    }
}

impl PnrGenerator for RandomPnrGenerator {
    fn generate(&self, airline_code: &str) -> String {
        let mut rng = rand::thread_rng();
        let mut code = Self::prefix(airline_code);
        while code.len() < CODE_LEN {
            let idx = rng.gen_range(0..ALPHABET.len());
            code.push(ALPHABET[idx] as char);
        }
        code
    }
}
