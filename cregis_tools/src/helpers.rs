use chrono::Utc;
use rand::{distributions::Alphanumeric, thread_rng, Rng};

/// Length of the nonce attached to every signed request.
pub const NONCE_LENGTH: usize = 6;

/// A random alphanumeric nonce. `Alphanumeric` samples uniformly over the 62-character alphabet, so no character is
/// favoured.
pub fn generate_nonce(length: usize) -> String {
    thread_rng().sample_iter(&Alphanumeric).take(length).map(char::from).collect()
}

/// The current Unix time in milliseconds, as the processor expects in the `timestamp` field.
pub fn unix_time_millis() -> i64 {
    Utc::now().timestamp_millis()
}
