use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

pub fn get_duration_since_epoch() -> Duration {
    // a clock before 1970 is treated as the epoch itself
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default()
}

/// Unix seconds `offset` from now.
pub fn unix_secs_after(offset: Duration) -> u64 {
    (get_duration_since_epoch() + offset).as_secs()
}
