use chrono::Utc;

/// Database row identifier.
pub type DbId = i64;

/// Absolute wall-clock time in milliseconds since the Unix epoch.
///
/// Deletion deadlines and detection times are stored in this form so they
/// survive process restarts and compare with plain integer ordering.
pub type UnixMillis = i64;

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> UnixMillis {
    Utc::now().timestamp_millis()
}
