//! System-wide constants for the Rosca engine.

/// Length of an [`Address`](crate::Address) in bytes.
pub const ADDRESS_LEN: usize = 20;

/// Minimum number of members a circle must have at creation.
pub const MIN_MEMBERS: usize = 2;

/// Default initial capacity of the notification log.
pub const DEFAULT_NOTIFICATION_CAPACITY: usize = 1024;

/// Domain separator mixed into every notification digest.
pub const NOTIFICATION_DIGEST_DOMAIN: &[u8] = b"rosca:notification:v1:";

/// Seconds in one day. Handy for deposit intervals.
pub const SECONDS_PER_DAY: u64 = 86_400;
