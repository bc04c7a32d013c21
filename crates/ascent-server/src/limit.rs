use std::num::NonZeroU32;
use std::sync::Arc;

use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};
use uuid::Uuid;

/// Per-user limiter for unlock attempts, keyed by user id.
pub type UnlockLimiter = RateLimiter<Uuid, DefaultKeyedStateStore<Uuid>, DefaultClock>;

/// Applied when config carries a zero, which would otherwise lock every
/// user out of unlocking entirely.
const FALLBACK_PER_HOUR: NonZeroU32 = NonZeroU32::new(10).unwrap();

pub fn unlock_limiter(per_hour: u32) -> Arc<UnlockLimiter> {
    let quota = Quota::per_hour(NonZeroU32::new(per_hour).unwrap_or(FALLBACK_PER_HOUR));
    Arc::new(RateLimiter::keyed(quota))
}
