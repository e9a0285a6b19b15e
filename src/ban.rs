//! Report tally and temporary bans
//!
//! Bans are keyed by origin address and expire lazily: an expired record is
//! only evicted the next time that address tries to connect.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::info;

use crate::types::OriginAddr;

/// Default number of reports that triggers a ban
pub const DEFAULT_REPORT_THRESHOLD: u32 = 3;

/// Default ban length (10 minutes)
pub const DEFAULT_BAN_DURATION: Duration = Duration::from_secs(10 * 60);

/// When an address gets banned and for how long
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BanPolicy {
    /// Reports needed before a ban is issued
    pub report_threshold: u32,
    /// How long a ban lasts
    pub ban_duration: Duration,
}

impl Default for BanPolicy {
    fn default() -> Self {
        Self {
            report_threshold: DEFAULT_REPORT_THRESHOLD,
            ban_duration: DEFAULT_BAN_DURATION,
        }
    }
}

/// Admission gate backed by report counts and ban records
#[derive(Debug, Default)]
pub struct BanGuard {
    policy: BanPolicy,
    /// Origin -> reports since the last ban
    ///
    /// The tally has no time window. An entry lives until its address is
    /// banned, or until that ban expires.
    reports: HashMap<OriginAddr, u32>,
    /// Origin -> ban expiry
    bans: HashMap<OriginAddr, Instant>,
}

impl BanGuard {
    pub fn new(policy: BanPolicy) -> Self {
        Self {
            policy,
            reports: HashMap::new(),
            bans: HashMap::new(),
        }
    }

    pub fn policy(&self) -> BanPolicy {
        self.policy
    }

    /// Decide whether a connection from `origin` may be admitted
    ///
    /// Evicts the ban record (and its tally) if it has expired.
    pub fn admit(&mut self, origin: &OriginAddr, now: Instant) -> bool {
        let Some(&expires_at) = self.bans.get(origin) else {
            return true;
        };

        if now < expires_at {
            return false;
        }

        self.bans.remove(origin);
        self.reports.remove(origin);
        info!("Ban on {} expired", origin);
        true
    }

    /// Count a report against `origin`
    ///
    /// Returns true if this report pushed the address over the threshold
    /// and a ban was recorded. Reports never age out on their own, so
    /// reports far apart in time still add up.
    pub fn record_report(&mut self, origin: &OriginAddr, now: Instant) -> bool {
        let count = self.reports.entry(origin.clone()).or_insert(0);
        *count += 1;
        info!("Report on {}: {}", origin, count);

        if *count < self.policy.report_threshold {
            return false;
        }

        self.reports.remove(origin);
        self.bans.insert(origin.clone(), now + self.policy.ban_duration);
        info!(
            "Banned {} for {}s",
            origin,
            self.policy.ban_duration.as_secs()
        );
        true
    }

    /// Reports counted against `origin` since its last ban
    pub fn report_count(&self, origin: &OriginAddr) -> u32 {
        self.reports.get(origin).copied().unwrap_or(0)
    }

    /// Whether a ban record (possibly expired, not yet evicted) exists
    pub fn has_ban_record(&self, origin: &OriginAddr) -> bool {
        self.bans.contains_key(origin)
    }
}
