//! Rate-limit policy for sensitive endpoints.
//!
//! Only the decision is made here. Counting requests inside a window is the
//! transport's job.

use core::fmt;
use core::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateScope {
    Login,
    Register,
    VerifyTaxId,
    Search,
}

impl RateScope {
    pub const ALL: [RateScope; 4] = [
        RateScope::Login,
        RateScope::Register,
        RateScope::VerifyTaxId,
        RateScope::Search,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RateScope::Login => "login",
            RateScope::Register => "register",
            RateScope::VerifyTaxId => "verify_tax_id",
            RateScope::Search => "search",
        }
    }
}

impl fmt::Display for RateScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Second,
    Minute,
    Hour,
    Day,
}

impl Period {
    pub fn duration(self) -> Duration {
        match self {
            Period::Second => Duration::from_secs(1),
            Period::Minute => Duration::from_secs(60),
            Period::Hour => Duration::from_secs(60 * 60),
            Period::Day => Duration::from_secs(24 * 60 * 60),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Period::Second => "second",
            Period::Minute => "minute",
            Period::Hour => "hour",
            Period::Day => "day",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid rate '{0}': expected <count>/<second|minute|hour|day>")]
pub struct InvalidRate(pub String);

/// `N` requests per period, written `N/unit` (`5/minute`, `10/h`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rate {
    pub requests: u32,
    pub period: Period,
}

impl Rate {
    pub const fn new(requests: u32, period: Period) -> Self {
        Self { requests, period }
    }
}

impl FromStr for Rate {
    type Err = InvalidRate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidRate(s.to_string());
        let (count, unit) = s.trim().split_once('/').ok_or_else(invalid)?;
        let requests: u32 = count.trim().parse().map_err(|_| invalid())?;
        if requests == 0 {
            return Err(invalid());
        }
        // Only the first letter of the unit is significant.
        let period = match unit.trim().chars().next().map(|c| c.to_ascii_lowercase()) {
            Some('s') => Period::Second,
            Some('m') => Period::Minute,
            Some('h') => Period::Hour,
            Some('d') => Period::Day,
            _ => return Err(invalid()),
        };
        Ok(Self { requests, period })
    }
}

impl TryFrom<String> for Rate {
    type Error = InvalidRate;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rate> for String {
    fn from(value: Rate) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.requests, self.period.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allow,
    /// `retry_after` is the full window: the policy does not know when inside
    /// the window the earliest counted request fell.
    Throttle { retry_after: Duration },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allow)
    }
}

/// Per-scope limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitPolicy {
    pub login: Rate,
    pub register: Rate,
    pub verify_tax_id: Rate,
    pub search: Rate,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            login: Rate::new(5, Period::Minute),
            register: Rate::new(10, Period::Hour),
            verify_tax_id: Rate::new(10, Period::Hour),
            search: Rate::new(20, Period::Minute),
        }
    }
}

impl RateLimitPolicy {
    pub fn rate(&self, scope: RateScope) -> Rate {
        match scope {
            RateScope::Login => self.login,
            RateScope::Register => self.register,
            RateScope::VerifyTaxId => self.verify_tax_id,
            RateScope::Search => self.search,
        }
    }

    pub fn set_rate(&mut self, scope: RateScope, rate: Rate) {
        match scope {
            RateScope::Login => self.login = rate,
            RateScope::Register => self.register = rate,
            RateScope::VerifyTaxId => self.verify_tax_id = rate,
            RateScope::Search => self.search = rate,
        }
    }

    /// Decide on the next request given how many were already counted in the
    /// current window for this client and scope.
    pub fn decide(&self, scope: RateScope, requests_in_window: u32) -> RateDecision {
        let rate = self.rate(scope);
        if requests_in_window < rate.requests {
            RateDecision::Allow
        } else {
            tracing::debug!(scope = %scope, limit = %rate, "rate limit reached");
            RateDecision::Throttle {
                retry_after: rate.period.duration(),
            }
        }
    }
}
