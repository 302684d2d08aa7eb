//! Per-address proposal submission limits.
//!
//! Three checks run, in order, against the creator's existing proposals:
//! total count, count created in the trailing 24 hours, and time since the
//! most recent submission. The first violated check wins.

use econexus_types::time::{MS_PER_DAY, MS_PER_MINUTE, MS_PER_SECOND};
use econexus_types::{Proposal, Timestamp, WalletAddress};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::params::RateLimits;

/// Why a submission was refused.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RateLimitViolation {
    #[error("Maximum {max} proposals per user reached")]
    TotalLimit { max: u32 },

    #[error("Maximum {max} proposals per day reached")]
    DailyLimit { max: u32 },

    #[error("Please wait {seconds} seconds before submitting another proposal")]
    WaitSeconds { seconds: u64 },

    #[error("Please wait {minutes} minute(s) before submitting another proposal")]
    WaitMinutes { minutes: u64 },
}

/// How much of its quota one address has used.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CreatorUsage {
    pub total: usize,
    /// Proposals with `creationTime > now - 24h`.
    pub today: usize,
    pub last_created: Option<Timestamp>,
}

impl CreatorUsage {
    pub fn measure(proposals: &[Proposal], creator: &WalletAddress, now: Timestamp) -> Self {
        let one_day_ago = now.minus_millis(MS_PER_DAY);
        proposals
            .iter()
            .filter(|p| &p.creator == creator)
            .fold(Self::default(), |mut usage, p| {
                usage.total += 1;
                if p.creation_time > one_day_ago {
                    usage.today += 1;
                }
                usage.last_created = usage.last_created.max(Some(p.creation_time));
                usage
            })
    }
}

/// Decide whether an address with `usage` may submit at `now`.
pub fn check_submission(
    usage: &CreatorUsage,
    now: Timestamp,
    limits: &RateLimits,
) -> Result<(), RateLimitViolation> {
    if usage.total >= limits.max_per_user as usize {
        return Err(RateLimitViolation::TotalLimit {
            max: limits.max_per_user,
        });
    }

    if usage.today >= limits.max_per_day as usize {
        return Err(RateLimitViolation::DailyLimit {
            max: limits.max_per_day,
        });
    }

    if let Some(last) = usage.last_created {
        let since_last = last.elapsed_since(now);
        if since_last < limits.min_time_between_ms {
            let remaining = limits.min_time_between_ms - since_last;
            return Err(if remaining < MS_PER_MINUTE {
                RateLimitViolation::WaitSeconds {
                    seconds: remaining.div_ceil(MS_PER_SECOND),
                }
            } else {
                RateLimitViolation::WaitMinutes {
                    minutes: remaining.div_ceil(MS_PER_MINUTE),
                }
            });
        }
    }

    Ok(())
}

/// Snapshot of an address's limits and current usage, for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProposalLimits {
    pub max_per_user: u32,
    pub max_per_day: u32,
    pub current_total: usize,
    pub current_today: usize,
    /// Earliest time the address may submit again (`now` if already allowed).
    pub can_submit_next: Timestamp,
    pub remaining_today: usize,
    pub remaining_total: usize,
}

impl UserProposalLimits {
    pub fn from_usage(usage: &CreatorUsage, now: Timestamp, limits: &RateLimits) -> Self {
        let can_submit_next = usage
            .last_created
            .map(|last| last.plus_millis(limits.min_time_between_ms))
            .filter(|next| *next > now)
            .unwrap_or(now);

        Self {
            max_per_user: limits.max_per_user,
            max_per_day: limits.max_per_day,
            current_total: usage.total,
            current_today: usage.today,
            can_submit_next,
            remaining_today: (limits.max_per_day as usize).saturating_sub(usage.today),
            remaining_total: (limits.max_per_user as usize).saturating_sub(usage.total),
        }
    }

    /// Snapshot for an address with no recorded usage.
    pub fn unused(now: Timestamp, limits: &RateLimits) -> Self {
        Self::from_usage(&CreatorUsage::default(), now, limits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use econexus_types::{ProposalId, ProposalStatus};

    const NOW: u64 = 10 * MS_PER_DAY;

    fn proposal(creator: &str, created_ms: u64) -> Proposal {
        Proposal {
            id: ProposalId::new(created_ms),
            title: "t".into(),
            description: "d".into(),
            creator: WalletAddress::new(creator),
            funding_amount: 1.0,
            vote_yes: 0,
            vote_no: 0,
            status: ProposalStatus::Active,
            end_time: Timestamp::from_millis(created_ms + MS_PER_DAY),
            category: "other".into(),
            ai_score: None,
            creation_time: Timestamp::from_millis(created_ms),
            preserved_by: vec![WalletAddress::new(creator)],
            expected_impact: None,
            location: None,
        }
    }

    fn now() -> Timestamp {
        Timestamp::from_millis(NOW)
    }

    #[test]
    fn usage_counts_only_the_creator_and_the_trailing_day() {
        let proposals = vec![
            proposal("A", NOW - 2 * MS_PER_DAY),
            proposal("A", NOW - MS_PER_DAY), // exactly on the boundary: not "today"
            proposal("A", NOW - MS_PER_DAY + 1),
            proposal("B", NOW - 10),
        ];
        let usage = CreatorUsage::measure(&proposals, &WalletAddress::new("A"), now());
        assert_eq!(usage.total, 3);
        assert_eq!(usage.today, 1);
        assert_eq!(
            usage.last_created,
            Some(Timestamp::from_millis(NOW - MS_PER_DAY + 1))
        );
    }

    #[test]
    fn total_limit_checked_first() {
        let usage = CreatorUsage {
            total: 10,
            today: 3,
            last_created: Some(now()),
        };
        assert_eq!(
            check_submission(&usage, now(), &RateLimits::STANDARD),
            Err(RateLimitViolation::TotalLimit { max: 10 })
        );
    }

    #[test]
    fn daily_limit() {
        let usage = CreatorUsage {
            total: 3,
            today: 3,
            last_created: Some(now().minus_millis(MS_PER_DAY / 2)),
        };
        assert_eq!(
            check_submission(&usage, now(), &RateLimits::STANDARD),
            Err(RateLimitViolation::DailyLimit { max: 3 })
        );
    }

    #[test]
    fn wait_message_uses_minutes_then_seconds() {
        let limits = RateLimits::STANDARD; // 30 minutes
        let usage = CreatorUsage {
            total: 1,
            today: 1,
            last_created: Some(now().minus_millis(10 * MS_PER_MINUTE + 1)),
        };
        let err = check_submission(&usage, now(), &limits).unwrap_err();
        assert_eq!(err, RateLimitViolation::WaitMinutes { minutes: 20 });
        assert_eq!(
            err.to_string(),
            "Please wait 20 minute(s) before submitting another proposal"
        );

        let usage = CreatorUsage {
            last_created: Some(now().minus_millis(30 * MS_PER_MINUTE - 12_500)),
            ..usage
        };
        let err = check_submission(&usage, now(), &limits).unwrap_err();
        assert_eq!(err, RateLimitViolation::WaitSeconds { seconds: 13 });
        assert_eq!(
            err.to_string(),
            "Please wait 13 seconds before submitting another proposal"
        );
    }

    #[test]
    fn allowed_once_spacing_elapsed() {
        let usage = CreatorUsage {
            total: 1,
            today: 1,
            last_created: Some(now().minus_millis(30 * MS_PER_MINUTE)),
        };
        assert!(check_submission(&usage, now(), &RateLimits::STANDARD).is_ok());
    }

    #[test]
    fn snapshot_floors_remaining_and_projects_next_slot() {
        let usage = CreatorUsage {
            total: 12,
            today: 5,
            last_created: Some(now().minus_millis(MS_PER_MINUTE)),
        };
        let snap = UserProposalLimits::from_usage(&usage, now(), &RateLimits::STANDARD);
        assert_eq!(snap.remaining_total, 0);
        assert_eq!(snap.remaining_today, 0);
        assert_eq!(snap.can_submit_next, now().plus_millis(29 * MS_PER_MINUTE));

        let fresh = UserProposalLimits::unused(now(), &RateLimits::STANDARD);
        assert_eq!(fresh.can_submit_next, now());
        assert_eq!(fresh.remaining_today, 3);
        assert_eq!(fresh.remaining_total, 10);
    }
}
