//! Per-account vesting registry
//!
//! Grants are kept in issuance order and claims draw from the oldest grant
//! first. Claim planning is separated from applying the plan so the ledger
//! can validate a whole request before touching any grant.

use super::{GrantId, VestingGrant};
use crate::account::Address;
use crate::clock::Timestamp;
use crate::config::LedgerConfig;
use crate::ledger::LedgerError;
use serde::{Deserialize, Serialize};

/// How much a claim asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimRequest {
    /// Exactly this amount, or fail
    Amount(u64),
    /// Everything currently claimable, possibly zero
    All,
}

/// Amount drawn from one grant by a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantDraw {
    pub grant_id: GrantId,
    pub amount: u64,
}

/// Validated claim, ready to apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimPlan {
    pub draws: Vec<GrantDraw>,
    pub total: u64,
}

/// Claim status of a single grant at a point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantClaimable {
    pub grant_id: GrantId,
    pub vesting_amount: u64,
    pub unlocked: u64,
    pub claimed: u64,
    pub claimable: u64,
    pub fully_vested_at: Timestamp,
}

/// Claimable totals across an account's live grants
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClaimableSummary {
    pub total: u64,
    pub grants: Vec<GrantClaimable>,
}

/// All grants owned by one account
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VestingRegistry {
    grants: Vec<VestingGrant>,
    /// Next id to hand out; persisted so ids survive restarts
    next_id: GrantId,
}

impl VestingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new grant and return it
    pub fn issue(
        &mut self,
        owner: Address,
        total_amount: u64,
        now: Timestamp,
        config: &LedgerConfig,
    ) -> &VestingGrant {
        let grant = VestingGrant::new(self.next_id, owner, total_amount, now, config);
        self.next_id += 1;
        self.grants.push(grant);
        &self.grants[self.grants.len() - 1]
    }

    /// Grants in ascending id order
    pub fn grants(&self) -> &[VestingGrant] {
        &self.grants
    }

    pub fn get(&self, id: GrantId) -> Option<&VestingGrant> {
        self.grants.iter().find(|g| g.id == id)
    }

    fn live_grants(&self) -> impl Iterator<Item = &VestingGrant> {
        self.grants.iter().filter(|g| !g.is_inert())
    }

    /// Sum of claimable amounts over all grants
    pub fn total_claimable(&self, now: Timestamp) -> u64 {
        self.live_grants()
            .map(|g| g.claimable_amount(now))
            .fold(0u64, |acc, c| acc.saturating_add(c))
    }

    /// Vesting amounts not yet unlocked
    pub fn locked_amount(&self, now: Timestamp) -> u64 {
        self.live_grants()
            .map(|g| g.vesting_amount - g.unlocked_amount(now))
            .fold(0u64, |acc, c| acc.saturating_add(c))
    }

    /// Vesting amounts not yet claimed, whether unlocked or not
    pub fn unclaimed_amount(&self) -> u64 {
        self.live_grants()
            .map(|g| g.unclaimed_amount())
            .fold(0u64, |acc, c| acc.saturating_add(c))
    }

    /// Per-grant breakdown; inert grants are left out
    pub fn summary(&self, now: Timestamp) -> ClaimableSummary {
        let grants: Vec<GrantClaimable> = self
            .live_grants()
            .map(|g| {
                GrantClaimable {
                    grant_id: g.id,
                    vesting_amount: g.vesting_amount,
                    unlocked: g.unlocked_amount(now),
                    claimed: g.claimed_amount,
                    claimable: g.claimable_amount(now),
                    fully_vested_at: g.fully_vested_at(),
                }
            })
            .collect();
        let total = grants
            .iter()
            .fold(0u64, |acc, g| acc.saturating_add(g.claimable));

        ClaimableSummary { total, grants }
    }

    /// Work out which grants a claim draws from, oldest first
    ///
    /// An explicit amount above the claimable total is rejected as a whole;
    /// `All` with nothing claimable yields an empty plan.
    pub fn plan_claim(&self, request: ClaimRequest, now: Timestamp) -> Result<ClaimPlan, LedgerError> {
        let available = self.total_claimable(now);
        let target = match request {
            ClaimRequest::Amount(0) => return Err(LedgerError::InvalidAmount),
            ClaimRequest::Amount(requested) if requested > available => {
                return Err(LedgerError::InsufficientClaimable { requested, available });
            }
            ClaimRequest::Amount(requested) => requested,
            ClaimRequest::All => available,
        };

        let mut remaining = target;
        let mut draws = Vec::new();
        for grant in self.live_grants() {
            if remaining == 0 {
                break;
            }
            let take = grant.claimable_amount(now).min(remaining);
            if take == 0 {
                continue;
            }
            draws.push(GrantDraw {
                grant_id: grant.id,
                amount: take,
            });
            remaining -= take;
        }

        Ok(ClaimPlan { draws, total: target })
    }

    /// Apply a plan produced by `plan_claim` against this same state
    pub fn apply_claim(&mut self, plan: &ClaimPlan) {
        for draw in &plan.draws {
            if let Some(grant) = self.grants.iter_mut().find(|g| g.id == draw.grant_id) {
                grant.claimed_amount = (grant.claimed_amount + draw.amount).min(grant.vesting_amount);
            }
        }
    }
}
