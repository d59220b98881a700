//! # Stamp Ledger
//!
//! The loyalty domain: reward programs, rewards, per-client stamp cards,
//! and the append-only stamp transaction ledger.
//!
//! ## Two Parallel Records
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stamp Bookkeeping                                    │
//! │                                                                         │
//! │  ClientStampCard (running balance)    StampTransaction (ledger)        │
//! │  ────────────────────────────────     ──────────────────────────       │
//! │  stamps_earned    (monotonic ↑)       one immutable row per event      │
//! │  stamps_redeemed  (monotonic ↑)       earned/redeemed deltas ≥ 0       │
//! │  available = earned − redeemed ≥ 0    reward_id set on redemptions     │
//! │                                                                         │
//! │  The persistence layer writes BOTH in one database transaction, so     │
//! │  the balance and the ledger can never diverge.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Expiry
//! A program may expire stamps: when the card's last accrual is older than
//! the configured window, the card has zero *usable* stamps until the next
//! accrual. The earned/redeemed counters are never rewritten — the card is
//! a historical ledger and lapse is a read-time rule.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;
use crate::money::Money;
use crate::validation::validate_stamp_count;

// =============================================================================
// Reward Program
// =============================================================================

/// A business's stamp-based loyalty program.
///
/// Soft-disabled via `is_active` rather than deleted, so historical cards
/// and ledger rows keep a valid parent.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct RewardProgram {
    pub id: String,
    pub business_id: String,
    pub name: String,
    /// Threshold per reward (program-level default).
    pub stamps_required: i64,
    /// Stamps granted per qualifying visit.
    pub stamps_per_visit: i64,
    /// Bonus stamps granted per `amount_threshold_cents` spent, if set.
    pub stamps_per_amount: Option<i64>,
    /// Spend step for the bonus accrual, if set.
    pub amount_threshold_cents: Option<i64>,
    pub stamps_expire: bool,
    pub stamps_expiry_days: Option<i64>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl RewardProgram {
    /// Computes the stamps earned by a completed qualifying purchase.
    ///
    /// Every visit earns `stamps_per_visit`. When both spend fields are
    /// configured, each full `amount_threshold_cents` of the total adds
    /// `stamps_per_amount` more.
    ///
    /// ## Example
    /// per_visit = 1, per_amount = 1, threshold = $25.00:
    /// a $99.80 checkout earns 1 + ⌊99.80 / 25⌋ = 4 stamps.
    pub fn stamps_for_purchase(&self, total: Money) -> i64 {
        let mut stamps = self.stamps_per_visit;

        if let (Some(per_amount), Some(threshold)) =
            (self.stamps_per_amount, self.amount_threshold_cents)
        {
            if threshold > 0 && total.is_positive() {
                stamps += (total.cents() / threshold) * per_amount;
            }
        }

        stamps
    }

    /// Returns the expiry window, if this program expires stamps.
    fn expiry_window(&self) -> Option<Duration> {
        if !self.stamps_expire {
            return None;
        }
        self.stamps_expiry_days.map(Duration::days)
    }
}

// =============================================================================
// Reward
// =============================================================================

/// A redeemable reward inside a program (e.g. "Free Nail Trim").
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Reward {
    pub id: String,
    pub program_id: String,
    pub name: String,
    pub stamps_required: i64,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Client Stamp Card
// =============================================================================

/// One client's running stamp balance for one program.
///
/// Created lazily on first accrual; never deleted. Both counters are
/// monotonically non-decreasing.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ClientStampCard {
    pub id: String,
    pub client_id: String,
    pub program_id: String,
    pub stamps_earned: i64,
    pub stamps_redeemed: i64,
    #[ts(as = "Option<String>")]
    pub last_stamp_earned_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency token; bumped on every persisted update.
    pub version: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl ClientStampCard {
    /// Creates a fresh card with zero balances (first accrual path).
    pub fn new(
        id: impl Into<String>,
        client_id: impl Into<String>,
        program_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        ClientStampCard {
            id: id.into(),
            client_id: client_id.into(),
            program_id: program_id.into(),
            stamps_earned: 0,
            stamps_redeemed: 0,
            last_stamp_earned_at: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Raw balance: earned − redeemed. Never negative after valid ops.
    #[inline]
    pub fn available_stamps(&self) -> i64 {
        self.stamps_earned - self.stamps_redeemed
    }

    /// Checks whether the balance has lapsed under the program's expiry
    /// window.
    pub fn stamps_lapsed(&self, program: &RewardProgram, now: DateTime<Utc>) -> bool {
        match (program.expiry_window(), self.last_stamp_earned_at) {
            (Some(window), Some(last)) => now - last > window,
            _ => false,
        }
    }

    /// Balance usable for redemption right now: zero if lapsed, else the
    /// raw balance.
    pub fn usable_stamps(&self, program: &RewardProgram, now: DateTime<Utc>) -> i64 {
        if self.stamps_lapsed(program, now) {
            0
        } else {
            self.available_stamps()
        }
    }

    /// Accrues stamps onto the card.
    ///
    /// ## Errors
    /// `count` must be ≥ 1.
    pub fn add_stamps(&mut self, count: i64, now: DateTime<Utc>) -> Result<(), CoreError> {
        validate_stamp_count(count)?;

        self.stamps_earned += count;
        self.last_stamp_earned_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Redeems a reward against the card.
    ///
    /// ## Preconditions
    /// - the program and the reward are active
    /// - `reward.stamps_required ≤` usable stamps (expiry included)
    ///
    /// On failure the card is untouched.
    pub fn redeem(
        &mut self,
        program: &RewardProgram,
        reward: &Reward,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        if !program.is_active {
            return Err(CoreError::ProgramInactive {
                program_id: program.id.clone(),
            });
        }
        if !reward.is_active {
            return Err(CoreError::RewardInactive {
                reward_id: reward.id.clone(),
            });
        }

        let usable = self.usable_stamps(program, now);
        if reward.stamps_required > usable {
            return Err(CoreError::InsufficientStamps {
                available: usable,
                required: reward.stamps_required,
            });
        }

        self.stamps_redeemed += reward.stamps_required;
        self.updated_at = now;
        Ok(())
    }
}

// =============================================================================
// Stamp Transaction (ledger row)
// =============================================================================

/// One immutable accrual or redemption event.
///
/// Exactly one of `stamps_earned` / `stamps_redeemed` is non-zero;
/// `reward_id` is set only on redemptions.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StampTransaction {
    pub id: String,
    pub client_id: String,
    pub program_id: String,
    /// Accrual delta, ≥ 0.
    pub stamps_earned: i64,
    /// Redemption delta, ≥ 0.
    pub stamps_redeemed: i64,
    pub reward_id: Option<String>,
    pub staff_id: String,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl StampTransaction {
    /// Builds an accrual ledger row.
    pub fn accrual(
        id: impl Into<String>,
        card: &ClientStampCard,
        count: i64,
        staff_id: impl Into<String>,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        StampTransaction {
            id: id.into(),
            client_id: card.client_id.clone(),
            program_id: card.program_id.clone(),
            stamps_earned: count,
            stamps_redeemed: 0,
            reward_id: None,
            staff_id: staff_id.into(),
            notes,
            created_at: now,
        }
    }

    /// Builds a redemption ledger row.
    pub fn redemption(
        id: impl Into<String>,
        card: &ClientStampCard,
        reward: &Reward,
        staff_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        StampTransaction {
            id: id.into(),
            client_id: card.client_id.clone(),
            program_id: card.program_id.clone(),
            stamps_earned: 0,
            stamps_redeemed: reward.stamps_required,
            reward_id: Some(reward.id.clone()),
            staff_id: staff_id.into(),
            notes: None,
            created_at: now,
        }
    }
}

// =============================================================================
// Available Rewards
// =============================================================================

/// Filters and orders the rewards a card can redeem right now.
///
/// Active rewards whose threshold fits the usable balance, cheapest first;
/// ties keep their original order. Pure and deterministic: unchanged inputs
/// return an identically ordered list.
pub fn available_rewards(
    card: &ClientStampCard,
    program: &RewardProgram,
    rewards: &[Reward],
    now: DateTime<Utc>,
) -> Vec<Reward> {
    let usable = card.usable_stamps(program, now);

    let mut eligible: Vec<Reward> = rewards
        .iter()
        .filter(|r| r.is_active && r.stamps_required <= usable)
        .cloned()
        .collect();

    // sort_by_key is stable: ties stay in input order
    eligible.sort_by_key(|r| r.stamps_required);
    eligible
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn program() -> RewardProgram {
        let now = Utc::now();
        RewardProgram {
            id: "prog-1".to_string(),
            business_id: "biz-1".to_string(),
            name: "Paw Points".to_string(),
            stamps_required: 10,
            stamps_per_visit: 1,
            stamps_per_amount: None,
            amount_threshold_cents: None,
            stamps_expire: false,
            stamps_expiry_days: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn reward(id: &str, required: i64) -> Reward {
        Reward {
            id: id.to_string(),
            program_id: "prog-1".to_string(),
            name: format!("Reward {}", id),
            stamps_required: required,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn card_with(earned: i64, redeemed: i64) -> ClientStampCard {
        let mut card = ClientStampCard::new("card-1", "client-1", "prog-1", Utc::now());
        card.stamps_earned = earned;
        card.stamps_redeemed = redeemed;
        card.last_stamp_earned_at = Some(Utc::now());
        card
    }

    #[test]
    fn test_add_stamps() {
        let now = Utc::now();
        let mut card = ClientStampCard::new("card-1", "client-1", "prog-1", now);

        card.add_stamps(3, now).unwrap();
        assert_eq!(card.stamps_earned, 3);
        assert_eq!(card.available_stamps(), 3);
        assert_eq!(card.last_stamp_earned_at, Some(now));

        assert!(card.add_stamps(0, now).is_err());
        assert!(card.add_stamps(-2, now).is_err());
    }

    /// 8 stamps available, reward needs 10 → rejected, card unchanged.
    #[test]
    fn test_redeem_insufficient_stamps_rejected() {
        let prog = program();
        let mut card = card_with(8, 0);
        let big = reward("r-big", 10);

        let err = card.redeem(&prog, &big, Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStamps {
                available: 8,
                required: 10
            }
        ));
        assert_eq!(card.stamps_earned, 8);
        assert_eq!(card.stamps_redeemed, 0);
    }

    #[test]
    fn test_redeem_happy_path_never_goes_negative() {
        let prog = program();
        let mut card = card_with(12, 0);
        let r = reward("r-1", 10);

        card.redeem(&prog, &r, Utc::now()).unwrap();
        assert_eq!(card.available_stamps(), 2);

        // Second redemption must fail; balance stays ≥ 0
        assert!(card.redeem(&prog, &r, Utc::now()).is_err());
        assert!(card.available_stamps() >= 0);
    }

    #[test]
    fn test_redeem_inactive_reward_or_program() {
        let mut prog = program();
        let mut card = card_with(20, 0);

        let mut r = reward("r-1", 5);
        r.is_active = false;
        assert!(matches!(
            card.redeem(&prog, &r, Utc::now()),
            Err(CoreError::RewardInactive { .. })
        ));

        prog.is_active = false;
        let active = reward("r-2", 5);
        assert!(matches!(
            card.redeem(&prog, &active, Utc::now()),
            Err(CoreError::ProgramInactive { .. })
        ));
    }

    #[test]
    fn test_available_rewards_sorted_and_stable() {
        let prog = program();
        let card = card_with(10, 0);

        let mut inactive = reward("r-off", 1);
        inactive.is_active = false;

        let rewards = vec![
            reward("r-ten", 10),
            reward("r-five-a", 5),
            inactive,
            reward("r-five-b", 5),
            reward("r-eleven", 11),
        ];

        let now = Utc::now();
        let available = available_rewards(&card, &prog, &rewards, now);
        let ids: Vec<&str> = available.iter().map(|r| r.id.as_str()).collect();

        // Cheapest first, ties in original order, inactive and
        // out-of-reach rewards excluded
        assert_eq!(ids, vec!["r-five-a", "r-five-b", "r-ten"]);

        // Idempotent: unchanged inputs → identical order
        let again = available_rewards(&card, &prog, &rewards, now);
        assert_eq!(
            again.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
            ids
        );
    }

    #[test]
    fn test_stamps_for_purchase_visit_only() {
        let prog = program();
        assert_eq!(prog.stamps_for_purchase(Money::from_cents(9980)), 1);
    }

    #[test]
    fn test_stamps_for_purchase_with_spend_bonus() {
        let mut prog = program();
        prog.stamps_per_amount = Some(1);
        prog.amount_threshold_cents = Some(2500); // one bonus per $25

        // $99.80 → 1 per visit + ⌊9980/2500⌋ = 1 + 3 = 4
        assert_eq!(prog.stamps_for_purchase(Money::from_cents(9980)), 4);
        // Below the threshold, visit stamp only
        assert_eq!(prog.stamps_for_purchase(Money::from_cents(2499)), 1);
        // Zero-total carts still count as a visit
        assert_eq!(prog.stamps_for_purchase(Money::zero()), 1);
    }

    #[test]
    fn test_expiry_lapses_usable_stamps() {
        let mut prog = program();
        prog.stamps_expire = true;
        prog.stamps_expiry_days = Some(30);

        let now = Utc::now();
        let mut card = card_with(8, 0);
        card.last_stamp_earned_at = Some(now - Duration::days(45));

        assert!(card.stamps_lapsed(&prog, now));
        assert_eq!(card.usable_stamps(&prog, now), 0);
        // Raw balance is untouched — lapse is a read-time rule
        assert_eq!(card.available_stamps(), 8);

        // Redemption against a lapsed card is rejected
        let r = reward("r-1", 5);
        assert!(matches!(
            card.redeem(&prog, &r, now),
            Err(CoreError::InsufficientStamps { available: 0, .. })
        ));

        // A fresh accrual restarts the window
        card.add_stamps(1, now).unwrap();
        assert_eq!(card.usable_stamps(&prog, now), 9);
    }
}
