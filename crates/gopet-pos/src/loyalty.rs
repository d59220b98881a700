//! # Loyalty Service
//!
//! Stamp accrual, redemption, and reward eligibility for client loyalty
//! cards.
//!
//! ## Operation Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Stamp Ledger Operations                             │
//! │                                                                         │
//! │  add_stamps          read program + card → core accrual →              │
//! │                      card + ledger row persisted atomically            │
//! │                                                                         │
//! │  redeem_reward       read program + reward + card → core checks        │
//! │                      (active flags, usable balance, expiry) →          │
//! │                      card + ledger row persisted atomically            │
//! │                                                                         │
//! │  award_purchase_stamps                                                  │
//! │                      stamps_for_purchase(total) from the program's     │
//! │                      visit/spend accrual rules, then the accrual path  │
//! │                                                                         │
//! │  available_rewards   pure eligibility over the fresh card              │
//! │                                                                         │
//! │  Every failure leaves both the balance and the ledger untouched.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ServiceError;
use gopet_core::{
    available_rewards, ClientStampCard, CoreError, Reward, RewardProgram, StampTransaction,
    Transaction,
};
use gopet_core::validation::{validate_item_name, validate_notes};
use gopet_db::repository::loyalty::generate_loyalty_id;
use gopet_db::Database;

// =============================================================================
// Inputs
// =============================================================================

/// Parameters for creating a reward program.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRewardProgram {
    pub business_id: String,
    pub name: String,
    /// Program-level reward threshold (default for its rewards).
    pub stamps_required: i64,
    pub stamps_per_visit: i64,
    pub stamps_per_amount: Option<i64>,
    pub amount_threshold_cents: Option<i64>,
    pub stamps_expire: bool,
    pub stamps_expiry_days: Option<i64>,
}

/// Parameters for creating a reward under a program.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReward {
    pub program_id: String,
    pub name: String,
    pub stamps_required: i64,
}

// =============================================================================
// Loyalty Service
// =============================================================================

/// Stamp ledger operations over the persisted card + ledger pair.
#[derive(Debug, Clone)]
pub struct LoyaltyService {
    db: Database,
}

impl LoyaltyService {
    /// Creates a new loyalty service.
    pub fn new(db: Database) -> Self {
        LoyaltyService { db }
    }

    // -------------------------------------------------------------------------
    // Program administration
    // -------------------------------------------------------------------------

    /// Creates a reward program.
    pub async fn create_program(
        &self,
        input: NewRewardProgram,
    ) -> Result<RewardProgram, ServiceError> {
        validate_item_name(&input.name).map_err(CoreError::Validation)?;

        let now = Utc::now();
        let program = RewardProgram {
            id: generate_loyalty_id(),
            business_id: input.business_id,
            name: input.name,
            stamps_required: input.stamps_required,
            stamps_per_visit: input.stamps_per_visit,
            stamps_per_amount: input.stamps_per_amount,
            amount_threshold_cents: input.amount_threshold_cents,
            stamps_expire: input.stamps_expire,
            stamps_expiry_days: input.stamps_expiry_days,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        self.db.loyalty().create_program(&program).await?;
        info!(program_id = %program.id, name = %program.name, "Reward program created");
        Ok(program)
    }

    /// Creates a reward under a program.
    pub async fn create_reward(&self, input: NewReward) -> Result<Reward, ServiceError> {
        validate_item_name(&input.name).map_err(CoreError::Validation)?;

        // Parent must exist; FKs would catch it later, but the typed error
        // is friendlier than a constraint message.
        self.db
            .loyalty()
            .get_program(&input.program_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("RewardProgram", &input.program_id))?;

        let reward = Reward {
            id: generate_loyalty_id(),
            program_id: input.program_id,
            name: input.name,
            stamps_required: input.stamps_required,
            is_active: true,
            created_at: Utc::now(),
        };

        self.db.loyalty().create_reward(&reward).await?;
        Ok(reward)
    }

    /// Soft-enables or soft-disables a program.
    pub async fn set_program_active(
        &self,
        program_id: &str,
        active: bool,
    ) -> Result<(), ServiceError> {
        self.db
            .loyalty()
            .set_program_active(program_id, active)
            .await?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Stamps
    // -------------------------------------------------------------------------

    /// Adds stamps to a client's card (created lazily on first accrual).
    ///
    /// Returns the fresh card as persisted.
    pub async fn add_stamps(
        &self,
        client_id: &str,
        program_id: &str,
        count: i64,
        staff_id: &str,
        notes: Option<String>,
    ) -> Result<ClientStampCard, ServiceError> {
        let program = self.require_program(program_id).await?;
        if !program.is_active {
            return Err(CoreError::ProgramInactive {
                program_id: program.id,
            }
            .into());
        }
        if let Some(n) = &notes {
            validate_notes(n).map_err(CoreError::Validation)?;
        }

        let now = Utc::now();
        let existing = self.db.loyalty().get_card(client_id, program_id).await?;
        let is_new = existing.is_none();
        let mut card = existing.unwrap_or_else(|| {
            ClientStampCard::new(generate_loyalty_id(), client_id, program_id, now)
        });

        card.add_stamps(count, now)?;
        let ledger =
            StampTransaction::accrual(generate_loyalty_id(), &card, count, staff_id, notes, now);

        self.db
            .loyalty()
            .record_stamp_event(&card, &ledger, is_new)
            .await?;

        info!(
            client_id = %client_id,
            program_id = %program_id,
            count = count,
            "Stamps added"
        );
        self.require_card(client_id, program_id).await
    }

    /// Redeems a reward against a client's card.
    ///
    /// Returns the fresh card as persisted. On any precondition failure
    /// (inactive program/reward, insufficient or lapsed stamps) nothing
    /// changes.
    pub async fn redeem_reward(
        &self,
        client_id: &str,
        program_id: &str,
        reward_id: &str,
        staff_id: &str,
    ) -> Result<ClientStampCard, ServiceError> {
        let program = self.require_program(program_id).await?;

        let reward = self
            .db
            .loyalty()
            .get_reward(reward_id)
            .await?
            .filter(|r| r.program_id == program_id)
            .ok_or_else(|| ServiceError::not_found("Reward", reward_id))?;

        let now = Utc::now();
        // A client with no card yet has nothing to redeem.
        let mut card = self
            .db
            .loyalty()
            .get_card(client_id, program_id)
            .await?
            .ok_or(CoreError::InsufficientStamps {
                available: 0,
                required: reward.stamps_required,
            })?;

        card.redeem(&program, &reward, now)?;
        let ledger =
            StampTransaction::redemption(generate_loyalty_id(), &card, &reward, staff_id, now);

        self.db
            .loyalty()
            .record_stamp_event(&card, &ledger, false)
            .await?;

        info!(
            client_id = %client_id,
            reward_id = %reward_id,
            stamps = reward.stamps_required,
            "Reward redeemed"
        );
        self.require_card(client_id, program_id).await
    }

    /// Accrues purchase stamps for a completed checkout, per the program's
    /// visit/spend rules.
    ///
    /// Returns `None` (and accrues nothing) when the transaction has no
    /// client, the program is disabled, or the rules yield zero stamps.
    pub async fn award_purchase_stamps(
        &self,
        transaction: &Transaction,
        program_id: &str,
        staff_id: &str,
    ) -> Result<Option<ClientStampCard>, ServiceError> {
        let client_id = match &transaction.client_id {
            Some(id) => id.clone(),
            None => return Ok(None),
        };

        let program = self.require_program(program_id).await?;
        if !program.is_active {
            debug!(program_id = %program_id, "Program disabled, skipping purchase accrual");
            return Ok(None);
        }

        let count = program.stamps_for_purchase(transaction.total());
        if count < 1 {
            return Ok(None);
        }

        let card = self
            .add_stamps(
                &client_id,
                program_id,
                count,
                staff_id,
                Some(format!("Checkout {}", transaction.id)),
            )
            .await?;
        Ok(Some(card))
    }

    /// Lists the rewards a client can redeem right now, cheapest first.
    pub async fn available_rewards(
        &self,
        client_id: &str,
        program_id: &str,
    ) -> Result<Vec<Reward>, ServiceError> {
        let program = self.require_program(program_id).await?;
        let rewards = self.db.loyalty().list_rewards(program_id).await?;

        let now = Utc::now();
        let card = self
            .db
            .loyalty()
            .get_card(client_id, program_id)
            .await?
            .unwrap_or_else(|| {
                // No card yet: zero balance, nothing redeemable beyond
                // zero-stamp rewards
                ClientStampCard::new(generate_loyalty_id(), client_id, program_id, now)
            });

        Ok(available_rewards(&card, &program, &rewards, now))
    }

    /// Gets a client's stamp card, if one exists.
    pub async fn stamp_card(
        &self,
        client_id: &str,
        program_id: &str,
    ) -> Result<Option<ClientStampCard>, ServiceError> {
        Ok(self.db.loyalty().get_card(client_id, program_id).await?)
    }

    /// Lists a card's audit ledger, newest first.
    pub async fn ledger(
        &self,
        client_id: &str,
        program_id: &str,
    ) -> Result<Vec<StampTransaction>, ServiceError> {
        Ok(self.db.loyalty().list_ledger(client_id, program_id).await?)
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    async fn require_program(&self, program_id: &str) -> Result<RewardProgram, ServiceError> {
        self.db
            .loyalty()
            .get_program(program_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("RewardProgram", program_id))
    }

    async fn require_card(
        &self,
        client_id: &str,
        program_id: &str,
    ) -> Result<ClientStampCard, ServiceError> {
        self.db
            .loyalty()
            .get_card(client_id, program_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("ClientStampCard", client_id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use gopet_core::{PaymentMethod, TransactionStatus, DEFAULT_BUSINESS_ID};
    use gopet_db::DbConfig;

    async fn service() -> LoyaltyService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        LoyaltyService::new(db)
    }

    fn program_input() -> NewRewardProgram {
        NewRewardProgram {
            business_id: DEFAULT_BUSINESS_ID.to_string(),
            name: "Paw Points".to_string(),
            stamps_required: 10,
            stamps_per_visit: 1,
            stamps_per_amount: None,
            amount_threshold_cents: None,
            stamps_expire: false,
            stamps_expiry_days: None,
        }
    }

    #[tokio::test]
    async fn test_accrual_creates_card_lazily_and_writes_ledger() {
        let svc = service().await;
        let program = svc.create_program(program_input()).await.unwrap();

        let card = svc
            .add_stamps("client-1", &program.id, 3, "staff-1", None)
            .await
            .unwrap();
        assert_eq!(card.available_stamps(), 3);

        let card = svc
            .add_stamps("client-1", &program.id, 2, "staff-1", Some("rainy day bonus".into()))
            .await
            .unwrap();
        assert_eq!(card.available_stamps(), 5);

        let ledger = svc.ledger("client-1", &program.id).await.unwrap();
        assert_eq!(ledger.len(), 2);
        let earned_total: i64 = ledger.iter().map(|l| l.stamps_earned).sum();
        assert_eq!(earned_total, 5);
    }

    /// 8 stamps available, 10 required → rejected, state unchanged.
    #[tokio::test]
    async fn test_redemption_insufficient_stamps() {
        let svc = service().await;
        let program = svc.create_program(program_input()).await.unwrap();
        let reward = svc
            .create_reward(NewReward {
                program_id: program.id.clone(),
                name: "Free Full Groom".to_string(),
                stamps_required: 10,
            })
            .await
            .unwrap();

        svc.add_stamps("client-1", &program.id, 8, "staff-1", None)
            .await
            .unwrap();

        let err = svc
            .redeem_reward("client-1", &program.id, &reward.id, "staff-1")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::LoyaltyError);

        let card = svc.stamp_card("client-1", &program.id).await.unwrap().unwrap();
        assert_eq!(card.available_stamps(), 8);
        assert_eq!(card.stamps_redeemed, 0);

        // Only the accrual is in the ledger
        let ledger = svc.ledger("client-1", &program.id).await.unwrap();
        assert_eq!(ledger.len(), 1);
    }

    #[tokio::test]
    async fn test_redemption_happy_path() {
        let svc = service().await;
        let program = svc.create_program(program_input()).await.unwrap();
        let reward = svc
            .create_reward(NewReward {
                program_id: program.id.clone(),
                name: "Free Nail Trim".to_string(),
                stamps_required: 5,
            })
            .await
            .unwrap();

        svc.add_stamps("client-1", &program.id, 7, "staff-1", None)
            .await
            .unwrap();

        let card = svc
            .redeem_reward("client-1", &program.id, &reward.id, "staff-2")
            .await
            .unwrap();
        assert_eq!(card.available_stamps(), 2);
        assert_eq!(card.stamps_redeemed, 5);

        let ledger = svc.ledger("client-1", &program.id).await.unwrap();
        let redemption = ledger
            .iter()
            .find(|l| l.stamps_redeemed > 0)
            .expect("redemption row");
        assert_eq!(redemption.reward_id.as_deref(), Some(reward.id.as_str()));
        assert_eq!(redemption.staff_id, "staff-2");
    }

    #[tokio::test]
    async fn test_available_rewards_ordering() {
        let svc = service().await;
        let program = svc.create_program(program_input()).await.unwrap();
        for (name, required) in [("Free Groom", 10i64), ("Free Trim", 5), ("Free Treat", 3)] {
            svc.create_reward(NewReward {
                program_id: program.id.clone(),
                name: name.to_string(),
                stamps_required: required,
            })
            .await
            .unwrap();
        }

        // No card yet → nothing redeemable
        let none = svc.available_rewards("client-1", &program.id).await.unwrap();
        assert!(none.is_empty());

        svc.add_stamps("client-1", &program.id, 6, "staff-1", None)
            .await
            .unwrap();

        let some = svc.available_rewards("client-1", &program.id).await.unwrap();
        let names: Vec<&str> = some.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Free Treat", "Free Trim"]);
    }

    #[tokio::test]
    async fn test_award_purchase_stamps() {
        let svc = service().await;
        let mut input = program_input();
        input.stamps_per_amount = Some(1);
        input.amount_threshold_cents = Some(2500); // one bonus per $25 spent
        let program = svc.create_program(input).await.unwrap();

        let transaction = Transaction {
            id: "TRX-TEST-0001".to_string(),
            client_id: Some("client-1".to_string()),
            register_session_id: None,
            subtotal_cents: 9198,
            discount_cents: 0,
            tax_cents: 782,
            total_cents: 9980,
            payment_method: PaymentMethod::Card,
            tendered_cents: None,
            change_cents: None,
            payment_reference: None,
            status: TransactionStatus::Completed,
            created_at: Utc::now(),
        };

        // 1 visit stamp + ⌊$99.80 / $25⌋ = 4 total
        let card = svc
            .award_purchase_stamps(&transaction, &program.id, "staff-1")
            .await
            .unwrap()
            .expect("stamps awarded");
        assert_eq!(card.available_stamps(), 4);

        // Anonymous checkout accrues nothing
        let mut anonymous = transaction.clone();
        anonymous.client_id = None;
        let none = svc
            .award_purchase_stamps(&anonymous, &program.id, "staff-1")
            .await
            .unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn test_disabled_program_blocks_manual_accrual() {
        let svc = service().await;
        let program = svc.create_program(program_input()).await.unwrap();
        svc.set_program_active(&program.id, false).await.unwrap();

        let err = svc
            .add_stamps("client-1", &program.id, 1, "staff-1", None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::LoyaltyError);
    }

    #[tokio::test]
    async fn test_stamps_for_purchase_zero_visit_stamps() {
        let svc = service().await;
        let mut input = program_input();
        input.stamps_per_visit = 0;
        let program = svc.create_program(input).await.unwrap();

        let transaction = Transaction {
            id: "TRX-TEST-0002".to_string(),
            client_id: Some("client-1".to_string()),
            register_session_id: None,
            subtotal_cents: 1000,
            discount_cents: 0,
            tax_cents: 0,
            total_cents: 1000,
            payment_method: PaymentMethod::Card,
            tendered_cents: None,
            change_cents: None,
            payment_reference: None,
            status: TransactionStatus::Completed,
            created_at: Utc::now(),
        };

        // Zero stamps → no card created, no ledger row
        let none = svc
            .award_purchase_stamps(&transaction, &program.id, "staff-1")
            .await
            .unwrap();
        assert!(none.is_none());
        assert!(svc
            .stamp_card("client-1", &program.id)
            .await
            .unwrap()
            .is_none());
    }
}
