//! # Loyalty Repository
//!
//! Database operations for reward programs, rewards, stamp cards, and the
//! stamp transaction ledger.
//!
//! ## The Dual-Write, Done Once
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │            Stamp Event Persistence (one SQL transaction)                │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    first accrual:  INSERT INTO client_stamps (...)                      │
//! │    otherwise:      UPDATE client_stamps                                 │
//! │                      SET earned/redeemed/last_earned, version += 1      │
//! │                      WHERE id = ? AND version = ?                       │
//! │                      └── 0 rows? → ROLLBACK (concurrent staff write)    │
//! │    INSERT INTO stamp_transactions (...)                                 │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  The running balance and the audit ledger move together or not at all; │
//! │  there is no partial-failure window between the two writes.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use gopet_core::{ClientStampCard, Reward, RewardProgram, StampTransaction};

/// Repository for loyalty database operations.
#[derive(Debug, Clone)]
pub struct LoyaltyRepository {
    pool: SqlitePool,
}

impl LoyaltyRepository {
    /// Creates a new LoyaltyRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LoyaltyRepository { pool }
    }

    // -------------------------------------------------------------------------
    // Reward programs
    // -------------------------------------------------------------------------

    /// Inserts a reward program.
    pub async fn create_program(&self, program: &RewardProgram) -> DbResult<()> {
        debug!(id = %program.id, name = %program.name, "Creating reward program");

        sqlx::query(
            r#"
            INSERT INTO reward_programs (
                id, business_id, name, stamps_required,
                stamps_per_visit, stamps_per_amount, amount_threshold_cents,
                stamps_expire, stamps_expiry_days, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&program.id)
        .bind(&program.business_id)
        .bind(&program.name)
        .bind(program.stamps_required)
        .bind(program.stamps_per_visit)
        .bind(program.stamps_per_amount)
        .bind(program.amount_threshold_cents)
        .bind(program.stamps_expire)
        .bind(program.stamps_expiry_days)
        .bind(program.is_active)
        .bind(program.created_at)
        .bind(program.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a program by ID.
    pub async fn get_program(&self, id: &str) -> DbResult<Option<RewardProgram>> {
        let program = sqlx::query_as::<_, RewardProgram>(
            r#"
            SELECT
                id, business_id, name, stamps_required,
                stamps_per_visit, stamps_per_amount, amount_threshold_cents,
                stamps_expire, stamps_expiry_days, is_active,
                created_at, updated_at
            FROM reward_programs
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(program)
    }

    /// Lists a business's programs, newest first.
    pub async fn list_programs(&self, business_id: &str) -> DbResult<Vec<RewardProgram>> {
        let programs = sqlx::query_as::<_, RewardProgram>(
            r#"
            SELECT
                id, business_id, name, stamps_required,
                stamps_per_visit, stamps_per_amount, amount_threshold_cents,
                stamps_expire, stamps_expiry_days, is_active,
                created_at, updated_at
            FROM reward_programs
            WHERE business_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(programs)
    }

    /// Soft-enables or soft-disables a program.
    pub async fn set_program_active(&self, id: &str, active: bool) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE reward_programs SET is_active = ?1, updated_at = ?2
            WHERE id = ?3
            "#,
        )
        .bind(active)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("RewardProgram", id));
        }

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Rewards
    // -------------------------------------------------------------------------

    /// Inserts a reward under a program.
    pub async fn create_reward(&self, reward: &Reward) -> DbResult<()> {
        debug!(id = %reward.id, program = %reward.program_id, "Creating reward");

        sqlx::query(
            r#"
            INSERT INTO rewards (
                id, program_id, name, stamps_required, is_active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&reward.id)
        .bind(&reward.program_id)
        .bind(&reward.name)
        .bind(reward.stamps_required)
        .bind(reward.is_active)
        .bind(reward.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a reward by ID.
    pub async fn get_reward(&self, id: &str) -> DbResult<Option<Reward>> {
        let reward = sqlx::query_as::<_, Reward>(
            r#"
            SELECT id, program_id, name, stamps_required, is_active, created_at
            FROM rewards
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(reward)
    }

    /// Lists a program's rewards, cheapest first (redemption order).
    ///
    /// Ties keep insertion order via the created_at tiebreak, matching the
    /// pure `available_rewards` ordering.
    pub async fn list_rewards(&self, program_id: &str) -> DbResult<Vec<Reward>> {
        let rewards = sqlx::query_as::<_, Reward>(
            r#"
            SELECT id, program_id, name, stamps_required, is_active, created_at
            FROM rewards
            WHERE program_id = ?1
            ORDER BY stamps_required, created_at
            "#,
        )
        .bind(program_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rewards)
    }

    // -------------------------------------------------------------------------
    // Stamp cards + ledger
    // -------------------------------------------------------------------------

    /// Gets the stamp card for a (client, program) pair, if one exists.
    ///
    /// Absence is normal: cards are created lazily on first accrual.
    pub async fn get_card(
        &self,
        client_id: &str,
        program_id: &str,
    ) -> DbResult<Option<ClientStampCard>> {
        let card = sqlx::query_as::<_, ClientStampCard>(
            r#"
            SELECT
                id, client_id, program_id,
                stamps_earned, stamps_redeemed, last_stamp_earned_at,
                version, created_at, updated_at
            FROM client_stamps
            WHERE client_id = ?1 AND program_id = ?2
            "#,
        )
        .bind(client_id)
        .bind(program_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(card)
    }

    /// Persists one stamp event: the mutated card and its ledger row, in a
    /// single database transaction.
    ///
    /// ## Arguments
    /// * `card` - the card after the core accrual/redemption mutation; its
    ///   `version` field still holds the value read from the database
    /// * `ledger` - the immutable event row to append
    /// * `is_new_card` - true on a first accrual (the card row does not
    ///   exist yet and is inserted instead of updated)
    ///
    /// ## Errors
    /// `VersionConflict` when another staff device wrote the card since it
    /// was read; nothing is persisted and the caller re-reads.
    pub async fn record_stamp_event(
        &self,
        card: &ClientStampCard,
        ledger: &StampTransaction,
        is_new_card: bool,
    ) -> DbResult<()> {
        debug!(
            card = %card.id,
            earned = ledger.stamps_earned,
            redeemed = ledger.stamps_redeemed,
            "Recording stamp event"
        );

        let mut tx = self.pool.begin().await?;

        if is_new_card {
            sqlx::query(
                r#"
                INSERT INTO client_stamps (
                    id, client_id, program_id,
                    stamps_earned, stamps_redeemed, last_stamp_earned_at,
                    version, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(&card.id)
            .bind(&card.client_id)
            .bind(&card.program_id)
            .bind(card.stamps_earned)
            .bind(card.stamps_redeemed)
            .bind(card.last_stamp_earned_at)
            .bind(card.version)
            .bind(card.created_at)
            .bind(card.updated_at)
            .execute(&mut *tx)
            .await?;
        } else {
            let result = sqlx::query(
                r#"
                UPDATE client_stamps SET
                    stamps_earned = ?1,
                    stamps_redeemed = ?2,
                    last_stamp_earned_at = ?3,
                    updated_at = ?4,
                    version = version + 1
                WHERE id = ?5 AND version = ?6
                "#,
            )
            .bind(card.stamps_earned)
            .bind(card.stamps_redeemed)
            .bind(card.last_stamp_earned_at)
            .bind(card.updated_at)
            .bind(&card.id)
            .bind(card.version)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                tx.rollback().await?;
                return Err(DbError::version_conflict("ClientStampCard", &card.id));
            }
        }

        sqlx::query(
            r#"
            INSERT INTO stamp_transactions (
                id, client_id, program_id,
                stamps_earned, stamps_redeemed, reward_id,
                staff_id, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&ledger.id)
        .bind(&ledger.client_id)
        .bind(&ledger.program_id)
        .bind(ledger.stamps_earned)
        .bind(ledger.stamps_redeemed)
        .bind(&ledger.reward_id)
        .bind(&ledger.staff_id)
        .bind(&ledger.notes)
        .bind(ledger.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Lists a card's ledger, newest first (client history view).
    pub async fn list_ledger(
        &self,
        client_id: &str,
        program_id: &str,
    ) -> DbResult<Vec<StampTransaction>> {
        let rows = sqlx::query_as::<_, StampTransaction>(
            r#"
            SELECT
                id, client_id, program_id,
                stamps_earned, stamps_redeemed, reward_id,
                staff_id, notes, created_at
            FROM stamp_transactions
            WHERE client_id = ?1 AND program_id = ?2
            ORDER BY created_at DESC
            "#,
        )
        .bind(client_id)
        .bind(program_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

/// Generates a new loyalty entity ID (program, reward, card, or ledger row).
pub fn generate_loyalty_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
