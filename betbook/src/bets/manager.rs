//! Bet manager implementation.

use super::{
    errors::{BetError, BetResult},
    models::{
        Bet, BetId, BetLeg, Booking, Cashout, CashoutStatus, LegSpec, LegUpdate, NormalizedLeg,
        OddQuote, PlacedBet, TicketUpdate, VerifyCode, aggregate_odd, format_ticket_date,
        is_valid_ticket_date,
    },
};
use crate::auth::UserId;
use crate::wallet::{WalletError, WalletManager};
use chrono::{Duration, Utc};
use rand::Rng;
use sqlx::{PgPool, Postgres, Row, Transaction};
use std::sync::Arc;

/// Column list matching [`Bet::from_row`]
const BET_COLUMNS: &str =
    "id, user_id, bet_code, date, stake, odd, booking_code, percentage, placed_at";

/// Column list matching [`BetLeg::from_row`]
const LEG_COLUMNS: &str = "id, bet_id, user_id, game_id, kickoff, teams, ft_score, pick, market, \
     outcome, status, odd, sport, live_odd, chat_count, created_at";

/// Verify codes stop validating this long after issue
const VERIFY_CODE_TTL_HOURS: i64 = 24;

/// Bet manager
///
/// Every workflow that moves money (placement, stake edits, deletion refunds)
/// runs in a single transaction using the wallet's transaction-scoped debit
/// and credit, so a failed step leaves the balance untouched.
#[derive(Clone)]
pub struct BetManager {
    pool: Arc<PgPool>,
    wallet: WalletManager,
}

impl BetManager {
    /// Create a new bet manager
    pub fn new(pool: Arc<PgPool>, wallet: WalletManager) -> Self {
        Self { pool, wallet }
    }

    /// Place a bet: debit the stake, create the ticket and its legs, and
    /// upsert the booking and cash-out side records
    ///
    /// Codes not supplied by the caller are generated (random six digit
    /// strings). When no odd is supplied it is the product of the leg odds
    /// rounded to 2 decimals.
    ///
    /// # Errors
    ///
    /// * `BetError::InvalidStake` - Stake not positive
    /// * `BetError::Wallet` - Insufficient balance; nothing is mutated
    pub async fn place_bet(
        &self,
        user_id: UserId,
        date: &str,
        stake: i64,
        odd: Option<f64>,
        bet_code: Option<String>,
        booking_code: Option<String>,
        legs: Vec<LegSpec>,
    ) -> BetResult<PlacedBet> {
        if date.trim().is_empty() {
            return Err(BetError::MissingField("date"));
        }
        if stake <= 0 {
            return Err(BetError::InvalidStake);
        }

        let legs: Vec<NormalizedLeg> = legs.into_iter().map(LegSpec::normalize).collect();

        let odd = match odd {
            Some(odd) if odd.is_finite() && odd > 0.0 => odd,
            Some(_) => return Err(BetError::InvalidOdd),
            None => aggregate_odd(&legs),
        };

        let bet_code = match bet_code.filter(|code| !code.trim().is_empty()) {
            Some(code) => code,
            None => Self::generate_code(),
        };
        let booking_code = match booking_code.filter(|code| !code.trim().is_empty()) {
            Some(code) => code,
            None => Self::generate_code(),
        };

        let mut tx = self.pool.begin().await?;

        // A user without a balance record has a zero balance
        let balance = match self.wallet.debit_in(&mut tx, user_id, stake).await {
            Ok(balance) => balance,
            Err(WalletError::BalanceNotFound(_)) => {
                return Err(BetError::Wallet(WalletError::InsufficientBalance {
                    available: 0,
                    required: stake,
                }));
            }
            Err(err) => return Err(err.into()),
        };

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO bets (user_id, bet_code, date, stake, odd, booking_code)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {BET_COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(&bet_code)
        .bind(date)
        .bind(stake)
        .bind(odd)
        .bind(&booking_code)
        .fetch_one(&mut *tx)
        .await?;
        let bet = Bet::from_row(&row);

        let mut saved_legs = Vec::with_capacity(legs.len());
        for leg in &legs {
            let row = self
                .insert_leg_in(&mut tx, bet.id, Some(user_id), leg)
                .await?;
            saved_legs.push(row);
        }

        sqlx::query("INSERT INTO bookings (bet_id) VALUES ($1) ON CONFLICT (bet_id) DO NOTHING")
            .bind(bet.id)
            .execute(&mut *tx)
            .await?;

        self.reset_cashout_in(&mut tx, bet.id).await?;

        tx.commit().await?;

        log::info!("Placed bet {} for user {} with stake {}", bet.id, user_id, stake);

        Ok(PlacedBet {
            bet,
            legs: saved_legs,
            balance,
        })
    }

    /// Place against an existing ticket
    ///
    /// A ticket owned by someone else is cloned under the caller (fresh
    /// betCode and date, caller's stake, legs reset to "Not Started") and the
    /// caller's balance is debited for the full stake. The caller's own
    /// ticket is re-priced instead: the stake delta is debited or credited
    /// and the leg statuses reset. Returns the resulting ticket and whether
    /// it was copied.
    pub async fn place_from_existing(
        &self,
        bet_id: BetId,
        user_id: UserId,
        stake: i64,
    ) -> BetResult<(Bet, bool)> {
        if stake <= 0 {
            return Err(BetError::InvalidStake);
        }

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "SELECT {BET_COLUMNS} FROM bets WHERE id = $1 FOR UPDATE",
        ))
        .bind(bet_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(BetError::BetNotFound)?;
        let source = Bet::from_row(&row);

        let date = format_ticket_date(Utc::now());

        if source.user_id != user_id {
            match self.wallet.debit_in(&mut tx, user_id, stake).await {
                Ok(_) => {}
                Err(WalletError::BalanceNotFound(_)) => {
                    return Err(BetError::Wallet(WalletError::InsufficientBalance {
                        available: 0,
                        required: stake,
                    }));
                }
                Err(err) => return Err(err.into()),
            }

            let row = sqlx::query(&format!(
                r#"
                INSERT INTO bets (user_id, bet_code, date, stake, odd, booking_code, percentage)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING {BET_COLUMNS}
                "#,
            ))
            .bind(user_id)
            .bind(Self::generate_code())
            .bind(&date)
            .bind(stake)
            .bind(source.odd)
            .bind(&source.booking_code)
            .bind(source.percentage)
            .fetch_one(&mut *tx)
            .await?;
            let copied = Bet::from_row(&row);

            sqlx::query(
                r#"
                INSERT INTO bet_legs (bet_id, user_id, game_id, kickoff, teams, ft_score, pick,
                                      market, outcome, status, odd, sport, live_odd, chat_count)
                SELECT $1, $2, game_id, kickoff, teams, ft_score, pick, market, outcome,
                       'Not Started', odd, sport, live_odd, chat_count
                FROM bet_legs
                WHERE bet_id = $3
                "#,
            )
            .bind(copied.id)
            .bind(user_id)
            .bind(source.id)
            .execute(&mut *tx)
            .await?;

            sqlx::query("INSERT INTO bookings (bet_id) VALUES ($1) ON CONFLICT (bet_id) DO NOTHING")
                .bind(copied.id)
                .execute(&mut *tx)
                .await?;

            self.reset_cashout_in(&mut tx, copied.id).await?;

            tx.commit().await?;

            log::info!("Copied bet {} to user {} as bet {}", source.id, user_id, copied.id);
            return Ok((copied, true));
        }

        // Re-pricing the caller's own ticket adjusts the balance by the delta
        let delta = stake - source.stake;
        if delta > 0 {
            match self.wallet.debit_in(&mut tx, user_id, delta).await {
                Ok(_) => {}
                Err(WalletError::BalanceNotFound(_)) => {
                    return Err(BetError::Wallet(WalletError::InsufficientBalance {
                        available: 0,
                        required: delta,
                    }));
                }
                Err(err) => return Err(err.into()),
            }
        } else if delta < 0 {
            self.wallet.credit_in(&mut tx, user_id, -delta, None).await?;
        }

        let row = sqlx::query(&format!(
            "UPDATE bets SET stake = $2, date = $3 WHERE id = $1 RETURNING {BET_COLUMNS}",
        ))
        .bind(bet_id)
        .bind(stake)
        .bind(&date)
        .fetch_one(&mut *tx)
        .await?;
        let updated = Bet::from_row(&row);

        sqlx::query("UPDATE bet_legs SET status = 'Not Started' WHERE bet_id = $1")
            .bind(bet_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO bookings (bet_id) VALUES ($1) ON CONFLICT (bet_id) DO NOTHING")
            .bind(bet_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((updated, false))
    }

    /// List every ticket, newest first
    pub async fn list_bets(&self) -> BetResult<Vec<Bet>> {
        let rows = sqlx::query(&format!(
            "SELECT {BET_COLUMNS} FROM bets ORDER BY placed_at DESC",
        ))
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.iter().map(Bet::from_row).collect())
    }

    /// List a user's tickets, newest first
    pub async fn bets_for_user(&self, user_id: UserId) -> BetResult<Vec<Bet>> {
        let rows = sqlx::query(&format!(
            "SELECT {BET_COLUMNS} FROM bets WHERE user_id = $1 ORDER BY placed_at DESC",
        ))
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.iter().map(Bet::from_row).collect())
    }

    /// Fetch a single ticket
    pub async fn get_bet(&self, bet_id: BetId) -> BetResult<Bet> {
        let row = sqlx::query(&format!("SELECT {BET_COLUMNS} FROM bets WHERE id = $1"))
            .bind(bet_id)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or(BetError::BetNotFound)?;

        Ok(Bet::from_row(&row))
    }

    /// Look a ticket up by its shareable booking code
    pub async fn find_by_booking_code(&self, booking_code: &str) -> BetResult<Bet> {
        let row = sqlx::query(&format!(
            "SELECT {BET_COLUMNS} FROM bets WHERE booking_code = $1 ORDER BY placed_at DESC LIMIT 1",
        ))
        .bind(booking_code)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(BetError::BookingNotFound)?;

        Ok(Bet::from_row(&row))
    }

    /// Update a ticket's odd; invalidates its verify code
    pub async fn update_odd(&self, bet_id: BetId, odd: f64) -> BetResult<Bet> {
        if !odd.is_finite() || odd <= 0.0 {
            return Err(BetError::InvalidOdd);
        }

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "UPDATE bets SET odd = $2 WHERE id = $1 RETURNING {BET_COLUMNS}",
        ))
        .bind(bet_id)
        .bind(odd)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(BetError::BetNotFound)?;

        self.invalidate_codes_in(&mut tx, bet_id).await?;
        tx.commit().await?;

        Ok(Bet::from_row(&row))
    }

    /// Update a ticket's booking code; invalidates its verify code
    pub async fn update_booking_code(&self, bet_id: BetId, booking_code: &str) -> BetResult<Bet> {
        if booking_code.trim().is_empty() {
            return Err(BetError::MissingField("bookingCode"));
        }

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "UPDATE bets SET booking_code = $2 WHERE id = $1 RETURNING {BET_COLUMNS}",
        ))
        .bind(bet_id)
        .bind(booking_code)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(BetError::BetNotFound)?;

        self.invalidate_codes_in(&mut tx, bet_id).await?;
        tx.commit().await?;

        Ok(Bet::from_row(&row))
    }

    /// Update a ticket's editable fields
    ///
    /// A stake change adjusts the owner's balance by the delta: increases are
    /// guarded debits, decreases credit the difference back. The ticket row
    /// is locked while the edit runs, and its verify code is invalidated.
    ///
    /// # Errors
    ///
    /// * `BetError::InsufficientStakeIncrease` - Delta exceeds the balance
    /// * `BetError::DepositRecordNotFound` - Owner has no balance record
    pub async fn update_ticket(&self, bet_id: BetId, update: TicketUpdate) -> BetResult<Bet> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "SELECT {BET_COLUMNS} FROM bets WHERE id = $1 FOR UPDATE",
        ))
        .bind(bet_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(BetError::BetNotFound)?;
        let bet = Bet::from_row(&row);

        if let Some(ref bet_code) = update.bet_code {
            if bet_code.trim().is_empty() {
                return Err(BetError::InvalidBetCode);
            }
        }

        if let Some(ref date) = update.date {
            if !is_valid_ticket_date(date) {
                return Err(BetError::InvalidDate);
            }
        }

        if let Some(percentage) = update.percentage {
            if !(0.0..=100.0).contains(&percentage) {
                return Err(BetError::InvalidPercentage);
            }
        }

        if let Some(stake) = update.stake {
            if stake <= 0 {
                return Err(BetError::InvalidStake);
            }

            let has_balance = sqlx::query("SELECT 1 FROM balances WHERE user_id = $1")
                .bind(bet.user_id)
                .fetch_optional(&mut *tx)
                .await?;
            if has_balance.is_none() {
                return Err(BetError::DepositRecordNotFound);
            }

            let delta = stake - bet.stake;
            if delta > 0 {
                match self.wallet.debit_in(&mut tx, bet.user_id, delta).await {
                    Ok(_) => {}
                    Err(WalletError::InsufficientBalance { .. }) => {
                        return Err(BetError::InsufficientStakeIncrease);
                    }
                    Err(WalletError::BalanceNotFound(_)) => {
                        return Err(BetError::DepositRecordNotFound);
                    }
                    Err(err) => return Err(err.into()),
                }
            } else if delta < 0 {
                self.wallet
                    .credit_in(&mut tx, bet.user_id, -delta, None)
                    .await?;
            }
        }

        let row = sqlx::query(&format!(
            r#"
            UPDATE bets
            SET bet_code = COALESCE($2, bet_code),
                date = COALESCE($3, date),
                stake = COALESCE($4, stake),
                percentage = COALESCE($5, percentage)
            WHERE id = $1
            RETURNING {BET_COLUMNS}
            "#,
        ))
        .bind(bet_id)
        .bind(&update.bet_code)
        .bind(&update.date)
        .bind(update.stake)
        .bind(update.percentage)
        .fetch_one(&mut *tx)
        .await?;

        self.invalidate_codes_in(&mut tx, bet_id).await?;
        tx.commit().await?;

        Ok(Bet::from_row(&row))
    }

    /// Delete a ticket, refunding its stake and cascading to its legs and
    /// side records
    ///
    /// The refund is skipped when the owner has no balance record.
    pub async fn delete_bet(&self, bet_id: BetId) -> BetResult<Bet> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "SELECT {BET_COLUMNS} FROM bets WHERE id = $1 FOR UPDATE",
        ))
        .bind(bet_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(BetError::BetNotFound)?;
        let bet = Bet::from_row(&row);

        let has_balance = sqlx::query("SELECT 1 FROM balances WHERE user_id = $1")
            .bind(bet.user_id)
            .fetch_optional(&mut *tx)
            .await?;
        if has_balance.is_some() {
            self.wallet
                .credit_in(&mut tx, bet.user_id, bet.stake, None)
                .await?;
        }

        sqlx::query("DELETE FROM bet_legs WHERE bet_id = $1")
            .bind(bet_id)
            .execute(&mut *tx)
            .await?;

        // Bookings, verify codes, cashouts and odd quotes go with the bet row
        sqlx::query("DELETE FROM bets WHERE id = $1")
            .bind(bet_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        log::info!("Deleted bet {} for user {}", bet_id, bet.user_id);

        Ok(bet)
    }

    /// Delete every ticket a user has, with their legs
    ///
    /// Returns how many tickets were removed.
    // TODO: refund stakes here the way the single-ticket delete does, once the
    // product question about bulk refunds is settled
    pub async fn delete_all_bets(&self, user_id: UserId) -> BetResult<u64> {
        let result = sqlx::query("DELETE FROM bets WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(BetError::NoBetsForUser);
        }

        log::info!("Deleted {} bets for user {}", result.rows_affected(), user_id);
        Ok(result.rows_affected())
    }

    /// Bulk-add legs to an existing ticket and reset its cash-out offer
    pub async fn add_legs(
        &self,
        bet_id: BetId,
        user_id: Option<UserId>,
        specs: Vec<LegSpec>,
    ) -> BetResult<Vec<BetLeg>> {
        if specs.is_empty() {
            return Err(BetError::NoLegs);
        }

        let mut tx = self.pool.begin().await?;
        self.require_bet_in(&mut tx, bet_id).await?;
        self.reset_cashout_in(&mut tx, bet_id).await?;

        let mut saved = Vec::with_capacity(specs.len());
        for spec in specs {
            let leg = spec.normalize();
            saved.push(self.insert_leg_in(&mut tx, bet_id, user_id, &leg).await?);
        }

        tx.commit().await?;
        Ok(saved)
    }

    /// Add a single leg; game id, kickoff and teams are required
    pub async fn add_leg(
        &self,
        bet_id: BetId,
        user_id: Option<UserId>,
        spec: LegSpec,
    ) -> BetResult<BetLeg> {
        fn blank(field: &Option<String>) -> bool {
            field.as_deref().is_none_or(|value| value.trim().is_empty())
        }
        if blank(&spec.game_id) {
            return Err(BetError::MissingField("gameId"));
        }
        if blank(&spec.kickoff) {
            return Err(BetError::MissingField("dateTime"));
        }
        if blank(&spec.teams) {
            return Err(BetError::MissingField("teams"));
        }

        let mut tx = self.pool.begin().await?;
        self.require_bet_in(&mut tx, bet_id).await?;
        self.reset_cashout_in(&mut tx, bet_id).await?;

        let leg = spec.normalize();
        let saved = self.insert_leg_in(&mut tx, bet_id, user_id, &leg).await?;

        tx.commit().await?;
        Ok(saved)
    }

    /// List the legs of a ticket
    pub async fn legs_for_bet(&self, bet_id: BetId) -> BetResult<Vec<BetLeg>> {
        let rows = sqlx::query(&format!(
            "SELECT {LEG_COLUMNS} FROM bet_legs WHERE bet_id = $1 ORDER BY id",
        ))
        .bind(bet_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        if rows.is_empty() {
            return Err(BetError::NoBetsForUser);
        }

        Ok(rows.iter().map(BetLeg::from_row).collect())
    }

    /// List every leg belonging to a user's tickets
    pub async fn legs_for_user(&self, user_id: UserId) -> BetResult<Vec<BetLeg>> {
        let rows = sqlx::query(&format!(
            "SELECT {LEG_COLUMNS} FROM bet_legs WHERE user_id = $1 ORDER BY id",
        ))
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        if rows.is_empty() {
            return Err(BetError::NoBetsForUser);
        }

        Ok(rows.iter().map(BetLeg::from_row).collect())
    }

    /// Partially update a leg; balance is never touched
    pub async fn update_leg(&self, leg_id: i64, update: LegUpdate) -> BetResult<BetLeg> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE bet_legs
            SET market = COALESCE($2, market),
                pick = COALESCE($3, pick),
                ft_score = COALESCE($4, ft_score),
                outcome = COALESCE($5, outcome),
                status = COALESCE($6, status),
                odd = COALESCE($7, odd),
                chat_count = COALESCE($8, chat_count),
                live_odd = COALESCE($9, live_odd),
                teams = COALESCE($10, teams),
                game_id = COALESCE($11, game_id),
                kickoff = COALESCE($12, kickoff)
            WHERE id = $1
            RETURNING {LEG_COLUMNS}
            "#,
        ))
        .bind(leg_id)
        .bind(&update.market)
        .bind(&update.pick)
        .bind(&update.ft_score)
        .bind(&update.outcome)
        .bind(&update.status)
        .bind(update.odd)
        .bind(update.chat_count)
        .bind(update.live_odd)
        .bind(&update.teams)
        .bind(&update.game_id)
        .bind(&update.kickoff)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(BetError::LegNotFound)?;

        Ok(BetLeg::from_row(&row))
    }

    /// Fetch the booking record of a ticket, if any
    pub async fn get_booking(&self, bet_id: BetId) -> BetResult<Option<Booking>> {
        let row = sqlx::query("SELECT bet_id, created_at FROM bookings WHERE bet_id = $1")
            .bind(bet_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.as_ref().map(Booking::from_row))
    }

    /// Fetch the latest verify code issued for a ticket, if any
    pub async fn get_verify_code(&self, bet_id: BetId) -> BetResult<Option<VerifyCode>> {
        let row = sqlx::query(
            "SELECT code, bet_id, created_at FROM verify_codes \
             WHERE bet_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(bet_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.as_ref().map(VerifyCode::from_row))
    }

    /// Attach a verify code to a ticket
    ///
    /// A code already on file is re-pointed to the given ticket and keeps its
    /// original issue time, so re-pointing does not extend its validity.
    /// Returns the record and whether it was newly created.
    pub async fn upsert_verify_code(
        &self,
        bet_id: BetId,
        code: &str,
    ) -> BetResult<(VerifyCode, bool)> {
        if code.trim().is_empty() {
            return Err(BetError::MissingField("verifyCode"));
        }

        let exists = sqlx::query("SELECT id FROM bets WHERE id = $1")
            .bind(bet_id)
            .fetch_optional(self.pool.as_ref())
            .await?;
        if exists.is_none() {
            return Err(BetError::BetNotFound);
        }

        let existing = sqlx::query("SELECT code FROM verify_codes WHERE code = $1")
            .bind(code)
            .fetch_optional(self.pool.as_ref())
            .await?;

        if existing.is_some() {
            let row = sqlx::query(
                "UPDATE verify_codes SET bet_id = $2 WHERE code = $1 \
                 RETURNING code, bet_id, created_at",
            )
            .bind(code)
            .bind(bet_id)
            .fetch_one(self.pool.as_ref())
            .await?;
            return Ok((VerifyCode::from_row(&row), false));
        }

        let row = sqlx::query(
            "INSERT INTO verify_codes (code, bet_id) VALUES ($1, $2) \
             RETURNING code, bet_id, created_at",
        )
        .bind(code)
        .bind(bet_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok((VerifyCode::from_row(&row), true))
    }

    /// Resolve a verify code to its ticket
    ///
    /// # Errors
    ///
    /// * `BetError::VerifyCodeNotFound` - No such code
    /// * `BetError::VerifyCodeExpired` - Code older than its validity window
    pub async fn find_bet_by_verify_code(&self, code: &str) -> BetResult<Bet> {
        let row = sqlx::query("SELECT bet_id, created_at FROM verify_codes WHERE code = $1")
            .bind(code)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or(BetError::VerifyCodeNotFound)?;

        let created_at = row.get::<chrono::NaiveDateTime, _>("created_at").and_utc();
        if created_at + Duration::hours(VERIFY_CODE_TTL_HOURS) < Utc::now() {
            return Err(BetError::VerifyCodeExpired);
        }

        self.get_bet(row.get("bet_id")).await
    }

    /// Fetch a ticket's cash-out offer
    pub async fn get_cashout(&self, bet_id: BetId) -> BetResult<Cashout> {
        let row = sqlx::query(
            "SELECT bet_id, amount, status, updated_at FROM cashouts WHERE bet_id = $1",
        )
        .bind(bet_id)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(BetError::CashoutNotFound)?;

        Ok(Cashout::from_row(&row))
    }

    /// List every cash-out offer
    pub async fn list_cashouts(&self) -> BetResult<Vec<Cashout>> {
        let rows = sqlx::query(
            "SELECT bet_id, amount, status, updated_at FROM cashouts ORDER BY bet_id",
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.iter().map(Cashout::from_row).collect())
    }

    /// Create or update a ticket's cash-out offer
    ///
    /// Absent fields keep their current value on update, or take the offer
    /// defaults (amount 0, status "cashout") on creation. Returns the record
    /// and whether it was newly created.
    pub async fn upsert_cashout(
        &self,
        bet_id: BetId,
        amount: Option<i64>,
        status: Option<CashoutStatus>,
    ) -> BetResult<(Cashout, bool)> {
        let exists = sqlx::query("SELECT id FROM bets WHERE id = $1")
            .bind(bet_id)
            .fetch_optional(self.pool.as_ref())
            .await?;
        if exists.is_none() {
            return Err(BetError::BetNotFound);
        }

        let existing = sqlx::query("SELECT bet_id FROM cashouts WHERE bet_id = $1")
            .bind(bet_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        if existing.is_some() {
            let row = sqlx::query(
                r#"
                UPDATE cashouts
                SET amount = COALESCE($2, amount),
                    status = COALESCE($3, status),
                    updated_at = NOW()
                WHERE bet_id = $1
                RETURNING bet_id, amount, status, updated_at
                "#,
            )
            .bind(bet_id)
            .bind(amount)
            .bind(status.map(|s| s.to_string()))
            .fetch_one(self.pool.as_ref())
            .await?;
            return Ok((Cashout::from_row(&row), false));
        }

        let row = sqlx::query(
            r#"
            INSERT INTO cashouts (bet_id, amount, status)
            VALUES ($1, COALESCE($2, 0), COALESCE($3, 'cashout'))
            RETURNING bet_id, amount, status, updated_at
            "#,
        )
        .bind(bet_id)
        .bind(amount)
        .bind(status.map(|s| s.to_string()))
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok((Cashout::from_row(&row), true))
    }

    /// Fetch the posted odd for a ticket
    pub async fn get_odd_quote(&self, bet_id: BetId) -> BetResult<OddQuote> {
        let row = sqlx::query("SELECT bet_id, odd, updated_at FROM odd_quotes WHERE bet_id = $1")
            .bind(bet_id)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or(BetError::OddQuoteNotFound)?;

        Ok(OddQuote::from_row(&row))
    }

    /// Post or update the odd for a ticket; returns the record and whether it
    /// was newly created
    pub async fn upsert_odd_quote(&self, bet_id: BetId, odd: f64) -> BetResult<(OddQuote, bool)> {
        if !odd.is_finite() || odd <= 0.0 {
            return Err(BetError::MissingOdd);
        }

        let exists = sqlx::query("SELECT id FROM bets WHERE id = $1")
            .bind(bet_id)
            .fetch_optional(self.pool.as_ref())
            .await?;
        if exists.is_none() {
            return Err(BetError::BetNotFound);
        }

        let existing = sqlx::query("SELECT bet_id FROM odd_quotes WHERE bet_id = $1")
            .bind(bet_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        if existing.is_some() {
            let row = sqlx::query(
                "UPDATE odd_quotes SET odd = $2, updated_at = NOW() WHERE bet_id = $1 \
                 RETURNING bet_id, odd, updated_at",
            )
            .bind(bet_id)
            .bind(odd)
            .fetch_one(self.pool.as_ref())
            .await?;
            return Ok((OddQuote::from_row(&row), false));
        }

        let row = sqlx::query(
            "INSERT INTO odd_quotes (bet_id, odd) VALUES ($1, $2) \
             RETURNING bet_id, odd, updated_at",
        )
        .bind(bet_id)
        .bind(odd)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok((OddQuote::from_row(&row), true))
    }

    /// Insert one normalized leg within a transaction
    async fn insert_leg_in(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        bet_id: BetId,
        user_id: Option<UserId>,
        leg: &NormalizedLeg,
    ) -> BetResult<BetLeg> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO bet_legs (bet_id, user_id, game_id, kickoff, teams, ft_score, pick,
                                  market, outcome, status, odd, sport)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {LEG_COLUMNS}
            "#,
        ))
        .bind(bet_id)
        .bind(user_id)
        .bind(&leg.game_id)
        .bind(&leg.kickoff)
        .bind(&leg.teams)
        .bind(&leg.ft_score)
        .bind(&leg.pick)
        .bind(&leg.market)
        .bind(&leg.outcome)
        .bind(&leg.status)
        .bind(leg.odd)
        .bind(leg.sport.to_string())
        .fetch_one(&mut **tx)
        .await?;

        Ok(BetLeg::from_row(&row))
    }

    /// Reset a ticket's cash-out offer to its placement defaults
    async fn reset_cashout_in(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        bet_id: BetId,
    ) -> BetResult<()> {
        sqlx::query(
            r#"
            INSERT INTO cashouts (bet_id, amount, status)
            VALUES ($1, 0, 'cashout')
            ON CONFLICT (bet_id) DO UPDATE
            SET amount = 0, status = 'cashout', updated_at = NOW()
            "#,
        )
        .bind(bet_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Drop any verify codes attached to a ticket
    async fn invalidate_codes_in(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        bet_id: BetId,
    ) -> BetResult<()> {
        sqlx::query("DELETE FROM verify_codes WHERE bet_id = $1")
            .bind(bet_id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Fail with `BetNotFound` unless the ticket exists
    async fn require_bet_in(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        bet_id: BetId,
    ) -> BetResult<()> {
        let exists = sqlx::query("SELECT id FROM bets WHERE id = $1")
            .bind(bet_id)
            .fetch_optional(&mut **tx)
            .await?;
        if exists.is_none() {
            return Err(BetError::BetNotFound);
        }

        Ok(())
    }

    /// Generate a six digit numeric code
    fn generate_code() -> String {
        let mut rng = rand::rng();
        (0..6)
            .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
            .collect()
    }
}
