//! Wallet manager implementation: balance mutation and transaction history.
#![allow(clippy::needless_raw_string_hashes)]

use super::{
    errors::{WalletError, WalletResult},
    models::{
        Balance, Currency, Deposit, HistoryEntry, HistoryFilter, TxKind, TxStatus, WithdrawMethod,
        Withdrawal, Winning,
    },
};
use sqlx::{PgPool, Postgres, Row, Transaction};
use std::sync::Arc;

/// Wallet manager
///
/// All debits are single conditional statements guarded by an
/// `amount >= debit` predicate, and every multi-record operation runs inside
/// one transaction, so a user's balance can never go negative even under
/// concurrent requests.
#[derive(Clone)]
pub struct WalletManager {
    pool: Arc<PgPool>,
    default_currency: Currency,
}

impl WalletManager {
    /// Create a new wallet manager
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    ///
    /// Reads `DEFAULT_CURRENCY` from the environment (default: GHS).
    pub fn new(pool: Arc<PgPool>) -> Self {
        let default_currency = std::env::var("DEFAULT_CURRENCY")
            .ok()
            .and_then(|v| Currency::parse(&v))
            .unwrap_or(Currency::Ghs);

        Self {
            pool,
            default_currency,
        }
    }

    /// Get the balance record for a user
    ///
    /// # Errors
    ///
    /// * `WalletError::BalanceNotFound` - User has no balance record yet
    pub async fn get_balance(&self, user_id: i64) -> WalletResult<Balance> {
        let row = sqlx::query(
            r#"
            SELECT user_id, amount, currency, created_at, updated_at
            FROM balances
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(WalletError::BalanceNotFound(user_id))?;

        Ok(balance_from_row(&row))
    }

    /// Atomically debit a user's balance inside an open transaction
    ///
    /// The sufficiency check and the decrement are one statement, so two
    /// concurrent debits can never both pass against a stale read.
    ///
    /// # Errors
    ///
    /// * `WalletError::InsufficientBalance` - Not enough funds
    /// * `WalletError::BalanceNotFound` - No balance record exists
    pub(crate) async fn debit_in(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: i64,
        amount: i64,
    ) -> WalletResult<i64> {
        if amount <= 0 {
            return Err(WalletError::InvalidAmount(amount));
        }

        let debited = sqlx::query(
            "UPDATE balances
             SET amount = amount - $1, updated_at = NOW()
             WHERE user_id = $2 AND amount >= $1
             RETURNING amount",
        )
        .bind(amount)
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?;

        match debited {
            Some(row) => Ok(row.get("amount")),
            None => {
                // Either no balance record or insufficient funds; check which
                let check = sqlx::query("SELECT amount FROM balances WHERE user_id = $1")
                    .bind(user_id)
                    .fetch_optional(&mut **tx)
                    .await?;

                match check {
                    Some(row) => Err(WalletError::InsufficientBalance {
                        available: row.get("amount"),
                        required: amount,
                    }),
                    None => Err(WalletError::BalanceNotFound(user_id)),
                }
            }
        }
    }

    /// Credit a user's balance inside an open transaction, creating the
    /// balance record if absent
    ///
    /// A provided `currency` is copied onto the balance; otherwise an
    /// existing record keeps its label and a new one gets the default.
    pub(crate) async fn credit_in(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: i64,
        amount: i64,
        currency: Option<Currency>,
    ) -> WalletResult<i64> {
        if amount <= 0 {
            return Err(WalletError::InvalidAmount(amount));
        }

        let existing = sqlx::query("SELECT amount FROM balances WHERE user_id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut **tx)
            .await?;

        if let Some(row) = existing {
            let current: i64 = row.get("amount");
            let new_amount = current
                .checked_add(amount)
                .ok_or(WalletError::BalanceOverflow)?;

            sqlx::query(
                "UPDATE balances
                 SET amount = $1, currency = COALESCE($2, currency), updated_at = NOW()
                 WHERE user_id = $3",
            )
            .bind(new_amount)
            .bind(currency.map(|c| c.to_string()))
            .bind(user_id)
            .execute(&mut **tx)
            .await?;

            return Ok(new_amount);
        }

        // No record yet; upsert in case a concurrent request creates it first
        let row = sqlx::query(
            "INSERT INTO balances (user_id, amount, currency, updated_at)
             VALUES ($1, $2, $3, NOW())
             ON CONFLICT (user_id)
             DO UPDATE SET
                amount = balances.amount + EXCLUDED.amount,
                currency = EXCLUDED.currency,
                updated_at = NOW()
             RETURNING amount",
        )
        .bind(user_id)
        .bind(amount)
        .bind(currency.unwrap_or(self.default_currency).to_string())
        .fetch_one(&mut **tx)
        .await?;

        Ok(row.get("amount"))
    }

    /// Record a deposit and credit the balance (create-if-absent)
    ///
    /// # Returns
    ///
    /// * `WalletResult<(Deposit, i64)>` - The deposit record and the new
    ///   balance amount
    pub async fn deposit(
        &self,
        user_id: i64,
        amount: i64,
        currency: Option<Currency>,
    ) -> WalletResult<(Deposit, i64)> {
        if amount <= 0 {
            return Err(WalletError::InvalidAmount(amount));
        }
        let currency = currency.unwrap_or(self.default_currency);

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            INSERT INTO deposits (user_id, amount, currency)
            VALUES ($1, $2, $3)
            RETURNING id, status, created_at
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .bind(currency.to_string())
        .fetch_one(&mut *tx)
        .await?;

        let new_balance = self.credit_in(&mut tx, user_id, amount, Some(currency)).await?;

        tx.commit().await?;

        log::info!("Credited deposit of {} to user {}", amount, user_id);

        Ok((
            Deposit {
                id: row.get("id"),
                user_id,
                amount,
                currency,
                status: status_from_str(&row.get::<String, _>("status")),
                created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
            },
            new_balance,
        ))
    }

    /// Record a withdrawal and debit the balance
    ///
    /// # Errors
    ///
    /// * `WalletError::InsufficientBalance` - Not enough funds; nothing is
    ///   written
    /// * `WalletError::BalanceNotFound` - User has no balance record
    pub async fn withdraw(
        &self,
        user_id: i64,
        amount: i64,
        method: WithdrawMethod,
        currency: Option<Currency>,
    ) -> WalletResult<(Withdrawal, i64)> {
        if amount <= 0 {
            return Err(WalletError::InvalidAmount(amount));
        }
        let currency = currency.unwrap_or(Currency::Ngn);

        let mut tx = self.pool.begin().await?;

        let new_balance = self.debit_in(&mut tx, user_id, amount).await?;

        let row = sqlx::query(
            r#"
            INSERT INTO withdrawals (user_id, amount, method, currency)
            VALUES ($1, $2, $3, $4)
            RETURNING id, status, created_at
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .bind(method.to_string())
        .bind(currency.to_string())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        log::info!("Debited withdrawal of {} from user {}", amount, user_id);

        Ok((
            Withdrawal {
                id: row.get("id"),
                user_id,
                amount,
                method,
                currency,
                status: status_from_str(&row.get::<String, _>("status")),
                created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
            },
            new_balance,
        ))
    }

    /// Record a winning payout and credit the balance (create-if-absent)
    pub async fn record_winning(
        &self,
        user_id: i64,
        amount: i64,
        currency: Option<Currency>,
    ) -> WalletResult<(Winning, i64)> {
        if amount <= 0 {
            return Err(WalletError::InvalidAmount(amount));
        }
        let record_currency = currency.unwrap_or(Currency::Ngn);

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            INSERT INTO winnings (user_id, amount, currency)
            VALUES ($1, $2, $3)
            RETURNING id, status, created_at
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .bind(record_currency.to_string())
        .fetch_one(&mut *tx)
        .await?;

        let new_balance = self.credit_in(&mut tx, user_id, amount, currency).await?;

        tx.commit().await?;

        log::info!("Credited winning of {} to user {}", amount, user_id);

        Ok((
            Winning {
                id: row.get("id"),
                user_id,
                amount,
                currency: record_currency,
                status: status_from_str(&row.get::<String, _>("status")),
                created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
            },
            new_balance,
        ))
    }

    /// Change the currency label on a user's balance
    ///
    /// This is a label update only: the numeric amount is never converted.
    pub async fn update_currency(&self, user_id: i64, currency: Currency) -> WalletResult<Balance> {
        let row = sqlx::query(
            "UPDATE balances
             SET currency = $1, updated_at = NOW()
             WHERE user_id = $2
             RETURNING user_id, amount, currency, created_at, updated_at",
        )
        .bind(currency.to_string())
        .bind(user_id)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(WalletError::BalanceNotFound(user_id))?;

        Ok(balance_from_row(&row))
    }

    /// Aggregate deposits, withdrawals, winnings and bet stakes into one
    /// date-descending history
    ///
    /// Withdrawals and bet stakes are shown as negative amounts. Optional
    /// date bounds and a category filter narrow the result.
    pub async fn history(
        &self,
        user_id: i64,
        filter: &HistoryFilter,
    ) -> WalletResult<Vec<HistoryEntry>> {
        let from = filter.from.map(|d| d.naive_utc());
        let to = filter.to.map(|d| d.naive_utc());
        let wants = |kind: TxKind| filter.kind.is_none_or(|k| k == kind);

        let mut entries: Vec<HistoryEntry> = Vec::new();

        if wants(TxKind::Deposit) {
            let rows = sqlx::query(
                "SELECT id, amount, status, created_at FROM deposits
                 WHERE user_id = $1
                   AND ($2::timestamp IS NULL OR created_at >= $2)
                   AND ($3::timestamp IS NULL OR created_at <= $3)",
            )
            .bind(user_id)
            .bind(from)
            .bind(to)
            .fetch_all(self.pool.as_ref())
            .await?;

            entries.extend(rows.iter().map(|row| HistoryEntry {
                id: row.get("id"),
                kind: TxKind::Deposit,
                amount: row.get("amount"),
                status: status_from_str(&row.get::<String, _>("status")),
                date: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
            }));
        }

        if wants(TxKind::Withdraw) {
            let rows = sqlx::query(
                "SELECT id, amount, status, created_at FROM withdrawals
                 WHERE user_id = $1
                   AND ($2::timestamp IS NULL OR created_at >= $2)
                   AND ($3::timestamp IS NULL OR created_at <= $3)",
            )
            .bind(user_id)
            .bind(from)
            .bind(to)
            .fetch_all(self.pool.as_ref())
            .await?;

            entries.extend(rows.iter().map(|row| HistoryEntry {
                id: row.get("id"),
                kind: TxKind::Withdraw,
                amount: -row.get::<i64, _>("amount"),
                status: status_from_str(&row.get::<String, _>("status")),
                date: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
            }));
        }

        if wants(TxKind::Winning) {
            let rows = sqlx::query(
                "SELECT id, amount, status, created_at FROM winnings
                 WHERE user_id = $1
                   AND ($2::timestamp IS NULL OR created_at >= $2)
                   AND ($3::timestamp IS NULL OR created_at <= $3)",
            )
            .bind(user_id)
            .bind(from)
            .bind(to)
            .fetch_all(self.pool.as_ref())
            .await?;

            entries.extend(rows.iter().map(|row| HistoryEntry {
                id: row.get("id"),
                kind: TxKind::Winning,
                amount: row.get("amount"),
                status: status_from_str(&row.get::<String, _>("status")),
                date: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
            }));
        }

        if wants(TxKind::Bet) {
            let rows = sqlx::query(
                "SELECT id, stake, placed_at FROM bets
                 WHERE user_id = $1
                   AND ($2::timestamp IS NULL OR placed_at >= $2)
                   AND ($3::timestamp IS NULL OR placed_at <= $3)",
            )
            .bind(user_id)
            .bind(from)
            .bind(to)
            .fetch_all(self.pool.as_ref())
            .await?;

            entries.extend(rows.iter().map(|row| HistoryEntry {
                id: row.get("id"),
                kind: TxKind::Bet,
                amount: -row.get::<i64, _>("stake"),
                status: TxStatus::Completed,
                date: row.get::<chrono::NaiveDateTime, _>("placed_at").and_utc(),
            }));
        }

        entries.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(entries)
    }

    /// Delete a history record (admin operation)
    ///
    /// Bets are not deletable here; removing a bet goes through the bet
    /// deletion workflow so its stake is refunded.
    pub async fn delete_transaction(&self, kind: TxKind, id: i64) -> WalletResult<()> {
        let table = match kind {
            TxKind::Deposit => "deposits",
            TxKind::Withdraw => "withdrawals",
            TxKind::Winning => "winnings",
            TxKind::Bet => return Err(WalletError::UndeletableKind(kind.to_string())),
        };

        let result = sqlx::query(&format!("DELETE FROM {table} WHERE id = $1"))
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(WalletError::TransactionNotFound(id));
        }
        log::info!("Deleted {} record {}", kind, id);
        Ok(())
    }
}

fn balance_from_row(row: &sqlx::postgres::PgRow) -> Balance {
    Balance {
        user_id: row.get("user_id"),
        amount: row.get("amount"),
        currency: Currency::parse(&row.get::<String, _>("currency")).unwrap_or(Currency::Ghs),
        created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
        updated_at: row.get::<chrono::NaiveDateTime, _>("updated_at").and_utc(),
    }
}

fn status_from_str(status: &str) -> TxStatus {
    match status {
        "pending" => TxStatus::Pending,
        _ => TxStatus::Completed,
    }
}
