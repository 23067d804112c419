//! Catalog manager implementation.

use super::{
    errors::{CatalogError, CatalogResult},
    models::{
        Banner, ManualCard, ManualCardSpec, ManualCardUpdate, MatchCard, MatchSpec, MatchUpdate,
        ProfileImage, TopMatch, TopMatchSpec, TopMatchUpdate, UserImageView,
    },
};
use crate::auth::UserId;
use chrono::{Duration, Utc};
use rand::Rng;
use sqlx::{PgPool, Row};
use std::sync::Arc;

/// Column list matching [`MatchCard::from_row`]
const MATCH_COLUMNS: &str = "id, match_id, time, league, home_team, away_team, home_odd, \
     draw_odd, away_odd, points, is_live, hot, best_odd";

/// Column list matching [`TopMatch::from_row`]
const TOP_MATCH_COLUMNS: &str = "id, league, time, day, left_name, left_logo, right_name, \
     right_logo, odd_one, odd_draw, odd_two, hot, best_odd";

/// Column list matching [`ManualCard::from_row`]
const CARD_COLUMNS: &str = "id, phone, amount, minute, sport, duration_mins, time_ago, \
     is_manual, is_active, expires_at, created_at";

/// Content catalog manager
///
/// Owns the home-feed match cards, the featured top matches, the expiring
/// manual winner cards, and the banner and avatar URL records. Nothing here
/// touches balances.
#[derive(Clone)]
pub struct CatalogManager {
    pool: Arc<PgPool>,
}

impl CatalogManager {
    /// Create a new catalog manager
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Bulk-insert feed matches, assigning each a random feed id
    pub async fn create_matches(&self, specs: Vec<MatchSpec>) -> CatalogResult<Vec<MatchCard>> {
        if specs.is_empty() {
            return Err(CatalogError::NoMatches);
        }

        let mut saved = Vec::with_capacity(specs.len());
        for spec in specs {
            let match_id: i64 = rand::rng().random_range(0..100_000);
            let row = sqlx::query(&format!(
                r#"
                INSERT INTO matches (match_id, time, league, home_team, away_team,
                                     home_odd, draw_odd, away_odd, points, is_live)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                RETURNING {MATCH_COLUMNS}
                "#,
            ))
            .bind(match_id)
            .bind(&spec.time)
            .bind(&spec.league)
            .bind(&spec.home_team)
            .bind(&spec.away_team)
            .bind(spec.home_odd.as_deref().unwrap_or(""))
            .bind(spec.draw_odd.as_deref().unwrap_or(""))
            .bind(spec.away_odd.as_deref().unwrap_or(""))
            .bind(spec.points.as_deref().unwrap_or(""))
            .bind(spec.is_live)
            .fetch_one(self.pool.as_ref())
            .await?;
            saved.push(MatchCard::from_row(&row));
        }

        Ok(saved)
    }

    /// List feed matches ordered by kickoff time
    pub async fn list_matches(&self) -> CatalogResult<Vec<MatchCard>> {
        let rows = sqlx::query(&format!("SELECT {MATCH_COLUMNS} FROM matches ORDER BY time"))
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.iter().map(MatchCard::from_row).collect())
    }

    /// Fetch one feed match
    pub async fn get_match(&self, id: i64) -> CatalogResult<MatchCard> {
        let row = sqlx::query(&format!("SELECT {MATCH_COLUMNS} FROM matches WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or(CatalogError::MatchNotFound)?;

        Ok(MatchCard::from_row(&row))
    }

    /// Partially update a feed match
    pub async fn update_match(&self, id: i64, update: MatchUpdate) -> CatalogResult<MatchCard> {
        if update.is_empty() {
            return Err(CatalogError::NoUpdateFields);
        }

        let row = sqlx::query(&format!(
            r#"
            UPDATE matches
            SET time = COALESCE($2, time),
                league = COALESCE($3, league),
                home_team = COALESCE($4, home_team),
                away_team = COALESCE($5, away_team),
                home_odd = COALESCE($6, home_odd),
                draw_odd = COALESCE($7, draw_odd),
                away_odd = COALESCE($8, away_odd),
                points = COALESCE($9, points),
                is_live = COALESCE($10, is_live),
                hot = COALESCE($11, hot),
                best_odd = COALESCE($12, best_odd)
            WHERE id = $1
            RETURNING {MATCH_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(&update.time)
        .bind(&update.league)
        .bind(&update.home_team)
        .bind(&update.away_team)
        .bind(&update.home_odd)
        .bind(&update.draw_odd)
        .bind(&update.away_odd)
        .bind(&update.points)
        .bind(update.is_live)
        .bind(update.hot)
        .bind(update.best_odd)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(CatalogError::MatchNotFound)?;

        Ok(MatchCard::from_row(&row))
    }

    /// Flip a feed match's hot / best-odd flags
    pub async fn set_match_status(
        &self,
        id: i64,
        best_odd: Option<bool>,
        hot: Option<bool>,
    ) -> CatalogResult<MatchCard> {
        if best_odd.is_none() && hot.is_none() {
            return Err(CatalogError::NoStatusFields);
        }

        let row = sqlx::query(&format!(
            r#"
            UPDATE matches
            SET best_odd = COALESCE($2, best_odd), hot = COALESCE($3, hot)
            WHERE id = $1
            RETURNING {MATCH_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(best_odd)
        .bind(hot)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(CatalogError::MatchNotFound)?;

        Ok(MatchCard::from_row(&row))
    }

    /// Delete a feed match
    pub async fn delete_match(&self, id: i64) -> CatalogResult<()> {
        let result = sqlx::query("DELETE FROM matches WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::MatchNotFound);
        }

        Ok(())
    }

    /// Create a featured top match; absent fields default to empty strings
    pub async fn create_top_match(&self, spec: TopMatchSpec) -> CatalogResult<TopMatch> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO top_matches (league, time, day, left_name, left_logo,
                                     right_name, right_logo, odd_one, odd_draw, odd_two)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {TOP_MATCH_COLUMNS}
            "#,
        ))
        .bind(spec.league.as_deref().unwrap_or(""))
        .bind(spec.time.as_deref().unwrap_or(""))
        .bind(spec.day.as_deref().unwrap_or(""))
        .bind(spec.left_team_name.as_deref().unwrap_or(""))
        .bind(spec.left_logo.as_deref().unwrap_or(""))
        .bind(spec.right_team_name.as_deref().unwrap_or(""))
        .bind(spec.right_logo.as_deref().unwrap_or(""))
        .bind(spec.odds_one.as_deref().unwrap_or(""))
        .bind(spec.odds_draw.as_deref().unwrap_or(""))
        .bind(spec.odds_two.as_deref().unwrap_or(""))
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(TopMatch::from_row(&row))
    }

    /// List the featured top matches
    pub async fn list_top_matches(&self) -> CatalogResult<Vec<TopMatch>> {
        let rows = sqlx::query(&format!(
            "SELECT {TOP_MATCH_COLUMNS} FROM top_matches ORDER BY id",
        ))
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.iter().map(TopMatch::from_row).collect())
    }

    /// Partially update a featured top match
    pub async fn update_top_match(
        &self,
        id: i64,
        update: TopMatchUpdate,
    ) -> CatalogResult<TopMatch> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE top_matches
            SET league = COALESCE($2, league),
                time = COALESCE($3, time),
                day = COALESCE($4, day),
                left_name = COALESCE($5, left_name),
                left_logo = COALESCE($6, left_logo),
                right_name = COALESCE($7, right_name),
                right_logo = COALESCE($8, right_logo),
                odd_one = COALESCE($9, odd_one),
                odd_draw = COALESCE($10, odd_draw),
                odd_two = COALESCE($11, odd_two)
            WHERE id = $1
            RETURNING {TOP_MATCH_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(&update.league)
        .bind(&update.time)
        .bind(&update.day)
        .bind(&update.left_team_name)
        .bind(&update.left_logo)
        .bind(&update.right_team_name)
        .bind(&update.right_logo)
        .bind(&update.odds_one)
        .bind(&update.odds_draw)
        .bind(&update.odds_two)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(CatalogError::MatchNotFound)?;

        Ok(TopMatch::from_row(&row))
    }

    /// Flip a top match's hot / best-odd flags
    pub async fn set_top_match_status(
        &self,
        id: i64,
        best_odd: Option<bool>,
        hot: Option<bool>,
    ) -> CatalogResult<TopMatch> {
        if best_odd.is_none() && hot.is_none() {
            return Err(CatalogError::NoStatusFields);
        }

        let row = sqlx::query(&format!(
            r#"
            UPDATE top_matches
            SET best_odd = COALESCE($2, best_odd), hot = COALESCE($3, hot)
            WHERE id = $1
            RETURNING {TOP_MATCH_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(best_odd)
        .bind(hot)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(CatalogError::MatchNotFound)?;

        Ok(TopMatch::from_row(&row))
    }

    /// Delete a featured top match
    pub async fn delete_top_match(&self, id: i64) -> CatalogResult<()> {
        let result = sqlx::query("DELETE FROM top_matches WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::MatchNotFound);
        }

        Ok(())
    }

    /// Create a manual winner card that stays visible for its duration
    pub async fn create_manual_card(&self, spec: ManualCardSpec) -> CatalogResult<ManualCard> {
        if spec.phone.trim().is_empty() {
            return Err(CatalogError::MissingCardFields);
        }
        if spec.amount <= 0 {
            return Err(CatalogError::InvalidCardAmount);
        }
        if spec.minute < 0 {
            return Err(CatalogError::InvalidCardMinute);
        }
        if spec.duration_mins <= 0 {
            return Err(CatalogError::InvalidCardDuration);
        }

        let sport = spec
            .sport
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("Sports");
        let time_ago = format!("{} minutes ago", spec.minute);
        let expires_at = Utc::now() + Duration::minutes(i64::from(spec.duration_mins));

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO manual_cards (phone, amount, minute, sport, duration_mins,
                                      time_ago, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {CARD_COLUMNS}
            "#,
        ))
        .bind(spec.phone.trim())
        .bind(spec.amount)
        .bind(spec.minute)
        .bind(sport)
        .bind(spec.duration_mins)
        .bind(&time_ago)
        .bind(expires_at.naive_utc())
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(ManualCard::from_row(&row))
    }

    /// List unexpired, active manual cards, newest first
    pub async fn list_active_cards(&self) -> CatalogResult<Vec<ManualCard>> {
        let rows = sqlx::query(&format!(
            "SELECT {CARD_COLUMNS} FROM manual_cards \
             WHERE expires_at > NOW() AND is_active ORDER BY created_at DESC",
        ))
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.iter().map(ManualCard::from_row).collect())
    }

    /// Patch a manual card; the expiry is recomputed from the effective duration
    pub async fn update_card(&self, id: i64, update: ManualCardUpdate) -> CatalogResult<ManualCard> {
        if let Some(phone) = update.phone.as_deref() {
            if phone.trim().is_empty() {
                return Err(CatalogError::MissingCardFields);
            }
        }
        if let Some(amount) = update.amount {
            if amount <= 0 {
                return Err(CatalogError::InvalidCardAmount);
            }
        }
        if let Some(minute) = update.minute {
            if minute < 0 {
                return Err(CatalogError::InvalidCardMinute);
            }
        }
        if let Some(duration) = update.duration_mins {
            if duration <= 0 {
                return Err(CatalogError::InvalidCardDuration);
            }
        }

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "SELECT {CARD_COLUMNS} FROM manual_cards WHERE id = $1 FOR UPDATE",
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(CatalogError::CardNotFound)?;
        let current = ManualCard::from_row(&row);

        let minute = update.minute.unwrap_or(current.minute);
        let duration_mins = update.duration_mins.unwrap_or(current.duration_mins);
        let time_ago = format!("{minute} minutes ago");
        let expires_at = current.created_at + Duration::minutes(i64::from(duration_mins));

        let row = sqlx::query(&format!(
            r#"
            UPDATE manual_cards
            SET phone = $2, amount = $3, minute = $4, sport = $5, duration_mins = $6,
                time_ago = $7, expires_at = $8, is_active = $9
            WHERE id = $1
            RETURNING {CARD_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(
            update
                .phone
                .as_deref()
                .map(str::trim)
                .unwrap_or(&current.phone),
        )
        .bind(update.amount.unwrap_or(current.amount))
        .bind(minute)
        .bind(
            update
                .sport
                .as_deref()
                .map(str::trim)
                .unwrap_or(&current.sport),
        )
        .bind(duration_mins)
        .bind(&time_ago)
        .bind(expires_at.naive_utc())
        .bind(update.is_active.unwrap_or(current.is_active))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ManualCard::from_row(&row))
    }

    /// Soft-delete a manual card
    pub async fn deactivate_card(&self, id: i64) -> CatalogResult<ManualCard> {
        let row = sqlx::query(&format!(
            "UPDATE manual_cards SET is_active = FALSE WHERE id = $1 RETURNING {CARD_COLUMNS}",
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(CatalogError::CardNotFound)?;

        Ok(ManualCard::from_row(&row))
    }

    /// Delete a manual card outright
    pub async fn delete_card(&self, id: i64) -> CatalogResult<()> {
        let result = sqlx::query("DELETE FROM manual_cards WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::CardNotFound);
        }

        Ok(())
    }

    /// Deactivate every expired card; returns how many were flipped
    pub async fn cleanup_expired_cards(&self) -> CatalogResult<u64> {
        let result = sqlx::query(
            "UPDATE manual_cards SET is_active = FALSE WHERE expires_at <= NOW() AND is_active",
        )
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() > 0 {
            log::info!("Deactivated {} expired manual cards", result.rows_affected());
        }
        Ok(result.rows_affected())
    }

    /// Replace the banner set with the given URLs, in order
    pub async fn replace_banners(&self, urls: Vec<String>) -> CatalogResult<Vec<Banner>> {
        if urls.is_empty() {
            return Err(CatalogError::NoBanners);
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM banners").execute(&mut *tx).await?;

        let mut saved = Vec::with_capacity(urls.len());
        for (position, url) in urls.iter().enumerate() {
            let row = sqlx::query(
                "INSERT INTO banners (url, position) VALUES ($1, $2) \
                 RETURNING id, url, position, created_at",
            )
            .bind(url)
            .bind(position as i32)
            .fetch_one(&mut *tx)
            .await?;
            saved.push(Banner::from_row(&row));
        }

        tx.commit().await?;

        log::info!("Replaced banner set with {} banners", saved.len());
        Ok(saved)
    }

    /// List banners in display order
    pub async fn list_banners(&self) -> CatalogResult<Vec<Banner>> {
        let rows = sqlx::query("SELECT id, url, position, created_at FROM banners ORDER BY position")
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.iter().map(Banner::from_row).collect())
    }

    /// Add avatar URLs to the catalog
    pub async fn add_profile_images(&self, urls: Vec<String>) -> CatalogResult<Vec<ProfileImage>> {
        if urls.is_empty() {
            return Err(CatalogError::NoImages);
        }
        if urls.iter().any(|url| url.trim().is_empty()) {
            return Err(CatalogError::MissingImageUrl);
        }

        let mut saved = Vec::with_capacity(urls.len());
        for url in &urls {
            let row = sqlx::query(
                "INSERT INTO profile_images (image_url) VALUES ($1) \
                 RETURNING id, image_url, created_at",
            )
            .bind(url)
            .fetch_one(self.pool.as_ref())
            .await?;
            saved.push(ProfileImage::from_row(&row));
        }

        Ok(saved)
    }

    /// List the avatar catalog, newest first
    pub async fn list_profile_images(&self) -> CatalogResult<Vec<ProfileImage>> {
        let rows = sqlx::query(
            "SELECT id, image_url, created_at FROM profile_images ORDER BY created_at DESC",
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.iter().map(ProfileImage::from_row).collect())
    }

    /// Select an avatar for a user, replacing any previous pick
    pub async fn select_user_image(
        &self,
        user_id: UserId,
        image_id: i64,
    ) -> CatalogResult<UserImageView> {
        let image = sqlx::query("SELECT id, image_url, created_at FROM profile_images WHERE id = $1")
            .bind(image_id)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or(CatalogError::ImageNotFound)?;
        let image = ProfileImage::from_row(&image);

        let row = sqlx::query(
            r#"
            INSERT INTO user_images (user_id, image_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET image_id = $2, updated_at = NOW()
            RETURNING user_id, image_id, updated_at
            "#,
        )
        .bind(user_id)
        .bind(image_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(UserImageView {
            user_id: row.get("user_id"),
            image,
            updated_at: row.get::<chrono::NaiveDateTime, _>("updated_at").and_utc(),
        })
    }

    /// Fetch a user's selected avatar
    pub async fn get_user_image(&self, user_id: UserId) -> CatalogResult<UserImageView> {
        let row = sqlx::query(
            r#"
            SELECT u.user_id, u.updated_at, p.id, p.image_url, p.created_at
            FROM user_images u
            JOIN profile_images p ON p.id = u.image_id
            WHERE u.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(CatalogError::NoSelection)?;

        Ok(UserImageView {
            user_id: row.get("user_id"),
            image: ProfileImage::from_row(&row),
            updated_at: row.get::<chrono::NaiveDateTime, _>("updated_at").and_utc(),
        })
    }
}
