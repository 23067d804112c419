//! Catalog data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::postgres::PgRow;

/// A match card on the home feed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCard {
    pub id: i64,
    pub match_id: Option<i64>,
    pub time: String,
    pub league: String,
    pub home_team: String,
    pub away_team: String,
    pub home_odd: String,
    pub draw_odd: String,
    pub away_odd: String,
    pub points: String,
    pub is_live: bool,
    pub hot: bool,
    pub best_odd: bool,
}

impl MatchCard {
    pub(crate) fn from_row(row: &PgRow) -> Self {
        Self {
            id: row.get("id"),
            match_id: row.get("match_id"),
            time: row.get("time"),
            league: row.get("league"),
            home_team: row.get("home_team"),
            away_team: row.get("away_team"),
            home_odd: row.get("home_odd"),
            draw_odd: row.get("draw_odd"),
            away_odd: row.get("away_odd"),
            points: row.get("points"),
            is_live: row.get("is_live"),
            hot: row.get("hot"),
            best_odd: row.get("best_odd"),
        }
    }
}

/// Incoming match card for a bulk feed upload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSpec {
    pub time: String,
    pub league: String,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub home_odd: Option<String>,
    #[serde(default)]
    pub draw_odd: Option<String>,
    #[serde(default)]
    pub away_odd: Option<String>,
    #[serde(default)]
    pub points: Option<String>,
    #[serde(default)]
    pub is_live: bool,
}

/// Partial match card update; absent fields keep their value
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchUpdate {
    pub time: Option<String>,
    pub league: Option<String>,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub home_odd: Option<String>,
    pub draw_odd: Option<String>,
    pub away_odd: Option<String>,
    pub points: Option<String>,
    pub is_live: Option<bool>,
    pub hot: Option<bool>,
    pub best_odd: Option<bool>,
}

impl MatchUpdate {
    pub fn is_empty(&self) -> bool {
        self.time.is_none()
            && self.league.is_none()
            && self.home_team.is_none()
            && self.away_team.is_none()
            && self.home_odd.is_none()
            && self.draw_odd.is_none()
            && self.away_odd.is_none()
            && self.points.is_none()
            && self.is_live.is_none()
            && self.hot.is_none()
            && self.best_odd.is_none()
    }
}

/// One side of a top match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamSide {
    pub name: String,
    pub logo: String,
}

/// The 1/X/2 odds of a top match, as display strings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OddsTriple {
    pub one: String,
    pub draw: String,
    pub two: String,
}

/// A featured match with team logos and headline odds
///
/// Stored flat; the nested team and odds shapes exist for the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopMatch {
    pub id: i64,
    pub league: String,
    pub time: String,
    pub day: String,
    pub left_team: TeamSide,
    pub right_team: TeamSide,
    pub odds: OddsTriple,
    pub hot: bool,
    pub best_odd: bool,
}

impl TopMatch {
    pub(crate) fn from_row(row: &PgRow) -> Self {
        Self {
            id: row.get("id"),
            league: row.get("league"),
            time: row.get("time"),
            day: row.get("day"),
            left_team: TeamSide {
                name: row.get("left_name"),
                logo: row.get("left_logo"),
            },
            right_team: TeamSide {
                name: row.get("right_name"),
                logo: row.get("right_logo"),
            },
            odds: OddsTriple {
                one: row.get("odd_one"),
                draw: row.get("odd_draw"),
                two: row.get("odd_two"),
            },
            hot: row.get("hot"),
            best_odd: row.get("best_odd"),
        }
    }
}

/// Incoming top match; logos arrive as already-hosted URLs
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopMatchSpec {
    #[serde(default)]
    pub league: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub day: Option<String>,
    #[serde(default)]
    pub left_team_name: Option<String>,
    #[serde(default)]
    pub left_logo: Option<String>,
    #[serde(default)]
    pub right_team_name: Option<String>,
    #[serde(default)]
    pub right_logo: Option<String>,
    #[serde(default)]
    pub odds_one: Option<String>,
    #[serde(default)]
    pub odds_draw: Option<String>,
    #[serde(default)]
    pub odds_two: Option<String>,
}

/// Partial top match update; absent fields keep their value
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopMatchUpdate {
    pub league: Option<String>,
    pub time: Option<String>,
    pub day: Option<String>,
    pub left_team_name: Option<String>,
    pub left_logo: Option<String>,
    pub right_team_name: Option<String>,
    pub right_logo: Option<String>,
    pub odds_one: Option<String>,
    pub odds_draw: Option<String>,
    pub odds_two: Option<String>,
}

/// A manually broadcast winner card that expires after its duration
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualCard {
    pub id: i64,
    pub phone: String,
    /// Minor currency units
    pub amount: i64,
    pub minute: i32,
    pub sport: String,
    #[serde(rename = "duration")]
    pub duration_mins: i32,
    pub time_ago: String,
    pub is_manual: bool,
    pub is_active: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl ManualCard {
    pub(crate) fn from_row(row: &PgRow) -> Self {
        Self {
            id: row.get("id"),
            phone: row.get("phone"),
            amount: row.get("amount"),
            minute: row.get("minute"),
            sport: row.get("sport"),
            duration_mins: row.get("duration_mins"),
            time_ago: row.get("time_ago"),
            is_manual: row.get("is_manual"),
            is_active: row.get("is_active"),
            expires_at: row.get::<chrono::NaiveDateTime, _>("expires_at").and_utc(),
            created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
        }
    }
}

/// Fields for creating a manual card; amount is minor units
#[derive(Debug, Clone)]
pub struct ManualCardSpec {
    pub phone: String,
    pub amount: i64,
    pub minute: i32,
    pub sport: Option<String>,
    pub duration_mins: i32,
}

/// Partial update for a manual card; None leaves the column unchanged
#[derive(Debug, Clone, Default)]
pub struct ManualCardUpdate {
    pub phone: Option<String>,
    pub amount: Option<i64>,
    pub minute: Option<i32>,
    pub sport: Option<String>,
    pub duration_mins: Option<i32>,
    pub is_active: Option<bool>,
}

/// A home-screen banner slot
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    pub id: i64,
    pub url: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

impl Banner {
    pub(crate) fn from_row(row: &PgRow) -> Self {
        Self {
            id: row.get("id"),
            url: row.get("url"),
            position: row.get("position"),
            created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
        }
    }
}

/// An avatar users can pick from
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileImage {
    pub id: i64,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

impl ProfileImage {
    pub(crate) fn from_row(row: &PgRow) -> Self {
        Self {
            id: row.get("id"),
            image_url: row.get("image_url"),
            created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
        }
    }
}

/// A user's selected avatar, with the image joined in
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserImageView {
    pub user_id: i64,
    pub image: ProfileImage,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_match_serializes_nested_teams_and_odds() {
        let top = TopMatch {
            id: 7,
            league: "Premier League".into(),
            time: "19:45".into(),
            day: "Saturday".into(),
            left_team: TeamSide {
                name: "Arsenal".into(),
                logo: "https://cdn.example/arsenal.png".into(),
            },
            right_team: TeamSide {
                name: "Chelsea".into(),
                logo: "https://cdn.example/chelsea.png".into(),
            },
            odds: OddsTriple {
                one: "2.10".into(),
                draw: "3.40".into(),
                two: "3.10".into(),
            },
            hot: true,
            best_odd: false,
        };

        let json = serde_json::to_value(&top).unwrap();
        assert_eq!(json["leftTeam"]["name"], "Arsenal");
        assert_eq!(json["rightTeam"]["logo"], "https://cdn.example/chelsea.png");
        assert_eq!(json["odds"]["draw"], "3.40");
        assert_eq!(json["bestOdd"], false);
    }

    #[test]
    fn match_update_empty_detection() {
        assert!(MatchUpdate::default().is_empty());

        let update = MatchUpdate {
            home_odd: Some("1.85".into()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn match_card_wire_names() {
        let card = MatchCard {
            id: 1,
            match_id: Some(42),
            time: "12:00".into(),
            league: "La Liga".into(),
            home_team: "Real Madrid".into(),
            away_team: "Sevilla".into(),
            home_odd: "1.50".into(),
            draw_odd: "4.20".into(),
            away_odd: "6.00".into(),
            points: "0".into(),
            is_live: false,
            hot: true,
            best_odd: true,
        };

        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["matchId"], 42);
        assert_eq!(json["homeTeam"], "Real Madrid");
        assert_eq!(json["isLive"], false);
    }
}
