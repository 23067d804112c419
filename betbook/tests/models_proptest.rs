/// Property-based tests for the pure model helpers using proptest
///
/// These tests verify slip normalization, odd aggregation, ticket status
/// derivation, ticket date handling and minor-unit money conversion across
/// a wide range of generated inputs.
use betbook::bets::{
    LegSpec, LegSport, NormalizedLeg, aggregate_odd, derive_status, format_ticket_date,
    is_valid_ticket_date,
};
use betbook::wallet::{to_major_units, to_minor_units};
use chrono::{TimeZone, Utc};
use proptest::prelude::*;

// Strategy to generate an optional short text field
fn opt_text_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[a-zA-Z0-9 /:.-]{1,24}")
}

// Strategy to generate a full leg spec with any mix of absent fields
fn leg_spec_strategy() -> impl Strategy<Value = LegSpec> {
    (
        (
            opt_text_strategy(),
            opt_text_strategy(),
            opt_text_strategy(),
            opt_text_strategy(),
            opt_text_strategy(),
        ),
        (
            opt_text_strategy(),
            opt_text_strategy(),
            opt_text_strategy(),
            prop::option::of(0.01f64..50.0),
            prop::option::of(prop_oneof![
                Just(LegSport::Football),
                Just(LegSport::EFootball),
                Just(LegSport::VFootball),
            ]),
        ),
    )
        .prop_map(
            |(
                (game_id, kickoff, teams, ft_score, pick),
                (market, outcome, status, odd, sport),
            )| LegSpec {
                game_id,
                kickoff,
                teams,
                ft_score,
                pick,
                market,
                outcome,
                status,
                odd,
                sport,
            },
        )
}

// Strategy to generate a leg status, mostly known labels with some noise
fn status_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => prop_oneof![
            Just("Not Started".to_string()),
            Just("Running".to_string()),
            Just("Won".to_string()),
            Just("Lost".to_string()),
        ],
        1 => "[a-zA-Z ]{1,12}",
    ]
}

// Helper to build normalized legs from bare odds
fn legs_from_odds(odds: &[f64]) -> Vec<NormalizedLeg> {
    odds.iter()
        .map(|&odd| {
            LegSpec {
                odd: Some(odd),
                ..Default::default()
            }
            .normalize()
        })
        .collect()
}

proptest! {
    #[test]
    fn test_normalize_fills_only_missing_fields(spec in leg_spec_strategy()) {
        let expected_game_id = spec.game_id.clone().unwrap_or_else(|| "N/A".to_string());
        let expected_teams = spec.teams.clone().unwrap_or_else(|| "N/A".to_string());
        let expected_status = spec.status.clone().unwrap_or_else(|| "Not Started".to_string());
        let expected_odd = spec.odd.unwrap_or(1.0);
        let expected_sport = spec.sport.unwrap_or(LegSport::Football);

        let leg = spec.normalize();

        prop_assert_eq!(leg.game_id, expected_game_id);
        prop_assert_eq!(leg.teams, expected_teams);
        prop_assert_eq!(leg.status, expected_status);
        prop_assert_eq!(leg.odd, expected_odd);
        prop_assert_eq!(leg.sport, expected_sport);
    }

    #[test]
    fn test_normalize_is_idempotent_on_complete_specs(spec in leg_spec_strategy()) {
        let first = spec.normalize();

        // Feeding a normalized leg back through as a spec changes nothing
        let again = LegSpec {
            game_id: Some(first.game_id.clone()),
            kickoff: Some(first.kickoff.clone()),
            teams: Some(first.teams.clone()),
            ft_score: Some(first.ft_score.clone()),
            pick: Some(first.pick.clone()),
            market: Some(first.market.clone()),
            outcome: Some(first.outcome.clone()),
            status: Some(first.status.clone()),
            odd: Some(first.odd),
            sport: Some(first.sport),
        }
        .normalize();

        prop_assert_eq!(first, again);
    }

    #[test]
    fn test_aggregate_odd_is_rounded_product(odds in prop::collection::vec(0.01f64..50.0, 0..6)) {
        let legs = legs_from_odds(&odds);
        let product: f64 = odds.iter().product();
        let expected = (product * 100.0).round() / 100.0;

        prop_assert_eq!(aggregate_odd(&legs), expected);
    }

    #[test]
    fn test_aggregate_odd_ignores_unit_legs(odds in prop::collection::vec(0.01f64..50.0, 1..5)) {
        let bare = legs_from_odds(&odds);

        let mut padded_odds = odds.clone();
        padded_odds.push(1.0);
        let padded = legs_from_odds(&padded_odds);

        // A leg at odd 1.0 cannot move the aggregate
        prop_assert_eq!(aggregate_odd(&bare), aggregate_odd(&padded));
    }

    #[test]
    fn test_aggregate_odd_of_single_leg(odd in 0.01f64..1000.0) {
        let legs = legs_from_odds(&[odd]);
        prop_assert_eq!(aggregate_odd(&legs), (odd * 100.0).round() / 100.0);
    }

    #[test]
    fn test_derive_status_yields_known_label(
        statuses in prop::collection::vec(status_strategy(), 0..8)
    ) {
        let refs: Vec<&str> = statuses.iter().map(String::as_str).collect();
        let status = derive_status(&refs);

        prop_assert!(
            ["Lost", "Won", "Running", "Not Started"].contains(&status),
            "Unexpected ticket status {}",
            status
        );
    }

    #[test]
    fn test_any_lost_leg_loses_the_ticket(
        statuses in prop::collection::vec(status_strategy(), 0..8),
        insert_at in 0usize..8
    ) {
        let mut statuses = statuses;
        let at = insert_at.min(statuses.len());
        statuses.insert(at, "Lost".to_string());

        let refs: Vec<&str> = statuses.iter().map(String::as_str).collect();
        prop_assert_eq!(derive_status(&refs), "Lost");
    }

    #[test]
    fn test_all_won_legs_win_the_ticket(count in 1usize..8) {
        let statuses = vec!["Won"; count];
        prop_assert_eq!(derive_status(&statuses), "Won");
    }

    #[test]
    fn test_running_leg_makes_ticket_live(
        statuses in prop::collection::vec(
            prop_oneof![
                Just("Not Started".to_string()),
                Just("Running".to_string()),
                Just("Won".to_string()),
            ],
            0..8
        ),
        insert_at in 0usize..8
    ) {
        let mut statuses = statuses;
        let at = insert_at.min(statuses.len());
        statuses.insert(at, "Running".to_string());

        let refs: Vec<&str> = statuses.iter().map(String::as_str).collect();
        prop_assert_eq!(derive_status(&refs), "Running");
    }

    #[test]
    fn test_derive_status_is_order_independent(
        statuses in prop::collection::vec(status_strategy(), 0..8)
    ) {
        let forward: Vec<&str> = statuses.iter().map(String::as_str).collect();
        let backward: Vec<&str> = statuses.iter().rev().map(String::as_str).collect();

        prop_assert_eq!(derive_status(&forward), derive_status(&backward));
    }
}

proptest! {
    /// Formatted ticket dates always have the shape clients expect
    #[test]
    fn test_formatted_dates_always_validate(secs in 0i64..4_102_444_800) {
        let at = Utc.timestamp_opt(secs, 0).unwrap();
        let formatted = format_ticket_date(at);

        prop_assert_eq!(formatted.len(), 12);
        prop_assert!(is_valid_ticket_date(&formatted));
    }

    #[test]
    fn test_wrong_length_dates_never_validate(date in "[0-9/:, ]{0,20}") {
        prop_assume!(date.len() != 12);
        prop_assert!(!is_valid_ticket_date(&date));
    }

    #[test]
    fn test_corrupting_a_separator_invalidates(secs in 0i64..4_102_444_800, pos_idx in 0usize..4) {
        let at = Utc.timestamp_opt(secs, 0).unwrap();
        let mut bytes = format_ticket_date(at).into_bytes();

        // The fixed separator positions of "DD/MM, HH:mm"
        let positions = [2usize, 5, 6, 9];
        bytes[positions[pos_idx]] = b'7';

        let corrupted = String::from_utf8(bytes).unwrap();
        prop_assert!(!is_valid_ticket_date(&corrupted));
    }
}

proptest! {
    /// Amounts survive the wire round trip through major units
    #[test]
    fn test_minor_units_round_trip(minor in -1_000_000_000_000i64..=1_000_000_000_000) {
        let major = to_major_units(minor);
        prop_assert_eq!(to_minor_units(major), Some(minor));
    }

    #[test]
    fn test_minor_units_match_cent_construction(cents in -10_000_000i64..=10_000_000) {
        let major = cents as f64 / 100.0;
        prop_assert_eq!(to_minor_units(major), Some(cents));
    }

    #[test]
    fn test_out_of_range_amounts_are_rejected(magnitude in 1.0e17f64..1.0e30) {
        prop_assert_eq!(to_minor_units(magnitude), None);
        prop_assert_eq!(to_minor_units(-magnitude), None);
    }

    #[test]
    fn test_major_units_are_always_finite(minor in any::<i64>()) {
        prop_assert!(to_major_units(minor).is_finite());
    }

    #[test]
    fn test_non_finite_amounts_are_rejected(sign in prop_oneof![Just(1.0f64), Just(-1.0)]) {
        prop_assert!(to_minor_units(f64::NAN).is_none());
        prop_assert!(to_minor_units(sign * f64::INFINITY).is_none());
    }
}
