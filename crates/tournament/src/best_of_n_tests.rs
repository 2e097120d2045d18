use super::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn players(n: usize) -> Vec<AgentStanding> {
    (1..=n)
        .map(|i| AgentStanding::new(format!("P{}", i), 1600 - i as i32 * 10))
        .collect()
}

fn setup(n: usize, series_length: u32) -> (Vec<AgentStanding>, SeriesTable) {
    let standings = players(n);
    let config = FormatConfig {
        series_length,
        ..Default::default()
    };
    let mut rng = StdRng::seed_from_u64(1);
    let table = BestOfN.initialize(&standings, &config, &mut rng).unwrap();
    (standings, table)
}

#[test]
fn test_best_of_three_series() {
    let (standings, table) = setup(2, 3);
    assert_eq!(table.wins_required, 2);

    let results = vec![
        MatchResult::win("g1", "P1", "P2"),
        MatchResult::win("g2", "P2", "P1"),
        MatchResult::win("g3", "P1", "P2"),
    ];
    let transition = BestOfN.update_standings(&standings, &results, &table);
    let series = &transition.state.series[&1];

    assert!(series.completed);
    assert_eq!(series.winner.as_deref(), Some("P1"));
    assert_eq!(series.player1_wins, 2);
    assert_eq!(series.player2_wins, 1);
    assert!(transition.standings[1].eliminated);
    assert!(BestOfN.is_complete(&transition.standings, &[], &transition.state));
}

#[test]
fn test_open_series_is_repaired_each_round() {
    let (standings, table) = setup(2, 5);
    let transition =
        BestOfN.update_standings(&standings, &[MatchResult::win("g1", "P2", "P1")], &table);

    let next = BestOfN.generate_pairings(&transition.standings, &[], 2, &transition.state);
    assert_eq!(next.pairings, vec![Pairing::new("P1", "P2")]);
}

#[test]
fn test_no_wins_after_series_decided() {
    let (standings, table) = setup(2, 1);
    let transition =
        BestOfN.update_standings(&standings, &[MatchResult::win("g1", "P1", "P2")], &table);
    assert!(transition.state.series[&1].completed);

    let again = BestOfN.update_standings(
        &transition.standings,
        &[MatchResult::win("g2", "P2", "P1")],
        &transition.state,
    );
    assert_eq!(again.skipped[0].reason, MissReason::NoActiveMatch);
    assert_eq!(again.state.series[&1].player2_wins, 0);
}

#[test]
fn test_seeded_first_round_and_advancement() {
    let (standings, table) = setup(4, 1);
    let first = BestOfN.generate_pairings(&standings, &[], 1, &table);
    assert_eq!(first.pairings, vec![Pairing::new("P1", "P4"), Pairing::new("P2", "P3")]);

    let transition = BestOfN.update_standings(
        &standings,
        &[MatchResult::win("a", "P1", "P4"), MatchResult::win("b", "P3", "P2")],
        &table,
    );
    let table = transition.state;
    assert_eq!(table.bracket_round, 2);

    let final_series = table.active().next().unwrap();
    assert_eq!(final_series.id, 3);
    assert_eq!(final_series.player1, "P1");
    assert_eq!(final_series.player2, "P3");

    // Ids keep increasing and are never reused
    let ids: Vec<u32> = table.series.keys().copied().collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn test_odd_field_top_seed_bye() {
    let (standings, table) = setup(3, 1);
    let first = BestOfN.generate_pairings(&standings, &[], 1, &table);
    assert_eq!(first.byes, vec!["P1".to_string()]);
    assert_eq!(first.pairings, vec![Pairing::new("P2", "P3")]);

    let transition =
        BestOfN.update_standings(&standings, &[MatchResult::win("a", "P3", "P2")], &table);
    let next = BestOfN.generate_pairings(&transition.standings, &[], 2, &transition.state);
    assert_eq!(next.pairings, vec![Pairing::new("P1", "P3")]);
    assert!(next.byes.is_empty());
}

#[test]
fn test_rankings_put_survivor_first() {
    let (standings, table) = setup(2, 3);
    let transition = BestOfN.update_standings(
        &standings,
        &[MatchResult::win("g1", "P2", "P1"), MatchResult::win("g2", "P2", "P1")],
        &table,
    );
    let ranked = BestOfN.final_rankings(&transition.standings, &[], &transition.state);
    assert_eq!(ranked[0].address, "P2");
    assert!(ranked[1].eliminated);
}

#[test]
fn test_even_series_length_rejected() {
    let standings = players(2);
    let config = FormatConfig {
        series_length: 2,
        ..Default::default()
    };
    let mut rng = StdRng::seed_from_u64(1);
    assert!(matches!(
        BestOfN.initialize(&standings, &config, &mut rng),
        Err(ConfigError::InvalidSeriesLength(2))
    ));
}

#[test]
#[should_panic]
fn test_recording_on_decided_series_panics() {
    let mut series = SeriesConfig::new(1, 1, "A".into(), "B".into(), 1);
    series.record_win("A");
    series.record_win("B");
}

#[test]
fn test_total_rounds() {
    let config = FormatConfig {
        series_length: 5,
        ..Default::default()
    };
    assert_eq!(BestOfN.total_rounds(8, &config), 15);
}
