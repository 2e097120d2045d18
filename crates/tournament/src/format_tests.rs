use super::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn roster(n: usize) -> Vec<AgentStanding> {
    (1..=n)
        .map(|i| AgentStanding::new(format!("P{}", i), 1500 + i as i32))
        .collect()
}

#[test]
fn test_every_format_initializes() {
    let standings = roster(5);
    let config = FormatConfig::default();
    for format in FormatType::ALL {
        let mut rng = StdRng::seed_from_u64(42);
        let state = format.initialize(&standings, &config, &mut rng).unwrap();
        assert_eq!(state.format_type(), format);
        assert!(!state.is_complete(&standings, &[]), "{} done before starting", format);
    }
}

#[test]
fn test_initialize_is_repeatable() {
    let standings = roster(6);
    let config = FormatConfig::default();
    for format in FormatType::ALL {
        let first = format
            .initialize(&standings, &config, &mut StdRng::seed_from_u64(9))
            .unwrap();
        let second = format
            .initialize(&standings, &config, &mut StdRng::seed_from_u64(9))
            .unwrap();
        assert_eq!(first, second, "{}", format);
    }
}

#[test]
fn test_duplicate_match_id_in_one_batch() {
    let standings = roster(4);
    let mut rng = StdRng::seed_from_u64(1);
    let state = FormatType::RoundRobin
        .initialize(&standings, &FormatConfig::default(), &mut rng)
        .unwrap();

    let results = vec![
        MatchResult::win("m1", "P1", "P4"),
        MatchResult::win("m1", "P1", "P4"),
    ];
    let transition = state.update_standings(&standings, &results);

    assert_eq!(transition.standings[0].tournament_points, 3);
    assert_eq!(transition.skipped.len(), 1);
    assert_eq!(transition.skipped[0].reason, MissReason::DuplicateResult);
    assert!(transition.state.applied_matches.contains("m1"));
}

#[test]
fn test_skipped_results_are_not_marked_applied() {
    let standings = roster(2);
    let mut rng = StdRng::seed_from_u64(1);
    let state = FormatType::DoubleElimination
        .initialize(&standings, &FormatConfig::default(), &mut rng)
        .unwrap();

    let transition = state.update_standings(&standings, &[MatchResult::win("m1", "P1", "ghost")]);

    assert_eq!(transition.skipped[0].reason, MissReason::UnknownPlayer);
    assert!(transition.state.applied_matches.is_empty());
}

#[test]
fn test_update_leaves_input_state_untouched() {
    let standings = roster(2);
    let mut rng = StdRng::seed_from_u64(1);
    let state = FormatType::BestOfN
        .initialize(&standings, &FormatConfig::default(), &mut rng)
        .unwrap();
    let before = state.clone();

    let transition = state.update_standings(&standings, &[MatchResult::win("g1", "P2", "P1")]);

    assert_eq!(state, before);
    assert_ne!(transition.state, before);
}

#[test]
fn test_state_round_trips_through_json() {
    let standings = roster(3);
    let mut rng = StdRng::seed_from_u64(1);
    let state = FormatType::RoyalRumble
        .initialize(&standings, &FormatConfig::default(), &mut rng)
        .unwrap();

    let json = serde_json::to_string(&state).unwrap();
    assert!(json.contains("\"format\":\"royal_rumble\""));
    let restored: FormatState = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, state);
}

#[test]
fn test_elimination_rounds() {
    assert_eq!(elimination_rounds(0), 0);
    assert_eq!(elimination_rounds(1), 0);
    assert_eq!(elimination_rounds(2), 1);
    assert_eq!(elimination_rounds(5), 3);
    assert_eq!(elimination_rounds(8), 3);
    assert_eq!(elimination_rounds(9), 4);
}

#[test]
fn test_accessors_match_format() {
    let standings = roster(4);
    let config = FormatConfig::default();
    let mut rng = StdRng::seed_from_u64(1);

    let bracket = FormatType::DoubleElimination
        .initialize(&standings, &config, &mut rng)
        .unwrap();
    assert!(bracket.as_bracket().is_some());
    assert!(bracket.as_series().is_none());

    let pentathlon = FormatType::Pentathlon
        .initialize(&standings, &config, &mut rng)
        .unwrap();
    assert_eq!(pentathlon.as_pentathlon().unwrap().events.len(), 4);
    assert!(pentathlon.as_rumble().is_none());
}
