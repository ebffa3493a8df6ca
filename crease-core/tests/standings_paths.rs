use crease_core::{
    Innings, LeagueEngine, MatchRecord, MemoryStore, Outcome, ResultSummary, ResultType, Scorecard,
    Team, TeamStore, UserDirectory,
};

struct NoUsers;

impl UserDirectory for NoUsers {
    fn is_registered_email(&self, _email: &str) -> bool {
        false
    }
}

fn engine_with_team(id: &str) -> LeagueEngine<MemoryStore, NoUsers> {
    let mut store = MemoryStore::new();
    store
        .insert_team(Team {
            id: id.to_string(),
            name: id.to_string(),
            sport: "cricket".to_string(),
            ..Team::default()
        })
        .unwrap();
    LeagueEngine::new(store, NoUsers)
}

fn match_between(id: &str, team1: &str, team2: &str, result: ResultSummary) -> MatchRecord {
    MatchRecord {
        id: id.to_string(),
        team1_id: team1.to_string(),
        team2_id: team2.to_string(),
        scorecard: Scorecard {
            team1_innings: vec![Innings {
                batting_team_id: team1.to_string(),
                total_runs: 120,
                total_wickets: 7,
                total_overs: 18.3,
            }],
            team2_innings: vec![Innings {
                batting_team_id: team2.to_string(),
                total_runs: 121,
                total_wickets: 4,
                total_overs: 17.0,
            }],
        },
        result_summary: result,
    }
}

#[test]
fn no_result_contributes_nothing() {
    let mut engine = engine_with_team("t-a");
    let record = match_between(
        "m1",
        "t-a",
        "t-b",
        ResultSummary {
            result_type: ResultType::NoResult,
            winner_id: None,
        },
    );
    let classification = engine.finalize_team_match(&record, "t-a").unwrap().unwrap();
    assert_eq!(classification.outcome, Outcome::Skip);

    let summary = engine.team_summary("t-a").unwrap();
    assert_eq!(summary.total_matches, 0);
    assert!((summary.win_rate - 0.0).abs() < f64::EPSILON);
    assert_eq!(summary.net_run_rate, None);
    assert_eq!(summary.balls_faced, 0);
    assert_eq!(summary.balls_bowled, 0);
}

#[test]
fn non_participant_match_is_ignored() {
    let mut engine = engine_with_team("t-c");
    let record = match_between(
        "m1",
        "t-a",
        "t-b",
        ResultSummary {
            result_type: ResultType::Completed,
            winner_id: Some("t-a".to_string()),
        },
    );
    assert_eq!(engine.finalize_team_match(&record, "t-c").unwrap(), None);
    let summary = engine.team_summary("t-c").unwrap();
    assert_eq!(summary.total_matches, 0);
}

#[test]
fn tied_match_earns_a_point_each_way() {
    let mut engine = engine_with_team("t-a");
    let record = match_between(
        "m1",
        "t-a",
        "t-b",
        ResultSummary {
            result_type: ResultType::Tied,
            winner_id: None,
        },
    );
    let classification = engine.finalize_team_match(&record, "t-a").unwrap().unwrap();
    assert_eq!(classification.outcome, Outcome::Draw);

    let summary = engine.team_summary("t-a").unwrap();
    assert_eq!(summary.draws, 1);
    assert_eq!(summary.total_matches, 1);
    assert_eq!(summary.tournament_points, 1);
    assert!((summary.win_rate - 0.0).abs() < f64::EPSILON);
}

#[test]
fn nrr_reflects_ball_accurate_overs() {
    let mut engine = engine_with_team("t-a");
    let record = match_between(
        "m1",
        "t-a",
        "t-b",
        ResultSummary {
            result_type: ResultType::Completed,
            winner_id: Some("t-b".to_string()),
        },
    );
    engine.finalize_team_match(&record, "t-a").unwrap();
    let summary = engine.team_summary("t-a").unwrap();
    assert_eq!(summary.losses, 1);

    // 120 runs off 111 balls faced, 121 conceded off 102 balls bowled.
    assert_eq!(summary.balls_faced, 111);
    assert_eq!(summary.balls_bowled, 102);
    let expected = 120.0 / (111.0 / 6.0) - 121.0 / (102.0 / 6.0);
    let nrr = summary.net_run_rate.unwrap();
    assert!((nrr - expected).abs() < 1e-9, "nrr {nrr} != {expected}");
}

#[test]
fn nrr_withheld_when_team_never_bowled() {
    let mut engine = engine_with_team("t-a");
    let mut record = match_between(
        "m1",
        "t-a",
        "t-b",
        ResultSummary {
            result_type: ResultType::Completed,
            winner_id: Some("t-a".to_string()),
        },
    );
    // Data-import edge: opposition innings missing entirely.
    record.scorecard.team2_innings.clear();
    engine.finalize_team_match(&record, "t-a").unwrap();

    let summary = engine.team_summary("t-a").unwrap();
    assert_eq!(summary.wins, 1);
    assert_eq!(summary.tournament_points, 2);
    assert!(!summary.nrr_available());
    assert_eq!(summary.net_run_rate, None);
}
