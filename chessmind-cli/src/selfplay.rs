//! Selfplay command - the engine plays both sides
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_config(), play_series(), report_results()
//! - Level 3: play_single_game(), offer_draw(), compute_statistics()
//! - Level 4: formatting utilities

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use chessmind_core::{
    AutoQueen, BoardState, MoveRecord, Outcome, SearchConfig, SearchEngine, Side, SkillLevel,
};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct SelfplayArgs {
    /// Skill level for White (1-5)
    #[arg(long, default_value = "3")]
    pub white_skill: u8,

    /// Skill level for Black (1-5)
    #[arg(long, default_value = "3")]
    pub black_skill: u8,

    /// Number of games to play
    #[arg(long, default_value = "1")]
    pub games: usize,

    /// Stop a game after this many plies
    #[arg(long, default_value = "300")]
    pub max_plies: usize,

    /// Search configuration JSON file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print every move as it is played
    #[arg(long)]
    pub verbose: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// How a game ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GameEnd {
    /// The rules decided the game
    Finished(Outcome),
    /// One side offered a draw and the other accepted
    DrawAgreed { offered_by: Side },
    /// The ply limit ran out
    PlyLimit,
}

impl GameEnd {
    fn winner(self) -> Option<Side> {
        match self {
            GameEnd::Finished(outcome) => outcome.winner(),
            _ => None,
        }
    }

    fn describe(self) -> String {
        match self {
            GameEnd::Finished(outcome) => outcome.to_string(),
            GameEnd::DrawAgreed { offered_by } => format!("draw agreed, offered by {}", offered_by),
            GameEnd::PlyLimit => "unfinished, ply limit reached".to_string(),
        }
    }
}

/// Result of a single game
#[derive(Clone, Debug)]
struct GameRecord {
    game_number: usize,
    end: GameEnd,
    moves: Vec<MoveRecord>,
}

/// Aggregated results over all games
#[derive(Clone, Debug)]
struct SeriesResults {
    games: Vec<GameRecord>,
    white_wins: usize,
    black_wins: usize,
    draws: usize,
    avg_plies: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run selfplay command
///
/// 1. Resolve skill levels and the search configuration
/// 2. Play the requested games
/// 3. Report results
pub fn run(args: SelfplayArgs, seed: Option<u64>) -> Result<()> {
    let white = SkillLevel::new(args.white_skill).context("Invalid --white-skill")?;
    let black = SkillLevel::new(args.black_skill).context("Invalid --black-skill")?;
    let config = load_config(&args)?;

    tracing::info!(
        "Starting selfplay: white skill {} vs black skill {} ({} games)",
        white.level(),
        black.level(),
        args.games
    );

    let results = play_series(&config, white, black, &args, seed)?;

    report_results(&results, &args)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Load the search configuration, falling back to defaults
fn load_config(args: &SelfplayArgs) -> Result<SearchConfig> {
    match &args.config {
        Some(path) => SearchConfig::load(path)
            .with_context(|| format!("Failed to load search config: {}", path.display())),
        None => Ok(SearchConfig::default()),
    }
}

/// Play every game of the series
fn play_series(
    config: &SearchConfig,
    white: SkillLevel,
    black: SkillLevel,
    args: &SelfplayArgs,
    seed: Option<u64>,
) -> Result<SeriesResults> {
    let mut rng = create_rng(seed.or(config.seed));
    let mut games = Vec::with_capacity(args.games);

    for game_num in 0..args.games {
        let mut engine = SearchEngine::new(config.clone().with_seed(rng.gen()));
        let record = play_single_game(&mut engine, white, black, game_num + 1, args)?;

        tracing::info!(
            "Game {}: {} ({} plies)",
            record.game_number,
            record.end.describe(),
            record.moves.len()
        );

        games.push(record);
    }

    Ok(compute_statistics(games))
}

/// Report series results
fn report_results(results: &SeriesResults, args: &SelfplayArgs) -> Result<()> {
    if args.json {
        print_json_results(results)
    } else {
        print_text_results(results);
        Ok(())
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Play one game from the initial position
fn play_single_game(
    engine: &mut SearchEngine,
    white: SkillLevel,
    black: SkillLevel,
    game_number: usize,
    args: &SelfplayArgs,
) -> Result<GameRecord> {
    let mut board = BoardState::new();
    let skill_of = |side: Side| if side == Side::White { white } else { black };

    let end = loop {
        if board.outcome().is_decided() {
            break GameEnd::Finished(board.outcome());
        }
        if board.history().len() >= args.max_plies {
            break GameEnd::PlyLimit;
        }

        let side = board.side_to_move();
        let result = engine
            .request_move(&board, skill_of(side), side)
            .with_context(|| format!("Engine failed to move in game {}", game_number))?;
        board.apply_move_with(&result.mv, Some(&mut AutoQueen))?;

        if args.verbose {
            let played = board.last_move().map(|mv| mv.to_string()).unwrap_or_default();
            println!("{:>4}. {:<10} value {:.1}", board.history().len(), played, result.value);
        }

        if result.declares_draw {
            tracing::debug!("{} declares {}", side, board.outcome());
            continue;
        }
        if result.requests_draw && offer_draw(engine, &board, skill_of(side.opponent()), side) {
            break GameEnd::DrawAgreed { offered_by: side };
        }
    };

    Ok(GameRecord {
        game_number,
        end,
        moves: board.history().to_vec(),
    })
}

/// Ask the opponent of `offered_by` whether it takes the draw
fn offer_draw(engine: &mut SearchEngine, board: &BoardState, skill: SkillLevel, offered_by: Side) -> bool {
    let accepted = engine.accepts_draw(board, skill, offered_by.opponent());
    tracing::debug!(
        "{} offers a draw, {} {}",
        offered_by,
        offered_by.opponent(),
        if accepted { "accepts" } else { "declines" }
    );
    accepted
}

/// Compute aggregate statistics from game records
fn compute_statistics(games: Vec<GameRecord>) -> SeriesResults {
    let white_wins = games
        .iter()
        .filter(|g| g.end.winner() == Some(Side::White))
        .count();
    let black_wins = games
        .iter()
        .filter(|g| g.end.winner() == Some(Side::Black))
        .count();
    let draws = games
        .iter()
        .filter(|g| match g.end {
            GameEnd::Finished(outcome) => outcome.is_draw(),
            GameEnd::DrawAgreed { .. } => true,
            GameEnd::PlyLimit => false,
        })
        .count();

    let total_plies: usize = games.iter().map(|g| g.moves.len()).sum();
    let avg_plies = if games.is_empty() {
        0.0
    } else {
        total_plies as f32 / games.len() as f32
    };

    SeriesResults {
        games,
        white_wins,
        black_wins,
        draws,
        avg_plies,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Create RNG from seed or random
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn percent(count: usize, total: usize) -> f32 {
    if total > 0 {
        count as f32 / total as f32 * 100.0
    } else {
        0.0
    }
}

/// Print results as JSON
fn print_json_results(results: &SeriesResults) -> Result<()> {
    #[derive(serde::Serialize)]
    struct JsonGame {
        game_number: usize,
        result: String,
        plies: usize,
        moves: Vec<String>,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        total_games: usize,
        white_wins: usize,
        black_wins: usize,
        draws: usize,
        avg_plies: f32,
        games: Vec<JsonGame>,
    }

    let output = JsonOutput {
        total_games: results.games.len(),
        white_wins: results.white_wins,
        black_wins: results.black_wins,
        draws: results.draws,
        avg_plies: results.avg_plies,
        games: results
            .games
            .iter()
            .map(|g| JsonGame {
                game_number: g.game_number,
                result: g.end.describe(),
                plies: g.moves.len(),
                moves: g.moves.iter().map(|mv| mv.to_string()).collect(),
            })
            .collect(),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Print results as text
fn print_text_results(results: &SeriesResults) {
    let total = results.games.len();

    println!("\n=== Selfplay Results ===");
    println!("Total games: {}", total);
    println!("White wins:  {} ({:.1}%)", results.white_wins, percent(results.white_wins, total));
    println!("Black wins:  {} ({:.1}%)", results.black_wins, percent(results.black_wins, total));
    println!("Draws:       {} ({:.1}%)", results.draws, percent(results.draws, total));
    println!("Avg plies:   {:.1}", results.avg_plies);

    println!("\nGame details:");
    for game in &results.games {
        println!(
            "  Game {}: {} in {} plies",
            game.game_number,
            game.end.describe(),
            game.moves.len()
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn args(max_plies: usize) -> SelfplayArgs {
        SelfplayArgs {
            white_skill: 1,
            black_skill: 1,
            games: 1,
            max_plies,
            config: None,
            verbose: false,
            json: false,
        }
    }

    fn record(n: usize, end: GameEnd, plies: usize) -> GameRecord {
        let board = BoardState::new();
        let mv = board.legal_moves()[0].clone();
        GameRecord {
            game_number: n,
            end,
            moves: vec![mv; plies],
        }
    }

    #[test]
    fn test_compute_statistics_empty() {
        let results = compute_statistics(vec![]);
        assert_eq!(results.white_wins, 0);
        assert_eq!(results.black_wins, 0);
        assert_eq!(results.draws, 0);
        assert_eq!(results.avg_plies, 0.0);
    }

    #[test]
    fn test_compute_statistics() {
        let games = vec![
            record(1, GameEnd::Finished(Outcome::WhiteWins), 10),
            record(2, GameEnd::Finished(Outcome::Stalemate), 20),
            record(3, GameEnd::DrawAgreed { offered_by: Side::Black }, 30),
            record(4, GameEnd::PlyLimit, 40),
        ];
        let results = compute_statistics(games);
        assert_eq!(results.white_wins, 1);
        assert_eq!(results.black_wins, 0);
        assert_eq!(results.draws, 2);
        assert_eq!(results.avg_plies, 25.0);
    }

    #[test]
    fn test_game_respects_ply_limit() {
        let mut engine = SearchEngine::with_seed(17);
        let skill = SkillLevel::MIN;
        let game = play_single_game(&mut engine, skill, skill, 1, &args(6)).unwrap();
        assert!(game.moves.len() <= 6);
        let replayed = BoardState::replay(&game.moves).unwrap();
        assert_eq!(replayed.history().len(), game.moves.len());
    }

    #[test]
    fn test_series_is_reproducible() {
        let config = SearchConfig::default();
        let skill = SkillLevel::new(2).unwrap();
        let mut a = args(8);
        a.games = 2;
        let first = play_series(&config, skill, skill, &a, Some(99)).unwrap();
        let second = play_series(&config, skill, skill, &a, Some(99)).unwrap();
        for (x, y) in first.games.iter().zip(&second.games) {
            assert_eq!(x.moves, y.moves);
        }
    }

    #[test]
    fn test_create_rng_deterministic() {
        let mut rng1 = create_rng(Some(42));
        let mut rng2 = create_rng(Some(42));
        assert_eq!(rng1.gen::<u64>(), rng2.gen::<u64>());
    }
}
