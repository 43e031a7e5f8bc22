use color_eyre::eyre::{eyre, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use stepwise_sudoku::core::{board_to_string, parse_board};
use stepwise_sudoku::events::Event;
use stepwise_sudoku::generator::generate_puzzle;
use stepwise_sudoku::regions::{BoxRegions, RegionMap, JIGSAW_MAPS};
use stepwise_sudoku::session::Session;
use stepwise_sudoku::solver::SearchConfig;

struct Args {
    jigsaw: Option<String>,
    board: Option<String>,
    difficulty: f64,
    seed: u64,
    config: SearchConfig,
    ac3: bool,
    json: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        jigsaw: None,
        board: None,
        difficulty: 0.5,
        seed: 0xeea42aa1638be961,
        config: SearchConfig::default(),
        ac3: false,
        json: false,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--jigsaw" => {
                let name = it.next().ok_or_else(|| eyre!("--jigsaw needs a map name"))?;
                args.jigsaw = Some(name);
            }
            "--board" => {
                let b = it.next().ok_or_else(|| eyre!("--board needs a cell string"))?;
                args.board = Some(b);
            }
            "--difficulty" => {
                let d = it.next().ok_or_else(|| eyre!("--difficulty needs a value"))?;
                args.difficulty = d.parse()?;
            }
            "--seed" => {
                let s = it.next().ok_or_else(|| eyre!("--seed needs a value"))?;
                args.seed = s.parse()?;
            }
            "--mrv" => args.config.use_mrv = true,
            "--lcv" => args.config.use_lcv = true,
            "--fc" => args.config.use_forward_checking = true,
            "--ac3" => args.ac3 = true,
            "--json" => args.json = true,
            other => {
                return Err(eyre!(
                    "Unknown argument {:?}. Flags: --jigsaw <name>, --board <cells>, \
                     --difficulty <0..1>, --seed <n>, --mrv, --lcv, --fc, --ac3, --json",
                    other,
                ));
            }
        }
    }
    Ok(args)
}

fn region_for(args: &Args) -> Result<Box<dyn RegionMap>> {
    match &args.jigsaw {
        None => Ok(Box::new(BoxRegions::standard())),
        Some(name) => {
            let named = JIGSAW_MAPS
                .iter()
                .find(|m| m.name.eq_ignore_ascii_case(name))
                .ok_or_else(|| {
                    let known: Vec<&str> = JIGSAW_MAPS.iter().map(|m| m.name).collect();
                    eyre!("No jigsaw map named {:?}; known maps: {:?}", name, known)
                })?;
            Ok(Box::new(named.map.clone()))
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = parse_args()?;
    let size = region_for(&args)?.size();

    let puzzle = match &args.board {
        Some(cells) => parse_board(cells, size).map_err(|e| eyre!(e))?,
        None => {
            let mut rng = ChaCha20Rng::seed_from_u64(args.seed);
            generate_puzzle(region_for(&args)?.as_ref(), args.difficulty, &mut rng)
        }
    };
    if !args.json {
        println!("Puzzle ({} holes):", puzzle.iter().filter(|&&v| v == 0).count());
        println!("{}", board_to_string(&puzzle, size));
    }

    let mut session = Session::new(puzzle, region_for(&args)?, args.config)?;
    if args.ac3 {
        if let Some(outcome) = session.preprocess() {
            if !args.json {
                println!(
                    "AC-3: {} after {} revisions",
                    if outcome.consistent { "consistent" } else { "unsatisfiable" },
                    outcome.revisions,
                );
            }
        }
    }

    let success = loop {
        let event = session.step();
        if args.json {
            println!("{}", serde_json::to_string(event)?);
        } else if let Event::Log { message } = event {
            println!("[log] {}", message);
        }
        if let Event::Done { success } = event {
            break *success;
        }
    };

    if !args.json {
        println!();
        println!(
            "{} nodes expanded, {} backtracks, mood: {}",
            session.counters().nodes_expanded,
            session.counters().backtracks,
            session.mood(),
        );
        println!("{}", board_to_string(session.board(), size));
    }
    if success {
        Ok(())
    } else {
        Err(eyre!("no solution found"))
    }
}
