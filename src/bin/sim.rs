use serde_json::json;
use tactics::{GreedyAi, LocalMatch, PlayerNode, Side};

/// Turn counter at which an undecided match is called off.
const TURN_CAP: u32 = 200;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tactics::init_logging();
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <seed> [max-turns]", args[0]);
        std::process::exit(1);
    }
    let seed: u64 = args[1].parse()?;
    let max_turns: u32 = match args.get(2) {
        Some(s) => s.parse()?,
        None => TURN_CAP,
    };

    let game = LocalMatch::quick(seed)?;
    let mut p1 = PlayerNode::new(Side::P1, Box::new(GreedyAi::new()), game.clone());
    let mut p2 = PlayerNode::new(Side::P2, Box::new(GreedyAi::new()), game.clone());

    // Whichever side sees the end first reports it; the other is still
    // waiting for a turn that will not come.
    let winner = tokio::select! {
        r = p1.run(Some(max_turns)) => r?,
        r = p2.run(Some(max_turns)) => r?,
    };

    let engine = game.engine().await;
    let survivors = |side: Side| engine.units().iter().filter(|u| u.side == side).count();
    let result = json!({
        "seed": seed,
        "winner": winner.map(|s| s.to_string()),
        "turns": engine.turn(),
        "survivors": {"p1": survivors(Side::P1), "p2": survivors(Side::P2)},
    });

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
