#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use std::sync::Arc;

#[cfg(feature = "std")]
use clap::{Parser, ValueEnum};
#[cfg(feature = "std")]
use rand::Rng;
#[cfg(feature = "std")]
use tactics::{
    CliController, Client, Controller, GameMode, GreedyAi, HeartbeatTransport, LocalMatch,
    Message, PlayerNode, Server, ServerConfig, Side, TcpTransport,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
#[cfg(feature = "std")]
enum PlayerType {
    Human,
    Ai,
}

#[derive(Parser)]
#[cfg(feature = "std")]
enum Commands {
    /// Play both sides on this machine.
    Hotseat {
        #[arg(long, help = "Fix RNG seed for a reproducible match (e.g., --seed 12345)")]
        seed: Option<u64>,
        #[arg(long, value_enum, default_value_t = PlayerType::Human)]
        p1: PlayerType,
        #[arg(long, value_enum, default_value_t = PlayerType::Ai)]
        p2: PlayerType,
    },
    /// Run the match server.
    Serve {
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: String,
        #[arg(long, default_value_t = tactics::DEFAULT_TURN_SECONDS, help = "Seconds per turn, 0 to disable")]
        turn_seconds: u64,
        #[arg(long, help = "Seed room codes and quick-match boards")]
        seed: Option<u64>,
    },
    /// Connect to a server, creating a room or joining one by code.
    Connect {
        #[arg(long, default_value = "127.0.0.1:8080")]
        connect: String,
        #[arg(long, help = "Room code to join; omit to create a room")]
        room: Option<String>,
        #[arg(long, help = "Play a seeded match when creating a room")]
        seed: Option<u64>,
        #[arg(long, value_enum, default_value_t = PlayerType::Human)]
        player: PlayerType,
    },
}

#[cfg(feature = "std")]
fn controller(kind: PlayerType) -> Box<dyn Controller> {
    match kind {
        PlayerType::Human => Box::new(CliController::new()),
        PlayerType::Ai => Box::new(GreedyAi::new()),
    }
}

#[cfg(feature = "std")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tactics::init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Hotseat { seed, p1, p2 } => {
            let seed = seed.unwrap_or_else(|| rand::rng().random());
            println!("Starting hot-seat match (seed {})", seed);
            let game = LocalMatch::quick(seed)?;
            let mut one = PlayerNode::new(Side::P1, controller(p1), game.clone());
            let mut two = PlayerNode::new(Side::P2, controller(p2), game.clone());
            let winner = tokio::select! {
                r = one.run(None) => r?,
                r = two.run(None) => r?,
            };
            match winner {
                Some(side) => println!("{} wins after {} turns", side, game.turn().await),
                None => println!("Match abandoned"),
            }
        }
        Commands::Serve {
            bind,
            turn_seconds,
            seed,
        } => {
            let config = ServerConfig {
                bind,
                turn_seconds,
                seed,
                ..ServerConfig::default()
            };
            Arc::new(Server::new(config)).listen().await?;
        }
        Commands::Connect {
            connect,
            room,
            seed,
            player,
        } => {
            println!("Connecting to {}...", connect);
            let config = ServerConfig::default();
            let transport = HeartbeatTransport::new(
                TcpTransport::connect(&connect).await?,
                config.heartbeat_interval,
                config.idle_timeout,
            );
            let mut client = Client::connect(transport, None).await?;
            match room {
                Some(code) => {
                    let side = client.join_room(&code).await?;
                    println!("Joined room {} as {}. Waiting for the host...", code, side);
                    client.wait_for_start().await?;
                }
                None => {
                    let mode = seed.map_or(GameMode::Quick, GameMode::Seeded);
                    let code = client.create_room(mode).await?;
                    println!("Room code: {}. Waiting for an opponent...", code);
                    while client.next_message().await? != Message::PlayerJoined {}
                    client.start_game().await?;
                }
            }
            let side = client
                .side()
                .ok_or_else(|| anyhow::anyhow!("Server never assigned a side"))?;
            let mut node = PlayerNode::new(side, controller(player), client);
            match node.run(None).await? {
                Some(winner) if winner == side => println!("Victory!"),
                Some(winner) => println!("{} wins. Better luck next time.", winner),
                None => println!("Match abandoned"),
            }
        }
    }
    Ok(())
}
