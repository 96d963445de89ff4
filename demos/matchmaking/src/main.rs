//! Queues a player, or runs a game server for one match.
//!
//! ```text
//! matchmaking client [game_id] [server ...]
//! matchmaking server
//! ```
//!
//! The client reads its join code from `IDEM_JOIN_CODE`. The server reads
//! its match from `idemGameId`, `idemMatchUuid` and `idemTeams`, and its
//! bearer token from `IDEM_TOKEN`. `RUST_LOG` controls verbosity.

use std::time::Duration;

use idem::prelude::*;
use rand::Rng;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

/// Uses a token issued out of band.
struct EnvToken;

impl Authenticator for EnvToken {
    async fn authenticate(
        &self,
        _username: &str,
        _password: &str,
        _client_id: &str,
    ) -> Result<String, SessionError> {
        std::env::var("IDEM_TOKEN")
            .map_err(|_| SessionError::AuthFailed("IDEM_TOKEN is not set".into()))
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

async fn run_client(
    runtime: IdemRuntime,
    game_id: String,
    servers: Vec<String>,
) -> Result<(), IdemError> {
    let player_id = format!("player_{}", rand::rng().random_range(0..10_000));
    tracing::info!(%player_id, %game_id, ?servers, "queueing");

    let client = runtime.client(StaticIdentity::new(player_id));
    let mut events = client.subscribe();
    client.find_match(game_id, servers).await?;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(ClientEvent::StateChanged(state)) => tracing::info!(%state, "state changed"),
                Ok(ClientEvent::MatchFound(found)) => {
                    tracing::info!(game_id = %found.game_id, uuid = %found.uuid, "match found");
                }
                Ok(ClientEvent::JoinInfoReceived(info)) => {
                    let connection = info.connection_info();
                    tracing::info!(
                        provider = info.provider_name(),
                        host = ?connection.host,
                        ports = ?connection.ports,
                        "join the game server"
                    );
                    break;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "event stream ended");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted, leaving the queue");
                client.stop_matchmaking().await?;
                break;
            }
        }
    }

    client.shutdown().await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

async fn run_server(runtime: IdemRuntime) -> Result<(), IdemError> {
    let server = runtime.server(EnvToken);
    let mut events = server.subscribe();
    let environment = server.environment().await?;
    tracing::info!(%environment, "hosting match");

    match server.start().await? {
        StartOutcome::Ready => {}
        outcome => {
            tracing::error!(?outcome, "could not connect to the backend");
            return Ok(());
        }
    }

    server.confirm_match().await?;
    wait_for(&mut events, MatchState::Confirmed).await;

    // Stand-in for the actual game.
    let game_length = rand::rng().random_range(30.0..300.0_f32);
    tokio::time::sleep(Duration::from_secs(3)).await;

    let teams = environment
        .teams
        .iter()
        .enumerate()
        .map(|(rank, team)| TeamResult {
            rank: rank as i32,
            players: team
                .iter()
                .map(|p| PlayerResult::new(p.player_id.clone(), rand::rng().random_range(0.0..10.0)))
                .collect(),
        })
        .collect();
    server.complete_match(game_length, "matchmaking-demo", teams).await?;

    // The process exits once the backend has accepted the result.
    wait_for(&mut events, MatchState::Completed).await;
    Ok(())
}

async fn wait_for(events: &mut tokio::sync::broadcast::Receiver<ServerEvent>, target: MatchState) {
    while let Ok(event) = events.recv().await {
        match event {
            ServerEvent::MatchStateChanged(state) if state == target => return,
            ServerEvent::ExitRequested(code) => {
                tracing::warn!(%code, "exit requested");
                return;
            }
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let mode = args.next().unwrap_or_else(|| "client".into());

    match mode.as_str() {
        "client" => {
            let game_id = args.next().unwrap_or_else(|| "1v1".into());
            let mut servers: Vec<String> = args.collect();
            if servers.is_empty() {
                servers.push("fra".into());
            }
            let runtime = IdemRuntime::builder()
                .config(IdemConfig::default().with_game_id(game_id.clone()))
                .build()?;
            run_client(runtime, game_id, servers).await?;
        }
        "server" => {
            let runtime = IdemRuntime::builder().build()?;
            run_server(runtime).await?;
        }
        other => {
            eprintln!("unknown mode {other:?}, expected `client` or `server`");
            std::process::exit(2);
        }
    }
    Ok(())
}
