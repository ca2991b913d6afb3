//! Simulated game host.
//!
//! Answers discovery and status queries the way a real game server
//! would, so the browser can be exercised without one. With `--master`
//! it instead serves a directory of addresses to `MasterRequest`s.

use clap::Parser;
use log::{debug, info};
use rand::Rng;
use shared::packet::Packet;
use tokio::net::UdpSocket;

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Address to bind to
    #[clap(short, long, default_value = "0.0.0.0:30720")]
    bind: String,
    /// Hostname advertised in info responses
    #[clap(short = 'n', long, default_value = "ATCS Arena")]
    hostname: String,
    /// Map advertised in info responses
    #[clap(short, long, default_value = "atcs")]
    map: String,
    /// Game identifier advertised in info responses
    #[clap(short, long, default_value = "base")]
    game: String,
    /// Number of simulated players
    #[clap(short, long, default_value = "4")]
    players: u32,
    /// Maximum player slots
    #[clap(long, default_value = "16")]
    max_players: u32,
    /// Artificial reply delay in milliseconds
    #[clap(short = 'l', long, default_value = "0")]
    latency: u64,
    /// Act as a master directory instead of a game host
    #[clap(long)]
    master: bool,
    /// Addresses the master directory hands out (repeatable)
    #[clap(long = "serve")]
    serve: Vec<String>,
}

fn info_string(args: &Args) -> String {
    format!(
        "\\hostname\\{}\\mapname\\{}\\game\\{}\\clients\\{}\\sv_maxclients\\{}\\gametype\\0",
        args.hostname, args.map, args.game, args.players, args.max_players
    )
}

fn status_text(args: &Args) -> String {
    let mut rng = rand::thread_rng();
    let mut text = format!(
        "\\sv_hostname\\{}\\mapname\\{}\\gamename\\{}\\version\\1.1.0\\protocol\\70\\timelimit\\20\\",
        args.hostname, args.map, args.game
    );
    for i in 0..args.players {
        let score: i32 = rng.gen_range(0..100);
        let ping: i32 = rng.gen_range(20..200);
        text.push_str(&format!("\\{} {} Player{}", score, ping, i));
    }
    text
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let socket = UdpSocket::bind(&args.bind).await?;
    if args.master {
        info!(
            "master directory on {} serving {} addresses",
            args.bind,
            args.serve.len()
        );
    } else {
        info!("host '{}' listening on {}", args.hostname, args.bind);
    }

    let mut buf = [0u8; 2048];
    loop {
        tokio::select! {
            result = socket.recv_from(&mut buf) => {
                let (len, from) = result?;
                let packet = match bincode::deserialize::<Packet>(&buf[..len]) {
                    Ok(p) => p,
                    Err(e) => {
                        debug!("undecodable datagram from {}: {}", from, e);
                        continue;
                    }
                };
                let reply = match packet {
                    Packet::InfoRequest { challenge } if !args.master => {
                        Some(Packet::InfoResponse {
                            challenge,
                            info: info_string(&args),
                        })
                    }
                    Packet::StatusRequest { challenge } if !args.master => {
                        Some(Packet::StatusResponse {
                            challenge,
                            text: status_text(&args),
                        })
                    }
                    Packet::MasterRequest { protocol } if args.master => {
                        debug!("directory query (protocol {}) from {}", protocol, from);
                        Some(Packet::MasterResponse {
                            addresses: args.serve.clone(),
                        })
                    }
                    _ => None,
                };
                if let Some(reply) = reply {
                    if args.latency > 0 {
                        tokio::time::sleep(std::time::Duration::from_millis(args.latency)).await;
                    }
                    let bytes = bincode::serialize(&reply)?;
                    socket.send_to(&bytes, from).await?;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
    }

    Ok(())
}
