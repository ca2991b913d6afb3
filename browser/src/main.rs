use browser::{BrowserConfig, Column, ServerBrowser};
use clap::Parser;
use lan::net::LanSocket;
use lan::{LanService, ServiceConfig};
use log::info;
use shared::backend::Source;
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};

/// Main-method of the application.
/// Parses command-line arguments, then drives the browser engine and
/// the UDP pump on one cooperative tick loop.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Command line arguments
    #[derive(Parser, Debug)]
    #[clap(author, version, about)]
    struct Args {
        /// Discovery source: local, global or favorites
        #[clap(short, long, default_value = "local")]
        source: Source,
        /// Local address to bind the browser socket to
        #[clap(short, long, default_value = "0.0.0.0:0")]
        bind: String,
        /// Broadcast address for local discovery
        #[clap(long, default_value = "255.255.255.255:30720")]
        broadcast: String,
        /// Master directory address for global discovery
        #[clap(long, default_value = "127.0.0.1:30710")]
        master: String,
        /// Tick rate (updates per second)
        #[clap(short, long, default_value = "40")]
        tick_rate: u32,
        /// Search the discovered servers for this player name
        #[clap(short, long)]
        query: Option<String>,
        /// How long to keep browsing before exiting, in seconds
        #[clap(short, long, default_value = "15")]
        duration: u64,
    }

    env_logger::init();
    let args = Args::parse();

    let socket = LanSocket::bind(&args.bind).await?;
    info!("browser socket bound to {}", socket.local_addr()?);

    let mut service = LanService::new(ServiceConfig {
        broadcast_address: args.broadcast.clone(),
        master_address: args.master.clone(),
        ..ServiceConfig::default()
    });
    let mut ui = ServerBrowser::new(args.source, BrowserConfig::default());

    let start = Instant::now();
    let mut now = 0u64;
    ui.start_refresh(&mut service, true, now);

    let mut ticker = interval(Duration::from_secs_f32(1.0 / args.tick_rate as f32));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut report = interval(Duration::from_secs(2));
    report.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let deadline = Instant::now() + Duration::from_secs(args.duration);
    let mut search_started = false;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                now = start.elapsed().as_millis() as u64;
                socket.pump(&mut service, now)?;
                ui.tick(&mut service, now);

                // Kick off the player search once discovery has settled.
                if let Some(query) = &args.query {
                    if !search_started && !ui.refresh_active() && ui.display_count() > 0 {
                        ui.build_player_search(&mut service, query, true, now);
                        search_started = true;
                    }
                }
            }
            _ = report.tick() => {
                print_display(&ui, &service);
            }
            _ = tokio::time::sleep_until(deadline) => {
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                println!("Received Ctrl+C, shutting down gracefully...");
                break;
            }
        }
    }

    print_display(&ui, &service);
    Ok(())
}

/// Prints the current display list, and the player search result if one
/// is running.
fn print_display(ui: &ServerBrowser, service: &LanService) {
    println!("--- {} servers ({}) ---", ui.display_count(), ui.source());
    for index in 0..ui.display_count() {
        println!(
            "{:<28} {:<12} {:>7} {:>5}  {}",
            ui.display_entry_text(service, index, Column::Hostname),
            ui.display_entry_text(service, index, Column::Map),
            ui.display_entry_text(service, index, Column::Clients),
            ui.display_entry_text(service, index, Column::Ping),
            ui.display_entry_text(service, index, Column::Address),
        );
    }
    let search = ui.search();
    if !search.query().is_empty() {
        for index in 0..search.display_count() {
            println!("  found: {}", search.display_name(index));
        }
    }
}
