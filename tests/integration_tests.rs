//! Integration tests for the server browser stack
//!
//! These tests drive the browser facade against the real discovery
//! service, exchanging packets by hand instead of through a socket, plus
//! one real UDP round-trip through the transport pump.

use browser::{BrowserConfig, Column, ServerBrowser};
use lan::{LanService, ServiceConfig};
use shared::backend::{LanBackend, Source};
use shared::packet::Packet;
use std::collections::HashMap;

const TICK_MS: u64 = 25;

/// A scripted network: known hosts with their info and status payloads,
/// and the address list the master directory hands out.
struct FakeNetwork {
    hosts: HashMap<String, String>,
    status: HashMap<String, String>,
    master_list: Vec<String>,
}

impl FakeNetwork {
    fn new() -> Self {
        Self {
            hosts: HashMap::new(),
            status: HashMap::new(),
            master_list: Vec::new(),
        }
    }

    fn add_host(&mut self, address: &str, info: &str) {
        self.hosts.insert(address.to_string(), info.to_string());
    }

    fn add_status(&mut self, address: &str, text: &str) {
        self.status.insert(address.to_string(), text.to_string());
    }

    /// Drains the service outbox and plays every reply the scripted
    /// network would send back into the service.
    fn exchange(&self, svc: &mut LanService, config: &ServiceConfig, now: u64) {
        for (to, packet) in svc.take_outbox() {
            match packet {
                Packet::InfoRequest { challenge } => {
                    if to == config.broadcast_address {
                        for (address, info) in &self.hosts {
                            svc.handle_packet(
                                address,
                                Packet::InfoResponse {
                                    challenge,
                                    info: info.clone(),
                                },
                                now,
                            );
                        }
                    } else if let Some(info) = self.hosts.get(&to) {
                        svc.handle_packet(
                            &to,
                            Packet::InfoResponse {
                                challenge,
                                info: info.clone(),
                            },
                            now,
                        );
                    }
                }
                Packet::StatusRequest { challenge } => {
                    if let Some(text) = self.status.get(&to) {
                        svc.handle_packet(
                            &to,
                            Packet::StatusResponse {
                                challenge,
                                text: text.clone(),
                            },
                            now,
                        );
                    }
                }
                Packet::MasterRequest { .. } => {
                    svc.handle_packet(
                        &config.master_address,
                        Packet::MasterResponse {
                            addresses: self.master_list.clone(),
                        },
                        now,
                    );
                }
                _ => {}
            }
        }
    }
}

/// Ticks browser and network together until `done` holds or the step
/// budget runs out. Returns the final clock.
fn run_until(
    ui: &mut ServerBrowser,
    svc: &mut LanService,
    net: &FakeNetwork,
    config: &ServiceConfig,
    mut now: u64,
    steps: usize,
    mut done: impl FnMut(&ServerBrowser) -> bool,
) -> u64 {
    for _ in 0..steps {
        now += TICK_MS;
        net.exchange(svc, config, now);
        ui.tick(svc, now);
        if done(ui) {
            return now;
        }
    }
    now
}

/// LOCAL DISCOVERY TESTS
mod local_discovery_tests {
    use super::*;

    fn three_host_network() -> FakeNetwork {
        let mut net = FakeNetwork::new();
        net.add_host(
            "192.168.0.10:30720",
            "\\hostname\\Base One\\mapname\\atcs\\clients\\3\\sv_maxclients\\16\\gametype\\0",
        );
        net.add_host(
            "192.168.0.11:30720",
            "\\hostname\\Empty Arena\\mapname\\nexus\\clients\\0\\sv_maxclients\\16\\gametype\\0",
        );
        net.add_host(
            "192.168.0.12:30720",
            "\\hostname\\Packed House\\mapname\\karith\\clients\\16\\sv_maxclients\\16\\gametype\\1",
        );
        net
    }

    /// A full local refresh discovers every broadcast responder and
    /// lists them ordered by ping.
    #[test]
    fn local_refresh_lists_all_responders() {
        let config = ServiceConfig::default();
        let mut svc = LanService::new(config.clone());
        let mut ui = ServerBrowser::new(Source::Local, BrowserConfig::default());
        let net = three_host_network();

        ui.start_refresh(&mut svc, true, 0);
        run_until(&mut ui, &mut svc, &net, &config, 0, 400, |ui| {
            !ui.refresh_active() && ui.display_count() == 3
        });

        assert_eq!(ui.display_count(), 3);
        let mut last_ping = 0;
        for i in 0..ui.display_count() {
            let ping: i32 = ui
                .display_entry_text(&svc, i, Column::Ping)
                .parse()
                .unwrap();
            assert!(ping >= last_ping, "display list not sorted by ping");
            last_ping = ping;
        }
    }

    /// Filters in the config keep empty and full servers out of the
    /// list without touching discovery.
    #[test]
    fn filters_hide_empty_and_full_servers() {
        let config = ServiceConfig::default();
        let mut svc = LanService::new(config.clone());
        let mut ui = ServerBrowser::new(
            Source::Local,
            BrowserConfig {
                show_empty: false,
                show_full: false,
                ..BrowserConfig::default()
            },
        );
        let net = three_host_network();

        ui.start_refresh(&mut svc, true, 0);
        run_until(&mut ui, &mut svc, &net, &config, 0, 400, |ui| {
            !ui.refresh_active()
        });

        assert_eq!(ui.display_count(), 1);
        assert_eq!(ui.display_entry_text(&svc, 0, Column::Hostname), "Base One");
    }

    /// The background sweep that follows a refresh prefetches a status
    /// table per listed server.
    #[test]
    fn post_refresh_sweep_caches_status_tables() {
        let config = ServiceConfig::default();
        let mut svc = LanService::new(config.clone());
        let mut ui = ServerBrowser::new(Source::Local, BrowserConfig::default());
        let mut net = three_host_network();
        net.add_status(
            "192.168.0.10:30720",
            "\\sv_hostname\\Base One\\mapname\\atcs\\version\\1.1.0\\\\12 40 Kit\\8 55 Ada",
        );

        ui.start_refresh(&mut svc, true, 0);
        run_until(&mut ui, &mut svc, &net, &config, 0, 600, |ui| {
            ui.cached_status("192.168.0.10:30720").is_some()
        });

        let table = ui.cached_status("192.168.0.10:30720").unwrap();
        assert!(table
            .rows
            .iter()
            .any(|row| row.label == "Name" && row.value == "Base One"));
        assert!(table.rows.iter().any(|row| row.value == "Kit"));
    }
}

/// MASTER DIRECTORY TESTS
mod master_directory_tests {
    use super::*;

    /// Global refresh blocks on the master answer, then pings and lists
    /// the directory entries.
    #[test]
    fn global_refresh_uses_master_directory() {
        let config = ServiceConfig::default();
        let mut svc = LanService::new(config.clone());
        let mut ui = ServerBrowser::new(Source::Global, BrowserConfig::default());
        let mut net = FakeNetwork::new();
        net.add_host(
            "10.0.0.1:30720",
            "\\hostname\\Alpha\\mapname\\atcs\\clients\\5\\sv_maxclients\\20\\gametype\\0",
        );
        net.add_host(
            "10.0.0.2:30720",
            "\\hostname\\Beta\\mapname\\nexus\\clients\\2\\sv_maxclients\\20\\gametype\\0",
        );
        net.master_list = vec!["10.0.0.1:30720".to_string(), "10.0.0.2:30720".to_string()];

        assert_eq!(svc.server_count(Source::Global), -1);
        ui.start_refresh(&mut svc, true, 0);
        run_until(&mut ui, &mut svc, &net, &config, 0, 400, |ui| {
            !ui.refresh_active() && ui.display_count() == 2
        });

        assert_eq!(ui.display_count(), 2);
        assert_eq!(svc.server_count(Source::Global), 2);
    }

    /// Directory entries that never answer pings stay off the list.
    #[test]
    fn silent_directory_entries_are_not_listed() {
        let config = ServiceConfig::default();
        let mut svc = LanService::new(config.clone());
        let mut ui = ServerBrowser::new(Source::Global, BrowserConfig::default());
        let mut net = FakeNetwork::new();
        net.add_host(
            "10.0.0.1:30720",
            "\\hostname\\Alpha\\mapname\\atcs\\clients\\5\\sv_maxclients\\20\\gametype\\0",
        );
        // 10.0.0.9 is in the directory but never answers.
        net.master_list = vec!["10.0.0.1:30720".to_string(), "10.0.0.9:30720".to_string()];

        ui.start_refresh(&mut svc, true, 0);
        run_until(&mut ui, &mut svc, &net, &config, 0, 400, |ui| {
            !ui.refresh_active()
        });

        assert!(
            !ui.refresh_active(),
            "refresh should finish despite the silent host"
        );
        assert_eq!(ui.display_count(), 1);
        assert_eq!(ui.display_entry_text(&svc, 0, Column::Hostname), "Alpha");
    }
}

/// STATUS VIEW AND PLAYER SEARCH TESTS
mod status_and_search_tests {
    use super::*;

    fn settled_browser() -> (ServiceConfig, LanService, ServerBrowser, FakeNetwork, u64) {
        let config = ServiceConfig::default();
        let mut svc = LanService::new(config.clone());
        let mut ui = ServerBrowser::new(Source::Local, BrowserConfig::default());
        let mut net = FakeNetwork::new();
        net.add_host(
            "192.168.0.10:30720",
            "\\hostname\\Base One\\mapname\\atcs\\clients\\2\\sv_maxclients\\16\\gametype\\0",
        );
        net.add_host(
            "192.168.0.11:30720",
            "\\hostname\\Annex\\mapname\\nexus\\clients\\1\\sv_maxclients\\16\\gametype\\0",
        );
        net.add_status(
            "192.168.0.10:30720",
            "\\sv_hostname\\Base One\\mapname\\atcs\\\\12 40 Albert\\8 55 Bob",
        );
        net.add_status(
            "192.168.0.11:30720",
            "\\sv_hostname\\Annex\\mapname\\nexus\\\\3 90 alice",
        );

        ui.start_refresh(&mut svc, true, 0);
        let now = run_until(&mut ui, &mut svc, &net, &config, 0, 600, |ui| {
            !ui.refresh_active() && ui.display_count() == 2
        });
        (config, svc, ui, net, now)
    }

    /// Selecting a row and forcing a status build produces the parsed
    /// table once the host answers.
    #[test]
    fn selected_server_status_table() {
        let (config, mut svc, mut ui, net, mut now) = settled_browser();

        ui.select_display_entry(&svc, 0);
        ui.build_server_status(&mut svc, true, now);
        for _ in 0..40 {
            now += 600;
            net.exchange(&mut svc, &config, now);
            ui.build_server_status(&mut svc, false, now);
            if !ui.server_status().rows.is_empty() {
                break;
            }
        }

        let status = ui.server_status();
        assert!(!status.rows.is_empty(), "status never arrived");
        assert_eq!(status.rows[0].label, "Name");
        assert!(status.rows.iter().any(|row| row.label == "Address"));
        assert!(status.rows.iter().any(|row| row.value == "Albert"));
    }

    /// The player search matches case-insensitively across every listed
    /// server and reports one line per matching server.
    #[test]
    fn player_search_finds_servers_by_name() {
        let (config, mut svc, mut ui, net, mut now) = settled_browser();

        ui.build_player_search(&mut svc, "al", true, now);
        for _ in 0..400 {
            now += TICK_MS;
            net.exchange(&mut svc, &config, now);
            ui.tick(&mut svc, now);
            if !ui.search().is_active() {
                break;
            }
        }

        assert!(!ui.search().is_active(), "search never finished");
        // Albert on Base One and alice on Annex both match "al".
        assert_eq!(ui.search().matches(), 2);
        let summary = ui.search().display_name(ui.search().display_count() - 1);
        assert!(
            summary.contains("2 servers found"),
            "summary was {:?}",
            summary
        );
    }
}

/// TRANSPORT PUMP TESTS
mod transport_tests {
    use super::*;
    use lan::net::LanSocket;
    use tokio::net::UdpSocket;
    use tokio::time::{sleep, Duration};

    /// One real UDP round-trip: the pump flushes a probe to a scripted
    /// host socket and feeds its reply back into the service.
    #[tokio::test]
    async fn pump_round_trip_on_loopback() {
        let host = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let host_addr = host.local_addr().unwrap();

        let socket = LanSocket::bind("127.0.0.1:0").await.unwrap();
        let mut svc = LanService::new(ServiceConfig::default());

        // Seed the host through the directory path so a probe goes out.
        let master = ServiceConfig::default().master_address;
        svc.handle_packet(
            &master,
            Packet::MasterResponse {
                addresses: vec![host_addr.to_string()],
            },
            0,
        );
        assert!(svc.update_visible_pings(Source::Global, 10));

        // Scripted host: echo the challenge back with an info payload.
        // The pump retries unsent packets, so keep pumping until the
        // probe arrives.
        let mut buf = [0u8; 2048];
        let mut attempts = 0;
        let (len, from) = loop {
            socket.pump(&mut svc, 10).unwrap();
            match tokio::time::timeout(Duration::from_millis(100), host.recv_from(&mut buf)).await {
                Ok(received) => break received.unwrap(),
                Err(_) => {
                    attempts += 1;
                    assert!(attempts < 50, "probe never reached the host socket");
                }
            }
        };
        let challenge = match bincode::deserialize::<Packet>(&buf[..len]).unwrap() {
            Packet::InfoRequest { challenge } => challenge,
            other => panic!("expected an info request, got {:?}", other),
        };
        let reply = Packet::InfoResponse {
            challenge,
            info: "\\hostname\\Loopback\\clients\\0".to_string(),
        };
        host.send_to(&bincode::serialize(&reply).unwrap(), from)
            .await
            .unwrap();

        // The pump is non-blocking; poll until the datagram lands.
        let mut ping = 0;
        for i in 0..40u64 {
            sleep(Duration::from_millis(25)).await;
            socket.pump(&mut svc, 50 + i * 25).unwrap();
            ping = svc.server_ping(Source::Global, 0);
            if ping > 0 {
                break;
            }
        }
        assert!(ping > 0, "info reply never measured a ping");
        assert_eq!(
            svc.server_info(Source::Global, 0),
            "\\hostname\\Loopback\\clients\\0"
        );
    }
}
