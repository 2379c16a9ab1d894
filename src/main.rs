use log::{debug, error, info, warn};
use peer_locator::core::{Coordinate, Role, TrackerError};
use peer_locator::hardware::{
    Clock, LogDisplay, LogIndicator, MockGps, MockTransport, NmeaGps, SystemClock, Transport,
};
use peer_locator::processing::nmea::checksum;
use peer_locator::tracking::{TickOutcome, TickReport, TrackingLoop};
use peer_locator::utils::TrackerConfig;
use simplelog::{Config, LevelFilter, SimpleLogger};
use std::error::Error;

/// Environment variable holding an optional JSON configuration document
const CONFIG_ENV: &str = "PEER_LOCATOR_CONFIG";
/// Exit status asking a supervisor to start us again
#[cfg(not(unix))]
const RESTART_EXIT_CODE: i32 = 75;
const DEMO_TICKS: u32 = 60;

const MASTER_POSITION: (f64, f64) = (42.3202225, -83.234719);
const CLIENT_START: (f64, f64) = (42.32, -83.234);
/// Per-tick client movement toward the master (degrees)
const CLIENT_STEP: (f64, f64) = (0.000004, -0.000012);

type Master = TrackingLoop<MockTransport, MockGps, LogDisplay, LogIndicator, SystemClock>;
type Client = TrackingLoop<MockTransport, NmeaGps, LogDisplay, LogIndicator, SystemClock>;

/// Client-side configuration from the environment, or the client preset
fn load_config() -> Result<TrackerConfig, Box<dyn Error>> {
    let config = match std::env::var(CONFIG_ENV) {
        Ok(json) => TrackerConfig::from_json_str(&json)?,
        Err(_) => TrackerConfig::client(),
    };
    Ok(config)
}

/// The master end mirrors the client's settings with names swapped
fn master_config(client: &TrackerConfig) -> TrackerConfig {
    TrackerConfig {
        role: Role::Initiator,
        device_name: client.peer_name.clone(),
        peer_name: client.device_name.clone(),
        ..client.clone()
    }
}

/// `$GPGGA` sentence for a position, as a receiver would emit it
fn gga_sentence(position: &Coordinate, seconds: u32) -> String {
    let (lat, lat_hemisphere) = nmea_angle(position.latitude(), 2, 'N', 'S');
    let (lon, lon_hemisphere) = nmea_angle(position.longitude(), 3, 'E', 'W');
    let body = format!(
        "GPGGA,{:02}{:02}{:02}.00,{},{},{},{},1,08,0.9,180.0,M,-34.0,M,,",
        (seconds / 3600) % 24,
        (seconds / 60) % 60,
        seconds % 60,
        lat,
        lat_hemisphere,
        lon,
        lon_hemisphere
    );
    format!("${}*{:02X}\r\n", body, checksum(&body))
}

fn nmea_angle(degrees: f64, width: usize, positive: char, negative: char) -> (String, char) {
    let hemisphere = if degrees < 0.0 { negative } else { positive };
    let magnitude = degrees.abs();
    let whole = magnitude.trunc();
    let minutes = (magnitude - whole) * 60.0;
    (
        format!("{:0width$}{:07.4}", whole as u32, minutes, width = width),
        hemisphere,
    )
}

/// Stand-in for the radio pairing: the master's outbound bytes land in
/// the client's inbound queue, and a master connect attaches the client.
fn bridge(master: &mut Master, client: &mut Client) {
    if master.lifecycle().is_connected() && !client.lifecycle().transport().has_client() {
        client.lifecycle_mut().transport_mut().attach_client();
    }
    let wire = master.lifecycle_mut().transport_mut().take_sent();
    if !wire.is_empty() {
        client.lifecycle_mut().transport_mut().push_inbound(&wire);
    }
}

fn log_report(name: &str, report: &TickReport) {
    for diagnostic in &report.diagnostics {
        debug!("[{}] {} ({:?})", name, diagnostic, diagnostic.recovery_strategy());
    }
    if let TickOutcome::Located {
        distance_yards,
        sector,
        ..
    } = report.outcome
    {
        debug!("[{}] {:.2} yards {}", name, distance_yards, sector);
    }
}

/// Replace this process with a fresh copy of itself
#[cfg(unix)]
fn restart() -> Result<(), Box<dyn Error>> {
    use std::os::unix::process::CommandExt;

    let exe = std::env::current_exe()?;
    let err = std::process::Command::new(exe)
        .args(std::env::args_os().skip(1))
        .exec();
    Err(err.into())
}

#[cfg(not(unix))]
fn restart() -> Result<(), Box<dyn Error>> {
    std::process::exit(RESTART_EXIT_CODE)
}

fn run(client_config: TrackerConfig) -> Result<(), Box<dyn Error>> {
    let master_config = master_config(&client_config);
    master_config.validate()?;
    let clock = SystemClock::new();

    let master_position = Coordinate::new(MASTER_POSITION.0, MASTER_POSITION.1)?;
    let mut master: Master = TrackingLoop::new(
        &master_config,
        MockTransport::new(),
        MockGps::fixed(master_position),
        LogDisplay::new(master_config.display.columns, master_config.display.rows),
        LogIndicator::default(),
        clock,
    );
    let mut client: Client = TrackingLoop::new(
        &client_config,
        MockTransport::new(),
        NmeaGps::new(),
        LogDisplay::new(client_config.display.columns, client_config.display.rows),
        LogIndicator::default(),
        clock,
    );

    // The acceptor must be listening before the initiator dials
    client.initialize()?;
    master.initialize()?;

    let (mut lat, mut lon) = CLIENT_START;
    for tick in 0..DEMO_TICKS {
        let position = Coordinate::new(lat, lon)?;
        client.gps_mut().feed(gga_sentence(&position, tick).as_bytes());

        let report = master.tick();
        log_report("master", &report);
        bridge(&mut master, &mut client);

        let report = client.tick();
        log_report("client", &report);

        if master.lifecycle().has_given_up() {
            warn!("Master stopped retrying; resetting its connection budget");
            master.lifecycle_mut().reset();
        }

        lat += CLIENT_STEP.0;
        lon += CLIENT_STEP.1;
        clock.sleep(client.tick_interval());
    }

    info!(
        "Session finished: {} NMEA sentences parsed, {} rejected",
        client.gps_mut().sentences_parsed(),
        client.gps_mut().sentences_rejected()
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let config = load_config()?;
    let level = if config.debug_logging {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    SimpleLogger::init(level, Config::default())?;

    info!(
        "Starting paired session: {} <-> {} ({})",
        config.peer_name, config.device_name, config.peer_address
    );

    match run(config) {
        Err(e) => match e.downcast_ref::<TrackerError>() {
            Some(TrackerError::FatalInit { attempts }) => {
                error!(
                    "Transport could not start after {} attempts, restarting",
                    attempts
                );
                restart()
            }
            _ => Err(e),
        },
        Ok(()) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peer_locator::hardware::GpsSource;

    #[test]
    fn test_simulated_sentences_parse_back() {
        let position = Coordinate::new(42.32, -83.234).unwrap();
        let mut gps = NmeaGps::new();
        gps.feed(gga_sentence(&position, 3725).as_bytes());

        let fix = gps.poll_fix().unwrap();
        assert!(fix.valid);
        assert!((fix.coordinate.latitude() - 42.32).abs() < 1e-6);
        assert!((fix.coordinate.longitude() + 83.234).abs() < 1e-6);
        assert_eq!(gps.sentences_rejected(), 0);
    }

    #[test]
    fn test_master_config_swaps_names() {
        let client = TrackerConfig::client();
        let master = master_config(&client);
        assert_eq!(master.role, Role::Initiator);
        assert_eq!(master.device_name, "ESP32-BT-Master");
        assert_eq!(master.peer_name, "ESP32-BT-Slave");
        assert!(master.validate().is_ok());
    }

    #[test]
    fn test_bridge_pairs_and_forwards() {
        let config = TrackerConfig::client();
        let clock = SystemClock::new();
        let mut master: Master = TrackingLoop::new(
            &master_config(&config),
            MockTransport::new(),
            MockGps::fixed(Coordinate::new(MASTER_POSITION.0, MASTER_POSITION.1).unwrap()),
            LogDisplay::new(16, 2),
            LogIndicator::default(),
            clock,
        );
        let mut client: Client = TrackingLoop::new(
            &config,
            MockTransport::new(),
            NmeaGps::new(),
            LogDisplay::new(16, 2),
            LogIndicator::default(),
            clock,
        );
        client.initialize().unwrap();
        master.initialize().unwrap();

        master.tick();
        bridge(&mut master, &mut client);
        assert!(client.lifecycle().transport().has_client());
        assert!(client.lifecycle().transport().available() > 0);
    }
}
