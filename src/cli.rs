use std::path::PathBuf;
use std::process;

use crate::analyzer::SpectrumAnalyzer;
use crate::config::{load_config, RunConfig};
use crate::measurement::{write_spectrum_file, Summary};
use crate::resource::Resource;
use crate::transport::{self, Transport};

/// What a finished run produced.
#[derive(Clone, Debug)]
pub struct Session {
    pub identity: String,
    pub readings: Vec<f64>,
    pub csv_path: PathBuf,
}

/// Configure the analyzer, let the trace settle, take the burst of peak
/// readings, and write them out.
pub fn measure<T: Transport>(transport: T, config: &RunConfig) -> crate::Result<Session> {
    let plan = &config.run;
    let delay = plan.delay()?;

    let mut analyzer = SpectrumAnalyzer::new(transport, config.instrument.clone())?;
    let identity = analyzer.identify()?;
    tracing::info!("connected to {}", identity);

    if let Some(attenuation_db) = plan.attenuation_db {
        analyzer.set_attenuation_man_db(attenuation_db)?;
    }

    if plan.max_hold {
        analyzer.set_max_hold()?;
    } else {
        analyzer.clear_write()?;
    }

    // let the trace settle
    analyzer.sleep(plan.settle_seconds);
    let readings = analyzer.take_peak_measurements_dbm(plan.count, delay)?;

    let now = chrono::Local::now().naive_local();
    let csv_path = write_spectrum_file(&plan.output_dir, &now, plan.base_frequency_mhz, &readings)?;

    Ok(Session {
        identity,
        readings,
        csv_path,
    })
}

pub struct Config {}

impl Config {
    pub fn run(args: &[String]) -> Result<Config, Box<dyn std::error::Error>> {
        if args.len() > 2 {
            return Err("too many arguments, expecting at most 1, such as `peaklog run.toml`".into());
        }

        let config = match args.get(1).map(String::as_str) {
            Some("--version") | Some("-v") => {
                print_version();
                process::exit(0);
            }
            Some("--help") | Some("-h") => {
                print_help();
                process::exit(0);
            }
            Some(file_path) => {
                let cwd = std::env::current_dir()?;
                println!("Config Path: {}", file_path);
                let full_path_to_config = cwd.join(file_path);
                println!("Full Path: {}", full_path_to_config.display());
                load_config(&full_path_to_config)?
            }
            None => RunConfig::default(),
        };

        let resource = Resource::parse(&config.instrument.resource)?;
        let transport = transport::open(&resource)?;
        let session = measure(transport, &config)?;

        print_session(&session);
        println!("done");

        Ok(Config {})
    }
}

pub fn print_version() {
    println!("peaklog {}", env!("CARGO_PKG_VERSION"));
}

pub fn print_error(error: &str) {
    const RED: &str = "\x1b[31m";
    const RESET: &str = "\x1b[0m";
    println!("{}Error: {error}{}", RED, RESET);
}

pub fn print_help() {
    // ANSI color codes
    const BOLD: &str = "\x1b[1m";
    const CYAN: &str = "\x1b[36m";
    const GREEN: &str = "\x1b[32m";
    const YELLOW: &str = "\x1b[33m";
    const RESET: &str = "\x1b[0m";

    println!("📡 peaklog - spectrum analyzer peak power logger{}", RESET);
    println!();
    println!("{}{}VERSION:{}", BOLD, YELLOW, RESET);
    println!("    {}{}{}", GREEN, env!("CARGO_PKG_VERSION"), RESET);
    println!();
    println!("{}{}USAGE:{}", BOLD, YELLOW, RESET);
    println!("    {} peaklog [FILE_PATH]{}", GREEN, RESET);
    println!();
    println!("     FILE_PATH: optional path to a toml run file");
    println!();
    println!("     The analyzer is preset, put into max-hold, and a burst of marker peak");
    println!("     readings is written to spectrum_<date time>.csv.");
    println!("     Without a FILE_PATH the built-in defaults are used.");
    println!();
    println!("{}{}OPTIONS:{}", BOLD, YELLOW, RESET);
    println!(
        "    {}  -v, --version{}{}    Print version information",
        GREEN, RESET, RESET
    );
    println!(
        "    {}  -h, --help{}{}       Print help information",
        GREEN, RESET, RESET
    );
    println!();
    println!("{}{}EXAMPLES:{}", BOLD, YELLOW, RESET);
    println!("    {} # Built-in defaults (USB analyzer, needs --features visa){}", CYAN, RESET);
    println!("    {} peaklog{}", GREEN, RESET);
    println!("    {} # Simulated analyzer{}", CYAN, RESET);
    println!("    {} peaklog files/simulated.toml{}", GREEN, RESET);
    println!();
}

pub fn print_session(session: &Session) {
    println!();
    println!("Instrument: {}", session.identity);
    for (i, reading) in session.readings.iter().enumerate() {
        // the formatting `{:>8.2}` aligns positive and negative numbers on the decimal
        println!("Reading {:>3}\t{:>8.2} dBm", i, reading);
    }
    println!();
    if let Some(summary) = Summary::from_readings(&session.readings) {
        println!("Peak Summary:");
        println!("-------------");
        println!("{}", summary);
    }
    println!("CSV: {}", session.csv_path.display());
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::transport::SimulatedAnalyzer;

    fn setup_test_dir(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push("peaklog_tests");
        path.push(name);
        path.push(format!(
            "{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::create_dir_all(&path).unwrap();
        path
    }

    #[test]
    fn test_run_function() {
        let test_dir = setup_test_dir("test_run_function");
        let toml_path = test_dir.join("run.toml");
        fs::write(
            &toml_path,
            "[instrument]\nresource = \"SIM\"\n\n[run]\nsettle_seconds = 0.0\ndelay_seconds = 0.0\ncount = 4\n",
        )
        .unwrap();

        let args = vec![
            String::from("program_name"),
            toml_path.to_str().unwrap().to_string(),
        ];
        let _cli_run = Config::run(&args).unwrap();

        let csv_files: Vec<_> = fs::read_dir(&test_dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "csv"))
            .collect();
        assert_eq!(csv_files.len(), 1);
        let content = fs::read_to_string(csv_files[0].path()).unwrap();
        assert_eq!(content.lines().count(), 5);
    }

    #[test]
    fn test_too_many_args() {
        let args = vec![
            String::from("program_name"),
            String::from("a.toml"),
            String::from("b.toml"),
        ];
        assert!(Config::run(&args).is_err());
    }

    #[test]
    fn test_missing_config_file() {
        let args = vec![
            String::from("program_name"),
            String::from("does/not/exist.toml"),
        ];
        assert!(Config::run(&args).is_err());
    }

    #[test]
    fn test_measure_with_clear_write_and_attenuation() {
        let test_dir = setup_test_dir("test_measure_with_clear_write");
        let mut config = RunConfig::default();
        config.run.settle_seconds = 0.0;
        config.run.delay_seconds = 0.0;
        config.run.count = 2;
        config.run.max_hold = false;
        config.run.attenuation_db = Some(6.0);
        config.run.output_dir = test_dir;

        let sim = SimulatedAnalyzer::with_readings(["-10.5", "-11.5"]);
        let session = measure(sim, &config).unwrap();
        assert_eq!(session.readings, vec![-10.5, -11.5]);
        assert_eq!(session.identity, "Simulated,SpectrumAnalyzer,SIM0001,1.0");

        let content = fs::read_to_string(&session.csv_path).unwrap();
        assert_eq!(content, "Frequency,Power\n5825,-10.5\n5826,-11.5\n");
    }

    #[test]
    fn test_version_output_format() {
        let version = env!("CARGO_PKG_VERSION");
        assert!(!version.is_empty());
        // Version should be in format X.Y.Z
        let parts: Vec<&str> = version.split('.').collect();
        assert_eq!(parts.len(), 3, "Version should be in X.Y.Z format");
    }
}
