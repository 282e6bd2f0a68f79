//! A full measurement run over a raw SCPI socket, against a fake analyzer
//! listening on loopback.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use std::thread;

use peaklog::cli::measure;
use peaklog::{Resource, RunConfig, SocketTransport};

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

fn fake_analyzer(marker_levels: Vec<&'static str>) -> (u16, thread::JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut writer = stream.try_clone().unwrap();
        let reader = BufReader::new(stream);
        let mut levels = marker_levels.into_iter();
        let mut received = Vec::new();
        for line in reader.lines() {
            let line = line.unwrap();
            let answer = match line.as_str() {
                "*IDN?" => Some("Fake,Analyzer,0,0".to_string()),
                "*OPC?" => Some("1".to_string()),
                ":CALibration:EXPired?" => Some("0".to_string()),
                ":CALC:MARK1:Y?" => Some(levels.next().unwrap_or("-99").to_string()),
                _ => None,
            };
            if let Some(answer) = answer {
                writer.write_all(format!("{answer}\r\n").as_bytes()).unwrap();
            }
            received.push(line);
        }
        received
    });
    (port, handle)
}

#[test]
fn measure_over_socket() {
    let (port, handle) = fake_analyzer(vec!["-20.5", "-20.25", "-20.0"]);

    let resource = Resource::parse(&format!("TCPIP0::127.0.0.1::{port}::SOCKET")).unwrap();
    let Resource::Socket { host, port } = resource else {
        panic!("expected a socket resource");
    };

    let output_dir = setup_test_dir("measure_over_socket");

    let mut config = RunConfig::default();
    config.run.settle_seconds = 0.0;
    config.run.delay_seconds = 0.0;
    config.run.count = 3;
    config.run.output_dir = PathBuf::from(&output_dir);

    let transport = SocketTransport::connect((host.as_str(), port)).unwrap();
    let session = measure(transport, &config).unwrap();

    assert_eq!(session.identity, "Fake,Analyzer,0,0");
    assert_eq!(session.readings, vec![-20.5, -20.25, -20.0]);
    assert!(session.csv_path.starts_with(&output_dir));

    let received = handle.join().unwrap();
    assert_eq!(received[0], ":SYST:PRES:Type Fact");
    assert!(received.contains(&":TRACe1:TYPE MAXHold".to_string()));
    assert_eq!(
        received
            .iter()
            .filter(|line| line.as_str() == ":CALCulate:MARKer1:MAXimum")
            .count(),
        3
    );
}
