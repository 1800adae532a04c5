//! End-to-end engine behavior with a canned scanner.

use async_trait::async_trait;
use scanvault::error::{ParseFailure, ScanFailure};
use scanvault::runner::RawOutput;
use scanvault::storage::ScanStore;
use scanvault::{HostStatus, OutputMode, ScanEngine, ScanRunner, ScanTarget};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Replays fixed output per mode and records what it was asked to scan.
#[derive(Clone, Default)]
struct CannedScanner {
    text: &'static str,
    xml: &'static str,
    failure: Option<fn() -> ScanFailure>,
    seen: Arc<Mutex<Vec<(String, OutputMode)>>>,
}

#[async_trait]
impl ScanRunner for CannedScanner {
    async fn run(&self, target: &ScanTarget, mode: OutputMode) -> Result<RawOutput, ScanFailure> {
        self.seen
            .lock()
            .unwrap()
            .push((target.as_str().to_string(), mode));
        tokio::time::sleep(Duration::from_millis(10)).await;

        if let Some(failure) = self.failure {
            return Err(failure());
        }
        let stdout = match mode {
            OutputMode::Text => self.text,
            OutputMode::Xml => self.xml,
        };
        Ok(RawOutput {
            stdout: stdout.to_string(),
            stderr: String::new(),
            elapsed: Duration::from_millis(10),
        })
    }
}

const TEXT: &str = "\
Starting Nmap 7.97 ( https://nmap.org ) at 2025-08-28 12:50 +0530
Nmap scan report for router.lan (192.168.1.1)
Host is up (0.0021s latency).
PORT    STATE  SERVICE VERSION
53/tcp  open   domain  dnsmasq 2.89
80/tcp  open   http    lighttpd 1.4.59
443/tcp closed https
";

const XML: &str = r#"<?xml version="1.0"?>
<!DOCTYPE nmaprun>
<nmaprun scanner="nmap" start="1756365600" version="7.97">
<host><status state="up"/><address addr="192.168.1.1" addrtype="ipv4"/><address addr="AA:BB:CC:DD:EE:FF" addrtype="mac"/>
<hostnames><hostname name="router.lan" type="PTR"/></hostnames>
<ports>
<port protocol="tcp" portid="53"><state state="open" reason="syn-ack"/><service name="domain" product="dnsmasq" version="2.89"/></port>
<port protocol="tcp" portid="80"><state state="open" reason="syn-ack"/><service name="http" product="lighttpd" version="1.4.59"/></port>
<port protocol="tcp" portid="443"><state state="closed" reason="reset"/><service name="https" method="table" conf="3"/></port>
</ports>
<times srtt="2100" rttvar="2100" to="100000"/>
</host>
</nmaprun>"#;

fn scanner() -> CannedScanner {
    CannedScanner {
        text: TEXT,
        xml: XML,
        ..CannedScanner::default()
    }
}

#[tokio::test]
async fn text_and_xml_modes_produce_the_same_record() {
    let runner = scanner();
    let engine = ScanEngine::new(runner.clone());

    let text = engine.scan("router.lan", OutputMode::Text).await.unwrap();
    let xml = engine.scan("router.lan", OutputMode::Xml).await.unwrap();

    assert_eq!(text.host.address, "192.168.1.1");
    assert_eq!(text.host.hostname, xml.host.hostname);
    assert_eq!(text.host.address, xml.host.address);
    assert_eq!(text.host.status, HostStatus::Up);
    assert_eq!(xml.host.status, HostStatus::Up);
    assert!((text.host.latency_seconds - xml.host.latency_seconds).abs() < 1e-9);
    let xml_ports: Vec<_> = xml
        .ports
        .iter()
        .cloned()
        .map(|mut port| {
            port.extra_info = None;
            port
        })
        .collect();
    assert_eq!(text.ports, xml_ports);

    let seen = runner.seen.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![
            ("router.lan".to_string(), OutputMode::Text),
            ("router.lan".to_string(), OutputMode::Xml),
        ]
    );
}

#[tokio::test]
async fn option_like_target_is_rejected_before_launch() {
    let runner = scanner();
    let engine = ScanEngine::new(runner.clone());

    let err = engine.scan("-iL /etc/passwd", OutputMode::Xml).await.unwrap_err();
    assert_eq!(err.kind(), "invalid_target");
    assert!(runner.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn runner_failures_pass_through_unchanged() {
    let engine = ScanEngine::new(CannedScanner {
        failure: Some(|| ScanFailure::Timeout(Duration::from_secs(300))),
        ..scanner()
    });
    let err = engine.scan("10.0.0.5", OutputMode::Xml).await.unwrap_err();
    assert!(matches!(err, ScanFailure::Timeout(limit) if limit == Duration::from_secs(300)));

    let engine = ScanEngine::new(CannedScanner {
        failure: Some(|| ScanFailure::execution_failed(Some(1), "Failed to resolve \"nope\".")),
        ..scanner()
    });
    let err = engine.scan("nope", OutputMode::Text).await.unwrap_err();
    assert_eq!(err.kind(), "execution_failed");
    assert!(err.to_string().contains("Failed to resolve"));
}

#[tokio::test]
async fn empty_output_is_a_parse_failure() {
    let engine = ScanEngine::new(CannedScanner::default());

    let err = engine.scan("10.0.0.5", OutputMode::Text).await.unwrap_err();
    assert!(matches!(err, ScanFailure::Parse(ParseFailure::NoHostFound)));
    let err = engine.scan("10.0.0.5", OutputMode::Xml).await.unwrap_err();
    assert_eq!(err.kind(), "parse_failure");
}

#[tokio::test]
async fn concurrent_scans_are_independent() {
    let runner = scanner();
    let engine = Arc::new(ScanEngine::new(runner.clone()));

    let handles: Vec<_> = ["10.0.0.1", "10.0.0.2", "10.0.0.3"]
        .into_iter()
        .map(|target| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.scan(target, OutputMode::Xml).await })
        })
        .collect();

    for handle in handles {
        let result = handle.await.unwrap().unwrap();
        assert_eq!(result.ports.len(), 3);
    }
    assert_eq!(runner.seen.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn stored_scans_round_trip_through_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = ScanStore::at(dir.path().join("scans")).unwrap();
    let engine = ScanEngine::new(scanner());

    let result = engine.scan("router.lan", OutputMode::Xml).await.unwrap();
    let record = store.save("router.lan", &result).unwrap();

    let loaded = store.find(&record.id.short()).unwrap();
    assert_eq!(loaded.target, "router.lan");
    assert_eq!(loaded.result.host.address, result.host.address);
    assert_eq!(loaded.result.ports, result.ports);
    assert_eq!(loaded.open_ports(), 2);
    assert_eq!(store.list().unwrap().len(), 1);
}
