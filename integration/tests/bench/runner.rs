use super::{bench_config, client_tls};
use cosign_bench::config::BenchmarkConfig;
use cosign_bench::runner::BenchmarkRunner;
use cosign_bench::tls::ServerVerification;
use cosign_bench_report::failure_kind::FailureKind;
use cosign_bench_report::report::{BenchmarkReport, REPORT_FILE_NAME};
use integration::certificates::TestCertificate;
use integration::test_server::{ScriptedServer, ServerScript};
use serial_test::parallel;
use std::num::NonZeroU32;
use std::time::Duration;
use tokio::net::TcpListener;

#[tokio::test]
#[parallel]
async fn every_thread_should_run_all_iterations_over_one_connection() {
    let server = ScriptedServer::start(ServerScript::default(), &TestCertificate::localhost()).await;
    let client = TestCertificate::self_signed(&["cosign-bench-client"]);
    let config = bench_config(&server, &client, 4, 5);

    let report = BenchmarkRunner::new(config).run().await.unwrap();

    assert_eq!(report.success_count, 20);
    assert_eq!(report.failure_count, 0);
    assert!(report.errors.is_empty());
    let expected_rate = 20.0 / report.total_time.as_secs_f64();
    assert!((report.average_requests_per_second - expected_rate).abs() <= expected_rate * 0.01);
    assert!(report.success_latency.min <= report.success_latency.p95);
    assert!(report.success_latency.p95 <= report.success_latency.p99);
    assert!(report.success_latency.p99 <= report.success_latency.max);

    let observations = server.wait_for_quits(4).await;
    assert_eq!(observations.connections, 4);
    assert_eq!(observations.handshakes, 4);
    assert_eq!(observations.commands.len(), 20);
    assert_eq!(observations.quits, 4);
}

#[tokio::test]
#[parallel]
async fn all_sessions_should_share_server_name_and_client_certificate() {
    let server = ScriptedServer::start(ServerScript::default(), &TestCertificate::localhost()).await;
    let client = TestCertificate::self_signed(&["cosign-bench-client"]);
    let config = bench_config(&server, &client, 50, 1);

    let report = BenchmarkRunner::new(config).run().await.unwrap();

    assert_eq!(report.success_count, 50);
    let observations = server.wait_for_quits(50).await;
    assert_eq!(observations.server_names.len(), 50);
    assert!(observations
        .server_names
        .iter()
        .all(|name| name.as_deref() == Some("localhost")));
    assert!(observations
        .client_certificates
        .iter()
        .all(|certificate| certificate.as_ref() == Some(client.cert_der())));
}

#[tokio::test]
#[parallel]
async fn unreachable_server_should_fail_every_command() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let client = TestCertificate::self_signed(&["cosign-bench-client"]);
    let config = BenchmarkConfig::new(
        NonZeroU32::new(3).unwrap(),
        NonZeroU32::new(7).unwrap(),
        "127.0.0.1",
        port,
        client_tls(&client, ServerVerification::Skip),
    );

    let report = BenchmarkRunner::new(config).run().await.unwrap();

    assert_eq!(report.success_count, 0);
    assert_eq!(report.failure_count, 21);
    assert_eq!(report.errors.count(FailureKind::NoConnection), 21);
    assert_eq!(report.errors.total(), 21);
}

#[tokio::test]
#[parallel]
async fn mixed_outcomes_should_be_tallied_by_kind_and_message() {
    let script = ServerScript::default().with_command_responses(&["250 ok", "500 denied"]);
    let server = ScriptedServer::start(script, &TestCertificate::localhost()).await;
    let client = TestCertificate::self_signed(&["cosign-bench-client"]);
    let config = bench_config(&server, &client, 2, 4);

    let report = BenchmarkRunner::new(config).run().await.unwrap();

    assert_eq!(report.success_count, 4);
    assert_eq!(report.failure_count, 4);
    let tally = report.errors.get(FailureKind::FailResponse).unwrap();
    assert_eq!(tally.count, 4);
    assert_eq!(tally.messages.get("500 denied"), Some(&4));
}

#[tokio::test]
#[parallel]
async fn verified_mode_should_trust_configured_ca() {
    let server_certificate = TestCertificate::localhost();
    let server = ScriptedServer::start(ServerScript::default(), &server_certificate).await;
    let client = TestCertificate::self_signed(&["cosign-bench-client"]);
    let verification =
        ServerVerification::with_ca_pem(server_certificate.cert_pem().as_bytes()).unwrap();
    let config = BenchmarkConfig::new(
        NonZeroU32::new(2).unwrap(),
        NonZeroU32::new(2).unwrap(),
        "127.0.0.1",
        server.port(),
        client_tls(&client, verification),
    );

    let report = BenchmarkRunner::new(config).run().await.unwrap();

    assert_eq!(report.success_count, 4);
    assert!(report.params.verify_certificate);
}

#[tokio::test]
#[parallel]
async fn verified_mode_should_reject_unknown_issuer() {
    let server = ScriptedServer::start(ServerScript::default(), &TestCertificate::localhost()).await;
    let client = TestCertificate::self_signed(&["cosign-bench-client"]);
    let config = BenchmarkConfig::new(
        NonZeroU32::new(2).unwrap(),
        NonZeroU32::new(3).unwrap(),
        "127.0.0.1",
        server.port(),
        client_tls(&client, ServerVerification::webpki_roots()),
    );

    let report = BenchmarkRunner::new(config).run().await.unwrap();

    assert_eq!(report.failure_count, 6);
    assert_eq!(report.errors.count(FailureKind::HandshakeFailure), 6);
}

#[tokio::test]
#[parallel]
async fn report_should_be_written_to_output_directory() {
    let server = ScriptedServer::start(ServerScript::default(), &TestCertificate::localhost()).await;
    let client = TestCertificate::self_signed(&["cosign-bench-client"]);
    let output_dir = tempfile::tempdir().unwrap();
    let mut config = bench_config(&server, &client, 2, 3);
    config.output_dir = Some(output_dir.path().to_path_buf());
    config.timeout = Some(Duration::from_secs(5));
    config.identifier = Some("integration".to_owned());

    let report = BenchmarkRunner::new(config).run().await.unwrap();

    let json = std::fs::read_to_string(output_dir.path().join(REPORT_FILE_NAME)).unwrap();
    let saved: BenchmarkReport = serde_json::from_str(&json).unwrap();
    assert_eq!(saved.uuid, report.uuid);
    assert_eq!(saved.identifier, "integration");
    assert_eq!(saved.success_count, 6);
    assert_eq!(saved.params.timeout.as_deref(), Some("5s"));
}
