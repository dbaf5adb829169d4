use super::bench_config;
use cosign_bench::actors::session::Session;
use cosign_bench::analytics::record::{CommandStatus, ResultRecord};
use cosign_bench_report::failure_kind::FailureKind;
use integration::certificates::TestCertificate;
use integration::test_server::{ScriptedServer, ServerScript, DEFAULT_COMMAND_RESPONSE};
use serial_test::parallel;
use std::time::Duration;

async fn run_single_session(
    server: &ScriptedServer,
    iterations: u32,
    timeout: Duration,
) -> Vec<ResultRecord> {
    let client = TestCertificate::self_signed(&["cosign-bench-client"]);
    let mut config = bench_config(server, &client, 1, iterations);
    config.timeout = Some(timeout);
    let (sender, receiver) = flume::unbounded();
    Session::new(1, config.job()).run(&sender).await.unwrap();
    drop(sender);
    receiver.drain().collect()
}

fn failure_kinds(records: &[ResultRecord]) -> Vec<Option<FailureKind>> {
    records
        .iter()
        .map(|record| match &record.status {
            CommandStatus::Success { .. } => None,
            CommandStatus::Failure(failure) => Some(failure.kind),
        })
        .collect()
}

#[tokio::test]
#[parallel]
async fn session_should_follow_protocol_sequence() {
    let server = ScriptedServer::start(ServerScript::default(), &TestCertificate::localhost()).await;

    let records = run_single_session(&server, 3, Duration::from_secs(5)).await;

    assert_eq!(records.len(), 3);
    for (index, record) in records.iter().enumerate() {
        assert_eq!(record.worker_id, 1);
        assert_eq!(record.iteration, index as u32 + 1);
        assert_eq!(
            record.status,
            CommandStatus::Success {
                response: DEFAULT_COMMAND_RESPONSE.to_owned()
            }
        );
    }

    let observations = server.wait_for_quits(1).await;
    assert_eq!(observations.connections, 1);
    assert_eq!(observations.starttls_requests, 1);
    assert_eq!(observations.handshakes, 1);
    assert_eq!(observations.commands, vec!["NOOP"; 3]);
    assert_eq!(observations.quits, 1);
}

#[tokio::test]
#[parallel]
async fn session_should_classify_each_response_independently() {
    let script = ServerScript::default().with_command_responses(&[
        "231 Cosign login",
        "500 Unknown command",
        "534 Cosign rekey",
        "250",
    ]);
    let server = ScriptedServer::start(script, &TestCertificate::localhost()).await;

    let records = run_single_session(&server, 4, Duration::from_secs(5)).await;

    assert_eq!(
        failure_kinds(&records),
        vec![None, Some(FailureKind::FailResponse), None, None]
    );
    assert_eq!(records[1].status.to_string(), "FAILRESPONSE 500 Unknown command");
    assert_eq!(server.wait_for_quits(1).await.quits, 1);
}

#[tokio::test]
#[parallel]
async fn rejected_banner_should_fail_every_iteration_without_starttls() {
    let script = ServerScript::default().with_banner("421 Service not available");
    let server = ScriptedServer::start(script, &TestCertificate::localhost()).await;

    let records = run_single_session(&server, 5, Duration::from_secs(5)).await;

    assert_eq!(failure_kinds(&records), vec![Some(FailureKind::BadResponse); 5]);
    assert_eq!(
        records[0].status.to_string(),
        "BADRESPONSE 421 Service not available"
    );
    let observations = server.wait_for_quits(1).await;
    assert_eq!(observations.starttls_requests, 0);
    assert_eq!(observations.handshakes, 0);
    assert!(observations.commands.is_empty());
}

#[tokio::test]
#[parallel]
async fn refused_starttls_should_fail_every_iteration() {
    let script = ServerScript::default().with_starttls_ack("454 TLS not available");
    let server = ScriptedServer::start(script, &TestCertificate::localhost()).await;

    let records = run_single_session(&server, 2, Duration::from_secs(5)).await;

    assert_eq!(
        failure_kinds(&records),
        vec![Some(FailureKind::StartTlsFailure); 2]
    );
    let observations = server.wait_for_quits(1).await;
    assert_eq!(observations.starttls_requests, 1);
    assert_eq!(observations.handshakes, 0);
}

#[tokio::test]
#[parallel]
async fn dropped_upgrade_should_fail_handshake_for_every_iteration() {
    let script = ServerScript::default().hanging_up_after_ack();
    let server = ScriptedServer::start(script, &TestCertificate::localhost()).await;

    let records = run_single_session(&server, 3, Duration::from_secs(5)).await;

    assert_eq!(
        failure_kinds(&records),
        vec![Some(FailureKind::HandshakeFailure); 3]
    );
    assert!(records.iter().all(|record| record.elapsed == records[0].elapsed));
}

#[tokio::test]
#[parallel]
async fn slow_response_should_fail_remaining_commands_without_resending() {
    let script = ServerScript::default().with_response_delay(Duration::from_millis(300));
    let server = ScriptedServer::start(script, &TestCertificate::localhost()).await;

    let records = run_single_session(&server, 3, Duration::from_millis(100)).await;

    assert_eq!(failure_kinds(&records), vec![Some(FailureKind::FailResponse); 3]);
    for (index, record) in records.iter().enumerate() {
        assert_eq!(record.iteration, index as u32 + 1);
        assert_eq!(record.status.to_string(), "FAILRESPONSE timed out after 100ms");
        assert_eq!(record.elapsed, records[0].elapsed);
    }
    assert!(records[0].elapsed >= Duration::from_millis(100));
    let observations = server.observations();
    assert_eq!(observations.handshakes, 1);
    assert_eq!(observations.commands, vec!["NOOP"]);
}
