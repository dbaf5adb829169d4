mod runner;
mod session;

use cosign_bench::config::BenchmarkConfig;
use cosign_bench::tls::{ClientIdentity, ServerVerification, TlsSettings};
use integration::certificates::TestCertificate;
use integration::test_server::ScriptedServer;
use std::num::NonZeroU32;
use std::sync::Arc;

fn client_tls(client: &TestCertificate, verification: ServerVerification) -> Arc<TlsSettings> {
    let identity =
        ClientIdentity::from_pem(client.cert_pem().as_bytes(), client.key_pem().as_bytes())
            .unwrap();
    Arc::new(TlsSettings::new(Some(identity), verification, "localhost").unwrap())
}

fn bench_config(
    server: &ScriptedServer,
    client: &TestCertificate,
    threads: u32,
    iterations: u32,
) -> BenchmarkConfig {
    BenchmarkConfig::new(
        NonZeroU32::new(threads).unwrap(),
        NonZeroU32::new(iterations).unwrap(),
        "127.0.0.1",
        server.port(),
        client_tls(client, ServerVerification::Skip),
    )
}
