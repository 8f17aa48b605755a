mod common;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tempfile::TempDir;

use hacluster_comm::mock::MockTransport;
use hacluster_core::commands::{
    CorosyncConfPush, add_device_net, provision_net_certificates, qdevice_client_on_nodes,
};
use hacluster_core::{CoreError, LibraryEnvironment, PipelineState, PipelineStep, Settings};
use hacluster_exec::mock::MockRunner;
use hacluster_exec::{CommandResult, CommandRunner, ExecError};
use hacluster_report::{ReportCode, ServiceAction, Severity};

use common::*;

const GET_CA: &str = "remote/qdevice_net_get_ca_certificate";
const INIT_STORAGE: &str = "remote/qdevice_net_client_init_certificate_storage";
const SIGN: &str = "remote/qdevice_net_sign_node_certificate";
const IMPORT: &str = "remote/qdevice_net_client_import_certificate";

/// Stands in for the certificate tool and systemctl
///
/// Requests are written as `request`, converted certificates as `pk12`; the
/// conversion records the content of the file it was given.
struct CertutilRunner {
    dir: PathBuf,
    converted: Mutex<Vec<Vec<u8>>>,
}

impl CertutilRunner {
    fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            converted: Mutex::new(Vec::new()),
        }
    }

    fn store(&self, file: &str, data: &[u8], message: &str) -> CommandResult {
        let path = self.dir.join(file);
        std::fs::write(&path, data).unwrap();
        CommandResult::new(0, format!("{message} {}\n", path.display()), "")
    }
}

#[async_trait]
impl CommandRunner for CertutilRunner {
    async fn run(&self, args: &[String], _stdin: Option<&str>) -> Result<CommandResult, ExecError> {
        match args.get(1).map(String::as_str) {
            Some("-r") => {
                assert_eq!(args[2..], ["-n".to_string(), "cluster".to_string()]);
                Ok(self.store("qdevice-net-node.crq", b"request", "Certificate request stored in"))
            }
            Some("-M") => {
                let signed = std::fs::read(&args[3]).unwrap();
                self.converted.lock().unwrap().push(signed);
                Ok(self.store("qdevice-net-node.p12", b"pk12", "Certificate stored in"))
            }
            Some("is-active") => Ok(CommandResult::new(3, "inactive\n", "")),
            _ => panic!("unexpected command: {args:?}"),
        }
    }

    fn runner_type(&self) -> &'static str {
        "certutil"
    }
}

/// Certificate database directory of an initialized client
fn initialized_client() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("cert8.db"), b"").unwrap();
    dir
}

fn with_certs_dir(env: LibraryEnvironment, dir: &Path) -> LibraryEnvironment {
    env.with_settings(Settings {
        qdevice_net_client_certs_dir: dir.to_path_buf(),
        ..Settings::default()
    })
}

fn b64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

fn queue_provisioning(transport: &MockTransport, nodes: &[&str]) {
    transport.respond("qnetd-b", GET_CA, 200, &b64(b"ca"));
    transport.respond("qnetd-b", SIGN, 200, &b64(b"signed"));
    for node in nodes {
        transport.respond(node, INIT_STORAGE, 200, "");
        transport.respond(node, IMPORT, 200, "");
    }
}

fn qnetd_hosts() -> Vec<String> {
    vec!["qnetd-a".to_string(), "qnetd-b".to_string()]
}

// ============================================================================
// Certificate provisioning
// ============================================================================

#[tokio::test]
async fn test_provision_certificates() {
    let certs = initialized_client();
    let transport = Arc::new(MockTransport::new());
    queue_provisioning(&transport, &["node1", "node2"]);
    let runner = Arc::new(CertutilRunner::new(certs.path()));
    let env = environment(&["node1", "node2"], &transport, runner.clone());
    let mut env = with_certs_dir(env, certs.path());

    let state = provision_net_certificates(&mut env, &qnetd_hosts(), false)
        .await
        .unwrap();

    // qnetd-a is unreachable, qnetd-b takes over
    assert_eq!(state, PipelineState::SucceededWithWarnings);
    assert!(!env.report_processor().must_abort());
    assert_eq!(transport.hosts_called(GET_CA), vec!["qnetd-a", "qnetd-b"]);
    assert_eq!(transport.hosts_called(SIGN), vec!["qnetd-a", "qnetd-b"]);
    assert_eq!(*runner.converted.lock().unwrap(), vec![b"signed".to_vec()]);

    let calls = transport.calls();
    let sign = calls
        .iter()
        .find(|call| call.action == SIGN && call.host == "qnetd-b")
        .unwrap();
    assert_eq!(
        sign.params,
        vec![
            ("certificate_request".to_string(), b64(b"request")),
            ("cluster_name".to_string(), "cluster".to_string()),
        ]
    );
    let init = calls.iter().find(|call| call.action == INIT_STORAGE).unwrap();
    assert_eq!(init.params, vec![("ca_certificate".to_string(), b64(b"ca"))]);
    let imports: Vec<_> = calls.iter().filter(|call| call.action == IMPORT).collect();
    assert_eq!(imports.len(), 2);
    assert!(imports
        .iter()
        .all(|call| call.params == vec![("certificate".to_string(), b64(b"pk12"))]));

    let reports = visible(env.reports());
    assert_eq!(
        reports[0].0,
        ReportCode::QdeviceCertificateDistributionStarted
    );
    let accepted: Vec<_> = reports
        .iter()
        .filter(|(code, ..)| *code == ReportCode::QdeviceCertificateAcceptedByNode)
        .map(|(.., node)| node.clone().unwrap())
        .collect();
    assert_eq!(accepted, vec!["node1", "node2"]);
    assert!(reports.iter().all(|(_, severity, ..)| *severity != Severity::Error));
}

#[tokio::test]
async fn test_ca_unavailable_aborts() {
    let transport = Arc::new(MockTransport::new());
    transport.respond("qnetd-b", GET_CA, 200, "this is not base64 !");
    let mut env = environment(&["node1"], &transport, Arc::new(MockRunner::new()));

    let state = provision_net_certificates(&mut env, &qnetd_hosts(), true)
        .await
        .unwrap();

    assert_eq!(
        state,
        PipelineState::Aborted {
            step: PipelineStep::FetchCaCertificate
        }
    );
    assert_eq!(
        codes(env.reports()),
        vec![
            ReportCode::QdeviceCertificateDistributionStarted,
            ReportCode::NodeCommunicationNoMoreAddresses,
            ReportCode::NodeCommunicationErrorUnableToConnect,
            ReportCode::InvalidResponseFormat,
            ReportCode::UnableToPerformOperationOnAnyNode,
        ]
    );
    assert!(transport.hosts_called(INIT_STORAGE).is_empty());
}

#[tokio::test]
async fn test_uninitialized_client_aborts() {
    let certs = tempfile::tempdir().unwrap();
    let transport = Arc::new(MockTransport::new());
    queue_provisioning(&transport, &["node1"]);
    let runner = Arc::new(MockRunner::new());
    let env = environment(&["node1"], &transport, runner.clone());
    let mut env = with_certs_dir(env, certs.path());

    let state = provision_net_certificates(&mut env, &qnetd_hosts(), false)
        .await
        .unwrap();

    assert_eq!(
        state,
        PipelineState::Aborted {
            step: PipelineStep::CertificateRequest
        }
    );
    let last = env.reports().last().unwrap();
    assert_eq!(last.code(), ReportCode::QdeviceNotInitialized);
    assert!(last.is_error());
    assert!(runner.calls().is_empty());
    assert!(transport.hosts_called(SIGN).is_empty());
}

#[tokio::test]
async fn test_offline_node_skipped_during_import() {
    let certs = initialized_client();
    let transport = Arc::new(MockTransport::new());
    queue_provisioning(&transport, &["node1"]);
    transport.respond("node2", INIT_STORAGE, 200, "");
    let runner = Arc::new(CertutilRunner::new(certs.path()));
    let env = environment(&["node1", "node2"], &transport, runner);
    let mut env = with_certs_dir(env, certs.path());

    let state = provision_net_certificates(&mut env, &qnetd_hosts(), true)
        .await
        .unwrap();

    assert_eq!(state, PipelineState::SucceededWithWarnings);
    assert!(visible(env.reports()).contains(&(
        ReportCode::NodeCommunicationErrorUnableToConnect,
        Severity::Warning,
        None,
        Some("node2".to_string())
    )));
}

#[tokio::test]
async fn test_no_qnetd_host() {
    let transport = Arc::new(MockTransport::new());
    let mut env = environment(&["node1"], &transport, Arc::new(MockRunner::new()));

    let result = provision_net_certificates(&mut env, &[], false).await;

    assert!(matches!(result, Err(CoreError::Library(_))));
    assert!(env.reports().is_empty());
    assert!(transport.calls().is_empty());
}

// ============================================================================
// Client service on nodes
// ============================================================================

#[tokio::test]
async fn test_enable_client_on_nodes() {
    let transport = Arc::new(MockTransport::new());
    transport.respond("node1", "remote/qdevice_client_enable", 200, "corosync-qdevice enabled");
    transport.respond(
        "node2",
        "remote/qdevice_client_enable",
        200,
        "corosync is not enabled, skipping",
    );
    let mut env = environment(&["node1", "node2"], &transport, Arc::new(MockRunner::new()));

    let state = qdevice_client_on_nodes(&mut env, ServiceAction::Enable, false).await;

    assert_eq!(state, PipelineState::Succeeded);
    assert_eq!(
        codes(env.reports()),
        vec![
            ReportCode::ServiceEnableStarted,
            ReportCode::ServiceEnableSuccess,
            ReportCode::ServiceEnableSkipped,
        ]
    );
}

#[tokio::test]
async fn test_disable_client_failure() {
    let transport = Arc::new(MockTransport::new());
    transport.respond("node1", "remote/qdevice_client_disable", 401, "");
    let mut env = environment(&["node1"], &transport, Arc::new(MockRunner::new()));

    let state = qdevice_client_on_nodes(&mut env, ServiceAction::Disable, false).await;

    assert_eq!(
        state,
        PipelineState::Aborted {
            step: PipelineStep::ServiceCommand
        }
    );
    assert!(codes(env.reports()).contains(&ReportCode::NodeCommunicationErrorNotAuthorized));
}

// ============================================================================
// Adding a device
// ============================================================================

#[tokio::test]
async fn test_add_device_runs_steps_in_order() {
    let certs = initialized_client();
    let transport = Arc::new(MockTransport::new());
    queue_provisioning(&transport, &["node1"]);
    transport.respond("node1", "remote/qdevice_client_enable", 200, "corosync-qdevice enabled");
    transport.respond("node1", SET_CONF, 200, "Succeeded");
    transport.respond("node1", "remote/qdevice_client_start", 200, "corosync-qdevice started");
    let runner = Arc::new(CertutilRunner::new(certs.path()));
    let env = environment(&["node1"], &transport, runner);
    let mut env = with_certs_dir(env, certs.path());
    let conf = CorosyncConfPush::new("quorum {\n    device {\n        model: net\n    }\n}\n");

    let state = add_device_net(&mut env, &qnetd_hosts(), &conf, false)
        .await
        .unwrap();

    assert_eq!(state, PipelineState::SucceededWithWarnings);
    let node_actions: Vec<_> = transport
        .calls()
        .into_iter()
        .filter(|call| call.host == "node1")
        .map(|call| call.action)
        .collect();
    assert_eq!(
        node_actions,
        vec![
            INIT_STORAGE,
            IMPORT,
            "remote/qdevice_client_enable",
            SET_CONF,
            "remote/qdevice_client_start",
        ]
    );
}

#[tokio::test]
async fn test_add_device_stops_when_enable_fails() {
    let certs = initialized_client();
    let transport = Arc::new(MockTransport::new());
    queue_provisioning(&transport, &["node1"]);
    transport.respond("node1", "remote/qdevice_client_enable", 400, "Unable to enable");
    let runner = Arc::new(CertutilRunner::new(certs.path()));
    let env = environment(&["node1"], &transport, runner);
    let mut env = with_certs_dir(env, certs.path());

    let state = add_device_net(&mut env, &qnetd_hosts(), &CorosyncConfPush::new("quorum {}"), false)
        .await
        .unwrap();

    assert_eq!(
        state,
        PipelineState::Aborted {
            step: PipelineStep::EnableService
        }
    );
    assert!(transport.hosts_called(SET_CONF).is_empty());
}
