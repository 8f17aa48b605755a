//! Local steps: service state, configuration reload and certificate tools

use std::path::Path;

use tracing::{info, warn};

use hacluster_report::{ReportItem, ReportMessage};

use crate::env::LibraryEnvironment;

const QDEVICE_MODEL: &str = "net";

/// Check whether `service` is active on the local node
///
/// # Errors
/// Returns the failure reason when the service state cannot be queried.
pub async fn is_service_running(
    env: &mut LibraryEnvironment,
    service: &str,
) -> Result<bool, String> {
    let args = vec![
        env.settings().systemctl_binary.display().to_string(),
        "is-active".to_string(),
        format!("{service}.service"),
    ];
    match env.run_local(&args, None).await {
        Ok(result) => Ok(result.success()),
        Err(e) => {
            warn!(service = %service, error = %e, "unable to query service state");
            Err(format!("unable to get {service} state: {e}"))
        }
    }
}

/// Make the running corosync pick up its configuration file
///
/// # Errors
/// Returns the tool output when the reload failed.
pub async fn reload_corosync_config(env: &mut LibraryEnvironment) -> Result<(), String> {
    let args = vec![
        env.settings().corosync_cfgtool().display().to_string(),
        "-R".to_string(),
    ];
    let result = env.run_local(&args, None).await.map_err(|e| e.to_string())?;
    let output = result.joined_output();
    // older corosync prints usage and exits zero on unknown options
    if !result.success() || output.contains("invalid option") {
        return Err(output);
    }
    info!("corosync configuration reloaded");
    Ok(())
}

/// Create a certificate request for this cluster with the local certificate tool
///
/// # Errors
/// Returns the error report to record when the request cannot be produced.
pub async fn generate_certificate_request(
    env: &mut LibraryEnvironment,
    cluster_name: &str,
) -> Result<Vec<u8>, ReportItem> {
    ensure_client_initialized(env).await?;
    let init_error = |reason: String| {
        ReportItem::error(ReportMessage::QdeviceInitializationError {
            model: QDEVICE_MODEL.to_string(),
            reason,
        })
    };

    let args = vec![
        env.settings().qdevice_net_certutil().display().to_string(),
        "-r".to_string(),
        "-n".to_string(),
        cluster_name.to_string(),
    ];
    let result = env
        .run_local(&args, None)
        .await
        .map_err(|e| init_error(e.to_string()))?;
    if !result.success() {
        return Err(init_error(result.joined_output()));
    }
    read_output_certificate(&result.stdout)
        .await
        .map_err(init_error)
}

/// Convert a signed certificate to the pk12 bundle nodes import
///
/// # Errors
/// Returns the error report to record when the conversion fails.
pub async fn signed_certificate_to_pk12(
    env: &mut LibraryEnvironment,
    signed_certificate: &[u8],
) -> Result<Vec<u8>, ReportItem> {
    ensure_client_initialized(env).await?;
    let import_error =
        |reason: String| ReportItem::error(ReportMessage::QdeviceCertificateImportError { reason });

    // the tool only reads files
    let tmpfile = tempfile::Builder::new()
        .prefix("hacluster-qdevice-")
        .tempfile()
        .map_err(|e| import_error(e.to_string()))?;
    tokio::fs::write(tmpfile.path(), signed_certificate)
        .await
        .map_err(|e| import_error(e.to_string()))?;

    let args = vec![
        env.settings().qdevice_net_certutil().display().to_string(),
        "-M".to_string(),
        "-c".to_string(),
        tmpfile.path().display().to_string(),
    ];
    let result = env.run_local(&args, None).await;
    drop(tmpfile);

    let result = result.map_err(|e| import_error(e.to_string()))?;
    if !result.success() {
        return Err(import_error(result.joined_output()));
    }
    read_output_certificate(&result.stdout)
        .await
        .map_err(import_error)
}

async fn ensure_client_initialized(env: &LibraryEnvironment) -> Result<(), ReportItem> {
    let database = env.settings().qdevice_net_client_certs_dir.join("cert8.db");
    if tokio::fs::try_exists(&database).await.unwrap_or(false) {
        Ok(())
    } else {
        Err(ReportItem::error(ReportMessage::QdeviceNotInitialized {
            model: QDEVICE_MODEL.to_string(),
        }))
    }
}

/// Path named by the last `Certificate( request)? stored in <path>` line
fn output_certificate_path(output: &str) -> Option<&str> {
    output
        .lines()
        .filter_map(|line| {
            line.strip_prefix("Certificate request stored in ")
                .or_else(|| line.strip_prefix("Certificate stored in "))
        })
        .filter(|path| !path.is_empty())
        .last()
}

async fn read_output_certificate(output: &str) -> Result<Vec<u8>, String> {
    let Some(path) = output_certificate_path(output) else {
        return Err(output.to_string());
    };
    tokio::fs::read(Path::new(path))
        .await
        .map_err(|e| format!("{path}: {e}"))
}
