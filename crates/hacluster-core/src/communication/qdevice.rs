//! Quorum device certificate exchange

use hacluster_comm::{NodeVerdict, RemoteAction, RequestData, ResponseContext};
use hacluster_report::{ReportItem, ReportMessage};

use super::{decode_binary, encode_binary};

fn invalid_response(ctx: &ResponseContext<'_>) -> ReportItem {
    ReportItem::error(ReportMessage::InvalidResponseFormat {
        node: ctx.node.to_string(),
    })
}

/// Fetch the CA certificate of a quorum device server
#[derive(Debug, Clone, Copy, Default)]
pub struct GetCaCertificate;

impl RemoteAction for GetCaCertificate {
    type Output = Vec<u8>;

    fn request(&self) -> RequestData {
        RequestData::new("remote/qdevice_net_get_ca_certificate")
    }

    fn on_success(&self, ctx: &ResponseContext<'_>, body: &str) -> NodeVerdict<Vec<u8>> {
        match decode_binary(body) {
            Some(certificate) => NodeVerdict::accepted(certificate),
            None => NodeVerdict::rejected(invalid_response(ctx)),
        }
    }
}

/// Initialize the quorum device client certificate storage on each node
#[derive(Debug, Clone)]
pub struct InitCertificateStorage {
    pub ca_certificate: Vec<u8>,
}

impl RemoteAction for InitCertificateStorage {
    type Output = ();

    fn request(&self) -> RequestData {
        RequestData::new("remote/qdevice_net_client_init_certificate_storage")
            .with_param("ca_certificate", encode_binary(&self.ca_certificate))
    }

    fn on_success(&self, _ctx: &ResponseContext<'_>, _body: &str) -> NodeVerdict<()> {
        NodeVerdict::accepted(())
    }
}

/// Have a quorum device server sign a cluster certificate request
#[derive(Debug, Clone)]
pub struct SignCertificateRequest {
    pub certificate_request: Vec<u8>,
    pub cluster_name: String,
}

impl RemoteAction for SignCertificateRequest {
    type Output = Vec<u8>;

    fn request(&self) -> RequestData {
        RequestData::new("remote/qdevice_net_sign_node_certificate")
            .with_param(
                "certificate_request",
                encode_binary(&self.certificate_request),
            )
            .with_param("cluster_name", self.cluster_name.as_str())
    }

    fn on_success(&self, ctx: &ResponseContext<'_>, body: &str) -> NodeVerdict<Vec<u8>> {
        match decode_binary(body) {
            Some(certificate) => NodeVerdict::accepted(certificate),
            None => NodeVerdict::rejected(invalid_response(ctx)),
        }
    }
}

/// Import the final client certificate on each node
#[derive(Debug, Clone)]
pub struct ImportCertificate {
    pub certificate: Vec<u8>,
}

impl RemoteAction for ImportCertificate {
    type Output = ();

    fn request(&self) -> RequestData {
        RequestData::new("remote/qdevice_net_client_import_certificate")
            .with_param("certificate", encode_binary(&self.certificate))
    }

    fn on_success(&self, ctx: &ResponseContext<'_>, _body: &str) -> NodeVerdict<()> {
        NodeVerdict::accepted_with(
            (),
            ReportItem::info(ReportMessage::QdeviceCertificateAcceptedByNode {
                node: ctx.node.to_string(),
            }),
        )
    }
}
