//! Booth configuration exchange

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::json;

use hacluster_comm::{NodeVerdict, RemoteAction, RequestData, ResponseContext};
use hacluster_report::{Problem, ReportItem, ReportMessage};

use super::{decode_binary, encode_binary};

/// Booth authentication key file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoothAuthfile {
    /// File name relative to the booth configuration directory
    pub name: String,
    pub data: Vec<u8>,
}

/// Booth configuration as returned by a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedBoothConfig {
    pub config: String,
    pub authfile: Option<BoothAuthfile>,
}

/// File name of the configuration of booth instance `name`
#[must_use]
pub fn config_file_name(name: &str) -> String {
    format!("{name}.conf")
}

/// Save a booth configuration and its authfile on each node
#[derive(Debug, Clone)]
pub struct BoothSendConfig {
    pub name: String,
    pub config: String,
    pub authfile: Option<BoothAuthfile>,
    pub rewrite_existing: bool,
}

impl BoothSendConfig {
    pub fn new(name: impl Into<String>, config: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: config.into(),
            authfile: None,
            rewrite_existing: true,
        }
    }

    #[must_use]
    pub fn with_authfile(mut self, authfile: BoothAuthfile) -> Self {
        self.authfile = Some(authfile);
        self
    }

    fn data_json(&self) -> String {
        let mut data = json!({
            "config": {
                "name": config_file_name(&self.name),
                "data": self.config,
            },
        });
        if let Some(authfile) = &self.authfile {
            data["authfile"] = json!({
                "name": authfile.name,
                "data": encode_binary(&authfile.data),
            });
        }
        data.to_string()
    }
}

/// Answer of `booth_set_config`; agents predating it reply with plain text
#[derive(Debug, Default, Deserialize)]
struct SaveResult {
    #[serde(default)]
    failed: BTreeMap<String, String>,
}

impl RemoteAction for BoothSendConfig {
    type Output = ();

    fn request(&self) -> RequestData {
        let request =
            RequestData::new("remote/booth_set_config").with_param("data_json", self.data_json());
        if self.rewrite_existing {
            request.with_param("rewrite_existing", "1")
        } else {
            request
        }
    }

    fn started(&self) -> Vec<ReportItem> {
        vec![ReportItem::info(ReportMessage::BoothConfigDistributionStarted)]
    }

    fn on_success(&self, ctx: &ResponseContext<'_>, body: &str) -> NodeVerdict<()> {
        let result = serde_json::from_str::<SaveResult>(body).unwrap_or_default();
        if result.failed.is_empty() {
            return NodeVerdict::accepted_with(
                (),
                ReportItem::info(ReportMessage::BoothConfigAcceptedByNode {
                    node: Some(ctx.node.to_string()),
                    name_list: vec![self.name.clone()],
                }),
            );
        }
        let reports = result
            .failed
            .into_iter()
            .map(|(file, reason)| {
                ReportItem::error(ReportMessage::BoothConfigDistributionNodeError {
                    node: ctx.node.to_string(),
                    reason,
                    name: Some(file),
                })
            })
            .collect();
        NodeVerdict::Rejected { reports }
    }

    fn on_failure(
        &self,
        ctx: &ResponseContext<'_>,
        reason: &str,
        problem: Problem,
    ) -> Vec<ReportItem> {
        vec![ReportItem::from_problem(
            problem,
            ReportMessage::BoothConfigDistributionNodeError {
                node: ctx.node.to_string(),
                reason: reason.to_string(),
                name: Some(self.name.clone()),
            },
        )]
    }
}

/// Fetch the configuration of one booth instance from a node
#[derive(Debug, Clone)]
pub struct BoothGetConfig {
    pub name: String,
}

impl BoothGetConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigPayload {
    data: String,
}

#[derive(Debug, Deserialize)]
struct AuthfilePayload {
    name: Option<String>,
    #[serde(default)]
    data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GetConfigResponse {
    config: ConfigPayload,
    #[serde(default)]
    authfile: Option<AuthfilePayload>,
}

/// Decode a `booth_get_config` answer; `None` when malformed
fn parse_fetched_config(body: &str) -> Option<FetchedBoothConfig> {
    let response: GetConfigResponse = serde_json::from_str(body).ok()?;
    let authfile = match response.authfile {
        Some(AuthfilePayload {
            name: Some(name),
            data: Some(data),
        }) if !name.is_empty() && !data.is_empty() => Some(BoothAuthfile {
            name,
            data: decode_binary(&data)?,
        }),
        _ => None,
    };
    Some(FetchedBoothConfig {
        config: response.config.data,
        authfile,
    })
}

impl RemoteAction for BoothGetConfig {
    type Output = FetchedBoothConfig;

    fn request(&self) -> RequestData {
        RequestData::new("remote/booth_get_config").with_param("name", self.name.as_str())
    }

    fn on_success(&self, ctx: &ResponseContext<'_>, body: &str) -> NodeVerdict<FetchedBoothConfig> {
        match parse_fetched_config(body) {
            Some(config) => NodeVerdict::accepted(config),
            None => NodeVerdict::rejected(ReportItem::error(
                ReportMessage::InvalidResponseFormat {
                    node: ctx.node.to_string(),
                },
            )),
        }
    }
}
