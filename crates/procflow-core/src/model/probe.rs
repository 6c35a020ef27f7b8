//! ヘルスチェック（プローブ）定義

use crate::error::{ProcessError, Result};
use serde::{Deserialize, Serialize};

/// プローブ定義
///
/// readiness / liveness / startup のいずれにも使われる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Probe {
    #[serde(flatten)]
    pub handler: ProbeHandler,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_delay_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_threshold: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_threshold: Option<u32>,
}

impl Probe {
    pub fn new(handler: ProbeHandler) -> Self {
        Self {
            handler,
            initial_delay_seconds: None,
            period_seconds: None,
            timeout_seconds: None,
            success_threshold: None,
            failure_threshold: None,
        }
    }

    /// プローブ設定を検証する
    ///
    /// `kind` はエラーメッセージ用（"readiness" など）。
    pub fn validate(&self, kind: &str) -> Result<()> {
        match &self.handler {
            ProbeHandler::HttpGet(http) => {
                if http.port == 0 {
                    return Err(ProcessError::PortSource(format!(
                        "{kind} プローブの httpGet.port が 0 です"
                    )));
                }
                if !http.path.starts_with('/') {
                    return Err(ProcessError::PortSource(format!(
                        "{kind} プローブの httpGet.path は '/' で始まる必要があります: {}",
                        http.path
                    )));
                }
            }
            ProbeHandler::TcpSocket(tcp) => {
                if tcp.port == 0 {
                    return Err(ProcessError::PortSource(format!(
                        "{kind} プローブの tcpSocket.port が 0 です"
                    )));
                }
            }
            ProbeHandler::Exec(exec) => {
                if exec.command.is_empty() {
                    return Err(ProcessError::PortSource(format!(
                        "{kind} プローブの exec.command が空です"
                    )));
                }
            }
        }

        let positive = [
            ("periodSeconds", self.period_seconds),
            ("timeoutSeconds", self.timeout_seconds),
            ("successThreshold", self.success_threshold),
            ("failureThreshold", self.failure_threshold),
        ];
        for (field, value) in positive {
            if value == Some(0) {
                return Err(ProcessError::PortSource(format!(
                    "{kind} プローブの {field} は 1 以上である必要があります"
                )));
            }
        }
        Ok(())
    }
}

/// プローブの実行方法
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProbeHandler {
    HttpGet(HttpGetAction),
    TcpSocket(TcpSocketAction),
    Exec(ExecAction),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpGetAction {
    pub path: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TcpSocketAction {
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecAction {
    pub command: Vec<String>,
}

/// Port Source が返すプローブ一式
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Probes {
    pub readiness: Option<Probe>,
    pub liveness: Option<Probe>,
    pub startup: Option<Probe>,
}

impl Probes {
    pub fn validate(&self) -> Result<()> {
        let all = [
            ("readiness", &self.readiness),
            ("liveness", &self.liveness),
            ("startup", &self.startup),
        ];
        for (kind, probe) in all {
            if let Some(probe) = probe {
                probe.validate(kind)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http_probe(path: &str, port: u16) -> Probe {
        Probe::new(ProbeHandler::HttpGet(HttpGetAction {
            path: path.to_string(),
            port,
            scheme: None,
        }))
    }

    #[test]
    fn test_valid_probes() {
        let probes = Probes {
            readiness: Some(http_probe("/healthz", 8080)),
            liveness: Some(Probe::new(ProbeHandler::TcpSocket(TcpSocketAction {
                port: 8080,
            }))),
            startup: None,
        };
        assert!(probes.validate().is_ok());
    }

    #[test]
    fn test_probe_rejects_zero_port() {
        let err = http_probe("/healthz", 0).validate("readiness").unwrap_err();
        assert!(matches!(err, ProcessError::PortSource(_)));
    }

    #[test]
    fn test_probe_rejects_relative_path() {
        assert!(http_probe("healthz", 8080).validate("liveness").is_err());
    }

    #[test]
    fn test_probe_rejects_empty_exec() {
        let probe = Probe::new(ProbeHandler::Exec(ExecAction { command: vec![] }));
        assert!(probe.validate("startup").is_err());
    }

    #[test]
    fn test_probe_rejects_zero_period() {
        let mut probe = http_probe("/", 80);
        probe.period_seconds = Some(0);
        let err = probe.validate("readiness").unwrap_err();
        assert!(err.to_string().contains("periodSeconds"));
    }

    #[test]
    fn test_probe_serialization_is_flat() {
        let json = serde_json::to_value(http_probe("/ready", 3000)).unwrap();
        assert_eq!(json["httpGet"]["path"], "/ready");
        assert_eq!(json["httpGet"]["port"], 3000);
        assert!(json.get("periodSeconds").is_none());
    }
}
