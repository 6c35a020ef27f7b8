//! ラベル・アノテーションのオーバーレイ定義

use crate::error::{ProcessError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

const QUALIFIED_NAME_MAX_LEN: usize = 63;
const PREFIX_MAX_LEN: usize = 253;
const LABEL_VALUE_MAX_LEN: usize = 63;

const NAME_PATTERN: &str = r"^([A-Za-z0-9][-A-Za-z0-9_.]*)?[A-Za-z0-9]$";
const PREFIX_PATTERN: &str = r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$";

/// デプロイメントのリビジョン番号（最初のデプロイは 1）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeploymentVersion(pub u32);

impl Default for DeploymentVersion {
    fn default() -> Self {
        Self(1)
    }
}

impl fmt::Display for DeploymentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// メタデータの適用先リソース
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    Deployment,
    Service,
    Pod,
}

impl Target {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "deployment" => Some(Self::Deployment),
            "service" => Some(Self::Service),
            "pod" => Some(Self::Pod),
            _ => None,
        }
    }
}

/// ラベルとして使うかアノテーションとして使うか
///
/// 項目そのものではなく、どのオーバーレイ一覧から来たかで決まる。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataKind {
    Label,
    Annotation,
}

/// メタデータのオーバーレイ項目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataItem {
    pub target: Target,
    /// 空なら全プロセスに適用
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_name: Option<String>,
    /// 0 または未指定なら全バージョンに適用
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_version: Option<u32>,
    pub apply: BTreeMap<String, String>,
}

impl MetadataItem {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            process_name: None,
            deployment_version: None,
            apply: BTreeMap::new(),
        }
    }

    pub fn with_process(mut self, name: impl Into<String>) -> Self {
        self.process_name = Some(name.into());
        self
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.deployment_version = Some(version);
        self
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.apply.insert(key.into(), value.into());
        self
    }

    /// 項目の内容を検証する
    ///
    /// キーは `[prefix/]name` 形式。ラベルの場合は値も検証する。
    pub fn validate(&self, kind: MetadataKind) -> Result<()> {
        if self.apply.is_empty() {
            return Err(ProcessError::invalid_item(None, "apply が空です"));
        }
        let rules = KeyRules::new()?;
        for (key, value) in &self.apply {
            rules.validate_qualified_name(key)?;
            if kind == MetadataKind::Label && !rules.is_valid_label_value(value) {
                return Err(ProcessError::invalid_item(
                    Some(key),
                    format!("ラベル値が不正です: '{}'", value),
                ));
            }
        }
        Ok(())
    }
}

struct KeyRules {
    name: Regex,
    prefix: Regex,
}

impl KeyRules {
    fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| {
                ProcessError::InvalidConfig(format!("正規表現のコンパイルエラー: {}", e))
            })
        };
        Ok(Self {
            name: compile(NAME_PATTERN)?,
            prefix: compile(PREFIX_PATTERN)?,
        })
    }

    fn validate_qualified_name(&self, key: &str) -> Result<()> {
        let name = match key.split_once('/') {
            Some((prefix, name)) => {
                if prefix.is_empty()
                    || prefix.len() > PREFIX_MAX_LEN
                    || !self.prefix.is_match(prefix)
                {
                    return Err(ProcessError::invalid_item(
                        Some(key),
                        "プレフィックスは DNS サブドメインである必要があります",
                    ));
                }
                name
            }
            None => key,
        };

        if name.is_empty() || name.len() > QUALIFIED_NAME_MAX_LEN || !self.name.is_match(name) {
            return Err(ProcessError::invalid_item(
                Some(key),
                "名前は英数字で始まり英数字で終わる63文字以内で、'-' '_' '.' のみ使用できます",
            ));
        }
        Ok(())
    }

    fn is_valid_label_value(&self, value: &str) -> bool {
        value.is_empty() || (value.len() <= LABEL_VALUE_MAX_LEN && self.name.is_match(value))
    }
}

/// リソース単位のラベル・アノテーション
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraMetadata {
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
}

impl ExtraMetadata {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.annotations.is_empty()
    }

    pub fn map_mut(&mut self, kind: MetadataKind) -> &mut BTreeMap<String, String> {
        match kind {
            MetadataKind::Label => &mut self.labels,
            MetadataKind::Annotation => &mut self.annotations,
        }
    }
}
