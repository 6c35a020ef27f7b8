//! labels / annotations ノードのパース

use super::{arguments, string_property, to_u32, value_to_string};
use crate::error::{ProcessError, Result};
use crate::model::{MetadataItem, Target};
use kdl::KdlNode;

/// labels / annotations ノードをパース
///
/// ```kdl
/// labels {
///     item target="deployment" process="web" version=2 {
///         tier "frontend"
///     }
/// }
/// ```
///
/// 内容の検証はビルド時（適用対象になった時点）で行う。
pub fn parse_metadata_items(node: &KdlNode) -> Result<Vec<MetadataItem>> {
    let mut items = Vec::new();
    let Some(children) = node.children() else {
        return Ok(items);
    };

    for item_node in children.nodes() {
        if item_node.name().value() != "item" {
            continue;
        }
        items.push(parse_item(item_node)?);
    }
    Ok(items)
}

fn parse_item(node: &KdlNode) -> Result<MetadataItem> {
    let target_str = string_property(node, "target")
        .ok_or_else(|| ProcessError::InvalidConfig("item requires target".to_string()))?;
    let target = Target::parse(&target_str).ok_or_else(|| {
        ProcessError::InvalidConfig(format!(
            "未知のターゲット: {} (deployment / service / pod)",
            target_str
        ))
    })?;

    let mut item = MetadataItem::new(target);
    item.process_name = string_property(node, "process");
    item.deployment_version = node
        .get("version")
        .map(|v| to_u32(v, "item version"))
        .transpose()?;

    if let Some(children) = node.children() {
        for kv in children.nodes() {
            let key = kv.name().value().to_string();
            let value = arguments(kv).next().and_then(value_to_string).unwrap_or_default();
            item.apply.insert(key, value);
        }
    }
    Ok(item)
}
