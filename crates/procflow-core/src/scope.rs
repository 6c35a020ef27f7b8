//! メタデータのスコープ解決
//!
//! ラベル・アノテーションの各項目について、ビルド中のプロセスに適用するか、
//! どのリソース（Deployment / Service / Pod）のバケットに入れるかを決める。

use crate::error::Result;
use crate::model::{
    DeploymentVersion, ExtraMetadata, MetadataItem, MetadataKind, ProcessDescriptor, Target,
};
use tracing::debug;

/// 項目がこのプロセス・バージョンに適用できるか
///
/// - deployment_version が未指定（または0）か、`version` と一致する
/// - process_name が未指定（または空）か、`process_name` と一致する
pub fn can_be_applied(item: &MetadataItem, process_name: &str, version: DeploymentVersion) -> bool {
    if let Some(v) = item.deployment_version
        && v > 0
        && v != version.0
    {
        return false;
    }
    if let Some(name) = item.process_name.as_deref()
        && !name.is_empty()
        && name != process_name
    {
        return false;
    }
    true
}

/// 適用先ターゲットに対応するバケットを返す
pub fn bucket_mut(process: &mut ProcessDescriptor, target: Target) -> &mut ExtraMetadata {
    match target {
        Target::Deployment => &mut process.deployment_metadata,
        Target::Service => &mut process.service_metadata,
        Target::Pod => &mut process.pod_metadata,
    }
}

/// 項目の一覧を順番に適用する
///
/// 同じキーは後の項目で上書きされる。適用対象の項目が検証に失敗した場合は
/// その時点でエラーを返す（残りの項目は適用しない）。
pub fn apply_metadata(
    process: &mut ProcessDescriptor,
    items: &[MetadataItem],
    kind: MetadataKind,
    version: DeploymentVersion,
) -> Result<()> {
    for item in items {
        if !can_be_applied(item, process.name(), version) {
            debug!(
                process = process.name(),
                target = ?item.target,
                kind = ?kind,
                "Skipping metadata item out of scope"
            );
            continue;
        }
        item.validate(kind)?;

        let map = bucket_mut(process, item.target).map_mut(kind);
        for (key, value) in &item.apply {
            map.insert(key.clone(), value.clone());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessError;

    #[test]
    fn test_unfiltered_item_applies_everywhere() {
        let item = MetadataItem::new(Target::Service).set("team", "core");
        for name in ["web", "worker", "clock"] {
            for v in [0, 1, 7] {
                assert!(can_be_applied(&item, name, DeploymentVersion(v)));
            }
        }
    }

    #[test]
    fn test_process_filter() {
        let item = MetadataItem::new(Target::Pod)
            .with_process("worker")
            .set("queue", "default");
        assert!(can_be_applied(&item, "worker", DeploymentVersion(1)));
        assert!(!can_be_applied(&item, "web", DeploymentVersion(1)));
    }

    #[test]
    fn test_empty_process_name_means_all() {
        let item = MetadataItem::new(Target::Pod).with_process("").set("a", "b");
        assert!(can_be_applied(&item, "web", DeploymentVersion(3)));
    }

    #[test]
    fn test_version_filter() {
        let item = MetadataItem::new(Target::Deployment)
            .with_version(2)
            .set("canary", "true");
        assert!(can_be_applied(&item, "web", DeploymentVersion(2)));
        assert!(!can_be_applied(&item, "web", DeploymentVersion(1)));
        assert!(!can_be_applied(&item, "web", DeploymentVersion(3)));
    }

    #[test]
    fn test_zero_version_means_all() {
        let item = MetadataItem::new(Target::Deployment)
            .with_version(0)
            .set("a", "b");
        assert!(can_be_applied(&item, "web", DeploymentVersion(5)));
    }

    #[test]
    fn test_routes_to_target_bucket() {
        let mut p = ProcessDescriptor::new("web", false);
        let items = vec![
            MetadataItem::new(Target::Deployment).set("d", "1"),
            MetadataItem::new(Target::Service).set("s", "2"),
            MetadataItem::new(Target::Pod).set("p", "3"),
        ];
        apply_metadata(&mut p, &items, MetadataKind::Label, DeploymentVersion(1)).unwrap();

        assert_eq!(p.deployment_metadata.labels["d"], "1");
        assert_eq!(p.service_metadata.labels["s"], "2");
        assert_eq!(p.pod_metadata.labels["p"], "3");
        assert_eq!(p.deployment_metadata.labels.len(), 1);
        assert!(p.deployment_metadata.annotations.is_empty());
    }

    #[test]
    fn test_later_item_wins() {
        let mut p = ProcessDescriptor::new("web", false);
        let items = vec![
            MetadataItem::new(Target::Deployment).set("tier", "a"),
            MetadataItem::new(Target::Deployment).set("tier", "b"),
        ];
        apply_metadata(&mut p, &items, MetadataKind::Label, DeploymentVersion(1)).unwrap();
        assert_eq!(p.deployment_metadata.labels["tier"], "b");
    }

    #[test]
    fn test_annotations_kept_apart_from_labels() {
        let mut p = ProcessDescriptor::new("web", false);
        let items = vec![MetadataItem::new(Target::Service).set("prometheus.io/scrape", "true")];
        apply_metadata(&mut p, &items, MetadataKind::Annotation, DeploymentVersion(1)).unwrap();
        assert_eq!(p.service_metadata.annotations["prometheus.io/scrape"], "true");
        assert!(p.service_metadata.labels.is_empty());
    }

    #[test]
    fn test_invalid_applicable_item_aborts() {
        let mut p = ProcessDescriptor::new("web", false);
        let items = vec![
            MetadataItem::new(Target::Pod).set("ok", "1"),
            MetadataItem::new(Target::Pod),
            MetadataItem::new(Target::Pod).set("later", "2"),
        ];
        let err = apply_metadata(&mut p, &items, MetadataKind::Label, DeploymentVersion(1))
            .unwrap_err();
        assert!(matches!(err, ProcessError::InvalidMetadataItem { .. }));
        assert!(!p.pod_metadata.labels.contains_key("later"));
    }

    #[test]
    fn test_invalid_item_out_of_scope_is_skipped() {
        let mut p = ProcessDescriptor::new("web", false);
        let items = vec![MetadataItem::new(Target::Pod).with_process("worker")];
        assert!(apply_metadata(&mut p, &items, MetadataKind::Label, DeploymentVersion(1)).is_ok());
    }
}
