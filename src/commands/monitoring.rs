//! `amp monitoring`: print the zync monitoring manifests

use amp_common::{Error, Result};
use amp_monitoring::{zync_monitoring_manifests, ZyncOptions};
use tracing::debug;

/// Render every zync monitoring manifest as a multi-document YAML stream
pub fn render_monitoring(namespace: &str, opts: &ZyncOptions) -> Result<String> {
    let manifests = zync_monitoring_manifests(opts, namespace)?;

    let mut documents = Vec::with_capacity(manifests.len());
    for manifest in &manifests {
        debug!(object = %manifest.object_info(), "rendering manifest");
        let yaml = serde_yaml::to_string(manifest)
            .map_err(|e| Error::serialization(format!("{}: {e}", manifest.object_info())))?;
        documents.push(yaml);
    }

    Ok(documents.join("---\n"))
}
