use std::{io::Write, path::Path};

use anyhow::Context;
use tracing::info;

use rig_core::{OpContext, TearDown};
use rig_model::Manifest;

/// Read a JSON array of manifests.
pub fn load_manifests(path: &Path) -> anyhow::Result<Vec<Manifest>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading manifests from {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing manifests in {}", path.display()))
}

/// Tear down `manifests`, or only describe the plan on `out` when `dry_run` is set.
pub async fn run(
    ctx: &OpContext,
    td: &TearDown,
    manifests: &[Manifest],
    dry_run: bool,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    if dry_run {
        let plan = td.plan(manifests)?;
        for entity in plan.owned_entities().unwrap_or_default() {
            writeln!(out, "delete {entity}")?;
        }
        for entity in plan.skipped_entities() {
            writeln!(out, "skip {entity} (not managed by rig)")?;
        }
        for target in plan.compose_targets() {
            writeln!(out, "compose down {}", target.project)?;
        }
        return Ok(());
    }

    td.tear_down(ctx, manifests).await?;
    info!(manifests = manifests.len(), "down complete");
    Ok(())
}
