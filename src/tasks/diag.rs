use std::sync::Arc;

use anyhow::Result;

use crate::metrics::Diag;

pub async fn print_diagnostics_task(diag: Arc<Diag>) -> Result<()> {
    let snap = diag.snapshot();
    tracing::info!(
        "eff={:.3}, cache_hits={}, cache_misses={}, upstream_errors={}",
        snap.hit_ratio(),
        snap.cache_hits,
        snap.cache_misses,
        snap.upstream_errors
    );
    Ok(())
}
