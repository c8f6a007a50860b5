//! Periodic rotation across all configured roots

use futures::future::join_all;
use nodelog_core::{RootSpec, RotationParams};
use tracing::{debug, info};

use crate::engine::{check_root, CheckReport};

/// Run one pass over every root concurrently and wait for all of them
pub async fn run_once(roots: &[RootSpec], params: &RotationParams) -> Vec<CheckReport> {
    let reports = join_all(roots.iter().map(|root| check_root(root, params))).await;
    for report in &reports {
        debug!(
            "Checked {}: {} subdirectories ok, {} failed",
            report.root.display(),
            report.checked,
            report.failed
        );
    }
    reports
}

/// Rotate forever, sleeping `params.frequency()` after each pass.
///
/// Returns immediately when rotation is disabled (`params` is None).
pub async fn run(roots: Vec<RootSpec>, params: Option<RotationParams>) {
    let Some(params) = params else {
        info!("Log rotation disabled");
        return;
    };

    info!(
        "Rotating logs under {} root(s) every {}s (max {} bytes, {}h, keep {})",
        roots.len(),
        params.frequency_secs,
        params.max_size_bytes,
        params.max_age_hours,
        params.keep_files
    );

    loop {
        run_once(&roots, &params).await;
        tokio::time::sleep(params.frequency()).await;
    }
}
