use crate::core::{Pipeline, RunStats};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub output_path: String,
    pub stats: RunStats,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// Extract, transform, then write once; nothing is written if an earlier
    /// phase fails.
    pub async fn run(&self) -> Result<RunReport> {
        tracing::info!("🚀 Starting enrichment run");
        self.monitor.log_stats("Start");

        let input = self.pipeline.extract().await?;
        self.monitor.log_stats("Extract");

        let enriched = self.pipeline.transform(input).await?;
        let stats = enriched.stats;
        self.monitor.log_stats("Transform");

        let output_path = self.pipeline.load(enriched).await?;
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(RunReport { output_path, stats })
    }
}
