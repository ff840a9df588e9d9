use std::sync::Arc;

use avax_tester::driver;
use avax_tester::resolve_logs_dir;
use avax_tester::LocalLauncher;
use avax_tester::Orchestrator;
use avax_tester::Result;
use avax_tester::RunnerConfig;
use tracing::info;

use super::RunArgs;
use crate::init_observability;
use crate::wait_for_signal;

impl RunArgs {
    /// Layers the `--config` file and the flags over `config`.
    pub fn apply(
        &self,
        config: RunnerConfig,
    ) -> Result<RunnerConfig> {
        let mut config = match &self.config {
            Some(path) => config.with_override_config(path)?,
            None => config,
        };

        if let Some(path) = &self.avalanchego_path {
            config.cluster.avalanchego_path = path.clone();
        }
        if let Some(nodes) = self.nodes {
            config.cluster.node_count = nodes;
        }
        if let Some(dir) = &self.log_dir {
            config.cluster.log_dir = Some(dir.clone());
        }
        if let Some(name) = &self.vm_name {
            config.subnet.vm_name = name.clone();
        }
        if let Some(id) = &self.vm_id {
            config.subnet.vm_id = id.clone();
        }
        if let Some(path) = &self.vm_genesis_path {
            config.subnet.genesis_path = Some(path.clone());
        }
        if let Some(path) = &self.output_path {
            config.output.path = Some(path.clone());
        }
        Ok(config)
    }
}

pub async fn execute(args: RunArgs) -> Result<()> {
    let mut config = args.apply(RunnerConfig::new()?)?.validate()?;

    let logs_dir = resolve_logs_dir(&config.cluster)?;
    config.cluster.log_dir = Some(logs_dir.clone());
    let _guard = init_observability(Some(&logs_dir))?;

    info!(?config, "starting runner");
    let orchestrator = Orchestrator::new(config, Arc::new(LocalLauncher));
    driver::run(orchestrator, wait_for_signal()).await?;

    info!("runner exited");
    Ok(())
}
