mod cli;
mod down;
mod wait;

use std::{sync::Arc, time::Duration};

use clap::Parser;
use tracing::{debug, info};

use rig_core::{OpContext, TearDown};
use rig_exec::{ComposeCli, KubectlClient};
use rig_observe::init_logger;

use crate::cli::{Cli, Command};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logger(&cli.global.logger())?;
    debug!(command = ?cli.command, "logger initialized");

    let ctx = OpContext::new();
    cancel_on_ctrl_c(&ctx);

    let kubectl = Arc::new(KubectlClient::new(cli.global.kubectl())?);

    match cli.command {
        Command::Down(args) => {
            let compose = Arc::new(ComposeCli::new(cli.global.compose(args.remove_orphans))?);
            let manifests = down::load_manifests(&args.manifests)?;
            let td = TearDown::new(kubectl, compose);
            down::run(&ctx, &td, &manifests, args.dry_run, &mut std::io::stdout().lock()).await?;
        }
        Command::Wait(args) => {
            let ctx = ctx.with_timeout(Duration::from_secs(args.timeout));
            let status = wait::run(
                &ctx,
                kubectl.as_ref(),
                &args.namespace,
                args.workload.as_deref(),
                &args.image,
            )
            .await?;
            if let Some(id) = status.container_id()? {
                println!("{id}");
            }
        }
    }
    Ok(())
}

fn cancel_on_ctrl_c(ctx: &OpContext) {
    let token = ctx.token().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, cancelling");
            token.cancel();
        }
    });
}
