//! vpnroutes - Route Directive Updater for OpenVPN Client Configs
//!
//! Resolves hostnames and CIDR blocks into route directives and splices
//! them into the managed block of an OpenVPN client config.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::FmtSubscriber;

use vpnroutes::cli::Cli;
use vpnroutes::fs_abstraction::real_fs;
use vpnroutes::resolver::SystemResolver;
use vpnroutes::run::run;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging goes to stderr; stdout is reserved for the merged document.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::Level::from(cli.log_level))
        .with_target(false)
        .with_thread_ids(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let options = cli.run_options();
    let report = run(&options, real_fs(), &SystemResolver::new()).await?;

    if let Some(rendered) = report.rendered {
        print!("{rendered}");
    }

    Ok(())
}
