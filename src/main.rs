//! liveconf command line tool
//!
//! Loads JSON configuration files into a namespace, prints the merged
//! values and optionally keeps watching the files for changes.

use std::path::{Path, PathBuf};
use std::time::Duration;
use clap::Parser;
use log::{info, warn};

use liveconf::{VERSION, APP_NAME};
use liveconf::common::init_logger;
use liveconf::config::{
    self, get_namespace, load_json_file, view_help, ConfigFacade, FacadePoller, LoaderOptions,
    NamespaceGetters, Result, DEFAULT,
};
use liveconf::config::defaults::{LOG_LEVEL_STR, MIN_INTERVAL};

/// liveconf: load, inspect and watch namespaced configuration
#[derive(Parser, Debug)]
#[clap(author, version = VERSION, about, long_about = None)]
struct Args {
    /// Configuration file to load; repeat to merge several files in order
    #[clap(short, long = "file", required = true)]
    files: Vec<PathBuf>,

    /// Namespace receiving the configuration
    #[clap(short, long, default_value = DEFAULT)]
    namespace: String,

    /// Log level
    #[clap(long, default_value = LOG_LEVEL_STR)]
    log_level: String,

    /// Fail when a key appears in more than one file
    #[clap(long)]
    strict: bool,

    /// Keep running and check the files every SECS seconds
    #[clap(long, value_name = "SECS")]
    watch: Option<u64>,

    /// Print a description of every loaded key
    #[clap(long)]
    describe: bool,
}

fn print_values(namespace: &str) -> Result<()> {
    let values = get_namespace(namespace).get_config_values();
    println!("{}", serde_json::to_string_pretty(&values)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    init_logger(&args.log_level);

    info!("Starting {} v{}", APP_NAME, VERSION);

    let strict = args.strict;
    let facade = ConfigFacade::load(
        args.files.clone(),
        &args.namespace,
        move |path: &Path, namespace: &str| {
            let options = LoaderOptions::new()
                .with_namespace(namespace)
                .error_on_duplicate(strict);
            load_json_file(path, &options).map(|_| ())
        },
        MIN_INTERVAL,
    )?;

    print_values(&args.namespace)?;

    if args.describe {
        let getters = NamespaceGetters::new(args.namespace.as_str());
        let keys: Vec<String> = get_namespace(&args.namespace)
            .get_config_values()
            .keys()
            .cloned()
            .collect();
        let proxies: Vec<_> = keys.iter().map(|key| getters.get(key, None)).collect();
        config::validate(&args.namespace, false)?;
        println!("{}", view_help());
        drop(proxies);
    }

    let Some(period) = args.watch else {
        return Ok(());
    };

    let namespace = args.namespace.clone();
    facade.add_callback("report", move || {
        info!("Configuration for {} reloaded", namespace);
        if let Err(e) = print_values(&namespace) {
            warn!("Failed to print configuration: {}", e);
        }
    });

    info!("Watching {} file(s) every {}s, press Ctrl-C to stop", args.files.len(), period);
    let poller = FacadePoller::spawn(facade, Duration::from_secs(period));
    tokio::signal::ctrl_c().await?;

    info!("Shutting down");
    poller.shutdown().await?;
    Ok(())
}
