use std::path::PathBuf;

use tabled::Table;

use crate::{
    catalog::{self, auth},
    config::Config,
    error, info,
    pipeline::{self, RunLedger},
    success, utils, warning,
};

pub async fn download(urls: Vec<String>, out_path: Option<PathBuf>, config_file: Option<PathBuf>) {
    println!("{}", banner());

    let mut config = match Config::load(config_file).await {
        Ok(c) => c,
        Err(e) => error!("Failed to load config file.\n{}", e),
    };
    if let Some(out) = out_path {
        config.out_path = out;
    }

    let client = match catalog::http_client() {
        Ok(c) => c,
        Err(e) => error!("Failed to build HTTP client.\n{}", e),
    };

    info!("Signing in...");
    let session = match auth::login(client, &config.email, &config.password).await {
        Ok(s) => s,
        Err(e) => error!("Failed to sign in.\n{}", e),
    };
    success!("Signed in successfully.");

    if let Err(e) = async_fs::create_dir_all(&config.out_path).await {
        error!(
            "Failed to make output folder {}.\n{}",
            config.out_path.display(),
            e
        );
    }

    let urls = match utils::process_urls(&urls).await {
        Ok(u) => u,
        Err(e) => error!("Failed to process URLs.\n{}", e),
    };
    if urls.is_empty() {
        warning!("Nothing to download.");
        return;
    }

    let ledger = pipeline::run(&session, &config, &urls).await;
    print_summary(&ledger);
}

fn print_summary(ledger: &RunLedger) {
    if !ledger.tracks().is_empty() {
        println!("{}", Table::new(ledger.table_rows()));
        println!("{}", Table::new(ledger.count_rows()));
    }

    for failure in ledger.album_failures() {
        warning!("Skipped {}: {}", failure.reference, failure.reason);
    }
}

fn banner() -> String {
    format!(
        "{} {}\nHIGHRESAUDIO album downloader",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )
}
