//! taskflow config command implementation

use std::path::PathBuf;

use serde::Serialize;

use crate::config::{default_config_path, Config};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::service::Services;

use super::GlobalOptions;

#[derive(Serialize)]
struct ConfigShowReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    config_path: Option<PathBuf>,
    store: String,
    attachments_dir: PathBuf,
    config: Config,
}

pub fn run_show(global: &GlobalOptions) -> Result<()> {
    let config = global.load_config()?;
    let services = Services::open(&config)?;
    let config_path = global.config.clone().or_else(default_config_path);

    let report = ConfigShowReport {
        config_path,
        store: services.store_location(),
        attachments_dir: config.storage.attachments_dir()?,
        config: config.clone(),
    };

    let mut human = HumanOutput::new("taskflow config");
    if let Some(path) = &report.config_path {
        human.push_summary("config", path.display().to_string());
    }
    human.push_summary("store", report.store.clone());
    human.push_summary("attachments", report.attachments_dir.display().to_string());
    for line in config.to_toml()?.lines().filter(|line| !line.trim().is_empty()) {
        human.push_detail(line);
    }
    emit_success(global.output(), "config show", &report, Some(&human))
}
