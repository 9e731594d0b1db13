//! taskflow upload command implementation

use std::path::PathBuf;

use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::upload::{self, format_file_size};

use super::GlobalOptions;

pub struct UploadOptions {
    pub path: PathBuf,
    pub accept: Option<String>,
    pub max_size: Option<u64>,
}

pub fn run(global: &GlobalOptions, options: UploadOptions) -> Result<()> {
    let config = global.load_config()?;
    let mut policy = config.uploads.policy();
    if let Some(accept) = options.accept {
        policy.accept = accept;
    }
    if let Some(max_size) = options.max_size {
        policy.max_size = max_size;
    }

    let attachments = config.storage.attachments_dir()?;
    let stored = upload::store_upload(&options.path, &attachments, &policy)?;

    let mut human = HumanOutput::new(format!("taskflow upload: {}", stored.name));
    human.push_summary("path", stored.path.display().to_string());
    human.push_summary("size", format_file_size(stored.size));
    emit_success(global.output(), "upload", &stored, Some(&human))
}
