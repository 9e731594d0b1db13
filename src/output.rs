//! Shared output formatting for taskflow CLI commands.

use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

pub const SCHEMA_VERSION: &str = "taskflow.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    summary: Vec<(String, String)>,
    details: Vec<String>,
    warnings: Vec<String>,
    next_steps: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            summary: Vec::new(),
            details: Vec::new(),
            warnings: Vec::new(),
            next_steps: Vec::new(),
        }
    }

    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }

    pub fn push_detail(&mut self, value: impl Into<String>) {
        self.details.push(value.into());
    }

    pub fn push_warning(&mut self, value: impl Into<String>) {
        self.warnings.push(value.into());
    }

    pub fn push_next_step(&mut self, value: impl Into<String>) {
        self.next_steps.push(value.into());
    }
}

/// Header, then `key: value` summary lines and bulleted sections, each
/// section separated by a blank line and skipped when empty.
impl fmt::Display for HumanOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header)?;

        let summary: Vec<String> = self
            .summary
            .iter()
            .map(|(key, value)| format!("{key}: {value}"))
            .collect();
        let sections = [
            ("Summary", summary.as_slice()),
            ("Details", self.details.as_slice()),
            ("Warnings", self.warnings.as_slice()),
            ("Next steps", self.next_steps.as_slice()),
        ];

        for (title, items) in sections {
            if items.is_empty() {
                continue;
            }
            write!(f, "\n\n{title}:")?;
            for item in items {
                write!(f, "\n- {item}")?;
            }
        }
        Ok(())
    }
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        let warnings = human.map(|h| h.warnings.clone()).unwrap_or_default();

        #[derive(Serialize)]
        struct Envelope<'a, T: Serialize> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            data: &'a T,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            warnings: Vec<String>,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data,
            warnings,
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if options.quiet {
        return Ok(());
    }

    if let Some(human) = human {
        println!("{human}");
    }

    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let next_steps = error_next_steps(err);
    if json {
        #[derive(Serialize)]
        struct ErrorBody<'a> {
            message: &'a str,
            code: i32,
            kind: &'static str,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<serde_json::Value>,
        }

        #[derive(Serialize)]
        struct Envelope<'a> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            error: ErrorBody<'a>,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            next_steps: Vec<String>,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            error: ErrorBody {
                message: &err.to_string(),
                code: err.exit_code(),
                kind: error_kind(err),
                details: err.details(),
            },
            next_steps,
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    if let Some(hint) = next_steps.first() {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

/// Best-effort "task add"-style command name for error envelopes
pub fn infer_command_name_from_args() -> String {
    infer_command_name(std::env::args().skip(1))
}

fn infer_command_name(args: impl IntoIterator<Item = String>) -> String {
    let mut args = args.into_iter();
    // Global options that consume the following argument.
    let takes_value = |arg: &str| matches!(arg, "--config" | "--data-dir");

    let mut positional = Vec::new();
    while let Some(arg) = args.next() {
        if takes_value(&arg) {
            args.next();
            continue;
        }
        if arg.starts_with('-') {
            continue;
        }
        positional.push(arg);
        if positional.len() == 2 || !matches!(positional[0].as_str(), "task" | "category" | "config") {
            break;
        }
    }

    if positional.is_empty() {
        "taskflow".to_string()
    } else {
        positional.join(" ")
    }
}

fn error_kind(err: &Error) -> &'static str {
    if err.is_not_found() {
        return "not_found";
    }
    match err.exit_code() {
        2 => "user_error",
        _ => "operation_failed",
    }
}

fn error_next_steps(err: &Error) -> Vec<String> {
    match err {
        Error::TaskNotFound(_) => vec!["taskflow task list --all".to_string()],
        Error::CategoryNotFound(_) => vec!["taskflow category list".to_string()],
        Error::InvalidConfig(_) | Error::TomlParse(_) => {
            vec!["fix config.toml then retry (taskflow config show)".to_string()]
        }
        Error::FileTooLarge { .. } => {
            vec!["choose a smaller file or raise uploads.max_size".to_string()]
        }
        Error::UnsupportedFileType { .. } => {
            vec!["pass --accept or adjust uploads.accept".to_string()]
        }
        Error::LockFailed(_) => vec!["retry once other taskflow processes finish".to_string()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn command_name_includes_subcommand() {
        assert_eq!(infer_command_name(args(&["task", "add", "milk"])), "task add");
        assert_eq!(
            infer_command_name(args(&["--json", "--data-dir", "/tmp/x", "category", "rm", "3"])),
            "category rm"
        );
        assert_eq!(infer_command_name(args(&["upload", "a.txt"])), "upload");
        assert_eq!(infer_command_name(args(&["--json"])), "taskflow");
    }

    #[test]
    fn not_found_errors_have_their_own_kind() {
        assert_eq!(error_kind(&Error::TaskNotFound(1)), "not_found");
        assert_eq!(error_kind(&Error::InvalidArgument("x".into())), "user_error");
        assert_eq!(error_kind(&Error::OperationFailed("x".into())), "operation_failed");
    }
}
