//! Task Command
//!
//! Lets a host test runner drive the file-op facade over a subprocess:
//!
//! ```text
//! matchshot task '{"task":"exists","path":"match-screenshots/home.png"}'
//! ```

use std::io::Read;
use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use matchshot::tasks::dispatch;
use matchshot::{FileTask, LocalFileOps};

#[derive(Args)]
pub struct TaskArgs {
    /// Task message as JSON; read from stdin when omitted or "-"
    pub json: Option<String>,
}

fn read_message(args: TaskArgs) -> Result<String> {
    match args.json.as_deref() {
        Some(json) if json != "-" => Ok(json.to_string()),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading task from stdin")?;
            Ok(buf)
        }
    }
}

pub async fn execute(args: TaskArgs) -> Result<()> {
    let message = read_message(args)?;
    let task = FileTask::from_json(&message).context("parsing task message")?;
    debug!("Running task {}", task.name());

    let result = dispatch(&LocalFileOps, &task).await?;
    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
