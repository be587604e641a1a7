use crate::commands::{print_json, Context};
use crate::util::{format_timestamp, now_utc};
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    Ls(TaskListArgs),
}

#[derive(Debug, Args)]
pub struct TaskListArgs {}

pub fn list_tasks(ctx: &Context<'_>, _args: TaskListArgs) -> Result<()> {
    let tasks = ctx.store.task_queue(now_utc()).list()?;

    if ctx.json {
        print_json(&tasks)?;
        return Ok(());
    }

    if tasks.is_empty() {
        println!("no tasks");
        return Ok(());
    }

    for item in tasks {
        let args = serde_json::to_string(&item.task.args)?;
        println!(
            "{} {} {} {}",
            item.id,
            format_timestamp(item.created_at),
            item.task.name,
            args
        );
    }
    Ok(())
}
