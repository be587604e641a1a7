use crate::commands::{print_json, Context};
use crate::util::now_utc;
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    Add(UserAddArgs),
    Ls(UserListArgs),
}

#[derive(Debug, Args)]
pub struct UserAddArgs {
    pub username: String,
    /// Grant moderation rights over tags
    #[arg(long)]
    pub staff: bool,
}

#[derive(Debug, Args)]
pub struct UserListArgs {}

pub fn add_user(ctx: &Context<'_>, args: UserAddArgs) -> Result<()> {
    let user = ctx
        .store
        .users()
        .create(now_utc(), &args.username, args.staff)?;

    if ctx.json {
        print_json(&user)?;
    } else {
        println!("user {} created ({})", user.username, user.id);
    }
    Ok(())
}

pub fn list_users(ctx: &Context<'_>, _args: UserListArgs) -> Result<()> {
    let users = ctx.store.users().list()?;

    if ctx.json {
        print_json(&users)?;
        return Ok(());
    }

    if users.is_empty() {
        println!("no users");
        return Ok(());
    }

    for user in users {
        let role = if user.is_staff { " [staff]" } else { "" };
        println!("{} {}{}", user.id, user.username, role);
    }
    Ok(())
}
