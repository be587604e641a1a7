use crate::commands::{print_json, Context};
use crate::util::now_utc;
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Debug, Subcommand)]
pub enum CategoryCommand {
    Add(CategoryAddArgs),
    Ls(CategoryListArgs),
}

#[derive(Debug, Args)]
pub struct CategoryAddArgs {
    pub name: String,
    #[arg(long, default_value = "")]
    pub description: String,
}

#[derive(Debug, Args)]
pub struct CategoryListArgs {}

pub fn add_category(ctx: &Context<'_>, args: CategoryAddArgs) -> Result<()> {
    let category = ctx
        .store
        .categories()
        .create(now_utc(), &args.name, &args.description)?;

    if ctx.json {
        print_json(&category)?;
    } else {
        println!("category {} created ({})", category.name, category.id);
    }
    Ok(())
}

pub fn list_categories(ctx: &Context<'_>, _args: CategoryListArgs) -> Result<()> {
    let categories = ctx.store.categories().list()?;

    if ctx.json {
        print_json(&categories)?;
        return Ok(());
    }

    if categories.is_empty() {
        println!("no categories");
        return Ok(());
    }

    for category in categories {
        println!("{} {}", category.id, category.name);
    }
    Ok(())
}
