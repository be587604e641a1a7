use crate::commands::tags::print_response;
use crate::commands::{print_json, Context};
use crate::error::invalid_input;
use crate::util::{format_timestamp, now_utc, parse_story_id};
use anyhow::Result;
use clap::{Args, Subcommand};
use fictag_core::domain::{StoryTagAction, Tag};
use fictag_core::TagLookup;

#[derive(Debug, Subcommand)]
pub enum StoryCommand {
    Add(StoryAddArgs),
    Publish(StoryPublishArgs),
    /// Show a story's tags grouped for display
    Tags(StoryTagsArgs),
    /// Replace a story's tags
    #[command(name = "set-tags")]
    SetTags(StorySetTagsArgs),
    /// Show the story's tag history
    Log(StoryLogArgs),
}

#[derive(Debug, Args)]
pub struct StoryAddArgs {
    pub title: String,
    #[arg(long)]
    pub published: bool,
}

#[derive(Debug, Args)]
pub struct StoryPublishArgs {
    pub id: String,
    /// Move the story back to drafts
    #[arg(long)]
    pub undo: bool,
}

#[derive(Debug, Args)]
pub struct StoryTagsArgs {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct StorySetTagsArgs {
    pub id: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Args)]
pub struct StoryLogArgs {
    pub id: String,
}

pub fn add_story(ctx: &Context<'_>, args: StoryAddArgs) -> Result<()> {
    let story = ctx
        .store
        .stories()
        .create(now_utc(), &args.title, args.published)?;

    if ctx.json {
        print_json(&story)?;
    } else {
        println!("story {} created ({})", story.title, story.id);
    }
    Ok(())
}

pub fn publish_story(ctx: &Context<'_>, args: StoryPublishArgs) -> Result<()> {
    let id = parse_story_id(&args.id)?;
    let story = ctx
        .store
        .stories()
        .set_published(now_utc(), id, !args.undo)?;

    if ctx.json {
        print_json(&story)?;
    } else if story.published {
        println!("story {} published", story.id);
    } else {
        println!("story {} moved to drafts", story.id);
    }
    Ok(())
}

pub fn show_story_tags(ctx: &Context<'_>, args: StoryTagsArgs) -> Result<()> {
    let id = parse_story_id(&args.id)?;
    ctx.store.stories().require(id)?;
    let prepared = ctx.queries().get_prepared_tags(id)?;

    if ctx.json {
        print_json(&prepared)?;
        return Ok(());
    }

    print_group("primary", &prepared.primary);
    print_group("secondary", &prepared.secondary);
    print_group("spoilers", &prepared.spoilers);
    print_group("extreme", &prepared.extreme);
    Ok(())
}

pub fn set_story_tags(ctx: &Context<'_>, args: StorySetTagsArgs) -> Result<()> {
    let id = parse_story_id(&args.id)?;
    let user = ctx.actor()?;
    let items: Vec<TagLookup> = args.tags.into_iter().map(TagLookup::from).collect();
    let response = ctx.with_tags(|tags| tags.set_story_tags(id, items, user))?;

    print_response(ctx, &response)?;
    if !response.success {
        return Err(invalid_input("story tags were not changed"));
    }
    Ok(())
}

pub fn story_log(ctx: &Context<'_>, args: StoryLogArgs) -> Result<()> {
    let id = parse_story_id(&args.id)?;
    ctx.store.stories().require(id)?;
    let entries = ctx.store.story_tag_logs().list_for_story(id)?;

    if ctx.json {
        print_json(&entries)?;
        return Ok(());
    }

    if entries.is_empty() {
        println!("no tag changes");
        return Ok(());
    }

    for entry in entries {
        let sign = match entry.action {
            StoryTagAction::Addition => '+',
            StoryTagAction::Deletion => '-',
        };
        println!(
            "{} {}{}",
            format_timestamp(entry.created_at),
            sign,
            entry.tag_name
        );
    }
    Ok(())
}

fn print_group(label: &str, tags: &[Tag]) {
    if tags.is_empty() {
        return;
    }
    let names: Vec<&str> = tags.iter().map(|tag| tag.name.as_str()).collect();
    println!("{label}: {}", names.join(", "));
}
