use crate::commands::{print_json, Context};
use crate::error::invalid_input;
use crate::util::{find_category, now_utc};
use anyhow::Result;
use clap::{Args, Subcommand};
use fictag_core::domain::{Tag, TagSort};
use fictag_core::{TagLookup, TagsResponse};
use fictag_store::repo::AdminLogEntry;
use fictag_store::{TagNew, TagUpdate};
use serde::Serialize;

pub const DEFAULT_SEARCH_LIMIT: usize = 10;

#[derive(Debug, Subcommand)]
pub enum TagCommand {
    Add(TagAddArgs),
    Edit(TagEditArgs),
    Rm(TagRemoveArgs),
    Show(TagShowArgs),
    Ls(TagListArgs),
    /// Find tags by name prefix
    Search(TagSearchArgs),
    /// Resolve names to canonical tags, optionally creating missing ones
    Resolve(TagResolveArgs),
    Aliases(TagAliasesArgs),
    /// Rebuild story counters
    Recount(TagRecountArgs),
}

#[derive(Debug, Args)]
pub struct TagAddArgs {
    pub name: String,
    /// Category id or name
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long)]
    pub spoiler: bool,
    #[arg(long)]
    pub extreme: bool,
    /// Make the new tag an alias of this tag
    #[arg(long, value_name = "TAG")]
    pub alias_for: Option<String>,
    #[arg(long, requires = "alias_for")]
    pub hidden: bool,
    /// Blacklist the new tag with this reason
    #[arg(long, value_name = "REASON")]
    pub blacklist: Option<String>,
}

#[derive(Debug, Args)]
pub struct TagEditArgs {
    pub tag: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long, conflicts_with = "no_category")]
    pub category: Option<String>,
    #[arg(long)]
    pub no_category: bool,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub spoiler: Option<bool>,
    #[arg(long)]
    pub extreme: Option<bool>,
    #[arg(long, value_name = "TAG", conflicts_with = "no_alias")]
    pub alias_for: Option<String>,
    #[arg(long)]
    pub no_alias: bool,
    #[arg(long)]
    pub hidden: Option<bool>,
    #[arg(long, value_name = "REASON", conflicts_with = "unblacklist")]
    pub blacklist: Option<String>,
    #[arg(long)]
    pub unblacklist: bool,
}

#[derive(Debug, Args)]
pub struct TagRemoveArgs {
    pub tag: String,
}

#[derive(Debug, Args)]
pub struct TagShowArgs {
    pub tag: String,
}

#[derive(Debug, Args)]
pub struct TagListArgs {
    /// name, date or stories
    #[arg(long, default_value = "name")]
    pub sort: TagSort,
    #[arg(long, conflicts_with = "blacklisted")]
    pub by_category: bool,
    #[arg(long)]
    pub blacklisted: bool,
}

#[derive(Debug, Args)]
pub struct TagSearchArgs {
    pub prefix: String,
    #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
    pub limit: usize,
}

#[derive(Debug, Args)]
pub struct TagResolveArgs {
    #[arg(required = true)]
    pub names: Vec<String>,
    #[arg(long)]
    pub create: bool,
}

#[derive(Debug, Args)]
pub struct TagAliasesArgs {
    pub tag: String,
    /// Include hidden aliases
    #[arg(long)]
    pub hidden: bool,
}

#[derive(Debug, Args)]
pub struct TagRecountArgs {
    pub tag: Option<String>,
}

#[derive(Debug, Serialize)]
struct TagDetailDto {
    tag: Tag,
    alias_for: Option<Tag>,
    aliases: Vec<Tag>,
    history: Vec<AdminLogEntry>,
}

pub fn add_tag(ctx: &Context<'_>, args: TagAddArgs) -> Result<()> {
    let user = ctx.actor()?;
    let category_id = args
        .category
        .as_deref()
        .map(|raw| find_category(ctx.store, raw))
        .transpose()?;
    let input = TagNew {
        name: args.name,
        category_id,
        description: args.description,
        is_spoiler: args.spoiler,
        is_extreme_tag: args.extreme,
        is_alias_for: args.alias_for,
        is_hidden_alias: args.hidden,
        reason_to_blacklist: args.blacklist.unwrap_or_default(),
    };
    let tag = ctx.with_tags(|tags| tags.create(user, input))?;

    if ctx.json {
        print_json(&tag)?;
    } else {
        println!("tag {} created ({})", tag.name, tag.id);
    }
    Ok(())
}

pub fn edit_tag(ctx: &Context<'_>, args: TagEditArgs) -> Result<()> {
    let user = ctx.actor()?;
    let tag = ctx.find_tag(&args.tag)?;
    let category_id = if args.no_category {
        Some(None)
    } else {
        match args.category.as_deref() {
            Some(raw) => Some(Some(find_category(ctx.store, raw)?)),
            None => None,
        }
    };
    let is_alias_for = if args.no_alias {
        Some(None)
    } else {
        args.alias_for.map(Some)
    };
    let reason_to_blacklist = if args.unblacklist {
        Some(String::new())
    } else {
        args.blacklist
    };
    let changes = TagUpdate {
        name: args.name,
        category_id,
        description: args.description,
        is_spoiler: args.spoiler,
        is_extreme_tag: args.extreme,
        is_alias_for,
        is_hidden_alias: args.hidden,
        reason_to_blacklist,
    };
    let tag = ctx.with_tags(|tags| tags.update(&tag, user, changes))?;

    if ctx.json {
        print_json(&tag)?;
    } else {
        println!("tag {} updated", tag.id);
    }
    Ok(())
}

pub fn remove_tag(ctx: &Context<'_>, args: TagRemoveArgs) -> Result<()> {
    let user = ctx.actor()?;
    let tag = ctx.find_tag(&args.tag)?;
    ctx.with_tags(|tags| tags.delete(&tag, user))?;

    if ctx.json {
        print_json(&serde_json::json!({ "id": tag.id, "deleted": true }))?;
    } else {
        println!("tag {} deleted", tag.name);
    }
    Ok(())
}

pub fn show_tag(ctx: &Context<'_>, args: TagShowArgs) -> Result<()> {
    let tag = ctx.find_tag(&args.tag)?;
    let alias_for = match tag.is_alias_for {
        Some(id) => ctx.store.tags().get(id)?,
        None => None,
    };
    let aliases = ctx
        .queries()
        .get_aliases_for(std::slice::from_ref(&tag), true)?
        .remove(&tag.id)
        .unwrap_or_default();
    let history = ctx.store.admin_log(now_utc()).list_for("tag", tag.id.get())?;
    let detail = TagDetailDto {
        tag,
        alias_for,
        aliases,
        history,
    };

    if ctx.json {
        return print_json(&detail);
    }

    let tag = &detail.tag;
    println!("{} {} ({})", tag.id, tag.name, tag.iname);
    if !tag.description.is_empty() {
        println!("  {}", tag.description);
    }
    println!(
        "  stories: {} ({} published)",
        tag.stories_count, tag.published_stories_count
    );
    let mut flags = Vec::new();
    if tag.is_spoiler {
        flags.push("spoiler");
    }
    if tag.is_extreme_tag {
        flags.push("extreme");
    }
    if tag.is_hidden_alias {
        flags.push("hidden");
    }
    if !flags.is_empty() {
        println!("  flags: {}", flags.join(", "));
    }
    if let Some(target) = &detail.alias_for {
        println!("  alias for: {}", target.name);
    }
    if tag.is_blacklisted() {
        println!("  blacklisted: {}", tag.reason_to_blacklist);
    }
    if !detail.aliases.is_empty() {
        let names: Vec<&str> = detail.aliases.iter().map(|t| t.name.as_str()).collect();
        println!("  aliases: {}", names.join(", "));
    }
    Ok(())
}

pub fn list_tags(ctx: &Context<'_>, args: TagListArgs) -> Result<()> {
    if args.by_category {
        let groups = ctx.queries().get_tags_with_categories(args.sort)?;
        if ctx.json {
            return print_json(&groups);
        }
        if groups.is_empty() {
            println!("no tags");
        }
        for group in groups {
            let label = group
                .category
                .as_ref()
                .map(|category| category.name.as_str())
                .unwrap_or("(uncategorized)");
            println!("{label}");
            for tag in &group.tags {
                print_tag_line(tag);
            }
        }
        return Ok(());
    }

    let tags = if args.blacklisted {
        ctx.store.tags().list_blacklisted()?
    } else {
        ctx.queries().get_all_tags(args.sort)?
    };
    print_tags(ctx, &tags)
}

pub fn search_tags(ctx: &Context<'_>, args: TagSearchArgs) -> Result<()> {
    if args.limit == 0 {
        return Err(invalid_input("limit must be positive"));
    }
    let tags = ctx.queries().search_by_prefix(&args.prefix, args.limit)?;
    print_tags(ctx, &tags)
}

pub fn resolve_tags(ctx: &Context<'_>, args: TagResolveArgs) -> Result<()> {
    let user = if args.create {
        Some(ctx.actor()?)
    } else {
        ctx.actor
    };
    let items: Vec<TagLookup> = args.names.into_iter().map(TagLookup::from).collect();
    let response = ctx.with_tags(|tags| tags.get_tags_objects(items, args.create, user))?;

    print_response(ctx, &response)?;
    if !response.success {
        return Err(invalid_input("some tags could not be resolved"));
    }
    Ok(())
}

pub fn list_aliases(ctx: &Context<'_>, args: TagAliasesArgs) -> Result<()> {
    let tag = ctx.find_tag(&args.tag)?;
    if tag.is_alias() {
        return Err(invalid_input(format!(
            "{} is an alias, not a canonical tag",
            tag.name
        )));
    }
    let aliases = ctx
        .queries()
        .get_aliases_for(std::slice::from_ref(&tag), args.hidden)?
        .remove(&tag.id)
        .unwrap_or_default();
    print_tags(ctx, &aliases)
}

pub fn recount_tags(ctx: &Context<'_>, args: TagRecountArgs) -> Result<()> {
    let user = ctx.actor()?;
    let tag = args
        .tag
        .as_deref()
        .map(|raw| ctx.find_tag(raw))
        .transpose()?;
    let corrected = ctx.with_tags(|tags| tags.recount_stories(user, tag.as_ref()))?;

    if ctx.json {
        print_json(&serde_json::json!({ "corrected": corrected }))?;
    } else {
        println!("{corrected} tag(s) corrected");
    }
    Ok(())
}

pub fn print_response(ctx: &Context<'_>, response: &TagsResponse) -> Result<()> {
    if ctx.json {
        return print_json(response);
    }

    for slot in &response.tags {
        match slot {
            Some(tag) => println!("{} {}", tag.id, tag.name),
            None => println!("-"),
        }
    }
    for tag in &response.created {
        println!("created: {}", tag.name);
    }
    for tag in &response.aliases {
        println!("alias: {}", tag.name);
    }
    for tag in &response.blacklisted {
        println!("blacklisted: {} ({})", tag.name, tag.reason_to_blacklist);
    }
    for item in &response.invalid {
        println!("invalid: {:?} ({})", item.name, item.reason);
    }
    for name in &response.nonexisting {
        println!("unknown: {name}");
    }
    Ok(())
}

fn print_tags(ctx: &Context<'_>, tags: &[Tag]) -> Result<()> {
    if ctx.json {
        return print_json(&tags);
    }
    if tags.is_empty() {
        println!("no tags");
        return Ok(());
    }
    for tag in tags {
        print_tag_line(tag);
    }
    Ok(())
}

fn print_tag_line(tag: &Tag) {
    println!("{} {} ({})", tag.id, tag.name, tag.published_stories_count);
}
