use super::{require_staff, TagService};
use crate::audit::AuditObject;
use crate::error::{Result, StoreError};
use crate::repo::{CategoriesRepo, TagNewRow};
use crate::uow::AUTOCOMPLETE_CACHE_KEY;
use fictag_core::domain::{Tag, TagCategoryId, TagId, User};
use fictag_core::rules::{normalize_display_name, MAX_NAME_LEN};
use fictag_core::{FieldErrors, TagLookup};
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct TagNew {
    pub name: String,
    pub category_id: Option<TagCategoryId>,
    pub description: String,
    pub is_spoiler: bool,
    pub is_extreme_tag: bool,
    /// Name of the canonical tag this one should redirect to.
    pub is_alias_for: Option<String>,
    pub is_hidden_alias: bool,
    pub reason_to_blacklist: String,
}

/// Partial update; `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct TagUpdate {
    pub name: Option<String>,
    pub category_id: Option<Option<TagCategoryId>>,
    pub description: Option<String>,
    pub is_spoiler: Option<bool>,
    pub is_extreme_tag: Option<bool>,
    /// `Some(None)` or an empty name clears the alias.
    pub is_alias_for: Option<Option<String>>,
    pub is_hidden_alias: Option<bool>,
    pub reason_to_blacklist: Option<String>,
}

impl TagService<'_> {
    pub fn create(&self, user: &User, input: TagNew) -> Result<Tag> {
        require_staff(user, "create tags")?;
        let mut errors = FieldErrors::new();

        let name = normalize_display_name(&input.name);
        let iname = self.check_name(&name, None, &mut errors)?;
        if let Some(category_id) = input.category_id {
            self.check_category(category_id, &mut errors)?;
        }
        let canonical = match non_empty(input.is_alias_for.as_deref()) {
            Some(target) => self.lookup_alias_target(target, user, &mut errors)?,
            None => None,
        };
        let reason = input.reason_to_blacklist.trim();
        if !reason.is_empty() && canonical.is_some() {
            errors.add("is_alias_for", "A blacklisted tag cannot be an alias");
        }

        let iname = match iname {
            Some(iname) if errors.is_empty() => iname,
            _ => return Err(StoreError::Validation(errors)),
        };

        let tag = self.tags().insert(
            self.now_utc,
            TagNewRow {
                name,
                iname,
                category_id: input.category_id,
                description: input.description.trim().to_string(),
                is_spoiler: input.is_spoiler,
                is_extreme_tag: input.is_extreme_tag,
                created_by: Some(user.id),
            },
        )?;
        self.audit.log_addition(user, &AuditObject::from(&tag))?;
        info!(tag_id = %tag.id, iname = %tag.iname, "tag created");

        if let Some(canonical) = canonical {
            self.make_alias_for(&tag, user, Some(&canonical), input.is_hidden_alias)?;
        }
        if !reason.is_empty() {
            self.set_blacklist(&tag, user, reason)?;
        }
        self.outbox.invalidate_cache(AUTOCOMPLETE_CACHE_KEY);

        self.tags().require(tag.id)
    }

    pub fn update(&self, tag: &Tag, user: &User, changes: TagUpdate) -> Result<Tag> {
        require_staff(user, "edit tags")?;
        let tags = self.tags();
        let mut tag = tags.require(tag.id)?;
        let mut errors = FieldErrors::new();
        let mut changed: Vec<&str> = Vec::new();

        if let Some(name) = changes.name.as_deref() {
            let name = normalize_display_name(name);
            if name != tag.name {
                if let Some(iname) = self.check_name(&name, Some(tag.id), &mut errors)? {
                    if iname != tag.iname {
                        tag.iname = iname;
                        changed.push("iname");
                    }
                    tag.name = name;
                    changed.push("name");
                }
            }
        }
        if let Some(category_id) = changes.category_id {
            if category_id != tag.category_id {
                if let Some(id) = category_id {
                    self.check_category(id, &mut errors)?;
                }
                tag.category_id = category_id;
                changed.push("category");
            }
        }
        if let Some(description) = changes.description.as_deref() {
            let description = description.trim();
            if description != tag.description {
                tag.description = description.to_string();
                changed.push("description");
            }
        }
        if let Some(is_spoiler) = changes.is_spoiler {
            if is_spoiler != tag.is_spoiler {
                tag.is_spoiler = is_spoiler;
                changed.push("is_spoiler");
            }
        }
        if let Some(is_extreme_tag) = changes.is_extreme_tag {
            if is_extreme_tag != tag.is_extreme_tag {
                tag.is_extreme_tag = is_extreme_tag;
                changed.push("is_extreme_tag");
            }
        }

        let alias_change = match changes.is_alias_for.as_ref() {
            None => None,
            Some(target) => match non_empty(target.as_deref()) {
                Some(target) => Some(self.lookup_alias_target(target, user, &mut errors)?),
                None => Some(None),
            },
        };
        let reason = changes
            .reason_to_blacklist
            .as_deref()
            .map(str::trim)
            .unwrap_or(tag.reason_to_blacklist.as_str())
            .to_string();
        let alias_after = match &alias_change {
            Some(target) => target.is_some(),
            None => tag.is_alias(),
        };
        if !reason.is_empty() && alias_after && changes.is_alias_for.is_some() {
            errors.add("is_alias_for", "A blacklisted tag cannot be an alias");
        }

        if !errors.is_empty() {
            return Err(StoreError::Validation(errors));
        }

        if !changed.is_empty() {
            tag.updated_at = self.now_utc;
            tags.save(&tag)?;
            self.audit
                .log_changed_fields(user, &AuditObject::from(&tag), &changed)?;
            if changed.contains(&"name") {
                for story_tag in self.story_tags().list_for_tag(tag.id)? {
                    self.reindex_story(story_tag.story_id);
                }
            }
        }

        if changes.reason_to_blacklist.is_some() {
            tag = self.set_blacklist(&tag, user, &reason)?;
        }
        match alias_change {
            Some(target) => {
                let hidden = changes.is_hidden_alias.unwrap_or(tag.is_hidden_alias);
                tag = self.make_alias_for(&tag, user, target.as_ref(), hidden)?;
            }
            None => {
                if let (Some(hidden), Some(target_id)) = (changes.is_hidden_alias, tag.is_alias_for)
                {
                    let target = tags.require(target_id)?;
                    tag = self.make_alias_for(&tag, user, Some(&target), hidden)?;
                }
            }
        }

        self.outbox.invalidate_cache(AUTOCOMPLETE_CACHE_KEY);
        tags.require(tag.id)
    }

    /// Detaches the tag from every story, releases its aliases and removes it.
    pub fn delete(&self, tag: &Tag, user: &User) -> Result<()> {
        require_staff(user, "delete tags")?;
        let tags = self.tags();
        let tag = tags.require(tag.id)?;

        let (_, dropped) = self.migrate_story_tags(&tag, None, user)?;
        for mut alias in tags.aliases_of(&[tag.id], true)? {
            alias.is_alias_for = None;
            alias.is_hidden_alias = false;
            alias.updated_at = self.now_utc;
            tags.save(&alias)?;
            self.audit.log_changed_generic(
                user,
                &AuditObject::from(&alias),
                &format!("Alias target «{}» was deleted", tag.name),
            )?;
        }

        self.audit.log_deletion(user, &AuditObject::from(&tag))?;
        tags.delete(tag.id)?;
        self.outbox.invalidate_cache(AUTOCOMPLETE_CACHE_KEY);
        info!(tag_id = %tag.id, iname = %tag.iname, dropped, "tag deleted");
        Ok(())
    }

    /// Rebuilds story counters from the stored associations, for one tag or
    /// all of them. Returns how many tags were corrected.
    pub fn recount_stories(&self, user: &User, tag: Option<&Tag>) -> Result<usize> {
        require_staff(user, "recount tag statistics")?;
        let corrected = self.tags().recount(tag.map(|tag| tag.id))?;
        if corrected > 0 {
            info!(corrected, "tag counters corrected");
            self.outbox.invalidate_cache(AUTOCOMPLETE_CACHE_KEY);
        }
        Ok(corrected)
    }

    /// Validates a cleaned display name and returns its key when usable.
    fn check_name(
        &self,
        name: &str,
        except: Option<TagId>,
        errors: &mut FieldErrors,
    ) -> Result<Option<String>> {
        if name.chars().count() > MAX_NAME_LEN {
            errors.add(
                "name",
                format!("Tag name must be at most {MAX_NAME_LEN} characters"),
            );
            return Ok(None);
        }
        if let Some(reason) = self.validate_tag_name(name) {
            errors.add("name", reason);
            return Ok(None);
        }
        let Some(iname) = self.normalize(name) else {
            return Ok(None);
        };
        if let Some(existing) = self.tags().get_by_iname(&iname)? {
            if Some(existing.id) != except {
                errors.add(
                    "name",
                    format!("Tag «{}» already uses this name", existing.name),
                );
                return Ok(None);
            }
        }
        Ok(Some(iname))
    }

    fn check_category(&self, id: TagCategoryId, errors: &mut FieldErrors) -> Result<()> {
        if CategoriesRepo::new(self.conn).get(id)?.is_none() {
            errors.add("category", format!("Unknown category {id}"));
        }
        Ok(())
    }

    fn lookup_alias_target(
        &self,
        name: &str,
        user: &User,
        errors: &mut FieldErrors,
    ) -> Result<Option<Tag>> {
        let response =
            self.get_tags_objects(vec![TagLookup::Name(name.to_string())], false, Some(user))?;
        if !response.blacklisted.is_empty() {
            errors.add("is_alias_for", format!("Tag «{name}» is blacklisted"));
            return Ok(None);
        }
        match response.tags.into_iter().next().flatten() {
            Some(tag) => Ok(Some(tag)),
            None => {
                errors.add("is_alias_for", format!("Tag «{name}» not found"));
                Ok(None)
            }
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
