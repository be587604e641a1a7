use super::{follow_alias, require_staff, TagService};
use crate::audit::AuditObject;
use crate::error::{invalid, Result, StoreError};
use fictag_core::domain::{Tag, User};
use tracing::info;

impl TagService<'_> {
    /// Makes `tag` an alias of `canonical`, or turns it back into a canonical
    /// tag when `canonical` is `None`.
    ///
    /// Every story carrying `tag` is moved to the canonical tag, and aliases
    /// that pointed at `tag` are re-pointed so no chain longer than one hop
    /// appears.
    pub fn make_alias_for(
        &self,
        tag: &Tag,
        user: &User,
        canonical: Option<&Tag>,
        hidden: bool,
    ) -> Result<Tag> {
        require_staff(user, "change tag aliases")?;
        let tags = self.tags();
        let mut tag = tags.require(tag.id)?;

        let Some(canonical) = canonical else {
            return self.clear_alias(tag, user);
        };
        if canonical.id == tag.id {
            return Err(invalid("is_alias_for", "Tag cannot be an alias of itself"));
        }

        let requested = tags.require(canonical.id)?;
        let target = follow_alias(&tags, &requested)?;
        if target.id == tag.id {
            return Err(StoreError::Consistency(format!(
                "{} is an alias of {}; making {} its alias would form a cycle",
                requested.iname, tag.iname, tag.iname
            )));
        }

        if tag.is_alias_for == Some(target.id) {
            if tag.is_hidden_alias != hidden {
                tag.is_hidden_alias = hidden;
                tag.updated_at = self.now_utc;
                tags.save(&tag)?;
                self.audit.log_changed_fields(
                    user,
                    &AuditObject::from(&tag),
                    &["is_hidden_alias"],
                )?;
            }
            return Ok(tag);
        }

        if target.is_blacklisted() {
            return Err(invalid(
                "is_alias_for",
                "A blacklisted tag cannot be an alias target",
            ));
        }
        if tag.is_blacklisted() {
            return Err(invalid(
                "is_alias_for",
                "A blacklisted tag cannot be an alias",
            ));
        }

        let (moved, dropped) = self.migrate_story_tags(&tag, Some(&target), user)?;

        for mut alias in tags.aliases_of(&[tag.id], true)? {
            alias.is_alias_for = Some(target.id);
            alias.updated_at = self.now_utc;
            tags.save(&alias)?;
            self.audit.log_changed_generic(
                user,
                &AuditObject::from(&alias),
                &format!(
                    "Alias target moved from «{}» to «{}»",
                    tag.name, target.name
                ),
            )?;
        }

        tag.is_alias_for = Some(target.id);
        tag.is_hidden_alias = hidden;
        tag.updated_at = self.now_utc;
        tags.save(&tag)?;

        let kind = if hidden { "hidden alias" } else { "alias" };
        self.audit.log_changed_generic(
            user,
            &AuditObject::from(&tag),
            &format!("Tag became {kind} of «{}»", target.name),
        )?;
        info!(
            tag_id = %tag.id,
            target_id = %target.id,
            moved,
            dropped,
            "tag became alias"
        );

        tags.require(tag.id)
    }

    fn clear_alias(&self, mut tag: Tag, user: &User) -> Result<Tag> {
        if tag.is_alias_for.is_none() {
            return Ok(tag);
        }
        tag.is_alias_for = None;
        tag.is_hidden_alias = false;
        tag.updated_at = self.now_utc;
        self.tags().save(&tag)?;
        self.audit.log_changed_generic(
            user,
            &AuditObject::from(&tag),
            "Tag is no longer an alias",
        )?;
        info!(tag_id = %tag.id, "tag alias cleared");
        Ok(tag)
    }

    /// Sets or clears the blacklist reason. Blacklisting detaches the tag
    /// from every story and drops its alias; clearing does not bring the
    /// stories back.
    pub fn set_blacklist(&self, tag: &Tag, user: &User, reason: &str) -> Result<Tag> {
        require_staff(user, "change the tag blacklist")?;
        let tags = self.tags();
        let mut tag = tags.require(tag.id)?;
        let reason = reason.trim();
        if reason == tag.reason_to_blacklist {
            return Ok(tag);
        }

        let message = if reason.is_empty() {
            "Tag removed from blacklist".to_string()
        } else if tag.is_blacklisted() {
            format!("Blacklist reason changed: {reason}")
        } else {
            format!("Tag blacklisted: {reason}")
        };

        if !reason.is_empty() {
            let (_, dropped) = self.migrate_story_tags(&tag, None, user)?;
            tag.is_alias_for = None;
            tag.is_hidden_alias = false;
            info!(tag_id = %tag.id, dropped, "tag blacklisted");
        }
        tag.reason_to_blacklist = reason.to_string();
        tag.updated_at = self.now_utc;
        tags.save(&tag)?;
        self.audit
            .log_changed_generic(user, &AuditObject::from(&tag), &message)?;

        tags.require(tag.id)
    }
}
