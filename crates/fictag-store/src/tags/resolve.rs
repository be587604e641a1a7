use super::{follow_alias, TagService};
use crate::error::{Result, StoreError};
use crate::repo::TagNewRow;
use crate::uow::AUTOCOMPLETE_CACHE_KEY;
use fictag_core::domain::{Tag, TagId, User};
use fictag_core::rules::{normalize_display_name, LookupMode, EMPTY_TAG_MESSAGE, MAX_NAME_LEN};
use fictag_core::{InvalidTag, TagLookup, TagsResponse};
use std::collections::HashMap;
use tracing::debug;

struct PendingTag {
    index: usize,
    name: String,
    iname: String,
}

impl TagService<'_> {
    /// Resolves a mixed list of tags and raw names into canonical tags, slot
    /// for slot.
    ///
    /// With `should_create`, unknown names become new tags, but only when
    /// every slot in the batch resolved; otherwise nothing is written.
    pub fn get_tags_objects(
        &self,
        items: Vec<TagLookup>,
        should_create: bool,
        user: Option<&User>,
    ) -> Result<TagsResponse> {
        let mut response = TagsResponse::with_capacity(items.len());

        let inames: Vec<Option<String>> = items
            .iter()
            .map(|item| match item {
                TagLookup::Name(raw) => self.normalize(raw),
                TagLookup::Existing(_) => None,
            })
            .collect();
        let found = self.fetch_by_inames(&inames)?;

        let tags = self.tags();
        let mut pending = Vec::new();
        for (index, (item, iname)) in items.into_iter().zip(inames).enumerate() {
            let tag = match item {
                TagLookup::Existing(tag) => tag,
                TagLookup::Name(raw) => {
                    let existing = iname.as_deref().and_then(|key| found.get(key)).cloned();
                    match existing {
                        Some(tag) => tag,
                        None => {
                            response.tags.push(None);
                            if !should_create {
                                response.nonexisting.push(raw);
                                continue;
                            }
                            if user.is_none() {
                                return Err(StoreError::PermissionDenied(
                                    "creating tags requires an authenticated user".to_string(),
                                ));
                            }
                            match (self.check_new_name(&raw), iname) {
                                (None, Some(iname)) => {
                                    pending.push(PendingTag {
                                        index,
                                        name: normalize_display_name(&raw),
                                        iname,
                                    });
                                }
                                (reason, _) => response.invalid.push(InvalidTag {
                                    name: raw,
                                    reason: reason.unwrap_or_else(|| EMPTY_TAG_MESSAGE.to_string()),
                                }),
                            }
                            continue;
                        }
                    }
                }
            };

            let tag = if tag.is_alias() {
                let canonical = follow_alias(&tags, &tag)?;
                push_unique(&mut response.aliases, tag);
                canonical
            } else {
                tag
            };

            if tag.is_blacklisted() {
                push_unique(&mut response.blacklisted, tag);
                response.tags.push(None);
            } else {
                response.tags.push(Some(tag));
            }
        }

        response.success = response.invalid.is_empty()
            && response.nonexisting.is_empty()
            && response.blacklisted.is_empty();

        if !response.success || pending.is_empty() {
            return Ok(response);
        }
        let Some(user) = user else {
            return Err(StoreError::PermissionDenied(
                "creating tags requires an authenticated user".to_string(),
            ));
        };

        let mut created: HashMap<String, Tag> = HashMap::new();
        for item in pending {
            let tag = match created.get(&item.iname) {
                Some(tag) => tag.clone(),
                None => {
                    let tag = tags.insert(
                        self.now_utc,
                        TagNewRow {
                            name: item.name,
                            iname: item.iname.clone(),
                            category_id: None,
                            description: String::new(),
                            is_spoiler: false,
                            is_extreme_tag: false,
                            created_by: Some(user.id),
                        },
                    )?;
                    debug!(tag_id = %tag.id, iname = %tag.iname, "tag created");
                    response.created.push(tag.clone());
                    created.insert(item.iname, tag.clone());
                    tag
                }
            };
            response.tags[item.index] = Some(tag);
        }
        self.outbox.invalidate_cache(AUTOCOMPLETE_CACHE_KEY);

        Ok(response)
    }

    /// Name problems for a tag about to be created, or `None`.
    fn check_new_name(&self, raw: &str) -> Option<String> {
        if let Some(reason) = self.validate_tag_name(raw) {
            return Some(reason);
        }
        if normalize_display_name(raw).chars().count() > MAX_NAME_LEN {
            return Some(format!("Tag name must be at most {MAX_NAME_LEN} characters"));
        }
        None
    }

    fn fetch_by_inames(&self, inames: &[Option<String>]) -> Result<HashMap<String, Tag>> {
        let mut keys: Vec<&str> = inames.iter().flatten().map(String::as_str).collect();
        keys.sort_unstable();
        keys.dedup();

        let tags = self.tags();
        let mut found = HashMap::with_capacity(keys.len());
        match self.policy.lookup {
            LookupMode::PerItem => {
                for key in keys {
                    if let Some(tag) = tags.get_by_iname(key)? {
                        if tag.iname == key {
                            found.insert(tag.iname.clone(), tag);
                        }
                    }
                }
            }
            LookupMode::Batched => {
                for tag in tags.list_by_inames(&keys)? {
                    if keys.binary_search(&tag.iname.as_str()).is_ok() {
                        found.insert(tag.iname.clone(), tag);
                    }
                }
            }
        }
        Ok(found)
    }
}

fn push_unique(list: &mut Vec<Tag>, tag: Tag) {
    let id: TagId = tag.id;
    if !list.iter().any(|existing| existing.id == id) {
        list.push(tag);
    }
}
