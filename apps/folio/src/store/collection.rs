//! Collection store: the single in-process owner of every resume.
//!
//! All operations are synchronous over the in-memory collection. A mutation
//! commits in memory first, then saves the whole state to the local slot
//! (failures logged and swallowed), then enqueues remote mirror work.
//! Renderers and persistence adapters only ever see read-only views or
//! snapshots; no mutable reference crosses the store boundary.
//!
//! # Invariants
//! - The collection is never empty: the last resume cannot be deleted.
//! - `active_identity` always names a member of `documents`.
//! - Identities are never reused, even after deletion.

use chrono::Utc;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::models::resume::{
    Contact, EducationEntry, ExperienceEntry, LanguageEntry, PublicationEntry, Resume,
};
use crate::persist::local::LocalSlot;
use crate::persist::mirror::MirrorHandle;

/// The full persisted collection: every document plus the active identity.
/// This is the exact shape written to the local slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionState {
    pub documents: Vec<Resume>,
    pub active_identity: Uuid,
}

/// A shallow partial update for the active resume. Fields left as `None` are
/// untouched; present fields replace the document's value wholesale.
#[derive(Debug, Clone, Default)]
pub struct ResumePatch {
    pub display_title: Option<String>,
    pub header_name: Option<String>,
    pub header_role: Option<String>,
    pub contact: Option<Contact>,
    pub summary: Option<String>,
    pub experience_entries: Option<Vec<ExperienceEntry>>,
    pub education_entries: Option<Vec<EducationEntry>>,
    pub skill_groups: Option<IndexMap<String, Vec<String>>>,
    pub languages: Option<Vec<LanguageEntry>>,
    pub certifications: Option<Vec<String>>,
    pub publications: Option<Vec<PublicationEntry>>,
}

impl ResumePatch {
    fn apply(self, doc: &mut Resume) {
        if let Some(v) = self.display_title {
            doc.display_title = v;
        }
        if let Some(v) = self.header_name {
            doc.header_name = v;
        }
        if let Some(v) = self.header_role {
            doc.header_role = v;
        }
        if let Some(v) = self.contact {
            doc.contact = v;
        }
        if let Some(v) = self.summary {
            doc.summary = v;
        }
        if let Some(v) = self.experience_entries {
            doc.experience_entries = v;
        }
        if let Some(v) = self.education_entries {
            doc.education_entries = v;
        }
        if let Some(v) = self.skill_groups {
            doc.skill_groups = v;
        }
        if let Some(v) = self.languages {
            doc.languages = v;
        }
        if let Some(v) = self.certifications {
            doc.certifications = v;
        }
        if let Some(v) = self.publications {
            doc.publications = v;
        }
    }
}

pub struct CollectionStore {
    state: CollectionState,
    slot: LocalSlot,
    mirror: MirrorHandle,
}

impl CollectionStore {
    /// Hydrates the collection from the local slot. The slot guarantees a
    /// non-empty, normalized state with a valid active identity.
    pub fn open(slot: LocalSlot, mirror: MirrorHandle) -> Self {
        let state = slot.load();
        CollectionStore {
            state,
            slot,
            mirror,
        }
    }

    pub fn documents(&self) -> &[Resume] {
        &self.state.documents
    }

    pub fn active_id(&self) -> Uuid {
        self.state.active_identity
    }

    /// The active resume. Falls back to the first document if the active
    /// identity is somehow dangling; the collection is never empty.
    pub fn active(&self) -> &Resume {
        self.state
            .documents
            .iter()
            .find(|d| d.id == self.state.active_identity)
            .unwrap_or(&self.state.documents[0])
    }

    // ── Document lifecycle ──────────────────────────────────────────────────

    /// Creates a blank resume titled `name`, inserts it, and makes it active.
    pub fn create(&mut self, name: &str) -> Uuid {
        let mut doc = Resume::blank();
        doc.display_title = name.to_string();
        let id = doc.id;
        self.state.documents.push(doc.clone());
        self.state.active_identity = id;
        debug!("created resume {id} ({name})");
        self.save_local();
        self.mirror.upsert(&doc);
        id
    }

    /// Makes `id` the active resume. Unknown identities are ignored.
    pub fn select(&mut self, id: Uuid) {
        if self.state.documents.iter().any(|d| d.id == id) {
            self.state.active_identity = id;
            self.save_local();
        }
    }

    /// Shallow-merges `patch` into the active resume and stamps it modified.
    pub fn update_active(&mut self, patch: ResumePatch) {
        let active_id = self.state.active_identity;
        let snapshot = match self.state.documents.iter_mut().find(|d| d.id == active_id) {
            Some(doc) => {
                patch.apply(doc);
                doc.last_modified_at = Utc::now();
                doc.clone()
            }
            None => return,
        };
        self.save_local();
        self.mirror.upsert(&snapshot);
    }

    /// Removes a resume. The last remaining resume cannot be deleted; unknown
    /// identities are ignored. If the removed resume was active, the first
    /// remaining document (insertion order) becomes active.
    pub fn delete(&mut self, id: Uuid) {
        if self.state.documents.len() <= 1 {
            return;
        }
        let Some(pos) = self.state.documents.iter().position(|d| d.id == id) else {
            return;
        };
        let removed = self.state.documents.remove(pos);
        if self.state.active_identity == id {
            self.state.active_identity = self.state.documents[0].id;
        }
        debug!("deleted resume {id} ({})", removed.display_title);
        self.save_local();
        if !removed.display_title.is_empty() {
            self.mirror.remove(&removed.display_title);
        }
    }

    /// Retitles a resume. When the title actually changes, the remote record
    /// under the old title is removed before the document is re-uploaded
    /// under the new one; renaming to the identical title skips the remove
    /// but still re-uploads.
    pub fn rename(&mut self, id: Uuid, new_title: &str) {
        let snapshot = match self.state.documents.iter_mut().find(|d| d.id == id) {
            Some(doc) => {
                let old_title = std::mem::replace(&mut doc.display_title, new_title.to_string());
                doc.last_modified_at = Utc::now();
                (old_title, doc.clone())
            }
            None => return,
        };
        let (old_title, doc) = snapshot;
        self.save_local();
        if !old_title.is_empty() && old_title != new_title {
            self.mirror.remove(&old_title);
        }
        self.mirror.upsert(&doc);
    }

    /// Deep-copies a resume under a fresh identity with `" (Copy)"` appended
    /// to the title, inserts it, and makes it active. Every other field,
    /// the modification timestamp included, is carried over unchanged.
    pub fn duplicate(&mut self, id: Uuid) -> Option<Uuid> {
        let mut copy = self.state.documents.iter().find(|d| d.id == id)?.clone();
        copy.id = Uuid::new_v4();
        copy.display_title = format!("{} (Copy)", copy.display_title);
        let new_id = copy.id;
        self.state.documents.push(copy.clone());
        self.state.active_identity = new_id;
        self.save_local();
        self.mirror.upsert(&copy);
        Some(new_id)
    }

    // ── Skill-group helpers (all routed through `update_active`) ────────────

    /// Adds a skill group with a placeholder skill. Labels auto-number to
    /// avoid collisions: "New Category", "New Category 1", "New Category 2" …
    pub fn add_skill_group(&mut self) {
        let mut groups = self.active().skill_groups.clone();
        let mut label = String::from("New Category");
        let mut n = 1u32;
        while groups.contains_key(&label) {
            label = format!("New Category {n}");
            n += 1;
        }
        groups.insert(label, vec![String::new()]);
        self.update_active(ResumePatch {
            skill_groups: Some(groups),
            ..Default::default()
        });
    }

    /// Relabels a skill group. No-op when the labels are identical or the old
    /// label is absent. The relabeled group keeps the map-key semantics of
    /// the stored format: a new label lands at the end of the group order.
    pub fn rename_skill_group(&mut self, old_label: &str, new_label: &str) {
        if old_label == new_label {
            return;
        }
        let mut groups = self.active().skill_groups.clone();
        let Some(skills) = groups.shift_remove(old_label) else {
            return;
        };
        groups.insert(new_label.to_string(), skills);
        self.update_active(ResumePatch {
            skill_groups: Some(groups),
            ..Default::default()
        });
    }

    pub fn delete_skill_group(&mut self, label: &str) {
        let mut groups = self.active().skill_groups.clone();
        if groups.shift_remove(label).is_none() {
            return;
        }
        self.update_active(ResumePatch {
            skill_groups: Some(groups),
            ..Default::default()
        });
    }

    /// Appends an empty placeholder skill, creating the group if needed.
    pub fn add_skill(&mut self, label: &str) {
        let mut groups = self.active().skill_groups.clone();
        groups
            .entry(label.to_string())
            .or_default()
            .push(String::new());
        self.update_active(ResumePatch {
            skill_groups: Some(groups),
            ..Default::default()
        });
    }

    pub fn update_skill(&mut self, label: &str, index: usize, value: &str) {
        let mut groups = self.active().skill_groups.clone();
        match groups.get_mut(label) {
            Some(skills) if index < skills.len() => skills[index] = value.to_string(),
            _ => return,
        }
        self.update_active(ResumePatch {
            skill_groups: Some(groups),
            ..Default::default()
        });
    }

    /// Removes one skill. Removing a group's last skill removes the group;
    /// no group ever holds an empty skill list.
    pub fn delete_skill(&mut self, label: &str, index: usize) {
        let mut groups = self.active().skill_groups.clone();
        match groups.get_mut(label) {
            Some(skills) if index < skills.len() => {
                skills.remove(index);
                if skills.is_empty() {
                    groups.shift_remove(label);
                }
            }
            _ => return,
        }
        self.update_active(ResumePatch {
            skill_groups: Some(groups),
            ..Default::default()
        });
    }

    // ── Reordering ──────────────────────────────────────────────────────────

    /// Moves the experience entry at `src` to `dst`, preserving the relative
    /// order of everything else (single-element splice). Out-of-range indices
    /// are ignored.
    pub fn move_experience_entry(&mut self, src: usize, dst: usize) {
        let entries = &self.active().experience_entries;
        if src >= entries.len() || dst >= entries.len() {
            return;
        }
        let mut entries = entries.clone();
        let moved = entries.remove(src);
        entries.insert(dst, moved);
        self.update_active(ResumePatch {
            experience_entries: Some(entries),
            ..Default::default()
        });
    }

    // ── Reconciliation support ──────────────────────────────────────────────

    /// Merges remote documents into the collection, remote-wins on identity:
    /// a matching id is replaced in place (position kept), an unknown id is
    /// appended. Saves locally and generates no mirror traffic (the documents
    /// just came from the remote side).
    pub(crate) fn merge_remote(&mut self, remote_docs: Vec<Resume>) {
        for incoming in remote_docs {
            match self
                .state
                .documents
                .iter_mut()
                .find(|d| d.id == incoming.id)
            {
                Some(existing) => {
                    debug!(
                        "remote copy of {} replaces local '{}'",
                        incoming.id, existing.display_title
                    );
                    *existing = incoming;
                }
                None => self.state.documents.push(incoming),
            }
        }
        self.save_local();
    }

    pub(crate) fn mirror(&self) -> &MirrorHandle {
        &self.mirror
    }

    fn save_local(&self) {
        self.slot.save(&self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::mirror::MirrorCommand;
    use tempfile::TempDir;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn make_store() -> (CollectionStore, UnboundedReceiver<MirrorCommand>, TempDir) {
        let dir = TempDir::new().unwrap();
        let slot = LocalSlot::new(dir.path().join("collection.json"));
        let (mirror, rx) = MirrorHandle::channel();
        let store = CollectionStore::open(slot, mirror);
        (store, rx, dir)
    }

    fn drain(rx: &mut UnboundedReceiver<MirrorCommand>) -> Vec<MirrorCommand> {
        let mut out = Vec::new();
        while let Ok(cmd) = rx.try_recv() {
            out.push(cmd);
        }
        out
    }

    fn experience(role: &str) -> ExperienceEntry {
        ExperienceEntry {
            id: Uuid::new_v4(),
            role: role.to_string(),
            company: String::new(),
            location: String::new(),
            period: String::new(),
            highlights: Vec::new(),
        }
    }

    #[test]
    fn test_open_starts_with_one_default_resume() {
        let (store, _rx, _dir) = make_store();
        assert_eq!(store.documents().len(), 1);
        assert_eq!(store.active().display_title, "New Resume");
        assert_eq!(store.active_id(), store.documents()[0].id);
    }

    #[test]
    fn test_create_inserts_and_activates() {
        let (mut store, mut rx, _dir) = make_store();
        let id = store.create("Second");
        assert_eq!(store.documents().len(), 2);
        assert_eq!(store.active_id(), id);
        assert_eq!(store.active().display_title, "Second");

        let commands = drain(&mut rx);
        assert_eq!(commands.len(), 1);
        match &commands[0] {
            MirrorCommand::Upsert(doc) => assert_eq!(doc.display_title, "Second"),
            other => panic!("expected upsert, got {other:?}"),
        }
    }

    #[test]
    fn test_collection_never_becomes_empty() {
        let (mut store, _rx, _dir) = make_store();
        let first = store.documents()[0].id;
        store.delete(first);
        assert_eq!(store.documents().len(), 1);

        let second = store.create("Second");
        store.delete(first);
        store.delete(second);
        assert_eq!(store.documents().len(), 1);
    }

    #[test]
    fn test_delete_sole_document_sends_no_remote_remove() {
        let (mut store, mut rx, _dir) = make_store();
        let only = store.documents()[0].id;
        store.delete(only);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let (mut store, mut rx, _dir) = make_store();
        store.create("Second");
        drain(&mut rx);
        let before = store.documents().to_vec();
        store.delete(Uuid::new_v4());
        assert_eq!(store.documents(), &before[..]);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_delete_active_promotes_first_remaining() {
        let (mut store, mut rx, _dir) = make_store();
        let first = store.documents()[0].id;
        let second = store.create("Second");
        let third = store.create("Third");
        drain(&mut rx);

        store.select(second);
        store.delete(second);

        assert_eq!(store.documents().len(), 2);
        assert_eq!(store.active_id(), first);
        assert_eq!(store.documents()[1].id, third);

        let commands = drain(&mut rx);
        assert_eq!(commands.len(), 1);
        match &commands[0] {
            MirrorCommand::Remove(title) => assert_eq!(title, "Second"),
            other => panic!("expected remove, got {other:?}"),
        }
    }

    #[test]
    fn test_delete_inactive_keeps_active() {
        let (mut store, _rx, _dir) = make_store();
        let second = store.create("Second");
        let third = store.create("Third");
        assert_eq!(store.active_id(), third);
        store.delete(second);
        assert_eq!(store.active_id(), third);
    }

    #[test]
    fn test_select_unknown_is_noop() {
        let (mut store, _rx, _dir) = make_store();
        let active = store.active_id();
        store.select(Uuid::new_v4());
        assert_eq!(store.active_id(), active);
    }

    #[test]
    fn test_select_switches_active() {
        let (mut store, _rx, _dir) = make_store();
        let first = store.documents()[0].id;
        store.create("Second");
        store.select(first);
        assert_eq!(store.active_id(), first);
    }

    #[test]
    fn test_update_active_merges_and_bumps_timestamp() {
        let (mut store, mut rx, _dir) = make_store();
        store.rename(store.active_id(), "Kept Title");
        drain(&mut rx);
        let before = store.active().last_modified_at;

        store.update_active(ResumePatch {
            summary: Some("A new summary".to_string()),
            ..Default::default()
        });

        let doc = store.active();
        assert_eq!(doc.summary, "A new summary");
        assert_eq!(doc.display_title, "Kept Title");
        assert!(doc.last_modified_at >= before);

        let commands = drain(&mut rx);
        assert_eq!(commands.len(), 1);
        assert!(matches!(commands[0], MirrorCommand::Upsert(_)));
    }

    #[test]
    fn test_rename_emits_remove_then_upsert() {
        let (mut store, mut rx, _dir) = make_store();
        let id = store.active_id();
        drain(&mut rx);

        store.rename(id, "Renamed");

        let commands = drain(&mut rx);
        assert_eq!(commands.len(), 2);
        match &commands[0] {
            MirrorCommand::Remove(title) => assert_eq!(title, "New Resume"),
            other => panic!("expected remove first, got {other:?}"),
        }
        match &commands[1] {
            MirrorCommand::Upsert(doc) => assert_eq!(doc.display_title, "Renamed"),
            other => panic!("expected upsert second, got {other:?}"),
        }
    }

    #[test]
    fn test_rename_identical_title_skips_remove() {
        let (mut store, mut rx, _dir) = make_store();
        let id = store.active_id();
        store.rename(id, "Draft");
        drain(&mut rx);

        store.rename(id, "Draft");
        let commands = drain(&mut rx);
        assert_eq!(commands.len(), 1);
        assert!(matches!(commands[0], MirrorCommand::Upsert(_)));
    }

    #[test]
    fn test_rename_unknown_is_noop() {
        let (mut store, mut rx, _dir) = make_store();
        drain(&mut rx);
        store.rename(Uuid::new_v4(), "Ghost");
        assert!(drain(&mut rx).is_empty());
        assert_eq!(store.active().display_title, "New Resume");
    }

    #[test]
    fn test_duplicate_copies_everything_but_identity_and_title() {
        let (mut store, _rx, _dir) = make_store();
        store.update_active(ResumePatch {
            summary: Some("Original summary".to_string()),
            experience_entries: Some(vec![experience("Engineer")]),
            ..Default::default()
        });
        let original = store.active().clone();

        let copy_id = store.duplicate(original.id).unwrap();
        assert_eq!(store.active_id(), copy_id);

        let copy = store.active();
        assert_ne!(copy.id, original.id);
        assert_eq!(copy.display_title, "New Resume (Copy)");
        assert_eq!(copy.summary, original.summary);
        assert_eq!(copy.experience_entries, original.experience_entries);
        assert_eq!(copy.last_modified_at, original.last_modified_at);
    }

    #[test]
    fn test_duplicate_unknown_is_noop() {
        let (mut store, mut rx, _dir) = make_store();
        drain(&mut rx);
        assert!(store.duplicate(Uuid::new_v4()).is_none());
        assert_eq!(store.documents().len(), 1);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_add_skill_group_auto_numbers() {
        let (mut store, _rx, _dir) = make_store();
        store.add_skill_group();
        store.add_skill_group();
        store.add_skill_group();

        let labels: Vec<&String> = store.active().skill_groups.keys().collect();
        assert_eq!(labels, ["New Category", "New Category 1", "New Category 2"]);
        for skills in store.active().skill_groups.values() {
            assert_eq!(skills, &vec![String::new()]);
        }
    }

    #[test]
    fn test_rename_skill_group_moves_to_end() {
        let (mut store, _rx, _dir) = make_store();
        let mut groups = IndexMap::new();
        groups.insert("Languages".to_string(), vec!["Rust".to_string()]);
        groups.insert("Tools".to_string(), vec!["Git".to_string()]);
        store.update_active(ResumePatch {
            skill_groups: Some(groups),
            ..Default::default()
        });

        store.rename_skill_group("Languages", "Programming");

        let labels: Vec<&String> = store.active().skill_groups.keys().collect();
        assert_eq!(labels, ["Tools", "Programming"]);
        assert_eq!(
            store.active().skill_groups["Programming"],
            vec!["Rust".to_string()]
        );
    }

    #[test]
    fn test_rename_skill_group_identical_or_missing_is_noop() {
        let (mut store, mut rx, _dir) = make_store();
        store.add_skill_group();
        drain(&mut rx);

        store.rename_skill_group("New Category", "New Category");
        store.rename_skill_group("Absent", "Whatever");
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_delete_last_skill_removes_group() {
        let (mut store, _rx, _dir) = make_store();
        let mut groups = IndexMap::new();
        groups.insert(
            "Databases".to_string(),
            vec!["Postgres".to_string(), "Redis".to_string()],
        );
        store.update_active(ResumePatch {
            skill_groups: Some(groups),
            ..Default::default()
        });

        store.delete_skill("Databases", 1);
        assert_eq!(store.active().skill_groups["Databases"], vec!["Postgres"]);

        store.delete_skill("Databases", 0);
        assert!(!store.active().skill_groups.contains_key("Databases"));
        assert!(store
            .active()
            .skill_groups
            .values()
            .all(|skills| !skills.is_empty()));
    }

    #[test]
    fn test_add_skill_creates_group_when_missing() {
        let (mut store, _rx, _dir) = make_store();
        store.add_skill("Cloud");
        assert_eq!(store.active().skill_groups["Cloud"], vec![String::new()]);
    }

    #[test]
    fn test_update_skill_out_of_range_is_noop() {
        let (mut store, mut rx, _dir) = make_store();
        store.add_skill("Cloud");
        drain(&mut rx);

        store.update_skill("Cloud", 5, "AWS");
        store.update_skill("Absent", 0, "AWS");
        assert!(drain(&mut rx).is_empty());

        store.update_skill("Cloud", 0, "AWS");
        assert_eq!(store.active().skill_groups["Cloud"], vec!["AWS"]);
    }

    #[test]
    fn test_move_experience_entry_splices() {
        let (mut store, _rx, _dir) = make_store();
        store.update_active(ResumePatch {
            experience_entries: Some(vec![
                experience("A"),
                experience("B"),
                experience("C"),
            ]),
            ..Default::default()
        });

        store.move_experience_entry(0, 2);

        let roles: Vec<&String> = store
            .active()
            .experience_entries
            .iter()
            .map(|e| &e.role)
            .collect();
        assert_eq!(roles, ["B", "C", "A"]);
    }

    #[test]
    fn test_move_experience_entry_out_of_range_is_noop() {
        let (mut store, mut rx, _dir) = make_store();
        store.update_active(ResumePatch {
            experience_entries: Some(vec![experience("A"), experience("B")]),
            ..Default::default()
        });
        drain(&mut rx);

        store.move_experience_entry(0, 2);
        store.move_experience_entry(5, 0);
        assert!(drain(&mut rx).is_empty());

        let roles: Vec<&String> = store
            .active()
            .experience_entries
            .iter()
            .map(|e| &e.role)
            .collect();
        assert_eq!(roles, ["A", "B"]);
    }

    #[test]
    fn test_mutations_persist_to_the_slot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("collection.json");
        {
            let (mirror, _rx) = MirrorHandle::channel();
            let mut store = CollectionStore::open(LocalSlot::new(&path), mirror);
            store.create("Persisted");
            store.rename(store.active_id(), "Persisted v2");
        }

        let (mirror, _rx) = MirrorHandle::channel();
        let reloaded = CollectionStore::open(LocalSlot::new(&path), mirror);
        assert_eq!(reloaded.documents().len(), 2);
        assert_eq!(reloaded.active().display_title, "Persisted v2");
    }

    #[test]
    fn test_merge_remote_replaces_in_place_and_appends() {
        let (mut store, mut rx, _dir) = make_store();
        let local_id = store.active_id();
        store.rename(local_id, "Local");
        drain(&mut rx);

        let mut replacement = store.active().clone();
        replacement.summary = "from the remote store".to_string();
        let mut extra = Resume::blank();
        extra.display_title = "Remote Only".to_string();
        let extra_id = extra.id;

        store.merge_remote(vec![replacement, extra]);

        assert_eq!(store.documents().len(), 2);
        assert_eq!(store.documents()[0].id, local_id);
        assert_eq!(store.documents()[0].summary, "from the remote store");
        assert_eq!(store.documents()[1].id, extra_id);
        // merge generates no mirror traffic
        assert!(drain(&mut rx).is_empty());
    }
}
