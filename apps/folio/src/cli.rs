//! Command-line shell over the collection store.
//!
//! Each invocation runs one editing or export command against the hydrated
//! collection and exits; the slot file carries state between runs. Every
//! mutation goes through the same store operations an interactive editor
//! front-end would call.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

use crate::models::resume::Contact;
use crate::render::{default_page_config, render, render_json};
use crate::store::collection::{CollectionStore, ResumePatch};

#[derive(Parser)]
#[command(name = "folio", version, about = "Resume collection editor")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List every resume in the collection
    List,
    /// Create a blank resume and make it active
    New {
        /// Display title of the new resume
        name: String,
    },
    /// Make a resume active
    Select { id: Uuid },
    /// Change a resume's display title
    Rename { id: Uuid, title: String },
    /// Copy a resume under a fresh identity and make the copy active
    Duplicate { id: Uuid },
    /// Delete a resume (the last remaining one cannot be deleted)
    Delete { id: Uuid },
    /// Show the active resume
    Show,
    /// Update header and contact fields of the active resume
    Set(SetArgs),
    /// Manage skill groups of the active resume
    Skill {
        #[command(subcommand)]
        action: SkillCommand,
    },
    /// Move an experience entry of the active resume to another position
    MoveExp { src: usize, dst: usize },
    /// Render the active resume as a paginated text document
    Export {
        /// Write to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
        /// Render this JSON file instead of the active resume
        #[arg(long)]
        from_json: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum SkillCommand {
    /// Add an auto-named skill group with a placeholder skill
    AddGroup,
    /// Relabel a skill group
    RenameGroup { old: String, new: String },
    /// Delete a skill group
    DeleteGroup { label: String },
    /// Append an empty skill to a group, creating the group if needed
    Add { label: String },
    /// Set the skill at an index within a group
    Set {
        label: String,
        index: usize,
        value: String,
    },
    /// Delete the skill at an index; a group losing its last skill is removed
    Delete { label: String, index: usize },
}

#[derive(Args)]
pub struct SetArgs {
    /// Display title
    #[arg(long)]
    pub title: Option<String>,
    /// Header name
    #[arg(long)]
    pub name: Option<String>,
    /// Header role
    #[arg(long)]
    pub role: Option<String>,
    #[arg(long)]
    pub summary: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    /// LinkedIn profile URL
    #[arg(long)]
    pub linkedin: Option<String>,
}

pub fn run(store: &mut CollectionStore, command: Command) -> Result<()> {
    match command {
        Command::List => {
            for doc in store.documents() {
                let marker = if doc.id == store.active_id() { "*" } else { " " };
                println!(
                    "{marker} {}  {}  (modified {})",
                    doc.id,
                    doc.display_title,
                    doc.last_modified_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        Command::New { name } => {
            let id = store.create(&name);
            println!("created {id}");
        }
        Command::Select { id } => {
            store.select(id);
            println!("active: {}", store.active().display_title);
        }
        Command::Rename { id, title } => store.rename(id, &title),
        Command::Duplicate { id } => match store.duplicate(id) {
            Some(new_id) => println!("created {new_id}"),
            None => println!("no resume with id {id}"),
        },
        Command::Delete { id } => store.delete(id),
        Command::Show => {
            let doc = store.active();
            println!("{} ({})", doc.display_title, doc.id);
            if !doc.header_name.is_empty() {
                println!("  {} · {}", doc.header_name, doc.header_role);
            }
            println!(
                "  {} experience / {} education / {} skill group(s)",
                doc.experience_entries.len(),
                doc.education_entries.len(),
                doc.skill_groups.len()
            );
        }
        Command::Set(args) => {
            store.update_active(patch_from(args, store.active().contact.clone()));
            println!("updated {}", store.active().display_title);
        }
        Command::Skill { action } => match action {
            SkillCommand::AddGroup => store.add_skill_group(),
            SkillCommand::RenameGroup { old, new } => store.rename_skill_group(&old, &new),
            SkillCommand::DeleteGroup { label } => store.delete_skill_group(&label),
            SkillCommand::Add { label } => store.add_skill(&label),
            SkillCommand::Set {
                label,
                index,
                value,
            } => store.update_skill(&label, index, &value),
            SkillCommand::Delete { label, index } => store.delete_skill(&label, index),
        },
        Command::MoveExp { src, dst } => store.move_experience_entry(src, dst),
        Command::Export { out, from_json } => {
            let config = default_page_config();
            let artifact = match from_json {
                Some(path) => {
                    let raw = fs::read_to_string(&path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    let value: serde_json::Value = serde_json::from_str(&raw)
                        .with_context(|| format!("parsing {}", path.display()))?;
                    render_json(&value, &config)
                }
                None => render(store.active(), &config),
            };
            let text = artifact.to_text();
            match out {
                Some(path) => {
                    fs::write(&path, text)
                        .with_context(|| format!("writing export to {}", path.display()))?;
                    println!(
                        "exported '{}' ({} page(s)) to {}",
                        artifact.title,
                        artifact.pages.len(),
                        path.display()
                    );
                }
                None => print!("{text}"),
            }
        }
    }
    Ok(())
}

/// Folds the `set` flags into one partial update. The contact record is
/// replaced wholesale, so absent contact flags carry the current values.
fn patch_from(args: SetArgs, current_contact: Contact) -> ResumePatch {
    let contact_touched = args.location.is_some()
        || args.phone.is_some()
        || args.email.is_some()
        || args.linkedin.is_some();
    let contact = contact_touched.then(|| Contact {
        location: args.location.unwrap_or(current_contact.location),
        phone: args.phone.unwrap_or(current_contact.phone),
        email: args.email.unwrap_or(current_contact.email),
        linkedin_url: args.linkedin.unwrap_or(current_contact.linkedin_url),
    });

    ResumePatch {
        display_title: args.title,
        header_name: args.name,
        header_role: args.role,
        summary: args.summary,
        contact,
        ..Default::default()
    }
}
