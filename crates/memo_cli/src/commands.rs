//! Subcommand handlers.

use crate::{Command, ListArgs, TagsCommand};
use anyhow::{anyhow, bail, Context, Result};
use memo_core::{
    HydratedMemo, KeyValueStore, MemoDraft, MemoPatch, MemoService, MemoValidationError, Tag,
};
use std::io::Write;

pub(crate) fn execute<S, W>(
    service: &mut MemoService<'_, S>,
    command: Command,
    out: &mut W,
) -> Result<()>
where
    S: KeyValueStore + ?Sized,
    W: Write,
{
    match command {
        Command::New { title, body, tags } => {
            let mut draft = MemoDraft::new(title, body, Vec::new());
            draft.validate()?;
            check_tag_references(&tags)?;
            draft.tags = resolve_or_create_tags(service, &tags)?;
            let memo = service.create_memo(draft)?;
            writeln!(out, "{}", memo.id)?;
        }
        Command::Edit {
            id,
            title,
            body,
            tags,
            clear_tags,
        } => {
            if service.find_memo(&id).is_none() {
                bail!("memo not found: {id}");
            }
            if title.as_deref().is_some_and(|title| title.trim().is_empty()) {
                return Err(MemoValidationError::BlankTitle.into());
            }
            check_tag_references(&tags)?;
            let mut patch = MemoPatch {
                title,
                body,
                tag_ids: None,
            };
            if clear_tags {
                patch.tag_ids = Some(Vec::new());
            } else if !tags.is_empty() {
                let resolved = resolve_or_create_tags(service, &tags)?;
                patch.tag_ids = Some(resolved.into_iter().map(|tag| tag.id).collect());
            }
            if patch.is_empty() {
                bail!("nothing to change; pass --title, --body, --tag or --clear-tags");
            }
            let changed = service.patch_memo(&id, patch)?;
            writeln!(out, "{}", if changed { "updated" } else { "unchanged" })?;
        }
        Command::Show { id, json } => {
            let memo = service
                .find_memo(&id)
                .ok_or_else(|| anyhow!("memo not found: {id}"))?;
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&memo)?)?;
            } else {
                write_memo_detail(out, &memo)?;
            }
        }
        Command::Rm { id } => {
            let removed = service.delete_memo(&id)?;
            writeln!(out, "{}", if removed { "deleted" } else { "not found" })?;
        }
        Command::List(args) => list_memos(service, args, out)?,
        Command::Tags(command) => execute_tags(service, command, out)?,
        Command::Prune => {
            let pruned = service.prune_dangling_tag_ids()?;
            writeln!(out, "pruned {pruned} memo(s)")?;
        }
    }
    Ok(())
}

fn list_memos<S, W>(service: &MemoService<'_, S>, args: ListArgs, out: &mut W) -> Result<()>
where
    S: KeyValueStore + ?Sized,
    W: Write,
{
    let required = args
        .tags
        .iter()
        .map(|reference| {
            find_tag(service.available_tags(), reference)
                .cloned()
                .ok_or_else(|| anyhow!("unknown tag: {reference}"))
        })
        .collect::<Result<Vec<_>>>()?;

    let memos = service.filtered_view(&args.title, &required);
    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&memos)?)?;
        return Ok(());
    }
    for memo in &memos {
        writeln!(out, "{}  {}{}", memo.id, memo.title, tag_suffix(&memo.tags))?;
    }
    Ok(())
}

fn execute_tags<S, W>(
    service: &mut MemoService<'_, S>,
    command: TagsCommand,
    out: &mut W,
) -> Result<()>
where
    S: KeyValueStore + ?Sized,
    W: Write,
{
    match command {
        TagsCommand::List { json } => {
            let tags = service.available_tags();
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(tags)?)?;
            } else {
                for tag in tags {
                    writeln!(out, "{}  {}", tag.id, tag.label)?;
                }
            }
        }
        TagsCommand::Add { label } => {
            let tag = service.create_tag(label)?;
            writeln!(out, "{}", tag.id)?;
        }
        TagsCommand::Rename { id, label } => {
            let changed = service.update_tag(&id, label)?;
            writeln!(out, "{}", if changed { "renamed" } else { "unchanged" })?;
        }
        TagsCommand::Rm { id } => {
            let removed = service.delete_tag(&id)?;
            writeln!(out, "{}", if removed { "deleted" } else { "not found" })?;
        }
    }
    Ok(())
}

/// Rejects blank references before any tag gets created.
fn check_tag_references(references: &[String]) -> Result<()> {
    if references.iter().any(|reference| reference.trim().is_empty()) {
        bail!("tag reference cannot be blank");
    }
    Ok(())
}

/// Resolves each reference by id, then by exact label; unknown labels become
/// new tags. Repeated references collapse.
fn resolve_or_create_tags<S>(
    service: &mut MemoService<'_, S>,
    references: &[String],
) -> Result<Vec<Tag>>
where
    S: KeyValueStore + ?Sized,
{
    let mut resolved: Vec<Tag> = Vec::new();
    for reference in references {
        let known = find_tag(service.available_tags(), reference).cloned();
        let tag = match known {
            Some(tag) => tag,
            None => service
                .create_tag(reference.as_str())
                .with_context(|| format!("failed to create tag `{reference}`"))?,
        };
        if !resolved.iter().any(|known| known.id == tag.id) {
            resolved.push(tag);
        }
    }
    Ok(resolved)
}

fn find_tag<'t>(tags: &'t [Tag], reference: &str) -> Option<&'t Tag> {
    tags.iter()
        .find(|tag| tag.id == reference)
        .or_else(|| tags.iter().find(|tag| tag.label == reference))
}

fn write_memo_detail<W: Write>(out: &mut W, memo: &HydratedMemo) -> Result<()> {
    writeln!(out, "# {}", memo.title)?;
    if !memo.tags.is_empty() {
        let labels: Vec<&str> = memo.tags.iter().map(|tag| tag.label.as_str()).collect();
        writeln!(out, "tags: {}", labels.join(", "))?;
    }
    writeln!(out, "id: {}", memo.id)?;
    if !memo.body.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", memo.body)?;
    }
    Ok(())
}

fn tag_suffix(tags: &[Tag]) -> String {
    if tags.is_empty() {
        return String::new();
    }
    let labels: Vec<String> = tags.iter().map(|tag| format!("#{}", tag.label)).collect();
    format!("  [{}]", labels.join(" "))
}
