//! `daybook categories`: category spellings and proposed merges.

use std::io::Write;

use clap::Args;
use daybook_core::category::{CategoryGroup, MergeCommand, category_summaries, merge_candidates};
use serde::Serialize;

use super::Context;
use crate::output::{pretty_rule, pretty_section, render_mode};

/// Arguments for `daybook categories`.
#[derive(Args, Debug)]
pub struct CategoriesArgs {
    /// List every category, not just those with several spellings.
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Serialize)]
pub struct CategoryEntry {
    #[serde(flatten)]
    pub group: CategoryGroup,
    /// Present when the group has spellings other than its canonical name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge: Option<MergeCommand>,
}

impl From<CategoryGroup> for CategoryEntry {
    fn from(group: CategoryGroup) -> Self {
        let command = group.merge_command();
        Self {
            merge: (!command.from.is_empty()).then_some(command),
            group,
        }
    }
}

/// Execute `daybook categories`.
pub fn run_categories(args: &CategoriesArgs, ctx: &Context) -> anyhow::Result<()> {
    let log = ctx.load_log()?;
    let groups = if args.all {
        category_summaries(log.events())
    } else {
        merge_candidates(log.events())
    };
    let entries: Vec<CategoryEntry> = groups.into_iter().map(CategoryEntry::from).collect();

    render_mode(
        ctx.output,
        &entries,
        |entries, w| render_categories_text(entries, w),
        |entries, w| render_categories_pretty(entries, w),
    )
}

fn render_categories_text(entries: &[CategoryEntry], w: &mut dyn Write) -> std::io::Result<()> {
    for entry in entries {
        let spellings: Vec<String> = entry
            .group
            .variants
            .iter()
            .map(|v| format!("{:?}x{}", v.raw, v.count))
            .collect();
        writeln!(
            w,
            "{}  {}  {}",
            entry.group.canonical,
            entry.group.event_count(),
            spellings.join(" ")
        )?;
    }
    Ok(())
}

fn render_categories_pretty(entries: &[CategoryEntry], w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Categories")?;
    if entries.is_empty() {
        writeln!(w, "Nothing to merge.")?;
        return Ok(());
    }
    for entry in entries {
        writeln!(w, "{} ({} events)", entry.group.canonical, entry.group.event_count())?;
        for variant in &entry.group.variants {
            writeln!(w, "  {:?} × {}", variant.raw, variant.count)?;
        }
        if let Some(merge) = &entry.merge {
            let from: Vec<String> = merge.from.iter().map(|raw| format!("{raw:?}")).collect();
            writeln!(w, "  merge {} → {:?}", from.join(", "), merge.to)?;
        }
    }
    pretty_rule(w)
}
