use clap::{Args, ValueEnum};
use gta_gxt::{GxtFile, LoadOptions, Table};
use itertools::Itertools;
use miette::Result;
use owo_colors::OwoColorize;
use similar::{ChangeTag, TextDiff};
use std::{fmt::Display, path::PathBuf};

use super::key_label;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum Mode {
    /// Only list which entries changed
    #[default]
    Semantic,
    /// Also show an inline diff of every changed entry
    Full,
}

#[derive(Debug, Eq, PartialEq)]
enum Change {
    Added(String),
    Removed(String),
    Comparison(String, String, String),
    Context(Vec<String>),
    Modified(String, Vec<Change>),
}

impl Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Change::Added(v) => writeln!(f, "✅ {}", v.green()),
            Change::Removed(v) => writeln!(f, "❌ {}", v.red()),
            Change::Comparison(key, old, new) => {
                writeln!(f, "* {}: {} vs {}", key, old.red(), new.green())
            }
            Change::Context(lines) => {
                writeln!(f, "{}", lines.iter().map(|l| format!(" {}", l)).join("\n"))
            }
            Change::Modified(v, children) => {
                writeln!(f, "🔃 {}", v.blue())?;
                let body = children.iter().map(|c| c.to_string()).join("");
                writeln!(
                    f,
                    "{}",
                    body.split('\n')
                        .filter(|l| !l.trim().is_empty())
                        .map(|l| format!("  {}", l))
                        .join("\n")
                )
            }
        }
    }
}

#[derive(Args)]
pub struct DiffArgs {
    /// An input GXT file
    #[arg(short, long, value_name = "FILE")]
    left: PathBuf,

    /// An input GXT file
    #[arg(short, long, value_name = "FILE")]
    right: PathBuf,

    /// Comparison mode
    #[arg(short, long, value_enum, default_value_t = Mode::Semantic)]
    mode: Mode,
}

impl DiffArgs {
    fn inline_diff(&self, old: &str, new: &str) -> Vec<String> {
        let diff = TextDiff::from_chars(old, new);
        let mut lines = Vec::new();
        for op in diff.ops() {
            for change in diff.iter_inline_changes(op) {
                let mut line = String::new();
                for (emphasized, value) in change.iter_strings_lossy() {
                    let styled = match (emphasized, change.tag()) {
                        (true, ChangeTag::Insert) => value.green().underline().to_string(),
                        (true, _) => value.red().underline().to_string(),
                        (false, _) => value.dimmed().to_string(),
                    };
                    line.push_str(&styled);
                }
                lines.push(line);
            }
        }
        lines
    }

    fn handle_table(&self, left: &Table, right: &Table) -> Vec<Change> {
        let mut result = Vec::new();

        // Added entries
        right
            .iter()
            .filter(|(hash, _)| !left.contains(*hash))
            .map(|(hash, _)| Change::Added(key_label(right, hash)))
            .sorted_by(|a, b| a.to_string().cmp(&b.to_string()))
            .for_each(|c| result.push(c));

        // Removed entries
        left.iter()
            .filter(|(hash, _)| !right.contains(*hash))
            .map(|(hash, _)| Change::Removed(key_label(left, hash)))
            .sorted_by(|a, b| a.to_string().cmp(&b.to_string()))
            .for_each(|c| result.push(c));

        // Changed text
        left.iter()
            .filter_map(|(hash, old)| right.get(hash).map(|new| (hash, old, new)))
            .filter(|(_, old, new)| old != new)
            .sorted_by_key(|(hash, _, _)| key_label(left, *hash))
            .map(|(hash, old, new)| {
                let children = match self.mode {
                    Mode::Full => vec![Change::Context(self.inline_diff(old, new))],
                    Mode::Semantic => Vec::new(),
                };
                Change::Modified(key_label(left, hash), children)
            })
            .for_each(|c| result.push(c));

        result
    }

    fn handle_gxt(&self, left: &GxtFile, right: &GxtFile) -> Vec<Change> {
        let mut result = Vec::new();

        if left.variant() != right.variant() {
            result.push(Change::Comparison(
                "variant".into(),
                left.variant().to_string(),
                right.variant().to_string(),
            ));
        }
        if left.encoding() != right.encoding() {
            result.push(Change::Comparison(
                "encoding".into(),
                left.encoding().to_string(),
                right.encoding().to_string(),
            ));
        }
        if self.mode == Mode::Full && left.layout() != right.layout() {
            result.push(Change::Comparison(
                "layout".into(),
                left.layout().to_string(),
                right.layout().to_string(),
            ));
        }

        right
            .tables()
            .filter(|t| left.table(t.name()).is_none())
            .map(|t| Change::Added(format!("table {}", t.name())))
            .for_each(|c| result.push(c));

        left.tables()
            .filter(|t| right.table(t.name()).is_none())
            .map(|t| Change::Removed(format!("table {}", t.name())))
            .for_each(|c| result.push(c));

        for table in left.tables() {
            if let Some(other) = right.table(table.name()) {
                let changes = self.handle_table(table, other);
                if !changes.is_empty() {
                    result.push(Change::Modified(
                        format!("table {}", table.name()),
                        changes,
                    ));
                }
            }
        }

        result
    }

    pub fn handle(&self) -> Result<()> {
        let left = super::open(&self.left, &LoadOptions::default())?;
        let right = super::open(&self.right, &LoadOptions::default())?;

        let changes = self.handle_gxt(&left, &right);
        if !changes.is_empty() {
            println!(
                "{}",
                Change::Modified(self.left.display().to_string(), changes)
            );
        }

        Ok(())
    }
}
