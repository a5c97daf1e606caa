//! Stats report types and terminal formatting.

use serde::Serialize;
use std::fmt;

/// Statistics for every generated split.
#[derive(Clone, Debug, Serialize)]
pub struct StatsReport {
    pub splits: Vec<SplitStats>,
    /// Display-only option for histogram rendering width.
    #[serde(skip)]
    pub(crate) bar_width: usize,
}

impl StatsReport {
    pub fn total_examples(&self) -> usize {
        self.splits.iter().map(|s| s.examples).sum()
    }

    pub fn total_objects(&self) -> usize {
        self.splits.iter().map(|s| s.objects).sum()
    }
}

/// Counts for one split.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SplitStats {
    pub split: String,
    pub examples: usize,
    pub objects: usize,
    /// Examples whose annotation has no objects.
    pub empty_examples: usize,
    /// Per-label counts, in class vocabulary order, followed by any labels
    /// outside the vocabulary.
    pub labels: Vec<LabelCount>,
}

/// Object and example counts for one label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    /// Number of boxes with this label.
    pub objects: usize,
    /// Number of examples containing at least one such box.
    pub examples: usize,
}

impl fmt::Display for StatsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "lanternfly: {} example(s), {} object(s) across {} split(s)",
            self.total_examples(),
            self.total_objects(),
            self.splits.len()
        )?;

        for split in &self.splits {
            writeln!(f)?;
            self.fmt_split(f, split)?;
        }

        Ok(())
    }
}

impl StatsReport {
    fn fmt_split(&self, f: &mut fmt::Formatter<'_>, split: &SplitStats) -> fmt::Result {
        writeln!(
            f,
            "[{}] {} example(s), {} object(s), {} without objects",
            split.split, split.examples, split.objects, split.empty_examples
        )?;

        let max_count = split.labels.iter().map(|l| l.objects).max().unwrap_or(0);
        for entry in &split.labels {
            let pct = if split.objects > 0 {
                (entry.objects as f64 / split.objects as f64) * 100.0
            } else {
                0.0
            };
            writeln!(
                f,
                "  {:<20} {:>7} {:>5.1}%  {}  in {} example(s)",
                truncate_label(&entry.label, 20),
                entry.objects,
                pct,
                render_bar(entry.objects, max_count, self.bar_width),
                entry.examples
            )?;
        }

        Ok(())
    }
}

/// Render a horizontal bar using block characters.
fn render_bar(count: usize, max_count: usize, width: usize) -> String {
    if max_count == 0 || width == 0 {
        return " ".repeat(width);
    }

    let filled = ((count * width) / max_count).min(width);
    "█".repeat(filled) + &"░".repeat(width - filled)
}

fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        label.to_string()
    } else {
        let kept: String = label.chars().take(max_chars - 1).collect();
        format!("{kept}…")
    }
}
