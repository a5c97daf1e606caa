//! Split statistics.
//!
//! Counts examples, objects and labels per split, for a quick look at class
//! balance before training.

mod report;

pub use report::{LabelCount, SplitStats, StatsReport};

use std::collections::BTreeMap;

use crate::builder::DatasetBuilder;
use crate::error::LanternflyError;
use crate::features::ClassLabel;
use crate::ir::{Example, SplitName};

/// Options for split statistics.
#[derive(Clone, Debug)]
pub struct StatsOptions {
    /// Width of histogram bars (in characters).
    pub bar_width: usize,
}

impl Default for StatsOptions {
    fn default() -> Self {
        Self { bar_width: 20 }
    }
}

/// Generate every configured split and compute its statistics.
///
/// Examples are counted as they are generated and then dropped.
pub fn stats_dataset(
    builder: &DatasetBuilder,
    opts: &StatsOptions,
) -> Result<StatsReport, LanternflyError> {
    let classes = builder.info().features.class_label().clone();

    let mut splits = Vec::new();
    for examples in builder.split_generators()? {
        let mut counter = SplitCounter::new(examples.split().clone());
        for item in examples {
            let (_, example) = item?;
            counter.add(&example);
        }
        splits.push(counter.finish(&classes));
    }

    Ok(StatsReport {
        splits,
        bar_width: opts.bar_width,
    })
}

/// Compute statistics for one split's examples.
///
/// Every vocabulary class gets an entry, even with a zero count.
pub fn split_stats(split: &SplitName, examples: &[Example], classes: &ClassLabel) -> SplitStats {
    let mut counter = SplitCounter::new(split.clone());
    for example in examples {
        counter.add(example);
    }
    counter.finish(classes)
}

/// Running counts for one split.
#[derive(Debug)]
pub struct SplitCounter {
    split: SplitName,
    examples: usize,
    objects: usize,
    empty_examples: usize,
    // label -> (objects, examples)
    labels: BTreeMap<String, (usize, usize)>,
}

impl SplitCounter {
    pub fn new(split: SplitName) -> Self {
        Self {
            split,
            examples: 0,
            objects: 0,
            empty_examples: 0,
            labels: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, example: &Example) {
        self.examples += 1;
        self.objects += example.objects.len();
        if example.objects.is_empty() {
            self.empty_examples += 1;
        }
        for object in &example.objects {
            self.entry(&object.label).0 += 1;
        }
        for label in &example.labels {
            self.entry(label).1 += 1;
        }
    }

    /// Per-label counts in vocabulary order, then labels outside it.
    pub fn finish(mut self, classes: &ClassLabel) -> SplitStats {
        let mut labels: Vec<LabelCount> = classes
            .names()
            .iter()
            .map(|name| {
                let (objects, examples) = self.labels.remove(name).unwrap_or_default();
                LabelCount {
                    label: name.clone(),
                    objects,
                    examples,
                }
            })
            .collect();

        labels.extend(
            self.labels
                .into_iter()
                .map(|(label, (objects, examples))| LabelCount {
                    label,
                    objects,
                    examples,
                }),
        );

        SplitStats {
            split: self.split.to_string(),
            examples: self.examples,
            objects: self.objects,
            empty_examples: self.empty_examples,
            labels,
        }
    }

    fn entry(&mut self, label: &str) -> &mut (usize, usize) {
        self.labels.entry(label.to_string()).or_default()
    }
}
