//! Attendance components and the aggregation core.
//!
//! Everything in this module is pure: no I/O, no channel types. The
//! conversation layer feeds it entries and renders the resulting report.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Default pass/fail threshold in percent.
pub const DEFAULT_PASS_THRESHOLD: f64 = 85.0;

/// A gradable coursework category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Component {
    Lecture,
    Skilling,
    Practical,
    Tutorial,
}

impl Component {
    /// All components, in menu order.
    pub const ALL: [Self; 4] = [Self::Lecture, Self::Skilling, Self::Practical, Self::Tutorial];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lecture => "Lecture",
            Self::Skilling => "Skilling",
            Self::Practical => "Practical",
            Self::Tutorial => "Tutorial",
        }
    }

    /// Parse a component from its menu label. Exact match only.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Lecture" => Some(Self::Lecture),
            "Skilling" => Some(Self::Skilling),
            "Practical" => Some(Self::Practical),
            "Tutorial" => Some(Self::Tutorial),
            _ => None,
        }
    }

    /// Built-in weight used when the config does not override it.
    pub const fn default_weight(self) -> f64 {
        match self {
            Self::Lecture => 1.0,
            Self::Tutorial => 0.25,
            Self::Practical => 0.50,
            Self::Skilling => 0.25,
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How entered percentages are folded into a final percentage.
#[derive(Debug, Clone, PartialEq)]
pub enum WeightPolicy {
    /// Arithmetic mean of all entered percentages.
    Equal,
    /// Weight-scaled sum divided by the weight sum of the components
    /// actually entered. Components absent from the map weigh zero.
    Weighted(HashMap<Component, f64>),
}

impl WeightPolicy {
    /// The built-in per-component weights.
    pub fn default_weighted() -> Self {
        Self::Weighted(
            Component::ALL
                .iter()
                .map(|c| (*c, c.default_weight()))
                .collect(),
        )
    }

    fn weight_of(&self, component: Component) -> f64 {
        match self {
            Self::Equal => 1.0,
            Self::Weighted(weights) => weights.get(&component).copied().unwrap_or(0.0),
        }
    }
}

impl Default for WeightPolicy {
    fn default() -> Self {
        Self::default_weighted()
    }
}

/// Aggregation failures. Both are user-correctable: the conversation
/// reports them and returns to component selection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregateError {
    #[error("No attendance data provided.")]
    NoData,

    #[error("Invalid data, weights sum to zero.")]
    ZeroWeightSum,
}

/// Result of folding the entered percentages.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Per-component breakdown in menu order.
    pub breakdown: Vec<(Component, f64)>,
    /// Final percentage, before rounding.
    pub final_percentage: f64,
}

impl Report {
    pub fn passed(&self, threshold: f64) -> bool {
        self.final_percentage >= threshold
    }

    /// Render the report as a chat message: breakdown lines, final
    /// percentage to two decimals, and the pass/fail verdict.
    pub fn render(&self, threshold: f64) -> String {
        use std::fmt::Write;

        let mut out = String::from("📊 *Attendance Report*\n\n");
        for (component, percentage) in &self.breakdown {
            let _ = writeln!(out, "{component}: {percentage:.2}%");
        }
        let _ = write!(
            out,
            "\n📈 *Final Attendance: {:.2}%*\n",
            self.final_percentage
        );
        if self.passed(threshold) {
            let _ = write!(out, "✅ *Attendance is above {threshold}%!*");
        } else {
            let _ = write!(out, "❌ *Below {threshold}%! Attendance is low.*");
        }
        out
    }
}

/// Fold `entries` into a final percentage under the given policy.
pub fn aggregate(
    entries: &HashMap<Component, f64>,
    policy: &WeightPolicy,
) -> Result<Report, AggregateError> {
    if entries.is_empty() {
        return Err(AggregateError::NoData);
    }

    let mut weighted_sum = 0.0;
    let mut weight_sum = 0.0;
    let mut breakdown = Vec::with_capacity(entries.len());

    // Menu order keeps the breakdown stable regardless of entry order.
    for component in Component::ALL {
        let Some(&percentage) = entries.get(&component) else {
            continue;
        };
        let weight = policy.weight_of(component);
        weighted_sum += percentage * weight;
        weight_sum += weight;
        breakdown.push((component, percentage));
    }

    if weight_sum == 0.0 {
        return Err(AggregateError::ZeroWeightSum);
    }

    Ok(Report {
        breakdown,
        final_percentage: weighted_sum / weight_sum,
    })
}
