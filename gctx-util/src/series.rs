/// Conventional similarity-score cutoff for picking strong connections.
pub const DEFAULT_SCORE_CUTOFF: f64 = 90.0;

/// A labelled 1-D numeric sequence sliced out of a score table.
/// Missing entries are dropped at construction, so every stored value
/// is a real number; label order follows the originating table.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSeries {
    labels: Vec<Box<str>>,
    values: Vec<f64>,
}

impl LabeledSeries {
    /// Build from `(label, value)` pairs, dropping NaN entries.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Box<str>, f64)>) -> Self {
        let (labels, values) = pairs
            .into_iter()
            .filter(|(_, x)| !x.is_nan())
            .unzip::<_, _, Vec<_>, Vec<_>>();
        Self { labels, values }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[Box<str>] {
        &self.labels
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.labels
            .iter()
            .position(|l| l.as_ref() == label)
            .map(|i| self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.labels
            .iter()
            .map(|l| l.as_ref())
            .zip(self.values.iter().copied())
    }

    /// Labels whose value is strictly greater than `cutoff`, in the
    /// series' original order. An empty result is not an error.
    pub fn labels_above(&self, cutoff: f64) -> Vec<Box<str>> {
        self.iter()
            .filter(|&(_, x)| x > cutoff)
            .map(|(l, _)| l.to_string().into_boxed_str())
            .collect()
    }
}
