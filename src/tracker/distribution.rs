//! Label distributions attached to detections and tracks.

use std::collections::BTreeMap;

/// Mapping from label to a non-negative weight.
///
/// Labels form an open set: any string is accepted and missing labels read as
/// `0.0`. Entries iterate in label order so smoothing and ranking are
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelDistribution {
    weights: BTreeMap<String, f32>,
}

impl LabelDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize raw classifier scores with a numerically stable softmax.
    pub fn softmax<I, S>(raw_scores: I) -> Self
    where
        I: IntoIterator<Item = (S, f32)>,
        S: Into<String>,
    {
        let raw: Vec<(String, f32)> = raw_scores
            .into_iter()
            .map(|(label, score)| (label.into(), score))
            .collect();
        if raw.is_empty() {
            return Self::default();
        }

        let max = raw
            .iter()
            .map(|(_, score)| *score)
            .fold(f32::NEG_INFINITY, f32::max);
        let exps: Vec<(String, f32)> = raw
            .into_iter()
            .map(|(label, score)| (label, (score - max).exp()))
            .collect();
        let sum: f32 = exps.iter().map(|(_, e)| e).sum();

        exps.into_iter().map(|(label, e)| (label, e / sum)).collect()
    }

    /// Set the weight of `label`, returning the previous weight if any.
    pub fn insert(&mut self, label: impl Into<String>, weight: f32) -> Option<f32> {
        self.weights.insert(label.into(), weight)
    }

    /// Weight of `label`, `0.0` when absent.
    pub fn get(&self, label: &str) -> f32 {
        self.weights.get(label).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.weights.contains_key(label)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.weights.iter().map(|(label, w)| (label.as_str(), *w))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.weights.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Sum of all weights.
    pub fn total(&self) -> f32 {
        self.weights.values().sum()
    }

    /// Rescale so the weights sum to one.
    ///
    /// A distribution with no positive mass is returned unchanged.
    pub fn normalized(&self) -> Self {
        let total = self.total();
        if total <= 0.0 || !total.is_finite() {
            return self.clone();
        }
        self.iter().map(|(label, w)| (label, w / total)).collect()
    }

    /// Exponential moving average of `prior` and `incoming`.
    ///
    /// Every label present in either side gets
    /// `alpha * prior[k] + (1 - alpha) * incoming[k]`, so `alpha` is the weight
    /// kept on history. A convex combination of two distributions that each
    /// sum to one still sums to one.
    pub fn blend(prior: &Self, incoming: &Self, alpha: f32) -> Self {
        let mut weights = BTreeMap::new();
        for label in prior.labels().chain(incoming.labels()) {
            if weights.contains_key(label) {
                continue;
            }
            let smoothed = alpha * prior.get(label) + (1.0 - alpha) * incoming.get(label);
            weights.insert(label.to_owned(), smoothed);
        }
        Self { weights }
    }

    /// The `k` heaviest labels, heaviest first; equal weights order by label.
    pub fn top_k(&self, k: usize) -> Vec<(&str, f32)> {
        let mut ranked: Vec<(&str, f32)> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(k);
        ranked
    }

    /// The heaviest label, if any.
    pub fn dominant(&self) -> Option<(&str, f32)> {
        self.top_k(1).into_iter().next()
    }
}

impl<S: Into<String>> FromIterator<(S, f32)> for LabelDistribution {
    fn from_iter<I: IntoIterator<Item = (S, f32)>>(iter: I) -> Self {
        Self {
            weights: iter
                .into_iter()
                .map(|(label, w)| (label.into(), w))
                .collect(),
        }
    }
}

impl<S: Into<String>, const N: usize> From<[(S, f32); N]> for LabelDistribution {
    fn from(entries: [(S, f32); N]) -> Self {
        entries.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_label_reads_zero() {
        let dist = LabelDistribution::from([("happy", 1.0)]);
        assert_eq!(dist.get("happy"), 1.0);
        assert_eq!(dist.get("sad"), 0.0);
        assert!(!dist.contains("sad"));
    }

    #[test]
    fn test_blend_union_of_labels() {
        let prior = LabelDistribution::from([("happy", 1.0)]);
        let incoming = LabelDistribution::from([("happy", 0.0), ("sad", 1.0)]);

        let blended = LabelDistribution::blend(&prior, &incoming, 0.7);
        assert_eq!(blended.len(), 2);
        assert!((blended.get("happy") - 0.7).abs() < 1e-6);
        assert!((blended.get("sad") - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_blend_preserves_unit_mass() {
        let prior = LabelDistribution::from([("a", 0.2), ("b", 0.5), ("c", 0.3)]);
        let incoming = LabelDistribution::from([("b", 0.1), ("d", 0.9)]);

        for step in 0..=10 {
            let alpha = step as f32 / 10.0;
            let blended = LabelDistribution::blend(&prior, &incoming, alpha);
            assert!((blended.total() - 1.0).abs() < 1e-5, "alpha = {alpha}");
            assert!(blended.iter().all(|(_, w)| w >= 0.0));
        }
    }

    #[test]
    fn test_blend_extremes() {
        let prior = LabelDistribution::from([("a", 1.0)]);
        let incoming = LabelDistribution::from([("b", 1.0)]);

        let keep = LabelDistribution::blend(&prior, &incoming, 1.0);
        assert_eq!(keep.get("a"), 1.0);
        assert_eq!(keep.get("b"), 0.0);

        let replace = LabelDistribution::blend(&prior, &incoming, 0.0);
        assert_eq!(replace.get("a"), 0.0);
        assert_eq!(replace.get("b"), 1.0);
    }

    #[test]
    fn test_softmax() {
        let dist = LabelDistribution::softmax([("angry", 2.0), ("happy", 2.0), ("sad", 0.0)]);
        assert!((dist.total() - 1.0).abs() < 1e-6);
        assert!((dist.get("angry") - dist.get("happy")).abs() < 1e-6);
        assert!(dist.get("angry") > dist.get("sad"));

        let large = LabelDistribution::softmax([("x", 1000.0), ("y", 999.0)]);
        assert!(large.iter().all(|(_, w)| w.is_finite()));
    }

    #[test]
    fn test_softmax_empty() {
        let dist = LabelDistribution::softmax(Vec::<(String, f32)>::new());
        assert!(dist.is_empty());
    }

    #[test]
    fn test_normalized() {
        let dist = LabelDistribution::from([("a", 3.0), ("b", 1.0)]).normalized();
        assert!((dist.get("a") - 0.75).abs() < 1e-6);

        let zero = LabelDistribution::from([("a", 0.0)]);
        assert_eq!(zero.normalized(), zero);
    }

    #[test]
    fn test_top_k_and_dominant() {
        let dist = LabelDistribution::from([
            ("neutral", 0.2),
            ("happy", 0.5),
            ("sad", 0.2),
            ("fear", 0.1),
        ]);

        let top = dist.top_k(3);
        assert_eq!(top, vec![("happy", 0.5), ("neutral", 0.2), ("sad", 0.2)]);
        assert_eq!(dist.dominant(), Some(("happy", 0.5)));
        assert_eq!(LabelDistribution::new().dominant(), None);
    }
}
