//! Vote aggregation for the tree ensemble

/// Tallies class votes from the trees of a forest.
#[derive(Debug, Clone)]
pub struct VoteAggregator {
    counts: Vec<usize>,
    total: usize,
}

impl VoteAggregator {
    /// Create an aggregator for `n_classes` classes.
    pub fn new(n_classes: usize) -> Self {
        Self {
            counts: vec![0; n_classes],
            total: 0,
        }
    }

    /// Record one tree's vote. Votes outside the known classes grow the tally.
    pub fn vote(&mut self, class: usize) {
        if class >= self.counts.len() {
            self.counts.resize(class + 1, 0);
        }
        self.counts[class] += 1;
        self.total += 1;
    }

    pub fn total_votes(&self) -> usize {
        self.total
    }

    /// Class with the most votes. Ties go to the lowest class index.
    pub fn majority(&self) -> Option<usize> {
        if self.total == 0 {
            return None;
        }

        let mut best = 0;
        for (class, &count) in self.counts.iter().enumerate() {
            if count > self.counts[best] {
                best = class;
            }
        }
        Some(best)
    }

    /// Fraction of votes received by each class.
    pub fn proportions(&self) -> Vec<f64> {
        if self.total == 0 {
            return vec![0.0; self.counts.len()];
        }
        self.counts
            .iter()
            .map(|&c| c as f64 / self.total as f64)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_majority_vote() {
        let mut votes = VoteAggregator::new(3);
        for class in [2, 1, 2, 0, 2] {
            votes.vote(class);
        }

        assert_eq!(votes.majority(), Some(2));
        assert_eq!(votes.total_votes(), 5);
        let p = votes.proportions();
        assert!((p[2] - 0.6).abs() < 1e-9);
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_tie_goes_to_lowest_class() {
        let mut votes = VoteAggregator::new(3);
        for class in [2, 1, 1, 2] {
            votes.vote(class);
        }
        assert_eq!(votes.majority(), Some(1));
    }

    #[test]
    fn test_empty_tally() {
        let votes = VoteAggregator::new(3);
        assert_eq!(votes.majority(), None);
        assert_eq!(votes.proportions(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_unseen_class_extends_tally() {
        let mut votes = VoteAggregator::new(1);
        votes.vote(4);
        assert_eq!(votes.majority(), Some(4));
        assert_eq!(votes.proportions().len(), 5);
    }
}
