use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::features::{FeatureVector, FEATURE_LEN};

/// Labeled training samples grouped by digit, one entry per rendered font.
///
/// An explicit context object: independent trainers can each own their own
/// set without interfering.
#[derive(Debug, Clone, Default)]
pub struct SampleSet {
    samples: BTreeMap<u8, Vec<FeatureVector>>,
}

impl SampleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one sample for `digit`. The feature vector must be full-size.
    pub fn insert(&mut self, digit: u8, features: FeatureVector) -> Result<()> {
        if digit > 9 {
            Err(Error::InvalidDigit(digit))?;
        }
        if features.len() != FEATURE_LEN {
            Err(Error::DimensionMismatch {
                expected: FEATURE_LEN,
                actual: features.len(),
            })?;
        }

        self.samples.entry(digit).or_default().push(features);
        Ok(())
    }

    /// All samples in digit order, each paired with its label.
    pub fn samples(&self) -> impl Iterator<Item = (u8, &FeatureVector)> {
        self.samples
            .iter()
            .flat_map(|(digit, list)| list.iter().map(|features| (*digit, features)))
    }

    pub fn for_digit(&self, digit: u8) -> &[FeatureVector] {
        self.samples.get(&digit).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn digits(&self) -> impl Iterator<Item = u8> + '_ {
        self.samples.keys().copied()
    }

    pub fn sample_count(&self) -> usize {
        self.samples.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_validates_digit_and_length() {
        let mut set = SampleSet::new();

        assert!(matches!(
            set.insert(10, vec![0.0; FEATURE_LEN]).unwrap_err(),
            Error::InvalidDigit(10)
        ));
        assert!(matches!(
            set.insert(3, vec![0.0; 5]).unwrap_err(),
            Error::DimensionMismatch { expected: 196, .. }
        ));
        assert!(set.is_empty());

        set.insert(3, vec![0.0; FEATURE_LEN]).unwrap();
        assert_eq!(set.sample_count(), 1);
    }

    #[test]
    fn test_samples_iterate_in_digit_order() {
        let mut set = SampleSet::new();
        set.insert(7, vec![0.7; FEATURE_LEN]).unwrap();
        set.insert(2, vec![0.2; FEATURE_LEN]).unwrap();
        set.insert(2, vec![0.25; FEATURE_LEN]).unwrap();

        let labels: Vec<u8> = set.samples().map(|(digit, _)| digit).collect();
        assert_eq!(labels, vec![2, 2, 7]);
        assert_eq!(set.for_digit(2).len(), 2);
        assert_eq!(set.for_digit(5).len(), 0);
    }
}
