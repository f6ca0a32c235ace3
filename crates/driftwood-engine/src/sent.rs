use std::collections::BTreeSet;

/// Phone numbers already texted in this run, keyed by digits only so that
/// `(555) 123-4567` and `+15551234567` collide.
///
/// Passed into a run and handed back out so a caller running several
/// batches on one day can keep the one-text-per-number rule across them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentNumbers(BTreeSet<String>);

impl SentNumbers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, number: &str) -> bool {
        self.0.contains(&key(number))
    }

    /// Returns `false` if the number was already present.
    pub fn insert(&mut self, number: &str) -> bool {
        self.0.insert(key(number))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Last ten digits, so a leading country code does not matter.
fn key(number: &str) -> String {
    let digits: Vec<char> = number.chars().filter(char::is_ascii_digit).collect();
    let start = digits.len().saturating_sub(10);
    digits[start..].iter().collect()
}
