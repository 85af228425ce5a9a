//! Token Budget Calculation
//!
//! Users pick a response length in words; generators bound output in tokens.
//! Tokens-per-word depends on the tokenizer, so the budget is a band around
//! the word target rather than an exact count:
//!
//! - `max_new_tokens = round(words * 1.5)`
//! - `min_new_tokens = round(words * 0.5)`

use serde::{Deserialize, Serialize};

use crate::constants::budget::{MAX_TOKENS_PER_WORD, MIN_TOKENS_PER_WORD};

/// Lower and upper bound on generated tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBudget {
    pub min_new_tokens: u32,
    pub max_new_tokens: u32,
}

impl TokenBudget {
    /// Budget for a target word count. Any value is accepted and scaled.
    pub fn from_target_words(words: u32) -> Self {
        let words = f64::from(words);
        Self {
            min_new_tokens: (words * MIN_TOKENS_PER_WORD).round() as u32,
            max_new_tokens: (words * MAX_TOKENS_PER_WORD).round() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_length() {
        let budget = TokenBudget::from_target_words(90);
        assert_eq!(budget.max_new_tokens, 135);
        assert_eq!(budget.min_new_tokens, 45);
    }

    #[test]
    fn test_bounds_of_slider() {
        assert_eq!(
            TokenBudget::from_target_words(40),
            TokenBudget {
                min_new_tokens: 20,
                max_new_tokens: 60
            }
        );
        assert_eq!(
            TokenBudget::from_target_words(150),
            TokenBudget {
                min_new_tokens: 75,
                max_new_tokens: 225
            }
        );
    }

    #[test]
    fn test_odd_targets_round_half_up() {
        // 41 * 1.5 = 61.5, 41 * 0.5 = 20.5
        let budget = TokenBudget::from_target_words(41);
        assert_eq!(budget.max_new_tokens, 62);
        assert_eq!(budget.min_new_tokens, 21);
    }

    #[test]
    fn test_out_of_band_values_scale_too() {
        assert_eq!(TokenBudget::from_target_words(0).max_new_tokens, 0);
        assert_eq!(TokenBudget::from_target_words(1000).max_new_tokens, 1500);
    }

    proptest! {
        #[test]
        fn prop_min_never_exceeds_max(words in 0u32..100_000) {
            let budget = TokenBudget::from_target_words(words);
            prop_assert!(budget.min_new_tokens <= budget.max_new_tokens);
        }
    }
}
