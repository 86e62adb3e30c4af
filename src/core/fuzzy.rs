//! Fuzzy matching for slash-command filtering.
//!
//! A query matches when its characters appear in order in the candidate.
//! Lower scores sort first: unbroken streaks and matches at word starts pull
//! the score down, skipped characters and late matches push it up. A query
//! like `gpt5` also tries its swapped form (`5gpt`) so model-style names
//! match with the digits on either side.

const STREAK_BONUS: f64 = -8.0;
const WORD_START_BONUS: f64 = -12.0;
const GAP_PENALTY: f64 = 2.5;
const POSITION_PENALTY: f64 = 0.05;
const SWAP_COST: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyMatch {
    pub matches: bool,
    pub score: f64,
}

pub fn fuzzy_match(query: &str, text: &str) -> FuzzyMatch {
    let query_lower = query.to_lowercase();
    let text_chars: Vec<char> = text.to_lowercase().chars().collect();

    if let Some(score) = score_subsequence(&query_lower, &text_chars) {
        return FuzzyMatch {
            matches: true,
            score,
        };
    }

    if let Some(swapped) = swapped_halves(&query_lower) {
        if let Some(score) = score_subsequence(&swapped, &text_chars) {
            return FuzzyMatch {
                matches: true,
                score: score + SWAP_COST,
            };
        }
    }

    FuzzyMatch {
        matches: false,
        score: 0.0,
    }
}

/// Score `query` as an in-order subsequence of `text`, greedily taking the
/// earliest hit for each pending character. `None` when it does not match.
fn score_subsequence(query: &str, text: &[char]) -> Option<f64> {
    let mut pending: Vec<char> = query.chars().rev().collect();
    if pending.is_empty() {
        return Some(0.0);
    }
    if pending.len() > text.len() {
        return None;
    }

    let mut score = 0.0f64;
    let mut streak = 0u32;
    let mut last_hit: Option<usize> = None;

    for (pos, ch) in text.iter().enumerate() {
        let Some(&want) = pending.last() else {
            break;
        };
        if *ch != want {
            continue;
        }
        pending.pop();

        let continues = match last_hit {
            Some(prev) => prev + 1 == pos,
            None => pos == 0,
        };
        if continues {
            streak += 1;
            score += STREAK_BONUS * f64::from(streak);
        } else {
            streak = 0;
            if let Some(prev) = last_hit {
                score += GAP_PENALTY * ((pos - prev - 1) as f64);
            }
        }

        if is_word_start(text, pos) {
            score += WORD_START_BONUS;
        }
        score += POSITION_PENALTY * pos as f64;

        last_hit = Some(pos);
    }

    pending.is_empty().then_some(score)
}

fn is_word_start(text: &[char], pos: usize) -> bool {
    if pos == 0 {
        return true;
    }
    let prev = text[pos - 1];
    prev.is_whitespace() || matches!(prev, '-' | '_' | '.' | '/' | ':')
}

/// For a query that is one run of lowercase letters and one run of digits
/// (in either order), return the two runs swapped. Anything else is `None`.
fn swapped_halves(query: &str) -> Option<String> {
    let first_is_digit = query.bytes().next()?.is_ascii_digit();
    let split = query
        .bytes()
        .position(|b| b.is_ascii_digit() != first_is_digit)?;
    let (head, tail) = query.split_at(split);

    let uniform = |part: &str, digits: bool| {
        part.bytes().all(|b| {
            if digits {
                b.is_ascii_digit()
            } else {
                b.is_ascii_lowercase()
            }
        })
    };
    if uniform(head, first_is_digit) && uniform(tail, !first_is_digit) {
        Some(format!("{tail}{head}"))
    } else {
        None
    }
}

/// Keep the items every whitespace-separated query token matches, best first.
pub fn fuzzy_filter<T, F, S>(items: &[T], query: &str, get_text: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> S,
    S: AsRef<str>,
{
    let tokens: Vec<&str> = query.split_whitespace().collect();
    if tokens.is_empty() {
        return items.to_vec();
    }

    let mut scored: Vec<(f64, &T)> = Vec::new();
    'items: for item in items {
        let text = get_text(item);
        let mut total = 0.0f64;
        for token in &tokens {
            let result = fuzzy_match(token, text.as_ref());
            if !result.matches {
                continue 'items;
            }
            total += result.score;
        }
        scored.push((total, item));
    }

    scored.sort_by(|a, b| a.0.total_cmp(&b.0));
    scored.into_iter().map(|(_, item)| item.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::{fuzzy_filter, fuzzy_match, swapped_halves};

    #[test]
    fn unbroken_streaks_score_better() {
        let direct = fuzzy_match("abc", "abc");
        let spaced = fuzzy_match("abc", "a_b_c");
        assert!(direct.matches);
        assert!(spaced.matches);
        assert!(direct.score < spaced.score);
    }

    #[test]
    fn swapped_halves_handles_both_orders() {
        assert_eq!(swapped_halves("ab12").as_deref(), Some("12ab"));
        assert_eq!(swapped_halves("12ab").as_deref(), Some("ab12"));
        assert_eq!(swapped_halves("abc"), None);
        assert_eq!(swapped_halves("a1b"), None);
    }

    #[test]
    fn swapped_query_still_matches() {
        assert!(fuzzy_match("ab12", "12ab").matches);
        assert!(fuzzy_match("12ab", "ab12").matches);
        assert!(!fuzzy_match("ab12", "xyz").matches);
    }

    #[test]
    fn swap_costs_more_than_a_direct_match() {
        let direct = fuzzy_match("12ab", "12ab");
        let swapped = fuzzy_match("ab12", "12ab");
        assert!(direct.score < swapped.score);
    }

    #[test]
    fn filter_requires_all_tokens() {
        let items = vec!["alpha beta", "alpha", "beta alpha"];
        let filtered = fuzzy_filter(&items, "alpha beta", |item| *item);
        assert_eq!(filtered, vec!["alpha beta", "beta alpha"]);
    }

    #[test]
    fn empty_query_keeps_everything() {
        let items = vec!["one", "two"];
        assert_eq!(fuzzy_filter(&items, "  ", |item| *item), items);
    }

    #[test]
    fn prefix_query_matches_commands() {
        let commands = vec!["help", "hello", "model"];
        let filtered = fuzzy_filter(&commands, "he", |item| *item);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.contains(&"help"));
        assert!(filtered.contains(&"hello"));
    }
}
