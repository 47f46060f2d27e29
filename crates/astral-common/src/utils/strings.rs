//! Edit distance and suggestion helpers.
//!
//! [`levenshtein_distance`] is shared between the Levenshtein similarity
//! plugin and the "did you mean X?" hints in error messages.

/// Computes the Levenshtein edit distance between two strings.
///
/// This is the minimum number of single-character edits (insertions,
/// deletions, or substitutions) required to change one string into the
/// other. Operates on Unicode scalar values, not bytes.
#[must_use]
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    // Two rows for space efficiency
    let mut prev = vec![0; n + 1];
    let mut curr = vec![0; n + 1];

    for (j, slot) in prev.iter_mut().enumerate() {
        *slot = j;
    }

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            curr[j] = (prev[j] + 1) // deletion
                .min(curr[j - 1] + 1) // insertion
                .min(prev[j - 1] + cost); // substitution
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Finds the most similar string from a list of candidates.
///
/// Returns the best match if one is close enough: at most 1 edit for very
/// short queries (<=3 chars), 2 for short (<=5), 3 otherwise. Comparison
/// is case-insensitive.
///
/// # Examples
///
/// ```
/// use astral_common::utils::strings::find_similar;
///
/// let candidates = ["identifier", "selected", "weight"];
/// assert_eq!(find_similar("identifer", &candidates), Some("identifier"));
/// assert_eq!(find_similar("xyz", &candidates), None);
/// ```
pub fn find_similar<'a, S: AsRef<str>>(query: &str, candidates: &'a [S]) -> Option<&'a str> {
    if candidates.is_empty() {
        return None;
    }

    let query_lower = query.to_lowercase();

    let mut best_match: Option<&str> = None;
    let mut best_distance = usize::MAX;

    for candidate in candidates {
        let candidate_str = candidate.as_ref();
        let candidate_lower = candidate_str.to_lowercase();

        if query_lower == candidate_lower {
            return Some(candidate_str);
        }

        let distance = levenshtein_distance(&query_lower, &candidate_lower);
        if distance < best_distance {
            best_distance = distance;
            best_match = Some(candidate_str);
        }
    }

    let max_distance = if query.len() <= 3 {
        1
    } else if query.len() <= 5 {
        2
    } else {
        3
    };

    if best_distance <= max_distance {
        best_match
    } else {
        None
    }
}

/// Formats a suggestion hint for error messages.
#[must_use]
pub fn format_suggestion(suggestion: &str) -> String {
    format!("Did you mean '{suggestion}'?")
}
