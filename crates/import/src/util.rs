/// Insertion/deletion edit distance (no substitutions), computed from the
/// longest common subsequence with the two-row O(min(m,n)) space algorithm.
pub fn indel_distance(s1: &str, s2: &str) -> usize {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    let (m, n) = (a.len(), b.len());

    if m == 0 || n == 0 {
        return m + n;
    }

    // Keep the shorter string in the inner loop to minimise allocation.
    let (a, b, m, n) = if m >= n { (a, b, m, n) } else { (b, a, n, m) };

    let mut prev = vec![0usize; n + 1];
    let mut curr = vec![0usize; n + 1];

    for i in 1..=m {
        for j in 1..=n {
            curr[j] = if a[i - 1] == b[j - 1] {
                prev[j - 1] + 1
            } else {
                prev[j].max(curr[j - 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    let lcs = prev[n];
    m + n - 2 * lcs
}

/// Normalized similarity in `0.0..=1.0`: `1 - indel / (len(a) + len(b))`.
/// Two empty strings are identical.
pub fn similarity_ratio(s1: &str, s2: &str) -> f64 {
    let total = s1.chars().count() + s2.chars().count();
    if total == 0 {
        return 1.0;
    }
    (total - indel_distance(s1, s2)) as f64 / total as f64
}

/// Keep only ASCII digits.
pub fn digits(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

/// Last four characters of an all-digit string, when it has at least four.
pub fn last4(digits: &str) -> Option<&str> {
    (digits.len() >= 4).then(|| &digits[digits.len() - 4..])
}
