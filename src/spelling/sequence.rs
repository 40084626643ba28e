//! Sequence similarity in the Ratcliff/Obershelp style.
//!
//! The ratio is `2·M / T` where `M` is the number of characters in the
//! longest matching blocks found recursively and `T` the total length of
//! both strings. Comparisons work on Unicode scalar values, so accented
//! Spanish letters count as one character.

use ahash::AHashMap;

/// Sequences at least this long have their popular characters ignored when
/// seeding matches.
pub const AUTOJUNK_MIN_LEN: usize = 200;

/// Matcher with a fixed second sequence, reused against many first sequences.
#[derive(Debug, Clone)]
pub struct SequenceMatcher {
    b: Vec<char>,
    /// character -> ascending positions in `b`, popular characters removed
    b2j: AHashMap<char, Vec<usize>>,
    /// character counts of `b`, for the quick ratio
    b_counts: AHashMap<char, usize>,
}

impl SequenceMatcher {
    /// Prepare a matcher whose second sequence is `b`.
    pub fn new(b: &str) -> Self {
        let b: Vec<char> = b.chars().collect();

        let mut b2j: AHashMap<char, Vec<usize>> = AHashMap::new();
        for (j, ch) in b.iter().enumerate() {
            b2j.entry(*ch).or_default().push(j);
        }

        let mut b_counts = AHashMap::with_capacity(b2j.len());
        for (ch, positions) in &b2j {
            b_counts.insert(*ch, positions.len());
        }

        let n = b.len();
        if n >= AUTOJUNK_MIN_LEN {
            let ntest = n / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= ntest);
        }

        SequenceMatcher {
            b,
            b2j,
            b_counts,
        }
    }

    /// Upper bound on [`ratio`](Self::ratio) from the lengths alone.
    pub fn real_quick_ratio(&self, a: &str) -> f64 {
        let la = a.chars().count();
        let lb = self.b.len();
        calculate_ratio(la.min(lb), la + lb)
    }

    /// Upper bound on [`ratio`](Self::ratio) from the character multisets.
    pub fn quick_ratio(&self, a: &str) -> f64 {
        let mut available: AHashMap<char, isize> = AHashMap::new();
        let mut matches = 0;
        let mut la = 0;
        for ch in a.chars() {
            la += 1;
            let avail = available
                .entry(ch)
                .or_insert_with(|| self.b_counts.get(&ch).copied().unwrap_or(0) as isize);
            if *avail > 0 {
                matches += 1;
            }
            *avail -= 1;
        }
        calculate_ratio(matches, la + self.b.len())
    }

    /// Similarity of `a` against the fixed sequence, in `[0, 1]`.
    pub fn ratio(&self, a: &str) -> f64 {
        let a: Vec<char> = a.chars().collect();
        let matched: usize = self.matching_blocks(&a).iter().map(|m| m.2).sum();
        calculate_ratio(matched, a.len() + self.b.len())
    }

    /// Non-overlapping matching blocks `(i, j, size)` in increasing order.
    fn matching_blocks(&self, a: &[char]) -> Vec<(usize, usize, usize)> {
        let mut queue = vec![(0, a.len(), 0, self.b.len())];
        let mut blocks = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.find_longest_match(a, alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            blocks.push((i, j, k));
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }

        blocks.sort_unstable();

        // Collapse adjacent blocks
        let mut merged: Vec<(usize, usize, usize)> = Vec::with_capacity(blocks.len());
        for (i, j, k) in blocks {
            if let Some(last) = merged.last_mut()
                && last.0 + last.2 == i
                && last.1 + last.2 == j
            {
                last.2 += k;
                continue;
            }
            merged.push((i, j, k));
        }
        merged
    }

    /// Longest block of `a[alo..ahi]` matching `b[blo..bhi]`, earliest on ties.
    fn find_longest_match(
        &self,
        a: &[char],
        alo: usize,
        ahi: usize,
        blo: usize,
        bhi: usize,
    ) -> (usize, usize, usize) {
        let b = &self.b;
        let (mut besti, mut bestj, mut bestsize) = (alo, blo, 0);

        // j2len[j] = length of the match ending at a[i-1], b[j]
        let mut j2len: AHashMap<usize, usize> = AHashMap::new();
        for (i, ch) in a.iter().enumerate().take(ahi).skip(alo) {
            let mut next: AHashMap<usize, usize> = AHashMap::new();
            if let Some(positions) = self.b2j.get(ch) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j.checked_sub(1).and_then(|p| j2len.get(&p)).copied().unwrap_or(0) + 1;
                    next.insert(j, k);
                    if k > bestsize {
                        besti = i + 1 - k;
                        bestj = j + 1 - k;
                        bestsize = k;
                    }
                }
            }
            j2len = next;
        }

        // Popular characters were left out of b2j; grow the block through them
        while besti > alo && bestj > blo && a[besti - 1] == b[bestj - 1] {
            besti -= 1;
            bestj -= 1;
            bestsize += 1;
        }
        while besti + bestsize < ahi
            && bestj + bestsize < bhi
            && a[besti + bestsize] == b[bestj + bestsize]
        {
            bestsize += 1;
        }

        (besti, bestj, bestsize)
    }
}

fn calculate_ratio(matches: usize, length: usize) -> f64 {
    if length == 0 {
        return 1.0;
    }
    2.0 * matches as f64 / length as f64
}

/// Similarity ratio between two strings, `b` being the reference.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    SequenceMatcher::new(b).ratio(a)
}

/// The best `n` possibilities scoring at least `cutoff` against `word`.
///
/// Candidates go through the length bound, the multiset bound and the full
/// ratio in that order. Results are ordered by score, then by the
/// possibility itself, both descending.
pub fn get_close_matches<'a, I>(word: &str, possibilities: I, n: usize, cutoff: f64) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    scored_close_matches(word, possibilities, n, cutoff)
        .into_iter()
        .map(|(_, candidate)| candidate)
        .collect()
}

/// Like [`get_close_matches`], keeping the ratio of each match.
pub fn scored_close_matches<'a, I>(
    word: &str,
    possibilities: I,
    n: usize,
    cutoff: f64,
) -> Vec<(f64, String)>
where
    I: IntoIterator<Item = &'a str>,
{
    if n == 0 || !(0.0..=1.0).contains(&cutoff) {
        return Vec::new();
    }

    let matcher = SequenceMatcher::new(word);
    let mut scored: Vec<(f64, &str)> = possibilities
        .into_iter()
        .filter(|candidate| {
            matcher.real_quick_ratio(candidate) >= cutoff && matcher.quick_ratio(candidate) >= cutoff
        })
        .filter_map(|candidate| {
            let score = matcher.ratio(candidate);
            (score >= cutoff).then_some((score, candidate))
        })
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| b.1.cmp(a.1)));
    scored.truncate(n);
    scored
        .into_iter()
        .map(|(score, candidate)| (score, candidate.to_string()))
        .collect()
}
