//! Truncation strategies for token sequences
//!
//! Every strategy removes tokens only from the ends of a sequence, so the
//! surviving tokens keep their original order. Coin flips come from the
//! caller's generator; a `true` draw always means "the front end".
//!
//! [`trim_pair_boundary_safe`] additionally keeps the removed tokens in
//! left/right cut buffers so that a cut landing inside a word can be moved
//! to the nearest word boundary afterwards.

use crate::token::is_continuation;
use rand::Rng;
use std::collections::VecDeque;

/// Trim `tokens` to at most `max_len`, one token at a time from a random end
pub fn trim_one_sequence<T, R: Rng + ?Sized>(tokens: &mut Vec<T>, max_len: usize, rng: &mut R) {
    if tokens.len() <= max_len {
        return;
    }

    let mut start = 0;
    let mut end = tokens.len();
    while end - start > max_len {
        if rng.gen_bool(0.5) {
            start += 1;
        } else {
            end -= 1;
        }
    }

    tokens.truncate(end);
    tokens.drain(..start);
}

/// Trim `tokens` to at most `max_len` by dropping tokens from the back
pub fn trim_one_sequence_deterministic<T>(tokens: &mut Vec<T>, max_len: usize) {
    tokens.truncate(max_len);
}

/// Trim a pair of sequences until their combined length fits `max_total`
///
/// Each removal takes one token from a random end of the currently longer
/// sequence; ties go to `seq_a`.
///
/// # Panics
///
/// Panics if a removal is requested from an empty sequence.
pub fn trim_sequence_pair<T, R: Rng + ?Sized>(
    seq_a: &mut Vec<T>,
    seq_b: &mut Vec<T>,
    max_total: usize,
    rng: &mut R,
) {
    let mut a = 0..seq_a.len();
    let mut b = 0..seq_b.len();

    while a.len() + b.len() > max_total {
        let window = if a.len() >= b.len() { &mut a } else { &mut b };
        assert!(!window.is_empty(), "cannot truncate an empty sequence");

        if rng.gen_bool(0.5) {
            window.start += 1;
        } else {
            window.end -= 1;
        }
    }

    seq_a.truncate(a.end);
    seq_a.drain(..a.start);
    seq_b.truncate(b.end);
    seq_b.drain(..b.start);
}

/// Trim a pair of sequences without leaving a word split at a cut point
///
/// The coarse phase follows [`trim_sequence_pair`], except that removed
/// tokens are parked in per-sequence cut buffers. The fine phase then moves
/// each sequence's head and tail to a word boundary, either by pulling the
/// split word back in or by evicting its fragments. The result may be
/// slightly longer than `max_total` when fragments are pulled back.
pub fn trim_pair_boundary_safe<T, R>(
    seq_a: Vec<T>,
    seq_b: Vec<T>,
    max_total: usize,
    rng: &mut R,
) -> (Vec<T>, Vec<T>)
where
    T: AsRef<str>,
    R: Rng + ?Sized,
{
    let mut a = CutSequence::new(seq_a);
    let mut b = CutSequence::new(seq_b);

    while a.len() + b.len() > max_total {
        if a.len() >= b.len() {
            a.cut(rng);
        } else {
            b.cut(rng);
        }
    }

    a.adjust(rng);
    b.adjust(rng);

    (a.into_kept(), b.into_kept())
}

/// A sequence split into three zones: left cut, kept tokens, right cut
///
/// `left` is a stack whose top is the token immediately before `kept`;
/// `right` starts with the token immediately after `kept`.
#[derive(Debug)]
struct CutSequence<T> {
    left: Vec<T>,
    kept: VecDeque<T>,
    right: VecDeque<T>,
}

impl<T: AsRef<str>> CutSequence<T> {
    fn new(tokens: Vec<T>) -> Self {
        Self {
            left: Vec::new(),
            kept: tokens.into(),
            right: VecDeque::new(),
        }
    }

    fn len(&self) -> usize {
        self.kept.len()
    }

    /// Move one token from a random end of `kept` into its cut buffer
    fn cut<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        assert!(!self.kept.is_empty(), "cannot truncate an empty sequence");

        if rng.gen_bool(0.5) {
            if let Some(token) = self.kept.pop_front() {
                self.left.push(token);
            }
        } else if let Some(token) = self.kept.pop_back() {
            self.right.push_front(token);
        }
    }

    /// Move both cut points to word boundaries
    ///
    /// One draw decides the policy for the whole leading run and a second
    /// draw decides it for the whole trailing run.
    fn adjust<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let inclusive = rng.gen_bool(0.5);
        while self.kept.front().is_some_and(|t| is_continuation(t.as_ref())) {
            if inclusive {
                match self.left.pop() {
                    Some(previous) => self.kept.push_front(previous),
                    None => break,
                }
            } else if let Some(fragment) = self.kept.pop_front() {
                self.left.push(fragment);
            }
        }

        let inclusive = rng.gen_bool(0.5);
        while self.right.front().is_some_and(|t| is_continuation(t.as_ref())) {
            if inclusive {
                // With nothing kept the fragment would open the sequence.
                if self.kept.is_empty() {
                    break;
                }
                if let Some(fragment) = self.right.pop_front() {
                    self.kept.push_back(fragment);
                }
            } else {
                match self.kept.pop_back() {
                    Some(last) => self.right.push_front(last),
                    None => break,
                }
            }
        }
    }

    fn into_kept(self) -> Vec<T> {
        self.kept.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const HALF: u64 = 1 << 63;

    /// Every `gen_bool(0.5)` draw returns `true` (front / inclusive)
    fn always_true() -> StepRng {
        StepRng::new(0, 0)
    }

    /// Every `gen_bool(0.5)` draw returns `false` (back / exclusive)
    fn always_false() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_trim_one_sequence_noop_when_short() {
        let mut seq = tokens(&["a", "b"]);
        trim_one_sequence(&mut seq, 5, &mut always_true());
        assert_eq!(seq, tokens(&["a", "b"]));
    }

    #[test]
    fn test_trim_one_sequence_front() {
        let mut seq = tokens(&["a", "b", "c", "d"]);
        trim_one_sequence(&mut seq, 2, &mut always_true());
        assert_eq!(seq, tokens(&["c", "d"]));
    }

    #[test]
    fn test_trim_one_sequence_back() {
        let mut seq = tokens(&["a", "b", "c", "d"]);
        trim_one_sequence(&mut seq, 2, &mut always_false());
        assert_eq!(seq, tokens(&["a", "b"]));
    }

    #[test]
    fn test_trim_one_sequence_alternating() {
        // true, false, true, ...
        let mut rng = StepRng::new(0, HALF);
        let mut seq = tokens(&["a", "b", "c", "d", "e"]);
        trim_one_sequence(&mut seq, 2, &mut rng);
        assert_eq!(seq, tokens(&["c", "d"]));
    }

    #[test]
    fn test_trim_one_sequence_to_zero() {
        let mut seq = tokens(&["a", "b"]);
        trim_one_sequence(&mut seq, 0, &mut StdRng::seed_from_u64(7));
        assert!(seq.is_empty());
    }

    #[test]
    fn test_trim_one_sequence_keeps_contiguous_run() {
        let original: Vec<usize> = (0..100).collect();
        let mut rng = StdRng::seed_from_u64(42);
        for max_len in [0, 1, 10, 57, 99, 100] {
            let mut seq = original.clone();
            trim_one_sequence(&mut seq, max_len, &mut rng);
            assert_eq!(seq.len(), max_len);
            assert!(seq.windows(2).all(|w| w[1] == w[0] + 1));
        }
    }

    #[test]
    fn test_trim_one_sequence_deterministic_keeps_front() {
        let mut seq = tokens(&["a", "b", "c", "d"]);
        trim_one_sequence_deterministic(&mut seq, 3);
        assert_eq!(seq, tokens(&["a", "b", "c"]));

        trim_one_sequence_deterministic(&mut seq, 10);
        assert_eq!(seq.len(), 3);
    }

    #[test]
    fn test_trim_sequence_pair_trims_longer_first() {
        let mut a = tokens(&["a1", "a2"]);
        let mut b = tokens(&["b1", "b2", "b3", "b4", "b5"]);
        trim_sequence_pair(&mut a, &mut b, 5, &mut always_false());
        assert_eq!(a, tokens(&["a1", "a2"]));
        assert_eq!(b, tokens(&["b1", "b2", "b3"]));
    }

    #[test]
    fn test_trim_sequence_pair_ties_go_to_first() {
        let mut a = tokens(&["a1", "a2"]);
        let mut b = tokens(&["b1", "b2"]);
        trim_sequence_pair(&mut a, &mut b, 3, &mut always_false());
        assert_eq!(a, tokens(&["a1"]));
        assert_eq!(b, tokens(&["b1", "b2"]));
    }

    #[test]
    fn test_trim_sequence_pair_balances_lengths() {
        let mut a: Vec<u32> = (0..40).collect();
        let mut b: Vec<u32> = (0..10).collect();
        trim_sequence_pair(&mut a, &mut b, 20, &mut StdRng::seed_from_u64(3));
        assert_eq!(a.len() + b.len(), 20);
        assert_eq!(a.len(), 10);
        assert_eq!(b.len(), 10);
    }

    #[test]
    fn test_boundary_safe_without_fragments_matches_coarse_trim() {
        let a = tokens(&["def", "f", "(", ")", ":"]);
        let b = tokens(&["return", "1"]);
        // coarse: 3 back cuts on `a`; fine: one draw per pass, all back/exclusive
        let (a, b) = trim_pair_boundary_safe(a, b, 4, &mut always_false());
        assert_eq!(a, tokens(&["def", "f"]));
        assert_eq!(b, tokens(&["return", "1"]));
    }

    #[test]
    fn test_boundary_safe_pulls_word_back_at_tail() {
        let a = tokens(&["get", "##val", "##ue", "x"]);
        let b: Vec<String> = Vec::new();
        // three back cuts leave [get]; head pass exclusive, tail pass inclusive
        let mut rng = FixedDraws(vec![u64::MAX, u64::MAX, u64::MAX, u64::MAX, 0].into_iter());
        let (kept, _) = trim_pair_boundary_safe(a, b, 1, &mut rng);
        assert_eq!(kept, tokens(&["get", "##val", "##ue"]));
    }

    #[test]
    fn test_boundary_safe_evicts_split_word_at_tail() {
        let a = tokens(&["x", "get", "##val", "##ue"]);
        let b: Vec<String> = Vec::new();
        // coarse: one back cut leaves [x, get, ##val]; `##ue` follows the cut,
        // so exclusive eviction pushes back `##val` and `get`.
        let (kept, _) = trim_pair_boundary_safe(a, b, 3, &mut always_false());
        assert_eq!(kept, tokens(&["x"]));
    }

    #[test]
    fn test_boundary_safe_restores_word_at_head() {
        let a = tokens(&["get", "##val", "##ue", "x"]);
        let b: Vec<String> = Vec::new();
        // coarse: one front cut removes `get`; head draw true pulls it back
        let (kept, _) = trim_pair_boundary_safe(a, b, 3, &mut always_true());
        assert_eq!(kept, tokens(&["get", "##val", "##ue", "x"]));
    }

    #[test]
    fn test_boundary_safe_head_draw_is_once_per_pass() {
        // Draws alternate false, true, false, ... A per-token draw would
        // re-admit the evicted fragment; a per-pass draw evicts the whole run.
        let a = tokens(&["##ab", "##cd", "x"]);
        let b = tokens(&["y"]);
        let mut rng = StepRng::new(HALF, HALF);
        let (a, b) = trim_pair_boundary_safe(a, b, 10, &mut rng);
        assert_eq!(a, tokens(&["x"]));
        assert_eq!(b, tokens(&["y"]));
    }

    #[test]
    fn test_boundary_safe_emptied_sequence_does_not_reopen_with_fragment() {
        let a = tokens(&["w0", "##xb", "##xc"]);
        let b = tokens(&["w1000"]);
        // coarse: back cut then front cut leave [##xb]; the exclusive head
        // pass evicts it, and the inclusive tail pass must not pull `##xc`.
        let mut rng = FixedDraws(vec![u64::MAX, 0, u64::MAX, 0].into_iter());
        let (a, b) = trim_pair_boundary_safe(a, b, 2, &mut rng);
        assert!(a.is_empty());
        assert_eq!(b, tokens(&["w1000"]));
    }

    #[test]
    fn test_boundary_safe_never_starts_with_orphaned_fragment() {
        for seed in 0..2000 {
            let a = tokens(&["w0", "##xb", "##xc"]);
            let b = tokens(&["w1000"]);
            let (a, b) = trim_pair_boundary_safe(a, b, 2, &mut StdRng::seed_from_u64(seed));
            assert!(
                a.first().map_or(true, |t| !is_continuation(t)),
                "seed {seed} kept {a:?}"
            );
            assert_eq!(b, tokens(&["w1000"]));
        }
    }

    #[test]
    fn test_boundary_safe_leading_fragment_without_buffer_stays() {
        let a = tokens(&["##ab", "x"]);
        let b: Vec<String> = Vec::new();
        let (a, _) = trim_pair_boundary_safe(a, b, 10, &mut always_true());
        assert_eq!(a, tokens(&["##ab", "x"]));
    }

    /// Generator replaying a fixed list of raw draws, then zeros
    struct FixedDraws(std::vec::IntoIter<u64>);

    impl rand::RngCore for FixedDraws {
        fn next_u32(&mut self) -> u32 {
            self.next_u64() as u32
        }

        fn next_u64(&mut self) -> u64 {
            self.0.next().unwrap_or(0)
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for chunk in dest.chunks_mut(8) {
                let bytes = self.next_u64().to_le_bytes();
                chunk.copy_from_slice(&bytes[..chunk.len()]);
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }
}
