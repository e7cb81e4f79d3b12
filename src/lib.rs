//! Suffix array and Burrows-Wheeler transform construction using the
//! two-stage divsufsort algorithm:
//! [Yuta Mori's libdivsufsort](https://github.com/y-256/libdivsufsort).
//!
//! The sorter classifies suffixes into types A, B and B*, fully sorts the
//! B* suffixes (a substring sort over two-byte buckets followed by a
//! rank-doubling tandem-repeat sort), and induces the positions of every
//! remaining suffix from them in two linear sweeps. It runs in `O(n log n)`
//! time and linear auxiliary space, on an `i32` working array supplied by
//! the caller.
//!
//! # Examples
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let sa = divbwt::suffix_array(b"banana")?;
//! assert_eq!(sa, vec![5, 3, 1, 0, 4, 2]);
//!
//! let (bwt, primary_index) = divbwt::bwt(b"banana")?;
//! assert_eq!(bwt, b"nnbaaa");
//! assert_eq!(primary_index, 3);
//!
//! let decoded = divbwt::decode_bwt(&bwt, primary_index)?;
//! assert_eq!(decoded, b"banana");
//! # Ok(())
//! # }
//! ```

use anyhow::{anyhow, Result};

use crate::stack::Stack;

mod sssort;
mod stack;
mod tables;
mod trsort;

const BUCKET_A_SIZE: usize = 256;
const BUCKET_B_SIZE: usize = 65536;

const SS_MISORT_STACKSIZE: usize = 16;
const SS_SMERGE_STACKSIZE: usize = 32;
const TR_STACKSIZE: usize = 8192;

/// The inverse transform packs occurrence counts and byte values into one
/// `u32` per position, which caps the block length it can handle.
const MAX_DECODE_LENGTH: usize = 1 << 24;

/// Reusable suffix-sorting engine.
///
/// Owns the widened text buffer, the two bucket-count arrays and the three
/// explicit recursion stacks, so that repeated calls on one instance avoid
/// reallocation. All mutable state is re-initialized at the start of every
/// call; an engine used for one input can be reused for any other.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use divbwt::DivSufSort;
///
/// let text = b"mississippi";
/// let mut sa = vec![0i32; text.len()];
/// let mut engine = DivSufSort::new();
/// engine.compute_suffix_array(text, &mut sa)?;
/// assert_eq!(sa, vec![10, 7, 4, 1, 0, 9, 8, 6, 3, 5, 2]);
/// # Ok(())
/// # }
/// ```
pub struct DivSufSort {
    buffer: Vec<u16>,
    bucket_a: Vec<i32>,
    bucket_b: Vec<i32>,
    ss_stack: Stack,
    merge_stack: Stack,
    tr_stack: Stack,
}

impl Default for DivSufSort {
    fn default() -> Self {
        Self::new()
    }
}

impl DivSufSort {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            bucket_a: vec![0; BUCKET_A_SIZE],
            bucket_b: vec![0; BUCKET_B_SIZE],
            ss_stack: Stack::new(SS_MISORT_STACKSIZE),
            merge_stack: Stack::new(SS_SMERGE_STACKSIZE),
            tr_stack: Stack::new(TR_STACKSIZE),
        }
    }

    /// Computes the suffix array of `input` into `sa[0..input.len())`.
    ///
    /// # Arguments
    ///
    /// * `input` - The text whose suffixes are sorted.
    /// * `sa` - The output array, which also serves as working space. Only
    ///   the first `input.len()` entries are touched.
    ///
    /// # Errors
    ///
    /// An error is returned if `input` is empty, if its length does not fit
    /// a signed 32-bit index, or if `sa` is shorter than `input`.
    pub fn compute_suffix_array(&mut self, input: &[u8], sa: &mut [i32]) -> Result<()> {
        check_buffers(input, sa)?;
        let n = input.len();

        if n == 1 {
            sa[0] = 0;
            return Ok(());
        }

        self.reset();
        self.load(input);

        let mut sorter = Sorter {
            text: &self.buffer,
            sa: &mut sa[..n],
            ss_stack: &mut self.ss_stack,
            merge_stack: &mut self.merge_stack,
            tr_stack: &mut self.tr_stack,
        };

        let m = sorter.sort_type_bstar(&mut self.bucket_a, &mut self.bucket_b, n as i32);
        sorter.construct_suffix_array(&mut self.bucket_a, &mut self.bucket_b, n as i32, m);
        Ok(())
    }

    /// Computes the Burrows-Wheeler transform of `input` into
    /// `sa[0..input.len())` and returns the primary index.
    ///
    /// Each entry of `sa` holds the byte preceding the corresponding sorted
    /// suffix, as a widened integer. The entry at the returned primary
    /// index is the one exception: the row of the original string carries
    /// the last input byte, which the caller supplies when materializing
    /// the transform (see [`bwt`]).
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::compute_suffix_array`].
    pub fn compute_bwt(&mut self, input: &[u8], sa: &mut [i32]) -> Result<usize> {
        check_buffers(input, sa)?;
        let n = input.len();

        if n == 1 {
            sa[0] = i32::from(input[0]);
            return Ok(0);
        }

        self.reset();
        self.load(input);

        let mut sorter = Sorter {
            text: &self.buffer,
            sa: &mut sa[..n],
            ss_stack: &mut self.ss_stack,
            merge_stack: &mut self.merge_stack,
            tr_stack: &mut self.tr_stack,
        };

        let m = sorter.sort_type_bstar(&mut self.bucket_a, &mut self.bucket_b, n as i32);
        let pidx = sorter.construct_bwt(&mut self.bucket_a, &mut self.bucket_b, n as i32, m);

        if pidx < 0 {
            return Err(anyhow!("internal error: no primary index was produced."));
        }

        Ok(pidx as usize)
    }

    fn reset(&mut self) {
        self.ss_stack.clear();
        self.merge_stack.clear();
        self.tr_stack.clear();
        self.bucket_a.fill(0);
        self.bucket_b.fill(0);
    }

    /// Widens the input to 16 bits. The buffer is rebuilt from scratch so
    /// that it covers exactly the current input, never stale data from a
    /// longer previous run.
    fn load(&mut self, input: &[u8]) {
        self.buffer.clear();
        self.buffer.extend(input.iter().map(|&b| u16::from(b)));
    }
}

fn check_buffers(input: &[u8], sa: &[i32]) -> Result<()> {
    if input.is_empty() {
        return Err(anyhow!("input must not be empty."));
    }

    if input.len() > i32::MAX as usize {
        return Err(anyhow!(
            "input length {} does not fit a signed 32-bit index.",
            input.len()
        ));
    }

    if sa.len() < input.len() {
        return Err(anyhow!(
            "suffix array buffer is too small: need {}, got {}.",
            input.len(),
            sa.len()
        ));
    }

    Ok(())
}

/// One sorting run over a borrowed text and working array.
///
/// The working array is overloaded across phases: suffix positions, bucket
/// slot indices, ranks and negative run lengths all live in the same `i32`
/// entries, with the bitwise complement acting as an involutive tag.
pub(crate) struct Sorter<'a> {
    pub(crate) text: &'a [u16],
    pub(crate) sa: &'a mut [i32],
    pub(crate) ss_stack: &'a mut Stack,
    pub(crate) merge_stack: &'a mut Stack,
    pub(crate) tr_stack: &'a mut Stack,
}

impl Sorter<'_> {
    #[inline]
    pub(crate) fn ch(&self, i: i32) -> i32 {
        i32::from(self.text[i as usize])
    }

    #[inline]
    pub(crate) fn get(&self, i: i32) -> i32 {
        self.sa[i as usize]
    }

    #[inline]
    pub(crate) fn set(&mut self, i: i32, v: i32) {
        self.sa[i as usize] = v;
    }

    #[inline]
    pub(crate) fn swap(&mut self, a: i32, b: i32) {
        self.sa.swap(a as usize, b as usize);
    }

    /// Sorts all type-B* suffixes and leaves them, in final lexicographic
    /// order, at the head of every two-byte bucket. Returns the number of
    /// B* suffixes.
    fn sort_type_bstar(&mut self, bucket_a: &mut [i32], bucket_b: &mut [i32], n: i32) -> i32 {
        let mut m = n;
        let mut c0 = self.ch(n - 1);

        // Walk the text right to left, alternating between A-runs and
        // B-runs; ties inherit the type of the run in progress. Count the
        // first one or two bytes of every suffix and stash each B* position
        // in the tail of sa.
        let mut i = n - 1;

        while i >= 0 {
            let mut c1;

            loop {
                c1 = c0;
                bucket_a[c1 as usize] += 1;
                i -= 1;

                if i < 0 {
                    break;
                }

                c0 = self.ch(i);

                if c0 < c1 {
                    break;
                }
            }

            if i < 0 {
                break;
            }

            bucket_b[((c0 << 8) + c1) as usize] += 1;
            m -= 1;
            self.set(m, i);
            i -= 1;
            c1 = c0;

            while i >= 0 {
                c0 = self.ch(i);

                if c0 > c1 {
                    break;
                }

                bucket_b[((c1 << 8) + c0) as usize] += 1;
                c1 = c0;
                i -= 1;
            }
        }

        m = n - m;

        // A type B* suffix is lexicographically smaller than a type B
        // suffix beginning with the same two bytes. Convert the counts into
        // bucket start/end boundaries.
        let mut i: i32 = 0;
        let mut j: i32 = 0;

        for c0 in 0..256i32 {
            let t = i + bucket_a[c0 as usize];
            bucket_a[c0 as usize] = i + j; // start point
            let idx = c0 << 8;
            i = t + bucket_b[(idx + c0) as usize];

            for c1 in (c0 + 1)..256 {
                j += bucket_b[(idx + c1) as usize];
                bucket_b[(idx + c1) as usize] = j; // end point
                i += bucket_b[((c1 << 8) + c0) as usize];
            }
        }

        if m > 0 {
            // Scatter the B* indices into their two-byte buckets.
            let pab = n - m;
            let mut i = m - 2;

            while i >= 0 {
                let t = self.get(pab + i);
                let idx = (self.ch(t) << 8) + self.ch(t + 1);
                bucket_b[idx as usize] -= 1;
                let slot = bucket_b[idx as usize];
                self.set(slot, i);
                i -= 1;
            }

            let t = self.get(pab + m - 1);
            let mut c0 = (self.ch(t) << 8) + self.ch(t + 1);
            bucket_b[c0 as usize] -= 1;
            let slot = bucket_b[c0 as usize];
            self.set(slot, m - 1);

            // Sort the contents of each bucket by substring.
            let buf_size = n - m - m;
            c0 = 254;
            let mut j = m;

            while j > 0 {
                let idx = c0 << 8;
                let mut c1 = 255;

                while c1 > c0 {
                    let i = bucket_b[(idx + c1) as usize];

                    if j > i + 1 {
                        let last_suffix = self.get(i) == m - 1;
                        self.ss_sort(pab, i, j, m, buf_size, 2, n, last_suffix);
                    }

                    j = i;
                    c1 -= 1;
                }

                c0 -= 1;
            }

            // Build the rank array of the B* substrings in sa[m..2m),
            // encoding fully sorted stretches as negative run lengths.
            let mut i = m - 1;

            while i >= 0 {
                if self.get(i) >= 0 {
                    let j = i;

                    loop {
                        let v = self.get(i);
                        self.set(m + v, i);
                        i -= 1;

                        if !(i >= 0 && self.get(i) >= 0) {
                            break;
                        }
                    }

                    self.set(i + 1, i - j);

                    if i <= 0 {
                        break;
                    }
                }

                let j = i;

                loop {
                    let v = !self.get(i);
                    self.set(i, v);
                    self.set(m + v, j);
                    i -= 1;

                    if self.get(i) >= 0 {
                        break;
                    }
                }

                let v = self.get(i);
                self.set(m + v, j);
                i -= 1;
            }

            // Resolve the remaining ties by doubling context depth.
            self.tr_sort(m, 1);

            // Read the final B* order back off the rank array, walking the
            // text right to left once more.
            let mut c0 = self.ch(n - 1);
            let mut i = n - 1;
            let mut j = m;

            while i >= 0 {
                i -= 1;
                let mut c1 = c0;

                loop {
                    if i < 0 {
                        break;
                    }

                    c0 = self.ch(i);

                    if c0 < c1 {
                        break;
                    }

                    c1 = c0;
                    i -= 1;
                }

                if i >= 0 {
                    let tt = i;
                    i -= 1;
                    let mut c1 = c0;

                    loop {
                        if i < 0 {
                            break;
                        }

                        c0 = self.ch(i);

                        if c0 > c1 {
                            break;
                        }

                        c1 = c0;
                        i -= 1;
                    }

                    j -= 1;
                    let slot = self.get(m + j);
                    let v = if tt == 0 || tt - i > 1 { tt } else { !tt };
                    self.set(slot, v);
                }
            }

            // Lay out the final bucket boundaries and move the sorted B*
            // suffixes to their destination slots.
            bucket_b[65535] = n; // end
            let mut k = m - 1;
            let mut c0 = 254;

            while c0 >= 0 {
                let mut i = bucket_a[(c0 + 1) as usize] - 1;
                let idx = c0 << 8;
                let mut c1 = 255;

                while c1 > c0 {
                    let tt = i - bucket_b[((c1 << 8) + c0) as usize];
                    bucket_b[((c1 << 8) + c0) as usize] = i; // end point
                    i = tt;

                    // Typically a very small number of moves.
                    let j = bucket_b[(idx + c1) as usize];

                    while j <= k {
                        let v = self.get(k);
                        self.set(i, v);
                        i -= 1;
                        k -= 1;
                    }

                    c1 -= 1;
                }

                bucket_b[(idx + c0 + 1) as usize] = i - bucket_b[(idx + c0) as usize] + 1; // start point
                bucket_b[(idx + c0) as usize] = i; // end point
                c0 -= 1;
            }
        }

        m
    }

    /// Induces the order of all type-B then type-A suffixes from the sorted
    /// B* set: one right-to-left sweep over the B buckets, then one
    /// left-to-right sweep that places the A suffixes and clears the tags.
    fn construct_suffix_array(&mut self, bucket_a: &mut [i32], bucket_b: &mut [i32], n: i32, m: i32) {
        if m > 0 {
            let mut c1 = 254;

            while c1 >= 0 {
                let idx = c1 << 8;
                let i = bucket_b[(idx + c1 + 1) as usize];
                let mut k = 0;
                let mut c2 = -1;
                let mut j = bucket_a[(c1 + 1) as usize] - 1;

                while j >= i {
                    let mut s = self.get(j);
                    self.set(j, !s);

                    if s > 0 {
                        s -= 1;
                        let c0 = self.ch(s);

                        if s > 0 && self.ch(s - 1) > c0 {
                            s = !s;
                        }

                        if c0 != c2 {
                            if c2 >= 0 {
                                bucket_b[(idx + c2) as usize] = k;
                            }

                            c2 = c0;
                            k = bucket_b[(idx + c2) as usize];
                        }

                        self.set(k, s);
                        k -= 1;
                    }

                    j -= 1;
                }

                c1 -= 1;
            }
        }

        let mut c2 = self.ch(n - 1);
        let mut k = bucket_a[c2 as usize];
        let v = if self.ch(n - 2) < c2 { !(n - 1) } else { n - 1 };
        self.set(k, v);
        k += 1;

        // Scan the suffix array from left to right.
        let mut i = 0;

        while i < n {
            let mut s = self.get(i);

            if s <= 0 {
                self.set(i, !s);
            } else {
                s -= 1;
                let c0 = self.ch(s);

                if s == 0 || self.ch(s - 1) < c0 {
                    s = !s;
                }

                if c0 != c2 {
                    bucket_a[c2 as usize] = k;
                    c2 = c0;
                    k = bucket_a[c2 as usize];
                }

                self.set(k, s);
                k += 1;
            }

            i += 1;
        }
    }

    /// BWT variant of the induction: as each suffix is placed, the byte
    /// preceding it is recorded in the slot it vacated. Returns the primary
    /// index, the row at which the un-rotated input appears.
    fn construct_bwt(&mut self, bucket_a: &mut [i32], bucket_b: &mut [i32], n: i32, m: i32) -> i32 {
        let mut pidx = -1;

        if m > 0 {
            let mut c1 = 254;

            while c1 >= 0 {
                let idx = c1 << 8;
                let i = bucket_b[(idx + c1 + 1) as usize];
                let mut k = 0;
                let mut c2 = -1;
                let mut j = bucket_a[(c1 + 1) as usize] - 1;

                while j >= i {
                    let mut s = self.get(j);

                    if s <= 0 {
                        if s != 0 {
                            self.set(j, !s);
                        }
                    } else {
                        s -= 1;
                        let c0 = self.ch(s);
                        self.set(j, !c0);

                        if s > 0 && self.ch(s - 1) > c0 {
                            s = !s;
                        }

                        if c0 != c2 {
                            if c2 >= 0 {
                                bucket_b[(idx + c2) as usize] = k;
                            }

                            c2 = c0;
                            k = bucket_b[(idx + c2) as usize];
                        }

                        self.set(k, s);
                        k -= 1;
                    }

                    j -= 1;
                }

                c1 -= 1;
            }
        }

        let mut c2 = self.ch(n - 1);
        let mut k = bucket_a[c2 as usize];
        let v = if self.ch(n - 2) < c2 {
            !self.ch(n - 2)
        } else {
            n - 1
        };
        self.set(k, v);
        k += 1;

        // Scan the suffix array from left to right.
        let mut i = 0;

        while i < n {
            let mut s = self.get(i);

            if s <= 0 {
                if s != 0 {
                    self.set(i, !s);
                } else {
                    pidx = i;
                }
            } else {
                s -= 1;
                let c0 = self.ch(s);
                self.set(i, c0);

                if s > 0 && self.ch(s - 1) < c0 {
                    s = !self.ch(s - 1);
                }

                if c0 != c2 {
                    bucket_a[c2 as usize] = k;
                    c2 = c0;
                    k = bucket_a[c2 as usize];
                }

                self.set(k, s);
                k += 1;
            }

            i += 1;
        }

        pidx
    }
}

/// Computes the suffix array of `text`.
///
/// # Errors
///
/// An error is returned if `text` is empty or longer than `i32::MAX`.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let sa = divbwt::suffix_array(b"abracadabra")?;
/// assert_eq!(sa, vec![10, 7, 0, 3, 5, 8, 1, 4, 6, 9, 2]);
/// # Ok(())
/// # }
/// ```
pub fn suffix_array(text: &[u8]) -> Result<Vec<i32>> {
    let mut sa = vec![0i32; text.len()];
    DivSufSort::new().compute_suffix_array(text, &mut sa)?;
    Ok(sa)
}

/// Computes the Burrows-Wheeler transform of `text`, returning the
/// transformed bytes and the primary index.
///
/// # Errors
///
/// An error is returned if `text` is empty or longer than `i32::MAX`.
pub fn bwt(text: &[u8]) -> Result<(Vec<u8>, usize)> {
    let mut sa = vec![0i32; text.len()];
    let pidx = DivSufSort::new().compute_bwt(text, &mut sa)?;

    let out = sa
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            if i == pidx {
                text[text.len() - 1]
            } else {
                v as u8
            }
        })
        .collect();

    Ok((out, pidx))
}

/// Inverts a Burrows-Wheeler transform produced by [`bwt`].
///
/// Builds, for every position, a packed pair of the byte value and its
/// occurrence count, then follows the inverse permutation backwards from
/// the primary row, emitting the text right to left.
///
/// # Errors
///
/// An error is returned if `bwt` is empty, if `primary_index` is out of
/// range, or if the input is 2^24 bytes or longer (the packed layout holds
/// the occurrence count in the upper 24 bits).
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let (bwt, primary_index) = divbwt::bwt(b"mississippi")?;
/// assert_eq!(divbwt::decode_bwt(&bwt, primary_index)?, b"mississippi");
/// # Ok(())
/// # }
/// ```
pub fn decode_bwt(bwt: &[u8], primary_index: usize) -> Result<Vec<u8>> {
    let n = bwt.len();

    if n == 0 {
        return Err(anyhow!("bwt must not be empty."));
    }

    if primary_index >= n {
        return Err(anyhow!(
            "primary index {primary_index} is out of range for a bwt of length {n}."
        ));
    }

    if n >= MAX_DECODE_LENGTH {
        return Err(anyhow!(
            "bwt of length {n} exceeds the {MAX_DECODE_LENGTH} byte limit of the inverse transform."
        ));
    }

    if n == 1 {
        return Ok(vec![bwt[0]]);
    }

    let mut buckets = [0u32; 256];
    let mut data = vec![0u32; n];

    // Pack each byte with its occurrence count. The primary row is seeded
    // first so the walk below can start from it.
    let val0 = bwt[primary_index];
    data[primary_index] = u32::from(val0);
    buckets[val0 as usize] += 1;

    for i in 0..primary_index {
        let val = bwt[i];
        data[i] = (buckets[val as usize] << 8) | u32::from(val);
        buckets[val as usize] += 1;
    }

    for i in primary_index + 1..n {
        let val = bwt[i];
        data[i] = (buckets[val as usize] << 8) | u32::from(val);
        buckets[val as usize] += 1;
    }

    // Cumulative histogram.
    let mut sum = 0u32;

    for b in buckets.iter_mut() {
        let tmp = *b;
        *b = sum;
        sum += tmp;
    }

    // Follow the inverse permutation, emitting the text right to left.
    let mut out = vec![0u8; n];
    let mut ptr = data[primary_index];
    out[n - 1] = ptr as u8;

    for slot in out[..n - 1].iter_mut().rev() {
        ptr = data[((ptr >> 8) + buckets[(ptr & 0xFF) as usize]) as usize];
        *slot = ptr as u8;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn naive_suffix_array(text: &[u8]) -> Vec<i32> {
        let mut sa: Vec<i32> = (0..text.len() as i32).collect();
        sa.sort_by(|&a, &b| text[a as usize..].cmp(&text[b as usize..]));
        sa
    }

    fn assert_is_suffix_array(text: &[u8], sa: &[i32]) {
        let n = text.len();
        assert_eq!(sa.len(), n);

        let mut seen = vec![false; n];

        for &p in sa {
            assert!((0..n as i32).contains(&p), "entry {p} out of range");
            assert!(!seen[p as usize], "entry {p} duplicated");
            seen[p as usize] = true;
        }

        for w in sa.windows(2) {
            assert!(
                text[w[0] as usize..] < text[w[1] as usize..],
                "suffixes {} and {} out of order",
                w[0],
                w[1]
            );
        }
    }

    #[test]
    fn test_banana_suffix_array() {
        let sa = suffix_array(b"banana").unwrap();
        assert_eq!(sa, vec![5, 3, 1, 0, 4, 2]);
    }

    #[test]
    fn test_banana_bwt() {
        let (bwt, pidx) = bwt(b"banana").unwrap();
        assert_eq!(bwt, b"nnbaaa");
        assert_eq!(pidx, 3);
    }

    #[test]
    fn test_mississippi_suffix_array() {
        let sa = suffix_array(b"mississippi").unwrap();
        assert_eq!(sa, vec![10, 7, 4, 1, 0, 9, 8, 6, 3, 5, 2]);
    }

    #[test]
    fn test_mississippi_bwt() {
        let (bwt, pidx) = bwt(b"mississippi").unwrap();
        assert_eq!(bwt, b"pssmipissii");
        assert_eq!(pidx, 4);
    }

    #[test]
    fn test_abracadabra_suffix_array() {
        let sa = suffix_array(b"abracadabra").unwrap();
        assert_eq!(sa, vec![10, 7, 0, 3, 5, 8, 1, 4, 6, 9, 2]);
    }

    #[test]
    fn test_two_bytes() {
        assert_eq!(suffix_array(b"ab").unwrap(), vec![0, 1]);
        assert_eq!(suffix_array(b"ba").unwrap(), vec![1, 0]);
        assert_eq!(suffix_array(b"aa").unwrap(), vec![1, 0]);
    }

    #[test]
    fn test_single_byte() {
        assert_eq!(suffix_array(b"x").unwrap(), vec![0]);

        let (bwt, pidx) = bwt(b"x").unwrap();
        assert_eq!(bwt, b"x");
        assert_eq!(pidx, 0);
        assert_eq!(decode_bwt(&bwt, pidx).unwrap(), b"x");
    }

    #[test]
    fn test_zeros_256() {
        let text = vec![0u8; 256];
        let sa = suffix_array(&text).unwrap();
        let expected: Vec<i32> = (0..256).rev().collect();
        assert_eq!(sa, expected);

        let (bwt_out, pidx) = bwt(&text).unwrap();
        assert!(bwt_out.iter().all(|&b| b == 0));
        assert_eq!(sa[pidx], 0);
        assert_eq!(decode_bwt(&bwt_out, pidx).unwrap(), text);
    }

    #[test]
    fn test_primary_index_is_row_of_original() {
        for text in [
            &b"banana"[..],
            b"mississippi",
            b"abracadabra",
            b"aaaaaaaab",
            b"yabbadabbado",
        ] {
            let sa = suffix_array(text).unwrap();
            let (_, pidx) = bwt(text).unwrap();
            assert_eq!(sa[pidx], 0);
        }
    }

    #[test]
    fn test_exhaustive_binary_inputs() {
        let mut engine = DivSufSort::new();
        let mut sa = vec![0i32; 12];

        for len in 2..=12usize {
            for bits in 0..(1u32 << len) {
                let text: Vec<u8> = (0..len).map(|i| ((bits >> i) & 1) as u8).collect();
                engine.compute_suffix_array(&text, &mut sa).unwrap();
                assert_eq!(
                    &sa[..len],
                    naive_suffix_array(&text).as_slice(),
                    "text = {text:?}"
                );
            }
        }
    }

    #[test]
    fn test_random_binary_inputs() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut engine = DivSufSort::new();

        for len in 13..=64usize {
            for _ in 0..32 {
                let text: Vec<u8> = (0..len).map(|_| rng.gen_range(0..2u8)).collect();
                let mut sa = vec![0i32; len];
                engine.compute_suffix_array(&text, &mut sa).unwrap();
                assert_eq!(sa, naive_suffix_array(&text), "text = {text:?}");
            }
        }
    }

    #[test]
    fn test_random_64kib() {
        let mut rng = StdRng::seed_from_u64(0x5EED);
        let text: Vec<u8> = (0..65536).map(|_| rng.gen()).collect();

        let sa = suffix_array(&text).unwrap();
        assert_is_suffix_array(&text, &sa);

        let (bwt_out, pidx) = bwt(&text).unwrap();
        assert_eq!(decode_bwt(&bwt_out, pidx).unwrap(), text);
    }

    #[test]
    fn test_all_equal_bytes() {
        let text = vec![b'a'; 4096];
        let sa = suffix_array(&text).unwrap();
        let expected: Vec<i32> = (0..4096).rev().collect();
        assert_eq!(sa, expected);

        let (bwt_out, pidx) = bwt(&text).unwrap();
        assert_eq!(decode_bwt(&bwt_out, pidx).unwrap(), text);
    }

    #[test]
    fn test_period_two_repeat() {
        let text: Vec<u8> = b"ab".iter().copied().cycle().take(4096).collect();
        let sa = suffix_array(&text).unwrap();
        assert_is_suffix_array(&text, &sa);

        let (bwt_out, pidx) = bwt(&text).unwrap();
        assert_eq!(decode_bwt(&bwt_out, pidx).unwrap(), text);
    }

    #[test]
    fn test_period_three_repeat() {
        let text: Vec<u8> = b"abc".iter().copied().cycle().take(3 * 5000).collect();
        let sa = suffix_array(&text).unwrap();
        assert_is_suffix_array(&text, &sa);
    }

    #[test]
    fn test_long_random_period() {
        // A short random motif repeated thousands of times forces deep
        // rank doubling and exercises the budget fallback.
        let mut rng = StdRng::seed_from_u64(42);
        let motif: Vec<u8> = (0..7).map(|_| rng.gen_range(b'a'..b'e')).collect();
        let text: Vec<u8> = motif.iter().copied().cycle().take(7 * 3000).collect();

        let sa = suffix_array(&text).unwrap();
        assert_is_suffix_array(&text, &sa);

        let (bwt_out, pidx) = bwt(&text).unwrap();
        assert_eq!(decode_bwt(&bwt_out, pidx).unwrap(), text);
    }

    #[test]
    fn test_natural_language_sample() {
        let text = b"the quick brown fox jumps over the lazy dog and then \
                     the quick brown fox jumps over the lazy dog again";
        let sa = suffix_array(text).unwrap();
        assert_eq!(sa, naive_suffix_array(text));

        let (bwt_out, pidx) = bwt(text).unwrap();
        assert_eq!(decode_bwt(&bwt_out, pidx).unwrap(), text);
    }

    #[test]
    fn test_determinism() {
        let mut rng = StdRng::seed_from_u64(99);
        let text: Vec<u8> = (0..2000).map(|_| rng.gen_range(0..4u8)).collect();

        let mut engine = DivSufSort::new();
        let mut sa1 = vec![0i32; text.len()];
        let mut sa2 = vec![0i32; text.len()];
        engine.compute_suffix_array(&text, &mut sa1).unwrap();
        engine.compute_suffix_array(&text, &mut sa2).unwrap();
        assert_eq!(sa1, sa2);
    }

    #[test]
    fn test_engine_reuse_across_inputs() {
        let mut engine = DivSufSort::new();

        let first = b"abracadabra";
        let mut sa = vec![0i32; first.len()];
        engine.compute_suffix_array(first, &mut sa).unwrap();
        assert_eq!(sa, naive_suffix_array(first));

        // A longer, unrelated input on the same instance.
        let mut rng = StdRng::seed_from_u64(3);
        let second: Vec<u8> = (0..5000).map(|_| rng.gen()).collect();
        let mut sa = vec![0i32; second.len()];
        engine.compute_suffix_array(&second, &mut sa).unwrap();
        assert_is_suffix_array(&second, &sa);

        // And a shorter one again; stale buffer contents must not leak in.
        let third = b"mississippi";
        let mut sa = vec![0i32; third.len()];
        engine.compute_suffix_array(third, &mut sa).unwrap();
        assert_eq!(sa, vec![10, 7, 4, 1, 0, 9, 8, 6, 3, 5, 2]);
    }

    #[test]
    fn test_engine_mixed_sa_and_bwt() {
        let mut engine = DivSufSort::new();
        let text = b"banana";
        let mut sa = vec![0i32; text.len()];

        let pidx = engine.compute_bwt(text, &mut sa).unwrap();
        assert_eq!(pidx, 3);

        engine.compute_suffix_array(text, &mut sa).unwrap();
        assert_eq!(sa, vec![5, 3, 1, 0, 4, 2]);
    }

    #[test]
    fn test_shorter_suffix_sorts_first() {
        // Equal prefixes are resolved by the implicit end of text.
        let text = b"aaaa";
        let sa = suffix_array(text).unwrap();
        assert_eq!(sa, vec![3, 2, 1, 0]);
    }

    #[test]
    fn test_empty_input_is_rejected() {
        assert!(suffix_array(b"").is_err());
        assert!(bwt(b"").is_err());

        let mut engine = DivSufSort::new();
        assert!(engine.compute_suffix_array(b"", &mut []).is_err());
    }

    #[test]
    fn test_short_sa_buffer_is_rejected() {
        let mut engine = DivSufSort::new();
        let mut sa = vec![0i32; 3];
        assert!(engine.compute_suffix_array(b"banana", &mut sa).is_err());
        assert!(engine.compute_bwt(b"banana", &mut sa).is_err());
    }

    #[test]
    fn test_decode_bwt_rejects_bad_args() {
        assert!(decode_bwt(b"", 0).is_err());
        assert!(decode_bwt(b"abc", 3).is_err());
    }

    #[test]
    fn test_bwt_round_trip_small_lengths() {
        let mut rng = StdRng::seed_from_u64(11);

        for len in 1..=64usize {
            for _ in 0..8 {
                let text: Vec<u8> = (0..len).map(|_| rng.gen_range(0..8u8)).collect();
                let (bwt_out, pidx) = bwt(&text).unwrap();
                assert_eq!(decode_bwt(&bwt_out, pidx).unwrap(), text, "text = {text:?}");
            }
        }
    }
}
