//! Substring sort.
//!
//! Orders the type-B* suffixes of the text by their leading substrings,
//! one two-byte bucket at a time. `sa[pa..pa + m)` holds the text positions
//! of the B* suffixes; the bucket slots in the head of `sa` hold indices
//! into that list. The comparison key of entry `x` is
//! `text[pos(x) + depth .. pos(x + 1) + 2)`, so the two bucket bytes are
//! implicit and never re-read.
//!
//! Ranges larger than `SS_BLOCKSIZE` are sorted block-wise and merged with
//! a binary-counter schedule; each block is handled by a multikey introsort
//! that partitions on the byte at the current depth and descends into the
//! equal partition with `depth + 1`. When two adjacent keys compare equal,
//! the right entry is tagged with its bitwise complement so that later
//! phases can skip whole runs of already-sorted, equal-key entries.

use crate::tables::{ss_ilg, ss_isqrt};
use crate::Sorter;

pub(crate) const SS_INSERTIONSORT_THRESHOLD: i32 = 8;
pub(crate) const SS_BLOCKSIZE: i32 = 1024;

/// Strips the equal-key tag, if present.
#[inline]
fn untag(x: i32) -> i32 {
    if x >= 0 {
        x
    } else {
        !x
    }
}

impl Sorter<'_> {
    /// Sorts the bucket `sa[first..last)` of B* substring indices.
    ///
    /// `buf` / `buf_size` describe the scratch region used for merging and
    /// `n` is the text length. When `last_suffix` is set, the first slot
    /// holds the textually last B* suffix; it has no right neighbour to
    /// bound its key, so it is excluded from the sort and reinserted with a
    /// bounded comparison afterwards.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn ss_sort(
        &mut self,
        pa: i32,
        mut first: i32,
        last: i32,
        mut buf: i32,
        mut buf_size: i32,
        depth: i32,
        n: i32,
        last_suffix: bool,
    ) {
        if last_suffix {
            first += 1;
        }

        let mut limit = 0;
        let mut middle = last;

        if buf_size < SS_BLOCKSIZE && buf_size < last - first {
            limit = ss_isqrt(last - first);

            if buf_size < limit {
                if limit > SS_BLOCKSIZE {
                    limit = SS_BLOCKSIZE;
                }

                middle = last - limit;
                buf = middle;
                buf_size = limit;
            } else {
                limit = 0;
            }
        }

        let mut a = first;
        let mut i: i32 = 0;

        while middle - a > SS_BLOCKSIZE {
            self.ss_multikey_introsort(pa, a, a + SS_BLOCKSIZE, depth);
            let mut cur_buf_size = last - (a + SS_BLOCKSIZE);
            let cur_buf;

            if cur_buf_size > buf_size {
                cur_buf = a + SS_BLOCKSIZE;
            } else {
                cur_buf_size = buf_size;
                cur_buf = buf;
            }

            let mut k = SS_BLOCKSIZE;
            let mut b = a;
            let mut j = i;

            while (j & 1) != 0 {
                self.ss_swap_merge(pa, b - k, b, b + k, cur_buf, cur_buf_size, depth);
                b -= k;
                k <<= 1;
                j >>= 1;
            }

            a += SS_BLOCKSIZE;
            i += 1;
        }

        self.ss_multikey_introsort(pa, a, middle, depth);

        let mut k = SS_BLOCKSIZE;

        while i != 0 {
            if (i & 1) != 0 {
                self.ss_swap_merge(pa, a - k, a, middle, buf, buf_size, depth);
                a -= k;
            }

            k <<= 1;
            i >>= 1;
        }

        if limit != 0 {
            self.ss_multikey_introsort(pa, middle, last, depth);
            self.ss_inplace_merge(pa, first, middle, last, depth);
        }

        if last_suffix {
            // Insert the last B* suffix by a linear scan. Its key must be
            // compared with an explicit end position since sa[pa + m] does
            // not exist.
            let i = self.get(first - 1);
            let p1 = self.get(pa + i);
            let p11 = n - 2;
            let mut a = first;

            while a < last
                && (self.get(a) < 0 || self.ss_compare_last(p1, p11, pa + self.get(a), depth) > 0)
            {
                let t = self.get(a);
                self.set(a - 1, t);
                a += 1;
            }

            self.set(a - 1, i);
        }
    }

    /// Compares two B* substrings given by their slots in the position
    /// list. Returns the usual negative/zero/positive ordering value; a
    /// shorter substring that is a prefix of the other sorts first.
    pub(crate) fn ss_compare(&self, p1: i32, p2: i32, depth: i32) -> i32 {
        let mut u1 = depth + self.get(p1);
        let mut u2 = depth + self.get(p2);
        let u1n = self.get(p1 + 1) + 2;
        let u2n = self.get(p2 + 1) + 2;

        if u1n - u1 > u2n - u2 {
            while u2 < u2n && self.ch(u1) == self.ch(u2) {
                u1 += 1;
                u2 += 1;
            }
        } else {
            while u1 < u1n && self.ch(u1) == self.ch(u2) {
                u1 += 1;
                u2 += 1;
            }
        }

        if u1 < u1n {
            if u2 < u2n {
                self.ch(u1) - self.ch(u2)
            } else {
                1
            }
        } else if u2 < u2n {
            -1
        } else {
            0
        }
    }

    /// Variant of [`Self::ss_compare`] whose left key is given by an
    /// explicit start and end position instead of a slot pair.
    fn ss_compare_last(&self, pa_pos: i32, pb_pos: i32, p2: i32, depth: i32) -> i32 {
        let mut u1 = depth + pa_pos;
        let mut u2 = depth + self.get(p2);
        let u1n = pb_pos + 2;
        let u2n = self.get(p2 + 1) + 2;

        if u1n - u1 > u2n - u2 {
            while u2 < u2n && self.ch(u1) == self.ch(u2) {
                u1 += 1;
                u2 += 1;
            }
        } else {
            while u1 < u1n && self.ch(u1) == self.ch(u2) {
                u1 += 1;
                u2 += 1;
            }
        }

        if u1 < u1n {
            if u2 < u2n {
                self.ch(u1) - self.ch(u2)
            } else {
                1
            }
        } else if u2 < u2n {
            -1
        } else {
            0
        }
    }

    fn ss_insertion_sort(&mut self, pa: i32, first: i32, last: i32, depth: i32) {
        let mut i = last - 2;

        while i >= first {
            let t = pa + self.get(i);
            let mut j = i + 1;
            let mut r;

            loop {
                r = self.ss_compare(t, pa + self.get(j), depth);

                if r <= 0 {
                    break;
                }

                loop {
                    let v = self.get(j);
                    self.set(j - 1, v);
                    j += 1;

                    if !(j < last && self.get(j) < 0) {
                        break;
                    }
                }

                if j >= last {
                    break;
                }
            }

            if r == 0 {
                let v = !self.get(j);
                self.set(j, v);
            }

            self.set(j - 1, t - pa);
            i -= 1;
        }
    }

    fn ss_multikey_introsort(&mut self, pa: i32, mut first: i32, mut last: i32, mut depth: i32) {
        let mut limit = ss_ilg(last - first);
        let mut x = 0;

        loop {
            if last - first <= SS_INSERTIONSORT_THRESHOLD {
                if last - first > 1 {
                    self.ss_insertion_sort(pa, first, last, depth);
                }

                match self.ss_stack.pop() {
                    Some(e) => {
                        first = e.a;
                        last = e.b;
                        depth = e.c;
                        limit = e.d;
                        continue;
                    }
                    None => return,
                }
            }

            let td = depth;

            if limit == 0 {
                self.ss_heap_sort(td, pa, first, last - first);
            }

            limit -= 1;
            let mut a;

            if limit < 0 {
                // Scan for the first position whose key differs; runs of
                // equal keys shrink the range from the left.
                let mut v = self.ch(td + self.get(pa + self.get(first)));
                a = first + 1;

                while a < last {
                    x = self.ch(td + self.get(pa + self.get(a)));

                    if x != v {
                        if a - first > 1 {
                            break;
                        }

                        v = x;
                        first = a;
                    }

                    a += 1;
                }

                if self.ch(td + self.get(pa + self.get(first)) - 1) < v {
                    first = self.ss_partition(pa, first, a, depth);
                }

                if a - first <= last - a {
                    if a - first > 1 {
                        self.ss_stack.push(a, last, depth, -1, 0);
                        last = a;
                        depth += 1;
                        limit = ss_ilg(a - first);
                    } else {
                        first = a;
                        limit = -1;
                    }
                } else if last - a > 1 {
                    self.ss_stack.push(first, a, depth + 1, ss_ilg(a - first), 0);
                    first = a;
                    limit = -1;
                } else {
                    last = a;
                    depth += 1;
                    limit = ss_ilg(a - first);
                }

                continue;
            }

            // choose pivot
            a = self.ss_pivot(td, pa, first, last);
            let v = self.ch(td + self.get(pa + self.get(a)));
            self.swap(first, a);
            let mut b = first;

            // ternary partition
            loop {
                b += 1;

                if b >= last {
                    break;
                }

                x = self.ch(td + self.get(pa + self.get(b)));

                if x != v {
                    break;
                }
            }

            a = b;

            if a < last && x < v {
                loop {
                    b += 1;

                    if b >= last {
                        break;
                    }

                    x = self.ch(td + self.get(pa + self.get(b)));

                    if x > v {
                        break;
                    }

                    if x == v {
                        self.swap(b, a);
                        a += 1;
                    }
                }
            }

            let mut c = last;

            loop {
                c -= 1;

                if c <= b {
                    break;
                }

                x = self.ch(td + self.get(pa + self.get(c)));

                if x != v {
                    break;
                }
            }

            let mut d = c;

            if b < d && x > v {
                loop {
                    c -= 1;

                    if c <= b {
                        break;
                    }

                    x = self.ch(td + self.get(pa + self.get(c)));

                    if x < v {
                        break;
                    }

                    if x == v {
                        self.swap(c, d);
                        d -= 1;
                    }
                }
            }

            while b < c {
                self.swap(b, c);

                loop {
                    b += 1;

                    if b >= c {
                        break;
                    }

                    x = self.ch(td + self.get(pa + self.get(b)));

                    if x > v {
                        break;
                    }

                    if x == v {
                        self.swap(b, a);
                        a += 1;
                    }
                }

                loop {
                    c -= 1;

                    if c <= b {
                        break;
                    }

                    x = self.ch(td + self.get(pa + self.get(c)));

                    if x < v {
                        break;
                    }

                    if x == v {
                        self.swap(c, d);
                        d -= 1;
                    }
                }
            }

            if a <= d {
                c = b - 1;
                let mut s = (a - first).min(b - a);
                let mut e = first;
                let mut f = b - s;

                while s > 0 {
                    self.swap(e, f);
                    s -= 1;
                    e += 1;
                    f += 1;
                }

                let mut s = (d - c).min(last - d - 1);
                let mut e = b;
                let mut f = last - s;

                while s > 0 {
                    self.swap(e, f);
                    s -= 1;
                    e += 1;
                    f += 1;
                }

                a = first + (b - a);
                c = last - (d - c);
                b = if v <= self.ch(td + self.get(pa + self.get(a)) - 1) {
                    a
                } else {
                    self.ss_partition(pa, a, c, depth)
                };

                if a - first <= last - c {
                    if last - c <= c - b {
                        self.ss_stack.push(b, c, depth + 1, ss_ilg(c - b), 0);
                        self.ss_stack.push(c, last, depth, limit, 0);
                        last = a;
                    } else if a - first <= c - b {
                        self.ss_stack.push(c, last, depth, limit, 0);
                        self.ss_stack.push(b, c, depth + 1, ss_ilg(c - b), 0);
                        last = a;
                    } else {
                        self.ss_stack.push(c, last, depth, limit, 0);
                        self.ss_stack.push(first, a, depth, limit, 0);
                        first = b;
                        last = c;
                        depth += 1;
                        limit = ss_ilg(c - b);
                    }
                } else if a - first <= c - b {
                    self.ss_stack.push(b, c, depth + 1, ss_ilg(c - b), 0);
                    self.ss_stack.push(first, a, depth, limit, 0);
                    first = c;
                } else if last - c <= c - b {
                    self.ss_stack.push(first, a, depth, limit, 0);
                    self.ss_stack.push(b, c, depth + 1, ss_ilg(c - b), 0);
                    first = c;
                } else {
                    self.ss_stack.push(first, a, depth, limit, 0);
                    self.ss_stack.push(c, last, depth, limit, 0);
                    first = b;
                    last = c;
                    depth += 1;
                    limit = ss_ilg(c - b);
                }
            } else {
                if self.ch(td + self.get(pa + self.get(first)) - 1) < v {
                    first = self.ss_partition(pa, first, last, depth);
                    limit = ss_ilg(last - first);
                } else {
                    limit += 1;
                }

                depth += 1;
            }
        }
    }

    fn ss_pivot(&self, td: i32, pa: i32, first: i32, last: i32) -> i32 {
        let mut t = last - first;
        let middle = first + (t >> 1);

        if t <= 512 {
            if t <= 32 {
                return self.ss_median3(td, pa, first, middle, last - 1);
            }

            return self.ss_median5(
                td,
                pa,
                first,
                first + (t >> 2),
                middle,
                last - 1 - (t >> 2),
                last - 1,
            );
        }

        t >>= 3;
        let first = self.ss_median3(td, pa, first, first + t, first + (t << 1));
        let middle = self.ss_median3(td, pa, middle - t, middle, middle + t);
        let last = self.ss_median3(td, pa, last - 1 - (t << 1), last - 1 - t, last - 1);
        self.ss_median3(td, pa, first, middle, last)
    }

    #[allow(clippy::too_many_arguments)]
    fn ss_median5(
        &self,
        td: i32,
        pa: i32,
        mut v1: i32,
        mut v2: i32,
        mut v3: i32,
        mut v4: i32,
        mut v5: i32,
    ) -> i32 {
        let key = |v: i32| self.ch(td + self.get(pa + self.get(v)));

        if key(v2) > key(v3) {
            std::mem::swap(&mut v2, &mut v3);
        }

        if key(v4) > key(v5) {
            std::mem::swap(&mut v4, &mut v5);
        }

        if key(v2) > key(v4) {
            std::mem::swap(&mut v2, &mut v4);
            std::mem::swap(&mut v3, &mut v5);
        }

        if key(v1) > key(v3) {
            std::mem::swap(&mut v1, &mut v3);
        }

        if key(v1) > key(v4) {
            std::mem::swap(&mut v1, &mut v4);
            std::mem::swap(&mut v3, &mut v5);
        }

        if key(v3) > key(v4) {
            v4
        } else {
            v3
        }
    }

    fn ss_median3(&self, td: i32, pa: i32, mut v1: i32, mut v2: i32, v3: i32) -> i32 {
        let key = |v: i32| self.ch(td + self.get(pa + self.get(v)));

        if key(v1) > key(v2) {
            std::mem::swap(&mut v1, &mut v2);
        }

        if key(v2) > key(v3) {
            if key(v1) > key(v3) {
                return v1;
            }

            return v3;
        }

        v2
    }

    /// Moves entries whose substring is exhausted at `depth` to the front
    /// and tags them; they sort before every entry that still has bytes.
    fn ss_partition(&mut self, pa: i32, first: i32, last: i32, depth: i32) -> i32 {
        let mut a = first - 1;
        let mut b = last;
        let d = depth - 1;
        let pb = pa + 1;

        loop {
            a += 1;

            while a < b && self.get(pa + self.get(a)) + d >= self.get(pb + self.get(a)) {
                let v = !self.get(a);
                self.set(a, v);
                a += 1;
            }

            b -= 1;

            while b > a && self.get(pa + self.get(b)) + d < self.get(pb + self.get(b)) {
                b -= 1;
            }

            if b <= a {
                break;
            }

            let t = !self.get(b);
            let v = self.get(a);
            self.set(b, v);
            self.set(a, t);
        }

        if first < a {
            let v = !self.get(first);
            self.set(first, v);
        }

        a
    }

    fn ss_heap_sort(&mut self, td: i32, pa: i32, sa_idx: i32, size: i32) {
        let mut m = size;

        if size % 2 == 0 {
            m -= 1;

            if self.ch(td + self.get(pa + self.get(sa_idx + (m >> 1))))
                < self.ch(td + self.get(pa + self.get(sa_idx + m)))
            {
                self.swap(sa_idx + m, sa_idx + (m >> 1));
            }
        }

        let mut i = (m >> 1) - 1;

        while i >= 0 {
            self.ss_fix_down(td, pa, sa_idx, i, m);
            i -= 1;
        }

        if size % 2 == 0 {
            self.swap(sa_idx, sa_idx + m);
            self.ss_fix_down(td, pa, sa_idx, 0, m);
        }

        let mut i = m - 1;

        while i > 0 {
            let t = self.get(sa_idx);
            let v = self.get(sa_idx + i);
            self.set(sa_idx, v);
            self.ss_fix_down(td, pa, sa_idx, 0, i);
            self.set(sa_idx + i, t);
            i -= 1;
        }
    }

    fn ss_fix_down(&mut self, td: i32, pa: i32, sa_idx: i32, mut i: i32, size: i32) {
        let v = self.get(sa_idx + i);
        let c = self.ch(td + self.get(pa + v));
        let mut j = (i << 1) + 1;

        while j < size {
            let mut k = j;
            j += 1;
            let mut d = self.ch(td + self.get(pa + self.get(sa_idx + k)));
            let e = self.ch(td + self.get(pa + self.get(sa_idx + j)));

            if d < e {
                k = j;
                d = e;
            }

            if d <= c {
                break;
            }

            let w = self.get(sa_idx + k);
            self.set(sa_idx + i, w);
            i = k;
            j = (i << 1) + 1;
        }

        self.set(sa_idx + i, v);
    }

    fn ss_block_swap(&mut self, mut a: i32, mut b: i32, mut n: i32) {
        while n > 0 {
            self.swap(a, b);
            n -= 1;
            a += 1;
            b += 1;
        }
    }

    fn ss_rotate(&mut self, mut first: i32, middle: i32, mut last: i32) {
        let mut l = middle - first;
        let mut r = last - middle;

        while l > 0 && r > 0 {
            if l == r {
                self.ss_block_swap(first, middle, l);
                break;
            }

            if l < r {
                let mut a = last - 1;
                let mut b = middle - 1;
                let mut t = self.get(a);

                loop {
                    let v = self.get(b);
                    self.set(a, v);
                    a -= 1;
                    let v = self.get(a);
                    self.set(b, v);
                    b -= 1;

                    if b < first {
                        self.set(a, t);
                        last = a;
                        r -= l + 1;

                        if r <= l {
                            break;
                        }

                        a -= 1;
                        b = middle - 1;
                        t = self.get(a);
                    }
                }
            } else {
                let mut a = first;
                let mut b = middle;
                let mut t = self.get(a);

                loop {
                    let v = self.get(b);
                    self.set(a, v);
                    a += 1;
                    let v = self.get(a);
                    self.set(b, v);
                    b += 1;

                    if last <= b {
                        self.set(a, t);
                        first = a + 1;
                        l -= r + 1;

                        if l <= r {
                            break;
                        }

                        a += 1;
                        b = middle;
                        t = self.get(a);
                    }
                }
            }
        }
    }

    /// Merges `sa[first..middle)` and `sa[middle..last)` without scratch
    /// space, by rotating the tail of the left run past the binary-searched
    /// insertion point of the right run's last element.
    fn ss_inplace_merge(&mut self, pa: i32, first: i32, mut middle: i32, mut last: i32, depth: i32) {
        loop {
            let p;
            let x;

            if self.get(last - 1) < 0 {
                x = 1;
                p = pa + !self.get(last - 1);
            } else {
                x = 0;
                p = pa + self.get(last - 1);
            }

            let mut a = first;
            let mut r = -1;
            let mut len = middle - first;
            let mut half = len >> 1;

            while len > 0 {
                let b = a + half;
                let q = self.ss_compare(pa + untag(self.get(b)), p, depth);

                if q < 0 {
                    a = b + 1;
                    half -= (len & 1) ^ 1;
                } else {
                    r = q;
                }

                len = half;
                half >>= 1;
            }

            if a < middle {
                if r == 0 {
                    let v = !self.get(a);
                    self.set(a, v);
                }

                self.ss_rotate(a, middle, last);
                last -= middle - a;
                middle = a;

                if first == middle {
                    break;
                }
            }

            last -= 1;

            if x != 0 {
                last -= 1;

                while self.get(last) < 0 {
                    last -= 1;
                }
            }

            if middle == last {
                break;
            }
        }
    }

    /// Merges two sorted runs using the scratch region, recursing on the
    /// larger half via the merge stack. The `check` bits carry boundary
    /// equality obligations: bit 0 forces a tag at `first`, bit 1 requests
    /// a compare at `first`, bit 2 a compare at `last`.
    #[allow(clippy::too_many_arguments)]
    fn ss_swap_merge(
        &mut self,
        pa: i32,
        mut first: i32,
        mut middle: i32,
        mut last: i32,
        buf: i32,
        buf_size: i32,
        depth: i32,
    ) {
        let mut check = 0;

        loop {
            if last - middle <= buf_size {
                if first < middle && middle < last {
                    self.ss_merge_backward(pa, first, middle, last, buf, depth);
                }

                if (check & 1) != 0
                    || ((check & 2) != 0
                        && self.ss_compare(pa + untag(self.get(first - 1)), pa + self.get(first), depth)
                            == 0)
                {
                    let v = !self.get(first);
                    self.set(first, v);
                }

                if (check & 4) != 0
                    && self.ss_compare(pa + untag(self.get(last - 1)), pa + self.get(last), depth) == 0
                {
                    let v = !self.get(last);
                    self.set(last, v);
                }

                match self.merge_stack.pop() {
                    Some(e) => {
                        first = e.a;
                        middle = e.b;
                        last = e.c;
                        check = e.d;
                        continue;
                    }
                    None => return,
                }
            }

            if middle - first <= buf_size {
                if first < middle {
                    self.ss_merge_forward(pa, first, middle, last, buf, depth);
                }

                if (check & 1) != 0
                    || ((check & 2) != 0
                        && self.ss_compare(pa + untag(self.get(first - 1)), pa + self.get(first), depth)
                            == 0)
                {
                    let v = !self.get(first);
                    self.set(first, v);
                }

                if (check & 4) != 0
                    && self.ss_compare(pa + untag(self.get(last - 1)), pa + self.get(last), depth) == 0
                {
                    let v = !self.get(last);
                    self.set(last, v);
                }

                match self.merge_stack.pop() {
                    Some(e) => {
                        first = e.a;
                        middle = e.b;
                        last = e.c;
                        check = e.d;
                        continue;
                    }
                    None => return,
                }
            }

            let mut len = (middle - first).min(last - middle);
            let mut m = 0;
            let mut half = len >> 1;

            while len > 0 {
                if self.ss_compare(
                    pa + untag(self.get(middle + m + half)),
                    pa + untag(self.get(middle - m - half - 1)),
                    depth,
                ) < 0
                {
                    m += half + 1;
                    half -= (len & 1) ^ 1;
                }

                len = half;
                half >>= 1;
            }

            if m > 0 {
                let lm = middle - m;
                let rm = middle + m;
                self.ss_block_swap(lm, middle, m);
                let mut l = middle;
                let mut r = l;
                let mut next = 0;

                if rm < last {
                    if self.get(rm) < 0 {
                        let v = !self.get(rm);
                        self.set(rm, v);

                        if first < lm {
                            l -= 1;

                            while self.get(l) < 0 {
                                l -= 1;
                            }

                            next |= 4;
                        }

                        next |= 1;
                    } else if first < lm {
                        while self.get(r) < 0 {
                            r += 1;
                        }

                        next |= 2;
                    }
                }

                if l - first <= last - r {
                    self.merge_stack.push(r, rm, last, (next & 3) | (check & 4), 0);
                    middle = lm;
                    last = l;
                    check = (check & 3) | (next & 4);
                } else {
                    if r == middle && (next & 2) != 0 {
                        next ^= 6;
                    }

                    self.merge_stack.push(first, lm, l, (check & 3) | (next & 4), 0);
                    first = r;
                    middle = rm;
                    check = (next & 3) | (check & 4);
                }
            } else {
                if self.ss_compare(pa + untag(self.get(middle - 1)), pa + self.get(middle), depth) == 0
                {
                    let v = !self.get(middle);
                    self.set(middle, v);
                }

                if (check & 1) != 0
                    || ((check & 2) != 0
                        && self.ss_compare(pa + untag(self.get(first - 1)), pa + self.get(first), depth)
                            == 0)
                {
                    let v = !self.get(first);
                    self.set(first, v);
                }

                if (check & 4) != 0
                    && self.ss_compare(pa + untag(self.get(last - 1)), pa + self.get(last), depth) == 0
                {
                    let v = !self.get(last);
                    self.set(last, v);
                }

                match self.merge_stack.pop() {
                    Some(e) => {
                        first = e.a;
                        middle = e.b;
                        last = e.c;
                        check = e.d;
                    }
                    None => return,
                }
            }
        }
    }

    fn ss_merge_forward(&mut self, pa: i32, first: i32, middle: i32, last: i32, buf: i32, depth: i32) {
        let buf_end = buf + middle - first - 1;
        self.ss_block_swap(buf, first, middle - first);
        let mut a = first;
        let mut b = buf;
        let mut c = middle;
        let t = self.get(a);

        loop {
            let r = self.ss_compare(pa + self.get(b), pa + self.get(c), depth);

            if r < 0 {
                loop {
                    let v = self.get(b);
                    self.set(a, v);
                    a += 1;

                    if buf_end <= b {
                        self.set(buf_end, t);
                        return;
                    }

                    let v = self.get(a);
                    self.set(b, v);
                    b += 1;

                    if self.get(b) >= 0 {
                        break;
                    }
                }
            } else if r > 0 {
                loop {
                    let v = self.get(c);
                    self.set(a, v);
                    a += 1;
                    let v = self.get(a);
                    self.set(c, v);
                    c += 1;

                    if last <= c {
                        while b < buf_end {
                            let v = self.get(b);
                            self.set(a, v);
                            a += 1;
                            let v = self.get(a);
                            self.set(b, v);
                            b += 1;
                        }

                        let v = self.get(b);
                        self.set(a, v);
                        self.set(b, t);
                        return;
                    }

                    if self.get(c) >= 0 {
                        break;
                    }
                }
            } else {
                let v = !self.get(c);
                self.set(c, v);

                loop {
                    let v = self.get(b);
                    self.set(a, v);
                    a += 1;

                    if buf_end <= b {
                        self.set(buf_end, t);
                        return;
                    }

                    let v = self.get(a);
                    self.set(b, v);
                    b += 1;

                    if self.get(b) >= 0 {
                        break;
                    }
                }

                loop {
                    let v = self.get(c);
                    self.set(a, v);
                    a += 1;
                    let v = self.get(a);
                    self.set(c, v);
                    c += 1;

                    if last <= c {
                        while b < buf_end {
                            let v = self.get(b);
                            self.set(a, v);
                            a += 1;
                            let v = self.get(a);
                            self.set(b, v);
                            b += 1;
                        }

                        let v = self.get(b);
                        self.set(a, v);
                        self.set(b, t);
                        return;
                    }

                    if self.get(c) >= 0 {
                        break;
                    }
                }
            }
        }
    }

    fn ss_merge_backward(&mut self, pa: i32, first: i32, middle: i32, last: i32, buf: i32, depth: i32) {
        let buf_end = buf + last - middle - 1;
        self.ss_block_swap(buf, middle, last - middle);
        let mut x = 0;
        let mut p1;
        let mut p2;

        if self.get(buf_end) < 0 {
            p1 = pa + !self.get(buf_end);
            x |= 1;
        } else {
            p1 = pa + self.get(buf_end);
        }

        if self.get(middle - 1) < 0 {
            p2 = pa + !self.get(middle - 1);
            x |= 2;
        } else {
            p2 = pa + self.get(middle - 1);
        }

        let mut a = last - 1;
        let mut b = buf_end;
        let mut c = middle - 1;
        let t = self.get(a);

        loop {
            let r = self.ss_compare(p1, p2, depth);

            if r > 0 {
                if (x & 1) != 0 {
                    loop {
                        let v = self.get(b);
                        self.set(a, v);
                        a -= 1;
                        let v = self.get(a);
                        self.set(b, v);
                        b -= 1;

                        if self.get(b) >= 0 {
                            break;
                        }
                    }

                    x ^= 1;
                }

                let v = self.get(b);
                self.set(a, v);
                a -= 1;

                if b <= buf {
                    self.set(buf, t);
                    break;
                }

                let v = self.get(a);
                self.set(b, v);
                b -= 1;

                if self.get(b) < 0 {
                    p1 = pa + !self.get(b);
                    x |= 1;
                } else {
                    p1 = pa + self.get(b);
                }
            } else if r < 0 {
                if (x & 2) != 0 {
                    loop {
                        let v = self.get(c);
                        self.set(a, v);
                        a -= 1;
                        let v = self.get(a);
                        self.set(c, v);
                        c -= 1;

                        if self.get(c) >= 0 {
                            break;
                        }
                    }

                    x ^= 2;
                }

                let v = self.get(c);
                self.set(a, v);
                a -= 1;
                let v = self.get(a);
                self.set(c, v);
                c -= 1;

                if c < first {
                    while buf < b {
                        let v = self.get(b);
                        self.set(a, v);
                        a -= 1;
                        let v = self.get(a);
                        self.set(b, v);
                        b -= 1;
                    }

                    let v = self.get(b);
                    self.set(a, v);
                    self.set(b, t);
                    break;
                }

                if self.get(c) < 0 {
                    p2 = pa + !self.get(c);
                    x |= 2;
                } else {
                    p2 = pa + self.get(c);
                }
            } else {
                if (x & 1) != 0 {
                    loop {
                        let v = self.get(b);
                        self.set(a, v);
                        a -= 1;
                        let v = self.get(a);
                        self.set(b, v);
                        b -= 1;

                        if self.get(b) >= 0 {
                            break;
                        }
                    }

                    x ^= 1;
                }

                let v = !self.get(b);
                self.set(a, v);
                a -= 1;

                if b <= buf {
                    self.set(buf, t);
                    break;
                }

                let v = self.get(a);
                self.set(b, v);
                b -= 1;

                if (x & 2) != 0 {
                    loop {
                        let v = self.get(c);
                        self.set(a, v);
                        a -= 1;
                        let v = self.get(a);
                        self.set(c, v);
                        c -= 1;

                        if self.get(c) >= 0 {
                            break;
                        }
                    }

                    x ^= 2;
                }

                let v = self.get(c);
                self.set(a, v);
                a -= 1;
                let v = self.get(a);
                self.set(c, v);
                c -= 1;

                if c < first {
                    while buf < b {
                        let v = self.get(b);
                        self.set(a, v);
                        a -= 1;
                        let v = self.get(a);
                        self.set(b, v);
                        b -= 1;
                    }

                    let v = self.get(b);
                    self.set(a, v);
                    self.set(b, t);
                    break;
                }

                if self.get(b) < 0 {
                    p1 = pa + !self.get(b);
                    x |= 1;
                } else {
                    p1 = pa + self.get(b);
                }

                if self.get(c) < 0 {
                    p2 = pa + !self.get(c);
                    x |= 2;
                } else {
                    p2 = pa + self.get(c);
                }
            }
        }
    }
}
