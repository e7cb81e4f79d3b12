//! Tandem-repeat sort.
//!
//! Refines the inverse-rank array left by the substring sort until every
//! B* suffix has a unique rank. Each pass doubles the context depth in the
//! manner of Larsson-Sadakane: the sort key of entry `q` at depth `d` is
//! the current rank of entry `q + d`. Runs that are already in final order
//! are encoded as a negative length in their first slot and skipped.
//!
//! Repetitive inputs make the same groups reappear pass after pass, so the
//! intro-sort carries a work budget. When the budget runs out the group is
//! left for the next doubling pass, and the `trlink` chain marks the
//! ancestor frame whose rank-copy step must then run in its partial form.

use crate::tables::tr_ilg;
use crate::Sorter;

pub(crate) const TR_INSERTIONSORT_THRESHOLD: i32 = 8;

/// Work credit for one doubling pass.
///
/// Every sorted group consumes credit proportional to its size. While
/// chances remain, an overdraft refills the credit; afterwards the
/// unfinished work is accumulated in `count` so the caller knows another
/// pass is required.
pub(crate) struct TrBudget {
    chance: i32,
    remain: i32,
    incval: i32,
    pub(crate) count: i32,
}

impl TrBudget {
    pub(crate) fn new(chance: i32, incval: i32) -> Self {
        Self {
            chance,
            remain: incval,
            incval,
            count: 0,
        }
    }

    pub(crate) fn check(&mut self, size: i32) -> bool {
        if size <= self.remain {
            self.remain -= size;
            return true;
        }

        if self.chance == 0 {
            self.count += size;
            return false;
        }

        self.remain += self.incval - size;
        self.chance -= 1;
        true
    }
}

impl Sorter<'_> {
    /// Sorts the B* sequence `sa[0..n)` by doubling context depth, using
    /// the rank array in `sa[n..2n)`. `sa[0] <= -n` signals that the whole
    /// permutation has collapsed into one sorted run.
    pub(crate) fn tr_sort(&mut self, n: i32, depth: i32) {
        let mut budget = TrBudget::new(tr_ilg(n) * 2 / 3, n);
        let mut isad = n + depth;

        while self.get(0) > -n {
            let mut first = 0;
            let mut skip = 0;
            let mut unsorted = 0;

            loop {
                let t = self.get(first);

                if t < 0 {
                    first -= t;
                    skip += t;
                } else {
                    if skip != 0 {
                        self.set(first + skip, skip);
                        skip = 0;
                    }

                    let last = self.get(n + t) + 1;

                    if last - first > 1 {
                        budget.count = 0;
                        self.tr_intro_sort(n, isad, first, last, &mut budget);

                        if budget.count != 0 {
                            unsorted += budget.count;
                        } else {
                            skip = first - last;
                        }
                    } else if last - first == 1 {
                        skip = -1;
                    }

                    first = last;
                }

                if first >= n {
                    break;
                }
            }

            if skip != 0 {
                self.set(first + skip, skip);
            }

            if unsorted == 0 {
                break;
            }

            isad += isad - n;
        }
    }

    /// Ternary partition of `sa[middle..last)` around rank value `v` at
    /// context offset `isad`; entries equal to `v` end up in the middle.
    /// Returns the boundaries of the equal span relative to `first`.
    fn tr_partition(&mut self, isad: i32, mut first: i32, middle: i32, mut last: i32, v: i32) -> (i32, i32) {
        let mut x = 0;
        let mut b = middle;

        while b < last {
            x = self.get(isad + self.get(b));

            if x != v {
                break;
            }

            b += 1;
        }

        let mut a = b;

        if a < last && x < v {
            loop {
                b += 1;

                if b >= last {
                    break;
                }

                x = self.get(isad + self.get(b));

                if x > v {
                    break;
                }

                if x == v {
                    self.swap(a, b);
                    a += 1;
                }
            }
        }

        let mut c = last - 1;

        while c > b {
            x = self.get(isad + self.get(c));

            if x != v {
                break;
            }

            c -= 1;
        }

        let mut d = c;

        if b < d && x > v {
            loop {
                c -= 1;

                if c <= b {
                    break;
                }

                x = self.get(isad + self.get(c));

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
            self.swap(c, b);

            loop {
                b += 1;

                if b >= c {
                    break;
                }

                x = self.get(isad + self.get(b));

                if x > v {
                    break;
                }

                if x == v {
                    self.swap(a, b);
                    a += 1;
                }
            }

            loop {
                c -= 1;

                if c <= b {
                    break;
                }

                x = self.get(isad + self.get(c));

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

            let mut s = d - c;

            if s >= last - d {
                s = last - d - 1;
            }

            let mut e = b;
            let mut f = last - s;

            while s > 0 {
                self.swap(e, f);
                s -= 1;
                e += 1;
                f += 1;
            }

            first += b - a;
            last -= d - c;
        }

        (first, last)
    }

    fn tr_intro_sort(&mut self, isa: i32, mut isad: i32, mut first: i32, mut last: i32, budget: &mut TrBudget) {
        let incr = isad - isa;
        let mut limit = tr_ilg(last - first);
        let mut trlink: i32 = -1;

        loop {
            if limit < 0 {
                if limit == -1 {
                    // tandem repeat partition
                    let (a, b) = self.tr_partition(isad - incr, first, first, last, last - 1);

                    // update ranks
                    if a < last {
                        let v = a - 1;
                        let mut c = first;

                        while c < a {
                            let s = self.get(c);
                            self.set(isa + s, v);
                            c += 1;
                        }
                    }

                    if b < last {
                        let v = b - 1;
                        let mut c = a;

                        while c < b {
                            let s = self.get(c);
                            self.set(isa + s, v);
                            c += 1;
                        }
                    }

                    // push
                    if b - a > 1 {
                        self.tr_stack.push(0, a, b, 0, 0);
                        self.tr_stack.push(isad - incr, first, last, -2, trlink);
                        trlink = self.tr_stack.len() as i32 - 2;
                    }

                    if a - first <= last - b {
                        if a - first > 1 {
                            self.tr_stack.push(isad, b, last, tr_ilg(last - b), trlink);
                            last = a;
                            limit = tr_ilg(a - first);
                        } else if last - b > 1 {
                            first = b;
                            limit = tr_ilg(last - b);
                        } else {
                            match self.tr_stack.pop() {
                                Some(e) => {
                                    isad = e.a;
                                    first = e.b;
                                    last = e.c;
                                    limit = e.d;
                                    trlink = e.e;
                                }
                                None => return,
                            }
                        }
                    } else if last - b > 1 {
                        self.tr_stack.push(isad, first, a, tr_ilg(a - first), trlink);
                        first = b;
                        limit = tr_ilg(last - b);
                    } else if a - first > 1 {
                        last = a;
                        limit = tr_ilg(a - first);
                    } else {
                        match self.tr_stack.pop() {
                            Some(e) => {
                                isad = e.a;
                                first = e.b;
                                last = e.c;
                                limit = e.d;
                                trlink = e.e;
                            }
                            None => return,
                        }
                    }
                } else if limit == -2 {
                    // tandem repeat copy
                    let se = match self.tr_stack.pop() {
                        Some(se) => se,
                        None => return,
                    };

                    if se.d == 0 {
                        self.tr_copy(isa, first, se.b, se.c, last, isad - isa);
                    } else {
                        if trlink >= 0 {
                            self.tr_stack.entry_mut(trlink as usize).d = -1;
                        }

                        self.tr_partial_copy(isa, first, se.b, se.c, last, isad - isa);
                    }

                    match self.tr_stack.pop() {
                        Some(e) => {
                            isad = e.a;
                            first = e.b;
                            last = e.c;
                            limit = e.d;
                            trlink = e.e;
                        }
                        None => return,
                    }
                } else {
                    // sorted partition
                    if self.get(first) >= 0 {
                        let mut a = first;

                        loop {
                            let s = self.get(a);
                            self.set(isa + s, a);
                            a += 1;

                            if !(a < last && self.get(a) >= 0) {
                                break;
                            }
                        }

                        first = a;
                    }

                    if first < last {
                        let mut a = first;

                        loop {
                            let v = !self.get(a);
                            self.set(a, v);
                            a += 1;

                            if self.get(a) >= 0 {
                                break;
                            }
                        }

                        let next = if self.get(isa + self.get(a)) != self.get(isad + self.get(a)) {
                            tr_ilg(a - first + 1)
                        } else {
                            -1
                        };

                        a += 1;

                        if a < last {
                            let v = a - 1;
                            let mut b = first;

                            while b < a {
                                let s = self.get(b);
                                self.set(isa + s, v);
                                b += 1;
                            }
                        }

                        // push
                        if budget.check(a - first) {
                            if a - first <= last - a {
                                self.tr_stack.push(isad, a, last, -3, trlink);
                                isad += incr;
                                last = a;
                                limit = next;
                            } else if last - a > 1 {
                                self.tr_stack.push(isad + incr, first, a, next, trlink);
                                first = a;
                                limit = -3;
                            } else {
                                isad += incr;
                                last = a;
                                limit = next;
                            }
                        } else {
                            if trlink >= 0 {
                                self.tr_stack.entry_mut(trlink as usize).d = -1;
                            }

                            if last - a > 1 {
                                first = a;
                                limit = -3;
                            } else {
                                match self.tr_stack.pop() {
                                    Some(e) => {
                                        isad = e.a;
                                        first = e.b;
                                        last = e.c;
                                        limit = e.d;
                                        trlink = e.e;
                                    }
                                    None => return,
                                }
                            }
                        }
                    } else {
                        match self.tr_stack.pop() {
                            Some(e) => {
                                isad = e.a;
                                first = e.b;
                                last = e.c;
                                limit = e.d;
                                trlink = e.e;
                            }
                            None => return,
                        }
                    }
                }

                continue;
            }

            if last - first <= TR_INSERTIONSORT_THRESHOLD {
                self.tr_insertion_sort(isad, first, last);
                limit = -3;
                continue;
            }

            if limit == 0 {
                self.tr_heap_sort(isad, first, last - first);

                // tag equal runs left by the heapsort
                let mut a = last - 1;

                while first < a {
                    let x = self.get(isad + self.get(a));
                    let mut b = a - 1;

                    while first <= b && self.get(isad + self.get(b)) == x {
                        let v = !self.get(b);
                        self.set(b, v);
                        b -= 1;
                    }

                    a = b;
                }

                limit = -3;
                continue;
            }

            limit -= 1;

            // choose pivot
            let p = self.tr_pivot(isad, first, last);
            self.swap(first, p);
            let mut v = self.get(isad + self.get(first));

            // partition
            let (a, b) = self.tr_partition(isad, first, first + 1, last, v);

            if last - first != b - a {
                let next = if self.get(isa + self.get(a)) != v {
                    tr_ilg(b - a)
                } else {
                    -1
                };

                // update ranks
                v = a - 1;
                let mut c = first;

                while c < a {
                    let s = self.get(c);
                    self.set(isa + s, v);
                    c += 1;
                }

                if b < last {
                    v = b - 1;
                    let mut c = a;

                    while c < b {
                        let s = self.get(c);
                        self.set(isa + s, v);
                        c += 1;
                    }
                }

                // push
                if b - a > 1 && budget.check(b - a) {
                    if a - first <= last - b {
                        if last - b <= b - a {
                            if a - first > 1 {
                                self.tr_stack.push(isad + incr, a, b, next, trlink);
                                self.tr_stack.push(isad, b, last, limit, trlink);
                                last = a;
                            } else if last - b > 1 {
                                self.tr_stack.push(isad + incr, a, b, next, trlink);
                                first = b;
                            } else {
                                isad += incr;
                                first = a;
                                last = b;
                                limit = next;
                            }
                        } else if a - first <= b - a {
                            if a - first > 1 {
                                self.tr_stack.push(isad, b, last, limit, trlink);
                                self.tr_stack.push(isad + incr, a, b, next, trlink);
                                last = a;
                            } else {
                                self.tr_stack.push(isad, b, last, limit, trlink);
                                isad += incr;
                                first = a;
                                last = b;
                                limit = next;
                            }
                        } else {
                            self.tr_stack.push(isad, b, last, limit, trlink);
                            self.tr_stack.push(isad, first, a, limit, trlink);
                            isad += incr;
                            first = a;
                            last = b;
                            limit = next;
                        }
                    } else if a - first <= b - a {
                        if last - b > 1 {
                            self.tr_stack.push(isad + incr, a, b, next, trlink);
                            self.tr_stack.push(isad, first, a, limit, trlink);
                            first = b;
                        } else if a - first > 1 {
                            self.tr_stack.push(isad + incr, a, b, next, trlink);
                            last = a;
                        } else {
                            isad += incr;
                            first = a;
                            last = b;
                            limit = next;
                        }
                    } else if last - b <= b - a {
                        if last - b > 1 {
                            self.tr_stack.push(isad, first, a, limit, trlink);
                            self.tr_stack.push(isad + incr, a, b, next, trlink);
                            first = b;
                        } else {
                            self.tr_stack.push(isad, first, a, limit, trlink);
                            isad += incr;
                            first = a;
                            last = b;
                            limit = next;
                        }
                    } else {
                        self.tr_stack.push(isad, first, a, limit, trlink);
                        self.tr_stack.push(isad, b, last, limit, trlink);
                        isad += incr;
                        first = a;
                        last = b;
                        limit = next;
                    }
                } else {
                    if b - a > 1 && trlink >= 0 {
                        self.tr_stack.entry_mut(trlink as usize).d = -1;
                    }

                    if a - first <= last - b {
                        if a - first > 1 {
                            self.tr_stack.push(isad, b, last, limit, trlink);
                            last = a;
                        } else if last - b > 1 {
                            first = b;
                        } else {
                            match self.tr_stack.pop() {
                                Some(e) => {
                                    isad = e.a;
                                    first = e.b;
                                    last = e.c;
                                    limit = e.d;
                                    trlink = e.e;
                                }
                                None => return,
                            }
                        }
                    } else if last - b > 1 {
                        self.tr_stack.push(isad, first, a, limit, trlink);
                        first = b;
                    } else if a - first > 1 {
                        last = a;
                    } else {
                        match self.tr_stack.pop() {
                            Some(e) => {
                                isad = e.a;
                                first = e.b;
                                last = e.c;
                                limit = e.d;
                                trlink = e.e;
                            }
                            None => return,
                        }
                    }
                }
            } else if budget.check(last - first) {
                limit = tr_ilg(last - first);
                isad += incr;
            } else {
                if trlink >= 0 {
                    self.tr_stack.entry_mut(trlink as usize).d = -1;
                }

                match self.tr_stack.pop() {
                    Some(e) => {
                        isad = e.a;
                        first = e.b;
                        last = e.c;
                        limit = e.d;
                        trlink = e.e;
                    }
                    None => return,
                }
            }
        }
    }

    fn tr_pivot(&self, isad: i32, first: i32, last: i32) -> i32 {
        let mut t = last - first;
        let middle = first + (t >> 1);

        if t <= 512 {
            if t <= 32 {
                return self.tr_median3(isad, first, middle, last - 1);
            }

            t >>= 2;
            return self.tr_median5(isad, first, first + t, middle, last - 1 - t, last - 1);
        }

        t >>= 3;
        let first = self.tr_median3(isad, first, first + t, first + (t << 1));
        let middle = self.tr_median3(isad, middle - t, middle, middle + t);
        let last = self.tr_median3(isad, last - 1 - (t << 1), last - 1 - t, last - 1);
        self.tr_median3(isad, first, middle, last)
    }

    fn tr_median5(&self, isad: i32, mut v1: i32, mut v2: i32, mut v3: i32, mut v4: i32, mut v5: i32) -> i32 {
        let key = |v: i32| self.get(isad + self.get(v));

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

    fn tr_median3(&self, isad: i32, mut v1: i32, mut v2: i32, v3: i32) -> i32 {
        let key = |v: i32| self.get(isad + self.get(v));

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

    fn tr_heap_sort(&mut self, isad: i32, sa_idx: i32, size: i32) {
        let mut m = size;

        if size % 2 == 0 {
            m -= 1;

            if self.get(isad + self.get(sa_idx + (m >> 1))) < self.get(isad + self.get(sa_idx + m)) {
                self.swap(sa_idx + m, sa_idx + (m >> 1));
            }
        }

        let mut i = (m >> 1) - 1;

        while i >= 0 {
            self.tr_fix_down(isad, sa_idx, i, m);
            i -= 1;
        }

        if size % 2 == 0 {
            self.swap(sa_idx, sa_idx + m);
            self.tr_fix_down(isad, sa_idx, 0, m);
        }

        let mut i = m - 1;

        while i > 0 {
            let t = self.get(sa_idx);
            let v = self.get(sa_idx + i);
            self.set(sa_idx, v);
            self.tr_fix_down(isad, sa_idx, 0, i);
            self.set(sa_idx + i, t);
            i -= 1;
        }
    }

    fn tr_fix_down(&mut self, isad: i32, sa_idx: i32, mut i: i32, size: i32) {
        let v = self.get(sa_idx + i);
        let c = self.get(isad + v);
        let mut j = (i << 1) + 1;

        while j < size {
            let mut k = j;
            j += 1;
            let mut d = self.get(isad + self.get(sa_idx + k));
            let e = self.get(isad + self.get(sa_idx + j));

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

    fn tr_insertion_sort(&mut self, isad: i32, first: i32, last: i32) {
        let mut a = first + 1;

        while a < last {
            let t = self.get(a);
            let mut b = a - 1;
            let mut r = self.get(isad + t) - self.get(isad + self.get(b));

            while r < 0 {
                loop {
                    let v = self.get(b);
                    self.set(b + 1, v);
                    b -= 1;

                    if !(b >= first && self.get(b) < 0) {
                        break;
                    }
                }

                if b < first {
                    break;
                }

                r = self.get(isad + t) - self.get(isad + self.get(b));
            }

            if r == 0 {
                let v = !self.get(b);
                self.set(b, v);
            }

            self.set(b + 1, t);
            a += 1;
        }
    }

    /// After a tandem-repeat partition has given the span `[a, b)` its
    /// final ranks, pull in the positions that precede (and follow) the
    /// span members at the current depth and rank them off their source.
    fn tr_copy(&mut self, isa: i32, first: i32, a: i32, b: i32, last: i32, depth: i32) {
        let v = b - 1;
        let mut d = a - 1;
        let mut c = first;

        while c <= d {
            let s = self.get(c) - depth;

            if s >= 0 && self.get(isa + s) == v {
                d += 1;
                self.set(d, s);
                self.set(isa + s, d);
            }

            c += 1;
        }

        let e = d + 1;
        d = b;
        let mut c = last - 1;

        while d > e {
            let s = self.get(c) - depth;

            if s >= 0 && self.get(isa + s) == v {
                d -= 1;
                self.set(d, s);
                self.set(isa + s, d);
            }

            c -= 1;
        }
    }

    /// Like [`Self::tr_copy`], but the span did not finish sorting, so
    /// copied positions inherit grouped ranks instead of unique ones.
    fn tr_partial_copy(&mut self, isa: i32, first: i32, a: i32, b: i32, last: i32, depth: i32) {
        let v = b - 1;
        let mut last_rank = -1;
        let mut new_rank = -1;
        let mut d = a - 1;
        let mut c = first;

        while c <= d {
            let s = self.get(c) - depth;

            if s >= 0 && self.get(isa + s) == v {
                d += 1;
                self.set(d, s);
                let rank = self.get(isa + s + depth);

                if last_rank != rank {
                    last_rank = rank;
                    new_rank = d;
                }

                self.set(isa + s, new_rank);
            }

            c += 1;
        }

        last_rank = -1;
        let mut e = d;

        while e >= first {
            let rank = self.get(isa + self.get(e));

            if last_rank != rank {
                last_rank = rank;
                new_rank = e;
            }

            if new_rank != rank {
                let s = self.get(e);
                self.set(isa + s, new_rank);
            }

            e -= 1;
        }

        last_rank = -1;
        let e = d + 1;
        d = b;
        let mut c = last - 1;

        while d > e {
            let s = self.get(c) - depth;

            if s >= 0 && self.get(isa + s) == v {
                d -= 1;
                self.set(d, s);
                let rank = self.get(isa + s + depth);

                if last_rank != rank {
                    last_rank = rank;
                    new_rank = d;
                }

                self.set(isa + s, new_rank);
            }

            c -= 1;
        }
    }
}
