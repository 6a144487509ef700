//! Sequence comparison over anything iterable.
//!
//! These back the relational operators of every container in the crate,
//! and accept cursor ranges through [`walk`](crate::cursor::walk).

use std::cmp::Ordering;

/// Whether `a` and `b` agree element-wise over the length of `a`.
///
/// `b` may be longer than `a`; a shorter `b` compares unequal.
pub fn equal<I, J>(a: I, b: J) -> bool
where
    I: IntoIterator,
    J: IntoIterator,
    I::Item: PartialEq<J::Item>,
{
    equal_by(a, b, |x, y| x == y)
}

/// [`equal`] with a caller-supplied predicate.
pub fn equal_by<I, J, F>(a: I, b: J, mut pred: F) -> bool
where
    I: IntoIterator,
    J: IntoIterator,
    F: FnMut(I::Item, J::Item) -> bool,
{
    let mut b = b.into_iter();
    for x in a {
        let Some(y) = b.next() else {
            return false;
        };
        if !pred(x, y) {
            return false;
        }
    }
    true
}

/// Whether `a` sorts strictly before `b` in dictionary order.
pub fn lexicographical_compare<T, I, J>(a: I, b: J) -> bool
where
    T: PartialOrd,
    I: IntoIterator<Item = T>,
    J: IntoIterator<Item = T>,
{
    lexicographical_compare_by(a, b, |x, y| x < y)
}

/// [`lexicographical_compare`] under a strict weak order `less`.
pub fn lexicographical_compare_by<T, I, J, F>(a: I, b: J, mut less: F) -> bool
where
    I: IntoIterator<Item = T>,
    J: IntoIterator<Item = T>,
    F: FnMut(&T, &T) -> bool,
{
    let mut b = b.into_iter();
    for x in a {
        let Some(y) = b.next() else {
            return false;
        };
        if less(&x, &y) {
            return true;
        }
        if less(&y, &x) {
            return false;
        }
    }
    b.next().is_some()
}

/// Three-way dictionary order in a single pass. `None` as soon as a pair
/// of elements is unordered.
pub fn lexicographical_partial_cmp<T, I, J>(a: I, b: J) -> Option<Ordering>
where
    T: PartialOrd,
    I: IntoIterator<Item = T>,
    J: IntoIterator<Item = T>,
{
    lexicographical_cmp_by(a, b, |x, y| x.partial_cmp(y))
}

/// [`lexicographical_partial_cmp`] for totally ordered elements.
pub fn lexicographical_cmp<T, I, J>(a: I, b: J) -> Ordering
where
    T: Ord,
    I: IntoIterator<Item = T>,
    J: IntoIterator<Item = T>,
{
    let mut b = b.into_iter();
    for x in a {
        let Some(y) = b.next() else {
            return Ordering::Greater;
        };
        match x.cmp(&y) {
            Ordering::Equal => {}
            ord => return ord,
        }
    }
    if b.next().is_some() {
        Ordering::Less
    } else {
        Ordering::Equal
    }
}

fn lexicographical_cmp_by<T, I, J, F>(a: I, b: J, mut cmp: F) -> Option<Ordering>
where
    I: IntoIterator<Item = T>,
    J: IntoIterator<Item = T>,
    F: FnMut(&T, &T) -> Option<Ordering>,
{
    let mut b = b.into_iter();
    for x in a {
        let Some(y) = b.next() else {
            return Some(Ordering::Greater);
        };
        match cmp(&x, &y) {
            Some(Ordering::Equal) => {}
            ord => return ord,
        }
    }
    if b.next().is_some() {
        Some(Ordering::Less)
    } else {
        Some(Ordering::Equal)
    }
}
