use std::fmt;

/// Key comparison capability used by [Index].
///
/// `less` must be a strict weak ordering. Two keys are treated as equal
/// when neither is less than the other.
///
/// [Index]: crate::rbt::Index
pub trait Compare<K: ?Sized> {
    fn less(&self, a: &K, b: &K) -> bool;

    #[inline]
    fn equiv(&self, a: &K, b: &K) -> bool {
        !self.less(a, b) && !self.less(b, a)
    }
}

/// Ascending order, as defined by `Ord`.
#[derive(Clone, Copy, Default, Debug)]
pub struct Natural;

impl<K: Ord + ?Sized> Compare<K> for Natural {
    #[inline]
    fn less(&self, a: &K, b: &K) -> bool {
        a < b
    }
}

/// Descending order, as defined by `Ord`.
#[derive(Clone, Copy, Default, Debug)]
pub struct Reverse;

impl<K: Ord + ?Sized> Compare<K> for Reverse {
    #[inline]
    fn less(&self, a: &K, b: &K) -> bool {
        b < a
    }
}

/// Order keys using a less-than closure.
#[derive(Clone, Copy, Default)]
pub struct LessFn<F>(pub F);

impl<F> fmt::Debug for LessFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "LessFn")
    }
}

impl<K, F> Compare<K> for LessFn<F>
where
    F: Fn(&K, &K) -> bool,
{
    #[inline]
    fn less(&self, a: &K, b: &K) -> bool {
        (self.0)(a, b)
    }
}
