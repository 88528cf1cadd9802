use std::cmp::Reverse;

/// Strict total order used by the containers in this workspace.
///
/// - `less` must be irreflexive and transitive.
/// - Two values where neither is `less` than the other are treated as equal keys.
pub trait Comparable {
    fn less(&self, other: &Self) -> bool;
}

macro_rules! impl_comparable_ord {
    ($($t:ty),* $(,)?) => {
        $(
            impl Comparable for $t {
                #[inline]
                fn less(&self, other: &Self) -> bool {
                    self < other
                }
            }
        )*
    };
}

impl_comparable_ord!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, bool, char, str, String,
);

impl<T: Comparable + ?Sized> Comparable for &T {
    #[inline]
    fn less(&self, other: &Self) -> bool {
        T::less(*self, *other)
    }
}

impl<T: Comparable + ?Sized> Comparable for Box<T> {
    #[inline]
    fn less(&self, other: &Self) -> bool {
        T::less(self, other)
    }
}

impl<T: Comparable> Comparable for Reverse<T> {
    #[inline]
    fn less(&self, other: &Self) -> bool {
        other.0.less(&self.0)
    }
}

macro_rules! impl_comparable_tuple {
    ($(($($name:ident $idx:tt),+)),* $(,)?) => {
        $(
            impl<$($name: Comparable),+> Comparable for ($($name,)+) {
                #[inline]
                fn less(&self, other: &Self) -> bool {
                    $(
                        if self.$idx.less(&other.$idx) {
                            return true;
                        }
                        if other.$idx.less(&self.$idx) {
                            return false;
                        }
                    )+
                    false
                }
            }
        )*
    };
}

impl_comparable_tuple!(
    (A 0),
    (A 0, B 1),
    (A 0, B 1, C 2),
    (A 0, B 1, C 2, D 3),
);

/// `true` when neither value orders before the other.
#[inline]
pub fn equivalent<T: Comparable + ?Sized>(a: &T, b: &T) -> bool {
    !a.less(b) && !b.less(a)
}
