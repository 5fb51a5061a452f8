//! Strongly typed row ids and genomic scalars.
//!
//! Every id is a distinct `#[repr(transparent)]` wrapper around `i64` so
//! that, say, a [`NodeId`] can never be passed where an [`EdgeId`] is
//! expected, even though both are "just an integer" underneath. `Time`
//! and `Position` get the same treatment for `f64`.

use crate::error::TsinferError;

macro_rules! impl_id_traits {
    ($name: ident) => {
        impl $name {
            /// Sentinel for "no such id".
            pub const NULL: $name = $name(-1);

            /// `true` if this id is [`Self::NULL`].
            pub fn is_null(&self) -> bool {
                *self == Self::NULL
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::NULL
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl From<usize> for $name {
            fn from(value: usize) -> Self {
                Self(value as i64)
            }
        }

        impl TryFrom<$name> for usize {
            type Error = TsinferError;

            fn try_from(value: $name) -> Result<Self, Self::Error> {
                usize::try_from(value.0)
                    .map_err(|_| TsinferError::bad_param(format!("{value} has no usize representation")))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                if self.is_null() {
                    write!(f, "NULL")
                } else {
                    write!(f, "{}", self.0)
                }
            }
        }

        impl PartialEq<i64> for $name {
            fn eq(&self, other: &i64) -> bool {
                self.0 == *other
            }
        }

        impl PartialOrd<i64> for $name {
            fn partial_cmp(&self, other: &i64) -> Option<std::cmp::Ordering> {
                self.0.partial_cmp(other)
            }
        }
    };
}

/// A row id into the (conceptual) node table.
///
/// Node `0` is reserved as the virtual root: its time is treated as
/// `+∞` and every sample ultimately copies from some descendant of it.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(i64);

/// A row id into the (conceptual) edge table.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct EdgeId(i64);

/// A site index `s ∈ [0, S)`.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SiteId(i64);

/// A row id into a site's mutation list.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MutationId(i64);

impl_id_traits!(NodeId);
impl_id_traits!(EdgeId);
impl_id_traits!(SiteId);
impl_id_traits!(MutationId);

impl NodeId {
    /// The virtual root, always present and always node `0`.
    pub const VIRTUAL_ROOT: NodeId = NodeId(0);
}

macro_rules! impl_f64_newtype {
    ($name: ident) => {
        impl From<f64> for $name {
            fn from(value: f64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for f64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl PartialEq<f64> for $name {
            fn eq(&self, other: &f64) -> bool {
                self.0 == *other
            }
        }

        impl PartialOrd<f64> for $name {
            fn partial_cmp(&self, other: &f64) -> Option<std::cmp::Ordering> {
                self.0.partial_cmp(other)
            }
        }
    };
}

/// Node age. Non-increasing from older to younger along a lineage;
/// the virtual root's time is conceptually `+∞`.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct Time(f64);

/// A physical genomic position, i.e. `position[s]`, distinct from the
/// discrete site index used by edge intervals.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct Position(f64);

impl_f64_newtype!(Time);
impl_f64_newtype!(Position);

impl Time {
    pub const INFINITY: Time = Time(f64::INFINITY);

    /// A total order over times, used only where an ordered container
    /// needs one (e.g. the edge indices' sort keys); `NaN` never arises
    /// in practice since all times originate from finite sample ages or
    /// midpoints of finite times.
    pub(crate) fn ordering_key(&self) -> ordered_float::OrderedFloat<f64> {
        ordered_float::OrderedFloat(self.0)
    }
}

impl Position {
    pub(crate) fn ordering_key(&self) -> ordered_float::OrderedFloat<f64> {
        ordered_float::OrderedFloat(self.0)
    }
}
