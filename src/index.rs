//! Typed dense indices for interned entities.
//!
//! A [`TypedIndex`] is a `usize` tagged with the kind of entity it refers
//! to, so a teacher index cannot be passed where a class index is expected.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Names the entity kind of a [`TypedIndex`].
pub trait IndexTag {
    const NAME: &'static str;
}

/// A `usize` index tagged with an entity kind.
#[repr(transparent)]
pub struct TypedIndex<T> {
    index: usize,
    _marker: PhantomData<T>,
}

impl<T> TypedIndex<T> {
    #[inline]
    pub const fn new(index: usize) -> Self {
        Self {
            index,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub const fn get(self) -> usize {
        self.index
    }
}

// Derives would add bounds on `T`.
impl<T> Clone for TypedIndex<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TypedIndex<T> {}

impl<T> PartialEq for TypedIndex<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for TypedIndex<T> {}

impl<T> PartialOrd for TypedIndex<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for TypedIndex<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.index.cmp(&other.index)
    }
}

impl<T> Hash for TypedIndex<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T: IndexTag> fmt::Debug for TypedIndex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", T::NAME, self.index)
    }
}

impl<T: IndexTag> fmt::Display for TypedIndex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", T::NAME, self.index)
    }
}

macro_rules! index_tag {
    ($tag:ident, $alias:ident, $name:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $tag;

        impl IndexTag for $tag {
            const NAME: &'static str = $name;
        }

        pub type $alias = TypedIndex<$tag>;
    };
}

index_tag!(TeacherTag, TeacherKey, "Teacher");
index_tag!(ClassTag, ClassKey, "Class");
index_tag!(SubjectTag, SubjectKey, "Subject");
index_tag!(SlotTag, SlotKey, "Slot");
