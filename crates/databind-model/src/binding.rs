//! Data bindings: descriptors of which value to fetch from a row.
//!
//! A binding names its desired [`ValueType`] plus an optional case-insensitive
//! `path` and an optional positional `index`. Data sets decide which of the
//! two lookup styles they support.
//!
//! Bindings come in two shapes:
//!
//! - [`DataBinding::Plain`] is what callers construct.
//! - [`DataBinding::Resolved`] is produced by an aggregate when it scopes a
//!   binding to one of its members. It remembers the owning aggregate, the
//!   member position and the binding to present to that member, while
//!   reporting the externally visible index.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::value::ValueType;

/// Identity of an aggregate that issues resolved bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(u64);

impl OwnerId {
    /// Allocate a fresh identity.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        OwnerId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainBinding {
    value_type: ValueType,
    path: Option<String>,
    index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBinding {
    owner: OwnerId,
    member_index: usize,
    inner: Box<DataBinding>,
    external_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataBinding {
    Plain(PlainBinding),
    Resolved(ResolvedBinding),
}

impl DataBinding {
    pub fn new(value_type: ValueType, path: Option<String>, index: Option<usize>) -> Self {
        DataBinding::Plain(PlainBinding {
            value_type,
            path,
            index,
        })
    }

    /// A binding with neither path nor index.
    pub fn unbound() -> Self {
        Self::new(ValueType::Any, None, None)
    }

    /// A positional binding of type `Any`.
    pub fn for_index(index: usize) -> Self {
        Self::new(ValueType::Any, None, Some(index))
    }

    /// A named binding of type `Any`.
    pub fn for_path(path: impl Into<String>) -> Self {
        Self::new(ValueType::Any, Some(path.into()), None)
    }

    /// Scope `inner` to member `member_index` of the aggregate `owner`.
    pub fn resolved(
        owner: OwnerId,
        member_index: usize,
        inner: DataBinding,
        external_index: Option<usize>,
    ) -> Self {
        DataBinding::Resolved(ResolvedBinding::new(
            owner,
            member_index,
            inner,
            external_index,
        ))
    }

    /// Returns a copy with a different value type.
    #[must_use]
    pub fn with_value_type(self, value_type: ValueType) -> Self {
        match self {
            DataBinding::Plain(plain) => DataBinding::Plain(PlainBinding {
                value_type,
                ..plain
            }),
            DataBinding::Resolved(mut resolved) => {
                let inner = std::mem::replace(&mut *resolved.inner, DataBinding::unbound());
                *resolved.inner = inner.with_value_type(value_type);
                DataBinding::Resolved(resolved)
            }
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            DataBinding::Plain(plain) => plain.value_type,
            DataBinding::Resolved(resolved) => resolved.inner.value_type(),
        }
    }

    pub fn path(&self) -> Option<&str> {
        match self {
            DataBinding::Plain(plain) => plain.path.as_deref(),
            DataBinding::Resolved(resolved) => resolved.inner.path(),
        }
    }

    /// The positional index; for resolved bindings, the external index.
    pub fn index(&self) -> Option<usize> {
        match self {
            DataBinding::Plain(plain) => plain.index,
            DataBinding::Resolved(resolved) => resolved.external_index,
        }
    }

    /// Returns a copy that differs only in its index.
    #[must_use]
    pub fn replace_index(&self, index: Option<usize>) -> Self {
        match self {
            DataBinding::Plain(plain) => DataBinding::Plain(PlainBinding {
                index,
                ..plain.clone()
            }),
            DataBinding::Resolved(resolved) => DataBinding::Resolved(ResolvedBinding {
                external_index: index,
                ..resolved.clone()
            }),
        }
    }

    pub fn as_resolved(&self) -> Option<&ResolvedBinding> {
        match self {
            DataBinding::Resolved(resolved) => Some(resolved),
            DataBinding::Plain(_) => None,
        }
    }
}

impl ResolvedBinding {
    pub fn new(
        owner: OwnerId,
        member_index: usize,
        inner: DataBinding,
        external_index: Option<usize>,
    ) -> Self {
        Self {
            owner,
            member_index,
            inner: Box::new(inner),
            external_index,
        }
    }

    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    pub fn member_index(&self) -> usize {
        self.member_index
    }

    /// The binding presented to the member data set.
    pub fn inner(&self) -> &DataBinding {
        &self.inner
    }

    pub fn external_index(&self) -> Option<usize> {
        self.external_index
    }

    pub fn is_owned_by(&self, owner: OwnerId) -> bool {
        self.owner == owner
    }
}

impl From<ResolvedBinding> for DataBinding {
    fn from(resolved: ResolvedBinding) -> Self {
        DataBinding::Resolved(resolved)
    }
}

impl fmt::Display for DataBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        match (self.path(), self.index()) {
            (Some(path), Some(index)) => write!(f, "path: '{path}', index: {index}")?,
            (Some(path), None) => write!(f, "path: '{path}'")?,
            (None, Some(index)) => write!(f, "index: {index}")?,
            (None, None) => write!(f, "unbound")?,
        }
        write!(f, ", type: {}}}", self.value_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_index_is_a_value_law() {
        let binding = DataBinding::new(ValueType::Int, Some("Name".into()), None);
        let round = binding.replace_index(Some(4)).replace_index(None);
        assert_eq!(round.value_type(), ValueType::Int);
        assert_eq!(round.path(), Some("Name"));
        assert_eq!(round.index(), None);
        assert_eq!(round, binding);
    }

    #[test]
    fn resolved_binding_reports_inner_path_and_external_index() {
        let owner = OwnerId::next();
        let inner = DataBinding::new(ValueType::Text, Some("path".into()), Some(1));
        let resolved = DataBinding::resolved(owner, 1, inner.clone(), Some(3));
        assert_eq!(resolved.path(), Some("path"));
        assert_eq!(resolved.index(), Some(3));
        assert_eq!(resolved.value_type(), ValueType::Text);

        let replaced = resolved.replace_index(Some(5));
        let scoped = replaced.as_resolved().expect("still resolved");
        assert_eq!(scoped.external_index(), Some(5));
        assert_eq!(scoped.inner(), &inner);
        assert!(scoped.is_owned_by(owner));
        assert!(!scoped.is_owned_by(OwnerId::next()));
    }

    #[test]
    fn with_value_type_reaches_inner_binding() {
        let resolved = DataBinding::resolved(OwnerId::next(), 0, DataBinding::for_index(0), None);
        let typed = resolved.with_value_type(ValueType::Float);
        assert_eq!(typed.value_type(), ValueType::Float);
        assert!(typed.as_resolved().is_some());
    }

    #[test]
    fn display_describes_lookup_style() {
        assert_eq!(DataBinding::for_index(2).to_string(), "{index: 2, type: any}");
        assert_eq!(DataBinding::unbound().to_string(), "{unbound, type: any}");
    }
}
