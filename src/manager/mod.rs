//! Manager exposure
//!
//! Two traits connect models, managers and querysets:
//!
//! - [`QuerySetMethods`] is implemented by every queryset type. It names
//!   the public queryset operations and provides them all on top of two
//!   plumbing methods, so a custom queryset only wraps a [`QuerySet`] and
//!   overrides what it needs (typically [`QuerySetMethods::pre_filter`]).
//! - [`ManagerMethods`] is implemented by every manager type. It forwards
//!   each public operation to a fresh queryset from `get_queryset`. A
//!   manager that defines its own version of an operation overrides the
//!   provided one, and its definition wins.
//!
//! Plumbing (`from_queryset`, `as_queryset`), the `pre_filter` hook and
//! `as_manager` stay on the queryset side and are never forwarded.
//!
//! Methods a custom queryset adds on top are forwarded with
//! [`manager_methods!`](crate::manager_methods), which declares an
//! extension trait implemented by every manager of that queryset type:
//!
//! ```ignore
//! manager_methods! {
//!     pub trait RecentManager for RecentQuerySet {
//!         fn recent(&self, n: usize) -> RecentQuerySet;
//!     }
//! }
//!
//! let latest = manager.recent(5).to_vec()?;
//! ```

use std::fmt;
use std::marker::PhantomData;

use serde_json::Value;

use crate::cursor::Cursor;
use crate::model::{AttributeDef, Model};
use crate::predicate::Lookup;
use crate::queryset::{at_most_one, exactly_one, ExecutionIter, QueryResult, QuerySet};
use crate::store::{QueryContext, SecondaryIndex, Table};

/// Model type of a queryset type
pub type ModelOf<Q> = <Q as QuerySetMethods>::Model;

/// Manager built on the plain queryset
pub type DefaultManager<M> = Manager<QuerySet<M>>;

/// Interface every queryset type exposes
pub trait QuerySetMethods: Sized + Clone + Send + Sync {
    type Model: Model;

    /// Wrap a base queryset
    fn from_queryset(queryset: QuerySet<Self::Model>) -> Self;

    /// The wrapped base queryset
    fn as_queryset(&self) -> &QuerySet<Self::Model>;

    /// Runs for every lookup after the field is resolved and before the
    /// condition is built. Returning an error rejects the lookup.
    fn pre_filter(&self, attribute: &AttributeDef, lookup: Lookup, value: &Value) -> QueryResult<()> {
        let _ = (attribute, lookup, value);
        Ok(())
    }

    /// Manager whose querysets are of this type
    fn as_manager(table: Table<Self::Model>) -> Manager<Self> {
        Manager::from_queryset(table, None)
    }

    fn set_limit(&self, limit: usize) -> Self {
        Self::from_queryset(self.as_queryset().set_limit(limit))
    }

    fn set_cursor(&self, cursor: impl Into<Option<Cursor>>) -> Self {
        Self::from_queryset(self.as_queryset().set_cursor(cursor))
    }

    fn set_index(&self, index: impl Into<Option<SecondaryIndex<Self::Model>>>) -> Self {
        Self::from_queryset(self.as_queryset().set_index(index))
    }

    fn set_hash_key(&self, hash_key: impl Into<Value>) -> Self {
        Self::from_queryset(self.as_queryset().set_hash_key(hash_key))
    }

    fn set_scan_forward(&self, scan_forward: bool) -> Self {
        Self::from_queryset(self.as_queryset().set_scan_forward(scan_forward))
    }

    fn with_context(&self, context: QueryContext) -> Self {
        Self::from_queryset(self.as_queryset().with_context(context))
    }

    fn none(&self) -> Self {
        Self::from_queryset(self.as_queryset().none())
    }

    fn filter(&self, lookup: &str, value: impl Into<Value>) -> QueryResult<Self> {
        let queryset = self
            .as_queryset()
            .filter_hooked(lookup, value.into(), |attribute, lookup, value| {
                self.pre_filter(attribute, lookup, value)
            })?;
        Ok(Self::from_queryset(queryset))
    }

    fn filter_args<I, K>(&self, args: I) -> QueryResult<Self>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let (lookup, value) = exactly_one(args)?;
        self.filter(lookup.as_ref(), value)
    }

    fn first(&self) -> QueryResult<Option<Self::Model>> {
        self.as_queryset().first()
    }

    fn last(&self) -> QueryResult<Option<Self::Model>> {
        self.as_queryset().last()
    }

    fn exists(&self) -> QueryResult<bool> {
        self.as_queryset().exists()
    }

    fn get(&self) -> QueryResult<Self::Model> {
        self.as_queryset().get()
    }

    fn get_by(&self, lookup: &str, value: impl Into<Value>) -> QueryResult<Self::Model> {
        self.filter(lookup, value)?.get()
    }

    fn get_args<I, K>(&self, args: I) -> QueryResult<Self::Model>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        match at_most_one(args)? {
            Some((lookup, value)) => self.get_by(lookup.as_ref(), value),
            None => self.get(),
        }
    }

    fn count(&self) -> QueryResult<u64> {
        self.as_queryset().count()
    }

    fn next_cursor(&self) -> QueryResult<Option<Cursor>> {
        self.as_queryset().next_cursor()
    }

    fn delete(&self) -> QueryResult<usize> {
        self.as_queryset().delete()
    }

    fn iter(&self) -> QueryResult<ExecutionIter<Self::Model>> {
        self.as_queryset().iter()
    }

    fn to_vec(&self) -> QueryResult<Vec<Self::Model>> {
        self.as_queryset().to_vec()
    }
}

impl<M: Model> QuerySetMethods for QuerySet<M> {
    type Model = M;

    fn from_queryset(queryset: QuerySet<M>) -> Self {
        queryset
    }

    fn as_queryset(&self) -> &QuerySet<M> {
        self
    }
}

/// Interface every manager type exposes
pub trait ManagerMethods {
    type QuerySet: QuerySetMethods;

    /// A fresh queryset, pre-scoped to the manager's index if it has one
    fn get_queryset(&self) -> Self::QuerySet;

    fn set_limit(&self, limit: usize) -> Self::QuerySet {
        self.get_queryset().set_limit(limit)
    }

    fn set_cursor(&self, cursor: impl Into<Option<Cursor>>) -> Self::QuerySet {
        self.get_queryset().set_cursor(cursor)
    }

    fn set_index(
        &self,
        index: impl Into<Option<SecondaryIndex<ModelOf<Self::QuerySet>>>>,
    ) -> Self::QuerySet {
        self.get_queryset().set_index(index)
    }

    fn set_hash_key(&self, hash_key: impl Into<Value>) -> Self::QuerySet {
        self.get_queryset().set_hash_key(hash_key)
    }

    fn set_scan_forward(&self, scan_forward: bool) -> Self::QuerySet {
        self.get_queryset().set_scan_forward(scan_forward)
    }

    fn with_context(&self, context: QueryContext) -> Self::QuerySet {
        self.get_queryset().with_context(context)
    }

    fn none(&self) -> Self::QuerySet {
        self.get_queryset().none()
    }

    fn filter(&self, lookup: &str, value: impl Into<Value>) -> QueryResult<Self::QuerySet> {
        self.get_queryset().filter(lookup, value)
    }

    fn filter_args<I, K>(&self, args: I) -> QueryResult<Self::QuerySet>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        self.get_queryset().filter_args(args)
    }

    fn first(&self) -> QueryResult<Option<ModelOf<Self::QuerySet>>> {
        self.get_queryset().first()
    }

    fn last(&self) -> QueryResult<Option<ModelOf<Self::QuerySet>>> {
        self.get_queryset().last()
    }

    fn exists(&self) -> QueryResult<bool> {
        self.get_queryset().exists()
    }

    fn get(&self) -> QueryResult<ModelOf<Self::QuerySet>> {
        self.get_queryset().get()
    }

    fn get_by(&self, lookup: &str, value: impl Into<Value>) -> QueryResult<ModelOf<Self::QuerySet>> {
        self.get_queryset().get_by(lookup, value)
    }

    fn get_args<I, K>(&self, args: I) -> QueryResult<ModelOf<Self::QuerySet>>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        self.get_queryset().get_args(args)
    }

    fn count(&self) -> QueryResult<u64> {
        self.get_queryset().count()
    }

    fn next_cursor(&self) -> QueryResult<Option<Cursor>> {
        self.get_queryset().next_cursor()
    }

    fn delete(&self) -> QueryResult<usize> {
        self.get_queryset().delete()
    }

    fn iter(&self) -> QueryResult<ExecutionIter<ModelOf<Self::QuerySet>>> {
        self.get_queryset().iter()
    }

    fn to_vec(&self) -> QueryResult<Vec<ModelOf<Self::QuerySet>>> {
        self.get_queryset().to_vec()
    }
}

/// Declares a trait forwarding custom queryset methods from every manager
///
/// Each listed method becomes a provided method calling the queryset
/// method of the same name on `get_queryset()`. The trait is implemented
/// for every [`ManagerMethods`] type whose queryset is the named type, so
/// both [`Manager`] and hand-written managers pick it up.
#[macro_export]
macro_rules! manager_methods {
    (
        $(#[$attr:meta])*
        $vis:vis trait $name:ident for $queryset:ty {
            $(
                $(#[$method_attr:meta])*
                fn $method:ident(&self $(, $arg:ident: $arg_ty:ty)* $(,)?) -> $ret:ty;
            )*
        }
    ) => {
        $(#[$attr])*
        $vis trait $name: $crate::manager::ManagerMethods<QuerySet = $queryset> {
            $(
                $(#[$method_attr])*
                fn $method(&self $(, $arg: $arg_ty)*) -> $ret {
                    $crate::manager::ManagerMethods::get_queryset(self).$method($($arg),*)
                }
            )*
        }

        impl<T> $name for T where T: $crate::manager::ManagerMethods<QuerySet = $queryset> {}
    };
}

/// Stateless queryset factory bound to one table, and optionally one index
pub struct Manager<Q: QuerySetMethods> {
    table: Table<Q::Model>,
    index: Option<SecondaryIndex<Q::Model>>,
    _queryset: PhantomData<fn() -> Q>,
}

impl<Q: QuerySetMethods> Manager<Q> {
    /// Manager producing `Q` querysets, scoped to `index` when given
    pub fn from_queryset(table: Table<Q::Model>, index: Option<SecondaryIndex<Q::Model>>) -> Self {
        Self {
            table,
            index,
            _queryset: PhantomData,
        }
    }

    pub fn table(&self) -> &Table<Q::Model> {
        &self.table
    }

    pub fn index(&self) -> Option<&SecondaryIndex<Q::Model>> {
        self.index.as_ref()
    }
}

impl<M: Model> Manager<QuerySet<M>> {
    pub fn new(table: Table<M>) -> Self {
        Self::from_queryset(table, None)
    }

    /// Manager whose querysets read `index`
    pub fn for_index(index: SecondaryIndex<M>) -> Self {
        Self::from_queryset(index.table().clone(), Some(index))
    }
}

impl<Q: QuerySetMethods> ManagerMethods for Manager<Q> {
    type QuerySet = Q;

    fn get_queryset(&self) -> Q {
        let queryset = QuerySet::new(self.table.clone());
        match &self.index {
            Some(index) => Q::from_queryset(queryset.set_index(index.clone())),
            None => Q::from_queryset(queryset),
        }
    }
}

impl<Q: QuerySetMethods> Clone for Manager<Q> {
    fn clone(&self) -> Self {
        Self::from_queryset(self.table.clone(), self.index.clone())
    }
}

impl<Q: QuerySetMethods> fmt::Debug for Manager<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("table", &self.table.name())
            .field("index", &self.index.as_ref().map(|i| i.name().to_string()))
            .finish()
    }
}

impl<M: Model> Table<M> {
    /// The default manager
    pub fn objects(&self) -> DefaultManager<M> {
        DefaultManager::new(self.clone())
    }

    /// Default manager scoped to a declared secondary index
    pub fn index_manager(&self, name: &str) -> Option<DefaultManager<M>> {
        self.index(name).map(DefaultManager::for_index)
    }
}
