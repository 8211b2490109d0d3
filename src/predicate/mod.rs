//! Predicate translation for dynaquery
//!
//! Maps a `field, operator, value` triple to a store-native `Condition`.
//!
//! # Lookup syntax
//!
//! - `number` / `number__eq`: equality
//! - `number__not`: inequality
//! - `number__lt`, `__lte`, `__gt`, `__gte`: ordering
//! - `number__between`: inclusive `[low, high]`
//! - `string__in`: membership in an array
//! - `string__exists`: presence (`true`) or absence (`false`)
//! - `string__startswith`, `string__contains`

mod ast;
pub mod compare;
mod errors;
mod translator;

pub use ast::{Condition, ConditionOp, Lookup, LOOKUP_SEPARATOR};
pub use errors::{PredicateError, PredicateResult};
pub use translator::{FieldLookup, Translator};
