//! Per-model options
//!
//! Options a model declares alongside its schema. A model derived from
//! another passes the parent's options to `inherit`, which fills every
//! unset value except `abstract_model` and `proxy`.

use serde::{Deserialize, Serialize};

use crate::config::BillingMode;

/// Options declared by a model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOptions {
    /// Abstract models only exist to be inherited from
    #[serde(default, rename = "abstract")]
    pub abstract_model: bool,

    /// Proxy models share another model's table
    #[serde(default)]
    pub proxy: bool,

    #[serde(default)]
    pub billing_mode: Option<BillingMode>,

    #[serde(default)]
    pub read_capacity_units: Option<u64>,

    #[serde(default)]
    pub write_capacity_units: Option<u64>,
}

impl ModelOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for an abstract base model
    pub fn abstract_base() -> Self {
        Self {
            abstract_model: true,
            ..Self::default()
        }
    }

    /// Options for a proxy model
    pub fn proxy() -> Self {
        Self {
            proxy: true,
            ..Self::default()
        }
    }

    pub fn with_billing_mode(mut self, mode: BillingMode) -> Self {
        self.billing_mode = Some(mode);
        self
    }

    pub fn with_capacity(mut self, read: u64, write: u64) -> Self {
        self.read_capacity_units = Some(read);
        self.write_capacity_units = Some(write);
        self
    }

    /// Fill unset values from a parent model's options
    pub fn inherit(mut self, parent: &ModelOptions) -> Self {
        if self.billing_mode.is_none() {
            self.billing_mode = parent.billing_mode;
        }
        if self.read_capacity_units.is_none() {
            self.read_capacity_units = parent.read_capacity_units;
        }
        if self.write_capacity_units.is_none() {
            self.write_capacity_units = parent.write_capacity_units;
        }
        self
    }

    /// Returns true if the model owns a table of its own
    pub fn is_concrete(&self) -> bool {
        !self.abstract_model && !self.proxy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inherit_fills_unset_values() {
        let parent = ModelOptions::abstract_base()
            .with_billing_mode(BillingMode::Provisioned)
            .with_capacity(5, 5);

        let child = ModelOptions::new().with_capacity(10, 2).inherit(&parent);

        assert_eq!(child.billing_mode, Some(BillingMode::Provisioned));
        assert_eq!(child.read_capacity_units, Some(10));
        assert_eq!(child.write_capacity_units, Some(2));
    }

    #[test]
    fn test_inherit_never_copies_abstract_or_proxy() {
        let child = ModelOptions::new().inherit(&ModelOptions::abstract_base());
        assert!(!child.abstract_model);
        assert!(child.is_concrete());

        let child = ModelOptions::new().inherit(&ModelOptions::proxy());
        assert!(!child.proxy);
    }
}
