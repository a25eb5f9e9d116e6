//! Descriptor validation and defaults

use crate::config::{CatalogConfig, DefaultLazyLoadingOptions};
use crate::lazy::descriptor::QueryDescriptor;
use std::collections::BTreeMap;

/// Failure message returned to callers whose descriptor lacks paging
pub const INVALID_DESCRIPTOR_MESSAGE: &str =
    "Parameters for lazy loading are not valid. Obligatory parameters are: First, Rows";

/// Checks that a descriptor can drive a listing and normalizes it
#[derive(Debug, Clone, Default)]
pub struct QueryDescriptorValidator {
    legacy_global_filter_keys: bool,
}

impl QueryDescriptorValidator {
    pub fn new(legacy_global_filter_keys: bool) -> Self {
        Self {
            legacy_global_filter_keys,
        }
    }

    pub fn from_config(config: &CatalogConfig) -> Self {
        Self::new(config.legacy_global_filter_keys)
    }

    /// `false` for an absent descriptor or one missing `first` or `rows`.
    ///
    /// A valid descriptor leaves with `filters`, `global_filters` and
    /// `multi_sort` set (empty when the client sent none).
    pub fn is_valid(&self, descriptor: Option<&mut QueryDescriptor>) -> bool {
        let Some(descriptor) = descriptor else {
            return false;
        };
        if descriptor.first.is_none() || descriptor.rows.is_none() {
            return false;
        }

        descriptor.filters.get_or_insert_with(BTreeMap::new);
        descriptor.global_filters.get_or_insert_with(BTreeMap::new);
        descriptor.multi_sort.get_or_insert_with(Vec::new);
        if self.legacy_global_filter_keys {
            descriptor.apply_legacy_global_keys();
        }
        true
    }
}

/// Supplies the descriptor used when a client sends none
#[derive(Debug, Clone, Default)]
pub struct DefaultDescriptorProvider {
    options: DefaultLazyLoadingOptions,
}

impl DefaultDescriptorProvider {
    pub fn new(options: DefaultLazyLoadingOptions) -> Self {
        Self { options }
    }

    pub fn from_config(config: &CatalogConfig) -> Self {
        Self::new(config.lazy_loading.clone())
    }

    pub fn default_descriptor(&self) -> QueryDescriptor {
        QueryDescriptor {
            first: Some(self.options.first),
            rows: Some(self.options.rows),
            sort_field: Some(self.options.sort_field.clone()),
            sort_order: self.options.sort_order,
            multi_sort: Some(Vec::new()),
            filters: Some(BTreeMap::new()),
            global_filters: Some(BTreeMap::new()),
            ..QueryDescriptor::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lazy::descriptor::{FilterScope, FilterSpec, MatchMode};

    #[test]
    fn absent_descriptor_is_invalid() {
        assert!(!QueryDescriptorValidator::default().is_valid(None));
    }

    #[test]
    fn missing_first_or_rows_is_invalid() {
        let validator = QueryDescriptorValidator::default();

        let mut no_rows = QueryDescriptor {
            first: Some(0),
            ..QueryDescriptor::default()
        };
        let mut no_first = QueryDescriptor {
            rows: Some(10),
            ..QueryDescriptor::default()
        };
        let mut neither = QueryDescriptor::default();

        assert!(!validator.is_valid(Some(&mut no_rows)));
        assert!(!validator.is_valid(Some(&mut no_first)));
        assert!(!validator.is_valid(Some(&mut neither)));
    }

    #[test]
    fn valid_descriptor_gets_empty_collections() {
        let mut descriptor = QueryDescriptor::page(0, 10);
        assert!(QueryDescriptorValidator::default().is_valid(Some(&mut descriptor)));
        assert_eq!(descriptor.filters, Some(BTreeMap::new()));
        assert_eq!(descriptor.multi_sort, Some(Vec::new()));
    }

    #[test]
    fn legacy_keys_are_rewritten_only_when_enabled() {
        let make = || {
            QueryDescriptor::page(0, 10)
                .with_filter("name_global", FilterSpec::local("bolt", MatchMode::Contains))
        };

        let mut plain = make();
        assert!(QueryDescriptorValidator::new(false).is_valid(Some(&mut plain)));
        assert!(plain.filters.unwrap().contains_key("name_global"));
        assert_eq!(plain.global_filters, Some(BTreeMap::new()));

        let mut legacy = make();
        assert!(QueryDescriptorValidator::new(true).is_valid(Some(&mut legacy)));
        assert_eq!(legacy.filters, Some(BTreeMap::new()));
        let global = legacy.global_filters.unwrap();
        assert_eq!(global["name"].scope, FilterScope::Global);
    }

    #[test]
    fn default_descriptor_uses_configured_options() {
        let provider = DefaultDescriptorProvider::new(DefaultLazyLoadingOptions {
            first: 5,
            rows: 20,
            sort_field: "name".to_string(),
            sort_order: -1,
        });

        let mut descriptor = provider.default_descriptor();
        assert_eq!(descriptor.first, Some(5));
        assert_eq!(descriptor.rows, Some(20));
        assert_eq!(descriptor.sort_field.as_deref(), Some("name"));
        assert_eq!(descriptor.sort_order, -1);
        assert_eq!(descriptor.filters, Some(BTreeMap::new()));
        assert_eq!(descriptor.multi_sort, Some(Vec::new()));
        assert!(QueryDescriptorValidator::default().is_valid(Some(&mut descriptor)));
    }
}
