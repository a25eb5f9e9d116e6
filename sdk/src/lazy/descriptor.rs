//! Client supplied lazy-loading descriptor

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Pagination, ordering and filtering requested by a client.
///
/// `first` and `rows` are mandatory for listing; see
/// [`QueryDescriptorValidator`](crate::lazy::QueryDescriptorValidator).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDescriptor {
    #[serde(default)]
    pub first: Option<i32>,
    #[serde(default)]
    pub last: Option<i32>,
    #[serde(default)]
    pub rows: Option<i32>,
    #[serde(default)]
    pub sort_field: Option<String>,
    /// `1` ascending, anything else descending
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub multi_sort: Option<Vec<SortMeta>>,
    #[serde(default)]
    pub filters: Option<BTreeMap<String, FilterSpec>>,
    /// Global search terms keyed by column. Separate from `filters` so one
    /// column can carry a local filter and a global term at the same time.
    #[serde(default)]
    pub global_filters: Option<BTreeMap<String, FilterSpec>>,
    /// Free text the client typed into its global search box. Matching is
    /// driven by `global_filters` and the global-scope entries of `filters`.
    #[serde(default)]
    pub global_filter: Option<String>,
}

impl QueryDescriptor {
    /// Descriptor for the window `[first, first + rows)`
    pub fn page(first: i32, rows: i32) -> Self {
        Self {
            first: Some(first),
            rows: Some(rows),
            ..Self::default()
        }
    }

    pub fn sorted_by(mut self, field: impl Into<String>, order: i32) -> Self {
        self.sort_field = Some(field.into());
        self.sort_order = order;
        self
    }

    pub fn then_sort(mut self, field: impl Into<String>, order: i32) -> Self {
        self.multi_sort.get_or_insert_with(Vec::new).push(SortMeta {
            field: field.into(),
            order,
        });
        self
    }

    pub fn with_filter(mut self, field: impl Into<String>, spec: FilterSpec) -> Self {
        self.filters
            .get_or_insert_with(BTreeMap::new)
            .insert(field.into(), spec);
        self
    }

    pub fn with_global_term(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.global_filters
            .get_or_insert_with(BTreeMap::new)
            .insert(field.into(), FilterSpec::global(value));
        self
    }

    /// Moves filters keyed with the old `"<field>_global"` convention into
    /// `global_filters`. Any key containing `"global"` counts as legacy; only
    /// the `"_global"` suffix is stripped.
    pub fn apply_legacy_global_keys(&mut self) {
        let Some(filters) = self.filters.take() else {
            return;
        };

        let (legacy, local): (BTreeMap<_, _>, BTreeMap<_, _>) =
            filters.into_iter().partition(|(key, _)| key.contains("global"));

        if !legacy.is_empty() {
            let global = self.global_filters.get_or_insert_with(BTreeMap::new);
            for (key, mut spec) in legacy {
                spec.scope = FilterScope::Global;
                global.insert(key.replace("_global", ""), spec);
            }
        }
        self.filters = Some(local);
    }
}

/// One entry of a multi-column ordering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortMeta {
    pub field: String,
    /// `1` ascending, anything else descending
    #[serde(default)]
    pub order: i32,
}

/// Whether a filter targets one column or takes part in the global search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterScope {
    #[default]
    Local,
    Global,
}

/// A single column filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub match_mode: MatchMode,
    #[serde(default)]
    pub scope: FilterScope,
}

impl FilterSpec {
    pub fn local(value: impl Into<Value>, match_mode: MatchMode) -> Self {
        Self {
            value: value.into(),
            match_mode,
            scope: FilterScope::Local,
        }
    }

    /// Global search term; the match mode is not consulted for these
    pub fn global(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            match_mode: MatchMode::Contains,
            scope: FilterScope::Global,
        }
    }
}

/// Comparison operator selected for a filter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MatchMode {
    StartsWith,
    Contains,
    NotContains,
    EndsWith,
    Equals,
    Is,
    NotEquals,
    DateIs,
    DateIsNot,
    DateAfter,
    DateBefore,
    Gt,
    Lt,
    In,
    /// Unrecognised operator; applies no filter
    Unknown(String),
}

impl Default for MatchMode {
    fn default() -> Self {
        MatchMode::Unknown(String::new())
    }
}

impl MatchMode {
    pub fn as_str(&self) -> &str {
        match self {
            MatchMode::StartsWith => "startsWith",
            MatchMode::Contains => "contains",
            MatchMode::NotContains => "notContains",
            MatchMode::EndsWith => "endsWith",
            MatchMode::Equals => "equals",
            MatchMode::Is => "is",
            MatchMode::NotEquals => "notEquals",
            MatchMode::DateIs => "dateIs",
            MatchMode::DateIsNot => "dateIsNot",
            MatchMode::DateAfter => "dateAfter",
            MatchMode::DateBefore => "dateBefore",
            MatchMode::Gt => "gt",
            MatchMode::Lt => "lt",
            MatchMode::In => "in",
            MatchMode::Unknown(other) => other,
        }
    }
}

impl From<String> for MatchMode {
    fn from(value: String) -> Self {
        match value.as_str() {
            "startsWith" => MatchMode::StartsWith,
            "contains" => MatchMode::Contains,
            "notContains" => MatchMode::NotContains,
            "endsWith" => MatchMode::EndsWith,
            "equals" => MatchMode::Equals,
            "is" => MatchMode::Is,
            "notEquals" => MatchMode::NotEquals,
            "dateIs" => MatchMode::DateIs,
            "dateIsNot" => MatchMode::DateIsNot,
            "dateAfter" => MatchMode::DateAfter,
            "dateBefore" => MatchMode::DateBefore,
            "gt" => MatchMode::Gt,
            "lt" => MatchMode::Lt,
            "in" => MatchMode::In,
            _ => MatchMode::Unknown(value),
        }
    }
}

impl From<MatchMode> for String {
    fn from(mode: MatchMode) -> Self {
        mode.as_str().to_string()
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
