//! Composable, lazily evaluated queries over a snapshot of records

use crate::entity::traits::FieldRegistry;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Boolean test over a record
pub type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// `1` is ascending, anything else descending
    pub fn from_order(order: i32) -> Self {
        if order == 1 {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        }
    }
}

/// One ordering term. `field` is the registered field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: &'static str,
    pub direction: SortDirection,
}

/// A filterable, orderable, countable query source.
///
/// Filters and orderings compose; nothing is evaluated until [`count`] or
/// [`page`] is called.
///
/// [`count`]: Queryable::count
/// [`page`]: Queryable::page
pub trait Queryable<T>: Sized {
    /// Narrow the query (logical AND with previous filters)
    fn filter(self, predicate: Predicate<T>) -> Self;

    /// Replace the ordering with the given keys, primary first
    fn order_by(self, keys: Vec<SortKey>) -> Self;

    /// Number of records passing all filters
    fn count(&self) -> usize;

    /// Materialize the window `[skip, skip + take)` of the ordered result
    fn page(self, skip: usize, take: usize) -> Vec<T>;
}

/// In-memory [`Queryable`] over a snapshot of entities
pub struct EntityQuery<T> {
    rows: Vec<T>,
    predicates: Vec<Predicate<T>>,
    ordering: Vec<SortKey>,
}

impl<T> EntityQuery<T> {
    pub fn new(rows: Vec<T>) -> Self {
        Self {
            rows,
            predicates: Vec::new(),
            ordering: Vec::new(),
        }
    }

    fn matches(&self, row: &T) -> bool {
        self.predicates.iter().all(|p| p(row))
    }
}

impl<T> fmt::Debug for EntityQuery<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityQuery")
            .field("rows", &self.rows.len())
            .field("predicates", &self.predicates.len())
            .field("ordering", &self.ordering)
            .finish()
    }
}

impl<T: FieldRegistry> Queryable<T> for EntityQuery<T> {
    fn filter(mut self, predicate: Predicate<T>) -> Self {
        self.predicates.push(predicate);
        self
    }

    fn order_by(mut self, keys: Vec<SortKey>) -> Self {
        self.ordering = keys;
        self
    }

    fn count(&self) -> usize {
        self.rows.iter().filter(|row| self.matches(row)).count()
    }

    fn page(self, skip: usize, take: usize) -> Vec<T> {
        let predicates = self.predicates;
        let mut rows: Vec<T> = self
            .rows
            .into_iter()
            .filter(|row| predicates.iter().all(|p| p(row)))
            .collect();

        if !self.ordering.is_empty() {
            let ordering = self.ordering;
            // stable, so equal keys keep source order
            rows.sort_by(|a, b| compare_rows(a, b, &ordering));
        }

        rows.into_iter().skip(skip).take(take).collect()
    }
}

fn compare_rows<T: FieldRegistry>(a: &T, b: &T, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let left = a.field_value(key.field);
        let right = b.field_value(key.field);
        let ord = match (left, right) {
            (Some(l), Some(r)) => l.sort_cmp(&r),
            _ => Ordering::Equal,
        };
        let ord = match key.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        name: String,
        rank: i32,
    }

    crate::entity_fields!(Row {
        name: String => "name",
        rank: i32 => "rank",
    });

    fn row(name: &str, rank: i32) -> Row {
        Row {
            name: name.to_string(),
            rank,
        }
    }

    #[test]
    fn filters_compose_and_count_ignores_window() {
        let query = EntityQuery::new(vec![row("a", 1), row("b", 2), row("c", 3), row("d", 4)])
            .filter(Arc::new(|r: &Row| r.rank > 1))
            .filter(Arc::new(|r: &Row| r.name != "d"));

        assert_eq!(query.count(), 2);
        let page = query.page(1, 5);
        assert_eq!(page, vec![row("c", 3)]);
    }

    #[test]
    fn ordering_applies_keys_in_sequence() {
        let query = EntityQuery::new(vec![row("b", 1), row("a", 1), row("a", 2)]).order_by(vec![
            SortKey {
                field: "name",
                direction: SortDirection::Ascending,
            },
            SortKey {
                field: "rank",
                direction: SortDirection::Descending,
            },
        ]);

        assert_eq!(query.page(0, 10), vec![row("a", 2), row("a", 1), row("b", 1)]);
    }

    #[test]
    fn sort_direction_from_order() {
        assert_eq!(SortDirection::from_order(1), SortDirection::Ascending);
        assert_eq!(SortDirection::from_order(-1), SortDirection::Descending);
        assert_eq!(SortDirection::from_order(0), SortDirection::Descending);
    }
}
