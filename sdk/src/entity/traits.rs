//! Core traits for the entity framework

use crate::entity::types::{BigDecimal, FieldDef, FieldType, FieldValue, ScalarType, Timestamp};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Debug;

/// Name/type introspection over a record type.
///
/// Implemented by the [`entity_fields!`](crate::entity_fields) macro; the
/// query engine only ever reaches fields through this trait.
pub trait FieldRegistry {
    /// Every field of the record, in declaration order
    fn fields() -> &'static [FieldDef];

    /// Read a field by its registered (exact) name
    fn field_value(&self, name: &str) -> Option<FieldValue>;

    /// Case-insensitive lookup of a field definition
    fn find_field(name: &str) -> Option<&'static FieldDef> {
        Self::fields()
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
    }
}

/// Rust types that can back an entity field
pub trait FieldKind {
    const FIELD_TYPE: FieldType;

    fn to_field_value(&self) -> FieldValue;
}

macro_rules! impl_field_kind {
    ($ty:ty, $scalar:expr, |$v:ident| $body:expr) => {
        impl FieldKind for $ty {
            const FIELD_TYPE: FieldType = FieldType::required($scalar);

            fn to_field_value(&self) -> FieldValue {
                let $v = self;
                $body
            }
        }
    };
}

impl_field_kind!(String, ScalarType::String, |v| FieldValue::String(v.clone()));
impl_field_kind!(i16, ScalarType::Int16, |v| FieldValue::Int(i64::from(*v)));
impl_field_kind!(i32, ScalarType::Int32, |v| FieldValue::Int(i64::from(*v)));
impl_field_kind!(i64, ScalarType::Int64, |v| FieldValue::Int(*v));
impl_field_kind!(f32, ScalarType::Float32, |v| FieldValue::Float(f64::from(*v)));
impl_field_kind!(f64, ScalarType::Float64, |v| FieldValue::Float(*v));
impl_field_kind!(BigDecimal, ScalarType::Decimal, |v| FieldValue::Decimal(v.clone()));
impl_field_kind!(bool, ScalarType::Boolean, |v| FieldValue::Boolean(*v));
impl_field_kind!(uuid::Uuid, ScalarType::Id, |v| FieldValue::Id(*v));
impl_field_kind!(Timestamp, ScalarType::Timestamp, |v| FieldValue::Timestamp(*v));

impl<T: FieldKind> FieldKind for Option<T> {
    const FIELD_TYPE: FieldType = T::FIELD_TYPE.nullable();

    fn to_field_value(&self) -> FieldValue {
        match self {
            Some(v) => v.to_field_value(),
            None => FieldValue::Null,
        }
    }
}

/// Generate a [`FieldRegistry`] implementation for a struct.
///
/// ```ignore
/// entity_fields!(Product {
///     guid: uuid::Uuid => "guid",
///     name: String => "name",
/// });
/// ```
#[macro_export]
macro_rules! entity_fields {
    ($ty:ty { $($field:ident : $fty:ty => $name:literal),* $(,)? }) => {
        impl $crate::entity::FieldRegistry for $ty {
            fn fields() -> &'static [$crate::entity::FieldDef] {
                const FIELDS: &[$crate::entity::FieldDef] = &[
                    $($crate::entity::FieldDef {
                        name: $name,
                        field_type: <$fty as $crate::entity::FieldKind>::FIELD_TYPE,
                    }),*
                ];
                FIELDS
            }

            fn field_value(&self, name: &str) -> Option<$crate::entity::FieldValue> {
                match name {
                    $($name => Some($crate::entity::FieldKind::to_field_value(&self.$field)),)*
                    _ => None,
                }
            }
        }
    };
}

/// Core trait that all entities must implement
pub trait Entity:
    FieldRegistry + Clone + Debug + Send + Sync + 'static + Sized + Serialize + DeserializeOwned
{
    /// The type used for this entity's primary key
    type Id: EntityId;

    /// The table/collection name for this entity
    const TABLE_NAME: &'static str;

    /// Get the entity's primary key
    fn id(&self) -> &Self::Id;

    /// Get the table name (convenience method)
    fn table_name() -> &'static str {
        Self::TABLE_NAME
    }

    /// Convert entity to JSON for storage
    fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Create entity from JSON
    fn from_json(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Trait for entity ID types
pub trait EntityId:
    Clone + Debug + Send + Sync + PartialEq + Eq + std::hash::Hash + 'static
{
    /// Convert ID to string representation for storage/query
    fn as_string(&self) -> String;

    /// Create ID from string representation
    fn from_string(s: &str) -> Result<Self>;
}

impl EntityId for String {
    fn as_string(&self) -> String {
        self.clone()
    }

    fn from_string(s: &str) -> Result<Self> {
        Ok(s.to_string())
    }
}

impl EntityId for i64 {
    fn as_string(&self) -> String {
        self.to_string()
    }

    fn from_string(s: &str) -> Result<Self> {
        Ok(s.parse()?)
    }
}

impl EntityId for uuid::Uuid {
    fn as_string(&self) -> String {
        self.to_string()
    }

    fn from_string(s: &str) -> Result<Self> {
        Ok(uuid::Uuid::parse_str(s)?)
    }
}

/// Core trait for entity store operations
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Get an entity by ID
    async fn get<T: Entity>(&self, id: &T::Id) -> Result<Option<T>>;

    /// Insert or update an entity
    async fn upsert<T: Entity>(&self, entity: &T) -> Result<()>;

    /// Insert or update multiple entities
    async fn upsert_many<T: Entity>(&self, entities: &[T]) -> Result<()>;

    /// Delete an entity by ID
    async fn delete<T: Entity>(&self, id: &T::Id) -> Result<()>;

    /// List all entities of a type in source order
    async fn list<T: Entity>(&self) -> Result<Vec<T>>;

    /// Apply `mutate` to the stored entity and persist it as one atomic step.
    /// Fails with [`EntityError::NotFound`](crate::entity::EntityError) when
    /// the id is unknown.
    async fn update<T, F>(&self, id: &T::Id, mutate: F) -> Result<T>
    where
        T: Entity,
        F: FnOnce(&mut T) + Send + 'static;
}
