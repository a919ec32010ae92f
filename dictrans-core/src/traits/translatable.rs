use std::any::Any;

use crate::schema::TypeSchema;

/// A child reachable from a translatable object.
pub enum Nested<'a> {
    /// A single nested object.
    Single(&'a dyn Translatable),
    /// The elements of a collection-valued field, in iteration order.
    Collection(Vec<&'a dyn Translatable>),
}

/// Mutable counterpart of [`Nested`]. Must enumerate children in the same
/// order and shape as [`Translatable::nested`].
pub enum NestedMut<'a> {
    Single(&'a mut dyn Translatable),
    Collection(Vec<&'a mut dyn Translatable>),
}

/// An object whose annotated fields can be translated.
///
/// Implemented by hand or by a code generator. `schema` is only invoked on a
/// structural cache miss, so it may allocate freely.
pub trait Translatable: Any + Send + Sync {
    /// Stable identity of the declaring type. Cache keys derive from this.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Build the accessor registry for this type.
    fn schema(&self) -> TypeSchema;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Nested objects and collections, in declaration order.
    fn nested(&self) -> Vec<Nested<'_>> {
        Vec::new()
    }

    fn nested_mut(&mut self) -> Vec<NestedMut<'_>> {
        Vec::new()
    }
}
