//! Accessor registry.
//!
//! A [`TypeSchema`] is built once per translatable type and lists each field
//! with a getter, an optional setter, and the dictionary annotations attached
//! to it. Values cross the boundary as [`serde_json::Value`], so the engine
//! never needs to know concrete field types.

use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::directive::DictAnnotation;
use crate::traits::Translatable;

type Getter = Arc<dyn Fn(&dyn Any) -> Option<Value> + Send + Sync>;
type Setter = Arc<dyn Fn(&mut dyn Any, Value) -> Result<(), String> + Send + Sync>;

/// One field of a [`TypeSchema`].
#[derive(Clone)]
pub struct FieldSchema {
    name: String,
    annotations: Vec<DictAnnotation>,
    getter: Getter,
    setter: Option<Setter>,
}

impl FieldSchema {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn annotations(&self) -> &[DictAnnotation] {
        &self.annotations
    }

    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    /// Read the field from `target`. `None` when the value is absent or the
    /// target is not the type this schema was built for.
    pub fn get(&self, target: &dyn Translatable) -> Option<Value> {
        (self.getter)(target.as_any())
    }

    /// Write `value` into `target`.
    pub fn set(&self, target: &mut dyn Translatable, value: Value) -> Result<(), String> {
        match &self.setter {
            Some(setter) => setter(target.as_any_mut(), value),
            None => Err(format!("field `{}` is read-only", self.name)),
        }
    }
}

impl fmt::Debug for FieldSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSchema")
            .field("name", &self.name)
            .field("annotations", &self.annotations)
            .field("writable", &self.is_writable())
            .finish()
    }
}

/// Per-type registry of field accessors.
#[derive(Debug, Clone)]
pub struct TypeSchema {
    type_name: String,
    fields: Vec<FieldSchema>,
}

impl TypeSchema {
    /// Start a schema for `T`, named after `std::any::type_name::<T>()`.
    pub fn builder<T: Any>() -> TypeSchemaBuilder<T> {
        TypeSchemaBuilder {
            type_name: std::any::type_name::<T>().to_string(),
            fields: Vec::new(),
            _marker: PhantomData,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Fields carrying at least one annotation, in declaration order.
    pub fn annotated_fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.iter().filter(|f| !f.annotations.is_empty())
    }

    /// Content hash of the field layout, independent of declaration order.
    pub fn signature(&self) -> String {
        let mut parts: Vec<String> = self
            .fields
            .iter()
            .map(|f| {
                let annotations = serde_json::to_string(&f.annotations).unwrap_or_default();
                format!("{}:{}:{}", f.name, f.is_writable(), annotations)
            })
            .collect();
        parts.sort();
        let digest = blake3::hash(parts.join("\n").as_bytes());
        digest.to_hex()[..16].to_string()
    }

    /// Structural checks run before a schema is cached.
    pub fn validate(&self) -> Result<(), String> {
        if self.type_name.trim().is_empty() {
            return Err("type name is blank".to_string());
        }
        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err("field name is blank".to_string());
            }
            if !seen.insert(field.name.as_str()) {
                return Err(format!("duplicate field `{}`", field.name));
            }
        }
        Ok(())
    }
}

/// Typed builder for [`TypeSchema`].
pub struct TypeSchemaBuilder<T> {
    type_name: String,
    fields: Vec<FieldSchema>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any> TypeSchemaBuilder<T> {
    /// Override the schema's type name.
    pub fn named(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    /// Add a read-only field.
    pub fn read_only<G>(mut self, name: impl Into<String>, get: G) -> Self
    where
        G: Fn(&T) -> Option<Value> + Send + Sync + 'static,
    {
        self.fields.push(FieldSchema {
            name: name.into(),
            annotations: Vec::new(),
            getter: erase_getter(get),
            setter: None,
        });
        self
    }

    /// Add a readable and writable field.
    pub fn field<G, S>(mut self, name: impl Into<String>, get: G, set: S) -> Self
    where
        G: Fn(&T) -> Option<Value> + Send + Sync + 'static,
        S: Fn(&mut T, Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.fields.push(FieldSchema {
            name: name.into(),
            annotations: Vec::new(),
            getter: erase_getter(get),
            setter: Some(Arc::new(move |target: &mut dyn Any, value: Value| {
                match target.downcast_mut::<T>() {
                    Some(t) => set(t, value),
                    None => Err(format!(
                        "type mismatch: expected {}",
                        std::any::type_name::<T>()
                    )),
                }
            })),
        });
        self
    }

    /// Attach an annotation to the most recently added field.
    pub fn dict(mut self, annotation: DictAnnotation) -> Self {
        match self.fields.last_mut() {
            Some(field) => field.annotations.push(annotation),
            None => warn!(
                type_name = %self.type_name,
                "annotation declared before any field, ignoring"
            ),
        }
        self
    }

    pub fn build(self) -> TypeSchema {
        TypeSchema {
            type_name: self.type_name,
            fields: self.fields,
        }
    }
}

fn erase_getter<T, G>(get: G) -> Getter
where
    T: Any,
    G: Fn(&T) -> Option<Value> + Send + Sync + 'static,
{
    Arc::new(move |target: &dyn Any| target.downcast_ref::<T>().and_then(&get))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Item {
        code: String,
        label: Option<String>,
    }

    impl Translatable for Item {
        fn schema(&self) -> TypeSchema {
            item_schema()
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn item_schema() -> TypeSchema {
        TypeSchema::builder::<Item>()
            .field(
                "code",
                |i| Some(Value::String(i.code.clone())),
                |i, v| {
                    i.code = v.as_str().ok_or("expected string")?.to_string();
                    Ok(())
                },
            )
            .dict(DictAnnotation::dict("item_code"))
            .read_only("label", |i| i.label.clone().map(Value::String))
            .build()
    }

    #[test]
    fn getter_and_setter_round_through_dyn() {
        let mut item = Item {
            code: "A".to_string(),
            label: None,
        };
        let schema = item.schema();
        let code = schema.field("code").unwrap();
        assert_eq!(code.get(&item), Some(Value::String("A".to_string())));
        code.set(&mut item, Value::String("B".to_string())).unwrap();
        assert_eq!(item.code, "B");
        assert!(code.set(&mut item, Value::Bool(true)).is_err());
    }

    #[test]
    fn read_only_field_rejects_writes() {
        let mut item = Item::default();
        let schema = item.schema();
        let label = schema.field("label").unwrap();
        assert!(!label.is_writable());
        assert!(label.set(&mut item, Value::Null).is_err());
        assert_eq!(label.get(&item), None);
    }

    #[test]
    fn annotations_attach_to_last_field() {
        let schema = item_schema();
        let annotated: Vec<_> = schema.annotated_fields().map(|f| f.name()).collect();
        assert_eq!(annotated, vec!["code"]);
        assert!(Item::default().nested().is_empty());
    }

    #[test]
    fn signature_ignores_declaration_order() {
        let a = TypeSchema::builder::<Item>()
            .read_only("x", |_| None)
            .read_only("y", |_| None)
            .build();
        let b = TypeSchema::builder::<Item>()
            .read_only("y", |_| None)
            .read_only("x", |_| None)
            .build();
        assert_eq!(a.signature(), b.signature());
        assert_eq!(a.signature().len(), 16);
    }

    #[test]
    fn validate_rejects_duplicates() {
        let schema = TypeSchema::builder::<Item>()
            .read_only("x", |_| None)
            .read_only("x", |_| None)
            .build();
        assert!(schema.validate().unwrap_err().contains("duplicate"));
        assert!(item_schema().validate().is_ok());
    }
}
