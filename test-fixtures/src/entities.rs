use std::any::Any;

use dictrans_core::traits::{IExpressionEvaluator, Nested, NestedMut, Translatable};
use dictrans_core::{DictAnnotation, DictTransError, DictTransResult, TypeSchema};
use serde_json::Value;

macro_rules! any_impls {
    () => {
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    };
}

fn text(s: &str) -> Option<Value> {
    Some(Value::String(s.to_string()))
}

fn opt_text(s: &Option<String>) -> Option<Value> {
    s.clone().map(Value::String)
}

fn assign(slot: &mut String, value: Value) -> Result<(), String> {
    match value {
        Value::String(s) => {
            *slot = s;
            Ok(())
        }
        other => Err(format!("expected a string, got {other}")),
    }
}

fn assign_opt(slot: &mut Option<String>, value: Value) -> Result<(), String> {
    match value {
        Value::Null => {
            *slot = None;
            Ok(())
        }
        Value::String(s) => {
            *slot = Some(s);
            Ok(())
        }
        other => Err(format!("expected a string, got {other}")),
    }
}

/// Schema of a fixture type, built from its default value.
pub fn schema_of<T: Translatable + Default>() -> TypeSchema {
    T::default().schema()
}

/// User with every directive flavour: system dict, separate target field,
/// multi-value, table dict with alias, a nested profile and a contact list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    pub id: u64,
    pub status: String,
    pub sex: String,
    pub sex_text: Option<String>,
    pub roles: String,
    pub dept_id: String,
    pub dept_name: Option<String>,
    pub profile: Option<Profile>,
    pub contacts: Vec<Contact>,
}

impl User {
    pub fn new(id: u64, status: &str, sex: &str, roles: &str, dept_id: &str) -> Self {
        Self {
            id,
            status: status.to_string(),
            sex: sex.to_string(),
            roles: roles.to_string(),
            dept_id: dept_id.to_string(),
            ..Self::default()
        }
    }

    pub fn with_profile(mut self, level: &str) -> Self {
        self.profile = Some(Profile {
            level: level.to_string(),
        });
        self
    }

    pub fn with_contact(mut self, kind: &str, value: &str) -> Self {
        self.contacts.push(Contact {
            kind: kind.to_string(),
            value: value.to_string(),
        });
        self
    }
}

impl Translatable for User {
    fn schema(&self) -> TypeSchema {
        TypeSchema::builder::<User>()
            .read_only("id", |u| Some(Value::from(u.id)))
            .field("status", |u| text(&u.status), |u, v| assign(&mut u.status, v))
            .dict(DictAnnotation::dict("user_status"))
            .field("sex", |u| text(&u.sex), |u, v| assign(&mut u.sex, v))
            .dict(DictAnnotation::dict("user_sex").ignore_original())
            .field("sexText", |u| opt_text(&u.sex_text), |u, v| assign_opt(&mut u.sex_text, v))
            .field("roles", |u| text(&u.roles), |u, v| assign(&mut u.roles, v))
            .dict(DictAnnotation::dict("user_role"))
            .field("deptId", |u| text(&u.dept_id), |u, v| assign(&mut u.dept_id, v))
            .dict(
                DictAnnotation::table("sys_dept", "id", "name")
                    .with_alias("deptName")
                    .ignore_original(),
            )
            .field("deptName", |u| opt_text(&u.dept_name), |u, v| assign_opt(&mut u.dept_name, v))
            .build()
    }

    any_impls!();

    fn nested(&self) -> Vec<Nested<'_>> {
        let mut out = Vec::new();
        if let Some(profile) = &self.profile {
            out.push(Nested::Single(profile as &dyn Translatable));
        }
        out.push(Nested::Collection(
            self.contacts.iter().map(|c| c as &dyn Translatable).collect(),
        ));
        out
    }

    fn nested_mut(&mut self) -> Vec<NestedMut<'_>> {
        let mut out = Vec::new();
        if let Some(profile) = &mut self.profile {
            out.push(NestedMut::Single(profile as &mut dyn Translatable));
        }
        out.push(NestedMut::Collection(
            self.contacts
                .iter_mut()
                .map(|c| c as &mut dyn Translatable)
                .collect(),
        ));
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub level: String,
}

impl Translatable for Profile {
    fn schema(&self) -> TypeSchema {
        TypeSchema::builder::<Profile>()
            .field("level", |p| text(&p.level), |p, v| assign(&mut p.level, v))
            .dict(DictAnnotation::dict("member_level"))
            .build()
    }

    any_impls!();
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contact {
    pub kind: String,
    pub value: String,
}

impl Translatable for Contact {
    fn schema(&self) -> TypeSchema {
        TypeSchema::builder::<Contact>()
            .field("kind", |c| text(&c.kind), |c, v| assign(&mut c.kind, v))
            .dict(DictAnnotation::dict("contact_kind"))
            .read_only("value", |c| text(&c.value))
            .build()
    }

    any_impls!();
}

/// Three system-dict fields, for batching tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ticket {
    pub priority: String,
    pub category: String,
    pub state: String,
}

impl Ticket {
    pub fn new(priority: &str, category: &str, state: &str) -> Self {
        Self {
            priority: priority.to_string(),
            category: category.to_string(),
            state: state.to_string(),
        }
    }
}

impl Translatable for Ticket {
    fn schema(&self) -> TypeSchema {
        TypeSchema::builder::<Ticket>()
            .field("priority", |t| text(&t.priority), |t, v| assign(&mut t.priority, v))
            .dict(DictAnnotation::dict("ticket_priority"))
            .field("category", |t| text(&t.category), |t, v| assign(&mut t.category, v))
            .dict(DictAnnotation::dict("ticket_category"))
            .field("state", |t| text(&t.state), |t, v| assign(&mut t.state, v))
            .dict(DictAnnotation::dict("ticket_state"))
            .build()
    }

    any_impls!();
}

/// Expression directive writing a composed label to `customerLabel`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Invoice {
    pub number: String,
    pub customer: String,
    pub customer_label: Option<String>,
}

impl Translatable for Invoice {
    fn schema(&self) -> TypeSchema {
        TypeSchema::builder::<Invoice>()
            .read_only("number", |i| text(&i.number))
            .field("customer", |i| text(&i.customer), |i, v| assign(&mut i.customer, v))
            .dict(
                DictAnnotation::expression("${number} / ${customer}")
                    .with_alias("customerLabel")
                    .ignore_original(),
            )
            .field(
                "customerLabel",
                |i| opt_text(&i.customer_label),
                |i, v| assign_opt(&mut i.customer_label, v),
            )
            .build()
    }

    any_impls!();
}

/// Carries an invoice one level down, with no directives of its own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Order {
    pub id: u64,
    pub invoice: Invoice,
}

impl Translatable for Order {
    fn schema(&self) -> TypeSchema {
        TypeSchema::builder::<Order>()
            .read_only("id", |o| Some(Value::from(o.id)))
            .build()
    }

    any_impls!();

    fn nested(&self) -> Vec<Nested<'_>> {
        vec![Nested::Single(&self.invoice as &dyn Translatable)]
    }

    fn nested_mut(&mut self) -> Vec<NestedMut<'_>> {
        vec![NestedMut::Single(&mut self.invoice as &mut dyn Translatable)]
    }
}

/// Target field exists but has no setter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Badge {
    pub code: String,
    pub code_text: Option<String>,
}

impl Translatable for Badge {
    fn schema(&self) -> TypeSchema {
        TypeSchema::builder::<Badge>()
            .field("code", |b| text(&b.code), |b, v| assign(&mut b.code, v))
            .dict(DictAnnotation::dict("badge_code").ignore_original())
            .read_only("codeText", |b| opt_text(&b.code_text))
            .build()
    }

    any_impls!();
}

/// Evaluates `${field}` templates against the root's fields.
#[derive(Debug, Default)]
pub struct TemplateEvaluator;

impl IExpressionEvaluator for TemplateEvaluator {
    fn evaluate(&self, expression: &str, root: &dyn Translatable) -> DictTransResult<Option<Value>> {
        let schema = root.schema();
        let mut out = String::new();
        let mut rest = expression;
        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after.find('}').ok_or_else(|| {
                DictTransError::ConfigError(format!("unterminated placeholder in `{expression}`"))
            })?;
            let name = &after[..end];
            let value = schema
                .field(name)
                .ok_or_else(|| DictTransError::ConfigError(format!("unknown field `{name}`")))?
                .get(root);
            match value {
                Some(Value::String(s)) => out.push_str(&s),
                Some(Value::Null) | None => {}
                Some(other) => out.push_str(&other.to_string()),
            }
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        Ok(Some(Value::String(out)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_schemas_validate() {
        assert!(schema_of::<User>().validate().is_ok());
        assert!(schema_of::<Ticket>().validate().is_ok());
        assert!(schema_of::<Invoice>().validate().is_ok());
        assert!(schema_of::<Badge>().validate().is_ok());
        assert!(schema_of::<Order>().validate().is_ok());
    }

    #[test]
    fn nested_and_nested_mut_agree() {
        let mut user = User::new(1, "1", "M", "A", "10")
            .with_profile("G")
            .with_contact("E", "a@b.c");
        assert_eq!(user.nested().len(), 2);
        assert_eq!(user.nested_mut().len(), 2);
        let bare = User::default();
        assert_eq!(bare.nested().len(), 1);
    }

    #[test]
    fn template_reads_root_fields() {
        let invoice = Invoice {
            number: "INV-7".to_string(),
            customer: "acme".to_string(),
            customer_label: None,
        };
        let value = TemplateEvaluator
            .evaluate("${number} / ${customer}", &invoice)
            .unwrap();
        assert_eq!(value, Some(Value::String("INV-7 / acme".to_string())));
        assert!(TemplateEvaluator.evaluate("${nope}", &invoice).is_err());
    }
}
