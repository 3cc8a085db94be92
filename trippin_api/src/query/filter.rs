//! Predicate expressions and the literals they compare against.
//!
//! A [`Filter`] is a plain value: it renders deterministically to an OData
//! `$filter` expression and can also be evaluated locally against any
//! [`Entity`], which is how callers cross-check server-side filtering.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, FixedOffset, SecondsFormat};

use crate::types::{Entity, Property, PropertyKind};
use crate::Error;

/// Typed literal used in filter predicates and returned by [`Entity::value`].
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    DateTime(DateTime<FixedOffset>),
    /// Enum member qualified by its namespace-qualified type name. `value`
    /// is the member's underlying integer, which is what the service sorts by.
    Enum {
        type_name: &'static str,
        member: String,
        value: i64,
    },
}

impl Value {
    /// Whether this literal can be compared with a property of `kind`.
    pub fn fits(&self, kind: PropertyKind) -> bool {
        match (self, kind) {
            (Value::Null, _) => kind.is_scalar(),
            (Value::Bool(_), PropertyKind::Bool) => true,
            (Value::Int(_), PropertyKind::Int | PropertyKind::Float) => true,
            (Value::Float(_), PropertyKind::Float) => true,
            (Value::String(_), PropertyKind::String) => true,
            (Value::DateTime(_), PropertyKind::DateTime) => true,
            (Value::Enum { type_name, .. }, PropertyKind::Enum(expected)) => *type_name == expected,
            _ => false,
        }
    }

    // Numbers share a rank so ints and floats compare by magnitude.
    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Float(_) => 2,
            Value::String(_) => 3,
            Value::DateTime(_) => 4,
            Value::Enum { .. } => 5,
        }
    }

    /// Total order used for local sorting. Null sorts first; values of
    /// different kinds order by kind.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).total_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.total_cmp(&(*b as f64)),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            (Value::Enum { value: a, .. }, Value::Enum { value: b, .. }) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn loosely_equals(&self, other: &Value) -> bool {
        self.rank() == other.rank() && self.compare(other) == Ordering::Equal
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Value::DateTime(dt) => write!(f, "{}", dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::Enum { type_name, member, .. } => write!(f, "{}'{}'", type_name, member),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Value::DateTime(value)
    }
}

/// Predicate over an entity's scalar properties.
#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    Eq { field: String, value: Value },
    Ne { field: String, value: Value },
    EndsWith { field: String, suffix: String },
    StartsWith { field: String, prefix: String },
    Contains { field: String, needle: String },
    And(Box<Filter>, Box<Filter>),
    Or(Box<Filter>, Box<Filter>),
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Filter::Eq {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn ne(field: &str, value: impl Into<Value>) -> Self {
        Filter::Ne {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn ends_with(field: &str, suffix: &str) -> Self {
        Filter::EndsWith {
            field: field.to_string(),
            suffix: suffix.to_string(),
        }
    }

    pub fn starts_with(field: &str, prefix: &str) -> Self {
        Filter::StartsWith {
            field: field.to_string(),
            prefix: prefix.to_string(),
        }
    }

    pub fn contains(field: &str, needle: &str) -> Self {
        Filter::Contains {
            field: field.to_string(),
            needle: needle.to_string(),
        }
    }

    #[must_use]
    pub fn and(self, other: Filter) -> Self {
        Filter::And(Box::new(self), Box::new(other))
    }

    #[must_use]
    pub fn or(self, other: Filter) -> Self {
        Filter::Or(Box::new(self), Box::new(other))
    }

    /// Checks every referenced property against `E`'s property table.
    pub fn validate<E: Entity>(&self) -> Result<(), Error> {
        match self {
            Filter::Eq { field, value } | Filter::Ne { field, value } => {
                let property = scalar_property::<E>(field, "filter")?;
                if !value.fits(property.kind) {
                    return Err(Error::invalid_field(
                        E::TYPE_NAME,
                        field,
                        format!("literal {} does not match the property type", value),
                    ));
                }
                Ok(())
            }
            Filter::EndsWith { field, .. }
            | Filter::StartsWith { field, .. }
            | Filter::Contains { field, .. } => {
                let property = scalar_property::<E>(field, "filter")?;
                if property.kind != PropertyKind::String {
                    return Err(Error::invalid_field(
                        E::TYPE_NAME,
                        field,
                        "string functions need a string property",
                    ));
                }
                Ok(())
            }
            Filter::And(a, b) | Filter::Or(a, b) => {
                a.validate::<E>()?;
                b.validate::<E>()
            }
        }
    }

    /// Evaluates the predicate locally. Unknown properties never match.
    pub fn matches<E: Entity>(&self, entity: &E) -> bool {
        match self {
            Filter::Eq { field, value } => entity
                .value(field)
                .is_some_and(|actual| actual.loosely_equals(value)),
            Filter::Ne { field, value } => entity
                .value(field)
                .is_some_and(|actual| !actual.loosely_equals(value)),
            Filter::EndsWith { field, suffix } => {
                string_value(entity, field).is_some_and(|s| s.ends_with(suffix.as_str()))
            }
            Filter::StartsWith { field, prefix } => {
                string_value(entity, field).is_some_and(|s| s.starts_with(prefix.as_str()))
            }
            Filter::Contains { field, needle } => {
                string_value(entity, field).is_some_and(|s| s.contains(needle.as_str()))
            }
            Filter::And(a, b) => a.matches(entity) && b.matches(entity),
            Filter::Or(a, b) => a.matches(entity) || b.matches(entity),
        }
    }

    fn is_composite(&self) -> bool {
        matches!(self, Filter::And(..) | Filter::Or(..))
    }
}

fn string_value<E: Entity>(entity: &E, field: &str) -> Option<String> {
    match entity.value(field)? {
        Value::String(s) => Some(s),
        _ => None,
    }
}

/// Resolves `field` to a property usable in `$filter` or `$orderby`.
pub(super) fn scalar_property<E: Entity>(field: &str, usage: &str) -> Result<&'static Property, Error> {
    let property = E::property(field)
        .ok_or_else(|| Error::invalid_field(E::TYPE_NAME, field, "unknown property"))?;
    if !property.kind.is_scalar() {
        return Err(Error::invalid_field(
            E::TYPE_NAME,
            field,
            format!("{:?} property cannot be used in {}", property.kind, usage),
        ));
    }
    Ok(property)
}

struct Operand<'a>(&'a Filter);

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_composite() {
            write!(f, "({})", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let literal = |s: &str| Value::from(s).to_string();
        match self {
            Filter::Eq { field, value } => write!(f, "{} eq {}", field, value),
            Filter::Ne { field, value } => write!(f, "{} ne {}", field, value),
            Filter::EndsWith { field, suffix } => write!(f, "endswith({},{})", field, literal(suffix)),
            Filter::StartsWith { field, prefix } => {
                write!(f, "startswith({},{})", field, literal(prefix))
            }
            Filter::Contains { field, needle } => write!(f, "contains({},{})", field, literal(needle)),
            Filter::And(a, b) => write!(f, "{} and {}", Operand(a), Operand(b)),
            Filter::Or(a, b) => write!(f, "{} or {}", Operand(a), Operand(b)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Person, PersonGender};

    fn vincent() -> Person {
        serde_json::from_str(
            r#"{"UserName":"vincentcalabrese","FirstName":"Vincent","LastName":"Calabrese","Gender":"Male","Concurrency":7}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_render_filters() {
        insta::assert_snapshot!(Filter::eq("FirstName", "Vincent").to_string(), @"FirstName eq 'Vincent'");
        insta::assert_snapshot!(Filter::ends_with("FirstName", "Clyde").to_string(), @"endswith(FirstName,'Clyde')");
        insta::assert_snapshot!(
            Filter::eq("Gender", PersonGender::Male)
                .and(Filter::eq("FirstName", "Vincent"))
                .to_string(),
            @"Gender eq Microsoft.OData.SampleService.Models.TripPin.PersonGender'Male' and FirstName eq 'Vincent'"
        );
        insta::assert_snapshot!(
            Filter::eq("LastName", "O'Neil")
                .or(Filter::starts_with("UserName", "r").and(Filter::ne("Concurrency", 0)))
                .to_string(),
            @"LastName eq 'O''Neil' or (startswith(UserName,'r') and Concurrency ne 0)"
        );
    }

    #[test]
    fn test_validate() {
        assert!(Filter::eq("FirstName", "Vincent").validate::<Person>().is_ok());
        assert!(Filter::eq("Gender", PersonGender::Female).validate::<Person>().is_ok());

        let err = Filter::eq("Nickname", "Vince").validate::<Person>().unwrap_err();
        assert!(matches!(err, Error::InvalidQueryField { ref field, .. } if field == "Nickname"));

        // wrong literal type, string function on an int, navigation in a filter
        assert!(Filter::eq("FirstName", 3).validate::<Person>().is_err());
        assert!(Filter::ends_with("Concurrency", "1").validate::<Person>().is_err());
        assert!(Filter::eq("Trips", Value::Null).validate::<Person>().is_err());

        // nested errors surface too
        let nested = Filter::eq("FirstName", "Vincent").and(Filter::eq("Age", 40));
        assert!(nested.validate::<Person>().is_err());
    }

    #[test]
    fn test_local_evaluation() {
        let p = vincent();
        assert!(Filter::eq("FirstName", "Vincent").matches(&p));
        assert!(!Filter::eq("FirstName", "vincent").matches(&p));
        assert!(Filter::ends_with("LastName", "brese").matches(&p));
        assert!(Filter::contains("UserName", "cala").matches(&p));
        assert!(Filter::eq("Gender", PersonGender::Male)
            .and(Filter::eq("FirstName", "Vincent"))
            .matches(&p));
        assert!(Filter::eq("Gender", PersonGender::Female)
            .or(Filter::ne("Concurrency", 1))
            .matches(&p));
        assert!(!Filter::eq("Nickname", "Vince").matches(&p));
    }

    #[test]
    fn test_value_ordering() {
        assert_eq!(Value::Null.compare(&Value::from("a")), Ordering::Less);
        assert_eq!(Value::Int(2).compare(&Value::Float(1.5)), Ordering::Greater);
        assert_eq!(Value::from("Clyde").compare(&Value::from("Vincent")), Ordering::Less);
        assert!(Value::Int(3).loosely_equals(&Value::Float(3.0)));
        assert!(!Value::Int(3).loosely_equals(&Value::from("3")));
    }

    #[test]
    fn test_enum_values_order_by_underlying_value() {
        let male = Value::from(PersonGender::Male);
        let female = Value::from(PersonGender::Female);
        let unknown = Value::from(PersonGender::Unknown);
        assert_eq!(male.compare(&female), Ordering::Less);
        assert_eq!(female.compare(&unknown), Ordering::Less);
        assert!(female.loosely_equals(&Value::from(PersonGender::Female)));
        assert!(!male.loosely_equals(&female));
    }
}
