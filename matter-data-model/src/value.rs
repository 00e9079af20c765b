use std::collections::BTreeMap;
use std::fmt;

/// A decoded attribute value or command field.
///
/// Structures are keyed by their context tag, the same way fields are
/// numbered in the cluster definitions.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Unsigned(u64),
    Signed(i64),
    String(String),
    List(Vec<Value>),
    Struct(BTreeMap<u8, Value>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Unsigned,
    Signed,
    String,
    List,
    Struct,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Unsigned => "unsigned integer",
            ValueKind::Signed => "signed integer",
            ValueKind::String => "string",
            ValueKind::List => "list",
            ValueKind::Struct => "struct",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("expected {expected}, found {found}")]
    UnexpectedKind { expected: ValueKind, found: ValueKind },

    #[error("missing field `{name}` (tag {tag})")]
    MissingField { tag: u8, name: &'static str },

    #[error("value {value} does not fit in {target}")]
    OutOfRange { value: u64, target: &'static str },

    #[error("in field `{name}`: {source}")]
    InField {
        name: &'static str,
        #[source]
        source: Box<DecodeError>,
    },
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Unsigned(_) => ValueKind::Unsigned,
            Value::Signed(_) => ValueKind::Signed,
            Value::String(_) => ValueKind::String,
            Value::List(_) => ValueKind::List,
            Value::Struct(_) => ValueKind::Struct,
        }
    }

    /// Builds a structure out of `(tag, value)` pairs.
    pub fn structure(fields: impl IntoIterator<Item = (u8, Value)>) -> Self {
        Value::Struct(fields.into_iter().collect())
    }

    fn mismatch(&self, expected: ValueKind) -> DecodeError {
        DecodeError::UnexpectedKind {
            expected,
            found: self.kind(),
        }
    }

    pub fn as_unsigned(&self) -> Result<u64, DecodeError> {
        match self {
            Value::Unsigned(v) => Ok(*v),
            other => Err(other.mismatch(ValueKind::Unsigned)),
        }
    }

    pub fn as_u8(&self) -> Result<u8, DecodeError> {
        let v = self.as_unsigned()?;
        u8::try_from(v).map_err(|_| DecodeError::OutOfRange {
            value: v,
            target: "u8",
        })
    }

    pub fn as_u16(&self) -> Result<u16, DecodeError> {
        let v = self.as_unsigned()?;
        u16::try_from(v).map_err(|_| DecodeError::OutOfRange {
            value: v,
            target: "u16",
        })
    }

    pub fn as_str(&self) -> Result<&str, DecodeError> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(other.mismatch(ValueKind::String)),
        }
    }

    pub fn as_list(&self) -> Result<&[Value], DecodeError> {
        match self {
            Value::List(items) => Ok(items),
            other => Err(other.mismatch(ValueKind::List)),
        }
    }

    pub fn as_struct(&self) -> Result<&BTreeMap<u8, Value>, DecodeError> {
        match self {
            Value::Struct(fields) => Ok(fields),
            other => Err(other.mismatch(ValueKind::Struct)),
        }
    }

    /// Looks up a mandatory structure field.
    pub fn field(&self, tag: u8, name: &'static str) -> Result<&Value, DecodeError> {
        self.as_struct()?
            .get(&tag)
            .ok_or(DecodeError::MissingField { tag, name })
    }

    /// Looks up an optional structure field. A present `Null` counts as absent.
    pub fn optional_field(&self, tag: u8) -> Result<Option<&Value>, DecodeError> {
        Ok(self
            .as_struct()?
            .get(&tag)
            .filter(|v| !matches!(v, Value::Null)))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::Unsigned(v.into())
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::Unsigned(v.into())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

/// Annotates a field decode failure with the field name.
pub(crate) fn in_field<T>(
    name: &'static str,
    result: Result<T, DecodeError>,
) -> Result<T, DecodeError> {
    result.map_err(|e| DecodeError::InField {
        name,
        source: Box::new(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrowing_checks_range() {
        assert_eq!(Value::Unsigned(255).as_u8(), Ok(255));
        assert_eq!(
            Value::Unsigned(256).as_u8(),
            Err(DecodeError::OutOfRange {
                value: 256,
                target: "u8"
            })
        );
    }

    #[test]
    fn kind_mismatch_is_reported() {
        let err = Value::from("x").as_unsigned().unwrap_err();
        assert_eq!(err.to_string(), "expected unsigned integer, found string");
    }

    #[test]
    fn struct_fields() {
        let v = Value::structure([(0, Value::from(3u8)), (1, Value::Null)]);
        assert_eq!(v.field(0, "a").unwrap(), &Value::Unsigned(3));
        assert_eq!(
            v.field(2, "c"),
            Err(DecodeError::MissingField { tag: 2, name: "c" })
        );
        assert_eq!(v.optional_field(1), Ok(None));
        assert!(Value::Null.optional_field(0).is_err());
    }
}
