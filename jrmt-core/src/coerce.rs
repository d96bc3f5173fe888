//! Coercion of textual arguments into declared parameter types
//!
//! A service description declares each parameter with a short type tag.
//! When arguments arrive as plain strings (for example from a command line),
//! [`coerce`] turns them into the JSON value the peer expects.
//!
//! | tag                 | result                                          |
//! |---------------------|-------------------------------------------------|
//! | `bit`               | `true` for "true" (any case), otherwise `false` |
//! | `num`               | integer if it parses as one, else a float       |
//! | `str`               | the text unchanged                              |
//! | `arr`, `obj`, `any` | the text parsed as JSON                         |
//! | `nil`               | `null`, input ignored                           |
//!
//! # Examples
//!
//! ```rust
//! use jrmt_core::coerce::coerce;
//! use serde_json::json;
//!
//! assert_eq!(coerce("42", "num").unwrap(), json!(42));
//! assert_eq!(coerce("4.5", "num").unwrap(), json!(4.5));
//! assert_eq!(coerce("[1, 2]", "arr").unwrap(), json!([1, 2]));
//! assert!(coerce("x", "blob").is_err());
//! ```

use crate::error::{Error, Result};
use serde_json::{Number, Value};
use std::fmt;
use std::str::FromStr;

/// Parameter type tags understood by service descriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// Boolean
    Bit,
    /// Integer or floating-point number
    Num,
    /// String
    Str,
    /// Array
    Arr,
    /// Object
    Obj,
    /// Any JSON value
    Any,
    /// Null
    Nil,
}

impl TypeTag {
    /// Every tag, in declaration order
    pub const ALL: [TypeTag; 7] = [
        TypeTag::Bit,
        TypeTag::Num,
        TypeTag::Str,
        TypeTag::Arr,
        TypeTag::Obj,
        TypeTag::Any,
        TypeTag::Nil,
    ];

    /// Wire spelling of the tag
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Bit => "bit",
            TypeTag::Num => "num",
            TypeTag::Str => "str",
            TypeTag::Arr => "arr",
            TypeTag::Obj => "obj",
            TypeTag::Any => "any",
            TypeTag::Nil => "nil",
        }
    }

    /// Convert `value` to a JSON value of this type
    pub fn coerce(&self, value: &str) -> Result<Value> {
        match self {
            TypeTag::Bit => Ok(Value::Bool(value.eq_ignore_ascii_case("true"))),
            TypeTag::Num => coerce_number(value),
            TypeTag::Str => Ok(Value::String(value.to_string())),
            TypeTag::Arr | TypeTag::Obj | TypeTag::Any => serde_json::from_str(value)
                .map_err(|e| Error::coercion(value, self.as_str(), e)),
            TypeTag::Nil => Ok(Value::Null),
        }
    }
}

impl FromStr for TypeTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TypeTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| Error::UnknownType(s.to_string()))
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convert `value` according to the type tag spelled `type_tag`
///
/// Fails with [`Error::UnknownType`] for an unrecognised tag and with
/// [`Error::Coercion`] when the text does not fit the tag.
pub fn coerce(value: &str, type_tag: &str) -> Result<Value> {
    type_tag.parse::<TypeTag>()?.coerce(value)
}

// Integer first so "3" stays an integer on the wire.
fn coerce_number(value: &str) -> Result<Value> {
    if let Ok(n) = value.parse::<i64>() {
        return Ok(Value::Number(n.into()));
    }
    let float = value
        .parse::<f64>()
        .map_err(|e| Error::coercion(value, "num", e))?;
    Number::from_f64(float)
        .map(Value::Number)
        .ok_or_else(|| Error::coercion(value, "num", "not a finite number"))
}
