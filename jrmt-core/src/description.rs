//! Service descriptions returned by `system.describe`
//!
//! A JSON-RPC 1.1 service lists its procedures and their parameter schemas:
//!
//! ```json
//! {
//!   "sdversion": "1.0",
//!   "name": "calculator",
//!   "procs": [
//!     {"name": "add", "params": [{"name": "a", "type": "num"}, {"name": "b", "type": "num"}]}
//!   ]
//! }
//! ```
//!
//! [`ServiceDescription`] is built once from that value and only read
//! afterwards. Procedures are keyed by `(name, arity)`, so a service may
//! overload a name by parameter count but not by parameter type.

use crate::coerce::TypeTag;
use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Reserved procedure that returns the service description
pub const DESCRIBE_PROCEDURE: &str = "system.describe";

fn default_type_tag() -> String {
    TypeTag::Any.as_str().to_string()
}

// Optional members are read leniently: a mistyped value counts as absent.

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_name<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.unwrap_or_default())
}

fn lenient_type_tag<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => default_type_tag(),
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    })
}

// `return` is normally a parameter object; a bare tag string is accepted too.
fn lenient_return<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<ParameterDescription>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value).ok(),
        Value::String(tag) => Some(ParameterDescription::new("", tag)),
        _ => None,
    })
}

/// One parameter (or the return value) of a procedure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDescription {
    /// Parameter name, empty when the peer omits it
    #[serde(default, deserialize_with = "lenient_name")]
    pub name: String,
    /// Declared type tag as received; `any` when the peer omits it
    #[serde(
        rename = "type",
        default = "default_type_tag",
        deserialize_with = "lenient_type_tag"
    )]
    pub type_tag: String,
}

impl ParameterDescription {
    /// Create a parameter description
    pub fn new(name: impl Into<String>, type_tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_tag: type_tag.into(),
        }
    }

    /// Parse the declared tag
    ///
    /// The tag is stored verbatim so a description with an unfamiliar tag
    /// still loads; the error only surfaces when the tag is used.
    pub fn type_tag(&self) -> Result<TypeTag> {
        self.type_tag.parse()
    }

    /// Coerce a textual argument to this parameter's declared type
    pub fn coerce(&self, value: &str) -> Result<Value> {
        crate::coerce::coerce(value, &self.type_tag)
    }
}

/// A remotely invocable procedure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcedureDescription {
    /// Procedure name
    pub name: String,
    /// Parameters in positional order
    pub params: Vec<ParameterDescription>,
    /// Return value description
    #[serde(
        rename = "return",
        default,
        deserialize_with = "lenient_return",
        skip_serializing_if = "Option::is_none"
    )]
    pub return_description: Option<ParameterDescription>,
    /// Short summary
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub summary: Option<String>,
    /// Help text or URL
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub help: Option<String>,
    /// Whether the procedure is safe to repeat
    #[serde(default, deserialize_with = "lenient_bool")]
    pub idempotent: bool,
}

impl ProcedureDescription {
    /// Create a procedure description with the given parameters
    pub fn new(name: impl Into<String>, params: Vec<ParameterDescription>) -> Self {
        Self {
            name: name.into(),
            params,
            return_description: None,
            summary: None,
            help: None,
            idempotent: false,
        }
    }

    /// Set the return type tag
    pub fn returning(mut self, type_tag: impl Into<String>) -> Self {
        self.return_description = Some(ParameterDescription::new("", type_tag));
        self
    }

    /// Number of declared parameters
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Declared return type tag, `any` when not declared
    pub fn return_type(&self) -> &str {
        self.return_description
            .as_ref()
            .map(|r| r.type_tag.as_str())
            .unwrap_or("any")
    }

    /// Coerce positional textual arguments using the declared parameter types
    ///
    /// `args` must have exactly [`arity`](Self::arity) elements.
    pub fn coerce_args<S: AsRef<str>>(&self, args: &[S]) -> Result<Vec<Value>> {
        if args.len() != self.arity() {
            return Err(Error::InvalidParams(format!(
                "{} expects {} arguments, got {}",
                self.name,
                self.arity(),
                args.len()
            )));
        }
        self.params
            .iter()
            .zip(args)
            .map(|(param, arg)| param.coerce(arg.as_ref()))
            .collect()
    }
}

// Wire shape; turned into ServiceDescription after validation.
#[derive(Deserialize)]
struct RawServiceDescription {
    #[serde(default, deserialize_with = "lenient_string")]
    sdversion: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    version: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    help: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    address: Option<String>,
    procs: Vec<ProcedureDescription>,
}

/// Catalog of a remote service's procedures
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDescription {
    /// Service description format version (`sdversion`)
    pub sdversion: Option<String>,
    /// Service name
    pub name: Option<String>,
    /// Service identifier
    pub id: Option<String>,
    /// Service version
    pub version: Option<String>,
    /// Short summary
    pub summary: Option<String>,
    /// Help text or URL
    pub help: Option<String>,
    /// Service address
    pub address: Option<String>,
    procedures: Vec<ProcedureDescription>,
    index: HashMap<(String, usize), usize>,
}

impl ServiceDescription {
    /// Build a description from the decoded `system.describe` result
    ///
    /// Fails with [`Error::MalformedDescription`] when the value is not an
    /// object, or when `procs` or any procedure's `name`/`params` is missing
    /// or has the wrong type.
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::MalformedDescription(format!(
                "expected an object, got {}",
                json_type_name(&value)
            )));
        }
        let raw: RawServiceDescription = serde_json::from_value(value)
            .map_err(|e| Error::MalformedDescription(e.to_string()))?;

        let mut description = Self::from_procedures(raw.procs);
        description.sdversion = raw.sdversion;
        description.name = raw.name;
        description.id = raw.id;
        description.version = raw.version;
        description.summary = raw.summary;
        description.help = raw.help;
        description.address = raw.address;
        Ok(description)
    }

    /// Build an anonymous description from a list of procedures
    ///
    /// A later procedure with the same name and arity replaces an earlier one
    /// for lookup; both stay listed by [`procedures`](Self::procedures).
    pub fn from_procedures(procedures: Vec<ProcedureDescription>) -> Self {
        let index = procedures
            .iter()
            .enumerate()
            .map(|(position, proc)| ((proc.name.clone(), proc.arity()), position))
            .collect();
        Self {
            sdversion: None,
            name: None,
            id: None,
            version: None,
            summary: None,
            help: None,
            address: None,
            procedures,
            index,
        }
    }

    /// Look up the procedure with exactly this name and parameter count
    pub fn get_procedure(&self, name: &str, arity: usize) -> Result<&ProcedureDescription> {
        self.index
            .get(&(name.to_string(), arity))
            .map(|&position| &self.procedures[position])
            .ok_or_else(|| Error::ProcedureNotFound {
                name: name.to_string(),
                arity,
            })
    }

    /// Whether a procedure with this name and arity is described
    pub fn contains(&self, name: &str, arity: usize) -> bool {
        self.index.contains_key(&(name.to_string(), arity))
    }

    /// All procedures in declaration order
    pub fn procedures(&self) -> impl Iterator<Item = &ProcedureDescription> {
        self.procedures.iter()
    }

    /// Number of declared procedures
    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    /// True when the service declares no procedures
    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
