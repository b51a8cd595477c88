use serde_json::{json, Value};
use std::fmt::{Display, Formatter};

/// Type of a workflow port, following the registry grammar: a base name,
/// an optional `[]` array suffix and an optional `?` nullable suffix, or an
/// enumeration when the registry lists `options`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CwlType {
    File,
    Directory,
    String,
    Int,
    Long,
    Float,
    Double,
    Boolean,
    Any,
    /// Handled opaquely; rendered as `Any`.
    Record,
    Enum(Vec<String>),
    Named(String),
    Array(Box<CwlType>),
    Nullable(Box<CwlType>),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CwlTypeError {
    #[error("type declaration `{0}` has no base type")]
    MissingBase(String),
    #[error("type declaration `{0}` contains whitespace")]
    Whitespace(String),
}

impl CwlType {
    /// Parses a declared type. A missing declaration means `File`.
    pub fn declared(declaration: Option<&str>, options: &[String]) -> Result<Self, CwlTypeError> {
        let Some(raw) = declaration.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Ok(CwlType::File);
        };
        if raw.chars().any(char::is_whitespace) {
            return Err(CwlTypeError::Whitespace(raw.to_string()));
        }

        let (rest, nullable) = match raw.strip_suffix('?') {
            Some(rest) => (rest, true),
            None => (raw, false),
        };
        let mut depth = 0;
        let mut base = rest;
        while let Some(inner) = base.strip_suffix("[]") {
            depth += 1;
            base = inner;
        }
        if base.is_empty() {
            return Err(CwlTypeError::MissingBase(raw.to_string()));
        }

        let mut parsed = if options.is_empty() {
            Self::base(base)
        } else {
            CwlType::Enum(options.to_vec())
        };
        for _ in 0..depth {
            parsed = CwlType::Array(Box::new(parsed));
        }
        Ok(if nullable { parsed.nullable() } else { parsed })
    }

    fn base(name: &str) -> Self {
        match name {
            "File" => CwlType::File,
            "Directory" => CwlType::Directory,
            "string" => CwlType::String,
            "int" => CwlType::Int,
            "long" => CwlType::Long,
            "float" => CwlType::Float,
            "double" => CwlType::Double,
            "boolean" => CwlType::Boolean,
            "Any" => CwlType::Any,
            "record" => CwlType::Record,
            other => CwlType::Named(other.to_string()),
        }
    }

    pub fn nullable(self) -> Self {
        match self {
            CwlType::Nullable(_) => self,
            other => CwlType::Nullable(Box::new(other)),
        }
    }

    /// Wraps the non-null part in an array, as a scattered step does to its ports.
    pub fn array_of(self) -> Self {
        match self {
            CwlType::Nullable(inner) => CwlType::Array(inner),
            other => CwlType::Array(Box::new(other)),
        }
    }

    pub fn non_null(&self) -> &CwlType {
        match self {
            CwlType::Nullable(inner) => inner,
            other => other,
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, CwlType::Nullable(_))
    }

    /// True for a single `File` or `Directory`, the only types that scatter.
    pub fn is_file_like(&self) -> bool {
        matches!(self, CwlType::File | CwlType::Directory)
    }

    pub fn is_record(&self) -> bool {
        matches!(self.non_null(), CwlType::Record)
    }

    pub fn to_value(&self) -> Value {
        match self {
            CwlType::Enum(symbols) => json!({ "type": "enum", "symbols": symbols }),
            CwlType::Array(items) => json!({ "type": "array", "items": items.to_value() }),
            CwlType::Nullable(inner) => json!(["null", inner.to_value()]),
            CwlType::Named(name) => Value::String(name.clone()),
            primitive => Value::String(primitive.primitive_name().to_string()),
        }
    }

    fn primitive_name(&self) -> &'static str {
        match self {
            CwlType::File => "File",
            CwlType::Directory => "Directory",
            CwlType::String => "string",
            CwlType::Int => "int",
            CwlType::Long => "long",
            CwlType::Float => "float",
            CwlType::Double => "double",
            CwlType::Boolean => "boolean",
            _ => "Any",
        }
    }

    /// Stand-in value for a job file entry the user still has to fill.
    pub fn placeholder(&self) -> Value {
        match self {
            CwlType::File => json!({ "class": "File", "path": "a/file/path" }),
            CwlType::Directory => json!({ "class": "Directory", "path": "a/directory/path" }),
            CwlType::String => json!("a_string"),
            CwlType::Int | CwlType::Long => json!(0),
            CwlType::Float | CwlType::Double => json!(0.1),
            CwlType::Boolean => json!(false),
            CwlType::Enum(symbols) => symbols
                .first()
                .map(|symbol| Value::String(symbol.clone()))
                .unwrap_or(Value::Null),
            CwlType::Array(items) => Value::Array(vec![items.placeholder()]),
            CwlType::Nullable(inner) => inner.placeholder(),
            CwlType::Any | CwlType::Record | CwlType::Named(_) => Value::Null,
        }
    }

    /// Zero value for an optional scalar; numeric types start at the lower bound.
    /// A type declared nullable (`int?`) has none, so it stays unset.
    pub fn zero_value(&self, lower_bound: Option<&Value>) -> Option<Value> {
        match self {
            CwlType::Boolean => Some(json!(false)),
            CwlType::Int | CwlType::Long => Some(lower_bound.cloned().unwrap_or(json!(0))),
            CwlType::Float | CwlType::Double => Some(lower_bound.cloned().unwrap_or(json!(0.0))),
            CwlType::String => Some(json!("")),
            _ => None,
        }
    }
}

impl Display for CwlType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CwlType::Enum(symbols) => write!(f, "enum({})", symbols.join("|")),
            CwlType::Array(items) => write!(f, "{items}[]"),
            CwlType::Nullable(inner) => write!(f, "{inner}?"),
            CwlType::Named(name) => f.write_str(name),
            CwlType::Record => f.write_str("record"),
            primitive => f.write_str(primitive.primitive_name()),
        }
    }
}

#[cfg(test)]
#[path = "cwl_type_test.rs"]
mod tests;
