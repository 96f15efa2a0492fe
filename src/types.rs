//! Structural layouts and path-aware JSON validation.

use std::fmt;

use serde_json::Value;

/// Structural type descriptors for shape columns and their JSON payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDef {
    Int,
    Double,
    List(Box<TypeDef>),
    Object(Vec<FieldDef>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: &'static str,
    pub ty: TypeDef,
}

impl FieldDef {
    pub fn new(name: &'static str, ty: TypeDef) -> Self {
        Self { name, ty }
    }
}

impl TypeDef {
    pub fn list(inner: TypeDef) -> Self {
        TypeDef::List(Box::new(inner))
    }

    /// Compact engine-style rendering, e.g. `struct<type:int,x:double,y:double>`.
    pub fn simple_string(&self) -> String {
        use TypeDef::*;

        match self {
            Int => "int".to_string(),
            Double => "double".to_string(),
            List(inner) => format!("array<{}>", inner.simple_string()),
            Object(fields) => {
                let inner = fields
                    .iter()
                    .map(|f| format!("{}:{}", f.name, f.ty.simple_string()))
                    .collect::<Vec<_>>()
                    .join(",");
                format!("struct<{inner}>")
            }
        }
    }
}

/// Single validation error, with a JSON path.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    MissingField { path: String },
    TypeMismatch { path: String, expected: &'static str, found: &'static str },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingField { path } => {
                write!(f, "missing required field at path {path}")
            }
            ValidationError::TypeMismatch { path, expected, found } => {
                write!(f, "type mismatch at {path}: expected {expected}, found {found}")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate a serde_json::Value against a TypeDef.
///
/// Returns Ok(()) if everything matches, or Err(vec![]) with one or more errors.
pub fn validate(ty: &TypeDef, value: &Value) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    validate_inner(ty, value, "$", &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_inner(ty: &TypeDef, value: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    use TypeDef::*;

    let expected = match ty {
        Int if value.is_i64() || value.is_u64() => return,
        Int => "integer",
        Double if value.is_number() => return,
        Double => "number",
        List(inner) => {
            if let Value::Array(items) = value {
                for (idx, item) in items.iter().enumerate() {
                    let child_path = format!("{path}[{idx}]");
                    validate_inner(inner, item, &child_path, errors);
                }
                return;
            }
            "array"
        }
        Object(fields) => {
            let Some(obj) = value.as_object() else {
                errors.push(ValidationError::TypeMismatch {
                    path: path.to_string(),
                    expected: "object",
                    found: value_type_name(value),
                });
                return;
            };

            for field in fields {
                let field_path = format!("{path}.{}", field.name);
                match obj.get(field.name) {
                    None => errors.push(ValidationError::MissingField { path: field_path }),
                    Some(v) => validate_inner(&field.ty, v, &field_path, errors),
                }
            }

            // Extra keys are ignored so envelopes can carry `pyClass` alongside the payload.
            return;
        }
    };

    errors.push(ValidationError::TypeMismatch {
        path: path.to_string(),
        expected,
        found: value_type_name(value),
    });
}

fn value_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn point_def() -> TypeDef {
        TypeDef::Object(vec![
            FieldDef::new("x", TypeDef::Double),
            FieldDef::new("y", TypeDef::Double),
        ])
    }

    #[test]
    fn accepts_integers_where_doubles_are_expected() {
        assert!(validate(&point_def(), &json!({"x": 1, "y": 2.5})).is_ok());
    }

    #[test]
    fn reports_missing_and_mismatched_fields_with_paths() {
        let def = TypeDef::Object(vec![
            FieldDef::new("indices", TypeDef::list(TypeDef::Int)),
            FieldDef::new("points", TypeDef::list(point_def())),
        ]);
        let errors = validate(&def, &json!({"indices": [0, 1.5], "points": [{"x": "a"}]}))
            .unwrap_err();

        assert_eq!(
            errors,
            vec![
                ValidationError::TypeMismatch {
                    path: "$.indices[1]".to_string(),
                    expected: "integer",
                    found: "number",
                },
                ValidationError::TypeMismatch {
                    path: "$.points[0].x".to_string(),
                    expected: "number",
                    found: "string",
                },
                ValidationError::MissingField {
                    path: "$.points[0].y".to_string(),
                },
            ]
        );
    }

    #[test]
    fn non_object_root_is_a_single_mismatch() {
        let errors = validate(&point_def(), &json!([1, 2])).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "type mismatch at $: expected object, found array");
    }

    #[test]
    fn simple_string_renders_nested_layouts() {
        let def = TypeDef::Object(vec![
            FieldDef::new("type", TypeDef::Int),
            FieldDef::new("points", TypeDef::list(point_def())),
        ]);
        assert_eq!(
            def.simple_string(),
            "struct<type:int,points:array<struct<x:double,y:double>>>"
        );
    }
}
