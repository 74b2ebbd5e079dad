//! Decoded field values and wildcard-aware structural equality.
//!
//! A [`Field`] is one node of a decoded trace value tree. Equality between
//! fields is not expressed through `PartialEq`: the
//! [`Field::Ignore`] wildcard matches everything, which makes the relation
//! non-transitive. Use [`equal`] instead.

use std::fmt;

use indexmap::IndexMap;

/// One decoded value node.
#[derive(Debug, Clone)]
pub enum Field {
    /// Wildcard: compares equal to any field.
    Ignore,
    /// Wide enough for every signed and unsigned 64-bit value.
    Integer(i128),
    Float(f64),
    String(String),
    /// Enumeration item; only the label takes part in equality.
    Enum(String),
    /// Position-significant sequence.
    Array(Vec<Field>),
    /// Named members; insertion order is kept for display only.
    Struct(IndexMap<String, Field>),
}

impl Field {
    pub fn is_ignore(&self) -> bool {
        matches!(self, Field::Ignore)
    }
}

/// Structural equality between two fields.
///
/// - `Ignore` on either side matches anything, checked before anything else.
/// - Scalars compare by value; floats use exact host equality.
/// - Enums compare by label only.
/// - Arrays must have the same length and pairwise equal elements.
/// - Structs must have the same member names and pairwise equal members,
///   regardless of member order.
/// - Any other variant pairing is unequal.
pub fn equal(a: &Field, b: &Field) -> bool {
    if a.is_ignore() || b.is_ignore() {
        return true;
    }

    match (a, b) {
        (Field::Integer(a), Field::Integer(b)) => a == b,
        (Field::Float(a), Field::Float(b)) => a == b,
        (Field::String(a), Field::String(b)) => a == b,
        (Field::Enum(a), Field::Enum(b)) => a == b,

        (Field::Array(arr_a), Field::Array(arr_b)) => {
            if arr_a.len() != arr_b.len() {
                return false;
            }
            arr_a.iter().zip(arr_b).all(|(x, y)| equal(x, y))
        }

        (Field::Struct(obj_a), Field::Struct(obj_b)) => {
            if obj_a.len() != obj_b.len() {
                return false;
            }
            // Names are unique on both sides, so equal sizes plus every name
            // of `a` being present in `b` means the name sets are identical.
            obj_a.iter().all(|(name, val_a)| match obj_b.get(name) {
                Some(val_b) => equal(val_a, val_b),
                None => false,
            })
        }

        _ => false,
    }
}

/// Equality for optional fields: absence only matches absence.
pub fn equal_opt(a: Option<&Field>, b: Option<&Field>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => equal(a, b),
        _ => false,
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Ignore => f.write_str("*"),
            Field::Integer(v) => write!(f, "{v}"),
            Field::Float(v) => write!(f, "{v:?}"),
            Field::String(v) => write!(f, "{v:?}"),
            Field::Enum(label) => write!(f, "enum({label})"),
            Field::Array(elements) => {
                f.write_str("[")?;
                for (i, elem) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{elem}")?;
                }
                f.write_str("]")
            }
            Field::Struct(fields) => {
                f.write_str("{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}
