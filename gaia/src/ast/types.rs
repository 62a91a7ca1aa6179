//! Type representation

use serde::{Deserialize, Serialize};

/// The closed set of Gaia types.
///
/// `Int` and `Float` in source are aliases resolved at name lookup to
/// `Int64` and `Float64`; the display names keep the aliases because that
/// is what diagnostics print.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Void,
    Int8,
    Int16,
    Int32,
    Int64,
    Bool,
    Float32,
    Float64,
    /// Pointer to byte at the LLVM level
    String,
    /// The type of the `null` literal; no runtime representation
    Null,
    Pointer(Box<Type>),
}

impl Type {
    /// Resolve a source-level type name
    pub fn from_name(name: &str) -> Option<Type> {
        match name {
            "Void" => Some(Type::Void),
            "Int8" => Some(Type::Int8),
            "Int16" => Some(Type::Int16),
            "Int32" => Some(Type::Int32),
            "Int64" | "Int" => Some(Type::Int64),
            "Bool" => Some(Type::Bool),
            "Float32" => Some(Type::Float32),
            "Float64" | "Float" => Some(Type::Float64),
            "String" => Some(Type::String),
            _ => None,
        }
    }

    /// The `Int` of the primitive-operator table (64-bit)
    pub fn is_int(&self) -> bool {
        matches!(self, Type::Int64)
    }

    /// The `Float` of the primitive-operator table (64-bit)
    pub fn is_float(&self) -> bool {
        matches!(self, Type::Float64)
    }

    /// Types accepted by the primitive arithmetic operators
    pub fn is_arithmetic(&self) -> bool {
        self.is_int() || self.is_float()
    }

    /// The LLVM spelling of this type
    pub fn llvm_name(&self) -> &'static str {
        match self {
            Type::Void => "void",
            Type::Int8 => "i8",
            Type::Int16 => "i16",
            Type::Int32 => "i32",
            Type::Int64 => "i64",
            Type::Bool => "i1",
            Type::Float32 => "float",
            Type::Float64 => "double",
            Type::String | Type::Null | Type::Pointer(_) => "ptr",
        }
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Void => write!(f, "Void"),
            Type::Int8 => write!(f, "Int8"),
            Type::Int16 => write!(f, "Int16"),
            Type::Int32 => write!(f, "Int32"),
            Type::Int64 => write!(f, "Int"),
            Type::Bool => write!(f, "Bool"),
            Type::Float32 => write!(f, "Float32"),
            Type::Float64 => write!(f, "Float"),
            Type::String => write!(f, "String"),
            Type::Null => write!(f, "Null"),
            Type::Pointer(inner) => write!(f, "*{inner}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases() {
        assert_eq!(Type::from_name("Int"), Some(Type::Int64));
        assert_eq!(Type::from_name("Int64"), Some(Type::Int64));
        assert_eq!(Type::from_name("Float"), Some(Type::Float64));
        assert_eq!(Type::from_name("Float64"), Some(Type::Float64));
        assert_eq!(Type::from_name("Complex"), None);
    }

    #[test]
    fn test_display_uses_alias_names() {
        assert_eq!(Type::Int64.to_string(), "Int");
        assert_eq!(Type::Float64.to_string(), "Float");
        assert_eq!(Type::Int32.to_string(), "Int32");
    }

    #[test]
    fn test_llvm_names() {
        assert_eq!(Type::Bool.llvm_name(), "i1");
        assert_eq!(Type::Int64.llvm_name(), "i64");
        assert_eq!(Type::Float64.llvm_name(), "double");
        assert_eq!(Type::String.llvm_name(), "ptr");
        assert_eq!(Type::Void.llvm_name(), "void");
    }
}
