//! The type model of the source language.
//!
//! [`SymbolType`] is a closed sum over every type an expression can have.
//! Aggregates that carry names or member tables ([`FunctionType`],
//! [`StructType`], [`UnionType`]) are reference counted so types stay cheap to
//! clone while the checker passes them around.
//!
//! The `Display` form of a type is what diagnostics print:
//!
//! ```text
//! u8   u16   bool   void   const u8   integer constant 5   boolean constant false
//! *Foo   [3]u8   [_]u16   []u8   u8 | bool   (u8, u16) -> bool   Foo
//! ```

use std::fmt;
use std::rc::Rc;

use crate::{Symbol, SymbolTable};

/// Largest value of a `u8`.
pub const U8_MAX: i64 = 0xff;
/// Largest value of a `u16`.
pub const U16_MAX: i64 = 0xffff;

/// Name of the built-in struct produced by range expressions.
pub const RANGE_TYPE_NAME: &str = "Range";

// ============================================================================
// SymbolType
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolType {
    Void,
    Bool,
    U8,
    U16,
    /// A compile-time integer. Only literals and expressions over them.
    CompTimeInt(i64),
    /// A compile-time boolean.
    CompTimeBool(bool),
    Pointer(Box<SymbolType>),
    /// Const-qualified view of the inner type. Never nested.
    Const(Box<SymbolType>),
    /// Fixed-size array. `count` is `None` while it is still to be inferred.
    Array {
        count: Option<usize>,
        element: Box<SymbolType>,
    },
    /// Runtime slice: a `(base, count)` pair of words.
    DynamicArray(Box<SymbolType>),
    Function(Rc<FunctionType>),
    Struct(Rc<StructType>),
    Union(Rc<UnionType>),
}

impl SymbolType {
    pub fn pointer(pointee: SymbolType) -> Self {
        SymbolType::Pointer(Box::new(pointee))
    }

    pub fn array(count: Option<usize>, element: SymbolType) -> Self {
        SymbolType::Array {
            count,
            element: Box::new(element),
        }
    }

    pub fn dynamic_array(element: SymbolType) -> Self {
        SymbolType::DynamicArray(Box::new(element))
    }

    pub fn union_of(members: Vec<SymbolType>) -> Self {
        SymbolType::Union(Rc::new(UnionType { members }))
    }

    /// The const-qualified variant. Compile-time types are already immutable
    /// and are returned unchanged.
    pub fn const_of(self) -> Self {
        match self {
            SymbolType::Const(_)
            | SymbolType::CompTimeInt(_)
            | SymbolType::CompTimeBool(_)
            | SymbolType::Void => self,
            other => SymbolType::Const(Box::new(other)),
        }
    }

    /// The type with any const qualifier removed.
    pub fn unqualified(&self) -> &SymbolType {
        match self {
            SymbolType::Const(inner) => inner,
            other => other,
        }
    }

    pub fn into_unqualified(self) -> SymbolType {
        match self {
            SymbolType::Const(inner) => *inner,
            other => other,
        }
    }

    pub fn is_const(&self) -> bool {
        matches!(self, SymbolType::Const(_))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, SymbolType::Void)
    }

    pub fn is_comptime(&self) -> bool {
        matches!(self, SymbolType::CompTimeInt(_) | SymbolType::CompTimeBool(_))
    }

    /// `u8`, `u16` or a compile-time integer, ignoring const.
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self.unqualified(),
            SymbolType::U8 | SymbolType::U16 | SymbolType::CompTimeInt(_)
        )
    }

    /// `bool` or a compile-time boolean, ignoring const.
    pub fn is_boolean(&self) -> bool {
        matches!(
            self.unqualified(),
            SymbolType::Bool | SymbolType::CompTimeBool(_)
        )
    }

    /// Size of a value of this type in bytes.
    pub fn size(&self) -> usize {
        match self {
            SymbolType::Void
            | SymbolType::CompTimeInt(_)
            | SymbolType::CompTimeBool(_)
            | SymbolType::Function(_) => 0,
            SymbolType::Bool | SymbolType::U8 => 1,
            SymbolType::U16 | SymbolType::Pointer(_) => 2,
            SymbolType::DynamicArray(_) => 4,
            SymbolType::Const(inner) => inner.size(),
            SymbolType::Array { count, element } => count.unwrap_or(0) * element.size(),
            SymbolType::Struct(ty) => ty.size(),
            SymbolType::Union(ty) => ty.size(),
        }
    }

    /// Largest value representable by a concrete integer type.
    pub fn max_value(&self) -> Option<i64> {
        match self.unqualified() {
            SymbolType::U8 => Some(U8_MAX),
            SymbolType::U16 => Some(U16_MAX),
            _ => None,
        }
    }

    /// Concrete integer class of an arithmetic type: `U8` or `U16`.
    ///
    /// A compile-time integer maps to the narrowest class containing its
    /// value, or `None` when no class can hold it.
    pub fn arithmetic_class(&self) -> Option<SymbolType> {
        match self.unqualified() {
            SymbolType::U8 => Some(SymbolType::U8),
            SymbolType::U16 => Some(SymbolType::U16),
            SymbolType::CompTimeInt(value) => match *value {
                0..=U8_MAX => Some(SymbolType::U8),
                0..=U16_MAX => Some(SymbolType::U16),
                _ => None,
            },
            _ => None,
        }
    }

    /// The concrete type a compile-time value is stored as.
    pub fn materialized(&self) -> Option<SymbolType> {
        match self {
            SymbolType::CompTimeInt(_) => self.arithmetic_class(),
            SymbolType::CompTimeBool(_) => Some(SymbolType::Bool),
            other => Some(other.clone()),
        }
    }

    /// Element type of an array or slice, seen through const.
    ///
    /// Elements of a const array are const.
    pub fn element_type(&self) -> Option<SymbolType> {
        let element = match self.unqualified() {
            SymbolType::Array { element, .. } | SymbolType::DynamicArray(element) => {
                element.as_ref().clone()
            }
            _ => return None,
        };
        Some(if self.is_const() {
            element.const_of()
        } else {
            element
        })
    }

    pub fn array_count(&self) -> Option<usize> {
        match self.unqualified() {
            SymbolType::Array { count, .. } => *count,
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Rc<FunctionType>> {
        match self.unqualified() {
            SymbolType::Function(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Rc<StructType>> {
        match self.unqualified() {
            SymbolType::Struct(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn as_union(&self) -> Option<&Rc<UnionType>> {
        match self.unqualified() {
            SymbolType::Union(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn pointee(&self) -> Option<&SymbolType> {
        match self.unqualified() {
            SymbolType::Pointer(pointee) => Some(pointee),
            _ => None,
        }
    }

    /// Whether this is the built-in `Range` struct.
    pub fn is_range(&self) -> bool {
        self.as_struct()
            .is_some_and(|ty| ty.name == RANGE_TYPE_NAME)
    }

    /// Equality that ignores const qualification on both sides.
    pub fn same_modulo_const(&self, other: &SymbolType) -> bool {
        self.unqualified() == other.unqualified()
    }
}

impl fmt::Display for SymbolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolType::Void => write!(f, "void"),
            SymbolType::Bool => write!(f, "bool"),
            SymbolType::U8 => write!(f, "u8"),
            SymbolType::U16 => write!(f, "u16"),
            SymbolType::CompTimeInt(value) => write!(f, "integer constant {value}"),
            SymbolType::CompTimeBool(value) => write!(f, "boolean constant {value}"),
            SymbolType::Pointer(pointee) => write!(f, "*{pointee}"),
            SymbolType::Const(inner) => write!(f, "const {inner}"),
            SymbolType::Array {
                count: Some(count),
                element,
            } => write!(f, "[{count}]{element}"),
            SymbolType::Array {
                count: None,
                element,
            } => write!(f, "[_]{element}"),
            SymbolType::DynamicArray(element) => write!(f, "[]{element}"),
            SymbolType::Function(ty) => write!(f, "{ty}"),
            SymbolType::Struct(ty) => write!(f, "{}", ty.name),
            SymbolType::Union(ty) => write!(f, "{ty}"),
        }
    }
}

// ============================================================================
// Functions
// ============================================================================

/// Operations the compiler emits inline instead of calling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intrinsic {
    PeekMemory,
    PokeMemory,
    PeekPeripheral,
    PokePeripheral,
    Hlt,
}

impl Intrinsic {
    pub const ALL: [Intrinsic; 5] = [
        Intrinsic::PeekMemory,
        Intrinsic::PokeMemory,
        Intrinsic::PeekPeripheral,
        Intrinsic::PokePeripheral,
        Intrinsic::Hlt,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Intrinsic::PeekMemory => "peekMemory",
            Intrinsic::PokeMemory => "pokeMemory",
            Intrinsic::PeekPeripheral => "peekPeripheral",
            Intrinsic::PokePeripheral => "pokePeripheral",
            Intrinsic::Hlt => "hlt",
        }
    }

    /// The function type callers are checked against.
    pub fn function_type(self) -> FunctionType {
        let (return_type, arguments) = match self {
            Intrinsic::PeekMemory | Intrinsic::PeekPeripheral => {
                (SymbolType::U8, vec![SymbolType::U16])
            }
            Intrinsic::PokeMemory | Intrinsic::PokePeripheral => {
                (SymbolType::Void, vec![SymbolType::U8, SymbolType::U16])
            }
            Intrinsic::Hlt => (SymbolType::Void, Vec::new()),
        };
        FunctionType {
            name: Some(self.name().to_string()),
            return_type,
            arguments,
            label: None,
            intrinsic: Some(self),
        }
    }
}

/// Signature of a function, plus where its body lives.
///
/// Two function types are equal when their signatures are; the name, label
/// and intrinsic marker are bookkeeping.
#[derive(Debug, Clone)]
pub struct FunctionType {
    pub name: Option<String>,
    pub return_type: SymbolType,
    pub arguments: Vec<SymbolType>,
    /// Code label of the function body, for declared functions.
    pub label: Option<String>,
    pub intrinsic: Option<Intrinsic>,
}

impl FunctionType {
    /// An anonymous signature, as written in a type expression.
    pub fn signature(return_type: SymbolType, arguments: Vec<SymbolType>) -> Self {
        Self {
            name: None,
            return_type,
            arguments,
            label: None,
            intrinsic: None,
        }
    }

    /// Name used in diagnostics.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.to_string())
    }

    /// Total bytes of all arguments.
    pub fn arguments_size(&self) -> usize {
        self.arguments.iter().map(SymbolType::size).sum()
    }
}

impl PartialEq for FunctionType {
    fn eq(&self, other: &Self) -> bool {
        self.return_type == other.return_type && self.arguments == other.arguments
    }
}

impl Eq for FunctionType {}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (index, argument) in self.arguments.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{argument}")?;
        }
        write!(f, ") -> {}", self.return_type)
    }
}

// ============================================================================
// Structs and unions
// ============================================================================

/// A named record. Members are laid out in declaration order.
#[derive(Debug, Clone)]
pub struct StructType {
    pub name: String,
    pub members: SymbolTable,
}

impl StructType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: SymbolTable::new(),
        }
    }

    /// Append a member after the existing ones.
    pub fn push_member(&mut self, name: impl Into<String>, ty: SymbolType) {
        let size = ty.size();
        let offset = self.members.bump_storage_pointer(size);
        self.members
            .bind(name, Symbol::on_stack(ty, offset as i32));
    }

    pub fn member(&self, name: &str) -> Option<&Symbol> {
        self.members.lookup(name)
    }

    /// Members sorted by offset.
    pub fn members_in_order(&self) -> Vec<(&str, &Symbol)> {
        let mut members: Vec<_> = self.members.local_symbols().collect();
        members.sort_by_key(|(_, symbol)| symbol.offset);
        members
    }

    pub fn size(&self) -> usize {
        self.members.storage_pointer()
    }
}

impl PartialEq for StructType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for StructType {}

/// The built-in `Range { begin: u16, limit: u16 }`.
pub fn range_type() -> SymbolType {
    let mut range = StructType::new(RANGE_TYPE_NAME);
    range.push_member("begin", SymbolType::U16);
    range.push_member("limit", SymbolType::U16);
    SymbolType::Struct(Rc::new(range))
}

/// A tagged union. Byte 0 holds the index of the active member, the payload
/// follows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionType {
    pub members: Vec<SymbolType>,
}

impl UnionType {
    pub fn size(&self) -> usize {
        1 + self.members.iter().map(SymbolType::size).max().unwrap_or(0)
    }

    /// Tag of the member equal to `ty`, ignoring const.
    pub fn tag_of(&self, ty: &SymbolType) -> Option<u8> {
        self.members
            .iter()
            .position(|member| member.same_modulo_const(ty))
            .and_then(|index| u8::try_from(index).ok())
    }
}

impl fmt::Display for UnionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, member) in self.members.iter().enumerate() {
            if index > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{member}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn foo_struct() -> SymbolType {
        let mut foo = StructType::new("Foo");
        foo.push_member("bar", SymbolType::U16);
        foo.push_member("baz", SymbolType::U8);
        SymbolType::Struct(Rc::new(foo))
    }

    #[test]
    fn display_forms() {
        assert_eq!(SymbolType::U8.to_string(), "u8");
        assert_eq!(SymbolType::U8.const_of().to_string(), "const u8");
        assert_eq!(SymbolType::CompTimeInt(5).to_string(), "integer constant 5");
        assert_eq!(
            SymbolType::CompTimeBool(false).to_string(),
            "boolean constant false"
        );
        assert_eq!(SymbolType::array(Some(3), SymbolType::U8).to_string(), "[3]u8");
        assert_eq!(SymbolType::array(None, SymbolType::U16).to_string(), "[_]u16");
        assert_eq!(
            SymbolType::dynamic_array(SymbolType::U8).const_of().to_string(),
            "const []u8"
        );
        assert_eq!(SymbolType::pointer(foo_struct()).to_string(), "*Foo");
        assert_eq!(
            SymbolType::union_of(vec![SymbolType::U8, SymbolType::Bool]).to_string(),
            "u8 | bool"
        );
        let function = FunctionType::signature(
            SymbolType::Bool,
            vec![SymbolType::U8, SymbolType::U16],
        );
        assert_eq!(
            SymbolType::Function(Rc::new(function)).to_string(),
            "(u8, u16) -> bool"
        );
    }

    #[test]
    fn sizes() {
        assert_eq!(SymbolType::Void.size(), 0);
        assert_eq!(SymbolType::CompTimeInt(1000).size(), 0);
        assert_eq!(SymbolType::Bool.size(), 1);
        assert_eq!(SymbolType::U16.const_of().size(), 2);
        assert_eq!(SymbolType::array(Some(3), SymbolType::U16).size(), 6);
        assert_eq!(SymbolType::dynamic_array(SymbolType::U16).size(), 4);
        assert_eq!(foo_struct().size(), 3);
        assert_eq!(
            SymbolType::union_of(vec![SymbolType::U8, SymbolType::U16]).size(),
            3
        );
    }

    #[test]
    fn const_never_nests() {
        let once = SymbolType::U8.const_of();
        assert_eq!(once.clone().const_of(), once);
        assert_eq!(SymbolType::CompTimeInt(1).const_of(), SymbolType::CompTimeInt(1));
        assert_eq!(once.unqualified(), &SymbolType::U8);
    }

    #[test]
    fn arithmetic_class_of_constants() {
        assert_eq!(SymbolType::CompTimeInt(255).arithmetic_class(), Some(SymbolType::U8));
        assert_eq!(SymbolType::CompTimeInt(256).arithmetic_class(), Some(SymbolType::U16));
        assert_eq!(SymbolType::CompTimeInt(65536).arithmetic_class(), None);
        assert_eq!(SymbolType::CompTimeInt(-1).arithmetic_class(), None);
        assert_eq!(SymbolType::Bool.arithmetic_class(), None);
    }

    #[test]
    fn struct_layout_and_equality() {
        let foo = foo_struct();
        let ty = foo.as_struct().unwrap();
        assert_eq!(ty.member("bar").unwrap().offset, 0);
        assert_eq!(ty.member("baz").unwrap().offset, 2);
        let names: Vec<_> = ty.members_in_order().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["bar", "baz"]);
        assert_eq!(foo, foo_struct());
        assert!(range_type().is_range());
        assert!(!foo.is_range());
    }

    #[test]
    fn const_array_elements_are_const() {
        let array = SymbolType::array(Some(2), SymbolType::U8).const_of();
        assert_eq!(array.element_type(), Some(SymbolType::U8.const_of()));
        assert_eq!(array.array_count(), Some(2));
    }

    #[test]
    fn union_tags() {
        let union = UnionType {
            members: vec![SymbolType::U8, SymbolType::Bool],
        };
        assert_eq!(union.tag_of(&SymbolType::Bool), Some(1));
        assert_eq!(union.tag_of(&SymbolType::U8.const_of()), Some(0));
        assert_eq!(union.tag_of(&SymbolType::U16), None);
    }

    #[test]
    fn intrinsic_signatures() {
        let poke = Intrinsic::PokeMemory.function_type();
        assert_eq!(poke.arguments, [SymbolType::U8, SymbolType::U16]);
        assert_eq!(poke.return_type, SymbolType::Void);
        assert_eq!(Intrinsic::Hlt.name(), "hlt");
    }
}
