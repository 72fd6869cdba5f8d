//! # Type Trees
//!
//! Owned trees describing C/C++ declarations: data types, function signatures,
//! variable types.
//!
//! Trees are produced by a type-encoding parser outside this crate and then
//! handed to the [`SymbolDatabase`](crate::database::SymbolDatabase), which
//! owns them from then on. A node never points at another symbol directly;
//! references to other data types go through a [`DataTypeHandle`] inside a
//! [`NodeDescriptor::TypeName`] node, so ownership stays a strict tree.

use std::fmt;

use crate::database::DataTypeHandle;

/// C storage class of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StorageClass
{
    #[default]
    None,
    Typedef,
    Extern,
    Static,
    Auto,
    Register,
}

/// Built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltInClass
{
    Void,
    Unsigned8,
    Signed8,
    Unqualified8,
    Bool8,
    Unsigned16,
    Signed16,
    Unsigned32,
    Signed32,
    Float32,
    Unsigned64,
    Signed64,
    Float64,
    Unsigned128,
    Signed128,
    Unqualified128,
    Float128,
}

/// What kind of declaration a node is, with its kind-specific children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeDescriptor
{
    Array
    {
        element_type: Box<Node>,
        element_count: i32,
    },
    BitField
    {
        underlying_type: Box<Node>,
        bitfield_offset_bits: i32,
    },
    BuiltIn
    {
        class: BuiltInClass,
    },
    Enum
    {
        constants: Vec<(i32, String)>,
    },
    Function
    {
        return_type: Option<Box<Node>>,
        /// `None` when the parameter list is unknown, as opposed to empty.
        parameters: Option<Vec<Node>>,
        is_constructor: bool,
    },
    PointerOrReference
    {
        is_pointer: bool,
        value_type: Box<Node>,
    },
    StructOrUnion
    {
        is_struct: bool,
        base_classes: Vec<Node>,
        fields: Vec<Node>,
        member_functions: Vec<Node>,
    },
    /// A reference to a named type. `data_type` is filled in once the name has
    /// been resolved to a symbol.
    TypeName
    {
        data_type: Option<DataTypeHandle>,
        unresolved_name: String,
    },
}

impl NodeDescriptor
{
    /// Short lower-case name of the descriptor.
    #[must_use]
    pub fn as_str(&self) -> &'static str
    {
        match self {
            NodeDescriptor::Array { .. } => "array",
            NodeDescriptor::BitField { .. } => "bitfield",
            NodeDescriptor::BuiltIn { .. } => "builtin",
            NodeDescriptor::Enum { .. } => "enum",
            NodeDescriptor::Function { .. } => "function",
            NodeDescriptor::PointerOrReference { .. } => "pointer_or_reference",
            NodeDescriptor::StructOrUnion { .. } => "struct_or_union",
            NodeDescriptor::TypeName { .. } => "type_name",
        }
    }
}

/// One node of a type tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node
{
    pub name: String,
    pub storage_class: StorageClass,
    /// Offset relative to the enclosing struct, for fields.
    pub offset_bytes: Option<i32>,
    pub size_bits: Option<i32>,
    pub is_const: bool,
    pub is_volatile: bool,
    pub descriptor: NodeDescriptor,
}

impl Node
{
    /// Create an unnamed node with default attributes.
    #[must_use]
    pub fn new(descriptor: NodeDescriptor) -> Self
    {
        Self {
            name: String::new(),
            storage_class: StorageClass::None,
            offset_bytes: None,
            size_bits: None,
            is_const: false,
            is_volatile: false,
            descriptor,
        }
    }

    #[must_use]
    pub fn builtin(class: BuiltInClass) -> Self
    {
        Self::new(NodeDescriptor::BuiltIn { class })
    }

    #[must_use]
    pub fn type_name(name: impl Into<String>) -> Self
    {
        Self::new(NodeDescriptor::TypeName {
            data_type: None,
            unresolved_name: name.into(),
        })
    }

    #[must_use]
    pub fn pointer_to(value_type: Node) -> Self
    {
        Self::new(NodeDescriptor::PointerOrReference {
            is_pointer: true,
            value_type: Box::new(value_type),
        })
    }

    #[must_use]
    pub fn struct_with_fields(fields: Vec<Node>) -> Self
    {
        Self::new(NodeDescriptor::StructOrUnion {
            is_struct: true,
            base_classes: Vec::new(),
            fields,
            member_functions: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self
    {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_offset(mut self, offset_bytes: i32) -> Self
    {
        self.offset_bytes = Some(offset_bytes);
        self
    }

    #[must_use]
    pub fn with_size_bits(mut self, size_bits: i32) -> Self
    {
        self.size_bits = Some(size_bits);
        self
    }

    /// Direct children in a fixed order: base classes, fields and member
    /// functions for structs; return type then parameters for functions; the
    /// single inner type for arrays, bitfields and pointers.
    #[must_use]
    pub fn children(&self) -> Vec<&Node>
    {
        match &self.descriptor {
            NodeDescriptor::Array { element_type: inner, .. }
            | NodeDescriptor::BitField { underlying_type: inner, .. }
            | NodeDescriptor::PointerOrReference { value_type: inner, .. } => vec![inner.as_ref()],
            NodeDescriptor::Function {
                return_type, parameters, ..
            } => return_type
                .iter()
                .map(AsRef::as_ref)
                .chain(parameters.iter().flatten())
                .collect(),
            NodeDescriptor::StructOrUnion {
                base_classes,
                fields,
                member_functions,
                ..
            } => base_classes.iter().chain(fields).chain(member_functions).collect(),
            NodeDescriptor::BuiltIn { .. } | NodeDescriptor::Enum { .. } | NodeDescriptor::TypeName { .. } => Vec::new(),
        }
    }

    /// The `index`th entry of [`Node::children`].
    #[must_use]
    pub fn child(&self, index: usize) -> Option<&Node>
    {
        self.children().into_iter().nth(index)
    }

    /// Visit this node and every descendant, parents first.
    pub fn for_each_node<F: FnMut(&Node)>(&self, callback: &mut F)
    {
        callback(self);
        for child in self.children() {
            child.for_each_node(callback);
        }
    }
}

/// Why two type trees were judged different.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareFailReason
{
    Descriptor,
    StorageClass,
    Name,
    OffsetBytes,
    BitfieldOffsetBits,
    SizeBits,
    Constness,
    Volatility,
    ArrayElementCount,
    BuiltInClass,
    FunctionReturnTypeHasValue,
    FunctionParametersHasValue,
    FunctionParameterCount,
    FunctionIsConstructor,
    EnumConstants,
    BaseClassCount,
    FieldCount,
    MemberFunctionCount,
    TypeName,
}

impl CompareFailReason
{
    /// Human-readable description for diagnostics.
    #[must_use]
    pub fn as_str(&self) -> &'static str
    {
        match self {
            CompareFailReason::Descriptor => "descriptors",
            CompareFailReason::StorageClass => "storage classes",
            CompareFailReason::Name => "names",
            CompareFailReason::OffsetBytes => "offsets",
            CompareFailReason::BitfieldOffsetBits => "bitfield offsets",
            CompareFailReason::SizeBits => "sizes",
            CompareFailReason::Constness => "const qualifiers",
            CompareFailReason::Volatility => "volatile qualifiers",
            CompareFailReason::ArrayElementCount => "array element counts",
            CompareFailReason::BuiltInClass => "builtin classes",
            CompareFailReason::FunctionReturnTypeHasValue => "function return type presence",
            CompareFailReason::FunctionParametersHasValue => "function parameter list presence",
            CompareFailReason::FunctionParameterCount => "function parameter counts",
            CompareFailReason::FunctionIsConstructor => "function constructor flags",
            CompareFailReason::EnumConstants => "enum constants",
            CompareFailReason::BaseClassCount => "base class counts",
            CompareFailReason::FieldCount => "field counts",
            CompareFailReason::MemberFunctionCount => "member function counts",
            CompareFailReason::TypeName => "type names",
        }
    }
}

impl fmt::Display for CompareFailReason
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{} differ", self.as_str())
    }
}

/// Outcome of [`compare_nodes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareResult
{
    Matches,
    /// Equivalent, but the left tree carries more information.
    MatchesFavourLhs,
    /// Equivalent, but the right tree carries more information and should
    /// replace the left one.
    MatchesFavourRhs,
    /// Equivalent, but each side resolves a type name the other leaves
    /// unresolved, so neither tree is better than the other.
    MatchesConfused,
    Differs(CompareFailReason),
}

impl CompareResult
{
    #[must_use]
    pub fn is_match(&self) -> bool
    {
        !matches!(self, CompareResult::Differs(_))
    }

    fn and(self, other: CompareResult) -> CompareResult
    {
        use CompareResult::{Differs, Matches, MatchesConfused, MatchesFavourLhs, MatchesFavourRhs};
        match (self, other) {
            (Differs(reason), _) | (_, Differs(reason)) => Differs(reason),
            (Matches, result) | (result, Matches) => result,
            (MatchesFavourLhs, MatchesFavourLhs) => MatchesFavourLhs,
            (MatchesFavourRhs, MatchesFavourRhs) => MatchesFavourRhs,
            (MatchesConfused, _)
            | (_, MatchesConfused)
            | (MatchesFavourLhs, MatchesFavourRhs)
            | (MatchesFavourRhs, MatchesFavourLhs) => MatchesConfused,
        }
    }
}

/// Structurally compare two type trees.
///
/// Every attribute of every node is compared. The only tolerated difference
/// is between a type name that has been resolved to a data type symbol and
/// one with the same spelling that hasn't: the resolved side is favoured.
#[must_use]
pub fn compare_nodes(lhs: &Node, rhs: &Node) -> CompareResult
{
    use CompareFailReason as Reason;

    if std::mem::discriminant(&lhs.descriptor) != std::mem::discriminant(&rhs.descriptor) {
        return CompareResult::Differs(Reason::Descriptor);
    }
    if lhs.storage_class != rhs.storage_class {
        return CompareResult::Differs(Reason::StorageClass);
    }
    if lhs.name != rhs.name {
        return CompareResult::Differs(Reason::Name);
    }
    if lhs.offset_bytes != rhs.offset_bytes {
        return CompareResult::Differs(Reason::OffsetBytes);
    }
    if lhs.size_bits != rhs.size_bits {
        return CompareResult::Differs(Reason::SizeBits);
    }
    if lhs.is_const != rhs.is_const {
        return CompareResult::Differs(Reason::Constness);
    }
    if lhs.is_volatile != rhs.is_volatile {
        return CompareResult::Differs(Reason::Volatility);
    }

    match (&lhs.descriptor, &rhs.descriptor) {
        (
            NodeDescriptor::Array {
                element_type: lhs_element,
                element_count: lhs_count,
            },
            NodeDescriptor::Array {
                element_type: rhs_element,
                element_count: rhs_count,
            },
        ) => {
            if lhs_count != rhs_count {
                return CompareResult::Differs(Reason::ArrayElementCount);
            }
            compare_nodes(lhs_element, rhs_element)
        }
        (
            NodeDescriptor::BitField {
                underlying_type: lhs_type,
                bitfield_offset_bits: lhs_offset,
            },
            NodeDescriptor::BitField {
                underlying_type: rhs_type,
                bitfield_offset_bits: rhs_offset,
            },
        ) => {
            if lhs_offset != rhs_offset {
                return CompareResult::Differs(Reason::BitfieldOffsetBits);
            }
            compare_nodes(lhs_type, rhs_type)
        }
        (NodeDescriptor::BuiltIn { class: lhs_class }, NodeDescriptor::BuiltIn { class: rhs_class }) => {
            if lhs_class == rhs_class {
                CompareResult::Matches
            } else {
                CompareResult::Differs(Reason::BuiltInClass)
            }
        }
        (NodeDescriptor::Enum { constants: lhs_constants }, NodeDescriptor::Enum { constants: rhs_constants }) => {
            if lhs_constants == rhs_constants {
                CompareResult::Matches
            } else {
                CompareResult::Differs(Reason::EnumConstants)
            }
        }
        (
            NodeDescriptor::Function {
                return_type: lhs_return,
                parameters: lhs_parameters,
                is_constructor: lhs_constructor,
            },
            NodeDescriptor::Function {
                return_type: rhs_return,
                parameters: rhs_parameters,
                is_constructor: rhs_constructor,
            },
        ) => {
            if lhs_constructor != rhs_constructor {
                return CompareResult::Differs(Reason::FunctionIsConstructor);
            }
            let mut result = match (lhs_return, rhs_return) {
                (Some(lhs_return), Some(rhs_return)) => compare_nodes(lhs_return, rhs_return),
                (None, None) => CompareResult::Matches,
                _ => return CompareResult::Differs(Reason::FunctionReturnTypeHasValue),
            };
            match (lhs_parameters, rhs_parameters) {
                (Some(lhs_parameters), Some(rhs_parameters)) => {
                    result = result.and(compare_lists(lhs_parameters, rhs_parameters, Reason::FunctionParameterCount));
                }
                (None, None) => {}
                _ => return CompareResult::Differs(Reason::FunctionParametersHasValue),
            }
            result
        }
        (
            NodeDescriptor::PointerOrReference {
                is_pointer: lhs_is_pointer,
                value_type: lhs_value,
            },
            NodeDescriptor::PointerOrReference {
                is_pointer: rhs_is_pointer,
                value_type: rhs_value,
            },
        ) => {
            if lhs_is_pointer != rhs_is_pointer {
                return CompareResult::Differs(Reason::Descriptor);
            }
            compare_nodes(lhs_value, rhs_value)
        }
        (
            NodeDescriptor::StructOrUnion {
                is_struct: lhs_is_struct,
                base_classes: lhs_bases,
                fields: lhs_fields,
                member_functions: lhs_functions,
            },
            NodeDescriptor::StructOrUnion {
                is_struct: rhs_is_struct,
                base_classes: rhs_bases,
                fields: rhs_fields,
                member_functions: rhs_functions,
            },
        ) => {
            if lhs_is_struct != rhs_is_struct {
                return CompareResult::Differs(Reason::Descriptor);
            }
            compare_lists(lhs_bases, rhs_bases, Reason::BaseClassCount)
                .and(compare_lists(lhs_fields, rhs_fields, Reason::FieldCount))
                .and(compare_lists(lhs_functions, rhs_functions, Reason::MemberFunctionCount))
        }
        (
            NodeDescriptor::TypeName {
                data_type: lhs_handle,
                unresolved_name: lhs_name,
            },
            NodeDescriptor::TypeName {
                data_type: rhs_handle,
                unresolved_name: rhs_name,
            },
        ) => match (lhs_handle, rhs_handle) {
            (Some(lhs_handle), Some(rhs_handle)) if lhs_handle == rhs_handle => CompareResult::Matches,
            (Some(_), Some(_)) => CompareResult::Differs(Reason::TypeName),
            _ if lhs_name != rhs_name => CompareResult::Differs(Reason::TypeName),
            (Some(_), None) => CompareResult::MatchesFavourLhs,
            (None, Some(_)) => CompareResult::MatchesFavourRhs,
            (None, None) => CompareResult::Matches,
        },
        _ => CompareResult::Differs(Reason::Descriptor),
    }
}

fn compare_lists(lhs: &[Node], rhs: &[Node], count_reason: CompareFailReason) -> CompareResult
{
    if lhs.len() != rhs.len() {
        return CompareResult::Differs(count_reason);
    }
    lhs.iter()
        .zip(rhs)
        .fold(CompareResult::Matches, |result, (lhs, rhs)| result.and(compare_nodes(lhs, rhs)))
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::database::SymbolHandle;

    fn point() -> Node
    {
        Node::struct_with_fields(vec![
            Node::builtin(BuiltInClass::Signed32).with_name("x").with_offset(0),
            Node::builtin(BuiltInClass::Signed32).with_name("y").with_offset(4),
        ])
        .with_name("Point")
        .with_size_bits(64)
    }

    #[test]
    fn test_identical_trees_match()
    {
        assert_eq!(compare_nodes(&point(), &point()), CompareResult::Matches);
    }

    #[test]
    fn test_field_count_difference()
    {
        let mut other = point();
        if let NodeDescriptor::StructOrUnion { fields, .. } = &mut other.descriptor {
            fields.pop();
        }
        assert_eq!(
            compare_nodes(&point(), &other),
            CompareResult::Differs(CompareFailReason::FieldCount)
        );
    }

    #[test]
    fn test_nested_difference_is_reported()
    {
        let mut other = point();
        if let NodeDescriptor::StructOrUnion { fields, .. } = &mut other.descriptor {
            fields[1].offset_bytes = Some(8);
        }
        let result = compare_nodes(&point(), &other);
        assert_eq!(result, CompareResult::Differs(CompareFailReason::OffsetBytes));
        assert!(!result.is_match());
    }

    #[test]
    fn test_resolved_type_name_is_favoured()
    {
        let unresolved = Node::pointer_to(Node::type_name("Point"));
        let resolved = Node::pointer_to(Node::new(NodeDescriptor::TypeName {
            data_type: Some(SymbolHandle::new(3)),
            unresolved_name: "Point".to_string(),
        }));
        assert_eq!(compare_nodes(&unresolved, &resolved), CompareResult::MatchesFavourRhs);
        assert_eq!(compare_nodes(&resolved, &unresolved), CompareResult::MatchesFavourLhs);
        assert_eq!(
            compare_nodes(&unresolved, &Node::pointer_to(Node::type_name("Rect"))),
            CompareResult::Differs(CompareFailReason::TypeName)
        );
    }

    #[test]
    fn test_opposite_resolutions_are_confused()
    {
        let resolved = |name: &str, handle: u32| {
            Node::new(NodeDescriptor::TypeName {
                data_type: Some(SymbolHandle::new(handle)),
                unresolved_name: name.to_string(),
            })
            .with_name(name.to_lowercase())
        };
        let unresolved = |name: &str| Node::type_name(name).with_name(name.to_lowercase());

        let lhs = Node::struct_with_fields(vec![resolved("A", 1), unresolved("B")]);
        let rhs = Node::struct_with_fields(vec![unresolved("A"), resolved("B", 2)]);
        let result = compare_nodes(&lhs, &rhs);
        assert_eq!(result, CompareResult::MatchesConfused);
        assert!(result.is_match());

        let mut different = rhs.clone();
        if let NodeDescriptor::StructOrUnion { fields, .. } = &mut different.descriptor {
            fields.push(Node::builtin(BuiltInClass::Signed32).with_name("c"));
        }
        assert!(!compare_nodes(&lhs, &different).is_match());
    }

    #[test]
    fn test_children_order()
    {
        let function = Node::new(NodeDescriptor::Function {
            return_type: Some(Box::new(Node::builtin(BuiltInClass::Void))),
            parameters: Some(vec![Node::builtin(BuiltInClass::Signed8).with_name("a")]),
            is_constructor: false,
        });
        assert_eq!(function.children().len(), 2);
        assert_eq!(function.child(1).map(|node| node.name.as_str()), Some("a"));
        assert!(function.child(2).is_none());

        let mut count = 0;
        point().for_each_node(&mut |_| count += 1);
        assert_eq!(count, 3);
    }

    #[test]
    fn test_fail_reason_is_readable()
    {
        assert_eq!(CompareFailReason::FieldCount.to_string(), "field counts differ");
    }
}
