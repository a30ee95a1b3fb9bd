//! The cross-linked declaration model.
//!
//! Every node is one of three small "entry" structs — [`TypeEntry`],
//! [`NonTypeEntry`], [`FunctionEntry`] — each pairing a common [`Header`]
//! with a kind-specific payload enum, replacing the open-coded kind checks a
//! C implementation would use with a closed tagged union per table. Which
//! struct a DIE becomes lives entirely in which table it is pushed into:
//! there is deliberately no single giant enum spanning all three tables,
//! because nothing ever needs to hold "a type OR a variable OR a function"
//! polymorphically — the recoder and size-cacher each walk exactly one
//! table at a time.

use std::rc::Rc;

use crate::ids::{DieOffset, FunctionId, TagId, TypeId};
use crate::strings::StringId;

/// A type reference as it exists at some point in the node's lifecycle:
/// either a raw DWARF byte offset (pre-recode) or a dense, intra-CU
/// [`TypeId`] (post-recode). Its meaning transitions from "raw DWARF
/// offset" to "dense intra-CU index" the moment `crate::recode` visits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeRef {
    /// Not yet recoded. `0` means void/absent, same as the resolved form.
    Unresolved(DieOffset),
    /// Recoded: a dense index into this CU's `types_table`.
    Resolved(TypeId),
}

impl TypeRef {
    /// A reference to nothing (absent attribute), in either phase.
    pub fn void() -> Self {
        TypeRef::Unresolved(0)
    }

    /// True once this reference has been rewritten by the recoder.
    pub fn is_resolved(&self) -> bool {
        matches!(self, TypeRef::Resolved(_))
    }

    /// The raw DWARF offset, if still unresolved. Used by the recoder as its
    /// hash-table lookup key.
    pub fn raw_offset(&self) -> Option<DieOffset> {
        match self {
            TypeRef::Unresolved(0) => None,
            TypeRef::Unresolved(off) => Some(*off),
            TypeRef::Resolved(_) => None,
        }
    }

    /// The resolved id, if recode has already run. Panics if still
    /// unresolved — call sites after recode may rely on this.
    pub fn resolved(&self) -> TypeId {
        match self {
            TypeRef::Resolved(id) => *id,
            TypeRef::Unresolved(0) => TypeId::VOID,
            TypeRef::Unresolved(off) => {
                panic!("TypeRef::resolved() called before recode (raw offset {off:#x})")
            }
        }
    }
}

/// Index into a CU's dwarf-scratch arena (`cu::Cu::side_records`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SideId(pub u32);

/// The fields present on every allocated node.
#[derive(Debug, Clone)]
pub struct Header {
    /// Whether this tag sat directly under the CU DIE (as opposed to nested
    /// inside a container).
    pub top_level: bool,
    /// This node's own "type" reference. Its meaning is kind-dependent:
    /// pointee type for pointer/reference/const/volatile, declared type for
    /// typedef/member/parameter/variable, return type for ftype/function,
    /// import target for imported declaration/module.
    pub type_ref: TypeRef,
    /// Back-pointer into the CU's dwarf-scratch arena. `None` once the
    /// scratch has been freed (after `steal()`, unless `extra_dbg_info`).
    pub side: Option<SideId>,
}

impl Header {
    /// A fresh header for a node with no type reference and the given
    /// top-level-ness. Most factories start here and then set `type_ref`
    /// from `DW_AT_type`/`DW_AT_import`.
    pub fn new(top_level: bool, side: SideId) -> Self {
        Header {
            top_level,
            type_ref: TypeRef::void(),
            side: Some(side),
        }
    }
}

/// `DW_ACCESS_*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Accessibility {
    #[default]
    Unspecified,
    Public,
    Protected,
    Private,
}

impl Accessibility {
    /// Decode a raw `DW_ACCESS_*` constant.
    pub fn from_raw(raw: u64) -> Self {
        match raw {
            1 => Accessibility::Public,
            2 => Accessibility::Protected,
            3 => Accessibility::Private,
            _ => Accessibility::Unspecified,
        }
    }
}

/// `DW_VIRTUALITY_*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Virtuality {
    #[default]
    None,
    Virtual,
    PureVirtual,
}

impl Virtuality {
    /// Decode a raw `DW_VIRTUALITY_*` constant.
    pub fn from_raw(raw: u64) -> Self {
        match raw {
            1 => Virtuality::Virtual,
            2 => Virtuality::PureVirtual,
            _ => Virtuality::None,
        }
    }
}

/// A variable's storage classification, as produced by `crate::attr`'s
/// `dwarf_location` classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VLocation {
    #[default]
    Unknown,
    /// No location expression was present at all.
    Optimized,
    /// `DW_OP_addr`: a fixed, link-time address.
    Global,
    /// `DW_OP_reg*`/`DW_OP_regx`: lives in a register.
    Register,
    /// `DW_OP_breg*`/`DW_OP_bregx`/`DW_OP_fbreg`: frame-relative.
    Local,
}

/// `DW_TAG_ptr_to_member_type`: a pointer-to-member tag plus its
/// `containing_type` reference.
#[derive(Debug, Clone)]
pub struct PointerToMember {
    /// Raw until recode, then resolved; the class/union this pointer is
    /// relative to. Recoded through the type hash.
    pub containing_type: TypeRef,
}

/// `DW_TAG_base_type`.
#[derive(Debug, Clone)]
pub struct BaseType {
    pub name: StringId,
    pub bit_size: u64,
    pub boolean: bool,
    pub signed: bool,
    pub varargs: bool,
}

/// `DW_TAG_array_type`. The element type lives in the shared [`Header`].
#[derive(Debug, Clone)]
pub struct ArrayType {
    /// Per-dimension upper-bound + 1, capped at 64 dimensions.
    pub dimensions: Vec<u64>,
    pub vector: bool,
}

/// `DW_TAG_enumerator`, embedded directly in its parent
/// [`EnumerationType`]'s list — it is never independently referenced by a
/// DWARF offset, so unlike class members it never enters `tags_table` (see
/// `crate::parse`'s module doc for the full reasoning).
#[derive(Debug, Clone)]
pub struct Enumerator {
    pub name: StringId,
    pub value: i64,
}

/// `DW_TAG_enumeration_type`.
#[derive(Debug, Clone)]
pub struct EnumerationType {
    pub name: StringId,
    pub size_bits: u64,
    /// Shared via `Rc` so a synthetic bitfield enum (`crate::bitfield`) can
    /// borrow the original's list without copying it or needing a manual
    /// "don't double free" flag — `Rc` already is that flag.
    pub enumerators: Rc<Vec<Enumerator>>,
    /// True when this enum's `enumerators` list is borrowed from another
    /// enum rather than owned. Kept as an explicit bit (rather than
    /// inferring from `Rc::strong_count`) so it survives independently of
    /// how many other clones happen to exist.
    pub shared_tags: bool,
}

/// Padding/layout-hole accounting. Detecting holes has no general algorithm
/// defined here — that is pretty-printer territory (output formatting is
/// out of scope for this crate), so this model only carries the slots;
/// computing them is left to callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoleCounts {
    pub holes: u32,
    pub bit_holes: u32,
}

/// Class/struct/union/namespace/typedef: all modeled as one shared
/// "namespace-like" payload.
#[derive(Debug, Clone)]
pub struct NamespaceLike {
    pub name: StringId,
    /// Direct children, in DIE order; may index into any of the three
    /// tables depending on what each child turned out to be.
    pub children: Vec<crate::ids::SmallId>,
    /// Byte size (0 for namespaces and typedefs).
    pub size: u64,
    pub declaration_only: bool,
    /// Resolved `DW_AT_specification` back-reference, once recode has run.
    pub specification: Option<TypeId>,
    /// Count of `children` entries that are `class_member`/`inheritance`
    /// tags.
    pub nr_members: u32,
    pub shared_tags: bool,
    pub is_definition: bool,
    pub forward_decl_emitted: bool,
    /// Virtual table slots, as raw vtable-entry offsets.
    pub vtable: Vec<u64>,
    pub holes: HoleCounts,
}

impl NamespaceLike {
    /// A fresh, empty namespace-like payload.
    pub fn new(name: StringId) -> Self {
        NamespaceLike {
            name,
            children: Vec::new(),
            size: 0,
            declaration_only: false,
            specification: None,
            nr_members: 0,
            shared_tags: false,
            is_definition: false,
            forward_decl_emitted: false,
            vtable: Vec::new(),
            holes: HoleCounts::default(),
        }
    }
}

/// `DW_TAG_member` / `DW_TAG_inheritance`. The member's own type lives in the
/// shared [`Header`].
#[derive(Debug, Clone)]
pub struct ClassMember {
    pub name: StringId,
    pub byte_offset: u64,
    pub bitfield_offset: u64,
    pub bitfield_size: u64,
    /// Cached by `crate::sizecache` (§4.6); zero until that pass runs.
    pub byte_size: u64,
    pub bit_size: u64,
    pub accessibility: Accessibility,
    pub virtuality: Virtuality,
}

impl ClassMember {
    pub fn new(name: StringId) -> Self {
        ClassMember {
            name,
            byte_offset: 0,
            bitfield_offset: 0,
            bitfield_size: 0,
            byte_size: 0,
            bit_size: 0,
            accessibility: Accessibility::default(),
            virtuality: Virtuality::default(),
        }
    }
}

/// `DW_TAG_formal_parameter`, embedded directly in its [`FunctionType`]'s
/// parameter list for the same reason [`Enumerator`] is embedded: nothing
/// ever targets a formal parameter with a forward DWARF reference, so it
/// never needs a `tags_table` slot of its own.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: StringId,
    pub type_ref: TypeRef,
}

/// `DW_TAG_variable`.
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: StringId,
    pub external: bool,
    pub declaration_only: bool,
    pub location: VLocation,
    pub address: Option<u64>,
}

/// `DW_TAG_label`.
#[derive(Debug, Clone)]
pub struct Label {
    pub name: StringId,
    pub address: Option<u64>,
}

/// `DW_TAG_subroutine_type`, and the embedded signature half of a
/// `DW_TAG_subprogram` (together, the "ftype").
#[derive(Debug, Clone, Default)]
pub struct FunctionType {
    pub parameters: Vec<Parameter>,
    pub unspecified_parameters: bool,
}

/// `DW_TAG_subprogram`. The return type lives in the shared [`Header`].
#[derive(Debug, Clone)]
pub struct Function {
    pub ftype: FunctionType,
    pub lexical_block: LexicalBlock,
    pub name: StringId,
    pub linkage_name: StringId,
    pub inlined: bool,
    pub external: bool,
    pub has_abstract_origin: bool,
    pub specification: Option<FunctionId>,
    pub accessibility: Accessibility,
    pub virtuality: Virtuality,
    pub vtable_entry_offset: Option<u64>,
    /// The class type whose vtable this subprogram occupies a slot in, if
    /// any.
    pub vtable_node: Option<TypeId>,
}

/// `DW_TAG_lexical_block`. Always a `tags_table` entry in its own right
/// (spec §4.4 explicitly dispatches "lexical block: recode recursively" as
/// one of the table-walk cases) as well as appearing inline in its parent's
/// `sub_blocks` list.
#[derive(Debug, Clone, Default)]
pub struct LexicalBlock {
    pub address: Option<u64>,
    pub size: u64,
    pub labels: Vec<TagId>,
    pub variables: Vec<TagId>,
    pub inline_expansions: Vec<TagId>,
    pub sub_blocks: Vec<TagId>,
    pub total_inline_expansion_size: u64,
}

/// `DW_TAG_inlined_subroutine`.
#[derive(Debug, Clone)]
pub struct InlineExpansion {
    /// Recoded through the TAG hash (§4.4): the concrete subprogram this is
    /// an inlined copy of.
    pub abstract_origin: Option<FunctionId>,
    pub address: u64,
    pub high_pc: u64,
    /// Sum of range sizes when the expansion has non-contiguous ranges
    /// (spec §8 scenario 4).
    pub size: u64,
}

/// Discriminant + payload for everything stored in `types_table`
/// (spec §3's explicit type-kind list).
#[derive(Debug, Clone)]
pub enum TypeKind {
    Pointer,
    ReferenceType,
    Const,
    Volatile,
    PointerToMember(PointerToMember),
    BaseType(BaseType),
    ArrayType(ArrayType),
    EnumerationType(EnumerationType),
    Class(NamespaceLike),
    Struct(NamespaceLike),
    Union(NamespaceLike),
    Namespace(NamespaceLike),
    /// Modeled as a namespace-like with a type reference and no members
    /// (spec §3).
    Typedef(NamespaceLike),
    FunctionType(FunctionType),
}

impl TypeKind {
    /// A short, stable name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            TypeKind::Pointer => "pointer_type",
            TypeKind::ReferenceType => "reference_type",
            TypeKind::Const => "const_type",
            TypeKind::Volatile => "volatile_type",
            TypeKind::PointerToMember(_) => "ptr_to_member_type",
            TypeKind::BaseType(_) => "base_type",
            TypeKind::ArrayType(_) => "array_type",
            TypeKind::EnumerationType(_) => "enumeration_type",
            TypeKind::Class(_) => "class_type",
            TypeKind::Struct(_) => "structure_type",
            TypeKind::Union(_) => "union_type",
            TypeKind::Namespace(_) => "namespace",
            TypeKind::Typedef(_) => "typedef",
            TypeKind::FunctionType(_) => "subroutine_type",
        }
    }

    /// The name carried by this kind, for kinds that have one
    /// (base/enum/namespace-like); `StringId::EMPTY` otherwise. Used by
    /// `crate::recode`'s specification-name resolution and by
    /// `crate::bitfield`'s `(name, size)` dedup key.
    pub fn interned_name(&self) -> StringId {
        match self {
            TypeKind::BaseType(b) => b.name,
            TypeKind::EnumerationType(e) => e.name,
            TypeKind::Class(n)
            | TypeKind::Struct(n)
            | TypeKind::Union(n)
            | TypeKind::Namespace(n)
            | TypeKind::Typedef(n) => n.name,
            _ => StringId::EMPTY,
        }
    }

    /// Overwrite the name carried by this kind, for the same kinds
    /// [`TypeKind::interned_name`] reads from. A no-op for nameless kinds.
    pub fn set_name(&mut self, name: StringId) {
        match self {
            TypeKind::BaseType(b) => b.name = name,
            TypeKind::EnumerationType(e) => e.name = name,
            TypeKind::Class(n)
            | TypeKind::Struct(n)
            | TypeKind::Union(n)
            | TypeKind::Namespace(n)
            | TypeKind::Typedef(n) => n.name = name,
            _ => {}
        }
    }

    /// Shared accessor for the four "namespace-like" kinds plus typedef.
    pub fn namespace_like(&self) -> Option<&NamespaceLike> {
        match self {
            TypeKind::Class(n)
            | TypeKind::Struct(n)
            | TypeKind::Union(n)
            | TypeKind::Namespace(n)
            | TypeKind::Typedef(n) => Some(n),
            _ => None,
        }
    }

    /// Mutable counterpart of [`TypeKind::namespace_like`].
    pub fn namespace_like_mut(&mut self) -> Option<&mut NamespaceLike> {
        match self {
            TypeKind::Class(n)
            | TypeKind::Struct(n)
            | TypeKind::Union(n)
            | TypeKind::Namespace(n)
            | TypeKind::Typedef(n) => Some(n),
            _ => None,
        }
    }
}

/// One entry of `types_table`.
#[derive(Debug, Clone)]
pub struct TypeEntry {
    pub header: Header,
    pub kind: TypeKind,
}

/// Discriminant + payload for everything stored in `tags_table`.
#[derive(Debug, Clone)]
pub enum NonTypeKind {
    ImportedDeclaration,
    ImportedModule,
    ClassMember(ClassMember),
    Variable(Variable),
    Label(Label),
    LexicalBlock(LexicalBlock),
    InlineExpansion(InlineExpansion),
}

impl NonTypeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NonTypeKind::ImportedDeclaration => "imported_declaration",
            NonTypeKind::ImportedModule => "imported_module",
            NonTypeKind::ClassMember(_) => "member",
            NonTypeKind::Variable(_) => "variable",
            NonTypeKind::Label(_) => "label",
            NonTypeKind::LexicalBlock(_) => "lexical_block",
            NonTypeKind::InlineExpansion(_) => "inlined_subroutine",
        }
    }
}

/// One entry of `tags_table`.
#[derive(Debug, Clone)]
pub struct NonTypeEntry {
    pub header: Header,
    pub kind: NonTypeKind,
}

/// One entry of `functions_table`.
#[derive(Debug, Clone)]
pub struct FunctionEntry {
    pub header: Header,
    pub function: Function,
}

/// A header with no type reference and no side-record, used only by the
/// reserve/finalize placeholders below — never observed by any pass, since
/// every reserved slot is overwritten before `crate::recode` runs.
fn placeholder_header() -> Header {
    Header {
        top_level: false,
        type_ref: TypeRef::void(),
        side: None,
    }
}

impl TypeEntry {
    /// A placeholder occupying a freshly reserved `types_table` slot, so its
    /// index (and thus `TypeId`) can be handed out before the real payload
    /// is known (`crate::cu::Cu::reserve_type`/`finalize_type`).
    pub(crate) fn placeholder() -> Self {
        TypeEntry {
            header: placeholder_header(),
            kind: TypeKind::Pointer,
        }
    }
}

impl NonTypeEntry {
    /// See [`TypeEntry::placeholder`].
    pub(crate) fn placeholder() -> Self {
        NonTypeEntry {
            header: placeholder_header(),
            kind: NonTypeKind::ImportedDeclaration,
        }
    }
}

impl FunctionEntry {
    /// See [`TypeEntry::placeholder`].
    pub(crate) fn placeholder() -> Self {
        FunctionEntry {
            header: placeholder_header(),
            function: Function {
                ftype: FunctionType::default(),
                lexical_block: LexicalBlock::default(),
                name: StringId::EMPTY,
                linkage_name: StringId::EMPTY,
                inlined: false,
                external: false,
                has_abstract_origin: false,
                specification: None,
                accessibility: Accessibility::default(),
                virtuality: Virtuality::default(),
                vtable_entry_offset: None,
                vtable_node: None,
            },
        }
    }
}
