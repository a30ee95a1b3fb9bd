//! DWARF tag/attribute/form constants.
//!
//! `DwTag`/`DwAt` are closed, exhaustively-listed Rust `enum`s with numeric
//! discriminants taken straight from DWARF standard 4 §7.5.4 — DWARF's tag
//! and attribute spaces are small, named, and genuinely enumerable. Form
//! dispatch (`DW_FORM_*`) is the provider's job: `gimli` decodes it into an
//! [`Attr`](crate::provider::Attr) before this crate ever sees a DIE, so no
//! `DwForm` type lives here. `DwOp` is different: the attribute reader and
//! location
//! classifier only need a handful of `DW_OP_*` opcodes, so it is a newtype
//! over the raw byte with associated `const`s for just those, following
//! `gimli`'s own `DwOp` shape, since DW_OP has 256 reserved codes (including
//! two 32-wide contiguous register ranges) where an exhaustive `enum` arm per
//! opcode would be mostly dead weight.

/// `DW_TAG_*`: the kind of a debugging information entry.
///
/// DWARF standard 4, section 7.5.4, page 154.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
#[non_exhaustive]
pub enum DwTag {
    ArrayType = 0x01,
    ClassType = 0x02,
    EntryPoint = 0x03,
    EnumerationType = 0x04,
    FormalParameter = 0x05,
    ImportedDeclaration = 0x08,
    Label = 0x0a,
    LexicalBlock = 0x0b,
    Member = 0x0d,
    PointerType = 0x0f,
    ReferenceType = 0x10,
    CompileUnit = 0x11,
    StringType = 0x12,
    StructureType = 0x13,
    SubroutineType = 0x15,
    Typedef = 0x16,
    UnionType = 0x17,
    UnspecifiedParameters = 0x18,
    Variant = 0x19,
    CommonBlock = 0x1a,
    CommonInclusion = 0x1b,
    Inheritance = 0x1c,
    InlinedSubroutine = 0x1d,
    Module = 0x1e,
    PtrToMemberType = 0x1f,
    SetType = 0x20,
    SubrangeType = 0x21,
    WithStmt = 0x22,
    AccessDeclaration = 0x23,
    BaseType = 0x24,
    CatchBlock = 0x25,
    ConstType = 0x26,
    Constant = 0x27,
    Enumerator = 0x28,
    FileType = 0x29,
    Friend = 0x2a,
    Namelist = 0x2b,
    NamelistItem = 0x2c,
    PackedType = 0x2d,
    Subprogram = 0x2e,
    TemplateTypeParameter = 0x2f,
    TemplateValueParameter = 0x30,
    ThrownType = 0x31,
    TryBlock = 0x32,
    VariantPart = 0x33,
    Variable = 0x34,
    VolatileType = 0x35,
    DwarfProcedure = 0x36,
    RestrictType = 0x37,
    InterfaceType = 0x38,
    Namespace = 0x39,
    ImportedModule = 0x3a,
    UnspecifiedType = 0x3b,
    PartialUnit = 0x3c,
    ImportedUnit = 0x3d,
    Condition = 0x3f,
    SharedType = 0x40,
    TypeUnit = 0x41,
    RvalueReferenceType = 0x42,
    TemplateAlias = 0x43,
}

impl DwTag {
    /// Map a raw `DW_TAG_*` code (as read off a DIE by the provider) back to
    /// the closed enum, or `None` for anything this loader doesn't
    /// recognize (handled as `UNSUPPORTED_TAG`, §7).
    pub fn from_raw(raw: u64) -> Option<DwTag> {
        use DwTag::*;
        Some(match raw {
            0x01 => ArrayType,
            0x02 => ClassType,
            0x03 => EntryPoint,
            0x04 => EnumerationType,
            0x05 => FormalParameter,
            0x08 => ImportedDeclaration,
            0x0a => Label,
            0x0b => LexicalBlock,
            0x0d => Member,
            0x0f => PointerType,
            0x10 => ReferenceType,
            0x11 => CompileUnit,
            0x12 => StringType,
            0x13 => StructureType,
            0x15 => SubroutineType,
            0x16 => Typedef,
            0x17 => UnionType,
            0x18 => UnspecifiedParameters,
            0x19 => Variant,
            0x1a => CommonBlock,
            0x1b => CommonInclusion,
            0x1c => Inheritance,
            0x1d => InlinedSubroutine,
            0x1e => Module,
            0x1f => PtrToMemberType,
            0x20 => SetType,
            0x21 => SubrangeType,
            0x22 => WithStmt,
            0x23 => AccessDeclaration,
            0x24 => BaseType,
            0x25 => CatchBlock,
            0x26 => ConstType,
            0x27 => Constant,
            0x28 => Enumerator,
            0x29 => FileType,
            0x2a => Friend,
            0x2b => Namelist,
            0x2c => NamelistItem,
            0x2d => PackedType,
            0x2e => Subprogram,
            0x2f => TemplateTypeParameter,
            0x30 => TemplateValueParameter,
            0x31 => ThrownType,
            0x32 => TryBlock,
            0x33 => VariantPart,
            0x34 => Variable,
            0x35 => VolatileType,
            0x36 => DwarfProcedure,
            0x37 => RestrictType,
            0x38 => InterfaceType,
            0x39 => Namespace,
            0x3a => ImportedModule,
            0x3b => UnspecifiedType,
            0x3c => PartialUnit,
            0x3d => ImportedUnit,
            0x3f => Condition,
            0x40 => SharedType,
            0x41 => TypeUnit,
            0x42 => RvalueReferenceType,
            0x43 => TemplateAlias,
            _ => return None,
        })
    }

    /// A `DW_TAG_whatever`-shaped name, for diagnostics.
    pub fn name(self) -> &'static str {
        use DwTag::*;
        match self {
            ArrayType => "DW_TAG_array_type",
            ClassType => "DW_TAG_class_type",
            EntryPoint => "DW_TAG_entry_point",
            EnumerationType => "DW_TAG_enumeration_type",
            FormalParameter => "DW_TAG_formal_parameter",
            ImportedDeclaration => "DW_TAG_imported_declaration",
            Label => "DW_TAG_label",
            LexicalBlock => "DW_TAG_lexical_block",
            Member => "DW_TAG_member",
            PointerType => "DW_TAG_pointer_type",
            ReferenceType => "DW_TAG_reference_type",
            CompileUnit => "DW_TAG_compile_unit",
            StringType => "DW_TAG_string_type",
            StructureType => "DW_TAG_structure_type",
            SubroutineType => "DW_TAG_subroutine_type",
            Typedef => "DW_TAG_typedef",
            UnionType => "DW_TAG_union_type",
            UnspecifiedParameters => "DW_TAG_unspecified_parameters",
            Variant => "DW_TAG_variant",
            CommonBlock => "DW_TAG_common_block",
            CommonInclusion => "DW_TAG_common_inclusion",
            Inheritance => "DW_TAG_inheritance",
            InlinedSubroutine => "DW_TAG_inlined_subroutine",
            Module => "DW_TAG_module",
            PtrToMemberType => "DW_TAG_ptr_to_member_type",
            SetType => "DW_TAG_set_type",
            SubrangeType => "DW_TAG_subrange_type",
            WithStmt => "DW_TAG_with_stmt",
            AccessDeclaration => "DW_TAG_access_declaration",
            BaseType => "DW_TAG_base_type",
            CatchBlock => "DW_TAG_catch_block",
            ConstType => "DW_TAG_const_type",
            Constant => "DW_TAG_constant",
            Enumerator => "DW_TAG_enumerator",
            FileType => "DW_TAG_file_type",
            Friend => "DW_TAG_friend",
            Namelist => "DW_TAG_namelist",
            NamelistItem => "DW_TAG_namelist_item",
            PackedType => "DW_TAG_packed_type",
            Subprogram => "DW_TAG_subprogram",
            TemplateTypeParameter => "DW_TAG_template_type_parameter",
            TemplateValueParameter => "DW_TAG_template_value_parameter",
            ThrownType => "DW_TAG_thrown_type",
            TryBlock => "DW_TAG_try_block",
            VariantPart => "DW_TAG_variant_part",
            Variable => "DW_TAG_variable",
            VolatileType => "DW_TAG_volatile_type",
            DwarfProcedure => "DW_TAG_dwarf_procedure",
            RestrictType => "DW_TAG_restrict_type",
            InterfaceType => "DW_TAG_interface_type",
            Namespace => "DW_TAG_namespace",
            ImportedModule => "DW_TAG_imported_module",
            UnspecifiedType => "DW_TAG_unspecified_type",
            PartialUnit => "DW_TAG_partial_unit",
            ImportedUnit => "DW_TAG_imported_unit",
            Condition => "DW_TAG_condition",
            SharedType => "DW_TAG_shared_type",
            TypeUnit => "DW_TAG_type_unit",
            RvalueReferenceType => "DW_TAG_rvalue_reference_type",
            TemplateAlias => "DW_TAG_template_alias",
        }
    }
}

/// `DW_AT_*`: the name half of an attribute.
///
/// DWARF standard 4, section 7.5.4, page 155. Only the subset the attribute
/// reader (§4.1) and the node factories (§4.2) actually consult is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
#[non_exhaustive]
pub enum DwAt {
    Sibling = 0x1,
    Location = 0x2,
    Name = 0x3,
    Ordering = 0x9,
    ByteSize = 0xb,
    BitOffset = 0xc,
    BitSize = 0x0d,
    StmtList = 0x10,
    LowPc = 0x11,
    HighPc = 0x12,
    Language = 0x13,
    Discr = 0x15,
    DiscrValue = 0x16,
    Visibility = 0x17,
    Import = 0x18,
    StringLength = 0x19,
    CommonReference = 0x1a,
    CompDir = 0x1b,
    ConstValue = 0x1c,
    ContainingType = 0x1d,
    DefaultValue = 0x1e,
    Inline = 0x20,
    IsOptional = 0x21,
    LowerBound = 0x22,
    Producer = 0x25,
    Prototyped = 0x27,
    ReturnAddr = 0x2a,
    StartScope = 0x2c,
    BitStride = 0x2e,
    UpperBound = 0x2f,
    AbstractOrigin = 0x31,
    Accessibility = 0x32,
    AddressClass = 0x33,
    Artificial = 0x34,
    BaseTypes = 0x35,
    CallingConvention = 0x36,
    Count = 0x37,
    DataMemberLocation = 0x38,
    DeclColumn = 0x39,
    DeclFile = 0x3a,
    DeclLine = 0x3b,
    Declaration = 0x3c,
    DiscrList = 0x3d,
    Encoding = 0x3e,
    External = 0x3f,
    FrameBase = 0x40,
    Friend = 0x41,
    IdentifierCase = 0x42,
    MacroInfo = 0x43,
    NamelistItem = 0x44,
    Priority = 0x45,
    Segment = 0x46,
    Specification = 0x47,
    StaticLink = 0x48,
    Type = 0x49,
    UseLocation = 0x4a,
    VariableParameter = 0x4b,
    Virtuality = 0x4c,
    VtableElemLocation = 0x4d,
    Allocated = 0x4e,
    Associated = 0x4f,
    DataLocation = 0x50,
    ByteStride = 0x51,
    EntryPc = 0x52,
    UseUtf8 = 0x53,
    Extension = 0x54,
    Ranges = 0x55,
    Trampoline = 0x56,
    CallColumn = 0x57,
    CallFile = 0x58,
    CallLine = 0x59,
    LinkageName = 0x6e,
    /// `DW_AT_GNU_vector` (vendor extension, GNU toolchain), used to mark
    /// `DW_TAG_array_type` as a SIMD vector rather than a plain array.
    GnuVector = 0x2107,
}

/// `DW_OP_*` opcodes this loader actually interprets.
///
/// See the module doc comment for why this is a newtype over the raw byte
/// rather than an exhaustive enum: the DW_OP space includes two
/// 32-register-wide contiguous ranges (`DW_OP_reg0..31`,
/// `DW_OP_breg0..31`) that are far more naturally expressed as arithmetic
/// over a base constant than as 64 named variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DwOp(pub u8);

impl DwOp {
    pub const ADDR: DwOp = DwOp(0x03);
    pub const CONST1U: DwOp = DwOp(0x08);
    pub const CONST1S: DwOp = DwOp(0x09);
    pub const CONST2U: DwOp = DwOp(0x0a);
    pub const CONST2S: DwOp = DwOp(0x0b);
    pub const CONST4U: DwOp = DwOp(0x0c);
    pub const CONST4S: DwOp = DwOp(0x0d);
    pub const CONST8U: DwOp = DwOp(0x0e);
    pub const CONST8S: DwOp = DwOp(0x0f);
    pub const CONSTU: DwOp = DwOp(0x10);
    pub const CONSTS: DwOp = DwOp(0x11);
    pub const FBREG: DwOp = DwOp(0x91);
    pub const PLUS_UCONST: DwOp = DwOp(0x23);
    pub const REG0: DwOp = DwOp(0x50);
    pub const REG31: DwOp = DwOp(0x6f);
    pub const BREG0: DwOp = DwOp(0x70);
    pub const BREG31: DwOp = DwOp(0x8f);
    pub const REGX: DwOp = DwOp(0x90);
    pub const BREGX: DwOp = DwOp(0x92);

    /// True for `DW_OP_reg0`..=`DW_OP_reg31` or `DW_OP_regx`: the value lives
    /// in a register (maps to `VLocation::Register`).
    pub fn is_register(self) -> bool {
        (Self::REG0..=Self::REG31).contains(&self) || self == Self::REGX
    }

    /// True for `DW_OP_breg0`..=`DW_OP_breg31`, `DW_OP_bregx`, or
    /// `DW_OP_fbreg`: the value lives at a frame-relative address (maps to
    /// `VLocation::Local`).
    pub fn is_frame_relative(self) -> bool {
        (Self::BREG0..=Self::BREG31).contains(&self) || self == Self::BREGX || self == Self::FBREG
    }
}

/// `DW_ATE_*`: `DW_AT_encoding` values on a `DW_TAG_base_type`, used by the
/// base-type factory to classify boolean/signed flags (§4.2). A newtype over
/// the raw byte for the same reason as [`DwOp`]: the attribute reader only
/// ever needs to test a handful of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DwAte(pub u64);

impl DwAte {
    pub const BOOLEAN: DwAte = DwAte(0x02);
    pub const FLOAT: DwAte = DwAte(0x04);
    pub const SIGNED: DwAte = DwAte(0x05);
    pub const SIGNED_CHAR: DwAte = DwAte(0x06);
    pub const UNSIGNED: DwAte = DwAte(0x07);
    pub const UNSIGNED_CHAR: DwAte = DwAte(0x08);
}
