//! The CU parse driver and node factories (§4.2, §4.3).
//!
//! [`process_unit`] walks the top-level children of a CU's root DIE;
//! [`process_tag`] dispatches a single DIE to the factory for its
//! `DW_TAG_*`, allocating a node in the appropriate table and returning its
//! dense [`SmallId`]. Container factories (class/namespace/subprogram/
//! lexical-block/array/enumeration/subroutine-type) recurse into their own
//! children directly rather than bouncing back through `process_tag` for
//! every child, since each container's children have kind-specific meaning
//! `process_tag`'s generic dispatch can't express (a `member` becomes part
//! of a class's member list, not a free-standing tag; a `formal_parameter`
//! becomes part of an ftype's parameter list, never a table entry at all).
//!
//! Every factory follows the same shape: reserve a table slot (so forward
//! references discovered later in the CU can already find this DIE's
//! offset in the hash), populate a local payload — recursing into children
//! along the way — then finalize the slot. Reserving before recursing is
//! what gives the crate's "dense ids in DIE visitation order, parent before
//! children" guarantee (§5) without needing a live `&mut` borrow into the
//! table for the whole recursive call.

use crate::attr;
use crate::constants::{DwAt, DwTag};
use crate::cu::Cu;
use crate::error::Diagnostic;
use crate::ids::SmallId;
use crate::model::{
    ArrayType, BaseType, ClassMember, Enumerator, EnumerationType, Function, FunctionEntry,
    FunctionType, Header, InlineExpansion, Label, LexicalBlock, NamespaceLike, NonTypeEntry,
    NonTypeKind, Parameter, PointerToMember, TypeEntry, TypeKind, TypeRef, Variable, Accessibility,
    Virtuality,
};
use crate::provider::Die;
use crate::strings::Strings;

/// Maximum number of array dimensions kept; a `subrange_type` past this is
/// dropped with a warning (§4.3, §8 boundary behavior).
const MAX_ARRAY_DIMENSIONS: usize = 64;

/// `process_unit(cu_die_child, cu)`: every direct child of the CU's root DIE
/// is a top-level declaration.
pub fn process_unit<D: Die>(cu_root: &D, cu: &mut Cu, strings: &mut Strings) {
    for child in cu_root.children() {
        process_tag(&child, cu, strings, true);
    }
}

/// Shared "tag init" step (§4.2 point 3): allocates the side-record, reads
/// `DW_AT_type`/`DW_AT_import` and `DW_AT_abstract_origin`, and optionally
/// decl-file/line. Returns the fresh [`Header`] plus the side-record id the
/// caller's factory may still need to mutate (e.g. to set
/// `containing_type`/`specification`).
fn tag_init<D: Die>(
    die: &D,
    cu: &mut Cu,
    strings: &mut Strings,
    top_level: bool,
    capture_decl: bool,
) -> (Header, crate::model::SideId) {
    let type_raw = attr::attr_type(die, DwAt::Type)
        .or_else(|| attr::attr_type(die, DwAt::Import))
        .unwrap_or(0);
    let abstract_origin = attr::attr_type(die, DwAt::AbstractOrigin);
    let (decl_file, decl_line) = if capture_decl {
        attr::attr_decl_file_line(die, strings, &mut cu.last_decl_file)
    } else {
        (crate::strings::StringId::EMPTY, 0)
    };
    let mut side = crate::siderecord::SideRecord::new(die.offset(), type_raw);
    side.origin = match abstract_origin {
        Some(o) => crate::siderecord::Origin::AbstractOrigin(o),
        None => crate::siderecord::Origin::None,
    };
    side.decl_file = decl_file;
    side.decl_line = decl_line;
    let side_id = cu.alloc_side_record(side);
    let mut header = Header::new(top_level, side_id);
    header.type_ref = TypeRef::Unresolved(type_raw);
    (header, side_id)
}

/// `process_tag(die, cu, top_level)`: dispatch on `DW_TAG_*`, allocating
/// through the matching factory. Unrecognized tags are rate-limited-warned
/// and skipped (`None`).
pub fn process_tag<D: Die>(
    die: &D,
    cu: &mut Cu,
    strings: &mut Strings,
    top_level: bool,
) -> Option<SmallId> {
    let raw = die.tag_raw();
    let tag = match DwTag::from_raw(raw) {
        Some(t) => t,
        None => {
            cu.diagnostics.warn_once(
                &format!("raw_tag_{raw:#x}"),
                Diagnostic::UnsupportedTag("<unrecognized DW_TAG>"),
            );
            return None;
        }
    };
    Some(match tag {
        DwTag::PointerType => SmallId::Type(factory_simple_type(die, cu, strings, top_level, TypeKind::Pointer)),
        DwTag::ReferenceType => {
            SmallId::Type(factory_simple_type(die, cu, strings, top_level, TypeKind::ReferenceType))
        }
        DwTag::ConstType => SmallId::Type(factory_simple_type(die, cu, strings, top_level, TypeKind::Const)),
        DwTag::VolatileType => {
            SmallId::Type(factory_simple_type(die, cu, strings, top_level, TypeKind::Volatile))
        }
        DwTag::PtrToMemberType => SmallId::Type(factory_ptr_to_member(die, cu, strings, top_level)),
        DwTag::BaseType => SmallId::Type(factory_base_type(die, cu, strings, top_level)),
        DwTag::ArrayType => SmallId::Type(factory_array_type(die, cu, strings, top_level)),
        DwTag::EnumerationType => SmallId::Type(factory_enumeration_type(die, cu, strings, top_level)),
        DwTag::ClassType => {
            SmallId::Type(factory_namespace_like(die, cu, strings, top_level, TypeKind::Class, true))
        }
        DwTag::StructureType => {
            SmallId::Type(factory_namespace_like(die, cu, strings, top_level, TypeKind::Struct, true))
        }
        DwTag::UnionType => {
            SmallId::Type(factory_namespace_like(die, cu, strings, top_level, TypeKind::Union, true))
        }
        DwTag::Namespace => {
            SmallId::Type(factory_namespace_like(die, cu, strings, top_level, TypeKind::Namespace, false))
        }
        DwTag::Typedef => SmallId::Type(factory_typedef(die, cu, strings, top_level)),
        DwTag::SubroutineType => SmallId::Type(factory_subroutine_type(die, cu, strings, top_level)),
        DwTag::Subprogram => SmallId::Function(factory_subprogram(die, cu, strings, top_level)),
        DwTag::Variable => SmallId::Tag(factory_variable(die, cu, strings, top_level)),
        DwTag::Label => SmallId::Tag(factory_label(die, cu, strings)),
        DwTag::LexicalBlock => SmallId::Tag(factory_lexical_block(die, cu, strings)),
        DwTag::InlinedSubroutine => SmallId::Tag(factory_inline_expansion(die, cu, strings).0),
        DwTag::ImportedDeclaration => SmallId::Tag(factory_imported(die, cu, strings, top_level, false)),
        DwTag::ImportedModule => SmallId::Tag(factory_imported(die, cu, strings, top_level, true)),
        DwTag::Member | DwTag::Inheritance => SmallId::Tag(factory_class_member(die, cu, strings)),
        _ => {
            cu.diagnostics
                .warn_once(tag.name(), Diagnostic::UnsupportedTag(tag.name()));
            return None;
        }
    })
}

fn factory_simple_type<D: Die>(
    die: &D,
    cu: &mut Cu,
    strings: &mut Strings,
    top_level: bool,
    kind_ctor: fn() -> TypeKind,
) -> crate::ids::TypeId {
    let (header, side_id) = tag_init(die, cu, strings, top_level, false);
    let id = cu.reserve_type(die.offset(), side_id);
    cu.finalize_type(id, TypeEntry { header, kind: kind_ctor() });
    id
}

fn factory_ptr_to_member<D: Die>(
    die: &D,
    cu: &mut Cu,
    strings: &mut Strings,
    top_level: bool,
) -> crate::ids::TypeId {
    let (header, side_id) = tag_init(die, cu, strings, top_level, false);
    let id = cu.reserve_type(die.offset(), side_id);
    let containing_raw = attr::attr_type(die, DwAt::ContainingType).unwrap_or(0);
    cu.side_mut(side_id).origin = crate::siderecord::Origin::ContainingType(containing_raw);
    let payload = PointerToMember {
        containing_type: TypeRef::Unresolved(containing_raw),
    };
    cu.finalize_type(
        id,
        TypeEntry {
            header,
            kind: TypeKind::PointerToMember(payload),
        },
    );
    id
}

fn factory_base_type<D: Die>(
    die: &D,
    cu: &mut Cu,
    strings: &mut Strings,
    top_level: bool,
) -> crate::ids::TypeId {
    let (header, side_id) = tag_init(die, cu, strings, top_level, false);
    let id = cu.reserve_type(die.offset(), side_id);
    let name = attr::attr_string(die, DwAt::Name, strings);
    let byte_size = attr::attr_numeric(die, DwAt::ByteSize);
    let bit_size_attr = attr::attr_numeric(die, DwAt::BitSize);
    let bit_size = if bit_size_attr > 0 { bit_size_attr } else { byte_size * 8 };
    let encoding = crate::constants::DwAte(attr::attr_numeric(die, DwAt::Encoding));
    let boolean = encoding == crate::constants::DwAte::BOOLEAN;
    let signed = encoding == crate::constants::DwAte::SIGNED || encoding == crate::constants::DwAte::SIGNED_CHAR;
    // Some producers emit a distinguished base type named "..." to stand in
    // for the ellipsis of a varargs parameter list.
    let varargs = &*strings.str(name) == "...";
    cu.finalize_type(
        id,
        TypeEntry {
            header,
            kind: TypeKind::BaseType(BaseType {
                name,
                bit_size,
                boolean,
                signed,
                varargs,
            }),
        },
    );
    id
}

fn factory_array_type<D: Die>(
    die: &D,
    cu: &mut Cu,
    strings: &mut Strings,
    top_level: bool,
) -> crate::ids::TypeId {
    let (header, side_id) = tag_init(die, cu, strings, top_level, false);
    let id = cu.reserve_type(die.offset(), side_id);
    let vector = attr::attr_numeric(die, DwAt::GnuVector) != 0;
    let mut dimensions = Vec::new();
    for child in die.children() {
        if DwTag::from_raw(child.tag_raw()) == Some(DwTag::SubrangeType) {
            if dimensions.len() >= MAX_ARRAY_DIMENSIONS {
                cu.diagnostics.warn_once(
                    "array_dimensions_truncated",
                    Diagnostic::UnsupportedTag("array_type with more than 64 dimensions"),
                );
                break;
            }
            dimensions.push(attr::attr_upper_bound(&child));
        } else {
            cu.diagnostics.warn_once(
                "array_type_unexpected_child",
                Diagnostic::UnsupportedTag("non-subrange child of DW_TAG_array_type"),
            );
        }
    }
    cu.finalize_type(
        id,
        TypeEntry {
            header,
            kind: TypeKind::ArrayType(ArrayType { dimensions, vector }),
        },
    );
    id
}

fn factory_enumeration_type<D: Die>(
    die: &D,
    cu: &mut Cu,
    strings: &mut Strings,
    top_level: bool,
) -> crate::ids::TypeId {
    let (header, side_id) = tag_init(die, cu, strings, top_level, true);
    let id = cu.reserve_type(die.offset(), side_id);
    let name = attr::attr_string(die, DwAt::Name, strings);
    let byte_size = attr::attr_numeric(die, DwAt::ByteSize);
    let size_bits = if byte_size > 0 {
        byte_size * 8
    } else {
        u64::from(std::mem::size_of::<std::ffi::c_int>() as u32) * 8
    };
    let mut enumerators = Vec::new();
    for child in die.children() {
        if DwTag::from_raw(child.tag_raw()) == Some(DwTag::Enumerator) {
            let ename = attr::attr_string(&child, DwAt::Name, strings);
            let value = attr::attr_const_value_signed(&child);
            enumerators.push(Enumerator { name: ename, value });
        } else {
            cu.diagnostics.warn_once(
                "enumeration_unexpected_child",
                Diagnostic::UnsupportedTag("non-enumerator child of DW_TAG_enumeration_type"),
            );
        }
    }
    cu.finalize_type(
        id,
        TypeEntry {
            header,
            kind: TypeKind::EnumerationType(EnumerationType {
                name,
                size_bits,
                enumerators: std::rc::Rc::new(enumerators),
                shared_tags: false,
            }),
        },
    );
    id
}

fn factory_namespace_like<D: Die>(
    die: &D,
    cu: &mut Cu,
    strings: &mut Strings,
    top_level: bool,
    wrap: fn(NamespaceLike) -> TypeKind,
    is_class_like: bool,
) -> crate::ids::TypeId {
    let (header, side_id) = tag_init(die, cu, strings, top_level, true);
    let id = cu.reserve_type(die.offset(), side_id);
    let name = attr::attr_string(die, DwAt::Name, strings);
    let mut ns = NamespaceLike::new(name);
    ns.size = attr::attr_numeric(die, DwAt::ByteSize);
    ns.declaration_only = attr::attr_numeric(die, DwAt::Declaration) != 0;
    ns.is_definition = !ns.declaration_only;
    if let Some(spec) = attr::attr_type(die, DwAt::Specification) {
        cu.side_mut(side_id).specification = Some(spec);
    }
    process_class_children(die, cu, strings, &mut ns, is_class_like);
    cu.finalize_type(id, TypeEntry { header, kind: wrap(ns) });
    id
}

/// Shared body for `process_class` and `process_namespace` (§4.3): the only
/// difference between the two is whether `member`/`inheritance`/template
/// children get special-cased (classes do; namespaces dispatch every child
/// through [`process_tag`] uniformly).
fn process_class_children<D: Die>(
    die: &D,
    cu: &mut Cu,
    strings: &mut Strings,
    ns: &mut NamespaceLike,
    is_class_like: bool,
) {
    for child in die.children() {
        let child_tag = DwTag::from_raw(child.tag_raw());
        if is_class_like {
            match child_tag {
                Some(DwTag::Member) | Some(DwTag::Inheritance) => {
                    let member_id = factory_class_member(&child, cu, strings);
                    ns.nr_members += 1;
                    ns.children.push(SmallId::Tag(member_id));
                    continue;
                }
                Some(DwTag::TemplateTypeParameter) | Some(DwTag::TemplateValueParameter) => {
                    cu.diagnostics.warn_once(
                        "template_parameter",
                        Diagnostic::UnsupportedTag(child_tag.unwrap().name()),
                    );
                    continue;
                }
                _ => {}
            }
        }
        if let Some(id) = process_tag(&child, cu, strings, false) {
            ns.children.push(id);
        }
    }
}

fn factory_typedef<D: Die>(
    die: &D,
    cu: &mut Cu,
    strings: &mut Strings,
    top_level: bool,
) -> crate::ids::TypeId {
    let (header, side_id) = tag_init(die, cu, strings, top_level, true);
    let id = cu.reserve_type(die.offset(), side_id);
    let name = attr::attr_string(die, DwAt::Name, strings);
    cu.finalize_type(
        id,
        TypeEntry {
            header,
            kind: TypeKind::Typedef(NamespaceLike::new(name)),
        },
    );
    id
}

fn factory_subroutine_type<D: Die>(
    die: &D,
    cu: &mut Cu,
    strings: &mut Strings,
    top_level: bool,
) -> crate::ids::TypeId {
    let (header, side_id) = tag_init(die, cu, strings, top_level, false);
    let id = cu.reserve_type(die.offset(), side_id);
    let mut ftype = FunctionType::default();
    let mut unused_block = LexicalBlock::default();
    process_function_children(die, cu, strings, Some(&mut ftype), &mut unused_block);
    cu.finalize_type(id, TypeEntry { header, kind: TypeKind::FunctionType(ftype) });
    id
}

fn factory_class_member<D: Die>(die: &D, cu: &mut Cu, strings: &mut Strings) -> crate::ids::TagId {
    let (header, side_id) = tag_init(die, cu, strings, false, false);
    let id = cu.reserve_tag(die.offset(), side_id);
    let name = attr::attr_string(die, DwAt::Name, strings);
    let mut member = ClassMember::new(name);
    member.byte_offset = attr::attr_offset(die, DwAt::DataMemberLocation, &cu.diagnostics);
    member.bitfield_offset = attr::attr_numeric(die, DwAt::BitOffset);
    member.bitfield_size = attr::attr_numeric(die, DwAt::BitSize);
    member.accessibility = Accessibility::from_raw(attr::attr_numeric(die, DwAt::Accessibility));
    member.virtuality = Virtuality::from_raw(attr::attr_numeric(die, DwAt::Virtuality));
    cu.finalize_tag(
        id,
        NonTypeEntry {
            header,
            kind: NonTypeKind::ClassMember(member),
        },
    );
    id
}

fn factory_variable<D: Die>(
    die: &D,
    cu: &mut Cu,
    strings: &mut Strings,
    top_level: bool,
) -> crate::ids::TagId {
    let (header, side_id) = tag_init(die, cu, strings, top_level, true);
    let id = cu.reserve_tag(die.offset(), side_id);
    let name = attr::attr_string(die, DwAt::Name, strings);
    let external = attr::attr_numeric(die, DwAt::External) != 0;
    let declaration_only = attr::attr_numeric(die, DwAt::Declaration) != 0;
    let (location, address) = attr::dwarf_location(die, &cu.diagnostics);
    cu.finalize_tag(
        id,
        NonTypeEntry {
            header,
            kind: NonTypeKind::Variable(Variable {
                name,
                external,
                declaration_only,
                location,
                address,
            }),
        },
    );
    id
}

fn factory_label<D: Die>(die: &D, cu: &mut Cu, strings: &mut Strings) -> crate::ids::TagId {
    let (header, side_id) = tag_init(die, cu, strings, false, false);
    let id = cu.reserve_tag(die.offset(), side_id);
    let name = attr::attr_string(die, DwAt::Name, strings);
    let address = die.low_pc();
    cu.finalize_tag(
        id,
        NonTypeEntry {
            header,
            kind: NonTypeKind::Label(Label { name, address }),
        },
    );
    id
}

fn factory_imported<D: Die>(
    die: &D,
    cu: &mut Cu,
    strings: &mut Strings,
    top_level: bool,
    is_module: bool,
) -> crate::ids::TagId {
    let (header, side_id) = tag_init(die, cu, strings, top_level, false);
    let id = cu.reserve_tag(die.offset(), side_id);
    let kind = if is_module {
        NonTypeKind::ImportedModule
    } else {
        NonTypeKind::ImportedDeclaration
    };
    cu.finalize_tag(id, NonTypeEntry { header, kind });
    id
}

/// Sum of an inlined subroutine's address ranges, and its starting address
/// (§8 scenario 4: non-contiguous ranges sum to the expansion's size).
fn inline_expansion_extent<D: Die>(die: &D, cu: &Cu) -> (u64, u64, u64) {
    let ranges = die.ranges();
    if !ranges.is_empty() {
        let address = ranges[0].0;
        let high_pc = ranges.iter().map(|(_, hi)| *hi).max().unwrap_or(address);
        let size = ranges.iter().map(|(lo, hi)| hi.saturating_sub(*lo)).sum();
        (address, high_pc, size)
    } else if let (Some(lo), Some(hi)) = (die.low_pc(), die.high_pc()) {
        (lo, hi, hi.saturating_sub(lo))
    } else {
        cu.diagnostics.note(
            "inlined_subroutine has neither DW_AT_ranges nor low/high_pc; size left at 0",
        );
        (0, 0, 0)
    }
}

fn factory_inline_expansion<D: Die>(
    die: &D,
    cu: &mut Cu,
    strings: &mut Strings,
) -> (crate::ids::TagId, u64) {
    let (header, side_id) = tag_init(die, cu, strings, false, false);
    let id = cu.reserve_tag(die.offset(), side_id);
    let (address, high_pc, size) = inline_expansion_extent(die, cu);
    let expansion = InlineExpansion {
        abstract_origin: None,
        address,
        high_pc,
        size,
    };
    cu.finalize_tag(
        id,
        NonTypeEntry {
            header,
            kind: NonTypeKind::InlineExpansion(expansion),
        },
    );
    (id, size)
}

fn factory_lexical_block<D: Die>(die: &D, cu: &mut Cu, strings: &mut Strings) -> crate::ids::TagId {
    let (header, side_id) = tag_init(die, cu, strings, false, false);
    let id = cu.reserve_tag(die.offset(), side_id);
    let mut lb = LexicalBlock {
        address: die.low_pc(),
        ..LexicalBlock::default()
    };
    lb.size = match (die.low_pc(), die.high_pc()) {
        (Some(lo), Some(hi)) => hi.saturating_sub(lo),
        _ => 0,
    };
    process_function_children(die, cu, strings, None, &mut lb);
    cu.finalize_tag(
        id,
        NonTypeEntry {
            header,
            kind: NonTypeKind::LexicalBlock(lb),
        },
    );
    id
}

/// Shared body of `process_function`/`process_inline_expansion` (§4.3).
/// `ftype` is `Some` for a subprogram/subroutine-type signature and `None`
/// when descending into a lexical block or inline expansion, in which case
/// formal parameters have no parameter list of their own to join and are
/// instead modeled as ordinary block-scoped variables (this crate's
/// `LexicalBlock` has no parameter list distinct from its variable list,
/// unlike `FunctionType`).
fn process_function_children<D: Die>(
    die: &D,
    cu: &mut Cu,
    strings: &mut Strings,
    mut ftype: Option<&mut FunctionType>,
    lb: &mut LexicalBlock,
) {
    for child in die.children() {
        match DwTag::from_raw(child.tag_raw()) {
            Some(DwTag::FormalParameter) => {
                let name = attr::attr_string(&child, DwAt::Name, strings);
                let type_raw = attr::attr_type(&child, DwAt::Type).unwrap_or(0);
                match ftype.as_deref_mut() {
                    Some(ft) => ft.parameters.push(Parameter {
                        name,
                        type_ref: TypeRef::Unresolved(type_raw),
                    }),
                    None => {
                        let var_id = factory_formal_parameter_as_variable(&child, cu, strings, name, type_raw);
                        lb.variables.push(var_id);
                    }
                }
            }
            Some(DwTag::UnspecifiedParameters) => {
                if let Some(ft) = ftype.as_deref_mut() {
                    ft.unspecified_parameters = true;
                }
            }
            Some(DwTag::Variable) => {
                let var_id = factory_variable(&child, cu, strings, false);
                lb.variables.push(var_id);
            }
            Some(DwTag::Label) => {
                let label_id = factory_label(&child, cu, strings);
                lb.labels.push(label_id);
            }
            Some(DwTag::LexicalBlock) => {
                let sub_id = factory_lexical_block(&child, cu, strings);
                lb.sub_blocks.push(sub_id);
            }
            Some(DwTag::InlinedSubroutine) => {
                let (inline_id, size) = factory_inline_expansion(&child, cu, strings);
                lb.inline_expansions.push(inline_id);
                lb.total_inline_expansion_size += size;
            }
            _ => {
                process_tag(&child, cu, strings, false);
            }
        }
    }
}

/// A `formal_parameter` encountered inside an inline-expansion context (no
/// enclosing ftype): modeled as a non-external, non-global variable so it
/// still gets a `tags_table` slot other references could target.
fn factory_formal_parameter_as_variable<D: Die>(
    die: &D,
    cu: &mut Cu,
    strings: &mut Strings,
    name: crate::strings::StringId,
    type_raw: crate::ids::DieOffset,
) -> crate::ids::TagId {
    let mut side = crate::siderecord::SideRecord::new(die.offset(), type_raw);
    side.decl_file = crate::strings::StringId::EMPTY;
    let side_id = cu.alloc_side_record(side);
    let mut header = Header::new(false, side_id);
    header.type_ref = TypeRef::Unresolved(type_raw);
    let id = cu.reserve_tag(die.offset(), side_id);
    cu.finalize_tag(
        id,
        NonTypeEntry {
            header,
            kind: NonTypeKind::Variable(Variable {
                name,
                external: false,
                declaration_only: false,
                location: crate::model::VLocation::Unknown,
                address: None,
            }),
        },
    );
    id
}

fn factory_subprogram<D: Die>(
    die: &D,
    cu: &mut Cu,
    strings: &mut Strings,
    top_level: bool,
) -> crate::ids::FunctionId {
    let (header, side_id) = tag_init(die, cu, strings, top_level, true);
    let id = cu.reserve_function(die.offset(), side_id);
    let name = attr::attr_string(die, DwAt::Name, strings);
    let linkage_name = attr::attr_string(die, DwAt::LinkageName, strings);
    let inlined = attr::attr_numeric(die, DwAt::Inline) != 0;
    let external = attr::attr_numeric(die, DwAt::External) != 0;
    let has_abstract_origin = cu.side(side_id).origin.raw_offset().is_some();
    if let Some(spec) = attr::attr_type(die, DwAt::Specification) {
        cu.side_mut(side_id).specification = Some(spec);
    }
    let accessibility = Accessibility::from_raw(attr::attr_numeric(die, DwAt::Accessibility));
    let virtuality = Virtuality::from_raw(attr::attr_numeric(die, DwAt::Virtuality));
    let vtable_entry_offset = attr::attr_offset_opt(die, DwAt::VtableElemLocation, &cu.diagnostics);
    let mut ftype = FunctionType::default();
    let mut lb = LexicalBlock {
        address: die.low_pc(),
        ..LexicalBlock::default()
    };
    lb.size = match (die.low_pc(), die.high_pc()) {
        (Some(lo), Some(hi)) => hi.saturating_sub(lo),
        _ => 0,
    };
    process_function_children(die, cu, strings, Some(&mut ftype), &mut lb);
    let function = Function {
        ftype,
        lexical_block: lb,
        name,
        linkage_name,
        inlined,
        external,
        has_abstract_origin,
        specification: None,
        accessibility,
        virtuality,
        vtable_entry_offset,
        vtable_node: None,
    };
    cu.finalize_function(id, FunctionEntry { header, function });
    id
}
