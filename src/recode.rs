//! The recoder (§4.4): the second CU-wide pass, walking `types_table`,
//! `tags_table`, then `functions_table` in that order and rewriting every
//! stored [`TypeRef::Unresolved`] into a [`TypeRef::Resolved`] dense id.
//!
//! Unlike the base spec's "recurse into namespace-like children, trigger
//! bitfield synthesis while inside that recursion" structure, this crate's
//! flat three-table layout already visits every `class_member` as an
//! ordinary `tags_table` entry — `NamespaceLike::children` was populated at
//! parse time and never needs a second traversal. Bitfield synthesis
//! (§4.5) is therefore triggered directly from [`recode_class_member`]
//! during the `tags_table` pass, not via a nested namespace recursion
//! during the `types_table` pass; the two are observably equivalent since
//! every member recode runs exactly once either way.

use crate::bitfield;
use crate::cu::Cu;
use crate::error::Diagnostic;
use crate::ids::{DieOffset, FunctionId, SmallId, TagId, TypeId};
use crate::model::{NonTypeKind, TypeKind, TypeRef};
use crate::strings::StringId;

/// Recode one fully-parsed CU in place.
pub fn recode_cu(cu: &mut Cu) {
    recode_types(cu);
    recode_tags(cu);
    recode_functions(cu);
}

/// Resolve a single `TypeRef`, logging `DANGLING_REFERENCE` and falling
/// back to void on a miss. Already-resolved refs pass through unchanged,
/// which is what makes a second recode pass a no-op (§8 idempotence).
fn resolve_generic_type_ref(
    cu: &Cu,
    type_ref: TypeRef,
    from: DieOffset,
    kind_label: &'static str,
) -> TypeRef {
    match type_ref {
        TypeRef::Resolved(_) => type_ref,
        TypeRef::Unresolved(0) => TypeRef::Resolved(TypeId::VOID),
        TypeRef::Unresolved(off) => match cu.find_type(off) {
            Some(id) => TypeRef::Resolved(id),
            None => {
                cu.diagnostics.warn(Diagnostic::DanglingReference {
                    from,
                    to: off,
                    kind: kind_label,
                });
                TypeRef::Resolved(TypeId::VOID)
            }
        },
    }
}

// ---------------------------------------------------------------- types ---

fn recode_types(cu: &mut Cu) {
    let len = cu.types_table.len();
    for i in 1..len {
        recode_one_type(cu, TypeId(i as u32));
    }
}

fn recode_one_type(cu: &mut Cu, id: TypeId) {
    let side = cu.types_table[id.index()].header.side;
    let from = cu.die_offset_of(side);

    if matches!(cu.types_table[id.index()].kind, TypeKind::PointerToMember(_)) {
        recode_containing_type(cu, id, side, from);
    }

    if cu.types_table[id.index()].kind.namespace_like().is_some() {
        recode_specification_name(cu, id, side, from);
    }

    let old_ref = cu.types_table[id.index()].header.type_ref;
    let new_ref = resolve_generic_type_ref(cu, old_ref, from, "type");
    cu.types_table[id.index()].header.type_ref = new_ref;

    if matches!(cu.types_table[id.index()].kind, TypeKind::FunctionType(_)) {
        recode_ftype_params_in_types_table(cu, id, from);
    }
}

fn recode_containing_type(cu: &mut Cu, id: TypeId, side: Option<crate::model::SideId>, from: DieOffset) {
    let containing_raw = side.and_then(|s| cu.side(s).origin.raw_offset());
    let resolved = match containing_raw {
        None => TypeRef::void(),
        Some(off) => match cu.find_type(off) {
            Some(tid) => TypeRef::Resolved(tid),
            None => {
                cu.diagnostics.warn(Diagnostic::DanglingReference {
                    from,
                    to: off,
                    kind: "containing_type",
                });
                TypeRef::void()
            }
        },
    };
    if let TypeKind::PointerToMember(p) = &mut cu.types_table[id.index()].kind {
        p.containing_type = resolved;
    }
}

fn recode_specification_name(cu: &mut Cu, id: TypeId, side: Option<crate::model::SideId>, from: DieOffset) {
    let spec_raw = side.and_then(|s| cu.side(s).specification);
    let Some(spec_off) = spec_raw else { return };
    let Some(spec_id) = cu.find_type(spec_off) else {
        cu.diagnostics.warn(Diagnostic::DanglingReference {
            from,
            to: spec_off,
            kind: "specification",
        });
        return;
    };

    let needs_name = cu.types_table[id.index()]
        .kind
        .namespace_like()
        .map(|ns| ns.name == StringId::EMPTY)
        .unwrap_or(false);
    if needs_name {
        let spec_name = cu.types_table[spec_id.index()].kind.interned_name();
        if let Some(ns) = cu.types_table[id.index()].kind.namespace_like_mut() {
            ns.name = spec_name;
        }
    }
    if let Some(ns) = cu.types_table[id.index()].kind.namespace_like_mut() {
        ns.specification = Some(spec_id);
    }
}

fn recode_ftype_params_in_types_table(cu: &mut Cu, id: TypeId, from: DieOffset) {
    let n = match &cu.types_table[id.index()].kind {
        TypeKind::FunctionType(ft) => ft.parameters.len(),
        _ => return,
    };
    for pi in 0..n {
        let old = match &cu.types_table[id.index()].kind {
            TypeKind::FunctionType(ft) => ft.parameters[pi].type_ref,
            _ => return,
        };
        let new = resolve_generic_type_ref(cu, old, from, "parameter");
        if let TypeKind::FunctionType(ft) = &mut cu.types_table[id.index()].kind {
            ft.parameters[pi].type_ref = new;
        }
    }
}

// ----------------------------------------------------------------- tags ---

fn recode_tags(cu: &mut Cu) {
    let len = cu.tags_table.len();
    for i in 0..len {
        recode_one_tag(cu, TagId(i as u32));
    }
}

fn recode_one_tag(cu: &mut Cu, id: TagId) {
    let side = cu.tags_table[id.index()].header.side;
    let from = cu.die_offset_of(side);
    match &cu.tags_table[id.index()].kind {
        NonTypeKind::ClassMember(_) => recode_class_member(cu, id, from),
        NonTypeKind::Variable(_) => recode_variable(cu, id, side, from),
        NonTypeKind::InlineExpansion(_) => recode_inline_expansion(cu, id, side, from),
        NonTypeKind::ImportedDeclaration => {
            let raw = cu.tags_table[id.index()].header.type_ref.raw_offset().unwrap_or(0);
            let resolved = resolve_import_ref(cu, raw, from, true);
            cu.tags_table[id.index()].header.type_ref = resolved;
        }
        NonTypeKind::ImportedModule => {
            let raw = cu.tags_table[id.index()].header.type_ref.raw_offset().unwrap_or(0);
            let resolved = resolve_import_ref(cu, raw, from, false);
            cu.tags_table[id.index()].header.type_ref = resolved;
        }
        NonTypeKind::Label(_) | NonTypeKind::LexicalBlock(_) => {
            cu.tags_table[id.index()].header.type_ref = TypeRef::Resolved(TypeId::VOID);
        }
    }
}

/// `imported_declaration` tries the tag hash first, falling back to the
/// type hash; `imported_module` only ever consults the tag hash (§4.4).
/// When the tag hash resolves to a non-type `SmallId`, this crate's
/// `Header::type_ref` (a bare `TypeId`) has nowhere to put it — noted once
/// per CU rather than silently dropped.
fn resolve_import_ref(cu: &Cu, raw: DieOffset, from: DieOffset, try_type_fallback: bool) -> TypeRef {
    if raw == 0 {
        return TypeRef::Resolved(TypeId::VOID);
    }
    match cu.find_tag_or_function(raw) {
        Some(SmallId::Type(tid)) => TypeRef::Resolved(tid),
        Some(_) => {
            cu.diagnostics
                .note("import target resolved to a non-type tag; header.type_ref cannot represent it");
            TypeRef::Resolved(TypeId::VOID)
        }
        None if try_type_fallback => match cu.find_type(raw) {
            Some(tid) => TypeRef::Resolved(tid),
            None => {
                cu.diagnostics.warn(Diagnostic::DanglingReference { from, to: raw, kind: "import" });
                TypeRef::Resolved(TypeId::VOID)
            }
        },
        None => {
            cu.diagnostics.warn(Diagnostic::DanglingReference { from, to: raw, kind: "import" });
            TypeRef::Resolved(TypeId::VOID)
        }
    }
}

fn recode_class_member(cu: &mut Cu, id: TagId, from: DieOffset) {
    let old = cu.tags_table[id.index()].header.type_ref;
    let resolved = resolve_generic_type_ref(cu, old, from, "member");
    cu.tags_table[id.index()].header.type_ref = resolved;

    let bitfield_size = match &cu.tags_table[id.index()].kind {
        NonTypeKind::ClassMember(m) => m.bitfield_size,
        _ => 0,
    };
    if bitfield_size > 0 {
        let target = resolved.resolved();
        let synthetic = bitfield::recode_bitfield(cu, target, bitfield_size, from);
        cu.tags_table[id.index()].header.type_ref = TypeRef::Resolved(synthetic);
    }
}

/// Variables (including formal-parameters-turned-variables, §4.3) with no
/// own type borrow the `abstract_origin` chain's name and type once it is
/// itself recoded (§4.4's lexical-block note).
fn recode_variable(cu: &mut Cu, id: TagId, side: Option<crate::model::SideId>, from: DieOffset) {
    let old = cu.tags_table[id.index()].header.type_ref;
    let mut resolved = resolve_generic_type_ref(cu, old, from, "variable");

    if resolved.resolved() == TypeId::VOID {
        let origin_raw = side.and_then(|s| cu.side(s).origin.raw_offset());
        if let Some(off) = origin_raw {
            if let Some(SmallId::Tag(origin_id)) = cu.find_tag_or_function(off) {
                let origin_name = match &cu.tags_table[origin_id.index()].kind {
                    NonTypeKind::Variable(v) => Some(v.name),
                    _ => None,
                };
                if let Some(origin_name) = origin_name {
                    let origin_type_ref = cu.tags_table[origin_id.index()].header.type_ref;
                    if let NonTypeKind::Variable(v) = &mut cu.tags_table[id.index()].kind {
                        if v.name == StringId::EMPTY {
                            v.name = origin_name;
                        }
                    }
                    resolved = origin_type_ref;
                }
            }
        }
    }
    cu.tags_table[id.index()].header.type_ref = resolved;
}

fn recode_inline_expansion(cu: &mut Cu, id: TagId, side: Option<crate::model::SideId>, from: DieOffset) {
    let origin_raw = side.and_then(|s| cu.side(s).origin.raw_offset());
    let resolved_origin = match origin_raw {
        None => None,
        Some(off) => match cu.find_tag_or_function(off) {
            Some(SmallId::Function(fid)) => Some(fid),
            Some(_) => {
                cu.diagnostics
                    .note("inlined_subroutine abstract_origin resolved to a non-function tag");
                None
            }
            None => {
                cu.diagnostics.warn(Diagnostic::DanglingReference {
                    from,
                    to: off,
                    kind: "abstract_origin",
                });
                None
            }
        },
    };
    if let NonTypeKind::InlineExpansion(ie) = &mut cu.tags_table[id.index()].kind {
        ie.abstract_origin = resolved_origin;
    }
    cu.tags_table[id.index()].header.type_ref = TypeRef::Resolved(TypeId::VOID);
}

// ------------------------------------------------------------ functions ---

fn recode_functions(cu: &mut Cu) {
    let len = cu.functions_table.len();
    for i in 0..len {
        recode_one_function(cu, FunctionId(i as u32));
    }
}

fn recode_one_function(cu: &mut Cu, id: FunctionId) {
    let side = cu.functions_table[id.index()].header.side;
    let from = cu.die_offset_of(side);

    resolve_function_name(cu, id, side);

    let old_ref = cu.functions_table[id.index()].header.type_ref;
    let new_ref = resolve_generic_type_ref(cu, old_ref, from, "return type");
    cu.functions_table[id.index()].header.type_ref = new_ref;

    recode_ftype_params_in_functions_table(cu, id, from);
}

/// Resolve a subprogram's missing name via `abstract_origin` first, then
/// `specification` (§4.4, §8 scenario 3) — both live in the tag hash when
/// they name functions.
fn resolve_function_name(cu: &mut Cu, id: FunctionId, side: Option<crate::model::SideId>) {
    let name_empty = cu.functions_table[id.index()].function.name == StringId::EMPTY;
    if !name_empty {
        return;
    }
    let origin_raw = side.and_then(|s| cu.side(s).origin.raw_offset());
    let spec_raw = side.and_then(|s| cu.side(s).specification);

    let mut resolved_name = None;
    if let Some(off) = origin_raw {
        if let Some(SmallId::Function(origin_fid)) = cu.find_tag_or_function(off) {
            resolved_name = Some(cu.functions_table[origin_fid.index()].function.name);
        }
    }
    if resolved_name.is_none() {
        if let Some(off) = spec_raw {
            if let Some(SmallId::Function(spec_fid)) = cu.find_tag_or_function(off) {
                resolved_name = Some(cu.functions_table[spec_fid.index()].function.name);
                cu.functions_table[id.index()].function.specification = Some(spec_fid);
            }
        }
    }
    if let Some(name) = resolved_name {
        cu.functions_table[id.index()].function.name = name;
    }
}

fn recode_ftype_params_in_functions_table(cu: &mut Cu, id: FunctionId, from: DieOffset) {
    let n = cu.functions_table[id.index()].function.ftype.parameters.len();
    for pi in 0..n {
        let old = cu.functions_table[id.index()].function.ftype.parameters[pi].type_ref;
        let new = resolve_generic_type_ref(cu, old, from, "parameter");
        cu.functions_table[id.index()].function.ftype.parameters[pi].type_ref = new;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BaseType, Header, TypeEntry};
    use crate::siderecord::SideRecord;

    fn make_base(cu: &mut Cu, die_offset: u64, name: StringId) -> TypeId {
        let side = cu.alloc_side_record(SideRecord::new(die_offset, 0));
        let id = cu.reserve_type(die_offset, side);
        cu.finalize_type(
            id,
            TypeEntry {
                header: Header::new(true, side),
                kind: TypeKind::BaseType(BaseType {
                    name,
                    bit_size: 32,
                    boolean: false,
                    signed: true,
                    varargs: false,
                }),
            },
        );
        id
    }

    #[test]
    fn dangling_type_ref_falls_back_to_void() {
        let mut cu = Cu::new(StringId::EMPTY, 8, "a.out".to_string());
        let side = cu.alloc_side_record(SideRecord::new(0x40, 0x999));
        let id = cu.reserve_type(0x40, side);
        cu.finalize_type(
            id,
            TypeEntry {
                header: {
                    let mut h = Header::new(true, side);
                    h.type_ref = TypeRef::Unresolved(0x999);
                    h
                },
                kind: TypeKind::Pointer,
            },
        );
        recode_cu(&mut cu);
        assert_eq!(cu.types_table[id.index()].header.type_ref.resolved(), TypeId::VOID);
    }

    #[test]
    fn pointer_resolves_to_its_pointee() {
        let mut cu = Cu::new(StringId::EMPTY, 8, "a.out".to_string());
        let int_id = make_base(&mut cu, 0x10, StringId::EMPTY);
        let side = cu.alloc_side_record(SideRecord::new(0x20, 0x10));
        let ptr_id = cu.reserve_type(0x20, side);
        cu.finalize_type(
            ptr_id,
            TypeEntry {
                header: {
                    let mut h = Header::new(true, side);
                    h.type_ref = TypeRef::Unresolved(0x10);
                    h
                },
                kind: TypeKind::Pointer,
            },
        );
        recode_cu(&mut cu);
        assert_eq!(cu.types_table[ptr_id.index()].header.type_ref.resolved(), int_id);
    }

    #[test]
    fn recode_is_idempotent() {
        let mut cu = Cu::new(StringId::EMPTY, 8, "a.out".to_string());
        let int_id = make_base(&mut cu, 0x10, StringId::EMPTY);
        let side = cu.alloc_side_record(SideRecord::new(0x20, 0x10));
        let ptr_id = cu.reserve_type(0x20, side);
        cu.finalize_type(
            ptr_id,
            TypeEntry {
                header: {
                    let mut h = Header::new(true, side);
                    h.type_ref = TypeRef::Unresolved(0x10);
                    h
                },
                kind: TypeKind::Pointer,
            },
        );
        recode_cu(&mut cu);
        let first = cu.types_table[ptr_id.index()].header.type_ref;
        recode_cu(&mut cu);
        let second = cu.types_table[ptr_id.index()].header.type_ref;
        assert_eq!(first.resolved(), second.resolved());
        assert_eq!(second.resolved(), int_id);
    }
}
