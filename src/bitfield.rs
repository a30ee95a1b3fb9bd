//! Bitfield type synthesis (§4.5): the only place the type graph grows new
//! nodes after the initial parse. Triggered by [`crate::recode`] whenever a
//! `class_member`'s `bitfield_size` is nonzero.
//!
//! Synthetic nodes are deduplicated within one CU by scanning `types_table`
//! linearly rather than through the per-CU hash (§5, §9): the hash is keyed
//! by DWARF byte offset, which synthetic nodes never had one of, so the
//! dedup key here is `(interned_name, bit_size)` instead.

use std::rc::Rc;

use crate::cu::Cu;
use crate::error::Diagnostic;
use crate::ids::{DieOffset, TypeId};
use crate::model::{BaseType, EnumerationType, Header, NamespaceLike, TypeEntry, TypeKind, TypeRef};
use crate::strings::StringId;

enum Qualifier {
    Const,
    Volatile,
    Typedef(StringId),
}

enum BfShape {
    Qualifier(Qualifier),
    Base {
        name: StringId,
        boolean: bool,
        signed: bool,
        varargs: bool,
    },
    Enum(StringId),
    Other(&'static str),
}

fn shape_of(cu: &Cu, id: TypeId) -> BfShape {
    match &cu.types_table[id.index()].kind {
        TypeKind::Typedef(ns) => BfShape::Qualifier(Qualifier::Typedef(ns.name)),
        TypeKind::Const => BfShape::Qualifier(Qualifier::Const),
        TypeKind::Volatile => BfShape::Qualifier(Qualifier::Volatile),
        TypeKind::BaseType(b) => BfShape::Base {
            name: b.name,
            boolean: b.boolean,
            signed: b.signed,
            varargs: b.varargs,
        },
        TypeKind::EnumerationType(e) => BfShape::Enum(e.name),
        other => BfShape::Other(other.name()),
    }
}

/// Recode `target` into a type suitable for a `bit_size`-wide bitfield
/// member, synthesizing a new node only when no existing one already fits.
pub fn recode_bitfield(cu: &mut Cu, target: TypeId, bit_size: u64, from: DieOffset) -> TypeId {
    match shape_of(cu, target) {
        BfShape::Qualifier(q) => recode_qualifier(cu, target, bit_size, from, q),
        BfShape::Base {
            name,
            boolean,
            signed,
            varargs,
        } => find_or_make_base(cu, name, boolean, signed, varargs, bit_size),
        BfShape::Enum(name) => find_or_make_enum(cu, target, name, bit_size),
        BfShape::Other(label) => {
            cu.diagnostics
                .warn_once(&bitfield_warn_key(label), Diagnostic::UnsupportedTag(label));
            target
        }
    }
}

fn bitfield_warn_key(label: &str) -> String {
    format!("bitfield_on_{label}")
}

/// `typedef`/`const`/`volatile`: recode the wrapped type first; reuse the
/// original node untouched if the inner type didn't actually need to
/// change, else allocate a fresh wrapper over the newly recoded inner type
/// (§8 scenario 2: the original typedef survives at its own id).
fn recode_qualifier(cu: &mut Cu, id: TypeId, bit_size: u64, from: DieOffset, q: Qualifier) -> TypeId {
    let inner = cu.types_table[id.index()].header.type_ref.resolved();
    let recoded_inner = recode_bitfield(cu, inner, bit_size, from);
    if recoded_inner == inner {
        return id;
    }
    let kind = match q {
        Qualifier::Const => TypeKind::Const,
        Qualifier::Volatile => TypeKind::Volatile,
        Qualifier::Typedef(name) => TypeKind::Typedef(NamespaceLike::new(name)),
    };
    let header = Header {
        top_level: true,
        type_ref: TypeRef::Resolved(recoded_inner),
        side: None,
    };
    cu.push_type_no_hash(TypeEntry { header, kind })
}

fn find_or_make_base(
    cu: &mut Cu,
    name: StringId,
    boolean: bool,
    signed: bool,
    varargs: bool,
    bit_size: u64,
) -> TypeId {
    for (i, entry) in cu.types_table.iter().enumerate() {
        if let TypeKind::BaseType(b) = &entry.kind {
            if b.name == name && b.bit_size == bit_size {
                return TypeId(i as u32);
            }
        }
    }
    let header = Header {
        top_level: true,
        type_ref: TypeRef::void(),
        side: None,
    };
    let kind = TypeKind::BaseType(BaseType {
        name,
        bit_size,
        boolean,
        signed,
        varargs,
    });
    cu.push_type_no_hash(TypeEntry { header, kind })
}

fn find_or_make_enum(cu: &mut Cu, original: TypeId, name: StringId, bit_size: u64) -> TypeId {
    for (i, entry) in cu.types_table.iter().enumerate() {
        if let TypeKind::EnumerationType(e) = &entry.kind {
            if e.name == name && e.size_bits == bit_size {
                return TypeId(i as u32);
            }
        }
    }
    let enumerators = match &cu.types_table[original.index()].kind {
        TypeKind::EnumerationType(e) => Rc::clone(&e.enumerators),
        _ => Rc::new(Vec::new()),
    };
    let header = Header {
        top_level: true,
        type_ref: TypeRef::void(),
        side: None,
    };
    let kind = TypeKind::EnumerationType(EnumerationType {
        name,
        size_bits: bit_size,
        enumerators,
        shared_tags: true,
    });
    cu.push_type_no_hash(TypeEntry { header, kind })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Header as H;

    fn push_base(cu: &mut Cu, name: StringId, bit_size: u64) -> TypeId {
        let header = H {
            top_level: true,
            type_ref: TypeRef::void(),
            side: None,
        };
        cu.push_type_no_hash(TypeEntry {
            header,
            kind: TypeKind::BaseType(BaseType {
                name,
                bit_size,
                boolean: false,
                signed: true,
                varargs: false,
            }),
        })
    }

    #[test]
    fn first_bitfield_creates_new_base() {
        let mut cu = Cu::new(StringId::EMPTY, 8, "a.out".to_string());
        let mut strings = crate::strings::Strings::new();
        let int_name = strings.add_str("int");
        let int32 = push_base(&mut cu, int_name, 32);
        let synthetic = recode_bitfield(&mut cu, int32, 3, 0);
        assert_ne!(synthetic, int32);
        assert!(matches!(
            &cu.types_table[synthetic.index()].kind,
            TypeKind::BaseType(b) if b.bit_size == 3
        ));
    }

    #[test]
    fn second_identical_bitfield_reuses_synthetic() {
        let mut cu = Cu::new(StringId::EMPTY, 8, "a.out".to_string());
        let mut strings = crate::strings::Strings::new();
        let int_name = strings.add_str("int");
        let int32 = push_base(&mut cu, int_name, 32);
        let first = recode_bitfield(&mut cu, int32, 3, 0);
        let second = recode_bitfield(&mut cu, int32, 3, 0);
        assert_eq!(first, second);
    }

    #[test]
    fn different_bit_sizes_create_distinct_synthetics() {
        let mut cu = Cu::new(StringId::EMPTY, 8, "a.out".to_string());
        let mut strings = crate::strings::Strings::new();
        let int_name = strings.add_str("int");
        let int32 = push_base(&mut cu, int_name, 32);
        let a = recode_bitfield(&mut cu, int32, 3, 0);
        let b = recode_bitfield(&mut cu, int32, 5, 0);
        assert_ne!(a, b);
    }

    #[test]
    fn typedef_over_bitfield_creates_fresh_typedef_and_keeps_original() {
        let mut cu = Cu::new(StringId::EMPTY, 8, "a.out".to_string());
        let mut strings = crate::strings::Strings::new();
        let unsigned_name = strings.add_str("unsigned");
        let base = push_base(&mut cu, unsigned_name, 32);
        let typedef_name = strings.add_str("U");
        let typedef_header = H {
            top_level: true,
            type_ref: TypeRef::Resolved(base),
            side: None,
        };
        let typedef_id = cu.push_type_no_hash(TypeEntry {
            header: typedef_header,
            kind: TypeKind::Typedef(NamespaceLike::new(typedef_name)),
        });
        let recoded = recode_bitfield(&mut cu, typedef_id, 7, 0);
        assert_ne!(recoded, typedef_id);
        assert!(matches!(cu.types_table[typedef_id.index()].kind, TypeKind::Typedef(_)));
        assert!(matches!(cu.types_table[recoded.index()].kind, TypeKind::Typedef(_)));
    }
}
