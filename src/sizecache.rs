//! The size cacher (§4.6): third CU-wide pass, filling in
//! `ClassMember::byte_size`/`bit_size` from each member's resolved type
//! chain. Runs strictly after [`crate::recode`] — every `header.type_ref`
//! it touches is assumed already [`crate::model::TypeRef::Resolved`].

use crate::config::Config;
use crate::cu::Cu;
use crate::ids::{TagId, TypeId};
use crate::model::{NonTypeKind, TypeKind};
use crate::strings::{StringId, Strings};

/// Canonical storage-unit bit width for a handful of well-known integral
/// base-type names, per §4.6 ("the canonical storage-unit size for that
/// base-type name, e.g. `int`→32, `long long`→64"). Anything else is an
/// unknown base-type name and returns 0, the documented boundary behavior.
fn integral_bit_size(name: &str) -> u64 {
    match name {
        "_Bool" | "bool" | "char" | "signed char" | "unsigned char" => 8,
        "short" | "short int" | "unsigned short" | "short unsigned int" => 16,
        "int" | "unsigned int" | "unsigned" => 32,
        "long" | "long int" | "unsigned long" | "long unsigned int" => 64,
        "long long" | "long long int" | "unsigned long long" | "long long unsigned int" => 64,
        _ => 0,
    }
}

/// Byte size of a resolved type, recursing through qualifiers/typedefs.
fn type_byte_size(cu: &Cu, id: TypeId, address_size: u8) -> u64 {
    match &cu.types_table[id.index()].kind {
        TypeKind::Pointer | TypeKind::ReferenceType | TypeKind::PointerToMember(_) => u64::from(address_size),
        TypeKind::Const | TypeKind::Volatile | TypeKind::Typedef(_) => {
            let inner = cu.types_table[id.index()].header.type_ref.resolved();
            type_byte_size(cu, inner, address_size)
        }
        TypeKind::BaseType(b) => b.bit_size / 8,
        TypeKind::EnumerationType(e) => e.size_bits / 8,
        TypeKind::ArrayType(a) => {
            if a.dimensions.is_empty() {
                0
            } else {
                let elem = cu.types_table[id.index()].header.type_ref.resolved();
                let elem_size = type_byte_size(cu, elem, address_size);
                elem_size * a.dimensions.iter().product::<u64>()
            }
        }
        TypeKind::Class(ns) | TypeKind::Struct(ns) | TypeKind::Union(ns) | TypeKind::Namespace(ns) => ns.size,
        TypeKind::FunctionType(_) => 0,
    }
}

/// Unwrap typedefs/qualifiers down to the first base type or enumeration,
/// returning its name and bit size (§4.6's "follow typedefs and drop
/// qualifiers to reach a base type or enum").
fn resolve_to_base_or_enum(cu: &Cu, id: TypeId) -> Option<(StringId, u64)> {
    match &cu.types_table[id.index()].kind {
        TypeKind::BaseType(b) => Some((b.name, b.bit_size)),
        TypeKind::EnumerationType(e) => Some((e.name, e.size_bits)),
        TypeKind::Typedef(_) | TypeKind::Const | TypeKind::Volatile => {
            let inner = cu.types_table[id.index()].header.type_ref.resolved();
            resolve_to_base_or_enum(cu, inner)
        }
        _ => None,
    }
}

/// Run the size cache over every `member`/`inheritance` tag in `cu`.
pub fn cache_member_sizes(cu: &mut Cu, strings: &Strings, conf: &Config) {
    let len = cu.tags_table.len();
    let address_size = cu.address_size;
    for i in 0..len {
        cache_one_member(cu, TagId(i as u32), address_size, strings, conf);
    }
}

fn cache_one_member(cu: &mut Cu, id: TagId, address_size: u8, strings: &Strings, conf: &Config) {
    let member_type = match &cu.tags_table[id.index()].kind {
        NonTypeKind::ClassMember(_) => cu.tags_table[id.index()].header.type_ref.resolved(),
        _ => return,
    };
    let bitfield_size = match &cu.tags_table[id.index()].kind {
        NonTypeKind::ClassMember(m) => m.bitfield_size,
        _ => return,
    };

    if bitfield_size == 0 {
        let byte_size = type_byte_size(cu, member_type, address_size);
        if let NonTypeKind::ClassMember(m) = &mut cu.tags_table[id.index()].kind {
            m.byte_size = byte_size;
            m.bit_size = byte_size * 8;
        }
        return;
    }

    let Some((name, type_bit_size)) = resolve_to_base_or_enum(cu, member_type) else {
        cu.diagnostics
            .note("bitfield member's type chain never reaches a base type or enum; leaving size at zero");
        return;
    };
    let integral = integral_bit_size(&strings.str(name));
    if integral == 0 {
        cu.diagnostics
            .note("bitfield member has an unrecognized base-type name; leaving size at zero");
        return;
    }
    if let NonTypeKind::ClassMember(m) = &mut cu.tags_table[id.index()].kind {
        m.byte_size = integral / 8;
        m.bit_size = type_bit_size;
        if type_bit_size == integral && conf.fixup_silly_bitfields {
            m.bitfield_size = 0;
            m.bitfield_offset = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::TypeId;
    use crate::model::{BaseType, ClassMember, Header, NonTypeEntry, TypeEntry};
    use crate::siderecord::SideRecord;

    fn push_base(cu: &mut Cu, name: StringId, bit_size: u64) -> TypeId {
        let header = Header {
            top_level: true,
            type_ref: crate::model::TypeRef::void(),
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

    fn push_member(cu: &mut Cu, type_id: TypeId, bitfield_size: u64, bitfield_offset: u64) -> TagId {
        let side = cu.alloc_side_record(SideRecord::new(0x50, 0));
        let id = cu.reserve_tag(0x50, side);
        let mut header = Header::new(false, side);
        header.type_ref = crate::model::TypeRef::Resolved(type_id);
        let mut member = ClassMember::new(StringId::EMPTY);
        member.bitfield_size = bitfield_size;
        member.bitfield_offset = bitfield_offset;
        cu.finalize_tag(
            id,
            NonTypeEntry {
                header,
                kind: NonTypeKind::ClassMember(member),
            },
        );
        id
    }

    #[test]
    fn non_bitfield_member_sizes_from_its_type() {
        let mut cu = Cu::new(StringId::EMPTY, 8, "a.out".to_string());
        let strings = Strings::new();
        let int32 = push_base(&mut cu, StringId::EMPTY, 32);
        let member = push_member(&mut cu, int32, 0, 0);
        cache_member_sizes(&mut cu, &strings, &Config::default());
        match &cu.tags_table[member.index()].kind {
            NonTypeKind::ClassMember(m) => {
                assert_eq!(m.byte_size, 4);
                assert_eq!(m.bit_size, 32);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn bitfield_member_uses_integral_storage_size() {
        let mut cu = Cu::new(StringId::EMPTY, 8, "a.out".to_string());
        let mut strings = Strings::new();
        let int_name = strings.add_str("int");
        let int32 = push_base(&mut cu, int_name, 32);
        let member = push_member(&mut cu, int32, 3, 0);
        cache_member_sizes(&mut cu, &strings, &Config::default());
        match &cu.tags_table[member.index()].kind {
            NonTypeKind::ClassMember(m) => {
                assert_eq!(m.byte_size, 4);
                assert_eq!(m.bit_size, 3);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn unknown_base_type_name_leaves_sizes_at_zero() {
        let mut cu = Cu::new(StringId::EMPTY, 8, "a.out".to_string());
        let mut strings = Strings::new();
        let weird_name = strings.add_str("__int_weird128");
        let weird = push_base(&mut cu, weird_name, 128);
        let member = push_member(&mut cu, weird, 10, 0);
        cache_member_sizes(&mut cu, &strings, &Config::default());
        match &cu.tags_table[member.index()].kind {
            NonTypeKind::ClassMember(m) => {
                assert_eq!(m.byte_size, 0);
                assert_eq!(m.bit_size, 0);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn fixup_silly_bitfields_zeroes_full_width_bitfield() {
        let mut cu = Cu::new(StringId::EMPTY, 8, "a.out".to_string());
        let mut strings = Strings::new();
        let int_name = strings.add_str("int");
        let int32 = push_base(&mut cu, int_name, 32);
        let member = push_member(&mut cu, int32, 32, 0);
        cache_member_sizes(&mut cu, &strings, &Config::default());
        match &cu.tags_table[member.index()].kind {
            NonTypeKind::ClassMember(m) => {
                assert_eq!(m.bitfield_size, 0);
                assert_eq!(m.bitfield_offset, 0);
            }
            _ => unreachable!(),
        }
    }
}
