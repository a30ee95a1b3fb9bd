//! Whole-pipeline (parse -> recode -> size-cache) scenarios, mirroring §8's
//! "end-to-end scenarios" list. Each test builds a small DIE tree with
//! [`dwarfgraph::testutil::MockDie`], runs the three CU-wide passes exactly
//! as `loader::load_file` sequences them, then inspects the resulting CU.

use dwarfgraph::config::Config;
use dwarfgraph::constants::{DwAt, DwTag};
use dwarfgraph::cu::Cu;
use dwarfgraph::ids::TypeId;
use dwarfgraph::model::{NonTypeKind, TypeKind, VLocation};
use dwarfgraph::provider::Attr;
use dwarfgraph::strings::{StringId, Strings};
use dwarfgraph::testutil::MockDie;
use dwarfgraph::{parse, recode, sizecache};

fn run_pipeline(root: &MockDie, strings: &mut Strings) -> Cu {
    let mut cu = Cu::new(StringId::EMPTY, 8, "a.out".to_string());
    parse::process_unit(root, &mut cu, strings);
    recode::recode_cu(&mut cu);
    sizecache::cache_member_sizes(&mut cu, strings, &Config::default());
    cu
}

fn le_addr(addr: u64) -> Vec<u8> {
    let mut bytes = vec![0x03]; // DW_OP_addr
    bytes.extend_from_slice(&addr.to_le_bytes());
    bytes
}

/// Scenario 1: `struct S { int a : 3; int b : 5; }`.
#[test]
fn bitfield_struct_synthesizes_deduplicated_base_types() {
    let mut strings = Strings::new();
    let int_name = strings.add_str("int");

    let int_ty = MockDie::new(0x10, DwTag::BaseType as u64)
        .with_attr(DwAt::Name, Attr::String(b"int".to_vec()))
        .with_attr(DwAt::ByteSize, Attr::Udata(4))
        .with_attr(DwAt::Encoding, Attr::Udata(5)); // DW_ATE_signed

    let member_a = MockDie::new(0x21, DwTag::Member as u64)
        .with_attr(DwAt::Name, Attr::String(b"a".to_vec()))
        .with_attr(DwAt::Type, Attr::Reference(0x10))
        .with_attr(DwAt::DataMemberLocation, Attr::Udata(0))
        .with_attr(DwAt::BitSize, Attr::Udata(3));
    let member_b = MockDie::new(0x22, DwTag::Member as u64)
        .with_attr(DwAt::Name, Attr::String(b"b".to_vec()))
        .with_attr(DwAt::Type, Attr::Reference(0x10))
        .with_attr(DwAt::DataMemberLocation, Attr::Udata(0))
        .with_attr(DwAt::BitSize, Attr::Udata(5));

    let s = MockDie::new(0x20, DwTag::StructureType as u64)
        .with_attr(DwAt::Name, Attr::String(b"S".to_vec()))
        .with_attr(DwAt::ByteSize, Attr::Udata(4))
        .with_child(member_a)
        .with_child(member_b);

    let root = MockDie::new(0x0, DwTag::CompileUnit as u64)
        .with_child(int_ty)
        .with_child(s);

    let cu = run_pipeline(&root, &mut strings);

    let members: Vec<_> = cu
        .tags_table
        .iter()
        .filter_map(|e| match &e.kind {
            NonTypeKind::ClassMember(m) => Some((e.header.type_ref.resolved(), m.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(members.len(), 2);
    for (_, m) in &members {
        assert_eq!(m.byte_size, 4);
    }
    assert_eq!(members[0].1.bit_size, 3);
    assert_eq!(members[1].1.bit_size, 5);

    // Exactly one synthetic (name="int", bit_size=3) base type in types_table.
    let three_bit_ints = cu
        .types_table
        .iter()
        .filter(|e| matches!(&e.kind, TypeKind::BaseType(b) if b.name == int_name && b.bit_size == 3))
        .count();
    assert_eq!(three_bit_ints, 1);

    // The two members' resolved types are themselves distinct synthetics
    // (different bit widths), neither equal to the original int32 type.
    assert_ne!(members[0].0, members[1].0);
}

/// Scenario 2: `typedef unsigned U; struct T { U x : 7; };`.
#[test]
fn typedef_bitfield_creates_fresh_typedef_and_preserves_original() {
    let mut strings = Strings::new();

    let unsigned_ty = MockDie::new(0x10, DwTag::BaseType as u64)
        .with_attr(DwAt::Name, Attr::String(b"unsigned".to_vec()))
        .with_attr(DwAt::ByteSize, Attr::Udata(4))
        .with_attr(DwAt::Encoding, Attr::Udata(7)); // DW_ATE_unsigned

    let typedef_u = MockDie::new(0x15, DwTag::Typedef as u64)
        .with_attr(DwAt::Name, Attr::String(b"U".to_vec()))
        .with_attr(DwAt::Type, Attr::Reference(0x10));

    let member_x = MockDie::new(0x21, DwTag::Member as u64)
        .with_attr(DwAt::Name, Attr::String(b"x".to_vec()))
        .with_attr(DwAt::Type, Attr::Reference(0x15))
        .with_attr(DwAt::DataMemberLocation, Attr::Udata(0))
        .with_attr(DwAt::BitSize, Attr::Udata(7));

    let t = MockDie::new(0x20, DwTag::StructureType as u64)
        .with_attr(DwAt::Name, Attr::String(b"T".to_vec()))
        .with_attr(DwAt::ByteSize, Attr::Udata(4))
        .with_child(member_x);

    let root = MockDie::new(0x0, DwTag::CompileUnit as u64)
        .with_child(unsigned_ty)
        .with_child(typedef_u)
        .with_child(t);

    let cu = run_pipeline(&root, &mut strings);

    // The original typedef, at its own small id, still wraps the original
    // (non-bitfield) unsigned base type.
    let original_typedef_id = TypeId(2); // void=0, unsigned=1, typedef=2
    match &cu.types_table[original_typedef_id.index()].kind {
        TypeKind::Typedef(_) => {}
        other => panic!("expected typedef at id 2, got {other:?}"),
    }
    let original_inner = cu.types_table[original_typedef_id.index()].header.type_ref.resolved();
    assert!(matches!(
        &cu.types_table[original_inner.index()].kind,
        TypeKind::BaseType(b) if b.bit_size == 32
    ));

    // member x's type is a *different*, freshly synthesized typedef.
    let member = cu
        .tags_table
        .iter()
        .find_map(|e| match &e.kind {
            NonTypeKind::ClassMember(m) if m.name == strings.add_str("x") => {
                Some((e.header.type_ref.resolved(), m.clone()))
            }
            _ => None,
        })
        .expect("member x");
    assert_ne!(member.0, original_typedef_id);
    assert!(matches!(&cu.types_table[member.0.index()].kind, TypeKind::Typedef(_)));
    let synth_inner = cu.types_table[member.0.index()].header.type_ref.resolved();
    assert!(matches!(
        &cu.types_table[synth_inner.index()].kind,
        TypeKind::BaseType(b) if b.bit_size == 7
    ));
    assert_eq!(member.1.byte_size, 4);
    assert_eq!(member.1.bit_size, 7);
}

/// Scenario 3: a function defined with `DW_AT_specification` pointing at a
/// namespaced method declaration; after recode the function's name is
/// borrowed from the declaration.
#[test]
fn specification_resolves_function_name() {
    let mut strings = Strings::new();

    let method_decl = MockDie::new(0x30, DwTag::Subprogram as u64)
        .with_attr(DwAt::Name, Attr::String(b"method".to_vec()))
        .with_attr(DwAt::Declaration, Attr::Flag(true));

    let class_c = MockDie::new(0x28, DwTag::ClassType as u64)
        .with_attr(DwAt::Name, Attr::String(b"C".to_vec()))
        .with_child(method_decl);

    let f = MockDie::new(0x40, DwTag::Subprogram as u64)
        .with_attr(DwAt::Specification, Attr::Reference(0x30))
        .with_low_pc(0x1000)
        .with_high_pc(0x1010);

    let root = MockDie::new(0x0, DwTag::CompileUnit as u64)
        .with_child(class_c)
        .with_child(f);

    let cu = run_pipeline(&root, &mut strings);

    let method_name = strings.add_str("method");
    let f_entry = cu
        .functions_table
        .iter()
        .find(|e| cu.die_offset_of(e.header.side) == 0x40)
        .expect("f");
    assert_eq!(f_entry.function.name, method_name);
}

/// Scenario 4: an inlined subroutine with non-contiguous ranges sums to the
/// total size, and its address is the first range's low bound.
#[test]
fn inline_expansion_sums_noncontiguous_ranges() {
    let mut strings = Strings::new();

    let inlined = MockDie::new(0x10, DwTag::InlinedSubroutine as u64)
        .with_ranges(vec![(0x100, 0x120), (0x200, 0x210)]);

    let root = MockDie::new(0x0, DwTag::CompileUnit as u64).with_child(inlined);

    let cu = run_pipeline(&root, &mut strings);

    let expansion = cu
        .tags_table
        .iter()
        .find_map(|e| match &e.kind {
            NonTypeKind::InlineExpansion(ie) => Some(ie.clone()),
            _ => None,
        })
        .expect("inline expansion");
    assert_eq!(expansion.size, 0x30);
    assert_eq!(expansion.address, 0x100);
}

/// Scenario 5: a pointer-to-member DIE whose `containing_type` forward
/// references a class declared later in the same CU.
#[test]
fn ptr_to_member_resolves_forward_declared_containing_class() {
    let mut strings = Strings::new();

    let ptr_to_member = MockDie::new(0x10, DwTag::PtrToMemberType as u64)
        .with_attr(DwAt::ContainingType, Attr::Reference(0x50));

    let class_c = MockDie::new(0x50, DwTag::ClassType as u64)
        .with_attr(DwAt::Name, Attr::String(b"C".to_vec()));

    let root = MockDie::new(0x0, DwTag::CompileUnit as u64)
        .with_child(ptr_to_member)
        .with_child(class_c);

    let cu = run_pipeline(&root, &mut strings);

    let ptr_id = TypeId(1); // void=0, ptr_to_member is the first parsed type
    let class_id = TypeId(2);
    match &cu.types_table[ptr_id.index()].kind {
        TypeKind::PointerToMember(p) => assert_eq!(p.containing_type.resolved(), class_id),
        other => panic!("expected ptr-to-member, got {other:?}"),
    }
    assert!(matches!(&cu.types_table[class_id.index()].kind, TypeKind::Class(_)));
}

/// Scenario 6: a variable's location classifies as OPTIMIZED when absent,
/// and as GLOBAL with the decoded address when `DW_OP_addr` is present.
#[test]
fn variable_location_classification() {
    let mut strings = Strings::new();

    let no_location = MockDie::new(0x10, DwTag::Variable as u64)
        .with_attr(DwAt::Name, Attr::String(b"opt".to_vec()));
    let global = MockDie::new(0x11, DwTag::Variable as u64)
        .with_attr(DwAt::Name, Attr::String(b"glob".to_vec()))
        .with_attr(DwAt::Location, Attr::Block(le_addr(0x601040)));

    let root = MockDie::new(0x0, DwTag::CompileUnit as u64)
        .with_child(no_location)
        .with_child(global);

    let cu = run_pipeline(&root, &mut strings);

    let opt_name = strings.add_str("opt");
    let glob_name = strings.add_str("glob");

    let opt_var = cu
        .tags_table
        .iter()
        .find_map(|e| match &e.kind {
            NonTypeKind::Variable(v) if v.name == opt_name => Some(v.clone()),
            _ => None,
        })
        .expect("opt variable");
    assert_eq!(opt_var.location, VLocation::Optimized);
    assert_eq!(opt_var.address, None);

    let glob_var = cu
        .tags_table
        .iter()
        .find_map(|e| match &e.kind {
            NonTypeKind::Variable(v) if v.name == glob_name => Some(v.clone()),
            _ => None,
        })
        .expect("glob variable");
    assert_eq!(glob_var.location, VLocation::Global);
    assert_eq!(glob_var.address, Some(0x601040));
}
