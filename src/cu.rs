//! Per-compilation-unit tables and hash indices (§2, §3, §5).
//!
//! A [`Cu`] owns three dense, appendable tables (`types_table`, `tags_table`,
//! `functions_table` — the "arena" the rest of the crate refers to) plus two
//! hash indices keyed by raw DWARF offset, used only during
//! [`crate::recode`] to turn a forward reference into a dense id. Index `0`
//! of `types_table` is always `void`.

use std::collections::HashMap;

use crate::diagnostics::RateLimiter;
use crate::ids::{DieOffset, FunctionId, SmallId, TagId, TypeId};
use crate::model::{
    BaseType, FunctionEntry, Header, NonTypeEntry, SideId, TypeEntry, TypeKind,
};
use crate::siderecord::SideRecord;
use crate::strings::StringId;

pub struct Cu {
    pub name: StringId,
    pub comp_dir: StringId,
    pub producer: StringId,
    pub address_size: u8,
    pub build_id: Option<Vec<u8>>,
    pub filename: String,

    pub types_table: Vec<TypeEntry>,
    pub tags_table: Vec<NonTypeEntry>,
    pub functions_table: Vec<FunctionEntry>,

    hash_types: HashMap<DieOffset, TypeId>,
    hash_tags: HashMap<DieOffset, SmallId>,

    side_records: Vec<SideRecord>,

    /// Gates repeated `UNSUPPORTED_TAG` warnings within this CU (§4.3, §7).
    pub diagnostics: RateLimiter,

    /// Most recently interned `DW_AT_decl_file` string, to avoid re-interning
    /// the same filename for every DIE on one line-table file (§4.1).
    pub(crate) last_decl_file: Option<(Vec<u8>, StringId)>,

    scratch_freed: bool,
}

impl Cu {
    /// A fresh CU with the void entry already installed at `types_table[0]`.
    pub fn new(name: StringId, address_size: u8, filename: String) -> Self {
        let mut cu = Cu {
            name,
            comp_dir: StringId::EMPTY,
            producer: StringId::EMPTY,
            address_size,
            build_id: None,
            filename,
            types_table: Vec::new(),
            tags_table: Vec::new(),
            functions_table: Vec::new(),
            hash_types: HashMap::new(),
            hash_tags: HashMap::new(),
            side_records: Vec::new(),
            diagnostics: RateLimiter::new(),
            last_decl_file: None,
            scratch_freed: false,
        };
        let void_side = cu.alloc_side_record(SideRecord::void());
        cu.types_table.push(TypeEntry {
            header: Header::new(true, void_side),
            kind: TypeKind::BaseType(BaseType {
                name: StringId::EMPTY,
                bit_size: 0,
                boolean: false,
                signed: false,
                varargs: false,
            }),
        });
        cu
    }

    pub fn alloc_side_record(&mut self, record: SideRecord) -> SideId {
        let id = SideId(self.side_records.len() as u32);
        self.side_records.push(record);
        id
    }

    pub fn side(&self, id: SideId) -> &SideRecord {
        &self.side_records[id.0 as usize]
    }

    pub fn side_mut(&mut self, id: SideId) -> &mut SideRecord {
        &mut self.side_records[id.0 as usize]
    }

    /// Byte offset of the DIE a given header's side-record came from, or `0`
    /// if the scratch has already been freed.
    pub fn die_offset_of(&self, side: Option<SideId>) -> DieOffset {
        side.map(|s| self.side(s).die_offset).unwrap_or(0)
    }

    /// Reserve a `types_table` slot (pushing a placeholder so the id is
    /// stable), register it in the type hash, and record the id back onto
    /// the side-record. The real payload is installed later via
    /// [`Cu::finalize_type`].
    pub fn reserve_type(&mut self, die_offset: DieOffset, side: SideId) -> TypeId {
        let id = TypeId(self.types_table.len() as u32);
        self.types_table.push(TypeEntry::placeholder());
        self.hash_types.insert(die_offset, id);
        self.side_mut(side).small_id = Some(SmallId::Type(id));
        id
    }

    pub fn finalize_type(&mut self, id: TypeId, entry: TypeEntry) {
        self.types_table[id.index()] = entry;
    }

    /// Append a type with no hash registration. Used only by
    /// [`crate::bitfield`]'s synthetic base/enum/qualifier nodes, which
    /// dedup through a linear scan of `types_table` rather than the per-CU
    /// hash (invariant 5, §5).
    pub fn push_type_no_hash(&mut self, entry: TypeEntry) -> TypeId {
        let id = TypeId(self.types_table.len() as u32);
        self.types_table.push(entry);
        id
    }

    pub fn reserve_tag(&mut self, die_offset: DieOffset, side: SideId) -> TagId {
        let id = TagId(self.tags_table.len() as u32);
        self.tags_table.push(NonTypeEntry::placeholder());
        self.hash_tags.insert(die_offset, SmallId::Tag(id));
        self.side_mut(side).small_id = Some(SmallId::Tag(id));
        id
    }

    pub fn finalize_tag(&mut self, id: TagId, entry: NonTypeEntry) {
        self.tags_table[id.index()] = entry;
    }

    pub fn reserve_function(&mut self, die_offset: DieOffset, side: SideId) -> FunctionId {
        let id = FunctionId(self.functions_table.len() as u32);
        self.functions_table.push(FunctionEntry::placeholder());
        self.hash_tags.insert(die_offset, SmallId::Function(id));
        self.side_mut(side).small_id = Some(SmallId::Function(id));
        id
    }

    pub fn finalize_function(&mut self, id: FunctionId, entry: FunctionEntry) {
        self.functions_table[id.index()] = entry;
    }

    /// Resolve a raw `DW_AT_type`-style offset through the type hash. `0`
    /// always means void, resolved without a hash lookup.
    pub fn find_type(&self, offset: DieOffset) -> Option<TypeId> {
        if offset == 0 {
            return Some(TypeId::VOID);
        }
        self.hash_types.get(&offset).copied()
    }

    /// Resolve a raw offset through the tag hash (functions live here too —
    /// §4.4, §9's "abstract origin vs specification" note).
    pub fn find_tag_or_function(&self, offset: DieOffset) -> Option<SmallId> {
        self.hash_tags.get(&offset).copied()
    }

    /// True once the scratch arena has been dropped (post-`steal()` without
    /// `extra_dbg_info`).
    pub fn scratch_freed(&self) -> bool {
        self.scratch_freed
    }

    /// Drop the dwarf-scratch arena in one step (§5, §7). Called by the file
    /// driver after `steal()` returns, unless `conf.extra_dbg_info` is set.
    pub fn free_scratch(&mut self) {
        self.side_records.clear();
        self.side_records.shrink_to_fit();
        for entry in &mut self.types_table {
            entry.header.side = None;
        }
        for entry in &mut self.tags_table {
            entry.header.side = None;
        }
        for entry in &mut self.functions_table {
            entry.header.side = None;
        }
        self.scratch_freed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn void_is_index_zero() {
        let cu = Cu::new(StringId::EMPTY, 8, "a.out".to_string());
        assert_eq!(cu.types_table.len(), 1);
        assert!(matches!(cu.types_table[0].kind, TypeKind::BaseType(_)));
        assert_eq!(cu.find_type(0), Some(TypeId::VOID));
    }

    #[test]
    fn reserve_then_finalize_preserves_id() {
        let mut cu = Cu::new(StringId::EMPTY, 8, "a.out".to_string());
        let side = cu.alloc_side_record(SideRecord::new(0x10, 0));
        let id = cu.reserve_type(0x10, side);
        assert_eq!(id, TypeId(1));
        assert_eq!(cu.find_type(0x10), Some(id));
        cu.finalize_type(
            id,
            TypeEntry {
                header: Header::new(true, side),
                kind: TypeKind::BaseType(BaseType {
                    name: StringId::EMPTY,
                    bit_size: 32,
                    boolean: false,
                    signed: true,
                    varargs: false,
                }),
            },
        );
        assert!(matches!(cu.types_table[1].kind, TypeKind::BaseType(ref b) if b.bit_size == 32));
    }

    #[test]
    fn free_scratch_clears_side_records_but_keeps_tables() {
        let mut cu = Cu::new(StringId::EMPTY, 8, "a.out".to_string());
        let side = cu.alloc_side_record(SideRecord::new(0x10, 0));
        let id = cu.reserve_type(0x10, side);
        cu.finalize_type(
            id,
            TypeEntry {
                header: Header::new(true, side),
                kind: TypeKind::Pointer,
            },
        );
        cu.free_scratch();
        assert_eq!(cu.types_table.len(), 2);
        assert!(cu.types_table[1].header.side.is_none());
    }
}
