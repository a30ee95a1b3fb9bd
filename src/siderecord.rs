//! The dwarf side-record: parse-time scratch attached to every allocated
//! node, carrying raw DIE offsets forward until [`crate::recode`] rewrites
//! them into dense ids. All side-records for a CU live in one arena
//! (`crate::cu::Cu`'s private `Vec`) and are freed en bloc when the scratch
//! is no longer needed — there is no node-level free.

use crate::ids::{DieOffset, SmallId};
use crate::strings::StringId;

/// A node's `abstract_origin` or `containing_type`, tagged by which kind of
/// node it came from — the two never coexist on one node (§3, §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    None,
    AbstractOrigin(DieOffset),
    ContainingType(DieOffset),
}

impl Origin {
    /// The raw offset, regardless of which variant it is. `None` has no
    /// offset to give.
    pub fn raw_offset(self) -> Option<DieOffset> {
        match self {
            Origin::None => None,
            Origin::AbstractOrigin(o) | Origin::ContainingType(o) => Some(o),
        }
    }
}

/// Parse-time scratch for one allocated node, indexed by [`crate::model::SideId`].
#[derive(Debug, Clone)]
pub struct SideRecord {
    /// The originating DIE's byte offset (its identity for the tag/type
    /// hashes).
    pub die_offset: DieOffset,
    /// Raw `DW_AT_type`/`DW_AT_import` offset; `0` means void/absent.
    pub type_raw: DieOffset,
    pub origin: Origin,
    /// `DW_AT_specification`, appended in-place only for kinds that use it
    /// (namespace-like types, subprograms).
    pub specification: Option<DieOffset>,
    pub decl_file: StringId,
    pub decl_line: u64,
    /// The dense id assigned at reservation time (`crate::cu::Cu::reserve_*`).
    /// Always `Some` once the owning node exists; recode reads it back off
    /// `Header::side` rather than storing it twice.
    pub small_id: Option<SmallId>,
}

impl SideRecord {
    pub fn new(die_offset: DieOffset, type_raw: DieOffset) -> Self {
        SideRecord {
            die_offset,
            type_raw,
            origin: Origin::None,
            specification: None,
            decl_file: StringId::EMPTY,
            decl_line: 0,
            small_id: None,
        }
    }

    /// The side-record backing `types_table[0]`, the reserved void entry.
    pub fn void() -> Self {
        SideRecord::new(0, 0)
    }
}
