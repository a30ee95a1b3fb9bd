//! The external "DWARF provider" interface: everything in this module is a
//! trait describing what the loader consumes from ELF/DWARF byte-level
//! parsing, never how that parsing happens — that stays out of scope for
//! this crate. A second, concrete implementation over the real `object`
//! and `gimli` crates lives in [`crate::provider::gimli_backend`]; a third,
//! hand-rolled one used only by this crate's own tests lives in
//! [`crate::testutil`].

pub mod gimli_backend;

use crate::constants::DwAt;

/// A decoded DWARF attribute value, after the provider has performed
/// `DW_FORM_*` dispatch.
///
/// This is the seam between "opaque byte-level DWARF parsing" and this
/// crate's own attribute reader (`crate::attr`): the provider hands back one
/// of these per `attr()` call, and `crate::attr` does the higher-level
/// interpretation (is this a location expression? an offset expression? a
/// plain number?).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attr {
    /// `DW_FORM_addr`: a target-address-sized value.
    Address(u64),
    /// `DW_FORM_data1/2/4/8` or `DW_FORM_udata`: an unsigned integer.
    Udata(u64),
    /// `DW_FORM_sdata`: a signed LEB128 integer.
    Sdata(i64),
    /// `DW_FORM_flag` / `DW_FORM_flag_present`: presence/boolean attributes.
    Flag(bool),
    /// `DW_FORM_string` / `DW_FORM_strp`: a byte string (typically a name).
    String(Vec<u8>),
    /// Any `DW_FORM_ref*`: a reference to another DIE, already resolved by
    /// the provider to that DIE's absolute byte offset (this crate's
    /// `DieOffset`).
    Reference(u64),
    /// `DW_FORM_block*` / `DW_FORM_exprloc`: a length-prefixed byte string,
    /// used for location and (occasionally) constant-offset expressions.
    Block(Vec<u8>),
    /// `DW_FORM_sec_offset`: an offset into another section (line program,
    /// range list, etc). Carried through as a plain integer.
    SecOffset(u64),
    /// Any decoded-but-otherwise-unhandled form. `crate::attr` treats this
    /// the same as any other unreadable attribute: return a zero value and
    /// log a diagnostic.
    Other,
}

/// A single DIE, as exposed to the parse driver.
///
/// Implementations are expected to be cheap to clone (an offset + a
/// borrowed/refcounted handle into the section data), since the parse driver
/// clones DIEs freely while walking sibling/child lists.
pub trait Die: Clone {
    /// The raw numeric `DW_TAG_*` code. Use [`crate::constants::DwTag::from_raw`]
    /// to classify it.
    fn tag_raw(&self) -> u64;

    /// This DIE's byte offset, used as its identity for the tag/type hashes.
    fn offset(&self) -> u64;

    /// Whether the abbreviation declares this DIE as having children
    /// (`DW_CHILDREN_yes`).
    fn has_children(&self) -> bool;

    /// Fetch and form-decode a single attribute, or `None` if this DIE does
    /// not carry `at`.
    fn attr(&self, at: DwAt) -> Option<Attr>;

    /// `DW_AT_low_pc`, if present, already resolved to an absolute address.
    fn low_pc(&self) -> Option<u64>;

    /// `DW_AT_high_pc`, if present, already resolved to an absolute address
    /// (providers normalize the "offset from low_pc" encoding some DWARF
    /// versions use).
    fn high_pc(&self) -> Option<u64>;

    /// Non-contiguous address ranges from `DW_AT_ranges`, as
    /// `(low, high)` pairs. Empty when the DIE has no `DW_AT_ranges`
    /// attribute (callers fall back to `low_pc`/`high_pc`).
    fn ranges(&self) -> Vec<(u64, u64)>;

    /// The source file name for `DW_AT_decl_file`, already resolved through
    /// the line-number program's file table (out of scope for this crate to
    /// parse itself).
    fn decl_file(&self) -> Option<Vec<u8>>;

    /// `DW_AT_decl_line`, if present.
    fn decl_line(&self) -> Option<u64>;

    /// This DIE's direct children, in document order. Materialized eagerly;
    /// DWARF DIE trees in practice are shallow enough per-CU that this is
    /// simpler than exposing a streaming cursor, and it lets
    /// `crate::testutil`'s mock provider be a plain in-memory tree.
    fn children(&self) -> Vec<Self>
    where
        Self: Sized;
}

/// One compilation unit as exposed by a DWARF module (for each module,
/// callers enumerate CUs via `nextcu`/`offdie`-equivalent provider calls).
#[derive(Clone)]
pub struct CompileUnit<D: Die> {
    /// The CU's root DIE (expected to be `DW_TAG_compile_unit`).
    pub root: D,
    /// Size, in bytes, of an address in this CU's target architecture.
    pub address_size: u8,
    /// `DW_AT_name` off the root DIE, or `None`.
    pub name: Option<Vec<u8>>,
}

/// A DWARF-bearing module within an object file. Most object formats have
/// exactly one; the trait stays generic because ELF files with split debug
/// info or multiple embedded images can expose more than one.
pub trait DwarfModule {
    /// The concrete DIE type this module's CUs hand back.
    type Die: Die;

    /// All compilation units in this module.
    fn compile_units(&self) -> crate::error::Result<Vec<CompileUnit<Self::Die>>>;
}
