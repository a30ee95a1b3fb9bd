//! The real DWARF provider (§4.7's under-specified "ELF + DWARF handle"),
//! built on the published `object` and `gimli` crates — the same pairing
//! the rest of this pack reaches for when it needs to read an object file's
//! debug sections.
//!
//! The whole file's bytes are read once and leaked to get a `'static`
//! lifetime for every section slice `gimli::Dwarf` borrows; this sidesteps
//! a self-referential `object::File`/`gimli::Dwarf` pair without resorting
//! to unsafe code. The process that calls `load_file` owns the file for its
//! entire lifetime anyway, so the leak is bounded.

use std::borrow::Cow;
use std::rc::Rc;

use gimli::{EndianSlice, RunTimeEndian};

use crate::constants::DwAt;
use crate::error::{Error, Result};
use crate::provider::{Attr, CompileUnit, Die, DwarfModule};

type R = EndianSlice<'static, RunTimeEndian>;

fn leak_file(data: Vec<u8>) -> &'static [u8] {
    Box::leak(data.into_boxed_slice())
}

/// A module backed by a real object file's DWARF sections.
pub struct GimliModule {
    dwarf: gimli::Dwarf<R>,
}

impl GimliModule {
    /// Read `path` and parse its object-file and DWARF sections.
    pub fn open(path: &str) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let data: &'static [u8] = leak_file(bytes);
        let object = object::File::parse(data)?;
        Self::from_object(&object)
    }

    /// Build directly from an already-parsed `object::File`, for callers
    /// that parsed the object file themselves (e.g. to inspect non-DWARF
    /// sections too).
    pub fn from_object(object: &object::File<'static>) -> Result<Self> {
        use object::Object;
        let endian = if object.is_little_endian() {
            RunTimeEndian::Little
        } else {
            RunTimeEndian::Big
        };
        let load_section = |id: gimli::SectionId| -> std::result::Result<R, gimli::Error> {
            let data = section_data(object, id.name());
            Ok(EndianSlice::new(data, endian))
        };
        let dwarf = gimli::Dwarf::load(load_section)?;
        Ok(GimliModule { dwarf })
    }
}

fn section_data(object: &object::File<'static>, name: &str) -> &'static [u8] {
    use object::Object;
    use object::ObjectSection;
    match object.section_by_name(name).and_then(|s| s.uncompressed_data().ok()) {
        Some(Cow::Borrowed(data)) => data,
        _ => &[],
    }
}

/// Shared context for every [`GimliDie`] belonging to the same compilation
/// unit: the whole-file `Dwarf` handle (needed to resolve indirect strings)
/// plus the unit itself (needed to resolve offsets and the line table).
struct UnitCtx {
    dwarf: gimli::Dwarf<R>,
    unit: gimli::Unit<R>,
}

/// A DIE within one compilation unit of a [`GimliModule`].
#[derive(Clone)]
pub struct GimliDie {
    ctx: Rc<UnitCtx>,
    offset: gimli::UnitOffset,
}

impl GimliDie {
    fn entry(&self) -> gimli::DebuggingInformationEntry<'_, '_, R> {
        self.ctx
            .unit
            .entry(self.offset)
            .expect("UnitOffset produced by this module's own entries_tree walk is always valid")
    }

    fn die_offset_u64(&self) -> u64 {
        self.offset
            .to_debug_info_offset(&self.ctx.unit.header)
            .map(|o| o.0 as u64)
            .unwrap_or(self.offset.0 as u64)
    }
}

impl Die for GimliDie {
    fn tag_raw(&self) -> u64 {
        u64::from(self.entry().tag().0)
    }

    fn offset(&self) -> u64 {
        self.die_offset_u64()
    }

    fn has_children(&self) -> bool {
        self.entry().has_children()
    }

    fn attr(&self, at: DwAt) -> Option<Attr> {
        let entry = self.entry();
        let value = entry.attr_value(gimli::DwAt(at as u16)).ok().flatten()?;
        decode_attr(&self.ctx, value)
    }

    fn low_pc(&self) -> Option<u64> {
        match self.entry().attr_value(gimli::DW_AT_low_pc).ok().flatten() {
            Some(gimli::AttributeValue::Addr(a)) => Some(a),
            _ => None,
        }
    }

    fn high_pc(&self) -> Option<u64> {
        let entry = self.entry();
        let low = self.low_pc();
        match entry.attr_value(gimli::DW_AT_high_pc).ok().flatten() {
            Some(gimli::AttributeValue::Addr(a)) => Some(a),
            Some(gimli::AttributeValue::Udata(offset)) => low.map(|l| l + offset),
            _ => None,
        }
    }

    fn ranges(&self) -> Vec<(u64, u64)> {
        let Some(value) = self.entry().attr_value(gimli::DW_AT_ranges).ok().flatten() else {
            return Vec::new();
        };
        let Ok(Some(offset)) = self.ctx.dwarf.attr_ranges_offset(&self.ctx.unit, value) else {
            return Vec::new();
        };
        let Ok(mut iter) = self.ctx.dwarf.ranges(&self.ctx.unit, offset) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        while let Ok(Some(range)) = iter.next() {
            out.push((range.begin, range.end));
        }
        out
    }

    fn decl_file(&self) -> Option<Vec<u8>> {
        let entry = self.entry();
        let index = match entry.attr_value(gimli::DwAt(DwAt::DeclFile as u16)).ok().flatten() {
            Some(gimli::AttributeValue::Udata(v)) => v,
            _ => return None,
        };
        let program = self.ctx.unit.line_program.as_ref()?;
        let header = program.header();
        let file = header.file(index)?;
        let name_value = file.path_name();
        let name = self.ctx.dwarf.attr_string(&self.ctx.unit, name_value).ok()?;
        Some(name.slice().to_vec())
    }

    fn decl_line(&self) -> Option<u64> {
        match self.entry().attr_value(gimli::DwAt(DwAt::DeclLine as u16)).ok().flatten() {
            Some(gimli::AttributeValue::Udata(v)) => Some(v),
            _ => None,
        }
    }

    fn children(&self) -> Vec<Self> {
        let Ok(mut tree) = self.ctx.unit.entries_tree(Some(self.offset)) else {
            return Vec::new();
        };
        let Ok(root) = tree.root() else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let Ok(mut children) = root.children() else {
            return out;
        };
        while let Ok(Some(child)) = children.next() {
            out.push(GimliDie {
                ctx: Rc::clone(&self.ctx),
                offset: child.entry().offset(),
            });
        }
        out
    }
}

fn decode_attr(ctx: &UnitCtx, value: gimli::AttributeValue<R>) -> Option<Attr> {
    use gimli::AttributeValue::*;
    Some(match value {
        Addr(a) => Attr::Address(a),
        Udata(v) => Attr::Udata(v),
        Data1(v) => Attr::Udata(u64::from(v)),
        Data2(v) => Attr::Udata(u64::from(v)),
        Data4(v) => Attr::Udata(u64::from(v)),
        Data8(v) => Attr::Udata(v),
        Sdata(v) => Attr::Sdata(v),
        Flag(v) => Attr::Flag(v),
        DebugStrRef(_) | String(_) => {
            let s = ctx.dwarf.attr_string(&ctx.unit, value).ok()?;
            Attr::String(s.slice().to_vec())
        }
        UnitRef(off) => {
            let global = off
                .to_debug_info_offset(&ctx.unit.header)
                .map(|o| o.0 as u64)
                .unwrap_or(off.0 as u64);
            Attr::Reference(global)
        }
        DebugInfoRef(off) => Attr::Reference(off.0 as u64),
        Exprloc(expr) => Attr::Block(expr.0.slice().to_vec()),
        Block(b) => Attr::Block(b.slice().to_vec()),
        SecOffset(o) => Attr::SecOffset(o.0 as u64),
        _ => Attr::Other,
    })
}

impl DwarfModule for GimliModule {
    type Die = GimliDie;

    fn compile_units(&self) -> Result<Vec<CompileUnit<Self::Die>>> {
        let mut out = Vec::new();
        let mut headers = self.dwarf.units();
        while let Some(header) = headers.next().map_err(Error::from)? {
            let unit = self.dwarf.unit(header).map_err(Error::from)?;
            let address_size = unit.header.address_size();
            let ctx = Rc::new(UnitCtx {
                dwarf: self.dwarf.clone(),
                unit,
            });

            let root_offset = {
                let mut tree = ctx.unit.entries_tree(None).map_err(Error::from)?;
                let root = tree.root().map_err(Error::from)?;
                root.entry().offset()
            };
            let root = GimliDie {
                ctx: Rc::clone(&ctx),
                offset: root_offset,
            };
            let name = match root.attr(DwAt::Name) {
                Some(Attr::String(bytes)) => Some(bytes),
                _ => None,
            };
            out.push(CompileUnit {
                root,
                address_size,
                name,
            });
        }
        Ok(out)
    }
}
