//! A hand-built, in-memory implementation of the `provider` traits
//! (§6's "DWARF provider"), used only by this crate's own tests in place of
//! a real ELF/DWARF object. Mirrors the teacher's own habit of assembling
//! test inputs in-crate rather than shelling out to an external tool.

#![cfg(any(test, feature = "testutil"))]

use crate::constants::DwAt;
use crate::error::Result;
use crate::provider::{Attr, CompileUnit, Die, DwarfModule};

/// A single DIE in a hand-built tree, addressed by an arbitrary `u64`
/// "offset" the test chooses (no real byte layout exists).
#[derive(Debug, Clone)]
pub struct MockDie {
    offset: u64,
    tag: u64,
    attrs: Vec<(DwAt, Attr)>,
    low_pc: Option<u64>,
    high_pc: Option<u64>,
    ranges: Vec<(u64, u64)>,
    decl_file: Option<Vec<u8>>,
    decl_line: Option<u64>,
    children: Vec<MockDie>,
}

impl MockDie {
    pub fn new(offset: u64, tag: u64) -> Self {
        MockDie {
            offset,
            tag,
            attrs: Vec::new(),
            low_pc: None,
            high_pc: None,
            ranges: Vec::new(),
            decl_file: None,
            decl_line: None,
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, at: DwAt, value: Attr) -> Self {
        self.attrs.push((at, value));
        self
    }

    pub fn with_child(mut self, child: MockDie) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_low_pc(mut self, addr: u64) -> Self {
        self.low_pc = Some(addr);
        self
    }

    pub fn with_high_pc(mut self, addr: u64) -> Self {
        self.high_pc = Some(addr);
        self
    }

    pub fn with_ranges(mut self, ranges: Vec<(u64, u64)>) -> Self {
        self.ranges = ranges;
        self
    }

    pub fn with_decl(mut self, file: &[u8], line: u64) -> Self {
        self.decl_file = Some(file.to_vec());
        self.decl_line = Some(line);
        self
    }
}

impl Die for MockDie {
    fn tag_raw(&self) -> u64 {
        self.tag
    }

    fn offset(&self) -> u64 {
        self.offset
    }

    fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    fn attr(&self, at: DwAt) -> Option<Attr> {
        self.attrs.iter().find(|(k, _)| *k == at).map(|(_, v)| v.clone())
    }

    fn low_pc(&self) -> Option<u64> {
        self.low_pc
    }

    fn high_pc(&self) -> Option<u64> {
        self.high_pc
    }

    fn ranges(&self) -> Vec<(u64, u64)> {
        self.ranges.clone()
    }

    fn decl_file(&self) -> Option<Vec<u8>> {
        self.decl_file.clone()
    }

    fn decl_line(&self) -> Option<u64> {
        self.decl_line
    }

    fn children(&self) -> Vec<Self> {
        self.children.clone()
    }
}

/// A whole module's worth of compilation units, handed back verbatim by
/// [`DwarfModule::compile_units`].
pub struct MockModule {
    units: Vec<CompileUnit<MockDie>>,
}

impl MockModule {
    pub fn new(units: Vec<CompileUnit<MockDie>>) -> Self {
        MockModule { units }
    }
}

impl DwarfModule for MockModule {
    type Die = MockDie;

    fn compile_units(&self) -> Result<Vec<CompileUnit<Self::Die>>> {
        Ok(self.units.clone())
    }
}
