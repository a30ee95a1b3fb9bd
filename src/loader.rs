//! The file driver (§4.7): the only module that sequences parse → recode →
//! size-cache → steal across every compilation unit of a module, and the
//! only place the dwarf-scratch arena's lifetime decision
//! (`Config::extra_dbg_info`) is made.

use crate::config::Config;
use crate::constants::DwTag;
use crate::cu::Cu;
use crate::error::{Error, Result};
use crate::provider::{CompileUnit, Die, DwarfModule};
use crate::parse;
use crate::recode;
use crate::sizecache;
use crate::strings::Strings;

/// What the caller's steal hook decided to do with a just-loaded CU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StealAction {
    /// Abort loading; no further CUs in this module are processed.
    Stop,
    /// The caller took ownership of the CU; the loader drops its own copy.
    Stolen,
    /// Retain the CU in the returned collection.
    Keep,
}

/// Load every compilation unit of `module`, running the full parse → recode
/// → size-cache pipeline on each and handing it to `steal` before deciding
/// whether to keep it.
///
/// `steal` is called once per successfully parsed CU, in visitation order
/// (§5's "strict serial order per CU"). Only [`Error::WrongRoot`],
/// [`Error::NoDebug`] and the object/DWARF/I/O wrapper variants ever
/// escape this function — every other condition the pipeline hits is
/// recovered locally and logged (§7).
pub fn load_file<M, F>(
    module: &M,
    conf: &Config,
    strings: &mut Strings,
    filename: &str,
    mut steal: F,
) -> Result<Vec<Cu>>
where
    M: DwarfModule,
    F: FnMut(&mut Cu, &Config) -> StealAction,
{
    let units = module.compile_units()?;
    if units.is_empty() {
        return Err(Error::NoDebug {
            path: filename.to_string(),
        });
    }

    let mut cus = Vec::new();
    for unit in units {
        let cu = load_one_unit(&unit, strings, filename)?;
        let mut cu = cu;
        cache_and_recode(&mut cu, strings, conf);

        match steal(&mut cu, conf) {
            StealAction::Stop => break,
            StealAction::Stolen => {}
            StealAction::Keep => {
                if !conf.extra_dbg_info {
                    cu.free_scratch();
                }
                cus.push(cu);
            }
        }
    }
    Ok(cus)
}

fn load_one_unit<D: Die>(unit: &CompileUnit<D>, strings: &mut Strings, filename: &str) -> Result<Cu> {
    let root_tag = DwTag::from_raw(unit.root.tag_raw());
    if root_tag != Some(DwTag::CompileUnit) {
        return Err(Error::WrongRoot {
            offset: unit.root.offset(),
            found: root_tag.map(|t| t.name().to_string()).unwrap_or_else(|| format!("{:#x}", unit.root.tag_raw())),
        });
    }

    let name = strings.add(unit.name.as_deref());
    let mut cu = Cu::new(name, unit.address_size, filename.to_string());
    parse::process_unit(&unit.root, &mut cu, strings);
    Ok(cu)
}

fn cache_and_recode(cu: &mut Cu, strings: &Strings, conf: &Config) {
    recode::recode_cu(cu);
    sizecache::cache_member_sizes(cu, strings, conf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strings::StringId;
    use crate::testutil::{MockDie, MockModule};

    #[test]
    fn empty_module_is_no_debug() {
        let module = MockModule::new(Vec::new());
        let mut strings = Strings::new();
        let result = load_file(&module, &Config::default(), &mut strings, "a.out", |_, _| StealAction::Keep);
        assert!(matches!(result, Err(Error::NoDebug { .. })));
    }

    #[test]
    fn wrong_root_tag_is_rejected() {
        let root = MockDie::new(0x0, DwTag::BaseType as u64);
        let module = MockModule::new(vec![CompileUnit {
            root,
            address_size: 8,
            name: None,
        }]);
        let mut strings = Strings::new();
        let result = load_file(&module, &Config::default(), &mut strings, "a.out", |_, _| StealAction::Keep);
        assert!(matches!(result, Err(Error::WrongRoot { .. })));
    }

    #[test]
    fn keep_retains_cu_and_frees_scratch_by_default() {
        let root = MockDie::new(0x0, DwTag::CompileUnit as u64);
        let module = MockModule::new(vec![CompileUnit {
            root,
            address_size: 8,
            name: Some(b"unit.c".to_vec()),
        }]);
        let mut strings = Strings::new();
        let result = load_file(&module, &Config::default(), &mut strings, "a.out", |_, _| StealAction::Keep);
        let cus = result.unwrap();
        assert_eq!(cus.len(), 1);
        assert!(cus[0].scratch_freed());
        assert_ne!(cus[0].name, StringId::EMPTY);
    }

    #[test]
    fn stolen_cu_is_not_retained() {
        let root = MockDie::new(0x0, DwTag::CompileUnit as u64);
        let module = MockModule::new(vec![CompileUnit {
            root,
            address_size: 8,
            name: None,
        }]);
        let mut strings = Strings::new();
        let result = load_file(&module, &Config::default(), &mut strings, "a.out", |_, _| StealAction::Stolen);
        assert_eq!(result.unwrap().len(), 0);
    }

    #[test]
    fn stop_halts_before_later_units_are_kept() {
        let make_root = || MockDie::new(0x0, DwTag::CompileUnit as u64);
        let module = MockModule::new(vec![
            CompileUnit {
                root: make_root(),
                address_size: 8,
                name: None,
            },
            CompileUnit {
                root: make_root(),
                address_size: 8,
                name: None,
            },
        ]);
        let mut strings = Strings::new();
        let result = load_file(&module, &Config::default(), &mut strings, "a.out", |_, _| StealAction::Stop);
        assert_eq!(result.unwrap().len(), 0);
    }
}
