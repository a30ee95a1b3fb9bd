//! The attribute reader (§4.1): pure helpers over a [`Die`] returning
//! numeric, string, reference, block-expression, or location-expression
//! values, doing the `DW_FORM_*` dispatch the provider already decoded into
//! an [`Attr`] one level further into something the node factories can use
//! directly.

use crate::constants::{DwAt, DwOp};
use crate::diagnostics::RateLimiter;
use crate::error::Diagnostic;
use crate::ids::DieOffset;
use crate::model::VLocation;
use crate::provider::{Attr, Die};
use crate::strings::{StringId, Strings};

/// Sentinel returned by [`attr_offset`] when an expression contains an
/// unhandled `DW_OP_*` opcode, or when its trailing ULEB128 operand
/// overflows (§4.1, §7 `MALFORMED_EXPRESSION`).
pub const MAX_U64: u64 = u64::MAX;

fn numeric_from_attr(value: &Attr) -> u64 {
    match value {
        Attr::Address(v) => *v,
        Attr::Udata(v) => *v,
        Attr::Sdata(v) => *v as u64,
        Attr::Flag(present) => *present as u64,
        Attr::SecOffset(v) => *v,
        Attr::String(_) | Attr::Reference(_) | Attr::Block(_) | Attr::Other => 0,
    }
}

/// `attr_numeric(die, at) → u64`: dispatches on form. Anything not
/// numeric-shaped (string/reference/block/unknown) returns 0.
pub fn attr_numeric<D: Die>(die: &D, at: DwAt) -> u64 {
    die.attr(at).as_ref().map(numeric_from_attr).unwrap_or(0)
}

/// `attr_string(die, at) → interned id`, via the string pool. Empty string
/// (id 0) if the attribute is absent or not string-shaped.
pub fn attr_string<D: Die>(die: &D, at: DwAt, strings: &mut Strings) -> StringId {
    match die.attr(at) {
        Some(Attr::String(bytes)) => strings.add(Some(&bytes)),
        _ => StringId::EMPTY,
    }
}

/// `attr_type(die, at) → DieOffset`: dereferences a reference-form
/// attribute to its target DIE offset. `None` if absent or not a reference.
pub fn attr_type<D: Die>(die: &D, at: DwAt) -> Option<DieOffset> {
    match die.attr(at) {
        Some(Attr::Reference(offset)) => Some(offset),
        _ => None,
    }
}

/// `attr_offset(die, at) → u64`: like [`attr_numeric`], but a block-form
/// attribute is evaluated as a one-op location expression:
/// `DW_OP_plus_uconst`/`DW_OP_constu` followed by a ULEB128 operand.
/// Anything else in a block is `MALFORMED_EXPRESSION` → [`MAX_U64`].
pub fn attr_offset<D: Die>(die: &D, at: DwAt, diagnostics: &RateLimiter) -> u64 {
    match die.attr(at) {
        Some(Attr::Block(bytes)) => eval_offset_expr(&bytes, diagnostics),
        Some(other) => numeric_from_attr(&other),
        None => 0,
    }
}

/// Like [`attr_offset`], but `None` when the attribute is altogether absent
/// (used where "no vtable slot" must be distinguished from "slot 0").
pub fn attr_offset_opt<D: Die>(die: &D, at: DwAt, diagnostics: &RateLimiter) -> Option<u64> {
    die.attr(at).is_some().then(|| attr_offset(die, at, diagnostics))
}

fn eval_offset_expr(bytes: &[u8], diagnostics: &RateLimiter) -> u64 {
    if bytes.is_empty() {
        return 0;
    }
    let opcode = DwOp(bytes[0]);
    if opcode == DwOp::PLUS_UCONST || opcode == DwOp::CONSTU {
        read_uleb128(&bytes[1..]).unwrap_or(MAX_U64)
    } else {
        diagnostics.warn(Diagnostic::MalformedExpression(bytes[0] as u64));
        MAX_U64
    }
}

/// ULEB128 decode via the same `leb128` crate the teacher reaches for
/// (`leb128::read::unsigned`, §4.1): `&[u8]` implements `io::Read`, so a
/// slice is a drop-in reader. Any decode failure — truncated input or a
/// value too wide to fit a `u64` — maps to [`MAX_U64`], same as an unknown
/// `DW_OP` in the caller.
fn read_uleb128(bytes: &[u8]) -> Option<u64> {
    let mut reader = bytes;
    leb128::read::unsigned(&mut reader).ok()
}

/// `attr_upper_bound(die) → u64`: `value + 1` for a subrange's
/// `DW_AT_upper_bound`; `0` if absent.
pub fn attr_upper_bound<D: Die>(die: &D) -> u64 {
    match die.attr(DwAt::UpperBound) {
        Some(value) => numeric_from_attr(&value) + 1,
        None => 0,
    }
}

/// `dwarf_location(die) → (VLocation, addr)`: classifies a single-op
/// location expression by its `DW_OP_*` opcode range.
pub fn dwarf_location<D: Die>(die: &D, diagnostics: &RateLimiter) -> (VLocation, Option<u64>) {
    match die.attr(DwAt::Location) {
        None => (VLocation::Optimized, None),
        Some(Attr::Block(bytes)) => classify_location(&bytes, diagnostics),
        Some(_) => (VLocation::Unknown, None),
    }
}

fn classify_location(bytes: &[u8], diagnostics: &RateLimiter) -> (VLocation, Option<u64>) {
    if bytes.is_empty() {
        return (VLocation::Optimized, None);
    }
    let opcode = DwOp(bytes[0]);
    if opcode == DwOp::ADDR {
        (VLocation::Global, read_target_address(&bytes[1..]))
    } else if opcode.is_register() {
        (VLocation::Register, None)
    } else if opcode.is_frame_relative() {
        (VLocation::Local, None)
    } else {
        diagnostics.warn(Diagnostic::MalformedExpression(bytes[0] as u64));
        (VLocation::Unknown, None)
    }
}

/// Decode a little-endian target address following `DW_OP_addr`, sized by
/// how many bytes remain (4 or 8 in practice).
fn read_target_address(bytes: &[u8]) -> Option<u64> {
    if bytes.len() >= 8 {
        Some(u64::from_le_bytes(bytes[0..8].try_into().unwrap()))
    } else if bytes.len() >= 4 {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(&bytes[0..4]);
        Some(u64::from(u32::from_le_bytes(buf)))
    } else {
        None
    }
}

/// `DW_AT_const_value`, interpreted as a signed integer (used for
/// `DW_TAG_enumerator` values).
pub fn attr_const_value_signed<D: Die>(die: &D) -> i64 {
    match die.attr(DwAt::ConstValue) {
        Some(Attr::Sdata(v)) => v,
        Some(Attr::Udata(v)) => v as i64,
        Some(Attr::Address(v)) => v as i64,
        Some(Attr::Block(bytes)) => {
            let mut acc: i64 = 0;
            for (i, b) in bytes.iter().enumerate().take(8) {
                acc |= i64::from(*b) << (8 * i);
            }
            acc
        }
        _ => 0,
    }
}

/// Captures `DW_AT_decl_file`/`DW_AT_decl_line`, interning the file name
/// through `last_file`'s single-entry cache so a CU full of DIEs on the same
/// line doesn't re-intern the same filename per node (§4.1).
pub fn attr_decl_file_line<D: Die>(
    die: &D,
    strings: &mut Strings,
    last_file: &mut Option<(Vec<u8>, StringId)>,
) -> (StringId, u64) {
    let file_id = match die.decl_file() {
        Some(bytes) => {
            if let Some((cached_bytes, cached_id)) = last_file {
                if *cached_bytes == bytes {
                    *cached_id
                } else {
                    let id = strings.add(Some(&bytes));
                    *last_file = Some((bytes, id));
                    id
                }
            } else {
                let id = strings.add(Some(&bytes));
                *last_file = Some((bytes, id));
                id
            }
        }
        None => StringId::EMPTY,
    };
    let line = die.decl_line().unwrap_or(0);
    (file_id, line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uleb128_single_byte() {
        assert_eq!(read_uleb128(&[0x05]), Some(5));
    }

    #[test]
    fn uleb128_multi_byte() {
        // 300 = 0b1_0010_1100 -> low7=0b0101100|0x80, next=0b10
        assert_eq!(read_uleb128(&[0xac, 0x02]), Some(300));
    }

    #[test]
    fn uleb128_overflow_past_ten_bytes_is_max() {
        let bytes = [0x80; 11];
        assert_eq!(read_uleb128(&bytes), None);
    }

    #[test]
    fn offset_expr_plus_uconst() {
        let diag = RateLimiter::new();
        // DW_OP_plus_uconst 42
        assert_eq!(eval_offset_expr(&[0x23, 42], &diag), 42);
    }

    #[test]
    fn offset_expr_unknown_opcode_is_max_u64() {
        let diag = RateLimiter::new();
        assert_eq!(eval_offset_expr(&[0x06], &diag), MAX_U64);
    }

    #[test]
    fn location_addr_is_global() {
        let diag = RateLimiter::new();
        let mut bytes = vec![0x03];
        bytes.extend_from_slice(&0x601040u64.to_le_bytes());
        assert_eq!(
            classify_location(&bytes, &diag),
            (VLocation::Global, Some(0x601040))
        );
    }

    #[test]
    fn location_absent_is_optimized() {
        let diag = RateLimiter::new();
        assert_eq!(classify_location(&[], &diag), (VLocation::Optimized, None));
    }

    #[test]
    fn location_register_op() {
        let diag = RateLimiter::new();
        assert_eq!(
            classify_location(&[DwOp::REG0.0 + 3], &diag),
            (VLocation::Register, None)
        );
    }
}
