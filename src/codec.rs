//! Binary encoding of formulas, rules and rule lists.
//!
//! All integers are little-endian. Single formulas and rules are prefixed
//! with a format version byte; rule lists carry a magic and version header:
//!
//! ```text
//! formula  := version(u8) node
//! rule     := version(u8) rule_body
//! rules    := "AIRL" version(u8) count(u32) rule_body*
//! rule_body:= effect(u8) node
//! node     := 0x00 key(u8) op(u8) len(u32) utf8[len] is_hashed(u8)   string atom
//!           | 0x01 key(u8) op(u8) value(i64)                          integer atom
//!           | 0x02 key(u8) op(u8) value(u8)                           boolean atom
//!           | 0x03 connector(u8) count(u32) node[count]               compound
//! ```
//!
//! Encoding applies the same string length and nesting limits the decoder
//! enforces, so anything `encode_*` accepts decodes back to an equal value.
//! Decoding re-runs every construction check, so corrupt input yields a
//! [`DecodeError`] and never an invalid formula.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use crate::error::{DecodeError, EncodeError};
use crate::formula::{
    AtomicFormula, CompoundFormula, Connector, FormulaValue, IntegrityFormula, Key, Operator,
};
use crate::rule::{Effect, Rule};

/// Current encoding version.
pub const FORMAT_VERSION: u8 = 1;
/// Header of an encoded rule list.
pub const RULE_LIST_MAGIC: [u8; 4] = *b"AIRL";
/// Maximum compound nesting accepted by the codec.
pub const MAX_FORMULA_DEPTH: usize = 256;
/// Maximum encoded string literal length.
pub const MAX_STRING_LEN: usize = 64 * 1024;

const TAG_STRING: u8 = 0x00;
const TAG_LONG: u8 = 0x01;
const TAG_BOOLEAN: u8 = 0x02;
const TAG_COMPOUND: u8 = 0x03;

/// Encode a single formula with a version prefix.
pub fn encode_formula(formula: &IntegrityFormula) -> Result<Vec<u8>, EncodeError> {
    let mut out = vec![FORMAT_VERSION];
    write_formula(&mut out, formula, 0)?;
    Ok(out)
}

/// Decode a formula produced by [`encode_formula`].
pub fn decode_formula(bytes: &[u8]) -> Result<IntegrityFormula, DecodeError> {
    let mut reader = Reader::new(bytes);
    reader.version()?;
    let formula = read_formula(&mut reader, 0)?;
    reader.finish()?;
    Ok(formula)
}

/// Encode a single rule with a version prefix.
pub fn encode_rule(rule: &Rule) -> Result<Vec<u8>, EncodeError> {
    let mut out = vec![FORMAT_VERSION];
    write_rule(&mut out, rule)?;
    Ok(out)
}

/// Decode a rule produced by [`encode_rule`].
pub fn decode_rule(bytes: &[u8]) -> Result<Rule, DecodeError> {
    let mut reader = Reader::new(bytes);
    reader.version()?;
    let rule = read_rule(&mut reader)?;
    reader.finish()?;
    Ok(rule)
}

/// Encode an ordered rule list as a rule-list document.
pub fn encode_rules(rules: &[Rule]) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::with_capacity(9 + rules.len() * 16);
    out.extend_from_slice(&RULE_LIST_MAGIC);
    out.push(FORMAT_VERSION);
    write_count(&mut out, rules.len())?;
    for rule in rules {
        write_rule(&mut out, rule)?;
    }
    Ok(out)
}

/// Decode a rule-list document, preserving rule order.
pub fn decode_rules(bytes: &[u8]) -> Result<Vec<Rule>, DecodeError> {
    let mut reader = Reader::new(bytes);
    if reader.take(RULE_LIST_MAGIC.len())? != RULE_LIST_MAGIC {
        return Err(DecodeError::BadMagic);
    }
    reader.version()?;
    let count = reader.count()?;
    let mut rules = Vec::with_capacity(count);
    for _ in 0..count {
        rules.push(read_rule(&mut reader)?);
    }
    reader.finish()?;
    Ok(rules)
}

fn write_count(out: &mut Vec<u8>, len: usize) -> Result<(), EncodeError> {
    let Ok(count) = u32::try_from(len) else {
        return Err(EncodeError::TooManyElements(len));
    };
    out.extend_from_slice(&count.to_le_bytes());
    Ok(())
}

fn write_rule(out: &mut Vec<u8>, rule: &Rule) -> Result<(), EncodeError> {
    out.push(rule.effect().code() as u8);
    write_formula(out, rule.formula(), 0)
}

fn write_formula(
    out: &mut Vec<u8>,
    formula: &IntegrityFormula,
    depth: usize,
) -> Result<(), EncodeError> {
    match formula {
        IntegrityFormula::Atomic(atom) => {
            let tag = match atom.value() {
                FormulaValue::String(_) => TAG_STRING,
                FormulaValue::Long(_) => TAG_LONG,
                FormulaValue::Boolean(_) => TAG_BOOLEAN,
            };
            out.push(tag);
            out.push(atom.key().code() as u8);
            out.push(atom.operator().code() as u8);
            match atom.value() {
                FormulaValue::String(s) => {
                    if s.len() > MAX_STRING_LEN {
                        return Err(EncodeError::StringTooLong(s.len()));
                    }
                    write_count(out, s.len())?;
                    out.extend_from_slice(s.as_bytes());
                    out.push(atom.is_hashed_value() as u8);
                }
                FormulaValue::Long(v) => out.extend_from_slice(&v.to_le_bytes()),
                FormulaValue::Boolean(b) => out.push(*b as u8),
            }
        }
        IntegrityFormula::Compound(compound) => {
            if depth >= MAX_FORMULA_DEPTH {
                return Err(EncodeError::DepthLimitExceeded(MAX_FORMULA_DEPTH));
            }
            out.push(TAG_COMPOUND);
            out.push(compound.connector().code() as u8);
            write_count(out, compound.formulas().len())?;
            for child in compound.formulas() {
                write_formula(out, child, depth + 1)?;
            }
        }
    }
    Ok(())
}

fn read_rule(reader: &mut Reader<'_>) -> Result<Rule, DecodeError> {
    let effect = Effect::from_code(reader.u8()? as i32)?;
    let formula = read_formula(reader, 0)?;
    Ok(Rule::new(formula, effect))
}

fn read_formula(reader: &mut Reader<'_>, depth: usize) -> Result<IntegrityFormula, DecodeError> {
    let tag = reader.u8()?;
    if tag == TAG_COMPOUND {
        if depth >= MAX_FORMULA_DEPTH {
            return Err(DecodeError::DepthLimitExceeded(MAX_FORMULA_DEPTH));
        }
        let connector = Connector::from_code(reader.u8()? as i32)?;
        let count = reader.count()?;
        let mut children = Vec::with_capacity(count);
        for _ in 0..count {
            children.push(read_formula(reader, depth + 1)?);
        }
        return Ok(CompoundFormula::new(connector, children)?.into());
    }

    let key = Key::from_code(reader.u8()? as i32)?;
    let operator = Operator::from_code(reader.u8()? as i32)?;
    let atom = match tag {
        TAG_STRING => {
            let value = reader.string()?;
            let is_hashed = reader.bool()?;
            AtomicFormula::new(key, operator, FormulaValue::String(value), is_hashed)?
        }
        TAG_LONG => {
            let value = reader.i64()?;
            AtomicFormula::new(key, operator, FormulaValue::Long(value), false)?
        }
        TAG_BOOLEAN => {
            let value = reader.bool()?;
            AtomicFormula::new(key, operator, FormulaValue::Boolean(value), false)?
        }
        other => return Err(DecodeError::UnknownFormulaTag(other)),
    };
    Ok(atom.into())
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(DecodeError::Truncated {
                needed: n,
                remaining,
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32, DecodeError> {
        let mut b = [0u8; 4];
        b.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(b))
    }

    fn i64(&mut self) -> Result<i64, DecodeError> {
        let mut b = [0u8; 8];
        b.copy_from_slice(self.take(8)?);
        Ok(i64::from_le_bytes(b))
    }

    fn bool(&mut self) -> Result<bool, DecodeError> {
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(DecodeError::InvalidBoolean(other)),
        }
    }

    /// Element count; every element takes at least one byte, so a count
    /// larger than the remaining input is rejected before allocating.
    fn count(&mut self) -> Result<usize, DecodeError> {
        let count = self.u32()? as usize;
        let remaining = self.remaining();
        if count > remaining {
            return Err(DecodeError::Truncated {
                needed: count,
                remaining,
            });
        }
        Ok(count)
    }

    fn string(&mut self) -> Result<String, DecodeError> {
        let len = self.u32()? as usize;
        if len > MAX_STRING_LEN {
            return Err(DecodeError::StringTooLong(len));
        }
        let bytes = self.take(len)?;
        core::str::from_utf8(bytes)
            .map(String::from)
            .map_err(|_| DecodeError::InvalidUtf8)
    }

    fn version(&mut self) -> Result<(), DecodeError> {
        match self.u8()? {
            FORMAT_VERSION => Ok(()),
            other => Err(DecodeError::UnsupportedVersion(other)),
        }
    }

    fn finish(&self) -> Result<(), DecodeError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(DecodeError::TrailingBytes(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormulaError;

    const PRE_INSTALLED_TRUE: [u8; 4] = [
        TAG_BOOLEAN,
        Key::PreInstalled as u8,
        Operator::Eq as u8,
        1,
    ];

    fn sample_formula() -> IntegrityFormula {
        IntegrityFormula::not(
            IntegrityFormula::any(vec![
                IntegrityFormula::all(vec![
                    IntegrityFormula::installer_name_equals("com.store"),
                    IntegrityFormula::installer_certificate_equals("CERT"),
                ])
                .unwrap(),
                IntegrityFormula::version_code_greater_than_or_equal_to(-3),
                IntegrityFormula::is_pre_installed(),
            ])
            .unwrap(),
        )
    }

    fn round_trip(f: &IntegrityFormula) -> IntegrityFormula {
        decode_formula(&encode_formula(f).unwrap()).unwrap()
    }

    fn nested_nots(levels: usize) -> IntegrityFormula {
        let mut f = IntegrityFormula::is_pre_installed();
        for _ in 0..levels {
            f = IntegrityFormula::not(f);
        }
        f
    }

    #[test]
    fn test_formula_round_trip() {
        let f = sample_formula();
        assert_eq!(round_trip(&f), f);
    }

    #[test]
    fn test_rule_list_round_trip_preserves_order() {
        let rules = vec![
            Rule::new(IntegrityFormula::package_name_equals("b"), Effect::Deny),
            Rule::new(sample_formula(), Effect::Allow),
            Rule::new(IntegrityFormula::package_name_equals("a"), Effect::Deny),
        ];
        assert_eq!(decode_rules(&encode_rules(&rules).unwrap()).unwrap(), rules);
        assert_eq!(decode_rules(&encode_rules(&[]).unwrap()).unwrap(), vec![]);
    }

    #[test]
    fn test_atomic_layout() {
        let atom = AtomicFormula::long(Key::VersionCode, Operator::Le, 2).unwrap();
        let bytes = encode_formula(&IntegrityFormula::from(atom)).unwrap();
        assert_eq!(
            bytes,
            vec![FORMAT_VERSION, TAG_LONG, 4, 4, 2, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_rejects_invalid_arity_in_persisted_compound() {
        // NOT with two children.
        let mut bytes = vec![FORMAT_VERSION, TAG_COMPOUND, Connector::Not as u8];
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&PRE_INSTALLED_TRUE);
        bytes.extend_from_slice(&PRE_INSTALLED_TRUE);

        let err = decode_formula(&bytes).unwrap_err();
        let expected = FormulaError::UnaryArity {
            connector: Connector::Not,
            found: 2,
        };
        assert_eq!(err, DecodeError::Formula(expected));
    }

    #[test]
    fn test_rejects_unknown_discriminants() {
        let err = decode_formula(&[FORMAT_VERSION, 0x09, 0, 0]).unwrap_err();
        assert_eq!(err, DecodeError::UnknownFormulaTag(0x09));

        let mut bytes = vec![FORMAT_VERSION, TAG_COMPOUND, 7];
        bytes.extend_from_slice(&0u32.to_le_bytes());
        let err = decode_formula(&bytes).unwrap_err();
        assert_eq!(err, DecodeError::Formula(FormulaError::UnknownConnector(7)));

        let err = decode_formula(&[FORMAT_VERSION, TAG_BOOLEAN, 42, 0, 1]).unwrap_err();
        assert_eq!(err, DecodeError::Formula(FormulaError::UnknownKey(42)));

        let mut bytes = vec![FORMAT_VERSION, 9];
        bytes.extend_from_slice(&PRE_INSTALLED_TRUE);
        let err = decode_rule(&bytes).unwrap_err();
        assert_eq!(err, DecodeError::Formula(FormulaError::UnknownEffect(9)));
    }

    #[test]
    fn test_rejects_operator_mismatch_from_tampered_bytes() {
        // String atom with GT operator.
        let mut bytes = vec![FORMAT_VERSION, TAG_STRING, Key::PackageName as u8];
        bytes.push(Operator::Gt as u8);
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(b"a");
        bytes.push(0);
        assert!(matches!(
            decode_formula(&bytes),
            Err(DecodeError::Formula(FormulaError::OperatorNotSupported { .. }))
        ));
    }

    #[test]
    fn test_rejects_truncated_and_trailing() {
        let bytes = encode_formula(&sample_formula()).unwrap();
        for cut in 0..bytes.len() {
            let prefix = &bytes[..cut];
            assert!(decode_formula(prefix).is_err(), "{} byte prefix", cut);
        }

        let mut padded = bytes.clone();
        padded.push(0);
        assert_eq!(decode_formula(&padded), Err(DecodeError::TrailingBytes(1)));
    }

    #[test]
    fn test_rejects_bad_header() {
        let mut bytes = encode_formula(&sample_formula()).unwrap();
        bytes[0] = 2;
        let err = decode_formula(&bytes).unwrap_err();
        assert_eq!(err, DecodeError::UnsupportedVersion(2));

        let mut list = encode_rules(&[]).unwrap();
        list[0] = b'X';
        assert_eq!(decode_rules(&list), Err(DecodeError::BadMagic));
    }

    #[test]
    fn test_rejects_invalid_boolean_and_utf8() {
        let bytes = [FORMAT_VERSION, TAG_BOOLEAN, Key::PreInstalled as u8, 0, 2];
        assert_eq!(decode_formula(&bytes), Err(DecodeError::InvalidBoolean(2)));

        let mut bytes = vec![FORMAT_VERSION, TAG_STRING, Key::PackageName as u8, 0];
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&[0xC3, 0x28, 0]);
        assert_eq!(decode_formula(&bytes), Err(DecodeError::InvalidUtf8));
    }

    #[test]
    fn test_depth_limit_is_symmetric() {
        let at_limit = nested_nots(MAX_FORMULA_DEPTH);
        assert_eq!(round_trip(&at_limit), at_limit);

        let too_deep = nested_nots(MAX_FORMULA_DEPTH + 1);
        let expected = EncodeError::DepthLimitExceeded(MAX_FORMULA_DEPTH);
        assert_eq!(encode_formula(&too_deep), Err(expected.clone()));

        let rule = Rule::new(too_deep, Effect::Deny);
        assert_eq!(encode_rule(&rule), Err(expected.clone()));
        assert_eq!(encode_rules(&[rule]), Err(expected));
    }

    #[test]
    fn test_decoder_rejects_excessive_depth() {
        let mut bytes = vec![FORMAT_VERSION];
        for _ in 0..=MAX_FORMULA_DEPTH {
            bytes.extend_from_slice(&[TAG_COMPOUND, Connector::Not as u8]);
            bytes.extend_from_slice(&1u32.to_le_bytes());
        }
        bytes.extend_from_slice(&PRE_INSTALLED_TRUE);

        let expected = DecodeError::DepthLimitExceeded(MAX_FORMULA_DEPTH);
        assert_eq!(decode_formula(&bytes), Err(expected));
    }

    #[test]
    fn test_string_limit_is_symmetric() {
        let value = "a".repeat(MAX_STRING_LEN);
        let at_limit = AtomicFormula::string(Key::AppCertificate, value, false).unwrap();
        let at_limit = IntegrityFormula::from(at_limit);
        assert_eq!(round_trip(&at_limit), at_limit);

        let value = "a".repeat(MAX_STRING_LEN + 1);
        let oversized = AtomicFormula::string(Key::AppCertificate, value, false).unwrap();
        let oversized = IntegrityFormula::from(oversized);
        let expected = EncodeError::StringTooLong(MAX_STRING_LEN + 1);
        assert_eq!(encode_formula(&oversized), Err(expected.clone()));

        let rules = [
            Rule::new(IntegrityFormula::package_name_equals("evil"), Effect::Deny),
            Rule::new(oversized, Effect::Deny),
        ];
        assert_eq!(encode_rules(&rules), Err(expected));
    }

    #[test]
    fn test_decoder_rejects_oversized_string_prefix() {
        let mut bytes = vec![FORMAT_VERSION, TAG_STRING, Key::PackageName as u8, 0];
        bytes.extend_from_slice(&(MAX_STRING_LEN as u32 + 1).to_le_bytes());
        assert_eq!(
            decode_formula(&bytes),
            Err(DecodeError::StringTooLong(MAX_STRING_LEN + 1))
        );
    }

    #[test]
    fn test_rejects_oversized_count_without_allocating() {
        let mut bytes = vec![FORMAT_VERSION, TAG_COMPOUND, Connector::And as u8];
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(decode_formula(&bytes), Err(DecodeError::Truncated { .. })));
    }
}
