//! Minimal amino binary helpers
//!
//! The chain identifies composite keys and packed multisignatures by their
//! amino encoding: protobuf-style field keys, unsigned varints and
//! length-prefixed byte strings, with a four-byte type prefix in front of
//! registered concrete types.

use super::MultisigError;

/// Type prefix of `tendermint/PubKeyMultisigThreshold`
pub const MULTISIG_THRESHOLD_PREFIX: [u8; 4] = [0x22, 0xC1, 0xF7, 0xE2];
/// Type prefix of `tendermint/PubKeySecp256k1`
pub const SECP256K1_PUBKEY_PREFIX: [u8; 4] = [0xEB, 0x5A, 0xE9, 0x87];

/// Field key for a varint field
pub fn varint_key(field: u8) -> u8 {
    field << 3
}

/// Field key for a length-delimited field
pub fn bytes_key(field: u8) -> u8 {
    (field << 3) | 2
}

pub fn put_uvarint(out: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        out.push((value as u8) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

pub fn put_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    put_uvarint(out, bytes.len() as u64);
    out.extend_from_slice(bytes);
}

/// Cursor over an amino buffer
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn is_done(&self) -> bool {
        self.pos >= self.buf.len()
    }

    pub fn expect_prefix(&mut self, prefix: &[u8]) -> Result<(), MultisigError> {
        let got = self.take(prefix.len())?;
        if got != prefix {
            return Err(malformed(format!(
                "unexpected type prefix {}",
                hex::encode_upper(got)
            )));
        }
        Ok(())
    }

    pub fn byte(&mut self) -> Result<u8, MultisigError> {
        Ok(self.take(1)?[0])
    }

    pub fn uvarint(&mut self) -> Result<u64, MultisigError> {
        let mut value = 0u64;
        for shift in (0..64).step_by(7) {
            let b = self.byte()?;
            value |= u64::from(b & 0x7f) << shift;
            if b & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(malformed("varint overflow"))
    }

    pub fn bytes(&mut self) -> Result<&'a [u8], MultisigError> {
        let len = usize::try_from(self.uvarint()?).map_err(|_| malformed("length overflow"))?;
        self.take(len)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], MultisigError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.buf.len())
            .ok_or_else(|| malformed("unexpected end of input"))?;
        let out = &self.buf[self.pos..end];
        self.pos = end;
        Ok(out)
    }
}

pub fn malformed(reason: impl Into<String>) -> MultisigError {
    MultisigError::MalformedEncoding(reason.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uvarint_round_trip() {
        for value in [0u64, 1, 127, 128, 300, u64::from(u32::MAX), u64::MAX] {
            let mut buf = Vec::new();
            put_uvarint(&mut buf, value);
            let mut reader = Reader::new(&buf);
            assert_eq!(reader.uvarint().unwrap(), value);
            assert!(reader.is_done());
        }
    }

    #[test]
    fn test_uvarint_layout() {
        let mut buf = Vec::new();
        put_uvarint(&mut buf, 300);
        assert_eq!(buf, vec![0xAC, 0x02]);
    }

    #[test]
    fn test_truncated_bytes_field() {
        let mut reader = Reader::new(&[0x05, 0x01, 0x02]);
        assert!(matches!(
            reader.bytes(),
            Err(MultisigError::MalformedEncoding(_))
        ));
    }
}
