use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BitError {
    #[error("value {value} does not fit in {bits} bits")]
    Overflow { value: u64, bits: u32 },
    #[error("needed {needed} bits but only {remaining} remain")]
    Truncated { needed: usize, remaining: usize },
}

/// Owned run of bits, MSB-first within each byte.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitString {
    bytes: Vec<u8>,
    len: usize,
}

impl BitString {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bit(&self, index: usize) -> Option<bool> {
        if index >= self.len {
            return None;
        }
        Some(self.bytes[index / 8] & (0x80 >> (index % 8)) != 0)
    }

    fn push(&mut self, bit: bool) {
        if self.len % 8 == 0 {
            self.bytes.push(0);
        }
        if bit {
            let last = self.bytes.len() - 1;
            self.bytes[last] |= 0x80 >> (self.len % 8);
        }
        self.len += 1;
    }

    pub fn reader(&self) -> BitReader<'_> {
        BitReader::with_len(&self.bytes, self.len)
    }
}

#[derive(Debug, Default)]
pub struct BitWriter {
    bits: BitString,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, value: u64, bits: u32) -> Result<(), BitError> {
        if bits < 64 && value >> bits != 0 {
            return Err(BitError::Overflow { value, bits });
        }
        for shift in (0..bits).rev() {
            self.bits.push((value >> shift) & 1 == 1);
        }
        Ok(())
    }

    pub fn write_bool(&mut self, value: bool) {
        self.bits.push(value);
    }

    pub fn write_bits(&mut self, bits: &BitString) {
        for index in 0..bits.len() {
            self.bits.push(bits.bit(index).unwrap_or(false));
        }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn into_bit_string(self) -> BitString {
        self.bits
    }

    /// Padded with zero bits to a whole byte.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bits.bytes
    }
}

pub struct BitReader<'a> {
    bytes: &'a [u8],
    len: usize,
    position: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self::with_len(bytes, bytes.len() * 8)
    }

    fn with_len(bytes: &'a [u8], len: usize) -> Self {
        Self {
            bytes,
            len: len.min(bytes.len() * 8),
            position: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.len - self.position
    }

    pub fn read(&mut self, bits: u32) -> Result<u64, BitError> {
        let needed = bits as usize;
        if needed > self.remaining() {
            return Err(BitError::Truncated {
                needed,
                remaining: self.remaining(),
            });
        }
        let mut value = 0u64;
        for _ in 0..bits {
            value = (value << 1) | u64::from(self.next_bit());
        }
        Ok(value)
    }

    pub fn read_bool(&mut self) -> Result<bool, BitError> {
        Ok(self.read(1)? == 1)
    }

    pub fn read_bit_string(&mut self, len: usize) -> Result<BitString, BitError> {
        if len > self.remaining() {
            return Err(BitError::Truncated {
                needed: len,
                remaining: self.remaining(),
            });
        }
        let mut bits = BitString::default();
        for _ in 0..len {
            let bit = self.next_bit();
            bits.push(bit);
        }
        Ok(bits)
    }

    /// True when every unread bit is zero (byte padding only).
    pub fn rest_is_zero(&mut self) -> bool {
        while self.remaining() > 0 {
            if self.next_bit() {
                return false;
            }
        }
        true
    }

    fn next_bit(&mut self) -> bool {
        let bit = self.bytes[self.position / 8] & (0x80 >> (self.position % 8)) != 0;
        self.position += 1;
        bit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_are_packed_msb_first() {
        let mut writer = BitWriter::new();
        writer.write(0b101, 3).expect("fits");
        writer.write_bool(true);
        writer.write(0x3, 2).expect("fits");

        assert_eq!(writer.len(), 6);
        assert_eq!(writer.into_bytes(), vec![0b1011_1100]);
    }

    #[test]
    fn oversized_values_are_rejected() {
        let mut writer = BitWriter::new();

        assert_eq!(
            writer.write(8, 3),
            Err(BitError::Overflow { value: 8, bits: 3 })
        );
        assert!(writer.is_empty());
    }

    #[test]
    fn reading_past_the_end_reports_truncation() {
        let bytes = [0xFF];
        let mut reader = BitReader::new(&bytes);

        assert_eq!(reader.read(5), Ok(0b11111));
        assert_eq!(
            reader.read(4),
            Err(BitError::Truncated {
                needed: 4,
                remaining: 3
            })
        );
    }

    #[test]
    fn bit_strings_nest_inside_a_stream() {
        let mut inner = BitWriter::new();
        inner.write(0b1_0110_1001, 9).expect("fits");
        let inner = inner.into_bit_string();

        let mut outer = BitWriter::new();
        outer.write(inner.len() as u64, 12).expect("fits");
        outer.write_bits(&inner);
        let bytes = outer.into_bytes();

        let mut reader = BitReader::new(&bytes);
        let len = reader.read(12).expect("len") as usize;
        let copy = reader.read_bit_string(len).expect("bits");
        assert_eq!(copy, inner);
        assert_eq!(copy.reader().read(9), Ok(0b1_0110_1001));
        assert!(reader.rest_is_zero());
    }
}
