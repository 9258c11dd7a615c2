use crate::error::InternalError;

pub(crate) fn num_bytes_for_bits(count: u16) -> usize {
    (count as usize + 7) / 8
}

pub(crate) fn byte_count_for_bits(count: usize) -> Result<u8, InternalError> {
    let bytes = (count + 7) / 8;
    u8::try_from(bytes).map_err(|_| InternalError::BadByteCount(bytes))
}

pub(crate) fn byte_count_for_registers(count: usize) -> Result<u8, InternalError> {
    let bytes = 2 * count;
    u8::try_from(bytes).map_err(|_| InternalError::BadByteCount(bytes))
}

/// bit `i` lands in byte `i / 8` at bit `i % 8`, least significant bit first
pub(crate) fn pack_bits(values: &[bool]) -> impl Iterator<Item = u8> + '_ {
    values.chunks(8).map(|chunk| {
        chunk
            .iter()
            .enumerate()
            .fold(0u8, |acc, (i, bit)| if *bit { acc | (1 << i) } else { acc })
    })
}

/// inverse of [`pack_bits`], reads exactly `count` bits
pub(crate) fn unpack_bits(count: u16, bytes: &[u8]) -> Vec<bool> {
    (0..count as usize)
        .map(|i| match bytes.get(i / 8) {
            Some(byte) => byte & (1 << (i % 8)) != 0,
            None => false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calculates_number_of_bytes_needed_for_count_of_packed_bits() {
        assert_eq!(num_bytes_for_bits(7), 1);
        assert_eq!(num_bytes_for_bits(8), 1);
        assert_eq!(num_bytes_for_bits(9), 2);
        assert_eq!(num_bytes_for_bits(15), 2);
        assert_eq!(num_bytes_for_bits(16), 2);
        assert_eq!(num_bytes_for_bits(17), 3);
        assert_eq!(num_bytes_for_bits(0xFFFF), 8192); // ensure that it's free from overflow
    }

    #[test]
    fn byte_counts_must_fit_in_a_u8() {
        assert_eq!(byte_count_for_bits(2000), Ok(250));
        assert_eq!(byte_count_for_registers(125), Ok(250));
        assert_eq!(
            byte_count_for_registers(128),
            Err(InternalError::BadByteCount(256))
        );
    }

    #[test]
    fn packs_least_significant_bit_first() {
        let values = [true, false, true, true, false, false, true, true, true, false];
        assert_eq!(pack_bits(&values).collect::<Vec<u8>>(), vec![0xCD, 0x01]);
    }

    #[test]
    fn unpacks_only_requested_bits() {
        assert_eq!(
            unpack_bits(3, &[0xFD]),
            vec![true, false, true]
        );
        assert_eq!(unpack_bits(9, &[0x00, 0x01]).iter().filter(|x| **x).count(), 1);
    }
}
