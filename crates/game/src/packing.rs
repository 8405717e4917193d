use byteorder::ByteOrder;
use byteorder::LittleEndian;
use nova_core::Score;
use nova_core::Slot;

/// Pack per-slot scores as concatenated little-endian 32-bit integers.
pub fn pack_scores(scores: &[Score]) -> Vec<u8> {
    let mut bytes = vec![0u8; scores.len() * 4];
    LittleEndian::write_i32_into(scores, &mut bytes);
    bytes
}

/// Score of a 1-based slot, if the packed array covers it.
pub fn unpack_score(bytes: &[u8], slot: Slot) -> Option<Score> {
    if slot < 1 {
        return None;
    }
    let offset = (slot as usize - 1) * 4;
    (bytes.len() >= offset + 4).then(|| LittleEndian::read_i32(&bytes[offset..]))
}

/// All scores in a packed array.
pub fn unpack_scores(bytes: &[u8]) -> Vec<Score> {
    bytes.chunks_exact(4).map(LittleEndian::read_i32).collect()
}

/// Highest score in a packed array, if any.
pub fn max_score(bytes: &[u8]) -> Option<Score> {
    unpack_scores(bytes).into_iter().max()
}

/// Pack per-slot turn statuses as little-endian 16-bit integers.
pub fn pack_turn_statuses(statuses: &[i16]) -> Vec<u8> {
    let mut bytes = vec![0u8; statuses.len() * 2];
    LittleEndian::write_i16_into(statuses, &mut bytes);
    bytes
}

/// Turn status of a 1-based slot, if the packed array covers it.
pub fn unpack_turn_status(bytes: &[u8], slot: Slot) -> Option<i16> {
    if slot < 1 {
        return None;
    }
    let offset = (slot as usize - 1) * 2;
    (bytes.len() >= offset + 2).then(|| LittleEndian::read_i16(&bytes[offset..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_round_trip() {
        let scores = [0, -5, 128, 192, 0x7FFF_FFFF, 0, 0, 0, 0, 0, 7];
        let packed = pack_scores(&scores);
        assert_eq!(packed.len(), 44);
        assert_eq!(unpack_scores(&packed), scores);
        assert_eq!(unpack_score(&packed, 3), Some(128));
        assert_eq!(unpack_score(&packed, 11), Some(7));
        assert_eq!(unpack_score(&packed, 12), None);
        assert_eq!(unpack_score(&packed, 0), None);
        assert_eq!(max_score(&packed), Some(0x7FFF_FFFF));
    }

    #[test]
    fn short_arrays_read_as_missing() {
        let packed = pack_scores(&[10, 20]);
        assert_eq!(unpack_score(&packed, 2), Some(20));
        assert_eq!(unpack_score(&packed, 3), None);
        assert_eq!(max_score(&[]), None);
    }

    #[test]
    fn status_round_trip() {
        let statuses = [0i16, 1, 2, 17, 6, 0, 0, 0, 0, 0, 1];
        let packed = pack_turn_statuses(&statuses);
        assert_eq!(packed.len(), 22);
        assert_eq!(unpack_turn_status(&packed, 4), Some(17));
        assert_eq!(unpack_turn_status(&packed, 11), Some(1));
        assert_eq!(unpack_turn_status(&packed, 12), None);
    }

    #[test]
    fn little_endian_layout() {
        assert_eq!(pack_scores(&[1]), vec![1, 0, 0, 0]);
        assert_eq!(pack_scores(&[256]), vec![0, 1, 0, 0]);
        assert_eq!(pack_turn_statuses(&[256]), vec![0, 1]);
    }
}
