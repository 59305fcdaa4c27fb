//! 32-bit ELF string hash.
//!
//! External caches bucket branch paths by this value, so its output must stay
//! bit-for-bit stable across releases.

/// Hash `s` with the classic ELF algorithm over its raw bytes.
pub fn string_hash(s: &str) -> u32 {
    elf_hash(s.as_bytes())
}

pub fn elf_hash(bytes: &[u8]) -> u32 {
    let mut hash: u32 = 0;
    for &c in bytes {
        hash = (hash << 4).wrapping_add(u32::from(c));
        let high = hash & 0xF000_0000;
        if high != 0 {
            hash ^= high >> 24;
        }
        hash &= !high;
    }
    hash
}
