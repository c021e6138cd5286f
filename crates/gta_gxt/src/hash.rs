//! Key hashing shared by every reader, writer and lookup.

use crc::{Crc, CRC_32_ISO_HDLC};

/// Reflected 0xEDB88320 polynomial, seeded with 0xFFFFFFFF and complemented at the end
static KEY_CRC: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Hash a key name into the 32 bit identifier used to address entries.
///
/// The name is upper-cased before hashing so lookups are case-insensitive. Characters
/// outside of ASCII are hashed as `?`, which is how they are stored in key records.
///
/// ```
/// use gta_gxt::hash::key_hash;
///
/// assert_eq!(key_hash("main"), key_hash("MAIN"));
/// assert_eq!(key_hash(""), 0);
/// ```
pub fn key_hash(name: &str) -> u32 {
    if name.is_empty() {
        return 0;
    }

    let mut digest = KEY_CRC.digest();
    for c in name.chars() {
        digest.update(&[ascii_upper(c)]);
    }
    digest.finalize()
}

/// Same as [`key_hash`], treating an absent name as empty.
pub fn key_hash_opt(name: Option<&str>) -> u32 {
    name.map_or(0, key_hash)
}

fn ascii_upper(c: char) -> u8 {
    if c.is_ascii() {
        c.to_ascii_uppercase() as u8
    } else {
        b'?'
    }
}
