//! Misc utils

use ethers::{
    types::{Address, U256},
    utils::to_checksum,
};

/// Converts address to checksum address
pub fn as_checksum_addr<S>(val: &Address, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_str(&to_checksum(val, None))
}

/// Converts Option address to checksum
pub fn as_checksum_addr_opt<S>(val: &Option<Address>, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    if let Some(addr) = val {
        s.serialize_str(&to_checksum(addr, None))
    } else {
        s.serialize_none()
    }
}

/// Serializes U256 as u64
pub fn as_u64<S>(val: &U256, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_str(&val.as_u64().to_string())
}

/// Serializes u64 as hex string
pub fn as_hex_string<S>(val: &u64, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serde_hex::SerHex::<serde_hex::StrictPfx>::serialize(val, s)
}

/// If possible, parses address from the first 20 bytes
pub fn get_address(buf: &[u8]) -> Option<Address> {
    if buf.len() >= 20 {
        Some(Address::from_slice(&buf[0..20]))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::get_address;
    use ethers::types::Address;

    #[test]
    fn get_address_from_prefix() {
        let addr: Address = "0x95222290DD7278Aa3Ddd389Cc1E1d165CC4BAfe5".parse().unwrap();
        let buf = [addr.as_bytes(), &[0x12, 0x34, 0x56, 0x78]].concat();
        assert_eq!(get_address(&buf), Some(addr));
    }

    #[test]
    fn get_address_none_when_too_short() {
        assert_eq!(get_address(&[0u8; 10]), None);
    }
}
