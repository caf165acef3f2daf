//! Identifier primitives used across the node.

use core::{
    fmt,
    str,
};

/// A 32-byte identifier, displayed as lowercase hex.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bytes32([u8; 32]);

/// Transaction identity: content hash excluding witness data.
pub type Txid = Bytes32;
/// Transaction identity: content hash including witness data.
pub type Wtxid = Bytes32;

impl Bytes32 {
    /// The length of the identifier in bytes.
    pub const LEN: usize = 32;

    /// Wrap raw bytes.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The all-zero identifier.
    pub const fn zeroed() -> Self {
        Self([0; 32])
    }

    /// Borrow the raw bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Generate a random identifier.
    #[cfg(any(test, feature = "test-helpers"))]
    pub fn random(rng: &mut impl rand::Rng) -> Self {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }
}

impl From<[u8; 32]> for Bytes32 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Bytes32 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Bytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Bytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bytes32({})", hex::encode(self.0))
    }
}

impl str::FromStr for Bytes32 {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

/// A reference to a specific output of a prior transaction.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutPoint {
    txid: Txid,
    vout: u32,
}

impl OutPoint {
    /// Create an outpoint referencing output `vout` of `txid`.
    pub const fn new(txid: Txid, vout: u32) -> Self {
        Self { txid, vout }
    }

    /// The transaction that created the output.
    pub const fn txid(&self) -> &Txid {
        &self.txid
    }

    /// The output index within the creating transaction.
    pub const fn vout(&self) -> u32 {
        self.vout
    }

    /// Generate an outpoint referencing a random, nonexistent transaction.
    #[cfg(any(test, feature = "test-helpers"))]
    pub fn random(rng: &mut impl rand::Rng) -> Self {
        Self {
            txid: Txid::random(rng),
            vout: 0,
        }
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.vout)
    }
}

impl fmt::Debug for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OutPoint({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;

    #[test]
    fn bytes32_hex_round_trip() {
        let mut rng = rand::thread_rng();
        let id = Bytes32::random(&mut rng);
        let parsed = Bytes32::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn bytes32_accepts_0x_prefix() {
        let id = Bytes32::from_str(
            "0x0000000000000000000000000000000000000000000000000000000000000001",
        )
        .unwrap();
        assert_eq!(id.as_slice()[31], 1);
    }
}
