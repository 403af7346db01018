use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Set of classification flags attached to one shoebox voxel.
///
/// Flags only accumulate: combining codes with `|` or `|=` never clears a flag that is
/// already set.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaskCode(u8);

impl MaskCode {
    pub const VALID: MaskCode = MaskCode(1 << 0);
    pub const BACKGROUND: MaskCode = MaskCode(1 << 1);
    pub const FOREGROUND: MaskCode = MaskCode(1 << 2);
    pub const STRONG: MaskCode = MaskCode(1 << 3);
    pub const BACKGROUND_USED: MaskCode = MaskCode(1 << 4);
    pub const OVERLAPPED: MaskCode = MaskCode(1 << 5);

    const ALL: [(MaskCode, &'static str); 6] = [
        (Self::VALID, "Valid"),
        (Self::BACKGROUND, "Background"),
        (Self::FOREGROUND, "Foreground"),
        (Self::STRONG, "Strong"),
        (Self::BACKGROUND_USED, "BackgroundUsed"),
        (Self::OVERLAPPED, "Overlapped"),
    ];

    pub const fn empty() -> Self {
        MaskCode(0)
    }

    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Build from raw bits, dropping any bit that is not a known flag.
    pub fn from_bits_truncate(bits: u8) -> Self {
        let known = Self::ALL.iter().fold(0, |acc, (flag, _)| acc | flag.0);
        MaskCode(bits & known)
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// True when every flag of `other` is set in `self`.
    pub const fn contains(&self, other: MaskCode) -> bool {
        self.0 & other.0 == other.0
    }

    /// True when at least one flag of `other` is set in `self`.
    pub const fn intersects(&self, other: MaskCode) -> bool {
        self.0 & other.0 != 0
    }

    pub fn insert(&mut self, other: MaskCode) {
        self.0 |= other.0;
    }
}

impl BitOr for MaskCode {
    type Output = MaskCode;

    fn bitor(self, rhs: MaskCode) -> MaskCode {
        MaskCode(self.0 | rhs.0)
    }
}

impl BitOrAssign for MaskCode {
    fn bitor_assign(&mut self, rhs: MaskCode) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for MaskCode {
    type Output = MaskCode;

    fn bitand(self, rhs: MaskCode) -> MaskCode {
        MaskCode(self.0 & rhs.0)
    }
}

impl fmt::Debug for MaskCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Self::ALL
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if names.is_empty() {
            write!(f, "MaskCode(empty)")
        } else {
            write!(f, "MaskCode({})", names.join(" | "))
        }
    }
}
