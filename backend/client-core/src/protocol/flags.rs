use std::fmt::{Display, Formatter, Result as FormatResult};
use std::ops::{BitOr, BitOrAssign};

/// Capability bits of the client `Hello` packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HelloFlags(u8);

impl HelloFlags {
    pub const NONE: HelloFlags = HelloFlags(0);
    /// Full session rather than a probe.
    pub const LOGIN: HelloFlags = HelloFlags(1);
    pub const MOBILE: HelloFlags = HelloFlags(1 << 1);
    pub const WEB: HelloFlags = HelloFlags(1 << 2);
    /// No profile id follows.
    pub const GUEST: HelloFlags = HelloFlags(1 << 3);

    pub const fn from_bits(bits: u8) -> Self {
        HelloFlags(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: HelloFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Device bits for this client: always WEB, plus MOBILE when asked.
    pub fn device(mobile: bool) -> Self {
        if mobile {
            HelloFlags::WEB | HelloFlags::MOBILE
        } else {
            HelloFlags::WEB
        }
    }
}

impl BitOr for HelloFlags {
    type Output = HelloFlags;

    fn bitor(self, rhs: HelloFlags) -> HelloFlags {
        HelloFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for HelloFlags {
    fn bitor_assign(&mut self, rhs: HelloFlags) {
        self.0 |= rhs.0;
    }
}

impl Display for HelloFlags {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        let names: Vec<&str> = [
            (HelloFlags::LOGIN, "LOGIN"),
            (HelloFlags::MOBILE, "MOBILE"),
            (HelloFlags::WEB, "WEB"),
            (HelloFlags::GUEST, "GUEST"),
        ]
        .into_iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, name)| name)
        .collect();
        if names.is_empty() {
            write!(formatter, "NONE")
        } else {
            write!(formatter, "{}", names.join("|"))
        }
    }
}
