//! CPU architecture detection for binary downloads.

/// Architectures with prebuilt PHP binaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    /// x86_64 / amd64
    X64,
    /// aarch64 / arm64
    Arm64,
}

impl Arch {
    /// Map a machine name (`uname -m`, Rust or Go spelling) to an architecture.
    pub fn from_machine(machine: &str) -> Option<Self> {
        match machine {
            "x86_64" | "amd64" | "x64" => Some(Self::X64),
            "aarch64" | "arm64" => Some(Self::Arm64),
            _ => None,
        }
    }

    /// Key used for this architecture in catalog URL maps.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::X64 => "x64",
            Self::Arm64 => "arm64",
        }
    }
}

impl std::fmt::Display for Arch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}
