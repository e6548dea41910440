use std::fmt;

/// Host platform family a [`super::WindowInfo`] was observed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
    Other(&'static str),
}

impl Platform {
    pub fn current() -> Self {
        Self::from_target_os(std::env::consts::OS)
    }

    pub fn from_target_os(target_os: &'static str) -> Self {
        match target_os {
            "linux" => Self::Linux,
            "macos" => Self::MacOs,
            "windows" => Self::Windows,
            "" => Self::Other("unknown"),
            other => Self::Other(other),
        }
    }

    pub fn identifier(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::MacOs => "darwin",
            Self::Windows => "win32",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.identifier())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_rust_target_names_to_identifiers() {
        assert_eq!(Platform::from_target_os("linux").identifier(), "linux");
        assert_eq!(Platform::from_target_os("macos").identifier(), "darwin");
        assert_eq!(Platform::from_target_os("windows").identifier(), "win32");
        assert_eq!(Platform::from_target_os("freebsd").identifier(), "freebsd");
    }

    #[test]
    fn identifier_is_never_empty() {
        assert_eq!(Platform::from_target_os("").identifier(), "unknown");
        assert!(!Platform::current().identifier().is_empty());
    }
}
