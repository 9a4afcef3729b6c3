//! Decode-time configuration.

use std::fmt;
use std::str::FromStr;

/// When color channels are converted from sRGB to linear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinearizePolicy {
    /// Linearize every non-alpha channel, whatever the header says.
    #[default]
    Always,
    /// Linearize only textures whose format is flagged sRGB.
    RespectSrgbFlag,
}

/// How BC6H blocks are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Bc6hSignedness {
    /// Decode every BC6H texture as signed half floats.
    #[default]
    AssumeSigned,
    /// Use the signedness declared by the container (SF16 vs UF16).
    FromContainer,
}

/// Options applied to every texture a [`crate::BcnLoader`] decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    pub linearize: LinearizePolicy,
    pub bc6h: Bc6hSignedness,
}

impl DecodeOptions {
    pub fn with_linearize(mut self, linearize: LinearizePolicy) -> Self {
        self.linearize = linearize;
        self
    }

    pub fn with_bc6h(mut self, bc6h: Bc6hSignedness) -> Self {
        self.bc6h = bc6h;
        self
    }
}

impl fmt::Display for LinearizePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LinearizePolicy::Always => "always",
            LinearizePolicy::RespectSrgbFlag => "srgb-flag",
        })
    }
}

impl FromStr for LinearizePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "always" => Ok(LinearizePolicy::Always),
            "srgb-flag" => Ok(LinearizePolicy::RespectSrgbFlag),
            other => Err(format!("unknown linearize policy '{other}' (expected always or srgb-flag)")),
        }
    }
}

impl fmt::Display for Bc6hSignedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Bc6hSignedness::AssumeSigned => "signed",
            Bc6hSignedness::FromContainer => "container",
        })
    }
}

impl FromStr for Bc6hSignedness {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "signed" => Ok(Bc6hSignedness::AssumeSigned),
            "container" => Ok(Bc6hSignedness::FromContainer),
            other => Err(format!("unknown BC6H mode '{other}' (expected signed or container)")),
        }
    }
}
