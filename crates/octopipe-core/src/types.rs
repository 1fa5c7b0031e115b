use crate::error::{OctopipeError, Result};
use std::fmt;

fn join_valid(names: impl Iterator<Item = &'static str>) -> String {
    names.collect::<Vec<_>>().join(",")
}

// ---------------------------------------------------------------------------
// ScopeDimension
// ---------------------------------------------------------------------------

/// A dimension a variable value can be scoped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScopeDimension {
    Environment,
    Machine,
    Role,
    TenantTag,
    Channel,
    Action,
}

impl ScopeDimension {
    pub fn all() -> &'static [ScopeDimension] {
        &[
            ScopeDimension::Environment,
            ScopeDimension::Machine,
            ScopeDimension::Role,
            ScopeDimension::TenantTag,
            ScopeDimension::Channel,
            ScopeDimension::Action,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScopeDimension::Environment => "Environment",
            ScopeDimension::Machine => "Machine",
            ScopeDimension::Role => "Role",
            ScopeDimension::TenantTag => "TenantTag",
            ScopeDimension::Channel => "Channel",
            ScopeDimension::Action => "Action",
        }
    }

    /// Tenant tags have no display name separate from their canonical ID.
    pub fn matches_by_id(self) -> bool {
        self == ScopeDimension::TenantTag
    }

    pub fn valid_list() -> String {
        join_valid(Self::all().iter().map(|d| d.as_str()))
    }
}

impl fmt::Display for ScopeDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ScopeDimension {
    type Err = OctopipeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ScopeDimension::all()
            .iter()
            .copied()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| OctopipeError::UnknownScopeDimension(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// VariableType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VariableType {
    AzureAccount,
    AwsAccount,
    Certificate,
    #[default]
    String,
}

impl VariableType {
    pub fn all() -> &'static [VariableType] {
        &[
            VariableType::AzureAccount,
            VariableType::AwsAccount,
            VariableType::Certificate,
            VariableType::String,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VariableType::AzureAccount => "AzureAccount",
            VariableType::AwsAccount => "AWSAccount",
            VariableType::Certificate => "Certificate",
            VariableType::String => "String",
        }
    }

    /// Validate the raw `type` of variable `variable`. Empty means `String`.
    pub fn parse_for(variable: &str, raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Ok(VariableType::String);
        }
        VariableType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == raw)
            .ok_or_else(|| OctopipeError::InvalidVariableType {
                variable: variable.to_string(),
                value: raw.to_string(),
                valid: join_valid(Self::all().iter().map(|t| t.as_str())),
            })
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ScriptSyntax
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptSyntax {
    PowerShell,
    Bash,
    CSharp,
    FSharp,
}

impl ScriptSyntax {
    pub fn all() -> &'static [ScriptSyntax] {
        &[
            ScriptSyntax::PowerShell,
            ScriptSyntax::Bash,
            ScriptSyntax::CSharp,
            ScriptSyntax::FSharp,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScriptSyntax::PowerShell => "PowerShell",
            ScriptSyntax::Bash => "Bash",
            ScriptSyntax::CSharp => "CSharp",
            ScriptSyntax::FSharp => "FSharp",
        }
    }

    /// File extension used when a script body is written to disk.
    pub fn extension(self) -> &'static str {
        match self {
            ScriptSyntax::PowerShell => "ps1",
            ScriptSyntax::Bash => "sh",
            ScriptSyntax::CSharp => "csx",
            ScriptSyntax::FSharp => "fsx",
        }
    }

    /// Case-sensitive lookup, as the remote service expects the exact names.
    pub fn parse_for(step: &str, raw: &str) -> Result<Self> {
        ScriptSyntax::all()
            .iter()
            .copied()
            .find(|s| s.as_str() == raw)
            .ok_or_else(|| OctopipeError::InvalidScriptSyntax {
                step: step.to_string(),
                value: raw.to_string(),
                valid: join_valid(Self::all().iter().map(|s| s.as_str())),
            })
    }
}

impl fmt::Display for ScriptSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TenancyMode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TenancyMode {
    Tenanted,
    #[default]
    Untenanted,
    TenantedOrUntenanted,
}

impl TenancyMode {
    pub fn all() -> &'static [TenancyMode] {
        &[
            TenancyMode::Tenanted,
            TenancyMode::Untenanted,
            TenancyMode::TenantedOrUntenanted,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TenancyMode::Tenanted => "Tenanted",
            TenancyMode::Untenanted => "Untenanted",
            TenancyMode::TenantedOrUntenanted => "TenantedOrUntenanted",
        }
    }
}

impl fmt::Display for TenancyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TenancyMode {
    type Err = OctopipeError;

    /// An empty string means the default, `Untenanted`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(TenancyMode::default());
        }
        TenancyMode::all()
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| OctopipeError::InvalidTenancy {
                value: s.to_string(),
                valid: join_valid(Self::all().iter().map(|m| m.as_str())),
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
