//! Storage types and storage classes of local symbols.

use std::fmt;

/// What a symbol is (`st` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolType
{
    Nil,
    Global,
    Static,
    Param,
    Local,
    Label,
    Proc,
    Block,
    End,
    Member,
    Typedef,
    FileSymbol,
    StaticProc,
    Constant,
    /// A raw value with no known meaning, kept so nothing is lost.
    Unknown(u8),
}

impl SymbolType
{
    /// Decode the 6-bit raw field.
    #[must_use]
    pub fn from_raw(raw: u8) -> Self
    {
        match raw {
            0 => Self::Nil,
            1 => Self::Global,
            2 => Self::Static,
            3 => Self::Param,
            4 => Self::Local,
            5 => Self::Label,
            6 => Self::Proc,
            7 => Self::Block,
            8 => Self::End,
            9 => Self::Member,
            10 => Self::Typedef,
            11 => Self::FileSymbol,
            14 => Self::StaticProc,
            15 => Self::Constant,
            other => Self::Unknown(other),
        }
    }

    /// Upper-case name as printed by symbol table dumpers.
    #[must_use]
    pub fn as_str(&self) -> &'static str
    {
        match self {
            Self::Nil => "NIL",
            Self::Global => "GLOBAL",
            Self::Static => "STATIC",
            Self::Param => "PARAM",
            Self::Local => "LOCAL",
            Self::Label => "LABEL",
            Self::Proc => "PROC",
            Self::Block => "BLOCK",
            Self::End => "END",
            Self::Member => "MEMBER",
            Self::Typedef => "TYPEDEF",
            Self::FileSymbol => "FILE_SYMBOL",
            Self::StaticProc => "STATICPROC",
            Self::Constant => "CONSTANT",
            Self::Unknown(_) => "UNKNOWN",
        }
    }
}

impl fmt::Display for SymbolType
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            Self::Unknown(raw) => write!(f, "UNKNOWN({raw})"),
            known => f.write_str(known.as_str()),
        }
    }
}

/// Where a symbol lives (`sc` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolClass
{
    Nil,
    Text,
    Data,
    Bss,
    Register,
    Abs,
    Undefined,
    Local,
    Bits,
    Dbx,
    RegImage,
    Info,
    UserStruct,
    SData,
    SBss,
    RData,
    Var,
    Common,
    SCommon,
    VarRegister,
    Variant,
    SUndefined,
    Init,
    BasedVar,
    XData,
    PData,
    Fini,
    NonGp,
    Unknown(u8),
}

impl SymbolClass
{
    /// Decode the 5-bit raw field.
    #[must_use]
    pub fn from_raw(raw: u8) -> Self
    {
        match raw {
            0 => Self::Nil,
            1 => Self::Text,
            2 => Self::Data,
            3 => Self::Bss,
            4 => Self::Register,
            5 => Self::Abs,
            6 => Self::Undefined,
            7 => Self::Local,
            8 => Self::Bits,
            9 => Self::Dbx,
            10 => Self::RegImage,
            11 => Self::Info,
            12 => Self::UserStruct,
            13 => Self::SData,
            14 => Self::SBss,
            15 => Self::RData,
            16 => Self::Var,
            17 => Self::Common,
            18 => Self::SCommon,
            19 => Self::VarRegister,
            20 => Self::Variant,
            21 => Self::SUndefined,
            22 => Self::Init,
            23 => Self::BasedVar,
            24 => Self::XData,
            25 => Self::PData,
            26 => Self::Fini,
            27 => Self::NonGp,
            other => Self::Unknown(other),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str
    {
        match self {
            Self::Nil => "NIL",
            Self::Text => "TEXT",
            Self::Data => "DATA",
            Self::Bss => "BSS",
            Self::Register => "REGISTER",
            Self::Abs => "ABS",
            Self::Undefined => "UNDEFINED",
            Self::Local => "LOCAL",
            Self::Bits => "BITS",
            Self::Dbx => "DBX",
            Self::RegImage => "REG_IMAGE",
            Self::Info => "INFO",
            Self::UserStruct => "USER_STRUCT",
            Self::SData => "SDATA",
            Self::SBss => "SBSS",
            Self::RData => "RDATA",
            Self::Var => "VAR",
            Self::Common => "COMMON",
            Self::SCommon => "SCOMMON",
            Self::VarRegister => "VAR_REGISTER",
            Self::Variant => "VARIANT",
            Self::SUndefined => "SUNDEFINED",
            Self::Init => "INIT",
            Self::BasedVar => "BASED_VAR",
            Self::XData => "XDATA",
            Self::PData => "PDATA",
            Self::Fini => "FINI",
            Self::NonGp => "NONGP",
            Self::Unknown(_) => "UNKNOWN",
        }
    }
}

impl fmt::Display for SymbolClass
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            Self::Unknown(raw) => write!(f, "UNKNOWN({raw})"),
            known => f.write_str(known.as_str()),
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_symbol_type_round_trips_known_values()
    {
        for raw in 0..64u8 {
            let decoded = SymbolType::from_raw(raw);
            if matches!(raw, 12 | 13) || raw > 15 {
                assert_eq!(decoded, SymbolType::Unknown(raw));
            } else {
                assert_ne!(decoded.as_str(), "UNKNOWN");
            }
        }
    }

    #[test]
    fn test_symbol_class_names()
    {
        assert_eq!(SymbolClass::from_raw(1).to_string(), "TEXT");
        assert_eq!(SymbolClass::from_raw(27).to_string(), "NONGP");
        assert_eq!(SymbolClass::from_raw(31).to_string(), "UNKNOWN(31)");
    }
}
