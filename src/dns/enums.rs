use std::fmt;

/// DNS record class, including the update-special pseudo-classes NONE
/// (0xFE) and ANY (0xFF).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RRClass {
    IN,
    CH,
    HS,
    NONE,
    ANY,
    Unknown(u16),
}

impl RRClass {
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => RRClass::IN,
            3 => RRClass::CH,
            4 => RRClass::HS,
            254 => RRClass::NONE,
            255 => RRClass::ANY,
            other => RRClass::Unknown(other),
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            RRClass::IN => 1,
            RRClass::CH => 3,
            RRClass::HS => 4,
            RRClass::NONE => 254,
            RRClass::ANY => 255,
            RRClass::Unknown(code) => *code,
        }
    }

    /// Parse the presentation form used in config files ("IN", "CH", "HS").
    pub fn from_text(text: &str) -> Option<Self> {
        match text.to_uppercase().as_str() {
            "IN" => Some(RRClass::IN),
            "CH" => Some(RRClass::CH),
            "HS" => Some(RRClass::HS),
            _ => None,
        }
    }
}

impl fmt::Display for RRClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RRClass::IN => write!(f, "IN"),
            RRClass::CH => write!(f, "CH"),
            RRClass::HS => write!(f, "HS"),
            RRClass::NONE => write!(f, "NONE"),
            RRClass::ANY => write!(f, "ANY"),
            RRClass::Unknown(code) => write!(f, "CLASS{}", code),
        }
    }
}

/// DNS record type. Only the types the update engine treats specially get
/// named variants; everything else round-trips through `Unknown`.
///
/// The meta-types (TKEY through ANY) occupy the code range 249-255 and are
/// never storable in a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RRType {
    A,
    NS,
    CNAME,
    SOA,
    PTR,
    MX,
    TXT,
    AAAA,
    SRV,
    TKEY,
    TSIG,
    IXFR,
    AXFR,
    MAILB,
    MAILA,
    ANY,
    Unknown(u16),
}

impl RRType {
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => RRType::A,
            2 => RRType::NS,
            5 => RRType::CNAME,
            6 => RRType::SOA,
            12 => RRType::PTR,
            15 => RRType::MX,
            16 => RRType::TXT,
            28 => RRType::AAAA,
            33 => RRType::SRV,
            249 => RRType::TKEY,
            250 => RRType::TSIG,
            251 => RRType::IXFR,
            252 => RRType::AXFR,
            253 => RRType::MAILB,
            254 => RRType::MAILA,
            255 => RRType::ANY,
            other => RRType::Unknown(other),
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            RRType::A => 1,
            RRType::NS => 2,
            RRType::CNAME => 5,
            RRType::SOA => 6,
            RRType::PTR => 12,
            RRType::MX => 15,
            RRType::TXT => 16,
            RRType::AAAA => 28,
            RRType::SRV => 33,
            RRType::TKEY => 249,
            RRType::TSIG => 250,
            RRType::IXFR => 251,
            RRType::AXFR => 252,
            RRType::MAILB => 253,
            RRType::MAILA => 254,
            RRType::ANY => 255,
            RRType::Unknown(code) => *code,
        }
    }
}

impl fmt::Display for RRType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RRType::A => write!(f, "A"),
            RRType::NS => write!(f, "NS"),
            RRType::CNAME => write!(f, "CNAME"),
            RRType::SOA => write!(f, "SOA"),
            RRType::PTR => write!(f, "PTR"),
            RRType::MX => write!(f, "MX"),
            RRType::TXT => write!(f, "TXT"),
            RRType::AAAA => write!(f, "AAAA"),
            RRType::SRV => write!(f, "SRV"),
            RRType::TKEY => write!(f, "TKEY"),
            RRType::TSIG => write!(f, "TSIG"),
            RRType::IXFR => write!(f, "IXFR"),
            RRType::AXFR => write!(f, "AXFR"),
            RRType::MAILB => write!(f, "MAILB"),
            RRType::MAILA => write!(f, "MAILA"),
            RRType::ANY => write!(f, "ANY"),
            RRType::Unknown(code) => write!(f, "TYPE{}", code),
        }
    }
}

/// DNS opcode. The engine only ever sees UPDATE (5) messages; the rest are
/// carried for completeness of the message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Query,
    Status,
    Notify,
    Update,
    Unknown(u8),
}

impl Opcode {
    pub fn code(&self) -> u8 {
        match self {
            Opcode::Query => 0,
            Opcode::Status => 2,
            Opcode::Notify => 4,
            Opcode::Update => 5,
            Opcode::Unknown(code) => *code,
        }
    }
}

/// DNS response code with the standard numeric assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rcode {
    NoError,
    FormErr,
    ServFail,
    NxDomain,
    NotImp,
    Refused,
    YxDomain,
    YxRrset,
    NxRrset,
    NotAuth,
    NotZone,
}

impl Rcode {
    pub fn code(&self) -> u16 {
        match self {
            Rcode::NoError => 0,
            Rcode::FormErr => 1,
            Rcode::ServFail => 2,
            Rcode::NxDomain => 3,
            Rcode::NotImp => 4,
            Rcode::Refused => 5,
            Rcode::YxDomain => 6,
            Rcode::YxRrset => 7,
            Rcode::NxRrset => 8,
            Rcode::NotAuth => 9,
            Rcode::NotZone => 10,
        }
    }
}

impl fmt::Display for Rcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rcode::NoError => write!(f, "NOERROR"),
            Rcode::FormErr => write!(f, "FORMERR"),
            Rcode::ServFail => write!(f, "SERVFAIL"),
            Rcode::NxDomain => write!(f, "NXDOMAIN"),
            Rcode::NotImp => write!(f, "NOTIMP"),
            Rcode::Refused => write!(f, "REFUSED"),
            Rcode::YxDomain => write!(f, "YXDOMAIN"),
            Rcode::YxRrset => write!(f, "YXRRSET"),
            Rcode::NxRrset => write!(f, "NXRRSET"),
            Rcode::NotAuth => write!(f, "NOTAUTH"),
            Rcode::NotZone => write!(f, "NOTZONE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_codes() {
        assert_eq!(RRClass::from_code(1), RRClass::IN);
        assert_eq!(RRClass::from_code(254), RRClass::NONE);
        assert_eq!(RRClass::from_code(255), RRClass::ANY);
        assert_eq!(RRClass::Unknown(42).code(), 42);
        assert_eq!(RRClass::from_text("in"), Some(RRClass::IN));
        assert_eq!(RRClass::from_text("NONE"), None);
    }

    #[test]
    fn test_type_codes_roundtrip() {
        for code in [1u16, 2, 5, 6, 12, 15, 16, 28, 33, 249, 250, 251, 252, 253, 254, 255, 61234] {
            assert_eq!(RRType::from_code(code).code(), code);
        }
    }

    #[test]
    fn test_meta_type_range() {
        // every meta-type sits at or above 249, ANY at the very top
        assert!(RRType::TKEY.code() >= 249);
        assert!(RRType::MAILA.code() <= 254);
        assert_eq!(RRType::ANY.code(), 255);
        assert!(RRType::SOA.code() < 249);
    }

    #[test]
    fn test_rcode_assignments() {
        assert_eq!(Rcode::NoError.code(), 0);
        assert_eq!(Rcode::FormErr.code(), 1);
        assert_eq!(Rcode::ServFail.code(), 2);
        assert_eq!(Rcode::NxDomain.code(), 3);
        assert_eq!(Rcode::NotImp.code(), 4);
        assert_eq!(Rcode::YxDomain.code(), 6);
        assert_eq!(Rcode::YxRrset.code(), 7);
        assert_eq!(Rcode::NxRrset.code(), 8);
        assert_eq!(Rcode::NotAuth.code(), 9);
        assert_eq!(Rcode::NotZone.code(), 10);
        assert_eq!(Rcode::NotZone.to_string(), "NOTZONE");
    }
}
