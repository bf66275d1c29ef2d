pub mod enums;
pub mod message;
pub mod name;
pub mod rdata;
pub mod rrset;

pub use enums::{Opcode, RRClass, RRType, Rcode};
pub use message::{Message, Question, Section};
pub use name::{Name, NameError, NameRelation};
pub use rdata::Rdata;
pub use rrset::{RRset, RdataMismatch};
