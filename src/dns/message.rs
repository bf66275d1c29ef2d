use super::enums::{Opcode, RRClass, RRType, Rcode};
use super::name::Name;
use super::rrset::RRset;

/// Logical message section. In update semantics the question section is
/// the zone section, answers hold prerequisites, and the authority
/// section holds the update list (RFC 2136 section 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Zone,
    Prerequisite,
    Update,
    Additional,
}

/// A zone-section entry: one owner name with a class and type. The
/// engine requires exactly one of these, of type SOA.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub name: Name,
    pub class: RRClass,
    pub rtype: RRType,
}

impl Question {
    pub fn new(name: Name, class: RRClass, rtype: RRType) -> Self {
        Question { name, class, rtype }
    }
}

/// A parsed DNS message reduced to its logical content: header fields the
/// engine cares about plus the four sections. Wire parsing and rendering
/// live with the caller.
#[derive(Debug, Clone)]
pub struct Message {
    id: u16,
    opcode: Opcode,
    qr: bool,
    rcode: Rcode,
    questions: Vec<Question>,
    records: [Vec<RRset>; 3],
}

fn record_index(section: Section) -> Option<usize> {
    match section {
        Section::Zone => None,
        Section::Prerequisite => Some(0),
        Section::Update => Some(1),
        Section::Additional => Some(2),
    }
}

impl Message {
    pub fn new(id: u16, opcode: Opcode) -> Self {
        Message {
            id,
            opcode,
            qr: false,
            rcode: Rcode::NoError,
            questions: Vec::new(),
            records: [Vec::new(), Vec::new(), Vec::new()],
        }
    }

    /// A fresh UPDATE request message.
    pub fn update(id: u16) -> Self {
        Self::new(id, Opcode::Update)
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn is_response(&self) -> bool {
        self.qr
    }

    pub fn rcode(&self) -> Rcode {
        self.rcode
    }

    pub fn set_rcode(&mut self, rcode: Rcode) {
        self.rcode = rcode;
    }

    pub fn push_question(&mut self, question: Question) {
        self.questions.push(question);
    }

    /// Append an RRset to a section. A push to the zone section is
    /// folded into a question entry, since zone records carry no data.
    pub fn push_rrset(&mut self, section: Section, rrset: RRset) {
        match record_index(section) {
            Some(idx) => self.records[idx].push(rrset),
            None => self.questions.push(Question::new(
                rrset.name().clone(),
                rrset.class(),
                rrset.rtype(),
            )),
        }
    }

    pub fn question(&self) -> &[Question] {
        &self.questions
    }

    /// The RRsets of a record section. The zone section holds questions,
    /// not records; asking for it yields an empty slice.
    pub fn section(&self, section: Section) -> &[RRset] {
        match record_index(section) {
            Some(idx) => &self.records[idx],
            None => &[],
        }
    }

    /// Number of wire records in a section. An empty RRset counts as one
    /// record: on the wire it was a single RR with no data (deletion
    /// sentinel).
    pub fn rr_count(&self, section: Section) -> usize {
        match record_index(section) {
            Some(idx) => self.records[idx]
                .iter()
                .map(|rrset| rrset.rdata_count().max(1))
                .sum(),
            None => self.questions.len(),
        }
    }

    /// Turn the request into a response in place: the QR bit is set and
    /// the record sections are dropped; the question section survives
    /// until explicitly cleared.
    pub fn make_response(&mut self) {
        self.qr = true;
        for records in &mut self.records {
            records.clear();
        }
    }

    pub fn clear_section(&mut self, section: Section) {
        match record_index(section) {
            Some(idx) => self.records[idx].clear(),
            None => self.questions.clear(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::rdata::Rdata;

    fn name(s: &str) -> Name {
        s.parse().unwrap()
    }

    fn a_rrset(owner: &str, addr: &str) -> RRset {
        RRset::from_rdata(
            name(owner),
            300,
            Rdata::a(RRClass::IN, addr.parse().unwrap()),
        )
    }

    #[test]
    fn test_sections_are_distinct() {
        let mut msg = Message::update(0x1234);
        msg.push_question(Question::new(name("example.org"), RRClass::IN, RRType::SOA));
        msg.push_rrset(Section::Prerequisite, a_rrset("www.example.org", "192.0.2.1"));
        msg.push_rrset(Section::Update, a_rrset("www.example.org", "192.0.2.2"));

        assert_eq!(msg.rr_count(Section::Zone), 1);
        assert_eq!(msg.rr_count(Section::Prerequisite), 1);
        assert_eq!(msg.rr_count(Section::Update), 1);
        assert_eq!(msg.rr_count(Section::Additional), 0);
        assert!(msg.section(Section::Zone).is_empty());
    }

    #[test]
    fn test_empty_rrset_counts_as_one_record() {
        let mut msg = Message::update(1);
        msg.push_rrset(
            Section::Update,
            RRset::new(name("www.example.org"), RRClass::ANY, RRType::A, 0),
        );
        assert_eq!(msg.rr_count(Section::Update), 1);
    }

    #[test]
    fn test_make_response_keeps_question() {
        let mut msg = Message::update(0x1234);
        msg.push_question(Question::new(name("example.org"), RRClass::IN, RRType::SOA));
        msg.push_rrset(Section::Update, a_rrset("www.example.org", "192.0.2.2"));

        msg.make_response();
        assert!(msg.is_response());
        assert_eq!(msg.id(), 0x1234);
        assert_eq!(msg.rr_count(Section::Update), 0);
        assert_eq!(msg.rr_count(Section::Zone), 1);

        msg.clear_section(Section::Zone);
        assert_eq!(msg.rr_count(Section::Zone), 0);
    }
}
