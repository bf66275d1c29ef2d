use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use super::ZoneLabel;
use super::apply::do_update;
use super::prereq::check_prerequisites;
use crate::dns::{Message, Name, RRClass, RRType, Rcode, Section};
use crate::zone::{DataSource, ZoneConfig, ZoneRole};

/// Result of handling an update request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The update was granted and committed; a NOERROR response is ready.
    Success,
    /// Something failed; an error response with the right rcode is ready.
    Error,
    /// No response must be sent. The core never produces this itself;
    /// it is reserved for ACL integration.
    Drop,
}

/// A failure raised while handling an update request, carrying what the
/// caller needs to log and respond: the rcode for the response, the zone
/// when it was already identified, and a flag suppressing the generic
/// error log for cases that were already logged (or are non-issues).
#[derive(Debug, Error)]
#[error("{msg}")]
pub struct SessionError {
    pub msg: String,
    pub zname: Option<Name>,
    pub zclass: Option<RRClass>,
    pub rcode: Rcode,
    pub nolog: bool,
}

impl SessionError {
    fn new(msg: impl Into<String>, rcode: Rcode) -> Self {
        SessionError {
            msg: msg.into(),
            zname: None,
            zclass: None,
            rcode,
            nolog: false,
        }
    }

    fn quiet(msg: impl Into<String>, zname: Name, zclass: RRClass, rcode: Rcode) -> Self {
        SessionError {
            msg: msg.into(),
            zname: Some(zname),
            zclass: Some(zclass),
            rcode,
            nolog: true,
        }
    }
}

/// Protocol handling for a single dynamic update request.
///
/// A session is created per request and drives the RFC 2136 phases in
/// order: zone resolution, prerequisite evaluation, prescan, update
/// application, commit. After [`handle`](UpdateSession::handle) the
/// message has been transformed in place into the response (except on
/// Drop) and can be retrieved for sending.
pub struct UpdateSession {
    message: Message,
    client_addr: SocketAddr,
    zone_config: Arc<ZoneConfig>,
}

impl UpdateSession {
    pub fn new(message: Message, client_addr: SocketAddr, zone_config: Arc<ZoneConfig>) -> Self {
        UpdateSession {
            message,
            client_addr,
            zone_config,
        }
    }

    /// The request message, or, after `handle()`, the response.
    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn into_message(self) -> Message {
        self.message
    }

    /// Process the update. On Success the zone's name and class are
    /// returned alongside; on Error they are present only when the
    /// failure happened after the zone was resolved.
    pub fn handle(&mut self) -> (UpdateOutcome, Option<Name>, Option<RRClass>) {
        match self.resolve_zone() {
            Ok((datasrc, zname, zclass)) => {
                let prereq_rcode = check_prerequisites(
                    datasrc.as_ref(),
                    &self.message,
                    &zname,
                    zclass,
                    self.client_addr,
                );
                if prereq_rcode != Rcode::NoError {
                    self.make_response(prereq_rcode);
                    return (UpdateOutcome::Error, Some(zname), Some(zclass));
                }

                let update_rcode =
                    do_update(&datasrc, &self.message, &zname, zclass, self.client_addr);
                if update_rcode != Rcode::NoError {
                    self.make_response(update_rcode);
                    return (UpdateOutcome::Error, Some(zname), Some(zclass));
                }

                self.make_response(Rcode::NoError);
                (UpdateOutcome::Success, Some(zname), Some(zclass))
            }
            Err(e) => {
                if !e.nolog {
                    debug!(client = %self.client_addr, error = %e, "update error");
                }
                self.make_response(e.rcode);
                (UpdateOutcome::Error, None, None)
            }
        }
    }

    /// Validate the zone section and resolve the zone it names to a data
    /// source this server is primary for.
    fn resolve_zone(&self) -> Result<(Arc<dyn DataSource>, Name, RRClass), SessionError> {
        let n_zones = self.message.rr_count(Section::Zone);
        if n_zones != 1 {
            return Err(SessionError::new(
                format!("invalid number of records in zone section: {}", n_zones),
                Rcode::FormErr,
            ));
        }
        let zrecord = &self.message.question()[0];
        if zrecord.rtype != RRType::SOA {
            return Err(SessionError::new(
                "update zone section contains non-SOA",
                Rcode::FormErr,
            ));
        }

        let zname = zrecord.name.clone();
        let zclass = zrecord.class;
        match self.zone_config.find_zone(&zname, zclass) {
            (ZoneRole::Primary, Some(datasrc)) => Ok((datasrc, zname, zclass)),
            (ZoneRole::Secondary, _) => {
                // update forwarding is unsupported, report 'not implemented'
                debug!(client = %self.client_addr, zone = %ZoneLabel(&zname, zclass),
                       "secondary zone, cannot forward update");
                Err(SessionError::quiet("forward", zname, zclass, Rcode::NotImp))
            }
            _ => {
                debug!(client = %self.client_addr, zone = %ZoneLabel(&zname, zclass),
                       "update for a zone not served here");
                Err(SessionError::quiet("notauth", zname, zclass, Rcode::NotAuth))
            }
        }
    }

    /// Transform the request into the response (RFC 2136 section 3.8):
    /// all sections are cleared, including the zone section, and the
    /// rcode is set.
    fn make_response(&mut self, rcode: Rcode) {
        self.message.make_response();
        self.message.clear_section(Section::Zone);
        self.message.set_rcode(rcode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::{Question, RRset, Rdata};
    use crate::zone::ZoneStore;

    fn name(s: &str) -> Name {
        s.parse().unwrap()
    }

    fn client() -> SocketAddr {
        "192.0.2.53:53000".parse().unwrap()
    }

    fn config_with_example_org() -> Arc<ZoneConfig> {
        let store = ZoneStore::new();
        let apex = name("example.org");
        let soa = RRset::from_rdata(
            apex.clone(),
            3600,
            Rdata::soa(
                RRClass::IN,
                &name("ns1.example.org"),
                &name("admin.example.org"),
                1000,
                3600,
                900,
                604800,
                86400,
            ),
        );
        let ns = RRset::from_rdata(
            apex.clone(),
            3600,
            Rdata::ns(RRClass::IN, &name("ns1.example.org")),
        );
        store
            .add_zone(apex.clone(), RRClass::IN, vec![soa, ns])
            .unwrap();

        let mut config = ZoneConfig::new();
        config.add_primary(apex, RRClass::IN, Arc::new(store));
        config.add_secondary(name("secondary.example"), RRClass::IN);
        Arc::new(config)
    }

    fn soa_question(zone: &str) -> Question {
        Question::new(name(zone), RRClass::IN, RRType::SOA)
    }

    #[test]
    fn test_empty_zone_section_is_formerr() {
        let msg = Message::update(1);
        let mut session = UpdateSession::new(msg, client(), config_with_example_org());
        let (outcome, zname, zclass) = session.handle();
        assert_eq!(outcome, UpdateOutcome::Error);
        assert!(zname.is_none() && zclass.is_none());
        assert_eq!(session.message().rcode(), Rcode::FormErr);
        assert!(session.message().is_response());
    }

    #[test]
    fn test_two_zone_records_is_formerr() {
        let mut msg = Message::update(1);
        msg.push_question(soa_question("a.example"));
        msg.push_question(soa_question("b.example"));
        let mut session = UpdateSession::new(msg, client(), config_with_example_org());
        let (outcome, _, _) = session.handle();
        assert_eq!(outcome, UpdateOutcome::Error);
        assert_eq!(session.message().rcode(), Rcode::FormErr);
    }

    #[test]
    fn test_non_soa_zone_record_is_formerr() {
        let mut msg = Message::update(1);
        msg.push_question(Question::new(name("example.org"), RRClass::IN, RRType::A));
        let mut session = UpdateSession::new(msg, client(), config_with_example_org());
        let (outcome, _, _) = session.handle();
        assert_eq!(outcome, UpdateOutcome::Error);
        assert_eq!(session.message().rcode(), Rcode::FormErr);
    }

    #[test]
    fn test_unknown_zone_is_notauth() {
        let mut msg = Message::update(1);
        msg.push_question(soa_question("example.com"));
        let mut session = UpdateSession::new(msg, client(), config_with_example_org());
        let (outcome, zname, _) = session.handle();
        assert_eq!(outcome, UpdateOutcome::Error);
        assert!(zname.is_none());
        assert_eq!(session.message().rcode(), Rcode::NotAuth);
    }

    #[test]
    fn test_secondary_zone_is_notimp() {
        let mut msg = Message::update(1);
        msg.push_question(soa_question("secondary.example"));
        let mut session = UpdateSession::new(msg, client(), config_with_example_org());
        let (outcome, _, _) = session.handle();
        assert_eq!(outcome, UpdateOutcome::Error);
        assert_eq!(session.message().rcode(), Rcode::NotImp);
    }

    #[test]
    fn test_empty_update_succeeds() {
        let mut msg = Message::update(0x2136);
        msg.push_question(soa_question("example.org"));
        let mut session = UpdateSession::new(msg, client(), config_with_example_org());
        let (outcome, zname, zclass) = session.handle();
        assert_eq!(outcome, UpdateOutcome::Success);
        assert_eq!(zname, Some(name("example.org")));
        assert_eq!(zclass, Some(RRClass::IN));

        let response = session.into_message();
        assert!(response.is_response());
        assert_eq!(response.id(), 0x2136);
        assert_eq!(response.rcode(), Rcode::NoError);
        // every section is cleared, the zone section included
        assert_eq!(response.rr_count(Section::Zone), 0);
        assert_eq!(response.rr_count(Section::Prerequisite), 0);
        assert_eq!(response.rr_count(Section::Update), 0);
        assert_eq!(response.rr_count(Section::Additional), 0);
    }
}
