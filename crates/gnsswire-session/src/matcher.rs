//! Strategies for correlating responses with the active command.

use gnsswire_proto::{Message, UbxPayload};

use crate::command::Command;
use crate::error::CommandError;

/// What a matcher decided about one response.
#[derive(Debug)]
pub enum Verdict<R> {
    /// Not a response to this command; keep waiting.
    Ignore,
    /// The command succeeded with this response.
    Resolve(R),
    /// The command failed.
    Reject(CommandError<R>),
}

/// Decides whether a response settles the active command.
pub trait ResponseMatcher<C, R> {
    fn check(&self, command: &C, response: &R) -> Verdict<R>;
}

impl<C, R, F> ResponseMatcher<C, R> for F
where
    F: Fn(&C, &R) -> Verdict<R>,
{
    fn check(&self, command: &C, response: &R) -> Verdict<R> {
        self(command, response)
    }
}

/// Resolves the active command with whatever arrives first.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptFirst;

impl<C, R: Clone> ResponseMatcher<C, R> for AcceptFirst {
    fn check(&self, _command: &C, response: &R) -> Verdict<R> {
        Verdict::Resolve(response.clone())
    }
}

/// UBX-CFG acknowledgement matching.
///
/// Only configuration commands are acknowledged by the receiver; anything
/// else is rejected as soon as a response is examined. An ACK-ACK or ACK-NAK
/// naming the command's class/id settles it. Everything else is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct AckMatcher;

impl ResponseMatcher<Command, Message> for AckMatcher {
    fn check(&self, command: &Command, response: &Message) -> Verdict<Message> {
        let sent = command.message();
        if !sent.is_cfg() {
            return Verdict::Reject(CommandError::CommandType(format!(
                "{} is not a configuration message",
                sent.name()
            )));
        }

        let Some(ubx) = response.as_ubx() else {
            return Verdict::Ignore;
        };
        match ubx.payload() {
            UbxPayload::AckAck(ack) if ack.answers(sent.class(), sent.id()) => {
                Verdict::Resolve(response.clone())
            }
            UbxPayload::AckNak(ack) if ack.answers(sent.class(), sent.id()) => {
                Verdict::Reject(CommandError::Rejected(Box::new(response.clone())))
            }
            _ => Verdict::Ignore,
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use gnsswire_proto::ubx::{Ack, CfgMsg, CfgRate, UbxMessage};

    use super::*;

    fn ack(class: u8, id: u8) -> Message {
        UbxMessage::ack(Ack::new(class, id)).into()
    }

    fn nak(class: u8, id: u8) -> Message {
        UbxMessage::nak(Ack::new(class, id)).into()
    }

    #[test]
    fn ack_for_command_resolves() {
        let cmd = Command::new(CfgRate::default().into()).unwrap();
        assert!(matches!(
            AckMatcher.check(&cmd, &ack(0x06, 0x08)),
            Verdict::Resolve(_)
        ));
    }

    #[test]
    fn nak_for_command_rejects_with_response() {
        let cmd = Command::new(CfgRate::default().into()).unwrap();
        match AckMatcher.check(&cmd, &nak(0x06, 0x08)) {
            Verdict::Reject(err) => assert_eq!(err.rejection(), Some(&nak(0x06, 0x08))),
            other => panic!("unexpected verdict {other:?}"),
        }
    }

    #[test]
    fn other_responses_are_ignored() {
        let cmd = Command::new(CfgMsg::set_rate(0x01, 0x07, 1).into()).unwrap();
        let nmea = Message::decode(Bytes::from_static(
            b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n",
        ))
        .unwrap();

        for response in [ack(0x06, 0x08), nak(0x06, 0x24), ack(0x01, 0x01), nmea] {
            assert!(matches!(
                AckMatcher.check(&cmd, &response),
                Verdict::Ignore
            ));
        }
    }

    #[test]
    fn non_cfg_command_is_a_type_error() {
        let cmd = Command::new(UbxMessage::raw(0x0A, 0x04, Bytes::new())).unwrap();
        assert!(matches!(
            AckMatcher.check(&cmd, &ack(0x0A, 0x04)),
            Verdict::Reject(CommandError::CommandType(_))
        ));
    }

    #[test]
    fn closures_are_matchers() {
        let matcher = |cmd: &u8, resp: &u8| {
            if cmd == resp {
                Verdict::Resolve(*resp)
            } else {
                Verdict::Ignore
            }
        };
        assert!(matches!(matcher.check(&1, &1), Verdict::Resolve(1)));
        assert!(matches!(matcher.check(&1, &2), Verdict::Ignore));
        assert!(matches!(AcceptFirst.check(&1u8, &9u8), Verdict::Resolve(9)));
    }
}
