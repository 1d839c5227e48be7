//! Framing and decoding a mixed capture end to end.

use bytes::Bytes;
use gnsswire_frame::{Chunker, FrameKind};
use gnsswire_proto::ubx::{
    Ack, CfgMsg, CfgNav5, CfgRate, DynModel, NavHpPosLlh, NavPvt, NavSat, NavSvin, SatInfo,
    UbxMessage,
};
use gnsswire_proto::{DecodeError, Message, UbxPayload};

const GGA: &[u8] = b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n";
const RTCM3: &[u8] = &[0xD3, 0x00, 0x03, 0x3E, 0xD0, 0x00, 0xAA, 0xBB, 0xCC];

fn catalogue() -> Vec<UbxMessage> {
    vec![
        UbxMessage::ack(Ack::new(0x06, 0x24)),
        UbxMessage::nak(Ack::new(0x06, 0x01)),
        CfgMsg::poll(0x01, 0x07).into(),
        CfgMsg::set_rate(0x01, 0x14, 5).into(),
        CfgRate {
            meas_rate: 200,
            ..CfgRate::default()
        }
        .into(),
        CfgNav5::dyn_model(DynModel::Stationary).into(),
        NavHpPosLlh {
            itow: 1,
            lon: -1_234_567,
            lat_hp: -9,
            v_acc: 77,
            ..NavHpPosLlh::default()
        }
        .into(),
        NavSvin {
            dur: 300,
            valid: true,
            mean_z_hp: 12,
            ..NavSvin::default()
        }
        .into(),
        NavPvt {
            fix_type: 3,
            num_sv: 9,
            vel_d: 15,
            ..NavPvt::default()
        }
        .into(),
        NavSat {
            itow: 9,
            version: 1,
            svs: vec![SatInfo {
                sv_id: 7,
                cno: 38,
                ..SatInfo::default()
            }],
        }
        .into(),
        UbxMessage::raw(0x0A, 0x04, Bytes::new()),
        UbxMessage::raw(0x02, 0x15, Bytes::from_static(&[9, 8, 7, 6])),
    ]
}

#[test]
fn every_catalogue_entry_roundtrips() {
    for msg in catalogue() {
        let wire = msg.encode().unwrap();
        let decoded = UbxMessage::decode(wire.clone()).unwrap();
        assert_eq!(decoded, msg, "{}", msg.name());

        let again = UbxMessage::decode(decoded.encode().unwrap()).unwrap();
        assert_eq!(again, decoded);
        assert_eq!(again.frame(), Some(&wire));
    }
}

#[test]
fn mixed_stream_decodes_in_order() {
    let mut wire = Vec::new();
    wire.extend_from_slice(GGA);
    wire.extend_from_slice(&[0x00, 0x13]);
    for msg in catalogue() {
        wire.extend_from_slice(&msg.encode().unwrap());
    }
    wire.extend_from_slice(RTCM3);

    let mut chunker = Chunker::new();
    let mut messages = Vec::new();
    for chunk in wire.chunks(7) {
        for frame in chunker.feed(chunk) {
            messages.push(Message::from_frame(frame).unwrap());
        }
    }

    assert_eq!(chunker.discarded(), 2);
    assert_eq!(messages.len(), catalogue().len() + 2);
    assert_eq!(messages[0].kind(), Some(FrameKind::Nmea));
    assert_eq!(messages.last().and_then(Message::kind), Some(FrameKind::Rtcm3));

    let names: Vec<String> = messages[1..=catalogue().len()]
        .iter()
        .map(Message::name)
        .collect();
    let expected: Vec<String> = catalogue().iter().map(UbxMessage::name).collect();
    assert_eq!(names, expected);
}

#[test]
fn corrupt_frame_does_not_stop_the_stream() {
    let mut bad = UbxMessage::from(CfgRate::default()).encode().unwrap().to_vec();
    let last = bad.len() - 1;
    bad[last] ^= 0xFF;

    let mut wire = bad;
    wire.extend_from_slice(GGA);

    let mut chunker = Chunker::new();
    let results: Vec<Result<Message, DecodeError>> = chunker
        .feed(&wire)
        .into_iter()
        .map(Message::from_frame)
        .collect();

    assert_eq!(results.len(), 2);
    assert!(results[0].as_ref().unwrap_err().is_checksum());
    assert!(matches!(results[1], Ok(Message::Nmea(_))));
}

#[test]
fn ack_payload_reaches_caller() {
    let wire = [0xB5, 0x62, 0x05, 0x01, 0x02, 0x00, 0x06, 0x01, 0x0F, 0x38];
    let frames = Chunker::new().feed(&wire);
    let msg = Message::from_frame(frames[0].clone()).unwrap();

    match msg.as_ubx().map(UbxMessage::payload) {
        Some(UbxPayload::AckAck(ack)) => assert!(ack.answers(0x06, 0x01)),
        other => panic!("unexpected {other:?}"),
    }
}
