//! Integration tests for CommandDecoder

mod common;
use common::*;

use dimmer_core::{ChannelState, CommandDecoder, DecodeError, Error, Instruction, Opcode};
use proptest::prelude::*;

#[test]
fn poll_returns_none_on_empty_transport() {
    let mut serial = MockSerial::new();
    let mut decoder = CommandDecoder::<4>::new();
    assert_eq!(decoder.poll(&mut serial), Ok(None));
}

#[test]
fn poll_stops_after_one_instruction() {
    let mut serial = MockSerial::new();
    serial.receive(&[0x00, 0x03, 0x04]);

    let mut decoder = CommandDecoder::<4>::new();
    assert_eq!(decoder.poll(&mut serial), Ok(Some(Instruction::Identify)));
    assert_eq!(serial.pending(), 2);
    assert_eq!(decoder.poll(&mut serial), Ok(Some(Instruction::EnableDebug)));
    assert_eq!(decoder.poll(&mut serial), Ok(Some(Instruction::CancelInterpolation)));
    assert_eq!(decoder.poll(&mut serial), Ok(None));
}

#[test]
fn poll_reports_unknown_opcode_then_continues() {
    let mut serial = MockSerial::new();
    serial.receive(&[0xEE, 0x05, 0x00]);

    let mut decoder = CommandDecoder::<4>::new();
    assert_eq!(
        decoder.poll(&mut serial),
        Err(Error::Decode(DecodeError::UnknownOpcode(0xEE)))
    );
    assert_eq!(serial.pending(), 2);
    assert_eq!(decoder.poll(&mut serial), Ok(Some(Instruction::RelayControl(false))));
}

#[test]
fn schedule_payload_split_across_polls() {
    let mut serial = MockSerial::new();
    let mut decoder = CommandDecoder::<4>::new();
    let frame = [
        0x02, 0x00, 0x00, 0x00, 0x0F, 0x00, 0x00, 0x0F, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0xFF, 0xFF,
        0x00, 0x00,
    ];

    serial.receive(&frame[..3]);
    assert_eq!(decoder.poll(&mut serial), Ok(None));
    assert_eq!(decoder.pending_opcode(), Some(Opcode::ScheduleInterpolate));
    assert_eq!(decoder.buffered(), 2);

    serial.receive(&frame[3..10]);
    assert_eq!(decoder.poll(&mut serial), Ok(None));

    serial.receive(&frame[10..]);
    assert_eq!(
        decoder.poll(&mut serial),
        Ok(Some(Instruction::ScheduleInterpolate {
            delay_ms: 15,
            duration_ms: 4095,
            target: ChannelState::new([0xFFFF, 0x0000, 0xFFFF, 0x0000]),
        }))
    );
    assert!(!decoder.is_mid_instruction());
}

#[test]
fn channel_count_sets_payload_size() {
    let mut decoder = CommandDecoder::<2>::new();
    let (result, used) = decoder.feed_bytes(&[0x01, 0xAB, 0xCD, 0x00, 0x01, 0x04]);
    assert_eq!(
        result,
        Ok(Some(Instruction::ImmediateSet(ChannelState::new([0xABCD, 0x0001]))))
    );
    assert_eq!(used, 5);
}

#[test]
fn misaligned_stream_resynchronizes_on_valid_opcode() {
    // A stray leading byte 0x01 swallows the next eight bytes as payload.
    let mut decoder = CommandDecoder::<4>::new();
    let stream = [0x01, 0x05, 0x01, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x06];

    let (first, used) = decoder.feed_bytes(&stream);
    assert_eq!(
        first,
        Ok(Some(Instruction::ImmediateSet(ChannelState::new([
            0x0501, 0x0400, 0x0000, 0x0000
        ]))))
    );
    assert_eq!(used, 9);

    let (second, _) = decoder.feed_bytes(&stream[used..]);
    assert_eq!(second, Ok(Some(Instruction::ReadStatus)));
}

fn any_instruction() -> impl Strategy<Value = Instruction<4>> {
    let state = any::<[u16; 4]>().prop_map(ChannelState::new);
    prop_oneof![
        Just(Instruction::Identify),
        state.clone().prop_map(Instruction::ImmediateSet),
        (any::<u32>(), any::<u32>(), state).prop_map(|(delay_ms, duration_ms, target)| {
            Instruction::ScheduleInterpolate {
                delay_ms,
                duration_ms,
                target,
            }
        }),
        Just(Instruction::EnableDebug),
        Just(Instruction::CancelInterpolation),
        any::<bool>().prop_map(Instruction::RelayControl),
        Just(Instruction::ReadStatus),
    ]
}

proptest! {
    #[test]
    fn decoding_ignores_how_bytes_are_split(
        instructions in prop::collection::vec(any_instruction(), 1..8),
        split in 1usize..20,
    ) {
        let mut stream = std::vec::Vec::new();
        for instruction in &instructions {
            stream.extend_from_slice(&instruction.encode());
        }

        let mut decoder = CommandDecoder::<4>::new();
        let mut decoded = std::vec::Vec::new();
        for chunk in stream.chunks(split) {
            let mut rest = chunk;
            while !rest.is_empty() {
                let (result, used) = decoder.feed_bytes(rest);
                if let Some(instruction) = result.unwrap() {
                    decoded.push(instruction);
                }
                rest = &rest[used..];
            }
        }

        prop_assert_eq!(decoded, instructions);
        prop_assert!(!decoder.is_mid_instruction());
    }

    #[test]
    fn unknown_opcodes_never_consume_payload(opcode in 7u8..=255) {
        let mut decoder = CommandDecoder::<4>::new();
        let (result, used) = decoder.feed_bytes(&[opcode, 0x04]);
        prop_assert_eq!(result, Err(DecodeError::UnknownOpcode(opcode)));
        prop_assert_eq!(used, 1);
    }
}
