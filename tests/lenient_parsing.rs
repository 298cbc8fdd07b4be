//! Property tests for parameter parsing and text decoding.

use proptest::prelude::*;
use serial_session::{BinaryPayload, DataBits, FlowControl, Parity, StopBits, TextEncoding};

proptest! {
    #[test]
    fn test_data_bits_outside_range_fall_back_to_eight(bits in any::<u8>()) {
        let parsed = DataBits::from_bits(bits);
        if (5..=8).contains(&bits) {
            prop_assert_eq!(parsed.bits(), bits);
        } else {
            prop_assert_eq!(parsed, DataBits::Eight);
        }
    }

    #[test]
    fn test_stop_bits_other_than_one_mean_two(bits in any::<u8>()) {
        let expected = if bits == 1 { StopBits::One } else { StopBits::Two };
        prop_assert_eq!(StopBits::from_bits(bits), expected);
    }

    #[test]
    fn test_unknown_names_mean_none(name in "[a-z]{0,12}") {
        prop_assume!(!matches!(name.as_str(), "odd" | "even" | "software" | "hardware"));
        prop_assert_eq!(name.parse::<Parity>().unwrap(), Parity::None);
        prop_assert_eq!(name.parse::<FlowControl>().unwrap(), FlowControl::None);
    }

    #[test]
    fn test_known_names_ignore_case(upper in any::<bool>()) {
        let case = |s: &str| if upper { s.to_uppercase() } else { s.to_string() };
        prop_assert_eq!(case("Even").parse::<Parity>().unwrap(), Parity::Even);
        prop_assert_eq!(case("odd").parse::<Parity>().unwrap(), Parity::Odd);
        prop_assert_eq!(case("Hardware").parse::<FlowControl>().unwrap(), FlowControl::Hardware);
        prop_assert_eq!(case("software").parse::<FlowControl>().unwrap(), FlowControl::Software);
    }

    #[test]
    fn test_latin1_maps_every_byte(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        let text = TextEncoding::Latin1.decode(&bytes).unwrap();
        let code_points: Vec<u32> = text.chars().map(u32::from).collect();
        let expected: Vec<u32> = bytes.iter().map(|b| u32::from(*b)).collect();
        prop_assert_eq!(code_points, expected);
    }

    #[test]
    fn test_utf8_decoding_never_fails(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        prop_assert!(TextEncoding::Utf8.decode(&bytes).is_ok());
    }

    #[test]
    fn test_ascii_accepts_exactly_seven_bit_input(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        prop_assert_eq!(TextEncoding::Ascii.decode(&bytes).is_ok(), bytes.is_ascii());
    }

    #[test]
    fn test_integer_payloads_accept_only_bytes(values in proptest::collection::vec(-300i64..600, 0..32)) {
        let accepted = BinaryPayload::try_from(values.as_slice()).is_ok();
        prop_assert_eq!(accepted, values.iter().all(|v| (0..=255).contains(v)));
    }
}
