//! Age classification properties and console intake

use std::io::{Cursor, ErrorKind};

use proptest::prelude::*;
use ride_heart_monitor::intake::{ask_is_ok, prompt_age, ConsoleResponder};
use ride_heart_monitor::{Actor, AgeGroup, MonitorError, Responder, Role};

proptest! {
    #[test]
    fn driver_ages_in_range_classify(age in 18i32..100) {
        let group = AgeGroup::classify(age, Role::Driver).unwrap();
        let expected = if age < 65 { AgeGroup::Adult } else { AgeGroup::Elderly };
        prop_assert_eq!(group, expected);
    }

    #[test]
    fn passenger_ages_in_range_classify(age in 18i32..100) {
        let group = AgeGroup::classify(age, Role::Passenger).unwrap();
        let expected = if age < 65 { AgeGroup::Adult } else { AgeGroup::Elderly };
        prop_assert_eq!(group, expected);
    }

    #[test]
    fn minors_are_rejected_for_both_roles(age in i32::MIN..18) {
        for role in [Role::Driver, Role::Passenger] {
            let rejected = matches!(
                AgeGroup::classify(age, role),
                Err(MonitorError::InvalidAge { age: a, role: r }) if a == age && r == role
            );
            prop_assert!(rejected);
        }
    }

    #[test]
    fn centenarians_are_rejected_for_both_roles(age in 100i32..=i32::MAX) {
        prop_assert!(AgeGroup::classify(age, Role::Driver).is_err());
        prop_assert!(AgeGroup::classify(age, Role::Passenger).is_err());
    }

    #[test]
    fn child_is_never_produced(age in any::<i32>(), driver in any::<bool>()) {
        let role = if driver { Role::Driver } else { Role::Passenger };
        prop_assert_ne!(AgeGroup::classify(age, role).ok(), Some(AgeGroup::Child));
    }
}

#[test]
fn test_classification_boundaries() {
    assert_eq!(AgeGroup::classify(18, Role::Driver).unwrap(), AgeGroup::Adult);
    assert_eq!(AgeGroup::classify(64, Role::Passenger).unwrap(), AgeGroup::Adult);
    assert_eq!(AgeGroup::classify(65, Role::Driver).unwrap(), AgeGroup::Elderly);
    assert_eq!(AgeGroup::classify(99, Role::Passenger).unwrap(), AgeGroup::Elderly);
    assert!(AgeGroup::classify(100, Role::Driver).is_err());
    assert!(AgeGroup::classify(101, Role::Driver).is_err());
    assert!(AgeGroup::classify(17, Role::Passenger).is_err());
}

#[test]
fn test_invalid_age_message_names_the_role() {
    let err = AgeGroup::classify(12, Role::Driver).unwrap_err();
    let msg = err.to_string();
    assert!(msg.starts_with("Invalid age for driver/passenger"), "{msg}");
    assert!(msg.contains("12") && msg.contains("driver"), "{msg}");
}

// ============================================================================
// CONSOLE INTAKE
// ============================================================================

#[test]
fn test_prompt_age_retries_until_valid() {
    let mut input = Cursor::new("abc\n10\n30\n");
    let mut output = Vec::new();

    let (age, group) = prompt_age(&mut input, &mut output, Role::Passenger).expect("valid age");
    assert_eq!((age, group), (30, AgeGroup::Adult));

    let shown = String::from_utf8(output).expect("utf8");
    assert_eq!(shown.matches("Enter the age of the passenger: ").count(), 3);
    assert!(shown.contains("Invalid age for driver/passenger"));
}

#[test]
fn test_prompt_age_fails_when_input_ends() {
    let mut input = Cursor::new("5\n");
    let mut output = Vec::new();

    let err = prompt_age(&mut input, &mut output, Role::Driver).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
}

#[test]
fn test_ask_is_ok_answers() {
    let ask = |text: &str| ask_is_ok(&mut Cursor::new(text.to_string()), &mut Vec::new(), Actor::Driver);

    assert!(ask("y\n"));
    assert!(ask("YES\n"));
    assert!(!ask("n\n"));
    assert!(!ask("maybe\n"));
    assert!(!ask(""));
}

#[test]
fn test_fixed_console_answers() {
    assert!(ConsoleResponder::AssumeOk.is_ok(Actor::Passenger));
    assert!(!ConsoleResponder::AssumeNotOk.is_ok(Actor::Driver));
}
