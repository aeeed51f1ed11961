mod common;

mod tests {
    use myrtio_tapper::{
        Actuator, ActuatorMap, ActuatorState, Button, Duration, TimingPhase,
        degrees_to_pulse_width,
    };

    use crate::common::{Event, Journal, MockDelay, MockLine, actuator_config, arm, lines};

    const MS: u64 = 1_000_000;

    #[test]
    fn test_pulse_width_range() {
        assert_eq!(degrees_to_pulse_width(0.0), 500);
        assert_eq!(degrees_to_pulse_width(90.0), 1500);
        assert_eq!(degrees_to_pulse_width(180.0), 2500);
    }

    #[test]
    fn test_pulse_width_clamps_out_of_range() {
        assert_eq!(degrees_to_pulse_width(-10.0), 500);
        assert_eq!(degrees_to_pulse_width(190.0), 2500);
        assert_eq!(degrees_to_pulse_width(f32::NAN), 500);
        assert_eq!(degrees_to_pulse_width(f32::INFINITY), 2500);
    }

    #[test]
    fn test_pulse_width_is_monotonic() {
        let mut last = 0;
        for tenth in 0..=1800 {
            #[allow(clippy::cast_precision_loss)]
            let width = degrees_to_pulse_width(tenth as f32 / 10.0);
            assert!(width >= last);
            last = width;
        }
    }

    #[test]
    fn test_attach_parks_arm() {
        let journal = Journal::default();
        let actuator =
            Actuator::attach(Button::White, MockLine::new(Button::White, &journal), &arm(41.0))
                .unwrap();

        assert_eq!(actuator.state(), ActuatorState::Parked);
        assert_eq!(actuator.output().button(), Button::White);
        assert_eq!(journal.events(), vec![Event::Pulse(Button::White, 956)]);
    }

    #[test]
    fn test_attach_clamps_park_angle() {
        let journal = Journal::default();
        let actuator =
            Actuator::attach(Button::Red, MockLine::new(Button::Red, &journal), &arm(5.0))
                .unwrap();
        assert!((actuator.park_angle() - 12.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_tap_lowers_holds_and_recovers() {
        let journal = Journal::default();
        let mut delay = MockDelay::new(&journal);
        let mut actuator =
            Actuator::attach(Button::White, MockLine::new(Button::White, &journal), &arm(41.0))
                .unwrap();
        journal.clear();

        actuator.tap(&mut delay).unwrap();

        assert_eq!(
            journal.events(),
            vec![
                Event::Pulse(Button::White, 856),
                Event::Wait(50 * MS),
                Event::Pulse(Button::White, 956),
                Event::Wait(110 * MS),
            ]
        );
        assert_eq!(actuator.state(), ActuatorState::Parked);
    }

    #[test]
    fn test_tune_angle_stays_in_range() {
        let journal = Journal::default();
        let mut actuator =
            Actuator::attach(Button::Blue, MockLine::new(Button::Blue, &journal), &arm(18.0))
                .unwrap();

        let angle = actuator.tune_angle(-10.0).unwrap();
        assert!((angle - 12.0).abs() < f32::EPSILON);

        let angle = actuator.tune_angle(200.0).unwrap();
        assert!((angle - 178.0).abs() < f32::EPSILON);

        for delta in [-30.0, 7.5, -1.0, 400.0, -1000.0, 3.0, f32::NAN, f32::INFINITY] {
            let angle = actuator.tune_angle(delta).unwrap();
            assert!((12.0..=178.0).contains(&angle), "{delta} -> {angle}");
        }
    }

    #[test]
    fn test_tune_angle_moves_arm() {
        let journal = Journal::default();
        let mut actuator =
            Actuator::attach(Button::White, MockLine::new(Button::White, &journal), &arm(41.0))
                .unwrap();
        journal.clear();

        actuator.tune_angle(49.0).unwrap();
        assert_eq!(journal.events(), vec![Event::Pulse(Button::White, 1500)]);
    }

    #[test]
    fn test_tune_timing_clamps() {
        let journal = Journal::default();
        let mut actuator =
            Actuator::attach(Button::Red, MockLine::new(Button::Red, &journal), &arm(14.0))
                .unwrap();

        assert_eq!(
            actuator.tune_timing(TimingPhase::Tap, 1),
            Some(Duration::from_millis(51))
        );
        assert_eq!(
            actuator.tune_timing(TimingPhase::Tap, -100),
            Some(Duration::from_millis(0))
        );
        assert_eq!(
            actuator.tune_timing(TimingPhase::Recovery, 5000),
            Some(Duration::from_millis(1000))
        );
        assert_eq!(actuator.tune_timing(TimingPhase::Cooldown, 10), None);
        assert_eq!(actuator.calibration().tap, Duration::from_millis(0));
    }

    #[test]
    fn test_tuning_never_shortens_long_durations() {
        let journal = Journal::default();
        let mut config = arm(14.0);
        config.recovery = Duration::from_millis(2000);
        let mut actuator =
            Actuator::attach(Button::Red, MockLine::new(Button::Red, &journal), &config).unwrap();

        assert_eq!(
            actuator.tune_timing(TimingPhase::Recovery, 1),
            Some(Duration::from_millis(2000))
        );
        assert_eq!(
            actuator.tune_timing(TimingPhase::Recovery, -1),
            Some(Duration::from_millis(1999))
        );
    }

    #[test]
    fn test_zero_hold_does_not_wait() {
        let journal = Journal::default();
        let mut delay = MockDelay::new(&journal);
        let mut actuator =
            Actuator::attach(Button::Red, MockLine::new(Button::Red, &journal), &arm(14.0))
                .unwrap();
        actuator.tune_timing(TimingPhase::Tap, -50);
        journal.clear();

        actuator.tap(&mut delay).unwrap();
        assert_eq!(journal.waited(), 110 * MS);
    }

    #[test]
    fn test_release_is_idempotent() {
        let journal = Journal::default();
        let mut delay = MockDelay::new(&journal);
        let config = actuator_config();
        let mut actuator =
            Actuator::attach(Button::Red, MockLine::new(Button::Red, &journal), &config.red)
                .unwrap();
        journal.clear();

        actuator.release(&config.maintenance, &mut delay).unwrap();
        actuator.release(&config.maintenance, &mut delay).unwrap();

        assert_eq!(
            journal.events(),
            vec![
                Event::Pulse(Button::Red, 1500),
                Event::Wait(100 * MS),
                Event::Disabled(Button::Red),
            ]
        );
        assert_eq!(actuator.state(), ActuatorState::Released);
    }

    #[test]
    fn test_driver_failure_names_button() {
        let journal = Journal::default();
        let mut delay = MockDelay::new(&journal);
        let line = MockLine::new(Button::Blue, &journal).failing_after(1);
        let mut actuator = Actuator::attach(Button::Blue, line, &arm(18.0)).unwrap();

        let err = actuator.tap(&mut delay).unwrap_err();
        assert_eq!(err.button(), Button::Blue);
        assert_eq!(err.to_string(), "BLUE actuator driver failed: DriverFault");
    }

    #[test]
    fn test_map_attach_failure_releases_earlier_arms() {
        let journal = Journal::default();
        let mut delay = MockDelay::new(&journal);
        let mut lines = lines(&journal);
        lines.white = MockLine::new(Button::White, &journal).failing_after(0);

        let err = ActuatorMap::attach(lines, &actuator_config(), &mut delay).unwrap_err();

        assert_eq!(err.button(), Button::White);
        assert_eq!(journal.disabled(), vec![Button::Red]);
    }

    #[test]
    fn test_release_all_attempts_every_arm() {
        let journal = Journal::default();
        let mut delay = MockDelay::new(&journal);
        let mut lines = lines(&journal);
        lines.red = MockLine::new(Button::Red, &journal).failing_after(1);
        let mut map = ActuatorMap::attach(lines, &actuator_config(), &mut delay).unwrap();

        let err = map.release_all(&mut delay).unwrap_err();

        assert_eq!(err.button(), Button::Red);
        assert_eq!(journal.disabled(), vec![Button::White, Button::Blue]);
        assert_eq!(map.get(Button::Red).state(), ActuatorState::Parked);
        assert_eq!(map.get(Button::Blue).state(), ActuatorState::Released);
    }

    #[test]
    fn test_map_routes_taps_by_button() {
        let journal = Journal::default();
        let mut delay = MockDelay::new(&journal);
        let mut map = ActuatorMap::attach(lines(&journal), &actuator_config(), &mut delay).unwrap();

        map.tap(Button::Blue, &mut delay).unwrap();
        map.tap(Button::Red, &mut delay).unwrap();

        assert_eq!(journal.taps(), vec![Button::Blue, Button::Red]);
        for button in Button::ALL {
            assert_eq!(map.get(button).button(), button);
            assert_eq!(map.get(button).output().button(), button);
        }
        assert_eq!(map.maintenance(), &actuator_config().maintenance);
    }
}
