// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Matthias Bilger <matthias@bilger.info>

mod common;

use common::ScriptedTransport;
use launcher_hid::*;
use std::time::Duration;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

    #[test]
    fn test_move_sends_move_then_stop() {
        let clock = ManualClock::new();
        let mut launcher = Launcher::new(ScriptedTransport::new(&clock), &clock);
        let duration = MoveDuration::from_millis(750).unwrap();

        launcher.move_turret(Direction::Left, duration).unwrap();

        let writes = &launcher.transport().writes;
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].0, vec![0x00, CMD_MOVE_LEFT]);
        assert_eq!(writes[1].0, vec![0x00, CMD_STOP]);
        assert!(writes[1].1 - writes[0].1 >= duration.as_duration());
        assert_eq!(launcher.active_command(), None);
    }

    #[test]
    fn test_move_every_direction() {
        for direction in Direction::ALL {
            let clock = ManualClock::new();
            let mut launcher = Launcher::new(ScriptedTransport::new(&clock), &clock);

            launcher
                .move_turret(direction, MoveDuration::default())
                .unwrap();

            assert_eq!(
                launcher.transport().commands(),
                vec![Command::movement(direction).wire_value(), CMD_STOP]
            );
            assert_eq!(clock.sleeps(), vec![ms(100)]);
        }
    }

    #[test]
    fn test_move_zero_duration() {
        let clock = ManualClock::new();
        let mut launcher = Launcher::new(ScriptedTransport::new(&clock), &clock);

        launcher
            .move_turret(Direction::Up, MoveDuration::from_millis(0).unwrap())
            .unwrap();

        assert_eq!(launcher.transport().commands(), vec![CMD_MOVE_UP, CMD_STOP]);
    }

    #[test]
    fn test_move_first_write_fails() {
        let clock = ManualClock::new();
        let transport = ScriptedTransport::new(&clock).failing_write(0);
        let mut launcher = Launcher::new(transport, &clock);

        let err = launcher
            .move_turret(Direction::Right, MoveDuration::from_millis(500).unwrap())
            .unwrap_err();

        assert!(matches!(
            err,
            ActionError::WriteFailure {
                step: Step::MoveCommand(Direction::Right),
                ..
            }
        ));
        assert_eq!(launcher.transport().writes.len(), 1);
        assert!(clock.sleeps().is_empty());
        assert_eq!(launcher.active_command(), None);
    }

    #[test]
    fn test_move_stop_fails() {
        let clock = ManualClock::new();
        let transport = ScriptedTransport::new(&clock).failing_write(1);
        let mut launcher = Launcher::new(transport, &clock);

        let err = launcher
            .move_turret(Direction::Down, MoveDuration::from_millis(200).unwrap())
            .unwrap_err();

        assert_eq!(err.step(), Step::StopCommand);
        // No second stop is attempted
        assert_eq!(launcher.transport().commands(), vec![CMD_MOVE_DOWN, CMD_STOP]);
        assert_eq!(launcher.active_command(), Some(Command::MoveDown));
    }

    #[test]
    fn test_stop_after_failed_move_stop() {
        let clock = ManualClock::new();
        let transport = ScriptedTransport::new(&clock).failing_write(1);
        let mut launcher = Launcher::new(transport, &clock);

        assert!(launcher
            .move_turret(Direction::Left, MoveDuration::from_millis(200).unwrap())
            .is_err());
        assert_eq!(launcher.active_command(), Some(Command::MoveLeft));

        launcher.stop().unwrap();

        assert_eq!(launcher.active_command(), None);
        assert_eq!(
            launcher.transport().commands(),
            vec![CMD_MOVE_LEFT, CMD_STOP, CMD_STOP]
        );
    }

    #[test]
    fn test_fire_polls_until_fired() {
        let clock = ManualClock::new();
        let transport = ScriptedTransport::new(&clock).with_statuses(&[0x00, 0x00, 0x00, STATUS_FIRED]);
        let mut launcher = Launcher::new(transport, &clock);

        let summary = launcher.fire().unwrap();

        assert_eq!(summary.polls, 4);
        assert_eq!(launcher.transport().read_attempts, 4);
        assert_eq!(
            launcher.transport().commands(),
            vec![CMD_FIRE, CMD_GET_STATUS, CMD_GET_STATUS, CMD_GET_STATUS, CMD_GET_STATUS, CMD_STOP]
        );
        assert_eq!(launcher.fire_state(), FireState::Done);
        assert_eq!(launcher.active_command(), None);
    }

    #[test]
    fn test_fire_overshoot_before_stop() {
        let clock = ManualClock::new();
        let transport = ScriptedTransport::new(&clock).with_statuses(&[STATUS_FIRED]);
        let mut launcher = Launcher::new(transport, &clock);

        launcher.fire().unwrap();

        let writes = &launcher.transport().writes;
        let confirmed_at = writes[1].1;
        let stopped_at = writes[2].1;
        assert_eq!(stopped_at - confirmed_at, ms(FIRE_OVERSHOOT_TIME_MS));
        assert_eq!(clock.sleeps(), vec![ms(FIRE_OVERSHOOT_TIME_MS)]);
    }

    #[test]
    fn test_fire_ignores_limit_bits() {
        let clock = ManualClock::new();
        let transport = ScriptedTransport::new(&clock)
            .with_statuses(&[STATUS_LEFT_LIMIT, STATUS_LEFT_LIMIT | STATUS_FIRED]);
        let mut launcher = Launcher::new(transport, &clock);

        assert_eq!(launcher.fire().unwrap().polls, 2);
    }

    #[test]
    fn test_fire_second_read_fails() {
        let clock = ManualClock::new();
        let transport = ScriptedTransport::new(&clock)
            .with_statuses(&[0x00, 0x00, STATUS_FIRED])
            .failing_read(1);
        let mut launcher = Launcher::new(transport, &clock);

        let err = launcher.fire().unwrap_err();

        assert!(matches!(
            err,
            ActionError::ReadFailure {
                step: Step::StatusRead,
                ..
            }
        ));
        assert!(!launcher.transport().commands().contains(&CMD_STOP));
        assert_eq!(launcher.fire_state(), FireState::Failed(Step::StatusRead));
    }

    #[test]
    fn test_fire_command_fails() {
        let clock = ManualClock::new();
        let transport = ScriptedTransport::new(&clock).failing_write(0);
        let mut launcher = Launcher::new(transport, &clock);

        let err = launcher.fire().unwrap_err();

        assert_eq!(err.step(), Step::FireCommand);
        assert_eq!(launcher.transport().writes.len(), 1);
        assert_eq!(launcher.transport().read_attempts, 0);
        assert_eq!(launcher.fire_state(), FireState::Failed(Step::FireCommand));
    }

    #[test]
    fn test_fire_status_request_fails() {
        let clock = ManualClock::new();
        let transport = ScriptedTransport::new(&clock)
            .with_statuses(&[0x00])
            .failing_write(2);
        let mut launcher = Launcher::new(transport, &clock);

        let err = launcher.fire().unwrap_err();

        assert_eq!(err.step(), Step::StatusRequest);
        assert_eq!(launcher.transport().commands(), vec![CMD_FIRE, CMD_GET_STATUS, CMD_GET_STATUS]);
    }

    #[test]
    fn test_fire_stop_fails() {
        let clock = ManualClock::new();
        let transport = ScriptedTransport::new(&clock)
            .with_statuses(&[STATUS_FIRED])
            .failing_write(2);
        let mut launcher = Launcher::new(transport, &clock);

        let err = launcher.fire().unwrap_err();

        assert_eq!(err.step(), Step::StopCommand);
        assert_eq!(launcher.fire_state(), FireState::Failed(Step::StopCommand));
        assert_eq!(launcher.active_command(), Some(Command::Fire));
    }

    #[test]
    fn test_fire_poll_interval() {
        let clock = ManualClock::new();
        let transport = ScriptedTransport::new(&clock).with_statuses(&[0x00, 0x00, STATUS_FIRED]);
        let config = SequencerConfig {
            poll_interval: ms(20),
            ..SequencerConfig::default()
        };
        let mut launcher = Launcher::new(transport, &clock).with_config(config);

        let summary = launcher.fire().unwrap();

        assert_eq!(summary.polls, 3);
        assert_eq!(summary.confirmed_after, ms(40));
        assert_eq!(clock.sleeps(), vec![ms(20), ms(20), ms(FIRE_OVERSHOOT_TIME_MS)]);
    }

    #[test]
    fn test_fire_timeout_stops() {
        let clock = ManualClock::new();
        let transport = ScriptedTransport::new(&clock).with_statuses(&[0x00; 16]);
        let config = SequencerConfig {
            poll_interval: ms(50),
            fire_timeout: Some(ms(200)),
            ..SequencerConfig::default()
        };
        let mut launcher = Launcher::new(transport, &clock).with_config(config);

        let err = launcher.fire().unwrap_err();

        match err {
            ActionError::FireTimeout { timeout, polls } => {
                assert_eq!(timeout, ms(200));
                assert_eq!(polls, 5);
            }
            other => panic!("Expected FireTimeout, got {:?}", other),
        }
        assert_eq!(launcher.transport().commands().last(), Some(&CMD_STOP));
        assert_eq!(launcher.active_command(), None);
        assert_eq!(launcher.fire_state(), FireState::Failed(Step::FireConfirmation));
    }

    #[test]
    fn test_fire_timeout_stop_fails() {
        let clock = ManualClock::new();
        // Fire, five status requests, then the Stop that fails
        let transport = ScriptedTransport::new(&clock)
            .with_statuses(&[0x00; 16])
            .failing_write(6);
        let config = SequencerConfig {
            poll_interval: ms(50),
            fire_timeout: Some(ms(200)),
            ..SequencerConfig::default()
        };
        let mut launcher = Launcher::new(transport, &clock).with_config(config);

        let err = launcher.fire().unwrap_err();

        assert!(matches!(err, ActionError::FireTimeout { polls: 5, .. }));
        assert_eq!(err.step(), Step::FireConfirmation);
        assert_eq!(launcher.fire_state(), FireState::Failed(Step::FireConfirmation));
        assert_eq!(launcher.active_command(), Some(Command::Fire));
        assert_eq!(launcher.transport().commands().last(), Some(&CMD_STOP));
    }

    #[test]
    fn test_fire_without_timeout_keeps_polling() {
        let clock = ManualClock::new();
        let mut statuses = vec![0x00; 200];
        statuses.push(STATUS_FIRED);
        let transport = ScriptedTransport::new(&clock).with_statuses(&statuses);
        let mut launcher = Launcher::new(transport, &clock);

        assert_eq!(launcher.fire().unwrap().polls, 201);
    }

    #[test]
    fn test_query_status() {
        let clock = ManualClock::new();
        let transport = ScriptedTransport::new(&clock).with_statuses(&[0x05]);
        let mut launcher = Launcher::new(transport, &clock);

        let status = launcher.query_status().unwrap();

        assert_eq!(
            status,
            StatusReport {
                up_limit: false,
                down_limit: true,
                left_limit: true,
                right_limit: false,
                fired: false,
            }
        );
        assert_eq!(launcher.transport().commands(), vec![CMD_GET_STATUS]);
        assert!(clock.sleeps().is_empty());
    }

    #[test]
    fn test_query_status_write_fails() {
        let clock = ManualClock::new();
        let transport = ScriptedTransport::new(&clock).failing_write(0);
        let mut launcher = Launcher::new(transport, &clock);

        let err = launcher.query_status().unwrap_err();

        assert_eq!(err.step(), Step::StatusRequest);
        assert_eq!(launcher.transport().read_attempts, 0);
    }

    #[test]
    fn test_query_status_read_fails() {
        let clock = ManualClock::new();
        let transport = ScriptedTransport::new(&clock).failing_read(0);
        let mut launcher = Launcher::new(transport, &clock);

        let err = launcher.query_status().unwrap_err();

        assert!(matches!(err, ActionError::ReadFailure { .. }));
        assert!(err.to_string().starts_with("Failed to complete status read"));
    }
