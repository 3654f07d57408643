mod common;

use std::time::Duration;

use proptest::prelude::*;

use common::{Harness, INTERVAL};

proptest! {
    /// Whatever the tick spacing and sensor behaviour, two read attempts are
    /// never closer together than one interval.
    #[test]
    fn attempts_are_spaced_by_interval(
        steps_ms in prop::collection::vec(0u64..3_000, 1..400),
        outcomes in prop::collection::vec(0u8..3, 0..50),
    ) {
        let mut h = Harness::new();
        for o in outcomes {
            match o {
                0 => h.sensor.succeed(20.0, 50.0),
                1 => h.sensor.push(Err(nb::Error::WouldBlock)),
                _ => h.sensor.push(Err(nb::Error::Other("fault"))),
            }
        }

        let mut now = Duration::ZERO;
        let mut last_attempt = Duration::ZERO;
        let mut calls = 0;
        for step in steps_ms {
            let step = Duration::from_millis(step);
            h.clock.advance(step);
            now += step;
            h.scheduler.tick();

            if h.sensor.calls() != calls {
                prop_assert_eq!(h.sensor.calls(), calls + 1);
                prop_assert!(now - last_attempt >= INTERVAL);
                last_attempt = now;
                calls = h.sensor.calls();
            } else {
                // due but skipped would be a missed attempt
                prop_assert!(now - last_attempt < INTERVAL);
            }
        }
    }
}
