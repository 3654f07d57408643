//! Stand-in sensor for running the server on a desktop.

use rand::{rngs::StdRng, Rng, SeedableRng};

use super::{Measurement, SensorPrimitive};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("simulated sensor fault")]
pub struct SimulatedFault;

/// Random-walk temperature/humidity that needs `steps` polls per conversion
/// and fails now and then, like a real single-wire part on a noisy line.
pub struct SimulatedSensor {
    rng: StdRng,
    steps: u8,
    progress: u8,
    fault_probability: f64,
    current: Measurement,
}

impl SimulatedSensor {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            steps: 2,
            progress: 0,
            fault_probability: 0.05,
            current: Measurement {
                temperature: 22.0,
                humidity: 45.0,
            },
        }
    }

    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    pub fn with_steps(mut self, steps: u8) -> Self {
        self.steps = steps.max(1);
        self
    }

    pub fn with_fault_probability(mut self, p: f64) -> Self {
        self.fault_probability = p.clamp(0.0, 1.0);
        self
    }
}

impl SensorPrimitive for SimulatedSensor {
    type Error = SimulatedFault;

    fn attempt_read(&mut self) -> nb::Result<Measurement, SimulatedFault> {
        self.progress += 1;
        if self.progress < self.steps {
            return Err(nb::Error::WouldBlock);
        }
        self.progress = 0;

        if self.rng.gen_bool(self.fault_probability) {
            return Err(nb::Error::Other(SimulatedFault));
        }

        let t = self.current.temperature + self.rng.gen_range(-0.3f32..=0.3);
        let h = self.current.humidity + self.rng.gen_range(-1.0f32..=1.0);
        // DHT22 resolution is a tenth of a unit
        self.current = Measurement {
            temperature: (t.clamp(-40.0, 80.0) * 10.0).round() / 10.0,
            humidity: (h.clamp(0.0, 100.0) * 10.0).round() / 10.0,
        };
        Ok(self.current)
    }
}

#[test]
fn test_simulated_sensor_takes_several_polls() {
    let mut sensor = SimulatedSensor::new(7)
        .with_steps(3)
        .with_fault_probability(0.0);
    assert_eq!(sensor.attempt_read(), Err(nb::Error::WouldBlock));
    assert_eq!(sensor.attempt_read(), Err(nb::Error::WouldBlock));
    let m = sensor.attempt_read().unwrap();
    assert!((-40.0..=80.0).contains(&m.temperature));
    assert!((0.0..=100.0).contains(&m.humidity));
}

#[test]
fn test_simulated_sensor_always_faulty() {
    let mut sensor = SimulatedSensor::new(7)
        .with_steps(1)
        .with_fault_probability(1.0);
    assert_eq!(sensor.attempt_read(), Err(nb::Error::Other(SimulatedFault)));
}
