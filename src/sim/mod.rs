pub mod chamber;
pub mod event;
pub mod flight;

pub use chamber::{simulate_motor, BurnProfile, ChamberConfig, MotorPhase, MotorSample, MotorSimulation};
pub use event::{FlightEvent, FlightEventKind};
pub use flight::{simulate_flight, FlightConfig, FlightSample, FlightSimulation};
