pub mod error;
pub mod io;
pub mod motor;
pub mod physics;
pub mod sim;
pub mod vehicle;

pub use error::SimError;
pub use motor::grain::{Grain, GrainSegment, SegmentShape};
pub use motor::propellant::{BurnRateSegment, Propellant};
pub use motor::{Motor, MotorBuilder};
pub use physics::atmosphere::{self, AtmosphereSample};
pub use sim::{
    simulate_flight, simulate_motor, BurnProfile, ChamberConfig, FlightConfig, FlightEvent,
    FlightEventKind, FlightSample, FlightSimulation, MotorPhase, MotorSample, MotorSimulation,
};
pub use vehicle::{Recovery, Rocket};
