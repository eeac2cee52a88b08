pub mod csv;

pub use csv::{write_flight_csv, write_flight_csv_file, write_motor_csv, write_motor_csv_file};
