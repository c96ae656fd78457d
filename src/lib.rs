//! Reduced-order thermal simulation of building zones.
//!
//! A zone is modelled as a lumped RC network: envelope elements are
//! aggregated into conductances and capacitances ([`envelope`]), assembled
//! into a continuous state-space system for either the VDI 6007 two-node or
//! the ISO 13790 single-node topology ([`network`]), discretized exactly
//! over a fixed timestep ([`integrator`]) and driven over weather and load
//! series ([`driver`]) with ideal-load HVAC control ([`hvac`]).
//!
//! ```no_run
//! use nalgebra::DVector;
//! use zonerc::envelope::{
//!     aggregate, ElementKind, EnvelopeElement, MassSpec, Orientation,
//!     SolarProperties, ZoneGeometry,
//! };
//! use zonerc::driver::run;
//! use zonerc::forcing::{ForcingSeries, InternalGains, WeatherSeries};
//! use zonerc::hvac::ComfortBand;
//! use zonerc::integrator::DiscreteSystem;
//! use zonerc::network::{assemble, Topology};
//! use zonerc::parameters::MassClass;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let elements = vec![
//!     EnvelopeElement::opaque(ElementKind::OpaqueWall, 40.0, 0.35)
//!         .with_orientation(Orientation::South),
//!     EnvelopeElement::window(8.0, 1.3, Orientation::South, SolarProperties::new(0.6)),
//! ];
//! let params = aggregate(
//!     &elements,
//!     &MassSpec::Class(MassClass::Medium),
//!     ZoneGeometry { floor_area_m2: 50.0, volume_m3: Some(150.0) },
//!     0.5,
//! )?;
//! let model = assemble(&params, Topology::Vdi6007)?;
//! let system = DiscreteSystem::new(&model, 3600.0)?;
//! # let weather: WeatherSeries = todo!();
//! let forcing = ForcingSeries::build(&params, weather, InternalGains::none(8760), None)?;
//! let result = run(&model, &system, None, &forcing, &ComfortBand::free_floating())?;
//! println!("annual heating: {:.0} kWh", result.heating_energy_j() / 3.6e6);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod driver;
pub mod envelope;
pub mod errors;
pub mod forcing;
pub mod hvac;
pub mod integrator;
pub mod network;
pub mod parameters;
