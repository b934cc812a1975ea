pub mod lists;
pub mod ride;
pub mod vehicles;

pub use lists::{RideList, RideListScreen, SearchForm, SearchScreen};
pub use ride::{RideAction, RideScreen, SeatControl};
pub use vehicles::{VehicleForm, VehiclesScreen};
