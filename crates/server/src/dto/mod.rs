mod itinerary;
mod route;
mod schedule;

pub use itinerary::*;
pub use route::*;
pub use schedule::*;
