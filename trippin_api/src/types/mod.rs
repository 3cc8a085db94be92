mod meta;
pub use self::meta::{Collection, Navigation};

mod entity;
pub use self::entity::{Entity, EntitySet, Key, Property, PropertyKind};

mod person;
pub use self::person::{City, Location, Person, PersonGender};

mod trip;
pub use self::trip::Trip;

mod airline;
pub use self::airline::Airline;
