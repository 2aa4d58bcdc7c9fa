//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod advertisement_characteristic_repo;
pub mod advertisement_repo;
pub mod category_characteristic_repo;
pub mod category_repo;
pub mod characteristic_repo;
pub mod city_repo;
pub mod country_repo;
pub mod street_repo;
pub mod user_repo;

pub use advertisement_characteristic_repo::AdvertisementCharacteristicRepo;
pub use advertisement_repo::AdvertisementRepo;
pub use category_characteristic_repo::CategoryCharacteristicRepo;
pub use category_repo::CategoryRepo;
pub use characteristic_repo::CharacteristicRepo;
pub use city_repo::CityRepo;
pub use country_repo::CountryRepo;
pub use street_repo::StreetRepo;
pub use user_repo::UserRepo;
