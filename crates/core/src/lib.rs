pub mod account;
pub mod error;
pub mod keys;
pub mod property;
pub mod value;

pub use account::AccountInfo;
pub use error::CoreError;
pub use keys::PropertyKey;
pub use property::Property;
pub use value::PropertyValue;
