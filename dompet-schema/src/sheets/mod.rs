mod values;

pub use values::{ClearValuesResponse, UpdateValuesResponse, ValueRange};
