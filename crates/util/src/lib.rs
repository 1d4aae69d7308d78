pub mod config;
pub mod date_handling;
pub mod fields;
pub mod path_processing;

pub use config::{CONFIG_PATH_ENV, ConfigError, WizardConfig, default_config_path};
pub use fields::{DateField, FieldProducer, PhoneField, SelectField, TextField, format_phone_number};
pub use path_processing::expand_tilde;
