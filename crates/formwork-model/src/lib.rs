pub mod attributes;
pub mod clock;
pub mod codes;
pub mod composite;
pub mod element;
pub mod error;
pub mod options;
pub mod parent;
pub mod phrase;
pub mod report;
pub mod schema;
pub mod settings;
pub mod store;
pub mod value;

pub use attributes::{ControlAttributes, ValueAttribute};
pub use clock::{Clock, FixedClock, SystemClock};
pub use composite::{Exclusion, MonthYearState, SelectOption, SubField};
pub use element::{DeferredUpdate, ERROR_CLASS, ElementState};
pub use error::{FormworkError, Result};
pub use options::{ClientDefaults, ControlOptions, ErrorOptions, StackMethod, ValidateOptions};
pub use parent::{ParentNotice, ParentState};
pub use phrase::{MemoryPhrasebook, PhraseLookup, Phrasebook};
pub use report::ErrorReport;
pub use schema::{FormSchema, Primitive, PropertySchema};
pub use settings::TypeDefaults;
pub use store::{AttributeStore, ChangeEvent, MemoryModel, ModelDefinition};
pub use value::ControlValue;
