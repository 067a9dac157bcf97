//! Registration input and validated output records.

mod descriptor;
mod source;
mod trigger;

pub use descriptor::{
    EventSurfaceType, RegistrationDescriptor, RegistrationDescriptorBuilder, RegistrationType,
    SourceType,
};
pub use source::{Source, SourceBuilder};
pub use trigger::{Trigger, TriggerBuilder};
