mod property_resume;
pub(crate) mod utils;
