pub mod extraction;
pub mod fields;
pub mod reference;
pub mod verification;
