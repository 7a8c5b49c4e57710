pub mod corpus;
pub mod error;
pub mod model;
pub mod search;
pub mod validate;
