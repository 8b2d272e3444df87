//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod agency;
pub mod coverage_type;
pub mod grant;
pub mod grant_coverage_type;
pub mod grant_payee;
pub mod grant_reason_type;
pub mod grant_status;
pub mod payee;
pub mod person;
pub mod reason_type;
pub mod residence;
pub mod upload;
pub mod user;

// Re-export specific types to avoid conflicts
pub use agency::{Column as AgencyColumn, Entity as Agency, Model as AgencyModel};
pub use coverage_type::{
    Column as CoverageTypeColumn, Entity as CoverageType, Model as CoverageTypeModel,
};
pub use grant::{Column as GrantColumn, Entity as Grant, Model as GrantModel};
pub use grant_coverage_type::Entity as GrantCoverageType;
pub use grant_payee::Entity as GrantPayee;
pub use grant_reason_type::{
    Column as GrantReasonTypeColumn, Entity as GrantReasonType, Model as GrantReasonTypeModel,
};
pub use grant_status::{
    Column as GrantStatusColumn, Entity as GrantStatus, Model as GrantStatusModel,
};
pub use payee::{Column as PayeeColumn, Entity as Payee, Model as PayeeModel};
pub use person::{Column as PersonColumn, Entity as Person, Model as PersonModel};
pub use reason_type::{Column as ReasonTypeColumn, Entity as ReasonType, Model as ReasonTypeModel};
pub use residence::{Column as ResidenceColumn, Entity as Residence, Model as ResidenceModel};
pub use upload::{Column as UploadColumn, Entity as Upload, Model as UploadModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
