//! Recast.AI adapters
//!
//! `analyse` and `converse` share one [`RecastClient`]. With the language
//! setting `<?`, the first detected language is kept and sent on later calls
//! made through the same client.

pub mod analyse;
pub mod client;
pub mod converse;

pub use self::{
    analyse::RecastAnalyse,
    client::{LanguageSetting, Operation, RecastClient, RequestOptions, DETECT_LANGUAGE},
    converse::{ConverseRequest, RecastConverse},
};
