// Store access shared by every listing table

pub mod traits;

pub use traits::{IntoListingActiveModel, ListingResource, MergeIntoActiveModel};
