// handlers/mod.rs - resource handlers
//
// Access rules live in the router (see app.rs), not here: by the time a
// handler runs, its route's guards have already admitted the caller.
pub mod companies;
pub mod jobs;
pub mod users;
pub mod utils;
