pub mod artists;
pub mod search;
pub mod shows;
pub mod venues;
