pub mod analytics;
pub mod catalog;
pub mod dashboard;
pub mod ott;
pub mod ratings;
pub mod recommendations;
pub mod reviews;
pub mod roles;
pub mod watchlist;
